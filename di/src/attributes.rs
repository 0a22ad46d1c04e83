//! Type-level service attributes and the parser that turns them into registrations.

use crate::definition::{Definition, Scope};
use crate::error::{Error, Result};
use crate::reflect::TypeKind;
use crate::resolver::Resolver;

/// An attribute attached to a type's metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
  AsSingleton { id: Option<String> },
  AsFactory { id: Option<String> },
  AsPrototype { id: Option<String> },
  /// Anything else a collector may report; the parser skips it.
  Other(String),
}

impl Attribute {
  pub fn singleton() -> Self {
    Attribute::AsSingleton { id: None }
  }

  pub fn factory() -> Self {
    Attribute::AsFactory { id: None }
  }

  pub fn prototype() -> Self {
    Attribute::AsPrototype { id: None }
  }

  /// Sets the registry id the service is registered under. No-op for `Other`.
  pub fn with_id(mut self, service_id: impl Into<String>) -> Self {
    match &mut self {
      Attribute::AsSingleton { id } | Attribute::AsFactory { id } | Attribute::AsPrototype { id } => {
        *id = Some(service_id.into())
      }
      Attribute::Other(_) => {}
    }
    self
  }

  /// The scope this attribute requests, if it is a scope attribute.
  pub fn scope(&self) -> Option<Scope> {
    match self {
      Attribute::AsSingleton { .. } => Some(Scope::Singleton),
      Attribute::AsFactory { .. } => Some(Scope::Factory),
      Attribute::AsPrototype { .. } => Some(Scope::Prototype),
      Attribute::Other(_) => None,
    }
  }

  pub fn id(&self) -> Option<&str> {
    match self {
      Attribute::AsSingleton { id } | Attribute::AsFactory { id } | Attribute::AsPrototype { id } => {
        id.as_deref()
      }
      Attribute::Other(_) => None,
    }
  }
}

/// Registers services from `(class, attribute)` pairs. It never resolves anything.
pub struct AttributeParser<'r> {
  resolver: &'r Resolver,
}

impl<'r> AttributeParser<'r> {
  pub fn new(resolver: &'r Resolver) -> Self {
    Self { resolver }
  }

  /// Returns how many definitions were registered.
  pub fn parse<'a, I>(&self, discovered: I) -> Result<usize>
  where
    I: IntoIterator<Item = (&'a str, &'a Attribute)>,
  {
    let mut registered = 0;
    for (class, attribute) in discovered {
      let Some(scope) = attribute.scope() else {
        continue;
      };

      let record = self.resolver.reflection().record(class)?;
      if record.kind() != TypeKind::Concrete {
        return Err(Error::AbstractClassAsDefinition(class.to_owned()));
      }

      let id = attribute.id().unwrap_or(class);
      self.resolver.register(scope, Definition::new(id, class))?;
      tracing::debug!(class, id, %scope, "registered from attribute");
      registered += 1;
    }
    Ok(registered)
  }
}
