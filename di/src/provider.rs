//! Lifecycle policies, one variant per scope.

use crate::definition::{Definition, Scope};
use crate::error::{Error, Result};
use crate::resolver::Resolver;
use crate::value::{Instance, Value};
use once_cell::sync::OnceCell;

/// Wraps a [`Definition`] with the lifecycle policy of its scope.
#[derive(Debug)]
pub enum Provider {
  /// Built on first use, then the same instance forever.
  Singleton {
    definition: Definition,
    instance: OnceCell<Instance>,
  },
  /// Built on every use.
  Factory { definition: Definition },
  /// A template is built on first use; every use returns a shallow copy of it.
  Prototype {
    definition: Definition,
    template: OnceCell<Instance>,
  },
  /// Resolves another id; chains resolve transitively.
  Alias { definition: Definition },
  /// Returns the stored value verbatim.
  Parameter { definition: Definition },
}

impl Provider {
  pub fn new(scope: Scope, definition: Definition) -> Self {
    match scope {
      Scope::Singleton => Provider::Singleton {
        definition,
        instance: OnceCell::new(),
      },
      Scope::Factory => Provider::Factory { definition },
      Scope::Prototype => Provider::Prototype {
        definition,
        template: OnceCell::new(),
      },
      Scope::Alias => Provider::Alias { definition },
      Scope::Param => Provider::Parameter { definition },
    }
  }

  pub fn scope(&self) -> Scope {
    match self {
      Provider::Singleton { .. } => Scope::Singleton,
      Provider::Factory { .. } => Scope::Factory,
      Provider::Prototype { .. } => Scope::Prototype,
      Provider::Alias { .. } => Scope::Alias,
      Provider::Parameter { .. } => Scope::Param,
    }
  }

  pub fn definition(&self) -> &Definition {
    match self {
      Provider::Singleton { definition, .. }
      | Provider::Factory { definition }
      | Provider::Prototype { definition, .. }
      | Provider::Alias { definition }
      | Provider::Parameter { definition } => definition,
    }
  }

  /// Whether a cached singleton or prototype template exists.
  pub fn is_materialized(&self) -> bool {
    match self {
      Provider::Singleton { instance, .. } => instance.get().is_some(),
      Provider::Prototype { template, .. } => template.get().is_some(),
      _ => false,
    }
  }

  pub(crate) fn provide(&self, resolver: &Resolver) -> Result<Value> {
    match self {
      Provider::Parameter { definition } => Ok(definition.value().cloned().unwrap_or_default()),
      Provider::Alias { definition } => match definition.value() {
        Some(Value::Str(target)) => resolver.get(target),
        _ => Err(Error::InvalidAlias(definition.id().to_owned())),
      },
      Provider::Singleton {
        definition,
        instance,
      } => instance
        .get_or_try_init(|| resolver.instantiate(definition))
        .map(|instance| Value::Object(instance.clone())),
      Provider::Factory { definition } => resolver.instantiate(definition).map(Value::Object),
      Provider::Prototype {
        definition,
        template,
      } => {
        let template = template.get_or_try_init(|| resolver.instantiate(definition))?;
        resolver.copy_instance(template).map(Value::Object)
      }
    }
  }
}
