//! Service definitions and the lifecycle scopes they can be registered under.

use crate::error::{Error, Result};
use crate::value::{Expr, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The lifecycle policy a definition is registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
  Singleton,
  Factory,
  Prototype,
  Alias,
  Param,
}

impl Scope {
  pub const ALL: [Scope; 5] = [
    Scope::Singleton,
    Scope::Factory,
    Scope::Prototype,
    Scope::Alias,
    Scope::Param,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Scope::Singleton => "singleton",
      Scope::Factory => "factory",
      Scope::Prototype => "prototype",
      Scope::Alias => "alias",
      Scope::Param => "param",
    }
  }

  /// Scopes whose provider builds objects from a class.
  pub fn is_class_backed(&self) -> bool {
    matches!(self, Scope::Singleton | Scope::Factory | Scope::Prototype)
  }
}

impl fmt::Display for Scope {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Scope {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Scope::ALL
      .into_iter()
      .find(|scope| scope.as_str() == s)
      .ok_or_else(|| Error::UnknownScope(s.to_owned()))
  }
}

/// Declarative description of one service.
///
/// Class-backed scopes use `class`, `args` and `params`. `Alias` stores the target id in
/// `value`, `Param` stores the literal it hands out.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Definition {
  id: String,
  class: Option<String>,
  args: IndexMap<String, Expr>,
  params: IndexMap<String, Expr>,
  value: Option<Value>,
}

impl Definition {
  pub fn new(id: impl Into<String>, class: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      class: Some(class.into()),
      ..Self::default()
    }
  }

  /// A definition whose id and class are both the type name of `T`.
  pub fn of<T: ?Sized + 'static>() -> Self {
    let name = std::any::type_name::<T>();
    Self::new(name, name)
  }

  /// A payload-only definition, used by `Param` and `Alias`.
  pub fn with_value(id: impl Into<String>, value: impl Into<Value>) -> Self {
    Self {
      id: id.into(),
      value: Some(value.into()),
      ..Self::default()
    }
  }

  pub fn alias(id: impl Into<String>, target: impl Into<String>) -> Self {
    Self::with_value(id, Value::Str(target.into()))
  }

  /// Explicit constructor argument.
  pub fn arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
    self.args.insert(name.into(), Expr::Literal(value.into()));
    self
  }

  /// Constructor argument taken from another service.
  pub fn arg_ref(mut self, name: impl Into<String>, id: impl Into<String>) -> Self {
    self.args.insert(name.into(), Expr::Ref(id.into()));
    self
  }

  pub fn arg_expr(mut self, name: impl Into<String>, expr: Expr) -> Self {
    self.args.insert(name.into(), expr);
    self
  }

  /// Post-construction value applied through the type's setter.
  pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
    self.params.insert(name.into(), Expr::Literal(value.into()));
    self
  }

  pub fn param_ref(mut self, name: impl Into<String>, id: impl Into<String>) -> Self {
    self.params.insert(name.into(), Expr::Ref(id.into()));
    self
  }

  pub fn param_expr(mut self, name: impl Into<String>, expr: Expr) -> Self {
    self.params.insert(name.into(), expr);
    self
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn class(&self) -> Option<&str> {
    self.class.as_deref()
  }

  pub fn args(&self) -> &IndexMap<String, Expr> {
    &self.args
  }

  pub fn params(&self) -> &IndexMap<String, Expr> {
    &self.params
  }

  pub fn value(&self) -> Option<&Value> {
    self.value.as_ref()
  }

  pub(crate) fn set_args(&mut self, args: IndexMap<String, Expr>) {
    self.args = args;
  }

  pub(crate) fn set_params(&mut self, params: IndexMap<String, Expr>) {
    self.params = params;
  }

  /// Checks the fields `scope` relies on.
  pub(crate) fn validate(&self, scope: Scope) -> Result<()> {
    if self.id.is_empty() {
      return Err(Error::InvalidConfiguration(format!(
        "a {} definition has an empty id",
        scope
      )));
    }
    if scope.is_class_backed() && self.class.as_deref().map_or(true, str::is_empty) {
      return Err(Error::InvalidConfiguration(format!(
        "{} definition `{}` has no class",
        scope, self.id
      )));
    }
    if !scope.is_class_backed() && self.value.is_none() {
      return Err(Error::InvalidConfiguration(format!(
        "{} definition `{}` has no value",
        scope, self.id
      )));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn scope_keywords_match_exactly() {
    assert_eq!("singleton".parse::<Scope>().unwrap(), Scope::Singleton);
    assert!(matches!(
      "ALIAS".parse::<Scope>(),
      Err(Error::UnknownScope(s)) if s == "ALIAS"
    ));
    assert!(matches!(
      "session".parse::<Scope>(),
      Err(Error::UnknownScope(s)) if s == "session"
    ));
  }

  #[test]
  fn class_backed_definitions_need_a_class() {
    let def = Definition::with_value("x", 1);
    assert!(matches!(
      def.validate(Scope::Singleton),
      Err(Error::InvalidConfiguration(_))
    ));
    assert!(def.validate(Scope::Param).is_ok());
  }

  #[test]
  fn empty_ids_are_rejected() {
    let def = Definition::new("", "app::Thing");
    assert!(def.validate(Scope::Factory).is_err());
  }

  #[test]
  fn args_keep_insertion_order() {
    let def = Definition::new("svc", "app::Svc")
      .arg("b", 2)
      .arg_ref("a", "other");
    let names: Vec<_> = def.args().keys().cloned().collect();
    assert_eq!(names, vec!["b".to_string(), "a".to_string()]);
    assert_eq!(def.args()["a"], Expr::Ref("other".into()));
  }
}
