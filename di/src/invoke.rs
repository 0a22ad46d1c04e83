//! Bound argument lists and injectable callables.

use crate::error::{Error, Result};
use crate::reflect::Parameter;
use crate::value::{Expr, FromValue, Value};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Explicit values for `invoke_function` / `invoke_method`, keyed by parameter name.
pub type Overrides = IndexMap<String, Expr>;

/// The values bound to a parameter list, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
  values: IndexMap<String, Value>,
}

impl Arguments {
  pub fn new() -> Self {
    Self::default()
  }

  pub(crate) fn with_capacity(capacity: usize) -> Self {
    Self {
      values: IndexMap::with_capacity(capacity),
    }
  }

  pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
    self.values.insert(name.into(), value.into());
  }

  /// Removes the argument and converts it.
  pub fn take<T: FromValue>(&mut self, name: &str) -> Result<T> {
    let value = self
      .values
      .shift_remove(name)
      .ok_or_else(|| Error::MissingArgument(name.to_owned()))?;
    convert(name, value)
  }

  /// Converts a copy of the argument, leaving it bound.
  pub fn get<T: FromValue>(&self, name: &str) -> Result<T> {
    let value = self
      .values
      .get(name)
      .cloned()
      .ok_or_else(|| Error::MissingArgument(name.to_owned()))?;
    convert(name, value)
  }

  pub fn value(&self, name: &str) -> Option<&Value> {
    self.values.get(name)
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
    self.values.iter().map(|(k, v)| (k.as_str(), v))
  }
}

pub(crate) fn convert<T: FromValue>(name: &str, value: Value) -> Result<T> {
  T::from_value(value).map_err(|found| Error::ArgumentMismatch {
    name: name.to_owned(),
    expected: T::expected(),
    found: found.type_label(),
  })
}

type Body = Arc<dyn Fn(&mut Arguments) -> Result<Value> + Send + Sync>;

/// A free function whose parameters the resolver can fill in.
#[derive(Clone)]
pub struct Callable {
  params: Vec<Parameter>,
  body: Body,
}

impl Callable {
  pub fn new(
    params: impl IntoIterator<Item = Parameter>,
    body: impl Fn(&mut Arguments) -> Result<Value> + Send + Sync + 'static,
  ) -> Self {
    Self {
      params: params.into_iter().collect(),
      body: Arc::new(body),
    }
  }

  pub fn params(&self) -> &[Parameter] {
    &self.params
  }

  pub(crate) fn call(&self, mut args: Arguments) -> Result<Value> {
    (self.body)(&mut args)
  }
}

impl fmt::Debug for Callable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Callable")
      .field("params", &self.params)
      .finish_non_exhaustive()
  }
}
