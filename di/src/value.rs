//! Values that flow through argument binding, and the object handles the container hands out.

use indexmap::IndexMap;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// The sigil that marks a configuration string as a reference to another service id.
pub const MARKER_PREFIX: char = '@';

/// A shared handle to a constructed service object.
///
/// Cloning an `Instance` clones the handle, not the object. Two handles are equal when
/// they point at the same object.
#[derive(Clone)]
pub struct Instance {
  class: Arc<str>,
  object: Arc<dyn Any + Send + Sync>,
}

impl Instance {
  /// Wraps an already-built object. `class` is the name the object's type is known by.
  pub fn new<T: Any + Send + Sync>(class: impl Into<Arc<str>>, object: T) -> Self {
    Self {
      class: class.into(),
      object: Arc::new(object),
    }
  }

  pub(crate) fn from_parts(class: Arc<str>, object: Arc<dyn Any + Send + Sync>) -> Self {
    Self { class, object }
  }

  /// The class name this object was built from.
  pub fn class(&self) -> &str {
    &self.class
  }

  pub(crate) fn class_arc(&self) -> Arc<str> {
    Arc::clone(&self.class)
  }

  /// Returns a typed, shared pointer to the object if it is a `T`.
  pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
    Arc::clone(&self.object).downcast::<T>().ok()
  }

  /// Consumes the handle. When this was the last handle, the returned `Arc` is unique.
  pub fn into_downcast<T: Any + Send + Sync>(self) -> Result<Arc<T>, Self> {
    let class = self.class;
    self
      .object
      .downcast::<T>()
      .map_err(|object| Self { class, object })
  }

  pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
    self.object.downcast_ref::<T>()
  }

  pub(crate) fn as_any(&self) -> &(dyn Any + Send + Sync) {
    &*self.object
  }

  /// Identity comparison.
  pub fn ptr_eq(&self, other: &Instance) -> bool {
    Arc::ptr_eq(&self.object, &other.object)
  }
}

impl PartialEq for Instance {
  fn eq(&self, other: &Self) -> bool {
    self.ptr_eq(other)
  }
}

impl fmt::Debug for Instance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "Instance({} @ {:p})",
      self.class,
      Arc::as_ptr(&self.object) as *const ()
    )
  }
}

/// A dynamically-typed value: a configuration literal or a resolved service.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
  #[default]
  Null,
  Bool(bool),
  Int(i64),
  Float(f64),
  Str(String),
  List(Vec<Value>),
  Map(IndexMap<String, Value>),
  Object(Instance),
}

impl Value {
  /// Builds an object value out of a plain Rust value.
  pub fn object<T: Any + Send + Sync>(object: T) -> Self {
    Value::Object(Instance::new(std::any::type_name::<T>(), object))
  }

  pub fn type_label(&self) -> &'static str {
    match self {
      Value::Null => "null",
      Value::Bool(_) => "bool",
      Value::Int(_) => "int",
      Value::Float(_) => "float",
      Value::Str(_) => "string",
      Value::List(_) => "list",
      Value::Map(_) => "map",
      Value::Object(_) => "object",
    }
  }

  pub fn is_null(&self) -> bool {
    matches!(self, Value::Null)
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::Str(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_instance(&self) -> Option<&Instance> {
    match self {
      Value::Object(instance) => Some(instance),
      _ => None,
    }
  }

  /// Shortcut for `as_instance()` followed by a typed downcast.
  pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
    self.as_instance().and_then(Instance::downcast::<T>)
  }
}

macro_rules! value_from_int {
  ($($int:ty),*) => {
    $(
      impl From<$int> for Value {
        fn from(value: $int) -> Self {
          Value::Int(i64::from(value))
        }
      }
    )*
  };
}

value_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
  fn from(value: bool) -> Self {
    Value::Bool(value)
  }
}

impl From<f64> for Value {
  fn from(value: f64) -> Self {
    Value::Float(value)
  }
}

impl From<&str> for Value {
  fn from(value: &str) -> Self {
    Value::Str(value.to_owned())
  }
}

impl From<String> for Value {
  fn from(value: String) -> Self {
    Value::Str(value)
  }
}

impl From<Instance> for Value {
  fn from(value: Instance) -> Self {
    Value::Object(value)
  }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
  fn from(values: Vec<T>) -> Self {
    Value::List(values.into_iter().map(Into::into).collect())
  }
}

impl<T: Into<Value>> From<IndexMap<String, T>> for Value {
  fn from(entries: IndexMap<String, T>) -> Self {
    Value::Map(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
  }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(value: Option<T>) -> Self {
    value.map_or(Value::Null, Into::into)
  }
}

impl From<&serde_json::Value> for Value {
  fn from(json: &serde_json::Value) -> Self {
    match json {
      serde_json::Value::Null => Value::Null,
      serde_json::Value::Bool(b) => Value::Bool(*b),
      serde_json::Value::Number(n) => match n.as_i64() {
        Some(i) => Value::Int(i),
        None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
      },
      serde_json::Value::String(s) => Value::Str(s.clone()),
      serde_json::Value::Array(items) => Value::List(items.iter().map(Value::from).collect()),
      serde_json::Value::Object(entries) => Value::Map(
        entries
          .iter()
          .map(|(k, v)| (k.clone(), Value::from(v)))
          .collect(),
      ),
    }
  }
}

/// A value expression inside a definition: either a literal, or a reference to another
/// service id that is looked up at binding time.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
  Literal(Value),
  Ref(String),
}

impl Expr {
  pub fn literal(value: impl Into<Value>) -> Self {
    Expr::Literal(value.into())
  }

  pub fn reference(id: impl Into<String>) -> Self {
    Expr::Ref(id.into())
  }

  /// Reads a configuration string: `@id` is a reference, `@@text` is the literal `@text`.
  pub fn parse_marked(raw: &str) -> Self {
    match raw.strip_prefix(MARKER_PREFIX) {
      Some(rest) if rest.starts_with(MARKER_PREFIX) => Expr::Literal(Value::Str(rest.to_owned())),
      Some(rest) => Expr::Ref(rest.to_owned()),
      None => Expr::Literal(Value::Str(raw.to_owned())),
    }
  }
}

impl From<Value> for Expr {
  fn from(value: Value) -> Self {
    Expr::Literal(value)
  }
}

/// Conversion from a bound [`Value`] into the Rust type a constructor, setter or method wants.
///
/// On mismatch the original value is handed back so the caller can report what it found.
pub trait FromValue: Sized {
  /// Human-readable name of what this conversion accepts.
  fn expected() -> &'static str;

  fn from_value(value: Value) -> Result<Self, Value>;
}

impl FromValue for Value {
  fn expected() -> &'static str {
    "any value"
  }

  fn from_value(value: Value) -> Result<Self, Value> {
    Ok(value)
  }
}

impl FromValue for bool {
  fn expected() -> &'static str {
    "bool"
  }

  fn from_value(value: Value) -> Result<Self, Value> {
    match value {
      Value::Bool(b) => Ok(b),
      other => Err(other),
    }
  }
}

macro_rules! int_from_value {
  ($($int:ty),*) => {
    $(
      impl FromValue for $int {
        fn expected() -> &'static str {
          stringify!($int)
        }

        fn from_value(value: Value) -> Result<Self, Value> {
          match value {
            Value::Int(i) => <$int>::try_from(i).map_err(|_| Value::Int(i)),
            other => Err(other),
          }
        }
      }
    )*
  };
}

int_from_value!(i32, i64, u16, u32, u64, usize);

impl FromValue for f64 {
  fn expected() -> &'static str {
    "float"
  }

  fn from_value(value: Value) -> Result<Self, Value> {
    match value {
      Value::Float(f) => Ok(f),
      Value::Int(i) => Ok(i as f64),
      other => Err(other),
    }
  }
}

impl FromValue for String {
  fn expected() -> &'static str {
    "string"
  }

  fn from_value(value: Value) -> Result<Self, Value> {
    match value {
      Value::Str(s) => Ok(s),
      other => Err(other),
    }
  }
}

impl<T: FromValue> FromValue for Vec<T> {
  fn expected() -> &'static str {
    "list"
  }

  fn from_value(value: Value) -> Result<Self, Value> {
    match value {
      Value::List(items) => items.into_iter().map(T::from_value).collect(),
      other => Err(other),
    }
  }
}

impl<T: FromValue> FromValue for IndexMap<String, T> {
  fn expected() -> &'static str {
    "map"
  }

  fn from_value(value: Value) -> Result<Self, Value> {
    match value {
      Value::Map(entries) => entries
        .into_iter()
        .map(|(key, item)| T::from_value(item).map(|v| (key, v)))
        .collect(),
      other => Err(other),
    }
  }
}

impl<T: FromValue> FromValue for Option<T> {
  fn expected() -> &'static str {
    T::expected()
  }

  fn from_value(value: Value) -> Result<Self, Value> {
    match value {
      Value::Null => Ok(None),
      other => T::from_value(other).map(Some),
    }
  }
}

impl FromValue for Instance {
  fn expected() -> &'static str {
    "object"
  }

  fn from_value(value: Value) -> Result<Self, Value> {
    match value {
      Value::Object(instance) => Ok(instance),
      other => Err(other),
    }
  }
}

impl<T: Any + Send + Sync> FromValue for Arc<T> {
  fn expected() -> &'static str {
    std::any::type_name::<T>()
  }

  fn from_value(value: Value) -> Result<Self, Value> {
    match value {
      Value::Object(instance) => instance.into_downcast::<T>().map_err(Value::Object),
      other => Err(other),
    }
  }
}
