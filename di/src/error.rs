use thiserror::Error;

/// The error type for every fallible container operation.
#[derive(Debug, Error)]
pub enum Error {
  #[error("Unknown scope `{0}`")]
  UnknownScope(String),

  #[error("Service id `{0}` is already registered")]
  DuplicateId(String),

  #[error("Service `{0}` not found")]
  ServiceNotFound(String),

  #[error("Class `{0}` not found")]
  ClassNotFound(String),

  #[error("Invalid configuration: {0}")]
  InvalidConfiguration(String),

  #[error("Service `{class}` cannot be instantiated: {reason}")]
  ServiceConfiguration { class: String, reason: String },

  #[error("Type `{class}` has no setter `{setter}` for parameter `{param}`")]
  ServiceParameterNotFound {
    class: String,
    param: String,
    setter: String,
  },

  #[error("Parameter `{0}` has no declared type and nothing is registered under its name")]
  UnknownTypeForParameter(String),

  #[error("Alias `{0}` does not point to a service id")]
  InvalidAlias(String),

  #[error("Abstract type `{0}` cannot be used as a service definition")]
  AbstractClassAsDefinition(String),

  #[error("Resolution cycle detected: {}", .0.join(" -> "))]
  ResolutionCycle(Vec<String>),

  #[error("Method `{method}` not found on `{class}`")]
  MethodNotFound { class: String, method: String },

  #[error("Argument `{name}` expected {expected}, found {found}")]
  ArgumentMismatch {
    name: String,
    expected: &'static str,
    found: &'static str,
  },

  #[error("Argument `{0}` was not bound")]
  MissingArgument(String),
}

impl Error {
  pub(crate) fn not_instantiable(class: &str, reason: impl Into<String>) -> Self {
    Error::ServiceConfiguration {
      class: class.to_owned(),
      reason: reason.into(),
    }
  }
}

/// A specialized `Result` type for `fibre_di` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
