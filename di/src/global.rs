//! The process-wide resolver and its type catalog.

use crate::reflect::TypeCatalog;
use crate::resolver::Resolver;
use once_cell::sync::Lazy;
use std::sync::Arc;

// Both are created on first access in a thread-safe manner and live for the whole process.
static GLOBAL_CATALOG: Lazy<Arc<TypeCatalog>> = Lazy::new(|| Arc::new(TypeCatalog::new()));
static GLOBAL_RESOLVER: Lazy<Resolver> = Lazy::new(|| {
  let catalog: Arc<TypeCatalog> = Arc::clone(&GLOBAL_CATALOG);
  Resolver::new(catalog)
});

/// Provides a reference to the global resolver.
///
/// Meant for the outermost entry point of an application; libraries should take a
/// `&Resolver` instead. Its state can be reset with [`Resolver::clear`].
///
/// # Examples
///
/// ```
/// use fibre_di::{global, Definition, Scope};
///
/// global()
///   .register(Scope::Param, Definition::with_value("greeting", "Hello from global!"))
///   .unwrap();
/// assert_eq!(global().get_as::<String>("greeting").unwrap(), "Hello from global!");
/// ```
pub fn global() -> &'static Resolver {
  &GLOBAL_RESOLVER
}

/// The type catalog backing [`global()`]. Types registered here become resolvable by it.
pub fn catalog() -> &'static TypeCatalog {
  &GLOBAL_CATALOG
}
