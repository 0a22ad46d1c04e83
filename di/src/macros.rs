//! Public macros for ergonomic service resolution.

/// Resolves a service from the global resolver as an `Arc<T>`.
///
/// Without an id the type's own name, `std::any::type_name::<T>()`, is looked up.
///
/// # Panics
///
/// Panics if the service cannot be resolved or is not a `T`. For a non-panicking
/// version, use [`maybe_resolve!`] or `global().get_as(...)` directly.
///
/// # Examples
///
/// ```
/// use fibre_di::{catalog, global, resolve, Definition, Reflect, Scope, TypeInfo};
///
/// #[derive(Default)]
/// struct Clock;
///
/// impl Reflect for Clock {
///   fn type_info() -> TypeInfo {
///     TypeInfo::builder::<Clock>().default_constructor().build()
///   }
/// }
///
/// catalog().register::<Clock>();
/// global().register(Scope::Singleton, Definition::of::<Clock>()).unwrap();
/// global().register(Scope::Alias, Definition::alias("clock", std::any::type_name::<Clock>())).unwrap();
///
/// let clock = resolve!(Clock);
/// let same = resolve!(Clock, "clock");
/// assert!(std::sync::Arc::ptr_eq(&clock, &same));
/// ```
#[macro_export]
macro_rules! resolve {
  ($type:ty) => {
    $crate::resolve!($type, ::std::any::type_name::<$type>())
  };

  ($type:ty, $id:expr) => {
    {
      let id: &str = &$id;
      match $crate::global().get_as::<::std::sync::Arc<$type>>(id) {
        Ok(service) => service,
        Err(err) => panic!(
          "Failed to resolve required service '{}' as {}: {}",
          id,
          ::std::any::type_name::<$type>(),
          err
        ),
      }
    }
  };
}

/// Like [`resolve!`], but yields `None` when the service is missing, fails to build, or has
/// another type.
#[macro_export]
macro_rules! maybe_resolve {
  ($type:ty) => {
    $crate::maybe_resolve!($type, ::std::any::type_name::<$type>())
  };

  ($type:ty, $id:expr) => {
    $crate::global()
      .get_as::<::std::sync::Arc<$type>>(&$id)
      .ok()
  };
}

/// Resolves from an explicit resolver instead of the global one. Panics like [`resolve!`].
#[macro_export]
macro_rules! resolve_from {
  ($resolver:expr, $type:ty) => {
    $crate::resolve_from!($resolver, $type, ::std::any::type_name::<$type>())
  };

  ($resolver:expr, $type:ty, $id:expr) => {
    {
      let id: &str = &$id;
      match $resolver.get_as::<::std::sync::Arc<$type>>(id) {
        Ok(service) => service,
        Err(err) => panic!(
          "Failed to resolve required service '{}' as {}: {}",
          id,
          ::std::any::type_name::<$type>(),
          err
        ),
      }
    }
  };
}
