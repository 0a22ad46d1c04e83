//! Constructor binding precedence and instantiation failures.

mod common;

use common::*;
use fibre_di::{Definition, Error, Expr, InjectorMode, Scope};
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[test]
fn test_explicit_argument_beats_default() {
  let resolver = resolver();
  resolver
    .register(Scope::Factory, Definition::of::<Pager>().arg("size", 25))
    .unwrap();

  let pager: Arc<Pager> = resolver.get_as(name_of::<Pager>()).unwrap();

  assert_eq!(pager.size, 25);
}

#[test]
fn test_default_is_used_without_an_argument() {
  let resolver = resolver();
  // A registry entry named like the parameter must not override the default.
  resolver
    .register(Scope::Param, Definition::with_value("size", 99))
    .unwrap();
  resolver
    .register(Scope::Factory, Definition::of::<Pager>())
    .unwrap();

  let pager: Arc<Pager> = resolver.get_as(name_of::<Pager>()).unwrap();

  assert_eq!(pager.size, 10);
}

#[test]
fn test_registry_by_name_binds_untyped_parameters() {
  let resolver = resolver();
  resolver
    .register(Scope::Param, Definition::with_value("transport", "smtp"))
    .unwrap();
  resolver
    .register(Scope::Singleton, Definition::of::<Mailer>())
    .unwrap();

  let mailer: Arc<Mailer> = resolver.get_as(name_of::<Mailer>()).unwrap();

  assert_eq!(mailer.transport, "smtp");
}

#[test]
fn test_registry_by_name_beats_registry_by_type() {
  // Arrange
  let resolver = resolver();
  resolver
    .register(Scope::Singleton, Definition::of::<Mailer>().arg("transport", "smtp"))
    .unwrap();
  resolver
    .register(
      Scope::Singleton,
      Definition::new("mailer", name_of::<Mailer>()).arg("transport", "sms"),
    )
    .unwrap();
  resolver
    .register(Scope::Singleton, Definition::of::<Notifier>())
    .unwrap();

  // Act
  let notifier: Arc<Notifier> = resolver.get_as(name_of::<Notifier>()).unwrap();
  let by_id: Arc<Mailer> = resolver.get_as("mailer").unwrap();

  // Assert
  assert_eq!(notifier.mailer.transport, "sms");
  assert!(Arc::ptr_eq(&notifier.mailer, &by_id));
}

#[test]
fn test_registry_by_type_binds_typed_parameters() {
  let resolver = resolver();
  resolver
    .register(Scope::Singleton, Definition::of::<Mailer>().arg("transport", "smtp"))
    .unwrap();
  resolver
    .register(Scope::Factory, Definition::of::<Notifier>())
    .unwrap();

  let n1: Arc<Notifier> = resolver.get_as(name_of::<Notifier>()).unwrap();
  let n2: Arc<Notifier> = resolver.get_as(name_of::<Notifier>()).unwrap();

  assert!(!Arc::ptr_eq(&n1, &n2));
  assert!(Arc::ptr_eq(&n1.mailer, &n2.mailer));
}

#[test]
fn test_reference_argument_resolves_through_the_registry() {
  let resolver = resolver();
  resolver
    .register(Scope::Param, Definition::with_value("page.size", 40))
    .unwrap();
  resolver
    .register(
      Scope::Factory,
      Definition::of::<Pager>().arg_expr("size", Expr::parse_marked("@page.size")),
    )
    .unwrap();

  let pager: Arc<Pager> = resolver.get_as(name_of::<Pager>()).unwrap();

  assert_eq!(pager.size, 40);
}

#[test]
fn test_untyped_parameter_without_binding_fails() {
  let resolver = resolver();
  resolver
    .register(Scope::Singleton, Definition::of::<Mailer>())
    .unwrap();

  let err = resolver.get(name_of::<Mailer>()).unwrap_err();

  assert!(matches!(err, Error::UnknownTypeForParameter(name) if name == "transport"));
}

#[test]
fn test_wrong_argument_type_is_a_mismatch() {
  let resolver = resolver();
  resolver
    .register(Scope::Factory, Definition::of::<Pager>().arg("size", "ten"))
    .unwrap();

  let err = resolver.get(name_of::<Pager>()).unwrap_err();

  assert!(matches!(
    err,
    Error::ArgumentMismatch { ref name, found: "string", .. } if name == "size"
  ));
}

#[test]
fn test_auto_register_binds_unregistered_types() {
  let resolver = auto_resolver();
  resolver
    .register(Scope::Factory, Definition::of::<X>())
    .unwrap();

  let x: Arc<X> = resolver.get_as(name_of::<X>()).unwrap();
  let y: Arc<Y> = resolver.get_as(name_of::<Y>()).unwrap();

  assert!(Arc::ptr_eq(&x.y, &y));
}

#[test]
fn test_failed_auto_registration_leaves_no_entry() {
  let resolver = auto_resolver();

  let err = resolver.get(name_of::<Broken>()).unwrap_err();

  assert!(matches!(err, Error::ClassNotFound(class) if class == "app::Gadget"));
  assert!(!resolver.has(name_of::<Broken>()));
  assert!(resolver.services().is_empty());
}

#[test]
fn test_mode_can_be_switched_at_runtime() {
  let resolver = resolver();
  assert!(resolver.get_optional(name_of::<C>()).unwrap().is_none());

  resolver.set_mode(InjectorMode::AutoRegister);

  assert!(resolver.get_optional(name_of::<C>()).unwrap().is_some());
  assert!(resolver.has(name_of::<C>()));
}

// --- Instantiation failures ---

#[test]
fn test_unknown_class_is_rejected_at_registration() {
  let resolver = resolver();

  let err = resolver
    .register(Scope::Singleton, Definition::new("ghost", "app::Ghost"))
    .unwrap_err();

  assert!(matches!(err, Error::ClassNotFound(class) if class == "app::Ghost"));
  assert!(!resolver.has("ghost"));
}

#[test]
fn test_non_instantiable_types_fail_on_resolution() {
  let resolver = resolver();
  resolver
    .register(Scope::Singleton, Definition::new("store", STORE))
    .unwrap();
  resolver
    .register(Scope::Singleton, Definition::of::<Hidden>())
    .unwrap();

  let store = resolver.get("store").unwrap_err();
  let hidden = resolver.get(name_of::<Hidden>()).unwrap_err();

  assert!(matches!(store, Error::ServiceConfiguration { ref class, .. } if class == STORE));
  assert!(matches!(
    hidden,
    Error::ServiceConfiguration { ref reason, .. } if reason.contains("private")
  ));
}

#[test]
fn test_prototype_requires_a_copyable_type() {
  let resolver = resolver();

  let err = resolver
    .register(Scope::Prototype, Definition::of::<UserSvc>())
    .unwrap_err();

  assert!(matches!(err, Error::ServiceConfiguration { .. }));
}

#[test]
fn test_instantiate_does_not_register() {
  let resolver = resolver();
  let definition = Definition::new("adhoc", name_of::<Pager>()).arg("size", 3);

  let instance = resolver.instantiate(&definition).unwrap();

  assert_eq!(instance.class(), name_of::<Pager>());
  assert_eq!(instance.downcast_ref::<Pager>().map(|p| p.size), Some(3));
  assert!(!resolver.has("adhoc"));
}
