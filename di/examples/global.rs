use fibre_di::{catalog, global, maybe_resolve, resolve, Definition, Reflect, Scope, TypeInfo};

#[derive(Default, Clone)]
struct Session {
  user: String,
}

impl Reflect for Session {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<Session>()
      .default_constructor()
      .setter("set_user", |s: &mut Session, user: String| s.user = user)
      .cloneable()
      .build()
  }
}

fn main() -> fibre_di::Result<()> {
  catalog().register::<Session>();
  global().register(
    Scope::Prototype,
    Definition::new("session", std::any::type_name::<Session>()).param("user", "guest"),
  )?;

  let s1 = resolve!(Session, "session");
  let s2 = resolve!(Session, "session");
  println!("Two sessions for {} and {}", s1.user, s2.user);
  assert!(!std::sync::Arc::ptr_eq(&s1, &s2));

  assert!(maybe_resolve!(Session).is_none());
  println!("`Session` itself is not registered; only the `session` id is.");
  Ok(())
}
