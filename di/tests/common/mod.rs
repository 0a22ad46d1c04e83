//! Shared fixtures: a small set of reflected types and resolver constructors.
#![allow(dead_code)]

use fibre_di::{
  Attribute, InjectorMode, Parameter, Reflect, Resolver, ResolverConfig, ScopeMarker, TypeCatalog,
  TypeInfo, TypeKind, Value,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// Class name of an interface-like type known to the catalog.
pub const STORE: &str = "app::Store";

pub fn name_of<T: ?Sized + 'static>() -> &'static str {
  std::any::type_name::<T>()
}

// --- Config-bound services ---

pub struct Cart {
  pub cookies: Vec<String>,
}

impl Reflect for Cart {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<Cart>()
      .constructor([Parameter::dynamic("cookies")], |args| {
        Ok(Cart {
          cookies: args.take("cookies")?,
        })
      })
      .build()
  }
}

#[derive(Clone, Default)]
pub struct User {
  pub name: String,
  pub tags: Arc<Mutex<Vec<String>>>,
}

impl Reflect for User {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<User>()
      .default_constructor()
      .setter("set_name", |user: &mut User, name: String| user.name = name)
      .cloneable()
      .build()
  }
}

#[derive(Default)]
pub struct UserSvc;

impl Reflect for UserSvc {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<UserSvc>().default_constructor().build()
  }
}

#[derive(Default)]
pub struct Profile {
  pub user_name: String,
}

impl Reflect for Profile {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<Profile>()
      .default_constructor()
      .setter("set_user_name", |p: &mut Profile, v: String| p.user_name = v)
      .build()
  }
}

/// Same shape as `Profile`, without any setter.
#[derive(Default)]
pub struct Sealed;

impl Reflect for Sealed {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<Sealed>().default_constructor().build()
  }
}

// --- Dependency chains ---

#[derive(Default)]
pub struct C;

impl Reflect for C {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<C>().default_constructor().build()
  }
}

pub struct B {
  pub c: Arc<C>,
}

impl Reflect for B {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<B>()
      .constructor([Parameter::of::<C>("c")], |args| Ok(B { c: args.take("c")? }))
      .build()
  }
}

pub struct A {
  pub b: Arc<B>,
}

impl Reflect for A {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<A>()
      .constructor([Parameter::of::<B>("b")], |args| Ok(A { b: args.take("b")? }))
      .build()
  }
}

#[derive(Default)]
pub struct Y;

impl Reflect for Y {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<Y>().default_constructor().build()
  }
}

pub struct X {
  pub y: Arc<Y>,
}

impl Reflect for X {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<X>()
      .constructor([Parameter::of::<Y>("y")], |args| Ok(X { y: args.take("y")? }))
      .build()
  }
}

pub struct Left {
  pub right: Arc<Right>,
}

impl Reflect for Left {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<Left>()
      .constructor([Parameter::of::<Right>("right")], |args| {
        Ok(Left {
          right: args.take("right")?,
        })
      })
      .build()
  }
}

pub struct Right {
  pub left: Arc<Left>,
}

impl Reflect for Right {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<Right>()
      .constructor([Parameter::of::<Left>("left")], |args| {
        Ok(Right {
          left: args.take("left")?,
        })
      })
      .build()
  }
}

/// Takes a while to build, widening the window for concurrent lookups.
pub struct Slow;

impl Reflect for Slow {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<Slow>()
      .constructor([], |_| {
        std::thread::sleep(std::time::Duration::from_millis(50));
        Ok(Slow)
      })
      .build()
  }
}

pub struct Ping {
  pub slow: Arc<Slow>,
  pub pong: Arc<Pong>,
}

impl Reflect for Ping {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<Ping>()
      .constructor(
        [Parameter::of::<Slow>("slow"), Parameter::of::<Pong>("pong")],
        |args| {
          Ok(Ping {
            slow: args.take("slow")?,
            pong: args.take("pong")?,
          })
        },
      )
      .build()
  }
}

pub struct Pong {
  pub slow: Arc<Slow>,
  pub ping: Arc<Ping>,
}

impl Reflect for Pong {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<Pong>()
      .constructor(
        [Parameter::of::<Slow>("slow"), Parameter::of::<Ping>("ping")],
        |args| {
          Ok(Pong {
            slow: args.take("slow")?,
            ping: args.take("ping")?,
          })
        },
      )
      .build()
  }
}

/// Depends on a type nobody describes.
pub struct Broken;

impl Reflect for Broken {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<Broken>()
      .constructor([Parameter::named("gadget", "app::Gadget")], |_| Ok(Broken))
      .build()
  }
}

// --- Binding precedence ---

pub struct Pager {
  pub size: i64,
}

impl Reflect for Pager {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<Pager>()
      .constructor([Parameter::of::<i64>("size").with_default(10)], |args| {
        Ok(Pager {
          size: args.take("size")?,
        })
      })
      .build()
  }
}

pub struct Mailer {
  pub transport: String,
}

impl Reflect for Mailer {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<Mailer>()
      .constructor([Parameter::dynamic("transport")], |args| {
        Ok(Mailer {
          transport: args.take("transport")?,
        })
      })
      .build()
  }
}

pub struct Notifier {
  pub mailer: Arc<Mailer>,
}

impl Reflect for Notifier {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<Notifier>()
      .constructor([Parameter::of::<Mailer>("mailer")], |args| {
        Ok(Notifier {
          mailer: args.take("mailer")?,
        })
      })
      .build()
  }
}

#[derive(Default)]
pub struct Hidden;

impl Reflect for Hidden {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<Hidden>()
      .default_constructor()
      .private_constructor()
      .build()
  }
}

// --- Invocation ---

pub struct Greeter {
  pub greeting: String,
}

impl Reflect for Greeter {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<Greeter>()
      .constructor([Parameter::dynamic("greeting").with_default("Hello")], |args| {
        Ok(Greeter {
          greeting: args.take("greeting")?,
        })
      })
      .method(
        "greet",
        [
          Parameter::dynamic("name"),
          Parameter::dynamic("punctuation").with_default("!"),
        ],
        |greeter, args| {
          let name: String = args.take("name")?;
          let punctuation: String = args.take("punctuation")?;
          Ok(Value::from(format!("{}, {}{}", greeter.greeting, name, punctuation)))
        },
      )
      .build()
  }
}

// --- Scope markers and attributes ---

#[derive(Default)]
pub struct SharedMarked;

impl Reflect for SharedMarked {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<SharedMarked>()
      .default_constructor()
      .marker(ScopeMarker::SingletonAware)
      .build()
  }
}

#[derive(Default, Clone)]
pub struct PrototypeMarked {
  pub hits: u32,
}

impl Reflect for PrototypeMarked {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<PrototypeMarked>()
      .default_constructor()
      .cloneable()
      .marker(ScopeMarker::PrototypeAware)
      .build()
  }
}

/// Carries both markers; the factory one is listed first but loses to prototype.
#[derive(Default, Clone)]
pub struct FactoryMarked;

impl Reflect for FactoryMarked {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<FactoryMarked>()
      .default_constructor()
      .cloneable()
      .marker(ScopeMarker::FactoryAware)
      .marker(ScopeMarker::PrototypeAware)
      .build()
  }
}

#[derive(Default)]
pub struct Plain;

impl Reflect for Plain {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<Plain>().default_constructor().build()
  }
}

#[derive(Default)]
pub struct Annotated;

impl Reflect for Annotated {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<Annotated>()
      .default_constructor()
      .attribute(Attribute::singleton().with_id("annotated"))
      .attribute(Attribute::Other("serde::Serialize".to_owned()))
      .build()
  }
}

#[derive(Default)]
pub struct AnnotatedFactory;

impl Reflect for AnnotatedFactory {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<AnnotatedFactory>()
      .default_constructor()
      .attribute(Attribute::factory())
      .build()
  }
}

// --- Resolver constructors ---

/// A catalog describing every fixture above.
pub fn catalog() -> Arc<TypeCatalog> {
  let catalog = TypeCatalog::new();
  catalog
    .register::<Cart>()
    .register::<User>()
    .register::<UserSvc>()
    .register::<Profile>()
    .register::<Sealed>()
    .register::<A>()
    .register::<B>()
    .register::<C>()
    .register::<X>()
    .register::<Y>()
    .register::<Left>()
    .register::<Right>()
    .register::<Slow>()
    .register::<Ping>()
    .register::<Pong>()
    .register::<Broken>()
    .register::<Pager>()
    .register::<Mailer>()
    .register::<Notifier>()
    .register::<Hidden>()
    .register::<Greeter>()
    .register::<SharedMarked>()
    .register::<PrototypeMarked>()
    .register::<FactoryMarked>()
    .register::<Plain>()
    .register::<Annotated>()
    .register::<AnnotatedFactory>()
    .register_with(STORE, || TypeInfo::abstract_type(STORE, TypeKind::Interface));
  Arc::new(catalog)
}

/// A resolver in config-file mode with default settings.
pub fn resolver() -> Resolver {
  Resolver::new(catalog())
}

pub fn auto_resolver() -> Resolver {
  Resolver::with_config(
    catalog(),
    ResolverConfig {
      mode: InjectorMode::AutoRegister,
      ..ResolverConfig::default()
    },
  )
  .expect("valid config")
}
