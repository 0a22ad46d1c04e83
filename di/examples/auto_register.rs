use fibre_di::{
  InjectorMode, Parameter, Reflect, Resolver, ResolverConfig, ScopeMarker, TypeCatalog, TypeInfo,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

static CONNECTIONS: AtomicUsize = AtomicUsize::new(0);

struct Database {
  id: usize,
}

impl Reflect for Database {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<Database>()
      .constructor([], |_| {
        println!("Opening a database connection...");
        Ok(Database {
          id: CONNECTIONS.fetch_add(1, Ordering::SeqCst),
        })
      })
      .marker(ScopeMarker::SingletonAware)
      .build()
  }
}

struct Request {
  db: Arc<Database>,
}

impl Reflect for Request {
  fn type_info() -> TypeInfo {
    TypeInfo::builder::<Request>()
      .constructor([Parameter::of::<Database>("db")], |args| {
        Ok(Request { db: args.take("db")? })
      })
      .marker(ScopeMarker::FactoryAware)
      .build()
  }
}

fn main() -> fibre_di::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter("fibre_di=trace")
    .init();

  let catalog = Arc::new(TypeCatalog::new());
  catalog.register::<Database>().register::<Request>();
  let resolver = Resolver::with_config(
    catalog,
    ResolverConfig {
      mode: InjectorMode::AutoRegister,
      ..ResolverConfig::default()
    },
  )?;

  // Nothing is registered up front; both types are registered on first use.
  let r1: Arc<Request> = resolver.get_as(std::any::type_name::<Request>())?;
  let r2: Arc<Request> = resolver.get_as(std::any::type_name::<Request>())?;

  println!("Request 1 uses connection {}, request 2 uses connection {}", r1.db.id, r2.db.id);
  assert!(!Arc::ptr_eq(&r1, &r2));
  assert!(Arc::ptr_eq(&r1.db, &r2.db));
  assert_eq!(CONNECTIONS.load(Ordering::SeqCst), 1);
  Ok(())
}
