//! # Fibre DI
//!
//! A reflective, definition-driven dependency-injection container for Rust.
//!
//! Services are described by [`Definition`]s and registered under a [`Scope`] that decides
//! their lifecycle: singleton, factory, prototype, alias or plain parameter. Resolving an id
//! builds the object through its [`TypeInfo`] record, binding every constructor parameter from
//! an explicit argument, its default, or the registry, and then applying setters.
//!
//! Type records come from a [`TypeInfoSource`]. The stock [`TypeCatalog`] is filled by types
//! implementing [`Reflect`].
//!
//! ## Quick Start
//!
//! ```
//! use fibre_di::{Parameter, Resolver, TypeCatalog, TypeInfo};
//! use std::sync::Arc;
//!
//! struct Cart {
//!   cookies: Vec<String>,
//! }
//!
//! let catalog = Arc::new(TypeCatalog::new());
//! catalog.register_with("shop::Cart", || {
//!   TypeInfo::builder::<Cart>()
//!     .constructor([Parameter::dynamic("cookies")], |args| {
//!       Ok(Cart { cookies: args.take("cookies")? })
//!     })
//!     .build()
//! });
//!
//! let resolver = Resolver::new(catalog);
//! resolver
//!   .load_json(&serde_json::json!({
//!     "param": { "cookies": ["a", "b"] },
//!     "singleton": [["shop::Cart", { "args": { "cookies": "@cookies" } }]]
//!   }))
//!   .unwrap();
//!
//! let cart: Arc<Cart> = resolver.get_as("shop::Cart").unwrap();
//! assert_eq!(cart.cookies, vec!["a", "b"]);
//! assert!(Arc::ptr_eq(&cart, &resolver.get_as::<Arc<Cart>>("shop::Cart").unwrap()));
//! ```

mod attributes;
mod cache;
mod config;
mod core;
mod definition;
mod error;
mod global;
mod invoke;
mod macros;
mod provider;
mod reflect;
mod registry;
mod resolver;
mod value;

pub use attributes::{Attribute, AttributeParser};
pub use cache::ReflectionCache;
pub use config::{ConfigTree, InjectorMode, ResolverConfig};
pub use definition::{Definition, Scope};
pub use error::{Error, Result};
pub use global::{catalog, global};
pub use invoke::{Arguments, Callable, Overrides};
pub use provider::Provider;
pub use reflect::{
  setter_name, Constructor, Method, ParamType, Parameter, Reflect, ScopeMarker, TypeCatalog,
  TypeInfo, TypeInfoBuilder, TypeInfoSource, TypeKind,
};
pub use registry::{CollisionPolicy, Registry};
pub use resolver::{Resolver, ServiceSummary};
pub use value::{Expr, FromValue, Instance, Value, MARKER_PREFIX};
