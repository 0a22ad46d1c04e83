//! Type metadata standing in for runtime reflection.
//!
//! Rust has no runtime introspection, so every type the resolver may build describes itself
//! through a [`TypeInfo`]: its constructor parameters, setters, invocable methods, how to copy
//! it, and which scope markers and attributes it carries. A [`TypeInfoSource`] maps class
//! names to these records; [`TypeCatalog`] is the stock source.

use crate::attributes::Attribute;
use crate::error::{Error, Result};
use crate::invoke::{convert, Arguments};
use crate::value::{FromValue, Instance, Value};
use dashmap::DashMap;
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

type BuildFn = Arc<dyn Fn(Arguments) -> Result<Box<dyn Any + Send + Sync>> + Send + Sync>;
type SetterFn = Arc<dyn Fn(&mut (dyn Any + Send + Sync), Value) -> Result<()> + Send + Sync>;
type MethodFn = Arc<dyn Fn(&Instance, Arguments) -> Result<Value> + Send + Sync>;
type CopyFn = Arc<dyn Fn(&(dyn Any + Send + Sync)) -> Option<Box<dyn Any + Send + Sync>> + Send + Sync>;

/// The declared type of a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
  /// A named type; its name doubles as a registry id.
  Named(String),
  /// No declared type. Only explicit values, defaults and by-name lookups can bind it.
  Dynamic,
}

/// One constructor, method or function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
  name: String,
  ty: ParamType,
  default: Option<Value>,
}

impl Parameter {
  /// A parameter of declared type `T`.
  pub fn of<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
    Self::named(name, type_name::<T>())
  }

  pub fn named(name: impl Into<String>, type_name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ty: ParamType::Named(type_name.into()),
      default: None,
    }
  }

  pub fn dynamic(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ty: ParamType::Dynamic,
      default: None,
    }
  }

  pub fn with_default(mut self, value: impl Into<Value>) -> Self {
    self.default = Some(value.into());
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn ty(&self) -> &ParamType {
    &self.ty
  }

  pub fn default(&self) -> Option<&Value> {
    self.default.as_ref()
  }

  pub fn has_default(&self) -> bool {
    self.default.is_some()
  }
}

/// What kind of type a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
  Concrete,
  Abstract,
  Interface,
}

/// Capability markers consulted when a type is auto-registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeMarker {
  SingletonAware,
  PrototypeAware,
  FactoryAware,
}

#[derive(Clone)]
pub struct Constructor {
  params: Vec<Parameter>,
  public: bool,
  build: BuildFn,
}

impl Constructor {
  pub fn params(&self) -> &[Parameter] {
    &self.params
  }

  pub fn is_public(&self) -> bool {
    self.public
  }

  pub(crate) fn construct(&self, args: Arguments) -> Result<Box<dyn Any + Send + Sync>> {
    (self.build)(args)
  }
}

#[derive(Clone)]
pub struct Method {
  params: Vec<Parameter>,
  call: MethodFn,
}

impl Method {
  pub fn params(&self) -> &[Parameter] {
    &self.params
  }

  pub(crate) fn call(&self, target: &Instance, args: Arguments) -> Result<Value> {
    (self.call)(target, args)
  }
}

/// The reflection record of one type.
pub struct TypeInfo {
  name: String,
  kind: TypeKind,
  constructor: Option<Constructor>,
  setters: HashMap<String, SetterFn>,
  methods: HashMap<String, Method>,
  copier: Option<CopyFn>,
  markers: Vec<ScopeMarker>,
  attributes: Vec<Attribute>,
}

impl TypeInfo {
  /// Starts describing the concrete type `T`, named by `std::any::type_name::<T>()`.
  pub fn builder<T: Any + Send + Sync>() -> TypeInfoBuilder<T> {
    TypeInfoBuilder {
      info: Self::bare(type_name::<T>(), TypeKind::Concrete),
      _type: PhantomData,
    }
  }

  /// A record for a type that can never be instantiated, such as a trait.
  pub fn abstract_type(name: impl Into<String>, kind: TypeKind) -> Self {
    Self::bare(name, kind)
  }

  fn bare(name: impl Into<String>, kind: TypeKind) -> Self {
    Self {
      name: name.into(),
      kind,
      constructor: None,
      setters: HashMap::new(),
      methods: HashMap::new(),
      copier: None,
      markers: Vec::new(),
      attributes: Vec::new(),
    }
  }

  pub fn with_attribute(mut self, attribute: Attribute) -> Self {
    self.attributes.push(attribute);
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn kind(&self) -> TypeKind {
    self.kind
  }

  pub fn constructor(&self) -> Option<&Constructor> {
    self.constructor.as_ref()
  }

  /// Concrete, with a public constructor.
  pub fn is_instantiable(&self) -> bool {
    self.kind == TypeKind::Concrete && self.constructor.as_ref().is_some_and(|c| c.public)
  }

  pub(crate) fn instantiation_error(&self) -> Error {
    let reason = match (self.kind, &self.constructor) {
      (TypeKind::Abstract, _) => "the type is abstract",
      (TypeKind::Interface, _) => "the type is an interface",
      (TypeKind::Concrete, None) => "the type declares no constructor",
      (TypeKind::Concrete, Some(_)) => "the constructor is private",
    };
    Error::not_instantiable(&self.name, reason)
  }

  pub fn has_setter(&self, param: &str) -> bool {
    self.setters.contains_key(&setter_name(param))
  }

  pub(crate) fn missing_setter(&self, param: &str) -> Error {
    Error::ServiceParameterNotFound {
      class: self.name.clone(),
      param: param.to_owned(),
      setter: setter_name(param),
    }
  }

  pub(crate) fn call_setter(
    &self,
    object: &mut (dyn Any + Send + Sync),
    param: &str,
    value: Value,
  ) -> Result<()> {
    let setter = self
      .setters
      .get(&setter_name(param))
      .ok_or_else(|| self.missing_setter(param))?;
    setter(object, value)
  }

  pub fn method(&self, name: &str) -> Option<&Method> {
    self.methods.get(name)
  }

  pub fn is_copyable(&self) -> bool {
    self.copier.is_some()
  }

  /// Shallow copy: whatever `Clone` does for the type.
  pub(crate) fn copy(&self, instance: &Instance) -> Option<Instance> {
    let copier = self.copier.as_ref()?;
    let copy = copier(instance.as_any())?;
    Some(Instance::from_parts(instance.class_arc(), Arc::from(copy)))
  }

  pub fn markers(&self) -> &[ScopeMarker] {
    &self.markers
  }

  pub fn attributes(&self) -> &[Attribute] {
    &self.attributes
  }
}

impl fmt::Debug for TypeInfo {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut setters: Vec<_> = self.setters.keys().collect();
    setters.sort();
    let mut methods: Vec<_> = self.methods.keys().collect();
    methods.sort();
    f.debug_struct("TypeInfo")
      .field("name", &self.name)
      .field("kind", &self.kind)
      .field(
        "constructor",
        &self.constructor.as_ref().map(Constructor::params),
      )
      .field("setters", &setters)
      .field("methods", &methods)
      .field("copyable", &self.is_copyable())
      .field("markers", &self.markers)
      .field("attributes", &self.attributes)
      .finish()
  }
}

/// Name of the setter method a params key maps to: `userName` and `user_name` both become
/// `set_user_name`.
pub fn setter_name(param: &str) -> String {
  let mut name = String::with_capacity(param.len() + 8);
  name.push_str("set_");
  for (i, ch) in param.chars().enumerate() {
    if ch.is_ascii_uppercase() {
      if i > 0 && !name.ends_with('_') {
        name.push('_');
      }
      name.push(ch.to_ascii_lowercase());
    } else {
      name.push(ch);
    }
  }
  name
}

/// Typed builder for the [`TypeInfo`] of a concrete type `T`.
pub struct TypeInfoBuilder<T> {
  info: TypeInfo,
  _type: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> TypeInfoBuilder<T> {
  /// Declares the constructor. `build` receives the bound arguments in declaration order.
  pub fn constructor(
    mut self,
    params: impl IntoIterator<Item = Parameter>,
    build: impl Fn(&mut Arguments) -> Result<T> + Send + Sync + 'static,
  ) -> Self {
    self.info.constructor = Some(Constructor {
      params: params.into_iter().collect(),
      public: true,
      build: Arc::new(move |mut args: Arguments| {
        build(&mut args).map(|object| Box::new(object) as Box<dyn Any + Send + Sync>)
      }),
    });
    self
  }

  /// Marks the declared constructor as unusable by the container.
  pub fn private_constructor(mut self) -> Self {
    if let Some(constructor) = self.info.constructor.as_mut() {
      constructor.public = false;
    }
    self
  }

  /// Registers `method` (e.g. `set_user_name`) as a setter taking a `V`.
  pub fn setter<V: FromValue + 'static>(
    mut self,
    method: &str,
    apply: impl Fn(&mut T, V) + Send + Sync + 'static,
  ) -> Self {
    let class = self.info.name.clone();
    let name = method.to_owned();
    let setter: SetterFn = Arc::new(move |object: &mut (dyn Any + Send + Sync), value: Value| {
      let target = object
        .downcast_mut::<T>()
        .ok_or_else(|| Error::not_instantiable(&class, format!("`{}` got a foreign object", name)))?;
      apply(target, convert::<V>(&name, value)?);
      Ok(())
    });
    self.info.setters.insert(method.to_owned(), setter);
    self
  }

  /// Registers an invocable method. Its parameters bind like constructor parameters.
  pub fn method(
    mut self,
    name: &str,
    params: impl IntoIterator<Item = Parameter>,
    body: impl Fn(&T, &mut Arguments) -> Result<Value> + Send + Sync + 'static,
  ) -> Self {
    let class = self.info.name.clone();
    let method = name.to_owned();
    let call: MethodFn = Arc::new(move |target: &Instance, mut args: Arguments| {
      let this = target.downcast_ref::<T>().ok_or_else(|| Error::MethodNotFound {
        class: target.class().to_owned(),
        method: format!("{}::{}", class, method),
      })?;
      body(this, &mut args)
    });
    self.info.methods.insert(
      name.to_owned(),
      Method {
        params: params.into_iter().collect(),
        call,
      },
    );
    self
  }

  pub fn marker(mut self, marker: ScopeMarker) -> Self {
    self.info.markers.push(marker);
    self
  }

  pub fn attribute(mut self, attribute: Attribute) -> Self {
    self.info.attributes.push(attribute);
    self
  }

  pub fn build(self) -> TypeInfo {
    self.info
  }
}

impl<T: Any + Send + Sync + Default> TypeInfoBuilder<T> {
  /// An empty constructor backed by `Default`.
  pub fn default_constructor(self) -> Self {
    self.constructor([], |_| Ok(T::default()))
  }
}

impl<T: Any + Send + Sync + Clone> TypeInfoBuilder<T> {
  /// Allows Prototype scope: copies are made with `Clone`.
  pub fn cloneable(mut self) -> Self {
    self.info.copier = Some(Arc::new(|object: &(dyn Any + Send + Sync)| {
      object
        .downcast_ref::<T>()
        .map(|t| Box::new(t.clone()) as Box<dyn Any + Send + Sync>)
    }));
    self
  }
}

/// Implemented by types that describe themselves to the container.
pub trait Reflect: Any + Send + Sync {
  fn type_info() -> TypeInfo
  where
    Self: Sized;
}

/// A source of reflection records keyed by class name.
pub trait TypeInfoSource: Send + Sync {
  /// Builds the record for `class`, if the source knows it.
  fn describe(&self, class: &str) -> Option<TypeInfo>;

  fn contains(&self, class: &str) -> bool;

  /// Every class name the source knows.
  fn classes(&self) -> Vec<String>;
}

type Describer = Arc<dyn Fn() -> TypeInfo + Send + Sync>;

/// The stock [`TypeInfoSource`]: a thread-safe table of describer functions.
#[derive(Default)]
pub struct TypeCatalog {
  describers: DashMap<String, Describer>,
}

impl TypeCatalog {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds `T` under `std::any::type_name::<T>()`.
  pub fn register<T: Reflect>(&self) -> &Self {
    self
      .describers
      .insert(type_name::<T>().to_owned(), Arc::new(T::type_info));
    self
  }

  /// Adds a record under an explicit class name.
  pub fn register_with(
    &self,
    class: impl Into<String>,
    describe: impl Fn() -> TypeInfo + Send + Sync + 'static,
  ) -> &Self {
    self.describers.insert(class.into(), Arc::new(describe));
    self
  }

  pub fn len(&self) -> usize {
    self.describers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.describers.is_empty()
  }
}

impl TypeInfoSource for TypeCatalog {
  fn describe(&self, class: &str) -> Option<TypeInfo> {
    let describe = self.describers.get(class).map(|d| Arc::clone(d.value()))?;
    Some(describe())
  }

  fn contains(&self, class: &str) -> bool {
    self.describers.contains_key(class)
  }

  fn classes(&self) -> Vec<String> {
    let mut classes: Vec<String> = self.describers.iter().map(|e| e.key().clone()).collect();
    classes.sort();
    classes
  }
}
