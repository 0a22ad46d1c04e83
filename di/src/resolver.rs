//! The `Resolver`: registration, lookup, reflective instantiation and injection into calls.

use crate::attributes::AttributeParser;
use crate::cache::ReflectionCache;
use crate::config::{ConfigTree, InjectorMode, ResolverConfig};
use crate::core::{next_owner_id, ResolutionGuard};
use crate::definition::{Definition, Scope};
use crate::error::{Error, Result};
use crate::invoke::{convert, Arguments, Callable, Overrides};
use crate::provider::Provider;
use crate::reflect::{ParamType, Parameter, ScopeMarker, TypeInfo, TypeInfoSource};
use crate::registry::{CollisionPolicy, Registry};
use crate::value::{Expr, FromValue, Instance, Value};
use indexmap::IndexMap;
use parking_lot::{ReentrantMutex, RwLock};
use std::sync::Arc;

// Marker precedence when guessing the scope of an auto-registered type.
const MARKER_SCOPES: [(ScopeMarker, Scope); 3] = [
  (ScopeMarker::SingletonAware, Scope::Singleton),
  (ScopeMarker::PrototypeAware, Scope::Prototype),
  (ScopeMarker::FactoryAware, Scope::Factory),
];

struct Settings {
  mode: InjectorMode,
  default_auto_scope: Scope,
  max_depth: usize,
}

/// One registry entry, as reported by [`Resolver::services`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSummary {
  pub id: String,
  pub scope: Scope,
  pub class: Option<String>,
  /// A singleton instance or prototype template has been built.
  pub materialized: bool,
}

/// The dependency-injection container.
///
/// It owns the service [`Registry`] and a [`ReflectionCache`] over a [`TypeInfoSource`].
/// `get` finds the provider for an id and lets it apply its lifecycle policy; providers that
/// need an object call back into [`Resolver::instantiate`], which binds every constructor
/// parameter from the definition, defaults, or the registry, and then applies setters.
///
/// The resolver is `Send + Sync`. Resolution (`get`, `instantiate`, `invoke_*`) is serialised
/// by one re-entrant lock: nested lookups on the resolving thread re-enter it, other threads
/// wait, so a dependency cycle always surfaces as `ResolutionCycle` on the thread that walked
/// it.
pub struct Resolver {
  owner: u64,
  registry: Registry,
  reflection: ReflectionCache,
  settings: RwLock<Settings>,
  resolving: ReentrantMutex<()>,
}

impl Resolver {
  /// A resolver with default settings.
  pub fn new(source: Arc<dyn TypeInfoSource>) -> Self {
    Self::build(source, ResolverConfig::default())
  }

  pub fn with_config(source: Arc<dyn TypeInfoSource>, config: ResolverConfig) -> Result<Self> {
    config.validate()?;
    Ok(Self::build(source, config))
  }

  fn build(source: Arc<dyn TypeInfoSource>, config: ResolverConfig) -> Self {
    Self {
      owner: next_owner_id(),
      registry: Registry::new(config.collision_policy),
      reflection: ReflectionCache::new(source),
      settings: RwLock::new(Settings {
        mode: config.mode,
        default_auto_scope: config.default_auto_scope,
        max_depth: config.max_depth,
      }),
      resolving: ReentrantMutex::new(()),
    }
  }

  // --- SETTINGS ---

  pub fn config(&self) -> ResolverConfig {
    let settings = self.settings.read();
    ResolverConfig {
      mode: settings.mode,
      collision_policy: self.registry.policy(),
      default_auto_scope: settings.default_auto_scope,
      max_depth: settings.max_depth,
    }
  }

  pub fn mode(&self) -> InjectorMode {
    self.settings.read().mode
  }

  pub fn set_mode(&self, mode: InjectorMode) {
    self.settings.write().mode = mode;
  }

  pub fn collision_policy(&self) -> CollisionPolicy {
    self.registry.policy()
  }

  pub fn set_collision_policy(&self, policy: CollisionPolicy) {
    self.registry.set_policy(policy);
  }

  pub fn default_auto_scope(&self) -> Scope {
    self.settings.read().default_auto_scope
  }

  /// Only class-backed scopes are accepted.
  pub fn set_default_auto_scope(&self, scope: Scope) -> Result<()> {
    if !scope.is_class_backed() {
      return Err(Error::InvalidConfiguration(format!(
        "`{}` cannot be the default scope of auto-registered types",
        scope
      )));
    }
    self.settings.write().default_auto_scope = scope;
    Ok(())
  }

  pub fn max_depth(&self) -> usize {
    self.settings.read().max_depth
  }

  pub fn set_max_depth(&self, max_depth: usize) -> Result<()> {
    if max_depth == 0 {
      return Err(Error::InvalidConfiguration(
        "max_depth must be at least 1".to_owned(),
      ));
    }
    self.settings.write().max_depth = max_depth;
    Ok(())
  }

  pub fn registry(&self) -> &Registry {
    &self.registry
  }

  pub fn reflection(&self) -> &ReflectionCache {
    &self.reflection
  }

  // --- REGISTRATION ---

  /// Registers every definition of a parsed tree, in order.
  pub fn load(&self, tree: &ConfigTree) -> Result<()> {
    for (scope, definition) in tree.entries() {
      self.register(*scope, definition.clone())?;
    }
    Ok(())
  }

  /// Parses and registers a definition tree held as JSON.
  pub fn load_json(&self, tree: &serde_json::Value) -> Result<()> {
    self.load(&ConfigTree::from_json(tree)?)
  }

  /// Registers one definition under its id, honouring the collision policy.
  pub fn register(&self, scope: Scope, definition: Definition) -> Result<()> {
    definition.validate(scope)?;
    if let (true, Some(class)) = (scope.is_class_backed(), definition.class()) {
      let record = self.reflection.record(class)?;
      if scope == Scope::Prototype && !record.is_copyable() {
        return Err(Error::not_instantiable(
          class,
          "prototype scope needs a cloneable type",
        ));
      }
    }

    let id = definition.id().to_owned();
    let class = definition.class().map(str::to_owned);
    if self.registry.set(&id, Provider::new(scope, definition))? {
      tracing::debug!(id = %id, %scope, ?class, "service registered");
    }
    Ok(())
  }

  /// Registers every type whose metadata carries a scope attribute.
  pub fn register_annotated(&self) -> Result<usize> {
    let mut discovered = Vec::new();
    for class in self.reflection.source().classes() {
      let record = self.reflection.record(&class)?;
      discovered.extend(
        record
          .attributes()
          .iter()
          .map(|attribute| (class.clone(), attribute.clone())),
      );
    }
    AttributeParser::new(self).parse(
      discovered
        .iter()
        .map(|(class, attribute)| (class.as_str(), attribute)),
    )
  }

  /// Drops every registration, and with them every cached singleton and prototype template.
  pub fn clear(&self) {
    self.registry.clear();
    tracing::debug!("registry cleared");
  }

  // --- RESOLUTION ---

  pub fn has(&self, id: &str) -> bool {
    self.registry.has(id)
  }

  /// Resolves `id`, failing with `ServiceNotFound` when nothing provides it.
  pub fn get(&self, id: &str) -> Result<Value> {
    self
      .get_optional(id)?
      .ok_or_else(|| Error::ServiceNotFound(id.to_owned()))
  }

  /// Resolves `id`; `None` when it is neither registered nor, in auto-register mode, a known
  /// type.
  pub fn get_optional(&self, id: &str) -> Result<Option<Value>> {
    let _resolving = self.resolving.lock();
    if let Some(provider) = self.registry.get(id) {
      return self.provide(id, &provider).map(Some);
    }
    if self.mode() == InjectorMode::AutoRegister && self.reflection.contains(id) {
      return self.auto_register(id).map(Some);
    }
    tracing::trace!(id, "service not registered");
    Ok(None)
  }

  /// Resolves `id` and converts the result, e.g. to `Arc<MyService>`.
  pub fn get_as<T: FromValue>(&self, id: &str) -> Result<T> {
    convert(id, self.get(id)?)
  }

  /// Builds an object from `definition` without registering anything.
  pub fn instantiate(&self, definition: &Definition) -> Result<Instance> {
    let _resolving = self.resolving.lock();
    let class = definition.class().ok_or_else(|| {
      Error::InvalidConfiguration(format!("definition `{}` names no class", definition.id()))
    })?;
    let record = self.reflection.record(class)?;
    let constructor = match record.constructor() {
      Some(constructor) if record.is_instantiable() => constructor,
      _ => return Err(record.instantiation_error()),
    };

    let args = self.bind_all(constructor.params(), definition.args())?;
    let mut object = constructor.construct(args)?;

    for (name, expr) in definition.params() {
      if !record.has_setter(name) {
        return Err(record.missing_setter(name));
      }
      let value = self.evaluate(expr)?;
      record.call_setter(object.as_mut(), name, value)?;
    }

    tracing::trace!(id = definition.id(), class, "instantiated");
    Ok(Instance::from_parts(Arc::from(class), Arc::from(object)))
  }

  /// Calls `callable`, binding each parameter from `overrides`, its default, or the registry.
  pub fn invoke_function(&self, callable: &Callable, overrides: &Overrides) -> Result<Value> {
    let _resolving = self.resolving.lock();
    let args = self.bind_all(callable.params(), overrides)?;
    callable.call(args)
  }

  /// Calls the method `method` of `target` with injected arguments.
  pub fn invoke_method(&self, target: &Instance, method: &str, overrides: &Overrides) -> Result<Value> {
    let _resolving = self.resolving.lock();
    let record = self.reflection.record(target.class())?;
    let handler = record.method(method).ok_or_else(|| Error::MethodNotFound {
      class: target.class().to_owned(),
      method: method.to_owned(),
    })?;
    let args = self.bind_all(handler.params(), overrides)?;
    handler.call(target, args)
  }

  /// Summary of every registration, ordered by id.
  pub fn services(&self) -> Vec<ServiceSummary> {
    self
      .registry
      .entries()
      .into_iter()
      .map(|(id, provider)| ServiceSummary {
        scope: provider.scope(),
        class: provider.definition().class().map(str::to_owned),
        materialized: provider.is_materialized(),
        id,
      })
      .collect()
  }

  // --- PRIVATE HELPERS ---

  // Every provider invocation goes through here so the resolution stack sees it.
  fn provide(&self, id: &str, provider: &Provider) -> Result<Value> {
    let _guard = ResolutionGuard::enter(self.owner, id, self.max_depth())?;
    provider.provide(self)
  }

  fn auto_register(&self, class: &str) -> Result<Value> {
    let record = self.reflection.record(class)?;
    let scope = self.guess_scope(&record);
    if scope == Scope::Prototype && !record.is_copyable() {
      return Err(Error::not_instantiable(
        class,
        "prototype scope needs a cloneable type",
      ));
    }

    let provider = self
      .registry
      .set_if_absent(class, Provider::new(scope, Definition::new(class, class)));
    tracing::debug!(class, %scope, "auto-registered");

    self.provide(class, &provider).map_err(|err| {
      if self.registry.remove_exact(class, &provider) {
        tracing::debug!(class, error = %err, "auto-registration rolled back");
      }
      err
    })
  }

  fn guess_scope(&self, record: &TypeInfo) -> Scope {
    MARKER_SCOPES
      .iter()
      .find(|(marker, _)| record.markers().contains(marker))
      .map(|(_, scope)| *scope)
      .unwrap_or_else(|| self.default_auto_scope())
  }

  pub(crate) fn copy_instance(&self, template: &Instance) -> Result<Instance> {
    let record = self.reflection.record(template.class())?;
    record.copy(template).ok_or_else(|| {
      Error::not_instantiable(template.class(), "the type cannot be copied for prototype scope")
    })
  }

  fn evaluate(&self, expr: &Expr) -> Result<Value> {
    match expr {
      Expr::Literal(value) => Ok(value.clone()),
      Expr::Ref(id) => self.get(id),
    }
  }

  fn bind_all(&self, params: &[Parameter], explicit: &IndexMap<String, Expr>) -> Result<Arguments> {
    let mut args = Arguments::with_capacity(params.len());
    for param in params {
      let value = self.bind(param, explicit)?;
      args.push(param.name(), value);
    }
    Ok(args)
  }

  // explicit value > default > registry by name > registry by type > auto-registration
  fn bind(&self, param: &Parameter, explicit: &IndexMap<String, Expr>) -> Result<Value> {
    if let Some(expr) = explicit.get(param.name()) {
      return self.evaluate(expr);
    }
    if let Some(default) = param.default() {
      return Ok(default.clone());
    }
    if let Some(provider) = self.registry.get(param.name()) {
      return self.provide(param.name(), &provider);
    }

    let ParamType::Named(type_name) = param.ty() else {
      return Err(Error::UnknownTypeForParameter(param.name().to_owned()));
    };

    match self.mode() {
      InjectorMode::ConfigFile => match self.registry.get(type_name) {
        Some(provider) => self.provide(type_name, &provider),
        None => Err(Error::ServiceNotFound(type_name.clone())),
      },
      InjectorMode::AutoRegister => {
        if !self.registry.has(type_name) && !self.reflection.contains(type_name) {
          return Err(Error::ClassNotFound(type_name.clone()));
        }
        self.get(type_name)
      }
    }
  }
}
