//! Resolver settings and the normalised service-definition tree.
//!
//! A definition tree maps scope keywords to entries:
//!
//! ```json
//! {
//!   "param":     { "cookies": ["a", "b"] },
//!   "alias":     { "cart": "shop::Cart" },
//!   "singleton": [
//!     { "id": "shop::Cart", "class": "shop::Cart", "args": { "cookies": "@cookies" } },
//!     ["shop::Checkout", { "params": { "currency": "EUR" } }]
//!   ]
//! }
//! ```
//!
//! Strings in `args` and `params` that start with `@` refer to another service id: `"@cookies"`
//! resolves `cookies`.
//!
//! A doubled sigil is an escape added on top of that rule: `"@@EUR"` is the literal string
//! `"@EUR"`, not a reference. It is the only way to pass a string that starts with `@` through
//! a definition tree. Code building definitions directly uses `Expr::Literal` instead.

use crate::definition::{Definition, Scope};
use crate::error::{Error, Result};
use crate::registry::CollisionPolicy;
use crate::value::{Expr, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// How the resolver treats dependencies nobody registered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjectorMode {
  /// Every dependency must be registered.
  #[default]
  ConfigFile,
  /// Unknown class-typed dependencies are registered on the fly.
  AutoRegister,
}

/// Resolver settings. Every field has a default, so partial documents deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
  pub mode: InjectorMode,
  pub collision_policy: CollisionPolicy,
  /// Scope given to auto-registered types that carry no scope marker.
  pub default_auto_scope: Scope,
  /// Maximum nesting of lookups before resolution fails with a cycle error.
  pub max_depth: usize,
}

impl Default for ResolverConfig {
  fn default() -> Self {
    Self {
      mode: InjectorMode::ConfigFile,
      collision_policy: CollisionPolicy::Reject,
      default_auto_scope: Scope::Singleton,
      max_depth: 64,
    }
  }
}

impl ResolverConfig {
  pub(crate) fn validate(&self) -> Result<()> {
    if !self.default_auto_scope.is_class_backed() {
      return Err(Error::InvalidConfiguration(format!(
        "`{}` cannot be the default scope of auto-registered types",
        self.default_auto_scope
      )));
    }
    if self.max_depth == 0 {
      return Err(Error::InvalidConfiguration(
        "max_depth must be at least 1".to_owned(),
      ));
    }
    Ok(())
  }
}

/// A parsed definition tree, ready for `Resolver::load`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigTree {
  entries: Vec<(Scope, Definition)>,
}

impl ConfigTree {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, scope: Scope, definition: Definition) {
    self.entries.push((scope, definition));
  }

  pub fn entries(&self) -> &[(Scope, Definition)] {
    &self.entries
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Parses a tree held as JSON.
  pub fn from_json(tree: &Json) -> Result<Self> {
    let sections = tree.as_object().ok_or_else(|| {
      Error::InvalidConfiguration("the service tree must be a map of scope -> entries".to_owned())
    })?;

    let mut parsed = ConfigTree::new();
    for (keyword, section) in sections {
      let scope: Scope = keyword.parse()?;
      match scope {
        Scope::Param | Scope::Alias => {
          let values = section.as_object().ok_or_else(|| {
            Error::InvalidConfiguration(format!("`{}` must map ids to values", scope))
          })?;
          for (id, value) in values {
            parsed.push(scope, Definition::with_value(id.clone(), Value::from(value)));
          }
        }
        Scope::Singleton | Scope::Factory | Scope::Prototype => {
          let entries = section.as_array().ok_or_else(|| {
            Error::InvalidConfiguration(format!("`{}` must be a list of definitions", scope))
          })?;
          for entry in entries {
            parsed.push(scope, parse_class_entry(entry)?);
          }
        }
      }
    }
    Ok(parsed)
  }

  /// Parses a JSON document.
  pub fn from_json_str(raw: &str) -> Result<Self> {
    let tree: Json = serde_json::from_str(raw)
      .map_err(|e| Error::InvalidConfiguration(format!("malformed service tree: {}", e)))?;
    Self::from_json(&tree)
  }
}

fn parse_class_entry(entry: &Json) -> Result<Definition> {
  match entry {
    // { "id": ..., "class": ..., "args": {...}, "params": {...} }
    Json::Object(fields) => {
      let (Some(id), Some(class)) = (fields.get("id"), fields.get("class")) else {
        return Err(Error::InvalidConfiguration(
          "the keys `id` and `class` are required".to_owned(),
        ));
      };
      let (Some(id), Some(class)) = (id.as_str(), class.as_str()) else {
        return Err(Error::InvalidConfiguration(
          "the keys `id` and `class` must be strings".to_owned(),
        ));
      };
      let mut definition = Definition::new(id, class);
      apply_options(&mut definition, fields.get("args"), fields.get("params"))?;
      Ok(definition)
    }
    // [ "type::Name", { "args": {...}, "params": {...} } ]
    Json::Array(items) => {
      let class = items.first().and_then(Json::as_str).ok_or_else(|| {
        Error::InvalidConfiguration("the first item of a positional entry must be a type name".to_owned())
      })?;
      let mut definition = Definition::new(class, class);
      match items.get(1) {
        None => {}
        Some(Json::Object(options)) => {
          apply_options(&mut definition, options.get("args"), options.get("params"))?
        }
        Some(_) => {
          return Err(Error::InvalidConfiguration(format!(
            "options of `{}` must be a map",
            class
          )))
        }
      }
      Ok(definition)
    }
    _ => Err(Error::InvalidConfiguration(
      "a definition must be a map or a [type, options] pair".to_owned(),
    )),
  }
}

fn apply_options(definition: &mut Definition, args: Option<&Json>, params: Option<&Json>) -> Result<()> {
  if let Some(args) = args {
    definition.set_args(parse_expressions("args", args)?);
  }
  if let Some(params) = params {
    definition.set_params(parse_expressions("params", params)?);
  }
  Ok(())
}

fn parse_expressions(option: &str, raw: &Json) -> Result<IndexMap<String, Expr>> {
  let entries = raw.as_object().ok_or_else(|| {
    Error::InvalidConfiguration(format!("the `{}` option must map names to values", option))
  })?;
  Ok(
    entries
      .iter()
      .map(|(name, value)| {
        let expr = match value {
          Json::String(s) => Expr::parse_marked(s),
          other => Expr::Literal(Value::from(other)),
        };
        (name.clone(), expr)
      })
      .collect(),
  )
}
