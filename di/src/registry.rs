//! The id -> provider map.

use crate::error::{Error, Result};
use crate::provider::Provider;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What `set` does when the id is already taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
  /// Fail with `DuplicateId`.
  #[default]
  Reject,
  /// Keep the existing provider.
  Ignore,
  /// Drop the existing provider and install the new one.
  Replace,
}

/// Holds exactly one provider per service id.
///
/// Lookups hand out `Arc`s, so no map guard is held while a provider runs and providers may
/// register further services (auto-registration) without deadlocking.
#[derive(Default)]
pub struct Registry {
  providers: DashMap<String, Arc<Provider>>,
  policy: RwLock<CollisionPolicy>,
}

impl Registry {
  pub fn new(policy: CollisionPolicy) -> Self {
    Self {
      providers: DashMap::new(),
      policy: RwLock::new(policy),
    }
  }

  pub fn policy(&self) -> CollisionPolicy {
    *self.policy.read()
  }

  pub fn set_policy(&self, policy: CollisionPolicy) {
    *self.policy.write() = policy;
  }

  /// Installs `provider` under `id`, obeying the collision policy.
  ///
  /// Returns whether the new provider ended up in the registry.
  pub fn set(&self, id: &str, provider: Provider) -> Result<bool> {
    let policy = self.policy();
    match self.providers.entry(id.to_owned()) {
      Entry::Vacant(slot) => {
        slot.insert(Arc::new(provider));
        Ok(true)
      }
      Entry::Occupied(mut slot) => match policy {
        CollisionPolicy::Reject => Err(Error::DuplicateId(id.to_owned())),
        CollisionPolicy::Ignore => {
          tracing::debug!(id, "registration ignored, id already taken");
          Ok(false)
        }
        CollisionPolicy::Replace => {
          slot.insert(Arc::new(provider));
          tracing::debug!(id, "registration replaced existing provider");
          Ok(true)
        }
      },
    }
  }

  /// Installs `provider` unless `id` is taken; either way returns the provider now stored.
  pub(crate) fn set_if_absent(&self, id: &str, provider: Provider) -> Arc<Provider> {
    let entry = self
      .providers
      .entry(id.to_owned())
      .or_insert_with(|| Arc::new(provider));
    Arc::clone(entry.value())
  }

  /// Removes `id` only if it still maps to `provider`.
  pub(crate) fn remove_exact(&self, id: &str, provider: &Arc<Provider>) -> bool {
    self
      .providers
      .remove_if(id, |_, current| Arc::ptr_eq(current, provider))
      .is_some()
  }

  /// Plain lookup, nothing is resolved.
  pub fn get(&self, id: &str) -> Option<Arc<Provider>> {
    self.providers.get(id).map(|entry| Arc::clone(entry.value()))
  }

  pub fn has(&self, id: &str) -> bool {
    self.providers.contains_key(id)
  }

  pub fn clear(&self) {
    self.providers.clear();
  }

  /// Snapshot of every entry, ordered by id.
  pub fn entries(&self) -> Vec<(String, Arc<Provider>)> {
    let mut entries: Vec<_> = self
      .providers
      .iter()
      .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
      .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
  }

  pub fn len(&self) -> usize {
    self.providers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.providers.is_empty()
  }
}
