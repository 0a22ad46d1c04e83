//! Memoised reflection records.

use crate::error::{Error, Result};
use crate::reflect::{TypeInfo, TypeInfoSource};
use dashmap::DashMap;
use std::sync::Arc;

/// Caches the [`TypeInfo`] of every class the resolver has looked at.
///
/// Entries are built once through the underlying [`TypeInfoSource`] and never invalidated.
pub struct ReflectionCache {
  source: Arc<dyn TypeInfoSource>,
  records: DashMap<String, Arc<TypeInfo>>,
}

impl ReflectionCache {
  pub fn new(source: Arc<dyn TypeInfoSource>) -> Self {
    Self {
      source,
      records: DashMap::new(),
    }
  }

  /// The record for `class`, describing it on first use.
  pub fn record(&self, class: &str) -> Result<Arc<TypeInfo>> {
    if let Some(record) = self.records.get(class) {
      return Ok(Arc::clone(record.value()));
    }

    let described = self
      .source
      .describe(class)
      .ok_or_else(|| Error::ClassNotFound(class.to_owned()))?;
    tracing::trace!(class, "reflection record built");

    // Another thread may have described the same class meanwhile; the first insert wins.
    let record = self
      .records
      .entry(class.to_owned())
      .or_insert_with(|| Arc::new(described));
    Ok(Arc::clone(record.value()))
  }

  /// Whether `class` names a type, without building its record.
  pub fn contains(&self, class: &str) -> bool {
    self.records.contains_key(class) || self.source.contains(class)
  }

  pub fn source(&self) -> &Arc<dyn TypeInfoSource> {
    &self.source
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::reflect::{TypeCatalog, TypeKind};
  use std::sync::atomic::{AtomicUsize, Ordering};

  #[test]
  fn records_are_described_once() {
    static DESCRIBED: AtomicUsize = AtomicUsize::new(0);

    let catalog = TypeCatalog::new();
    catalog.register_with("app::Store", || {
      DESCRIBED.fetch_add(1, Ordering::SeqCst);
      TypeInfo::abstract_type("app::Store", TypeKind::Interface)
    });
    let cache = ReflectionCache::new(Arc::new(catalog));

    let first = cache.record("app::Store").unwrap();
    let second = cache.record("app::Store").unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(DESCRIBED.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len(), 1);
  }

  #[test]
  fn unknown_classes_are_not_cached() {
    let cache = ReflectionCache::new(Arc::new(TypeCatalog::new()));
    assert!(matches!(
      cache.record("app::Missing"),
      Err(Error::ClassNotFound(c)) if c == "app::Missing"
    ));
    assert!(cache.is_empty());
    assert!(!cache.contains("app::Missing"));
  }
}
