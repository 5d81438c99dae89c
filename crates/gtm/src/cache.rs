//! Short-lived snapshot cache keyed by collection name
//!
//! Uses the tokio clock so expiry follows a paused test clock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::pager::Snapshot;

struct Entry {
  snapshot: Arc<Snapshot>,
  stored_at: Instant,
}

/// Per-session cache of collection snapshots
pub struct SnapshotCache {
  ttl: Duration,
  entries: HashMap<String, Entry>,
}

impl SnapshotCache {
  pub fn new(ttl: Duration) -> Self {
    Self { ttl, entries: HashMap::new() }
  }

  /// Fresh snapshot for `collection`, if one was stored less than the TTL ago
  pub fn get(&self, collection: &str) -> Option<Arc<Snapshot>> {
    self
      .entries
      .get(collection)
      .filter(|entry| entry.stored_at.elapsed() < self.ttl)
      .map(|entry| Arc::clone(&entry.snapshot))
  }

  /// Store a snapshot under its collection name, replacing any previous one
  pub fn insert(&mut self, snapshot: Snapshot) -> Arc<Snapshot> {
    let snapshot = Arc::new(snapshot);
    let entry = Entry { snapshot: Arc::clone(&snapshot), stored_at: Instant::now() };
    self.entries.insert(snapshot.collection.clone(), entry);
    snapshot
  }

  /// Drop every entry
  pub fn clear(&mut self) {
    self.entries.clear();
  }

  /// Number of stored entries, fresh or not
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;

  fn snapshot(name: &str) -> Snapshot {
    Snapshot {
      collection: name.to_string(),
      records: Vec::new(),
      reported_count: 0,
      fetched_at: Utc::now(),
    }
  }

  #[tokio::test(start_paused = true)]
  async fn test_entries_expire_after_ttl() {
    let mut cache = SnapshotCache::new(Duration::from_secs(10));
    cache.insert(snapshot("leads"));

    tokio::time::advance(Duration::from_secs(9)).await;
    assert!(cache.get("leads").is_some());

    tokio::time::advance(Duration::from_secs(1)).await;
    assert!(cache.get("leads").is_none());
  }

  #[tokio::test(start_paused = true)]
  async fn test_insert_replaces_and_restarts_ttl() {
    let mut cache = SnapshotCache::new(Duration::from_secs(10));
    cache.insert(snapshot("leads"));
    tokio::time::advance(Duration::from_secs(8)).await;

    cache.insert(snapshot("leads"));
    tokio::time::advance(Duration::from_secs(8)).await;

    assert!(cache.get("leads").is_some());
    assert_eq!(cache.len(), 1);
  }

  #[test]
  fn test_clear_drops_all_collections() {
    let mut cache = SnapshotCache::new(Duration::from_secs(10));
    cache.insert(snapshot("leads"));
    cache.insert(snapshot("customers"));

    cache.clear();

    assert!(cache.is_empty());
    assert!(cache.get("leads").is_none());
  }

  #[test]
  fn test_zero_ttl_never_hits() {
    let mut cache = SnapshotCache::new(Duration::ZERO);
    cache.insert(snapshot("leads"));

    assert!(cache.get("leads").is_none());
  }
}
