//! Viewer session context
//!
//! A session owns the remote client, the password gate and the snapshot cache.
//! Every interaction goes through it and runs to completion before the next.

use std::sync::Arc;

use crate::auth::PasswordGate;
use crate::cache::SnapshotCache;
use crate::client::CollectionClient;
use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};
use crate::filter::{filter_records, Dimension, FilterCriteria};
use crate::normalize::{normalize, Table};
use crate::pager::{fetch_snapshot, PagerOptions, Snapshot};
use crate::record::Record;
use crate::schema::SchemaProfile;
use crate::stats::{facet_options, showing_label, Insights, Summary};

/// One user's connection to a collection service
pub struct ViewerSession<C: CollectionClient> {
  client: C,
  gate: PasswordGate,
  cache: SnapshotCache,
  pager: PagerOptions,
  query_results: usize,
  authenticated: bool,
}

impl<C: CollectionClient> ViewerSession<C> {
  pub fn new(client: C, config: &ViewerConfig) -> Self {
    Self {
      client,
      gate: PasswordGate::new(config.app_password.clone()),
      cache: SnapshotCache::new(config.cache_ttl()),
      pager: PagerOptions { batch_size: config.batch_size, max_pages: config.max_pages },
      query_results: config.query_results,
      authenticated: false,
    }
  }

  /// False when no app password is configured
  pub fn requires_password(&self) -> bool {
    !self.gate.is_open()
  }

  pub fn is_authenticated(&self) -> bool {
    self.authenticated
  }

  /// Unlock the session; an unconfigured gate lets anyone in
  pub fn authenticate(&mut self, password: Option<&str>) -> Result<()> {
    if self.gate.is_open() {
      bentley::warn!("No app password configured; viewer access is unrestricted");
    }
    if let Err(error) = self.gate.check(password) {
      bentley::error!(&format!("Authentication failed: {error}"));
      return Err(error);
    }
    self.authenticated = true;
    Ok(())
  }

  fn ensure_authenticated(&self) -> Result<()> {
    if self.authenticated {
      Ok(())
    } else {
      Err(ViewerError::AuthenticationRequired)
    }
  }

  /// Collection names in the configured database
  pub async fn collections(&self) -> Result<Vec<String>> {
    self.ensure_authenticated()?;
    let names = self.client.list_collections().await?;
    if names.is_empty() {
      return Err(ViewerError::NoCollections);
    }
    Ok(names)
  }

  /// Snapshot of a collection, from the cache while it is fresh.
  ///
  /// A failed fetch leaves any previous cache entry alone.
  pub async fn snapshot(&mut self, collection: &str) -> Result<Arc<Snapshot>> {
    self.ensure_authenticated()?;
    if let Some(snapshot) = self.cache.get(collection) {
      bentley::verbose!(&format!("Cache hit for '{collection}'"));
      return Ok(snapshot);
    }

    bentley::verbose!(&format!("Cache miss for '{collection}', fetching"));
    let snapshot = fetch_snapshot(&self.client, collection, self.pager).await?;
    bentley::info!(&format!("Loaded {} records from '{collection}'", snapshot.len()));
    Ok(self.cache.insert(snapshot))
  }

  /// Filtered view of a collection
  pub async fn view(
    &mut self,
    collection: &str,
    criteria: &FilterCriteria,
  ) -> Result<CollectionView> {
    let snapshot = self.snapshot(collection).await?;
    let profile = SchemaProfile::detect(&snapshot.records);
    let filtered =
      filter_records(&self.client, &snapshot, &profile, criteria, self.query_results).await?;

    Ok(CollectionView { snapshot, profile, criteria: criteria.clone(), filtered })
  }

  /// Forget every cached snapshot so the next read hits the service
  pub fn refresh(&mut self) {
    self.cache.clear();
    bentley::info!("Cache cleared");
  }

  /// Close the session
  pub fn end(mut self) {
    self.cache.clear();
    self.authenticated = false;
    bentley::verbose!("Session ended");
  }
}

/// A collection snapshot with one set of filter criteria applied
#[derive(Debug, Clone)]
pub struct CollectionView {
  pub snapshot: Arc<Snapshot>,
  pub profile: SchemaProfile,
  pub criteria: FilterCriteria,
  pub filtered: Vec<Record>,
}

impl CollectionView {
  pub fn collection(&self) -> &str {
    &self.snapshot.collection
  }

  /// Displayed table for the filtered records
  pub fn table(&self) -> Table {
    normalize(&self.filtered)
  }

  /// Normalized table of the whole snapshot
  pub fn full_table(&self) -> Table {
    normalize(&self.snapshot.records)
  }

  /// Stats strip over the whole snapshot
  pub fn summary(&self) -> Summary {
    Summary::compute(&self.snapshot.records, &self.profile)
  }

  pub fn showing(&self) -> String {
    showing_label(self.filtered.len(), self.snapshot.len())
  }

  pub fn insights(&self) -> Insights {
    Insights::compute(&self.filtered, &self.snapshot.records, &self.profile)
  }

  /// Filter options for a dimension, counted over the whole snapshot
  pub fn facets(&self, dimension: Dimension) -> Vec<String> {
    facet_options(&self.snapshot.records, &self.profile, dimension)
  }

  pub fn active_labels(&self) -> Vec<String> {
    self.criteria.active_labels()
  }
}
