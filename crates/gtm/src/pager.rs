//! Paged bulk retrieval of a whole collection
//!
//! The hosted service caps items per request, so a snapshot is rebuilt with
//! sequential offset/limit calls. The loop is bounded by the count reported
//! before the first call and by a hard page cap.

use chrono::{DateTime, Utc};

use crate::client::{CollectionClient, CollectionHandle, GetRequest};
use crate::error::{Result, ViewerError};
use crate::record::Record;

/// Paging parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagerOptions {
  /// Records per call; must stay below the service cap
  pub batch_size: usize,
  /// Refuse to page a collection needing more calls than this
  pub max_pages: usize,
}

impl Default for PagerOptions {
  fn default() -> Self {
    Self { batch_size: 250, max_pages: 10_000 }
  }
}

impl PagerOptions {
  /// Number of calls needed for `count` records
  pub fn pages_for(&self, count: usize) -> usize {
    count.div_ceil(self.batch_size)
  }
}

/// Full contents of one collection at fetch time
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
  pub collection: String,
  pub records: Vec<Record>,
  /// Count reported by the service before paging started
  pub reported_count: usize,
  pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }
}

/// Resolve a collection by name and page through all of its records
pub async fn fetch_snapshot<C>(client: &C, name: &str, options: PagerOptions) -> Result<Snapshot>
where
  C: CollectionClient + ?Sized,
{
  let handle = client.get_collection(name).await?;
  let count = client.count(&handle).await.map_err(|e| ViewerError::retrieval(name, e))?;
  let records = fetch_pages(client, &handle, count, options).await?;

  if records.len() != count {
    bentley::warn!(&format!(
      "Collection '{name}' reported {count} records but paging returned {}",
      records.len()
    ));
  }

  Ok(Snapshot {
    collection: name.to_string(),
    records,
    reported_count: count,
    fetched_at: Utc::now(),
  })
}

/// Page through `count` records of a collection in remote storage order.
///
/// Offsets advance by `batch_size` until they reach `count`. An empty batch is
/// skipped rather than treated as the end, and any failed call aborts the
/// whole fetch.
pub async fn fetch_pages<C>(
  client: &C,
  handle: &CollectionHandle,
  count: usize,
  options: PagerOptions,
) -> Result<Vec<Record>>
where
  C: CollectionClient + ?Sized,
{
  if options.batch_size == 0 {
    return Err(ViewerError::config("batch_size must be greater than zero"));
  }

  let pages = options.pages_for(count);
  if pages > options.max_pages {
    return Err(ViewerError::PageLimitExceeded {
      collection: handle.name.clone(),
      pages,
      batch_size: options.batch_size,
      limit: options.max_pages,
    });
  }

  bentley::verbose!(&format!(
    "Paging '{}': {count} records in {pages} batches of {}",
    handle.name, options.batch_size
  ));

  let mut records = Vec::with_capacity(count);
  let mut offset = 0;
  while offset < count {
    let request = GetRequest::metadata_page(options.batch_size, offset);
    let batch =
      client.get(handle, request).await.map_err(|e| ViewerError::retrieval(&handle.name, e))?;

    if !batch.metadatas.is_empty() {
      records.extend(batch.metadatas.into_iter().map(Option::unwrap_or_default));
    }
    offset += options.batch_size;
  }

  Ok(records)
}
