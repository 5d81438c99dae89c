//! Remote collection client abstraction
//!
//! The viewer only needs bulk retrieval and semantic query from the hosted
//! vector database. Both sit behind [`CollectionClient`] so the pager, filter
//! engine and session can run against the Chroma HTTP API or an in-memory fake.

pub mod embedding;
pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::record::Record;

pub use embedding::{Embedder, HttpEmbedder};
pub use http::ChromaHttpClient;

/// Resolved reference to a remote collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionHandle {
  /// Remote identifier used in per-collection requests
  pub id: String,
  /// Human readable collection name
  pub name: String,
}

impl CollectionHandle {
  pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
    Self { id: id.into(), name: name.into() }
  }
}

/// Parts of a stored item to return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Include {
  Metadatas,
  Distances,
}

/// Offset/limit bulk retrieval
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetRequest {
  pub include: Vec<Include>,
  pub limit: usize,
  pub offset: usize,
}

impl GetRequest {
  /// Metadata-only page starting at `offset`
  pub fn metadata_page(limit: usize, offset: usize) -> Self {
    Self { include: vec![Include::Metadatas], limit, offset }
  }
}

/// One page of records; entries are `None` for items stored without metadata
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GetResponse {
  #[serde(default, deserialize_with = "null_as_default")]
  pub metadatas: Vec<Option<Record>>,
}

/// Nearest-neighbor query by text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
  pub query_texts: Vec<String>,
  pub n_results: usize,
  pub include: Vec<Include>,
}

impl QueryRequest {
  /// Single-text query returning metadata and distances
  pub fn text(query: impl Into<String>, n_results: usize) -> Self {
    Self {
      query_texts: vec![query.into()],
      n_results,
      include: vec![Include::Metadatas, Include::Distances],
    }
  }
}

/// Query results, one inner list per query text, ranked nearest first
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueryResponse {
  #[serde(default, deserialize_with = "null_as_default")]
  pub metadatas: Vec<Vec<Option<Record>>>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub distances: Vec<Vec<Option<f32>>>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
  D: serde::Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Hosted vector-database operations consumed by the viewer
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollectionClient: Send + Sync {
  /// Names of all collections in the configured database
  async fn list_collections(&self) -> Result<Vec<String>>;

  /// Resolve a collection by name
  async fn get_collection(&self, name: &str) -> Result<CollectionHandle>;

  /// Number of items stored in the collection
  async fn count(&self, collection: &CollectionHandle) -> Result<usize>;

  /// Retrieve one page of items
  async fn get(&self, collection: &CollectionHandle, request: GetRequest) -> Result<GetResponse>;

  /// Semantic nearest-neighbor query
  async fn query(
    &self,
    collection: &CollectionHandle,
    request: QueryRequest,
  ) -> Result<QueryResponse>;
}

/// Type-erased wrapper for CollectionClient implementations
pub struct BoxedCollectionClient(Box<dyn CollectionClient>);

impl BoxedCollectionClient {
  pub fn new<T: CollectionClient + 'static>(client: T) -> Self {
    Self(Box::new(client))
  }
}

#[async_trait]
impl CollectionClient for BoxedCollectionClient {
  async fn list_collections(&self) -> Result<Vec<String>> {
    self.0.list_collections().await
  }

  async fn get_collection(&self, name: &str) -> Result<CollectionHandle> {
    self.0.get_collection(name).await
  }

  async fn count(&self, collection: &CollectionHandle) -> Result<usize> {
    self.0.count(collection).await
  }

  async fn get(&self, collection: &CollectionHandle, request: GetRequest) -> Result<GetResponse> {
    self.0.get(collection, request).await
  }

  async fn query(
    &self,
    collection: &CollectionHandle,
    request: QueryRequest,
  ) -> Result<QueryResponse> {
    self.0.query(collection, request).await
  }
}
