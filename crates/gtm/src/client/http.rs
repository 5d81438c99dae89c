//! HTTP client for the Chroma v2 REST API
//!
//! Thin reqwest wrapper implementing [`CollectionClient`] against a hosted
//! Chroma tenant/database. Every request carries the `x-chroma-token` header.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::embedding::Embedder;
use super::{
  CollectionClient, CollectionHandle, GetRequest, GetResponse, Include, QueryRequest,
  QueryResponse,
};
use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};

const TOKEN_HEADER: &str = "x-chroma-token";

/// Connection settings for a Chroma tenant/database
#[derive(Debug, Clone)]
pub struct ChromaConfig {
  /// Base URL of the Chroma service (e.g., "https://api.trychroma.com")
  pub base_url: String,
  pub api_key: String,
  pub tenant: String,
  pub database: String,
  /// Request timeout in seconds
  pub timeout_secs: u64,
}

impl From<&ViewerConfig> for ChromaConfig {
  fn from(config: &ViewerConfig) -> Self {
    Self {
      base_url: config.base_url.clone(),
      api_key: config.api_key.clone().unwrap_or_default(),
      tenant: config.tenant.clone().unwrap_or_default(),
      database: config.database.clone(),
      timeout_secs: config.timeout_secs,
    }
  }
}

#[derive(Debug, Deserialize)]
struct CollectionInfo {
  id: String,
  name: String,
}

#[derive(Serialize)]
struct QueryBody<'a> {
  query_embeddings: Vec<Vec<f32>>,
  n_results: usize,
  include: &'a [Include],
}

/// HTTP client for a hosted Chroma database
pub struct ChromaHttpClient {
  client: Client,
  config: ChromaConfig,
  embedder: Option<Box<dyn Embedder>>,
}

impl ChromaHttpClient {
  /// Create a client; semantic queries fail until an embedder is attached
  pub fn new(config: ChromaConfig) -> Result<Self> {
    Url::parse(&config.base_url)
      .map_err(|e| ViewerError::config(format!("invalid base_url '{}': {e}", config.base_url)))?;

    let client = Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
    Ok(Self { client, config, embedder: None })
  }

  /// Attach the embedder used to turn query texts into vectors
  pub fn with_embedder(mut self, embedder: Box<dyn Embedder>) -> Self {
    self.embedder = Some(embedder);
    self
  }

  /// Build `{base}/api/v2/tenants/{tenant}/databases/{database}/{segments...}`
  fn endpoint(&self, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(&self.config.base_url)
      .map_err(|e| ViewerError::config(format!("invalid base_url: {e}")))?;
    url
      .path_segments_mut()
      .map_err(|_| ViewerError::config("base_url cannot carry a path"))?
      .pop_if_empty()
      .extend(["api", "v2", "tenants", self.config.tenant.as_str()])
      .extend(["databases", self.config.database.as_str()])
      .extend(segments);
    Ok(url)
  }

  async fn send<T: DeserializeOwned>(
    &self,
    operation: &str,
    request: RequestBuilder,
  ) -> Result<T> {
    let response = request.header(TOKEN_HEADER, &self.config.api_key).send().await?;
    let status = response.status();
    tracing::debug!(operation, %status, "chroma response");

    if !status.is_success() {
      let error_text = response.text().await.unwrap_or_default();
      return Err(ViewerError::remote(operation, format!("HTTP {status}: {error_text}")));
    }

    Ok(response.json().await?)
  }

  async fn embed_queries(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    let embedder = self.embedder.as_ref().ok_or_else(|| {
      ViewerError::config("semantic search needs an embedding endpoint (embedding.url)")
    })?;
    embedder.embed(texts).await
  }
}

#[async_trait]
impl CollectionClient for ChromaHttpClient {
  async fn list_collections(&self) -> Result<Vec<String>> {
    let url = self.endpoint(&["collections"])?;
    let collections: Vec<CollectionInfo> =
      self.send("list_collections", self.client.get(url)).await?;
    Ok(collections.into_iter().map(|c| c.name).collect())
  }

  async fn get_collection(&self, name: &str) -> Result<CollectionHandle> {
    let url = self.endpoint(&["collections", name])?;
    let response =
      self.client.get(url).header(TOKEN_HEADER, &self.config.api_key).send().await?;

    if response.status() == StatusCode::NOT_FOUND {
      return Err(ViewerError::unknown_collection(name));
    }
    if !response.status().is_success() {
      let status = response.status();
      let error_text = response.text().await.unwrap_or_default();
      return Err(ViewerError::remote("get_collection", format!("HTTP {status}: {error_text}")));
    }

    let info: CollectionInfo = response.json().await?;
    Ok(CollectionHandle::new(info.id, info.name))
  }

  async fn count(&self, collection: &CollectionHandle) -> Result<usize> {
    let url = self.endpoint(&["collections", collection.id.as_str(), "count"])?;
    self.send("count", self.client.get(url)).await
  }

  async fn get(&self, collection: &CollectionHandle, request: GetRequest) -> Result<GetResponse> {
    let url = self.endpoint(&["collections", collection.id.as_str(), "get"])?;
    self.send("get", self.client.post(url).json(&request)).await
  }

  async fn query(
    &self,
    collection: &CollectionHandle,
    request: QueryRequest,
  ) -> Result<QueryResponse> {
    let query_embeddings = self.embed_queries(&request.query_texts).await?;
    let body =
      QueryBody { query_embeddings, n_results: request.n_results, include: &request.include };

    let url = self.endpoint(&["collections", collection.id.as_str(), "query"])?;
    self.send("query", self.client.post(url).json(&body)).await
  }
}
