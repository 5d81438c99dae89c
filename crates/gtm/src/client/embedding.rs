//! Query-text embedding for semantic search
//!
//! The Chroma HTTP API only accepts query embeddings, so query texts go through
//! an OpenAI-compatible embeddings endpoint first. The model must match the one
//! the collection was indexed with.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::EmbeddingConfig;
use crate::error::{Result, ViewerError};

/// Turns query texts into vectors
#[async_trait]
pub trait Embedder: Send + Sync {
  async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
  model: &'a str,
  input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
  data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
  embedding: Vec<f32>,
  #[serde(default)]
  index: Option<usize>,
}

/// Embedder backed by an OpenAI-compatible `/embeddings` endpoint
pub struct HttpEmbedder {
  client: Client,
  config: EmbeddingConfig,
}

impl HttpEmbedder {
  pub fn new(config: EmbeddingConfig, timeout_secs: u64) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(timeout_secs)).build()?;
    Ok(Self { client, config })
  }
}

#[async_trait]
impl Embedder for HttpEmbedder {
  async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    let request = EmbeddingRequest { model: &self.config.model, input: texts };

    let mut builder = self.client.post(&self.config.url).json(&request);
    if let Some(key) = &self.config.api_key {
      builder = builder.bearer_auth(key);
    }
    let response = builder.send().await?;

    if !response.status().is_success() {
      let status = response.status();
      let error_text = response.text().await.unwrap_or_default();
      return Err(ViewerError::remote("embed", format!("HTTP {status}: {error_text}")));
    }

    let body: EmbeddingResponse = response.json().await?;
    order_embeddings(body.data, texts.len())
  }
}

/// Put embeddings back in input order and check one came back per text
fn order_embeddings(mut data: Vec<EmbeddingData>, expected: usize) -> Result<Vec<Vec<f32>>> {
  if data.len() != expected {
    return Err(ViewerError::remote(
      "embed",
      format!("expected {expected} embeddings, received {}", data.len()),
    ));
  }
  data.sort_by_key(|d| d.index.unwrap_or(usize::MAX));
  Ok(data.into_iter().map(|d| d.embedding).collect())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_order_embeddings_sorts_by_index() {
    let data = vec![
      EmbeddingData { embedding: vec![2.0], index: Some(1) },
      EmbeddingData { embedding: vec![1.0], index: Some(0) },
    ];

    assert_eq!(order_embeddings(data, 2).unwrap(), vec![vec![1.0], vec![2.0]]);
  }

  #[test]
  fn test_order_embeddings_rejects_count_mismatch() {
    let data = vec![EmbeddingData { embedding: vec![1.0], index: Some(0) }];

    let error = order_embeddings(data, 2).unwrap_err();
    assert!(error.to_string().contains("expected 2 embeddings"));
  }
}
