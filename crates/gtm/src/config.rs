//! Configuration management for the viewer
//!
//! Settings come from a YAML file and are then overridden by environment
//! variables, so credentials never need to live in the repository.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::{Result, ViewerError};

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
  /// Base URL of the hosted Chroma service
  #[serde(default = "default_base_url")]
  pub base_url: String,
  #[serde(default)]
  pub api_key: Option<String>,
  #[serde(default)]
  pub tenant: Option<String>,
  /// Database holding the collections
  #[serde(default = "default_database")]
  pub database: String,
  /// Request timeout in seconds
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
  /// Records per bulk retrieval call (service cap is 300)
  #[serde(default = "default_batch_size")]
  pub batch_size: usize,
  /// Maximum bulk retrieval calls for one snapshot
  #[serde(default = "default_max_pages")]
  pub max_pages: usize,
  /// Results requested from a semantic query
  #[serde(default = "default_query_results")]
  pub query_results: usize,
  /// Seconds a fetched snapshot stays fresh
  #[serde(default = "default_cache_ttl_secs")]
  pub cache_ttl_secs: u64,
  /// Password for the viewer; no password means the gate is open
  #[serde(default)]
  pub app_password: Option<String>,
  #[serde(default)]
  pub embedding: Option<EmbeddingConfig>,
}

/// OpenAI-compatible embeddings endpoint used for semantic search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
  pub url: String,
  #[serde(default = "default_embedding_model")]
  pub model: String,
  #[serde(default)]
  pub api_key: Option<String>,
}

// Default value functions
fn default_base_url() -> String {
  "https://api.trychroma.com".to_string()
}
fn default_database() -> String {
  "customer".to_string()
}
fn default_timeout_secs() -> u64 {
  30
}
fn default_batch_size() -> usize {
  250
}
fn default_max_pages() -> usize {
  10_000
}
fn default_query_results() -> usize {
  200
}
fn default_cache_ttl_secs() -> u64 {
  10
}
fn default_embedding_model() -> String {
  "text-embedding-3-small".to_string()
}

impl Default for ViewerConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
      api_key: None,
      tenant: None,
      database: default_database(),
      timeout_secs: default_timeout_secs(),
      batch_size: default_batch_size(),
      max_pages: default_max_pages(),
      query_results: default_query_results(),
      cache_ttl_secs: default_cache_ttl_secs(),
      app_password: None,
      embedding: None,
    }
  }
}

impl ViewerConfig {
  /// Load configuration from a YAML file
  pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
    let content = std::fs::read_to_string(path)?;
    let config: ViewerConfig = serde_yaml::from_str(&content)?;
    Ok(config)
  }

  /// Load from an explicit path, `$GTM_CONFIG` or the user config dir, then
  /// apply environment overrides
  pub fn load(explicit: Option<&Path>) -> Result<Self> {
    let mut config = match resolve_config_path(explicit) {
      Some(path) => {
        bentley::verbose!(&format!("Loading configuration from {}", path.display()));
        Self::load_from_file(&path)?
      }
      None => Self::default(),
    };
    config.apply_overrides(|key| std::env::var(key).ok());
    Ok(config)
  }

  /// Apply overrides from an environment-like lookup
  pub fn apply_overrides<F>(&mut self, lookup: F)
  where
    F: Fn(&str) -> Option<String>,
  {
    if let Some(url) = lookup("CHROMA_URL") {
      self.base_url = url;
    }
    if let Some(key) = lookup("CHROMA_API_KEY") {
      self.api_key = Some(key);
    }
    if let Some(tenant) = lookup("CHROMA_TENANT") {
      self.tenant = Some(tenant);
    }
    if let Some(database) = lookup("CHROMA_DATABASE") {
      self.database = database;
    }
    if let Some(password) = lookup("GTM_APP_PASSWORD") {
      self.app_password = Some(password);
    }
    if let Some(ttl) = lookup("GTM_CACHE_TTL_SECS").and_then(|v| v.parse().ok()) {
      self.cache_ttl_secs = ttl;
    }
    self.apply_embedding_overrides(&lookup);
  }

  fn apply_embedding_overrides<F>(&mut self, lookup: &F)
  where
    F: Fn(&str) -> Option<String>,
  {
    if let Some(url) = lookup("GTM_EMBEDDING_URL") {
      let embedding = self.embedding.get_or_insert_with(|| EmbeddingConfig {
        url: String::new(),
        model: default_embedding_model(),
        api_key: None,
      });
      embedding.url = url;
    }
    if let Some(embedding) = self.embedding.as_mut() {
      if let Some(model) = lookup("GTM_EMBEDDING_MODEL") {
        embedding.model = model;
      }
      if let Some(key) = lookup("GTM_EMBEDDING_API_KEY") {
        embedding.api_key = Some(key);
      }
    }
  }

  /// Check that the configuration can reach a collection service
  pub fn validate(&self) -> Result<()> {
    Url::parse(&self.base_url)
      .map_err(|e| ViewerError::config(format!("invalid base_url '{}': {e}", self.base_url)))?;
    if self.api_key.as_deref().map_or(true, str::is_empty) {
      return Err(ViewerError::config("api_key is required (set CHROMA_API_KEY)"));
    }
    if self.tenant.as_deref().map_or(true, str::is_empty) {
      return Err(ViewerError::config("tenant is required (set CHROMA_TENANT)"));
    }
    if self.batch_size == 0 {
      return Err(ViewerError::config("batch_size must be greater than zero"));
    }
    if self.max_pages == 0 {
      return Err(ViewerError::config("max_pages must be greater than zero"));
    }
    if self.query_results == 0 {
      return Err(ViewerError::config("query_results must be greater than zero"));
    }
    Ok(())
  }

  pub fn cache_ttl(&self) -> Duration {
    Duration::from_secs(self.cache_ttl_secs)
  }
}

/// Pick the configuration file to read, if any
fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
  if let Some(path) = explicit {
    return Some(path.to_path_buf());
  }
  if let Ok(path) = std::env::var("GTM_CONFIG") {
    return Some(PathBuf::from(path));
  }
  default_config_path().filter(|path| path.exists())
}

/// `<config dir>/chroma-gtm/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
  dirs::config_dir().map(|dir| dir.join("chroma-gtm").join("config.yaml"))
}
