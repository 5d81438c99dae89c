use thiserror::Error;

pub type Result<T> = std::result::Result<T, ViewerError>;

#[derive(Error, Debug)]
pub enum ViewerError {
  #[error("Remote {operation} failed: {message}")]
  Remote { operation: String, message: String },

  #[error("Failed to retrieve collection '{collection}': {source}")]
  Retrieval {
    collection: String,
    #[source]
    source: Box<ViewerError>,
  },

  #[error(
    "Collection '{collection}' needs {pages} pages of {batch_size} records, above the limit of {limit}"
  )]
  PageLimitExceeded { collection: String, pages: usize, batch_size: usize, limit: usize },

  #[error("Collection '{name}' not found")]
  UnknownCollection { name: String },

  #[error("No collections found")]
  NoCollections,

  #[error("Invalid configuration: {message}")]
  Config { message: String },

  #[error("Authentication required")]
  AuthenticationRequired,

  #[error("Incorrect password")]
  InvalidPassword,

  #[error("CSV export failed: {0}")]
  Csv(#[from] csv::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("YAML error: {0}")]
  Yaml(#[from] serde_yaml::Error),

  #[error(transparent)]
  Io(#[from] std::io::Error),
}

impl ViewerError {
  pub fn remote(operation: impl Into<String>, message: impl Into<String>) -> Self {
    Self::Remote { operation: operation.into(), message: message.into() }
  }

  pub fn retrieval(collection: impl Into<String>, source: ViewerError) -> Self {
    Self::Retrieval { collection: collection.into(), source: Box::new(source) }
  }

  pub fn config(message: impl Into<String>) -> Self {
    Self::Config { message: message.into() }
  }

  pub fn unknown_collection(name: impl Into<String>) -> Self {
    Self::UnknownCollection { name: name.into() }
  }

  /// True for failures that came from talking to the remote service
  pub fn is_retrieval(&self) -> bool {
    matches!(self, Self::Remote { .. } | Self::Retrieval { .. } | Self::UnknownCollection { .. })
  }
}

impl From<reqwest::Error> for ViewerError {
  fn from(error: reqwest::Error) -> Self {
    let operation =
      error.url().map(|url| url.path().to_string()).unwrap_or_else(|| "request".to_string());
    Self::remote(operation, error.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_retrieval_wraps_source_message() {
    let error = ViewerError::retrieval("leads", ViewerError::remote("get", "quota exceeded"));

    assert_eq!(
      error.to_string(),
      "Failed to retrieve collection 'leads': Remote get failed: quota exceeded"
    );
    assert!(error.is_retrieval());
  }

  #[test]
  fn test_config_errors_are_not_retrieval() {
    assert!(!ViewerError::config("missing api key").is_retrieval());
    assert!(!ViewerError::InvalidPassword.is_retrieval());
  }
}
