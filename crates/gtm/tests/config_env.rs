//! Configuration loading from files and the environment

use gtm::config::ViewerConfig;
use serial_test::serial;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

const ENV_KEYS: [&str; 10] = [
  "GTM_CONFIG",
  "CHROMA_URL",
  "CHROMA_API_KEY",
  "CHROMA_TENANT",
  "CHROMA_DATABASE",
  "GTM_APP_PASSWORD",
  "GTM_CACHE_TTL_SECS",
  "GTM_EMBEDDING_URL",
  "GTM_EMBEDDING_MODEL",
  "GTM_EMBEDDING_API_KEY",
];

fn clear_env() {
  for key in ENV_KEYS {
    std::env::remove_var(key);
  }
}

fn config_file(content: &str) -> NamedTempFile {
  let mut file = NamedTempFile::new().unwrap();
  file.write_all(content.as_bytes()).unwrap();
  file
}

#[test]
#[serial]
fn test_load_explicit_file() {
  clear_env();
  let file = config_file(
    "api_key: ck-file\ntenant: tenant-file\ndatabase: prospects\nbatch_size: 100\n\
     embedding:\n  url: http://localhost:9000/v1/embeddings\n",
  );

  let config = ViewerConfig::load(Some(file.path())).unwrap();

  assert_eq!(config.api_key.as_deref(), Some("ck-file"));
  assert_eq!(config.database, "prospects");
  assert_eq!(config.batch_size, 100);
  assert_eq!(config.embedding.unwrap().model, "text-embedding-3-small");
  assert!(ViewerConfig::load(Some(file.path())).unwrap().validate().is_ok());
}

#[test]
#[serial]
fn test_environment_overrides_file() {
  clear_env();
  let file = config_file("api_key: ck-file\ntenant: tenant-file\ncache_ttl_secs: 60\n");
  std::env::set_var("CHROMA_API_KEY", "ck-env");
  std::env::set_var("GTM_APP_PASSWORD", "secret");
  std::env::set_var("GTM_CACHE_TTL_SECS", "5");

  let config = ViewerConfig::load(Some(file.path())).unwrap();
  clear_env();

  assert_eq!(config.api_key.as_deref(), Some("ck-env"));
  assert_eq!(config.tenant.as_deref(), Some("tenant-file"));
  assert_eq!(config.app_password.as_deref(), Some("secret"));
  assert_eq!(config.cache_ttl_secs, 5);
}

#[test]
#[serial]
fn test_gtm_config_variable_points_at_file() {
  clear_env();
  let dir = TempDir::new().unwrap();
  let path = dir.path().join("gtm.yaml");
  std::fs::write(&path, "tenant: from-variable\n").unwrap();
  std::env::set_var("GTM_CONFIG", &path);

  let config = ViewerConfig::load(None).unwrap();
  clear_env();

  assert_eq!(config.tenant.as_deref(), Some("from-variable"));
}

#[test]
#[serial]
fn test_invalid_yaml_is_error() {
  clear_env();
  let file = config_file("batch_size: [not, a, number]\n");

  let error = ViewerConfig::load(Some(file.path())).unwrap_err();

  assert!(error.to_string().starts_with("YAML error"));
}

#[test]
#[serial]
fn test_missing_explicit_file_is_error() {
  clear_env();
  let dir = TempDir::new().unwrap();

  assert!(ViewerConfig::load(Some(&dir.path().join("absent.yaml"))).is_err());
}
