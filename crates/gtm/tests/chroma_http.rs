//! ChromaHttpClient against a local axum stand-in for the Chroma v2 API

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use gtm::client::http::ChromaConfig;
use gtm::client::{
  ChromaHttpClient, CollectionClient, CollectionHandle, Embedder, GetRequest, HttpEmbedder,
  QueryRequest,
};
use gtm::config::EmbeddingConfig;
use gtm::pager::{fetch_snapshot, PagerOptions};
use gtm::ViewerError;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

const TOKEN: &str = "ck-test";
const PREFIX: &str = "/api/v2/tenants/tenant-1/databases/customer";

#[derive(Default)]
struct Recorded {
  get_bodies: Vec<Value>,
  query_bodies: Vec<Value>,
  embedding_bodies: Vec<Value>,
}

type Shared = Arc<Mutex<Recorded>>;

fn authorized(headers: &HeaderMap) -> bool {
  headers.get("x-chroma-token").and_then(|v| v.to_str().ok()) == Some(TOKEN)
}

fn company(i: usize) -> Value {
  json!({ "company_name": format!("co-{i}"), "category": "customer" })
}

async fn list_collections(headers: HeaderMap) -> (StatusCode, Json<Value>) {
  if !authorized(&headers) {
    return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "bad token" })));
  }
  let collections = json!([{ "id": "c-1", "name": "leads" }, { "id": "c-2", "name": "news" }]);
  (StatusCode::OK, Json(collections))
}

async fn get_collection(Path(name): Path<String>) -> (StatusCode, Json<Value>) {
  match name.as_str() {
    "leads" => (StatusCode::OK, Json(json!({ "id": "c-1", "name": "leads", "metadata": null }))),
    _ => (StatusCode::NOT_FOUND, Json(json!({ "error": "NotFoundError" }))),
  }
}

async fn count(Path(id): Path<String>) -> Json<Value> {
  Json(json!(if id == "c-1" { 5 } else { 0 }))
}

async fn get_records(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
  let offset = body["offset"].as_u64().unwrap_or(0) as usize;
  let limit = body["limit"].as_u64().unwrap_or(0) as usize;
  state.lock().unwrap().get_bodies.push(body);

  let metadatas: Vec<Value> = (offset..(offset + limit).min(5)).map(company).collect();
  let ids: Vec<String> = (offset..(offset + limit).min(5)).map(|i| format!("id-{i}")).collect();
  Json(json!({ "ids": ids, "metadatas": metadatas, "documents": null, "include": ["metadatas"] }))
}

async fn query(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
  state.lock().unwrap().query_bodies.push(body);
  Json(json!({
    "ids": [["id-3", "id-1"]],
    "metadatas": [[company(3), company(1)]],
    "distances": [[0.12, 0.4]],
  }))
}

async fn embeddings(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
  state.lock().unwrap().embedding_bodies.push(body);
  Json(json!({
    "object": "list",
    "data": [{ "object": "embedding", "index": 0, "embedding": [0.1, 0.2, 0.3] }],
  }))
}

async fn serve() -> (String, Shared) {
  let state = Shared::default();
  let collections = format!("{PREFIX}/collections");
  let app = Router::new()
    .route(&collections, get(list_collections))
    .route(&format!("{collections}/{{collection}}"), get(get_collection))
    .route(&format!("{collections}/{{collection}}/count"), get(count))
    .route(&format!("{collections}/{{collection}}/get"), post(get_records))
    .route(&format!("{collections}/{{collection}}/query"), post(query))
    .route("/v1/embeddings", post(embeddings))
    .with_state(Arc::clone(&state));

  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let address = listener.local_addr().unwrap();
  tokio::spawn(async move {
    axum::serve(listener, app).await.unwrap();
  });
  (format!("http://{address}"), state)
}

fn chroma_config(base_url: &str, api_key: &str) -> ChromaConfig {
  ChromaConfig {
    base_url: base_url.to_string(),
    api_key: api_key.to_string(),
    tenant: "tenant-1".to_string(),
    database: "customer".to_string(),
    timeout_secs: 5,
  }
}

fn embedder(base_url: &str) -> HttpEmbedder {
  let config = EmbeddingConfig {
    url: format!("{base_url}/v1/embeddings"),
    model: "text-embedding-3-small".to_string(),
    api_key: Some("sk-test".to_string()),
  };
  HttpEmbedder::new(config, 5).unwrap()
}

#[tokio::test]
async fn test_lists_collections_with_token() {
  let (base_url, _) = serve().await;
  let client = ChromaHttpClient::new(chroma_config(&base_url, TOKEN)).unwrap();

  assert_eq!(client.list_collections().await.unwrap(), vec!["leads", "news"]);
}

#[tokio::test]
async fn test_bad_token_is_remote_error() {
  let (base_url, _) = serve().await;
  let client = ChromaHttpClient::new(chroma_config(&base_url, "wrong")).unwrap();

  let error = client.list_collections().await.unwrap_err();

  assert!(matches!(error, ViewerError::Remote { ref message, .. } if message.contains("401")));
}

#[tokio::test]
async fn test_missing_collection_is_unknown() {
  let (base_url, _) = serve().await;
  let client = ChromaHttpClient::new(chroma_config(&base_url, TOKEN)).unwrap();

  let error = client.get_collection("ghost").await.unwrap_err();

  assert!(matches!(error, ViewerError::UnknownCollection { .. }));
}

#[tokio::test]
async fn test_snapshot_pages_through_http() {
  let (base_url, state) = serve().await;
  let client = ChromaHttpClient::new(chroma_config(&base_url, TOKEN)).unwrap();

  let options = PagerOptions { batch_size: 2, max_pages: 10 };
  let snapshot = fetch_snapshot(&client, "leads", options).await.unwrap();

  assert_eq!(snapshot.reported_count, 5);
  assert_eq!(snapshot.len(), 5);
  assert_eq!(snapshot.records[4]["company_name"], json!("co-4"));

  let recorded = state.lock().unwrap();
  let bodies = &recorded.get_bodies;
  let offsets: Vec<u64> = bodies.iter().map(|b| b["offset"].as_u64().unwrap()).collect();
  assert_eq!(offsets, vec![0, 2, 4]);
  assert_eq!(bodies[0]["include"], json!(["metadatas"]));
}

#[tokio::test]
async fn test_query_embeds_text_first() {
  let (base_url, state) = serve().await;
  let client = ChromaHttpClient::new(chroma_config(&base_url, TOKEN))
    .unwrap()
    .with_embedder(Box::new(embedder(&base_url)));
  let handle = client.get_collection("leads").await.unwrap();

  let response = client.query(&handle, QueryRequest::text("vector search", 200)).await.unwrap();

  assert_eq!(response.distances[0], vec![Some(0.12), Some(0.4)]);
  assert_eq!(response.metadatas[0][0].as_ref().unwrap()["company_name"], json!("co-3"));

  let recorded = state.lock().unwrap();
  assert_eq!(recorded.embedding_bodies[0]["input"], json!(["vector search"]));
  assert_eq!(recorded.embedding_bodies[0]["model"], json!("text-embedding-3-small"));
  let query_body = &recorded.query_bodies[0];
  assert_eq!(query_body["n_results"], json!(200));
  assert_eq!(query_body["include"], json!(["metadatas", "distances"]));
  assert_eq!(query_body["query_embeddings"][0].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_embedder_returns_vectors() {
  let (base_url, _) = serve().await;

  let vectors = embedder(&base_url).embed(&["hello".to_string()]).await.unwrap();

  assert_eq!(vectors, vec![vec![0.1, 0.2, 0.3]]);
}

#[tokio::test]
async fn test_unreachable_service_is_remote_error() {
  let client = ChromaHttpClient::new(chroma_config("http://127.0.0.1:9", TOKEN)).unwrap();
  let handle = CollectionHandle::new("c-1", "leads");

  let error = client.get(&handle, GetRequest::metadata_page(10, 0)).await.unwrap_err();

  assert!(error.is_retrieval());
}
