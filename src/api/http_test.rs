use super::*;
use crate::storage::MemoryStorage;
use axum::Json;
use axum::Router;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use serde_json::json;

async fn spawn_backend() -> String {
    async fn echo_auth(headers: HeaderMap) -> Json<Value> {
        let auth = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        Json(json!({ "authorization": auth }))
    }

    async fn echo(Json(body): Json<Value>) -> Json<Value> {
        Json(json!({ "received": body }))
    }

    let app = Router::new()
        .route("/api/whoami", get(echo_auth))
        .route("/api/echo", post(echo))
        .route(
            "/api/polls/{id}",
            get(|| async { (StatusCode::NOT_FOUND, Json(json!({ "error": "Poll not found" }))) })
                .delete(|| async { "Poll deleted" }),
        )
        .route("/api/boom", get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }))
        .route("/api/empty", delete(|| async { StatusCode::OK }))
        .route("/api/garbage", get(|| async { "not json" }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api/")
}

fn client(base_url: String, storage: Arc<dyn KeyValueStore>) -> HttpApi {
    let config = ClientConfig { base_url, ..ClientConfig::default() };
    HttpApi::new(&config, storage).unwrap()
}

// =============================================================================
// URL handling
// =============================================================================

#[test]
fn base_url_trailing_slash_trimmed() {
    let api = client("http://localhost:8080/api/".into(), Arc::new(MemoryStorage::new()));
    assert_eq!(api.base_url(), "http://localhost:8080/api");
    assert_eq!(api.url("/polls/3"), "http://localhost:8080/api/polls/3");
    assert_eq!(api.url("vote"), "http://localhost:8080/api/vote");
}

// =============================================================================
// parse_body
// =============================================================================

#[test]
fn parse_body_empty_is_null() {
    assert_eq!(parse_body(""), Value::Null);
    assert_eq!(parse_body("  \n"), Value::Null);
}

#[test]
fn parse_body_non_json_is_string() {
    assert_eq!(parse_body("<html>"), Value::String("<html>".into()));
}

#[test]
fn parse_body_json_is_parsed() {
    assert_eq!(parse_body(r#"{"id":1}"#), json!({ "id": 1 }));
}

// =============================================================================
// Live requests against an in-process backend
// =============================================================================

#[tokio::test]
async fn request_without_token_sends_no_authorization() {
    let base = spawn_backend().await;
    let api = client(base, Arc::new(MemoryStorage::new()));

    let body = api.get("/whoami").await.unwrap();
    assert_eq!(body, json!({ "authorization": null }));
}

#[tokio::test]
async fn request_reads_token_from_storage_each_call() {
    let base = spawn_backend().await;
    let storage = Arc::new(MemoryStorage::new());
    let api = client(base, storage.clone());

    storage.set(TOKEN_KEY, "tok-123");
    let body = api.get("/whoami").await.unwrap();
    assert_eq!(body, json!({ "authorization": "Bearer tok-123" }));

    storage.remove(TOKEN_KEY);
    let body = api.get("/whoami").await.unwrap();
    assert_eq!(body, json!({ "authorization": null }));
}

#[tokio::test]
async fn post_sends_json_body() {
    let base = spawn_backend().await;
    let api = client(base, Arc::new(MemoryStorage::new()));

    let body = api.post("/echo", json!({ "poll_id": 1, "option_id": 2 })).await.unwrap();
    assert_eq!(body, json!({ "received": { "poll_id": 1, "option_id": 2 } }));
}

#[tokio::test]
async fn error_status_carries_backend_message() {
    let base = spawn_backend().await;
    let api = client(base, Arc::new(MemoryStorage::new()));

    let err = api.get("/polls/99").await.unwrap_err();
    assert_eq!(err, ApiError::Response { status: 404, message: Some("Poll not found".into()) });
    assert_eq!(err.backend_message(), Some("Poll not found"));
}

#[tokio::test]
async fn error_status_without_json_has_no_message() {
    let base = spawn_backend().await;
    let api = client(base, Arc::new(MemoryStorage::new()));

    let err = api.get("/boom").await.unwrap_err();
    assert_eq!(err, ApiError::Response { status: 500, message: None });
}

#[tokio::test]
async fn empty_success_body_is_null() {
    let base = spawn_backend().await;
    let api = client(base, Arc::new(MemoryStorage::new()));

    assert_eq!(api.delete("/empty").await.unwrap(), Value::Null);
}

#[tokio::test]
async fn non_json_success_body_is_string() {
    let base = spawn_backend().await;
    let api = client(base, Arc::new(MemoryStorage::new()));

    assert_eq!(api.get("/garbage").await.unwrap(), Value::String("not json".into()));
}

#[tokio::test]
async fn plain_text_delete_succeeds() {
    let base = spawn_backend().await;
    let api = client(base, Arc::new(MemoryStorage::new()));

    assert_eq!(api.delete("/polls/3").await.unwrap(), Value::String("Poll deleted".into()));
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = client(format!("http://{addr}/api"), Arc::new(MemoryStorage::new()));
    let err = api.get("/polls").await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(err.backend_message(), None);
    assert_eq!(err.status(), None);
}
