//! Router-level tests over in-process fakes.

use std::sync::Arc;

use ai_llm_service::chat::{ChatCompletion, ChatMessage, ToolSpec};
use assistant::{Assistant, AssistantConfig, ChatModel, ModelFuture, ToolRegistry};
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use doc_ingest::IngestConfig;
use rag_store::{embed::hashing::HashingEmbedder, memory::MemoryStore};
use serde_json::{Value, json};
use tower::ServiceExt;

use super::*;

/// Answers every turn with the number of messages it was sent.
struct CountingModel;

impl ChatModel for CountingModel {
    fn complete<'a>(&'a self, messages: &'a [ChatMessage], _tools: &'a [ToolSpec]) -> ModelFuture<'a> {
        let n = messages.len();
        Box::pin(async move {
            Ok(ChatCompletion {
                content: format!("saw {n} messages"),
                tool_calls: Vec::new(),
            })
        })
    }
}

fn state() -> AppState {
    let store = Arc::new(MemoryStore::new(Arc::new(HashingEmbedder::new(128))));
    let assistant = Assistant::new(
        Arc::new(CountingModel),
        store.clone(),
        ToolRegistry::default(),
        AssistantConfig::default(),
    );
    AppState::new(Arc::new(assistant), store, None, IngestConfig::default())
}

async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty(method: &str, uri: &str) -> Request<Body> {
    Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_never_fails() {
    let app = router(state());
    let (status, body) = call(&app, empty("GET", "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn session_lifecycle_and_turns() {
    let app = router(state());

    let (_, created) = call(&app, empty("POST", "/sessions")).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("chat_"));

    let uri = format!("/sessions/{id}/messages");
    let (status, first) = call(&app, post_json(&uri, json!({"question": "What is an ETF?"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["data"]["answer"], "saw 1 messages");
    assert_eq!(first["data"]["segments"][0]["kind"], "text");

    // Second turn replays the first (user + assistant) plus the new prompt.
    let (_, second) = call(&app, post_json(&uri, json!({"question": "And its fees?"}))).await;
    assert_eq!(second["data"]["answer"], "saw 3 messages");

    let (_, transcript) = call(&app, empty("GET", &format!("/sessions/{id}"))).await;
    assert_eq!(transcript["data"]["transcript"].as_array().unwrap().len(), 4);
    assert_eq!(transcript["data"]["transcript"][0]["role"], "user");

    let (status, _) = call(&app, empty("DELETE", &format!("/sessions/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = call(&app, empty("GET", &format!("/sessions/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn empty_question_is_a_bad_request() {
    let app = router(state());
    let (_, created) = call(&app, empty("POST", "/sessions")).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        post_json(&format!("/sessions/{id}/messages"), json!({"question": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn select_switches_current() {
    let app = router(state());
    let (_, a) = call(&app, empty("POST", "/sessions")).await;
    let a = a["data"]["id"].as_str().unwrap().to_string();
    call(&app, empty("POST", "/sessions")).await;

    let (status, list) = call(&app, empty("POST", &format!("/sessions/{a}/select"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["data"]["current"], a.as_str());
    assert_eq!(list["data"]["sessions"].as_array().unwrap().len(), 2);

    let (status, _) = call(&app, empty("POST", "/sessions/chat_missing/select")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn multipart_upload_reports_chunks_and_failures() {
    let boundary = "finwise-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"company\"\r\n\r\nAcme\r\n\
--{b}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"expenses.csv\"\r\nContent-Type: text/csv\r\n\r\nCategory,Amount\nGroceries,500\nRent,1200\n\r\n\
--{b}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"deck.pptx\"\r\nContent-Type: application/octet-stream\r\n\r\nPK\r\n\
--{b}--\r\n",
        b = boundary
    );
    let req = Request::post("/documents")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let app = router(state());
    let (status, res) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res["data"]["chunks"], 2);
    assert_eq!(res["data"]["failures"][0]["file"], "deck.pptx");
}

#[tokio::test]
async fn malformed_json_gets_the_envelope() {
    let app = router(state());
    let (_, created) = call(&app, empty("POST", "/sessions")).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let req = Request::post(format!("/sessions/{id}/messages"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"q\": 1}"))
        .unwrap();
    let (status, body) = call(&app, req).await;
    assert!(status.is_client_error());
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn startup_config_errors_are_typed() {
    use axum::response::IntoResponse;

    let err = AppError::from(assistant::AssistantConfigError::ZeroTopK);
    assert_eq!(err.to_string(), "RAG_TOP_K must be > 0");

    let res = err.into_response();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], "CONFIG_ERROR");
}
