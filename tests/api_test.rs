use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::http::StatusCode;
use axum::Router;
use govrag::api::build_app;
use govrag::api::session::SessionManager;
use govrag::api::AppState;
use govrag::client::is_schema_mismatch;
use govrag::embeddings::HashingEmbedder;
use govrag::llm::LlmBackend;
use govrag::models::DocumentChunk;
use govrag::models::PromptMessages;
use govrag::models::Role;
use govrag::rag::RagService;
use govrag::rag::VectorIndex;
use govrag::rag::GENERATION_FAILURE_APOLOGY;
use govrag::GovRagError;
use govrag::Result;
use serde_json::json;
use serde_json::Value;
use tokio::sync::Notify;
use tower::ServiceExt;

/// Questions containing this marker wait on the backend gate
const GATED: &str = "[gated]";

struct EchoBackend {
    reply: Option<String>,
    calls: AtomicUsize,
    delay: Duration,
    gate: Notify,
}

impl EchoBackend {
    fn new(reply: Option<&str>) -> Self {
        Self {
            reply: reply.map(str::to_string),
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            gate: Notify::new(),
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl LlmBackend for EchoBackend {
    async fn generate(&self, messages: &PromptMessages) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gated = messages
            .last_user_message()
            .is_some_and(|m| m.content.contains(GATED));
        if gated {
            self.gate.notified().await;
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.reply {
            Some(reply) => Ok(format!("{reply} ({} messages)", messages.len())),
            None => Err(GovRagError::Generation("backend offline".to_string())),
        }
    }

    fn describe(&self) -> String {
        "echo".to_string()
    }
}

struct Harness {
    app: Router,
    rag: Arc<RagService>,
    backend: Arc<EchoBackend>,
    sessions: Arc<SessionManager>,
}

async fn harness(reply: Option<&str>, initialize: bool) -> Harness {
    harness_with(EchoBackend::new(reply), initialize).await
}

async fn harness_with(backend: EchoBackend, initialize: bool) -> Harness {
    let embedder = HashingEmbedder::try_new("hash", 256).unwrap();
    let text = "AI governance means oversight of automated decisions.";
    let chunks = vec![DocumentChunk {
        id: "1".to_string(),
        text: text.to_string(),
        source_name: "AI_Principles".to_string(),
        embedding: embedder.embed_text(text),
    }];
    let index = VectorIndex::from_chunks("hash", 256, chunks).unwrap();

    let backend = Arc::new(backend);
    let rag = Arc::new(RagService::with_components(
        Arc::new(embedder),
        Arc::new(index),
        backend.clone(),
    ));
    if initialize {
        rag.initialize().await.unwrap();
    }

    let sessions = Arc::new(SessionManager::new(3600, 20));
    let state = AppState {
        rag: rag.clone(),
        session_manager: sessions.clone(),
        environment: "Test".to_string(),
    };

    Harness {
        app: build_app(state, false),
        rag,
        backend,
        sessions,
    }
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let content_type = body.map(|_| "application/json");
    send_with(app, method, uri, body, content_type).await
}

async fn send_with(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<&str>,
    content_type: Option<&str>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        request = request.header("content-type", content_type);
    }
    let request = request
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_chat_returns_answer() {
    let h = harness(Some("Oversight. Sources: AI_Principles"), true).await;

    let (status, body) = send(
        &h.app,
        "POST",
        "/chat",
        Some(r#"{"question": "What is AI governance?"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "Oversight. Sources: AI_Principles (2 messages)");
    assert!(body.get("session_id").is_none());
}

#[tokio::test]
async fn test_chat_blank_question_is_client_error() {
    let h = harness(Some("unused"), true).await;

    let (status, body) = send(&h.app, "POST", "/chat", Some(r#"{"question": "   "}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("question"));
    assert_eq!(h.backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_chat_wrong_shape_is_schema_mismatch() {
    let h = harness(Some("unused"), true).await;

    let (status, body) = send(&h.app, "POST", "/chat", Some(r#"{"message": "hi"}"#)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "schema_mismatch");
    assert_eq!(h.backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_chat_malformed_json_is_schema_mismatch() {
    let h = harness(Some("unused"), true).await;

    let (status, body) = send(&h.app, "POST", "/chat", Some("{\"question\": ")).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "schema_mismatch");
}

#[tokio::test]
async fn test_chat_oversized_body_is_not_schema_mismatch() {
    let h = harness(Some("unused"), true).await;
    let question = json!({"question": "a".repeat(70_000)}).to_string();

    let (status, body) = send(&h.app, "POST", "/chat", Some(question.as_str())).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["code"], "payload_too_large");
    assert!(!is_schema_mismatch(&body.to_string()));
    assert_eq!(h.backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_chat_missing_content_type_is_not_schema_mismatch() {
    let h = harness(Some("unused"), true).await;

    let (status, body) = send_with(
        &h.app,
        "POST",
        "/chat",
        Some(r#"{"question": "What is AI governance?"}"#),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["code"], "unsupported_media_type");
    assert!(!is_schema_mismatch(&body.to_string()));
    assert_eq!(h.backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_legacy_accepts_older_shapes() {
    let h = harness(Some("legacy ok"), true).await;

    let (status, body) =
        send(&h.app, "POST", "/chat-legacy", Some(r#"{"message": "What is AI governance?"}"#))
            .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "legacy ok (2 messages)");

    let (status, _) = send(&h.app, "POST", "/chat-legacy", Some("{broken")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(h.backend.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_not_ready_is_service_unavailable() {
    let h = harness(Some("unused"), false).await;

    let (status, body) = send(&h.app, "POST", "/chat", Some(r#"{"question": "q"}"#)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "not_initialized");
    assert_eq!(h.backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_backend_failure_is_contained() {
    let h = harness(None, true).await;

    let (status, body) = send(&h.app, "POST", "/chat", Some(r#"{"question": "q"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], GENERATION_FAILURE_APOLOGY);
}

#[tokio::test]
async fn test_health_does_not_initialize() {
    let h = harness(Some("unused"), false).await;

    let (status, body) = send(&h.app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "Uninitialized");
    assert_eq!(body["ready"], false);
    assert_eq!(body["environment"], "Test");
    assert!(!h.rag.is_ready());

    h.rag.initialize().await.unwrap();
    let (_, body) = send(&h.app, "GET", "/health", None).await;
    assert_eq!(body["state"], "Ready");
    assert_eq!(body["backend"], "echo");
}

#[tokio::test]
async fn test_sessions_keep_their_own_history() {
    let h = harness(Some("reply"), true).await;

    let ask = |session: &str| {
        json!({"question": "What is AI governance?", "session_id": session}).to_string()
    };

    let (_, first) = send(&h.app, "POST", "/chat", Some(ask("alice").as_str())).await;
    assert_eq!(first["session_id"], "alice");
    assert_eq!(first["answer"], "reply (2 messages)");

    // System + previous exchange + current question
    let (_, second) = send(&h.app, "POST", "/chat", Some(ask("alice").as_str())).await;
    assert_eq!(second["answer"], "reply (4 messages)");

    let (_, other) = send(&h.app, "POST", "/chat", Some(ask("bob").as_str())).await;
    assert_eq!(other["answer"], "reply (2 messages)");

    // Stateless requests never accumulate history
    let (_, stateless) =
        send(&h.app, "POST", "/chat", Some(r#"{"question": "What is AI governance?"}"#)).await;
    assert_eq!(stateless["answer"], "reply (2 messages)");
}

#[tokio::test]
async fn test_same_session_requests_are_serialized() {
    let h = harness_with(
        EchoBackend::new(Some("reply")).with_delay(Duration::from_millis(50)),
        true,
    )
    .await;
    let body = json!({"question": "What is AI governance?", "session_id": "shared"}).to_string();

    let (first, second) = tokio::join!(
        send(&h.app, "POST", "/chat", Some(body.as_str())),
        send(&h.app, "POST", "/chat", Some(body.as_str())),
    );

    assert_eq!(first.0, StatusCode::OK);
    assert_eq!(second.0, StatusCode::OK);
    let mut answers = vec![
        first.1["answer"].as_str().unwrap().to_string(),
        second.1["answer"].as_str().unwrap().to_string(),
    ];
    answers.sort();
    // The second exchange saw the first one complete
    assert_eq!(answers, vec!["reply (2 messages)", "reply (4 messages)"]);

    let session = h.sessions.get_or_create("shared").unwrap();
    let history = session.history.lock().await;
    let roles: Vec<Role> = history.turns().iter().map(|t| t.role).collect();
    assert_eq!(
        roles,
        vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
    );
}

#[tokio::test]
async fn test_slow_generation_does_not_block_other_requests() {
    let h = harness(Some("reply"), true).await;

    let app = h.app.clone();
    let slow = tokio::spawn(async move {
        let body = json!({"question": format!("What is AI governance? {GATED}"), "session_id": "slow"})
            .to_string();
        send(&app, "POST", "/chat", Some(body.as_str())).await
    });

    let (status, body) = tokio::time::timeout(
        Duration::from_secs(5),
        send(&h.app, "POST", "/chat", Some(r#"{"question": "What is data retention?"}"#)),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "reply (2 messages)");
    assert!(!slow.is_finished());

    h.backend.gate.notify_one();
    let (status, body) = slow.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_id"], "slow");
}
