/// Chat handlers
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::ApiError;
use super::AppState;
use crate::api::types::ChatRequest;
use crate::api::types::ChatResponse;
use crate::errors::GovRagError;
use crate::logging::preview;
use crate::models::ConversationHistory;

/// POST /chat
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("POST /chat rejected: {}", rejection.body_text());
        ApiError::from_json_rejection(&rejection)
    })?;
    info!("POST /chat: {}", preview(&request.question));

    respond(state, request).await
}

/// POST /chat-legacy: accepts any body, a missing question counts as empty
pub async fn chat_legacy(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChatResponse>, ApiError> {
    let request = ChatRequest::from_legacy_body(&body);
    info!("POST /chat-legacy: {}", preview(&request.question));

    respond(state, request).await
}

async fn respond(state: AppState, request: ChatRequest) -> Result<Json<ChatResponse>, ApiError> {
    // Checked before any session lookup or task spawn
    if request.question.trim().is_empty() {
        return Err(GovRagError::InvalidQuestion("question must not be empty".to_string()).into());
    }

    let session = request
        .session_id
        .as_deref()
        .map(|id| state.session_manager.get_or_create(id))
        .transpose()?;
    let session_id = session.as_ref().map(|s| s.session_id.clone());

    let rag = state.rag.clone();
    let question = request.question;

    // Generation runs on its own task so slow backends do not hold up this worker
    let task = tokio::spawn(async move {
        match session {
            Some(session) => {
                let mut history = session.history.lock().await;
                rag.answer(&question, &mut history).await
            }
            None => {
                let mut history = ConversationHistory::new();
                rag.answer(&question, &mut history).await
            }
        }
    });

    let outcome = task.await.map_err(|e| {
        error!("Chat task failed: {}", e);
        GovRagError::Generation(e.to_string())
    })?;
    if let Some(id) = &session_id {
        state.session_manager.touch(id);
    }
    let answer = outcome?;

    Ok(Json(ChatResponse {
        answer: answer.text,
        session_id,
    }))
}
