//! Local inference backend (Ollama-compatible runtime on this host)

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;

use crate::errors::GovRagError;
use crate::errors::Result;
use crate::llm::error_from_response;
use crate::llm::flatten_messages;
use crate::llm::LlmBackend;
use crate::llm::SamplingParams;
use crate::models::PromptMessages;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
    top_p: f32,
    repeat_penalty: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Generation on a locally served causal model.
///
/// The first call loads weights and is much slower than the rest.
pub struct LocalInferenceBackend {
    client: Client,
    endpoint: String,
    model: String,
    params: SamplingParams,
    warmed_up: AtomicBool,
}

impl LocalInferenceBackend {
    pub fn new(client: Client, endpoint: String, model: String, params: SamplingParams) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model,
            params,
            warmed_up: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl LlmBackend for LocalInferenceBackend {
    async fn generate(&self, messages: &PromptMessages) -> Result<String> {
        let first_call = !self.warmed_up.load(Ordering::Acquire);
        if first_call {
            info!("⚠️  First generation with {} - model load may take several minutes", self.model);
        }

        let url = format!("{}/api/generate", self.endpoint);
        let prompt = flatten_messages(messages);
        debug!("Calling local inference runtime: {} ({} chars)", url, prompt.len());

        let request = GenerateRequest {
            model: &self.model,
            prompt: &prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.params.temperature,
                num_predict: self.params.max_new_tokens,
                top_p: self.params.top_p,
                repeat_penalty: self.params.repetition_penalty,
            },
        };

        let started = Instant::now();
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| GovRagError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_from_response("Local inference", response).await);
        }

        let result: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GovRagError::Generation(format!("Failed to parse response: {e}")))?;

        if first_call {
            self.warmed_up.store(true, Ordering::Release);
            info!("✅ Local model ready after {:.1}s", started.elapsed().as_secs_f32());
        }

        Ok(result.response.trim().to_string())
    }

    fn describe(&self) -> String {
        format!("local ({} @ {})", self.model, self.endpoint)
    }
}

#[cfg(test)]
mod tests {
    use axum::routing::post;
    use axum::Json;
    use axum::Router;
    use serde_json::json;
    use serde_json::Value;

    use super::*;
    use crate::models::ConversationHistory;
    use crate::models::RetrievedContext;
    use crate::rag::PromptAssembler;
    use crate::test_support::spawn_stub;

    #[tokio::test]
    async fn test_generate_sends_options_and_marks_warm() {
        let app = Router::new().route(
            "/api/generate",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["model"], "llama2:7b-chat");
                assert_eq!(body["stream"], false);
                assert_eq!(body["options"]["num_predict"], 512);
                Json(json!({"response": "I don't know.\n", "done": true}))
            }),
        );
        let addr = spawn_stub(app).await;

        let backend = LocalInferenceBackend::new(
            Client::new(),
            format!("http://{addr}"),
            "llama2:7b-chat".to_string(),
            SamplingParams::default(),
        );
        let prompt = PromptAssembler::new().build(
            "q",
            &RetrievedContext::default(),
            &ConversationHistory::new(),
        );

        assert!(!backend.warmed_up.load(Ordering::Acquire));
        assert_eq!(backend.generate(&prompt).await.unwrap(), "I don't know.");
        assert!(backend.warmed_up.load(Ordering::Acquire));
    }

    #[tokio::test]
    async fn test_unreachable_runtime_is_http_error() {
        let backend = LocalInferenceBackend::new(
            Client::new(),
            "http://127.0.0.1:1".to_string(),
            "m".to_string(),
            SamplingParams::default(),
        );
        let prompt = PromptAssembler::new().build(
            "q",
            &RetrievedContext::default(),
            &ConversationHistory::new(),
        );

        assert!(matches!(
            backend.generate(&prompt).await,
            Err(GovRagError::Http(_))
        ));
    }
}
