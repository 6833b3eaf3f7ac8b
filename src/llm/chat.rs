//! Hosted chat-completion backend (OpenAI / Together compatible)

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::errors::GovRagError;
use crate::errors::Result;
use crate::llm::error_from_response;
use crate::llm::LlmBackend;
use crate::llm::SamplingParams;
use crate::models::PromptMessages;

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Sends the full role array; preferred when a credential is available
pub struct ChatCompletionBackend {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    params: SamplingParams,
}

impl ChatCompletionBackend {
    pub fn new(
        client: Client,
        endpoint: String,
        model: String,
        api_key: String,
        params: SamplingParams,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model,
            api_key,
            params,
        }
    }
}

#[async_trait]
impl LlmBackend for ChatCompletionBackend {
    async fn generate(&self, messages: &PromptMessages) -> Result<String> {
        let url = format!("{}/chat/completions", self.endpoint);
        debug!("Calling chat-completion API: {} ({} messages)", url, messages.len());

        let request = ChatRequest {
            model: &self.model,
            messages: messages
                .messages()
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            temperature: self.params.temperature,
            max_tokens: self.params.max_new_tokens,
            top_p: self.params.top_p,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GovRagError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_from_response("Chat-completion", response).await);
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| GovRagError::Generation(format!("Failed to parse response: {e}")))?;

        result
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default().trim().to_string())
            .ok_or_else(|| GovRagError::Generation("No choices in response".to_string()))
    }

    fn describe(&self) -> String {
        format!("chat-completion ({} @ {})", self.model, self.endpoint)
    }
}
