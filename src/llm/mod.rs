//! Language-model backends
//!
//! Every backend takes the same [`PromptMessages`] and returns raw text. Three
//! variants exist and exactly one is chosen at startup:
//! - [`LocalInferenceBackend`]: a model served on this host, fed a flattened transcript
//! - [`HostedInferenceBackend`]: a remote text-generation endpoint, flattened transcript
//! - [`ChatCompletionBackend`]: a remote chat-completion API with role-structured messages
//!
//! Sampling is fixed by configuration. With a non-zero temperature output is not
//! deterministic, so tests stub the [`LlmBackend`] trait instead of asserting on
//! model text.

pub mod chat;
pub mod inference;
pub mod local;
pub mod prompts;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

pub use chat::ChatCompletionBackend;
pub use inference::HostedInferenceBackend;
pub use local::LocalInferenceBackend;
pub use prompts::flatten_messages;

use crate::config::AppConfig;
use crate::config::LlmConfig;
use crate::errors::GovRagError;
use crate::errors::Result;
use crate::models::PromptMessages;

/// Text generation capability shared by all backend variants
#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn generate(&self, messages: &PromptMessages) -> Result<String>;

    /// Human-readable provider and model, e.g. for the health endpoint
    fn describe(&self) -> String;
}

/// Fixed sampling policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_new_tokens: u32,
    pub top_p: f32,
    pub repetition_penalty: f32,
}

impl SamplingParams {
    #[must_use]
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_new_tokens: config.max_new_tokens,
            top_p: config.top_p,
            repetition_penalty: config.repetition_penalty,
        }
    }
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self::from_config(&LlmConfig::default())
    }
}

/// Backend variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Local,
    HostedInference,
    ChatCompletion,
}

impl LlmProvider {
    /// Resolve `llm.provider`; `auto` picks by which credential is configured
    pub fn resolve(config: &LlmConfig) -> Result<Self> {
        match config.provider.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "hosted-inference" | "huggingface" => Ok(Self::HostedInference),
            "chat-completion" | "together" | "openai" => Ok(Self::ChatCompletion),
            "auto" => Ok(if config.chat_api_key.is_some() {
                Self::ChatCompletion
            } else if config.inference_token.is_some() {
                Self::HostedInference
            } else {
                Self::Local
            }),
            other => Err(GovRagError::ConfigError(format!(
                "Unknown llm.provider '{other}' (expected auto, local, hosted-inference or chat-completion)"
            ))),
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Local => "local",
            Self::HostedInference => "hosted-inference",
            Self::ChatCompletion => "chat-completion",
        };
        f.write_str(name)
    }
}

/// Pick and construct the backend once, at startup
pub fn select_backend(config: &AppConfig) -> Result<Arc<dyn LlmBackend>> {
    let llm = &config.llm;
    let provider = LlmProvider::resolve(llm)?;
    let params = SamplingParams::from_config(llm);
    let client = build_http_client(llm.request_timeout_secs)?;

    let backend: Arc<dyn LlmBackend> = match provider {
        LlmProvider::Local => Arc::new(LocalInferenceBackend::new(
            client,
            llm.local_endpoint.clone(),
            llm.local_model.clone(),
            params,
        )),
        LlmProvider::HostedInference => {
            let token = llm.inference_token.clone().ok_or_else(|| {
                GovRagError::ConfigError(
                    "hosted-inference backend requires HUGGINGFACE_API_TOKEN".to_string(),
                )
            })?;
            Arc::new(HostedInferenceBackend::new(
                client,
                llm.inference_endpoint.clone(),
                llm.inference_model.clone(),
                token,
                params,
            ))
        }
        LlmProvider::ChatCompletion => {
            let api_key = llm.chat_api_key.clone().ok_or_else(|| {
                GovRagError::ConfigError(
                    "chat-completion backend requires TOGETHER_API_KEY or GOVRAG_CHAT_API_KEY"
                        .to_string(),
                )
            })?;
            Arc::new(ChatCompletionBackend::new(
                client,
                llm.chat_endpoint.clone(),
                llm.chat_model.clone(),
                api_key,
                params,
            ))
        }
    };

    info!("🤖 Language model backend selected: {}", backend.describe());
    Ok(backend)
}

fn build_http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| GovRagError::Http(e.to_string()))
}

/// Turn a non-success HTTP response into a generation error
pub(crate) async fn error_from_response(backend: &str, response: reqwest::Response) -> GovRagError {
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    GovRagError::Generation(format!("{backend} API error ({status}): {error_text}"))
}
