//! Client for the chat service
//!
//! Any front end (the CLI included) talks to the service through [`ChatClient`]:
//! - `POST /chat` first; on a schema-mismatch 422, exactly one retry against
//!   `/chat-legacy` with the same payload
//! - connection failures, timeouts and other HTTP errors map to distinct
//!   [`TransportError`] variants, none of which is retried

pub mod reply;

use std::time::Duration;

use reqwest::Client;
use reqwest::StatusCode;
use tracing::debug;
use tracing::info;
use tracing::warn;
use url::Url;

pub use reply::is_schema_mismatch;
pub use reply::ChatReply;

use crate::api::types::ChatRequest;
use crate::api::types::HealthResponse;
use crate::config::ClientConfig;
use crate::config::RECOMMENDED_MIN_CLIENT_TIMEOUT_SECS;
use crate::errors::GovRagError;
use crate::errors::TransportError;

/// HTTP client for `/chat` with legacy fallback
pub struct ChatClient {
    http: Client,
    chat_url: Url,
    legacy_url: Url,
    timeout_secs: u64,
}

impl ChatClient {
    /// Build from configuration; the legacy URL is derived when not set
    pub fn new(config: &ClientConfig) -> crate::Result<Self> {
        let chat_url = Url::parse(&config.service_url)?;
        let legacy_url = match &config.legacy_url {
            Some(url) => Url::parse(url)?,
            None => legacy_url_for(&chat_url),
        };

        if config.timeout_secs < RECOMMENDED_MIN_CLIENT_TIMEOUT_SECS {
            warn!(
                "Client timeout {}s is below the recommended {}s",
                config.timeout_secs, RECOMMENDED_MIN_CLIENT_TIMEOUT_SECS
            );
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GovRagError::Http(e.to_string()))?;

        Ok(Self {
            http,
            chat_url,
            legacy_url,
            timeout_secs: config.timeout_secs,
        })
    }

    #[must_use]
    pub const fn chat_url(&self) -> &Url {
        &self.chat_url
    }

    #[must_use]
    pub const fn legacy_url(&self) -> &Url {
        &self.legacy_url
    }

    /// Send one question
    pub async fn ask(
        &self,
        question: &str,
        session_id: Option<&str>,
    ) -> Result<ChatReply, TransportError> {
        let payload = ChatRequest {
            question: question.to_string(),
            session_id: session_id.map(str::to_string),
        };

        debug!("📡 Sending request to: {}", self.chat_url);
        let (mut status, mut body) = self.post(&self.chat_url, &payload).await?;
        debug!("📨 Response status: {}", status);

        if status == StatusCode::UNPROCESSABLE_ENTITY && is_schema_mismatch(&body) {
            info!("🔄 Schema mismatch, retrying once via {}", self.legacy_url);
            (status, body) = self.post(&self.legacy_url, &payload).await?;
            debug!("📨 Legacy response status: {}", status);
        }

        ChatReply::from_response(status, &body)
    }

    /// Send one question and produce the text to show, whatever happened
    pub async fn ask_rendered(&self, question: &str, session_id: Option<&str>) -> String {
        match self.ask(question, session_id).await {
            Ok(reply) => reply.render(),
            Err(e) => {
                warn!("Chat request failed: {}", e);
                e.user_message()
            }
        }
    }

    /// Fetch the readiness report from `GET /`
    pub async fn health(&self) -> Result<HealthResponse, TransportError> {
        let url = health_url_for(&self.chat_url);
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.classify(&url, &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

        // A failed pipeline reports 503 with a regular health body
        serde_json::from_str(&body).map_err(|_| TransportError::Http {
            status: status.as_u16(),
            body,
        })
    }

    async fn post(
        &self,
        url: &Url,
        payload: &ChatRequest,
    ) -> Result<(StatusCode, String), TransportError> {
        let response = self
            .http
            .post(url.clone())
            .json(payload)
            .send()
            .await
            .map_err(|e| self.classify(url, &e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                self.classify(url, &e)
            } else {
                TransportError::InvalidResponse(e.to_string())
            }
        })?;
        Ok((status, body))
    }

    fn classify(&self, url: &Url, err: &reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                url: url.to_string(),
                timeout_secs: self.timeout_secs,
            }
        } else if err.is_connect() {
            TransportError::Connection {
                url: url.to_string(),
                reason: err.to_string(),
            }
        } else {
            TransportError::InvalidResponse(err.to_string())
        }
    }
}

/// `.../chat` becomes `.../chat-legacy`; any other path gets a sibling `chat-legacy`
#[must_use]
pub fn legacy_url_for(chat_url: &Url) -> Url {
    let mut legacy = chat_url.clone();
    let path = chat_url.path().trim_end_matches('/');
    if path.ends_with("/chat") {
        legacy.set_path(&format!("{path}-legacy"));
    } else {
        legacy.set_path(&format!("{path}/chat-legacy"));
    }
    legacy
}

fn health_url_for(chat_url: &Url) -> Url {
    let mut health = chat_url.clone();
    let path = chat_url.path().trim_end_matches('/');
    let base = path.strip_suffix("/chat").unwrap_or(path);
    health.set_path(&format!("{base}/"));
    health
}
