use thiserror::Error;

#[derive(Error, Debug)]
pub enum GovRagError {
    /// Blank or missing question; never reaches the retriever or backend
    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    #[error("RAG pipeline not initialized: {0}")]
    NotInitialized(String),

    #[error("Vector index unavailable: {0}")]
    RetrievalUnavailable(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GovRagError {
    /// Whether the caller is at fault (maps to a 4xx at the service boundary)
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidQuestion(_))
    }

    /// Whether the pipeline is not (or never will be) able to serve queries
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::NotInitialized(_) | Self::RetrievalUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, GovRagError>;

/// Failures seen by a front end talking to the chat service.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Server unreachable
    #[error("Cannot connect to the API server at {url}: {reason}")]
    Connection { url: String, reason: String },

    /// Server reachable but did not answer before the deadline
    #[error("The API server at {url} did not respond within {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    #[error("API error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    /// Text shown to the user in place of an answer
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Connection { url, .. } => format!(
                "❌ **Connection Error**\n\n\
                 Cannot connect to the API server at {url}\n\n\
                 **Troubleshooting:**\n\
                 1. The API server may still be starting up\n\
                 2. Check that the server is reachable at {url}\n\
                 3. Verify no firewall is blocking the connection\n\n\
                 *Please try again in a few seconds.*"
            ),
            Self::Timeout { timeout_secs, .. } => format!(
                "⏱️ **Timeout Error**\n\n\
                 The API server took too long to respond (>{timeout_secs}s).\n\
                 This usually happens while the language model is loading for the first time.\n\n\
                 **Please try again** - subsequent requests should be faster."
            ),
            Self::Http { status, body } => format!("❌ API Error: {status} - {body}"),
            Self::InvalidResponse(detail) => format!(
                "🔥 **Unexpected Error**\n\n{detail}\n\n\
                 Please try again or contact support if the issue persists."
            ),
        }
    }
}
