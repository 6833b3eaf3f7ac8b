use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use tracing::warn;

use crate::GovRagError;

/// Client timeouts below this risk cutting off a cold-start generation
pub const RECOMMENDED_MIN_CLIENT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Label reported by the health endpoint
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default)]
    pub cors: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_environment() -> String {
    "Development".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            cors: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default = "default_true")]
    pub file_output: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

const fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: default_log_dir(),
            file_output: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    /// `hash`, `ollama` or `openai`
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_embedding_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,
}

fn default_embedding_provider() -> String {
    "ollama".to_string()
}

fn default_embedding_model() -> String {
    "bge-base-en-v1.5".to_string()
}

fn default_embedding_endpoint() -> String {
    "http://localhost:11434".to_string()
}

const fn default_embedding_dimension() -> usize {
    768
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            endpoint: default_embedding_endpoint(),
            api_key: None,
            dimension: default_embedding_dimension(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Directory holding the pre-built vector index
    #[serde(default = "default_index_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_index_dir() -> PathBuf {
    PathBuf::from("chroma_db")
}

const fn default_top_k() -> usize {
    5
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dir: default_index_dir(),
            top_k: default_top_k(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// `auto`, `local`, `hosted-inference` or `chat-completion`
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    #[serde(default = "default_local_endpoint")]
    pub local_endpoint: String,
    #[serde(default = "default_local_model")]
    pub local_model: String,

    #[serde(default = "default_inference_endpoint")]
    pub inference_endpoint: String,
    #[serde(default = "default_inference_model")]
    pub inference_model: String,
    #[serde(default)]
    pub inference_token: Option<String>,

    #[serde(default = "default_chat_endpoint")]
    pub chat_endpoint: String,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default)]
    pub chat_api_key: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_repetition_penalty")]
    pub repetition_penalty: f32,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_llm_provider() -> String {
    "auto".to_string()
}

fn default_local_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_local_model() -> String {
    "llama2:7b-chat".to_string()
}

fn default_inference_endpoint() -> String {
    "https://api-inference.huggingface.co".to_string()
}

fn default_inference_model() -> String {
    "meta-llama/Llama-2-7b-chat-hf".to_string()
}

fn default_chat_endpoint() -> String {
    "https://api.together.xyz/v1".to_string()
}

fn default_chat_model() -> String {
    "meta-llama/Llama-3.3-70B-Instruct-Turbo-Free".to_string()
}

const fn default_temperature() -> f32 {
    0.7
}

const fn default_max_new_tokens() -> u32 {
    512
}

const fn default_top_p() -> f32 {
    0.9
}

const fn default_repetition_penalty() -> f32 {
    1.1
}

const fn default_request_timeout() -> u64 {
    300
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            local_endpoint: default_local_endpoint(),
            local_model: default_local_model(),
            inference_endpoint: default_inference_endpoint(),
            inference_model: default_inference_model(),
            inference_token: None,
            chat_endpoint: default_chat_endpoint(),
            chat_model: default_chat_model(),
            chat_api_key: None,
            temperature: default_temperature(),
            max_new_tokens: default_max_new_tokens(),
            top_p: default_top_p(),
            repetition_penalty: default_repetition_penalty(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Full URL of the primary chat endpoint
    #[serde(default = "default_service_url")]
    pub service_url: String,
    /// Derived from `service_url` when absent
    #[serde(default)]
    pub legacy_url: Option<String>,
    #[serde(default = "default_client_timeout")]
    pub timeout_secs: u64,
}

fn default_service_url() -> String {
    "http://localhost:8000/chat".to_string()
}

const fn default_client_timeout() -> u64 {
    120
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service_url: default_service_url(),
            legacy_url: None,
            timeout_secs: default_client_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_timeout")]
    pub idle_timeout_secs: u64,
    /// Messages kept per session (user and assistant turns both count)
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
    /// Live sessions kept; the least recently active idle one is evicted beyond this
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

const fn default_session_timeout() -> u64 {
    3600
}

const fn default_max_messages() -> usize {
    20
}

const fn default_max_sessions() -> usize {
    10_000
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_session_timeout(),
            max_messages: default_max_messages(),
            max_sessions: default_max_sessions(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from the default paths, then apply environment overrides
    pub fn load() -> crate::Result<Self> {
        let mut config = if Path::new("config.toml").exists() {
            Self::from_file("config.toml")?
        } else if Path::new("config.example.toml").exists() {
            warn!("Using config.example.toml. Please create config.toml for production use.");
            Self::from_file("config.example.toml")?
        } else {
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, then apply environment overrides
    pub fn load_from<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply recognised environment variables; `lookup` abstracts `std::env::var`
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("GOVRAG_CHAT_API_KEY").or_else(|| non_empty("TOGETHER_API_KEY")) {
            self.llm.chat_api_key = Some(key);
        }
        if let Some(token) = non_empty("HUGGINGFACE_API_TOKEN") {
            self.llm.inference_token = Some(token);
        }
        if let Some(url) = non_empty("GOVRAG_SERVICE_URL").or_else(|| non_empty("FASTAPI_URL")) {
            self.client.service_url = url;
        }
        if let Some(dir) = non_empty("GOVRAG_INDEX_DIR") {
            self.index.dir = PathBuf::from(dir);
        }
        if let Some(level) = non_empty("GOVRAG_LOG_LEVEL") {
            self.logging.level = level;
        }
        if non_empty("RAILWAY_ENVIRONMENT").is_some() {
            self.server.environment = "Railway".to_string();
            self.server.host = "0.0.0.0".to_string();
        }
        if let Some(environment) = non_empty("GOVRAG_ENVIRONMENT") {
            self.server.environment = environment;
        }
        if let Some(host) = non_empty("HOST") {
            self.server.host = host;
        }
        if let Some(port) = non_empty("PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!("Ignoring invalid PORT value: {}", port),
            }
        }
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.index.top_k == 0 {
            return Err(GovRagError::ConfigError(
                "index.top_k must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(GovRagError::ConfigError(format!(
                "llm.temperature must be within [0, 2], got {}",
                self.llm.temperature
            )));
        }
        if self.llm.top_p <= 0.0 || self.llm.top_p > 1.0 {
            return Err(GovRagError::ConfigError(format!(
                "llm.top_p must be within (0, 1], got {}",
                self.llm.top_p
            )));
        }
        if self.llm.max_new_tokens == 0 {
            return Err(GovRagError::ConfigError(
                "llm.max_new_tokens must be greater than zero".to_string(),
            ));
        }
        if self.session.max_sessions == 0 {
            return Err(GovRagError::ConfigError(
                "session.max_sessions must be greater than zero".to_string(),
            ));
        }
        if self.client.timeout_secs < RECOMMENDED_MIN_CLIENT_TIMEOUT_SECS {
            warn!(
                "client.timeout_secs = {} is below the recommended {}s; cold-start generations may time out",
                self.client.timeout_secs, RECOMMENDED_MIN_CLIENT_TIMEOUT_SECS
            );
        }
        Ok(())
    }

    /// Address the service binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Get vector index directory
    pub fn index_dir(&self) -> &Path {
        &self.index.dir
    }

    /// Get number of chunks retrieved per question
    pub fn top_k(&self) -> usize {
        self.index.top_k
    }

    /// Copy with credentials replaced, for display
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mask = |value: &Option<String>| value.as_ref().map(|_| "********".to_string());
        let mut config = self.clone();
        config.embeddings.api_key = mask(&self.embeddings.api_key);
        config.llm.inference_token = mask(&self.llm.inference_token);
        config.llm.chat_api_key = mask(&self.llm.chat_api_key);
        config
    }
}
