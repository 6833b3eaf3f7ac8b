//! Embeddings generation module
//!
//! Turns question text into vectors comparable with the pre-built index:
//! - Ollama (local models)
//! - OpenAI-compatible endpoints
//! - A deterministic hashing embedder for offline use and tests
//!
//! # Examples
//!
//! ```rust,no_run
//! use govrag::config::AppConfig;
//! use govrag::embeddings::create_embedder;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let embedder = create_embedder(&config)?;
//!
//!     let embedding = embedder.embed("What is AI governance?").await?;
//!     println!("Generated embedding with {} dimensions", embedding.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod hashing;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

pub use client::EmbeddingClient;
pub use client::EmbeddingProvider;
pub use hashing::HashingEmbedder;

use crate::config::AppConfig;
use crate::errors::GovRagError;
use crate::errors::Result;

/// Anything that can embed text into the index's vector space
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn model_name(&self) -> &str;

    /// Expected vector length, when known up front
    fn dimension(&self) -> Option<usize>;
}

/// Build the embedder named by `embeddings.provider`
pub fn create_embedder(config: &AppConfig) -> Result<Arc<dyn Embedder>> {
    let embeddings = &config.embeddings;
    let embedder: Arc<dyn Embedder> = match embeddings.provider.to_ascii_lowercase().as_str() {
        "hash" => Arc::new(HashingEmbedder::try_new(
            embeddings.model.clone(),
            embeddings.dimension,
        )?),
        "ollama" => Arc::new(EmbeddingClient::new(
            EmbeddingProvider::Ollama,
            embeddings.model.clone(),
            embeddings.endpoint.clone(),
            None,
            Some(embeddings.dimension),
        )?),
        "openai" => Arc::new(EmbeddingClient::new(
            EmbeddingProvider::OpenAI,
            embeddings.model.clone(),
            embeddings.endpoint.clone(),
            embeddings.api_key.clone(),
            Some(embeddings.dimension),
        )?),
        other => {
            return Err(GovRagError::ConfigError(format!(
                "Unknown embeddings.provider '{other}' (expected hash, ollama or openai)"
            )))
        }
    };

    info!(
        "🔧 Embedding model ready: {} ({})",
        embedder.model_name(),
        embeddings.provider
    );
    Ok(embedder)
}
