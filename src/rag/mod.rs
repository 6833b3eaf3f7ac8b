//! RAG (Retrieval-Augmented Generation) module
//!
//! This module turns a governance question into an answer:
//! - Semantic retrieval of policy chunks from the persisted vector index
//! - Context and prompt assembly with the fixed assistant instructions
//! - Generation through the configured language-model backend
//!
//! # Examples
//!
//! ```rust,no_run
//! use govrag::config::AppConfig;
//! use govrag::models::ConversationHistory;
//! use govrag::rag::RagService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = RagService::new(&config);
//!     service.initialize().await?;
//!
//!     let mut history = ConversationHistory::new();
//!     let answer = service.answer("What is AI governance?", &mut history).await?;
//!     println!("Answer: {}", answer.text);
//!
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod index;
pub mod pipeline;
pub mod prompts;
pub mod retriever;

pub use context::ContextAssembler;
pub use index::VectorIndex;
pub use index::VectorStore;
pub use pipeline::ConfiguredLoader;
pub use pipeline::PipelineLoader;
pub use pipeline::PipelineState;
pub use pipeline::RagService;
pub use pipeline::EMPTY_RESPONSE_APOLOGY;
pub use pipeline::GENERATION_FAILURE_APOLOGY;
pub use prompts::PromptAssembler;
pub use prompts::SYSTEM_PROMPT;
pub use retriever::Retriever;

/// Chunks retrieved per question
pub const DEFAULT_TOP_K: usize = 5;
