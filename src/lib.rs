//! Retrieval-augmented question answering over AI and data-governance policy documents.

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod embeddings;
pub mod errors;
pub mod llm;
pub mod logging;
pub mod models;
pub mod rag;

#[cfg(test)]
mod errors_tests;
#[cfg(test)]
mod test_support;

pub use config::AppConfig;
pub use errors::*;
