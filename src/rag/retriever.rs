//! Retrieval module for semantic search over the policy index

use std::sync::Arc;

use tracing::debug;

use crate::embeddings::Embedder;
use crate::errors::Result;
use crate::models::RetrievedContext;
use crate::rag::index::VectorStore;

/// Embeds a question and fetches the `k` most similar chunks
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    k: usize,
}

impl Retriever {
    pub fn with_k(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>, k: usize) -> Self {
        Self { embedder, store, k }
    }

    /// Semantic search using vector embeddings.
    ///
    /// No relevance threshold is applied; an empty or weak context is still
    /// valid input for the model.
    pub async fn retrieve(&self, question: &str) -> Result<RetrievedContext> {
        debug!("Performing semantic search (k={}): {}", self.k, question);

        let query_embedding = self.embedder.embed(question).await?;
        let hits = self.store.search(&query_embedding, self.k).await?;

        let context = RetrievedContext::new(hits, self.k);
        debug!("Retrieved {} chunks", context.len());
        Ok(context)
    }
}
