//! Read-only vector index loaded from the persisted index directory

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use tracing::info;

use crate::errors::GovRagError;
use crate::errors::Result;
use crate::models::DocumentChunk;
use crate::models::ScoredChunk;

/// File inside the index directory holding chunks and their vectors
pub const INDEX_FILE_NAME: &str = "index.json";

/// Similarity search over indexed chunks
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Top `k` chunks by similarity to `vector`, best first
    async fn search(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredChunk>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// On-disk layout of `index.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexFile {
    /// Embedding model the vectors were produced with
    pub model: String,
    pub dimension: usize,
    pub chunks: Vec<DocumentChunk>,
}

/// In-memory cosine-similarity index
#[derive(Debug)]
pub struct VectorIndex {
    model: String,
    dimension: usize,
    chunks: Vec<DocumentChunk>,
    norms: Vec<f32>,
}

impl VectorIndex {
    /// Build from chunks, checking every vector has `dimension` entries
    pub fn from_chunks(
        model: impl Into<String>,
        dimension: usize,
        chunks: Vec<DocumentChunk>,
    ) -> Result<Self> {
        if dimension == 0 {
            return Err(GovRagError::RetrievalUnavailable(
                "index dimension must be greater than zero".to_string(),
            ));
        }
        if let Some(bad) = chunks.iter().find(|c| c.embedding.len() != dimension) {
            return Err(GovRagError::RetrievalUnavailable(format!(
                "chunk {} has {} dimensions, index declares {dimension}",
                bad.id,
                bad.embedding.len()
            )));
        }

        let norms = chunks.iter().map(|c| l2_norm(&c.embedding)).collect();
        Ok(Self {
            model: model.into(),
            dimension,
            chunks,
            norms,
        })
    }

    /// Load the index persisted under `dir`.
    ///
    /// A missing directory or an unreadable index is fatal for the pipeline.
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(GovRagError::RetrievalUnavailable(format!(
                "index directory '{}' not found",
                dir.display()
            )));
        }

        let path = dir.join(INDEX_FILE_NAME);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            GovRagError::RetrievalUnavailable(format!("cannot read {}: {e}", path.display()))
        })?;
        let file: IndexFile = serde_json::from_str(&content).map_err(|e| {
            GovRagError::RetrievalUnavailable(format!("corrupt index {}: {e}", path.display()))
        })?;

        let index = Self::from_chunks(file.model, file.dimension, file.chunks)?;
        info!(
            "📚 Loaded vector index from {} ({} chunks, {} dimensions, model {})",
            dir.display(),
            index.len(),
            index.dimension,
            index.model
        );
        Ok(index)
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Synchronous top-k search
    pub fn top_k(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        if vector.len() != self.dimension {
            return Err(GovRagError::Embedding(format!(
                "query vector has {} dimensions, index expects {}",
                vector.len(),
                self.dimension
            )));
        }

        let query_norm = l2_norm(vector);
        let mut scored: Vec<(usize, f32)> = self
            .chunks
            .iter()
            .zip(&self.norms)
            .enumerate()
            .map(|(idx, (chunk, norm))| {
                (idx, cosine(vector, query_norm, &chunk.embedding, *norm))
            })
            .collect();

        // Stable: equal scores keep index order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(idx, score)| ScoredChunk {
                chunk: self.chunks[idx].clone(),
                score,
            })
            .collect())
    }
}

#[async_trait]
impl VectorStore for VectorIndex {
    async fn search(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        self.top_k(vector, k)
    }

    fn len(&self) -> usize {
        self.chunks.len()
    }
}

fn l2_norm(vector: &[f32]) -> f32 {
    vector.iter().map(|v| v * v).sum::<f32>().sqrt()
}

fn cosine(a: &[f32], a_norm: f32, b: &[f32], b_norm: f32) -> f32 {
    if a_norm == 0.0 || b_norm == 0.0 {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    dot / (a_norm * b_norm)
}
