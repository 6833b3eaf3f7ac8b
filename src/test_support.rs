//! Shared fixtures for unit tests

use std::net::SocketAddr;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use axum::Router;

use crate::embeddings::Embedder;
use crate::embeddings::HashingEmbedder;
use crate::errors::GovRagError;
use crate::errors::Result;
use crate::llm::LlmBackend;
use crate::models::DocumentChunk;
use crate::models::PromptMessages;
use crate::rag::VectorIndex;

/// Serve `app` on an ephemeral local port
pub async fn spawn_stub(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Backend returning a fixed reply (or failing) and recording every prompt
pub struct StubBackend {
    reply: std::result::Result<String, String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<PromptMessages>>,
}

impl StubBackend {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<PromptMessages> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LlmBackend for StubBackend {
    async fn generate(&self, messages: &PromptMessages) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(messages.clone());
        self.reply.clone().map_err(GovRagError::Generation)
    }

    fn describe(&self) -> String {
        "stub".to_string()
    }
}

/// Hashing embedder that counts calls
pub struct CountingEmbedder {
    inner: HashingEmbedder,
    calls: AtomicUsize,
}

impl CountingEmbedder {
    pub fn new(dimension: usize) -> Arc<Self> {
        Arc::new(Self {
            inner: HashingEmbedder::try_new("hash", dimension).unwrap(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn embedder(&self) -> &HashingEmbedder {
        &self.inner
    }
}

#[async_trait]
impl Embedder for CountingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed(text).await
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn dimension(&self) -> Option<usize> {
        self.inner.dimension()
    }
}

/// Index of `(id, text, source)` triples embedded with `embedder`
pub fn policy_index(embedder: &HashingEmbedder, docs: &[(&str, &str, &str)]) -> VectorIndex {
    let chunks = docs
        .iter()
        .map(|(id, text, source)| DocumentChunk {
            id: (*id).to_string(),
            text: (*text).to_string(),
            source_name: (*source).to_string(),
            embedding: embedder.embed_text(text),
        })
        .collect();
    let dimension = embedder.dimension().unwrap_or_default();
    VectorIndex::from_chunks(embedder.model_name(), dimension, chunks).unwrap()
}
