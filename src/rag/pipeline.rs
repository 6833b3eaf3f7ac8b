//! Complete RAG pipeline: Retrieve -> Assemble -> Generate

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::config::AppConfig;
use crate::embeddings::create_embedder;
use crate::embeddings::Embedder;
use crate::errors::GovRagError;
use crate::errors::Result;
use crate::llm::select_backend;
use crate::llm::LlmBackend;
use crate::logging::preview;
use crate::models::Answer;
use crate::models::ConversationHistory;
use crate::rag::index::VectorStore;
use crate::rag::PromptAssembler;
use crate::rag::Retriever;
use crate::rag::VectorIndex;
use crate::rag::DEFAULT_TOP_K;

/// Returned when the backend produced only whitespace
pub const EMPTY_RESPONSE_APOLOGY: &str = "I apologize, but I couldn't generate a response to your question. Please try rephrasing your question or try again.";

/// Returned when retrieval or generation failed for this question
pub const GENERATION_FAILURE_APOLOGY: &str =
    "Sorry, I encountered an error while processing your request. Please try again.";

/// Lifecycle of the pipeline within one process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Uninitialized,
    Ready,
    /// Initialization failed; it is never retried
    Failed(String),
}

impl PipelineState {
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "Uninitialized",
            Self::Ready => "Ready",
            Self::Failed(_) => "Failed",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(reason) => write!(f, "Failed: {reason}"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// The three initialization steps, run in this order exactly once
#[async_trait]
pub trait PipelineLoader: Send + Sync {
    async fn load_embedder(&self) -> Result<Arc<dyn Embedder>>;

    /// The store is opened against the already loaded embedder
    async fn load_store(&self, embedder: &dyn Embedder) -> Result<Arc<dyn VectorStore>>;

    async fn load_backend(&self) -> Result<Arc<dyn LlmBackend>>;
}

/// Loader driven by [`AppConfig`]
pub struct ConfiguredLoader {
    config: AppConfig,
}

impl ConfiguredLoader {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PipelineLoader for ConfiguredLoader {
    async fn load_embedder(&self) -> Result<Arc<dyn Embedder>> {
        create_embedder(&self.config)
    }

    async fn load_store(&self, embedder: &dyn Embedder) -> Result<Arc<dyn VectorStore>> {
        let dir = self.config.index_dir().to_path_buf();
        let index = tokio::task::spawn_blocking(move || VectorIndex::load(&dir))
            .await
            .map_err(|e| GovRagError::RetrievalUnavailable(format!("index load task failed: {e}")))??;

        if let Some(dimension) = embedder.dimension() {
            if dimension != index.dimension() {
                return Err(GovRagError::RetrievalUnavailable(format!(
                    "embedding model produces {dimension} dimensions but the index holds {}",
                    index.dimension()
                )));
            }
        }
        if index.model() != embedder.model_name() {
            warn!(
                "Index was built with '{}' but queries use '{}'",
                index.model(),
                embedder.model_name()
            );
        }
        if index.is_empty() {
            warn!("Vector index is empty; every question will see an empty context");
        }

        Ok(Arc::new(index))
    }

    async fn load_backend(&self) -> Result<Arc<dyn LlmBackend>> {
        select_backend(&self.config)
    }
}

/// Hands out pre-built components
struct StaticLoader {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    backend: Arc<dyn LlmBackend>,
}

#[async_trait]
impl PipelineLoader for StaticLoader {
    async fn load_embedder(&self) -> Result<Arc<dyn Embedder>> {
        Ok(Arc::clone(&self.embedder))
    }

    async fn load_store(&self, _embedder: &dyn Embedder) -> Result<Arc<dyn VectorStore>> {
        Ok(Arc::clone(&self.store))
    }

    async fn load_backend(&self) -> Result<Arc<dyn LlmBackend>> {
        Ok(Arc::clone(&self.backend))
    }
}

struct Pipeline {
    retriever: Retriever,
    assembler: PromptAssembler,
    backend: Arc<dyn LlmBackend>,
}

impl Pipeline {
    async fn generate(&self, question: &str, history: &ConversationHistory) -> Result<String> {
        debug!("Step 1: Retrieving documents");
        let context = self.retriever.retrieve(question).await?;
        debug!("Retrieved {} chunks from {:?}", context.len(), context.sources());

        debug!("Step 2: Assembling prompt");
        let messages = self.assembler.build(question, &context, history);

        debug!("Step 3: Generating answer ({} messages)", messages.len());
        self.backend.generate(&messages).await
    }
}

/// Complete RAG service.
///
/// Conversation history is owned by the caller and passed into every
/// [`answer`](Self::answer) call; the service itself keeps no per-request state.
pub struct RagService {
    loader: Box<dyn PipelineLoader>,
    top_k: usize,
    pipeline: OnceCell<std::result::Result<Pipeline, String>>,
}

impl RagService {
    /// Create an uninitialized service from configuration
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        Self::with_loader(Box::new(ConfiguredLoader::new(config.clone())), config.top_k())
    }

    #[must_use]
    pub fn with_loader(loader: Box<dyn PipelineLoader>, top_k: usize) -> Self {
        Self {
            loader,
            top_k,
            pipeline: OnceCell::new(),
        }
    }

    /// Create from existing components; still requires [`initialize`](Self::initialize)
    #[must_use]
    pub fn with_components(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        backend: Arc<dyn LlmBackend>,
    ) -> Self {
        Self::with_loader(
            Box::new(StaticLoader {
                embedder,
                store,
                backend,
            }),
            DEFAULT_TOP_K,
        )
    }

    /// Run initialization once. Concurrent callers wait for the same attempt and a
    /// failure is remembered for the lifetime of the service.
    ///
    /// # Errors
    /// - `NotInitialized` carrying the reason the attempt failed
    pub async fn initialize(&self) -> Result<()> {
        let outcome = self
            .pipeline
            .get_or_init(|| async {
                self.load().await.map_err(|e| {
                    error!("❌ Pipeline initialization failed: {}", e);
                    e.to_string()
                })
            })
            .await;

        match outcome {
            Ok(_) => Ok(()),
            Err(reason) => Err(GovRagError::NotInitialized(format!(
                "initialization failed: {reason}"
            ))),
        }
    }

    async fn load(&self) -> Result<Pipeline> {
        info!("🚀 Initializing RAG pipeline");

        info!("Loading embedding model...");
        let embedder = self.loader.load_embedder().await?;

        info!("Loading vector index...");
        let store = self.loader.load_store(embedder.as_ref()).await?;

        info!("Selecting language model backend...");
        let backend = self.loader.load_backend().await?;

        info!(
            "✅ RAG pipeline ready ({} chunks indexed, backend {})",
            store.len(),
            backend.describe()
        );

        Ok(Pipeline {
            retriever: Retriever::with_k(embedder, store, self.top_k),
            assembler: PromptAssembler::new(),
            backend,
        })
    }

    #[must_use]
    pub fn state(&self) -> PipelineState {
        match self.pipeline.get() {
            None => PipelineState::Uninitialized,
            Some(Ok(_)) => PipelineState::Ready,
            Some(Err(reason)) => PipelineState::Failed(reason.clone()),
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state().is_ready()
    }

    /// Description of the selected backend once ready
    #[must_use]
    pub fn backend_description(&self) -> Option<String> {
        self.ready().ok().map(|p| p.backend.describe())
    }

    fn ready(&self) -> Result<&Pipeline> {
        match self.pipeline.get() {
            Some(Ok(pipeline)) => Ok(pipeline),
            Some(Err(reason)) => Err(GovRagError::NotInitialized(format!(
                "initialization failed: {reason}"
            ))),
            None => Err(GovRagError::NotInitialized(
                "the RAG pipeline is still initializing".to_string(),
            )),
        }
    }

    /// Answer one question, recording the exchange in `history`.
    ///
    /// Retrieval and generation failures do not surface as errors: they yield
    /// [`GENERATION_FAILURE_APOLOGY`] and leave `history` untouched.
    ///
    /// The assistant turn recorded is `Answer::text`, the post-processed reply the
    /// caller sees (including [`EMPTY_RESPONSE_APOLOGY`] for blank output), not
    /// `Answer::raw`.
    ///
    /// # Errors
    /// - `InvalidQuestion` for a blank question, before any component is called
    /// - `NotInitialized` when the pipeline is not ready
    pub async fn answer(&self, question: &str, history: &mut ConversationHistory) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(GovRagError::InvalidQuestion(
                "question must not be empty".to_string(),
            ));
        }

        let pipeline = self.ready()?;
        info!("Processing RAG query: {}", preview(question));
        debug!("Full question: {}", question);

        let raw = match pipeline.generate(question, history).await {
            Ok(raw) => raw,
            Err(e) => {
                error!("RAG query failed: {}", e);
                return Ok(Answer {
                    text: GENERATION_FAILURE_APOLOGY.to_string(),
                    raw: String::new(),
                });
            }
        };

        let text = if raw.trim().is_empty() {
            warn!("Backend returned an empty response");
            EMPTY_RESPONSE_APOLOGY.to_string()
        } else {
            raw.clone()
        };

        history.push_exchange(question, text.clone());
        info!("RAG query completed successfully");

        Ok(Answer { text, raw })
    }
}
