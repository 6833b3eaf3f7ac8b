//! One-shot question answered in-process

use std::sync::Arc;

use crate::cli::output::print_info;
use crate::embeddings::create_embedder;
use crate::models::ConversationHistory;
use crate::rag::ContextAssembler;
use crate::rag::RagService;
use crate::rag::Retriever;
use crate::rag::VectorIndex;
use crate::AppConfig;
use crate::Result;

pub async fn handle_ask(config: &AppConfig, question: String, show_sources: bool) -> Result<()> {
    print_info(&format!("🤖 Question: \"{question}\""));

    println!("\n🔧 Loading pipeline...");
    let service = RagService::new(config);
    service.initialize().await?;
    if let Some(backend) = service.backend_description() {
        println!("   ✓ Backend: {backend}");
    }

    if show_sources {
        print_sources(config, &question).await?;
    }

    println!("🤖 Generating answer...\n");
    let mut history = ConversationHistory::new();
    let answer = service.answer(&question, &mut history).await?;

    println!("📝 Answer:\n");
    println!("{}", answer.text);
    Ok(())
}

/// Run retrieval on its own and list the chunks the model will see
async fn print_sources(config: &AppConfig, question: &str) -> Result<()> {
    let embedder = create_embedder(config)?;
    let index = Arc::new(VectorIndex::load(config.index_dir())?);
    let retriever = Retriever::with_k(embedder, index, config.top_k());

    let context = retriever.retrieve(question).await?;
    println!("🔍 {}", ContextAssembler.create_summary(&context));
    Ok(())
}
