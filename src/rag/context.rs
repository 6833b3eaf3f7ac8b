//! Context assembly from retrieved chunks

use crate::models::RetrievedContext;

/// Placeholder used when retrieval found nothing
pub const EMPTY_CONTEXT: &str = "(no matching policy documents were found)";

/// Serializes retrieved chunks into the context block of the user message
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextAssembler;

impl ContextAssembler {
    /// Every chunk in retrieval order, each tagged with its source so the model can cite it
    #[must_use]
    pub fn assemble(&self, context: &RetrievedContext) -> String {
        if context.is_empty() {
            return EMPTY_CONTEXT.to_string();
        }

        context
            .chunks()
            .iter()
            .enumerate()
            .map(|(idx, hit)| {
                format!(
                    "[Document {}]\nSource: {}\n{}",
                    idx + 1,
                    hit.chunk.source_name,
                    hit.chunk.text.trim()
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// One-line-per-source summary for CLI output
    #[must_use]
    pub fn create_summary(&self, context: &RetrievedContext) -> String {
        if context.is_empty() {
            return "No documents found.".to_string();
        }

        let mut summary = format!("Retrieved {} chunk(s):\n", context.len());
        for (idx, hit) in context.chunks().iter().enumerate() {
            summary.push_str(&format!(
                "  {}. {} (score: {:.3})\n",
                idx + 1,
                hit.chunk.source_name,
                hit.score
            ));
        }
        summary
    }
}
