//! Prompt assembly for governance questions

use crate::models::ConversationHistory;
use crate::models::ConversationTurn;
use crate::models::PromptMessages;
use crate::models::RetrievedContext;
use crate::models::Role;
use crate::rag::context::ContextAssembler;

/// Fixed instructions sent as the single leading system message
pub const SYSTEM_PROMPT: &str = r#"You are an AI-powered policy assistant specialized in AI and Data Governance.
Your role is to support users by interpreting and explaining governance frameworks, ethical standards, compliance guidelines, and policy definitions.

Instructions:
1. Base your answer only on the provided context.
2. List the filenames of the documents you used (e.g., 'AI_Principles Document') under the "Sources" section.
3. If the context does not contain the answer, respond with exactly: "I don't know."
4. Do not make assumptions or add any information not explicitly stated in the context."#;

/// Builds the message sequence for one question. Pure: same inputs, same output.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptAssembler {
    context_assembler: ContextAssembler,
}

impl PromptAssembler {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            context_assembler: ContextAssembler,
        }
    }

    /// System instructions, then prior turns, then the question with its context.
    ///
    /// System turns found in `history` are skipped so the instructions stay the
    /// only system message.
    #[must_use]
    pub fn build(
        &self,
        question: &str,
        context: &RetrievedContext,
        history: &ConversationHistory,
    ) -> PromptMessages {
        let prior = history
            .turns()
            .iter()
            .filter(|turn| turn.role != Role::System)
            .cloned();

        let user = ConversationTurn::user(build_user_message(
            question,
            &self.context_assembler.assemble(context),
        ));

        PromptMessages::from_parts(ConversationTurn::system(SYSTEM_PROMPT), prior, user)
    }
}

/// Build the final user message
pub fn build_user_message(question: &str, context: &str) -> String {
    format!("{question}\n\nContext:\n{context}")
}
