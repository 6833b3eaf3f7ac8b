//! Core data model shared by the retriever, prompt assembler, backends and service.

use serde::Deserialize;
use serde::Serialize;

/// A passage of a policy document as stored in the vector index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: String,
    pub text: String,
    pub source_name: String,
    pub embedding: Vec<f32>,
}

/// A chunk paired with its similarity to the query
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk: DocumentChunk,
    pub score: f32,
}

/// Ranked retrieval result, best match first. May be empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetrievedContext {
    chunks: Vec<ScoredChunk>,
}

impl RetrievedContext {
    /// Build from hits; they are re-sorted by non-increasing score and capped at `k`
    #[must_use]
    pub fn new(mut chunks: Vec<ScoredChunk>, k: usize) -> Self {
        // Stable sort keeps store order for equal scores
        chunks.sort_by(|a, b| b.score.total_cmp(&a.score));
        chunks.truncate(k);
        Self { chunks }
    }

    #[must_use]
    pub fn chunks(&self) -> &[ScoredChunk] {
        &self.chunks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Distinct source names in retrieval order
    #[must_use]
    pub fn sources(&self) -> Vec<&str> {
        let mut sources: Vec<&str> = Vec::new();
        for hit in &self.chunks {
            if !sources.contains(&hit.chunk.source_name.as_str()) {
                sources.push(&hit.chunk.source_name);
            }
        }
        sources
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One role/content message; used both for history and prompt messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Conversation owned by one caller (a session, a CLI loop, a test).
///
/// With a limit set, the oldest messages are dropped in user/assistant pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationHistory {
    turns: Vec<ConversationTurn>,
    max_messages: Option<usize>,
}

impl ConversationHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_limit(max_messages: usize) -> Self {
        Self {
            turns: Vec::new(),
            max_messages: Some(max_messages),
        }
    }

    /// Record one completed question/answer exchange
    pub fn push_exchange(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.turns.push(ConversationTurn::user(question));
        self.turns.push(ConversationTurn::assistant(answer));

        if let Some(limit) = self.max_messages {
            while self.turns.len() > limit {
                let excess = (self.turns.len() - limit).min(2);
                self.turns.drain(0..excess);
            }
        }
    }

    #[must_use]
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Ordered prompt handed to a backend: system, history snapshot, current user message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptMessages {
    messages: Vec<ConversationTurn>,
}

impl PromptMessages {
    pub(crate) fn from_parts(
        system: ConversationTurn,
        history: impl IntoIterator<Item = ConversationTurn>,
        user: ConversationTurn,
    ) -> Self {
        let mut messages = vec![system];
        messages.extend(history);
        messages.push(user);
        Self { messages }
    }

    #[must_use]
    pub fn messages(&self) -> &[ConversationTurn] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The trailing user message carrying the question and its context
    #[must_use]
    pub fn last_user_message(&self) -> Option<&ConversationTurn> {
        self.messages.last().filter(|m| m.role == Role::User)
    }
}

/// Generated answer. `text` is never blank; `raw` is the untouched backend output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub text: String,
    pub raw: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: &str, source: &str) -> DocumentChunk {
        DocumentChunk {
            id: id.to_string(),
            text: format!("text {id}"),
            source_name: source.to_string(),
            embedding: vec![1.0, 0.0],
        }
    }

    #[test]
    fn test_retrieved_context_sorted_and_capped() {
        let hits = vec![
            ScoredChunk { chunk: chunk("a", "A"), score: 0.2 },
            ScoredChunk { chunk: chunk("b", "B"), score: 0.9 },
            ScoredChunk { chunk: chunk("c", "A"), score: 0.5 },
        ];
        let context = RetrievedContext::new(hits, 2);

        assert_eq!(context.len(), 2);
        assert_eq!(context.chunks()[0].chunk.id, "b");
        assert_eq!(context.chunks()[1].chunk.id, "c");
        assert_eq!(context.sources(), vec!["B", "A"]);
    }

    #[test]
    fn test_history_push_and_limit() {
        let mut history = ConversationHistory::with_limit(4);
        for i in 0..5 {
            history.push_exchange(format!("q{i}"), format!("a{i}"));
        }

        assert_eq!(history.len(), 4);
        assert_eq!(history.turns()[0], ConversationTurn::user("q3"));
        assert_eq!(history.turns()[3], ConversationTurn::assistant("a4"));
    }

    #[test]
    fn test_history_unbounded_by_default() {
        let mut history = ConversationHistory::new();
        for i in 0..30 {
            history.push_exchange(format!("q{i}"), "a");
        }
        assert_eq!(history.len(), 60);
    }

    #[test]
    fn test_role_serialization() {
        let turn = ConversationTurn::assistant("hi");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(Role::System.as_str(), "system");
    }
}
