//! API request and response types

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// `code` sent with a 422 when the body does not match [`ChatRequest`]
pub const SCHEMA_MISMATCH_CODE: &str = "schema_mismatch";

/// Keys the legacy endpoint accepts for the question, in priority order
const LEGACY_QUESTION_KEYS: [&str; 3] = ["question", "message", "query"];

/// Chat request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    /// Conversation to continue; omitted means a stateless exchange
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl ChatRequest {
    /// Lenient parse used by `/chat-legacy`: never fails, a missing question is empty
    #[must_use]
    pub fn from_legacy_body(body: &[u8]) -> Self {
        let value = serde_json::from_slice::<Value>(body).unwrap_or(Value::Null);

        let (question, session_id) = match value {
            Value::String(question) => (question, None),
            Value::Object(map) => {
                let question = LEGACY_QUESTION_KEYS
                    .iter()
                    .find_map(|key| map.get(*key).and_then(Value::as_str))
                    .unwrap_or_default()
                    .to_string();
                let session_id = map
                    .get("session_id")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                (question, session_id)
            }
            _ => (String::new(), None),
        };

        Self {
            question,
            session_id,
        }
    }
}

/// Chat response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Handled failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// `Uninitialized`, `Ready` or `Failed`
    pub state: String,
    pub ready: bool,
    pub environment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub active_sessions: usize,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_accepts_alternate_keys() {
        let request = ChatRequest::from_legacy_body(br#"{"message": "What is GDPR?"}"#);
        assert_eq!(request.question, "What is GDPR?");

        let request = ChatRequest::from_legacy_body(br#"{"query": "q", "question": "preferred"}"#);
        assert_eq!(request.question, "preferred");
    }

    #[test]
    fn test_legacy_bare_string_and_session() {
        let request = ChatRequest::from_legacy_body(br#""plain question""#);
        assert_eq!(request.question, "plain question");
        assert!(request.session_id.is_none());

        let request =
            ChatRequest::from_legacy_body(br#"{"question": "q", "session_id": "abc"}"#);
        assert_eq!(request.session_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_legacy_malformed_is_empty_question() {
        for body in [&b""[..], b"{not json", b"[1, 2]", b"{\"question\": 42}", b"{}"] {
            assert_eq!(ChatRequest::from_legacy_body(body).question, "");
        }
    }

    #[test]
    fn test_error_response_omits_missing_code() {
        let body = serde_json::to_value(ErrorResponse {
            error: "boom".to_string(),
            code: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"error": "boom"}));
    }
}
