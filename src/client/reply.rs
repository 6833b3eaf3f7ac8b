//! Interpreting chat service responses

use reqwest::StatusCode;
use serde_json::Value;

use crate::api::types::SCHEMA_MISMATCH_CODE;
use crate::errors::TransportError;

/// What the service said, once a response arrived
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    /// The `answer` field
    Answer(String),
    /// The `error` field, verbatim
    ServerError(String),
    /// Neither field present; the payload as received
    Raw(String),
}

impl ChatReply {
    /// Classify a response body.
    ///
    /// `answer` wins over `error`. A non-success status without either field is a
    /// transport failure rather than a reply.
    pub fn from_response(status: StatusCode, body: &str) -> Result<Self, TransportError> {
        let value = serde_json::from_str::<Value>(body).ok();
        let field = |name: &str| {
            value
                .as_ref()
                .and_then(|v| v.get(name))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        if let Some(answer) = field("answer") {
            return Ok(Self::Answer(answer));
        }
        if let Some(error) = field("error") {
            return Ok(Self::ServerError(error));
        }
        if status.is_success() {
            return Ok(Self::Raw(body.to_string()));
        }
        Err(TransportError::Http {
            status: status.as_u16(),
            body: body.to_string(),
        })
    }

    /// Text to show the user
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Answer(answer) => answer.clone(),
            Self::ServerError(error) => format!("❌ API Error: {error}"),
            Self::Raw(payload) => format!("❌ Unexpected response format: {payload}"),
        }
    }
}

/// Whether a 422 body reports a request-schema mismatch.
///
/// Our own service sends `{"code": "schema_mismatch"}`; FastAPI-style services
/// send a `detail` array of validation errors.
#[must_use]
pub fn is_schema_mismatch(body: &str) -> bool {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return false;
    };
    value.get("code").and_then(Value::as_str) == Some(SCHEMA_MISMATCH_CODE)
        || value.get("detail").is_some_and(Value::is_array)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_preferred_over_error() {
        let reply =
            ChatReply::from_response(StatusCode::OK, r#"{"answer": "yes", "error": "no"}"#)
                .unwrap();
        assert_eq!(reply, ChatReply::Answer("yes".to_string()));
        assert_eq!(reply.render(), "yes");
    }

    #[test]
    fn test_error_field_verbatim() {
        let reply = ChatReply::from_response(
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"error": "RAG pipeline not initialized: still loading", "code": "not_initialized"}"#,
        )
        .unwrap();
        assert_eq!(
            reply,
            ChatReply::ServerError("RAG pipeline not initialized: still loading".to_string())
        );
    }

    #[test]
    fn test_raw_payload_as_diagnostic() {
        let reply = ChatReply::from_response(StatusCode::OK, r#"{"result": 1}"#).unwrap();
        assert_eq!(reply, ChatReply::Raw(r#"{"result": 1}"#.to_string()));
        assert!(reply.render().contains(r#"{"result": 1}"#));

        let reply = ChatReply::from_response(StatusCode::OK, "plain text").unwrap();
        assert_eq!(reply, ChatReply::Raw("plain text".to_string()));
    }

    #[test]
    fn test_unexpected_status_is_http_error() {
        let err = ChatReply::from_response(StatusCode::BAD_GATEWAY, "upstream down").unwrap_err();
        assert!(matches!(err, TransportError::Http { status: 502, .. }));
        assert_eq!(err.user_message(), "❌ API Error: 502 - upstream down");
    }

    #[test]
    fn test_schema_mismatch_detection() {
        assert!(is_schema_mismatch(
            r#"{"error": "missing field `question`", "code": "schema_mismatch"}"#
        ));
        assert!(is_schema_mismatch(
            r#"{"detail": [{"loc": ["body", "question"], "msg": "field required"}]}"#
        ));
        assert!(!is_schema_mismatch(r#"{"error": "unprocessable", "code": "other"}"#));
        assert!(!is_schema_mismatch(r#"{"detail": "not a list"}"#));
        assert!(!is_schema_mismatch("not json"));
    }
}
