//! Unit tests for error handling
//!
//! Tests error types, conversions, and user-facing messages.

#[cfg(test)]
mod tests {
    use std::io;

    use crate::errors::GovRagError;
    use crate::errors::TransportError;

    // ====== Classification Tests ======

    #[test]
    fn test_invalid_question_is_client_error() {
        let error = GovRagError::InvalidQuestion("question must not be empty".to_string());
        assert!(error.is_client_error());
        assert!(!error.is_unavailable());
    }

    #[test]
    fn test_not_initialized_is_distinguishable_from_generation() {
        let not_ready = GovRagError::NotInitialized("still loading".to_string());
        let generation = GovRagError::Generation("backend exploded".to_string());

        assert!(not_ready.is_unavailable());
        assert!(!generation.is_unavailable());
        assert!(!generation.is_client_error());
        assert!(format!("{not_ready}").contains("not initialized"));
    }

    #[test]
    fn test_retrieval_unavailable_is_unavailable() {
        let error = GovRagError::RetrievalUnavailable("chroma_db missing".to_string());
        assert!(error.is_unavailable());
        assert!(format!("{error}").contains("chroma_db missing"));
    }

    // ====== Error Conversion Tests ======

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let err: GovRagError = io_err.into();
        assert!(matches!(err, GovRagError::Io(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let err: GovRagError = json_err.into();
        assert!(matches!(err, GovRagError::Json(_)));
    }

    #[test]
    fn test_error_from_url() {
        let url_err = url::Url::parse("not a url").unwrap_err();
        let err: GovRagError = url_err.into();
        assert!(matches!(err, GovRagError::InvalidUrl(_)));
    }

    // ====== Transport Messages ======

    #[test]
    fn test_transport_messages_are_distinct() {
        let connection = TransportError::Connection {
            url: "http://localhost:8000/chat".to_string(),
            reason: "refused".to_string(),
        }
        .user_message();
        let timeout = TransportError::Timeout {
            url: "http://localhost:8000/chat".to_string(),
            timeout_secs: 120,
        }
        .user_message();
        let http = TransportError::Http {
            status: 500,
            body: "boom".to_string(),
        }
        .user_message();

        assert!(connection.contains("Connection Error"));
        assert!(connection.contains("http://localhost:8000/chat"));
        assert!(timeout.contains("Timeout Error"));
        assert!(timeout.contains("120s"));
        assert_eq!(http, "❌ API Error: 500 - boom");
        assert_ne!(connection, timeout);
    }
}
