//! Record store error types.

use thiserror::Error;

/// Errors raised by record stores and document resolvers.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend could not be reached or refused to answer
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Non-success HTTP status from the REST backend
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Transport-level request failure
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// A row could not be turned into a member
    #[error("Decode error: {0}")]
    Decode(String),

    /// No document stored under the given reference
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// Malformed base or document URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid store configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Roster file parse error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::Unavailable("connection refused".to_string());
        assert!(err.to_string().contains("Store unavailable"));

        let err = StoreError::Http {
            status: 503,
            body: "maintenance".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 503: maintenance");

        let err = StoreError::DocumentNotFound("x.pdf".to_string());
        assert!(err.to_string().contains("Document not found"));
    }
}
