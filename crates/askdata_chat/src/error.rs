//! Error types for the chat core.

use thiserror::Error;

/// Result type alias for chat operations.
pub type ChatResult<T> = Result<T, ChatError>;

/// Errors that can occur while talking to the query backend or loading
/// configuration.
///
/// None of these ever reach the message history: the orchestrator turns
/// every query failure into a single generic notification.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Transport-level failure (connect, TLS, read, timeout).
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// The body was not JSON, or lacked a required field.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Well-formed response with `success: false`.
    #[error("Backend rejected query: {0}")]
    BackendRejected(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChatError {
    /// Short machine-friendly name of the failure class, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NetworkFailure(_) => "network_failure",
            Self::MalformedResponse(_) => "malformed_response",
            Self::BackendRejected(_) => "backend_rejected",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
        }
    }

    /// Whether the error came from a query round-trip rather than local setup.
    pub fn is_query_failure(&self) -> bool {
        matches!(
            self,
            Self::NetworkFailure(_) | Self::MalformedResponse(_) | Self::BackendRejected(_)
        )
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        Self::NetworkFailure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_failure_classification() {
        assert!(ChatError::NetworkFailure("refused".into()).is_query_failure());
        assert!(ChatError::MalformedResponse("eof".into()).is_query_failure());
        assert!(ChatError::BackendRejected("ambiguous".into()).is_query_failure());
        assert!(!ChatError::Config("bad url".into()).is_query_failure());
    }

    #[test]
    fn test_display() {
        let err = ChatError::BackendRejected("ambiguous request".into());
        assert_eq!(err.to_string(), "Backend rejected query: ambiguous request");
        assert_eq!(err.kind(), "backend_rejected");
    }
}
