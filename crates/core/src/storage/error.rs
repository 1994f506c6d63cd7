use thiserror::Error;

/// Errors surfaced by storage adapters.
///
/// The taxonomy matters for retry behavior: only `Transient` failures are
/// ever retried by a backend's resilient executor. `InvalidKey` and
/// `InvalidQuery` indicate caller bugs and are raised before any backend
/// call is attempted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    /// Throttling, rate limits, service unavailability, internal server
    /// errors, networking failures, timeouts. Retried up to the attempt
    /// budget; re-raised as-is once the budget is exhausted.
    #[error("Transient backend failure [{code}]: {message}")]
    Transient { code: String, message: String },
    /// Everything the backend rejects outright: validation errors, access
    /// denied, missing tables. Never retried.
    #[error("Backend operation failed [{code}]: {message}")]
    Backend { code: String, message: String },
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    /// Whether a resilient executor may retry the failed operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StorageError::Transient { .. })
    }

    /// The backend error code, when one exists.
    pub fn code(&self) -> Option<&str> {
        match self {
            StorageError::Transient { code, .. } | StorageError::Backend { code, .. } => {
                Some(code)
            }
            _ => None,
        }
    }
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_key_display() {
        let error = StorageError::InvalidKey("unrecognized entity type 'banana'".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid key: unrecognized entity type 'banana'"
        );
    }

    #[test]
    fn test_transient_display_carries_code() {
        let error = StorageError::Transient {
            code: "ThrottlingException".to_string(),
            message: "slow down".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Transient backend failure [ThrottlingException]: slow down"
        );
    }

    #[test]
    fn test_only_transient_is_retryable() {
        let transient = StorageError::Transient {
            code: "ServiceUnavailable".to_string(),
            message: "try later".to_string(),
        };
        let fatal = StorageError::Backend {
            code: "ValidationException".to_string(),
            message: "bad request".to_string(),
        };

        assert!(transient.is_retryable());
        assert!(!fatal.is_retryable());
        assert!(!StorageError::InvalidKey("x".to_string()).is_retryable());
        assert!(!StorageError::InvalidQuery("x".to_string()).is_retryable());
        assert!(!StorageError::Serialization("x".to_string()).is_retryable());
    }

    #[test]
    fn test_code_accessor() {
        let error = StorageError::Backend {
            code: "AccessDeniedException".to_string(),
            message: "nope".to_string(),
        };
        assert_eq!(error.code(), Some("AccessDeniedException"));
        assert_eq!(StorageError::InvalidKey("x".to_string()).code(), None);
    }
}
