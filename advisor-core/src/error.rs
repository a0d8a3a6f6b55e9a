use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the advisor core
#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("Completion request failed: {0}")]
    CompletionFailed(String),

    #[error("Could not parse model response: {0}")]
    ParseError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Inquiry not found: {0}")]
    InquiryNotFound(Uuid),

    #[error("Inquiry {0} is already completed")]
    AlreadyCompleted(Uuid),

    #[error("Deletion of inquiry {0} was not confirmed")]
    DeleteNotConfirmed(Uuid),

    #[error("Admin authentication required")]
    Unauthorized,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AdvisorError {
    /// True when the error text carries a rate-limit or quota marker.
    pub fn is_quota(&self) -> bool {
        let message = self.to_string();
        message.contains("429") || message.contains("RESOURCE_EXHAUSTED")
    }
}

impl From<serde_json::Error> for AdvisorError {
    fn from(err: serde_json::Error) -> Self {
        AdvisorError::ParseError(err.to_string())
    }
}

impl From<sqlx::Error> for AdvisorError {
    fn from(err: sqlx::Error) -> Self {
        AdvisorError::StorageError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AdvisorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_markers_are_detected_by_substring() {
        assert!(AdvisorError::CompletionFailed("HTTP 429 Too Many Requests".into()).is_quota());
        assert!(AdvisorError::CompletionFailed("status: RESOURCE_EXHAUSTED".into()).is_quota());
        assert!(!AdvisorError::CompletionFailed("connection reset".into()).is_quota());
        assert!(!AdvisorError::Unauthorized.is_quota());
    }
}
