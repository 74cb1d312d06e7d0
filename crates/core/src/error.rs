use thiserror::Error;

/// Input errors surfaced synchronously to callers of the submission / lifecycle API
/// (spec §7). Never retried.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation failed: {0:?}")]
    Validation(Vec<String>),

    #[error("action {0:?} is not supported for this media type")]
    ActionNotSupported(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("illegal state: {0}")]
    IllegalState(String),

    #[error("action not found: {0}")]
    ActionNotFound(String),
}

/// The non-retriable classification a worker assigns to an executor failure (spec §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Timeout,
    PermissionDenied,
    ValidationError,
    NotFound,
    ProcessingError,
    ActionNotFound,
    Stalled,
}

impl ErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "TIMEOUT",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::ProcessingError => "PROCESSING_ERROR",
            Self::ActionNotFound => "ACTION_NOT_FOUND",
            Self::Stalled => "STALLED",
        }
    }

    /// Classifies an executor failure message by substring hint, per spec §7.
    #[must_use]
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("timeout") || lower.contains("timed out") {
            Self::Timeout
        } else if lower.contains("permission") {
            Self::PermissionDenied
        } else if lower.contains("validation") {
            Self::ValidationError
        } else if lower.contains("not found") {
            Self::NotFound
        } else {
            Self::ProcessingError
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_substring_hint() {
        assert_eq!(ErrorCode::classify("request timed out"), ErrorCode::Timeout);
        assert_eq!(
            ErrorCode::classify("Permission denied for bucket"),
            ErrorCode::PermissionDenied
        );
        assert_eq!(
            ErrorCode::classify("validation failed: missing width"),
            ErrorCode::ValidationError
        );
        assert_eq!(ErrorCode::classify("file not found"), ErrorCode::NotFound);
        assert_eq!(
            ErrorCode::classify("codec exploded"),
            ErrorCode::ProcessingError
        );
    }
}
