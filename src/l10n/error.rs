/// Error types for the localization pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum L10nError {
    /// A phrase was looked up that was never registered or never resolved.
    /// This is a phase-ordering bug, never bad user input.
    InvariantViolation(String),
    /// The translation provider reported a failure for a phrase
    TranslationError(String),
    /// Invalid or missing configuration
    ConfigError(String),
    /// HTTP transport failure
    NetworkError(String),
    /// Malformed locale code
    InvalidLocale(String),
    /// Loading or saving a cache snapshot or export failed
    StoreError(String),
    /// Resolution was cancelled before all phrases were translated
    Cancelled(String),
    /// Resolution did not finish before its deadline
    DeadlineExceeded(String),
    /// A pipeline phase was started out of order
    InvalidState(String),
    /// A spawned task panicked or was aborted unexpectedly
    TaskError(String),
}

impl std::fmt::Display for L10nError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            L10nError::InvariantViolation(msg) => write!(f, "Invariant violation: {}", msg),
            L10nError::TranslationError(msg) => write!(f, "Translation error: {}", msg),
            L10nError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            L10nError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            L10nError::InvalidLocale(msg) => write!(f, "Invalid locale: {}", msg),
            L10nError::StoreError(msg) => write!(f, "Store error: {}", msg),
            L10nError::Cancelled(msg) => write!(f, "Cancelled: {}", msg),
            L10nError::DeadlineExceeded(msg) => write!(f, "Deadline exceeded: {}", msg),
            L10nError::InvalidState(msg) => write!(f, "Invalid pipeline state: {}", msg),
            L10nError::TaskError(msg) => write!(f, "Task error: {}", msg),
        }
    }
}

impl std::error::Error for L10nError {}

impl L10nError {
    /// True for errors after which a later run can pick up where this one stopped
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            L10nError::TranslationError(_)
                | L10nError::NetworkError(_)
                | L10nError::Cancelled(_)
                | L10nError::DeadlineExceeded(_)
        )
    }
}

impl From<reqwest::Error> for L10nError {
    fn from(err: reqwest::Error) -> Self {
        L10nError::NetworkError(err.to_string())
    }
}

impl From<std::io::Error> for L10nError {
    fn from(err: std::io::Error) -> Self {
        L10nError::StoreError(err.to_string())
    }
}

impl From<serde_json::Error> for L10nError {
    fn from(err: serde_json::Error) -> Self {
        L10nError::StoreError(format!("JSON error: {}", err))
    }
}

impl From<tokio::task::JoinError> for L10nError {
    fn from(err: tokio::task::JoinError) -> Self {
        L10nError::TaskError(err.to_string())
    }
}

/// Result type for localization operations
pub type L10nResult<T> = Result<T, L10nError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let err = L10nError::InvariantViolation("phrase `Soft` not in cache".to_string());
        assert_eq!(
            err.to_string(),
            "Invariant violation: phrase `Soft` not in cache"
        );
        assert!(
            L10nError::DeadlineExceeded("30s".to_string())
                .to_string()
                .starts_with("Deadline exceeded")
        );
    }

    #[test]
    fn test_retryable_classification() {
        assert!(L10nError::TranslationError("quota".to_string()).is_retryable());
        assert!(L10nError::Cancelled("stop".to_string()).is_retryable());
        assert!(!L10nError::InvariantViolation("bug".to_string()).is_retryable());
        assert!(!L10nError::ConfigError("no key".to_string()).is_retryable());
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: L10nError = io.into();
        assert!(matches!(err, L10nError::StoreError(_)));
    }
}
