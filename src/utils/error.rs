use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{message}")]
    FetchError { message: String },

    #[error("Store error: {message}")]
    StoreError { message: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl QuoteError {
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::FetchError {
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::StoreError {
            message: message.into(),
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            QuoteError::ApiError(_) | QuoteError::FetchError { .. } => ErrorSeverity::Medium,
            QuoteError::SerializationError(_) => ErrorSeverity::Medium,
            QuoteError::DatabaseError(_) | QuoteError::StoreError { .. } => ErrorSeverity::High,
            QuoteError::ConfigValidationError { .. }
            | QuoteError::InvalidConfigValueError { .. }
            | QuoteError::MissingConfigError { .. } => ErrorSeverity::High,
            QuoteError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            QuoteError::ApiError(_) | QuoteError::FetchError { .. } => {
                "Check the network connection and the API key, then fetch again"
            }
            QuoteError::SerializationError(_) => {
                "The quote API returned an unexpected payload; check the endpoint"
            }
            QuoteError::DatabaseError(_) | QuoteError::StoreError { .. } => {
                "Check that the database path is writable, or run with --ephemeral"
            }
            QuoteError::ConfigValidationError { .. }
            | QuoteError::InvalidConfigValueError { .. }
            | QuoteError::MissingConfigError { .. } => {
                "Fix the configuration file or command line arguments"
            }
            QuoteError::IoError(_) => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, QuoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_displays_bare_message() {
        let err = QuoteError::fetch("timeout");
        assert_eq!(err.to_string(), "timeout");
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = QuoteError::MissingConfigError {
            field: "source.api_key".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.to_string().contains("source.api_key"));
    }
}
