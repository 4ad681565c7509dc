//! Error types for queue operations.

use thiserror::Error;

/// Comprehensive error type for all queue operations
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Queue not found: {queue_name}")]
    QueueNotFound { queue_name: String },

    #[error("Queue already exists with different attributes: {queue_name}")]
    QueueAlreadyExists { queue_name: String },

    #[error("Dead letter queue not found: {message}")]
    DeadLetterQueueNotFound { queue_name: String, message: String },

    #[error("Dead letter queue '{queue_name}' has no QueueArn attribute")]
    DeadLetterArnMissing { queue_name: String },

    #[error("Provider returned no queue URL for '{queue_name}'")]
    QueueUrlMissing { queue_name: String },

    #[error("Cannot derive a queue name from locator '{locator}'")]
    MalformedQueueLocator { locator: String },

    #[error("Message not found or receipt expired: {receipt}")]
    MessageNotFound { receipt: String },

    #[error("Message body is not valid JSON: {0}")]
    DeserializationError(#[source] serde_json::Error),

    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Provider error ({provider}): {code} - {message}")]
    ProviderError {
        provider: String,
        code: String,
        message: String,
    },

    #[error("Serialization failed: {0}")]
    SerializationError(#[from] SerializationError),

    #[error("Configuration error: {0}")]
    ConfigurationError(#[from] ConfigurationError),
}

impl QueueError {
    /// Check if error is transient.
    ///
    /// The crate never retries on its own; this is for callers layering
    /// their own retry policy on top.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::QueueNotFound { .. } => false,
            Self::QueueAlreadyExists { .. } => false,
            Self::DeadLetterQueueNotFound { .. } => false,
            Self::DeadLetterArnMissing { .. } => false,
            Self::QueueUrlMissing { .. } => false,
            Self::MalformedQueueLocator { .. } => false,
            Self::MessageNotFound { .. } => false,
            Self::DeserializationError(_) => false,
            Self::ConnectionFailed { .. } => true,
            Self::AuthenticationFailed { .. } => false,
            Self::ProviderError { code, .. } => is_retryable_code(code),
            Self::SerializationError(_) => false,
            Self::ConfigurationError(_) => false,
        }
    }
}

/// Provider error codes that describe throttling or a server-side fault.
///
/// Anything else is a rejection of the request itself and fails the same
/// way when repeated.
pub fn is_retryable_code(code: &str) -> bool {
    matches!(
        code,
        "Throttling"
            | "ThrottlingException"
            | "ThrottledException"
            | "RequestThrottled"
            | "RequestLimitExceeded"
            | "KmsThrottled"
            | "ServiceUnavailable"
            | "InternalError"
            | "InternalFailure"
            | "RequestTimeout"
    )
}

/// Errors while encoding an outgoing message body
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("JSON serialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Redrive policy could not be encoded: {0}")]
    RedrivePolicy(#[source] serde_json::Error),
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {key}")]
    Missing { key: String },

    #[error("Configuration parsing failed: {message}")]
    Parsing { message: String },
}

impl From<config::ConfigError> for ConfigurationError {
    fn from(err: config::ConfigError) -> Self {
        Self::Parsing {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
