//! # Registration Error Types
//!
//! Typed error handling for the regdesk-pay service.
//! All payment and reconciliation operations return `Result<T, RegistrationError>`.

use thiserror::Error;

/// Core error type for session creation and webhook reconciliation
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Configuration errors (missing env vars, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Missing or invalid client input (client-caused, never retried)
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Webhook signature verification failed
    #[error("Webhook verification failed: {0}")]
    Authentication(String),

    /// Verified webhook payload could not be parsed
    #[error("Webhook parse error: {0}")]
    WebhookParse(String),

    /// Payment provider API error (outbound session creation)
    #[error("Provider error [{provider}]: {message}")]
    Provider { provider: String, message: String },

    /// Network/HTTP error communicating with the provider
    #[error("Network error: {0}")]
    Network(String),

    /// Profile store read or write failed
    #[error("Store error: {0}")]
    Store(String),

    /// Completed payment arrived for a user id with no profile row
    #[error("No profile in {table} for user {user_id}")]
    ProfileNotFound { table: String, user_id: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RegistrationError {
    /// Returns true if this error is retryable.
    ///
    /// Store-class errors are retried by the provider redelivering the
    /// webhook; provider/network errors are retried by the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RegistrationError::Network(_)
                | RegistrationError::Provider { .. }
                | RegistrationError::Store(_)
                | RegistrationError::ProfileNotFound { .. }
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            RegistrationError::Configuration(_) => 500,
            RegistrationError::Validation(_) => 400,
            RegistrationError::Authentication(_) => 400,
            RegistrationError::WebhookParse(_) => 400,
            RegistrationError::Provider { .. } => 502,
            RegistrationError::Network(_) => 503,
            RegistrationError::Store(_) => 500,
            RegistrationError::ProfileNotFound { .. } => 500,
            RegistrationError::Serialization(_) => 500,
        }
    }
}

/// Result type alias for registration payment operations
pub type RegistrationResult<T> = Result<T, RegistrationError>;
