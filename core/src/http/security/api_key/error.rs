//! API Key authentication error types.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use derive_more::{Display, Error};

/// Errors produced by API key authentication.
///
/// Rejections (`InvalidKey`, `NoPrincipal`, `Parse`, `Validation`) travel inside
/// [`AuthenticateResult::Fail`](super::AuthenticateResult::Fail). Faults
/// (`Configuration`, `Provider`, `Event`) are returned as `Err` and only the
/// `on_authentication_failed` event may turn them back into a result.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ApiKeyError {
    /// The key provider did not recognize the key, or returned a different key.
    #[display("Invalid API key provided by the key provider.")]
    InvalidKey,

    /// The succeeded event left no authenticated principal behind.
    #[display("No authenticated principal set.")]
    NoPrincipal,

    /// The key could not be read from the request.
    #[display("Error parsing API key: {message}")]
    Parse { message: String },

    /// The validate-key event rejected the key.
    #[display("{message}")]
    Validation { message: String },

    /// The scheme is misconfigured.
    #[display("{message}")]
    Configuration { message: String },

    /// The key provider failed while resolving a key.
    #[display("API key provider failure: {message}")]
    Provider { message: String },

    /// An event handler failed.
    #[display("API key event failure: {message}")]
    Event { message: String },
}

impl ApiKeyError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    pub fn event(message: impl Into<String>) -> Self {
        Self::Event {
            message: message.into(),
        }
    }

    /// Returns true for errors that reject a credential rather than signal a fault.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            ApiKeyError::InvalidKey
                | ApiKeyError::NoPrincipal
                | ApiKeyError::Parse { .. }
                | ApiKeyError::Validation { .. }
        )
    }
}

impl ResponseError for ApiKeyError {
    fn status_code(&self) -> StatusCode {
        if self.is_rejection() {
            StatusCode::UNAUTHORIZED
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error = status.canonical_reason().unwrap_or("Error");
        // Fault details stay in the logs.
        let message = if self.is_rejection() {
            self.to_string()
        } else {
            error.to_string()
        };
        HttpResponse::build(status).json(serde_json::json!({
            "error": error,
            "message": message,
        }))
    }
}
