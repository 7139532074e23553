//! Outcome of an authentication attempt.

use crate::http::security::principal::Principal;

use super::error::ApiKeyError;

/// Result of [`ApiKeyHandler::authenticate`](super::ApiKeyHandler::authenticate).
#[derive(Debug, Clone, PartialEq)]
pub enum AuthenticateResult {
    /// The key was accepted.
    Success(Principal),
    /// A key was presented and rejected.
    Fail(ApiKeyError),
    /// No key was presented; other schemes may still authenticate the request.
    NoResult,
}

impl AuthenticateResult {
    pub fn success(principal: Principal) -> Self {
        AuthenticateResult::Success(principal)
    }

    pub fn fail(error: ApiKeyError) -> Self {
        AuthenticateResult::Fail(error)
    }

    pub fn no_result() -> Self {
        AuthenticateResult::NoResult
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AuthenticateResult::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, AuthenticateResult::Fail(_))
    }

    pub fn is_no_result(&self) -> bool {
        matches!(self, AuthenticateResult::NoResult)
    }

    pub fn get_principal(&self) -> Option<&Principal> {
        match self {
            AuthenticateResult::Success(principal) => Some(principal),
            _ => None,
        }
    }

    pub fn get_failure(&self) -> Option<&ApiKeyError> {
        match self {
            AuthenticateResult::Fail(error) => Some(error),
            _ => None,
        }
    }
}
