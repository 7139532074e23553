//! Security module providing API key authentication and authorization.
//!
//! # Module Structure
//!
//! - `api_key` - API key schemes: locations, options, events, providers, handler
//! - `authorizer` - Request authorization (RequestMatcherAuthorizer, Access)
//! - `extractor` - Actix Web extractors (AuthenticatedPrincipal, OptionalPrincipal)
//! - `manager` - Factory methods (AuthenticationManager)
//! - `middleware` - Security middleware (SecurityTransform)
//! - `principal` - Claims based principal model

// Re-exports for convenience
pub use api_key::{
    ApiKey, ApiKeyDefaults, ApiKeyError, ApiKeyEvents, ApiKeyHandler, ApiKeyLocation,
    ApiKeyOptions, ApiKeyProvider, ApiKeyProviderFactory, AuthenticateResult,
    AuthenticationFailedContext, AuthenticationSucceededContext, HandleChallengeContext,
    HandleForbiddenContext, InMemoryApiKeyProvider, ValidateKeyContext,
};
pub use authorizer::{Access, AllowAnonymous, Decision, RequestMatcherAuthorizer};
pub use extractor::{AuthenticatedPrincipal, OptionalPrincipal, SecurityExt};
pub use manager::AuthenticationManager;
pub use middleware::{SecurityService, SecurityTransform};
pub use principal::{Claim, ClaimTypes, Principal};

pub mod api_key;
pub mod authorizer;
pub mod extractor;
pub mod manager;
pub mod middleware;
pub mod principal;
