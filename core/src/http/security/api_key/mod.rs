//! API Key Authentication for Actix Web.
//!
//! # Overview
//!
//! Clients present a pre-shared key with each request. A scheme is made of:
//! - an [`ApiKeyLocation`]: where the key is read from,
//! - [`ApiKeyOptions`]: key name, realm, flags and the key resolver,
//! - optional [`ApiKeyEvents`] intercepting validation, success, failure, challenge
//!   and forbidden decisions.
//!
//! # Key Locations
//!
//! - **Header**: `X-API-KEY: Key1`
//! - **QueryParams**: `?X-API-KEY=Key1`
//! - **HeaderOrQueryParams**: query string, then header, then `Authorization`
//! - **AuthorizationHeader**: `Authorization: ApiKey Key1`
//! - **RouteValues**: `/keys/{X-API-KEY}/items`
//!
//! # Usage
//!
//! ```ignore
//! use actix_api_key_core::http::security::api_key::{
//!     ApiKey, ApiKeyHandler, ApiKeyLocation, ApiKeyOptions, InMemoryApiKeyProvider,
//! };
//! use std::sync::Arc;
//!
//! let provider = InMemoryApiKeyProvider::new()
//!     .with_key(ApiKey::new("Key1").owner("Admin").role("ADMIN"));
//!
//! let handler = ApiKeyHandler::new(
//!     "ApiKey",
//!     ApiKeyLocation::Header,
//!     ApiKeyOptions::new()
//!         .key_name("X-API-KEY")
//!         .realm("Sample Web API")
//!         .provider(Arc::new(provider)),
//! )?;
//! ```
//!
//! # Results
//!
//! [`ApiKeyHandler::authenticate`] yields `NoResult` when no key is present,
//! `Fail` when a key is rejected and `Success` with a [`Principal`] otherwise.
//! Provider or event faults are returned as `Err`.
//!
//! [`Principal`]: crate::http::security::Principal

mod config;
mod error;
mod events;
mod handler;
mod key;
mod location;
mod provider;
mod result;

pub use config::{ApiKeyDefaults, ApiKeyOptions};
pub use error::ApiKeyError;
pub use events::{
    ApiKeyEvents, AuthenticationFailedContext, AuthenticationSucceededContext,
    HandleChallengeContext, HandleForbiddenContext, ValidateKeyContext,
};
pub use handler::ApiKeyHandler;
pub use key::ApiKey;
pub use location::ApiKeyLocation;
pub use provider::{ApiKeyProvider, ApiKeyProviderFactory, InMemoryApiKeyProvider};
pub use result::AuthenticateResult;
