//! # Actix API Key Core
//!
//! API key authentication for Actix Web.
//!
//! A key is located in the request (header, query string, `Authorization` header or a
//! route segment), resolved through an `on_validate_key` event or an
//! [`ApiKeyProvider`](http::security::ApiKeyProvider), and turned into a
//! [`Principal`](http::security::Principal) carrying claims. Every decision point can
//! be intercepted through [`ApiKeyEvents`](http::security::ApiKeyEvents).
//!
//! ## Quick Start
//!
//! ```ignore
//! use actix_api_key_core::http::security::{
//!     Access, ApiKey, ApiKeyOptions, AuthenticationManager, InMemoryApiKeyProvider,
//!     SecurityTransform,
//! };
//! use std::sync::Arc;
//!
//! let provider = InMemoryApiKeyProvider::new()
//!     .with_key(ApiKey::new("Key1").owner("Admin").role("ADMIN"));
//!
//! let options = ApiKeyOptions::new()
//!     .key_name("X-API-KEY")
//!     .realm("Sample Web API")
//!     .provider(Arc::new(provider));
//!
//! let security = SecurityTransform::new()
//!     .scheme(AuthenticationManager::api_key_in_header(options)?)
//!     .add_matcher("^/public", Access::permit_all())?
//!     .add_matcher("^/", Access::authenticated())?;
//!
//! App::new().wrap(security)
//! ```

pub mod http;
