//! API Key scheme options.

use std::fmt;
use std::sync::Arc;

use super::error::ApiKeyError;
use super::events::ApiKeyEvents;
use super::provider::{ApiKeyProvider, ApiKeyProviderFactory};

/// Default values for API key schemes.
pub struct ApiKeyDefaults;

impl ApiKeyDefaults {
    /// Scheme name used by the `AuthenticationManager::api_key_in_*` factories.
    pub const AUTHENTICATION_SCHEME: &'static str = "ApiKey";
}

/// How a scheme obtains its key provider.
#[derive(Clone)]
pub(crate) enum KeyProvider {
    Instance(Arc<dyn ApiKeyProvider>),
    Factory(Arc<dyn ApiKeyProviderFactory>),
}

/// Options of one API key scheme.
///
/// Built once at registration, validated by
/// [`ApiKeyHandler::new`](super::ApiKeyHandler::new), then shared read-only.
///
/// # Example
///
/// ```
/// use actix_api_key_core::http::security::{ApiKeyOptions, InMemoryApiKeyProvider};
/// use std::sync::Arc;
///
/// let options = ApiKeyOptions::new()
///     .key_name("X-API-KEY")
///     .realm("Sample Web API")
///     .provider(Arc::new(InMemoryApiKeyProvider::new()));
///
/// assert!(options.validate().is_ok());
/// ```
#[derive(Clone, Default)]
pub struct ApiKeyOptions {
    key_name: String,
    realm: String,
    suppress_www_authenticate_header: bool,
    legacy_ignore_key_mismatch: bool,
    legacy_use_key_name_as_scheme_name: bool,
    ignore_authentication_if_allow_anonymous: bool,
    claims_issuer: Option<String>,
    provider: Option<KeyProvider>,
    events: ApiKeyEvents,
}

impl ApiKeyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the header, query parameter or route value carrying the key.
    pub fn key_name(mut self, key_name: impl Into<String>) -> Self {
        self.key_name = key_name.into();
        self
    }

    /// Realm advertised in the `WWW-Authenticate` challenge.
    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    pub fn suppress_www_authenticate_header(mut self, suppress: bool) -> Self {
        self.suppress_www_authenticate_header = suppress;
        self
    }

    /// Accepts provider results whose key differs from the presented one.
    pub fn legacy_ignore_key_mismatch(mut self, ignore: bool) -> Self {
        self.legacy_ignore_key_mismatch = ignore;
        self
    }

    /// Uses the key name instead of the scheme name in the challenge.
    pub fn legacy_use_key_name_as_scheme_name(mut self, use_key_name: bool) -> Self {
        self.legacy_use_key_name_as_scheme_name = use_key_name;
        self
    }

    /// Skips authentication for requests marked `AllowAnonymous`.
    pub fn ignore_authentication_if_allow_anonymous(mut self, ignore: bool) -> Self {
        self.ignore_authentication_if_allow_anonymous = ignore;
        self
    }

    /// Issuer of the claims added for the key owner. Defaults to the scheme name.
    pub fn claims_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.claims_issuer = Some(issuer.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn ApiKeyProvider>) -> Self {
        self.provider = Some(KeyProvider::Instance(provider));
        self
    }

    pub fn provider_factory(mut self, factory: Arc<dyn ApiKeyProviderFactory>) -> Self {
        self.provider = Some(KeyProvider::Factory(factory));
        self
    }

    pub fn events(mut self, events: ApiKeyEvents) -> Self {
        self.events = events;
        self
    }

    pub fn get_key_name(&self) -> &str {
        &self.key_name
    }

    pub fn get_realm(&self) -> &str {
        &self.realm
    }

    pub fn should_suppress_www_authenticate_header(&self) -> bool {
        self.suppress_www_authenticate_header
    }

    pub fn should_ignore_key_mismatch(&self) -> bool {
        self.legacy_ignore_key_mismatch
    }

    pub fn should_use_key_name_as_scheme_name(&self) -> bool {
        self.legacy_use_key_name_as_scheme_name
    }

    pub fn should_ignore_authentication_if_allow_anonymous(&self) -> bool {
        self.ignore_authentication_if_allow_anonymous
    }

    pub fn get_claims_issuer(&self) -> Option<&str> {
        self.claims_issuer.as_deref()
    }

    pub fn get_events(&self) -> &ApiKeyEvents {
        &self.events
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// The provider to use for `scheme_name`, creating one when a factory is registered.
    pub(crate) fn resolve_provider(&self, scheme_name: &str) -> Option<Arc<dyn ApiKeyProvider>> {
        match &self.provider {
            Some(KeyProvider::Instance(provider)) => Some(Arc::clone(provider)),
            Some(KeyProvider::Factory(factory)) => Some(factory.create_provider(scheme_name)),
            None => None,
        }
    }

    /// Checks the options, reporting the first problem found.
    pub fn validate(&self) -> Result<(), ApiKeyError> {
        if !self.suppress_www_authenticate_header && self.realm.trim().is_empty() {
            return Err(ApiKeyError::configuration(
                "ApiKeyOptions.realm must be set when the WWW-Authenticate header is not suppressed.",
            ));
        }

        if self.key_name.trim().is_empty() {
            return Err(ApiKeyError::configuration(
                "ApiKeyOptions.key_name must be set: the key name is required.",
            ));
        }

        if !self.events.has_validate_key() && self.provider.is_none() {
            return Err(ApiKeyError::configuration(
                "Either set the on_validate_key event in ApiKeyOptions.events \
                 or register an ApiKeyProvider or ApiKeyProviderFactory in ApiKeyOptions.",
            ));
        }

        Ok(())
    }
}

impl fmt::Debug for ApiKeyOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let provider = match &self.provider {
            Some(KeyProvider::Instance(_)) => "instance",
            Some(KeyProvider::Factory(_)) => "factory",
            None => "none",
        };
        f.debug_struct("ApiKeyOptions")
            .field("key_name", &self.key_name)
            .field("realm", &self.realm)
            .field(
                "suppress_www_authenticate_header",
                &self.suppress_www_authenticate_header,
            )
            .field("legacy_ignore_key_mismatch", &self.legacy_ignore_key_mismatch)
            .field(
                "legacy_use_key_name_as_scheme_name",
                &self.legacy_use_key_name_as_scheme_name,
            )
            .field(
                "ignore_authentication_if_allow_anonymous",
                &self.ignore_authentication_if_allow_anonymous,
            )
            .field("claims_issuer", &self.claims_issuer)
            .field("provider", &provider)
            .field("events", &self.events)
            .finish()
    }
}
