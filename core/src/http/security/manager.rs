//! Factory methods for API key schemes.

use crate::http::security::api_key::{
    ApiKeyDefaults, ApiKeyError, ApiKeyHandler, ApiKeyLocation, ApiKeyOptions,
};

/// Builds [`ApiKeyHandler`]s registered under the default `ApiKey` scheme name.
///
/// Use [`ApiKeyHandler::new`] directly to pick another scheme name, e.g. when several
/// schemes guard the same scope.
pub struct AuthenticationManager {}

impl AuthenticationManager {
    pub fn api_key_in_header(options: ApiKeyOptions) -> Result<ApiKeyHandler, ApiKeyError> {
        Self::api_key(ApiKeyLocation::Header, options)
    }

    pub fn api_key_in_query_params(options: ApiKeyOptions) -> Result<ApiKeyHandler, ApiKeyError> {
        Self::api_key(ApiKeyLocation::QueryParams, options)
    }

    pub fn api_key_in_header_or_query_params(
        options: ApiKeyOptions,
    ) -> Result<ApiKeyHandler, ApiKeyError> {
        Self::api_key(ApiKeyLocation::HeaderOrQueryParams, options)
    }

    pub fn api_key_in_authorization_header(
        options: ApiKeyOptions,
    ) -> Result<ApiKeyHandler, ApiKeyError> {
        Self::api_key(ApiKeyLocation::AuthorizationHeader, options)
    }

    pub fn api_key_in_route_values(options: ApiKeyOptions) -> Result<ApiKeyHandler, ApiKeyError> {
        Self::api_key(ApiKeyLocation::RouteValues, options)
    }

    fn api_key(
        location: ApiKeyLocation,
        options: ApiKeyOptions,
    ) -> Result<ApiKeyHandler, ApiKeyError> {
        ApiKeyHandler::new(ApiKeyDefaults::AUTHENTICATION_SCHEME, location, options)
    }
}
