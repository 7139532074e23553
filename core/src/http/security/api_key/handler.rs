//! API key authentication handler.
//!
//! One [`ApiKeyHandler`] exists per registered scheme. It reads the key from the
//! request, resolves it through the `on_validate_key` event or the key provider, builds
//! the principal and runs the success/failure events. It also writes the 401 challenge
//! and the 403 forbidden responses.

use std::sync::Arc;

use actix_web::http::header::{HeaderValue, WWW_AUTHENTICATE};
use actix_web::http::StatusCode;
use actix_web::{HttpMessage, HttpRequest, HttpResponse};
use log::{debug, error, info};

use crate::http::security::authorizer::AllowAnonymous;
use crate::http::security::principal::Principal;

use super::config::ApiKeyOptions;
use super::error::ApiKeyError;
use super::events::{
    AuthenticationFailedContext, AuthenticationSucceededContext, HandleChallengeContext,
    HandleForbiddenContext, ValidateKeyContext,
};
use super::location::ApiKeyLocation;
use super::result::AuthenticateResult;

const NO_RESOLVER: &str = "No key resolver configured: set the on_validate_key event \
                           in ApiKeyOptions.events or register an ApiKeyProvider \
                           or ApiKeyProviderFactory in ApiKeyOptions.";

/// Why resolution did not produce a result.
enum Failure {
    /// The key was rejected; the failed event defaults to `Fail`.
    Rejected(ApiKeyError),
    /// Something broke; the failed event defaults to propagating the error.
    Fault(ApiKeyError),
}

/// Authentication handler of one API key scheme.
///
/// # Example
/// ```ignore
/// use actix_api_key_core::http::security::{ApiKeyHandler, ApiKeyLocation, ApiKeyOptions};
///
/// let handler = ApiKeyHandler::new("ApiKey", ApiKeyLocation::Header, options)?;
///
/// match handler.authenticate(&req).await? {
///     AuthenticateResult::Success(principal) => { /* ... */ }
///     AuthenticateResult::Fail(error) => { /* ... */ }
///     AuthenticateResult::NoResult => { /* ... */ }
/// }
/// ```
#[derive(Clone, Debug)]
pub struct ApiKeyHandler {
    scheme_name: String,
    location: ApiKeyLocation,
    options: Arc<ApiKeyOptions>,
    challenge: Option<HeaderValue>,
}

impl ApiKeyHandler {
    /// Validates the options and builds the handler.
    pub fn new(
        scheme_name: impl Into<String>,
        location: ApiKeyLocation,
        options: ApiKeyOptions,
    ) -> Result<Self, ApiKeyError> {
        let scheme_name = scheme_name.into();
        if scheme_name.trim().is_empty() {
            return Err(ApiKeyError::configuration(
                "The authentication scheme name must be set.",
            ));
        }
        options.validate()?;

        let mut handler = ApiKeyHandler {
            scheme_name,
            location,
            options: Arc::new(options),
            challenge: None,
        };

        if !handler.options.should_suppress_www_authenticate_header() {
            let value = HeaderValue::from_str(&handler.www_authenticate_header()).map_err(|_| {
                ApiKeyError::configuration(
                    "The realm and key name must be visible ASCII to build the WWW-Authenticate header.",
                )
            })?;
            handler.challenge = Some(value);
        }

        Ok(handler)
    }

    pub fn get_scheme_name(&self) -> &str {
        &self.scheme_name
    }

    pub fn get_location(&self) -> ApiKeyLocation {
        self.location
    }

    pub fn get_options(&self) -> &ApiKeyOptions {
        &self.options
    }

    /// Value of the `WWW-Authenticate` header written by [`challenge`](Self::challenge).
    pub fn www_authenticate_header(&self) -> String {
        let scheme = if self.options.should_use_key_name_as_scheme_name() {
            self.options.get_key_name()
        } else {
            &self.scheme_name
        };
        format!(
            r#"{} realm="{}", charset="UTF-8", in="{}", key_name="{}""#,
            scheme,
            self.options.get_realm(),
            self.location.in_parameter(),
            self.options.get_key_name()
        )
    }

    fn issuer(&self) -> &str {
        self.options
            .get_claims_issuer()
            .unwrap_or(self.scheme_name.as_str())
    }

    /// Authenticates the request.
    ///
    /// Expected outcomes are values: `NoResult` when no key was presented, `Fail` when
    /// it was rejected. `Err` is returned only for faults the failed event left unhandled.
    pub async fn authenticate(&self, req: &HttpRequest) -> Result<AuthenticateResult, ApiKeyError> {
        if self.options.should_ignore_authentication_if_allow_anonymous()
            && req.extensions().contains::<AllowAnonymous>()
        {
            info!(
                "{}: skipping API key authentication for anonymous endpoint {}",
                self.scheme_name,
                req.path()
            );
            return Ok(AuthenticateResult::NoResult);
        }

        let api_key = match self
            .location
            .extract(req, self.options.get_key_name(), &self.scheme_name)
        {
            Ok(Some(key)) => key,
            Ok(None) => {
                debug!(
                    "{}: no API key found in {}",
                    self.scheme_name,
                    self.location.in_parameter()
                );
                return Ok(AuthenticateResult::NoResult);
            }
            Err(err) => {
                error!("{}: {}", self.scheme_name, err);
                return Ok(AuthenticateResult::Fail(err));
            }
        };

        match self.resolve(req, &api_key).await {
            Ok(result) => {
                if let AuthenticateResult::Fail(ApiKeyError::NoPrincipal) = result {
                    error!("{}: {}", self.scheme_name, ApiKeyError::NoPrincipal);
                }
                Ok(result)
            }
            Err(failure) => self.authentication_failed(req, failure).await,
        }
    }

    async fn resolve(
        &self,
        req: &HttpRequest,
        api_key: &str,
    ) -> Result<AuthenticateResult, Failure> {
        let events = self.options.get_events();

        if events.has_validate_key() {
            let ctx = ValidateKeyContext::new(
                req.clone(),
                &self.scheme_name,
                Arc::clone(&self.options),
                api_key.to_string(),
            );
            let ctx = events.validate_key(ctx).await.map_err(Failure::Fault)?;
            if let Some(result) = ctx.into_decision() {
                return Ok(result);
            }
        }

        let provider = self
            .options
            .resolve_provider(&self.scheme_name)
            .ok_or_else(|| Failure::Rejected(ApiKeyError::configuration(NO_RESOLVER)))?;

        let key = match provider.provide(api_key).await.map_err(Failure::Fault)? {
            Some(key)
                if self.options.should_ignore_key_mismatch()
                    || key.matches(api_key) =>
            {
                key
            }
            _ => return Err(Failure::Rejected(ApiKeyError::InvalidKey)),
        };

        let (_, owner_name, claims) = key.into_parts();
        let principal = Principal::from_owner(
            owner_name.as_deref(),
            &self.scheme_name,
            self.issuer(),
            claims,
        );

        let ctx = AuthenticationSucceededContext::new(
            req.clone(),
            &self.scheme_name,
            Arc::clone(&self.options),
            principal,
        );
        let ctx = events
            .authentication_succeeded(ctx)
            .await
            .map_err(Failure::Fault)?;

        Ok(ctx.into_result())
    }

    async fn authentication_failed(
        &self,
        req: &HttpRequest,
        failure: Failure,
    ) -> Result<AuthenticateResult, ApiKeyError> {
        let (error, fault) = match failure {
            Failure::Rejected(error) => (error, false),
            Failure::Fault(error) => (error, true),
        };
        error!("{}: {}", self.scheme_name, error);

        let ctx = AuthenticationFailedContext::new(
            req.clone(),
            &self.scheme_name,
            Arc::clone(&self.options),
            error,
        );
        let (error, result) = self
            .options
            .get_events()
            .authentication_failed(ctx)
            .await?
            .into_parts();

        match result {
            Some(result) => Ok(result),
            None if fault => Err(error),
            None => Ok(AuthenticateResult::Fail(error)),
        }
    }

    /// Runs the challenge event and, unless it handled the request, writes the default
    /// 401 response.
    ///
    /// Returns the response and whether the event handled it.
    pub async fn handle_challenge(
        &self,
        req: &HttpRequest,
        failure: Option<ApiKeyError>,
    ) -> Result<(HttpResponse, bool), ApiKeyError> {
        let ctx = HandleChallengeContext::new(
            req.clone(),
            &self.scheme_name,
            Arc::clone(&self.options),
            failure,
        );
        let (mut response, handled) = self
            .options
            .get_events()
            .handle_challenge(ctx)
            .await?
            .into_response();

        if !handled {
            *response.status_mut() = StatusCode::UNAUTHORIZED;
            if let Some(value) = &self.challenge {
                response
                    .headers_mut()
                    .insert(WWW_AUTHENTICATE, value.clone());
            }
        }

        Ok((response, handled))
    }

    /// The 401 response for an unauthenticated request.
    pub async fn challenge(&self, req: &HttpRequest) -> Result<HttpResponse, ApiKeyError> {
        self.handle_challenge(req, None)
            .await
            .map(|(response, _)| response)
    }

    /// Runs the forbidden event and, unless it handled the request, writes the default
    /// 403 response.
    pub async fn handle_forbidden(
        &self,
        req: &HttpRequest,
    ) -> Result<(HttpResponse, bool), ApiKeyError> {
        let ctx = HandleForbiddenContext::new(req.clone(), &self.scheme_name, Arc::clone(&self.options));
        let (mut response, handled) = self
            .options
            .get_events()
            .handle_forbidden(ctx)
            .await?
            .into_response();

        if !handled {
            *response.status_mut() = StatusCode::FORBIDDEN;
        }

        Ok((response, handled))
    }

    /// The 403 response for an authenticated request lacking access.
    pub async fn forbid(&self, req: &HttpRequest) -> Result<HttpResponse, ApiKeyError> {
        self.handle_forbidden(req)
            .await
            .map(|(response, _)| response)
    }
}
