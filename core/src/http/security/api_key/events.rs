//! Interception points of API key authentication.
//!
//! Every hook receives a context by value and hands it back, possibly after recording a
//! decision on it. A hook that records nothing leaves the default behavior in place.
//!
//! # Example
//!
//! ```ignore
//! use actix_api_key_core::http::security::{ApiKeyEvents, Claim};
//!
//! let events = ApiKeyEvents::new()
//!     .on_validate_key(|mut ctx| async move {
//!         if ctx.get_api_key() == "Key1" {
//!             ctx.validation_succeeded(Some("Admin"), vec![Claim::new("role", "ADMIN")]);
//!         } else {
//!             ctx.validation_failed(Some("Unknown key"));
//!         }
//!         Ok(ctx)
//!     })
//!     .on_handle_challenge(|mut ctx| async move {
//!         ctx.get_response_mut().headers_mut().insert(
//!             actix_web::http::header::HeaderName::from_static("x-reason"),
//!             actix_web::http::header::HeaderValue::from_static("missing key"),
//!         );
//!         Ok(ctx)
//!     });
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse};
use futures_util::future::LocalBoxFuture;

use crate::http::security::principal::{Claim, Principal};

use super::config::ApiKeyOptions;
use super::error::ApiKeyError;
use super::result::AuthenticateResult;

type Hook<C> = Arc<dyn Fn(C) -> LocalBoxFuture<'static, Result<C, ApiKeyError>> + Send + Sync>;

fn hook<C, F, Fut>(f: F) -> Hook<C>
where
    C: 'static,
    F: Fn(C) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<C, ApiKeyError>> + 'static,
{
    Arc::new(move |ctx: C| -> LocalBoxFuture<'static, Result<C, ApiKeyError>> {
        Box::pin(f(ctx))
    })
}

async fn raise<C>(hook: &Option<Hook<C>>, ctx: C) -> Result<C, ApiKeyError> {
    match hook {
        Some(hook) => hook(ctx).await,
        None => Ok(ctx),
    }
}

/// Optional hooks invoked while authenticating, challenging and forbidding.
#[derive(Clone, Default)]
pub struct ApiKeyEvents {
    validate_key: Option<Hook<ValidateKeyContext>>,
    authentication_succeeded: Option<Hook<AuthenticationSucceededContext>>,
    authentication_failed: Option<Hook<AuthenticationFailedContext>>,
    handle_challenge: Option<Hook<HandleChallengeContext>>,
    handle_forbidden: Option<Hook<HandleForbiddenContext>>,
}

impl ApiKeyEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the presented key instead of a key provider.
    ///
    /// When the hook records a result, or sets an authenticated principal, the provider
    /// is not consulted.
    pub fn on_validate_key<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ValidateKeyContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ValidateKeyContext, ApiKeyError>> + 'static,
    {
        self.validate_key = Some(hook(f));
        self
    }

    /// Runs after a key was resolved and a principal built.
    pub fn on_authentication_succeeded<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(AuthenticationSucceededContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<AuthenticationSucceededContext, ApiKeyError>> + 'static,
    {
        self.authentication_succeeded = Some(hook(f));
        self
    }

    /// Runs when a key is unknown or resolution failed.
    pub fn on_authentication_failed<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(AuthenticationFailedContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<AuthenticationFailedContext, ApiKeyError>> + 'static,
    {
        self.authentication_failed = Some(hook(f));
        self
    }

    /// Runs before the 401 challenge is written.
    pub fn on_handle_challenge<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(HandleChallengeContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HandleChallengeContext, ApiKeyError>> + 'static,
    {
        self.handle_challenge = Some(hook(f));
        self
    }

    /// Runs before the 403 response is written.
    pub fn on_handle_forbidden<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(HandleForbiddenContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HandleForbiddenContext, ApiKeyError>> + 'static,
    {
        self.handle_forbidden = Some(hook(f));
        self
    }

    pub fn has_validate_key(&self) -> bool {
        self.validate_key.is_some()
    }

    pub(crate) async fn validate_key(
        &self,
        ctx: ValidateKeyContext,
    ) -> Result<ValidateKeyContext, ApiKeyError> {
        raise(&self.validate_key, ctx).await
    }

    pub(crate) async fn authentication_succeeded(
        &self,
        ctx: AuthenticationSucceededContext,
    ) -> Result<AuthenticationSucceededContext, ApiKeyError> {
        raise(&self.authentication_succeeded, ctx).await
    }

    pub(crate) async fn authentication_failed(
        &self,
        ctx: AuthenticationFailedContext,
    ) -> Result<AuthenticationFailedContext, ApiKeyError> {
        raise(&self.authentication_failed, ctx).await
    }

    pub(crate) async fn handle_challenge(
        &self,
        ctx: HandleChallengeContext,
    ) -> Result<HandleChallengeContext, ApiKeyError> {
        raise(&self.handle_challenge, ctx).await
    }

    pub(crate) async fn handle_forbidden(
        &self,
        ctx: HandleForbiddenContext,
    ) -> Result<HandleForbiddenContext, ApiKeyError> {
        raise(&self.handle_forbidden, ctx).await
    }
}

impl fmt::Debug for ApiKeyEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyEvents")
            .field("on_validate_key", &self.validate_key.is_some())
            .field(
                "on_authentication_succeeded",
                &self.authentication_succeeded.is_some(),
            )
            .field(
                "on_authentication_failed",
                &self.authentication_failed.is_some(),
            )
            .field("on_handle_challenge", &self.handle_challenge.is_some())
            .field("on_handle_forbidden", &self.handle_forbidden.is_some())
            .finish()
    }
}

/// Request data shared by all contexts.
#[derive(Clone)]
struct Scope {
    request: HttpRequest,
    scheme_name: String,
    options: Arc<ApiKeyOptions>,
}

impl Scope {
    fn issuer(&self) -> &str {
        self.options
            .get_claims_issuer()
            .unwrap_or(self.scheme_name.as_str())
    }
}

macro_rules! scope_accessors {
    ($ctx:ty) => {
        impl $ctx {
            pub fn get_request(&self) -> &HttpRequest {
                &self.scope.request
            }

            pub fn get_scheme_name(&self) -> &str {
                &self.scope.scheme_name
            }

            pub fn get_options(&self) -> &ApiKeyOptions {
                &self.scope.options
            }
        }
    };
}

// =============================================================================
// Validate Key
// =============================================================================

/// Context of the `on_validate_key` hook.
pub struct ValidateKeyContext {
    scope: Scope,
    api_key: String,
    principal: Option<Principal>,
    result: Option<AuthenticateResult>,
}

scope_accessors!(ValidateKeyContext);

impl ValidateKeyContext {
    pub(crate) fn new(
        request: HttpRequest,
        scheme_name: &str,
        options: Arc<ApiKeyOptions>,
        api_key: String,
    ) -> Self {
        ValidateKeyContext {
            scope: Scope {
                request,
                scheme_name: scheme_name.to_string(),
                options,
            },
            api_key,
            principal: None,
            result: None,
        }
    }

    /// The key as read from the request.
    pub fn get_api_key(&self) -> &str {
        &self.api_key
    }

    pub fn get_principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn get_result(&self) -> Option<&AuthenticateResult> {
        self.result.as_ref()
    }

    /// Accepts the key, building the principal the same way a provider result would.
    pub fn validation_succeeded(&mut self, owner_name: Option<&str>, claims: Vec<Claim>) {
        let principal = Principal::from_owner(
            owner_name,
            &self.scope.scheme_name,
            self.scope.issuer(),
            claims,
        );
        self.principal = Some(principal.clone());
        self.result = Some(AuthenticateResult::Success(principal));
    }

    /// Rejects the key. A missing or blank message means "no result".
    pub fn validation_failed(&mut self, message: Option<&str>) {
        self.result = Some(match message.filter(|m| !m.trim().is_empty()) {
            Some(message) => AuthenticateResult::Fail(ApiKeyError::validation(message)),
            None => AuthenticateResult::NoResult,
        });
    }

    pub fn validation_failed_with(&mut self, error: ApiKeyError) {
        self.result = Some(AuthenticateResult::Fail(error));
    }

    /// Sets the principal without recording a result. An authenticated principal
    /// still counts as success.
    pub fn set_principal(&mut self, principal: Principal) {
        self.principal = Some(principal);
    }

    pub fn success(&mut self, principal: Principal) {
        self.principal = Some(principal.clone());
        self.result = Some(AuthenticateResult::Success(principal));
    }

    pub fn fail(&mut self, error: ApiKeyError) {
        self.result = Some(AuthenticateResult::Fail(error));
    }

    pub fn no_result(&mut self) {
        self.result = Some(AuthenticateResult::NoResult);
    }

    /// The decision recorded by the hook, if any.
    pub(crate) fn into_decision(self) -> Option<AuthenticateResult> {
        match (self.result, self.principal) {
            (Some(result), _) => Some(result),
            (None, Some(principal)) if principal.is_authenticated() => {
                Some(AuthenticateResult::Success(principal))
            }
            _ => None,
        }
    }
}

// =============================================================================
// Authentication Succeeded
// =============================================================================

/// Context of the `on_authentication_succeeded` hook.
pub struct AuthenticationSucceededContext {
    scope: Scope,
    principal: Option<Principal>,
    result: Option<AuthenticateResult>,
}

scope_accessors!(AuthenticationSucceededContext);

impl AuthenticationSucceededContext {
    pub(crate) fn new(
        request: HttpRequest,
        scheme_name: &str,
        options: Arc<ApiKeyOptions>,
        principal: Principal,
    ) -> Self {
        AuthenticationSucceededContext {
            scope: Scope {
                request,
                scheme_name: scheme_name.to_string(),
                options,
            },
            principal: Some(principal),
            result: None,
        }
    }

    pub fn get_principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn get_result(&self) -> Option<&AuthenticateResult> {
        self.result.as_ref()
    }

    pub fn replace_principal(&mut self, principal: Principal) {
        self.principal = Some(principal);
    }

    /// Drops the principal; authentication then fails with `NoPrincipal`.
    pub fn reject_principal(&mut self) {
        self.principal = None;
    }

    /// Adds a claim to the current principal, if any.
    pub fn add_claim(&mut self, claim: Claim) {
        if let Some(principal) = self.principal.as_mut() {
            principal.add_claim(claim);
        }
    }

    pub fn add_claims<I: IntoIterator<Item = Claim>>(&mut self, claims: I) {
        if let Some(principal) = self.principal.as_mut() {
            principal.add_claims(claims);
        }
    }

    /// Records success with the current principal.
    pub fn success(&mut self) {
        self.result = Some(match &self.principal {
            Some(principal) => AuthenticateResult::Success(principal.clone()),
            None => AuthenticateResult::Fail(ApiKeyError::NoPrincipal),
        });
    }

    pub fn fail(&mut self, error: ApiKeyError) {
        self.result = Some(AuthenticateResult::Fail(error));
    }

    pub fn no_result(&mut self) {
        self.result = Some(AuthenticateResult::NoResult);
    }

    pub(crate) fn into_result(self) -> AuthenticateResult {
        if let Some(result) = self.result {
            return result;
        }
        match self.principal {
            Some(principal) if principal.is_authenticated() => {
                AuthenticateResult::Success(principal)
            }
            _ => AuthenticateResult::Fail(ApiKeyError::NoPrincipal),
        }
    }
}

// =============================================================================
// Authentication Failed
// =============================================================================

/// Context of the `on_authentication_failed` hook.
pub struct AuthenticationFailedContext {
    scope: Scope,
    error: ApiKeyError,
    result: Option<AuthenticateResult>,
}

scope_accessors!(AuthenticationFailedContext);

impl AuthenticationFailedContext {
    pub(crate) fn new(
        request: HttpRequest,
        scheme_name: &str,
        options: Arc<ApiKeyOptions>,
        error: ApiKeyError,
    ) -> Self {
        AuthenticationFailedContext {
            scope: Scope {
                request,
                scheme_name: scheme_name.to_string(),
                options,
            },
            error,
            result: None,
        }
    }

    /// The rejection or fault that triggered the hook.
    pub fn get_error(&self) -> &ApiKeyError {
        &self.error
    }

    pub fn get_result(&self) -> Option<&AuthenticateResult> {
        self.result.as_ref()
    }

    pub fn success(&mut self, principal: Principal) {
        self.result = Some(AuthenticateResult::Success(principal));
    }

    pub fn fail(&mut self, error: ApiKeyError) {
        self.result = Some(AuthenticateResult::Fail(error));
    }

    pub fn no_result(&mut self) {
        self.result = Some(AuthenticateResult::NoResult);
    }

    pub(crate) fn into_parts(self) -> (ApiKeyError, Option<AuthenticateResult>) {
        (self.error, self.result)
    }
}

// =============================================================================
// Challenge and Forbidden
// =============================================================================

/// Context of the `on_handle_challenge` hook.
///
/// The response starts as a bare 401. Marking the context handled skips the default
/// `WWW-Authenticate` header.
pub struct HandleChallengeContext {
    scope: Scope,
    failure: Option<ApiKeyError>,
    response: HttpResponse,
    handled: bool,
}

scope_accessors!(HandleChallengeContext);

impl HandleChallengeContext {
    pub(crate) fn new(
        request: HttpRequest,
        scheme_name: &str,
        options: Arc<ApiKeyOptions>,
        failure: Option<ApiKeyError>,
    ) -> Self {
        HandleChallengeContext {
            scope: Scope {
                request,
                scheme_name: scheme_name.to_string(),
                options,
            },
            failure,
            response: HttpResponse::new(StatusCode::UNAUTHORIZED),
            handled: false,
        }
    }

    /// Why authentication failed, when a key was presented.
    pub fn get_failure(&self) -> Option<&ApiKeyError> {
        self.failure.as_ref()
    }

    pub fn get_response_mut(&mut self) -> &mut HttpResponse {
        &mut self.response
    }

    pub fn set_response(&mut self, response: HttpResponse) {
        self.response = response;
    }

    /// Stops the default challenge; the current response is sent as is.
    pub fn handled(&mut self) {
        self.handled = true;
    }

    pub fn is_handled(&self) -> bool {
        self.handled
    }

    pub(crate) fn into_response(self) -> (HttpResponse, bool) {
        (self.response, self.handled)
    }
}

/// Context of the `on_handle_forbidden` hook.
pub struct HandleForbiddenContext {
    scope: Scope,
    response: HttpResponse,
    handled: bool,
}

scope_accessors!(HandleForbiddenContext);

impl HandleForbiddenContext {
    pub(crate) fn new(request: HttpRequest, scheme_name: &str, options: Arc<ApiKeyOptions>) -> Self {
        HandleForbiddenContext {
            scope: Scope {
                request,
                scheme_name: scheme_name.to_string(),
                options,
            },
            response: HttpResponse::new(StatusCode::FORBIDDEN),
            handled: false,
        }
    }

    pub fn get_response_mut(&mut self) -> &mut HttpResponse {
        &mut self.response
    }

    pub fn set_response(&mut self, response: HttpResponse) {
        self.response = response;
    }

    pub fn handled(&mut self) {
        self.handled = true;
    }

    pub fn is_handled(&self) -> bool {
        self.handled
    }

    pub(crate) fn into_response(self) -> (HttpResponse, bool) {
        (self.response, self.handled)
    }
}
