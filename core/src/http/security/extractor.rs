//! Extractors for accessing the authenticated principal in handlers.

use std::convert::Infallible;
use std::future::{ready, Ready};
use std::ops::Deref;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};

use crate::http::error::AuthError;
use crate::http::security::authorizer::AllowAnonymous;
use crate::http::security::principal::Principal;

/// Reads the authenticated principal stored by the middleware and maps it.
///
/// Anonymous principals are treated as absent.
fn with_principal<R>(req: &HttpRequest, f: impl FnOnce(&Principal) -> R) -> Option<R> {
    req.extensions()
        .get::<Principal>()
        .filter(|p| p.is_authenticated())
        .map(f)
}

/// Principal authenticated by one of the API key schemes.
///
/// Handlers taking this extractor answer `401 Unauthorized` when the request was
/// not authenticated, even on paths the middleware let through.
///
/// ```ignore
/// use actix_api_key_core::http::security::AuthenticatedPrincipal;
///
/// async fn handler(principal: AuthenticatedPrincipal) -> impl Responder {
///     format!("{} via {}", principal.get_name().unwrap_or("?"), principal.get_scheme())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal(Principal);

impl AuthenticatedPrincipal {
    pub fn new(principal: Principal) -> Self {
        AuthenticatedPrincipal(principal)
    }

    /// Name of the scheme that authenticated the request.
    pub fn get_scheme(&self) -> &str {
        self.0.get_authentication_type().unwrap_or_default()
    }

    pub fn into_inner(self) -> Principal {
        self.0
    }
}

impl Deref for AuthenticatedPrincipal {
    type Target = Principal;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for AuthenticatedPrincipal {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            with_principal(req, |p| AuthenticatedPrincipal(p.clone()))
                .ok_or(AuthError::Unauthorized),
        )
    }
}

/// Principal of the request, if any scheme authenticated it.
///
/// Never rejects; meant for endpoints mapped to [`Access::permit_all`](super::Access::permit_all)
/// or left unmatched.
#[derive(Debug, Clone, Default)]
pub struct OptionalPrincipal(Option<Principal>);

impl OptionalPrincipal {
    pub fn into_inner(self) -> Option<Principal> {
        self.0
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }
}

impl Deref for OptionalPrincipal {
    type Target = Option<Principal>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for OptionalPrincipal {
    type Error = Infallible;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(OptionalPrincipal(with_principal(req, Principal::clone))))
    }
}

/// Principal queries on [`HttpRequest`], for code that holds the request rather
/// than an extractor (guards, other middleware).
pub trait SecurityExt {
    fn get_principal(&self) -> Option<Principal>;

    fn is_authenticated(&self) -> bool;

    fn is_in_role(&self, role: &str) -> bool;

    fn has_any_role(&self, roles: &[&str]) -> bool;

    fn has_claim(&self, claim_type: &str, value: &str) -> bool;

    /// Value of the first claim of the given type.
    fn get_claim_value(&self, claim_type: &str) -> Option<String>;

    /// Whether the path was mapped to `Access::permit_all`.
    fn is_anonymous_endpoint(&self) -> bool;
}

impl SecurityExt for HttpRequest {
    fn get_principal(&self) -> Option<Principal> {
        with_principal(self, Principal::clone)
    }

    fn is_authenticated(&self) -> bool {
        with_principal(self, |_| ()).is_some()
    }

    fn is_in_role(&self, role: &str) -> bool {
        with_principal(self, |p| p.is_in_role(role)).unwrap_or(false)
    }

    fn has_any_role(&self, roles: &[&str]) -> bool {
        with_principal(self, |p| p.has_any_role(roles)).unwrap_or(false)
    }

    fn has_claim(&self, claim_type: &str, value: &str) -> bool {
        with_principal(self, |p| p.has_claim(claim_type, value)).unwrap_or(false)
    }

    fn get_claim_value(&self, claim_type: &str) -> Option<String> {
        with_principal(self, |p| {
            p.find_first(claim_type).map(|c| c.get_value().to_string())
        })
        .flatten()
    }

    fn is_anonymous_endpoint(&self) -> bool {
        self.extensions().contains::<AllowAnonymous>()
    }
}
