//! Security middleware for Actix Web.
//!
//! Authenticates every request with the registered API key schemes, stores the
//! resulting [`Principal`] in the request extensions and applies the path based
//! access rules.

use std::rc::Rc;

use actix_service::{Service, Transform};
use actix_web::body::EitherBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::WWW_AUTHENTICATE;
use actix_web::{Error, HttpMessage, HttpRequest, HttpResponse};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use log::info;

use crate::http::security::api_key::{ApiKeyError, ApiKeyHandler, AuthenticateResult};
use crate::http::security::authorizer::{
    Access, AllowAnonymous, Decision, RequestMatcherAuthorizer,
};
use crate::http::security::principal::Principal;

/// Security middleware factory.
///
/// # Example
/// ```ignore
/// App::new().wrap(
///     SecurityTransform::new()
///         .scheme(AuthenticationManager::api_key_in_header(header_options)?)
///         .scheme(AuthenticationManager::api_key_in_query_params(query_options)?)
///         .add_matcher("^/public", Access::permit_all())?
///         .add_matcher("^/admin", Access::new().roles(vec!["ADMIN"]))?
///         .add_matcher("^/", Access::authenticated())?
/// )
/// ```
#[derive(Clone, Debug, Default)]
pub struct SecurityTransform {
    schemes: Vec<ApiKeyHandler>,
    authorizer: RequestMatcherAuthorizer,
}

impl SecurityTransform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a scheme. Schemes are tried in registration order.
    pub fn scheme(mut self, handler: ApiKeyHandler) -> Self {
        self.schemes.push(handler);
        self
    }

    pub fn config_authorizer(mut self, authorizer: RequestMatcherAuthorizer) -> Self {
        self.authorizer = authorizer;
        self
    }

    /// Shorthand for adding a matcher to the authorizer.
    pub fn add_matcher(mut self, url_regex: &str, access: Access) -> Result<Self, regex::Error> {
        self.authorizer = self.authorizer.add_matcher(url_regex, access)?;
        Ok(self)
    }

    pub fn get_schemes(&self) -> &[ApiKeyHandler] {
        &self.schemes
    }

    /// Tries every scheme until one succeeds.
    ///
    /// Returns the principal, if any, and the failure reported by each scheme.
    async fn authenticate(
        &self,
        req: &HttpRequest,
    ) -> Result<(Option<Principal>, Vec<Option<ApiKeyError>>), ApiKeyError> {
        let mut failures = vec![None; self.schemes.len()];

        for (index, scheme) in self.schemes.iter().enumerate() {
            match scheme.authenticate(req).await? {
                AuthenticateResult::Success(principal) => return Ok((Some(principal), failures)),
                AuthenticateResult::Fail(error) => {
                    info!(
                        "{} was not authenticated. Failure message: {}",
                        scheme.get_scheme_name(),
                        error
                    );
                    failures[index] = Some(error);
                }
                AuthenticateResult::NoResult => {}
            }
        }

        Ok((None, failures))
    }

    /// Challenges with every scheme. The first handled challenge wins; otherwise the
    /// `WWW-Authenticate` values of all schemes are merged into one 401.
    async fn challenge(
        &self,
        req: &HttpRequest,
        mut failures: Vec<Option<ApiKeyError>>,
    ) -> Result<HttpResponse, ApiKeyError> {
        if let [scheme] = self.schemes.as_slice() {
            let (response, _) = scheme.handle_challenge(req, failures.pop().flatten()).await?;
            return Ok(response);
        }

        let mut builder = HttpResponse::Unauthorized();
        for (scheme, failure) in self.schemes.iter().zip(failures) {
            let (response, handled) = scheme.handle_challenge(req, failure).await?;
            if handled {
                return Ok(response);
            }
            for value in response.headers().get_all(WWW_AUTHENTICATE) {
                builder.append_header((WWW_AUTHENTICATE, value.clone()));
            }
        }

        Ok(builder.finish())
    }

    /// Forbids through the scheme that authenticated the principal.
    async fn forbid(
        &self,
        req: &HttpRequest,
        principal: &Principal,
    ) -> Result<HttpResponse, ApiKeyError> {
        let scheme = self
            .schemes
            .iter()
            .find(|s| principal.get_authentication_type() == Some(s.get_scheme_name()))
            .or_else(|| self.schemes.first());

        match scheme {
            Some(scheme) => scheme.forbid(req).await,
            None => Ok(HttpResponse::Forbidden().finish()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SecurityTransform
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = SecurityService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(SecurityService {
            security: Rc::new(self.clone()),
            service: Rc::new(service),
        })
    }
}

/// Security middleware service.
pub struct SecurityService<S> {
    security: Rc<SecurityTransform>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SecurityService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let security = Rc::clone(&self.security);

        Box::pin(async move {
            let path = req.path().to_string();

            // Step 1: mark anonymous endpoints before any scheme runs
            if security
                .authorizer
                .matches(&path)
                .is_some_and(Access::is_permit_all)
            {
                req.extensions_mut().insert(AllowAnonymous);
            }

            // Step 2: authenticate, faults abort the request
            let http_req = req.request().clone();
            let (principal, failures) = security.authenticate(&http_req).await?;

            // Step 3: expose the principal to handlers
            if let Some(ref p) = principal {
                req.extensions_mut().insert(p.clone());
            }

            // Step 4: authorize
            match (security.authorizer.decide(&path, principal.as_ref()), principal) {
                (Decision::Challenge, _) => {
                    let response = security.challenge(&http_req, failures).await?;
                    Ok(req.into_response(response.map_into_right_body()))
                }
                (Decision::Forbid, Some(principal)) => {
                    let response = security.forbid(&http_req, &principal).await?;
                    Ok(req.into_response(response.map_into_right_body()))
                }
                _ => {
                    drop(http_req);
                    let res = service.call(req).await?;
                    Ok::<_, Error>(res.map_into_left_body())
                }
            }
        })
    }
}
