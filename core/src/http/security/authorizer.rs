//! Request matcher based authorization.
//!
//! Paths are matched against an ordered list of regular expressions; the first match
//! decides which [`Access`] requirement applies.

use regex::Regex;

use crate::http::security::principal::{ClaimTypes, Principal};

/// Request extension marking an endpoint that does not require authentication.
///
/// Inserted by the middleware for paths mapped to [`Access::permit_all`]. Schemes
/// built with `ignore_authentication_if_allow_anonymous` skip such requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllowAnonymous;

/// Access requirement of a path.
///
/// # Example
/// ```
/// use actix_api_key_core::http::security::Access;
///
/// let admin = Access::new().roles(vec!["ADMIN"]);
/// let gold = Access::new().claim("tier", "gold");
/// let public = Access::permit_all();
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Access {
    permit_all: bool,
    roles: Vec<String>,
    claims: Vec<(String, String)>,
}

impl Access {
    /// Requires an authenticated principal and nothing else.
    pub fn new() -> Self {
        Self::default()
    }

    /// Same as [`Access::new`].
    pub fn authenticated() -> Self {
        Self::new()
    }

    /// Lets every request through, authenticated or not.
    pub fn permit_all() -> Self {
        Access {
            permit_all: true,
            ..Self::default()
        }
    }

    /// Requires any of the specified roles.
    pub fn roles(mut self, roles: Vec<&str>) -> Self {
        for role in roles {
            let role = role.to_string();
            if !self.roles.contains(&role) {
                self.roles.push(role);
            }
        }
        self
    }

    /// Requires a claim with the given type and value.
    pub fn claim(mut self, claim_type: &str, value: &str) -> Self {
        self.claims.push((claim_type.to_string(), value.to_string()));
        self
    }

    pub fn is_permit_all(&self) -> bool {
        self.permit_all
    }

    /// Any listed role satisfies the requirement; every listed claim must be present.
    pub fn is_satisfied_by(&self, principal: &Principal) -> bool {
        if self.permit_all {
            return true;
        }
        if !principal.is_authenticated() {
            return false;
        }

        let roles_ok = self.roles.is_empty()
            || self
                .roles
                .iter()
                .any(|role| principal.has_claim(ClaimTypes::ROLE, role));
        let claims_ok = self
            .claims
            .iter()
            .all(|(claim_type, value)| principal.has_claim(claim_type, value));

        roles_ok && claims_ok
    }
}

/// Outcome of authorizing a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Forward to the inner service.
    Permit,
    /// No principal: answer with a 401 challenge.
    Challenge,
    /// Principal lacks access: answer with a 403.
    Forbid,
}

/// URL pattern based authorization.
///
/// # Example
/// ```
/// use actix_api_key_core::http::security::{Access, RequestMatcherAuthorizer};
///
/// let authorizer = RequestMatcherAuthorizer::new()
///     .add_matcher("^/public", Access::permit_all()).unwrap()
///     .add_matcher("^/admin", Access::new().roles(vec!["ADMIN"])).unwrap()
///     .add_matcher("^/", Access::authenticated()).unwrap();
///
/// assert!(authorizer.matches("/public/health").unwrap().is_permit_all());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestMatcherAuthorizer {
    matchers: Vec<(Regex, Access)>,
}

impl RequestMatcherAuthorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a URL pattern with its access requirement. Patterns are tried in
    /// insertion order.
    pub fn add_matcher(mut self, url_regex: &str, access: Access) -> Result<Self, regex::Error> {
        self.matchers.push((Regex::new(url_regex)?, access));
        Ok(self)
    }

    /// Access requirement of the first pattern matching `path`.
    pub fn matches(&self, path: &str) -> Option<&Access> {
        self.matchers
            .iter()
            .find(|(pattern, _)| pattern.is_match(path))
            .map(|(_, access)| access)
    }

    /// Paths without a matching pattern are permitted.
    pub fn decide(&self, path: &str, principal: Option<&Principal>) -> Decision {
        let Some(access) = self.matches(path) else {
            return Decision::Permit;
        };
        if access.is_permit_all() {
            return Decision::Permit;
        }
        match principal {
            None => Decision::Challenge,
            Some(principal) if access.is_satisfied_by(principal) => Decision::Permit,
            Some(_) => Decision::Forbid,
        }
    }
}
