//! Claims based principal model.
//!
//! An authenticated request is represented by a [`Principal`]: the name of the scheme
//! that authenticated it plus a flat list of [`Claim`]s.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Well-known claim types.
pub struct ClaimTypes;

impl ClaimTypes {
    pub const NAME: &'static str = "name";
    pub const NAME_IDENTIFIER: &'static str = "nameidentifier";
    pub const ROLE: &'static str = "role";
}

/// Default value type of a claim.
pub const CLAIM_VALUE_TYPE_STRING: &str = "string";

/// Issuer used when a claim is created without one.
pub const DEFAULT_ISSUER: &str = "LOCAL AUTHORITY";

/// A single statement about the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    claim_type: String,
    value: String,
    value_type: String,
    issuer: String,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Claim {
            claim_type: claim_type.into(),
            value: value.into(),
            value_type: CLAIM_VALUE_TYPE_STRING.to_string(),
            issuer: DEFAULT_ISSUER.to_string(),
        }
    }

    /// Sets the issuer (builder pattern).
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Sets the value type (builder pattern).
    pub fn value_type(mut self, value_type: impl Into<String>) -> Self {
        self.value_type = value_type.into();
        self
    }

    pub fn get_type(&self) -> &str {
        &self.claim_type
    }

    pub fn get_value(&self) -> &str {
        &self.value
    }

    pub fn get_value_type(&self) -> &str {
        &self.value_type
    }

    pub fn get_issuer(&self) -> &str {
        &self.issuer
    }

    /// Claim types compare ASCII case-insensitively.
    pub fn is_type(&self, claim_type: &str) -> bool {
        self.claim_type.eq_ignore_ascii_case(claim_type)
    }
}

/// The identity attached to a request.
///
/// A principal is authenticated when it carries a non-empty authentication type.
///
/// # Example
/// ```
/// use actix_api_key_core::http::security::{Claim, ClaimTypes, Principal};
///
/// let principal = Principal::from_owner(
///     Some("Admin"),
///     "ApiKey",
///     "ApiKey",
///     vec![Claim::new(ClaimTypes::ROLE, "ADMIN")],
/// );
///
/// assert!(principal.is_authenticated());
/// assert_eq!(principal.get_name(), Some("Admin"));
/// assert!(principal.is_in_role("ADMIN"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    authentication_type: Option<String>,
    claims: Vec<Claim>,
}

impl Principal {
    pub fn new(authentication_type: impl Into<String>, claims: Vec<Claim>) -> Self {
        Principal {
            authentication_type: Some(authentication_type.into()),
            claims,
        }
    }

    /// A principal without an authentication type.
    pub fn anonymous() -> Self {
        Principal::default()
    }

    /// Builds the principal for a resolved key owner.
    ///
    /// All supplied claims are kept. When `owner_name` is present and not blank, a
    /// `nameidentifier` and a `name` claim carrying the owner are appended unless a claim
    /// of that type already exists.
    pub fn from_owner(
        owner_name: Option<&str>,
        scheme_name: &str,
        issuer: &str,
        claims: Vec<Claim>,
    ) -> Self {
        let mut principal = Principal::new(scheme_name, claims);

        if let Some(owner) = owner_name.filter(|o| !o.trim().is_empty()) {
            if !principal.has_claim_type(ClaimTypes::NAME_IDENTIFIER) {
                principal
                    .claims
                    .push(Claim::new(ClaimTypes::NAME_IDENTIFIER, owner).issuer(issuer));
            }
            if !principal.has_claim_type(ClaimTypes::NAME) {
                principal
                    .claims
                    .push(Claim::new(ClaimTypes::NAME, owner).issuer(issuer));
            }
        }

        principal
    }

    pub fn get_authentication_type(&self) -> Option<&str> {
        self.authentication_type.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authentication_type
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }

    pub fn get_claims(&self) -> &[Claim] {
        &self.claims
    }

    /// Value of the first `name` claim.
    pub fn get_name(&self) -> Option<&str> {
        self.find_first(ClaimTypes::NAME).map(Claim::get_value)
    }

    pub fn find_first(&self, claim_type: &str) -> Option<&Claim> {
        self.claims.iter().find(|c| c.is_type(claim_type))
    }

    pub fn has_claim_type(&self, claim_type: &str) -> bool {
        self.find_first(claim_type).is_some()
    }

    /// Checks for a claim with the given type and exact value.
    pub fn has_claim(&self, claim_type: &str, value: &str) -> bool {
        self.claims
            .iter()
            .any(|c| c.is_type(claim_type) && c.value == value)
    }

    pub fn is_in_role(&self, role: &str) -> bool {
        self.has_claim(ClaimTypes::ROLE, role)
    }

    /// Checks if the principal has ANY of the specified roles (OR logic).
    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.is_in_role(role))
    }

    pub fn add_claim(&mut self, claim: Claim) {
        self.claims.push(claim);
    }

    pub fn add_claims<I: IntoIterator<Item = Claim>>(&mut self, claims: I) {
        self.claims.extend(claims);
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Principal {{ authentication_type: {:?}, name: {:?}, claims: {} }}",
            self.authentication_type,
            self.get_name(),
            self.claims.len()
        )
    }
}
