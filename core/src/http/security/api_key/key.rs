//! API Key model.

use crate::http::security::principal::{Claim, ClaimTypes};

/// A key record returned by a key provider.
///
/// # Example
///
/// ```
/// use actix_api_key_core::http::security::ApiKey;
///
/// let key = ApiKey::new("Key1")
///     .owner("Admin")
///     .role("ADMIN")
///     .claim("tier", "gold");
///
/// assert_eq!(key.get_owner_name(), Some("Admin"));
/// assert_eq!(key.get_claims().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey {
    key: String,
    owner_name: Option<String>,
    claims: Vec<Claim>,
}

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            owner_name: None,
            claims: Vec::new(),
        }
    }

    /// Sets the owner of this key.
    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner_name = Some(owner.into());
        self
    }

    /// Replaces the claims of this key.
    pub fn claims(mut self, claims: Vec<Claim>) -> Self {
        self.claims = claims;
        self
    }

    /// Adds a string claim.
    pub fn claim(mut self, claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        self.claims.push(Claim::new(claim_type, value));
        self
    }

    /// Adds a role claim.
    pub fn role(self, role: impl Into<String>) -> Self {
        self.claim(ClaimTypes::ROLE, role)
    }

    pub fn get_key(&self) -> &str {
        &self.key
    }

    pub fn get_owner_name(&self) -> Option<&str> {
        self.owner_name.as_deref()
    }

    pub fn get_claims(&self) -> &[Claim] {
        &self.claims
    }

    /// Whether `presented` is this key, ignoring case (full Unicode folding).
    pub fn matches(&self, presented: &str) -> bool {
        fold_key(&self.key) == fold_key(presented)
    }

    pub(crate) fn into_parts(self) -> (String, Option<String>, Vec<Claim>) {
        (self.key, self.owner_name, self.claims)
    }
}

/// Case-folded form of a key, used for lookups and comparisons.
pub(crate) fn fold_key(key: &str) -> String {
    key.to_lowercase()
}
