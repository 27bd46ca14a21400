//! Access-token verification for the console API.
//!
//! # Purpose
//! Verifies HS256 bearer tokens issued by the identity service and turns their
//! claims into a [`Principal`].
//!
//! # Key invariants
//! - Issuer, audience, and expiry are always enforced.
//! - An unrecognised `role` claim yields `Role::Unknown`, never an error, so
//!   the permission evaluator can default-deny it.
//!
//! # Security
//! - Only HS256 is accepted; tokens signed with any other algorithm fail.
//! - Verification errors are not echoed back to callers.
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use perfdesk_common::{Principal, Role, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims carried by a console access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConsoleClaims {
    pub sub: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dept: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

impl ConsoleClaims {
    pub fn principal(&self) -> Principal {
        Principal {
            id: UserId::new(self.sub.clone()),
            role: Role::parse_lenient(&self.role),
            department: self
                .dept
                .as_deref()
                .filter(|dept| !dept.trim().is_empty())
                .map(perfdesk_common::Department::new),
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("token subject is empty")]
    EmptySubject,
}

/// Verifies bearer tokens against the shared secret.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("issuer", &self.validation.iss)
            .field("audience", &self.validation.aud)
            .field("leeway", &self.validation.leeway)
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    pub fn new(secret: &[u8], issuer: &str, audience: &str, leeway: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.leeway = leeway;
        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Verify `token` and return its claims.
    ///
    /// # Errors
    /// - `TokenError::Jwt` for bad signatures, wrong issuer/audience, expired
    ///   or malformed tokens.
    /// - `TokenError::EmptySubject` when `sub` is blank.
    pub fn verify(&self, token: &str) -> Result<ConsoleClaims, TokenError> {
        let data = jsonwebtoken::decode::<ConsoleClaims>(token, &self.key, &self.validation)?;
        if data.claims.sub.trim().is_empty() {
            return Err(TokenError::EmptySubject);
        }
        Ok(data.claims)
    }
}
