//! Access-token expiry handling.
//!
//! The client never verifies signatures; it only reads the standard `exp`
//! claim to decide whether a refresh is due. Verification is the server's job.
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is not a decodable jwt: {0}")]
    Malformed(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Deserialize)]
struct ExpiryClaim {
    exp: i64,
}

fn expiry_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::from(["exp".to_string()]);
    validation
}

/// Read the `exp` claim (unix seconds) without checking the signature.
pub fn decode_expiry(token: &str) -> Result<i64, TokenError> {
    let data = jsonwebtoken::decode::<ExpiryClaim>(
        token,
        &DecodingKey::from_secret(&[]),
        &expiry_validation(),
    )?;
    Ok(data.claims.exp)
}

/// A token counts as expired `leeway_secs` before its actual expiry so a
/// navigation never starts with a token that dies mid-request.
pub fn is_expired(token: &str, now_secs: i64, leeway_secs: u64) -> Result<bool, TokenError> {
    let exp = decode_expiry(token)?;
    let leeway = i64::try_from(leeway_secs).unwrap_or(i64::MAX);
    Ok(exp.saturating_sub(leeway) <= now_secs)
}

pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header};

    #[derive(Serialize)]
    struct Claims<'a> {
        sub: &'a str,
        exp: i64,
    }

    fn mint(exp: i64) -> String {
        jsonwebtoken::encode(
            &Header::default(),
            &Claims { sub: "e1", exp },
            &EncodingKey::from_secret(b"unrelated-secret"),
        )
        .expect("encode")
    }

    #[test]
    fn reads_expiry_regardless_of_signing_key() {
        let token = mint(1_700_000_000);
        assert_eq!(decode_expiry(&token).expect("exp"), 1_700_000_000);
    }

    #[test]
    fn leeway_pulls_expiry_forward() {
        let token = mint(1_000);
        assert!(!is_expired(&token, 900, 30).expect("decode"));
        assert!(is_expired(&token, 980, 30).expect("decode"));
        assert!(is_expired(&token, 1_000, 0).expect("decode"));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            decode_expiry("not-a-token"),
            Err(TokenError::Malformed(_))
        ));
    }
}
