//! Request authentication.
//!
//! Every API handler except the system endpoints resolves its caller through
//! [`authenticate`]; the principal never comes from query or body fields.
pub mod token;

use crate::api::error::{ApiError, api_unauthorized};
use crate::app::AppState;
use axum::http::HeaderMap;
use perfdesk_common::Principal;

pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Principal, ApiError> {
    let bearer = extract_bearer(headers).ok_or_else(|| api_unauthorized("missing bearer token"))?;
    let claims = state.verifier.verify(bearer).map_err(|err| {
        tracing::debug!(error = %err, "bearer token rejected");
        metrics::counter!("perfdesk_auth_rejected_total").increment(1);
        api_unauthorized("invalid token")
    })?;
    Ok(claims.principal())
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(axum::http::header::AUTHORIZATION)?;
    let value = value.to_str().ok()?;
    value.strip_prefix("Bearer ")
}
