//! System, health, and caller-identity handlers.
//!
//! # Key invariants and assumptions
//! - Health checks must be fast and side-effect free.
//! - `/v1/me` reflects the verified token only; it never consults the
//!   directory, so a stale token reports the role it was issued with.
//!
//! # Security considerations
//! - `info` and `health` are unauthenticated and reveal deployment metadata.
use crate::api::error::{ApiError, api_internal};
use crate::api::types::{HealthStatus, PrincipalView, SystemInfo};
use crate::app::AppState;
use crate::auth::authenticate;
use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;

#[utoipa::path(
    get,
    path = "/v1/system/info",
    tag = "system",
    responses(
        (status = 200, description = "Service identity and feature flags", body = SystemInfo)
    )
)]
/// Return service identity and feature flags.
///
/// # Errors
/// - Does not return errors.
pub(crate) async fn system_info(State(state): State<AppState>) -> Json<SystemInfo> {
    // Built from in-memory configuration only.
    Json(SystemInfo {
        service: state.service_name.clone(),
        api_version: state.api_version.clone(),
        store_backend: state.workflow.store().backend_name().to_string(),
        anonymous_feedback_enabled: state.workflow.settings().anonymous_feedback_enabled,
    })
}

#[utoipa::path(
    get,
    path = "/v1/system/health",
    tag = "system",
    responses(
        (status = 200, description = "Console health", body = HealthStatus)
    )
)]
/// Return console health status.
///
/// # What it does
/// Probes the backing store and returns `ok` if healthy.
///
/// # Errors
/// - Returns 500 if the storage health check fails.
pub(crate) async fn system_health(
    State(state): State<AppState>,
) -> Result<Json<HealthStatus>, ApiError> {
    if let Err(err) = state.workflow.store().health_check().await {
        return Err(api_internal("storage unavailable", &err));
    }
    Ok(Json(HealthStatus {
        status: "ok".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/v1/me",
    tag = "system",
    responses(
        (status = 200, description = "Authenticated caller", body = PrincipalView),
        (status = 401, description = "Missing or invalid token", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PrincipalView>, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    Ok(Json(PrincipalView::from(&principal)))
}
