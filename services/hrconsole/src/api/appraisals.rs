//! Appraisal API handlers.
//!
//! # Purpose
//! Appraisal CRUD plus the edit-draft and status-transition endpoints.
//!
//! # Key invariants
//! - A `PATCH` is checked against the stored status, never the status the
//!   editor loaded with `GET /edit`.
//! - Completed appraisals reject edits with 403; illegal or concurrent
//!   transitions with 409 `invalid_transition`.
use crate::api::error::ApiError;
use crate::api::types::{
    AppraisalListQuery, AppraisalListResponse, AppraisalMutationResponse, AppraisalStatusRequest,
};
use crate::api::{parse_record_id, query_user};
use crate::app::AppState;
use crate::auth::authenticate;
use crate::workflow::{AppraisalEditDraft, Mutation};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use perfdesk_common::{Appraisal, AppraisalDraft, AppraisalUpdate};

fn appraisal_response(mutation: Mutation<Appraisal>) -> AppraisalMutationResponse {
    AppraisalMutationResponse {
        appraisal: mutation.record,
        effect: mutation.effect,
    }
}

#[utoipa::path(
    get,
    path = "/v1/appraisals",
    tag = "appraisals",
    params(
        ("employee_id" = Option<String>, Query, description = "Restrict to one employee")
    ),
    responses(
        (status = 200, description = "Appraisals visible to the caller", body = AppraisalListResponse)
    )
)]
pub(crate) async fn list_appraisals(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AppraisalListQuery>,
) -> Result<Json<AppraisalListResponse>, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    let items = state
        .workflow
        .list_appraisals(&principal, query_user(query.employee_id))
        .await?;
    Ok(Json(AppraisalListResponse { items }))
}

#[utoipa::path(
    post,
    path = "/v1/appraisals",
    tag = "appraisals",
    request_body = AppraisalDraft,
    responses(
        (status = 201, description = "Appraisal created", body = AppraisalMutationResponse),
        (status = 400, description = "Invalid appraisal", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Creation not permitted", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_appraisal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<AppraisalDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    let created = state.workflow.create_appraisal(&principal, body).await?;
    Ok((StatusCode::CREATED, Json(appraisal_response(created))))
}

#[utoipa::path(
    get,
    path = "/v1/appraisals/{appraisal_id}",
    tag = "appraisals",
    params(
        ("appraisal_id" = String, Path, description = "Appraisal identifier")
    ),
    responses(
        (status = 200, description = "Appraisal", body = Appraisal),
        (status = 404, description = "Appraisal not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_appraisal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(appraisal_id): Path<String>,
) -> Result<Json<Appraisal>, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    let id = parse_record_id(&appraisal_id, "appraisal")?;
    Ok(Json(state.workflow.get_appraisal(&principal, id).await?))
}

#[utoipa::path(
    get,
    path = "/v1/appraisals/{appraisal_id}/edit",
    tag = "appraisals",
    params(
        ("appraisal_id" = String, Path, description = "Appraisal identifier")
    ),
    responses(
        (status = 200, description = "Appraisal loaded for editing", body = AppraisalEditDraft),
        (status = 403, description = "Appraisal is locked or not editable by caller", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Appraisal not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn load_for_edit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(appraisal_id): Path<String>,
) -> Result<Json<AppraisalEditDraft>, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    let id = parse_record_id(&appraisal_id, "appraisal")?;
    Ok(Json(state.workflow.load_for_edit(&principal, id).await?))
}

#[utoipa::path(
    patch,
    path = "/v1/appraisals/{appraisal_id}",
    tag = "appraisals",
    params(
        ("appraisal_id" = String, Path, description = "Appraisal identifier")
    ),
    request_body = AppraisalUpdate,
    responses(
        (status = 200, description = "Appraisal updated", body = AppraisalMutationResponse),
        (status = 403, description = "Appraisal is locked", body = crate::api::types::ErrorResponse),
        (status = 409, description = "Status transition not allowed", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn commit_edit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(appraisal_id): Path<String>,
    Json(body): Json<AppraisalUpdate>,
) -> Result<Json<AppraisalMutationResponse>, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    let id = parse_record_id(&appraisal_id, "appraisal")?;
    let updated = state.workflow.commit_edit(&principal, id, body).await?;
    Ok(Json(appraisal_response(updated)))
}

#[utoipa::path(
    post,
    path = "/v1/appraisals/{appraisal_id}/status",
    tag = "appraisals",
    params(
        ("appraisal_id" = String, Path, description = "Appraisal identifier")
    ),
    request_body = AppraisalStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = AppraisalMutationResponse),
        (status = 403, description = "Appraisal is locked", body = crate::api::types::ErrorResponse),
        (status = 409, description = "Status transition not allowed", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn transition_appraisal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(appraisal_id): Path<String>,
    Json(body): Json<AppraisalStatusRequest>,
) -> Result<Json<AppraisalMutationResponse>, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    let id = parse_record_id(&appraisal_id, "appraisal")?;
    let moved = state
        .workflow
        .transition_appraisal(&principal, id, body.status)
        .await?;
    Ok(Json(appraisal_response(moved)))
}

#[utoipa::path(
    delete,
    path = "/v1/appraisals/{appraisal_id}",
    tag = "appraisals",
    params(
        ("appraisal_id" = String, Path, description = "Appraisal identifier")
    ),
    responses(
        (status = 200, description = "Draft appraisal deleted", body = AppraisalMutationResponse),
        (status = 409, description = "Only drafts can be deleted", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_appraisal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(appraisal_id): Path<String>,
) -> Result<Json<AppraisalMutationResponse>, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    let id = parse_record_id(&appraisal_id, "appraisal")?;
    let removed = state.workflow.delete_appraisal(&principal, id).await?;
    Ok(Json(appraisal_response(removed)))
}
