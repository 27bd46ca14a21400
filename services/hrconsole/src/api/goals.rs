//! Goal API handlers.
//!
//! # Purpose
//! List, read, create, and update goals. Every response for a mutation
//! carries the view effect the caller should apply to its local list.
use crate::api::error::{ApiError, api_validation_error};
use crate::api::parse_record_id;
use crate::api::types::{GoalListQuery, GoalListResponse, GoalMutationResponse};
use crate::app::AppState;
use crate::auth::authenticate;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use perfdesk_authz::GoalViewMode;
use perfdesk_common::{Department, Goal, GoalDraft, GoalPatch};

#[utoipa::path(
    get,
    path = "/v1/goals",
    tag = "goals",
    params(
        ("mode" = Option<String>, Query, description = "my, team, dept, or all (default my)"),
        ("department" = Option<String>, Query, description = "Department for dept/all modes")
    ),
    responses(
        (status = 200, description = "Goals visible in the requested mode", body = GoalListResponse),
        (status = 400, description = "Unknown mode", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Mode not permitted", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn list_goals(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<GoalListQuery>,
) -> Result<Json<GoalListResponse>, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    let mode = match query.mode.as_deref().map(str::trim) {
        None | Some("") => GoalViewMode::My,
        Some(raw) => raw
            .parse::<GoalViewMode>()
            .map_err(|err| api_validation_error(&err.to_string()))?,
    };
    let department = query
        .department
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(Department::new);
    let items = state
        .workflow
        .list_goals(&principal, mode, department)
        .await?;
    Ok(Json(GoalListResponse { mode, items }))
}

#[utoipa::path(
    get,
    path = "/v1/goals/{goal_id}",
    tag = "goals",
    params(
        ("goal_id" = String, Path, description = "Goal identifier")
    ),
    responses(
        (status = 200, description = "Goal", body = Goal),
        (status = 404, description = "Goal not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_goal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(goal_id): Path<String>,
) -> Result<Json<Goal>, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    let id = parse_record_id(&goal_id, "goal")?;
    Ok(Json(state.workflow.get_goal(&principal, id).await?))
}

#[utoipa::path(
    post,
    path = "/v1/goals",
    tag = "goals",
    request_body = GoalDraft,
    responses(
        (status = 201, description = "Goal created", body = GoalMutationResponse),
        (status = 400, description = "Invalid goal", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Assignment not permitted", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_goal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<GoalDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    let created = state.workflow.create_goal(&principal, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(GoalMutationResponse {
            goal: created.record,
            effect: created.effect,
        }),
    ))
}

#[utoipa::path(
    patch,
    path = "/v1/goals/{goal_id}",
    tag = "goals",
    params(
        ("goal_id" = String, Path, description = "Goal identifier")
    ),
    request_body = GoalPatch,
    responses(
        (status = 200, description = "Goal updated", body = GoalMutationResponse),
        (status = 403, description = "Edit not permitted", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Goal not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn update_goal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(goal_id): Path<String>,
    Json(body): Json<GoalPatch>,
) -> Result<Json<GoalMutationResponse>, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    let id = parse_record_id(&goal_id, "goal")?;
    let updated = state.workflow.update_goal(&principal, id, body).await?;
    Ok(Json(GoalMutationResponse {
        goal: updated.record,
        effect: updated.effect,
    }))
}
