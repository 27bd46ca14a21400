//! Directory lookups that feed the goal and feedback forms.
use crate::api::error::ApiError;
use crate::api::types::UserListResponse;
use crate::app::AppState;
use crate::auth::authenticate;
use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;

#[utoipa::path(
    get,
    path = "/v1/users/assignable",
    tag = "users",
    responses(
        (status = 200, description = "Users the caller may assign goals to", body = UserListResponse)
    )
)]
pub(crate) async fn assignable_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserListResponse>, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    let items = state.workflow.assignable_users(&principal).await?;
    Ok(Json(UserListResponse { items }))
}

#[utoipa::path(
    get,
    path = "/v1/users/feedback-recipients",
    tag = "users",
    responses(
        (status = 200, description = "Users the caller may give feedback to or request it from", body = UserListResponse)
    )
)]
pub(crate) async fn feedback_recipients(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserListResponse>, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    let items = state.workflow.feedback_recipients(&principal).await?;
    Ok(Json(UserListResponse { items }))
}
