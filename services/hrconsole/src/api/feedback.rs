//! Feedback API handlers.
//!
//! # Security considerations
//! Received feedback is returned already partitioned and redacted; anonymous
//! entries never carry a reviewer id unless the caller is an administrator.
use crate::api::error::ApiError;
use crate::api::query_user;
use crate::api::types::{FeedbackListResponse, FeedbackMutationResponse, ReceivedFeedbackQuery};
use crate::app::AppState;
use crate::auth::authenticate;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use perfdesk_common::{FeedbackBuckets, FeedbackDraft};

#[utoipa::path(
    post,
    path = "/v1/feedback",
    tag = "feedback",
    request_body = FeedbackDraft,
    responses(
        (status = 201, description = "Feedback stored", body = FeedbackMutationResponse),
        (status = 400, description = "Invalid feedback", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Recipient not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_feedback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<FeedbackDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    let created = state.workflow.create_feedback(&principal, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(FeedbackMutationResponse {
            feedback: created.record,
            effect: created.effect,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/v1/feedback/received",
    tag = "feedback",
    params(
        ("recipient_id" = Option<String>, Query, description = "Whose feedback to show (default: caller)")
    ),
    responses(
        (status = 200, description = "Received feedback by bucket", body = FeedbackBuckets),
        (status = 404, description = "Recipient not visible", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn received_feedback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ReceivedFeedbackQuery>,
) -> Result<Json<FeedbackBuckets>, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    let buckets = state
        .workflow
        .received_feedback(&principal, query_user(query.recipient_id))
        .await?;
    Ok(Json(buckets))
}

#[utoipa::path(
    get,
    path = "/v1/feedback/given",
    tag = "feedback",
    responses(
        (status = 200, description = "Feedback written by the caller", body = FeedbackListResponse)
    )
)]
pub(crate) async fn given_feedback(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<FeedbackListResponse>, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    let items = state.workflow.given_feedback(&principal).await?;
    Ok(Json(FeedbackListResponse { items }))
}
