//! Feedback request API handlers.
//!
//! # Purpose
//! Create, list, and move feedback requests through their lifecycle. The
//! respond endpoint reports partial success: when the feedback is stored but
//! the request could not be completed, `request_completed` is false and the
//! caller should refetch rather than drop the request locally.
use crate::api::error::ApiError;
use crate::api::parse_record_id;
use crate::api::types::{
    FeedbackRequestListResponse, FeedbackRequestMutationResponse, RespondResponse,
};
use crate::app::AppState;
use crate::auth::authenticate;
use crate::workflow::{Mutation, RequestReply};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use perfdesk_common::{FeedbackDraft, FeedbackRequest, FeedbackRequestDraft};

fn request_response(mutation: Mutation<FeedbackRequest>) -> FeedbackRequestMutationResponse {
    FeedbackRequestMutationResponse {
        request: mutation.record,
        effect: mutation.effect,
    }
}

#[utoipa::path(
    post,
    path = "/v1/feedback-requests",
    tag = "feedback-requests",
    request_body = FeedbackRequestDraft,
    responses(
        (status = 201, description = "Request created", body = FeedbackRequestMutationResponse),
        (status = 400, description = "Invalid request", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Recipient not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<FeedbackRequestDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    let created = state.workflow.create_request(&principal, body).await?;
    Ok((StatusCode::CREATED, Json(request_response(created))))
}

#[utoipa::path(
    get,
    path = "/v1/feedback-requests/pending",
    tag = "feedback-requests",
    responses(
        (status = 200, description = "Open requests addressed to the caller", body = FeedbackRequestListResponse)
    )
)]
pub(crate) async fn pending_requests(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<FeedbackRequestListResponse>, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    let items = state.workflow.pending_requests(&principal).await?;
    Ok(Json(FeedbackRequestListResponse { items }))
}

#[utoipa::path(
    get,
    path = "/v1/feedback-requests/sent",
    tag = "feedback-requests",
    responses(
        (status = 200, description = "Requests the caller created", body = FeedbackRequestListResponse)
    )
)]
pub(crate) async fn sent_requests(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<FeedbackRequestListResponse>, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    let items = state.workflow.sent_requests(&principal).await?;
    Ok(Json(FeedbackRequestListResponse { items }))
}

#[utoipa::path(
    get,
    path = "/v1/feedback-requests/{request_id}/response-draft",
    tag = "feedback-requests",
    params(
        ("request_id" = String, Path, description = "Feedback request identifier")
    ),
    responses(
        (status = 200, description = "Prefilled feedback for this request", body = FeedbackDraft),
        (status = 404, description = "Request not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn response_draft(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(request_id): Path<String>,
) -> Result<Json<FeedbackDraft>, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    let id = parse_record_id(&request_id, "feedback request")?;
    Ok(Json(state.workflow.response_draft(&principal, id).await?))
}

#[utoipa::path(
    post,
    path = "/v1/feedback-requests/{request_id}/respond",
    tag = "feedback-requests",
    params(
        ("request_id" = String, Path, description = "Feedback request identifier")
    ),
    request_body = RequestReply,
    responses(
        (status = 201, description = "Response stored", body = RespondResponse),
        (status = 403, description = "Caller was not asked", body = crate::api::types::ErrorResponse),
        (status = 409, description = "Request already closed", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn respond_to_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(request_id): Path<String>,
    Json(body): Json<RequestReply>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    let id = parse_record_id(&request_id, "feedback request")?;
    let outcome = state
        .workflow
        .respond_to_request(&principal, id, body)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RespondResponse {
            feedback: outcome.feedback,
            request: outcome.request,
            request_completed: outcome.request_completed,
            effect: outcome.effect,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/v1/feedback-requests/{request_id}/accept",
    tag = "feedback-requests",
    params(
        ("request_id" = String, Path, description = "Feedback request identifier")
    ),
    responses(
        (status = 200, description = "Request accepted", body = FeedbackRequestMutationResponse),
        (status = 409, description = "Request already closed", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn accept_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(request_id): Path<String>,
) -> Result<Json<FeedbackRequestMutationResponse>, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    let id = parse_record_id(&request_id, "feedback request")?;
    let accepted = state.workflow.accept_request(&principal, id).await?;
    Ok(Json(request_response(accepted)))
}

#[utoipa::path(
    post,
    path = "/v1/feedback-requests/{request_id}/dismiss",
    tag = "feedback-requests",
    params(
        ("request_id" = String, Path, description = "Feedback request identifier")
    ),
    responses(
        (status = 200, description = "Request declined", body = FeedbackRequestMutationResponse),
        (status = 409, description = "Request already completed", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn dismiss_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(request_id): Path<String>,
) -> Result<Json<FeedbackRequestMutationResponse>, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    let id = parse_record_id(&request_id, "feedback request")?;
    let dismissed = state.workflow.dismiss_request(&principal, id).await?;
    Ok(Json(request_response(dismissed)))
}
