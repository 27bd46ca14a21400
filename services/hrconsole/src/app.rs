//! Console HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router, configures middleware, and defines the shared
//! application state injected into handlers.
use crate::api;
use crate::auth::token::TokenVerifier;
use crate::workflow::Workflow;
use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub service_name: String,
    pub api_version: String,
    pub workflow: Workflow,
    pub verifier: TokenVerifier,
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version()
            )
        });

    Router::new()
        .route("/v1/system/info", get(api::system::system_info))
        .route("/v1/system/health", get(api::system::system_health))
        .route("/v1/me", get(api::system::me))
        .route(
            "/v1/goals",
            get(api::goals::list_goals).post(api::goals::create_goal),
        )
        .route(
            "/v1/goals/:goal_id",
            get(api::goals::get_goal).patch(api::goals::update_goal),
        )
        .route("/v1/feedback", post(api::feedback::create_feedback))
        .route(
            "/v1/feedback/received",
            get(api::feedback::received_feedback),
        )
        .route("/v1/feedback/given", get(api::feedback::given_feedback))
        .route(
            "/v1/feedback-requests",
            post(api::requests::create_request),
        )
        .route(
            "/v1/feedback-requests/pending",
            get(api::requests::pending_requests),
        )
        .route(
            "/v1/feedback-requests/sent",
            get(api::requests::sent_requests),
        )
        .route(
            "/v1/feedback-requests/:request_id/response-draft",
            get(api::requests::response_draft),
        )
        .route(
            "/v1/feedback-requests/:request_id/respond",
            post(api::requests::respond_to_request),
        )
        .route(
            "/v1/feedback-requests/:request_id/accept",
            post(api::requests::accept_request),
        )
        .route(
            "/v1/feedback-requests/:request_id/dismiss",
            post(api::requests::dismiss_request),
        )
        .route(
            "/v1/appraisals",
            get(api::appraisals::list_appraisals).post(api::appraisals::create_appraisal),
        )
        .route(
            "/v1/appraisals/:appraisal_id",
            get(api::appraisals::get_appraisal)
                .patch(api::appraisals::commit_edit)
                .delete(api::appraisals::delete_appraisal),
        )
        .route(
            "/v1/appraisals/:appraisal_id/edit",
            get(api::appraisals::load_for_edit),
        )
        .route(
            "/v1/appraisals/:appraisal_id/status",
            post(api::appraisals::transition_appraisal),
        )
        .route("/v1/users/assignable", get(api::users::assignable_users))
        .route(
            "/v1/users/feedback-recipients",
            get(api::users::feedback_recipients),
        )
        .route("/v1/openapi.json", get(api::openapi::openapi_json))
        .layer(trace_layer)
        .with_state(state)
}
