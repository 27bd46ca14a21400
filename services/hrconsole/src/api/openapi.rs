//! OpenAPI schema aggregation for the console API.
//!
//! # Purpose
//! Collects all routes and schema types into a single OpenAPI document,
//! served at `/v1/openapi.json`.
use crate::api::{
    appraisals, feedback, goals, requests, system,
    types::{
        AppraisalListResponse, AppraisalMutationResponse, AppraisalStatusRequest, ErrorResponse,
        FeedbackListResponse, FeedbackMutationResponse, FeedbackRequestListResponse,
        FeedbackRequestMutationResponse, GoalListResponse, GoalMutationResponse, HealthStatus,
        PrincipalView, RespondResponse, SystemInfo, UserListResponse,
    },
    users,
};
use crate::workflow::{AppraisalEditDraft, RequestReply};
use axum::Json;
use perfdesk_authz::GoalViewMode;
use perfdesk_common::{
    Appraisal, AppraisalDraft, AppraisalStatus, AppraisalUpdate, Department, Feedback,
    FeedbackBuckets, FeedbackDraft, FeedbackRequest, FeedbackRequestDraft, FeedbackType, Goal,
    GoalDraft, GoalPatch, GoalStatus, ReceivedFeedback, RequestStatus, User, UserId, ViewEffect,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "hrconsole",
        version = "v1",
        description = "Performance management console HTTP API"
    ),
    paths(
        system::system_info,
        system::system_health,
        system::me,
        goals::list_goals,
        goals::get_goal,
        goals::create_goal,
        goals::update_goal,
        feedback::create_feedback,
        feedback::received_feedback,
        feedback::given_feedback,
        requests::create_request,
        requests::pending_requests,
        requests::sent_requests,
        requests::response_draft,
        requests::respond_to_request,
        requests::accept_request,
        requests::dismiss_request,
        appraisals::list_appraisals,
        appraisals::create_appraisal,
        appraisals::get_appraisal,
        appraisals::load_for_edit,
        appraisals::commit_edit,
        appraisals::transition_appraisal,
        appraisals::delete_appraisal,
        users::assignable_users,
        users::feedback_recipients
    ),
    components(schemas(
        SystemInfo,
        HealthStatus,
        ErrorResponse,
        PrincipalView,
        UserId,
        Department,
        User,
        UserListResponse,
        ViewEffect,
        GoalViewMode,
        Goal,
        GoalStatus,
        GoalDraft,
        GoalPatch,
        GoalListResponse,
        GoalMutationResponse,
        Feedback,
        FeedbackType,
        FeedbackDraft,
        ReceivedFeedback,
        FeedbackBuckets,
        FeedbackListResponse,
        FeedbackMutationResponse,
        FeedbackRequest,
        FeedbackRequestDraft,
        RequestStatus,
        RequestReply,
        RespondResponse,
        FeedbackRequestListResponse,
        FeedbackRequestMutationResponse,
        Appraisal,
        AppraisalStatus,
        AppraisalDraft,
        AppraisalUpdate,
        AppraisalEditDraft,
        AppraisalStatusRequest,
        AppraisalListResponse,
        AppraisalMutationResponse
    )),
    tags(
        (name = "system", description = "System and caller identity"),
        (name = "goals", description = "Goal tracking"),
        (name = "feedback", description = "Feedback and self-assessments"),
        (name = "feedback-requests", description = "Feedback request lifecycle"),
        (name = "appraisals", description = "Appraisal lifecycle"),
        (name = "users", description = "Directory lookups for forms")
    )
)]
pub struct ApiDoc;

pub(crate) async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
