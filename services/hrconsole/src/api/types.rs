//! HTTP API request/response types.
//!
//! # Purpose
//! Payload shapes for the console REST API and OpenAPI schema generation.
//! Entity records come from `perfdesk-common`; this module only adds the
//! envelopes around them.
use perfdesk_authz::GoalViewMode;
use perfdesk_common::{
    Appraisal, AppraisalStatus, Department, Feedback, FeedbackRequest, Goal, Principal, User,
    UserId, ViewEffect,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub request_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SystemInfo {
    pub service: String,
    pub api_version: String,
    pub store_backend: String,
    pub anonymous_feedback_enabled: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct HealthStatus {
    pub status: String,
}

/// The authenticated caller as the server sees it.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct PrincipalView {
    pub id: UserId,
    pub role: String,
    pub department: Option<Department>,
}

impl From<&Principal> for PrincipalView {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id.clone(),
            role: principal.role.to_string(),
            department: principal.department.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GoalListQuery {
    pub mode: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GoalListResponse {
    pub mode: GoalViewMode,
    pub items: Vec<Goal>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GoalMutationResponse {
    pub goal: Goal,
    pub effect: ViewEffect,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReceivedFeedbackQuery {
    pub recipient_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FeedbackMutationResponse {
    pub feedback: Feedback,
    pub effect: ViewEffect,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FeedbackListResponse {
    pub items: Vec<Feedback>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FeedbackRequestMutationResponse {
    pub request: FeedbackRequest,
    pub effect: ViewEffect,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FeedbackRequestListResponse {
    pub items: Vec<FeedbackRequest>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RespondResponse {
    pub feedback: Feedback,
    pub request: Option<FeedbackRequest>,
    /// False when the feedback was stored but the request is still open.
    pub request_completed: bool,
    pub effect: ViewEffect,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppraisalListQuery {
    pub employee_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AppraisalListResponse {
    pub items: Vec<Appraisal>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AppraisalMutationResponse {
    pub appraisal: Appraisal,
    pub effect: ViewEffect,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AppraisalStatusRequest {
    pub status: AppraisalStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    pub items: Vec<User>,
}
