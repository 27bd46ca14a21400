//! Persistence and user-directory seams.
//!
//! # Purpose
//! The workflow layer talks to storage only through these traits so the
//! in-memory backend used in development and tests can be swapped for a
//! durable one.
//!
//! # Key invariants
//! - Stores never make authorization decisions. They do re-check status
//!   preconditions under their own lock (`expected` arguments) so concurrent
//!   transitions cannot both win.
//! - The directory is not trusted to pre-filter by department; callers apply
//!   evaluator filters on top of whatever it returns.
use async_trait::async_trait;
use perfdesk_common::{
    Appraisal, AppraisalStatus, Feedback, FeedbackRequest, Goal, RequestStatus, User, UserFilter,
    UserId,
};
use thiserror::Error;
use uuid::Uuid;

pub mod memory;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Which owners' records a list call returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerFilter {
    All,
    Owners(Vec<UserId>),
}

impl OwnerFilter {
    pub fn single(owner: UserId) -> Self {
        OwnerFilter::Owners(vec![owner])
    }

    pub fn includes(&self, owner: &UserId) -> bool {
        match self {
            OwnerFilter::All => true,
            OwnerFilter::Owners(owners) => owners.contains(owner),
        }
    }
}

#[async_trait]
pub trait PerformanceStore: Send + Sync {
    async fn list_goals(&self, filter: &OwnerFilter) -> StoreResult<Vec<Goal>>;
    async fn get_goal(&self, id: Uuid) -> StoreResult<Goal>;
    async fn create_goal(&self, goal: Goal) -> StoreResult<Goal>;
    async fn update_goal(&self, goal: Goal) -> StoreResult<Goal>;

    async fn list_feedback_received(&self, recipient: &UserId) -> StoreResult<Vec<Feedback>>;
    async fn list_feedback_given(&self, reviewer: &UserId) -> StoreResult<Vec<Feedback>>;
    /// Fails with `Conflict` if another feedback already answers the same
    /// request.
    async fn create_feedback(&self, feedback: Feedback) -> StoreResult<Feedback>;

    /// Requests addressed to `recipient` (the person asked to give feedback).
    async fn list_requests_for(&self, recipient: &UserId) -> StoreResult<Vec<FeedbackRequest>>;
    async fn list_requests_by(&self, requester: &UserId) -> StoreResult<Vec<FeedbackRequest>>;
    async fn get_request(&self, id: Uuid) -> StoreResult<FeedbackRequest>;
    async fn create_request(&self, request: FeedbackRequest) -> StoreResult<FeedbackRequest>;
    /// Move a request to `status`. Fails with `Conflict` if the stored status
    /// does not allow that transition.
    async fn patch_request_status(
        &self,
        id: Uuid,
        status: RequestStatus,
    ) -> StoreResult<FeedbackRequest>;

    async fn list_appraisals(&self, filter: &OwnerFilter) -> StoreResult<Vec<Appraisal>>;
    async fn get_appraisal(&self, id: Uuid) -> StoreResult<Appraisal>;
    async fn create_appraisal(&self, appraisal: Appraisal) -> StoreResult<Appraisal>;
    /// Replace an appraisal, provided its stored status is still `expected`.
    async fn update_appraisal(
        &self,
        appraisal: Appraisal,
        expected: AppraisalStatus,
    ) -> StoreResult<Appraisal>;
    async fn delete_appraisal(&self, id: Uuid, expected: AppraisalStatus) -> StoreResult<()>;

    async fn health_check(&self) -> StoreResult<()>;
    fn backend_name(&self) -> &'static str;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn list_users(&self, filter: &UserFilter) -> StoreResult<Vec<User>>;
    async fn get_user(&self, id: &UserId) -> StoreResult<User>;
}
