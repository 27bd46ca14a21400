//! Shared records and identifiers for the perfdesk performance workflow.
//!
//! # Purpose
//! Defines the principal model, the four workflow entities (goals, feedback,
//! feedback requests, appraisals), the directory `User`, and the status
//! machines that govern how those entities may move.
//!
//! # How it fits
//! The permission evaluator (`perfdesk-authz`) makes decisions over these
//! types, the console service persists them, and the client crate caches the
//! principal and keeps list views of them.
//!
//! # Key invariants
//! - Every record carries an owning/assignee user id; its department is always
//!   resolved through the user directory, never taken from the record itself.
//! - `RequestStatus` and `AppraisalStatus` only move forward; terminal states
//!   never transition again.
//!
//! # Examples
//! ```rust
//! use perfdesk_common::{AppraisalStatus, RequestStatus};
//!
//! assert!(AppraisalStatus::Draft.can_transition_to(AppraisalStatus::Submitted));
//! assert!(!AppraisalStatus::Completed.can_transition_to(AppraisalStatus::Completed));
//! assert!(RequestStatus::Declined.is_terminal());
//! ```

mod appraisal;
mod errors;
mod feedback;
mod goal;
mod ids;
mod principal;
mod user;
mod view;

pub use appraisal::{Appraisal, AppraisalDraft, AppraisalStatus, AppraisalUpdate, NEUTRAL_RATING};
pub use errors::{ParseError, ParseResult};
pub use feedback::{
    Feedback, FeedbackBuckets, FeedbackDraft, FeedbackRequest, FeedbackRequestDraft, FeedbackType,
    ReceivedFeedback, RequestStatus,
};
pub use goal::{Goal, GoalDraft, GoalPatch, GoalStatus};
pub use ids::{Department, UserId, same_department};
pub use principal::{Principal, Role};
pub use user::{User, UserFilter};
pub use view::ViewEffect;
