//! Permission evaluator for the perfdesk performance workflow.
//!
//! # Purpose
//! Answers "may principal P do action A on resource R, owned by user U in
//! department D" for goals, feedback, feedback requests, and appraisals.
//! Route guards, list loaders, and mutation handlers all call these functions
//! instead of re-deriving role checks.
//!
//! # Key invariants
//! - Every function is pure: no I/O, no clock, no panics, no errors. Callers
//!   check the returned value before acting.
//! - Default deny: `Role::Unknown` (and a missing department wherever one is
//!   required) is refused every privileged action.
//! - Department is always the *record owner's* directory department, supplied
//!   by the caller after a directory lookup; client filters are hints only.
//!
//! # Examples
//! ```rust
//! use perfdesk_authz::{GoalScope, GoalSetDecision, GoalViewMode, can_view_goal_set};
//! use perfdesk_common::{Department, Principal, Role};
//!
//! let manager = Principal::new("m1", Role::Manager, Some("IT"));
//! let decision = can_view_goal_set(&manager, GoalViewMode::Team, None);
//! assert_eq!(
//!     decision,
//!     GoalSetDecision::Allowed(GoalScope::Department(Department::new("IT")))
//! );
//! ```
//!
//! # Common pitfalls
//! - Passing the department from a request body instead of the directory.
//! - Treating `can_edit_goal` for managers as global; the caller must first
//!   confirm the goal is inside the manager's department via [`within_scope`].

mod appraisals;
mod decision;
mod feedback;
mod goals;
mod routes;
mod scope;

pub use appraisals::{
    appraisal_edit_decision, can_create_appraisal, can_edit_appraisal, can_view_all_appraisals,
    can_view_appraisal, visible_appraisals,
};
pub use decision::{Decision, DenyReason};
pub use feedback::{
    can_request_or_give_feedback, can_view_feedback_about, partition_received, reveals_reviewer,
    visible_feedback_recipients,
};
pub use goals::{
    GoalScope, GoalSetDecision, GoalViewMode, assignable_users, can_assign_goal, can_edit_goal,
    can_view_goal_set, goal_assign_decision, goal_edit_decision,
};
pub use routes::role_permits;
pub use scope::within_scope;
