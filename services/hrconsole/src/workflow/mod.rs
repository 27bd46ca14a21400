//! Goal, feedback, and appraisal lifecycle managers.
//!
//! # Purpose
//! Applies the permission evaluator to every read and write before touching
//! the store. This is the server-side enforcement layer: query parameters such
//! as a goal view mode or department are re-resolved here and never trusted.
//!
//! # Key invariants
//! - Record departments come from the user directory, never from the record
//!   or the request.
//! - A manager looking outside their department gets `NotFound`, exactly as if
//!   the record did not exist.
//! - Every mutation reports a [`ViewEffect`] so list views can stay valid.
//!
//! # Observability
//! Denials are logged at `warn` and counted in
//! `perfdesk_authz_denied_total{action}`; successful operations are counted in
//! `perfdesk_workflow_ops_total{op}`.
mod appraisals;
mod errors;
mod feedback;
mod goals;

pub use appraisals::AppraisalEditDraft;
pub use errors::{WorkflowError, WorkflowResult};
pub use feedback::{RequestReply, RespondOutcome};

use crate::store::{PerformanceStore, StoreError, UserDirectory};
use perfdesk_authz::DenyReason;
use perfdesk_common::{Department, Principal, Role, UserFilter, UserId, ViewEffect};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowSettings {
    /// System-wide switch; when off, every feedback is stored non-anonymous.
    pub anonymous_feedback_enabled: bool,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            anonymous_feedback_enabled: true,
        }
    }
}

/// A stored record plus how client lists must react to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation<T> {
    pub record: T,
    pub effect: ViewEffect,
}

impl<T> Mutation<T> {
    fn new(record: T, effect: ViewEffect) -> Self {
        Self { record, effect }
    }
}

#[derive(Clone)]
pub struct Workflow {
    store: Arc<dyn PerformanceStore>,
    directory: Arc<dyn UserDirectory>,
    settings: WorkflowSettings,
}

impl Workflow {
    pub fn new(
        store: Arc<dyn PerformanceStore>,
        directory: Arc<dyn UserDirectory>,
        settings: WorkflowSettings,
    ) -> Self {
        Self {
            store,
            directory,
            settings,
        }
    }

    pub fn settings(&self) -> WorkflowSettings {
        self.settings
    }

    pub fn store(&self) -> &Arc<dyn PerformanceStore> {
        &self.store
    }

    /// Directory department of `user`; `None` when the user has none or is
    /// not in the directory.
    async fn department_of(&self, user: &UserId) -> WorkflowResult<Option<Department>> {
        match self.directory.get_user(user).await {
            Ok(found) => Ok(found.department),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(err) => Err(WorkflowError::Store(err)),
        }
    }

    async fn department_map(&self) -> WorkflowResult<HashMap<UserId, Option<Department>>> {
        let users = self.directory.list_users(&UserFilter::default()).await?;
        Ok(users
            .into_iter()
            .map(|user| (user.id, user.department))
            .collect())
    }
}

fn record_denial(action: &'static str, principal: &Principal, reason: DenyReason) {
    tracing::warn!(
        action,
        principal = %principal.id,
        role = %principal.role,
        reason = %reason,
        "authorization denied"
    );
    metrics::counter!("perfdesk_authz_denied_total", "action" => action).increment(1);
}

/// Refuse `action`. Department mismatches are reported as `NotFound(what)` so
/// the record's existence does not leak; every other reason is `Forbidden`.
pub(crate) fn deny(
    action: &'static str,
    principal: &Principal,
    reason: DenyReason,
    what: &str,
) -> WorkflowError {
    record_denial(action, principal, reason);
    match reason {
        DenyReason::OutsideDepartment => WorkflowError::NotFound(what.to_string()),
        _ => WorkflowError::Forbidden(format!("{action} is not permitted")),
    }
}

/// Refuse `action` as if the record did not exist.
pub(crate) fn conceal(
    action: &'static str,
    principal: &Principal,
    reason: DenyReason,
    what: &str,
) -> WorkflowError {
    record_denial(action, principal, reason);
    WorkflowError::NotFound(what.to_string())
}

/// Deny reason for a role-only check.
pub(crate) fn role_reason(principal: &Principal) -> DenyReason {
    if principal.role == Role::Unknown {
        DenyReason::UnknownRole
    } else {
        DenyReason::RoleNotPermitted
    }
}

pub(crate) fn count_op(op: &'static str) {
    metrics::counter!("perfdesk_workflow_ops_total", "op" => op).increment(1);
}
