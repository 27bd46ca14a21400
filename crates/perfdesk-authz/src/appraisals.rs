//! Appraisal permissions.
//!
//! `COMPLETED` is immutable for every role. Employees only ever see their own
//! completed appraisals; drafts and submitted records stay with management.
use crate::decision::{Decision, DenyReason};
use crate::scope::within_scope;
use perfdesk_common::{Appraisal, AppraisalStatus, Department, Principal, Role};

pub fn can_view_all_appraisals(principal: &Principal) -> bool {
    matches!(principal.role, Role::Admin | Role::Manager)
}

pub fn can_create_appraisal(principal: &Principal) -> bool {
    matches!(principal.role, Role::Admin | Role::Manager)
}

pub fn appraisal_edit_decision(principal: &Principal, appraisal: &Appraisal) -> Decision {
    match principal.role {
        Role::Admin | Role::Manager => {
            Decision::allow_if(!appraisal.status.is_terminal(), DenyReason::RecordLocked)
        }
        Role::Unknown => Decision::Deny(DenyReason::UnknownRole),
        Role::Employee | Role::ItSupport => Decision::Deny(DenyReason::RoleNotPermitted),
    }
}

/// ADMIN or MANAGER, and the record is still `DRAFT` or `SUBMITTED`.
pub fn can_edit_appraisal(principal: &Principal, appraisal: &Appraisal) -> bool {
    appraisal_edit_decision(principal, appraisal).is_allowed()
}

/// Whether a single appraisal is visible. `employee_department` is the
/// directory department of the appraised employee.
pub fn can_view_appraisal(
    principal: &Principal,
    appraisal: &Appraisal,
    employee_department: Option<&Department>,
) -> bool {
    match principal.role {
        Role::Admin => true,
        Role::Manager => {
            appraisal.manager_id == principal.id
                || within_scope(principal, &appraisal.employee_id, employee_department)
        }
        Role::Employee | Role::ItSupport => {
            appraisal.employee_id == principal.id && appraisal.status == AppraisalStatus::Completed
        }
        Role::Unknown => false,
    }
}

/// Filter one employee's appraisals down to what the principal may see.
pub fn visible_appraisals(
    principal: &Principal,
    employee_department: Option<&Department>,
    items: impl IntoIterator<Item = Appraisal>,
) -> Vec<Appraisal> {
    items
        .into_iter()
        .filter(|appraisal| can_view_appraisal(principal, appraisal, employee_department))
        .collect()
}
