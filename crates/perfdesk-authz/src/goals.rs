//! Goal visibility, assignment, and edit decisions.
//!
//! # Purpose
//! Resolves which goal set a principal may load (mine / team / department /
//! all) into a concrete [`GoalScope`], and decides who may assign or edit a
//! goal.
//!
//! # Key invariants
//! - A resolved scope never widens what the role allows: managers always
//!   resolve to their own department, employees always to themselves.
//! - IT_SUPPORT may look at its own goals but neither assigns nor edits.
use crate::decision::{Decision, DenyReason};
use perfdesk_common::{Department, Goal, ParseError, Principal, Role, User, UserId, same_department};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GoalViewMode {
    My,
    Team,
    Dept,
    All,
}

impl GoalViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            GoalViewMode::My => "my",
            GoalViewMode::Team => "team",
            GoalViewMode::Dept => "dept",
            GoalViewMode::All => "all",
        }
    }
}

impl std::str::FromStr for GoalViewMode {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "my" => Ok(GoalViewMode::My),
            "team" => Ok(GoalViewMode::Team),
            "dept" | "department" => Ok(GoalViewMode::Dept),
            "all" => Ok(GoalViewMode::All),
            _ => Err(ParseError::UnknownViewMode(value.to_string())),
        }
    }
}

/// Concrete fetch scope after authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalScope {
    User(UserId),
    Department(Department),
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalSetDecision {
    Allowed(GoalScope),
    Denied(DenyReason),
}

impl GoalSetDecision {
    pub fn scope(self) -> Option<GoalScope> {
        match self {
            GoalSetDecision::Allowed(scope) => Some(scope),
            GoalSetDecision::Denied(_) => None,
        }
    }
}

/// Decide whether `principal` may load the goal set named by `mode`.
///
/// `requested_department` is the department the caller asked for (e.g. a
/// dropdown value). It is honoured only for ADMIN; a manager asking for a
/// department other than their own is denied.
///
/// | role | MY | TEAM | DEPT | ALL |
/// | --- | --- | --- | --- | --- |
/// | ADMIN | self | requested or own dept | requested dept, or all when none | all |
/// | MANAGER | self | own dept | own dept only | denied |
/// | EMPLOYEE, IT_SUPPORT | self | denied | denied | denied |
pub fn can_view_goal_set(
    principal: &Principal,
    mode: GoalViewMode,
    requested_department: Option<&Department>,
) -> GoalSetDecision {
    use GoalSetDecision::{Allowed, Denied};

    if principal.role == Role::Unknown {
        return Denied(DenyReason::UnknownRole);
    }
    if mode == GoalViewMode::My {
        return Allowed(GoalScope::User(principal.id.clone()));
    }

    match principal.role {
        Role::Admin => match (mode, requested_department.or(principal.department())) {
            (GoalViewMode::All, _) => Allowed(GoalScope::All),
            (GoalViewMode::Dept, None) => Allowed(GoalScope::All),
            (_, Some(department)) => Allowed(GoalScope::Department(department.clone())),
            (_, None) => Denied(DenyReason::OutsideDepartment),
        },
        Role::Manager => {
            if mode == GoalViewMode::All {
                return Denied(DenyReason::RoleNotPermitted);
            }
            let Some(own) = principal.department() else {
                return Denied(DenyReason::OutsideDepartment);
            };
            match requested_department {
                Some(requested) if requested != own => Denied(DenyReason::OutsideDepartment),
                _ => Allowed(GoalScope::Department(own.clone())),
            }
        }
        _ => Denied(DenyReason::RoleNotPermitted),
    }
}

pub fn goal_assign_decision(
    principal: &Principal,
    target_user: &UserId,
    target_department: Option<&Department>,
) -> Decision {
    match principal.role {
        Role::Admin => Decision::Allow,
        Role::Manager => Decision::allow_if(
            same_department(principal.department(), target_department),
            DenyReason::OutsideDepartment,
        ),
        Role::Employee => Decision::allow_if(&principal.id == target_user, DenyReason::NotOwner),
        Role::ItSupport => Decision::Deny(DenyReason::RoleNotPermitted),
        Role::Unknown => Decision::Deny(DenyReason::UnknownRole),
    }
}

/// ADMIN: always. MANAGER: only inside their own department. EMPLOYEE: only
/// self-goals.
pub fn can_assign_goal(
    principal: &Principal,
    target_user: &UserId,
    target_department: Option<&Department>,
) -> bool {
    goal_assign_decision(principal, target_user, target_department).is_allowed()
}

pub fn goal_edit_decision(principal: &Principal, goal: &Goal) -> Decision {
    match principal.role {
        Role::Admin | Role::Manager => Decision::Allow,
        Role::Employee => Decision::allow_if(goal.user_id == principal.id, DenyReason::NotOwner),
        Role::ItSupport => Decision::Deny(DenyReason::RoleNotPermitted),
        Role::Unknown => Decision::Deny(DenyReason::UnknownRole),
    }
}

/// True iff the principal is ADMIN or MANAGER, or an EMPLOYEE editing their
/// own goal. Department scoping for managers is checked separately.
pub fn can_edit_goal(principal: &Principal, goal: &Goal) -> bool {
    goal_edit_decision(principal, goal).is_allowed()
}

/// Users the principal may assign goals to, filtered from a directory
/// listing that is not trusted to be pre-filtered.
pub fn assignable_users<'a>(principal: &Principal, users: &'a [User]) -> Vec<&'a User> {
    users
        .iter()
        .filter(|user| can_assign_goal(principal, &user.id, user.department()))
        .collect()
}
