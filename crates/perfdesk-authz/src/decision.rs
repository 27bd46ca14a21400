use serde::{Deserialize, Serialize};

/// Why an action was refused. Carried for logging only; API responses stay
/// generic so denials do not leak record existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    UnknownRole,
    RoleNotPermitted,
    OutsideDepartment,
    NotOwner,
    RecordLocked,
}

impl DenyReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DenyReason::UnknownRole => "unknown_role",
            DenyReason::RoleNotPermitted => "role_not_permitted",
            DenyReason::OutsideDepartment => "outside_department",
            DenyReason::NotOwner => "not_owner",
            DenyReason::RecordLocked => "record_locked",
        }
    }
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn deny_reason(self) -> Option<DenyReason> {
        match self {
            Decision::Allow => None,
            Decision::Deny(reason) => Some(reason),
        }
    }

    pub(crate) fn allow_if(condition: bool, reason: DenyReason) -> Self {
        if condition {
            Decision::Allow
        } else {
            Decision::Deny(reason)
        }
    }
}
