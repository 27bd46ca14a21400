//! Principal identity model.
//!
//! # Purpose
//! Describes who is acting: a user id, a role, and the department the role is
//! exercised in. A principal is immutable for the lifetime of a session and is
//! replaced wholesale on login, refresh, or logout.
use crate::errors::ParseError;
use crate::ids::{Department, UserId};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Console role.
///
/// Anything that does not parse as a known role becomes [`Role::Unknown`],
/// which the permission evaluator denies for every privileged action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Manager,
    Employee,
    ItSupport,
    Unknown,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Employee => "EMPLOYEE",
            Role::ItSupport => "IT_SUPPORT",
            Role::Unknown => "UNKNOWN",
        }
    }

    /// Parse a role claim, mapping unrecognised values to `Unknown`.
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or(Role::Unknown)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ADMIN" => Ok(Role::Admin),
            "MANAGER" => Ok(Role::Manager),
            "EMPLOYEE" => Ok(Role::Employee),
            "IT_SUPPORT" => Ok(Role::ItSupport),
            other => Err(ParseError::UnknownRole(other.to_string())),
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Role::parse_lenient(&raw))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: UserId,
    pub role: Role,
    pub department: Option<Department>,
}

impl Principal {
    pub fn new(id: impl Into<String>, role: Role, department: Option<&str>) -> Self {
        Self {
            id: UserId::new(id),
            role,
            department: department.map(Department::new),
        }
    }

    pub fn department(&self) -> Option<&Department> {
        self.department.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_manager(&self) -> bool {
        self.role == Role::Manager
    }
}
