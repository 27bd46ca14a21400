//! Strongly typed identifiers for people and departments.
//!
//! # Purpose
//! Wraps string identifiers so user ids and department names cannot be
//! swapped by accident in authorization checks.
//!
//! # Key invariants
//! - Display and `as_str` return the original value.
//! - Department comparison is exact; no case folding is applied.
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Directory user identifier.
///
/// # Example
/// ```rust
/// use perfdesk_common::UserId;
///
/// let id = UserId::new("u-17");
/// assert_eq!(id.as_str(), "u-17");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Department name as recorded in the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Department(String);

impl Department {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Department {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Returns true only when both sides carry the same department.
///
/// A missing department on either side never matches, so principals without
/// a department cannot claim department-scoped access.
pub fn same_department(left: Option<&Department>, right: Option<&Department>) -> bool {
    matches!((left, right), (Some(l), Some(r)) if l == r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_department_never_matches() {
        let it = Department::new("IT");
        assert!(same_department(Some(&it), Some(&Department::new("IT"))));
        assert!(!same_department(Some(&it), Some(&Department::new("FINANCE"))));
        assert!(!same_department(None, Some(&it)));
        assert!(!same_department(None, None));
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = UserId::new("u-1");
        assert_eq!(serde_json::to_string(&id).expect("json"), "\"u-1\"");
        let dept: Department = serde_json::from_str("\"HR\"").expect("dept");
        assert_eq!(dept.as_str(), "HR");
    }
}
