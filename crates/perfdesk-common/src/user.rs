//! Directory user records.
use crate::ids::{Department, UserId};
use crate::principal::{Principal, Role};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[schema(value_type = String)]
    pub role: Role,
    pub department: Option<Department>,
}

impl User {
    pub fn department(&self) -> Option<&Department> {
        self.department.as_ref()
    }

    pub fn as_principal(&self) -> Principal {
        Principal {
            id: self.id.clone(),
            role: self.role,
            department: self.department.clone(),
        }
    }
}

/// Filter accepted by the user directory.
///
/// The directory may ignore it; callers still apply the permission evaluator
/// on whatever comes back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub department: Option<Department>,
}

impl UserFilter {
    pub fn department(department: Department) -> Self {
        Self {
            department: Some(department),
        }
    }

    pub fn matches(&self, user: &User) -> bool {
        match &self.department {
            Some(department) => user.department.as_ref() == Some(department),
            None => true,
        }
    }
}
