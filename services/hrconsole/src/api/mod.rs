//! Console HTTP API module.
//!
//! # Purpose
//! Exposes the route handler modules and the path-parameter helpers they
//! share. Handlers authenticate, delegate to the workflow layer, and wrap the
//! result; no permission logic lives here.
pub mod appraisals;
pub mod error;
pub mod feedback;
pub mod goals;
pub mod openapi;
pub mod requests;
pub mod system;
pub mod types;
pub mod users;

use crate::api::error::{ApiError, api_not_found};
use perfdesk_common::UserId;
use uuid::Uuid;

/// Parse a record id from a path segment. Malformed ids cannot name a record,
/// so they are reported as not found.
pub(crate) fn parse_record_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| api_not_found(&format!("{what} not found")))
}

/// Blank query values are treated as absent.
pub(crate) fn query_user(raw: Option<String>) -> Option<UserId> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(UserId::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn malformed_ids_are_not_found() {
        let err = parse_record_id("not-a-uuid", "goal").expect_err("reject");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.body.message, "goal not found");

        let id = Uuid::new_v4();
        assert_eq!(parse_record_id(&id.to_string(), "goal").expect("parse"), id);
    }

    #[test]
    fn blank_query_user_is_absent() {
        assert_eq!(query_user(None), None);
        assert_eq!(query_user(Some("  ".to_string())), None);
        assert_eq!(query_user(Some("e1".to_string())), Some(UserId::new("e1")));
    }
}
