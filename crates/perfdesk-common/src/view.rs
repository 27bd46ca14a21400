use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// How a client list must be brought up to date after a mutation.
///
/// A list is only valid for the next read once the effect has been applied;
/// `Refetch` is returned whenever the changed record may fall outside the
/// scope the caller is currently looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ViewEffect {
    InsertLocal,
    ReplaceLocal,
    RemoveLocal,
    Refetch,
}
