//! Client-side session handling for the perfdesk console.
//!
//! # Purpose
//! Owns everything a console front end needs before it can render a page:
//! the Session Context with its durable snapshot, access-token expiry checks,
//! the identity service collaborator, single-flight token refresh, the Route
//! Guard, and list views that stay consistent across mutations.
//!
//! # Examples
//! ```rust,no_run
//! use perfdesk_client::{
//!     ClientConfig, FileSnapshotStore, HttpIdentityService, Route, RouteGuard, SessionContext,
//! };
//! use perfdesk_common::Role;
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ClientConfig::from_env_or_yaml(None)?;
//! let store = Arc::new(FileSnapshotStore::new(
//!     config.snapshot_dir.clone().unwrap_or_else(std::env::temp_dir),
//! ));
//! let session = Arc::new(SessionContext::load(store));
//! let identity = Arc::new(HttpIdentityService::new(config.identity_url.clone()));
//! let guard = RouteGuard::new(session, identity, &config);
//! let outcome = guard.check(&Route::restricted("/appraisals", [Role::Admin, Role::Manager])).await;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```
mod config;
mod errors;
mod guard;
mod identity;
mod refresh;
mod session;
mod token;
mod views;

pub use config::ClientConfig;
pub use errors::{ClientError, ClientResult};
pub use guard::{GuardOutcome, Route, RouteGuard};
pub use identity::{AuthGrant, Credentials, HttpIdentityService, IdentityService};
pub use refresh::{RefreshCoordinator, RefreshFailure};
pub use session::{
    FileSnapshotStore, MemorySnapshotStore, SNAPSHOT_KEY, SessionContext, SessionSnapshot,
    SnapshotStore,
};
pub use token::{TokenError, TokenPair, decode_expiry, is_expired, unix_now};
pub use views::{EntryState, Keyed, ListView};
