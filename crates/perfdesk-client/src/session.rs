//! Session Context: the current principal and tokens, with a durable snapshot.
//!
//! # Purpose
//! Holds who is signed in so the route guard and page code never reach for a
//! global. A snapshot is written on every change so a reload can rehydrate
//! identity without a network round trip.
//!
//! # Key invariants
//! - Every `set*`/`clear` bumps the epoch. Writers that started under an older
//!   epoch (e.g. a refresh) must use the `*_if_epoch` variants and lose.
//! - A malformed or unreadable snapshot is treated as "signed out"; loading
//!   never fails.
//! - Snapshot write failures are logged; the in-memory session stays
//!   authoritative.
use crate::errors::ClientResult;
use crate::identity::AuthGrant;
use crate::token::TokenPair;
use perfdesk_common::Principal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Fixed storage key; the file store uses it as its file stem.
pub const SNAPSHOT_KEY: &str = "perfdesk.session";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub principal: Option<Principal>,
    pub tokens: Option<TokenPair>,
}

pub trait SnapshotStore: Send + Sync {
    /// Raw stored value, if any.
    fn read(&self) -> ClientResult<Option<String>>;
    fn write(&self, value: &str) -> ClientResult<()>;
    fn remove(&self) -> ClientResult<()>;
}

#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{SNAPSHOT_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn read(&self) -> ClientResult<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, value: &str) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let staging = self.path.with_extension("json.tmp");
        std::fs::write(&staging, value)?;
        std::fs::rename(&staging, &self.path)?;
        Ok(())
    }

    fn remove(&self) -> ClientResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    value: Mutex<Option<String>>,
}

impl MemorySnapshotStore {
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(value.into())),
        }
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn read(&self) -> ClientResult<Option<String>> {
        Ok(self
            .value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn write(&self, value: &str) -> ClientResult<()> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = Some(value.to_string());
        Ok(())
    }

    fn remove(&self) -> ClientResult<()> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct SessionState {
    principal: Option<Principal>,
    tokens: Option<TokenPair>,
    epoch: u64,
    return_to: Option<String>,
}

pub struct SessionContext {
    state: RwLock<SessionState>,
    store: Arc<dyn SnapshotStore>,
}

impl SessionContext {
    /// Build a session, rehydrating from whatever the store holds.
    pub fn load(store: Arc<dyn SnapshotStore>) -> Self {
        let snapshot = read_snapshot(store.as_ref()).unwrap_or_default();
        Self {
            state: RwLock::new(SessionState {
                principal: snapshot.principal,
                tokens: snapshot.tokens,
                ..SessionState::default()
            }),
            store,
        }
    }

    pub fn in_memory() -> Self {
        Self::load(Arc::new(MemorySnapshotStore::default()))
    }

    pub fn principal(&self) -> Option<Principal> {
        self.read_state().principal.clone()
    }

    pub fn tokens(&self) -> Option<TokenPair> {
        self.read_state().tokens.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        let state = self.read_state();
        state.principal.is_some() && state.tokens.is_some()
    }

    pub fn epoch(&self) -> u64 {
        self.read_state().epoch
    }

    /// Install a login or refresh result.
    pub fn set(&self, grant: AuthGrant) {
        let mut state = self.write_state();
        state.tokens = Some(grant.tokens());
        state.principal = Some(grant.principal);
        state.epoch += 1;
        self.persist(&state);
    }

    pub fn set_if_epoch(&self, epoch: u64, grant: AuthGrant) -> bool {
        let mut state = self.write_state();
        if state.epoch != epoch {
            return false;
        }
        state.tokens = Some(grant.tokens());
        state.principal = Some(grant.principal);
        state.epoch += 1;
        self.persist(&state);
        true
    }

    pub fn set_principal(&self, principal: Principal) {
        let mut state = self.write_state();
        state.principal = Some(principal);
        state.epoch += 1;
        self.persist(&state);
    }

    pub fn set_principal_if_epoch(&self, epoch: u64, principal: Principal) -> bool {
        let mut state = self.write_state();
        if state.epoch != epoch {
            return false;
        }
        state.principal = Some(principal);
        state.epoch += 1;
        self.persist(&state);
        true
    }

    /// Sign out. Safe to call repeatedly; the remembered return URL survives
    /// so a post-login redirect still works.
    pub fn clear(&self) {
        let mut state = self.write_state();
        Self::clear_locked(&mut state);
        if let Err(err) = self.store.remove() {
            tracing::warn!(error = %err, "failed to remove session snapshot");
        }
    }

    /// Clear only if nothing has changed the session since `epoch`.
    pub fn clear_if_epoch(&self, epoch: u64) -> bool {
        let mut state = self.write_state();
        if state.epoch != epoch {
            return false;
        }
        Self::clear_locked(&mut state);
        if let Err(err) = self.store.remove() {
            tracing::warn!(error = %err, "failed to remove session snapshot");
        }
        true
    }

    pub fn remember_return_to(&self, url: impl Into<String>) {
        self.write_state().return_to = Some(url.into());
    }

    pub fn take_return_to(&self) -> Option<String> {
        self.write_state().return_to.take()
    }

    fn clear_locked(state: &mut SessionState) {
        state.principal = None;
        state.tokens = None;
        state.epoch += 1;
    }

    fn persist(&self, state: &SessionState) {
        let snapshot = SessionSnapshot {
            principal: state.principal.clone(),
            tokens: state.tokens.clone(),
        };
        let result = serde_json::to_string(&snapshot)
            .map_err(crate::errors::ClientError::from)
            .and_then(|encoded| self.store.write(&encoded));
        if let Err(err) = result {
            tracing::warn!(error = %err, "failed to persist session snapshot");
        }
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn read_snapshot(store: &dyn SnapshotStore) -> Option<SessionSnapshot> {
    let raw = match store.read() {
        Ok(raw) => raw?,
        Err(err) => {
            tracing::warn!(error = %err, "session snapshot unreadable; starting signed out");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            tracing::warn!(error = %err, "session snapshot malformed; starting signed out");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perfdesk_common::Role;

    fn grant(id: &str) -> AuthGrant {
        AuthGrant {
            principal: Principal::new(id, Role::Manager, Some("IT")),
            access_token: format!("access-{id}"),
            refresh_token: format!("refresh-{id}"),
        }
    }

    #[test]
    fn file_snapshot_rehydrates_after_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(FileSnapshotStore::new(dir.path()));
        let session = SessionContext::load(store.clone());
        assert!(!session.is_authenticated());
        session.set(grant("m1"));
        assert!(store.path().exists());

        let reloaded = SessionContext::load(store);
        assert!(reloaded.is_authenticated());
        assert_eq!(
            reloaded.principal().map(|principal| principal.id),
            Some("m1".into())
        );
    }

    #[test]
    fn malformed_snapshot_is_signed_out() {
        let store = Arc::new(MemorySnapshotStore::with_value("{not json"));
        let session = SessionContext::load(store);
        assert!(!session.is_authenticated());
        assert!(session.principal().is_none());
    }

    #[test]
    fn clear_is_idempotent_and_removes_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(FileSnapshotStore::new(dir.path()));
        let session = SessionContext::load(store.clone());
        session.set(grant("m1"));
        session.clear();
        session.clear();
        assert!(!session.is_authenticated());
        assert!(!store.path().exists());
    }

    #[test]
    fn stale_epoch_writers_lose() {
        let session = SessionContext::in_memory();
        session.set(grant("m1"));
        let started = session.epoch();
        session.clear();
        assert!(!session.set_if_epoch(started, grant("m1")));
        assert!(!session.clear_if_epoch(started));
        assert!(!session.is_authenticated());

        let current = session.epoch();
        assert!(session.set_if_epoch(current, grant("m2")));
        assert!(session.is_authenticated());
    }

    #[test]
    fn return_to_is_consumed_once() {
        let session = SessionContext::in_memory();
        session.remember_return_to("/appraisals");
        session.clear();
        assert_eq!(session.take_return_to().as_deref(), Some("/appraisals"));
        assert_eq!(session.take_return_to(), None);
    }
}
