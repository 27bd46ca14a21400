//! Single-flight token refresh.
//!
//! Concurrent callers that find the access token expired share one call to
//! the identity service and all observe its outcome. The shared future is
//! dropped from the slot once it resolves so the next expiry starts fresh.
use crate::identity::{AuthGrant, IdentityService};
use crate::session::SessionContext;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshFailure {
    #[error("no refresh token in session")]
    MissingRefreshToken,
    #[error("identity service rejected refresh: {0}")]
    Rejected(String),
    #[error("session changed while refresh was in flight")]
    Superseded,
}

type RefreshOutcome = Result<AuthGrant, RefreshFailure>;
type InFlight = Shared<BoxFuture<'static, RefreshOutcome>>;

pub struct RefreshCoordinator {
    identity: Arc<dyn IdentityService>,
    session: Arc<SessionContext>,
    in_flight: Mutex<Option<InFlight>>,
}

impl RefreshCoordinator {
    pub fn new(identity: Arc<dyn IdentityService>, session: Arc<SessionContext>) -> Self {
        Self {
            identity,
            session,
            in_flight: Mutex::new(None),
        }
    }

    /// Refresh the session, joining an in-flight refresh if there is one.
    pub async fn refresh(&self) -> RefreshOutcome {
        let shared = {
            let mut slot = self.in_flight.lock().await;
            // A caller dropped before clearing the slot can leave a finished
            // refresh behind; its outcome is stale.
            match slot.as_ref().filter(|existing| existing.peek().is_none()) {
                Some(existing) => existing.clone(),
                None => {
                    let started = self.start().shared();
                    *slot = Some(started.clone());
                    started
                }
            }
        };

        let outcome = shared.clone().await;

        let mut slot = self.in_flight.lock().await;
        if slot
            .as_ref()
            .is_some_and(|current| current.ptr_eq(&shared))
        {
            *slot = None;
        }
        outcome
    }

    fn start(&self) -> BoxFuture<'static, RefreshOutcome> {
        let identity = self.identity.clone();
        let session = self.session.clone();
        async move {
            let epoch = session.epoch();
            let Some(tokens) = session.tokens() else {
                session.clear_if_epoch(epoch);
                return Err(RefreshFailure::MissingRefreshToken);
            };
            tracing::debug!("refreshing access token");
            match identity.refresh(&tokens.refresh_token).await {
                Ok(grant) => {
                    if session.set_if_epoch(epoch, grant.clone()) {
                        Ok(grant)
                    } else {
                        tracing::info!("session changed during refresh; discarding new tokens");
                        Err(RefreshFailure::Superseded)
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "token refresh failed");
                    if !session.clear_if_epoch(epoch) {
                        tracing::debug!("session already changed; refresh failure not applied");
                    }
                    Err(RefreshFailure::Rejected(err.to_string()))
                }
            }
        }
        .boxed()
    }
}
