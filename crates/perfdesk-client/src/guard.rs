//! Route Guard: decides per navigation whether the signed-in principal may
//! enter a route.
//!
//! # Key invariants
//! - No token: login, and the intended path is remembered.
//! - Valid token with the wrong role: the default route, without any refresh.
//! - Expired token: exactly one (shared) refresh, then the role check again.
//!   A failed refresh signs the session out.
//! - Guard decisions never fail; every error resolves to a redirect.
use crate::config::ClientConfig;
use crate::identity::IdentityService;
use crate::refresh::RefreshCoordinator;
use crate::session::SessionContext;
use crate::token;
use perfdesk_authz::role_permits;
use perfdesk_common::{Principal, Role};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub required_roles: Vec<Role>,
}

impl Route {
    /// A route any signed-in principal with a known role may enter.
    pub fn authenticated(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            required_roles: Vec::new(),
        }
    }

    pub fn restricted(path: impl Into<String>, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            path: path.into(),
            required_roles: roles.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    RedirectToLogin(String),
    RedirectToDefault(String),
}

pub struct RouteGuard {
    session: Arc<SessionContext>,
    identity: Arc<dyn IdentityService>,
    refresher: Arc<RefreshCoordinator>,
    login_route: String,
    default_route: String,
    refresh_leeway_secs: u64,
}

impl RouteGuard {
    pub fn new(
        session: Arc<SessionContext>,
        identity: Arc<dyn IdentityService>,
        config: &ClientConfig,
    ) -> Self {
        let refresher = Arc::new(RefreshCoordinator::new(identity.clone(), session.clone()));
        Self {
            session,
            identity,
            refresher,
            login_route: config.login_route.clone(),
            default_route: config.default_route.clone(),
            refresh_leeway_secs: config.refresh_leeway_secs,
        }
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    pub async fn check(&self, route: &Route) -> GuardOutcome {
        let Some(tokens) = self.session.tokens() else {
            self.session.remember_return_to(route.path.clone());
            return self.to_login();
        };

        let expired = match token::is_expired(
            &tokens.access_token,
            token::unix_now(),
            self.refresh_leeway_secs,
        ) {
            Ok(expired) => expired,
            Err(err) => {
                tracing::warn!(error = %err, route = %route.path, "undecodable access token");
                self.session.clear();
                self.session.remember_return_to(route.path.clone());
                return self.to_login();
            }
        };

        if expired && let Err(failure) = self.refresher.refresh().await {
            tracing::info!(%failure, route = %route.path, "refresh failed; sending to login");
            self.session.remember_return_to(route.path.clone());
            return self.to_login();
        }

        let Some(principal) = self.current_principal().await else {
            self.session.remember_return_to(route.path.clone());
            return self.to_login();
        };

        if role_permits(principal.role, &route.required_roles) {
            GuardOutcome::Allow
        } else {
            tracing::warn!(
                principal = %principal.id,
                role = %principal.role,
                route = %route.path,
                "route denied for role"
            );
            GuardOutcome::RedirectToDefault(self.default_route.clone())
        }
    }

    /// Principal from the session, or fetched from the identity service when
    /// only tokens survived (e.g. an older snapshot).
    async fn current_principal(&self) -> Option<Principal> {
        if let Some(principal) = self.session.principal() {
            return Some(principal);
        }
        let epoch = self.session.epoch();
        let tokens = self.session.tokens()?;
        match self.identity.current_principal(&tokens.access_token).await {
            Ok(principal) => {
                self.session
                    .set_principal_if_epoch(epoch, principal.clone())
                    .then_some(principal)
            }
            Err(err) => {
                tracing::warn!(error = %err, "could not rehydrate principal");
                self.session.clear_if_epoch(epoch);
                None
            }
        }
    }

    fn to_login(&self) -> GuardOutcome {
        GuardOutcome::RedirectToLogin(self.login_route.clone())
    }
}
