//! Performance-management console entry point.
//!
//! # Purpose
//! Wires configuration, the directory seed, token verification, and the HTTP
//! router, then serves the API alongside the metrics listener.
//!
//! # Notes
//! The `build_state` helper keeps wiring testable and minimizes main setup logic.
use hrconsole::app::{AppState, build_router};
use hrconsole::auth::token::TokenVerifier;
use hrconsole::config::{self, ConsoleConfig};
use hrconsole::observability;
use hrconsole::store::memory::InMemoryStore;
use hrconsole::workflow::{Workflow, WorkflowSettings};
use std::future::Future;
use std::sync::Arc;

const SERVICE_NAME: &str = "hrconsole";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConsoleConfig::from_env_or_yaml()?;
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(config: ConsoleConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics_handle = observability::init_observability(SERVICE_NAME);
    let state = build_state(config.clone())?;
    let metrics_task = tokio::spawn(observability::serve_metrics(
        metrics_handle,
        config.metrics_bind,
    ));

    let app = build_router(state);

    let addr = config.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "console listening");
    tokio::pin!(shutdown);
    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            result?;
        }
        _ = &mut shutdown => {}
    }

    metrics_task.abort();
    let _ = metrics_task.await;
    Ok(())
}

fn build_state(config: ConsoleConfig) -> anyhow::Result<AppState> {
    let store = match &config.seed_users_path {
        Some(path) => {
            let users = config::load_seed_users(path)?;
            tracing::info!(count = users.len(), path = %path.display(), "directory seeded");
            InMemoryStore::with_users(users)
        }
        None => {
            tracing::warn!("no seed users configured; directory is empty");
            InMemoryStore::new()
        }
    };
    let settings = WorkflowSettings {
        anonymous_feedback_enabled: config.anonymous_feedback_enabled,
    };
    let workflow = Workflow::new(Arc::new(store.clone()), Arc::new(store), settings);
    let verifier = TokenVerifier::new(
        config.token.secret.as_bytes(),
        &config.token.issuer,
        &config.token.audience,
        config.token.leeway_secs,
    );

    Ok(AppState {
        service_name: SERVICE_NAME.to_string(),
        api_version: "v1".to_string(),
        workflow,
        verifier,
    })
}
