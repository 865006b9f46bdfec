//! aigate gateway binary.
//!
//! - Strict YAML config (path from `AIGATE_CONFIG`, default `aigate.yaml`)
//! - JSON API: /v1/ai/request, /v1/ai/usage/:user_id
//! - Ops: /healthz, /readyz, /metrics
//! - Background usage retention sweep
//! - Graceful shutdown on Ctrl+C / SIGTERM (readyz flips to draining)

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

use aigate_gateway::{app_state, config, router, store};

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::var("AIGATE_CONFIG").unwrap_or_else(|_| "aigate.yaml".into());
    let cfg = match config::load_from_file(&path) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(%path, error = %e, "config load failed");
            return ExitCode::FAILURE;
        }
    };
    let listen: SocketAddr = match cfg.gateway.listen.parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(listen = %cfg.gateway.listen, error = %e, "gateway.listen must be a valid SocketAddr");
            return ExitCode::FAILURE;
        }
    };

    let state = match app_state::AppState::new(&cfg) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            return ExitCode::FAILURE;
        }
    };

    let sweeper = store::spawn_retention_sweeper(
        state.usage_store(),
        Arc::new(store::SystemClock),
        cfg.usage.retention_days,
        Duration::from_secs(cfg.usage.sweep_interval_secs),
    );

    let app = router::build_router(state.clone());

    tracing::info!(%listen, "aigate-gateway starting");
    let listener = match tokio::net::TcpListener::bind(listen).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(%listen, error = %e, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await;
    sweeper.abort();

    match served {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}

async fn shutdown_signal(state: app_state::AppState) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    state.set_draining();
    tracing::info!("signal received, starting graceful shutdown");
}
