//! Shared application state for the AI gateway.
//!
//! Builds the policy engine, collaborators and the gateway service from a
//! validated config. Startup errors are returned, never panicked on.

use std::sync::Arc;
use std::time::Duration;

use aigate_core::error::{GatewayError, Result};
use aigate_core::model::ModelId;

use crate::backend::{CompletionBackend, HttpCompletionBackend};
use crate::config::GatewayConfig;
use crate::holdings::{StaticHoldings, TierResolver};
use crate::obs::GatewayMetrics;
use crate::services::AiGateway;
use crate::store::InMemoryUsageStore;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    gateway: AiGateway,
    usage: Arc<InMemoryUsageStore>,
    metrics: Arc<GatewayMetrics>,
    /// Models the backend can actually reach; empty means not ready.
    models: Vec<ModelId>,
}

impl AppState {
    /// Production wiring: HTTP backend, static holdings table, in-memory usage.
    pub fn new(cfg: &GatewayConfig) -> Result<Self> {
        let timeout = Duration::from_millis(cfg.gateway.completion_timeout_ms);
        let backend = HttpCompletionBackend::new(&cfg.providers, timeout)
            .map_err(|e| GatewayError::Internal(format!("backend init failed: {e}")))?;
        let models = backend.configured_models();
        tracing::info!(?models, "completion backend ready");

        let resolver = StaticHoldings::from_config(&cfg.holdings);
        Self::build(cfg, Arc::new(backend), Arc::new(resolver), models)
    }

    /// Wiring with caller-supplied collaborators (tests, embedding).
    /// The backend is assumed to serve every model.
    pub fn with_parts(
        cfg: &GatewayConfig,
        backend: Arc<dyn CompletionBackend>,
        resolver: Arc<dyn TierResolver>,
    ) -> Result<Self> {
        Self::build(cfg, backend, resolver, ModelId::ALL.to_vec())
    }

    fn build(
        cfg: &GatewayConfig,
        backend: Arc<dyn CompletionBackend>,
        resolver: Arc<dyn TierResolver>,
        models: Vec<ModelId>,
    ) -> Result<Self> {
        let policy = cfg.policy.build().map_err(|e| {
            GatewayError::BadRequest(format!("policy compile failed: {e}"))
        })?;
        let usage = Arc::new(InMemoryUsageStore::new());
        let metrics = Arc::new(GatewayMetrics::default());

        let gateway = AiGateway::new(Arc::new(policy), resolver, backend, usage.clone())
            .with_metrics(Arc::clone(&metrics))
            .with_completion_timeout(Duration::from_millis(cfg.gateway.completion_timeout_ms));

        Ok(Self {
            inner: Arc::new(AppStateInner { gateway, usage, metrics, models }),
        })
    }

    /// Gateway service.
    pub fn gateway(&self) -> &AiGateway {
        &self.inner.gateway
    }

    /// Shared usage store (also driven by the retention sweeper).
    pub fn usage_store(&self) -> Arc<InMemoryUsageStore> {
        Arc::clone(&self.inner.usage)
    }

    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.inner.metrics)
    }

    /// Models with a usable provider.
    pub fn available_models(&self) -> &[ModelId] {
        &self.inner.models
    }

    /// True once shutdown has begun.
    pub fn is_draining(&self) -> bool {
        self.inner.metrics.is_draining()
    }

    /// Mark draining state.
    pub fn set_draining(&self) {
        self.inner.metrics.set_draining();
    }

    /// Gauges computed at scrape time.
    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        vec![("aigate_usage_records", self.inner.usage.len() as u64)]
    }
}
