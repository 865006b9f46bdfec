//! In-memory collaborators shared by gateway integration tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use aigate_core::error::{BackendError, GatewayError, Result};
use aigate_core::model::ModelId;
use aigate_core::usage::UsageRecord;
use aigate_gateway::backend::{CompletionBackend, CompletionRequest};
use aigate_gateway::holdings::{Holdings, Identity, StaticHoldings, TierResolver};
use aigate_gateway::policy::PolicyEngine;
use aigate_gateway::services::AiGateway;
use aigate_gateway::store::{InMemoryUsageStore, ManualClock, UsageStore};

/// Backend that answers `"<model>: ok"`, fails for chosen models, hangs for others,
/// and records every call.
#[derive(Default)]
pub struct ScriptedBackend {
    failing: HashSet<ModelId>,
    hanging: HashSet<ModelId>,
    calls: Mutex<Vec<ModelId>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, model: ModelId) -> Self {
        self.failing.insert(model);
        self
    }

    pub fn hanging(mut self, model: ModelId) -> Self {
        self.hanging.insert(model);
        self
    }

    pub fn calls(&self) -> Vec<ModelId> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, req: CompletionRequest<'_>) -> std::result::Result<String, BackendError> {
        self.calls.lock().unwrap().push(req.model);
        if self.hanging.contains(&req.model) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.failing.contains(&req.model) {
            return Err(BackendError::Api(format!("{} unavailable", req.model)));
        }
        Ok(format!("{}: ok", req.model))
    }
}

/// Resolver whose lookups always fail.
pub struct BrokenResolver;

#[async_trait]
impl TierResolver for BrokenResolver {
    async fn holdings(&self, _who: Identity<'_>) -> Result<Holdings> {
        Err(GatewayError::Internal("registry offline".into()))
    }
}

/// Usage store that fails reads or writes. Calls that pass see an empty record.
pub struct FailingUsageStore {
    fail_reads: bool,
    fail_writes: bool,
}

impl FailingUsageStore {
    pub fn reads() -> Self {
        Self { fail_reads: true, fail_writes: false }
    }

    pub fn writes() -> Self {
        Self { fail_reads: false, fail_writes: true }
    }
}

#[async_trait]
impl UsageStore for FailingUsageStore {
    async fn read(&self, user: &str, date: NaiveDate) -> Result<UsageRecord> {
        if self.fail_reads {
            return Err(GatewayError::Store("usage db unreachable".into()));
        }
        Ok(UsageRecord::empty(user, date))
    }

    async fn increment(
        &self,
        user: &str,
        date: NaiveDate,
        model: ModelId,
        tokens: u64,
    ) -> Result<UsageRecord> {
        if self.fail_writes {
            return Err(GatewayError::Store("usage db read-only".into()));
        }
        let mut rec = UsageRecord::empty(user, date);
        rec.record(model, tokens);
        Ok(rec)
    }
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
}

pub struct Harness {
    pub gateway: AiGateway,
    pub backend: Arc<ScriptedBackend>,
    pub usage: Arc<InMemoryUsageStore>,
    pub clock: Arc<ManualClock>,
}

pub fn harness(backend: ScriptedBackend, resolver: Arc<dyn TierResolver>) -> Harness {
    harness_with_policy(PolicyEngine::default(), backend, resolver)
}

pub fn harness_with_policy(
    policy: PolicyEngine,
    backend: ScriptedBackend,
    resolver: Arc<dyn TierResolver>,
) -> Harness {
    let backend = Arc::new(backend);
    let usage = Arc::new(InMemoryUsageStore::new());
    let clock = Arc::new(ManualClock::new(day(17)));
    let gateway = AiGateway::new(Arc::new(policy), resolver, backend.clone(), usage.clone())
        .with_clock(clock.clone());
    Harness { gateway, backend, usage, clock }
}

/// user "gold" holds 12,000 (1,000 balance + 11,000 staked); "silver" holds 6,000.
pub fn holdings() -> Arc<StaticHoldings> {
    Arc::new(
        StaticHoldings::new()
            .with("gold", 1_000.0, 11_000.0)
            .with("silver", 6_000.0, 0.0)
            .with("whale", 0.0, 75_000.0),
    )
}

/// Gateway over the default policy and `holdings()` with a caller-chosen usage store.
pub fn gateway_with_store(backend: Arc<ScriptedBackend>, usage: Arc<dyn UsageStore>) -> AiGateway {
    AiGateway::new(Arc::new(PolicyEngine::default()), holdings(), backend, usage)
        .with_clock(Arc::new(ManualClock::new(day(17))))
}
