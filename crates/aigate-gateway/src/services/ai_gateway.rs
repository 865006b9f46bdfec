//! AI request gateway service.
//!
//! Per request: resolve tier, check today's quota, classify the prompt,
//! select a model, call the backend (with at most one fallback), record
//! usage and report remaining credits.
//!
//! The quota check and the usage increment are not wrapped in a lock.
//! Concurrent requests from one user at the boundary may all pass the check,
//! so a day can overshoot by the number of requests in flight. The store's
//! per-key atomic increment keeps the count itself exact.

use std::sync::Arc;
use std::time::{Duration, Instant};

use aigate_core::classify::classify;
use aigate_core::error::{BackendError, GatewayError, Result};
use aigate_core::model::ModelId;
use aigate_core::protocol::{user_usage_key, GatewayRequest, GatewayResponse, UsageStats};
use aigate_core::tier::Tier;

use crate::backend::{CompletionBackend, CompletionRequest};
use crate::holdings::{Identity, TierResolver};
use crate::obs::GatewayMetrics;
use crate::policy::PolicyEngine;
use crate::store::{Clock, SystemClock, UsageStore};

pub const DEFAULT_COMPLETION_TIMEOUT: Duration = Duration::from_secs(30);

pub struct AiGateway {
    policy: Arc<PolicyEngine>,
    resolver: Arc<dyn TierResolver>,
    backend: Arc<dyn CompletionBackend>,
    usage: Arc<dyn UsageStore>,
    clock: Arc<dyn Clock>,
    metrics: Arc<GatewayMetrics>,
    completion_timeout: Duration,
}

impl AiGateway {
    /// Gateway with the system clock, fresh metrics and the default timeout.
    pub fn new(
        policy: Arc<PolicyEngine>,
        resolver: Arc<dyn TierResolver>,
        backend: Arc<dyn CompletionBackend>,
        usage: Arc<dyn UsageStore>,
    ) -> Self {
        Self {
            policy,
            resolver,
            backend,
            usage,
            clock: Arc::new(SystemClock),
            metrics: Arc::new(GatewayMetrics::default()),
            completion_timeout: DEFAULT_COMPLETION_TIMEOUT,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<GatewayMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_completion_timeout(mut self, timeout: Duration) -> Self {
        self.completion_timeout = timeout;
        self
    }

    pub fn policy(&self) -> &PolicyEngine {
        &self.policy
    }

    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Resolve the caller's tier. Never fails: lookup errors degrade to free.
    pub async fn resolve_tier(&self, who: Identity<'_>) -> Tier {
        if who.is_anonymous() {
            return self.policy.free_tier().clone();
        }

        let assigned = who
            .user_id
            .and_then(|id| self.policy.assigned_tier(id))
            .or_else(|| who.address.and_then(|a| self.policy.assigned_tier(a)));
        if let Some(t) = assigned {
            return t.clone();
        }

        match self.resolver.holdings(who).await {
            Ok(h) => self.policy.tier_for_holdings(h.total()).clone(),
            Err(e) => {
                tracing::warn!(user = ?who.user_id, address = ?who.address, error = %e, "tier lookup failed; using free tier");
                self.metrics.tier_lookup_failures.inc(&[]);
                self.policy.free_tier().clone()
            }
        }
    }

    /// Serve one prompt end to end. Quota rejections never reach the backend.
    pub async fn process_request(&self, req: GatewayRequest) -> Result<GatewayResponse> {
        req.validate()?;

        let who = Identity {
            user_id: req.user_id.as_deref(),
            address: req.user_address.as_deref(),
        };
        let tier = self.resolve_tier(who).await;
        let user = req.usage_key();
        let today = self.clock.today();
        let usage = self.usage.read(&user, today).await?;

        if usage.prompts_used >= tier.daily_limit {
            tracing::info!(%user, tier = %tier.id, limit = tier.daily_limit, "daily quota exhausted");
            self.metrics.quota_rejections.inc(&[("tier", tier.id.as_str())]);
            return Err(GatewayError::QuotaExceeded { limit: tier.daily_limit });
        }

        let category = classify(&req.prompt);
        let selection = self.policy.select_model(req.preferred_model, category, &tier)?;
        let selected = selection.model;

        let (response, served_by) = match self.invoke(selected, &req).await {
            Ok(text) => (text, selected),
            Err(cause) => match self.policy.fallback_model(&tier, selected) {
                Some(fb) => {
                    tracing::warn!(%user, model = %selected, fallback = %fb, error = %cause, "model failed; retrying on fallback");
                    self.metrics
                        .fallbacks
                        .inc(&[("from", selected.as_str()), ("to", fb.as_str())]);
                    match self.invoke(fb, &req).await {
                        Ok(text) => (text, fb),
                        Err(fb_err) => {
                            tracing::warn!(%user, fallback = %fb, error = %fb_err, "fallback model failed");
                            return Err(self.upstream_failure(&tier, selected, cause));
                        }
                    }
                }
                None => return Err(self.upstream_failure(&tier, selected, cause)),
            },
        };
        let fallback_used = served_by != selected;

        let tokens = self.policy.estimate_tokens(&req.prompt, &response);
        if let Err(e) = self.usage.increment(&user, today, selected, tokens).await {
            // The completion is already paid for; report it rather than fail.
            tracing::warn!(%user, error = %e, "usage increment failed");
            self.metrics.usage_write_failures.inc(&[]);
        }

        let credits_remaining = i64::from(tier.daily_limit) - (i64::from(usage.prompts_used) + 1);

        self.metrics.requests.inc(&[
            ("tier", tier.id.as_str()),
            ("model", selected.as_str()),
            ("outcome", if fallback_used { "fallback" } else { "ok" }),
        ]);
        self.metrics.tokens.add(&[("model", served_by.as_str())], tokens);
        tracing::debug!(
            %user,
            tier = %tier.id,
            %category,
            model = %selected,
            reason = selection.reason.as_str(),
            %served_by,
            tokens,
            credits_remaining,
            "request served"
        );

        Ok(GatewayResponse {
            response,
            model_used: selected,
            served_by,
            tokens_consumed: tokens,
            credits_remaining,
            tier_info: tier,
            fallback_used,
        })
    }

    /// Today's usage, tier and advisory upgrade text for a user.
    pub async fn usage_stats(&self, user_id: &str) -> Result<UsageStats> {
        let who = Identity {
            user_id: Some(user_id),
            address: None,
        };
        let tier = self.resolve_tier(who).await;
        let daily_usage = self
            .usage
            .read(&user_usage_key(user_id), self.clock.today())
            .await?;
        let weighted_cost = daily_usage.weighted_cost();

        Ok(UsageStats {
            daily_usage,
            upgrade_benefits: tier.id.upgrade_benefits(),
            tier,
            weighted_cost,
        })
    }

    async fn invoke(&self, model: ModelId, req: &GatewayRequest) -> std::result::Result<String, BackendError> {
        let call = self.backend.complete(CompletionRequest {
            model,
            prompt: &req.prompt,
            context: req.context.as_deref(),
            message_type: req.message_type.as_deref(),
        });

        let started = Instant::now();
        let result = match tokio::time::timeout(self.completion_timeout, call).await {
            Ok(r) => r,
            Err(_) => Err(BackendError::Timeout(self.completion_timeout.as_millis() as u64)),
        };
        self.metrics.completion_duration.observe(
            &[
                ("model", model.as_str()),
                ("result", if result.is_ok() { "ok" } else { "error" }),
            ],
            started.elapsed(),
        );
        result
    }

    fn upstream_failure(&self, tier: &Tier, model: ModelId, cause: BackendError) -> GatewayError {
        self.metrics.requests.inc(&[
            ("tier", tier.id.as_str()),
            ("model", model.as_str()),
            ("outcome", "upstream_error"),
        ]);
        GatewayError::Upstream { model, cause }
    }
}
