//! Outbound gateway payloads.

use serde::{Deserialize, Serialize};

use crate::model::ModelId;
use crate::tier::Tier;
use crate::usage::UsageRecord;

/// Successful completion routed through the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayResponse {
    pub response: String,
    /// Model chosen by policy; usage is accounted against it.
    pub model_used: ModelId,
    /// Model that produced `response`. Differs from `model_used` only on fallback.
    pub served_by: ModelId,
    pub tokens_consumed: u64,
    pub credits_remaining: i64,
    pub tier_info: Tier,
    pub fallback_used: bool,
}

/// Read-only usage report for a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageStats {
    pub daily_usage: UsageRecord,
    pub tier: Tier,
    pub upgrade_benefits: Vec<String>,
    pub weighted_cost: u64,
}
