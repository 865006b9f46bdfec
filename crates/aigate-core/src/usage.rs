//! Per-user, per-day usage accounting.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::ModelId;

/// Usage for one (user, calendar day). Absent records read as all-zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub user: String,
    pub date: NaiveDate,
    pub prompts_used: u32,
    pub tokens_consumed: u64,
    pub models_used: BTreeMap<ModelId, u32>,
}

impl UsageRecord {
    /// All-zero record for (user, date).
    pub fn empty(user: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            user: user.into(),
            date,
            prompts_used: 0,
            tokens_consumed: 0,
            models_used: BTreeMap::new(),
        }
    }

    /// Count one prompt served by `model`.
    pub fn record(&mut self, model: ModelId, tokens: u64) {
        self.prompts_used = self.prompts_used.saturating_add(1);
        self.tokens_consumed = self.tokens_consumed.saturating_add(tokens);
        *self.models_used.entry(model).or_insert(0) += 1;
    }

    /// Sum of per-model cost weights. Advisory, for billing reports.
    pub fn weighted_cost(&self) -> u64 {
        self.models_used
            .iter()
            .map(|(m, n)| u64::from(m.cost_weight()) * u64::from(*n))
            .sum()
    }
}

/// Approximate token count: `ceil(chars / divisor)`.
pub fn estimate_tokens(text: &str, divisor: u32) -> u64 {
    let chars = text.chars().count() as u64;
    chars.div_ceil(u64::from(divisor.max(1)))
}
