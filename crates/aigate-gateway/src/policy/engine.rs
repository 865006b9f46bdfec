use std::collections::HashMap;

use aigate_core::classify::PromptCategory;
use aigate_core::error::{GatewayError, Result};
use aigate_core::model::{ModelId, PreferredModel};
use aigate_core::tier::{Tier, TierId, TierTable};
use aigate_core::usage::estimate_tokens;

/// Why a model was picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionReason {
    /// Caller named the model and the tier allows it.
    Explicit,
    /// Routed from the prompt category.
    Routed,
    /// Category target not in tier; best model the tier offers.
    TierPreference,
}

impl SelectionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SelectionReason::Explicit => "explicit",
            SelectionReason::Routed => "routed",
            SelectionReason::TierPreference => "tier_preference",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub model: ModelId,
    pub reason: SelectionReason,
}

/// Compiled, read-only policy tables.
/// Construct once at startup, then share via Arc.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    tiers: TierTable,
    routing: HashMap<PromptCategory, ModelId>,
    preference: Vec<ModelId>,
    fallback: Vec<ModelId>,
    assignments: HashMap<String, TierId>,
    token_divisor: u32,
}

impl PolicyEngine {
    /// Compile and cross-check the policy tables.
    pub fn new(
        tiers: TierTable,
        routing: HashMap<PromptCategory, ModelId>,
        preference: Vec<ModelId>,
        fallback: Vec<ModelId>,
        assignments: HashMap<String, TierId>,
        token_divisor: u32,
    ) -> Result<Self> {
        const CATEGORIES: [PromptCategory; 6] = [
            PromptCategory::Contract,
            PromptCategory::Code,
            PromptCategory::Analysis,
            PromptCategory::Domain,
            PromptCategory::Governance,
            PromptCategory::Chat,
        ];
        if let Some(missing) = CATEGORIES.iter().find(|c| !routing.contains_key(c)) {
            return Err(GatewayError::BadRequest(format!(
                "policy.routing is missing category {missing}"
            )));
        }
        if preference.is_empty() {
            return Err(GatewayError::BadRequest("policy.preference must not be empty".into()));
        }
        if has_duplicates(&preference) || has_duplicates(&fallback) {
            return Err(GatewayError::BadRequest(
                "policy.preference and policy.fallback must not repeat models".into(),
            ));
        }
        // Every tier must be able to satisfy step 3 of selection.
        for t in tiers.iter() {
            if !preference.iter().any(|m| t.allows(*m)) {
                return Err(GatewayError::BadRequest(format!(
                    "tier {} offers no model listed in policy.preference",
                    t.id
                )));
            }
        }
        if token_divisor == 0 {
            return Err(GatewayError::BadRequest("policy.token_divisor must be positive".into()));
        }

        Ok(Self {
            tiers,
            routing,
            preference,
            fallback,
            assignments,
            token_divisor,
        })
    }

    /// Compiled tier table.
    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }

    /// Tier for unidentified callers and failed lookups.
    pub fn free_tier(&self) -> &Tier {
        self.tiers.free()
    }

    /// Out-of-band grant for this user key, if any.
    pub fn assigned_tier(&self, key: &str) -> Option<&Tier> {
        self.assignments.get(key).and_then(|id| self.tiers.get(*id))
    }

    /// Highest tier on the holdings ladder that `holdings` reaches.
    pub fn tier_for_holdings(&self, holdings: f64) -> &Tier {
        self.tiers.for_holdings(holdings)
    }

    /// Pick the model for a request.
    ///
    /// Order: explicit caller choice, then the category route, then the first
    /// model in the global preference order the tier offers.
    pub fn select_model(
        &self,
        preferred: PreferredModel,
        category: PromptCategory,
        tier: &Tier,
    ) -> Result<Selection> {
        if let Some(m) = preferred.model() {
            if tier.allows(m) {
                return Ok(Selection { model: m, reason: SelectionReason::Explicit });
            }
        }

        if let Some(&m) = self.routing.get(&category) {
            if tier.allows(m) {
                return Ok(Selection { model: m, reason: SelectionReason::Routed });
            }
        }

        self.preference
            .iter()
            .copied()
            .find(|m| tier.allows(*m))
            .map(|model| Selection { model, reason: SelectionReason::TierPreference })
            .ok_or(GatewayError::NoModelAvailable { tier: tier.id })
    }

    /// Baseline model to retry on after `failed` errored, if one exists.
    pub fn fallback_model(&self, tier: &Tier, failed: ModelId) -> Option<ModelId> {
        self.fallback
            .iter()
            .copied()
            .find(|m| tier.allows(*m))
            .filter(|m| *m != failed)
    }

    /// Token estimate over prompt and response text.
    pub fn estimate_tokens(&self, prompt: &str, response: &str) -> u64 {
        let mut text = String::with_capacity(prompt.len() + response.len());
        text.push_str(prompt);
        text.push_str(response);
        estimate_tokens(&text, self.token_divisor)
    }
}

impl Default for PolicyEngine {
    fn default() -> Self {
        use ModelId::*;
        Self {
            tiers: TierTable::default(),
            routing: HashMap::from([
                (PromptCategory::Code, DeepSeek),
                (PromptCategory::Contract, OpenAi),
                (PromptCategory::Analysis, Claude),
                (PromptCategory::Chat, Grok),
                (PromptCategory::Domain, Grok),
                (PromptCategory::Governance, Claude),
            ]),
            preference: vec![Claude, OpenAi, Poe, DeepSeek, Grok],
            fallback: vec![Grok, DeepSeek],
            assignments: HashMap::new(),
            token_divisor: 4,
        }
    }
}

fn has_duplicates(models: &[ModelId]) -> bool {
    models
        .iter()
        .enumerate()
        .any(|(i, m)| models[..i].contains(m))
}
