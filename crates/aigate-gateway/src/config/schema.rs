use std::collections::HashMap;

use serde::Deserialize;

use aigate_core::classify::PromptCategory;
use aigate_core::error::{GatewayError, Result};
use aigate_core::model::ModelId;
use aigate_core::tier::{Tier, TierId, TierTable};

use crate::policy::PolicyEngine;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub policy: PolicySection,

    #[serde(default)]
    pub usage: UsageSection,

    #[serde(default = "default_providers")]
    pub providers: HashMap<ModelId, ProviderConfig>,

    /// Static holdings served by the built-in tier resolver (dev / single node).
    #[serde(default)]
    pub holdings: HashMap<String, HoldingsEntry>,
}

impl GatewayConfig {
    /// Validate every section; run once after parsing.
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(GatewayError::BadRequest(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.gateway.validate()?;
        self.policy.build()?;
        self.usage.validate()?;

        for (model, p) in &self.providers {
            p.validate(*model)?;
        }
        for (user, h) in &self.holdings {
            if !(h.balance.is_finite() && h.staked.is_finite()) {
                return Err(GatewayError::BadRequest(format!(
                    "holdings.{user}: balance and staked must be finite"
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Upper bound on a single completion call, fallback included separately.
    #[serde(default = "default_completion_timeout_ms")]
    pub completion_timeout_ms: u64,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            completion_timeout_ms: default_completion_timeout_ms(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if !(1000..=120000).contains(&self.completion_timeout_ms) {
            return Err(GatewayError::BadRequest(
                "gateway.completion_timeout_ms must be between 1000 and 120000".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_completion_timeout_ms() -> u64 {
    30000
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicySection {
    /// Replaces the built-in tier table when present.
    #[serde(default)]
    pub tiers: Option<Vec<TierConfig>>,

    #[serde(default = "default_routing")]
    pub routing: HashMap<PromptCategory, ModelId>,

    #[serde(default = "default_preference")]
    pub preference: Vec<ModelId>,

    #[serde(default = "default_fallback")]
    pub fallback: Vec<ModelId>,

    #[serde(default = "default_token_divisor")]
    pub token_divisor: u32,

    /// Out-of-band tier grants (user id or address -> tier), e.g. enterprise.
    #[serde(default)]
    pub assignments: HashMap<String, TierId>,
}

impl Default for PolicySection {
    fn default() -> Self {
        Self {
            tiers: None,
            routing: default_routing(),
            preference: default_preference(),
            fallback: default_fallback(),
            token_divisor: default_token_divisor(),
            assignments: HashMap::new(),
        }
    }
}

impl PolicySection {
    /// Validate and compile into the runtime policy engine.
    pub fn build(&self) -> Result<PolicyEngine> {
        let tiers = match &self.tiers {
            None => TierTable::default(),
            Some(list) => TierTable::new(list.iter().cloned().map(Tier::from).collect())?,
        };
        for (user, id) in &self.assignments {
            if tiers.get(*id).is_none() {
                return Err(GatewayError::BadRequest(format!(
                    "policy.assignments.{user} refers to undefined tier {id}"
                )));
            }
        }
        PolicyEngine::new(
            tiers,
            self.routing.clone(),
            self.preference.clone(),
            self.fallback.clone(),
            self.assignments.clone(),
            self.token_divisor,
        )
    }
}

fn default_routing() -> HashMap<PromptCategory, ModelId> {
    HashMap::from([
        (PromptCategory::Code, ModelId::DeepSeek),
        (PromptCategory::Contract, ModelId::OpenAi),
        (PromptCategory::Analysis, ModelId::Claude),
        (PromptCategory::Chat, ModelId::Grok),
        (PromptCategory::Domain, ModelId::Grok),
        (PromptCategory::Governance, ModelId::Claude),
    ])
}
fn default_preference() -> Vec<ModelId> {
    vec![
        ModelId::Claude,
        ModelId::OpenAi,
        ModelId::Poe,
        ModelId::DeepSeek,
        ModelId::Grok,
    ]
}
fn default_fallback() -> Vec<ModelId> {
    vec![ModelId::Grok, ModelId::DeepSeek]
}
fn default_token_divisor() -> u32 {
    4
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TierConfig {
    pub id: TierId,
    pub name: String,
    pub daily_limit: u32,
    pub models: Vec<ModelId>,
    #[serde(default)]
    pub priority_access: bool,
    /// Omit for tiers granted only through `policy.assignments`.
    #[serde(default)]
    pub min_holdings: Option<f64>,
}

impl From<TierConfig> for Tier {
    fn from(c: TierConfig) -> Self {
        Tier {
            id: c.id,
            name: c.name,
            daily_limit: c.daily_limit,
            models: c.models,
            priority_access: c.priority_access,
            min_holdings: c.min_holdings,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UsageSection {
    /// Days of usage records kept before the sweeper drops them.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for UsageSection {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl UsageSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=366).contains(&self.retention_days) {
            return Err(GatewayError::BadRequest(
                "usage.retention_days must be between 1 and 366".into(),
            ));
        }
        if !(60..=86400).contains(&self.sweep_interval_secs) {
            return Err(GatewayError::BadRequest(
                "usage.sweep_interval_secs must be between 60 and 86400".into(),
            ));
        }
        Ok(())
    }
}

fn default_retention_days() -> u32 {
    7
}
fn default_sweep_interval_secs() -> u64 {
    3600
}

/// Wire format spoken by an upstream provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStyle {
    /// `POST /chat/completions` with `choices[0].message.content`.
    OpenAi,
    /// `POST /messages` with `content[0].text`.
    Anthropic,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    pub endpoint: String,
    /// Upstream model name sent in the request body.
    pub model: String,
    #[serde(default = "default_style")]
    pub style: ApiStyle,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl ProviderConfig {
    fn validate(&self, model: ModelId) -> Result<()> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(GatewayError::BadRequest(format!(
                "providers.{model}.endpoint must be an http(s) url"
            )));
        }
        if self.api_key_env.is_empty() {
            return Err(GatewayError::BadRequest(format!(
                "providers.{model}.api_key_env must not be empty"
            )));
        }
        if !(1..=32000).contains(&self.max_tokens) {
            return Err(GatewayError::BadRequest(format!(
                "providers.{model}.max_tokens must be between 1 and 32000"
            )));
        }
        Ok(())
    }
}

fn default_style() -> ApiStyle {
    ApiStyle::OpenAi
}
fn default_max_tokens() -> u32 {
    500
}

fn default_providers() -> HashMap<ModelId, ProviderConfig> {
    let p = |endpoint: &str, model: &str, style, key: &str| ProviderConfig {
        endpoint: endpoint.into(),
        model: model.into(),
        style,
        api_key_env: key.into(),
        max_tokens: default_max_tokens(),
    };
    HashMap::from([
        (
            ModelId::Grok,
            p("https://api.x.ai/v1/chat/completions", "grok-2-1212", ApiStyle::OpenAi, "XAI_API_KEY"),
        ),
        (
            ModelId::OpenAi,
            p("https://api.openai.com/v1/chat/completions", "gpt-4o", ApiStyle::OpenAi, "OPENAI_API_KEY"),
        ),
        (
            ModelId::Claude,
            p("https://api.anthropic.com/v1/messages", "claude-3-opus-20240229", ApiStyle::Anthropic, "ANTHROPIC_API_KEY"),
        ),
        (
            ModelId::DeepSeek,
            p("https://api.deepseek.com/v1/chat/completions", "deepseek-chat", ApiStyle::OpenAi, "DEEPSEEK_API_KEY"),
        ),
        (
            ModelId::Poe,
            p("https://api.poe.com/v1/chat/completions", "claude-3-opus", ApiStyle::OpenAi, "POE_API_KEY"),
        ),
    ])
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HoldingsEntry {
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub staked: f64,
}
