//! Access tiers and the holdings ladder.
//!
//! A tier fixes the daily prompt limit and the set of models a caller may
//! reach. Ladder tiers are granted by token holdings (balance + staked);
//! tiers without a threshold (enterprise) are only assigned out-of-band.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, Result};
use crate::model::ModelId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierId {
    Free,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Enterprise,
}

impl TierId {
    pub fn as_str(self) -> &'static str {
        match self {
            TierId::Free => "free",
            TierId::Bronze => "bronze",
            TierId::Silver => "silver",
            TierId::Gold => "gold",
            TierId::Platinum => "platinum",
            TierId::Enterprise => "enterprise",
        }
    }

    /// Advisory upgrade text for the next tier up. Empty from gold upward.
    pub fn upgrade_benefits(self) -> Vec<String> {
        let lines: &[&str] = match self {
            TierId::Free => &[
                "10x more daily prompts with Bronze tier",
                "Access to Poe AI models",
                "Priority support",
            ],
            TierId::Bronze => &[
                "Access to GPT-4o with Silver tier",
                "Double daily prompt limit",
                "Priority queue access",
            ],
            TierId::Silver => &[
                "Access to Claude-4 with Gold tier",
                "2.5x more daily prompts",
                "Advanced analytics",
            ],
            TierId::Gold | TierId::Platinum | TierId::Enterprise => &[],
        };
        lines.iter().map(|s| s.to_string()).collect()
    }
}

impl fmt::Display for TierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable access class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub id: TierId,
    /// Display name, e.g. "Gold (10,000+ NXD)".
    pub name: String,
    pub daily_limit: u32,
    /// Ordered by preference; never empty in a validated table.
    pub models: Vec<ModelId>,
    /// Reserved for priority queuing; not enforced.
    pub priority_access: bool,
    /// Inclusive holdings threshold. `None` = out-of-band only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_holdings: Option<f64>,
}

impl Tier {
    /// Whether this tier may use `model`.
    pub fn allows(&self, model: ModelId) -> bool {
        self.models.contains(&model)
    }
}

/// Validated set of tiers. Read-only after construction.
#[derive(Debug, Clone)]
pub struct TierTable {
    tiers: Vec<Tier>,
    /// Indices of ladder tiers, highest threshold first.
    ladder: Vec<usize>,
    free: usize,
}

impl TierTable {
    /// Validate the table and build the holdings ladder.
    pub fn new(tiers: Vec<Tier>) -> Result<Self> {
        for (i, t) in tiers.iter().enumerate() {
            if tiers[..i].iter().any(|o| o.id == t.id) {
                return Err(GatewayError::BadRequest(format!("duplicate tier: {}", t.id)));
            }
            if t.daily_limit == 0 {
                return Err(GatewayError::BadRequest(format!(
                    "tier {}: daily_limit must be positive",
                    t.id
                )));
            }
            if t.models.is_empty() {
                return Err(GatewayError::BadRequest(format!("tier {}: models must not be empty", t.id)));
            }
            if let Some(h) = t.min_holdings {
                if !h.is_finite() || h < 0.0 {
                    return Err(GatewayError::BadRequest(format!(
                        "tier {}: min_holdings must be a non-negative number",
                        t.id
                    )));
                }
            }
        }
        let free = tiers
            .iter()
            .position(|t| t.id == TierId::Free)
            .ok_or_else(|| GatewayError::BadRequest("tier table must define free".into()))?;

        let mut ladder: Vec<usize> = (0..tiers.len())
            .filter(|&i| tiers[i].min_holdings.is_some())
            .collect();
        ladder.sort_by(|&a, &b| {
            let (ha, hb) = (tiers[a].min_holdings.unwrap_or(0.0), tiers[b].min_holdings.unwrap_or(0.0));
            hb.total_cmp(&ha)
        });

        // Walking down the ladder, limits and model sets may only shrink.
        for pair in ladder.windows(2) {
            let (upper, lower) = (&tiers[pair[0]], &tiers[pair[1]]);
            if upper.min_holdings == lower.min_holdings {
                return Err(GatewayError::BadRequest(format!(
                    "tiers {} and {} share a holdings threshold",
                    upper.id, lower.id
                )));
            }
            if upper.daily_limit < lower.daily_limit {
                return Err(GatewayError::BadRequest(format!(
                    "tier {} has a lower daily_limit than {}",
                    upper.id, lower.id
                )));
            }
            if let Some(m) = lower.models.iter().find(|m| !upper.allows(**m)) {
                return Err(GatewayError::BadRequest(format!(
                    "tier {} must include model {m} offered by {}",
                    upper.id, lower.id
                )));
            }
        }

        Ok(Self { tiers, ladder, free })
    }

    /// Tier by id, if the table defines it.
    pub fn get(&self, id: TierId) -> Option<&Tier> {
        self.tiers.iter().find(|t| t.id == id)
    }

    /// Tier for callers with no identity or nothing matching on the ladder.
    pub fn free(&self) -> &Tier {
        &self.tiers[self.free]
    }

    /// Highest ladder tier whose threshold `holdings` reaches.
    pub fn for_holdings(&self, holdings: f64) -> &Tier {
        self.ladder
            .iter()
            .map(|&i| &self.tiers[i])
            .find(|t| t.min_holdings.is_some_and(|min| holdings >= min))
            .unwrap_or_else(|| self.free())
    }

    /// All tiers in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Tier> {
        self.tiers.iter()
    }
}

impl Default for TierTable {
    fn default() -> Self {
        let tier = |id, name: &str, daily_limit, models: &[ModelId], priority_access, min: Option<f64>| Tier {
            id,
            name: name.to_string(),
            daily_limit,
            models: models.to_vec(),
            priority_access,
            min_holdings: min,
        };
        use ModelId::*;
        let all = [Grok, DeepSeek, Poe, OpenAi, Claude];
        let tiers = vec![
            tier(TierId::Free, "Free", 5, &all[..2], false, Some(0.0)),
            tier(TierId::Bronze, "Bronze (1,000+ NXD)", 15, &all[..3], false, Some(1_000.0)),
            tier(TierId::Silver, "Silver (5,000+ NXD)", 30, &all[..4], true, Some(5_000.0)),
            tier(TierId::Gold, "Gold (10,000+ NXD)", 75, &all, true, Some(10_000.0)),
            tier(TierId::Platinum, "Platinum (50,000+ NXD)", 200, &all, true, Some(50_000.0)),
            tier(TierId::Enterprise, "Enterprise/White Label", 1000, &all, true, None),
        ];
        Self {
            tiers,
            ladder: (0..5).rev().collect(),
            free: 0,
        }
    }
}
