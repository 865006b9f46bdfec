use std::collections::HashMap;

use async_trait::async_trait;

use aigate_core::error::Result;

use super::{Holdings, Identity, TierResolver};
use crate::config::HoldingsEntry;

/// Holdings served from a fixed table keyed by user id or wallet address.
/// Unknown callers hold nothing.
#[derive(Debug, Default)]
pub struct StaticHoldings {
    entries: HashMap<String, Holdings>,
}

impl StaticHoldings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table from the `holdings` config section.
    pub fn from_config(entries: &HashMap<String, HoldingsEntry>) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(k, e)| (k.clone(), Holdings { balance: e.balance, staked: e.staked }))
                .collect(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, balance: f64, staked: f64) -> Self {
        self.entries.insert(key.into(), Holdings { balance, staked });
        self
    }
}

#[async_trait]
impl TierResolver for StaticHoldings {
    async fn holdings(&self, who: Identity<'_>) -> Result<Holdings> {
        // user id takes precedence over address
        let found = who
            .user_id
            .and_then(|id| self.entries.get(id))
            .or_else(|| who.address.and_then(|a| self.entries.get(a)));
        Ok(found.copied().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn looks_up_by_user_then_address() {
        let table = StaticHoldings::new()
            .with("7", 1_000.0, 11_000.0)
            .with("0xabc", 500.0, 0.0);

        let by_id = table
            .holdings(Identity { user_id: Some("7"), address: Some("0xabc") })
            .await
            .unwrap_or_default();
        assert_eq!(by_id.total(), 12_000.0);

        let by_addr = table
            .holdings(Identity { user_id: Some("nobody"), address: Some("0xabc") })
            .await
            .unwrap_or_default();
        assert_eq!(by_addr.total(), 500.0);

        let unknown = table.holdings(Identity::default()).await.unwrap_or_default();
        assert_eq!(unknown, Holdings::default());
    }
}
