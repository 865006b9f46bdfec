//! Token holdings lookup used for tier resolution.

pub mod static_table;

use async_trait::async_trait;

use aigate_core::error::Result;

pub use static_table::StaticHoldings;

/// Caller identity as supplied on the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity<'a> {
    pub user_id: Option<&'a str>,
    pub address: Option<&'a str>,
}

impl Identity<'_> {
    /// No usable id and no usable address.
    pub fn is_anonymous(&self) -> bool {
        self.user_id.map_or(true, str::is_empty) && self.address.map_or(true, str::is_empty)
    }
}

/// On-chain balance plus staked amount, in whole NXD.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Holdings {
    pub balance: f64,
    pub staked: f64,
}

impl Holdings {
    /// Balance plus staked; the figure compared against tier thresholds.
    pub fn total(&self) -> f64 {
        self.balance + self.staked
    }
}

/// Holdings lookup. Errors are tolerated by the gateway: a failed lookup
/// counts as zero holdings.
#[async_trait]
pub trait TierResolver: Send + Sync {
    async fn holdings(&self, who: Identity<'_>) -> Result<Holdings>;
}
