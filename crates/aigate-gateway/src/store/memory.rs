use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use dashmap::DashMap;
use tokio::task::JoinHandle;

use aigate_core::error::Result;
use aigate_core::model::ModelId;
use aigate_core::usage::UsageRecord;

use super::{Clock, UsageStore};

/// Process-local usage store.
/// - `(user, date) -> UsageRecord`
///
/// Increments mutate through the map entry, which holds the shard lock, so
/// concurrent increments on one key never lose updates.
#[derive(Default)]
pub struct InMemoryUsageStore {
    records: DashMap<(String, NaiveDate), UsageRecord>,
}

impl InMemoryUsageStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Overwrite a record (seeding / admin correction).
    pub fn put(&self, record: UsageRecord) {
        self.records
            .insert((record.user.clone(), record.date), record);
    }

    /// Drop every record dated before `cutoff`. Returns how many went.
    pub fn purge_before(&self, cutoff: NaiveDate) -> usize {
        let before = self.records.len();
        self.records.retain(|(_, date), _| *date >= cutoff);
        before.saturating_sub(self.records.len())
    }

    /// Number of (user, date) records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Periodically drop records older than `retention_days` days.
pub fn spawn_retention_sweeper(
    store: Arc<InMemoryUsageStore>,
    clock: Arc<dyn Clock>,
    retention_days: u32,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(every);
        loop {
            tick.tick().await;
            let Some(cutoff) = clock.today().checked_sub_days(Days::new(u64::from(retention_days))) else {
                continue;
            };
            let removed = store.purge_before(cutoff);
            if removed > 0 {
                tracing::info!(removed, %cutoff, "usage records expired");
            }
        }
    })
}

#[async_trait]
impl UsageStore for InMemoryUsageStore {
    async fn read(&self, user: &str, date: NaiveDate) -> Result<UsageRecord> {
        Ok(self
            .records
            .get(&(user.to_string(), date))
            .map(|r| r.value().clone())
            .unwrap_or_else(|| UsageRecord::empty(user, date)))
    }

    async fn increment(
        &self,
        user: &str,
        date: NaiveDate,
        model: ModelId,
        tokens: u64,
    ) -> Result<UsageRecord> {
        let mut entry = self
            .records
            .entry((user.to_string(), date))
            .or_insert_with(|| UsageRecord::empty(user, date));
        entry.record(model, tokens);
        Ok(entry.value().clone())
    }
}
