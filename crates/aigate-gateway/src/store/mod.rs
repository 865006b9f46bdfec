//! Usage storage and the calendar it is keyed by.
//!
//! The store is the only shared mutable state in the gateway. Records are
//! keyed by (user, date) so a new day starts from an absent (all-zero)
//! record without any explicit reset.

pub mod memory;

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use aigate_core::error::Result;
use aigate_core::model::ModelId;
use aigate_core::usage::UsageRecord;

pub use memory::{spawn_retention_sweeper, InMemoryUsageStore};

#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Record for (user, date); all-zero when none was written yet.
    async fn read(&self, user: &str, date: NaiveDate) -> Result<UsageRecord>;

    /// Count one prompt against (user, date) and return the updated record.
    /// Must be atomic per key; independent keys must not interfere.
    async fn increment(
        &self,
        user: &str,
        date: NaiveDate,
        model: ModelId,
        tokens: u64,
    ) -> Result<UsageRecord>;
}

/// Source of "today" for usage keys.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// UTC calendar day.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Clock pinned to a settable date.
#[derive(Debug)]
pub struct ManualClock {
    date: Mutex<NaiveDate>,
}

impl ManualClock {
    pub fn new(date: NaiveDate) -> Self {
        Self { date: Mutex::new(date) }
    }

    /// Move the clock to `date`.
    pub fn set(&self, date: NaiveDate) {
        if let Ok(mut g) = self.date.lock() {
            *g = date;
        }
    }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate {
        // Poisoned lock cannot hold a torn NaiveDate; read through it.
        match self.date.lock() {
            Ok(g) => *g,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
