//! History aggregation: streaks, free-tier locking and totals.
//!
//! Everything here is recomputed from the full session history on demand;
//! nothing is cached between calls.

mod aggregator;
mod streak;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

pub use aggregator::{HistoryAggregator, HistorySnapshot};
pub use streak::{current_streak, longest_streak};

/// Days of history visible on the free tier.
pub const HISTORY_LIMIT_DAYS: u32 = 90;

/// Answers whether premium history access is unlocked.
pub trait PremiumStatus {
    fn is_premium_active(&self) -> bool;
}

impl PremiumStatus for bool {
    fn is_premium_active(&self) -> bool {
        *self
    }
}

impl<P: PremiumStatus + ?Sized> PremiumStatus for &P {
    fn is_premium_active(&self) -> bool {
        (**self).is_premium_active()
    }
}

/// Free-tier retention window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPolicy {
    pub retention_days: u32,
}

impl Default for HistoryPolicy {
    fn default() -> Self {
        Self::new(HISTORY_LIMIT_DAYS)
    }
}

impl HistoryPolicy {
    pub fn new(retention_days: u32) -> Self {
        Self { retention_days }
    }

    /// First visible day: `today` minus the retention window.
    pub fn cutoff(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_days(Days::new(u64::from(self.retention_days)))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Dates strictly before the cutoff are locked unless premium is active.
    pub fn is_locked(&self, date: NaiveDate, today: NaiveDate, premium: bool) -> bool {
        !premium && date < self.cutoff(today)
    }
}
