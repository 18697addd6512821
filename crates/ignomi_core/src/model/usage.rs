//! Usage ledger record.
//!
//! # Invariants
//! - A record exists iff the item was launched at least once.
//! - `launch_count` never decreases while the record exists.
//! - `created_at <= last_launch_time` for records written by this crate.

use crate::model::item::ItemId;

/// Persisted launch statistics for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRecord {
    pub item_id: ItemId,
    /// Always `>= 1`.
    pub launch_count: u64,
    /// Unix epoch seconds of the most recent launch.
    pub last_launch_time: i64,
    /// Unix epoch seconds of the first recorded launch.
    pub created_at: i64,
}

impl UsageRecord {
    /// Age of the last launch relative to `now_epoch_secs`, in whole seconds.
    ///
    /// Clock skew that puts the launch in the future counts as age zero.
    pub fn age_secs(&self, now_epoch_secs: i64) -> i64 {
        now_epoch_secs.saturating_sub(self.last_launch_time).max(0)
    }
}
