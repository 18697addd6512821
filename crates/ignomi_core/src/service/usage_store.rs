//! Usage store: the ranking source of truth.
//!
//! # Responsibility
//! - Record launches durably and broadcast `usage-changed`.
//! - Serve lookups, listings, totals and frecency rankings.
//!
//! # Invariants
//! - Write failures are returned to the caller; a launch is never dropped
//!   silently.
//! - Read failures degrade to empty results with a warning.
//! - By the time a mutating call returns, every `usage-changed` subscriber
//!   has run.

use crate::bus::{ChangeBus, ChangeEvent};
use crate::clock::Clock;
use crate::error::LauncherResult;
use crate::model::item::{normalize_item_id, ItemId};
use crate::model::usage::UsageRecord;
use crate::ranking::frecency::Ranking;
use crate::repo::usage_repo::UsageRepository;
use log::{debug, error, info, warn};
use std::rc::Rc;

/// Which records `clear_stats` removes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearScope {
    Item(ItemId),
    All,
}

impl ClearScope {
    fn describe(&self) -> &str {
        match self {
            Self::Item(item_id) => item_id.as_str(),
            Self::All => "all",
        }
    }
}

/// Use-case service over a usage repository.
pub struct UsageStore<R: UsageRepository> {
    repo: R,
    bus: Rc<ChangeBus>,
    clock: Rc<dyn Clock>,
}

impl<R: UsageRepository> UsageStore<R> {
    pub fn new(repo: R, bus: Rc<ChangeBus>, clock: Rc<dyn Clock>) -> Self {
        Self { repo, bus, clock }
    }

    /// Records one launch of `item_id` at the clock's current time.
    ///
    /// # Errors
    /// - `InvalidArgument` for a blank id.
    /// - `StorageUnavailable` when the ledger cannot be written.
    pub fn record_launch(&self, item_id: &str) -> LauncherResult<UsageRecord> {
        let item_id = normalize_item_id(item_id)?;
        let now = self.clock.epoch_secs();

        let record = self.repo.record_launch(&item_id, now).map_err(|err| {
            error!(
                "event=record_launch module=usage status=error item_id={} error={}",
                item_id, err
            );
            err
        })?;
        debug!(
            "event=record_launch module=usage status=ok item_id={} launch_count={}",
            record.item_id, record.launch_count
        );

        self.bus.publish(&ChangeEvent::UsageChanged {
            item_id: Some(item_id),
        });
        Ok(record)
    }

    /// Returns the record for `item_id`, or `None` when absent or unreadable.
    pub fn get_record(&self, item_id: &str) -> Option<UsageRecord> {
        let item_id = normalize_item_id(item_id).ok()?;
        match self.repo.get_record(&item_id) {
            Ok(record) => record,
            Err(err) => {
                warn!(
                    "event=get_record module=usage status=degraded item_id={} error={}",
                    item_id, err
                );
                None
            }
        }
    }

    /// Returns every record, or an empty list when the ledger is unreadable.
    pub fn get_all_records(&self) -> Vec<UsageRecord> {
        self.read_records(0)
    }

    /// Deletes the selected record(s) and broadcasts `usage-changed`.
    ///
    /// Returns the number of deleted records.
    pub fn clear_stats(&self, scope: &ClearScope) -> LauncherResult<usize> {
        let (deleted, event) = match scope {
            ClearScope::Item(raw) => {
                let item_id = normalize_item_id(raw)?;
                let deleted = usize::from(self.repo.delete_record(&item_id)?);
                (
                    deleted,
                    ChangeEvent::UsageChanged {
                        item_id: Some(item_id),
                    },
                )
            }
            ClearScope::All => (
                self.repo.delete_all()?,
                ChangeEvent::UsageChanged { item_id: None },
            ),
        };

        info!(
            "event=clear_stats module=usage status=ok scope={} deleted={}",
            scope.describe(),
            deleted
        );
        self.bus.publish(&event);
        Ok(deleted)
    }

    /// Sum of launch counts; zero when the ledger is unreadable.
    pub fn total_launches(&self) -> u64 {
        self.repo.total_launches().unwrap_or_else(|err| {
            warn!(
                "event=total_launches module=usage status=degraded error={}",
                err
            );
            0
        })
    }

    /// Ranks records with at least `min_launches` launches, best first.
    pub fn top_apps(&self, limit: usize, min_launches: u64) -> Ranking {
        let now = self.clock.epoch_secs();
        Ranking::new(self.read_records(min_launches), now, min_launches, limit)
    }

    fn read_records(&self, min_launches: u64) -> Vec<UsageRecord> {
        self.repo.list_records(min_launches).unwrap_or_else(|err| {
            warn!(
                "event=list_records module=usage status=degraded min_launches={} error={}",
                min_launches, err
            );
            Vec::new()
        })
    }
}
