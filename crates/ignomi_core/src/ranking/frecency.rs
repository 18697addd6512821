//! Frecency scoring: `score = launch_count * recency_weight(age)`.
//!
//! | age of last launch | weight |
//! |--------------------|--------|
//! | < 4 days           | 100    |
//! | < 14 days          | 70     |
//! | < 31 days          | 50     |
//! | < 90 days          | 30     |
//! | older              | 10     |
//!
//! # Invariants
//! - Ordering is total: score desc, then last launch desc, then item id asc.
//! - Records below `min_launches` are excluded, not ranked low.

use crate::model::item::ItemId;
use crate::model::usage::UsageRecord;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Upper age bound (exclusive, in days) and weight for each bucket.
const RECENCY_BUCKETS: &[(i64, u64)] = &[(4, 100), (14, 70), (31, 50), (90, 30)];
const STALE_WEIGHT: u64 = 10;

/// Derived ranking entry; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrecencyScore {
    pub item_id: ItemId,
    pub score: u64,
    pub launch_count: u64,
    pub last_launch_time: i64,
}

/// Returns the recency multiplier for a launch `age_secs` old.
pub fn recency_weight(age_secs: i64) -> u64 {
    RECENCY_BUCKETS
        .iter()
        .find(|(max_days, _)| age_secs < max_days * SECONDS_PER_DAY)
        .map_or(STALE_WEIGHT, |(_, weight)| *weight)
}

/// Scores one record at `now_epoch_secs`.
pub fn score_record(record: &UsageRecord, now_epoch_secs: i64) -> FrecencyScore {
    let weight = recency_weight(record.age_secs(now_epoch_secs));
    FrecencyScore {
        item_id: record.item_id.clone(),
        score: record.launch_count.saturating_mul(weight),
        launch_count: record.launch_count,
        last_launch_time: record.last_launch_time,
    }
}

/// Scored candidates for one query, consumed lazily in rank order.
///
/// Iterating twice yields the same sequence.
#[derive(Debug, Clone)]
pub struct Ranking {
    candidates: Vec<FrecencyScore>,
    limit: usize,
}

impl Ranking {
    /// Scores `records` at `now_epoch_secs`, dropping those with
    /// `launch_count < min_launches`, keeping at most `limit` results.
    pub fn new(
        records: impl IntoIterator<Item = UsageRecord>,
        now_epoch_secs: i64,
        min_launches: u64,
        limit: usize,
    ) -> Self {
        let candidates = records
            .into_iter()
            .filter(|record| record.launch_count >= min_launches)
            .map(|record| score_record(&record, now_epoch_secs))
            .collect();
        Self { candidates, limit }
    }

    /// Number of entries the sequence will yield.
    pub fn len(&self) -> usize {
        self.candidates.len().min(self.limit)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Starts a fresh pass over the ranking.
    pub fn iter(&self) -> RankingIter {
        RankingIter {
            heap: self.candidates.iter().cloned().map(RankKey).collect(),
            remaining: self.limit,
        }
    }

    pub fn to_vec(&self) -> Vec<FrecencyScore> {
        self.iter().collect()
    }
}

impl<'a> IntoIterator for &'a Ranking {
    type Item = FrecencyScore;
    type IntoIter = RankingIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Heap-backed iterator; each step pops the next best entry.
#[derive(Debug)]
pub struct RankingIter {
    heap: BinaryHeap<RankKey>,
    remaining: usize,
}

impl Iterator for RankingIter {
    type Item = FrecencyScore;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let RankKey(entry) = self.heap.pop()?;
        self.remaining -= 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.heap.len().min(self.remaining);
        (len, Some(len))
    }
}

impl ExactSizeIterator for RankingIter {}

/// Max-heap key: "greater" means ranked earlier.
#[derive(Debug, PartialEq, Eq)]
struct RankKey(FrecencyScore);

impl Ord for RankKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .score
            .cmp(&other.0.score)
            .then(self.0.last_launch_time.cmp(&other.0.last_launch_time))
            .then_with(|| other.0.item_id.cmp(&self.0.item_id))
    }
}

impl PartialOrd for RankKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
