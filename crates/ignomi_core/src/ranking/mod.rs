//! Usage ranking.
//!
//! # Responsibility
//! - Score usage records by frequency and recency.
//! - Produce deterministic top-N sequences.
//!
//! # Invariants
//! - Ranking never mutates usage records.
//! - Scores are recomputed per query because they depend on "now".

pub mod frecency;
