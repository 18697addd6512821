//! Domain model for launch tracking, bookmarks and panels.
//!
//! # Responsibility
//! - Define canonical data structures used by the stores and coordinator.
//! - Keep item identity opaque: an item is whatever string the host uses.
//!
//! # Invariants
//! - Item identifiers are non-blank after trimming.
//! - A `UsageRecord` always has `launch_count >= 1`.

pub mod item;
pub mod panel;
pub mod usage;
