//! Panel visibility coordination.
//!
//! # Responsibility
//! - Track the configured panels and their visibility.
//! - Apply single and batch toggles, global close and the auto-close timer.
//!
//! # Invariants
//! - Only the coordinator mutates panel state.
//! - At most one auto-close timer is pending.

pub mod coordinator;
pub mod surface;
pub mod timer;
