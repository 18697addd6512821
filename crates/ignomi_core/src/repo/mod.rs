//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite and file-format details from service orchestration.
//!
//! # Invariants
//! - Repositories never publish change events; services do.
//! - Read paths reject invalid persisted state instead of masking it; the
//!   service layer decides whether to degrade.

pub mod bookmark_repo;
pub mod usage_repo;
