//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls, time and change publication.
//! - Keep host/UI layers decoupled from storage details.
//!
//! # Invariants
//! - A change event is published only after the change is durable.
//! - Services receive their collaborators at construction; no globals.

pub mod bookmark_store;
pub mod usage_store;
