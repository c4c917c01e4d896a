//! Collection ownership and persistence.
//!
//! # Responsibility
//! - Hold the journal collection and apply every mutation to it.
//! - Isolate serialization details from focus/transfer orchestration.
//!
//! # Invariants
//! - Repository writes persist before the in-memory state changes.
//! - Not-found and invalid-input cases are no-ops, not errors.

pub mod item_store;
