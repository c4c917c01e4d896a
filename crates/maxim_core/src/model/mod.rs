//! Journal domain model.
//!
//! # Responsibility
//! - Define the entry record shared by the store, focus mode and packs.
//! - Define lightly persisted view preferences.
//!
//! # Invariants
//! - Every entry is identified by a stable `EntryId`.
//! - Deletion is a hard removal; there are no tombstones.

pub mod entry;
pub mod spice;
