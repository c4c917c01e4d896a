//! Core domain logic for the maxim journal.
//! This crate is the single source of truth for journal invariants.

pub mod capability;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;

pub use capability::{
    Clock, FileIo, FixedClock, FsFileIo, RandomSource, SeededRandom, SystemClock, ThreadRandom,
};
pub use config::{JournalConfig, StorageKeys};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::entry::{seed_entries, Entry, EntryDraft, EntryId, EntryValidationError};
pub use model::spice::SpiceLevel;
pub use repo::item_store::{ItemStore, LoadOrigin, SortedView, StoreError, StoreResult};
pub use service::focus::{FocusNavigator, FocusSlot};
pub use service::journal::{Command, Journal, JournalError, JournalResult, Outcome};
pub use service::transfer::{
    generate_phrase, normalize_phrase, pack_file_name, parse_pack, PackDocument, ParsedPack,
    SyncPhrase, TransferError, TransferResult,
};
pub use storage::{KeyValueStore, MemoryStore, SqliteKvStore, StorageError, StorageResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
