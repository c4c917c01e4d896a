//! In-memory entry collection persisted through a key-value store.
//!
//! # Responsibility
//! - Own the journal collection and every mutation applied to it.
//! - Persist the full collection under one storage key after each change.
//! - Derive the `created_at DESC` view consumed by focus mode and listings.
//!
//! # Invariants
//! - Entry ids are unique across the collection.
//! - A mutation is committed to memory only after the storage write
//!   succeeded; on failure the previous collection stays in place.
//! - Loading never fails: absent or unreadable data yields the seed set.

use crate::capability::{Clock, SystemClock};
use crate::model::entry::{seed_entries, Entry, EntryDraft, EntryId};
use crate::storage::{KeyValueStore, StorageError};
use log::{info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Item store failure.
#[derive(Debug)]
pub enum StoreError {
    Storage(StorageError),
    Serialize(serde_json::Error),
    /// Replacement collection is not a valid set of entries.
    InvalidItems(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "failed to serialize entries: {err}"),
            Self::InvalidItems(message) => write!(f, "invalid items: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::InvalidItems(_) => None,
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Where the in-memory collection came from at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    Stored,
    /// Nothing was stored under the collection key.
    SeedMissing,
    /// Stored value could not be read or parsed.
    SeedRecovered,
}

/// Journal collection owner.
pub struct ItemStore<'s, S: KeyValueStore + ?Sized> {
    storage: &'s S,
    key: String,
    clock: Box<dyn Clock + 's>,
    entries: Vec<Entry>,
    origin: LoadOrigin,
}

impl<'s, S: KeyValueStore + ?Sized> ItemStore<'s, S> {
    /// Loads the collection stored under `key` using the system clock.
    pub fn load(storage: &'s S, key: impl Into<String>) -> Self {
        Self::load_with_clock(storage, key, SystemClock)
    }

    /// Loads the collection stored under `key`.
    ///
    /// Falls back to the seed collection when the key is absent, the read
    /// fails, or the stored text is not a JSON array of entries. Loading
    /// does not write to storage.
    pub fn load_with_clock(storage: &'s S, key: impl Into<String>, clock: impl Clock + 's) -> Self {
        let key = key.into();
        let clock: Box<dyn Clock + 's> = Box::new(clock);

        let (entries, origin) = match storage.get(&key) {
            Ok(Some(raw)) => match parse_collection(&raw) {
                Ok(entries) => (entries, LoadOrigin::Stored),
                Err(reason) => {
                    warn!(
                        "event=items_load module=repo status=fallback reason=unreadable_data detail={}",
                        reason
                    );
                    (seed_entries(clock.now_ms()), LoadOrigin::SeedRecovered)
                }
            },
            Ok(None) => (seed_entries(clock.now_ms()), LoadOrigin::SeedMissing),
            Err(err) => {
                warn!(
                    "event=items_load module=repo status=fallback reason=storage_read_failed error={}",
                    err
                );
                (seed_entries(clock.now_ms()), LoadOrigin::SeedRecovered)
            }
        };

        info!(
            "event=items_load module=repo status=ok origin={:?} count={}",
            origin,
            entries.len()
        );

        Self {
            storage,
            key,
            clock,
            entries,
            origin,
        }
    }

    pub fn origin(&self) -> LoadOrigin {
        self.origin
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &EntryId) -> Option<&Entry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    /// Current entries ordered by `created_at` descending.
    ///
    /// Recomputed on every call; ties keep insertion order.
    pub fn sorted_view(&self) -> SortedView<'_> {
        let mut entries = self.entries.iter().collect::<Vec<_>>();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        SortedView { entries }
    }

    /// Appends a new entry built from `draft`.
    ///
    /// Returns `Ok(None)` without touching state when title or body is
    /// empty after trimming.
    pub fn create(&mut self, draft: &EntryDraft) -> StoreResult<Option<EntryId>> {
        let entry = match Entry::from_draft(draft, self.clock.now_ms()) {
            Ok(entry) => entry,
            Err(_) => return Ok(None),
        };
        let id = entry.id.clone();

        let mut next = self.entries.clone();
        next.push(entry);
        self.commit(next, "entry_create")?;
        Ok(Some(id))
    }

    /// Replaces the mutable fields of entry `id`.
    ///
    /// Returns `Ok(false)` when the entry is missing or the draft invalid.
    pub fn update(&mut self, id: &EntryId, draft: &EntryDraft) -> StoreResult<bool> {
        self.mutate(id, "entry_update", |entry| entry.apply_draft(draft).is_ok())
    }

    pub fn toggle_favorite(&mut self, id: &EntryId) -> StoreResult<bool> {
        self.mutate(id, "entry_toggle_favorite", |entry| {
            entry.toggle_favorite();
            true
        })
    }

    pub fn toggle_lived(&mut self, id: &EntryId) -> StoreResult<bool> {
        self.mutate(id, "entry_toggle_lived", |entry| {
            entry.toggle_lived();
            true
        })
    }

    /// Removes entry `id`. Returns `Ok(false)` when it does not exist.
    pub fn delete(&mut self, id: &EntryId) -> StoreResult<bool> {
        if self.get(id).is_none() {
            return Ok(false);
        }
        let next = self
            .entries
            .iter()
            .filter(|entry| &entry.id != id)
            .cloned()
            .collect();
        self.commit(next, "entry_delete")?;
        Ok(true)
    }

    /// Replaces the whole collection.
    ///
    /// Rejects empty or duplicate ids with `StoreError::InvalidItems`,
    /// leaving the current collection untouched.
    pub fn replace_all(&mut self, entries: Vec<Entry>) -> StoreResult<()> {
        check_records(&entries).map_err(StoreError::InvalidItems)?;
        self.commit(entries, "items_replace")
    }

    /// Writes the current collection to storage.
    pub fn persist(&self) -> StoreResult<()> {
        write_collection(self.storage, &self.key, &self.entries)
    }

    fn mutate(
        &mut self,
        id: &EntryId,
        event: &str,
        change: impl FnOnce(&mut Entry) -> bool,
    ) -> StoreResult<bool> {
        let Some(position) = self.entries.iter().position(|entry| &entry.id == id) else {
            return Ok(false);
        };

        let mut next = self.entries.clone();
        if !change(&mut next[position]) {
            return Ok(false);
        }
        self.commit(next, event)?;
        Ok(true)
    }

    fn commit(&mut self, next: Vec<Entry>, event: &str) -> StoreResult<()> {
        if let Err(err) = write_collection(self.storage, &self.key, &next) {
            warn!(
                "event={} module=repo status=error error_code=persist_failed error={}",
                event, err
            );
            return Err(err);
        }
        self.entries = next;
        info!(
            "event={} module=repo status=ok count={}",
            event,
            self.entries.len()
        );
        Ok(())
    }
}

/// Restartable view over entries sorted by `created_at` descending.
#[derive(Debug, Clone)]
pub struct SortedView<'a> {
    entries: Vec<&'a Entry>,
}

impl<'a> SortedView<'a> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a Entry> {
        self.entries.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Entry> + '_ {
        self.entries.iter().copied()
    }

    /// Position of entry `id` within the view.
    pub fn position(&self, id: &EntryId) -> Option<usize> {
        self.entries.iter().position(|entry| &entry.id == id)
    }
}

fn parse_collection(raw: &str) -> Result<Vec<Entry>, String> {
    let entries: Vec<Entry> = serde_json::from_str(raw).map_err(|err| err.to_string())?;
    check_records(&entries)?;
    Ok(entries)
}

fn check_records(entries: &[Entry]) -> Result<(), String> {
    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        entry.validate_record().map_err(|err| err.to_string())?;
        if !seen.insert(&entry.id) {
            return Err(format!("duplicate entry id {}", entry.id));
        }
    }
    Ok(())
}

fn write_collection<S: KeyValueStore + ?Sized>(
    storage: &S,
    key: &str,
    entries: &[Entry],
) -> StoreResult<()> {
    let raw = serde_json::to_string(entries)?;
    storage.set(key, &raw)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse_collection;

    #[test]
    fn parse_collection_rejects_non_array_json() {
        assert!(parse_collection("{\"items\": []}").is_err());
        assert!(parse_collection("null").is_err());
        assert_eq!(parse_collection("[]").expect("empty array is valid").len(), 0);
    }

    #[test]
    fn parse_collection_defaults_optional_fields() {
        let raw = r#"[{"id":"11111111-2222-4333-8444-555555555555","title":"t","body":"b","createdAt":5}]"#;
        let entries = parse_collection(raw).expect("minimal record should parse");
        assert_eq!(entries[0].note, "");
        assert!(!entries[0].favorite);
        assert!(!entries[0].lived);
    }

    #[test]
    fn parse_collection_rejects_blank_and_duplicate_ids() {
        assert!(parse_collection(r#"[{"id":"","title":"t","body":"b","createdAt":1}]"#).is_err());
        let duplicated = r#"[{"id":"a","title":"t","body":"b","createdAt":1},{"id":"a","title":"u","body":"c","createdAt":2}]"#;
        assert!(parse_collection(duplicated).is_err());
    }
}
