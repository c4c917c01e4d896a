//! Sync phrase generation and pack export/import.
//!
//! # Responsibility
//! - Generate and persist the human-memorable sync phrase.
//! - Serialize the whole collection into a portable pack document and
//!   restore it from one.
//!
//! # Invariants
//! - A rejected pack leaves both the collection and the phrase untouched.
//! - Stored phrases are normalized: lowercase, `-` separated, non-empty.
//! - Phrases are local identifiers, not credentials.

use crate::capability::{Clock, FileIo, RandomSource};
use crate::model::entry::Entry;
use crate::repo::item_store::{ItemStore, StoreError};
use crate::storage::{KeyValueStore, StorageError};
use chrono::{DateTime, SecondsFormat, Utc};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

const PHRASE_SUFFIX_LEN: usize = 4;

const ADJECTIVES: &[&str] = &[
    "quiet", "amber", "gentle", "hollow", "silver", "patient", "rising", "misty", "steady",
    "humble", "bright", "still",
];
const NOUNS: &[&str] = &[
    "river", "lantern", "willow", "stone", "heron", "ember", "valley", "cedar", "tide", "bell",
    "moss", "path",
];
const PLACES: &[&str] = &[
    "harbor", "meadow", "summit", "grove", "canyon", "orchard", "shore", "temple", "garden",
    "ridge", "hearth", "spring",
];

static NON_PHRASE_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid phrase separator regex"));

pub type TransferResult<T> = Result<T, TransferError>;

/// Phrase and pack failures.
#[derive(Debug)]
pub enum TransferError {
    /// Document is not a usable pack; nothing was changed.
    InvalidPack(String),
    /// An action needs a sync phrase and none is set.
    MissingPhrase,
    Store(StoreError),
    Serialize(serde_json::Error),
    Io(std::io::Error),
}

impl Display for TransferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPack(reason) => write!(f, "invalid pack: {reason}"),
            Self::MissingPhrase => write!(f, "a sync phrase is required for this action"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "failed to serialize pack: {err}"),
            Self::Io(err) => write!(f, "pack file access failed: {err}"),
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::InvalidPack(_) | Self::MissingPhrase => None,
        }
    }
}

impl From<StoreError> for TransferError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::InvalidItems(reason) => Self::InvalidPack(reason),
            other => Self::Store(other),
        }
    }
}

impl From<StorageError> for TransferError {
    fn from(value: StorageError) -> Self {
        Self::Store(StoreError::Storage(value))
    }
}

impl From<std::io::Error> for TransferError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Composes `<adjective>-<noun>-<place>-<suffix>` from independent draws.
pub fn generate_phrase(rng: &mut dyn RandomSource) -> String {
    let adjective = ADJECTIVES[rng.index_below(ADJECTIVES.len())];
    let noun = NOUNS[rng.index_below(NOUNS.len())];
    let place = PLACES[rng.index_below(PLACES.len())];
    let suffix = rng.alphanumeric(PHRASE_SUFFIX_LEN);
    format!("{adjective}-{noun}-{place}-{suffix}")
}

/// Normalizes user-entered phrase text.
///
/// Returns `None` when nothing usable remains.
pub fn normalize_phrase(raw: &str) -> Option<String> {
    let lowered = raw.trim().to_lowercase();
    let joined = NON_PHRASE_CHARS_RE.replace_all(&lowered, "-");
    let normalized = joined.trim_matches('-');
    if normalized.is_empty() {
        None
    } else {
        Some(normalized.to_string())
    }
}

/// Persisted sync phrase.
pub struct SyncPhrase<'s, S: KeyValueStore + ?Sized> {
    storage: &'s S,
    key: String,
    current: Option<String>,
}

impl<'s, S: KeyValueStore + ?Sized> SyncPhrase<'s, S> {
    /// Reads the phrase stored under `key`; unreadable values count as unset.
    pub fn load(storage: &'s S, key: impl Into<String>) -> Self {
        let key = key.into();
        let current = match storage.get(&key) {
            Ok(value) => value.as_deref().and_then(normalize_phrase),
            Err(err) => {
                warn!(
                    "event=phrase_load module=transfer status=fallback reason=storage_read_failed error={}",
                    err
                );
                None
            }
        };
        Self {
            storage,
            key,
            current,
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Returns the phrase or `MissingPhrase` for actions that need one.
    pub fn require(&self) -> TransferResult<&str> {
        self.current().ok_or(TransferError::MissingPhrase)
    }

    /// Generates, persists and adopts a fresh phrase.
    pub fn generate(&mut self, rng: &mut dyn RandomSource) -> TransferResult<&str> {
        let phrase = generate_phrase(rng);
        self.store(phrase)?;
        info!("event=phrase_generate module=transfer status=ok");
        self.require()
    }

    /// Persists a user-entered phrase after normalization.
    pub fn set(&mut self, raw: &str) -> TransferResult<&str> {
        let phrase = normalize_phrase(raw).ok_or(TransferError::MissingPhrase)?;
        self.store(phrase)?;
        self.require()
    }

    fn store(&mut self, phrase: String) -> TransferResult<()> {
        self.storage.set(&self.key, &phrase)?;
        self.current = Some(phrase);
        Ok(())
    }
}

/// Portable export document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackDocument {
    pub phrase: String,
    /// ISO-8601 UTC timestamp with millisecond precision.
    pub exported_at: String,
    pub items: Vec<Entry>,
}

impl PackDocument {
    pub fn new(phrase: Option<&str>, exported_at: DateTime<Utc>, items: Vec<Entry>) -> Self {
        Self {
            phrase: phrase.unwrap_or_default().to_string(),
            exported_at: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            items,
        }
    }

    pub fn to_json(&self) -> TransferResult<String> {
        serde_json::to_string_pretty(self).map_err(TransferError::Serialize)
    }
}

/// Pack contents accepted for import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPack {
    pub phrase: Option<String>,
    pub items: Vec<Entry>,
}

/// Parses a pack document without touching any state.
///
/// Only `items` is mandatory; it must be an array of entry-shaped records.
pub fn parse_pack(document: &str) -> TransferResult<ParsedPack> {
    let root: Value = serde_json::from_str(document)
        .map_err(|err| TransferError::InvalidPack(format!("not JSON: {err}")))?;
    let Value::Object(mut fields) = root else {
        return Err(TransferError::InvalidPack(
            "document is not an object".to_string(),
        ));
    };

    let items = match fields.remove("items") {
        Some(items @ Value::Array(_)) => serde_json::from_value::<Vec<Entry>>(items)
            .map_err(|err| TransferError::InvalidPack(format!("malformed item: {err}")))?,
        Some(_) => {
            return Err(TransferError::InvalidPack(
                "`items` is not a sequence".to_string(),
            ))
        }
        None => return Err(TransferError::InvalidPack("`items` is missing".to_string())),
    };

    let phrase = match fields.get("phrase") {
        Some(Value::String(raw)) => normalize_phrase(raw),
        _ => None,
    };

    Ok(ParsedPack { phrase, items })
}

/// Suggested download name for a pack exported at `now`.
pub fn pack_file_name(now: DateTime<Utc>) -> String {
    format!("tao-of-life-pack-{}.json", now.format("%Y-%m-%d"))
}

/// Serializes the full collection and current phrase.
pub fn export_pack<S: KeyValueStore + ?Sized>(
    items: &ItemStore<'_, S>,
    phrase: &SyncPhrase<'_, S>,
    clock: &dyn Clock,
) -> TransferResult<String> {
    let document = PackDocument::new(phrase.current(), clock.now_utc(), items.entries().to_vec());
    let json = document.to_json()?;
    info!(
        "event=pack_export module=transfer status=ok count={}",
        document.items.len()
    );
    Ok(json)
}

/// Replaces the collection from a pack and adopts its phrase when present.
///
/// If the phrase cannot be stored the previous collection is written back,
/// so a failed import leaves both unchanged. Returns the number of imported
/// entries.
pub fn import_pack<S: KeyValueStore + ?Sized>(
    items: &mut ItemStore<'_, S>,
    phrase: &mut SyncPhrase<'_, S>,
    document: &str,
) -> TransferResult<usize> {
    let parsed = match parse_pack(document) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!("event=pack_import module=transfer status=rejected error={}", err);
            return Err(err);
        }
    };

    let count = parsed.items.len();
    let previous = items.entries().to_vec();
    items.replace_all(parsed.items)?;
    if let Some(adopted) = parsed.phrase {
        if let Err(err) = phrase.store(adopted) {
            warn!(
                "event=pack_import module=transfer status=error error_code=phrase_persist_failed error={}",
                err
            );
            if let Err(restore_err) = items.replace_all(previous) {
                warn!(
                    "event=pack_import module=transfer status=error error_code=rollback_failed error={}",
                    restore_err
                );
            }
            return Err(err);
        }
    }

    info!(
        "event=pack_import module=transfer status=ok count={}",
        count
    );
    Ok(count)
}

/// Writes an exported pack to `path`.
pub fn export_pack_to<S: KeyValueStore + ?Sized>(
    items: &ItemStore<'_, S>,
    phrase: &SyncPhrase<'_, S>,
    clock: &dyn Clock,
    io: &dyn FileIo,
    path: &Path,
) -> TransferResult<()> {
    let json = export_pack(items, phrase, clock)?;
    io.write_string(path, &json)?;
    Ok(())
}

/// Reads a pack from `path` and imports it.
pub fn import_pack_from<S: KeyValueStore + ?Sized>(
    items: &mut ItemStore<'_, S>,
    phrase: &mut SyncPhrase<'_, S>,
    io: &dyn FileIo,
    path: &Path,
) -> TransferResult<usize> {
    let document = io.read_to_string(path)?;
    import_pack(items, phrase, &document)
}
