//! Journal entry domain model.
//!
//! # Responsibility
//! - Define the canonical maxim record persisted and exchanged in packs.
//! - Validate user-submitted drafts before they reach the store.
//!
//! # Invariants
//! - `id` is stable and never reused for another entry.
//! - `created_at` is assigned once and never mutated.
//! - `title` and `body` are non-empty after trimming for every draft that
//!   passes validation.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier for one journal entry.
///
/// Opaque text: new entries get a UUID v4 string, but ids coming from
/// storage or packs are kept exactly as written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Fresh random id for a newly created entry.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for EntryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl FromStr for EntryId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

const SEED_SPACING_MS: i64 = 60_000;

/// One journal maxim.
///
/// Wire names are camelCase so stored collections and pack documents stay
/// readable by the browser build of the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: EntryId,
    pub title: String,
    pub body: String,
    /// Optional reflection shown on demand in focus mode.
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub lived: bool,
    /// Unix epoch milliseconds. Only used for default ordering.
    pub created_at: i64,
}

impl Entry {
    /// Builds an entry from a validated draft with a fresh stable ID.
    pub fn from_draft(draft: &EntryDraft, created_at: i64) -> Result<Self, EntryValidationError> {
        let draft = draft.normalized();
        draft.validate()?;
        Ok(Self {
            id: EntryId::generate(),
            title: draft.title,
            body: draft.body,
            note: draft.note,
            favorite: draft.favorite,
            lived: draft.lived,
            created_at,
        })
    }

    /// Replaces every mutable field from a draft.
    ///
    /// `id` and `created_at` are left untouched.
    pub fn apply_draft(&mut self, draft: &EntryDraft) -> Result<(), EntryValidationError> {
        let draft = draft.normalized();
        draft.validate()?;
        self.title = draft.title;
        self.body = draft.body;
        self.note = draft.note;
        self.favorite = draft.favorite;
        self.lived = draft.lived;
        Ok(())
    }

    /// Returns the draft that would reproduce this entry's mutable fields.
    pub fn to_draft(&self) -> EntryDraft {
        EntryDraft {
            title: self.title.clone(),
            body: self.body.clone(),
            note: self.note.clone(),
            favorite: self.favorite,
            lived: self.lived,
        }
    }

    pub fn toggle_favorite(&mut self) {
        self.favorite = !self.favorite;
    }

    pub fn toggle_lived(&mut self) {
        self.lived = !self.lived;
    }

    /// Checks a record taken from storage or a pack.
    ///
    /// Only the id is checked; text fields are accepted as stored.
    pub fn validate_record(&self) -> Result<(), EntryValidationError> {
        if self.id.is_empty() {
            return Err(EntryValidationError::EmptyId);
        }
        Ok(())
    }
}

/// User-submitted field set for create and edit flows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDraft {
    pub title: String,
    pub body: String,
    pub note: String,
    pub favorite: bool,
    pub lived: bool,
}

impl EntryDraft {
    /// Creates a draft with the two required text fields.
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn with_flags(mut self, favorite: bool, lived: bool) -> Self {
        self.favorite = favorite;
        self.lived = lived;
        self
    }

    /// Returns a copy with all text fields trimmed.
    pub fn normalized(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            body: self.body.trim().to_string(),
            note: self.note.trim().to_string(),
            favorite: self.favorite,
            lived: self.lived,
        }
    }

    /// Checks required fields on the trimmed draft.
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        if self.title.trim().is_empty() {
            return Err(EntryValidationError::EmptyTitle);
        }
        if self.body.trim().is_empty() {
            return Err(EntryValidationError::EmptyBody);
        }
        Ok(())
    }
}

/// Draft and record validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    EmptyTitle,
    EmptyBody,
    EmptyId,
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "entry title must not be empty"),
            Self::EmptyBody => write!(f, "entry body must not be empty"),
            Self::EmptyId => write!(f, "entry id must not be empty"),
        }
    }
}

impl Error for EntryValidationError {}

/// Built-in collection used when storage holds nothing readable.
///
/// Timestamps step back one minute per entry so the first maxim listed here
/// is the first one shown.
pub fn seed_entries(now_ms: i64) -> Vec<Entry> {
    const SEED: [(&str, &str, &str, bool, bool); 4] = [
        (
            "Presence before optimization",
            "Tonight, rest is strategy. Be where you are.",
            "",
            true,
            false,
        ),
        (
            "Small honest steps",
            "One clean action beats ten grand plans.",
            "",
            false,
            true,
        ),
        (
            "Water does not argue",
            "Yield where you can, hold where you must.",
            "Soft persistence outlasts force.",
            false,
            false,
        ),
        (
            "Empty the cup",
            "Arrive without the answer already written.",
            "",
            false,
            false,
        ),
    ];

    SEED.iter()
        .enumerate()
        .map(|(position, (title, body, note, favorite, lived))| Entry {
            id: EntryId::generate(),
            title: (*title).to_string(),
            body: (*body).to_string(),
            note: (*note).to_string(),
            favorite: *favorite,
            lived: *lived,
            created_at: now_ms - SEED_SPACING_MS * position as i64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{seed_entries, Entry, EntryDraft, EntryId, EntryValidationError};

    #[test]
    fn draft_validation_trims_before_checking() {
        assert_eq!(
            EntryDraft::new("   ", "body").validate(),
            Err(EntryValidationError::EmptyTitle)
        );
        assert_eq!(
            EntryDraft::new("title", "\n\t").validate(),
            Err(EntryValidationError::EmptyBody)
        );
        assert!(EntryDraft::new(" title ", " body ").validate().is_ok());
    }

    #[test]
    fn apply_draft_keeps_identity_and_timestamp() {
        let mut entry = Entry::from_draft(&EntryDraft::new("a", "b"), 42).expect("valid draft");
        let id = entry.id.clone();
        entry
            .apply_draft(&EntryDraft::new(" c ", "d").with_note("n").with_flags(true, true))
            .expect("valid edit");
        assert_eq!(entry.id, id);
        assert_eq!(entry.created_at, 42);
        assert_eq!(entry.title, "c");
        assert_eq!(entry.note, "n");
        assert!(entry.favorite && entry.lived);
    }

    #[test]
    fn seed_has_four_unique_entries_in_descending_time() {
        let seed = seed_entries(1_000_000);
        assert_eq!(seed.len(), 4);
        assert!(seed.windows(2).all(|pair| pair[0].created_at > pair[1].created_at));
        assert!(seed.iter().all(|entry| !entry.id.is_empty()));
        assert_ne!(seed[0].id, seed[1].id);
    }

    #[test]
    fn opaque_ids_round_trip_unchanged() {
        let raw = r#"{"id":"lx3k9a","title":"t","body":"b","createdAt":1}"#;
        let entry: Entry = serde_json::from_str(raw).expect("non-uuid id should parse");
        assert_eq!(entry.id.as_str(), "lx3k9a");
        assert_eq!(entry.validate_record(), Ok(()));

        let encoded = serde_json::to_value(&entry).expect("entry should serialize");
        assert_eq!(encoded["id"], "lx3k9a");
    }

    #[test]
    fn validate_record_rejects_blank_id() {
        let mut entry = Entry::from_draft(&EntryDraft::new("a", "b"), 1).expect("valid draft");
        entry.id = EntryId::from("  ");
        assert_eq!(entry.validate_record(), Err(EntryValidationError::EmptyId));
    }
}
