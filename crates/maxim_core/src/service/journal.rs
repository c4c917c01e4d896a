//! Journal controller: explicit application state plus command dispatch.
//!
//! # Responsibility
//! - Own the item store, focus navigator, sync phrase and view preferences
//!   for one running journal.
//! - Map discrete user intents (`Command`) to state transitions.
//! - Notify the view layer after every applied command.
//!
//! # Invariants
//! - The focus cursor is clamped against the current view after every
//!   dispatch, before the render hook runs.
//! - A failed command leaves state as it was and does not render. A pack
//!   import whose phrase write fails restores the previous collection.
//! - Deleting the entry under edit clears the edit.

use crate::capability::{Clock, FileIo, RandomSource, SystemClock, ThreadRandom};
use crate::config::StorageKeys;
use crate::model::entry::{Entry, EntryDraft, EntryId};
use crate::model::spice::SpiceLevel;
use crate::repo::item_store::{ItemStore, SortedView, StoreError};
use crate::service::focus::{FocusNavigator, FocusSlot};
use crate::service::transfer::{self, SyncPhrase, TransferError, TransferResult};
use crate::storage::{KeyValueStore, StorageError};
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::rc::Rc;

pub type JournalResult<T> = Result<T, JournalError>;

/// Controller-level failure.
#[derive(Debug)]
pub enum JournalError {
    Store(StoreError),
    Transfer(TransferError),
}

impl Display for JournalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Transfer(err) => write!(f, "{err}"),
        }
    }
}

impl Error for JournalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Transfer(err) => Some(err),
        }
    }
}

impl From<StoreError> for JournalError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<StorageError> for JournalError {
    fn from(value: StorageError) -> Self {
        Self::Store(StoreError::Storage(value))
    }
}

impl From<TransferError> for JournalError {
    fn from(value: TransferError) -> Self {
        Self::Transfer(value)
    }
}

/// Discrete user intents understood by the journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Form submission: creates, or updates the entry under edit.
    Submit(EntryDraft),
    BeginEdit(EntryId),
    CancelEdit,
    Update { id: EntryId, draft: EntryDraft },
    ToggleFavorite(EntryId),
    ToggleLived(EntryId),
    Delete(EntryId),
    EnterFocus(Option<usize>),
    ExitFocus,
    Move(isize),
    RandomFocus,
    ToggleNote,
    ToggleChrome,
    CycleSpice,
    GeneratePhrase,
    SetPhrase(String),
    ImportPack(String),
}

/// Result of one dispatched command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// State changed (or was re-rendered) with nothing to report.
    Applied,
    /// Input was rejected or the target was missing; state unchanged.
    Ignored,
    Created(EntryId),
    Updated(EntryId),
    Deleted(EntryId),
    /// Draft to prefill the edit form with.
    EditStarted(EntryDraft),
    Spice(SpiceLevel),
    Phrase(String),
    Imported(usize),
}

/// Running journal state owned by one controller.
pub struct Journal<'s, S: KeyValueStore + ?Sized> {
    storage: &'s S,
    keys: StorageKeys,
    items: ItemStore<'s, S>,
    phrase: SyncPhrase<'s, S>,
    focus: FocusNavigator,
    spice: SpiceLevel,
    editing: Option<EntryId>,
    rng: Box<dyn RandomSource + 's>,
    clock: Rc<dyn Clock + 's>,
    render: Option<Box<dyn FnMut() + 's>>,
}

impl<'s, S: KeyValueStore + ?Sized> Journal<'s, S> {
    /// Opens the journal with OS randomness and the system clock.
    pub fn open(storage: &'s S, keys: StorageKeys) -> Self {
        Self::open_with(storage, keys, ThreadRandom, SystemClock)
    }

    /// Opens the journal with injected capabilities.
    pub fn open_with(
        storage: &'s S,
        keys: StorageKeys,
        rng: impl RandomSource + 's,
        clock: impl Clock + 's,
    ) -> Self {
        let clock: Rc<dyn Clock + 's> = Rc::new(clock);
        let items = ItemStore::load_with_clock(storage, keys.items.clone(), Rc::clone(&clock));
        let phrase = SyncPhrase::load(storage, keys.phrase.clone());
        let spice = load_spice(storage, &keys.spice);

        Self {
            storage,
            keys,
            items,
            phrase,
            focus: FocusNavigator::new(),
            spice,
            editing: None,
            rng: Box::new(rng),
            clock,
            render: None,
        }
    }

    /// Registers the view-layer notification fired after every change.
    pub fn set_render_hook(&mut self, hook: impl FnMut() + 's) {
        self.render = Some(Box::new(hook));
    }

    pub fn items(&self) -> &ItemStore<'s, S> {
        &self.items
    }

    pub fn sorted_view(&self) -> SortedView<'_> {
        self.items.sorted_view()
    }

    pub fn focus(&self) -> &FocusNavigator {
        &self.focus
    }

    /// What focus mode shows right now, with the cursor clamped first.
    pub fn focus_slot(&mut self) -> FocusSlot<'_> {
        let view = self.items.sorted_view();
        self.focus.current(&view)
    }

    pub fn spice(&self) -> SpiceLevel {
        self.spice
    }

    pub fn phrase(&self) -> Option<&str> {
        self.phrase.current()
    }

    /// Phrase for copy/share/save actions; `MissingPhrase` when unset.
    pub fn require_phrase(&self) -> JournalResult<&str> {
        Ok(self.phrase.require()?)
    }

    pub fn editing(&self) -> Option<&EntryId> {
        self.editing.as_ref()
    }

    /// Entry currently under edit, if it still exists.
    pub fn editing_entry(&self) -> Option<&Entry> {
        self.editing.as_ref().and_then(|id| self.items.get(id))
    }

    /// Applies one command, clamps the focus cursor and renders.
    pub fn dispatch(&mut self, command: Command) -> JournalResult<Outcome> {
        debug!("event=dispatch module=journal command={}", command_name(&command));
        let outcome = self.apply(command);
        self.focus.clamp(self.items.len());
        match &outcome {
            Ok(_) => self.notify(),
            Err(err) => warn!("event=dispatch module=journal status=error error={}", err),
        }
        outcome
    }

    /// Serializes the collection and phrase as a pack document.
    pub fn export_pack(&self) -> JournalResult<String> {
        Ok(transfer::export_pack(
            &self.items,
            &self.phrase,
            self.clock.as_ref(),
        )?)
    }

    /// Suggested file name for a pack exported now.
    pub fn pack_file_name(&self) -> String {
        transfer::pack_file_name(self.clock.now_utc())
    }

    pub fn export_pack_to(&self, io: &dyn FileIo, path: &Path) -> JournalResult<()> {
        Ok(transfer::export_pack_to(
            &self.items,
            &self.phrase,
            self.clock.as_ref(),
            io,
            path,
        )?)
    }

    /// Reads a pack file and imports it as one dispatched change.
    pub fn import_pack_from(&mut self, io: &dyn FileIo, path: &Path) -> JournalResult<usize> {
        let document = io
            .read_to_string(path)
            .map_err(|err| JournalError::Transfer(TransferError::Io(err)))?;
        match self.dispatch(Command::ImportPack(document))? {
            Outcome::Imported(count) => Ok(count),
            _ => Ok(0),
        }
    }

    fn apply(&mut self, command: Command) -> JournalResult<Outcome> {
        match command {
            Command::Submit(draft) => self.submit(&draft),
            Command::BeginEdit(id) => Ok(match self.items.get(&id).map(Entry::to_draft) {
                Some(draft) => {
                    self.editing = Some(id);
                    Outcome::EditStarted(draft)
                }
                None => Outcome::Ignored,
            }),
            Command::CancelEdit => {
                self.editing = None;
                Ok(Outcome::Applied)
            }
            Command::Update { id, draft } => {
                let changed = self.items.update(&id, &draft)?;
                Ok(changed_or_ignored(changed, Outcome::Updated(id)))
            }
            Command::ToggleFavorite(id) => {
                let changed = self.items.toggle_favorite(&id)?;
                Ok(changed_or_ignored(changed, Outcome::Updated(id)))
            }
            Command::ToggleLived(id) => {
                let changed = self.items.toggle_lived(&id)?;
                Ok(changed_or_ignored(changed, Outcome::Updated(id)))
            }
            Command::Delete(id) => {
                let removed = self.items.delete(&id)?;
                if removed && self.editing.as_ref() == Some(&id) {
                    self.editing = None;
                }
                Ok(changed_or_ignored(removed, Outcome::Deleted(id)))
            }
            Command::EnterFocus(at) => {
                self.focus.enter(at, self.items.len());
                Ok(Outcome::Applied)
            }
            Command::ExitFocus => {
                self.focus.exit();
                Ok(Outcome::Applied)
            }
            Command::Move(step) => {
                self.focus.move_by(step, self.items.len());
                Ok(Outcome::Applied)
            }
            Command::RandomFocus => {
                self.focus.random(self.rng.as_mut(), self.items.len());
                Ok(Outcome::Applied)
            }
            Command::ToggleNote => {
                self.focus.toggle_note_visible();
                Ok(Outcome::Applied)
            }
            Command::ToggleChrome => {
                self.focus.toggle_chrome_hidden();
                Ok(Outcome::Applied)
            }
            Command::CycleSpice => {
                let next = self.spice.cycle();
                self.storage.set(&self.keys.spice, &next.to_string())?;
                self.spice = next;
                Ok(Outcome::Spice(next))
            }
            Command::GeneratePhrase => {
                let phrase = self.phrase.generate(self.rng.as_mut())?;
                Ok(Outcome::Phrase(phrase.to_string()))
            }
            Command::SetPhrase(raw) => {
                let phrase = self.phrase.set(&raw)?;
                Ok(Outcome::Phrase(phrase.to_string()))
            }
            Command::ImportPack(document) => {
                let count = self.import(&document)?;
                Ok(Outcome::Imported(count))
            }
        }
    }

    fn submit(&mut self, draft: &EntryDraft) -> JournalResult<Outcome> {
        if draft.validate().is_err() {
            return Ok(Outcome::Ignored);
        }

        match self.editing.clone() {
            Some(id) => {
                let updated = self.items.update(&id, draft)?;
                self.editing = None;
                Ok(changed_or_ignored(updated, Outcome::Updated(id)))
            }
            None => Ok(match self.items.create(draft)? {
                Some(id) => Outcome::Created(id),
                None => Outcome::Ignored,
            }),
        }
    }

    fn import(&mut self, document: &str) -> TransferResult<usize> {
        let count = transfer::import_pack(&mut self.items, &mut self.phrase, document)?;
        if self.editing_entry().is_none() {
            self.editing = None;
        }
        Ok(count)
    }

    fn notify(&mut self) {
        if let Some(render) = self.render.as_mut() {
            render();
        }
    }
}

fn changed_or_ignored(changed: bool, outcome: Outcome) -> Outcome {
    if changed {
        outcome
    } else {
        Outcome::Ignored
    }
}

fn load_spice<S: KeyValueStore + ?Sized>(storage: &S, key: &str) -> SpiceLevel {
    match storage.get(key) {
        Ok(Some(raw)) => SpiceLevel::parse(&raw).unwrap_or_default(),
        Ok(None) => SpiceLevel::default(),
        Err(err) => {
            warn!(
                "event=spice_load module=journal status=fallback reason=storage_read_failed error={}",
                err
            );
            SpiceLevel::default()
        }
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Submit(_) => "submit",
        Command::BeginEdit(_) => "begin_edit",
        Command::CancelEdit => "cancel_edit",
        Command::Update { .. } => "update",
        Command::ToggleFavorite(_) => "toggle_favorite",
        Command::ToggleLived(_) => "toggle_lived",
        Command::Delete(_) => "delete",
        Command::EnterFocus(_) => "enter_focus",
        Command::ExitFocus => "exit_focus",
        Command::Move(_) => "move",
        Command::RandomFocus => "random_focus",
        Command::ToggleNote => "toggle_note",
        Command::ToggleChrome => "toggle_chrome",
        Command::CycleSpice => "cycle_spice",
        Command::GeneratePhrase => "generate_phrase",
        Command::SetPhrase(_) => "set_phrase",
        Command::ImportPack(_) => "import_pack",
    }
}
