//! Focus-mode cursor over the sorted entry view.
//!
//! # Responsibility
//! - Track whether focus mode is active and which view position it shows.
//! - Hold transient presentation flags (note visibility, hidden chrome).
//!
//! # Invariants
//! - The navigator never owns or mutates entries; it only stores an index
//!   into a view derived from the item store.
//! - After `clamp(len)` the index is `< len`, or `0` for an empty view.
//! - `move_by` wraps with Euclidean remainder for every integer step.

use crate::capability::RandomSource;
use crate::model::entry::Entry;
use crate::repo::item_store::SortedView;

/// What focus mode should present for the current view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusSlot<'a> {
    Inactive,
    /// Focus mode is active but there is nothing to show.
    Empty,
    Entry { index: usize, entry: &'a Entry },
}

/// Cursor and transient flags for focus mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusNavigator {
    active: bool,
    index: usize,
    show_note: bool,
    chrome_hidden: bool,
}

impl FocusNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn show_note(&self) -> bool {
        self.show_note
    }

    pub fn chrome_hidden(&self) -> bool {
        self.chrome_hidden
    }

    /// Whether the "reveal" control should be offered to bring chrome back.
    pub fn reveal_affordance_visible(&self) -> bool {
        self.active && self.chrome_hidden
    }

    /// Activates focus mode.
    ///
    /// With `at`, the cursor moves there (clamped); without it the cursor
    /// keeps its position.
    pub fn enter(&mut self, at: Option<usize>, len: usize) {
        if let Some(index) = at {
            self.index = index;
        }
        self.active = true;
        self.clamp(len);
    }

    /// Leaves focus mode and resets transient flags.
    pub fn exit(&mut self) {
        self.active = false;
        self.show_note = false;
        self.chrome_hidden = false;
    }

    /// Steps `step` positions with wraparound; no-op on an empty view.
    pub fn move_by(&mut self, step: isize, len: usize) {
        if len == 0 {
            return;
        }
        let len = len as i128;
        let next = (self.index as i128 + step as i128).rem_euclid(len);
        self.index = next as usize;
    }

    /// Jumps to a uniformly random position and activates focus mode.
    ///
    /// The cursor is untouched when the view is empty.
    pub fn random(&mut self, rng: &mut dyn RandomSource, len: usize) {
        self.active = true;
        if len == 0 {
            return;
        }
        self.index = rng.index_below(len);
    }

    pub fn toggle_note_visible(&mut self) {
        self.show_note = !self.show_note;
    }

    pub fn toggle_chrome_hidden(&mut self) {
        self.chrome_hidden = !self.chrome_hidden;
    }

    /// Pulls the cursor back into `0..len`.
    ///
    /// Must run before every render since deletions shrink the view.
    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.index = 0;
        } else if self.index >= len {
            self.index = len - 1;
        }
    }

    /// Resolves what to present for `view`, clamping first.
    pub fn current<'a>(&mut self, view: &SortedView<'a>) -> FocusSlot<'a> {
        self.clamp(view.len());
        if !self.active {
            return FocusSlot::Inactive;
        }
        match view.get(self.index) {
            Some(entry) => FocusSlot::Entry {
                index: self.index,
                entry,
            },
            None => FocusSlot::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FocusNavigator;

    #[test]
    fn move_by_wraps_in_both_directions() {
        let mut nav = FocusNavigator::new();
        nav.enter(Some(0), 4);
        nav.move_by(-1, 4);
        assert_eq!(nav.index(), 3);
        nav.move_by(2, 4);
        assert_eq!(nav.index(), 1);
        nav.move_by(-9, 4);
        assert_eq!(nav.index(), 0);
        nav.move_by(isize::MAX, 4);
        assert_eq!(nav.index(), (isize::MAX % 4) as usize);
    }

    #[test]
    fn move_by_is_noop_on_empty_view() {
        let mut nav = FocusNavigator::new();
        nav.move_by(3, 0);
        assert_eq!(nav.index(), 0);
    }

    #[test]
    fn enter_clamps_requested_index() {
        let mut nav = FocusNavigator::new();
        nav.enter(Some(10), 3);
        assert!(nav.is_active());
        assert_eq!(nav.index(), 2);
        nav.enter(None, 3);
        assert_eq!(nav.index(), 2);
    }

    #[test]
    fn exit_resets_transient_flags() {
        let mut nav = FocusNavigator::new();
        nav.enter(None, 2);
        nav.toggle_note_visible();
        nav.toggle_chrome_hidden();
        assert!(nav.reveal_affordance_visible());

        nav.exit();
        assert!(!nav.is_active());
        assert!(!nav.show_note());
        assert!(!nav.chrome_hidden());
        assert!(!nav.reveal_affordance_visible());
    }
}
