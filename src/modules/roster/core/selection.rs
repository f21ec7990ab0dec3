use crate::modules::roster::core::duty::CellKey;
use std::collections::BTreeSet;

/// What a click on a cell did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    OpenEditor(CellKey),
    SelectionCleared,
    Selected(CellKey),
    Deselected(CellKey),
    Ignored,
}

/// Multi-cell selection. Never holds an empty set: the last deselect clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellSelection {
    keys: Option<BTreeSet<CellKey>>,
}

impl CellSelection {
    pub fn is_active(&self) -> bool {
        self.keys.is_some()
    }

    pub fn len(&self) -> usize {
        self.keys.as_ref().map_or(0, BTreeSet::len)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_none()
    }

    pub fn contains(&self, key: &CellKey) -> bool {
        self.keys.as_ref().is_some_and(|keys| keys.contains(key))
    }

    pub fn keys(&self) -> Vec<CellKey> {
        self.keys.iter().flatten().copied().collect()
    }

    /// Adds or removes a key; returns true if the key is now selected.
    pub fn toggle(&mut self, key: CellKey) -> bool {
        let keys = self.keys.get_or_insert_with(BTreeSet::new);
        let selected = if keys.remove(&key) {
            false
        } else {
            keys.insert(key);
            true
        };
        if keys.is_empty() {
            self.keys = None;
        }
        selected
    }

    pub fn clear(&mut self) {
        self.keys = None;
    }

    /// Plain click opens the editor unless a selection is active, in which
    /// case it only clears the selection. Modifier click toggles the key.
    pub fn click(&mut self, key: CellKey, with_modifier: bool) -> ClickOutcome {
        if with_modifier {
            return if self.toggle(key) {
                ClickOutcome::Selected(key)
            } else {
                ClickOutcome::Deselected(key)
            };
        }
        if self.is_active() {
            self.clear();
            return ClickOutcome::SelectionCleared;
        }
        ClickOutcome::OpenEditor(key)
    }
}

#[cfg(test)]
mod cell_selection_tests {
    use super::*;
    use crate::shared::core::primitives::UserId;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn key(user: u64, day: u32) -> CellKey {
        CellKey::new(UserId(user), NaiveDate::from_ymd_opt(2024, 6, day).unwrap())
    }

    #[rstest]
    fn it_should_collapse_to_none_when_the_last_key_is_removed() {
        let mut selection = CellSelection::default();
        assert!(selection.toggle(key(7, 3)));
        assert_eq!(selection.len(), 1);
        assert!(!selection.toggle(key(7, 3)));
        assert!(!selection.is_active());
        assert_eq!(selection, CellSelection::default());
    }

    #[rstest]
    fn it_should_open_the_editor_on_a_plain_click_without_selection() {
        let mut selection = CellSelection::default();
        assert_eq!(selection.click(key(7, 3), false), ClickOutcome::OpenEditor(key(7, 3)));
        assert!(!selection.is_active());
    }

    #[rstest]
    fn it_should_clear_the_selection_on_a_plain_click() {
        let mut selection = CellSelection::default();
        assert_eq!(selection.click(key(7, 3), true), ClickOutcome::Selected(key(7, 3)));
        assert_eq!(selection.click(key(9, 4), true), ClickOutcome::Selected(key(9, 4)));
        assert_eq!(selection.keys(), vec![key(7, 3), key(9, 4)]);

        assert_eq!(selection.click(key(1, 1), false), ClickOutcome::SelectionCleared);
        assert!(selection.keys().is_empty());
    }
}
