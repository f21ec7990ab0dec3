// Checkbox state of the export dialog.

use crate::modules::export::core::catalog::{self, FieldGroup, GroupKind, CATALOG};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown export field or group {0:?}")]
pub struct UnknownField(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupState {
    Checked,
    Unchecked,
    Indeterminate,
}

/// Selected wire keys: single fields of field groups, group keys of bundles.
/// Starts with everything selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    selected: BTreeSet<&'static str>,
}

impl Default for FieldSelection {
    fn default() -> Self {
        Self {
            selected: catalog::wire_keys().into_iter().collect(),
        }
    }
}

fn members(group: &FieldGroup) -> Vec<&'static str> {
    match group.kind {
        GroupKind::Fields => group.fields.iter().map(|field| field.key).collect(),
        GroupKind::Bundle => vec![group.key],
    }
}

impl FieldSelection {
    pub fn none() -> Self {
        Self {
            selected: BTreeSet::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn group_state(&self, group_key: &str) -> Result<GroupState, UnknownField> {
        let group = catalog::group(group_key).ok_or_else(|| UnknownField(group_key.to_string()))?;
        let members = members(group);
        let checked = members
            .iter()
            .filter(|key| self.selected.contains(*key))
            .count();
        Ok(match checked {
            0 => GroupState::Unchecked,
            n if n == members.len() => GroupState::Checked,
            _ => GroupState::Indeterminate,
        })
    }

    /// A bundle child reads as selected when its bundle is.
    pub fn is_field_selected(&self, field_key: &str) -> bool {
        match catalog::group_of_field(field_key) {
            Some(group) if group.kind == GroupKind::Bundle => self.selected.contains(group.key),
            Some(_) => self.selected.contains(field_key),
            None => false,
        }
    }

    /// Checked groups clear; unchecked and indeterminate groups fill up.
    pub fn toggle_group(&mut self, group_key: &str) -> Result<GroupState, UnknownField> {
        let state = self.group_state(group_key)?;
        let group = catalog::group(group_key).ok_or_else(|| UnknownField(group_key.to_string()))?;
        for key in members(group) {
            if state == GroupState::Checked {
                self.selected.remove(key);
            } else {
                self.selected.insert(key);
            }
        }
        self.group_state(group_key)
    }

    /// Toggles one field. Any child of a bundle toggles the whole bundle.
    pub fn toggle_field(&mut self, field_key: &str) -> Result<bool, UnknownField> {
        let group = catalog::group_of_field(field_key).ok_or_else(|| UnknownField(field_key.to_string()))?;
        let key = match group.kind {
            GroupKind::Bundle => group.key,
            GroupKind::Fields => group
                .fields
                .iter()
                .map(|field| field.key)
                .find(|key| *key == field_key)
                .ok_or_else(|| UnknownField(field_key.to_string()))?,
        };
        if self.selected.remove(key) {
            Ok(false)
        } else {
            self.selected.insert(key);
            Ok(true)
        }
    }

    /// Selected keys in catalog order.
    pub fn wire_fields(&self) -> Vec<&'static str> {
        catalog::wire_keys()
            .into_iter()
            .filter(|key| self.selected.contains(key))
            .collect()
    }

    /// The `fields` request parameter.
    pub fn to_wire(&self) -> String {
        self.wire_fields().join(",")
    }

    pub fn groups() -> &'static [FieldGroup] {
        CATALOG
    }
}
