//! Exclusion selection for issuance surveys

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// One emitted exclusion: a category and the sub-types flagged under it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExclusionEntry {
    pub category: String,
    pub type_codes: Vec<String>,
}

/// Category name → selected type codes.
///
/// A category may be selected with no types yet; such a category blocks the
/// exclusions step and is never emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSelection {
    selected: BTreeMap<String, BTreeSet<String>>,
}

impl ExclusionSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_category(&mut self, category: &str) {
        if self.selected.remove(category).is_none() {
            self.selected.insert(category.to_string(), BTreeSet::new());
        }
    }

    /// Toggle a type code, selecting its category if needed
    pub fn toggle_type(&mut self, category: &str, code: &str) {
        let codes = self.selected.entry(category.to_string()).or_default();
        if !codes.remove(code) {
            codes.insert(code.to_string());
        }
    }

    pub fn is_category_selected(&self, category: &str) -> bool {
        self.selected.contains_key(category)
    }

    pub fn is_type_selected(&self, category: &str, code: &str) -> bool {
        self.selected
            .get(category)
            .is_some_and(|codes| codes.contains(code))
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Every selected category has at least one type
    pub fn is_complete(&self) -> bool {
        self.selected.values().all(|codes| !codes.is_empty())
    }

    /// Selected categories still missing a type
    pub fn incomplete_categories(&self) -> Vec<&str> {
        self.selected
            .iter()
            .filter(|(_, codes)| codes.is_empty())
            .map(|(category, _)| category.as_str())
            .collect()
    }

    /// Entries to send, with empty categories pruned
    pub fn emit(&self) -> Vec<ExclusionEntry> {
        self.selected
            .iter()
            .filter(|(_, codes)| !codes.is_empty())
            .map(|(category, codes)| ExclusionEntry {
                category: category.clone(),
                type_codes: codes.iter().cloned().collect(),
            })
            .collect()
    }
}
