//! Multi-predicate query over the registry's top-level editables.

use crate::editable::{Editable, EditableId};
use crate::registry::Registry;

/// Popup entry shown before a group or type is picked.
pub const NO_SELECTION_LABEL: &str = "Select...";
pub const ALL_LABEL: &str = "All";
/// Placeholder text a search field shows while empty. Treated as no search.
pub const SEARCH_PLACEHOLDER: &str = "Search...";

/// Value of the group or type filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Choice {
    /// Nothing picked yet. Narrows to nothing unless a search is active.
    #[default]
    NoSelection,
    All,
    Named(String),
}

impl Choice {
    pub fn named(name: impl Into<String>) -> Self {
        Choice::Named(name.into())
    }

    /// Reads a choice the way a popup reports it.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw == NO_SELECTION_LABEL {
            Choice::NoSelection
        } else if raw.eq_ignore_ascii_case(ALL_LABEL) {
            Choice::All
        } else {
            Choice::Named(raw.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Choice::NoSelection => NO_SELECTION_LABEL,
            Choice::All => ALL_LABEL,
            Choice::Named(name) => name,
        }
    }

    fn passes(&self, value: Option<&str>) -> bool {
        match self {
            Choice::NoSelection => false,
            Choice::All => true,
            Choice::Named(name) => value == Some(name.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterQuery {
    pub group: Choice,
    pub type_name: Choice,
    pub modified_only: bool,
    pub search: String,
}

impl FilterQuery {
    /// Query that lets everything through.
    pub fn everything() -> Self {
        Self { group: Choice::All, type_name: Choice::All, modified_only: false, search: String::new() }
    }

    /// Lowercased whitespace-separated search tokens.
    pub fn tokens(&self) -> Vec<String> {
        let search = self.search.trim();
        if search == SEARCH_PLACEHOLDER {
            return Vec::new();
        }
        search.split_whitespace().map(str::to_lowercase).collect()
    }

    /// Tests one editable. `group` is the editable's group name, if any.
    pub fn matches(&self, entity: &dyn Editable, group: Option<&str>) -> bool {
        let tokens = self.tokens();
        self.matches_with(&tokens, entity, group)
    }

    fn matches_with(&self, tokens: &[String], entity: &dyn Editable, group: Option<&str>) -> bool {
        let searching = !tokens.is_empty();
        let narrows = |choice: &Choice| !(searching && *choice == Choice::NoSelection);
        if narrows(&self.group) && !self.group.passes(group) {
            return false;
        }
        if narrows(&self.type_name) && !self.type_name.passes(Some(entity.type_name())) {
            return false;
        }
        if self.modified_only && !entity.deviates_from_initial() {
            return false;
        }
        if !searching {
            return true;
        }
        let type_name = entity.type_name().to_lowercase();
        let label = entity.label().to_lowercase();
        tokens.iter().all(|token| type_name.contains(token.as_str()) || label.contains(token.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRow {
    pub id: EditableId,
    pub label: String,
}

/// Matching top-level editables in registry order.
pub fn apply(query: &FilterQuery, registry: &Registry) -> Vec<FilterRow> {
    let tokens = query.tokens();
    registry
        .entries()
        .filter(|entity| query.matches_with(&tokens, *entity, registry.group_name(*entity)))
        .map(|entity| FilterRow { id: entity.id().clone(), label: entity.label().to_string() })
        .collect()
}

/// Keeps the selection if it survived the filter, otherwise falls back to the first row.
pub fn reconcile_selection(rows: &[FilterRow], current: Option<&EditableId>) -> Option<EditableId> {
    match current {
        Some(id) if rows.iter().any(|row| &row.id == id) => Some(id.clone()),
        _ => rows.first().map(|row| row.id.clone()),
    }
}

/// Current predicates and the rows they produced.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    query: FilterQuery,
    rows: Vec<FilterRow>,
}

impl FilterState {
    pub fn new(query: FilterQuery) -> Self {
        Self { query, rows: Vec::new() }
    }

    pub fn query(&self) -> &FilterQuery {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut FilterQuery {
        &mut self.query
    }

    pub fn rows(&self) -> &[FilterRow] {
        &self.rows
    }

    /// Recomputes the rows and returns the id that should be selected next.
    pub fn recompute(&mut self, registry: &Registry) -> Option<EditableId> {
        self.rows = apply(&self.query, registry);
        reconcile_selection(&self.rows, registry.selected())
    }
}
