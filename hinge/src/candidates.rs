//! Navigable, query-filtered candidate lists.
//!
//! A [`CandidateList`] keeps every source item, marks which ones match the
//! live query, and tracks a highlighted index that always points at an
//! eligible item (enabled and matching) while any exists. Navigation clamps
//! at both ends instead of wrapping.

use std::fmt;

use crate::disclosure::Disclosure;
use crate::event::{Key, KeyPress};
use crate::value::ValueStore;

/// Decides whether a label matches a query.
pub trait QueryMatcher {
    fn matches(&self, query: &str, label: &str) -> bool;
}

/// Case-insensitive substring containment. An empty query matches everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl QueryMatcher for SubstringMatcher {
    fn matches(&self, query: &str, label: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        label.to_lowercase().contains(&query.to_lowercase())
    }
}

/// One selectable item.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<K> {
    pub id: K,
    pub label: String,
    pub disabled: bool,
    matches_query: bool,
}

impl<K> Candidate<K> {
    pub fn new(id: K, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            disabled: false,
            matches_query: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn matches_query(&self) -> bool {
        self.matches_query
    }

    /// Enabled and matching the current query.
    pub fn is_eligible(&self) -> bool {
        !self.disabled && self.matches_query
    }
}

impl<K: Clone + ToString> From<K> for Candidate<K> {
    fn from(id: K) -> Self {
        let label = id.to_string();
        Self::new(id, label)
    }
}

/// Highlight movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
    First,
    Last,
}

/// What a key press means for a list-backed overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    /// Open the overlay instead of moving a highlight that does not exist yet.
    Open,
    Move(Direction),
    Select,
    Dismiss,
    None,
}

impl ListAction {
    /// Shared keyboard routing for list widgets.
    pub fn from_key(key: &KeyPress, is_open: bool) -> Self {
        if key.is_chord() {
            return ListAction::None;
        }
        if !is_open {
            return match key.key {
                Key::Down | Key::Enter | Key::Char(' ') => ListAction::Open,
                _ => ListAction::None,
            };
        }
        match key.key {
            Key::Down => ListAction::Move(Direction::Next),
            Key::Up => ListAction::Move(Direction::Previous),
            Key::Home | Key::PageUp => ListAction::Move(Direction::First),
            Key::End | Key::PageDown => ListAction::Move(Direction::Last),
            Key::Enter => ListAction::Select,
            Key::Escape => ListAction::Dismiss,
            _ => ListAction::None,
        }
    }
}

/// An ordered, filterable list with a highlighted item.
#[derive(Clone, PartialEq)]
pub struct CandidateList<K> {
    items: Vec<Candidate<K>>,
    query: String,
    highlighted: Option<usize>,
}

impl<K> Default for CandidateList<K> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            query: String::new(),
            highlighted: None,
        }
    }
}

impl<K> CandidateList<K> {
    pub fn new(items: impl IntoIterator<Item = Candidate<K>>) -> Self {
        let mut list = Self {
            items: items.into_iter().collect(),
            query: String::new(),
            highlighted: None,
        };
        list.rebuild(&SubstringMatcher);
        list
    }

    /// Replace the source items. Re-applies the current query and resets
    /// the highlight.
    pub fn set_items(&mut self, items: impl IntoIterator<Item = Candidate<K>>) {
        self.items = items.into_iter().collect();
        self.rebuild(&SubstringMatcher);
    }

    /// Replace the source items, matching with a custom matcher.
    pub fn set_items_with(
        &mut self,
        items: impl IntoIterator<Item = Candidate<K>>,
        matcher: &dyn QueryMatcher,
    ) {
        self.items = items.into_iter().collect();
        self.rebuild(matcher);
    }

    pub fn items(&self) -> &[Candidate<K>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Items matching the query, with their source indices.
    pub fn visible(&self) -> impl Iterator<Item = (usize, &Candidate<K>)> {
        self.items.iter().enumerate().filter(|(_, c)| c.matches_query)
    }

    pub fn eligible_count(&self) -> usize {
        self.items.iter().filter(|c| c.is_eligible()).count()
    }

    /// True when the query filtered everything out. Drives the "no results"
    /// presentation, not an error.
    pub fn is_empty_result(&self) -> bool {
        self.highlighted.is_none()
    }

    /// Index into [`items`](Self::items) of the highlighted candidate.
    pub fn highlighted_index(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn highlighted(&self) -> Option<&Candidate<K>> {
        self.highlighted.and_then(|i| self.items.get(i))
    }

    /// Recompute query matches with case-insensitive substring containment
    /// and reset the highlight to the first eligible item.
    pub fn set_query(&mut self, text: impl Into<String>) {
        self.set_query_with(text, &SubstringMatcher);
    }

    pub fn set_query_with(&mut self, text: impl Into<String>, matcher: &dyn QueryMatcher) {
        self.query = text.into();
        self.rebuild(matcher);
    }

    fn rebuild(&mut self, matcher: &dyn QueryMatcher) {
        for item in &mut self.items {
            item.matches_query = matcher.matches(&self.query, &item.label);
        }
        self.highlighted = self.first_eligible();
        log::debug!(
            "CandidateList: rebuilt query={:?} eligible={} highlighted={:?}",
            self.query,
            self.eligible_count(),
            self.highlighted
        );
    }

    fn first_eligible(&self) -> Option<usize> {
        self.items.iter().position(Candidate::is_eligible)
    }

    fn last_eligible(&self) -> Option<usize> {
        self.items.iter().rposition(Candidate::is_eligible)
    }

    /// Move the highlight to the next eligible item in `direction`.
    ///
    /// Clamps at the ends. Returns whether the highlight changed.
    pub fn move_highlight(&mut self, direction: Direction) -> bool {
        let target = match (direction, self.highlighted) {
            (_, None) => self.first_eligible(),
            (Direction::First, _) => self.first_eligible(),
            (Direction::Last, _) => self.last_eligible(),
            (Direction::Next, Some(current)) => self
                .items
                .iter()
                .enumerate()
                .skip(current + 1)
                .find(|(_, c)| c.is_eligible())
                .map(|(i, _)| i)
                .or(Some(current)),
            (Direction::Previous, Some(current)) => self.items[..current]
                .iter()
                .rposition(Candidate::is_eligible)
                .or(Some(current)),
        };
        let changed = target != self.highlighted;
        self.highlighted = target;
        changed
    }

    /// Highlight a specific item (pointer hover). Ineligible targets are
    /// ignored.
    pub fn highlight_index(&mut self, index: usize) -> bool {
        match self.items.get(index) {
            Some(item) if item.is_eligible() => {
                let changed = self.highlighted != Some(index);
                self.highlighted = Some(index);
                changed
            }
            _ => false,
        }
    }

    /// Highlight the `n`-th visible row, as laid out in the overlay.
    pub fn highlight_visible(&mut self, row: usize) -> bool {
        let index = self.visible_to_index(row);
        index.is_some_and(|index| self.highlight_index(index))
    }

    /// Source index of the `n`-th visible row.
    pub fn visible_to_index(&self, row: usize) -> Option<usize> {
        self.visible().nth(row).map(|(i, _)| i)
    }
}

impl<K: PartialEq> CandidateList<K> {
    /// Highlight the item with `id` if it is eligible, otherwise the first
    /// eligible item. Used when an overlay opens on an existing selection.
    pub fn highlight_id(&mut self, id: &K) -> bool {
        let position = self.items.iter().position(|c| &c.id == id);
        match position {
            Some(index) if self.items[index].is_eligible() => {
                self.highlighted = Some(index);
                true
            }
            _ => {
                self.highlighted = self.first_eligible();
                false
            }
        }
    }

    pub fn position_of(&self, id: &K) -> Option<usize> {
        self.items.iter().position(|c| &c.id == id)
    }
}

impl<K: Clone> CandidateList<K> {
    /// Single-select: forward the highlighted id to `store`, then let the
    /// disclosure apply its close-on-select policy.
    ///
    /// Returns the selected id, or None when nothing is highlighted.
    pub fn select_highlighted(
        &self,
        store: &mut ValueStore<Option<K>>,
        disclosure: &Disclosure,
    ) -> Option<K> {
        let id = self.highlighted()?.id.clone();
        store.request_change(Some(id.clone()));
        disclosure.notify_selection();
        Some(id)
    }
}

impl<K: Clone + PartialEq> CandidateList<K> {
    /// Checklist: toggle the highlighted id in `store`'s set, then let the
    /// disclosure apply its close-on-select policy.
    pub fn toggle_highlighted(
        &self,
        store: &mut ValueStore<Vec<K>>,
        disclosure: &Disclosure,
    ) -> Option<K> {
        let id = self.highlighted()?.id.clone();
        let next = toggled(store.current(), &id);
        store.request_change(next);
        disclosure.notify_selection();
        Some(id)
    }
}

/// `values` with `id` removed if present, appended otherwise.
pub fn toggled<K: Clone + PartialEq>(values: &[K], id: &K) -> Vec<K> {
    if values.contains(id) {
        values.iter().filter(|v| *v != id).cloned().collect()
    } else {
        let mut next = values.to_vec();
        next.push(id.clone());
        next
    }
}

impl<K: fmt::Debug> fmt::Debug for CandidateList<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidateList")
            .field("len", &self.items.len())
            .field("query", &self.query)
            .field("highlighted", &self.highlighted)
            .finish()
    }
}
