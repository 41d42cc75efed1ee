//! Combobox widget - a text input that filters a dropdown list.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use hinge::{
    Candidate, CandidateList, Direction, Disclosure, DisclosurePolicy, DismissReason,
    InputSurface, Key, KeyPress, ListAction, Point, QueryMatcher, QueryText, Rect, SubstringMatcher, TextEditResult,
    ValueStore, WidgetError,
};

use crate::events::{EventContext, EventResult, WidgetEvent, WidgetEventKind, WidgetEvents};
use crate::filter::FuzzyMatcher;
use crate::id::WidgetId;
use crate::overlay::{Placement, PositionResolver};
use crate::validation::{ErrorSlot, Validatable};
use crate::widgets::{list_panel_size, panel_row, track_open_state};

type SharedMatcher = Arc<dyn QueryMatcher + Send + Sync>;

struct ComboboxInner<K> {
    list: CandidateList<K>,
    value: ValueStore<Option<K>>,
    query: QueryText,
    matcher: SharedMatcher,
    placeholder: String,
}

impl<K: Clone + PartialEq> ComboboxInner<K> {
    fn refilter(&mut self) {
        let matcher = Arc::clone(&self.matcher);
        self.list.set_query_with(self.query.as_str(), matcher.as_ref());
    }

    fn selected_label(&self) -> Option<String> {
        let selected = self.value.current().as_ref()?;
        let index = self.list.position_of(selected)?;
        self.list.items().get(index).map(|c| c.label.clone())
    }

    /// Put the selected label (or nothing) back into the input and show the
    /// full list again.
    fn reset_query(&mut self) {
        let label = self.selected_label().unwrap_or_default();
        self.query.set(label);
        let matcher = Arc::clone(&self.matcher);
        self.list.set_query_with("", matcher.as_ref());
    }
}

/// An editable text field with a filtered dropdown of suggestions.
///
/// Typing opens the dropdown and narrows it to matching items; the
/// highlight resets to the first match on every keystroke. Enter selects the
/// highlighted item and writes its label into the input. Escape closes and
/// restores the input to the current selection.
///
/// Matching is case-insensitive substring containment unless
/// [`Combobox::fuzzy`] is enabled.
pub struct Combobox<K> {
    id: WidgetId,
    inner: Arc<RwLock<ComboboxInner<K>>>,
    dirty: Arc<AtomicBool>,
    disclosure: Disclosure,
    errors: ErrorSlot,
}

impl<K: Clone + PartialEq + Send + Sync + 'static> Combobox<K> {
    pub fn new(items: impl IntoIterator<Item = Candidate<K>>) -> Self {
        Self::with_store(items, ValueStore::uncontrolled(None))
    }

    pub fn controlled(
        items: impl IntoIterator<Item = Candidate<K>>,
        value: Option<K>,
        on_change: impl Fn(&Option<K>) + Send + Sync + 'static,
    ) -> Self {
        Self::with_store(items, ValueStore::controlled(value, on_change))
    }

    pub fn with_store(
        items: impl IntoIterator<Item = Candidate<K>>,
        value: ValueStore<Option<K>>,
    ) -> Self {
        let dirty = Arc::new(AtomicBool::new(false));
        let disclosure = Disclosure::new(DisclosurePolicy::single_select());
        track_open_state(&disclosure, &dirty);
        let mut inner = ComboboxInner {
            list: CandidateList::new(items),
            value,
            query: QueryText::default(),
            matcher: Arc::new(SubstringMatcher),
            placeholder: String::new(),
        };
        inner.reset_query();
        let inner = Arc::new(RwLock::new(inner));

        // Every close restores the input, including Escape and outside
        // presses seen by the input surface. A selection has already written
        // the picked label.
        let weak = Arc::downgrade(&inner);
        disclosure.on_dismiss(move |reason| {
            if reason == DismissReason::Selection {
                return;
            }
            if let Some(inner) = weak.upgrade()
                && let Ok(mut guard) = inner.write()
            {
                guard.reset_query();
            }
        });

        Self {
            id: WidgetId::next("combobox"),
            inner,
            errors: ErrorSlot::new(Arc::clone(&dirty)),
            dirty,
            disclosure,
        }
    }

    /// Match typed text as a fuzzy subsequence instead of a substring.
    pub fn fuzzy(self) -> Self {
        self.with_matcher(FuzzyMatcher::new())
    }

    pub fn with_matcher(self, matcher: impl QueryMatcher + Send + Sync + 'static) -> Self {
        if let Ok(mut guard) = self.inner.write() {
            guard.matcher = Arc::new(matcher);
            guard.refilter();
        }
        self
    }

    pub fn with_placeholder(self, placeholder: impl Into<String>) -> Self {
        if let Ok(mut guard) = self.inner.write() {
            guard.placeholder = placeholder.into();
        }
        self
    }

    pub fn with_surface(self, surface: InputSurface) -> Self {
        self.disclosure.bind_surface(surface);
        self
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn id_string(&self) -> String {
        self.id.to_string()
    }

    pub fn disclosure(&self) -> &Disclosure {
        &self.disclosure
    }

    // -------------------------------------------------------------------------
    // Value and query
    // -------------------------------------------------------------------------

    pub fn value(&self) -> Option<K> {
        self.inner
            .read()
            .map(|guard| guard.value.current().clone())
            .unwrap_or(None)
    }

    /// Host re-supplies the value of a controlled combobox. The input text
    /// follows the new selection.
    pub fn set_value(&self, value: Option<K>) -> Result<(), WidgetError> {
        let Ok(mut guard) = self.inner.write() else {
            return Ok(());
        };
        guard.value.set_external(value)?;
        if !self.disclosure.is_open() {
            guard.reset_query();
        }
        self.dirty.store(true, Ordering::SeqCst);
        Ok(())
    }

    pub fn selected_label(&self) -> Option<String> {
        self.inner
            .read()
            .ok()
            .and_then(|guard| guard.selected_label())
    }

    /// Current input text.
    pub fn query(&self) -> String {
        self.inner
            .read()
            .map(|guard| guard.query.as_str().to_string())
            .unwrap_or_default()
    }

    pub fn cursor(&self) -> usize {
        self.inner
            .read()
            .map(|guard| guard.query.cursor())
            .unwrap_or(0)
    }

    /// Cell offset of the cursor inside the input, for placing the caret.
    pub fn cursor_column(&self) -> usize {
        self.inner
            .read()
            .map(|guard| guard.query.cursor_column())
            .unwrap_or(0)
    }

    pub fn placeholder(&self) -> String {
        self.inner
            .read()
            .map(|guard| guard.placeholder.clone())
            .unwrap_or_default()
    }

    /// Replace the input text and refilter, as if typed.
    pub fn set_query(&self, text: impl Into<String>) {
        if let Ok(mut guard) = self.inner.write() {
            guard.query.set(text);
            guard.refilter();
            self.dirty.store(true, Ordering::SeqCst);
        }
    }

    /// Labels of the items matching the query, in source order.
    pub fn visible_labels(&self) -> Vec<String> {
        self.inner
            .read()
            .map(|guard| guard.list.visible().map(|(_, c)| c.label.clone()).collect())
            .unwrap_or_default()
    }

    /// True when a query is typed and nothing matches it.
    pub fn is_empty_result(&self) -> bool {
        self.inner
            .read()
            .map(|guard| guard.list.is_empty_result())
            .unwrap_or(false)
    }

    pub fn highlighted_id(&self) -> Option<K> {
        self.inner
            .read()
            .ok()
            .and_then(|guard| guard.list.highlighted().map(|c| c.id.clone()))
    }

    // -------------------------------------------------------------------------
    // Open/close state
    // -------------------------------------------------------------------------

    pub fn is_open(&self) -> bool {
        self.disclosure.is_open()
    }

    pub fn open(&self) -> bool {
        if !self.disclosure.activate() {
            return false;
        }
        if let Ok(mut guard) = self.inner.write() {
            let ComboboxInner { list, value, .. } = &mut *guard;
            if let Some(id) = value.current() {
                list.highlight_id(id);
            }
        }
        self.dirty.store(true, Ordering::SeqCst);
        true
    }

    /// Close and restore the input text to the current selection.
    pub fn close(&self) -> bool {
        self.disclosure.close()
    }

    // -------------------------------------------------------------------------
    // Internal methods
    // -------------------------------------------------------------------------

    fn edit_query(&self, key: &KeyPress) -> TextEditResult {
        let Ok(mut guard) = self.inner.write() else {
            return TextEditResult::Ignored;
        };
        let result = guard.query.handle_key(key);
        match result {
            TextEditResult::Changed => {
                guard.refilter();
                self.dirty.store(true, Ordering::SeqCst);
            }
            TextEditResult::Handled => self.dirty.store(true, Ordering::SeqCst),
            TextEditResult::Submitted | TextEditResult::Ignored => {}
        }
        result
    }

    fn move_highlight(&self, direction: Direction) {
        if let Ok(mut guard) = self.inner.write()
            && guard.list.move_highlight(direction)
        {
            self.dirty.store(true, Ordering::SeqCst);
        }
    }

    fn highlight_row(&self, row: usize) -> bool {
        let Ok(mut guard) = self.inner.write() else {
            return false;
        };
        let Some(index) = guard.list.visible_to_index(row) else {
            return false;
        };
        if guard.list.highlight_index(index) {
            self.dirty.store(true, Ordering::SeqCst);
        }
        guard.list.highlighted_index() == Some(index)
    }

    fn select_highlighted(&self, cx: &EventContext) -> bool {
        let pending = {
            let Ok(mut guard) = self.inner.write() else {
                return false;
            };
            let Some((id, label)) = guard
                .list
                .highlighted()
                .map(|c| (c.id.clone(), c.label.clone()))
            else {
                return false;
            };
            let pending = guard.value.stage_change(Some(id));
            guard.query.set(label);
            self.dirty.store(true, Ordering::SeqCst);
            pending
        };
        self.errors.clear();

        let closed = self.disclosure.notify_selection();
        if closed && let Ok(mut guard) = self.inner.write() {
            let matcher = Arc::clone(&guard.matcher);
            guard.list.set_query_with("", matcher.as_ref());
        }
        if let Some(pending) = pending {
            pending.fire();
        }
        cx.push_event(WidgetEvent::new(WidgetEventKind::Change, self.id_string()));
        if closed {
            cx.push_event(WidgetEvent::new(WidgetEventKind::Close, self.id_string()));
        }
        true
    }

    // -------------------------------------------------------------------------
    // Geometry
    // -------------------------------------------------------------------------

    pub fn set_trigger_rect(&self, rect: Rect) {
        self.disclosure.set_trigger_rect(rect);
    }

    /// Place the suggestion panel below the input. An empty result still
    /// gets a one-row panel for the "no matches" line.
    pub fn place(&self, screen: Rect, resolver: &dyn PositionResolver) -> Option<Rect> {
        if !self.is_open() {
            return None;
        }
        let anchor = self.disclosure.trigger_rect()?;
        let size = {
            let guard = self.inner.read().ok()?;
            let (width, height) =
                list_panel_size(guard.list.visible().map(|(_, c)| c.label.as_str()));
            (width.max(anchor.width), height)
        };
        let panel = resolver.resolve(screen, anchor, size, Placement::Below);
        self.disclosure.set_panel_rect(panel);
        Some(panel)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }
}

impl<K: Clone + PartialEq + Send + Sync + 'static> WidgetEvents for Combobox<K> {
    fn on_key(&self, key: &KeyPress, cx: &EventContext) -> EventResult {
        if key.is_chord() {
            return EventResult::Ignored;
        }

        // List navigation keys; everything else edits the query.
        if matches!(
            key.key,
            Key::Up | Key::Down | Key::PageUp | Key::PageDown | Key::Enter | Key::Escape
        ) {
            return match ListAction::from_key(key, self.is_open()) {
                ListAction::Open => {
                    if self.open() {
                        cx.push_event(WidgetEvent::new(WidgetEventKind::Open, self.id_string()));
                    }
                    EventResult::Consumed
                }
                ListAction::Move(direction) => {
                    self.move_highlight(direction);
                    EventResult::Consumed
                }
                ListAction::Select => {
                    self.select_highlighted(cx);
                    EventResult::Consumed
                }
                ListAction::Dismiss => {
                    if self.disclosure.handle_key(key) {
                        cx.push_event(WidgetEvent::new(WidgetEventKind::Close, self.id_string()));
                    }
                    EventResult::Consumed
                }
                ListAction::None => EventResult::Ignored,
            };
        }

        match self.edit_query(key) {
            TextEditResult::Changed => {
                // Typing opens the dropdown
                if self.disclosure.activate() {
                    cx.push_event(WidgetEvent::new(WidgetEventKind::Open, self.id_string()));
                }
                EventResult::Consumed
            }
            TextEditResult::Handled | TextEditResult::Submitted => EventResult::Consumed,
            TextEditResult::Ignored => EventResult::Ignored,
        }
    }

    fn on_pointer_down(&self, x: u16, y: u16, cx: &EventContext) -> EventResult {
        let point = Point::new(x, y);

        if self.disclosure.trigger_rect().is_some_and(|r| r.contains(point)) {
            if self.open() {
                cx.push_event(WidgetEvent::new(WidgetEventKind::Open, self.id_string()));
            }
            return EventResult::Consumed;
        }

        if !self.is_open() {
            return EventResult::Ignored;
        }

        if let Some(row) = panel_row(self.disclosure.panel_rect(), point) {
            if self.highlight_row(row) {
                self.select_highlighted(cx);
            }
            return EventResult::Consumed;
        }

        if self.disclosure.handle_pointer_down(point) {
            cx.push_event(WidgetEvent::new(WidgetEventKind::Close, self.id_string()));
        }
        EventResult::Ignored
    }

    fn on_pointer_move(&self, x: u16, y: u16, _cx: &EventContext) -> EventResult {
        if !self.is_open() {
            return EventResult::Ignored;
        }
        match panel_row(self.disclosure.panel_rect(), Point::new(x, y)) {
            Some(row) => {
                self.highlight_row(row);
                EventResult::Consumed
            }
            None => EventResult::Ignored,
        }
    }

    fn on_blur(&self, cx: &EventContext) {
        if self.close() {
            cx.push_event(WidgetEvent::new(WidgetEventKind::Close, self.id_string()));
        }
    }
}

impl<K> Clone for Combobox<K> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
            dirty: Arc::clone(&self.dirty),
            disclosure: self.disclosure.clone(),
            errors: self.errors.clone(),
        }
    }
}

impl<K> std::fmt::Debug for Combobox<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Combobox")
            .field("id", &self.id)
            .field("disclosure", &self.disclosure)
            .finish_non_exhaustive()
    }
}

impl<K: Clone + PartialEq + Send + Sync + 'static> Validatable for Combobox<K> {
    type Value = Option<K>;

    fn validation_value(&self) -> Self::Value {
        self.value()
    }

    fn widget_id(&self) -> String {
        self.id_string()
    }

    fn error_slot(&self) -> &ErrorSlot {
        &self.errors
    }
}
