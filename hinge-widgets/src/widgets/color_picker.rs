//! ColorPicker widget - swatches plus a hex entry field.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use hinge::editors::{ColorDraft, HexColor};
use hinge::{
    Candidate, CandidateList, Direction, Disclosure, DisclosurePolicy, InputSurface, Key,
    KeyPress, Point, QueryText, Rect, TextEditResult, ValueStore, WidgetError,
};

use crate::events::{EventContext, EventResult, WidgetEvent, WidgetEventKind, WidgetEvents};
use crate::id::WidgetId;
use crate::overlay::{Placement, PositionResolver};
use crate::validation::{ErrorSlot, Validatable};
use crate::widgets::{list_panel_size, track_open_state};

struct ColorPickerInner {
    value: ValueStore<HexColor>,
    swatches: CandidateList<HexColor>,
    draft: ColorDraft,
    /// Cursor state for the hex field
    entry: QueryText,
}

impl ColorPickerInner {
    fn sync_draft(&mut self) {
        let current = *self.value.current();
        self.draft.sync(current);
        self.entry.set(self.draft.text());
    }
}

/// A color field with a panel of named swatches and a `#rrggbb` entry.
///
/// The panel's first row is the hex entry, followed by one row per swatch.
/// Typing edits the entry; as soon as it holds a complete `#RRGGBB` color
/// that color is committed. Incomplete text stays in the entry without
/// touching the value. Enter on an incomplete entry is rejected, otherwise
/// it picks the highlighted swatch. Escape and blur throw away an
/// incomplete entry.
pub struct ColorPicker {
    id: WidgetId,
    inner: Arc<RwLock<ColorPickerInner>>,
    dirty: Arc<AtomicBool>,
    disclosure: Disclosure,
    errors: ErrorSlot,
}

impl ColorPicker {
    pub fn new(value: HexColor) -> Self {
        Self::with_store(ValueStore::uncontrolled(value))
    }

    pub fn controlled(
        value: HexColor,
        on_change: impl Fn(&HexColor) + Send + Sync + 'static,
    ) -> Self {
        Self::with_store(ValueStore::controlled(value, on_change))
    }

    pub fn with_store(value: ValueStore<HexColor>) -> Self {
        let dirty = Arc::new(AtomicBool::new(false));
        let disclosure = Disclosure::new(DisclosurePolicy::single_select());
        track_open_state(&disclosure, &dirty);
        let draft = ColorDraft::new(*value.current());
        let entry = QueryText::new(draft.text());
        Self {
            id: WidgetId::next("color_picker"),
            inner: Arc::new(RwLock::new(ColorPickerInner {
                value,
                swatches: CandidateList::default(),
                draft,
                entry,
            })),
            errors: ErrorSlot::new(Arc::clone(&dirty)),
            dirty,
            disclosure,
        }
    }

    pub fn with_swatches(
        self,
        swatches: impl IntoIterator<Item = (HexColor, impl Into<String>)>,
    ) -> Self {
        if let Ok(mut guard) = self.inner.write() {
            guard.swatches.set_items(
                swatches
                    .into_iter()
                    .map(|(color, label)| Candidate::new(color, label)),
            );
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
    // Value and draft
    // -------------------------------------------------------------------------

    pub fn value(&self) -> HexColor {
        self.inner
            .read()
            .map(|guard| *guard.value.current())
            .unwrap_or_default()
    }

    pub fn set_value(&self, value: HexColor) -> Result<(), WidgetError> {
        let Ok(mut guard) = self.inner.write() else {
            return Ok(());
        };
        guard.value.set_external(value)?;
        guard.sync_draft();
        self.dirty.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Text of the hex entry, possibly incomplete.
    pub fn draft_text(&self) -> String {
        self.inner
            .read()
            .map(|guard| guard.draft.text().to_string())
            .unwrap_or_default()
    }

    pub fn draft_is_valid(&self) -> bool {
        self.inner
            .read()
            .map(|guard| guard.draft.is_valid())
            .unwrap_or(true)
    }

    pub fn swatch_labels(&self) -> Vec<String> {
        self.inner
            .read()
            .map(|guard| guard.swatches.items().iter().map(|c| c.label.clone()).collect())
            .unwrap_or_default()
    }

    pub fn highlighted_swatch(&self) -> Option<HexColor> {
        self.inner
            .read()
            .ok()
            .and_then(|guard| guard.swatches.highlighted().map(|c| c.id))
    }

    // -------------------------------------------------------------------------
    // Open/close state
    // -------------------------------------------------------------------------

    pub fn is_open(&self) -> bool {
        self.disclosure.is_open()
    }

    /// Open with the current color's swatch highlighted, if it has one.
    pub fn open(&self) -> bool {
        if !self.disclosure.activate() {
            return false;
        }
        if let Ok(mut guard) = self.inner.write() {
            let current = *guard.value.current();
            guard.swatches.highlight_id(&current);
            guard.sync_draft();
        }
        true
    }

    /// Close, discarding an incomplete entry.
    pub fn close(&self) -> bool {
        let closed = self.disclosure.close();
        if closed {
            self.revert_draft();
        }
        closed
    }

    // -------------------------------------------------------------------------
    // Internal methods
    // -------------------------------------------------------------------------

    fn revert_draft(&self) {
        if let Ok(mut guard) = self.inner.write() {
            guard.draft.revert();
            let text = guard.draft.text().to_string();
            guard.entry.set(text);
            self.dirty.store(true, Ordering::SeqCst);
        }
        self.errors.clear();
    }

    /// Edit the hex entry. Commits when the entry becomes a new valid color.
    fn edit_entry(&self, key: &KeyPress, cx: &EventContext) -> TextEditResult {
        let (result, committed) = {
            let Ok(mut guard) = self.inner.write() else {
                return TextEditResult::Ignored;
            };
            let result = guard.entry.handle_key(key);
            if result != TextEditResult::Changed {
                return result;
            }
            let text = guard.entry.as_str().to_string();
            let committed = guard
                .draft
                .set_text(text)
                .map(|color| guard.value.stage_change(color));
            self.dirty.store(true, Ordering::SeqCst);
            (result, committed)
        };
        if self.draft_is_valid() {
            self.errors.clear();
        }
        // Reported even when an uncontrolled picker has no notifier.
        if let Some(staged) = committed {
            if let Some(pending) = staged {
                pending.fire();
            }
            cx.push_event(WidgetEvent::new(WidgetEventKind::Change, self.id_string()));
        }
        result
    }

    fn move_highlight(&self, direction: Direction) {
        if let Ok(mut guard) = self.inner.write()
            && guard.swatches.move_highlight(direction)
        {
            self.dirty.store(true, Ordering::SeqCst);
        }
    }

    /// Commit the highlighted swatch and apply close-on-select.
    fn pick_highlighted(&self, cx: &EventContext) -> bool {
        let pending = {
            let Ok(mut guard) = self.inner.write() else {
                return false;
            };
            let Some(color) = guard.swatches.highlighted().map(|c| c.id) else {
                return false;
            };
            guard.draft.sync(color);
            guard.entry.set(color.to_string());
            guard.value.stage_change(color)
        };
        self.dirty.store(true, Ordering::SeqCst);
        self.errors.clear();

        let closed = self.disclosure.notify_selection();
        if let Some(pending) = pending {
            pending.fire();
        }
        cx.push_event(WidgetEvent::new(WidgetEventKind::Change, self.id_string()));
        if closed {
            cx.push_event(WidgetEvent::new(WidgetEventKind::Close, self.id_string()));
        }
        true
    }

    fn reject_draft(&self, cx: &EventContext) -> bool {
        let rejection = {
            let Ok(guard) = self.inner.read() else {
                return false;
            };
            match HexColor::parse(guard.draft.text()) {
                Ok(_) => return false,
                Err(rejection) => rejection,
            }
        };
        log::debug!("ColorPicker {}: {rejection}", self.id);
        let message = rejection.to_string();
        self.errors.set(message.clone());
        cx.push_event(WidgetEvent::rejected(self.id_string(), message));
        true
    }

    // -------------------------------------------------------------------------
    // Geometry
    // -------------------------------------------------------------------------

    pub fn set_trigger_rect(&self, rect: Rect) {
        self.disclosure.set_trigger_rect(rect);
    }

    pub fn place(&self, screen: Rect, resolver: &dyn PositionResolver) -> Option<Rect> {
        if !self.is_open() {
            return None;
        }
        let anchor = self.disclosure.trigger_rect()?;
        let size = {
            let guard = self.inner.read().ok()?;
            let (width, rows) =
                list_panel_size(guard.swatches.items().iter().map(|c| c.label.as_str()));
            // Entry row "#rrggbb" plus swatch rows
            (width.max(9), rows.saturating_add(1))
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

impl WidgetEvents for ColorPicker {
    fn on_key(&self, key: &KeyPress, cx: &EventContext) -> EventResult {
        if key.is_chord() {
            return EventResult::Ignored;
        }
        if !self.is_open() {
            return match key.key {
                Key::Enter | Key::Char(' ') | Key::Down => {
                    if self.open() {
                        cx.push_event(WidgetEvent::new(WidgetEventKind::Open, self.id_string()));
                    }
                    EventResult::Consumed
                }
                _ => EventResult::Ignored,
            };
        }

        match key.key {
            Key::Up => {
                self.move_highlight(Direction::Previous);
                EventResult::Consumed
            }
            Key::Down => {
                self.move_highlight(Direction::Next);
                EventResult::Consumed
            }
            Key::Enter => {
                if !self.reject_draft(cx) {
                    self.pick_highlighted(cx);
                }
                EventResult::Consumed
            }
            Key::Escape => {
                if self.disclosure.handle_key(key) {
                    self.revert_draft();
                    cx.push_event(WidgetEvent::new(WidgetEventKind::Close, self.id_string()));
                }
                EventResult::Consumed
            }
            _ => match self.edit_entry(key, cx) {
                TextEditResult::Ignored => EventResult::Ignored,
                _ => EventResult::Consumed,
            },
        }
    }

    fn on_pointer_down(&self, x: u16, y: u16, cx: &EventContext) -> EventResult {
        let point = Point::new(x, y);

        if self.disclosure.trigger_rect().is_some_and(|r| r.contains(point)) {
            if self.is_open() {
                if self.close() {
                    cx.push_event(WidgetEvent::new(WidgetEventKind::Close, self.id_string()));
                }
            } else if self.open() {
                cx.push_event(WidgetEvent::new(WidgetEventKind::Open, self.id_string()));
            }
            return EventResult::Consumed;
        }

        if !self.is_open() {
            return EventResult::Ignored;
        }

        if let Some(panel) = self.disclosure.panel_rect()
            && panel.contains(point)
        {
            // Row 0 is the hex entry, swatches follow
            if let Some(swatch) = usize::from(point.y - panel.y).checked_sub(1) {
                let highlighted = self
                    .inner
                    .write()
                    .map(|mut guard| {
                        guard.swatches.highlight_index(swatch);
                        guard.swatches.highlighted_index() == Some(swatch)
                    })
                    .unwrap_or(false);
                if highlighted {
                    self.pick_highlighted(cx);
                }
            }
            return EventResult::Consumed;
        }

        if self.disclosure.handle_pointer_down(point) {
            self.revert_draft();
            cx.push_event(WidgetEvent::new(WidgetEventKind::Close, self.id_string()));
        }
        EventResult::Ignored
    }

    fn on_blur(&self, cx: &EventContext) {
        if self.close() {
            cx.push_event(WidgetEvent::new(WidgetEventKind::Close, self.id_string()));
        } else {
            self.revert_draft();
        }
    }
}

impl Clone for ColorPicker {
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

impl std::fmt::Debug for ColorPicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColorPicker")
            .field("id", &self.id)
            .field("value", &self.value())
            .field("disclosure", &self.disclosure)
            .finish_non_exhaustive()
    }
}

impl Validatable for ColorPicker {
    type Value = HexColor;

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
