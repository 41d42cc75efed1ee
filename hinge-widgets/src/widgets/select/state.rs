//! Select widget state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use hinge::{
    Candidate, CandidateList, Direction, Disclosure, DisclosurePolicy, InputSurface, Rect,
    ValueProps, ValueStore, WidgetError, report_misconfiguration,
};

use crate::events::{EventContext, WidgetEvent, WidgetEventKind};
use crate::id::WidgetId;
use crate::overlay::{Placement, PositionResolver};
use crate::validation::{ErrorSlot, Validatable};
use crate::widgets::{list_panel_size, track_open_state};

/// Internal state for a Select widget.
struct SelectInner<K> {
    list: CandidateList<K>,
    value: ValueStore<Option<K>>,
    /// Placeholder text shown when nothing is selected
    placeholder: String,
    placement: Placement,
}

/// A dropdown single-choice list.
///
/// Opening highlights the current value. Up/Down move the highlight without
/// wrapping, Enter selects, Escape or a press outside the panel dismisses.
///
/// # Example
///
/// ```
/// use hinge::Candidate;
/// use hinge_widgets::Select;
///
/// let priority = Select::new([
///     Candidate::new("low", "Low"),
///     Candidate::new("high", "High"),
/// ])
/// .with_default("low")
/// .with_placeholder("Priority");
///
/// assert_eq!(priority.selected_label().as_deref(), Some("Low"));
/// ```
pub struct Select<K> {
    id: WidgetId,
    inner: Arc<RwLock<SelectInner<K>>>,
    /// Dirty flag for re-render
    dirty: Arc<AtomicBool>,
    disclosure: Disclosure,
    errors: ErrorSlot,
}

impl<K: Clone + PartialEq + Send + Sync + 'static> Select<K> {
    /// An uncontrolled select with nothing selected.
    pub fn new(items: impl IntoIterator<Item = Candidate<K>>) -> Self {
        Self::with_store(items, ValueStore::uncontrolled(None))
    }

    /// A select whose value is owned by the host. `on_change` receives every
    /// selection; the host answers with [`Select::set_value`].
    pub fn controlled(
        items: impl IntoIterator<Item = Candidate<K>>,
        value: Option<K>,
        on_change: impl Fn(&Option<K>) + Send + Sync + 'static,
    ) -> Self {
        Self::with_store(items, ValueStore::controlled(value, on_change))
    }

    /// Build from mount-time props. A value without a notifier is a
    /// misconfiguration.
    pub fn from_props(
        items: impl IntoIterator<Item = Candidate<K>>,
        props: ValueProps<Option<K>>,
    ) -> Result<Self, WidgetError> {
        Ok(Self::with_store(items, ValueStore::from_props_strict(props)?))
    }

    pub fn with_store(
        items: impl IntoIterator<Item = Candidate<K>>,
        value: ValueStore<Option<K>>,
    ) -> Self {
        let dirty = Arc::new(AtomicBool::new(false));
        let disclosure = Disclosure::new(DisclosurePolicy::single_select());
        track_open_state(&disclosure, &dirty);
        Self {
            id: WidgetId::next("select"),
            inner: Arc::new(RwLock::new(SelectInner {
                list: CandidateList::new(items),
                value,
                placeholder: String::new(),
                placement: Placement::Below,
            })),
            errors: ErrorSlot::new(Arc::clone(&dirty)),
            dirty,
            disclosure,
        }
    }

    /// Start with `id` selected. Only for uncontrolled selects; a notifier
    /// set with [`Select::on_change`] is kept.
    pub fn with_default(self, id: K) -> Self {
        if let Ok(mut guard) = self.inner.write()
            && let Err(err) = guard.value.set_default(Some(id))
        {
            report_misconfiguration(&err);
        }
        self
    }

    /// Notify `on_change` of every selection while keeping the value internal.
    pub fn on_change(self, notifier: impl Fn(&Option<K>) + Send + Sync + 'static) -> Self {
        if let Ok(mut guard) = self.inner.write() {
            let store = std::mem::replace(&mut guard.value, ValueStore::uncontrolled(None));
            guard.value = store.on_change(notifier);
        }
        self
    }

    pub fn with_placeholder(self, placeholder: impl Into<String>) -> Self {
        if let Ok(mut guard) = self.inner.write() {
            guard.placeholder = placeholder.into();
        }
        self
    }

    pub fn with_placement(self, placement: Placement) -> Self {
        if let Ok(mut guard) = self.inner.write() {
            guard.placement = placement;
        }
        self
    }

    pub fn with_policy(self, policy: DisclosurePolicy) -> Self {
        self.disclosure.set_policy(policy);
        self
    }

    /// Bind the ambient input surface for outside-press and Escape dismissal.
    pub fn with_surface(self, surface: InputSurface) -> Self {
        self.disclosure.bind_surface(surface);
        self
    }

    /// Get the unique ID for this select.
    pub fn id(&self) -> WidgetId {
        self.id
    }

    /// Get the ID as a string (for event matching).
    pub fn id_string(&self) -> String {
        self.id.to_string()
    }

    pub fn disclosure(&self) -> &Disclosure {
        &self.disclosure
    }

    // -------------------------------------------------------------------------
    // Selection state
    // -------------------------------------------------------------------------

    /// The authoritative selection.
    pub fn value(&self) -> Option<K> {
        self.inner
            .read()
            .map(|guard| guard.value.current().clone())
            .unwrap_or(None)
    }

    /// Host re-supplies the value of a controlled select.
    pub fn set_value(&self, value: Option<K>) -> Result<(), WidgetError> {
        let Ok(mut guard) = self.inner.write() else {
            return Ok(());
        };
        guard.value.set_external(value)?;
        self.dirty.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Label of the selected item.
    pub fn selected_label(&self) -> Option<String> {
        self.inner.read().ok().and_then(|guard| {
            let selected = guard.value.current().as_ref()?;
            let index = guard.list.position_of(selected)?;
            guard.list.items().get(index).map(|c| c.label.clone())
        })
    }

    /// Text for the trigger: the selected label or the placeholder.
    pub fn display_text(&self) -> String {
        self.selected_label().unwrap_or_else(|| self.placeholder())
    }

    pub fn placeholder(&self) -> String {
        self.inner
            .read()
            .map(|guard| guard.placeholder.clone())
            .unwrap_or_default()
    }

    /// Replace the items. The highlight resets to the first enabled item.
    pub fn set_items(&self, items: impl IntoIterator<Item = Candidate<K>>) {
        if let Ok(mut guard) = self.inner.write() {
            guard.list.set_items(items);
            self.dirty.store(true, Ordering::SeqCst);
        }
    }

    pub fn items(&self) -> Vec<Candidate<K>> {
        self.inner
            .read()
            .map(|guard| guard.list.items().to_vec())
            .unwrap_or_default()
    }

    pub fn highlighted_index(&self) -> Option<usize> {
        self.inner
            .read()
            .map(|guard| guard.list.highlighted_index())
            .unwrap_or(None)
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

    /// Open the dropdown with the current value highlighted.
    pub fn open(&self) -> bool {
        if !self.disclosure.activate() {
            return false;
        }
        if let Ok(mut guard) = self.inner.write() {
            let SelectInner { list, value, .. } = &mut *guard;
            match value.current() {
                Some(id) => {
                    list.highlight_id(id);
                }
                None => {
                    list.move_highlight(Direction::First);
                }
            }
        }
        self.dirty.store(true, Ordering::SeqCst);
        true
    }

    pub fn close(&self) -> bool {
        self.disclosure.close()
    }

    // -------------------------------------------------------------------------
    // Internal methods (called by event handlers)
    // -------------------------------------------------------------------------

    pub(super) fn move_highlight(&self, direction: Direction) -> bool {
        let Ok(mut guard) = self.inner.write() else {
            return false;
        };
        let changed = guard.list.move_highlight(direction);
        if changed {
            self.dirty.store(true, Ordering::SeqCst);
        }
        changed
    }

    /// Highlight the item on visible `row`. Returns whether that item is now
    /// highlighted (false for disabled rows and rows past the end).
    pub(super) fn highlight_row(&self, row: usize) -> bool {
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

    /// Forward the highlighted item to the value store, then apply the
    /// close-on-select policy. Returns false when nothing is highlighted.
    pub(super) fn select_highlighted(&self, cx: &EventContext) -> bool {
        let pending = {
            let Ok(mut guard) = self.inner.write() else {
                return false;
            };
            let Some(id) = guard.list.highlighted().map(|c| c.id.clone()) else {
                return false;
            };
            self.dirty.store(true, Ordering::SeqCst);
            guard.value.stage_change(Some(id))
        };
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

    // -------------------------------------------------------------------------
    // Geometry
    // -------------------------------------------------------------------------

    /// Record where the host drew the trigger.
    pub fn set_trigger_rect(&self, rect: Rect) {
        self.disclosure.set_trigger_rect(rect);
    }

    /// Place the dropdown panel with `resolver` and record it for hit
    /// testing. Returns None while closed or before the trigger is drawn.
    pub fn place(&self, screen: Rect, resolver: &dyn PositionResolver) -> Option<Rect> {
        if !self.is_open() {
            return None;
        }
        let anchor = self.disclosure.trigger_rect()?;
        let (size, placement) = {
            let guard = self.inner.read().ok()?;
            let size = list_panel_size(guard.list.visible().map(|(_, c)| c.label.as_str()));
            (size, guard.placement)
        };
        let panel = resolver.resolve(screen, anchor, size, placement);
        self.disclosure.set_panel_rect(panel);
        Some(panel)
    }

    // -------------------------------------------------------------------------
    // Dirty tracking
    // -------------------------------------------------------------------------

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }
}

impl<K> Clone for Select<K> {
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

impl<K> std::fmt::Debug for Select<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Select")
            .field("id", &self.id)
            .field("disclosure", &self.disclosure)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Validatable implementation
// -----------------------------------------------------------------------------

impl<K: Clone + PartialEq + Send + Sync + 'static> Validatable for Select<K> {
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
