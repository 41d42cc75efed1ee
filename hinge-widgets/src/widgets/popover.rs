//! Popover widget - a trigger with a host-drawn floating panel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use hinge::{Disclosure, DisclosurePolicy, InputSurface, Key, KeyPress, Point, Rect};

use crate::events::{EventContext, EventResult, WidgetEvent, WidgetEventKind, WidgetEvents};
use crate::id::WidgetId;
use crate::overlay::{Placement, PositionResolver};
use crate::widgets::track_open_state;

#[derive(Debug)]
struct PopoverInner {
    placement: Placement,
    /// Panel size requested by the host
    size: (u16, u16),
}

/// A floating panel whose content the host draws.
///
/// The trigger toggles it; Escape and presses outside close it. Content
/// actions that should close the panel call [`Popover::content_selected`],
/// which honors the close-on-select policy.
#[derive(Debug, Clone)]
pub struct Popover {
    id: WidgetId,
    inner: Arc<RwLock<PopoverInner>>,
    dirty: Arc<AtomicBool>,
    disclosure: Disclosure,
}

impl Popover {
    pub fn new(width: u16, height: u16) -> Self {
        let dirty = Arc::new(AtomicBool::new(false));
        let disclosure = Disclosure::new(DisclosurePolicy::default());
        track_open_state(&disclosure, &dirty);
        Self {
            id: WidgetId::next("popover"),
            inner: Arc::new(RwLock::new(PopoverInner {
                placement: Placement::Below,
                size: (width, height),
            })),
            dirty,
            disclosure,
        }
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

    pub fn with_surface(self, surface: InputSurface) -> Self {
        self.disclosure.bind_surface(surface);
        self
    }

    /// Start open, e.g. for onboarding hints.
    pub fn default_open(self) -> Self {
        self.disclosure.open();
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

    pub fn is_open(&self) -> bool {
        self.disclosure.is_open()
    }

    pub fn open(&self) -> bool {
        self.disclosure.activate()
    }

    pub fn close(&self) -> bool {
        self.disclosure.close()
    }

    pub fn toggle(&self) -> bool {
        self.disclosure.toggle()
    }

    /// Something inside the panel was chosen.
    pub fn content_selected(&self) -> bool {
        self.disclosure.notify_selection()
    }

    pub fn set_size(&self, width: u16, height: u16) {
        if let Ok(mut guard) = self.inner.write() {
            guard.size = (width, height);
            self.dirty.store(true, Ordering::SeqCst);
        }
    }

    pub fn set_trigger_rect(&self, rect: Rect) {
        self.disclosure.set_trigger_rect(rect);
    }

    pub fn place(&self, screen: Rect, resolver: &dyn PositionResolver) -> Option<Rect> {
        if !self.is_open() {
            return None;
        }
        let anchor = self.disclosure.trigger_rect()?;
        let (size, placement) = {
            let guard = self.inner.read().ok()?;
            (guard.size, guard.placement)
        };
        let panel = resolver.resolve(screen, anchor, size, placement);
        self.disclosure.set_panel_rect(panel);
        Some(panel)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }

    fn push_transition(&self, opened: bool, cx: &EventContext) {
        let kind = if opened {
            WidgetEventKind::Open
        } else {
            WidgetEventKind::Close
        };
        cx.push_event(WidgetEvent::new(kind, self.id_string()));
    }
}

impl WidgetEvents for Popover {
    fn on_key(&self, key: &KeyPress, cx: &EventContext) -> EventResult {
        if key.is_chord() {
            return EventResult::Ignored;
        }
        match key.key {
            Key::Enter | Key::Char(' ') if !self.is_open() => {
                if self.open() {
                    self.push_transition(true, cx);
                }
                EventResult::Consumed
            }
            Key::Escape if self.is_open() => {
                if self.disclosure.handle_key(key) {
                    self.push_transition(false, cx);
                }
                EventResult::Consumed
            }
            _ => EventResult::Ignored,
        }
    }

    fn on_pointer_down(&self, x: u16, y: u16, cx: &EventContext) -> EventResult {
        let point = Point::new(x, y);
        if self.disclosure.trigger_rect().is_some_and(|r| r.contains(point)) {
            let was_open = self.is_open();
            if self.toggle() {
                self.push_transition(!was_open, cx);
            }
            return EventResult::Consumed;
        }
        if !self.is_open() {
            return EventResult::Ignored;
        }
        if self.disclosure.contains_point(point) {
            // Inside the panel: the host's content handles it
            return EventResult::Ignored;
        }
        if self.disclosure.handle_pointer_down(point) {
            self.push_transition(false, cx);
        }
        EventResult::Ignored
    }
}
