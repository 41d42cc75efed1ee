//! Widget event handling types and traits.
//!
//! Widgets handle their own input through [`WidgetEvents`] and report what
//! happened by pushing [`WidgetEvent`]s to the [`EventContext`]. The host
//! drains the receiving end of the channel after each interaction.

use std::time::Instant;

use hinge::{InputEvent, KeyPress};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

// =============================================================================
// Widget Event Types
// =============================================================================

/// What happened to a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetEventKind {
    /// The widget's overlay opened.
    Open,
    /// The widget's overlay closed through one of its own handlers.
    Close,
    /// The widget requested a value change.
    Change,
    /// User input was rejected (see the event message).
    Reject,
}

/// A widget event to be handled by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetEvent {
    pub kind: WidgetEventKind,
    /// ID of the widget that produced the event
    pub widget_id: String,
    /// Rejection reason for [`WidgetEventKind::Reject`], or the activated
    /// item id for menu changes.
    pub message: Option<String>,
}

impl WidgetEvent {
    pub fn new(kind: WidgetEventKind, widget_id: impl Into<String>) -> Self {
        Self {
            kind,
            widget_id: widget_id.into(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn rejected(widget_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: WidgetEventKind::Reject,
            widget_id: widget_id.into(),
            message: Some(message.into()),
        }
    }
}

/// Where widgets push their events, plus the clock they read.
///
/// Cheap to clone. A detached context drops every event.
#[derive(Debug, Clone, Default)]
pub struct EventContext {
    sender: Option<UnboundedSender<WidgetEvent>>,
}

impl EventContext {
    /// A context and the receiver the host drains.
    pub fn channel() -> (Self, UnboundedReceiver<WidgetEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { sender: Some(tx) }, rx)
    }

    pub fn detached() -> Self {
        Self { sender: None }
    }

    pub fn push_event(&self, event: WidgetEvent) {
        let Some(sender) = &self.sender else {
            return;
        };
        if sender.send(event).is_err() {
            log::debug!("EventContext: receiver dropped, event discarded");
        }
    }

    /// Current time on the tokio clock, so paused-time tests drive hover
    /// deadlines. Falls back to the system clock outside a runtime.
    pub fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}

// =============================================================================
// Event Result
// =============================================================================

/// Result of handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Event was ignored, try other handlers.
    Ignored,
    /// Event was consumed, stop propagation.
    Consumed,
    /// Event started a drag operation on this widget.
    StartDrag,
}

impl EventResult {
    /// Check if the event was handled (consumed or started drag).
    pub fn is_handled(&self) -> bool {
        !matches!(self, EventResult::Ignored)
    }
}

/// Trait for widgets that handle input.
///
/// All methods default to [`EventResult::Ignored`], so widgets only
/// implement what they care about. Coordinates are absolute cells.
pub trait WidgetEvents {
    /// A key press while the widget has focus.
    fn on_key(&self, _key: &KeyPress, _cx: &EventContext) -> EventResult {
        EventResult::Ignored
    }

    /// A pointer press routed to this widget (trigger or overlay panel).
    fn on_pointer_down(&self, _x: u16, _y: u16, _cx: &EventContext) -> EventResult {
        EventResult::Ignored
    }

    /// Pointer movement over the widget or its overlay.
    fn on_pointer_move(&self, _x: u16, _y: u16, _cx: &EventContext) -> EventResult {
        EventResult::Ignored
    }

    /// Pointer movement after `on_pointer_down` returned `StartDrag`.
    fn on_drag(&self, _x: u16, _y: u16, _cx: &EventContext) -> EventResult {
        EventResult::Ignored
    }

    /// The drag ended.
    fn on_release(&self, _cx: &EventContext) -> EventResult {
        EventResult::Ignored
    }

    /// Focus left the widget.
    fn on_blur(&self, _cx: &EventContext) {}
}

/// Route one input event to a widget.
pub fn dispatch(widget: &dyn WidgetEvents, event: &InputEvent, cx: &EventContext) -> EventResult {
    match *event {
        InputEvent::KeyDown(key) => widget.on_key(&key, cx),
        InputEvent::PointerDown { x, y, .. } => widget.on_pointer_down(x, y, cx),
        InputEvent::PointerMove { x, y } => widget.on_pointer_move(x, y, cx),
    }
}
