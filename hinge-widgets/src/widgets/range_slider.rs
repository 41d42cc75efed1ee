//! RangeSlider widget - a two-thumb slider over a horizontal track.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use hinge::editors::{RangeEditor, RangeValue, SliderConfig, Thumb, TrackGeometry};
use hinge::{Key, KeyPress, Point, Rect, ValueStore, WidgetError, report_misconfiguration};

use crate::events::{EventContext, EventResult, WidgetEvent, WidgetEventKind, WidgetEvents};
use crate::id::WidgetId;
use crate::validation::{ErrorSlot, Validatable};

/// Steps moved by PageUp/PageDown.
const PAGE_STEPS: i32 = 10;

struct RangeSliderInner {
    value: ValueStore<[f64; 2]>,
    editor: RangeEditor,
    /// Thumb moved by the keyboard
    focused: Thumb,
    track: Option<Rect>,
}

impl RangeSliderInner {
    /// Bring the editor in line with the authoritative value.
    fn sync_editor(&mut self) {
        let current = RangeValue::from(*self.value.current());
        self.editor.sync(current);
    }

    /// Move the focused thumb to `target`. Focus follows the thumb across a
    /// crossing.
    fn move_focused(&mut self, target: f64) -> RangeValue {
        let mut value = self.editor.value();
        self.focused = value.set(self.focused, target);
        self.editor.sync(value);
        self.editor.value()
    }
}

/// Selects a `[low, high]` range.
///
/// A press on the track moves the nearer thumb there and starts a drag.
/// Thumbs that are dragged or stepped past each other swap, so the value
/// always satisfies `low <= high`. Values snap to the configured step.
///
/// Keys: Tab/BackTab pick the thumb, Left/Right step it, PageUp/PageDown
/// move it ten steps, Home/End send it to the ends of the track.
pub struct RangeSlider {
    id: WidgetId,
    inner: Arc<RwLock<RangeSliderInner>>,
    dirty: Arc<AtomicBool>,
    errors: ErrorSlot,
}

impl RangeSlider {
    pub fn new(config: SliderConfig, value: [f64; 2]) -> Self {
        Self::with_store(config, ValueStore::uncontrolled(value))
    }

    pub fn controlled(
        config: SliderConfig,
        value: [f64; 2],
        on_change: impl Fn(&[f64; 2]) + Send + Sync + 'static,
    ) -> Self {
        Self::with_store(config, ValueStore::controlled(value, on_change))
    }

    /// An invalid config is a misconfiguration and falls back to 0..=100
    /// in steps of 1.
    pub fn with_store(config: SliderConfig, value: ValueStore<[f64; 2]>) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                report_misconfiguration(&err);
                SliderConfig::default()
            }
        };
        let dirty = Arc::new(AtomicBool::new(false));
        let editor = RangeEditor::new(config, RangeValue::from(*value.current()));
        Self {
            id: WidgetId::next("range_slider"),
            inner: Arc::new(RwLock::new(RangeSliderInner {
                value,
                editor,
                focused: Thumb::Low,
                track: None,
            })),
            errors: ErrorSlot::new(Arc::clone(&dirty)),
            dirty,
        }
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn id_string(&self) -> String {
        self.id.to_string()
    }

    pub fn value(&self) -> [f64; 2] {
        self.inner
            .read()
            .map(|guard| *guard.value.current())
            .unwrap_or_default()
    }

    pub fn set_value(&self, value: [f64; 2]) -> Result<(), WidgetError> {
        let Ok(mut guard) = self.inner.write() else {
            return Ok(());
        };
        guard.value.set_external(value)?;
        guard.sync_editor();
        self.dirty.store(true, Ordering::SeqCst);
        Ok(())
    }

    pub fn config(&self) -> SliderConfig {
        self.inner
            .read()
            .map(|guard| *guard.editor.config())
            .unwrap_or_default()
    }

    pub fn focused_thumb(&self) -> Thumb {
        self.inner
            .read()
            .map(|guard| guard.focused)
            .unwrap_or(Thumb::Low)
    }

    pub fn dragging(&self) -> Option<Thumb> {
        self.inner
            .read()
            .map(|guard| guard.editor.dragging())
            .unwrap_or(None)
    }

    /// Record where the host drew the track.
    pub fn set_track_rect(&self, rect: Rect) {
        if let Ok(mut guard) = self.inner.write() {
            guard.track = Some(rect);
        }
    }

    /// Column of `thumb` on the track, for drawing.
    pub fn thumb_column(&self, thumb: Thumb) -> Option<u16> {
        let guard = self.inner.read().ok()?;
        let track = guard.track?;
        let value = RangeValue::from(*guard.value.current()).get(thumb);
        let position = cell_track(track).position_of(value, guard.editor.config());
        Some(position.round() as u16)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }

    /// Run `edit` on the synced editor and forward a changed value.
    fn edit(
        &self,
        cx: &EventContext,
        edit: impl FnOnce(&mut RangeSliderInner) -> Option<RangeValue>,
    ) -> bool {
        let pending = {
            let Ok(mut guard) = self.inner.write() else {
                return false;
            };
            if guard.editor.dragging().is_none() {
                guard.sync_editor();
            }
            // Compared against the editor, not the store: a controlled store
            // still holds the host's last value in the middle of a drag.
            let before = guard.editor.value();
            let Some(next) = edit(&mut guard) else {
                return false;
            };
            if next == before {
                return false;
            }
            guard.value.stage_change(next.as_array())
        };
        self.dirty.store(true, Ordering::SeqCst);
        if let Some(pending) = pending {
            pending.fire();
        }
        cx.push_event(WidgetEvent::new(WidgetEventKind::Change, self.id_string()));
        true
    }

    fn step_focused(&self, steps: i32, cx: &EventContext) {
        self.edit(cx, |inner| {
            let config = *inner.editor.config();
            let current = inner.editor.value().get(inner.focused);
            Some(inner.move_focused(config.snap(current + f64::from(steps) * config.step)))
        });
    }

    fn jump_focused(&self, to_max: bool, cx: &EventContext) {
        self.edit(cx, |inner| {
            let config = *inner.editor.config();
            Some(inner.move_focused(if to_max { config.max } else { config.min }))
        });
    }
}

/// Track over the cells of `rect`, first cell at min and last at max.
fn cell_track(rect: Rect) -> TrackGeometry {
    TrackGeometry::new(f64::from(rect.x), f64::from(rect.width.saturating_sub(1)))
}

impl WidgetEvents for RangeSlider {
    fn on_key(&self, key: &KeyPress, cx: &EventContext) -> EventResult {
        if key.is_chord() {
            return EventResult::Ignored;
        }
        match key.key {
            Key::Tab | Key::BackTab => {
                let next = if key.key == Key::Tab {
                    Thumb::High
                } else {
                    Thumb::Low
                };
                let Ok(mut guard) = self.inner.write() else {
                    return EventResult::Ignored;
                };
                if guard.focused == next {
                    // Let focus leave the widget
                    return EventResult::Ignored;
                }
                guard.focused = next;
                self.dirty.store(true, Ordering::SeqCst);
                EventResult::Consumed
            }
            Key::Left | Key::Down => {
                self.step_focused(-1, cx);
                EventResult::Consumed
            }
            Key::Right | Key::Up => {
                self.step_focused(1, cx);
                EventResult::Consumed
            }
            Key::PageDown => {
                self.step_focused(-PAGE_STEPS, cx);
                EventResult::Consumed
            }
            Key::PageUp => {
                self.step_focused(PAGE_STEPS, cx);
                EventResult::Consumed
            }
            Key::Home => {
                self.jump_focused(false, cx);
                EventResult::Consumed
            }
            Key::End => {
                self.jump_focused(true, cx);
                EventResult::Consumed
            }
            _ => EventResult::Ignored,
        }
    }

    fn on_pointer_down(&self, x: u16, y: u16, cx: &EventContext) -> EventResult {
        let Some(track) = self.inner.read().ok().and_then(|guard| guard.track) else {
            return EventResult::Ignored;
        };
        if !track.contains(Point::new(x, y)) {
            return EventResult::Ignored;
        }
        let geometry = cell_track(track);
        self.edit(cx, |inner| {
            let value = inner.editor.press_track(f64::from(x), &geometry);
            inner.focused = inner.editor.dragging().unwrap_or(inner.focused);
            Some(value)
        });
        self.dirty.store(true, Ordering::SeqCst);
        EventResult::StartDrag
    }

    fn on_drag(&self, x: u16, _y: u16, cx: &EventContext) -> EventResult {
        let Some(track) = self.inner.read().ok().and_then(|guard| guard.track) else {
            return EventResult::Ignored;
        };
        let geometry = cell_track(track);
        self.edit(cx, |inner| {
            let value = inner.editor.drag_to(f64::from(x), &geometry);
            inner.focused = inner.editor.dragging().unwrap_or(inner.focused);
            value
        });
        EventResult::Consumed
    }

    fn on_release(&self, _cx: &EventContext) -> EventResult {
        let Ok(mut guard) = self.inner.write() else {
            return EventResult::Ignored;
        };
        if guard.editor.dragging().is_none() {
            return EventResult::Ignored;
        }
        guard.editor.release();
        guard.sync_editor();
        self.dirty.store(true, Ordering::SeqCst);
        EventResult::Consumed
    }
}

impl Clone for RangeSlider {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
            dirty: Arc::clone(&self.dirty),
            errors: self.errors.clone(),
        }
    }
}

impl std::fmt::Debug for RangeSlider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangeSlider")
            .field("id", &self.id)
            .field("value", &self.value())
            .finish_non_exhaustive()
    }
}

impl Validatable for RangeSlider {
    type Value = [f64; 2];

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_track_spans_first_to_last_cell() {
        let track = cell_track(Rect::new(10, 0, 11, 1));
        let config = SliderConfig::new(0.0, 100.0, 10.0);
        assert_eq!(track.value_at(10.0, &config), 0.0);
        assert_eq!(track.value_at(15.0, &config), 50.0);
        assert_eq!(track.value_at(20.0, &config), 100.0);
    }
}
