//! TimePicker widget - inline hour/minute/meridiem fields.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use hinge::editors::{HourCycle, TimeField, TimeStepConfig, TimeStepper, TimeValue};
use hinge::{Key, KeyPress, Point, Rect, ValueStore, WidgetError, report_misconfiguration};

use crate::events::{EventContext, EventResult, WidgetEvent, WidgetEventKind, WidgetEvents};
use crate::format::{Formatter, TimeFormatter};
use crate::id::WidgetId;
use crate::validation::{ErrorSlot, Validatable};

struct TimePickerInner {
    value: ValueStore<TimeValue>,
    stepper: TimeStepper,
    /// Where the host drew the fields
    area: Option<Rect>,
}

/// An inline time editor.
///
/// Left/Right move between fields, Up/Down step the focused field. Each
/// field wraps on its own: minutes never carry into the hour and the 12-hour
/// dial keeps the meridiem. On the meridiem field `a`/`p` pick AM/PM.
///
/// The text is laid out as `HH:MM` or `HH:MM AM`; a press on a field
/// focuses it.
pub struct TimePicker {
    id: WidgetId,
    inner: Arc<RwLock<TimePickerInner>>,
    dirty: Arc<AtomicBool>,
    errors: ErrorSlot,
}

impl TimePicker {
    pub fn new(config: TimeStepConfig, value: TimeValue) -> Self {
        Self::with_store(config, ValueStore::uncontrolled(value))
    }

    pub fn controlled(
        config: TimeStepConfig,
        value: TimeValue,
        on_change: impl Fn(&TimeValue) + Send + Sync + 'static,
    ) -> Self {
        Self::with_store(config, ValueStore::controlled(value, on_change))
    }

    /// An invalid config is a misconfiguration and falls back to the
    /// default (24-hour, one-minute steps).
    pub fn with_store(config: TimeStepConfig, value: ValueStore<TimeValue>) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                report_misconfiguration(&err);
                TimeStepConfig::default()
            }
        };
        let dirty = Arc::new(AtomicBool::new(false));
        let stepper = TimeStepper::new(config, *value.current());
        Self {
            id: WidgetId::next("time_picker"),
            inner: Arc::new(RwLock::new(TimePickerInner {
                value,
                stepper,
                area: None,
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

    pub fn value(&self) -> TimeValue {
        self.inner
            .read()
            .map(|guard| *guard.value.current())
            .unwrap_or_default()
    }

    pub fn set_value(&self, value: TimeValue) -> Result<(), WidgetError> {
        let Ok(mut guard) = self.inner.write() else {
            return Ok(());
        };
        guard.value.set_external(value)?;
        guard.stepper.set_value(value);
        self.dirty.store(true, Ordering::SeqCst);
        Ok(())
    }

    pub fn hour_cycle(&self) -> HourCycle {
        self.inner
            .read()
            .map(|guard| guard.stepper.config().hour_cycle)
            .unwrap_or_default()
    }

    pub fn display_text(&self) -> String {
        TimeFormatter::new(self.hour_cycle()).format(&self.value())
    }

    /// The field with keyboard focus.
    pub fn field(&self) -> TimeField {
        self.inner
            .read()
            .map(|guard| guard.stepper.field())
            .unwrap_or(TimeField::Hour)
    }

    pub fn set_area(&self, rect: Rect) {
        if let Ok(mut guard) = self.inner.write() {
            guard.area = Some(rect);
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }

    /// Forward a stepped value to the store.
    fn apply(&self, next: TimeValue, cx: &EventContext) {
        let pending = {
            let Ok(mut guard) = self.inner.write() else {
                return;
            };
            // The stepper starts from the authoritative value next time
            let pending = guard.value.stage_change(next);
            let current = *guard.value.current();
            guard.stepper.set_value(current);
            pending
        };
        self.dirty.store(true, Ordering::SeqCst);
        if let Some(pending) = pending {
            pending.fire();
        }
        cx.push_event(WidgetEvent::new(WidgetEventKind::Change, self.id_string()));
    }
}

/// Field under column `offset` of the `HH:MM AM` layout.
fn field_at(offset: u16, cycle: HourCycle) -> Option<TimeField> {
    match (offset, cycle) {
        (0..=1, _) => Some(TimeField::Hour),
        (3..=4, _) => Some(TimeField::Minute),
        (6..=7, HourCycle::H12) => Some(TimeField::Meridiem),
        _ => None,
    }
}

impl WidgetEvents for TimePicker {
    fn on_key(&self, key: &KeyPress, cx: &EventContext) -> EventResult {
        if key.is_chord() {
            return EventResult::Ignored;
        }
        let handled = matches!(
            key.key,
            Key::Up | Key::Down | Key::Left | Key::Right | Key::Char('a' | 'A' | 'p' | 'P')
        );
        let stepped = {
            let Ok(mut guard) = self.inner.write() else {
                return EventResult::Ignored;
            };
            let current = *guard.value.current();
            guard.stepper.set_value(current);
            guard.stepper.handle_key(key)
        };
        match stepped {
            Some(next) => {
                self.apply(next, cx);
                EventResult::Consumed
            }
            None if handled => {
                self.dirty.store(true, Ordering::SeqCst);
                EventResult::Consumed
            }
            None => EventResult::Ignored,
        }
    }

    fn on_pointer_down(&self, x: u16, y: u16, _cx: &EventContext) -> EventResult {
        let cycle = self.hour_cycle();
        let Ok(mut guard) = self.inner.write() else {
            return EventResult::Ignored;
        };
        let Some(area) = guard.area else {
            return EventResult::Ignored;
        };
        if !area.contains(Point::new(x, y)) {
            return EventResult::Ignored;
        }
        if let Some(field) = field_at(x - area.x, cycle) {
            guard.stepper.focus_field(field);
            self.dirty.store(true, Ordering::SeqCst);
        }
        EventResult::Consumed
    }
}

impl Clone for TimePicker {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
            dirty: Arc::clone(&self.dirty),
            errors: self.errors.clone(),
        }
    }
}

impl std::fmt::Debug for TimePicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimePicker")
            .field("id", &self.id)
            .field("value", &self.value())
            .finish_non_exhaustive()
    }
}

impl Validatable for TimePicker {
    type Value = TimeValue;

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
