//! DatePicker widget - a trigger with a month calendar panel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use chrono::NaiveDate;
use hinge::editors::{DateBounds, DateRejection, DateStep, DateStepper, MonthView};
use hinge::{
    Disclosure, DisclosurePolicy, InputSurface, Key, KeyPress, Point, Rect, ValueStore,
    WidgetError, report_misconfiguration,
};

use crate::events::{EventContext, EventResult, WidgetEvent, WidgetEventKind, WidgetEvents};
use crate::format::{Formatter, IsoDateFormatter};
use crate::id::WidgetId;
use crate::overlay::{Placement, PositionResolver};
use crate::validation::{ErrorSlot, Validatable};
use crate::widgets::track_open_state;

/// Width of one day cell in the calendar panel.
const CELL_WIDTH: u16 = 3;
/// Month title and weekday header above the grid.
const HEADER_ROWS: u16 = 2;

struct DatePickerInner {
    value: ValueStore<Option<NaiveDate>>,
    stepper: DateStepper,
    formatter: Arc<dyn Formatter<NaiveDate>>,
    placeholder: String,
}

/// What a press on the calendar panel hit.
enum PanelHit {
    PreviousMonth,
    NextMonth,
    Day(NaiveDate),
    Nothing,
}

/// A date field with a dropdown month calendar.
///
/// While open, arrows move the focused day (Left/Right by a day, Up/Down by
/// a week), PageUp/PageDown by a month and with Shift by a year. Month steps
/// clamp the day to the target month. Enter or a click on a day commits it.
/// Steps that would leave the bounds are rejected and leave focus where it
/// was.
///
/// The calendar panel is laid out as a title row, a weekday header row and
/// six week rows of seven three-cell wide day columns, Monday first.
pub struct DatePicker {
    id: WidgetId,
    inner: Arc<RwLock<DatePickerInner>>,
    dirty: Arc<AtomicBool>,
    disclosure: Disclosure,
    errors: ErrorSlot,
}

impl DatePicker {
    pub fn new(value: Option<NaiveDate>) -> Self {
        Self::with_store(ValueStore::uncontrolled(value))
    }

    pub fn controlled(
        value: Option<NaiveDate>,
        on_change: impl Fn(&Option<NaiveDate>) + Send + Sync + 'static,
    ) -> Self {
        Self::with_store(ValueStore::controlled(value, on_change))
    }

    pub fn with_store(value: ValueStore<Option<NaiveDate>>) -> Self {
        let dirty = Arc::new(AtomicBool::new(false));
        let disclosure = Disclosure::new(DisclosurePolicy::single_select());
        track_open_state(&disclosure, &dirty);
        let focused = value.current().unwrap_or_else(today);
        Self {
            id: WidgetId::next("date_picker"),
            inner: Arc::new(RwLock::new(DatePickerInner {
                value,
                stepper: DateStepper::new(DateBounds::default(), focused),
                formatter: Arc::new(IsoDateFormatter),
                placeholder: String::new(),
            })),
            errors: ErrorSlot::new(Arc::clone(&dirty)),
            dirty,
            disclosure,
        }
    }

    /// Restrict selectable dates. Invalid bounds (min after max) are a
    /// misconfiguration and leave the picker unbounded.
    pub fn with_bounds(self, bounds: DateBounds) -> Self {
        if let Err(err) = bounds.validate() {
            report_misconfiguration(&err);
            return self;
        }
        if let Ok(mut guard) = self.inner.write() {
            let focused = clamp_into(&bounds, guard.stepper.focused());
            guard.stepper = DateStepper::new(bounds, focused);
        }
        self
    }

    pub fn with_formatter(self, formatter: impl Formatter<NaiveDate> + 'static) -> Self {
        if let Ok(mut guard) = self.inner.write() {
            guard.formatter = Arc::new(formatter);
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
    // Value
    // -------------------------------------------------------------------------

    pub fn value(&self) -> Option<NaiveDate> {
        self.inner
            .read()
            .map(|guard| *guard.value.current())
            .unwrap_or(None)
    }

    pub fn set_value(&self, value: Option<NaiveDate>) -> Result<(), WidgetError> {
        let Ok(mut guard) = self.inner.write() else {
            return Ok(());
        };
        guard.value.set_external(value)?;
        self.dirty.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Trigger text: the formatted value or the placeholder.
    pub fn display_text(&self) -> String {
        self.inner
            .read()
            .map(|guard| match guard.value.current() {
                Some(date) => guard.formatter.format(date),
                None => guard.placeholder.clone(),
            })
            .unwrap_or_default()
    }

    /// The day with keyboard focus in the calendar.
    pub fn focused(&self) -> NaiveDate {
        self.inner
            .read()
            .map(|guard| guard.stepper.focused())
            .unwrap_or_else(|_| today())
    }

    /// The month currently shown.
    pub fn month_view(&self) -> MonthView {
        MonthView::containing(self.focused())
    }

    // -------------------------------------------------------------------------
    // Open/close state
    // -------------------------------------------------------------------------

    pub fn is_open(&self) -> bool {
        self.disclosure.is_open()
    }

    /// Open with focus on the current value, or today clamped into bounds.
    pub fn open(&self) -> bool {
        if !self.disclosure.activate() {
            return false;
        }
        if let Ok(mut guard) = self.inner.write() {
            let target = guard.value.current().unwrap_or_else(today);
            let target = clamp_into(guard.stepper.bounds(), target);
            let bounds = *guard.stepper.bounds();
            guard.stepper = DateStepper::new(bounds, target);
        }
        true
    }

    pub fn close(&self) -> bool {
        self.disclosure.close()
    }

    // -------------------------------------------------------------------------
    // Internal methods
    // -------------------------------------------------------------------------

    fn step(&self, step: DateStep, cx: &EventContext) {
        let result = {
            let Ok(mut guard) = self.inner.write() else {
                return;
            };
            guard.stepper.step(step)
        };
        match result {
            Ok(_) => {
                self.errors.clear();
                self.dirty.store(true, Ordering::SeqCst);
            }
            Err(rejection) => self.reject(&rejection, cx),
        }
    }

    fn reject(&self, rejection: &DateRejection, cx: &EventContext) {
        log::debug!("DatePicker {}: {rejection}", self.id);
        let message = rejection.to_string();
        self.errors.set(message.clone());
        cx.push_event(WidgetEvent::rejected(self.id_string(), message));
    }

    /// Commit `date` (already checked against bounds).
    fn commit(&self, date: NaiveDate, cx: &EventContext) {
        let pending = {
            let Ok(mut guard) = self.inner.write() else {
                return;
            };
            if guard.stepper.focus(date).is_err() {
                return;
            }
            guard.value.stage_change(Some(date))
        };
        self.errors.clear();
        self.dirty.store(true, Ordering::SeqCst);

        let closed = self.disclosure.notify_selection();
        if let Some(pending) = pending {
            pending.fire();
        }
        cx.push_event(WidgetEvent::new(WidgetEventKind::Change, self.id_string()));
        if closed {
            cx.push_event(WidgetEvent::new(WidgetEventKind::Close, self.id_string()));
        }
    }

    fn hit(&self, point: Point) -> Option<PanelHit> {
        let panel = self.disclosure.panel_rect()?;
        if !panel.contains(point) {
            return None;
        }
        let column = (point.x - panel.x) / CELL_WIDTH;
        let row = point.y - panel.y;
        let hit = match row {
            0 if column == 0 => PanelHit::PreviousMonth,
            0 if usize::from(column) == MonthView::COLUMNS - 1 => PanelHit::NextMonth,
            r if r >= HEADER_ROWS => self
                .month_view()
                .date_at(usize::from(r - HEADER_ROWS), usize::from(column))
                .map_or(PanelHit::Nothing, PanelHit::Day),
            _ => PanelHit::Nothing,
        };
        Some(hit)
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
        let size = (
            CELL_WIDTH * MonthView::COLUMNS as u16,
            HEADER_ROWS + MonthView::ROWS as u16,
        );
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

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn clamp_into(bounds: &DateBounds, date: NaiveDate) -> NaiveDate {
    match bounds.check(date) {
        Ok(date) => date,
        Err(DateRejection::BeforeMin { min, .. }) => min,
        Err(DateRejection::AfterMax { max, .. }) => max,
        Err(DateRejection::OutOfRange) => date,
    }
}

impl WidgetEvents for DatePicker {
    fn on_key(&self, key: &KeyPress, cx: &EventContext) -> EventResult {
        if !self.is_open() {
            return match key.key {
                Key::Enter | Key::Char(' ') | Key::Down if !key.is_chord() => {
                    if self.open() {
                        cx.push_event(WidgetEvent::new(WidgetEventKind::Open, self.id_string()));
                    }
                    EventResult::Consumed
                }
                _ => EventResult::Ignored,
            };
        }

        if let Some(step) = DateStep::from_key(key) {
            self.step(step, cx);
            return EventResult::Consumed;
        }
        match key.key {
            Key::Enter => {
                let focused = self.focused();
                self.commit(focused, cx);
                EventResult::Consumed
            }
            Key::Escape => {
                if self.disclosure.handle_key(key) {
                    cx.push_event(WidgetEvent::new(WidgetEventKind::Close, self.id_string()));
                }
                EventResult::Consumed
            }
            _ => EventResult::Ignored,
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

        match self.hit(point) {
            Some(PanelHit::PreviousMonth) => self.step(DateStep::Months(-1), cx),
            Some(PanelHit::NextMonth) => self.step(DateStep::Months(1), cx),
            Some(PanelHit::Day(date)) => {
                let checked = self
                    .inner
                    .read()
                    .map(|guard| guard.stepper.bounds().check(date))
                    .unwrap_or(Ok(date));
                match checked {
                    Ok(date) => self.commit(date, cx),
                    Err(rejection) => self.reject(&rejection, cx),
                }
            }
            Some(PanelHit::Nothing) => {}
            None => {
                if self.disclosure.handle_pointer_down(point) {
                    cx.push_event(WidgetEvent::new(WidgetEventKind::Close, self.id_string()));
                }
                return EventResult::Ignored;
            }
        }
        EventResult::Consumed
    }

    fn on_blur(&self, cx: &EventContext) {
        if self.close() {
            cx.push_event(WidgetEvent::new(WidgetEventKind::Close, self.id_string()));
        }
    }
}

impl Clone for DatePicker {
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

impl std::fmt::Debug for DatePicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatePicker")
            .field("id", &self.id)
            .field("value", &self.value())
            .field("disclosure", &self.disclosure)
            .finish_non_exhaustive()
    }
}

impl Validatable for DatePicker {
    type Value = Option<NaiveDate>;

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
