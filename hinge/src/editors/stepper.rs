//! Time and date steppers.
//!
//! Time fields wrap within their range and never carry into the next field:
//! 23:59 plus one minute is 23:00. Date steps are calendar arithmetic and are
//! checked against optional bounds.

use chrono::{Datelike, Months, NaiveDate, NaiveTime, TimeDelta, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::WidgetError;
use crate::event::{Key, KeyPress};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HourCycle {
    H12,
    #[default]
    H24,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    pub fn toggled(self) -> Self {
        match self {
            Meridiem::Am => Meridiem::Pm,
            Meridiem::Pm => Meridiem::Am,
        }
    }
}

/// A wall-clock time stored as a 24-hour hour and a minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TimeValue {
    hour: u8,
    minute: u8,
}

impl TimeValue {
    /// Returns None when `hour > 23` or `minute > 59`.
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn meridiem(&self) -> Meridiem {
        if self.hour >= 12 {
            Meridiem::Pm
        } else {
            Meridiem::Am
        }
    }

    /// Hour as shown on a 12-hour clock, 1 through 12.
    pub fn hour12(&self) -> u8 {
        match self.hour % 12 {
            0 => 12,
            h => h,
        }
    }

    fn from_hour12(hour12: u8, meridiem: Meridiem, minute: u8) -> Self {
        let base = hour12 % 12;
        let hour = match meridiem {
            Meridiem::Am => base,
            Meridiem::Pm => base + 12,
        };
        Self { hour, minute }
    }

    pub fn display(&self, cycle: HourCycle) -> String {
        match cycle {
            HourCycle::H24 => format!("{:02}:{:02}", self.hour, self.minute),
            HourCycle::H12 => {
                let suffix = match self.meridiem() {
                    Meridiem::Am => "AM",
                    Meridiem::Pm => "PM",
                };
                format!("{:02}:{:02} {suffix}", self.hour12(), self.minute)
            }
        }
    }
}

impl From<NaiveTime> for TimeValue {
    fn from(time: NaiveTime) -> Self {
        // NaiveTime guarantees hour < 24 and minute < 60.
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        }
    }
}

impl From<TimeValue> for NaiveTime {
    fn from(value: TimeValue) -> Self {
        NaiveTime::from_hms_opt(u32::from(value.hour), u32::from(value.minute), 0)
            .unwrap_or_default()
    }
}

/// The individually steppable parts of a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeField {
    Hour,
    Minute,
    Meridiem,
}

impl TimeField {
    /// Fields in tab order for the given cycle.
    pub fn order(cycle: HourCycle) -> &'static [TimeField] {
        match cycle {
            HourCycle::H24 => &[TimeField::Hour, TimeField::Minute],
            HourCycle::H12 => &[TimeField::Hour, TimeField::Minute, TimeField::Meridiem],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeStepConfig {
    pub hour_cycle: HourCycle,
    pub minute_step: u8,
}

impl Default for TimeStepConfig {
    fn default() -> Self {
        Self {
            hour_cycle: HourCycle::H24,
            minute_step: 1,
        }
    }
}

impl TimeStepConfig {
    pub fn validate(&self) -> Result<(), WidgetError> {
        if !(1..60).contains(&self.minute_step) {
            return Err(WidgetError::invalid_config(
                "time stepper",
                format!("minute step {} must be within 1..=59", self.minute_step),
            ));
        }
        Ok(())
    }
}

/// Field-wise time stepping with wrap and no carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeStepper {
    config: TimeStepConfig,
    value: TimeValue,
    field: TimeField,
}

impl TimeStepper {
    pub fn new(config: TimeStepConfig, value: TimeValue) -> Self {
        Self {
            config,
            value,
            field: TimeField::Hour,
        }
    }

    pub fn config(&self) -> &TimeStepConfig {
        &self.config
    }

    pub fn value(&self) -> TimeValue {
        self.value
    }

    pub fn set_value(&mut self, value: TimeValue) {
        self.value = value;
    }

    pub fn field(&self) -> TimeField {
        self.field
    }

    pub fn focus_field(&mut self, field: TimeField) {
        if TimeField::order(self.config.hour_cycle).contains(&field) {
            self.field = field;
        }
    }

    /// Move field focus. Returns false at either end.
    pub fn next_field(&mut self, forward: bool) -> bool {
        let order = TimeField::order(self.config.hour_cycle);
        let Some(current) = order.iter().position(|f| *f == self.field) else {
            self.field = TimeField::Hour;
            return true;
        };
        let target = if forward {
            current + 1
        } else {
            match current.checked_sub(1) {
                Some(t) => t,
                None => return false,
            }
        };
        match order.get(target) {
            Some(field) => {
                self.field = *field;
                true
            }
            None => false,
        }
    }

    /// Step `field` by one unit in the given direction.
    pub fn step(&mut self, field: TimeField, forward: bool) -> TimeValue {
        let TimeValue { hour, minute } = self.value;
        self.value = match (field, self.config.hour_cycle) {
            (TimeField::Hour, HourCycle::H24) => TimeValue {
                hour: wrap(hour, 1, 24, forward),
                minute,
            },
            (TimeField::Hour, HourCycle::H12) => {
                // 1..=12 on the dial, meridiem untouched.
                let dial = wrap(self.value.hour12() - 1, 1, 12, forward) + 1;
                TimeValue::from_hour12(dial, self.value.meridiem(), minute)
            }
            (TimeField::Minute, _) => TimeValue {
                hour,
                minute: wrap(minute, self.config.minute_step, 60, forward),
            },
            (TimeField::Meridiem, _) => TimeValue {
                hour: (hour + 12) % 24,
                minute,
            },
        };
        self.value
    }

    /// Up/Down step the focused field, Left/Right move between fields.
    /// Returns the new value when it changed.
    pub fn handle_key(&mut self, key: &KeyPress) -> Option<TimeValue> {
        if key.is_chord() {
            return None;
        }
        match key.key {
            Key::Up => Some(self.step(self.field, true)),
            Key::Down => Some(self.step(self.field, false)),
            Key::Left => {
                self.next_field(false);
                None
            }
            Key::Right => {
                self.next_field(true);
                None
            }
            Key::Char('a' | 'A') if self.field == TimeField::Meridiem => {
                (self.value.meridiem() == Meridiem::Pm).then(|| self.step(TimeField::Meridiem, true))
            }
            Key::Char('p' | 'P') if self.field == TimeField::Meridiem => {
                (self.value.meridiem() == Meridiem::Am).then(|| self.step(TimeField::Meridiem, true))
            }
            _ => None,
        }
    }
}

fn wrap(value: u8, step: u8, modulus: u8, forward: bool) -> u8 {
    let (value, step, modulus) = (u16::from(value), u16::from(step % modulus), u16::from(modulus));
    let next = if forward {
        (value + step) % modulus
    } else {
        (value + modulus - step) % modulus
    };
    next as u8
}

/// A calendar step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStep {
    Days(i64),
    Months(i32),
    Years(i32),
}

impl DateStep {
    /// Arrow keys move by day and week, PageUp/PageDown by month, and with
    /// shift by year.
    pub fn from_key(key: &KeyPress) -> Option<Self> {
        let shift = key.modifiers.shift;
        if key.modifiers.ctrl || key.modifiers.alt {
            return None;
        }
        match key.key {
            Key::Left => Some(DateStep::Days(-1)),
            Key::Right => Some(DateStep::Days(1)),
            Key::Up => Some(DateStep::Days(-7)),
            Key::Down => Some(DateStep::Days(7)),
            Key::PageUp if shift => Some(DateStep::Years(-1)),
            Key::PageDown if shift => Some(DateStep::Years(1)),
            Key::PageUp => Some(DateStep::Months(-1)),
            Key::PageDown => Some(DateStep::Months(1)),
            _ => None,
        }
    }

    /// Apply to `date`. Month arithmetic clamps the day to the target
    /// month's length.
    pub fn apply(self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            DateStep::Days(days) => date.checked_add_signed(TimeDelta::try_days(days)?),
            DateStep::Months(months) => add_months(date, i64::from(months)),
            DateStep::Years(years) => add_months(date, i64::from(years) * 12),
        }
    }
}

fn add_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        date.checked_add_months(magnitude)
    } else {
        date.checked_sub_months(magnitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DateRejection {
    #[error("{date} is before the earliest allowed date {min}")]
    BeforeMin { date: NaiveDate, min: NaiveDate },

    #[error("{date} is after the latest allowed date {max}")]
    AfterMax { date: NaiveDate, max: NaiveDate },

    #[error("date arithmetic left the supported calendar range")]
    OutOfRange,
}

/// Optional inclusive bounds on a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DateBounds {
    pub min: Option<NaiveDate>,
    pub max: Option<NaiveDate>,
}

impl DateBounds {
    pub fn validate(&self) -> Result<(), WidgetError> {
        if let (Some(min), Some(max)) = (self.min, self.max)
            && min > max
        {
            return Err(WidgetError::invalid_config(
                "date bounds",
                format!("min {min} is after max {max}"),
            ));
        }
        Ok(())
    }

    pub fn check(&self, date: NaiveDate) -> Result<NaiveDate, DateRejection> {
        if let Some(min) = self.min
            && date < min
        {
            return Err(DateRejection::BeforeMin { date, min });
        }
        if let Some(max) = self.max
            && date > max
        {
            return Err(DateRejection::AfterMax { date, max });
        }
        Ok(date)
    }
}

/// A focused date moved by calendar steps within bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateStepper {
    bounds: DateBounds,
    focused: NaiveDate,
}

impl DateStepper {
    pub fn new(bounds: DateBounds, focused: NaiveDate) -> Self {
        Self { bounds, focused }
    }

    pub fn bounds(&self) -> &DateBounds {
        &self.bounds
    }

    pub fn focused(&self) -> NaiveDate {
        self.focused
    }

    /// Focus a date directly, e.g. from a calendar click.
    pub fn focus(&mut self, date: NaiveDate) -> Result<NaiveDate, DateRejection> {
        self.focused = self.bounds.check(date)?;
        Ok(self.focused)
    }

    /// Move focus by `step`. A rejected step leaves focus unchanged.
    pub fn step(&mut self, step: DateStep) -> Result<NaiveDate, DateRejection> {
        let target = step.apply(self.focused).ok_or(DateRejection::OutOfRange)?;
        self.focus(target)
    }

    pub fn month_view(&self) -> MonthView {
        MonthView::containing(self.focused)
    }
}

/// The six-week grid shown for one month, weeks starting on Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthView {
    first: NaiveDate,
}

impl MonthView {
    pub const ROWS: usize = 6;
    pub const COLUMNS: usize = 7;

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    /// Column of the first day of the month.
    pub fn leading_blanks(&self) -> usize {
        self.first.weekday().num_days_from_monday() as usize
    }

    pub fn days_in_month(&self) -> u32 {
        let next = self.first.checked_add_months(Months::new(1));
        match next {
            Some(next) => next.signed_duration_since(self.first).num_days() as u32,
            None => 31,
        }
    }

    /// Date at grid cell `(row, column)`, or None for padding cells.
    pub fn date_at(&self, row: usize, column: usize) -> Option<NaiveDate> {
        if row >= Self::ROWS || column >= Self::COLUMNS {
            return None;
        }
        let cell = row * Self::COLUMNS + column;
        let day = cell.checked_sub(self.leading_blanks())? as u32 + 1;
        if day > self.days_in_month() {
            return None;
        }
        self.first.with_day(day)
    }

    /// Grid cell holding `date`, if it falls in this month.
    pub fn cell_of(&self, date: NaiveDate) -> Option<(usize, usize)> {
        if date.year() != self.year() || date.month() != self.month() {
            return None;
        }
        let cell = self.leading_blanks() + date.day0() as usize;
        Some((cell / Self::COLUMNS, cell % Self::COLUMNS))
    }

    pub fn weekday_header() -> [Weekday; 7] {
        [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ]
    }
}
