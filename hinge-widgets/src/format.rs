//! Display formatting for picker values.

use chrono::NaiveDate;
use hinge::editors::{HourCycle, TimeValue};

/// Turns a value into the text shown on a widget's trigger.
pub trait Formatter<T>: Send + Sync {
    fn format(&self, value: &T) -> String;
}

/// `2025-03-14`
#[derive(Debug, Clone, Copy, Default)]
pub struct IsoDateFormatter;

impl Formatter<NaiveDate> for IsoDateFormatter {
    fn format(&self, value: &NaiveDate) -> String {
        value.format("%Y-%m-%d").to_string()
    }
}

/// `14:05` or `02:05 PM`, depending on the hour cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeFormatter {
    pub cycle: HourCycle,
}

impl TimeFormatter {
    pub fn new(cycle: HourCycle) -> Self {
        Self { cycle }
    }
}

impl Formatter<TimeValue> for TimeFormatter {
    fn format(&self, value: &TimeValue) -> String {
        value.display(self.cycle)
    }
}

impl<T, F> Formatter<T> for F
where
    F: Fn(&T) -> String + Send + Sync,
{
    fn format(&self, value: &T) -> String {
        self(value)
    }
}
