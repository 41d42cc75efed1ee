//! Bounded numeric and temporal editors.
//!
//! These share the value-store contract with the list widgets but have no
//! overlay or list concerns. Each editor is pure state: it computes the next
//! value and the widget decides whether to forward it to its value store.

pub mod color;
pub mod range;
pub mod stepper;
pub mod tags;

pub use color::{ColorDraft, ColorRejection, HexColor};
pub use range::{RangeEditor, RangeValue, Slider, SliderConfig, Thumb, TrackGeometry};
pub use stepper::{
    DateBounds, DateRejection, DateStep, DateStepper, HourCycle, Meridiem, MonthView, TimeField,
    TimeStepConfig, TimeStepper, TimeValue,
};
pub use tags::{TagCollection, TagPolicy, TagRejection, TagValidator};
