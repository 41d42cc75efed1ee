//! Widgets built on the `hinge` engines.
//!
//! Each widget is a cheap-clone handle around shared state, the way a host
//! UI keeps one copy in its model and hands clones to event handlers. The
//! widgets only decide behavior. Drawing is left to the host, which reads
//! the state back (labels, highlighted row, panel rectangle) during render.
//!
//! Events reach a widget through [`WidgetEvents`]; value changes are reported
//! to the host through the widget's change notifier and as [`WidgetEvent`]s on
//! the [`EventContext`] channel.

pub mod events;
pub mod filter;
pub mod format;
mod id;
pub mod overlay;
pub mod timer;
pub mod validation;
pub mod widgets;

pub use events::{EventContext, EventResult, WidgetEvent, WidgetEventKind, WidgetEvents, dispatch};
pub use filter::{FuzzyMatcher, Ranked};
pub use format::{Formatter, IsoDateFormatter, TimeFormatter};
pub use id::WidgetId;
pub use overlay::{FlipResolver, Placement, PositionResolver};
pub use timer::GraceTimer;
pub use validation::{ErrorDisplay, FieldError, ValidationResult, Validatable, Validator};
pub use widgets::{
    ColorPicker, Combobox, DatePicker, Menu, MenuItem, MenuItemKind, Popover, RangeSlider, Select,
    TagInput, TimePicker,
};
