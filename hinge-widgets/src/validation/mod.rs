//! Field validation for widget values.
//!
//! Rejected input (a duplicate tag, a date outside its bounds) is reported by
//! writing an error onto the widget, which the host renders as error text.
//! [`Validator`] runs host-defined rules across several widgets, e.g. before
//! a form is submitted.
//!
//! # Example
//!
//! ```ignore
//! let result = Validator::new()
//!     .field(&self.country, "country")
//!         .selected("Pick a country")
//!     .field(&self.labels, "labels")
//!         .min_items(1, "Add at least one label")
//!     .validate();
//!
//! if let Some(widget) = result.first_invalid_widget() {
//!     focus(widget);
//! }
//! ```

mod error_display;
mod result;
mod validatable;
mod validator;

pub use error_display::{ErrorDisplay, ErrorSlot};
pub use result::{FieldError, ValidationResult};
pub use validatable::Validatable;
pub use validator::{BoxFuture, FieldBuilder, Validator};
