//! Validatable trait for widgets that support validation.

use super::{ErrorDisplay, ErrorSlot};

/// Trait for widgets that can be validated.
///
/// Implementors provide the value, their id and their [`ErrorSlot`]; the
/// error accessors are derived from the slot.
pub trait Validatable: Send + Sync {
    /// The value type used for validation.
    type Value;

    /// Extract the current value for validation.
    fn validation_value(&self) -> Self::Value;

    /// Get the widget ID for focusing.
    fn widget_id(&self) -> String;

    fn error_slot(&self) -> &ErrorSlot;

    /// Set a validation error on this widget.
    fn set_error(&self, msg: impl Into<String>) {
        self.error_slot().set(msg);
    }

    fn clear_error(&self) {
        self.error_slot().clear();
    }

    fn has_error(&self) -> bool {
        self.error_slot().is_set()
    }

    /// Get the current validation error message (if any).
    fn error(&self) -> Option<String> {
        self.error_slot().get()
    }

    fn error_display(&self) -> ErrorDisplay {
        self.error_slot().display()
    }

    fn set_error_display(&self, display: ErrorDisplay) {
        self.error_slot().set_display(display);
    }
}
