use thiserror::Error;

/// The first failing rule of one field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field_name}: {message}")]
pub struct FieldError {
    /// Name given to [`Validator::field`](super::Validator::field).
    pub field_name: String,
    /// Id of the widget, so the host can move focus there.
    pub widget_id: String,
    pub message: String,
}

/// Outcome of a [`Validator`](super::Validator) run. Errors are kept in
/// field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<FieldError>,
}

impl ValidationResult {
    pub(crate) fn from_errors(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn first_error(&self) -> Option<&FieldError> {
        self.errors.first()
    }

    pub fn first_invalid_widget(&self) -> Option<&str> {
        self.first_error().map(|e| e.widget_id.as_str())
    }

    /// Error recorded for `field_name`, if it failed.
    pub fn error_for(&self, field_name: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field_name == field_name)
            .map(|e| e.message.as_str())
    }

    /// `Ok(())` when every field passed.
    pub fn into_result(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}
