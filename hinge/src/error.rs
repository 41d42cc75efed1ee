//! Misconfiguration errors.
//!
//! Rejected input and no-op transitions are not errors: they are reported
//! through return values (`Err(TagRejection)`, `false`) local to the widget.
//! A [`WidgetError`] means the host wired the widget up wrong, which silently
//! drops user changes, so it is reported loudly.

use thiserror::Error;

/// A programming-contract violation by the code hosting a widget.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    /// Controlled semantics were requested without a change notifier.
    #[error("widget '{widget}' is controlled but has no change notifier")]
    MissingChangeNotifier {
        /// Name of the widget or value being configured.
        widget: String,
    },

    /// The host tried to change how a value is owned after construction,
    /// e.g. supplied an external value to an uncontrolled store or a default
    /// to a controlled one.
    #[error("widget '{widget}' cannot switch from {from} to {to} after construction")]
    ModeSwitch {
        widget: String,
        from: &'static str,
        to: &'static str,
    },

    /// A config struct failed its own validation.
    #[error("invalid {config} config: {reason}")]
    InvalidConfig {
        config: &'static str,
        reason: String,
    },
}

impl WidgetError {
    pub(crate) fn invalid_config(config: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            config,
            reason: reason.into(),
        }
    }
}

/// Report a misconfigured widget.
///
/// Panics in debug builds; logs at error level otherwise.
pub fn report_misconfiguration(err: &WidgetError) {
    log::error!("misconfigured widget: {err}");
    if cfg!(debug_assertions) {
        panic!("misconfigured widget: {err}");
    }
}
