//! Controlled/uncontrolled value reconciliation.
//!
//! A widget's "current value" either belongs to the host (controlled) or to
//! the widget itself (uncontrolled). [`ValueStore`] hides the difference
//! behind a single [`request_change`](ValueStore::request_change) entry point
//! with identical notification semantics in both modes.
//!
//! # Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use hinge::ValueStore;
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! let mut store = ValueStore::uncontrolled("b").on_change(move |v: &&str| {
//!     sink.lock().unwrap().push(*v);
//! });
//!
//! store.request_change("c");
//! assert_eq!(*store.current(), "c");
//! assert_eq!(*seen.lock().unwrap(), vec!["c"]);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::{WidgetError, report_misconfiguration};

/// Change notification callback. Fired at most once per user-visible change.
pub type Notifier<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// How the authoritative value is sourced. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueMode {
    /// The widget owns the value.
    Uncontrolled,
    /// The host owns the value and re-supplies it after each change.
    Controlled,
    /// The host supplied a value but no way to change it.
    ReadOnly,
}

impl ValueMode {
    fn name(self) -> &'static str {
        match self {
            ValueMode::Uncontrolled => "uncontrolled",
            ValueMode::Controlled => "controlled",
            ValueMode::ReadOnly => "read-only",
        }
    }
}

/// Widget properties a host passes in at mount time.
pub struct ValueProps<T> {
    /// Externally supplied value. Presence selects controlled or read-only mode.
    pub value: Option<T>,
    /// Initial value for uncontrolled mode.
    pub default_value: Option<T>,
    pub on_change: Option<Notifier<T>>,
}

impl<T> Default for ValueProps<T> {
    fn default() -> Self {
        Self {
            value: None,
            default_value: None,
            on_change: None,
        }
    }
}

/// Reconciles an external value with an internal fallback.
///
/// Invariant: in [`ValueMode::Controlled`] the authoritative value is always
/// the latest external value. The internal value is still updated on every
/// change request.
pub struct ValueStore<T> {
    mode: ValueMode,
    internal: T,
    external: Option<T>,
    notifier: Option<Notifier<T>>,
}

impl<T: Clone> ValueStore<T> {
    /// A store that owns its value.
    pub fn uncontrolled(initial: T) -> Self {
        Self {
            mode: ValueMode::Uncontrolled,
            internal: initial,
            external: None,
            notifier: None,
        }
    }

    /// A store whose value is owned by the host.
    pub fn controlled(external: T, notifier: impl Fn(&T) + Send + Sync + 'static) -> Self {
        Self {
            mode: ValueMode::Controlled,
            internal: external.clone(),
            external: Some(external),
            notifier: Some(Arc::new(notifier)),
        }
    }

    /// A static store. Change requests are rejected.
    pub fn read_only(value: T) -> Self {
        Self {
            mode: ValueMode::ReadOnly,
            internal: value.clone(),
            external: Some(value),
            notifier: None,
        }
    }

    /// Controlled construction that fails instead of degrading to read-only
    /// when the notifier is missing.
    pub fn try_controlled(external: T, notifier: Option<Notifier<T>>) -> Result<Self, WidgetError> {
        let notifier = notifier.ok_or_else(|| WidgetError::MissingChangeNotifier {
            widget: std::any::type_name::<T>().to_string(),
        })?;
        Ok(Self {
            mode: ValueMode::Controlled,
            internal: external.clone(),
            external: Some(external),
            notifier: Some(notifier),
        })
    }

    /// Attach (or replace) the change notifier.
    pub fn on_change(mut self, notifier: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.notifier = Some(Arc::new(notifier));
        self
    }

    /// The authoritative value.
    pub fn current(&self) -> &T {
        match self.mode {
            ValueMode::Uncontrolled => &self.internal,
            ValueMode::Controlled | ValueMode::ReadOnly => {
                self.external.as_ref().unwrap_or(&self.internal)
            }
        }
    }

    /// The internal fallback value.
    pub fn internal(&self) -> &T {
        &self.internal
    }

    pub fn mode(&self) -> ValueMode {
        self.mode
    }

    pub fn is_controlled(&self) -> bool {
        self.mode == ValueMode::Controlled
    }

    /// Request a new value.
    ///
    /// Fires the notifier exactly once (never for read-only stores).
    pub fn request_change(&mut self, candidate: T) {
        if let Some(pending) = self.stage_change(candidate) {
            pending.fire();
        }
    }

    /// Apply the state effect of a change request and return the
    /// notification for the caller to fire.
    ///
    /// Lets callers that hold a lock on the owning widget release it before
    /// the notifier runs.
    #[must_use = "the change notification is lost unless fired"]
    pub fn stage_change(&mut self, candidate: T) -> Option<PendingChange<T>> {
        match self.mode {
            ValueMode::ReadOnly => {
                log::debug!("ValueStore: change rejected, store is read-only");
                None
            }
            ValueMode::Uncontrolled | ValueMode::Controlled => {
                self.internal = candidate.clone();
                self.notifier.as_ref().map(|notifier| PendingChange {
                    notifier: Arc::clone(notifier),
                    value: candidate,
                })
            }
        }
    }

    /// Host re-supplies the external value after a change notification.
    ///
    /// Only controlled stores accept external values: switching modes after
    /// construction is forbidden.
    pub fn set_external(&mut self, value: T) -> Result<(), WidgetError> {
        match self.mode {
            ValueMode::Controlled => {
                self.external = Some(value);
                Ok(())
            }
            other => {
                let err = WidgetError::ModeSwitch {
                    widget: std::any::type_name::<T>().to_string(),
                    from: other.name(),
                    to: ValueMode::Controlled.name(),
                };
                log::error!("ValueStore: {err}");
                Err(err)
            }
        }
    }

    /// Replace the starting value of an uncontrolled store. The notifier is
    /// kept.
    ///
    /// Controlled and read-only stores get their value from the host, so a
    /// default there would be a mode switch.
    pub fn set_default(&mut self, value: T) -> Result<(), WidgetError> {
        if self.mode == ValueMode::Uncontrolled {
            self.internal = value;
            return Ok(());
        }
        let err = WidgetError::ModeSwitch {
            widget: std::any::type_name::<T>().to_string(),
            from: self.mode.name(),
            to: ValueMode::Uncontrolled.name(),
        };
        log::error!("ValueStore: {err}");
        Err(err)
    }

    /// Build a store from mount-time props.
    ///
    /// A supplied value with a notifier is controlled, without one it is
    /// read-only. No value means uncontrolled, starting from `default_value`
    /// or `T::default()`.
    pub fn from_props(props: ValueProps<T>) -> Self
    where
        T: Default,
    {
        match (props.value, props.on_change) {
            (Some(value), Some(notifier)) => Self {
                mode: ValueMode::Controlled,
                internal: value.clone(),
                external: Some(value),
                notifier: Some(notifier),
            },
            (Some(value), None) => Self::read_only(value),
            (None, notifier) => Self {
                mode: ValueMode::Uncontrolled,
                internal: props.default_value.unwrap_or_default(),
                external: None,
                notifier,
            },
        }
    }

    /// Like [`ValueStore::from_props`] but treats a value without a notifier
    /// as a misconfiguration instead of a read-only widget.
    pub fn from_props_strict(props: ValueProps<T>) -> Result<Self, WidgetError>
    where
        T: Default,
    {
        if props.value.is_some() && props.on_change.is_none() {
            let err = WidgetError::MissingChangeNotifier {
                widget: std::any::type_name::<T>().to_string(),
            };
            report_misconfiguration(&err);
            return Err(err);
        }
        Ok(Self::from_props(props))
    }
}

impl<T: fmt::Debug> fmt::Debug for ValueStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueStore")
            .field("mode", &self.mode)
            .field("internal", &self.internal)
            .field("external", &self.external)
            .field("has_notifier", &self.notifier.is_some())
            .finish()
    }
}

/// A change notification that has not been delivered yet.
#[must_use = "the change notification is lost unless fired"]
pub struct PendingChange<T> {
    notifier: Notifier<T>,
    value: T,
}

impl<T> PendingChange<T> {
    /// The value that will be delivered.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Deliver the notification.
    pub fn fire(self) {
        (self.notifier)(&self.value);
    }
}
