use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

/// Where to display validation errors for a widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorDisplay {
    /// Show error message below the widget (default).
    #[default]
    Below,
    /// Show error message inline/to the right of the widget.
    Inline,
    /// Don't display error message - widget only shows error styling.
    None,
}

#[derive(Debug, Default)]
struct ErrorState {
    message: Option<String>,
    display: ErrorDisplay,
}

/// A widget's current error text. Changes mark the widget dirty.
#[derive(Debug, Clone)]
pub struct ErrorSlot {
    state: Arc<RwLock<ErrorState>>,
    dirty: Arc<AtomicBool>,
}

impl ErrorSlot {
    pub fn new(dirty: Arc<AtomicBool>) -> Self {
        Self {
            state: Arc::new(RwLock::new(ErrorState::default())),
            dirty,
        }
    }

    pub fn set(&self, msg: impl Into<String>) {
        if let Ok(mut guard) = self.state.write() {
            guard.message = Some(msg.into());
            self.dirty.store(true, Ordering::SeqCst);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut guard) = self.state.write()
            && guard.message.is_some()
        {
            guard.message = None;
            self.dirty.store(true, Ordering::SeqCst);
        }
    }

    pub fn get(&self) -> Option<String> {
        self.state
            .read()
            .map(|guard| guard.message.clone())
            .unwrap_or(None)
    }

    pub fn is_set(&self) -> bool {
        self.state
            .read()
            .map(|guard| guard.message.is_some())
            .unwrap_or(false)
    }

    pub fn display(&self) -> ErrorDisplay {
        self.state
            .read()
            .map(|guard| guard.display)
            .unwrap_or_default()
    }

    pub fn set_display(&self, display: ErrorDisplay) {
        if let Ok(mut guard) = self.state.write() {
            guard.display = display;
            self.dirty.store(true, Ordering::SeqCst);
        }
    }
}
