use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Unique identifier for a widget instance, displayed as `__<kind>_<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetId {
    kind: &'static str,
    n: usize,
}

impl WidgetId {
    pub(crate) fn next(kind: &'static str) -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self {
            kind,
            n: COUNTER.fetch_add(1, Ordering::SeqCst),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "__{}_{}", self.kind, self.n)
    }
}
