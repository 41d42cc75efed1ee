//! The ambient input surface and scoped listener handles.
//!
//! Outside-interaction and cancel-key detection are global listeners: they
//! watch every event on the host's input surface, not just events targeted
//! at the widget. They are a shared resource and must only be attached while
//! an overlay is open. [`ListenerGuard`] ties each attachment to a value's
//! lifetime, so dropping the guard (on close, or when the owning widget goes
//! away) always detaches it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use thiserror::Error;

use crate::event::InputEvent;

/// Which events a listener receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    PointerDown,
    KeyDown,
    PointerMove,
}

impl ListenerKind {
    pub fn matches(self, event: &InputEvent) -> bool {
        matches!(
            (self, event),
            (ListenerKind::PointerDown, InputEvent::PointerDown { .. })
                | (ListenerKind::KeyDown, InputEvent::KeyDown(_))
                | (ListenerKind::PointerMove, InputEvent::PointerMove { .. })
        )
    }
}

/// Identifies one attachment on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttachError {
    /// The host has no interaction surface to listen on.
    #[error("no input surface available")]
    Unavailable,
}

type Callback = Arc<dyn Fn(&InputEvent) + Send + Sync>;

struct Listener {
    id: ListenerId,
    kind: ListenerKind,
    callback: Callback,
}

#[derive(Default)]
struct SurfaceInner {
    next_id: AtomicU64,
    listeners: RwLock<Vec<Listener>>,
}

impl SurfaceInner {
    fn read(&self) -> RwLockReadGuard<'_, Vec<Listener>> {
        self.listeners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Listener>> {
        self.listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn detach(&self, id: ListenerId) -> bool {
        let mut listeners = self.write();
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        before != listeners.len()
    }
}

/// The host's ambient input surface.
///
/// Cheap to clone; clones share the same listener registry.
#[derive(Clone)]
pub struct InputSurface {
    inner: Option<Arc<SurfaceInner>>,
}

impl InputSurface {
    pub fn new() -> Self {
        Self {
            inner: Some(Arc::new(SurfaceInner::default())),
        }
    }

    /// A surface that refuses every attachment, for hosts with no global
    /// input surface.
    pub fn unavailable() -> Self {
        Self { inner: None }
    }

    pub fn is_available(&self) -> bool {
        self.inner.is_some()
    }

    /// Attach a listener. It stays attached until the guard is dropped.
    pub fn attach(
        &self,
        kind: ListenerKind,
        callback: impl Fn(&InputEvent) + Send + Sync + 'static,
    ) -> Result<ListenerGuard, AttachError> {
        let inner = self.inner.as_ref().ok_or(AttachError::Unavailable)?;
        let id = ListenerId(inner.next_id.fetch_add(1, Ordering::SeqCst));
        inner.write().push(Listener {
            id,
            kind,
            callback: Arc::new(callback),
        });
        log::debug!("InputSurface: attached {kind:?} listener {}", id.0);
        Ok(ListenerGuard {
            id,
            surface: Arc::downgrade(inner),
        })
    }

    /// Deliver an event to every matching listener.
    ///
    /// Returns the number of listeners invoked. Listeners may attach or
    /// detach (including themselves) while being called.
    pub fn dispatch(&self, event: &InputEvent) -> usize {
        let Some(inner) = self.inner.as_ref() else {
            return 0;
        };
        let snapshot: Vec<(ListenerId, Callback)> = inner
            .read()
            .iter()
            .filter(|l| l.kind.matches(event))
            .map(|l| (l.id, Arc::clone(&l.callback)))
            .collect();

        let mut invoked = 0;
        for (id, callback) in snapshot {
            // An earlier callback may have detached this one.
            let still_attached = inner.read().iter().any(|l| l.id == id);
            if still_attached {
                callback(event);
                invoked += 1;
            }
        }
        invoked
    }

    /// Number of attached listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.as_ref().map_or(0, |inner| inner.read().len())
    }

    /// Number of attached listeners of one kind.
    pub fn listener_count_of(&self, kind: ListenerKind) -> usize {
        self.inner.as_ref().map_or(0, |inner| {
            inner.read().iter().filter(|l| l.kind == kind).count()
        })
    }
}

impl Default for InputSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InputSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputSurface")
            .field("available", &self.is_available())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Keeps a listener attached for as long as it lives.
#[must_use = "dropping the guard detaches the listener immediately"]
pub struct ListenerGuard {
    id: ListenerId,
    surface: Weak<SurfaceInner>,
}

impl ListenerGuard {
    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ListenerGuard").field(&self.id).finish()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(inner) = self.surface.upgrade()
            && inner.detach(self.id)
        {
            log::debug!("InputSurface: detached listener {}", self.id.0);
        }
    }
}
