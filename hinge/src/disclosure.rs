//! Open/closed lifecycle of transient overlays.
//!
//! A [`Disclosure`] is the single controller behind every dropdown, menu,
//! popover and picker panel:
//!
//! - Opening is always explicit ([`Disclosure::activate`]).
//! - While open it holds listeners on the ambient [`InputSurface`] for
//!   outside pointer presses and the cancel key. They are released on every
//!   transition out of Open and when the last handle is dropped.
//! - Sub-menus are child disclosures. A child keeps a non-owning reference to
//!   its parent; the parent tracks its children weakly so that presses inside
//!   an open child are not "outside" for the parent and so that closing the
//!   parent closes the child.
//! - A child stays open while the pointer is over its trigger or panel. Once
//!   the pointer leaves both, a close is scheduled after the grace interval
//!   and cancelled if the pointer comes back first. The deadline is driven by
//!   [`Disclosure::poll`].
//!
//! # Example
//!
//! ```
//! use hinge::{Disclosure, DisclosurePolicy, DismissReason, InputEvent, InputSurface, Key, Rect};
//!
//! let surface = InputSurface::new();
//! let menu = Disclosure::new(DisclosurePolicy::single_select()).with_surface(surface.clone());
//! menu.set_trigger_rect(Rect::new(0, 0, 10, 1));
//! menu.set_panel_rect(Rect::new(0, 1, 10, 5));
//!
//! menu.activate();
//! assert!(surface.listener_count() > 0);
//!
//! surface.dispatch(&InputEvent::key(Key::Escape));
//! assert!(!menu.is_open());
//! assert_eq!(menu.last_dismiss_reason(), Some(DismissReason::CancelKey));
//! assert_eq!(surface.listener_count(), 0);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::event::{InputEvent, KeyPress};
use crate::geometry::{Point, Rect};
use crate::surface::{InputSurface, ListenerGuard, ListenerKind};

/// Unique identifier for a disclosure instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisclosureId(usize);

impl DisclosureId {
    fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl fmt::Display for DisclosureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "__disclosure_{}", self.0)
    }
}

/// Why an open disclosure closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DismissReason {
    /// Pointer pressed outside the trigger, the panel and any open child.
    OutsideInteraction,
    /// The cancellation key.
    CancelKey,
    /// An item was selected and the close-on-select policy is on.
    Selection,
    /// Programmatic close, or the trigger toggled it shut.
    Explicit,
    /// The pointer left a sub-menu for longer than the grace interval.
    HoverExit,
}

/// Per-widget dismissal policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisclosurePolicy {
    /// Close when an item inside the overlay is selected.
    pub close_on_select: bool,
    /// Close on pointer presses outside the overlay.
    pub dismiss_on_outside: bool,
    /// Grace interval before a hovered-away sub-menu closes, in milliseconds.
    pub grace_ms: u64,
}

impl Default for DisclosurePolicy {
    fn default() -> Self {
        Self::single_select()
    }
}

impl DisclosurePolicy {
    pub const DEFAULT_GRACE_MS: u64 = 200;

    /// Single-select lists close as soon as a value is picked.
    pub const fn single_select() -> Self {
        Self {
            close_on_select: true,
            dismiss_on_outside: true,
            grace_ms: Self::DEFAULT_GRACE_MS,
        }
    }

    /// Checklists stay open so several items can be toggled.
    pub const fn checklist() -> Self {
        Self {
            close_on_select: false,
            dismiss_on_outside: true,
            grace_ms: Self::DEFAULT_GRACE_MS,
        }
    }

    pub fn with_close_on_select(mut self, close: bool) -> Self {
        self.close_on_select = close;
        self
    }

    pub fn with_dismiss_on_outside(mut self, dismiss: bool) -> Self {
        self.dismiss_on_outside = dismiss;
        self
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace_ms = u64::try_from(grace.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }

    /// Every way an open disclosure with this policy can be dismissed.
    ///
    /// Always contains the cancel key and explicit close.
    pub fn dismiss_triggers(&self) -> Vec<DismissReason> {
        let mut triggers = vec![DismissReason::CancelKey, DismissReason::Explicit];
        if self.dismiss_on_outside {
            triggers.push(DismissReason::OutsideInteraction);
        }
        if self.close_on_select {
            triggers.push(DismissReason::Selection);
        }
        triggers
    }
}

type OpenChangeCallback = Arc<dyn Fn(bool) + Send + Sync>;
type DismissCallback = Arc<dyn Fn(DismissReason) + Send + Sync>;

struct DisclosureInner {
    open: bool,
    policy: DisclosurePolicy,
    trigger: Option<Rect>,
    panel: Option<Rect>,
    surface: Option<InputSurface>,
    /// Non-empty only while open.
    listeners: Vec<ListenerGuard>,
    parent: Option<Weak<Shared>>,
    children: Vec<Weak<Shared>>,
    pending_close: Option<Instant>,
    last_reason: Option<DismissReason>,
    on_open_change: Option<OpenChangeCallback>,
    on_dismiss: Option<DismissCallback>,
}

struct Shared {
    id: DisclosureId,
    state: RwLock<DisclosureInner>,
}

impl Shared {
    fn read(&self) -> RwLockReadGuard<'_, DisclosureInner> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, DisclosureInner> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Controller for one transient overlay.
///
/// Cheap to clone; clones share state. Listeners are released when the
/// overlay closes or when the last clone is dropped.
#[derive(Clone)]
pub struct Disclosure {
    shared: Arc<Shared>,
}

impl Disclosure {
    /// Create a closed, top-level disclosure.
    pub fn new(policy: DisclosurePolicy) -> Self {
        Self::with_parent(policy, None)
    }

    /// Create a closed sub-disclosure of `parent`.
    pub fn child_of(parent: &Disclosure, policy: DisclosurePolicy) -> Self {
        let child = Self::with_parent(policy, Some(Arc::downgrade(&parent.shared)));
        let surface = {
            let mut state = parent.shared.write();
            state.children.retain(|c| c.strong_count() > 0);
            state.children.push(Arc::downgrade(&child.shared));
            state.surface.clone()
        };
        if let Some(surface) = surface {
            child.shared.write().surface = Some(surface);
        }
        child
    }

    fn with_parent(policy: DisclosurePolicy, parent: Option<Weak<Shared>>) -> Self {
        Self {
            shared: Arc::new(Shared {
                id: DisclosureId::new(),
                state: RwLock::new(DisclosureInner {
                    open: false,
                    policy,
                    trigger: None,
                    panel: None,
                    surface: None,
                    listeners: Vec::new(),
                    parent,
                    children: Vec::new(),
                    pending_close: None,
                    last_reason: None,
                    on_open_change: None,
                    on_dismiss: None,
                }),
            }),
        }
    }

    fn from_shared(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Bind the ambient input surface used for dismissal listeners.
    pub fn with_surface(self, surface: InputSurface) -> Self {
        self.bind_surface(surface);
        self
    }

    /// Bind (or rebind) the ambient input surface.
    ///
    /// Takes effect on the next open.
    pub fn bind_surface(&self, surface: InputSurface) {
        self.shared.write().surface = Some(surface);
    }

    /// Register a callback fired after every open/close transition.
    pub fn on_open_change(&self, callback: impl Fn(bool) + Send + Sync + 'static) {
        self.shared.write().on_open_change = Some(Arc::new(callback));
    }

    /// Register a callback fired after every close, with the reason.
    ///
    /// Runs whichever path closed the overlay, including listeners on the
    /// input surface, after the open-change callback.
    pub fn on_dismiss(&self, callback: impl Fn(DismissReason) + Send + Sync + 'static) {
        self.shared.write().on_dismiss = Some(Arc::new(callback));
    }

    pub fn id(&self) -> DisclosureId {
        self.shared.id
    }

    pub fn is_open(&self) -> bool {
        self.shared.read().open
    }

    pub fn policy(&self) -> DisclosurePolicy {
        self.shared.read().policy
    }

    pub fn set_policy(&self, policy: DisclosurePolicy) {
        self.shared.write().policy = policy;
    }

    pub fn last_dismiss_reason(&self) -> Option<DismissReason> {
        self.shared.read().last_reason
    }

    /// Whether this is a sub-disclosure.
    pub fn is_nested(&self) -> bool {
        self.shared.read().parent.is_some()
    }

    /// The parent disclosure, if it is still alive.
    pub fn parent(&self) -> Option<Disclosure> {
        self.shared
            .read()
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(Disclosure::from_shared)
    }

    /// Number of ancestors.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent();
        while let Some(parent) = current {
            depth += 1;
            current = parent.parent();
        }
        depth
    }

    fn children(&self) -> Vec<Disclosure> {
        self.shared
            .read()
            .children
            .iter()
            .filter_map(Weak::upgrade)
            .map(Disclosure::from_shared)
            .collect()
    }

    fn open_children(&self) -> Vec<Disclosure> {
        self.children().into_iter().filter(|c| c.is_open()).collect()
    }

    // -------------------------------------------------------------------------
    // Geometry
    // -------------------------------------------------------------------------

    /// Set the trigger element's bounds.
    pub fn set_trigger_rect(&self, rect: Rect) {
        self.shared.write().trigger = Some(rect);
    }

    /// Set the overlay panel's bounds, as placed by the position resolver.
    pub fn set_panel_rect(&self, rect: Rect) {
        self.shared.write().panel = Some(rect);
    }

    pub fn trigger_rect(&self) -> Option<Rect> {
        self.shared.read().trigger
    }

    pub fn panel_rect(&self) -> Option<Rect> {
        self.shared.read().panel
    }

    /// Whether `point` is over the trigger, the panel, or any open descendant.
    pub fn contains_point(&self, point: Point) -> bool {
        let own = {
            let state = self.shared.read();
            state.trigger.is_some_and(|r| r.contains(point))
                || (state.open && state.panel.is_some_and(|r| r.contains(point)))
        };
        own || self.open_children().iter().any(|c| c.contains_point(point))
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Open the overlay. Returns false if it was already open.
    ///
    /// A sub-disclosure only opens while its parent is open, and opening it
    /// closes any open sibling.
    pub fn activate(&self) -> bool {
        if self.is_open() {
            return false;
        }

        if let Some(parent) = self.parent() {
            if !parent.is_open() {
                log::debug!("Disclosure {}: parent closed, not opening", self.id());
                return false;
            }
            for sibling in parent.open_children() {
                if sibling.id() != self.id() {
                    sibling.dismiss(DismissReason::Explicit);
                }
            }
        }

        let callback = {
            let mut state = self.shared.write();
            if state.open {
                return false;
            }
            state.open = true;
            state.pending_close = None;
            let guards = self.attach_listeners(&state);
            state.listeners = guards;
            log::debug!(
                "Disclosure {}: open ({} listeners)",
                self.id(),
                state.listeners.len()
            );
            state.on_open_change.clone()
        };

        if let Some(callback) = callback {
            callback(true);
        }
        true
    }

    /// Programmatic open, e.g. for a widget mounted in its open state.
    ///
    /// Same rules as [`Disclosure::activate`].
    pub fn open(&self) -> bool {
        self.activate()
    }

    /// Attach the dismissal listeners for an opening transition.
    ///
    /// Attach failures degrade silently: the cancel key (through
    /// [`Disclosure::handle_key`]) and explicit close keep working.
    fn attach_listeners(&self, state: &DisclosureInner) -> Vec<ListenerGuard> {
        let Some(surface) = state.surface.as_ref() else {
            log::debug!("Disclosure {}: no input surface bound", self.id());
            return Vec::new();
        };

        let mut kinds = vec![ListenerKind::KeyDown];
        if state.policy.dismiss_on_outside {
            kinds.push(ListenerKind::PointerDown);
        }
        if state.parent.is_some() {
            kinds.push(ListenerKind::PointerMove);
        }

        let mut guards = Vec::with_capacity(kinds.len());
        for kind in kinds {
            let weak = Arc::downgrade(&self.shared);
            let attached = surface.attach(kind, move |event| {
                if let Some(shared) = weak.upgrade() {
                    Disclosure::from_shared(shared).on_surface_event(event);
                }
            });
            match attached {
                Ok(guard) => guards.push(guard),
                Err(err) => {
                    log::warn!(
                        "Disclosure {}: {kind:?} listener unavailable ({err}), \
                         cancel key and explicit close still apply",
                        self.id()
                    );
                }
            }
        }
        guards
    }

    fn on_surface_event(&self, event: &InputEvent) {
        match *event {
            InputEvent::KeyDown(key) => {
                // Only the innermost open disclosure reacts to the cancel key.
                if key.key.is_cancel() && self.open_children().is_empty() {
                    self.dismiss(DismissReason::CancelKey);
                }
            }
            InputEvent::PointerDown { x, y, .. } => {
                self.handle_pointer_down(Point::new(x, y));
            }
            InputEvent::PointerMove { x, y } => {
                self.pointer_moved(Point::new(x, y), Instant::now());
            }
        }
    }

    /// Close the overlay. Closing an already-closed disclosure is a no-op and
    /// returns false.
    ///
    /// Releases every listener before returning and closes open children.
    pub fn dismiss(&self, reason: DismissReason) -> bool {
        let (listeners, callback, on_dismiss) = {
            let mut state = self.shared.write();
            if !state.open {
                log::trace!("Disclosure {}: dismiss({reason:?}) while closed", self.id());
                return false;
            }
            state.open = false;
            state.pending_close = None;
            state.last_reason = Some(reason);
            (
                std::mem::take(&mut state.listeners),
                state.on_open_change.clone(),
                state.on_dismiss.clone(),
            )
        };
        let released = listeners.len();
        drop(listeners);
        log::debug!(
            "Disclosure {}: closed by {reason:?} (released {released} listeners)",
            self.id()
        );

        for child in self.open_children() {
            child.dismiss(reason);
        }

        if let Some(callback) = callback {
            callback(false);
        }
        if let Some(on_dismiss) = on_dismiss {
            on_dismiss(reason);
        }
        true
    }

    /// Explicit programmatic close.
    pub fn close(&self) -> bool {
        self.dismiss(DismissReason::Explicit)
    }

    /// Trigger activation: open when closed, close when open.
    pub fn toggle(&self) -> bool {
        if self.is_open() {
            self.close()
        } else {
            self.activate()
        }
    }

    /// Signal that an item inside the overlay was selected.
    ///
    /// Closes this disclosure when its close-on-select policy is on, then
    /// walks up the ancestors and closes each one whose policy is also on.
    /// Returns whether this disclosure closed.
    pub fn notify_selection(&self) -> bool {
        if !self.policy().close_on_select {
            return false;
        }
        let closed = self.dismiss(DismissReason::Selection);
        let mut ancestor = self.parent();
        while let Some(current) = ancestor {
            if !current.policy().close_on_select {
                break;
            }
            current.dismiss(DismissReason::Selection);
            ancestor = current.parent();
        }
        closed
    }

    /// Route a key press that reached the widget directly.
    ///
    /// The cancel key closes the innermost open disclosure of this tree.
    /// Works whether or not surface listeners are attached.
    pub fn handle_key(&self, key: &KeyPress) -> bool {
        if !key.key.is_cancel() || !self.is_open() {
            return false;
        }
        self.innermost_open().dismiss(DismissReason::CancelKey)
    }

    fn innermost_open(&self) -> Disclosure {
        let mut current = self.clone();
        while let Some(child) = current.open_children().into_iter().next() {
            current = child;
        }
        current
    }

    /// Close if `point` is outside the trigger, panel and open descendants.
    pub fn handle_pointer_down(&self, point: Point) -> bool {
        let dismiss_on_outside = {
            let state = self.shared.read();
            state.open && state.policy.dismiss_on_outside
        };
        if dismiss_on_outside && !self.contains_point(point) {
            self.dismiss(DismissReason::OutsideInteraction)
        } else {
            false
        }
    }

    // -------------------------------------------------------------------------
    // Hover grace interval
    // -------------------------------------------------------------------------

    /// Track pointer presence for a sub-disclosure.
    ///
    /// Re-entering the trigger or panel cancels a pending close; leaving both
    /// schedules one at `now + grace`. Top-level disclosures ignore hover.
    pub fn pointer_moved(&self, point: Point, now: Instant) {
        let nested_and_open = {
            let state = self.shared.read();
            state.open && state.parent.is_some()
        };
        if !nested_and_open {
            return;
        }
        let inside = self.contains_point(point);

        let mut state = self.shared.write();
        if inside {
            if state.pending_close.take().is_some() {
                log::debug!("Disclosure {}: pointer returned, close cancelled", self.id());
            }
        } else if state.pending_close.is_none() {
            let deadline = now + state.policy.grace();
            state.pending_close = Some(deadline);
            log::debug!(
                "Disclosure {}: pointer left, closing in {}ms",
                self.id(),
                state.policy.grace_ms
            );
        }
    }

    /// The scheduled hover-exit close, if any.
    pub fn pending_close(&self) -> Option<Instant> {
        self.shared.read().pending_close
    }

    /// Cancel a scheduled hover-exit close.
    pub fn cancel_pending_close(&self) {
        self.shared.write().pending_close = None;
    }

    /// Fire any hover-exit close that is due at `now`, here and in all
    /// descendants. Returns true if anything closed.
    pub fn poll(&self, now: Instant) -> bool {
        let due = self.pending_close().is_some_and(|deadline| deadline <= now);
        let mut closed = due && self.dismiss(DismissReason::HoverExit);
        for child in self.children() {
            closed |= child.poll(now);
        }
        closed
    }

    /// Earliest pending deadline in this tree.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.children()
            .iter()
            .filter_map(Disclosure::next_deadline)
            .chain(self.pending_close())
            .min()
    }
}

impl fmt::Debug for Disclosure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.read();
        f.debug_struct("Disclosure")
            .field("id", &self.shared.id)
            .field("open", &state.open)
            .field("policy", &state.policy)
            .field("listeners", &state.listeners.len())
            .field("nested", &state.parent.is_some())
            .finish()
    }
}
