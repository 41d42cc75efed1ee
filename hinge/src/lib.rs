//! Headless interaction engines shared by overlay and list widgets.
//!
//! `hinge` owns the decision logic behind transient overlays and selectable
//! lists and leaves drawing to the host:
//!
//! - [`ValueStore`] reconciles a controlled (host-owned) value with an
//!   uncontrolled (widget-owned) fallback.
//! - [`Disclosure`] owns the open/closed lifecycle of an overlay, including
//!   dismissal listeners on the ambient [`InputSurface`] and nested sub-menus.
//! - [`CandidateList`] tracks the highlighted item of a filtered list.
//! - [`editors`] holds the bounded numeric/temporal editors (range slider,
//!   time/date steppers, tags, hex colors).
//!
//! Everything is synchronous. The only deferred work is the sub-menu grace
//! interval, which is modelled as a deadline that the host polls.

pub mod candidates;
pub mod disclosure;
pub mod editors;
pub mod error;
pub mod event;
pub mod geometry;
pub mod logging;
pub mod surface;
pub mod text;
pub mod value;

pub use candidates::{
    Candidate, CandidateList, Direction, ListAction, QueryMatcher, SubstringMatcher,
};
pub use disclosure::{Disclosure, DisclosureId, DisclosurePolicy, DismissReason};
pub use error::{WidgetError, report_misconfiguration};
pub use event::{InputEvent, Key, KeyPress, Modifiers, MouseButton};
pub use geometry::{Point, Rect};
pub use surface::{AttachError, InputSurface, ListenerGuard, ListenerKind};
pub use text::{QueryText, TextEditResult};
pub use value::{Notifier, PendingChange, ValueMode, ValueProps, ValueStore};
