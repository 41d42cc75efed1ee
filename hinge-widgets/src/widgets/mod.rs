//! Widget adapters over the `hinge` engines.
//!
//! Every widget follows the same shape: a cheap-clone handle with a
//! [`WidgetId`](crate::WidgetId), shared inner state behind an `RwLock`, and
//! a dirty flag the host checks before re-rendering. Overlay widgets own a
//! [`Disclosure`] and expose it for surface wiring and placement.

mod color_picker;
mod combobox;
mod date_picker;
mod menu;
mod popover;
mod range_slider;
mod select;
mod tag_input;
mod time_picker;

pub use color_picker::ColorPicker;
pub use combobox::Combobox;
pub use date_picker::DatePicker;
pub use menu::{ActionCallback, Menu, MenuItem, MenuItemKind};
pub use popover::Popover;
pub use range_slider::RangeSlider;
pub use select::Select;
pub use tag_input::TagInput;
pub use time_picker::TimePicker;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use hinge::{Disclosure, Point, Rect};
use unicode_width::UnicodeWidthStr;

/// Mark `dirty` on every open/close of `disclosure`, whichever handler
/// caused it (surface listener, timer or widget).
fn track_open_state(disclosure: &Disclosure, dirty: &Arc<AtomicBool>) {
    let dirty = Arc::clone(dirty);
    disclosure.on_open_change(move |_| dirty.store(true, Ordering::SeqCst));
}

/// Row of a one-line-per-row panel under `point`.
fn panel_row(panel: Option<Rect>, point: Point) -> Option<usize> {
    let panel = panel?;
    panel
        .contains(point)
        .then(|| usize::from(point.y - panel.y))
}

/// Panel size for a list of labels: widest label in terminal cells plus a
/// two-cell gutter, one row per label.
fn list_panel_size<'a>(labels: impl IntoIterator<Item = &'a str>) -> (u16, u16) {
    let (width, rows) = labels
        .into_iter()
        .fold((0usize, 0usize), |(width, rows), label| {
            (width.max(label.width()), rows + 1)
        });
    let clamp = |n: usize| u16::try_from(n).unwrap_or(u16::MAX);
    (clamp(width + 2).max(4), clamp(rows).max(1))
}
