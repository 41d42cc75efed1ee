//! Menu widget - action, checklist and sub-menu items.

mod events;
mod item;
mod state;

pub use item::{MenuItem, MenuItemKind};
pub use state::{ActionCallback, Menu};
