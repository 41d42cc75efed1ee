//! Select widget - a dropdown single-choice list.

mod events;
mod state;

pub use state::Select;
