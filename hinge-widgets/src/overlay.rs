//! Overlay placement.
//!
//! Overlays are positioned relative to an anchor (the trigger element, or
//! the highlighted row of a parent menu for sub-menus). Placement is a
//! collaborator: widgets ask a [`PositionResolver`] for the panel rectangle
//! and hand the result to their disclosure for hit testing.

use hinge::Rect;
use serde::{Deserialize, Serialize};

/// Position preference for overlay placement relative to anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    /// Below the anchor element (default for dropdowns).
    /// Falls back to Above if insufficient space below.
    #[default]
    Below,
    /// Above the anchor element.
    /// Falls back to Below if insufficient space above.
    Above,
    /// To the right of the anchor, top edges aligned (sub-menus).
    /// Falls back to the left side if insufficient space.
    Right,
    /// At a specific point (context menus).
    AtPoint { x: u16, y: u16 },
}

/// Computes where an overlay panel goes.
pub trait PositionResolver: Send + Sync {
    /// Rectangle for a panel of `size` (width, height) anchored to `anchor`
    /// within `screen`.
    fn resolve(&self, screen: Rect, anchor: Rect, size: (u16, u16), placement: Placement) -> Rect;
}

/// Places the panel on the preferred side and flips to the opposite side
/// when it does not fit, then clamps it into the screen.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlipResolver;

impl PositionResolver for FlipResolver {
    fn resolve(&self, screen: Rect, anchor: Rect, size: (u16, u16), placement: Placement) -> Rect {
        let (width, height) = size;

        // Constrain dimensions to screen
        let width = width.min(screen.width);
        let height = height.min(screen.height);

        match placement {
            Placement::Below => {
                let y_below = anchor.bottom();
                let fits_below = y_below.saturating_add(height) <= screen.bottom();
                let y = if fits_below {
                    y_below
                } else {
                    anchor.y.saturating_sub(height).max(screen.y)
                };
                Rect::new(constrain_x(anchor.x, width, screen), y, width, height)
            }
            Placement::Above => {
                let fits_above = anchor.y >= screen.y.saturating_add(height);
                let y = if fits_above {
                    anchor.y - height
                } else {
                    constrain_y(anchor.bottom(), height, screen)
                };
                Rect::new(constrain_x(anchor.x, width, screen), y, width, height)
            }
            Placement::Right => {
                let x_right = anchor.right();
                let fits_right = x_right.saturating_add(width) <= screen.right();
                let x = if fits_right {
                    x_right
                } else {
                    anchor.x.saturating_sub(width).max(screen.x)
                };
                Rect::new(x, constrain_y(anchor.y, height, screen), width, height)
            }
            Placement::AtPoint { x, y } => Rect::new(
                constrain_x(x, width, screen),
                constrain_y(y, height, screen),
                width,
                height,
            ),
        }
    }
}

/// Constrain x position to fit within screen bounds.
fn constrain_x(x: u16, width: u16, screen: Rect) -> u16 {
    let max_x = screen.x + screen.width.saturating_sub(width);
    x.min(max_x).max(screen.x)
}

fn constrain_y(y: u16, height: u16, screen: Rect) -> u16 {
    let max_y = screen.y + screen.height.saturating_sub(height);
    y.min(max_y).max(screen.y)
}
