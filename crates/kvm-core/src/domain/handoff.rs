//! Boundary-crossing rules used when the pointer leaves a display.
//!
//! Two filters decide whether a crossing is real:
//!
//! - **Sticky corners**: a nearly horizontal movement close to a display's
//!   top or bottom edge must not slip into a neighbour.  The test uses the
//!   average Y of the points just before and just after the crossing.
//! - **Delta debounce**: while local input is blocked the operating system
//!   still pins the physical pointer at a screen edge, and every so often
//!   reports a huge jump back.  Deltas larger than half the local primary
//!   display are treated as that noise.

use super::geometry::{Point, Rectangle};

/// Default sticky-corner margin in pixels.
pub const DEFAULT_STICKY_CORNER_SIZE: i32 = 6;

/// Returns `true` if the move from `before` to `after` should be held back
/// inside `display` because it happens within `size` pixels of the display's
/// top or bottom edge.
pub fn is_sticky_corner(before: Point, after: Point, display: &Rectangle, size: i32) -> bool {
    let average_y = (before.y + after.y) / 2;
    let from_top = average_y - display.top();
    let from_bottom = (display.bottom() - 1) - average_y;
    from_top < size || from_bottom < size
}

/// Threshold filter for pointer deltas observed while input is blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeltaDebounce {
    max_dx: i32,
    max_dy: i32,
}

impl DeltaDebounce {
    /// Thresholds are half of `display`'s width and height.
    pub fn from_display(display: &Rectangle) -> Self {
        Self {
            max_dx: display.width / 2,
            max_dy: display.height / 2,
        }
    }

    /// A debounce that never rejects anything.
    pub const fn disabled() -> Self {
        Self {
            max_dx: i32::MAX,
            max_dy: i32::MAX,
        }
    }

    /// Returns `true` if `(dx, dy)` exceeds the threshold on either axis.
    pub fn is_spurious(&self, dx: i32, dy: i32) -> bool {
        dx.saturating_abs() > self.max_dx || dy.saturating_abs() > self.max_dy
    }
}

impl Default for DeltaDebounce {
    fn default() -> Self {
        Self::disabled()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
