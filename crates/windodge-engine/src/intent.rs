//! Directional intent: which corner a window should flee to, ignoring collisions.

use crate::{Corner, geom::Rect};

/// Where the cursor sits relative to the window center.
///
/// Comparisons are strict, so a cursor exactly on a center line counts as
/// left of (or above) the center.
#[derive(Clone, Copy, Debug, PartialEq)]
struct CursorSide {
    /// Cursor is strictly right of the vertical center line.
    right: bool,
    /// Cursor is strictly below the horizontal center line.
    below: bool,
    /// Horizontal deviation dominates the vertical one.
    wide: bool,
}

impl CursorSide {
    /// Classify `(mx, my)` against the center of `rect`.
    fn of(mx: i32, my: i32, rect: &Rect) -> Self {
        let (cx, cy) = rect.center();
        let (mx, my) = (f64::from(mx), f64::from(my));
        Self {
            right: mx > cx,
            below: my > cy,
            wide: (mx - cx).abs() > (my - cy).abs(),
        }
    }
}

/// Compute the ideal escape corner for a window at `current` whose visual
/// rectangle is `rect`, given the cursor at `(mx, my)`.
///
/// Cursor on the diagonal towards the screen center: the larger deviation
/// picks between the two lateral escapes. Cursor on one axis only: flee along
/// the other axis. Cursor on the outer diagonal: jump to the opposite corner.
pub fn ideal_corner(current: Corner, mx: i32, my: i32, rect: &Rect) -> Corner {
    use Corner::{BottomLeft as BL, BottomRight as BR, TopLeft as TL, TopRight as TR};

    let CursorSide { right, below, wide } = CursorSide::of(mx, my, rect);
    match current {
        TL => match (right, below) {
            (true, true) => {
                if wide {
                    BL
                } else {
                    TR
                }
            }
            (true, false) => BL,
            (false, true) => TR,
            (false, false) => BR,
        },
        TR => match (right, below) {
            (false, true) => {
                if wide {
                    BR
                } else {
                    TL
                }
            }
            (false, false) => BR,
            (true, true) => TL,
            (true, false) => BL,
        },
        BR => match (right, below) {
            (false, false) => {
                if wide {
                    TR
                } else {
                    BL
                }
            }
            (false, true) => TR,
            (true, false) => BL,
            (true, true) => TL,
        },
        BL => match (right, below) {
            (true, false) => {
                if wide {
                    TL
                } else {
                    BR
                }
            }
            (true, true) => TL,
            (false, false) => BR,
            (false, true) => TR,
        },
    }
}
