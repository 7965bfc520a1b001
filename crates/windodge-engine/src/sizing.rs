//! Target window size computation.

use tracing::warn;

use crate::geom::Size;

/// Inputs to [`fit_size`] that are fixed for a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizingRules {
    /// Fraction of the screen each axis is scaled towards.
    pub fraction: f64,
    /// When false the initial size is kept (subject to the gap fit).
    pub resize: bool,
    /// Lower bound for either axis.
    pub min_size: i32,
    /// Distance kept from the screen edges.
    pub gap: i32,
}

impl Default for SizingRules {
    fn default() -> Self {
        Self {
            fraction: 0.25,
            resize: true,
            min_size: 100,
            gap: 50,
        }
    }
}

/// Scale `size` by `factor`, truncating, with each axis clamped to `min`.
fn scaled(size: Size, factor: f64, min: i32) -> Size {
    Size::new(
        ((f64::from(size.w) * factor) as i32).max(min),
        ((f64::from(size.h) * factor) as i32).max(min),
    )
}

/// Visual size a window should have while controlled.
///
/// Aspect ratio is preserved: the window is scaled uniformly to fit inside
/// `screen * fraction`, then scaled down again if it would not fit between
/// the gaps. Returns `None` when no usable size results.
pub fn fit_size(initial: Size, screen: Size, rules: &SizingRules) -> Option<Size> {
    let initial = if initial.is_valid() {
        initial
    } else {
        warn!(%initial, "window has degenerate dimensions; using minimum size");
        Size::new(rules.min_size, rules.min_size)
    };

    let mut size = initial;
    if rules.resize {
        let target_w = (f64::from(screen.w) * rules.fraction).trunc();
        let target_h = (f64::from(screen.h) * rules.fraction).trunc();
        let factor = (target_w / f64::from(initial.w)).min(target_h / f64::from(initial.h));
        size = scaled(initial, factor, rules.min_size);
    }

    let avail = Size::new(screen.w - 2 * rules.gap, screen.h - 2 * rules.gap);
    if !avail.is_valid() {
        warn!(gap = rules.gap, %screen, "gap leaves no room on screen");
        return None;
    }
    if size.w > avail.w || size.h > avail.h {
        warn!(%size, %avail, "window does not fit between the gaps; scaling down");
        let factor = (f64::from(avail.w) / f64::from(size.w))
            .min(f64::from(avail.h) / f64::from(size.h));
        size = scaled(size, factor, rules.min_size);
    }

    size.is_valid().then_some(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Size = Size::new(1920, 1080);

    #[test]
    fn scales_towards_fraction_preserving_aspect() {
        let got = fit_size(Size::new(1600, 900), SCREEN, &SizingRules::default());
        assert_eq!(got, Some(Size::new(480, 270)));

        // Portrait window is bound by height.
        let got = fit_size(Size::new(600, 1000), SCREEN, &SizingRules::default());
        assert_eq!(got, Some(Size::new(162, 270)));
    }

    #[test]
    fn minimum_size_is_enforced() {
        let got = fit_size(Size::new(2000, 100), SCREEN, &SizingRules::default());
        assert_eq!(got, Some(Size::new(480, 100)));
    }

    #[test]
    fn degenerate_initial_uses_minimum() {
        let rules = SizingRules {
            resize: false,
            ..SizingRules::default()
        };
        assert_eq!(
            fit_size(Size::new(0, 0), SCREEN, &rules),
            Some(Size::new(100, 100))
        );
    }

    #[test]
    fn no_resize_keeps_size_unless_too_big() {
        let rules = SizingRules {
            resize: false,
            ..SizingRules::default()
        };
        assert_eq!(
            fit_size(Size::new(800, 600), SCREEN, &rules),
            Some(Size::new(800, 600))
        );
        // 1820x980 available; 1920x1080 scales by min(1820/1920, 980/1080).
        let got = fit_size(Size::new(1920, 1080), SCREEN, &rules).expect("size");
        assert!(got.w <= 1820 && got.h <= 980);
        assert_eq!(got, Size::new(1742, 980));
    }

    #[test]
    fn huge_gap_leaves_nothing() {
        let rules = SizingRules {
            gap: 1000,
            ..SizingRules::default()
        };
        assert_eq!(fit_size(Size::new(800, 600), SCREEN, &rules), None);
    }
}
