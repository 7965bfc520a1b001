//! Overlap resolution: turn an ideal corner into a collision-free one.

use tracing::trace;

use crate::{
    Corner, CornerSet, WindowId,
    geom::{Rect, Size},
};

/// Where another controlled window currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Window the rectangle belongs to.
    pub id: WindowId,
    /// Cached visual rectangle.
    pub rect: Rect,
}

/// Searches the allowed corners for a placement that overlaps no other
/// controlled window. Holds everything that is fixed for a session.
#[derive(Clone, Copy, Debug)]
pub struct OverlapResolver {
    /// Corners a window may be sent to.
    allowed: CornerSet,
    /// Primary screen dimensions.
    screen: Size,
    /// Distance kept from the screen edges.
    gap: i32,
    /// Overlap depth, in pixels, that is still considered free.
    tolerance: i32,
}

impl OverlapResolver {
    /// Construct a resolver for one screen and configuration.
    pub fn new(allowed: CornerSet, screen: Size, gap: i32, tolerance: i32) -> Self {
        Self {
            allowed,
            screen,
            gap,
            tolerance,
        }
    }

    /// Allowed corners.
    pub fn allowed(&self) -> CornerSet {
        self.allowed
    }

    /// True when `rect` overlaps any placement other than `self_id`'s own.
    pub fn overlaps_any(&self, rect: &Rect, others: &[Placement], self_id: WindowId) -> bool {
        others
            .iter()
            .filter(|p| p.id != self_id)
            .any(|p| p.rect.overlaps(rect, self.tolerance))
    }

    /// True when a `size` window at `corner` would be clear of `others`.
    pub fn is_free(
        &self,
        corner: Corner,
        size: Size,
        others: &[Placement],
        self_id: WindowId,
    ) -> bool {
        let rect = corner.target_rect(self.screen, size, self.gap);
        !self.overlaps_any(&rect, others, self_id)
    }

    /// Pick the corner a window at `current` should move to.
    ///
    /// The ideal corner wins when it is allowed and free. Otherwise the
    /// allowed corners are walked cyclically from `current`, skipping
    /// `current` itself unless it is the only allowed corner. When nothing is
    /// free the window stays at `current`.
    ///
    /// The cyclic walk is not a nearest-free search: with three allowed
    /// corners it can pass over a free corner closer to `ideal`.
    pub fn safe_corner(
        &self,
        current: Corner,
        ideal: Corner,
        size: Size,
        others: &[Placement],
        self_id: WindowId,
    ) -> Corner {
        if self.allowed.contains(ideal) && self.is_free(ideal, size, others, self_id) {
            return ideal;
        }
        let only_one = self.allowed.len() == 1;
        for candidate in self.allowed.cycle_from(current) {
            if candidate == current && !only_one {
                continue;
            }
            if self.is_free(candidate, size, others, self_id) {
                trace!(%ideal, %candidate, "ideal corner unavailable; using alternative");
                return candidate;
            }
        }
        trace!(%current, %ideal, "no safe corner; staying put");
        current
    }

    /// Initial corner for the `index`-th window: `allowed[index]` (cycling),
    /// or the next free allowed corner after it.
    pub fn initial_corner(
        &self,
        index: usize,
        size: Size,
        placed: &[Placement],
        self_id: WindowId,
    ) -> Option<Corner> {
        (0..self.allowed.len())
            .map(|k| self.allowed.nth_cyclic(index + k))
            .find(|c| self.is_free(*c, size, placed, self_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Size = Size::new(1920, 1080);
    const SIZE: Size = Size::new(480, 270);
    const GAP: i32 = 50;

    fn resolver(spec: &str) -> OverlapResolver {
        let allowed = CornerSet::from_quadrants(spec).expect("valid corners");
        OverlapResolver::new(allowed, SCREEN, GAP, 0)
    }

    fn at(id: u32, corner: Corner) -> Placement {
        Placement {
            id: WindowId(isize::try_from(id).expect("small id")),
            rect: corner.target_rect(SCREEN, SIZE, GAP),
        }
    }

    #[test]
    fn free_ideal_wins() {
        let r = resolver("1234");
        let others = [at(2, Corner::BottomLeft)];
        let got = r.safe_corner(
            Corner::TopLeft,
            Corner::BottomRight,
            SIZE,
            &others,
            WindowId(1),
        );
        assert_eq!(got, Corner::BottomRight);
    }

    #[test]
    fn disallowed_ideal_falls_back_cyclically() {
        // Only the top corners are allowed; ideal bottom-right is rejected.
        let r = resolver("12");
        let got = r.safe_corner(Corner::TopLeft, Corner::BottomRight, SIZE, &[], WindowId(1));
        assert_eq!(got, Corner::TopRight);
    }

    #[test]
    fn occupied_ideal_redirects() {
        let r = resolver("1234");
        let others = [at(2, Corner::BottomRight)];
        // Cycle from TopLeft: skip TopLeft, TopRight is free.
        let got = r.safe_corner(
            Corner::TopLeft,
            Corner::BottomRight,
            SIZE,
            &others,
            WindowId(1),
        );
        assert_eq!(got, Corner::TopRight);
    }

    #[test]
    fn stays_put_when_nothing_free() {
        let r = resolver("12");
        let others = [at(2, Corner::TopRight)];
        let got = r.safe_corner(Corner::TopLeft, Corner::TopRight, SIZE, &others, WindowId(1));
        assert_eq!(got, Corner::TopLeft);
    }

    #[test]
    fn single_allowed_corner_may_be_kept() {
        let r = resolver("2");
        let got = r.safe_corner(Corner::TopLeft, Corner::BottomRight, SIZE, &[], WindowId(1));
        assert_eq!(got, Corner::TopLeft);
    }

    #[test]
    fn own_rect_is_ignored() {
        let r = resolver("1234");
        let others = [at(1, Corner::BottomRight)];
        let got = r.safe_corner(
            Corner::TopLeft,
            Corner::BottomRight,
            SIZE,
            &others,
            WindowId(1),
        );
        assert_eq!(got, Corner::BottomRight);
    }

    #[test]
    fn cyclic_order_is_not_nearest() {
        // Allowed: TL, TR, BL. Window at TR wants BR (not allowed). The walk
        // from TR visits BL before TL even though both are free.
        let r = resolver("123");
        let got = r.safe_corner(Corner::TopRight, Corner::BottomRight, SIZE, &[], WindowId(1));
        assert_eq!(got, Corner::BottomLeft);
    }

    #[test]
    fn initial_corner_skips_occupied() {
        let r = resolver("12");
        let placed = [at(1, Corner::TopLeft)];
        assert_eq!(
            r.initial_corner(0, SIZE, &placed, WindowId(2)),
            Some(Corner::TopRight)
        );
        assert_eq!(
            r.initial_corner(1, SIZE, &placed, WindowId(2)),
            Some(Corner::TopRight)
        );
        let full = [at(1, Corner::TopLeft), at(3, Corner::TopRight)];
        assert_eq!(r.initial_corner(0, SIZE, &full, WindowId(2)), None);
    }
}
