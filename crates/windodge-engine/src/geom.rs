// Integer screen geometry. All coordinates are physical pixels on the primary display.

use std::fmt;

/// A screen position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate, growing downwards.
    pub y: i32,
}

impl Point {
    /// Construct a point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Width and height of a rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Size {
    /// Horizontal extent.
    pub w: i32,
    /// Vertical extent.
    pub h: i32,
}

impl Size {
    /// Construct a size.
    pub const fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }

    /// Area in square pixels, widened to avoid overflow.
    #[inline]
    pub fn area(&self) -> i64 {
        i64::from(self.w) * i64::from(self.h)
    }

    /// True when both extents are positive.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.w > 0 && self.h > 0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.w, self.h)
    }
}

/// Edge-based rectangle, `right` and `bottom` exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Rect {
    /// Left edge.
    pub left: i32,
    /// Top edge.
    pub top: i32,
    /// Right edge.
    pub right: i32,
    /// Bottom edge.
    pub bottom: i32,
}

impl Rect {
    /// Construct from edges.
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Construct from an origin and a size.
    pub const fn from_origin_size(origin: Point, size: Size) -> Self {
        Self {
            left: origin.x,
            top: origin.y,
            right: origin.x + size.w,
            bottom: origin.y + size.h,
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    #[inline]
    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Geometric center; may fall between pixels.
    #[inline]
    pub fn center(&self) -> (f64, f64) {
        (
            f64::from(self.left) + f64::from(self.width()) / 2.0,
            f64::from(self.top) + f64::from(self.height()) / 2.0,
        )
    }

    /// A rectangle with zero or negative extent is what the OS returns for
    /// windows that are still being created or already torn down.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.size().is_valid()
    }

    /// Half-open containment: the right and bottom edges are outside.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.left <= p.x && p.x < self.right && self.top <= p.y && p.y < self.bottom
    }

    /// True when the projections intersect on both axes by more than
    /// `tolerance` pixels. With a tolerance of zero, shared edges do not count.
    pub fn overlaps(&self, other: &Self, tolerance: i32) -> bool {
        !(self.left >= other.right - tolerance
            || self.right <= other.left + tolerance
            || self.top >= other.bottom - tolerance
            || self.bottom <= other.top + tolerance)
    }

    /// The same rectangle moved so its origin is `origin`.
    #[inline]
    pub fn with_origin(&self, origin: Point) -> Self {
        Self::from_origin_size(origin, self.size())
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{} {}x{}]",
            self.left,
            self.top,
            self.width(),
            self.height()
        )
    }
}

/// Invisible frame (shadow/resize border) around a window's visual area:
/// how far each visual edge sits inside the bounding rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FramePadding {
    /// Inset of the visual left edge.
    pub left: i32,
    /// Inset of the visual top edge.
    pub top: i32,
    /// Inset of the visual right edge.
    pub right: i32,
    /// Inset of the visual bottom edge.
    pub bottom: i32,
}

impl FramePadding {
    /// Measure the padding between a bounding and a visual rectangle.
    /// Negative insets are clamped to zero.
    pub fn between(bounding: &Rect, visual: &Rect) -> Self {
        Self {
            left: (visual.left - bounding.left).max(0),
            top: (visual.top - bounding.top).max(0),
            right: (bounding.right - visual.right).max(0),
            bottom: (bounding.bottom - visual.bottom).max(0),
        }
    }

    /// Bounding origin that places the visual area at `visual_origin`.
    #[inline]
    pub fn bounding_origin(&self, visual_origin: Point) -> Point {
        Point::new(visual_origin.x - self.left, visual_origin.y - self.top)
    }

    /// Bounding size for a visual area of `visual`.
    #[inline]
    pub fn bounding_size(&self, visual: Size) -> Size {
        Size::new(
            visual.w + self.left + self.right,
            visual.h + self.top + self.bottom,
        )
    }

    /// Expand a visual rectangle into the bounding rectangle the OS expects.
    pub fn to_bounding(&self, visual: &Rect) -> Rect {
        Rect::new(
            visual.left - self.left,
            visual.top - self.top,
            visual.right + self.right,
            visual.bottom + self.bottom,
        )
    }

    /// Shrink a bounding rectangle to its visual area.
    pub fn to_visual(&self, bounding: &Rect) -> Rect {
        Rect::new(
            bounding.left + self.left,
            bounding.top + self.top,
            bounding.right - self.right,
            bounding.bottom - self.bottom,
        )
    }

    /// True when bounding and visual rectangles coincide.
    #[inline]
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for FramePadding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "l={} t={} r={} b={}",
            self.left, self.top, self.right, self.bottom
        )
    }
}
