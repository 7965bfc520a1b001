//! Screen corners, the allowed-corner set, and corner target coordinates.

use std::fmt;

use crate::{
    Error, Result,
    geom::{Point, Rect, Size},
};

/// One of the four screen corners a controlled window can occupy.
///
/// The declaration order is the cyclic search order used by the resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Corner {
    /// Top-left corner (mathematical quadrant 2).
    TopLeft,
    /// Top-right corner (mathematical quadrant 1).
    TopRight,
    /// Bottom-right corner (mathematical quadrant 4).
    BottomRight,
    /// Bottom-left corner (mathematical quadrant 3).
    BottomLeft,
}

impl Corner {
    /// All corners in cyclic order.
    pub const ALL: [Self; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomRight,
        Self::BottomLeft,
    ];

    /// Position in the cyclic order.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Map a quadrant digit (`1`..=`4`) to its corner.
    pub fn from_quadrant(c: char) -> Result<Self> {
        match c {
            '1' => Ok(Self::TopRight),
            '2' => Ok(Self::TopLeft),
            '3' => Ok(Self::BottomLeft),
            '4' => Ok(Self::BottomRight),
            other => Err(Error::InvalidCorner(other)),
        }
    }

    /// The quadrant digit users type for this corner.
    pub fn quadrant(self) -> char {
        match self {
            Self::TopRight => '1',
            Self::TopLeft => '2',
            Self::BottomLeft => '3',
            Self::BottomRight => '4',
        }
    }

    /// Visual origin for a `size` window at this corner, `gap` pixels from
    /// both adjacent screen edges.
    pub fn target_coordinates(self, screen: Size, size: Size, gap: i32) -> Point {
        let far_x = screen.w - size.w - gap;
        let far_y = screen.h - size.h - gap;
        match self {
            Self::TopLeft => Point::new(gap, gap),
            Self::TopRight => Point::new(far_x, gap),
            Self::BottomRight => Point::new(far_x, far_y),
            Self::BottomLeft => Point::new(gap, far_y),
        }
    }

    /// Visual rectangle for a `size` window at this corner.
    pub fn target_rect(self, screen: Size, size: Size, gap: i32) -> Rect {
        Rect::from_origin_size(self.target_coordinates(screen, size, gap), size)
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TopLeft => "Top-Left (Q2)",
            Self::TopRight => "Top-Right (Q1)",
            Self::BottomRight => "Bottom-Right (Q4)",
            Self::BottomLeft => "Bottom-Left (Q3)",
        };
        f.write_str(name)
    }
}

/// Non-empty set of corners windows may be placed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CornerSet {
    /// One bit per corner, indexed by [`Corner::index`].
    bits: u8,
}

impl CornerSet {
    /// Every corner allowed.
    pub const fn all() -> Self {
        Self { bits: 0b1111 }
    }

    /// Build from an iterator of corners; fails when nothing is supplied.
    pub fn from_corners(corners: impl IntoIterator<Item = Corner>) -> Result<Self> {
        let bits = corners
            .into_iter()
            .fold(0u8, |acc, c| acc | (1 << c.index()));
        if bits == 0 {
            return Err(Error::EmptyCornerSet);
        }
        Ok(Self { bits })
    }

    /// Parse a string of quadrant digits such as `"12"`. Duplicates are
    /// ignored; any character other than `1`..=`4` is rejected.
    pub fn from_quadrants(spec: &str) -> Result<Self> {
        let corners = spec
            .chars()
            .map(Corner::from_quadrant)
            .collect::<Result<Vec<_>>>()?;
        Self::from_corners(corners)
    }

    /// True when `corner` is allowed.
    #[inline]
    pub fn contains(&self, corner: Corner) -> bool {
        self.bits & (1 << corner.index()) != 0
    }

    /// Number of allowed corners.
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Always false; kept for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Allowed corners in cyclic order.
    pub fn iter(&self) -> impl Iterator<Item = Corner> + '_ {
        Corner::ALL.into_iter().filter(|c| self.contains(*c))
    }

    /// The `i`-th allowed corner, wrapping around.
    pub fn nth_cyclic(&self, i: usize) -> Corner {
        let allowed: Vec<Corner> = self.iter().collect();
        allowed[i % allowed.len()]
    }

    /// Position of `corner` within the allowed list.
    pub fn position(&self, corner: Corner) -> Option<usize> {
        self.iter().position(|c| c == corner)
    }

    /// Allowed corners in cyclic order starting at `start` (or at the first
    /// allowed corner when `start` is not allowed).
    pub fn cycle_from(&self, start: Corner) -> impl Iterator<Item = Corner> + '_ {
        let offset = self.position(start).unwrap_or(0);
        let n = self.len();
        (0..n).map(move |i| self.nth_cyclic(offset + i))
    }
}

impl Default for CornerSet {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Display for CornerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(|c| c.to_string()).collect();
        f.write_str(&names.join(", "))
    }
}
