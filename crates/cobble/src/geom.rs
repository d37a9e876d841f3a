//! Integer geometry primitives.
//!
//! All spatial values are in pixel space. Vectors are [`glam::IVec2`]; this
//! module adds the axis-aligned [`Rect`] and a few heading helpers.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle with its origin at the top-left corner.
///
/// Overlap is strict: rectangles that only share an edge do not overlap,
/// and an empty rectangle overlaps nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Horizontal extent
    pub width: i32,
    /// Vertical extent
    pub height: i32,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from min (inclusive) and max (exclusive) corners.
    #[must_use]
    pub fn from_min_max(min: IVec2, max: IVec2) -> Self {
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Create a rectangle of the given size centered on a point.
    ///
    /// Odd sizes put the extra pixel on the right/bottom side.
    #[must_use]
    pub fn centered(center: IVec2, size: IVec2) -> Self {
        Self::new(center.x - size.x / 2, center.y - size.y / 2, size.x, size.y)
    }

    /// Top-left corner.
    #[must_use]
    pub const fn min(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    /// Bottom-right corner (exclusive).
    #[must_use]
    pub const fn max(&self) -> IVec2 {
        IVec2::new(self.right(), self.bottom())
    }

    /// Right edge (exclusive).
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Size as a vector.
    #[must_use]
    pub const fn size(&self) -> IVec2 {
        IVec2::new(self.width, self.height)
    }

    /// Center point, rounded toward the top-left.
    #[must_use]
    pub const fn center(&self) -> IVec2 {
        IVec2::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// True if the rectangle has no area.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Translate by a vector.
    #[must_use]
    pub fn translated(&self, v: IVec2) -> Self {
        Self::new(self.x + v.x, self.y + v.y, self.width, self.height)
    }

    /// Grow by `dx` on the left and right and `dy` on the top and bottom.
    ///
    /// Negative amounts shrink the rectangle.
    #[must_use]
    pub const fn inflated(&self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.x - dx,
            self.y - dy,
            self.width + dx * 2,
            self.height + dy * 2,
        )
    }

    /// Extend in the direction of `v`, covering both the rectangle and its
    /// translation by `v`.
    #[must_use]
    pub fn expanded(&self, v: IVec2) -> Self {
        self.union(&self.translated(v))
    }

    /// Smallest rectangle containing both.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Self {
        Self::from_min_max(self.min().min(other.min()), self.max().max(other.max()))
    }

    /// Overlapping area, if any.
    #[must_use]
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Self::from_min_max(
            self.min().max(other.min()),
            self.max().min(other.max()),
        ))
    }

    /// Strict overlap test.
    #[must_use]
    pub const fn overlaps(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// True if `other` lies entirely inside this rectangle (edges may touch).
    #[must_use]
    pub const fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// True if the point lies inside (min inclusive, max exclusive).
    #[must_use]
    pub const fn contains_point(&self, p: IVec2) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }
}

/// Heading helpers for grid-aligned movement vectors.
///
/// Screen convention: +x is right, +y is down.
pub trait HeadingExt {
    /// Rotate 90° clockwise on screen.
    #[must_use]
    fn rotated_cw(self) -> Self;
    /// Rotate 90° counter-clockwise on screen.
    #[must_use]
    fn rotated_ccw(self) -> Self;
    /// True if both components are zero.
    fn is_zero(self) -> bool;
}

impl HeadingExt for IVec2 {
    fn rotated_cw(self) -> Self {
        // y points down, so glam's perp (x,y)->(-y,x) turns clockwise on screen
        self.perp()
    }

    fn rotated_ccw(self) -> Self {
        -self.perp()
    }

    fn is_zero(self) -> bool {
        self == IVec2::ZERO
    }
}
