//! Bounding boxes and tolerance-based comparisons.
//!
//! All coordinates are PDF user-space points with the origin in the
//! bottom-left corner of the page.  Re-rendered documents shift by
//! sub-point rounding, so every comparison in this crate is made within an
//! absolute tolerance rather than by exact equality.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle `(x1, y1)`-`(x2, y2)` with `x1 <= x2` and
/// `y1 <= y2`.
///
/// Zero-width or zero-height boxes are allowed (space glyphs, hairlines).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    /// Build a box from two corners given in any order.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        BoundingBox {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// The smallest box enclosing every point, or `None` for an empty
    /// iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f32, f32)>,
    {
        let mut iter = points.into_iter();
        let (x, y) = iter.next()?;
        let mut bbox = BoundingBox {
            x1: x,
            y1: y,
            x2: x,
            y2: y,
        };
        for (x, y) in iter {
            bbox.x1 = bbox.x1.min(x);
            bbox.y1 = bbox.y1.min(y);
            bbox.x2 = bbox.x2.max(x);
            bbox.y2 = bbox.y2.max(y);
        }
        Some(bbox)
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// `true` when every coordinate is finite and the box has non-negative
    /// size.  Malformed boxes never match anything.
    pub fn is_valid(&self) -> bool {
        [self.x1, self.y1, self.x2, self.y2]
            .iter()
            .all(|v| v.is_finite())
            && self.x1 <= self.x2
            && self.y1 <= self.y2
    }

    /// The smallest box enclosing both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }

    /// Component-wise near-equality of all four coordinates.
    pub fn near(&self, other: &BoundingBox, tol: f32) -> bool {
        self.is_valid()
            && other.is_valid()
            && near(self.x1, other.x1, tol)
            && near(self.y1, other.y1, tol)
            && near(self.x2, other.x2, tol)
            && near(self.y2, other.y2, tol)
    }

    /// Whether the lower-left corner lies within `tol` of `(x, y)`.
    pub fn origin_near(&self, x: f32, y: f32, tol: f32) -> bool {
        self.is_valid() && near(self.x1, x, tol) && near(self.y1, y, tol)
    }

    /// Whether `other` lies inside `self`, allowing each edge to stick out
    /// by at most `tol`.
    pub fn contains(&self, other: &BoundingBox, tol: f32) -> bool {
        self.is_valid()
            && other.is_valid()
            && other.x1 >= self.x1 - tol
            && other.y1 >= self.y1 - tol
            && other.x2 <= self.x2 + tol
            && other.y2 <= self.y2 + tol
    }
}

/// Absolute-tolerance comparison of two scalars.
///
/// Symmetric in `a` and `b`; any non-finite operand (or a negative / NaN
/// tolerance) yields `false`.
pub fn near(a: f32, b: f32, tol: f32) -> bool {
    a.is_finite() && b.is_finite() && (a - b).abs() < tol
}

/// Horizontal distance from the right edge of `left` to the left edge of
/// `right`.  Negative when the boxes overlap.  Malformed boxes are
/// infinitely far apart.
pub fn horizontal_gap(left: &BoundingBox, right: &BoundingBox) -> f32 {
    if !left.is_valid() || !right.is_valid() {
        return f32::INFINITY;
    }
    right.x1 - left.x2
}

/// Vertical distance from the bottom edge of `upper` to the top edge of
/// `lower`.  Negative when the boxes overlap.
pub fn vertical_gap(upper: &BoundingBox, lower: &BoundingBox) -> f32 {
    if !upper.is_valid() || !lower.is_valid() {
        return f32::INFINITY;
    }
    upper.y1 - lower.y2
}
