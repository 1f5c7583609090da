#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! Uses view coordinates in points (origin at top-left, y grows downward).

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A location in the reference area.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Both coordinates are finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Offset by a vector.
    #[inline]
    pub fn offset(self, v: Vector) -> Point {
        Point::new(self.x + v.dx, self.y + v.dy)
    }
}

impl Sub for Point {
    type Output = Vector;

    fn sub(self, rhs: Point) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add<Vector> for Point {
    type Output = Point;

    fn add(self, rhs: Vector) -> Point {
        self.offset(rhs)
    }
}

impl Sub<Vector> for Point {
    type Output = Point;

    fn sub(self, rhs: Vector) -> Point {
        Point::new(self.x - rhs.dx, self.y - rhs.dy)
    }
}

/// A displacement or a velocity (points per second).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub dx: f64,
    pub dy: f64,
}

impl Vector {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a new vector.
    #[inline]
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Length of the vector.
    #[inline]
    pub fn magnitude(self) -> f64 {
        self.dx.hypot(self.dy)
    }

    /// Scale both components.
    #[inline]
    pub fn scaled(self, factor: f64) -> Vector {
        Vector::new(self.dx * factor, self.dy * factor)
    }

    /// Both components are finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.dx.is_finite() && self.dy.is_finite()
    }
}

/// Width and height in points.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// The empty size.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a new size.
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Half the width.
    #[inline]
    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    /// Half the height.
    #[inline]
    pub fn half_height(&self) -> f64 {
        self.height / 2.0
    }

    /// Area in square points.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Zero area (either side is zero).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }

    /// Both sides are finite and non-negative.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }

    /// Check if a point lies inside a rectangle of this size centered at the origin.
    ///
    /// Edges are inclusive. A size with a negative side contains nothing.
    #[inline]
    pub fn contains_centered(&self, p: Point) -> bool {
        let hw = self.half_width();
        let hh = self.half_height();
        hw >= 0.0 && hh >= 0.0 && p.x >= -hw && p.x <= hw && p.y >= -hh && p.y <= hh
    }
}

/// Clamp `value` into `[low, high]`, applying the lower bound first.
///
/// Unlike [`f64::clamp`] this never panics: when `low > high` the upper
/// bound wins. NaN input resolves to the lower bound.
#[inline]
pub fn clamp_low_then_high(value: f64, low: f64, high: f64) -> f64 {
    value.max(low).min(high)
}

/// Clamp the center of an `item` so it stays inside `bounds`.
///
/// The item is kept fully inside when it fits. On an axis where it does
/// not, the upper bound wins, and the result is still pinned to
/// `[0, extent]` so the center never leaves the reference area.
#[must_use]
pub fn clamp_item_center(center: Point, item: Size, bounds: Size) -> Point {
    fn axis(value: f64, half: f64, extent: f64) -> f64 {
        clamp_low_then_high(clamp_low_then_high(value, half, extent - half), 0.0, extent)
    }
    Point::new(
        axis(center.x, item.half_width(), bounds.width),
        axis(center.y, item.half_height(), bounds.height),
    )
}
