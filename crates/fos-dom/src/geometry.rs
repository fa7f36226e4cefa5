//! Geometry
//!
//! Integer points, sizes and rects in CSS pixels.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Integer point
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct IntPoint {
    pub x: i32,
    pub y: i32,
}

impl IntPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn zero() -> Self {
        Self { x: 0, y: 0 }
    }
}

impl Add<IntSize> for IntPoint {
    type Output = IntPoint;

    fn add(self, rhs: IntSize) -> IntPoint {
        IntPoint::new(self.x + rhs.width, self.y + rhs.height)
    }
}

impl Sub<IntSize> for IntPoint {
    type Output = IntPoint;

    fn sub(self, rhs: IntSize) -> IntPoint {
        IntPoint::new(self.x - rhs.width, self.y - rhs.height)
    }
}

impl Sub for IntPoint {
    type Output = IntSize;

    fn sub(self, rhs: IntPoint) -> IntSize {
        IntSize::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Integer size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntSize {
    pub width: i32,
    pub height: i32,
}

impl IntSize {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Area in pixels (widened to avoid overflow)
    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Swap width and height
    pub fn transposed(&self) -> Self {
        Self::new(self.height, self.width)
    }

    /// Scale both dimensions, truncating
    pub fn scaled(&self, factor: f32) -> Self {
        Self::new(
            (self.width as f32 * factor) as i32,
            (self.height as f32 * factor) as i32,
        )
    }
}

/// Floating point size, used for scale factors
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FloatSize {
    pub width: f32,
    pub height: f32,
}

impl FloatSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn scale(&mut self, factor: f32) {
        self.width *= factor;
        self.height *= factor;
    }
}

/// Integer rectangle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct IntRect {
    pub origin: IntPoint,
    pub size: IntSize,
}

impl IntRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            origin: IntPoint::new(x, y),
            size: IntSize::new(width, height),
        }
    }

    pub fn x(&self) -> i32 {
        self.origin.x
    }

    pub fn y(&self) -> i32 {
        self.origin.y
    }

    pub fn max_x(&self) -> i32 {
        self.origin.x + self.size.width
    }

    pub fn max_y(&self) -> i32 {
        self.origin.y + self.size.height
    }

    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// Check if point is inside (half-open on the far edges)
    pub fn contains(&self, point: IntPoint) -> bool {
        point.x >= self.x() && point.x < self.max_x()
            && point.y >= self.y() && point.y < self.max_y()
    }
}
