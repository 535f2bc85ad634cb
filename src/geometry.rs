//! Integer 3D points used by the stacking engine.
//!
//! Coordinates follow the puzzle input: `x` and `y` span the floor plane and
//! `z` grows upward. The floor itself sits at `z = 0`, so resting bricks
//! always have a lowest `z` of at least 1.

use std::fmt;
use std::ops::{Add, Sub};

/// A lattice point, also used as a displacement vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Point3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Point3 {
    pub const ZERO: Self = Self::new(0, 0, 0);
    /// One unit of gravity.
    pub const DOWN: Self = Self::new(0, 0, -1);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Translates the point by the given deltas.
    #[inline]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    #[inline]
    pub fn manhattan_dist(self, other: Self) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs() + (self.z - other.z).abs()
    }

    /// Component-wise integer division, truncating toward zero.
    #[inline]
    pub fn div(self, n: i32) -> Self {
        Self::new(self.x / n, self.y / n, self.z / n)
    }

    /// Component-wise minimum of two points.
    #[inline]
    pub fn min(self, other: Self) -> Self {
        Self::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    /// Component-wise maximum of two points.
    #[inline]
    pub fn max(self, other: Self) -> Self {
        Self::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }

    /// Number of axes along which the two points differ.
    pub fn differing_axes(self, other: Self) -> usize {
        usize::from(self.x != other.x)
            + usize::from(self.y != other.y)
            + usize::from(self.z != other.z)
    }
}

impl Add for Point3 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.offset(other.x, other.y, other.z)
    }
}

impl Sub for Point3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}
