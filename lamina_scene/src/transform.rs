// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node offsets.
//!
//! Widget scenegraphs only ever translate: every transform node places its
//! meshes at a point of the widget's layout and a depth taken from the
//! widget's input layer.

use core::ops::{Add, Sub};

use kurbo::Point;

/// A 3-D translation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Offset {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
    /// Depth component; larger values are closer to the viewer.
    pub z: f64,
}

impl Offset {
    /// No translation.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates an offset from its components.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Creates an offset at a 2-D point and depth.
    #[inline]
    #[must_use]
    pub const fn at(point: Point, z: f64) -> Self {
        Self::new(point.x, point.y, z)
    }

    /// Returns the 2-D part of this offset.
    #[inline]
    #[must_use]
    pub const fn to_point(self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Is every component [finite](f64::is_finite)?
    #[inline]
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Offset {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Offset {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}
