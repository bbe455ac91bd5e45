// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lengths, sizes and margins.

use core::ops::Mul;

/// A one-dimensional length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Length {
    /// A fixed length in layout units.
    Absolute(f64),
    /// A fraction of the parent's extent along the same axis.
    Relative(f64),
}

impl Length {
    /// Zero length.
    pub const ZERO: Self = Self::Absolute(0.0);

    /// The full extent of the parent.
    pub const FULL: Self = Self::Relative(1.0);

    /// Resolves this length against the parent's extent.
    #[inline]
    #[must_use]
    pub fn resolve(self, parent: f64) -> f64 {
        match self {
            Self::Absolute(v) => v,
            Self::Relative(f) => f * parent,
        }
    }
}

impl Default for Length {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Mul<f64> for Length {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        match self {
            Self::Absolute(v) => Self::Absolute(v * rhs),
            Self::Relative(f) => Self::Relative(f * rhs),
        }
    }
}

/// The size of an element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Size {
    /// Horizontal extent.
    pub width: Length,
    /// Vertical extent.
    pub height: Length,
}

impl Size {
    /// Fills the parent in both directions.
    pub const FULL: Self = Self {
        width: Length::FULL,
        height: Length::FULL,
    };

    /// Creates a size from two lengths.
    #[inline]
    #[must_use]
    pub const fn new(width: Length, height: Length) -> Self {
        Self { width, height }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::FULL
    }
}

/// Space reserved around an element, outside of its block.
///
/// Horizontal margins resolve against the parent's width, vertical margins
/// against its height.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Margin {
    /// Left margin.
    pub left: Length,
    /// Right margin.
    pub right: Length,
    /// Top margin.
    pub top: Length,
    /// Bottom margin.
    pub bottom: Length,
}

impl Margin {
    /// No margin.
    pub const ZERO: Self = Self::uniform(Length::ZERO);

    /// The same margin on all four sides.
    #[inline]
    #[must_use]
    pub const fn uniform(length: Length) -> Self {
        Self {
            left: length,
            right: length,
            top: length,
            bottom: length,
        }
    }
}
