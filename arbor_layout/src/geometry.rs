// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis-aware accessors over kurbo geometry.
//!
//! Layout algorithms are written once in terms of a main and a cross axis and serve both
//! orientations through these helpers.

use kurbo::{Insets, Point, Size};

/// Layout or scroll direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Axis {
    /// Left to right.
    Horizontal,
    /// Top to bottom.
    #[default]
    Vertical,
}

impl Axis {
    /// Maps a binding-layer index to an axis. Unknown indices fall back to [`Axis::Vertical`].
    #[must_use]
    pub fn from_index(index: i32) -> Self {
        match index {
            0 => Self::Horizontal,
            1 => Self::Vertical,
            _ => {
                tracing::warn!(index, "unknown axis, using Vertical");
                Self::Vertical
            }
        }
    }

    /// The perpendicular axis.
    #[must_use]
    pub const fn cross(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }

    /// Component of `size` along this axis.
    #[must_use]
    pub const fn main(self, size: Size) -> f64 {
        match self {
            Self::Horizontal => size.width,
            Self::Vertical => size.height,
        }
    }

    /// Component of `size` across this axis.
    #[must_use]
    pub const fn cross_of(self, size: Size) -> f64 {
        self.cross().main(size)
    }

    /// Builds a size from main and cross components.
    #[must_use]
    pub const fn size(self, main: f64, cross: f64) -> Size {
        match self {
            Self::Horizontal => Size::new(main, cross),
            Self::Vertical => Size::new(cross, main),
        }
    }

    /// Builds a point from main and cross components.
    #[must_use]
    pub const fn point(self, main: f64, cross: f64) -> Point {
        match self {
            Self::Horizontal => Point::new(main, cross),
            Self::Vertical => Point::new(cross, main),
        }
    }

    /// Component of `point` along this axis.
    #[must_use]
    pub const fn main_of_point(self, point: Point) -> f64 {
        match self {
            Self::Horizontal => point.x,
            Self::Vertical => point.y,
        }
    }

    /// Total insets along this axis (leading plus trailing).
    #[must_use]
    pub fn main_insets(self, insets: Insets) -> f64 {
        match self {
            Self::Horizontal => insets.x_value(),
            Self::Vertical => insets.y_value(),
        }
    }

    /// Replaces the main component of `size`.
    #[must_use]
    pub const fn with_main(self, size: Size, main: f64) -> Size {
        self.size(main, self.cross_of(size))
    }

    /// Replaces the cross component of `size`.
    #[must_use]
    pub const fn with_cross(self, size: Size, cross: f64) -> Size {
        self.size(self.main(size), cross)
    }
}

/// Grows `size` by `insets` on every side.
pub(crate) fn inflate(size: Size, insets: Insets) -> Size {
    Size::new(
        (size.width + insets.x_value()).max(0.0),
        (size.height + insets.y_value()).max(0.0),
    )
}

/// A size whose components may each be unknown.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct OptionalSize {
    /// Width, if known.
    pub width: Option<f64>,
    /// Height, if known.
    pub height: Option<f64>,
}

impl OptionalSize {
    /// Both components unknown.
    pub const NONE: Self = Self {
        width: None,
        height: None,
    };

    /// Both components known.
    #[must_use]
    pub const fn from_size(size: Size) -> Self {
        Self {
            width: Some(size.width),
            height: Some(size.height),
        }
    }

    /// Component along `axis`.
    #[must_use]
    pub const fn main(&self, axis: Axis) -> Option<f64> {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// Sets the component along `axis`.
    pub fn set_main(&mut self, axis: Axis, value: Option<f64>) {
        match axis {
            Axis::Horizontal => self.width = value,
            Axis::Vertical => self.height = value,
        }
    }

    /// Returns `true` if both components are known.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.width.is_some() && self.height.is_some()
    }

    /// Fills unknown components from `fallback`.
    #[must_use]
    pub fn unwrap_or(&self, fallback: Size) -> Size {
        Size::new(
            self.width.unwrap_or(fallback.width),
            self.height.unwrap_or(fallback.height),
        )
    }
}
