// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paint primitives handed to a renderer.
//!
//! Painting reads resolved geometry and never mutates layout state.

use kurbo::{Line, Rect, RoundedRect};

/// One draw call, in absolute coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum PaintPrimitive {
    /// A filled rectangle.
    Fill {
        /// Area to fill.
        rect: Rect,
        /// Color as `0xAARRGGBB`.
        color: u32,
    },
    /// A filled rounded rectangle.
    RoundedRect {
        /// Shape to fill.
        rect: RoundedRect,
        /// Color as `0xAARRGGBB`.
        color: u32,
    },
    /// A stroked line, used for list dividers.
    Line {
        /// Center line of the stroke.
        line: Line,
        /// Stroke width.
        stroke_width: f64,
        /// Color as `0xAARRGGBB`.
        color: u32,
    },
    /// Clip following primitives to `rect` until the matching [`PaintPrimitive::PopClip`].
    PushClip(Rect),
    /// Ends the innermost clip.
    PopClip,
}

/// Sink for paint primitives.
pub trait Painter {
    /// Records one primitive.
    fn draw(&mut self, primitive: PaintPrimitive);
}

impl Painter for Vec<PaintPrimitive> {
    fn draw(&mut self, primitive: PaintPrimitive) {
        self.push(primitive);
    }
}
