// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer input as delivered by the platform.

use core::num::NonZeroU64;

use kurbo::Point;

/// Pointer identifier for tracking multiple concurrent contacts.
pub type PointerId = NonZeroU64;

/// Phase of a pointer event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    /// Contact began.
    Down,
    /// Contact moved.
    Move,
    /// Contact ended.
    Up,
    /// The platform took the contact away, for example to a system gesture.
    Cancel,
}

/// What produced the pointer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToolType {
    /// A finger on a touch surface.
    #[default]
    Finger,
    /// A stylus.
    Pen,
    /// A mouse or trackpad cursor.
    Mouse,
    /// Anything else.
    Unknown,
}

impl ToolType {
    /// Maps a binding-layer index. Unknown indices fall back to [`ToolType::Unknown`].
    #[must_use]
    pub fn from_index(index: i32) -> Self {
        match index {
            0 => Self::Finger,
            1 => Self::Pen,
            2 => Self::Mouse,
            _ => Self::Unknown,
        }
    }
}

/// A single pointer sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    /// Which contact this is.
    pub id: PointerId,
    /// Event phase.
    pub kind: PointerKind,
    /// Position in the coordinate space of the gesture area.
    pub position: Point,
    /// Normalized pressure in `[0, 1]`; 1 for tools without pressure.
    pub pressure: f64,
    /// Tool that produced the event.
    pub tool: ToolType,
    /// Event time in milliseconds.
    pub timestamp_ms: u64,
}

impl PointerEvent {
    /// A finger event at full pressure.
    #[must_use]
    pub fn new(id: PointerId, kind: PointerKind, position: Point, timestamp_ms: u64) -> Self {
        Self {
            id,
            kind,
            position,
            pressure: 1.0,
            tool: ToolType::Finger,
            timestamp_ms,
        }
    }

    /// Replaces the tool.
    #[must_use]
    pub fn with_tool(mut self, tool: ToolType) -> Self {
        self.tool = tool;
        self
    }

    /// Replaces the pressure, clamped to `[0, 1]`.
    #[must_use]
    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.pressure = if pressure.is_nan() { 0.0 } else { pressure.clamp(0.0, 1.0) };
        self
    }
}
