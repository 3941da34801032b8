// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolved geometry of one node.

use kurbo::{Insets, Point, Rect, Size, Vec2};

/// A node's resolved frame, written by measure (size) and by the parent's layout (offset).
///
/// The frame offset is relative to the parent's content origin, which is the parent's frame
/// origin moved inwards by the parent's padding.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GeometryNode {
    /// Size of the frame (border box).
    pub frame_size: Size,
    /// Frame origin relative to the parent's content origin.
    pub frame_offset: Point,
    /// Space between the frame and the content box.
    pub padding: Insets,
    /// Space around the frame.
    pub margin: Insets,
}

impl GeometryNode {
    /// Frame size plus margin, the footprint a parent reserves for this node.
    #[must_use]
    pub fn margin_frame_size(&self) -> Size {
        Size::new(
            (self.frame_size.width + self.margin.x_value()).max(0.0),
            (self.frame_size.height + self.margin.y_value()).max(0.0),
        )
    }

    /// Frame rectangle in the parent's content coordinates.
    #[must_use]
    pub fn frame_rect(&self) -> Rect {
        Rect::from_origin_size(self.frame_offset, self.frame_size)
    }

    /// Frame size minus padding.
    #[must_use]
    pub fn content_size(&self) -> Size {
        Size::new(
            (self.frame_size.width - self.padding.x_value()).max(0.0),
            (self.frame_size.height - self.padding.y_value()).max(0.0),
        )
    }

    /// Content origin relative to the frame origin.
    #[must_use]
    pub fn content_offset(&self) -> Vec2 {
        Vec2::new(self.padding.x0, self.padding.y0)
    }

    /// Content rectangle in the parent's content coordinates.
    #[must_use]
    pub fn content_rect(&self) -> Rect {
        Rect::from_origin_size(self.frame_offset + self.content_offset(), self.content_size())
    }
}

#[cfg(test)]
mod tests {
    use super::GeometryNode;
    use kurbo::{Insets, Point, Rect, Size};

    #[test]
    fn content_box_is_frame_minus_padding() {
        let geometry = GeometryNode {
            frame_size: Size::new(100.0, 50.0),
            frame_offset: Point::new(10.0, 20.0),
            padding: Insets::new(5.0, 2.0, 5.0, 8.0),
            margin: Insets::uniform(4.0),
        };
        assert_eq!(geometry.content_size(), Size::new(90.0, 40.0));
        assert_eq!(geometry.content_rect(), Rect::new(15.0, 22.0, 105.0, 62.0));
        assert_eq!(geometry.margin_frame_size(), Size::new(108.0, 58.0));
    }

    #[test]
    fn oversized_padding_collapses_to_empty_content() {
        let geometry = GeometryNode {
            frame_size: Size::new(4.0, 4.0),
            padding: Insets::uniform(5.0),
            ..GeometryNode::default()
        };
        assert_eq!(geometry.content_size(), Size::ZERO);
    }
}
