// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Size;

use super::LayoutAlgorithm;
use crate::constraint::LayoutConstraint;
use crate::cx::LayoutCx;
use crate::geometry::inflate;

/// A node with a fixed intrinsic content size, such as text or an image measured elsewhere.
///
/// Children of a leaf are stacked at the content origin.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Leaf {
    content: Size,
}

impl Leaf {
    /// A leaf whose content measures `content`.
    #[must_use]
    pub fn new(content: Size) -> Self {
        Self { content }
    }

    /// Intrinsic content size.
    #[must_use]
    pub fn content(&self) -> Size {
        self.content
    }

    /// Updates the intrinsic content size. Prefer [`crate::LayoutTree::set_leaf_content`],
    /// which also marks the node dirty.
    pub fn set_content(&mut self, content: Size) {
        self.content = Size::new(content.width.max(0.0), content.height.max(0.0));
    }
}

impl LayoutAlgorithm for Leaf {
    fn measure(&mut self, cx: &mut LayoutCx<'_>, constraint: &LayoutConstraint) -> Size {
        let content = constraint.deflate(cx.padding()).loosened();
        for child in cx.children() {
            cx.measure_child(child, &content);
        }
        inflate(self.content, cx.padding())
    }

    fn layout(&mut self, cx: &mut LayoutCx<'_>) {
        for child in cx.children() {
            cx.place_child(child, kurbo::Point::ZERO);
        }
    }
}
