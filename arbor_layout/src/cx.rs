// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The context a layout algorithm runs in.

use kurbo::{Insets, Point, Size, Vec2};

use crate::constraint::LayoutConstraint;
use crate::report::FrameReport;
use crate::tree::LayoutTree;
use crate::types::{NodeId, NodeStyle};

/// Access to one node and its children while that node's algorithm runs.
///
/// Every child query tolerates stale ids: a child removed earlier in the same pass reads as
/// zero-sized and inactive, and writes to it are ignored.
#[derive(Debug)]
pub struct LayoutCx<'a> {
    pub(crate) tree: &'a mut LayoutTree,
    pub(crate) id: NodeId,
    pub(crate) report: &'a mut FrameReport,
}

impl<'a> LayoutCx<'a> {
    pub(crate) fn new(tree: &'a mut LayoutTree, id: NodeId, report: &'a mut FrameReport) -> Self {
        Self { tree, id, report }
    }

    /// The node being laid out.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Style of the node being laid out.
    #[must_use]
    pub fn style(&self) -> NodeStyle {
        self.tree.style(self.id).cloned().unwrap_or_default()
    }

    /// Padding of the node being laid out.
    #[must_use]
    pub fn padding(&self) -> Insets {
        self.tree.style(self.id).map_or(Insets::ZERO, |s| s.padding)
    }

    /// Live children in order, as a snapshot.
    ///
    /// The snapshot stays safe to iterate if children are removed during the pass; check
    /// [`LayoutCx::is_alive`] or rely on the stale-id tolerance of the other methods.
    #[must_use]
    pub fn children(&self) -> Vec<NodeId> {
        self.tree.children_of(self.id).to_vec()
    }

    /// Number of children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.tree.children_of(self.id).len()
    }

    /// Child at `index`, if any.
    #[must_use]
    pub fn child_at(&self, index: usize) -> Option<NodeId> {
        self.tree.children_of(self.id).get(index).copied()
    }

    /// Returns `true` if `id` has not been removed.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.tree.is_alive(id)
    }

    /// Style of a child, or the default style for a stale id.
    #[must_use]
    pub fn child_style(&self, child: NodeId) -> NodeStyle {
        self.tree.style(child).cloned().unwrap_or_default()
    }

    /// Measures `child` against `content`, the constraint for this node's content box.
    ///
    /// Returns the child's margin box size. A clean child whose derived constraint is unchanged
    /// reuses its cached size; a child already measured this frame with the same constraint is
    /// not measured again.
    pub fn measure_child(&mut self, child: NodeId, content: &LayoutConstraint) -> Size {
        let Some(style) = self.tree.style(child) else {
            tracing::debug!(?child, "measure of a stale child skipped");
            return Size::ZERO;
        };
        let constraint = content.for_child(style);
        self.tree.measure_node(child, constraint, self.report);
        self.child_size(child)
    }

    /// Margin box size of `child` from its last measure.
    #[must_use]
    pub fn child_size(&self, child: NodeId) -> Size {
        self.tree
            .geometry(child)
            .map_or(Size::ZERO, |g| g.margin_frame_size())
    }

    /// Returns `true` if `child` has pending content or measure work, or was never measured.
    #[must_use]
    pub fn child_needs_measure(&self, child: NodeId) -> bool {
        self.tree.needs_measure(child)
    }

    /// Positions `child` so that its margin box starts at `origin` in content coordinates.
    pub fn place_child(&mut self, child: NodeId, origin: Point) {
        self.tree.place(child, origin);
    }

    /// Current offset of `child`'s margin box, in content coordinates.
    #[must_use]
    pub fn child_origin(&self, child: NodeId) -> Option<Point> {
        self.tree
            .geometry(child)
            .map(|g| g.frame_offset - Vec2::new(g.margin.x0, g.margin.y0))
    }

    /// Adds `child` to, or removes it from, the render tree.
    pub fn set_child_active(&mut self, child: NodeId, active: bool) {
        self.tree.set_active(child, active);
    }

    /// Returns `true` if `child` is part of the render tree.
    #[must_use]
    pub fn is_child_active(&self, child: NodeId) -> bool {
        self.tree.is_active(child)
    }

    /// Removes `child` and its subtree from the tree.
    pub fn remove_child(&mut self, child: NodeId) {
        if self.tree.parent_of(child) == Some(self.id) {
            self.tree.remove(child);
        }
    }

    /// Frame size of this node. Only meaningful during layout.
    #[must_use]
    pub fn frame_size(&self) -> Size {
        self.tree.geometry(self.id).map_or(Size::ZERO, |g| g.frame_size)
    }

    /// Content box size of this node. Only meaningful during layout.
    #[must_use]
    pub fn content_size(&self) -> Size {
        self.tree
            .geometry(self.id)
            .map_or(Size::ZERO, |g| g.content_size())
    }

    /// The frame counter of the pass.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.report.frame
    }
}
