// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bindings between controllers and layout tree nodes.

use arbor_layout::{LayoutTree, NodeId, ScrollAlign};

use crate::scrollable::Scrollable;
use crate::swiper::SwiperController;

/// A [`Scrollable`] bound to a scrolling node (list, grid, or water flow).
///
/// Call [`ScrollHost::sync`] after each flush so the physics see the current extents, and
/// [`ScrollHost::apply`] after input so the next flush lays out the new offset. A stale node
/// turns both into no-ops.
#[derive(Debug)]
pub struct ScrollHost {
    node: NodeId,
    scrollable: Scrollable,
}

impl ScrollHost {
    /// Binds `scrollable` to `node`.
    #[must_use]
    pub fn new(node: NodeId, scrollable: Scrollable) -> Self {
        Self { node, scrollable }
    }

    /// The bound node.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The scroll state.
    #[must_use]
    pub fn scrollable(&self) -> &Scrollable {
        &self.scrollable
    }

    /// The scroll state, for input and programmatic scrolling.
    pub fn scrollable_mut(&mut self) -> &mut Scrollable {
        &mut self.scrollable
    }

    /// Reads extents and layout-resolved offsets from the last flush.
    ///
    /// Returns `false` if the node is stale or does not scroll.
    pub fn sync(&mut self, tree: &LayoutTree) -> bool {
        let Some(metrics) = tree.scroll_metrics(self.node) else {
            tracing::debug!(node = ?self.node, "scroll host bound to a stale or non-scrolling node");
            return false;
        };
        self.scrollable.sync_from_layout(&metrics);
        true
    }

    /// Pushes the current offset into the tree. Returns `true` if the node will re-measure.
    pub fn apply(&self, tree: &mut LayoutTree) -> bool {
        tree.set_scroll_offset(self.node, self.scrollable.layout_offset())
    }

    /// Advances running animations and pushes the result. Returns `true` if the node will
    /// re-measure.
    pub fn tick(&mut self, tree: &mut LayoutTree, timestamp_ms: f64) -> bool {
        self.scrollable.tick(timestamp_ms) && self.apply(tree)
    }

    /// Stops any animation and asks the node to bring `index` into view on the next flush.
    ///
    /// The resolved offset is picked up by the [`ScrollHost::sync`] after that flush.
    pub fn scroll_to_index(&mut self, tree: &mut LayoutTree, index: usize, align: ScrollAlign) -> bool {
        self.scrollable.stop_animate();
        tree.scroll_to_index(self.node, index, align)
    }
}

/// A [`SwiperController`] bound to a swiper node.
#[derive(Debug)]
pub struct SwiperHost {
    node: NodeId,
    controller: SwiperController,
}

impl SwiperHost {
    /// Binds `controller` to `node`.
    #[must_use]
    pub fn new(node: NodeId, controller: SwiperController) -> Self {
        Self { node, controller }
    }

    /// The bound node.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The paging state.
    #[must_use]
    pub fn controller(&self) -> &SwiperController {
        &self.controller
    }

    /// The paging state, for input and programmatic paging.
    pub fn controller_mut(&mut self) -> &mut SwiperController {
        &mut self.controller
    }

    /// Reads page count and extent from the last flush. Returns `false` for a stale node.
    pub fn sync(&mut self, tree: &LayoutTree) -> bool {
        let Some(metrics) = tree.swiper_metrics(self.node) else {
            tracing::debug!(node = ?self.node, "swiper host bound to a stale or non-swiper node");
            return false;
        };
        self.controller.sync(metrics);
        true
    }

    /// Pushes the current page and offset into the tree.
    pub fn apply(&self, tree: &mut LayoutTree) -> bool {
        let (index, offset) = self.controller.position();
        tree.set_swiper_position(self.node, index, offset)
    }

    /// Advances settling and autoplay and pushes the result.
    pub fn tick(&mut self, tree: &mut LayoutTree, timestamp_ms: f64) -> bool {
        self.controller.tick(timestamp_ms);
        self.apply(tree)
    }
}
