// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node arena, dirty propagation, and the frame scheduler.

use arbor_virtual::ScrollAlign;
use kurbo::{Point, Rect, RoundedRect, Size, Vec2};

use crate::algorithm::{Algorithm, JumpRequest, ScrollMetrics, SwiperMetrics};
use crate::constraint::LayoutConstraint;
use crate::cx::LayoutCx;
use crate::geometry_node::GeometryNode;
use crate::paint::{PaintPrimitive, Painter};
use crate::report::FrameReport;
use crate::types::{DirtyFlags, NodeFlags, NodeId, NodeStyle};

/// Upper bound on scheduler passes per frame.
///
/// A pass only repeats when a scroll container re-measured on its own changed size, which
/// forces its ancestors to measure again.
const MAX_PASSES: usize = 4;

/// Layout tree.
///
/// Nodes live in an arena and are addressed by generational [`NodeId`]s. Property changes
/// only mark nodes dirty; the work happens in [`LayoutTree::flush`], once per frame.
///
/// ## Example
///
/// ```rust
/// use arbor_layout::{Axis, Flex, LayoutTree, Leaf, NodeStyle};
/// use kurbo::Size;
///
/// let mut tree = LayoutTree::new();
/// let row = tree.insert(None, NodeStyle::default(), Flex::new(Axis::Horizontal));
/// let a = tree.insert(Some(row), NodeStyle::default(), Leaf::new(Size::new(30.0, 10.0)));
/// let b = tree.insert(Some(row), NodeStyle::default(), Leaf::new(Size::new(20.0, 15.0)));
///
/// // Nothing is measured until the frame is flushed.
/// tree.flush(Size::new(200.0, 100.0));
///
/// assert_eq!(tree.geometry(row).unwrap().frame_size, Size::new(50.0, 15.0));
/// assert_eq!(tree.geometry(b).unwrap().frame_offset.x, 30.0);
/// # let _ = a;
/// ```
pub struct LayoutTree {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    roots: Vec<NodeId>,
    frame: u64,
    viewport: Option<Size>,
    force_full_measure: bool,
    escalated: bool,
}

impl core::fmt::Debug for LayoutTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("LayoutTree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("roots", &self.roots.len())
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct Node {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    style: NodeStyle,
    /// Taken out while the algorithm runs.
    algorithm: Option<Algorithm>,
    geometry: GeometryNode,
    dirty: DirtyFlags,
    flags: NodeFlags,
    /// The node's own constraint at its last full measure.
    constraint: Option<LayoutConstraint>,
    measured_frame: Option<u64>,
}

impl Node {
    fn new(generation: u32, style: NodeStyle, algorithm: Algorithm) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            style,
            algorithm: Some(algorithm),
            geometry: GeometryNode::default(),
            dirty: DirtyFlags::CONTENT | DirtyFlags::MEASURE,
            flags: NodeFlags::default(),
            constraint: None,
            measured_frame: None,
        }
    }
}

impl LayoutTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            roots: Vec::new(),
            frame: 0,
            viewport: None,
            force_full_measure: false,
            escalated: false,
        }
    }

    /// Insert a new node as the last child of `parent` (or as a root if `None`).
    ///
    /// A stale `parent` inserts a root.
    pub fn insert(
        &mut self,
        parent: Option<NodeId>,
        style: NodeStyle,
        algorithm: impl Into<Algorithm>,
    ) -> NodeId {
        let algorithm = algorithm.into();
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, style, algorithm));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId stores 32-bit indices."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, style, algorithm)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId stores 32-bit indices."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = NodeId::new(idx, generation);
        match parent.filter(|p| self.is_alive(*p)) {
            Some(p) => {
                self.link_parent(id, p);
                self.mark_measure_upward(p);
            }
            None => self.roots.push(id),
        }
        id
    }

    /// Remove a node and its subtree.
    ///
    /// Safe to call during a pass: sibling iteration works on snapshots and skips stale ids.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        match self.node_opt(id).and_then(|n| n.parent) {
            Some(parent) => {
                self.unlink_parent(id, parent);
                self.mark_measure_upward(parent);
            }
            None => self.roots.retain(|r| *r != id),
        }
        self.free_subtree(id);
    }

    fn free_subtree(&mut self, id: NodeId) {
        let children = self
            .node_opt_mut(id)
            .map(|n| core::mem::take(&mut n.children))
            .unwrap_or_default();
        for child in children {
            self.free_subtree(child);
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Returns `true` if `id` refers to a live node.
    ///
    /// A `NodeId` is live if its slot exists and its generation matches the current
    /// generation stored in that slot.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node_opt(id).is_some()
    }

    /// Returns the parent of a node if live, or `None` for roots or stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// Get the children of a node, or empty slice if node is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node_opt(id).map_or(&[], |n| &n.children)
    }

    /// Root nodes in insertion order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Style of a live node.
    pub fn style(&self, id: NodeId) -> Option<&NodeStyle> {
        self.node_opt(id).map(|n| &n.style)
    }

    /// Resolved geometry of a live node, as of the last flush.
    pub fn geometry(&self, id: NodeId) -> Option<GeometryNode> {
        self.node_opt(id).map(|n| n.geometry)
    }

    /// Pending work of a live node.
    pub fn dirty(&self, id: NodeId) -> Option<DirtyFlags> {
        self.node_opt(id).map(|n| n.dirty)
    }

    /// Algorithm of a live node.
    pub fn algorithm(&self, id: NodeId) -> Option<&Algorithm> {
        self.node_opt(id).and_then(|n| n.algorithm.as_ref())
    }

    /// Returns `true` if the node is live and part of the render tree.
    pub fn is_active(&self, id: NodeId) -> bool {
        self.node_opt(id)
            .is_some_and(|n| n.flags.contains(NodeFlags::ACTIVE))
    }

    /// Frame rectangle of a live node in absolute coordinates.
    pub fn absolute_rect(&self, id: NodeId) -> Option<Rect> {
        let node = self.node_opt(id)?;
        let origin = match node.parent {
            Some(parent) => self.content_origin(parent)?,
            None => Point::ZERO,
        };
        Some(Rect::from_origin_size(
            origin + node.geometry.frame_offset.to_vec2(),
            node.geometry.frame_size,
        ))
    }

    fn content_origin(&self, id: NodeId) -> Option<Point> {
        let rect = self.absolute_rect(id)?;
        let geometry = &self.node_opt(id)?.geometry;
        Some(rect.origin() + geometry.content_offset())
    }

    /// Replace a node's style.
    ///
    /// Changes that can affect size mark the node and its ancestors for measure. Changes that
    /// only affect appearance (background, corner radius) mark the node for repaint and skip
    /// measure and layout entirely.
    pub fn set_style(&mut self, id: NodeId, style: NodeStyle) {
        let Some(node) = self.node_opt_mut(id) else {
            tracing::debug!(?id, "set_style on a stale node");
            return;
        };
        if node.style == style {
            return;
        }
        let affects_size = node.style.affects_size(&style);
        node.style = style;
        if affects_size {
            self.mark_measure_upward(id);
        } else {
            self.mark_boundary(id, DirtyFlags::RENDER);
        }
    }

    /// Replace a node's algorithm.
    pub fn set_algorithm(&mut self, id: NodeId, algorithm: impl Into<Algorithm>) {
        let Some(node) = self.node_opt_mut(id) else {
            tracing::debug!(?id, "set_algorithm on a stale node");
            return;
        };
        node.algorithm = Some(algorithm.into());
        self.mark_measure_upward(id);
    }

    /// Mutate a node's algorithm properties in place and mark it for measure.
    pub fn update_algorithm(&mut self, id: NodeId, f: impl FnOnce(&mut Algorithm)) {
        let Some(algorithm) = self.node_opt_mut(id).and_then(|n| n.algorithm.as_mut()) else {
            tracing::debug!(?id, "update_algorithm on a stale node");
            return;
        };
        f(algorithm);
        self.mark_measure_upward(id);
    }

    /// Set the intrinsic content size of a leaf node. Returns `true` if it changed.
    pub fn set_leaf_content(&mut self, id: NodeId, content: Size) -> bool {
        let Some(Algorithm::Leaf(leaf)) = self.node_opt_mut(id).and_then(|n| n.algorithm.as_mut())
        else {
            tracing::debug!(?id, "set_leaf_content on a stale or non-leaf node");
            return false;
        };
        if leaf.content() == content {
            return false;
        }
        leaf.set_content(content);
        self.mark_measure_upward(id);
        true
    }

    /// Mark pending work on a node.
    ///
    /// [`DirtyFlags::CONTENT`] and [`DirtyFlags::MEASURE`] propagate measure to ancestors.
    /// [`DirtyFlags::LAYOUT`] and [`DirtyFlags::RENDER`] stay local.
    pub fn mark_dirty(&mut self, id: NodeId, flags: DirtyFlags) {
        if !self.is_alive(id) {
            return;
        }
        if flags.intersects(DirtyFlags::CONTENT | DirtyFlags::MEASURE) {
            self.mark_measure_upward(id);
        }
        let local = flags & (DirtyFlags::LAYOUT | DirtyFlags::RENDER);
        if !local.is_empty() {
            self.mark_boundary(id, local);
        }
    }

    /// Returns `true` if any node has pending work, so the caller should request a frame.
    pub fn needs_flush(&self) -> bool {
        self.roots
            .iter()
            .filter_map(|r| self.node_opt(*r))
            .any(|n| !n.dirty.is_empty())
    }

    /// When set, every measure runs in full instead of reusing cached sizes.
    pub fn set_force_full_measure(&mut self, force: bool) {
        self.force_full_measure = force;
    }

    /// Set the signed scroll offset of a scrolling node.
    ///
    /// Only the node itself is re-measured on the next flush; its ancestors keep their sizes
    /// unless the node's own size changes. Returns `false` for stale, non-scrolling, or
    /// unchanged nodes.
    pub fn set_scroll_offset(&mut self, id: NodeId, offset: f64) -> bool {
        let Some(algorithm) = self.node_opt_mut(id).and_then(|n| n.algorithm.as_mut()) else {
            tracing::debug!(?id, "set_scroll_offset on a stale node");
            return false;
        };
        if !algorithm.as_dyn_mut().set_scroll_offset(offset) {
            return false;
        }
        self.mark_boundary(id, DirtyFlags::MEASURE);
        true
    }

    /// Ask a scrolling node to bring `index` into view on the next flush.
    pub fn scroll_to_index(&mut self, id: NodeId, index: usize, align: ScrollAlign) -> bool {
        let Some(algorithm) = self.node_opt_mut(id).and_then(|n| n.algorithm.as_mut()) else {
            tracing::debug!(?id, "scroll_to_index on a stale node");
            return false;
        };
        if !algorithm
            .as_dyn_mut()
            .jump_to_index(JumpRequest { index, align })
        {
            return false;
        }
        self.mark_boundary(id, DirtyFlags::MEASURE);
        true
    }

    /// Scroll state of a scrolling node, as of the last flush.
    pub fn scroll_metrics(&self, id: NodeId) -> Option<ScrollMetrics> {
        self.algorithm(id)?.as_dyn().scroll_metrics()
    }

    /// Set the current page and drag offset of a swiper node.
    pub fn set_swiper_position(&mut self, id: NodeId, index: usize, offset: f64) -> bool {
        let Some(Algorithm::Swiper(swiper)) =
            self.node_opt_mut(id).and_then(|n| n.algorithm.as_mut())
        else {
            tracing::debug!(?id, "set_swiper_position on a stale or non-swiper node");
            return false;
        };
        if !swiper.set_position(index, offset) {
            return false;
        }
        self.mark_boundary(id, DirtyFlags::MEASURE);
        true
    }

    /// Paging state of a swiper node, as of the last flush.
    pub fn swiper_metrics(&self, id: NodeId) -> Option<SwiperMetrics> {
        match self.algorithm(id)? {
            Algorithm::Swiper(swiper) => Some(swiper.metrics()),
            _ => None,
        }
    }

    /// Runs measure and layout for every node with pending work.
    ///
    /// Each root is measured against `viewport`. Constraints flow top-down and sizes resolve
    /// bottom-up; every node is measured at most once per frame no matter how often it was
    /// marked.
    pub fn flush(&mut self, viewport: Size) -> FrameReport {
        self.frame += 1;
        self.viewport = Some(viewport);
        let mut report = FrameReport {
            frame: self.frame,
            ..FrameReport::default()
        };
        for _ in 0..MAX_PASSES {
            self.escalated = false;
            let roots = self.roots.clone();
            for root in roots {
                self.visit(root, &mut report);
            }
            if !self.escalated {
                break;
            }
        }
        if self.escalated {
            tracing::warn!(frame = self.frame, "layout did not settle within pass limit");
        }
        tracing::trace!(
            frame = self.frame,
            measured = report.measured.len(),
            skipped = report.skipped.len(),
            laid_out = report.laid_out.len(),
            repaint = report.repaint.len(),
            "frame flushed"
        );
        report
    }

    /// Emits paint primitives for every active node, parents before children.
    pub fn paint(&self, painter: &mut dyn Painter) {
        for root in &self.roots {
            self.paint_node(*root, Point::ZERO, painter);
        }
    }

    fn paint_node(&self, id: NodeId, parent_content: Point, painter: &mut dyn Painter) {
        let Some(node) = self.node_opt(id) else {
            return;
        };
        if !node.flags.contains(NodeFlags::ACTIVE) {
            return;
        }
        let origin = parent_content + node.geometry.frame_offset.to_vec2();
        let frame = Rect::from_origin_size(origin, node.geometry.frame_size);
        if let Some(color) = node.style.background {
            if node.style.corner_radius > 0.0 {
                painter.draw(PaintPrimitive::RoundedRect {
                    rect: RoundedRect::from_rect(frame, node.style.corner_radius),
                    color,
                });
            } else {
                painter.draw(PaintPrimitive::Fill { rect: frame, color });
            }
        }
        let algorithm = node.algorithm.as_ref().map(Algorithm::as_dyn);
        let clip = algorithm.is_some_and(|a| a.clips_children());
        if clip {
            painter.draw(PaintPrimitive::PushClip(frame));
        }
        let content = origin + node.geometry.content_offset();
        for child in &node.children {
            self.paint_node(*child, content, painter);
        }
        if let Some(algorithm) = algorithm {
            algorithm.paint(origin, &node.geometry, painter);
        }
        if clip {
            painter.draw(PaintPrimitive::PopClip);
        }
    }

    fn root_constraint(&self, style: &NodeStyle) -> Option<LayoutConstraint> {
        self.viewport
            .map(|viewport| LayoutConstraint::root(viewport).for_child(style))
    }

    fn visit(&mut self, id: NodeId, report: &mut FrameReport) {
        let Some(node) = self.node_opt(id) else {
            return;
        };
        if !node.flags.contains(NodeFlags::ACTIVE) {
            return;
        }
        let dirty = node.dirty;
        let parent = node.parent;
        let before = node.geometry.frame_size;
        let (constraint, pending) = match parent {
            None => {
                let constraint = self.root_constraint(&node.style);
                let pending = Self::pending(node) || node.constraint != constraint;
                (constraint, pending)
            }
            Some(_) => (node.constraint, Self::pending(node)),
        };
        if dirty.contains(DirtyFlags::RENDER) {
            report.mark_repaint(id);
        }

        if pending {
            let Some(constraint) = constraint else {
                tracing::debug!(?id, "node has no constraint yet, waiting for its parent");
                return;
            };
            self.measure_node(id, constraint, report);
            if parent.is_none() {
                self.place(id, Point::ZERO);
            }
            self.layout_node(id, report);
            if let Some(parent) = parent
                && self.geometry(id).is_some_and(|g| g.frame_size != before)
            {
                tracing::debug!(?id, "scroll container changed size, measuring ancestors");
                self.mark_measure_upward(parent);
                self.escalated = true;
            }
        } else if dirty.contains(DirtyFlags::LAYOUT) {
            self.layout_node(id, report);
        } else if dirty.contains(DirtyFlags::DESCENDANT) {
            self.visit_children(id, report);
        }
        if let Some(node) = self.node_opt_mut(id) {
            node.dirty.remove(DirtyFlags::DESCENDANT | DirtyFlags::RENDER);
        }
    }

    fn visit_children(&mut self, id: NodeId, report: &mut FrameReport) {
        let children = self.children_of(id).to_vec();
        for child in children {
            if self.is_alive(child) {
                self.visit(child, report);
            }
        }
    }

    fn pending(node: &Node) -> bool {
        node.dirty
            .intersects(DirtyFlags::CONTENT | DirtyFlags::MEASURE)
            || node.measured_frame.is_none()
    }

    pub(crate) fn needs_measure(&self, id: NodeId) -> bool {
        self.node_opt(id).is_some_and(Self::pending)
    }

    pub(crate) fn measure_node(
        &mut self,
        id: NodeId,
        constraint: LayoutConstraint,
        report: &mut FrameReport,
    ) {
        let frame = self.frame;
        let force = self.force_full_measure;
        let Some(node) = self.node_opt_mut(id) else {
            tracing::debug!(?id, "measure of a stale node skipped");
            return;
        };
        let pending = Self::pending(node);
        if !pending && node.constraint == Some(constraint) {
            if node.measured_frame == Some(frame) {
                return;
            }
            if !force {
                let dirty = node.dirty;
                node.dirty.remove(DirtyFlags::DESCENDANT | DirtyFlags::RENDER);
                report.skipped.push(id);
                if dirty.contains(DirtyFlags::RENDER) {
                    report.mark_repaint(id);
                }
                if dirty.contains(DirtyFlags::DESCENDANT) {
                    self.visit_children(id, report);
                }
                return;
            }
        }

        node.dirty
            .remove(DirtyFlags::CONTENT | DirtyFlags::MEASURE | DirtyFlags::RENDER);
        node.dirty.insert(DirtyFlags::LAYOUT);
        node.constraint = Some(constraint);
        node.measured_frame = Some(frame);
        node.geometry.padding = node.style.padding;
        node.geometry.margin = node.style.margin;
        let mut algorithm = node.algorithm.take();
        let desired = match algorithm.as_mut() {
            Some(algorithm) => {
                let mut cx = LayoutCx::new(self, id, report);
                algorithm.as_dyn_mut().measure(&mut cx, &constraint)
            }
            None => Size::ZERO,
        };
        let size = constraint.resolve(desired);
        if let Some(node) = self.node_opt_mut(id) {
            node.algorithm = algorithm;
            node.geometry.frame_size = size;
        }
        report.measured.push(id);
        report.mark_repaint(id);
    }

    fn layout_node(&mut self, id: NodeId, report: &mut FrameReport) {
        let Some(node) = self.node_opt_mut(id) else {
            return;
        };
        node.dirty
            .remove(DirtyFlags::LAYOUT | DirtyFlags::DESCENDANT | DirtyFlags::RENDER);
        let mut algorithm = node.algorithm.take();
        if let Some(algorithm) = algorithm.as_mut() {
            let mut cx = LayoutCx::new(self, id, report);
            algorithm.as_dyn_mut().layout(&mut cx);
        }
        if let Some(node) = self.node_opt_mut(id) {
            node.algorithm = algorithm;
        }
        report.laid_out.push(id);
        report.mark_repaint(id);

        let children = self.children_of(id).to_vec();
        for child in children {
            let Some(node) = self.node_opt(child) else {
                continue;
            };
            if !node.flags.contains(NodeFlags::ACTIVE) {
                continue;
            }
            if node.dirty.contains(DirtyFlags::LAYOUT) {
                self.layout_node(child, report);
            } else if node
                .dirty
                .intersects(DirtyFlags::DESCENDANT | DirtyFlags::RENDER)
            {
                self.visit(child, report);
            }
        }
    }

    pub(crate) fn place(&mut self, id: NodeId, origin: Point) {
        if let Some(node) = self.node_opt_mut(id) {
            let margin = node.geometry.margin;
            node.geometry.frame_offset = origin + Vec2::new(margin.x0, margin.y0);
        }
    }

    pub(crate) fn set_active(&mut self, id: NodeId, active: bool) {
        if let Some(node) = self.node_opt_mut(id) {
            node.flags.set(NodeFlags::ACTIVE, active);
        }
    }

    /// Marks `id` for measure and every ancestor for measure too, since their sizes may
    /// depend on it.
    fn mark_measure_upward(&mut self, id: NodeId) {
        let mut flags = DirtyFlags::CONTENT | DirtyFlags::MEASURE;
        let mut current = Some(id);
        while let Some(cur) = current {
            let Some(node) = self.node_opt_mut(cur) else {
                break;
            };
            node.dirty |= flags;
            flags = DirtyFlags::MEASURE | DirtyFlags::DESCENDANT;
            current = node.parent;
        }
    }

    /// Marks `flags` on `id` only; ancestors learn that a descendant has work.
    fn mark_boundary(&mut self, id: NodeId, flags: DirtyFlags) {
        let mut current = self.node_opt_mut(id).and_then(|node| {
            node.dirty |= flags;
            node.parent
        });
        while let Some(cur) = current {
            let Some(node) = self.node_opt_mut(cur) else {
                break;
            };
            node.dirty |= DirtyFlags::DESCENDANT;
            current = node.parent;
        }
    }

    fn node_opt(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId) {
        if let Some(p) = self.node_opt_mut(parent) {
            p.children.push(id);
        }
        if let Some(n) = self.node_opt_mut(id) {
            n.parent = Some(parent);
        }
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        if let Some(p) = self.node_opt_mut(parent) {
            p.children.retain(|c| *c != id);
        }
        if let Some(n) = self.node_opt_mut(id) {
            n.parent = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LayoutTree;
    use crate::algorithm::{Flex, LayoutAlgorithm, Leaf};
    use crate::constraint::LayoutConstraint;
    use crate::cx::LayoutCx;
    use crate::geometry::Axis;
    use crate::paint::PaintPrimitive;
    use crate::types::{Dimension, DirtyFlags, NodeId, NodeStyle};
    use kurbo::{Point, Rect, Size};

    const VIEWPORT: Size = Size::new(200.0, 100.0);

    fn leaf(w: f64, h: f64) -> Leaf {
        Leaf::new(Size::new(w, h))
    }

    fn column_with_three_leaves() -> (LayoutTree, NodeId, [NodeId; 3]) {
        let mut tree = LayoutTree::new();
        let root = tree.insert(None, NodeStyle::default(), Flex::new(Axis::Vertical));
        let a = tree.insert(Some(root), NodeStyle::default(), leaf(10.0, 10.0));
        let b = tree.insert(Some(root), NodeStyle::default(), leaf(20.0, 15.0));
        let c = tree.insert(Some(root), NodeStyle::default(), leaf(30.0, 5.0));
        (tree, root, [a, b, c])
    }

    #[test]
    fn liveness_insert_remove_reuse() {
        let mut tree = LayoutTree::new();
        let root = tree.insert(None, NodeStyle::default(), leaf(1.0, 1.0));
        let a = tree.insert(Some(root), NodeStyle::default(), leaf(1.0, 1.0));
        assert!(tree.is_alive(a));
        assert_eq!(tree.parent_of(a), Some(root));

        tree.remove(a);
        assert!(!tree.is_alive(a));
        assert!(tree.children_of(root).is_empty());
        assert_eq!(tree.geometry(a), None);

        let b = tree.insert(Some(root), NodeStyle::default(), leaf(1.0, 1.0));
        assert!(tree.is_alive(b));
        assert!(!tree.is_alive(a));
        if a.0 == b.0 {
            assert!(b.1 > a.1, "generation must increase on reuse");
        }
    }

    #[test]
    fn first_flush_measures_everything_then_goes_idle() {
        let (mut tree, root, leaves) = column_with_three_leaves();
        assert!(tree.needs_flush());
        let report = tree.flush(VIEWPORT);
        assert_eq!(report.measured.len(), 4);
        assert_eq!(tree.geometry(root).unwrap().frame_size, Size::new(30.0, 30.0));
        assert_eq!(tree.geometry(leaves[2]).unwrap().frame_offset, Point::new(0.0, 25.0));

        assert!(!tree.needs_flush());
        let idle = tree.flush(VIEWPORT);
        assert!(idle.is_idle());
    }

    #[test]
    fn marks_are_coalesced_into_one_measure_per_frame() {
        let (mut tree, root, leaves) = column_with_three_leaves();
        tree.flush(VIEWPORT);
        for _ in 0..3 {
            tree.mark_dirty(leaves[1], DirtyFlags::MEASURE);
        }
        tree.set_leaf_content(leaves[1], Size::new(20.0, 25.0));
        let report = tree.flush(VIEWPORT);
        assert_eq!(report.measure_count(leaves[1]), 1);
        assert_eq!(report.measure_count(root), 1);
        // Clean siblings reuse their cached size.
        assert!(report.skipped.contains(&leaves[0]));
        assert!(report.skipped.contains(&leaves[2]));
        assert_eq!(tree.geometry(root).unwrap().frame_size, Size::new(30.0, 40.0));
        assert_eq!(tree.geometry(leaves[2]).unwrap().frame_offset.y, 35.0);
    }

    #[test]
    fn skipped_and_forced_measure_agree_bit_for_bit() {
        let build = || {
            let mut tree = LayoutTree::new();
            let root = tree.insert(None, NodeStyle::default(), Flex::new(Axis::Horizontal));
            let style = NodeStyle {
                width: Dimension::Percent(0.3),
                ..NodeStyle::default()
            };
            let child = tree.insert(Some(root), style, leaf(7.3, 11.1));
            let other = tree.insert(Some(root), NodeStyle::default(), leaf(1.0 / 3.0, 2.0));
            (tree, root, child, other)
        };

        let (mut skipping, root_a, child_a, other_a) = build();
        skipping.flush(VIEWPORT);
        skipping.mark_dirty(root_a, DirtyFlags::MEASURE);
        let report = skipping.flush(VIEWPORT);
        assert!(report.skipped.contains(&child_a));
        assert!(report.skipped.contains(&other_a));

        let (mut forced, root_b, child_b, other_b) = build();
        forced.flush(VIEWPORT);
        forced.set_force_full_measure(true);
        forced.mark_dirty(root_b, DirtyFlags::MEASURE);
        let report = forced.flush(VIEWPORT);
        assert!(report.skipped.is_empty());
        assert_eq!(report.measure_count(child_b), 1);

        for (a, b) in [(root_a, root_b), (child_a, child_b), (other_a, other_b)] {
            let a = skipping.geometry(a).unwrap();
            let b = forced.geometry(b).unwrap();
            assert_eq!(a.frame_size.width.to_bits(), b.frame_size.width.to_bits());
            assert_eq!(a.frame_size.height.to_bits(), b.frame_size.height.to_bits());
            assert_eq!(a.frame_offset, b.frame_offset);
        }
    }

    #[test]
    fn background_change_only_repaints() {
        let (mut tree, _root, leaves) = column_with_three_leaves();
        tree.flush(VIEWPORT);
        let style = NodeStyle {
            background: Some(0xFF00_FF00),
            ..NodeStyle::default()
        };
        tree.set_style(leaves[0], style);
        let report = tree.flush(VIEWPORT);
        assert!(report.measured.is_empty());
        assert!(report.laid_out.is_empty());
        assert_eq!(report.repaint, [leaves[0]]);
    }

    #[test]
    fn size_style_change_remeasures_the_chain() {
        let (mut tree, root, leaves) = column_with_three_leaves();
        tree.flush(VIEWPORT);
        tree.set_style(leaves[0], NodeStyle::fixed(50.0, 10.0));
        let report = tree.flush(VIEWPORT);
        assert_eq!(report.measure_count(leaves[0]), 1);
        assert_eq!(report.measure_count(root), 1);
        assert_eq!(tree.geometry(root).unwrap().frame_size.width, 50.0);
    }

    #[test]
    fn viewport_change_remeasures_the_root() {
        let mut tree = LayoutTree::new();
        let style = NodeStyle {
            width: Dimension::MatchParent,
            height: Dimension::MatchParent,
            ..NodeStyle::default()
        };
        let root = tree.insert(None, style, Flex::new(Axis::Vertical));
        tree.flush(VIEWPORT);
        assert_eq!(tree.geometry(root).unwrap().frame_size, VIEWPORT);
        let report = tree.flush(Size::new(50.0, 60.0));
        assert_eq!(report.measure_count(root), 1);
        assert_eq!(tree.geometry(root).unwrap().frame_size, Size::new(50.0, 60.0));
    }

    #[derive(Debug)]
    struct RemovesSibling {
        victim: Option<NodeId>,
    }

    impl LayoutAlgorithm for RemovesSibling {
        fn measure(&mut self, cx: &mut LayoutCx<'_>, constraint: &LayoutConstraint) -> Size {
            let content = constraint.deflate(cx.padding());
            let mut height = 0.0;
            for child in cx.children() {
                height += cx.measure_child(child, &content).height;
                // Measuring the first child removes the second from the snapshot being walked.
                if let Some(victim) = self.victim.take() {
                    cx.remove_child(victim);
                }
            }
            Size::new(10.0, height)
        }

        fn layout(&mut self, cx: &mut LayoutCx<'_>) {
            let mut y = 0.0;
            for child in cx.children() {
                cx.place_child(child, Point::new(0.0, y));
                y += cx.child_size(child).height;
            }
        }
    }

    #[test]
    fn removing_a_sibling_mid_pass_is_safe() {
        let mut tree = LayoutTree::new();
        let root = tree.insert(
            None,
            NodeStyle::default(),
            Box::new(RemovesSibling { victim: None }) as Box<dyn LayoutAlgorithm>,
        );
        let a = tree.insert(Some(root), NodeStyle::default(), leaf(10.0, 10.0));
        let b = tree.insert(Some(root), NodeStyle::default(), leaf(10.0, 20.0));
        let c = tree.insert(Some(root), NodeStyle::default(), leaf(10.0, 30.0));
        tree.set_algorithm(
            root,
            Box::new(RemovesSibling { victim: Some(b) }) as Box<dyn LayoutAlgorithm>,
        );

        tree.flush(VIEWPORT);
        assert!(!tree.is_alive(b));
        assert_eq!(tree.children_of(root), [a, c]);
        assert_eq!(tree.geometry(root).unwrap().frame_size.height, 40.0);
        assert_eq!(tree.geometry(c).unwrap().frame_offset.y, 10.0);
    }

    #[test]
    fn stale_ids_are_no_ops() {
        let (mut tree, _root, leaves) = column_with_three_leaves();
        tree.flush(VIEWPORT);
        tree.remove(leaves[1]);
        tree.set_style(leaves[1], NodeStyle::fixed(1.0, 1.0));
        tree.mark_dirty(leaves[1], DirtyFlags::MEASURE);
        assert!(!tree.set_leaf_content(leaves[1], Size::new(3.0, 3.0)));
        assert!(!tree.set_scroll_offset(leaves[1], -10.0));
        assert_eq!(tree.scroll_metrics(leaves[1]), None);
        assert_eq!(tree.absolute_rect(leaves[1]), None);
        tree.flush(VIEWPORT);
        assert_eq!(tree.geometry(leaves[2]).unwrap().frame_offset.y, 10.0);
    }

    #[test]
    fn absolute_rects_include_padding_and_margin() {
        let mut tree = LayoutTree::new();
        let root_style = NodeStyle {
            padding: kurbo::Insets::uniform(5.0),
            ..NodeStyle::default()
        };
        let root = tree.insert(None, root_style, Flex::new(Axis::Vertical));
        let child_style = NodeStyle {
            margin: kurbo::Insets::new(2.0, 3.0, 0.0, 0.0),
            background: Some(0xFF11_2233),
            ..NodeStyle::default()
        };
        let child = tree.insert(Some(root), child_style, leaf(10.0, 10.0));
        tree.flush(VIEWPORT);

        assert_eq!(tree.geometry(root).unwrap().frame_size, Size::new(22.0, 23.0));
        let rect = tree.absolute_rect(child).unwrap();
        assert_eq!(rect, Rect::new(7.0, 8.0, 17.0, 18.0));

        let mut prims = Vec::new();
        tree.paint(&mut prims);
        assert_eq!(
            prims,
            [PaintPrimitive::Fill {
                rect,
                color: 0xFF11_2233
            }]
        );
    }
}
