// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Masonry ("waterfall") layout.

use arbor_virtual::{ItemPosition, ItemRange, LanePlacement, LaneSet, jump_position};
use kurbo::Size;

use super::lazy::sync_active;
use super::template::{GridTemplate, TrackSizes, track_offsets, track_total};
use super::{JumpRequest, LayoutAlgorithm, ScrollMetrics};
use crate::constraint::LayoutConstraint;
use crate::cx::LayoutCx;
use crate::geometry::{Axis, OptionalSize, inflate};
use crate::types::NodeId;

/// Upper bound on re-measuring passes after estimated items turn out different.
const SETTLE_PASSES: usize = 4;

#[derive(Clone, Copy, Debug)]
struct Placed {
    id: NodeId,
    at: LanePlacement,
    /// `false` while the extent is the average of measured items.
    measured: bool,
}

/// A scrolling masonry container.
///
/// Each item goes to the lane whose accumulated extent is currently the shortest, with the
/// lowest lane index winning ties. Placements are kept across frames; a change to an item
/// replays placement from that item on. Lanes come from the columns template (scrolling
/// vertically) or, when only a rows template is set, from the rows template (scrolling
/// horizontally).
///
/// A jump far ahead places the skipped items with the average measured extent and measures
/// them once they come near the viewport.
#[derive(Debug)]
pub struct WaterFlow {
    template: GridTemplate,
    axis: Axis,
    /// Gap between items of one column.
    pub row_gap: f64,
    /// Gap between columns.
    pub column_gap: f64,
    /// Items kept active beyond the visible ones on each side.
    pub cached_count: usize,
    lanes: Option<LaneSet>,
    key: Option<(TrackSizes, f64)>,
    placements: Vec<Placed>,
    lane_offsets: TrackSizes,
    offset: f64,
    pending_jump: Option<JumpRequest>,
    range: ItemRange,
    active: core::ops::Range<usize>,
    swept: bool,
    metrics: ScrollMetrics,
}

impl Default for WaterFlow {
    fn default() -> Self {
        Self {
            template: GridTemplate::default(),
            axis: Axis::Vertical,
            row_gap: 0.0,
            column_gap: 0.0,
            cached_count: 1,
            lanes: None,
            key: None,
            placements: Vec::new(),
            lane_offsets: TrackSizes::new(),
            offset: 0.0,
            pending_jump: None,
            range: ItemRange::default(),
            active: 0..0,
            swept: false,
            metrics: ScrollMetrics::default(),
        }
    }
}

impl WaterFlow {
    /// A single-column flow.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `text` as the columns template and scrolls vertically.
    #[must_use]
    pub fn with_columns_template(mut self, text: &str) -> Self {
        self.set_template(Axis::Vertical, text);
        self
    }

    /// Uses `text` as the rows template and scrolls horizontally.
    #[must_use]
    pub fn with_rows_template(mut self, text: &str) -> Self {
        self.set_template(Axis::Horizontal, text);
        self
    }

    /// Sets the row and column gaps.
    #[must_use]
    pub fn with_gaps(mut self, row_gap: f64, column_gap: f64) -> Self {
        self.row_gap = row_gap.max(0.0);
        self.column_gap = column_gap.max(0.0);
        self
    }

    /// Sets how many items stay active beyond the visible ones.
    #[must_use]
    pub fn with_cached_count(mut self, cached_count: usize) -> Self {
        self.cached_count = cached_count;
        self
    }

    /// Replaces the lane template. Invalid text falls back to one `1fr` lane.
    pub fn set_template(&mut self, axis: Axis, text: &str) {
        self.template = GridTemplate::parse_or_default(text);
        self.axis = axis;
        self.key = None;
        self.swept = false;
    }

    /// Scroll axis.
    #[must_use]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Lane of each placed item, in index order.
    #[must_use]
    pub fn lane_assignments(&self) -> Vec<usize> {
        self.placements.iter().map(|p| p.at.lane).collect()
    }

    fn gaps(&self) -> (f64, f64) {
        match self.axis {
            Axis::Vertical => (self.column_gap, self.row_gap),
            Axis::Horizontal => (self.row_gap, self.column_gap),
        }
    }

    /// Drops placements from the first item that moved or was removed, and re-measures
    /// placed items whose content changed.
    fn invalidate(&mut self, cx: &mut LayoutCx<'_>, sizes: &[f64], viewport: Option<f64>) {
        let moved = self
            .placements
            .iter()
            .enumerate()
            .position(|(index, p)| cx.child_at(index) != Some(p.id));
        if let Some(first) = moved {
            tracing::debug!(first, placed = self.placements.len(), "replaying lane placement");
            self.placements.truncate(first);
            self.replay_from(first, sizes);
        }
        let mut dirty = Vec::new();
        for (index, p) in self.placements.iter_mut().enumerate() {
            if p.measured && cx.child_needs_measure(p.id) {
                p.measured = false;
                dirty.push(index);
            }
        }
        if !dirty.is_empty() {
            self.measure_estimated(cx, sizes, viewport, dirty);
        }
    }

    /// Rebuilds lane ends from the stored extents. Items before `from` keep their lanes;
    /// later ones go to the shortest lane again.
    fn replay_from(&mut self, from: usize, sizes: &[f64]) {
        let Some(lanes) = self.lanes.as_mut() else {
            return;
        };
        lanes.reset();
        for (index, p) in self.placements.iter_mut().enumerate() {
            let lane = if index < from {
                p.at.lane
            } else {
                lanes.shortest_lane()
            };
            let at = lanes.place_in(lane, p.at.end - p.at.start);
            // A lane of another width invalidates the measurement.
            if at.lane != p.at.lane && sizes.get(at.lane) != sizes.get(p.at.lane) {
                p.measured = false;
            }
            p.at = at;
        }
    }

    fn measure_item(
        &self,
        cx: &mut LayoutCx<'_>,
        child: NodeId,
        lane: usize,
        lane_sizes: &[f64],
        viewport: Option<f64>,
    ) -> f64 {
        let axis = self.axis;
        let cross = lane_sizes.get(lane).copied().unwrap_or(f64::INFINITY);
        let mut ideal = OptionalSize::NONE;
        ideal.set_main(axis.cross(), Some(cross).filter(|c| c.is_finite()));
        let constraint = LayoutConstraint {
            min_size: Size::ZERO,
            max_size: axis.size(f64::INFINITY, cross),
            self_ideal_size: ideal,
            parent_ideal_size: OptionalSize::NONE,
            percent_reference: axis.size(
                viewport.unwrap_or(0.0),
                if cross.is_finite() { cross } else { 0.0 },
            ),
        };
        axis.main(cx.measure_child(child, &constraint))
    }

    fn place_next(&mut self, cx: &mut LayoutCx<'_>, lane_sizes: &[f64], viewport: Option<f64>) {
        let Some(child) = cx.child_at(self.placements.len()) else {
            return;
        };
        let Some(lane) = self.lanes.as_ref().map(LaneSet::shortest_lane) else {
            return;
        };
        let extent = self.measure_item(cx, child, lane, lane_sizes, viewport);
        let Some(lanes) = self.lanes.as_mut() else {
            return;
        };
        let at = lanes.place_in(lane, extent);
        self.placements.push(Placed {
            id: child,
            at,
            measured: true,
        });
    }

    fn place_estimate(&mut self, cx: &LayoutCx<'_>, extent: f64) {
        let Some(child) = cx.child_at(self.placements.len()) else {
            return;
        };
        let Some(lanes) = self.lanes.as_mut() else {
            return;
        };
        let at = lanes.place(extent);
        self.placements.push(Placed {
            id: child,
            at,
            measured: false,
        });
    }

    fn average_extent(&self) -> f64 {
        let (sum, n) = self
            .placements
            .iter()
            .filter(|p| p.measured)
            .fold((0.0, 0_usize), |(sum, n), p| (sum + p.at.end - p.at.start, n + 1));
        if n == 0 { 0.0 } else { sum / n as f64 }
    }

    /// Gives item `index` a measured placement, estimating the unplaced items before it.
    fn reach(&mut self, cx: &mut LayoutCx<'_>, sizes: &[f64], viewport: Option<f64>, index: usize) {
        if index < self.placements.len() {
            self.measure_estimated(cx, sizes, viewport, [index]);
            return;
        }
        if !self.placements.iter().any(|p| p.measured) {
            self.place_next(cx, sizes, viewport);
        }
        let estimate = self.average_extent();
        let skipped = index.saturating_sub(self.placements.len());
        if skipped > 0 {
            tracing::trace!(index, skipped, estimate, "estimating items before jump target");
        }
        while self.placements.len() < index.min(cx.child_count()) {
            self.place_estimate(cx, estimate);
        }
        self.fill_to(cx, sizes, viewport, index + 1);
    }

    /// Measures the estimated items among `indices` and replays lanes after the first one
    /// whose estimate was off. Returns `true` if anything moved.
    fn measure_estimated(
        &mut self,
        cx: &mut LayoutCx<'_>,
        sizes: &[f64],
        viewport: Option<f64>,
        indices: impl IntoIterator<Item = usize>,
    ) -> bool {
        let mut first_changed: Option<usize> = None;
        for index in indices {
            let Some(p) = self.placements.get(index).copied() else {
                continue;
            };
            if p.measured {
                continue;
            }
            let extent = self.measure_item(cx, p.id, p.at.lane, sizes, viewport);
            let slot = &mut self.placements[index];
            slot.measured = true;
            if extent != p.at.end - p.at.start {
                slot.at.end = slot.at.start + extent.max(0.0);
                first_changed = Some(first_changed.map_or(index, |first| first.min(index)));
            }
        }
        match first_changed {
            Some(first) => {
                self.replay_from(first, sizes);
                true
            }
            None => false,
        }
    }

    fn fill_until(&mut self, cx: &mut LayoutCx<'_>, sizes: &[f64], viewport: Option<f64>, end: f64) {
        let count = cx.child_count();
        while self.placements.len() < count
            && self.lanes.as_ref().is_some_and(|l| l.min_end() < end)
        {
            self.place_next(cx, sizes, viewport);
        }
    }

    fn fill_to(&mut self, cx: &mut LayoutCx<'_>, sizes: &[f64], viewport: Option<f64>, len: usize) {
        while self.placements.len() < len.min(cx.child_count()) {
            self.place_next(cx, sizes, viewport);
        }
    }

    /// First and last placed items intersecting `[start, end)`.
    fn visible(&self, start: f64, end: f64) -> Option<(usize, usize)> {
        let mut hits = self
            .placements
            .iter()
            .enumerate()
            .filter(|(_, p)| ItemPosition::new(p.at.start, p.at.end).intersects(start, end))
            .map(|(index, _)| index);
        let first = hits.next()?;
        Some((first, hits.last().unwrap_or(first)))
    }

    fn content_extent(&self, count: usize) -> f64 {
        let placed = self.placements.len();
        let end = self.lanes.as_ref().map_or(0.0, LaneSet::max_end);
        if placed >= count || placed == 0 {
            end
        } else {
            end * count as f64 / placed as f64
        }
    }
}

impl LayoutAlgorithm for WaterFlow {
    fn measure(&mut self, cx: &mut LayoutCx<'_>, constraint: &LayoutConstraint) -> Size {
        let axis = self.axis;
        let padding = cx.padding();
        let content = constraint.deflate(padding);
        let (lane_gap, main_gap) = self.gaps();
        let cross = content.main_limit(axis.cross());
        let sizes = self.template.resolve(cross.unwrap_or(f64::INFINITY), lane_gap);
        self.lane_offsets = track_offsets(&sizes, lane_gap);

        let count = cx.child_count();
        let viewport = content.main_limit(axis);
        let key = (sizes.clone(), main_gap);
        if self.key.as_ref() != Some(&key) {
            tracing::debug!(lanes = sizes.len(), "lane layout changed, dropping placements");
            self.lanes = Some(LaneSet::new(sizes.len(), main_gap));
            self.placements.clear();
            self.key = Some(key);
            self.swept = false;
        } else {
            self.invalidate(cx, &sizes, viewport);
        }
        self.range.retain_below(count);

        let cached = self.cached_count;
        let mut position = -self.offset;
        let mut active = 0..0;
        match viewport {
            None => {
                self.fill_to(cx, &sizes, None, count);
                self.measure_estimated(cx, &sizes, None, 0..count);
                position = 0.0;
                if let Some((first, last)) = self.visible(0.0, f64::INFINITY) {
                    active = first.saturating_sub(cached)..(last + 1 + cached).min(count);
                }
            }
            Some(viewport) => {
                let mut jumped = false;
                if let Some(jump) = self.pending_jump.take() {
                    if jump.index < count {
                        self.reach(cx, &sizes, Some(viewport), jump.index);
                        if let Some(p) = self.placements.get(jump.index) {
                            let item = ItemPosition::new(p.at.start, p.at.end);
                            position = jump_position(item, position, viewport, jump.align);
                        }
                        jumped = true;
                    } else {
                        tracing::debug!(index = jump.index, "jump target out of range");
                    }
                }
                for _ in 0..SETTLE_PASSES {
                    self.fill_until(cx, &sizes, Some(viewport), position + viewport);
                    if jumped {
                        let limit = (self.content_extent(count) - viewport).max(0.0);
                        position = position.clamp(0.0, limit);
                    }
                    let Some((first, last)) = self.visible(position, position + viewport) else {
                        active = 0..0;
                        break;
                    };
                    let end = (last + 1 + cached).min(count);
                    self.fill_to(cx, &sizes, Some(viewport), end);
                    active = first.saturating_sub(cached)..end.min(self.placements.len());

                    let before = self.placements.get(first).map_or(0.0, |p| p.at.start);
                    if !self.measure_estimated(cx, &sizes, Some(viewport), active.clone()) {
                        break;
                    }
                    position += self.placements.get(first).map_or(0.0, |p| p.at.start) - before;
                }
            }
        }
        self.offset = -position;
        self.active = active;
        sync_active(cx, &mut self.range, &mut self.swept, self.active.clone());

        let content_extent = self.content_extent(count);
        self.metrics = ScrollMetrics {
            axis,
            current_offset: self.offset,
            content_extent,
            viewport_length: viewport.unwrap_or(content_extent),
            start_index: self.active.start,
            end_index: self.active.end,
            fully_measured: self.placements.len() >= count
                && self.placements.iter().all(|p| p.measured),
        };
        let cross_size = cross.unwrap_or_else(|| track_total(&sizes, lane_gap));
        let desired = inflate(axis.size(content_extent, cross_size), padding);
        let frame = constraint.resolve(desired);
        self.metrics.viewport_length = (axis.main(frame) - axis.main_insets(padding)).max(0.0);
        desired
    }

    fn layout(&mut self, cx: &mut LayoutCx<'_>) {
        let axis = self.axis;
        for index in self.active.clone() {
            let Some(p) = self.placements.get(index).copied() else {
                continue;
            };
            let cross = self.lane_offsets.get(p.at.lane).copied().unwrap_or(0.0);
            cx.place_child(p.id, axis.point(p.at.start + self.offset, cross));
        }
    }

    fn clips_children(&self) -> bool {
        true
    }

    fn scroll_metrics(&self) -> Option<ScrollMetrics> {
        Some(self.metrics)
    }

    fn set_scroll_offset(&mut self, offset: f64) -> bool {
        if !offset.is_finite() || offset == self.offset {
            return false;
        }
        self.offset = offset;
        true
    }

    fn jump_to_index(&mut self, request: JumpRequest) -> bool {
        self.pending_jump = Some(request);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::WaterFlow;
    use crate::algorithm::{Algorithm, Leaf};
    use crate::tree::LayoutTree;
    use crate::types::{Dimension, NodeId, NodeStyle};
    use arbor_virtual::ScrollAlign;
    use kurbo::{Point, Size};

    fn fill() -> NodeStyle {
        NodeStyle {
            width: Dimension::MatchParent,
            height: Dimension::MatchParent,
            ..NodeStyle::default()
        }
    }

    fn flow(tree: &mut LayoutTree, heights: &[f64]) -> (NodeId, Vec<NodeId>) {
        let root = tree.insert(None, fill(), WaterFlow::new().with_columns_template("1fr 1fr"));
        let items = heights
            .iter()
            .map(|h| tree.insert(Some(root), NodeStyle::default(), Leaf::new(Size::new(10.0, *h))))
            .collect();
        (root, items)
    }

    fn lanes(tree: &LayoutTree, root: NodeId) -> Vec<usize> {
        match tree.algorithm(root) {
            Some(Algorithm::WaterFlow(flow)) => flow.lane_assignments(),
            _ => Vec::new(),
        }
    }

    #[test]
    fn items_go_to_the_shortest_lane() {
        let mut tree = LayoutTree::new();
        let (root, items) = flow(&mut tree, &[10.0, 20.0, 5.0]);
        tree.flush(Size::new(100.0, 100.0));

        assert_eq!(lanes(&tree, root), [0, 1, 0]);
        let offset = |id: NodeId| tree.geometry(id).unwrap().frame_offset;
        assert_eq!(offset(items[0]), Point::new(0.0, 0.0));
        assert_eq!(offset(items[1]), Point::new(50.0, 0.0));
        assert_eq!(offset(items[2]), Point::new(0.0, 10.0));
    }

    #[test]
    fn resizing_an_item_replays_later_placements() {
        let mut tree = LayoutTree::new();
        let (root, items) = flow(&mut tree, &[10.0, 20.0, 5.0]);
        tree.flush(Size::new(100.0, 100.0));
        tree.set_leaf_content(items[0], Size::new(10.0, 30.0));
        tree.flush(Size::new(100.0, 100.0));

        assert_eq!(lanes(&tree, root), [0, 1, 1]);
        assert_eq!(tree.geometry(items[2]).unwrap().frame_offset, Point::new(50.0, 20.0));
    }

    #[test]
    fn only_items_near_the_viewport_are_placed_and_active() {
        let mut tree = LayoutTree::new();
        let (root, items) = flow(&mut tree, &[30.0; 100]);
        tree.flush(Size::new(100.0, 100.0));

        assert!(tree.is_active(items[8]));
        assert!(!tree.is_active(items[9]));
        assert!(!tree.is_active(items[50]));
        let metrics = tree.scroll_metrics(root).unwrap();
        assert!(!metrics.fully_measured);
        assert!(metrics.content_extent > 100.0);
        assert_eq!(metrics.viewport_length, 100.0);
    }

    #[test]
    fn jump_below_the_viewport_is_bottom_flush() {
        let mut tree = LayoutTree::new();
        let (root, items) = flow(&mut tree, &[30.0; 100]);
        tree.flush(Size::new(100.0, 100.0));
        assert!(tree.scroll_to_index(root, 20, ScrollAlign::Auto));
        tree.flush(Size::new(100.0, 100.0));

        assert_eq!(tree.scroll_metrics(root).unwrap().current_offset, -230.0);
        assert!(tree.is_active(items[20]));
        assert_eq!(tree.geometry(items[20]).unwrap().frame_offset, Point::new(0.0, 70.0));
    }

    #[test]
    fn far_jump_estimates_the_items_it_skips() {
        let mut tree = LayoutTree::new();
        let (root, items) = flow(&mut tree, &vec![30.0; 20_000]);
        tree.flush(Size::new(100.0, 100.0));
        assert!(tree.scroll_to_index(root, 19_000, ScrollAlign::Start));
        let report = tree.flush(Size::new(100.0, 100.0));

        assert!(report.measured.len() < 30, "measured {} nodes", report.measured.len());
        let metrics = tree.scroll_metrics(root).unwrap();
        assert_eq!(metrics.current_offset, -285_000.0);
        assert!(!metrics.fully_measured);
        assert_eq!(tree.geometry(items[19_000]).unwrap().frame_offset, Point::new(0.0, 0.0));
        assert!(tree.is_active(items[18_999]));
        assert!(!tree.is_active(items[100]));
    }
}
