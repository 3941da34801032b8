// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scrolling list with optional lanes and dividers.

use kurbo::{Line, Point, Size};
use smallvec::smallvec;

use super::lazy::{LazyRows, RowSpec, plan_rows};
use super::template::{TrackSizes, track_offsets};
use super::{JumpRequest, LayoutAlgorithm, ScrollMetrics};
use crate::constraint::LayoutConstraint;
use crate::cx::LayoutCx;
use crate::geometry::{Axis, inflate};
use crate::geometry_node::GeometryNode;
use crate::paint::{PaintPrimitive, Painter};

/// Divider drawn between adjacent list rows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ListDivider {
    /// Stroke width. Zero or negative draws nothing.
    pub stroke_width: f64,
    /// Color as `0xAARRGGBB`.
    pub color: u32,
    /// Inset from the cross start.
    pub start_margin: f64,
    /// Inset from the cross end.
    pub end_margin: f64,
}

/// A virtualized list.
///
/// Items flow along `axis`, `lanes` to a row. Items whose
/// [`ItemRole`](crate::ItemRole) is a header or footer take a row of their own and span all
/// lanes. Only rows intersecting the viewport, plus `cached_count` rows on each side, are
/// active.
#[derive(Debug)]
pub struct List {
    /// Scroll axis.
    pub axis: Axis,
    /// Main-axis gap between rows.
    pub space: f64,
    /// Items per row.
    pub lanes: usize,
    /// Cross-axis gap between lanes.
    pub lane_gap: f64,
    /// Rows kept active outside the viewport on each side.
    pub cached_count: usize,
    /// Divider between rows.
    pub divider: Option<ListDivider>,
    state: LazyRows,
    /// Divider lines relative to the frame origin, rebuilt on every layout.
    lines: Vec<Line>,
}

impl Default for List {
    fn default() -> Self {
        Self::new(Axis::Vertical)
    }
}

impl List {
    /// An empty single-lane list scrolling along `axis`.
    #[must_use]
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            space: 0.0,
            lanes: 1,
            lane_gap: 0.0,
            cached_count: 1,
            divider: None,
            state: LazyRows::default(),
            lines: Vec::new(),
        }
    }

    /// Sets the gap between rows.
    #[must_use]
    pub fn with_space(mut self, space: f64) -> Self {
        self.space = space.max(0.0);
        self
    }

    /// Sets the number of lanes and the gap between them.
    #[must_use]
    pub fn with_lanes(mut self, lanes: usize, lane_gap: f64) -> Self {
        self.lanes = lanes.max(1);
        self.lane_gap = lane_gap.max(0.0);
        self
    }

    /// Sets how many rows stay active beyond each viewport edge.
    #[must_use]
    pub fn with_cached_count(mut self, cached_count: usize) -> Self {
        self.cached_count = cached_count;
        self
    }

    /// Sets the divider.
    #[must_use]
    pub fn with_divider(mut self, divider: ListDivider) -> Self {
        self.divider = Some(divider);
        self
    }

    /// Current divider lines, relative to the frame origin.
    #[must_use]
    pub fn divider_lines(&self) -> &[Line] {
        &self.lines
    }
}

impl LayoutAlgorithm for List {
    fn measure(&mut self, cx: &mut LayoutCx<'_>, constraint: &LayoutConstraint) -> Size {
        let axis = self.axis;
        let padding = cx.padding();
        let content = constraint.deflate(padding);
        let cross = content.main_limit(axis.cross());
        let lanes = self.lanes.max(1);
        let lane_gap = self.lane_gap.max(0.0);
        let lane_size = cross.map_or(f64::INFINITY, |c| {
            ((c - lane_gap * (lanes - 1) as f64) / lanes as f64).max(0.0)
        });
        let sizes: TrackSizes = smallvec![lane_size; lanes];
        let offsets = if lane_size.is_finite() {
            track_offsets(&sizes, lane_gap)
        } else {
            smallvec![0.0; lanes]
        };

        let children = cx.children();
        let (rows, full_span) = plan_rows(
            children
                .iter()
                .map(|c| cx.child_style(*c).role.is_full_span()),
            lanes,
        );
        let viewport = content.main_limit(axis);
        let spec = RowSpec {
            axis,
            lanes: &sizes,
            lane_offsets: &offsets,
            cross_extent: cross.unwrap_or(f64::INFINITY),
            main_gap: self.space.max(0.0),
            cached_count: self.cached_count,
            viewport,
            rows,
            full_span,
        };
        let metrics = self.state.measure(cx, &spec);

        let cross_size = cross.unwrap_or_else(|| self.state.measured_cross());
        let desired = inflate(axis.size(metrics.content_extent, cross_size), padding);
        let frame = constraint.resolve(desired);
        self.state
            .set_viewport_length((axis.main(frame) - axis.main_insets(padding)).max(0.0));
        desired
    }

    fn layout(&mut self, cx: &mut LayoutCx<'_>) {
        let axis = self.axis;
        self.state.layout(cx, axis);

        self.lines.clear();
        let Some(divider) = self.divider else {
            return;
        };
        let content = cx.content_size();
        let padding = cx.padding();
        let origin = Point::new(padding.x0, padding.y0);
        let cross = axis.cross_of(content);
        let offset = self.state.offset();
        for line in self.state.dividers(divider.stroke_width) {
            let main = line.main + offset;
            let start = divider.start_margin.max(0.0);
            let end = (cross - divider.end_margin.max(0.0)).max(start);
            self.lines.push(Line::new(
                origin + axis.point(main, start).to_vec2(),
                origin + axis.point(main, end).to_vec2(),
            ));
        }
    }

    fn paint(&self, origin: Point, _geometry: &GeometryNode, painter: &mut dyn Painter) {
        let Some(divider) = self.divider else {
            return;
        };
        for line in &self.lines {
            painter.draw(PaintPrimitive::Line {
                line: Line::new(origin + line.p0.to_vec2(), origin + line.p1.to_vec2()),
                stroke_width: divider.stroke_width,
                color: divider.color,
            });
        }
    }

    fn clips_children(&self) -> bool {
        true
    }

    fn scroll_metrics(&self) -> Option<ScrollMetrics> {
        Some(self.state.metrics())
    }

    fn set_scroll_offset(&mut self, offset: f64) -> bool {
        self.state.set_offset(offset)
    }

    fn jump_to_index(&mut self, request: JumpRequest) -> bool {
        self.state.request_jump(request)
    }
}

#[cfg(test)]
mod tests {
    use super::{List, ListDivider};
    use crate::algorithm::{Flex, Leaf};
    use crate::geometry::Axis;
    use crate::paint::PaintPrimitive;
    use crate::tree::LayoutTree;
    use crate::types::{Dimension, ItemRole, NodeId, NodeStyle};
    use arbor_virtual::ScrollAlign;
    use kurbo::{Line, Point, Size};

    const VIEWPORT: Size = Size::new(100.0, 100.0);

    fn fill() -> NodeStyle {
        NodeStyle {
            width: Dimension::MatchParent,
            height: Dimension::MatchParent,
            ..NodeStyle::default()
        }
    }

    /// A column holding a list of `count` rows, each 20 high.
    fn list_in_column(list: List, count: usize) -> (LayoutTree, NodeId, NodeId, Vec<NodeId>) {
        let mut tree = LayoutTree::new();
        let root = tree.insert(None, fill(), Flex::new(Axis::Vertical));
        let list = tree.insert(Some(root), fill(), list);
        let items = (0..count)
            .map(|_| tree.insert(Some(list), NodeStyle::default(), Leaf::new(Size::new(10.0, 20.0))))
            .collect();
        (tree, root, list, items)
    }

    fn main_of(tree: &LayoutTree, id: NodeId) -> f64 {
        tree.geometry(id).unwrap().frame_offset.y
    }

    #[test]
    fn only_rows_near_the_viewport_are_active() {
        let (mut tree, _root, list, items) = list_in_column(List::new(Axis::Vertical), 100);
        let report = tree.flush(VIEWPORT);
        assert!(report.measured.len() < 20);
        assert!(tree.is_active(items[5]));
        assert!(!tree.is_active(items[6]));
        assert!(!tree.is_active(items[50]));

        let metrics = tree.scroll_metrics(list).unwrap();
        assert_eq!(metrics.content_extent, 2000.0);
        assert_eq!(metrics.viewport_length, 100.0);
        assert_eq!(metrics.scrollable_distance(), 1900.0);
        assert_eq!((metrics.start_index, metrics.end_index), (0, 6));
        assert_eq!(tree.geometry(list).unwrap().frame_size, VIEWPORT);
    }

    #[test]
    fn scrolling_relayouts_only_the_list() {
        let (mut tree, root, list, items) = list_in_column(List::new(Axis::Vertical), 100);
        tree.flush(VIEWPORT);
        assert!(tree.set_scroll_offset(list, -200.0));
        assert!(!tree.set_scroll_offset(list, -200.0));
        let report = tree.flush(VIEWPORT);

        assert_eq!(report.measure_count(root), 0);
        assert_eq!(report.measure_count(list), 1);
        assert_eq!(main_of(&tree, items[10]), 0.0);
        assert!(tree.is_active(items[9]));
        assert!(!tree.is_active(items[8]));
        assert!(!tree.is_active(items[0]));
        assert_eq!(tree.scroll_metrics(list).unwrap().start_index, 9);
    }

    #[test]
    fn jump_to_an_item_above_is_top_flush_and_idempotent() {
        let (mut tree, _root, list, items) = list_in_column(List::new(Axis::Vertical), 100);
        tree.flush(VIEWPORT);
        tree.set_scroll_offset(list, -400.0);
        tree.flush(VIEWPORT);
        assert!(!tree.is_active(items[3]));

        assert!(tree.scroll_to_index(list, 3, ScrollAlign::Auto));
        tree.flush(VIEWPORT);
        assert_eq!(tree.scroll_metrics(list).unwrap().current_offset, -60.0);
        assert_eq!(main_of(&tree, items[3]), 0.0);

        tree.scroll_to_index(list, 3, ScrollAlign::Auto);
        tree.flush(VIEWPORT);
        assert_eq!(tree.scroll_metrics(list).unwrap().current_offset, -60.0);
        assert_eq!(main_of(&tree, items[3]), 0.0);
    }

    #[test]
    fn jump_past_the_end_is_clamped() {
        let (mut tree, _root, list, items) = list_in_column(List::new(Axis::Vertical), 10);
        tree.flush(VIEWPORT);
        tree.scroll_to_index(list, 9, ScrollAlign::Start);
        tree.flush(VIEWPORT);
        // 200 of content in a 100 viewport: the item ends flush with the bottom instead.
        assert_eq!(tree.scroll_metrics(list).unwrap().current_offset, -100.0);
        assert_eq!(main_of(&tree, items[9]), 80.0);
    }

    #[test]
    fn far_jump_estimates_the_rows_it_skips() {
        let (mut tree, _root, list, items) = list_in_column(List::new(Axis::Vertical), 20_000);
        tree.flush(VIEWPORT);
        assert!(tree.scroll_to_index(list, 19_000, ScrollAlign::Start));
        let report = tree.flush(VIEWPORT);

        assert!(report.measured.len() < 20, "measured {} nodes", report.measured.len());
        assert_eq!(main_of(&tree, items[19_000]), 0.0);
        assert!(tree.is_active(items[18_999]));
        assert!(!tree.is_active(items[10]));
        let metrics = tree.scroll_metrics(list).unwrap();
        assert_eq!(metrics.current_offset, -380_000.0);
        assert_eq!(metrics.content_extent, 400_000.0);
        assert!(!metrics.fully_measured);

        // Estimated rows are measured once they come into view.
        tree.set_scroll_offset(list, -200.0);
        let report = tree.flush(VIEWPORT);
        assert!(report.measured.len() < 20, "measured {} nodes", report.measured.len());
        assert_eq!(main_of(&tree, items[10]), 0.0);
        assert!(tree.is_active(items[9]));
    }

    #[test]
    fn measuring_estimated_rows_keeps_the_first_visible_row_in_place() {
        let mut tree = LayoutTree::new();
        let list = tree.insert(None, fill(), List::new(Axis::Vertical));
        let items: Vec<NodeId> = (0..100)
            .map(|i| {
                let height = if (50..60).contains(&i) { 40.0 } else { 20.0 };
                tree.insert(Some(list), NodeStyle::default(), Leaf::new(Size::new(10.0, height)))
            })
            .collect();
        tree.flush(VIEWPORT);
        tree.scroll_to_index(list, 80, ScrollAlign::Start);
        tree.flush(VIEWPORT);
        assert_eq!(tree.scroll_metrics(list).unwrap().current_offset, -1600.0);

        // Row 58 starts at 1160 by estimate; row 57 above it is really 40 high.
        tree.set_scroll_offset(list, -1160.0);
        tree.flush(VIEWPORT);
        assert_eq!(tree.scroll_metrics(list).unwrap().current_offset, -1180.0);
        assert_eq!(main_of(&tree, items[58]), 0.0);
        assert_eq!(main_of(&tree, items[59]), 40.0);
    }

    #[test]
    fn headers_span_all_lanes() {
        let mut tree = LayoutTree::new();
        let list = tree.insert(None, fill(), List::new(Axis::Vertical).with_lanes(2, 10.0));
        let header = NodeStyle {
            width: Dimension::MatchParent,
            role: ItemRole::Header,
            ..NodeStyle::default()
        };
        let head = tree.insert(Some(list), header, Leaf::new(Size::new(0.0, 30.0)));
        let items: Vec<NodeId> = (0..3)
            .map(|_| {
                let style = NodeStyle {
                    width: Dimension::MatchParent,
                    ..NodeStyle::default()
                };
                tree.insert(Some(list), style, Leaf::new(Size::new(0.0, 20.0)))
            })
            .collect();
        tree.flush(Size::new(110.0, 100.0));

        assert_eq!(tree.geometry(head).unwrap().frame_size, Size::new(110.0, 30.0));
        let origin = |id: NodeId| tree.geometry(id).unwrap().frame_offset;
        assert_eq!(origin(items[0]), Point::new(0.0, 30.0));
        assert_eq!(origin(items[1]), Point::new(60.0, 30.0));
        assert_eq!(origin(items[2]), Point::new(0.0, 50.0));
        assert_eq!(tree.geometry(items[1]).unwrap().frame_size.width, 50.0);
    }

    #[test]
    fn dividers_are_painted_between_rows() {
        let divider = ListDivider {
            stroke_width: 2.0,
            color: 0xFF00_0000,
            start_margin: 5.0,
            end_margin: 5.0,
        };
        let mut tree = LayoutTree::new();
        let list = tree.insert(
            None,
            fill(),
            List::new(Axis::Vertical)
                .with_space(10.0)
                .with_divider(divider),
        );
        for _ in 0..3 {
            tree.insert(Some(list), NodeStyle::default(), Leaf::new(Size::new(10.0, 20.0)));
        }
        tree.flush(VIEWPORT);

        let mut prims = Vec::new();
        tree.paint(&mut prims);
        let lines: Vec<Line> = prims
            .iter()
            .filter_map(|p| match p {
                PaintPrimitive::Line { line, .. } => Some(*line),
                _ => None,
            })
            .collect();
        assert_eq!(
            lines,
            [
                Line::new((5.0, 25.0), (95.0, 25.0)),
                Line::new((5.0, 55.0), (95.0, 55.0))
            ]
        );
        assert_eq!(prims.first(), Some(&PaintPrimitive::PushClip(kurbo::Rect::new(0.0, 0.0, 100.0, 100.0))));
        assert_eq!(prims.last(), Some(&PaintPrimitive::PopClip));
    }

    #[test]
    fn resizing_an_item_shifts_later_rows() {
        let (mut tree, _root, _list, items) = list_in_column(List::new(Axis::Vertical), 10);
        tree.flush(VIEWPORT);
        tree.set_leaf_content(items[1], Size::new(10.0, 50.0));
        tree.flush(VIEWPORT);
        assert_eq!(main_of(&tree, items[2]), 70.0);
        assert!(tree.is_active(items[4]));
        assert!(!tree.is_active(items[5]));
    }
}
