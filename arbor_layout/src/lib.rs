// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arbor Layout: constraint-based measure and layout over an arena node tree.
//!
//! Each node carries a [`NodeStyle`] (size policy, padding, margin, paint properties) and an
//! [`Algorithm`] that knows how to size and place the node's children. Property setters only
//! mark nodes dirty; [`LayoutTree::flush`] does the work once per frame:
//!
//! - Constraints flow top-down. A parent derives each child's [`LayoutConstraint`] from its own
//!   content box and the child's style, and sizes resolve bottom-up.
//! - A node whose constraint and content are unchanged skips measure and keeps its size.
//!   Skipping is an optimization only: forcing a full measure gives the same sizes.
//! - A node marked dirty several times is still measured at most once per frame.
//! - Scroll offsets, jumps, and swiper positions are *layout boundaries*: they re-measure the
//!   scrolling node alone unless its own size changes.
//! - Color-only style changes skip layout entirely and only request a repaint.
//!
//! ## Where this fits
//!
//! - [`arbor_virtual`] holds the position bookkeeping that the lazy containers here build on.
//! - This crate resolves sizes and offsets and emits [`PaintPrimitive`]s.
//! - Scroll physics and paging state machines live upstream and drive this tree through
//!   [`LayoutTree::set_scroll_offset`], [`LayoutTree::scroll_to_index`] and
//!   [`LayoutTree::set_swiper_position`], reading back [`ScrollMetrics`] and [`SwiperMetrics`].
//!
//! ## Algorithms
//!
//! - [`Leaf`]: fixed intrinsic content, such as pre-measured text.
//! - [`Flex`]: rows and columns with main-axis distribution, cross alignment, and weights.
//! - [`Grid`]: fixed grids, or lazily scrolling ones when only one template is set.
//! - [`List`]: a virtualized list with lanes, group headers, and dividers.
//! - [`WaterFlow`]: masonry packing into the shortest lane.
//! - [`Swiper`]: pages, one or more per viewport, optionally looping.
//! - Anything else implements [`LayoutAlgorithm`] and plugs in as [`Algorithm::Custom`].
//!
//! Every algorithm is written against a main and a cross [`Axis`] and serves both
//! orientations.
//!
//! ## Minimal example
//!
//! ```rust
//! use arbor_layout::{Axis, LayoutTree, Leaf, List, NodeStyle, Dimension};
//! use kurbo::Size;
//!
//! let mut tree = LayoutTree::new();
//! let fill = NodeStyle {
//!     width: Dimension::MatchParent,
//!     height: Dimension::MatchParent,
//!     ..NodeStyle::default()
//! };
//! let list = tree.insert(None, fill, List::new(Axis::Vertical));
//! let rows: Vec<_> = (0..1000)
//!     .map(|_| tree.insert(Some(list), NodeStyle::default(), Leaf::new(Size::new(50.0, 40.0))))
//!     .collect();
//!
//! let report = tree.flush(Size::new(320.0, 200.0));
//! // Only the rows around the viewport were measured.
//! assert!(report.measured.len() < 10);
//! assert!(tree.is_active(rows[4]));
//! assert!(!tree.is_active(rows[500]));
//!
//! tree.set_scroll_offset(list, -400.0);
//! tree.flush(Size::new(320.0, 200.0));
//! assert_eq!(tree.geometry(rows[10]).unwrap().frame_offset.y, 0.0);
//! ```

mod algorithm;
mod constraint;
mod cx;
mod geometry;
mod geometry_node;
mod paint;
mod report;
mod tree;
mod types;

pub use arbor_virtual::ScrollAlign;

pub use algorithm::{
    Algorithm, CrossAlign, Flex, Grid, GridTemplate, JumpRequest, LayoutAlgorithm, Leaf, List,
    ListDivider, MAX_TRACKS, MainAlign, ScrollMetrics, Swiper, SwiperMetrics, TemplateError, Track,
    TrackSizes, WaterFlow,
};
pub use constraint::LayoutConstraint;
pub use cx::LayoutCx;
pub use geometry::{Axis, OptionalSize};
pub use geometry_node::GeometryNode;
pub use paint::{PaintPrimitive, Painter};
pub use report::FrameReport;
pub use tree::LayoutTree;
pub use types::{Dimension, DirtyFlags, ItemRole, NodeFlags, NodeId, NodeStyle};

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Size};

    /// Measures its only child under a fixed constraint.
    #[derive(Debug)]
    struct Constrained(LayoutConstraint);

    impl LayoutAlgorithm for Constrained {
        fn measure(&mut self, cx: &mut LayoutCx<'_>, _: &LayoutConstraint) -> Size {
            if let Some(child) = cx.child_at(0) {
                cx.measure_child(child, &self.0);
            }
            Size::ZERO
        }

        fn layout(&mut self, cx: &mut LayoutCx<'_>) {
            if let Some(child) = cx.child_at(0) {
                cx.place_child(child, Point::ZERO);
            }
        }
    }

    fn constrained(constraint: LayoutConstraint) -> Box<dyn LayoutAlgorithm> {
        Box::new(Constrained(constraint))
    }

    fn algorithms() -> Vec<Algorithm> {
        vec![
            Leaf::new(Size::new(500.0, 500.0)).into(),
            Flex::new(Axis::Horizontal).into(),
            Flex::new(Axis::Vertical).with_space(7.0).into(),
            Grid::new()
                .with_columns_template("1fr 60px")
                .with_rows_template("1fr")
                .into(),
            Grid::new().with_columns_template("1fr 1fr").into(),
            List::new(Axis::Vertical).with_lanes(2, 4.0).into(),
            List::new(Axis::Horizontal).into(),
            WaterFlow::new().with_columns_template("1fr 1fr").into(),
            Swiper::new(Axis::Horizontal).with_display(2, 5.0).into(),
        ]
    }

    fn constraints() -> Vec<LayoutConstraint> {
        let inf = f64::INFINITY;
        vec![
            LayoutConstraint::loose(Size::new(100.0, 80.0)),
            LayoutConstraint::new(Size::new(150.0, 120.0), Size::new(200.0, 300.0)),
            LayoutConstraint::tight(Size::new(50.0, 50.0)),
            LayoutConstraint::new(Size::new(10.0, 10.0), Size::new(inf, inf)),
            LayoutConstraint::new(Size::new(0.0, 900.0), Size::new(40.0, inf)),
        ]
    }

    #[test]
    fn every_algorithm_resolves_within_its_constraint() {
        for constraint in constraints() {
            for algorithm in algorithms() {
                let label = format!("{algorithm:?} under {constraint:?}");
                let mut tree = LayoutTree::new();
                let root = tree.insert(None, NodeStyle::default(), constrained(constraint));
                let node = tree.insert(Some(root), NodeStyle::default(), algorithm);
                for extent in [30.0, 500.0, 45.0] {
                    tree.insert(Some(node), NodeStyle::default(), Leaf::new(Size::new(extent, extent)));
                }
                tree.flush(Size::new(1000.0, 1000.0));

                let size = tree.geometry(node).unwrap().frame_size;
                assert!(size.width >= constraint.min_size.width, "{label}: {size:?}");
                assert!(size.height >= constraint.min_size.height, "{label}: {size:?}");
                assert!(size.width <= constraint.max_size.width, "{label}: {size:?}");
                assert!(size.height <= constraint.max_size.height, "{label}: {size:?}");
                assert!(size.width.is_finite() && size.height.is_finite(), "{label}: {size:?}");
            }
        }
    }

    #[test]
    fn vertical_and_horizontal_flex_mirror_each_other() {
        let mut tree = LayoutTree::new();
        let row = tree.insert(None, NodeStyle::default(), Flex::new(Axis::Horizontal).with_space(4.0));
        let column = tree.insert(None, NodeStyle::default(), Flex::new(Axis::Vertical).with_space(4.0));
        let mut last = (None, None);
        for extent in [10.0, 20.0] {
            let a = tree.insert(Some(row), NodeStyle::default(), Leaf::new(Size::new(extent, 5.0)));
            let b = tree.insert(Some(column), NodeStyle::default(), Leaf::new(Size::new(5.0, extent)));
            last = (Some(a), Some(b));
        }
        tree.flush(Size::new(100.0, 100.0));

        assert_eq!(tree.geometry(row).unwrap().frame_size, Size::new(34.0, 5.0));
        assert_eq!(tree.geometry(column).unwrap().frame_size, Size::new(5.0, 34.0));
        let (a, b) = last;
        assert_eq!(tree.geometry(a.unwrap()).unwrap().frame_offset, Point::new(14.0, 0.0));
        assert_eq!(tree.geometry(b.unwrap()).unwrap().frame_offset, Point::new(0.0, 14.0));
    }
}
