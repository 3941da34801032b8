// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The measure/layout contract and the built-in algorithms.

use core::fmt;

use arbor_virtual::ScrollAlign;
use kurbo::{Point, Size};

use crate::constraint::LayoutConstraint;
use crate::cx::LayoutCx;
use crate::geometry::Axis;
use crate::geometry_node::GeometryNode;
use crate::paint::Painter;

mod flex;
mod grid;
mod lazy;
mod leaf;
mod list;
mod swiper;
mod template;
mod water_flow;

pub use flex::{CrossAlign, Flex, MainAlign};
pub use grid::Grid;
pub use leaf::Leaf;
pub use list::{List, ListDivider};
pub use swiper::{Swiper, SwiperMetrics};
pub use template::{GridTemplate, MAX_TRACKS, TemplateError, Track, TrackSizes};
pub use water_flow::WaterFlow;

/// A layout algorithm attached to one node.
///
/// [`LayoutAlgorithm::measure`] resolves the node's size and, through
/// [`LayoutCx::measure_child`], the sizes of its children. [`LayoutAlgorithm::layout`] then
/// assigns child offsets using those sizes and must not measure.
pub trait LayoutAlgorithm: fmt::Debug {
    /// Computes the node's desired frame size under `constraint`, the node's own constraint.
    ///
    /// The tree resolves the returned size against `constraint`, so an ideal size wins and the
    /// result is clamped into bounds regardless of what is returned here.
    fn measure(&mut self, cx: &mut LayoutCx<'_>, constraint: &LayoutConstraint) -> Size;

    /// Positions children inside the content box. Sizes are final at this point.
    fn layout(&mut self, cx: &mut LayoutCx<'_>);

    /// Emits node-specific primitives. `origin` is the frame origin in absolute coordinates.
    fn paint(&self, origin: Point, geometry: &GeometryNode, painter: &mut dyn Painter) {
        let _ = (origin, geometry, painter);
    }

    /// Returns `true` if children are clipped to this node's frame.
    fn clips_children(&self) -> bool {
        false
    }

    /// Scroll state, for algorithms that scroll their content.
    fn scroll_metrics(&self) -> Option<ScrollMetrics> {
        None
    }

    /// Sets the signed scroll offset. Returns `true` if the offset was accepted and changed.
    fn set_scroll_offset(&mut self, offset: f64) -> bool {
        let _ = offset;
        false
    }

    /// Requests that the next measure brings an item into view. Returns `true` if accepted.
    fn jump_to_index(&mut self, request: JumpRequest) -> bool {
        let _ = request;
        false
    }
}

/// Scroll state published by a scrolling algorithm after measure.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    /// Scroll axis.
    pub axis: Axis,
    /// Signed offset: zero at the start, negative when scrolled towards the end.
    pub current_offset: f64,
    /// Length of all content along the axis, estimated for items never measured.
    pub content_extent: f64,
    /// Length of the viewport along the axis.
    pub viewport_length: f64,
    /// First visible item.
    pub start_index: usize,
    /// One past the last visible item.
    pub end_index: usize,
    /// Returns `true` if every item has been measured, so `content_extent` is exact.
    pub fully_measured: bool,
}

impl ScrollMetrics {
    /// How far the content can scroll: content extent minus viewport, never negative.
    #[must_use]
    pub fn scrollable_distance(&self) -> f64 {
        (self.content_extent - self.viewport_length).max(0.0)
    }
}

/// A pending request to bring `index` into view with `align`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JumpRequest {
    /// Item to show.
    pub index: usize,
    /// Where to put it.
    pub align: ScrollAlign,
}

/// The algorithm a node runs, chosen when the node is created.
#[derive(Debug)]
pub enum Algorithm {
    /// Fixed content size.
    Leaf(Leaf),
    /// Row or column.
    Flex(Flex),
    /// Template-driven grid, fixed or lazily scrolled.
    Grid(Grid),
    /// Scrolling list with lanes.
    List(List),
    /// Scrolling masonry.
    WaterFlow(WaterFlow),
    /// Paged container.
    Swiper(Swiper),
    /// Anything else.
    Custom(Box<dyn LayoutAlgorithm>),
}

impl Algorithm {
    /// The algorithm as a trait object.
    pub fn as_dyn(&self) -> &dyn LayoutAlgorithm {
        match self {
            Self::Leaf(a) => a,
            Self::Flex(a) => a,
            Self::Grid(a) => a,
            Self::List(a) => a,
            Self::WaterFlow(a) => a,
            Self::Swiper(a) => a,
            Self::Custom(a) => a.as_ref(),
        }
    }

    /// The algorithm as a mutable trait object.
    pub fn as_dyn_mut(&mut self) -> &mut dyn LayoutAlgorithm {
        match self {
            Self::Leaf(a) => a,
            Self::Flex(a) => a,
            Self::Grid(a) => a,
            Self::List(a) => a,
            Self::WaterFlow(a) => a,
            Self::Swiper(a) => a,
            Self::Custom(a) => a.as_mut(),
        }
    }
}

impl Default for Algorithm {
    fn default() -> Self {
        Self::Leaf(Leaf::default())
    }
}

macro_rules! impl_from_algorithm {
    ($($ty:ident),*) => {
        $(impl From<$ty> for Algorithm {
            fn from(value: $ty) -> Self {
                Self::$ty(value)
            }
        })*
    };
}

impl_from_algorithm!(Leaf, Flex, Grid, List, WaterFlow, Swiper);

impl From<Box<dyn LayoutAlgorithm>> for Algorithm {
    fn from(value: Box<dyn LayoutAlgorithm>) -> Self {
        Self::Custom(value)
    }
}
