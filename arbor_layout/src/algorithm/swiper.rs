// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paged layout.

use arbor_virtual::ItemRange;
use kurbo::Size;

use super::LayoutAlgorithm;
use super::lazy::sync_active;
use crate::constraint::LayoutConstraint;
use crate::cx::LayoutCx;
use crate::geometry::{Axis, OptionalSize, inflate};

/// Paging state published after measure.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SwiperMetrics {
    /// Paging axis.
    pub axis: Axis,
    /// Page at the leading edge when the drag offset is zero.
    pub current_index: usize,
    /// Distance between the starts of two adjacent pages (page size plus item space).
    pub item_extent: f64,
    /// Number of pages.
    pub item_count: usize,
    /// Pages visible at once.
    pub display_count: usize,
    /// Whether paging wraps around.
    pub loop_enabled: bool,
}

/// Lays out pages in a row along `axis`, `display_count` of them per viewport.
///
/// The node does not animate: a controller drives `current_index` and the signed drag
/// `current_offset` through [`crate::LayoutTree::set_swiper_position`]. Page `current_index`
/// starts at `current_offset`; a positive offset reveals the previous page. Pages outside the
/// visible window plus `cached_count` on each side are inactive.
#[derive(Debug)]
pub struct Swiper {
    /// Paging axis.
    pub axis: Axis,
    /// Pages per viewport. Zero is treated as one.
    pub display_count: usize,
    /// Gap between pages.
    pub item_space: f64,
    /// Whether the first page follows the last.
    pub loop_enabled: bool,
    /// Pages kept active beyond each side of the visible window.
    pub cached_count: usize,
    current_index: usize,
    current_offset: f64,
    range: ItemRange,
    swept: bool,
    /// Relative slot of each active child, from the last measure.
    slots: Vec<(usize, isize)>,
    metrics: SwiperMetrics,
}

impl Default for Swiper {
    fn default() -> Self {
        Self::new(Axis::Horizontal)
    }
}

impl Swiper {
    /// A swiper showing one page at a time.
    #[must_use]
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            display_count: 1,
            item_space: 0.0,
            loop_enabled: false,
            cached_count: 0,
            current_index: 0,
            current_offset: 0.0,
            range: ItemRange::default(),
            swept: false,
            slots: Vec::new(),
            metrics: SwiperMetrics::default(),
        }
    }

    /// Sets the number of pages per viewport and the gap between them.
    #[must_use]
    pub fn with_display(mut self, display_count: usize, item_space: f64) -> Self {
        self.display_count = display_count.max(1);
        self.item_space = item_space.max(0.0);
        self
    }

    /// Enables or disables wrap-around.
    #[must_use]
    pub fn with_loop(mut self, loop_enabled: bool) -> Self {
        self.loop_enabled = loop_enabled;
        self
    }

    /// Sets how many pages stay active beyond the visible window.
    #[must_use]
    pub fn with_cached_count(mut self, cached_count: usize) -> Self {
        self.cached_count = cached_count;
        self
    }

    /// Current page index.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Current signed drag offset.
    #[must_use]
    pub fn current_offset(&self) -> f64 {
        self.current_offset
    }

    /// Sets the page and drag offset. Returns `true` if either changed.
    pub fn set_position(&mut self, index: usize, offset: f64) -> bool {
        let offset = if offset.is_finite() { offset } else { 0.0 };
        if index == self.current_index && offset == self.current_offset {
            return false;
        }
        self.current_index = index;
        self.current_offset = offset;
        true
    }

    /// Paging state as of the last measure.
    #[must_use]
    pub fn metrics(&self) -> SwiperMetrics {
        self.metrics
    }

    /// Resolves the child index shown in slot `rel`, relative to the current page.
    fn index_at(&self, rel: isize, count: usize) -> Option<usize> {
        let target = self.current_index as isize + rel;
        if self.loop_enabled {
            Some(target.rem_euclid(count as isize) as usize)
        } else {
            usize::try_from(target).ok().filter(|i| *i < count)
        }
    }

    /// Slots in order of preference. When few pages wrap around, a page could show in more
    /// than one slot; it takes the first one here, which favors the side being revealed.
    fn slot_order(&self) -> Vec<isize> {
        let display = self.display_count.max(1) as isize;
        let cached = self.cached_count as isize;
        let visible = 0..display;
        let after = display..display + cached + 1;
        let before = (1..=cached + 1).map(|d| -d);
        if self.current_offset > 0.0 {
            visible.chain(before).chain(after).collect()
        } else {
            visible.chain(after).chain(before).collect()
        }
    }
}

impl LayoutAlgorithm for Swiper {
    fn measure(&mut self, cx: &mut LayoutCx<'_>, constraint: &LayoutConstraint) -> Size {
        let axis = self.axis;
        let padding = cx.padding();
        let content = constraint.deflate(padding);
        let count = cx.child_count();
        let display = self.display_count.max(1);
        let space = self.item_space.max(0.0);
        if count > 0 && !self.loop_enabled && self.current_index >= count {
            self.current_index = count - 1;
        } else if count > 0 && self.loop_enabled {
            self.current_index %= count;
        }

        let cross = content.main_limit(axis.cross());
        let main = content.main_limit(axis);
        let item_main = main.map(|m| ((m - space * (display - 1) as f64) / display as f64).max(0.0));

        self.slots.clear();
        if count > 0 {
            let mut taken = vec![false; count];
            for rel in self.slot_order() {
                let Some(index) = self.index_at(rel, count) else {
                    continue;
                };
                if core::mem::replace(&mut taken[index], true) {
                    continue;
                }
                self.slots.push((index, rel));
            }
        }
        sync_active(cx, &mut self.range, &mut self.swept, self.slots.iter().map(|(i, _)| *i));

        let mut ideal = OptionalSize::NONE;
        ideal.set_main(axis, item_main);
        ideal.set_main(axis.cross(), cross);
        let page = LayoutConstraint {
            min_size: axis.size(item_main.unwrap_or(0.0), 0.0),
            max_size: axis.size(
                item_main.unwrap_or(f64::INFINITY),
                cross.unwrap_or(f64::INFINITY),
            ),
            self_ideal_size: ideal,
            parent_ideal_size: content.self_ideal_size,
            percent_reference: content.percent_reference,
        };
        let mut largest = Size::ZERO;
        for (index, _) in self.slots.clone() {
            if let Some(child) = cx.child_at(index) {
                let size = cx.measure_child(child, &page);
                largest = Size::new(largest.width.max(size.width), largest.height.max(size.height));
            }
        }

        let item_main = item_main.unwrap_or_else(|| axis.main(largest));
        self.metrics = SwiperMetrics {
            axis: self.axis,
            current_index: self.current_index,
            item_extent: item_main + space,
            item_count: count,
            display_count: display,
            loop_enabled: self.loop_enabled,
        };
        let main_size = main.unwrap_or(item_main * display as f64 + space * (display - 1) as f64);
        inflate(
            axis.size(main_size, cross.unwrap_or_else(|| axis.cross_of(largest))),
            padding,
        )
    }

    fn layout(&mut self, cx: &mut LayoutCx<'_>) {
        let axis = self.axis;
        let step = self.metrics.item_extent;
        for (index, rel) in self.slots.clone() {
            if let Some(child) = cx.child_at(index) {
                cx.place_child(child, axis.point(rel as f64 * step + self.current_offset, 0.0));
            }
        }
    }

    fn clips_children(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::Swiper;
    use crate::algorithm::Leaf;
    use crate::geometry::Axis;
    use crate::tree::LayoutTree;
    use crate::types::{Dimension, NodeId, NodeStyle};
    use kurbo::Size;

    fn pages(swiper: Swiper, count: usize) -> (LayoutTree, NodeId, Vec<NodeId>) {
        let mut tree = LayoutTree::new();
        let style = NodeStyle {
            width: Dimension::MatchParent,
            height: Dimension::MatchParent,
            ..NodeStyle::default()
        };
        let root = tree.insert(None, style, swiper);
        let items = (0..count)
            .map(|_| tree.insert(Some(root), NodeStyle::default(), Leaf::new(Size::new(5.0, 5.0))))
            .collect();
        (tree, root, items)
    }

    fn x(tree: &LayoutTree, id: NodeId) -> f64 {
        tree.geometry(id).unwrap().frame_offset.x
    }

    #[test]
    fn pages_fill_the_viewport_and_neighbors_stay_active() {
        let (mut tree, root, items) = pages(Swiper::new(Axis::Horizontal), 5);
        tree.flush(Size::new(100.0, 50.0));

        assert_eq!(tree.geometry(items[0]).unwrap().frame_size, Size::new(100.0, 5.0));
        assert_eq!(x(&tree, items[1]), 100.0);
        assert!(tree.is_active(items[1]));
        assert!(!tree.is_active(items[2]));
        assert!(!tree.is_active(items[4]));

        let metrics = tree.swiper_metrics(root).unwrap();
        assert_eq!(metrics.item_extent, 100.0);
        assert_eq!(metrics.item_count, 5);
    }

    #[test]
    fn drag_offset_moves_every_page() {
        let (mut tree, root, items) = pages(Swiper::new(Axis::Horizontal), 5);
        tree.flush(Size::new(100.0, 50.0));
        assert!(tree.set_swiper_position(root, 1, -30.0));
        assert!(!tree.set_swiper_position(root, 1, -30.0));
        tree.flush(Size::new(100.0, 50.0));

        assert_eq!(x(&tree, items[0]), -130.0);
        assert_eq!(x(&tree, items[1]), -30.0);
        assert_eq!(x(&tree, items[2]), 70.0);
        assert!(!tree.is_active(items[3]));
        assert_eq!(tree.swiper_metrics(root).unwrap().current_index, 1);
    }

    #[test]
    fn looping_shows_the_last_page_before_the_first() {
        let (mut tree, _root, items) = pages(Swiper::new(Axis::Horizontal).with_loop(true), 5);
        tree.flush(Size::new(100.0, 50.0));
        assert!(tree.is_active(items[4]));
        assert_eq!(x(&tree, items[4]), -100.0);
    }

    #[test]
    fn two_looping_pages_favor_the_revealed_side() {
        let (mut tree, root, items) = pages(Swiper::new(Axis::Horizontal).with_loop(true), 2);
        tree.set_swiper_position(root, 0, -20.0);
        tree.flush(Size::new(100.0, 50.0));
        assert_eq!(x(&tree, items[1]), 80.0);

        tree.set_swiper_position(root, 0, 20.0);
        tree.flush(Size::new(100.0, 50.0));
        assert_eq!(x(&tree, items[1]), -80.0);
    }

    #[test]
    fn several_pages_per_viewport_share_the_space() {
        let (mut tree, root, items) =
            pages(Swiper::new(Axis::Horizontal).with_display(2, 10.0), 4);
        tree.flush(Size::new(110.0, 50.0));

        assert_eq!(tree.geometry(items[0]).unwrap().frame_size.width, 50.0);
        assert_eq!(x(&tree, items[1]), 60.0);
        assert!(tree.is_active(items[2]));
        assert!(!tree.is_active(items[3]));
        assert_eq!(tree.swiper_metrics(root).unwrap().item_extent, 60.0);
    }

    #[test]
    fn out_of_range_index_is_clamped_without_loop() {
        let (mut tree, root, items) = pages(Swiper::new(Axis::Vertical), 3);
        tree.set_swiper_position(root, 9, 0.0);
        tree.flush(Size::new(50.0, 100.0));
        assert_eq!(tree.swiper_metrics(root).unwrap().current_index, 2);
        assert_eq!(tree.geometry(items[2]).unwrap().frame_offset.y, 0.0);
    }
}
