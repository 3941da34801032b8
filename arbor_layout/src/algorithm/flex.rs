// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Row and column layout.

use kurbo::Size;
use smallvec::SmallVec;

use super::LayoutAlgorithm;
use crate::constraint::LayoutConstraint;
use crate::cx::LayoutCx;
use crate::geometry::{Axis, inflate};
use crate::types::NodeId;

/// Distribution of free space along the main axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MainAlign {
    /// Pack children at the start.
    #[default]
    Start,
    /// Center the packed children.
    Center,
    /// Pack children at the end.
    End,
    /// First and last children flush with the edges, equal gaps between.
    SpaceBetween,
    /// Equal space around each child (half-size space at the edges).
    SpaceAround,
    /// Equal space between children and at the edges.
    SpaceEvenly,
}

impl MainAlign {
    /// Maps a binding-layer index. Unknown indices fall back to [`MainAlign::Start`].
    #[must_use]
    pub fn from_index(index: i32) -> Self {
        match index {
            0 => Self::Start,
            1 => Self::Center,
            2 => Self::End,
            3 => Self::SpaceBetween,
            4 => Self::SpaceAround,
            5 => Self::SpaceEvenly,
            _ => {
                tracing::warn!(index, "unknown main-axis alignment, using Start");
                Self::Start
            }
        }
    }
}

/// Placement of each child along the cross axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CrossAlign {
    /// Align to the cross start.
    #[default]
    Start,
    /// Center on the cross axis.
    Center,
    /// Align to the cross end.
    End,
    /// Fill the container's cross size, when it is known.
    Stretch,
}

impl CrossAlign {
    /// Maps a binding-layer index. Unknown indices fall back to [`CrossAlign::Start`].
    #[must_use]
    pub fn from_index(index: i32) -> Self {
        match index {
            0 => Self::Start,
            1 => Self::Center,
            2 => Self::End,
            3 => Self::Stretch,
            _ => {
                tracing::warn!(index, "unknown cross-axis alignment, using Start");
                Self::Start
            }
        }
    }
}

/// Lays children out in a single line along `axis`.
///
/// Children with a positive [`NodeStyle::weight`](crate::NodeStyle::weight) are measured after
/// the others and share the remaining main-axis space in proportion to their weights. Weights
/// are ignored when the main axis is unbounded.
#[derive(Clone, Debug, PartialEq)]
pub struct Flex {
    /// Main axis.
    pub axis: Axis,
    /// Fixed gap between adjacent children.
    pub space: f64,
    /// Free space distribution.
    pub main_align: MainAlign,
    /// Cross-axis placement.
    pub cross_align: CrossAlign,
}

impl Default for Flex {
    fn default() -> Self {
        Self::new(Axis::Vertical)
    }
}

impl Flex {
    /// A packed line along `axis`.
    #[must_use]
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            space: 0.0,
            main_align: MainAlign::Start,
            cross_align: CrossAlign::Start,
        }
    }

    /// Sets the gap between children.
    #[must_use]
    pub fn with_space(mut self, space: f64) -> Self {
        self.space = space.max(0.0);
        self
    }

    /// Sets main-axis distribution.
    #[must_use]
    pub fn with_main_align(mut self, align: MainAlign) -> Self {
        self.main_align = align;
        self
    }

    /// Sets cross-axis placement.
    #[must_use]
    pub fn with_cross_align(mut self, align: CrossAlign) -> Self {
        self.cross_align = align;
        self
    }

    fn total_space(&self, n: usize) -> f64 {
        self.space.max(0.0) * n.saturating_sub(1) as f64
    }
}

impl LayoutAlgorithm for Flex {
    fn measure(&mut self, cx: &mut LayoutCx<'_>, constraint: &LayoutConstraint) -> Size {
        let axis = self.axis;
        let padding = cx.padding();
        let content = constraint.deflate(padding).loosened();
        let base = match (
            self.cross_align,
            content.self_ideal_size.main(axis.cross()),
        ) {
            (CrossAlign::Stretch, Some(cross)) => content.tight_on(axis.cross(), cross),
            _ => content,
        };
        let main_limit = content.main_limit(axis);
        let children = cx.children();

        let mut used = 0.0;
        let mut cross = 0.0_f64;
        let mut total_weight = 0.0;
        let mut weighted: SmallVec<[(NodeId, f64); 4]> = SmallVec::new();
        for child in &children {
            let weight = cx.child_style(*child).weight;
            if main_limit.is_some() && weight.is_finite() && weight > 0.0 {
                weighted.push((*child, weight));
                total_weight += weight;
                continue;
            }
            let size = cx.measure_child(*child, &base);
            used += axis.main(size);
            cross = cross.max(axis.cross_of(size));
        }

        let spaces = self.total_space(children.len());
        if let Some(limit) = main_limit
            && !weighted.is_empty()
        {
            let remaining = (limit - used - spaces).max(0.0);
            for (child, weight) in weighted {
                let share = remaining * weight / total_weight;
                let size = cx.measure_child(child, &base.tight_on(axis, share));
                used += axis.main(size);
                cross = cross.max(axis.cross_of(size));
            }
        }

        inflate(axis.size(used + spaces, cross), padding)
    }

    fn layout(&mut self, cx: &mut LayoutCx<'_>) {
        let axis = self.axis;
        let content = cx.content_size();
        let children = cx.children();
        let n = children.len();
        let sizes: SmallVec<[Size; 8]> = children.iter().map(|c| cx.child_size(*c)).collect();
        let used = sizes.iter().map(|s| axis.main(*s)).sum::<f64>() + self.total_space(n);
        let free = axis.main(content) - used;

        let space = self.space.max(0.0);
        let (leading, between) = match self.main_align {
            MainAlign::Start => (0.0, space),
            MainAlign::Center => (free / 2.0, space),
            MainAlign::End => (free, space),
            MainAlign::SpaceBetween if n > 1 => (0.0, space + free.max(0.0) / (n - 1) as f64),
            MainAlign::SpaceAround if n > 0 => {
                let extra = free.max(0.0) / n as f64;
                (extra / 2.0, space + extra)
            }
            MainAlign::SpaceEvenly if n > 0 => {
                let extra = free.max(0.0) / (n + 1) as f64;
                (extra, space + extra)
            }
            _ => (0.0, space),
        };

        let content_cross = axis.cross_of(content);
        let mut main = leading;
        for (child, size) in children.into_iter().zip(sizes) {
            let child_cross = axis.cross_of(size);
            let cross = match self.cross_align {
                CrossAlign::Start | CrossAlign::Stretch => 0.0,
                CrossAlign::Center => (content_cross - child_cross) / 2.0,
                CrossAlign::End => content_cross - child_cross,
            };
            cx.place_child(child, axis.point(main, cross));
            main += axis.main(size) + between;
        }
    }
}
