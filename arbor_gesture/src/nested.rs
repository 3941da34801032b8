// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arbitration of a drag between nested scrollers on the same axis.

use arbor_layout::Axis;
use arbor_scroll::{EdgeEffect, ScrollHost, ScrollSource, Scrollable};

/// How a scroller shares a drag with its ancestors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NestedScrollMode {
    /// Only this scroller moves; ancestors never see the drag.
    #[default]
    SelfOnly,
    /// This scroller moves until it hits its edge, then ancestors take the rest.
    SelfFirst,
    /// Ancestors move until they hit their edges, then this scroller takes the rest.
    ParentFirst,
    /// This scroller and its ancestors all move by the full delta.
    Parallel,
}

impl NestedScrollMode {
    /// Maps a binding-layer index. Unknown indices fall back to [`NestedScrollMode::SelfOnly`].
    #[must_use]
    pub fn from_index(index: i32) -> Self {
        match index {
            0 => Self::SelfOnly,
            1 => Self::SelfFirst,
            2 => Self::ParentFirst,
            3 => Self::Parallel,
            _ => {
                tracing::warn!(index, "unknown nested scroll mode, using SelfOnly");
                Self::SelfOnly
            }
        }
    }
}

/// Nested scroll modes per drag direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NestedScrollOptions {
    /// Mode for deltas toward the end of the content (negative offset deltas).
    pub forward: NestedScrollMode,
    /// Mode for deltas toward the start of the content.
    pub backward: NestedScrollMode,
}

impl NestedScrollOptions {
    /// The same mode in both directions.
    #[must_use]
    pub fn uniform(mode: NestedScrollMode) -> Self {
        Self {
            forward: mode,
            backward: mode,
        }
    }

    /// Mode that applies to `delta`.
    #[must_use]
    pub fn mode_for(&self, delta: f64) -> NestedScrollMode {
        if delta < 0.0 {
            self.forward
        } else {
            self.backward
        }
    }
}

/// A scroller that can take part in nested scrolling.
pub trait NestedScroll {
    /// Scroll axis.
    fn axis(&self) -> Axis;

    /// How this scroller shares drags with its ancestors.
    fn nested_options(&self) -> NestedScrollOptions {
        NestedScrollOptions::default()
    }

    /// Applies as much of `delta` as this scroller can take and returns the rest.
    ///
    /// With `allow_overscroll` the scroller may also take the part past its boundary.
    fn consume(&mut self, delta: f64, allow_overscroll: bool) -> f64;

    /// Returns `true` if `delta` would move this scroller without overscrolling.
    fn can_scroll(&self, delta: f64) -> bool;

    /// A drag that may reach this scroller started.
    fn nested_drag_start(&mut self);

    /// The drag ended with `velocity` handed to this scroller (zero if another took it).
    fn nested_drag_end(&mut self, velocity: f64);
}

impl NestedScroll for Scrollable {
    fn axis(&self) -> Axis {
        Self::axis(self)
    }

    fn consume(&mut self, delta: f64, allow_overscroll: bool) -> f64 {
        if delta == 0.0 || !delta.is_finite() {
            return 0.0;
        }
        if !self.is_scroll_enabled() {
            return delta;
        }
        if allow_overscroll && self.edge_effect() == EdgeEffect::Spring {
            self.update_offset(delta, ScrollSource::Drag);
            return 0.0;
        }
        let room = self.available_delta(delta);
        self.update_offset(room, ScrollSource::Drag);
        delta - room
    }

    fn can_scroll(&self, delta: f64) -> bool {
        self.is_scroll_enabled() && self.available_delta(delta) != 0.0
    }

    fn nested_drag_start(&mut self) {
        self.on_drag_start();
    }

    fn nested_drag_end(&mut self, velocity: f64) {
        self.on_drag_end(velocity);
    }
}

/// A bound scroller with its nested scroll modes, one link of a [`crate::ScrollBridge`] chain.
#[derive(Debug)]
pub struct NestedScrollNode {
    /// The scroller and its layout node.
    pub host: ScrollHost,
    /// How it shares drags with the next link outward.
    pub options: NestedScrollOptions,
}

impl NestedScrollNode {
    /// Pairs `host` with `options`.
    #[must_use]
    pub fn new(host: ScrollHost, options: NestedScrollOptions) -> Self {
        Self { host, options }
    }
}

impl NestedScroll for NestedScrollNode {
    fn axis(&self) -> Axis {
        self.host.scrollable().axis()
    }

    fn nested_options(&self) -> NestedScrollOptions {
        self.options
    }

    fn consume(&mut self, delta: f64, allow_overscroll: bool) -> f64 {
        self.host.scrollable_mut().consume(delta, allow_overscroll)
    }

    fn can_scroll(&self, delta: f64) -> bool {
        self.host.scrollable().can_scroll(delta)
    }

    fn nested_drag_start(&mut self) {
        self.host.scrollable_mut().nested_drag_start();
    }

    fn nested_drag_end(&mut self, velocity: f64) {
        self.host.scrollable_mut().nested_drag_end(velocity);
    }
}

/// Distributes a drag `delta` along `chain`, innermost scroller first.
///
/// Each link's mode for the direction of `delta` decides whether it or its ancestors move
/// first. Only the innermost scroller may take the part of the delta past its boundary, so
/// an overscroll bounce always happens where the drag started. Returns the part nobody took.
pub fn dispatch_nested(chain: &mut [&mut dyn NestedScroll], delta: f64) -> f64 {
    dispatch(chain, delta, true)
}

fn dispatch(chain: &mut [&mut dyn NestedScroll], delta: f64, overscroll: bool) -> f64 {
    if delta == 0.0 || !delta.is_finite() {
        return 0.0;
    }
    let Some((node, parents)) = chain.split_first_mut() else {
        return delta;
    };
    match node.nested_options().mode_for(delta) {
        NestedScrollMode::SelfOnly => node.consume(delta, overscroll),
        NestedScrollMode::SelfFirst => {
            let rest = node.consume(delta, false);
            let rest = dispatch(parents, rest, false);
            node.consume(rest, overscroll)
        }
        NestedScrollMode::ParentFirst => {
            let rest = dispatch(parents, delta, false);
            node.consume(rest, overscroll)
        }
        NestedScrollMode::Parallel => {
            let own = node.consume(delta, overscroll);
            let theirs = dispatch(parents, delta, false);
            if own.abs() < theirs.abs() { own } else { theirs }
        }
    }
}
