// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arbor Virtual: position bookkeeping for lazily laid out containers.
//!
//! Scrollable containers such as lists, grids, and waterfall flows only materialize the
//! items that intersect the viewport (plus a small cache on each side). To do that
//! cheaply they need to remember where items were placed, even after those items have
//! been dropped from the render tree. This crate holds that bookkeeping and the small
//! pieces of policy built on top of it:
//!
//! - [`ExtentModel`]: a dense 1D strip of items with offsets and extents along the main axis.
//! - [`compute_visible_strip`]: which indices intersect a window, with asymmetric cache margins.
//! - [`PositionMap`]: an incrementally filled map from index to [`ItemPosition`], with uniform
//!   spacing between items. It implements [`ExtentModel`].
//! - [`LaneSet`]: greedy shortest-lane packing used by masonry ("waterfall") layouts.
//! - [`ItemRange`]: the set of currently materialized indices and the [`RangeDiff`] between
//!   two frames, which drives activation and removal of children.
//! - [`ScrollAlign`] and [`jump_position`]: where to scroll so an item becomes visible.
//! - [`divider_lines`]: divider placement between adjacent items.
//!
//! All positions here are *scroll positions*: non-negative distances from the start of the
//! content along the main axis. Scroll controllers that use a signed offset (zero at the
//! start, negative when scrolled) convert at their boundary.
//!
//! ## Minimal example
//!
//! ```rust
//! use arbor_virtual::{PositionMap, ScrollAlign, compute_visible_strip, jump_position};
//!
//! // Three measured rows, 10 units apart.
//! let mut map = PositionMap::new(10.0);
//! map.push(40.0);
//! map.push(40.0);
//! map.push(40.0);
//! assert_eq!(map.content_end(), 140.0);
//!
//! // A 60 unit viewport at the top sees the first two rows.
//! let strip = compute_visible_strip(&mut map, 0.0, 60.0, 0.0, 0.0);
//! assert_eq!((strip.start, strip.end), (0, 2));
//!
//! // Row 2 sits below the viewport, so an automatic jump makes its end flush.
//! let row = map.position(2).unwrap();
//! assert_eq!(jump_position(row, 0.0, 60.0, ScrollAlign::Auto), 80.0);
//! ```

mod divider;
mod item_range;
mod jump;
mod lanes;
mod model;
mod position_map;

pub use divider::{DividerLine, divider_lines};
pub use item_range::{ItemRange, RangeDiff};
pub use jump::{ScrollAlign, jump_position};
pub use lanes::{LanePlacement, LaneSet};
pub use model::{ExtentModel, VisibleStrip, compute_visible_strip};
pub use position_map::{ItemPosition, PositionMap};

/// Tolerance used for float comparisons on layout values.
pub const NEAR_ZERO: f64 = 1e-6;

/// Returns `true` if `value` is within [`NEAR_ZERO`] of zero.
#[inline]
#[must_use]
pub fn near_zero(value: f64) -> bool {
    value.abs() < NEAR_ZERO
}
