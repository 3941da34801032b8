// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arbor Scroll: scroll offset physics and paging state machines for Arbor layout trees.
//!
//! Layout nodes in [`arbor_layout`] hold a scroll offset or a swiper position but never
//! change it on their own. This crate owns that state and everything that moves it:
//!
//! - [`Scrollable`]: a signed offset with validation, overscroll friction, edge callbacks,
//!   programmatic and animated scrolling, flings, spring-back, paging, and accessibility
//!   actions.
//! - [`SwiperController`]: page index and drag offset, with a velocity-and-distance release
//!   rule, settle animations, and autoplay.
//! - [`ScrollHost`] and [`SwiperHost`]: bind a controller to a tree node, pushing positions in
//!   and reading metrics back after each flush.
//! - [`adjust_offset`], [`EdgeTracker`] and [`Curve`]: the pieces above, exposed for reuse.
//!
//! Nothing here reads a clock. Animations advance when ticked with frame timestamps in
//! milliseconds, and a timestamp not later than the previous one is ignored.
//!
//! ## Offsets
//!
//! Offsets are signed: zero at the start of the content and negative when scrolled toward the
//! end, so the valid range is `[-scrollable_distance, 0]`. A drag delta is applied as is:
//! dragging content up (negative) scrolls toward the end.
//!
//! ## Minimal example
//!
//! ```rust
//! use arbor_layout::{Axis, Dimension, LayoutTree, Leaf, List, NodeStyle};
//! use arbor_scroll::{ScrollHost, Scrollable};
//! use kurbo::Size;
//!
//! let mut tree = LayoutTree::new();
//! let fill = NodeStyle {
//!     width: Dimension::MatchParent,
//!     height: Dimension::MatchParent,
//!     ..NodeStyle::default()
//! };
//! let list = tree.insert(None, fill, List::new(Axis::Vertical));
//! let rows: Vec<_> = (0..50)
//!     .map(|_| tree.insert(Some(list), NodeStyle::default(), Leaf::new(Size::new(50.0, 40.0))))
//!     .collect();
//! tree.flush(Size::new(200.0, 200.0));
//!
//! let mut host = ScrollHost::new(list, Scrollable::new(Axis::Vertical));
//! host.sync(&tree);
//!
//! // A drag past the start is resisted and springs back when released.
//! host.scrollable_mut().on_drag_start();
//! host.scrollable_mut().on_drag_update(30.0);
//! host.scrollable_mut().on_drag_update(30.0);
//! assert!(host.scrollable().current_offset() < 60.0);
//! host.scrollable_mut().on_drag_end(0.0);
//!
//! let mut frame = 0.0;
//! while host.scrollable().is_animating() {
//!     host.tick(&mut tree, frame);
//!     frame += 16.0;
//! }
//! tree.flush(Size::new(200.0, 200.0));
//! assert_eq!(tree.geometry(rows[0]).unwrap().frame_offset.y, 0.0);
//! ```

mod animation;
mod curve;
mod edge;
mod host;
mod physics;
mod scrollable;
mod swiper;

pub use curve::{Curve, ease_out};
pub use edge::{EdgeCrossing, EdgeTracker};
pub use host::{ScrollHost, SwiperHost};
pub use physics::{EdgeEffect, ScrollPhysics, adjust_offset, friction};
pub use scrollable::{AccessibilityAction, ScrollEdge, ScrollSource, ScrollState, Scrollable};
pub use swiper::{SwiperConfig, SwiperController, SwiperState};
