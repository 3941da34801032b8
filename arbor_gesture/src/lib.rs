// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arbor Gesture: from pointer events to scroll offsets and page turns.
//!
//! This crate sits between platform input and [`arbor_scroll`]:
//!
//! - [`PointerEvent`]: one pointer sample with id, phase, position, pressure and tool.
//! - [`PanRecognizer`]: per-pointer tracking, touch slop, and release velocity estimation.
//!   The first contact down drives the pan.
//! - [`NestedScroll`], [`NestedScrollMode`] and [`dispatch_nested`]: how a drag is shared
//!   between a scroller and the scrollers around it.
//! - [`ScrollBridge`]: runs the recognizer and feeds the pan into a chain of bound scrollers,
//!   stopping their animations when a drag starts.
//! - [`SwiperBridge`]: runs the recognizer for a swiper, so a quick swipe turns a page.
//!
//! Everything runs synchronously on the thread that owns the layout tree.
//!
//! ## Minimal example
//!
//! ```rust
//! use arbor_gesture::{
//!     NestedScrollNode, NestedScrollOptions, PanConfig, PointerEvent, PointerId, PointerKind,
//!     ScrollBridge,
//! };
//! use arbor_layout::{Axis, Dimension, LayoutTree, Leaf, List, NodeStyle};
//! use arbor_scroll::{ScrollHost, Scrollable};
//! use kurbo::{Point, Size};
//!
//! let mut tree = LayoutTree::new();
//! let fill = NodeStyle {
//!     width: Dimension::MatchParent,
//!     height: Dimension::MatchParent,
//!     ..NodeStyle::default()
//! };
//! let list = tree.insert(None, fill, List::new(Axis::Vertical));
//! for _ in 0..100 {
//!     tree.insert(Some(list), NodeStyle::default(), Leaf::new(Size::new(50.0, 20.0)));
//! }
//! tree.flush(Size::new(100.0, 100.0));
//!
//! let mut bridge = ScrollBridge::new(PanConfig::default());
//! bridge.push(NestedScrollNode::new(
//!     ScrollHost::new(list, Scrollable::new(Axis::Vertical)),
//!     NestedScrollOptions::default(),
//! ));
//! bridge.sync(&tree);
//!
//! let id = PointerId::new(1).unwrap();
//! let touch = |kind, y, t| PointerEvent::new(id, kind, Point::new(20.0, y), t);
//! bridge.handle(&touch(PointerKind::Down, 90.0, 0), &mut tree);
//! bridge.handle(&touch(PointerKind::Move, 70.0, 16), &mut tree);
//! bridge.handle(&touch(PointerKind::Move, 30.0, 32), &mut tree);
//! tree.flush(Size::new(100.0, 100.0));
//! assert_eq!(tree.scroll_metrics(list).unwrap().current_offset, -40.0);
//! ```

mod bridge;
mod nested;
mod pan;
mod pointer;
mod swiper_bridge;

pub use bridge::ScrollBridge;
pub use nested::{
    NestedScroll, NestedScrollMode, NestedScrollNode, NestedScrollOptions, dispatch_nested,
};
pub use pan::{PanConfig, PanEvent, PanRecognizer};
pub use pointer::{PointerEvent, PointerId, PointerKind, ToolType};
pub use swiper_bridge::SwiperBridge;
