// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Feeding recognized pans into a chain of nested scrollers.

use arbor_layout::{Axis, LayoutTree};
use smallvec::SmallVec;

use crate::nested::{NestedScroll, NestedScrollNode, dispatch_nested};
use crate::pan::{PanConfig, PanEvent, PanRecognizer};
use crate::pointer::PointerEvent;

/// Routes pointer input of one gesture area to the scrollers under it.
///
/// Links are pushed innermost first. The pan runs along the innermost scroller's axis; links
/// on the other axis sit the gesture out. On pan start every participating scroller stops its
/// animations before any delta applies. On release the velocity goes to the innermost
/// scroller that can still move in its direction, and the others settle without it.
#[derive(Debug, Default)]
pub struct ScrollBridge {
    recognizer: PanRecognizer,
    nodes: Vec<NestedScrollNode>,
}

impl ScrollBridge {
    /// An empty bridge.
    #[must_use]
    pub fn new(config: PanConfig) -> Self {
        Self {
            recognizer: PanRecognizer::new(config),
            nodes: Vec::new(),
        }
    }

    /// Appends the next link outward.
    pub fn push(&mut self, node: NestedScrollNode) {
        self.nodes.push(node);
    }

    /// The chain, innermost first.
    #[must_use]
    pub fn nodes(&self) -> &[NestedScrollNode] {
        &self.nodes
    }

    /// The chain, for programmatic scrolling of its links.
    pub fn nodes_mut(&mut self) -> &mut [NestedScrollNode] {
        &mut self.nodes
    }

    /// The pan recognizer.
    #[must_use]
    pub fn recognizer(&self) -> &PanRecognizer {
        &self.recognizer
    }

    /// Axis the pan runs along, if any scroller is linked.
    #[must_use]
    pub fn axis(&self) -> Option<Axis> {
        self.nodes.first().map(NestedScroll::axis)
    }

    /// Reads metrics after a flush into every link.
    pub fn sync(&mut self, tree: &LayoutTree) {
        for node in &mut self.nodes {
            node.host.sync(tree);
        }
    }

    /// Pushes every link's offset into the tree. Returns `true` if any node will re-measure.
    pub fn apply(&self, tree: &mut LayoutTree) -> bool {
        self.nodes
            .iter()
            .fold(false, |changed, node| node.host.apply(tree) | changed)
    }

    /// Advances every link's animations. Returns `true` if any node will re-measure.
    pub fn tick(&mut self, tree: &mut LayoutTree, timestamp_ms: f64) -> bool {
        self.nodes
            .iter_mut()
            .fold(false, |changed, node| node.host.tick(tree, timestamp_ms) | changed)
    }

    /// Handles one pointer event. Returns `true` if any node will re-measure.
    pub fn handle(&mut self, event: &PointerEvent, tree: &mut LayoutTree) -> bool {
        let Some(pan) = self.recognizer.on_event(event) else {
            return false;
        };
        let Some(axis) = self.axis() else {
            tracing::debug!(?pan, "pan with no scroller linked");
            return false;
        };
        let mut chain: SmallVec<[&mut dyn NestedScroll; 4]> = self
            .nodes
            .iter_mut()
            .filter(|node| node.axis() == axis)
            .map(|node| node as &mut dyn NestedScroll)
            .collect();
        match pan {
            PanEvent::Start { .. } => {
                for node in &mut chain {
                    node.nested_drag_start();
                }
                return false;
            }
            PanEvent::Update { delta, .. } => {
                let delta = axis.main_of_point(delta.to_point());
                let rest = dispatch_nested(&mut chain, delta);
                if rest != 0.0 {
                    tracing::trace!(delta, rest, "drag not fully consumed");
                }
            }
            PanEvent::End { velocity } => {
                let velocity = axis.main_of_point(velocity.to_point());
                let mut handed = false;
                for node in &mut chain {
                    if !handed && node.can_scroll(velocity) {
                        handed = true;
                        node.nested_drag_end(velocity);
                    } else {
                        node.nested_drag_end(0.0);
                    }
                }
            }
            PanEvent::Cancel => {
                for node in &mut chain {
                    node.nested_drag_end(0.0);
                }
            }
        }
        drop(chain);
        self.apply(tree)
    }
}
