// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Feeding recognized pans into a swiper.

use arbor_layout::LayoutTree;
use arbor_scroll::SwiperHost;

use crate::pan::{PanConfig, PanEvent, PanRecognizer};
use crate::pointer::PointerEvent;

/// Routes pointer input of one gesture area to a swiper.
///
/// The pan runs along the swiper's paging axis as published by the last flush. Pan start
/// grabs the pages, interrupting a settle and pausing autoplay. Release hands the velocity
/// along that axis to the page-turn decision; a cancelled pan settles back without one.
#[derive(Debug)]
pub struct SwiperBridge {
    recognizer: PanRecognizer,
    host: SwiperHost,
}

impl SwiperBridge {
    /// Drives `host` from pans recognized with `config`.
    #[must_use]
    pub fn new(config: PanConfig, host: SwiperHost) -> Self {
        Self {
            recognizer: PanRecognizer::new(config),
            host,
        }
    }

    /// The bound swiper.
    #[must_use]
    pub fn host(&self) -> &SwiperHost {
        &self.host
    }

    /// The bound swiper, for programmatic paging.
    pub fn host_mut(&mut self) -> &mut SwiperHost {
        &mut self.host
    }

    /// The pan recognizer.
    #[must_use]
    pub fn recognizer(&self) -> &PanRecognizer {
        &self.recognizer
    }

    /// Reads page metrics after a flush. Returns `false` for a stale node.
    pub fn sync(&mut self, tree: &LayoutTree) -> bool {
        self.host.sync(tree)
    }

    /// Advances settling and autoplay. Returns `true` if the swiper will re-measure.
    pub fn tick(&mut self, tree: &mut LayoutTree, timestamp_ms: f64) -> bool {
        self.host.tick(tree, timestamp_ms)
    }

    /// Handles one pointer event. Returns `true` if the swiper will re-measure.
    pub fn handle(&mut self, event: &PointerEvent, tree: &mut LayoutTree) -> bool {
        let Some(pan) = self.recognizer.on_event(event) else {
            return false;
        };
        let Some(metrics) = tree.swiper_metrics(self.host.node()) else {
            tracing::debug!(node = ?self.host.node(), ?pan, "pan on a stale or non-swiper node");
            return false;
        };
        let axis = metrics.axis;
        let swiper = self.host.controller_mut();
        match pan {
            PanEvent::Start { .. } => swiper.on_drag_start(),
            PanEvent::Update { delta, .. } => {
                swiper.on_drag_update(axis.main_of_point(delta.to_point()));
            }
            PanEvent::End { velocity } => {
                swiper.on_drag_end(axis.main_of_point(velocity.to_point()));
            }
            PanEvent::Cancel => swiper.on_drag_end(0.0),
        }
        self.host.apply(tree)
    }
}
