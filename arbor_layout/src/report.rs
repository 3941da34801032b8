// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame summary returned from [`crate::LayoutTree::flush`].

use crate::types::NodeId;

/// What a frame flush did.
#[derive(Clone, Debug, Default)]
pub struct FrameReport {
    /// Frame counter the report belongs to.
    pub frame: u64,
    /// Nodes whose measure ran in full.
    pub measured: Vec<NodeId>,
    /// Nodes that reused their cached size because constraint and content were unchanged.
    pub skipped: Vec<NodeId>,
    /// Nodes whose children were positioned.
    pub laid_out: Vec<NodeId>,
    /// Nodes that must be painted again.
    pub repaint: Vec<NodeId>,
}

impl FrameReport {
    /// Returns `true` if the flush did no work.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.measured.is_empty() && self.laid_out.is_empty() && self.repaint.is_empty()
    }

    /// How many times `id` was fully measured in this frame.
    #[must_use]
    pub fn measure_count(&self, id: NodeId) -> usize {
        self.measured.iter().filter(|m| **m == id).count()
    }

    pub(crate) fn mark_repaint(&mut self, id: NodeId) {
        if !self.repaint.contains(&id) {
            self.repaint.push(id);
        }
    }
}
