// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Greedy shortest-lane packing for masonry layouts.

use smallvec::SmallVec;

/// Where [`LaneSet::place`] put an item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LanePlacement {
    /// Lane index the item was assigned to.
    pub lane: usize,
    /// Main-axis start of the item.
    pub start: f64,
    /// Main-axis end of the item.
    pub end: f64,
}

/// Accumulated main-axis extent of each lane in a multi-lane container.
///
/// Every new item goes to the lane whose accumulated extent is currently the smallest;
/// on a tie the lowest lane index wins. Consecutive items in one lane are separated by
/// `gap`.
#[derive(Debug, Clone)]
pub struct LaneSet {
    ends: SmallVec<[f64; 4]>,
    counts: SmallVec<[usize; 4]>,
    gap: f64,
}

impl LaneSet {
    /// Creates `lanes` empty lanes. A lane count of zero is treated as one.
    #[must_use]
    pub fn new(lanes: usize, gap: f64) -> Self {
        let lanes = lanes.max(1);
        Self {
            ends: SmallVec::from_elem(0.0, lanes),
            counts: SmallVec::from_elem(0, lanes),
            gap: if gap.is_finite() { gap.max(0.0) } else { 0.0 },
        }
    }

    /// Number of lanes.
    #[must_use]
    pub fn lane_count(&self) -> usize {
        self.ends.len()
    }

    /// Main-axis gap between items of one lane.
    #[must_use]
    pub fn gap(&self) -> f64 {
        self.gap
    }

    /// Index of the lane with the smallest accumulated extent.
    #[must_use]
    pub fn shortest_lane(&self) -> usize {
        let mut best = 0;
        for (lane, end) in self.ends.iter().enumerate().skip(1) {
            if *end < self.ends[best] {
                best = lane;
            }
        }
        best
    }

    /// Accumulated extent of `lane`, or zero for an unknown lane.
    #[must_use]
    pub fn end_of(&self, lane: usize) -> f64 {
        self.ends.get(lane).copied().unwrap_or(0.0)
    }

    /// The smallest accumulated extent over all lanes.
    #[must_use]
    pub fn min_end(&self) -> f64 {
        self.ends[self.shortest_lane()]
    }

    /// The largest accumulated extent over all lanes.
    #[must_use]
    pub fn max_end(&self) -> f64 {
        self.ends.iter().copied().fold(0.0, f64::max)
    }

    /// Assigns an item of `extent` to the shortest lane and returns its placement.
    pub fn place(&mut self, extent: f64) -> LanePlacement {
        let lane = self.shortest_lane();
        self.place_in(lane, extent)
    }

    /// Appends an item of `extent` to a specific lane. Unknown lanes fall back to lane 0.
    pub fn place_in(&mut self, lane: usize, extent: f64) -> LanePlacement {
        let lane = if lane < self.ends.len() { lane } else { 0 };
        let extent = if extent.is_finite() {
            extent.max(0.0)
        } else {
            0.0
        };
        let start = if self.counts[lane] == 0 {
            self.ends[lane]
        } else {
            self.ends[lane] + self.gap
        };
        let end = start + extent;
        self.ends[lane] = end;
        self.counts[lane] += 1;
        LanePlacement { lane, start, end }
    }

    /// Empties every lane.
    pub fn reset(&mut self) {
        self.ends.iter_mut().for_each(|end| *end = 0.0);
        self.counts.iter_mut().for_each(|count| *count = 0);
    }
}
