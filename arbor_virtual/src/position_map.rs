// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered map from item index to main-axis position.

use crate::ExtentModel;

/// Start and end of one item along the main axis, in scroll-position coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemPosition {
    /// Position of the leading edge.
    pub start: f64,
    /// Position of the trailing edge. Always `>= start`.
    pub end: f64,
}

impl ItemPosition {
    /// Creates a position, clamping `end` so it never precedes `start`.
    #[must_use]
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Main-axis extent of the item.
    #[must_use]
    pub fn extent(&self) -> f64 {
        self.end - self.start
    }

    /// Returns `true` if the item overlaps `[window_start, window_end)`.
    #[must_use]
    pub fn intersects(&self, window_start: f64, window_end: f64) -> bool {
        self.end > window_start && self.start < window_end
    }

    /// Returns this position moved by `delta`.
    #[must_use]
    pub fn translated(&self, delta: f64) -> Self {
        Self {
            start: self.start + delta,
            end: self.end + delta,
        }
    }
}

/// Positions of a prefix `0..len` of a strip, separated by uniform spacing.
///
/// Containers fill this map front to back as they measure items. Entries for items that
/// scroll out of view are kept, so re-entering items are placed without re-measuring.
/// When an item's extent changes, starts after it are rebuilt lazily on the next query.
///
/// An entry is either measured or an estimate. Estimates let a container jump far ahead
/// without measuring everything in between; [`PositionMap::set_extent`] later replaces
/// them with measured extents.
///
/// Positions are monotonically increasing and never overlap.
#[derive(Debug, Clone, Default)]
pub struct PositionMap {
    extents: Vec<f64>,
    starts: Vec<f64>,
    measured: Vec<bool>,
    measured_count: usize,
    spacing: f64,
    dirty_from: Option<usize>,
}

impl PositionMap {
    /// Creates an empty map with `spacing` between consecutive items.
    #[must_use]
    pub fn new(spacing: f64) -> Self {
        Self {
            extents: Vec::new(),
            starts: Vec::new(),
            measured: Vec::new(),
            measured_count: 0,
            spacing: sanitize(spacing),
            dirty_from: None,
        }
    }

    /// Spacing between consecutive items.
    #[must_use]
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Changes the spacing. All starts after the first are rebuilt.
    pub fn set_spacing(&mut self, spacing: f64) {
        let spacing = sanitize(spacing);
        if spacing != self.spacing {
            self.spacing = spacing;
            self.invalidate_from(1);
        }
    }

    /// Number of items with a known or estimated position.
    #[must_use]
    pub fn len(&self) -> usize {
        self.extents.len()
    }

    /// Number of items whose extent was measured.
    #[must_use]
    pub fn measured_count(&self) -> usize {
        self.measured_count
    }

    /// Returns `true` if `index` has a measured extent.
    #[must_use]
    pub fn is_measured(&self, index: usize) -> bool {
        self.measured.get(index).copied().unwrap_or(false)
    }

    /// Returns `true` if no item has been measured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extents.is_empty()
    }

    /// Appends the next item with a measured extent and returns its position.
    pub fn push(&mut self, extent: f64) -> ItemPosition {
        self.measured_count += 1;
        self.push_entry(extent, true)
    }

    /// Appends the next item with an estimated extent and returns its position.
    pub fn push_estimate(&mut self, extent: f64) -> ItemPosition {
        self.push_entry(extent, false)
    }

    fn push_entry(&mut self, extent: f64, measured: bool) -> ItemPosition {
        let extent = sanitize(extent);
        let start = match self.extents.len() {
            0 => 0.0,
            n => self.end_at(n - 1) + self.spacing,
        };
        self.extents.push(extent);
        self.starts.push(start);
        self.measured.push(measured);
        ItemPosition::new(start, start + extent)
    }

    /// Records a measured extent for an already known item.
    ///
    /// Returns `true` if the extent changed. Indices past the end are ignored.
    pub fn set_extent(&mut self, index: usize, extent: f64) -> bool {
        let extent = sanitize(extent);
        let Some(slot) = self.extents.get_mut(index) else {
            return false;
        };
        if !self.measured[index] {
            self.measured[index] = true;
            self.measured_count += 1;
        }
        if *slot == extent {
            return false;
        }
        *slot = extent;
        self.invalidate_from(index + 1);
        true
    }

    /// Forgets every item at or after `len`.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.extents.len() {
            return;
        }
        self.extents.truncate(len);
        self.starts.truncate(len);
        self.measured.truncate(len);
        self.measured_count = self.measured.iter().filter(|m| **m).count();
        if self.dirty_from.is_some_and(|d| d >= len) {
            self.dirty_from = None;
        }
    }

    /// Forgets every item.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Position of `index`, if it has been measured.
    pub fn position(&mut self, index: usize) -> Option<ItemPosition> {
        if index >= self.extents.len() {
            return None;
        }
        let start = self.start_at(index);
        Some(ItemPosition::new(start, start + self.extents[index]))
    }

    /// End position of the last known item, or zero if the map is empty.
    pub fn content_end(&mut self) -> f64 {
        match self.extents.len() {
            0 => 0.0,
            n => self.end_at(n - 1),
        }
    }

    /// Mean extent of the measured items, used to estimate the others.
    #[must_use]
    pub fn average_extent(&self) -> f64 {
        if self.measured_count == 0 {
            return 0.0;
        }
        let sum: f64 = self
            .extents
            .iter()
            .zip(&self.measured)
            .filter_map(|(extent, measured)| measured.then_some(*extent))
            .sum();
        sum / self.measured_count as f64
    }

    /// Estimated extent of a strip of `total` items.
    ///
    /// Known items contribute their positions; the rest are assumed to have the average
    /// measured extent.
    pub fn estimated_extent(&mut self, total: usize) -> f64 {
        let known = self.extents.len();
        let end = self.content_end();
        if total <= known || self.measured_count == 0 {
            return end;
        }
        let missing = (total - known) as f64;
        end + missing * (self.average_extent() + self.spacing)
    }

    fn invalidate_from(&mut self, index: usize) {
        if index < self.extents.len() {
            self.dirty_from = Some(self.dirty_from.map_or(index, |d| d.min(index)));
        }
    }

    fn start_at(&mut self, index: usize) -> f64 {
        if let Some(dirty) = self.dirty_from
            && dirty <= index
        {
            self.rebuild_from(dirty);
        }
        self.starts[index]
    }

    fn end_at(&mut self, index: usize) -> f64 {
        self.start_at(index) + self.extents[index]
    }

    fn rebuild_from(&mut self, from: usize) {
        let mut pos = if from == 0 {
            0.0
        } else {
            self.starts[from - 1] + self.extents[from - 1] + self.spacing
        };
        for i in from..self.extents.len() {
            self.starts[i] = pos;
            pos += self.extents[i] + self.spacing;
        }
        self.dirty_from = None;
    }
}

impl ExtentModel for PositionMap {
    fn len(&self) -> usize {
        self.extents.len()
    }

    fn total_extent(&mut self) -> f64 {
        self.content_end()
    }

    fn extent_of(&mut self, index: usize) -> f64 {
        self.extents.get(index).copied().unwrap_or(0.0)
    }

    fn offset_of(&mut self, index: usize) -> f64 {
        if index >= self.extents.len() {
            return self.content_end();
        }
        self.start_at(index)
    }

    fn index_at_offset(&mut self, offset: f64) -> usize {
        let len = self.extents.len();
        if len == 0 {
            return 0;
        }
        if let Some(dirty) = self.dirty_from {
            self.rebuild_from(dirty);
        }
        let target = offset.max(0.0);
        match self
            .starts
            .binary_search_by(|pos| pos.partial_cmp(&target).unwrap_or(core::cmp::Ordering::Equal))
        {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        }
    }
}

fn sanitize(value: f64) -> f64 {
    debug_assert!(value.is_finite(), "positions must be finite; got {value:?}");
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
