// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Row-based virtualization shared by lists and lazy grids.
//!
//! Children are grouped into rows: a row is either up to `lanes` consecutive items side by
//! side, or a single full-span item. Rows are measured in order until they cover the viewport
//! plus a cache of rows on each side. Positions of rows measured once are kept, so scrolling
//! back is cheap; only the items of rows near the viewport stay active.
//!
//! A jump past the measured rows measures the target and estimates the rows it skips over
//! with the average measured extent. Estimated rows are measured once they come near the
//! viewport, keeping the first visible row in place.

use core::ops::Range;

use arbor_virtual::{
    DividerLine, ItemRange, PositionMap, compute_visible_strip, divider_lines, jump_position,
};
use kurbo::Size;

use super::template::TrackSizes;
use super::{JumpRequest, ScrollMetrics};
use crate::constraint::LayoutConstraint;
use crate::cx::LayoutCx;
use crate::geometry::{Axis, OptionalSize};

/// Upper bound on re-measuring passes after estimated rows turn out different.
const SETTLE_PASSES: usize = 4;

/// Groups items into rows of at most `lanes` items, breaking around full-span items.
pub(crate) fn plan_rows(
    full_span: impl IntoIterator<Item = bool>,
    lanes: usize,
) -> (Vec<Range<usize>>, Vec<bool>) {
    let lanes = lanes.max(1);
    let mut rows: Vec<Range<usize>> = Vec::new();
    let mut spans = Vec::new();
    let mut open: Option<Range<usize>> = None;
    for (index, full) in full_span.into_iter().enumerate() {
        if full {
            if let Some(row) = open.take() {
                rows.push(row);
                spans.push(false);
            }
            rows.push(index..index + 1);
            spans.push(true);
            continue;
        }
        match open.as_mut() {
            Some(row) if row.len() < lanes => row.end = index + 1,
            _ => {
                if let Some(row) = open.replace(index..index + 1) {
                    rows.push(row);
                    spans.push(false);
                }
            }
        }
    }
    if let Some(row) = open {
        rows.push(row);
        spans.push(false);
    }
    (rows, spans)
}

/// Activates the children at `indices` and deactivates the rest.
///
/// The first call after `swept` is cleared visits every child; later calls only touch the
/// difference from the previous set.
pub(crate) fn sync_active(
    cx: &mut LayoutCx<'_>,
    range: &mut ItemRange,
    swept: &mut bool,
    indices: impl IntoIterator<Item = usize>,
) {
    let diff = range.update(indices);
    if !*swept {
        for (index, child) in cx.children().into_iter().enumerate() {
            cx.set_child_active(child, range.contains(index));
        }
        *swept = true;
        return;
    }
    if diff.is_empty() {
        return;
    }
    tracing::trace!(
        activated = diff.activated.len(),
        deactivated = diff.deactivated.len(),
        "item range changed"
    );
    for index in diff.deactivated {
        if let Some(child) = cx.child_at(index) {
            cx.set_child_active(child, false);
        }
    }
    for index in diff.activated {
        if let Some(child) = cx.child_at(index) {
            cx.set_child_active(child, true);
        }
    }
}

/// Inputs of one measure pass.
#[derive(Debug)]
pub(crate) struct RowSpec<'a> {
    pub axis: Axis,
    /// Cross size of each lane. Infinite when the container's cross size is unknown.
    pub lanes: &'a [f64],
    /// Cross offset of each lane.
    pub lane_offsets: &'a [f64],
    /// Cross size given to full-span rows.
    pub cross_extent: f64,
    /// Main-axis gap between rows.
    pub main_gap: f64,
    /// Rows kept active beyond each edge of the viewport.
    pub cached_count: usize,
    /// Viewport length, or `None` when the main axis is unbounded.
    pub viewport: Option<f64>,
    pub rows: Vec<Range<usize>>,
    pub full_span: Vec<bool>,
}

impl RowSpec<'_> {
    fn row_of(&self, index: usize) -> Option<usize> {
        let row = self.rows.partition_point(|r| r.end <= index);
        (row < self.rows.len()).then_some(row)
    }

    fn lane_constraint(&self, row: usize, lane: usize) -> LayoutConstraint {
        let cross = if self.full_span.get(row).copied().unwrap_or(false) {
            self.cross_extent
        } else {
            self.lanes
                .get(lane)
                .or(self.lanes.last())
                .copied()
                .unwrap_or(self.cross_extent)
        };
        let axis = self.axis;
        let mut ideal = OptionalSize::NONE;
        ideal.set_main(axis.cross(), Some(cross).filter(|c| c.is_finite()));
        LayoutConstraint {
            min_size: Size::ZERO,
            max_size: axis.size(f64::INFINITY, cross.max(0.0)),
            self_ideal_size: ideal,
            parent_ideal_size: OptionalSize::NONE,
            percent_reference: axis.size(
                self.viewport.unwrap_or(0.0),
                if cross.is_finite() { cross } else { 0.0 },
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct RowKey {
    lanes: TrackSizes,
    cross_extent: f64,
    main_gap: f64,
}

/// Scroll and virtualization state of a row-based container.
#[derive(Debug, Default)]
pub(crate) struct LazyRows {
    positions: PositionMap,
    range: ItemRange,
    rows: Vec<Range<usize>>,
    full_span: Vec<bool>,
    lane_offsets: TrackSizes,
    key: Option<RowKey>,
    offset: f64,
    pending_jump: Option<JumpRequest>,
    active_rows: Range<usize>,
    swept: bool,
    measured_cross: f64,
    metrics: ScrollMetrics,
}

impl LazyRows {
    pub(crate) fn offset(&self) -> f64 {
        self.offset
    }

    pub(crate) fn metrics(&self) -> ScrollMetrics {
        self.metrics
    }

    pub(crate) fn is_full_span(&self, row: usize) -> bool {
        self.full_span.get(row).copied().unwrap_or(false)
    }

    /// Divider lines between active rows, skipping full-span neighbors.
    pub(crate) fn dividers(&mut self, stroke_width: f64) -> Vec<DividerLine> {
        divider_lines(
            &mut self.positions,
            self.active_rows.clone(),
            stroke_width,
            |row| self.full_span.get(row).copied().unwrap_or(false),
        )
    }

    /// Replaces the viewport length once the container's final size is known.
    pub(crate) fn set_viewport_length(&mut self, length: f64) {
        self.metrics.viewport_length = length;
    }

    /// Largest cross size among items measured in the last pass.
    pub(crate) fn measured_cross(&self) -> f64 {
        self.measured_cross
    }

    pub(crate) fn set_offset(&mut self, offset: f64) -> bool {
        if !offset.is_finite() || offset == self.offset {
            return false;
        }
        self.offset = offset;
        true
    }

    pub(crate) fn request_jump(&mut self, request: JumpRequest) -> bool {
        self.pending_jump = Some(request);
        true
    }

    /// Measures rows around the viewport and updates which children are active.
    pub(crate) fn measure(&mut self, cx: &mut LayoutCx<'_>, spec: &RowSpec<'_>) -> ScrollMetrics {
        let key = RowKey {
            lanes: spec.lanes.iter().copied().collect(),
            cross_extent: spec.cross_extent,
            main_gap: spec.main_gap,
        };
        if self.key.as_ref() != Some(&key) || self.rows != spec.rows {
            tracing::debug!(rows = spec.rows.len(), "row structure changed, dropping positions");
            self.positions.clear();
            self.positions.set_spacing(spec.main_gap);
            self.key = Some(key);
            self.rows.clone_from(&spec.rows);
            self.full_span.clone_from(&spec.full_span);
            self.range.retain_below(cx.child_count());
            self.swept = false;
        }
        self.lane_offsets = spec.lane_offsets.iter().copied().collect();
        self.measured_cross = 0.0;

        // Rows measured in earlier frames whose items changed since.
        for row in 0..self.positions.len() {
            if !self.positions.is_measured(row) {
                continue;
            }
            let dirty = self.rows[row]
                .clone()
                .filter_map(|i| cx.child_at(i))
                .any(|child| cx.child_needs_measure(child));
            if dirty {
                let extent = self.measure_row(cx, spec, row);
                self.positions.set_extent(row, extent);
            }
        }

        let row_count = spec.rows.len();
        let (first, end) = match spec.viewport {
            None => {
                self.fill_to(cx, spec, row_count);
                self.measure_estimated(cx, spec, 0..row_count);
                self.offset = 0.0;
                (0, row_count)
            }
            Some(viewport) => self.fill_viewport(cx, spec, viewport),
        };
        let content_extent = self.content_extent(row_count);

        self.active_rows = first..end;
        self.apply_activity(cx);

        let item_of = |row: usize| self.rows.get(row).map_or(0, |r| r.start);
        self.metrics = ScrollMetrics {
            axis: spec.axis,
            current_offset: self.offset,
            content_extent,
            viewport_length: spec.viewport.unwrap_or(content_extent),
            start_index: item_of(first),
            end_index: if end > first {
                self.rows[end - 1].end
            } else {
                item_of(first)
            },
            fully_measured: self.positions.measured_count() >= row_count,
        };
        self.metrics
    }

    fn content_extent(&mut self, row_count: usize) -> f64 {
        if self.positions.len() >= row_count {
            self.positions.content_end()
        } else {
            self.positions.estimated_extent(row_count)
        }
    }

    fn fill_viewport(
        &mut self,
        cx: &mut LayoutCx<'_>,
        spec: &RowSpec<'_>,
        viewport: f64,
    ) -> (usize, usize) {
        let row_count = spec.rows.len();
        let mut position = -self.offset;
        let mut jumped = false;
        if let Some(jump) = self.pending_jump.take() {
            match spec.row_of(jump.index) {
                Some(row) => {
                    self.reach_row(cx, spec, row);
                    if let Some(item) = self.positions.position(row) {
                        position = jump_position(item, position, viewport, jump.align);
                    }
                    jumped = true;
                }
                None => tracing::debug!(index = jump.index, "jump target out of range"),
            }
        }

        let mut window = 0..0;
        for _ in 0..SETTLE_PASSES {
            self.fill_until(cx, spec, position + viewport);
            if jumped {
                let limit = (self.content_extent(row_count) - viewport).max(0.0);
                position = position.clamp(0.0, limit);
            }
            let strip = compute_visible_strip(&mut self.positions, position, viewport, 0.0, 0.0);
            if strip.is_empty() {
                window = 0..0;
                break;
            }
            let end = (strip.end + spec.cached_count).min(row_count);
            self.fill_to(cx, spec, end);
            window = strip.start.saturating_sub(spec.cached_count)..end;

            let anchor = strip.start;
            let before = self.positions.position(anchor).map_or(0.0, |p| p.start);
            if !self.measure_estimated(cx, spec, window.clone()) {
                break;
            }
            if let Some(after) = self.positions.position(anchor) {
                position += after.start - before;
            }
        }
        self.offset = -position;
        (window.start, window.end)
    }

    /// Gives `row` a measured position, estimating any rows before it that are not known yet.
    fn reach_row(&mut self, cx: &mut LayoutCx<'_>, spec: &RowSpec<'_>, row: usize) {
        if row < self.positions.len() {
            self.measure_estimated(cx, spec, row..row + 1);
            return;
        }
        let extent = self.measure_row(cx, spec, row);
        let estimate = if self.positions.measured_count() > 0 {
            self.positions.average_extent()
        } else {
            extent
        };
        let skipped = row - self.positions.len();
        if skipped > 0 {
            tracing::trace!(row, skipped, estimate, "estimating rows before jump target");
        }
        while self.positions.len() < row {
            self.positions.push_estimate(estimate);
        }
        self.positions.push(extent);
    }

    /// Measures the estimated rows in `rows`. Returns `true` if any estimate was off.
    fn measure_estimated(
        &mut self,
        cx: &mut LayoutCx<'_>,
        spec: &RowSpec<'_>,
        rows: Range<usize>,
    ) -> bool {
        let mut changed = false;
        for row in rows.start..rows.end.min(self.positions.len()) {
            if !self.positions.is_measured(row) {
                let extent = self.measure_row(cx, spec, row);
                changed |= self.positions.set_extent(row, extent);
            }
        }
        changed
    }

    fn fill_to(&mut self, cx: &mut LayoutCx<'_>, spec: &RowSpec<'_>, rows: usize) {
        while self.positions.len() < rows.min(spec.rows.len()) {
            let extent = self.measure_row(cx, spec, self.positions.len());
            self.positions.push(extent);
        }
    }

    fn fill_until(&mut self, cx: &mut LayoutCx<'_>, spec: &RowSpec<'_>, end: f64) {
        while self.positions.len() < spec.rows.len() && self.positions.content_end() < end {
            let extent = self.measure_row(cx, spec, self.positions.len());
            self.positions.push(extent);
        }
    }

    fn measure_row(&mut self, cx: &mut LayoutCx<'_>, spec: &RowSpec<'_>, row: usize) -> f64 {
        let mut extent = 0.0_f64;
        for (lane, index) in spec.rows[row].clone().enumerate() {
            let Some(child) = cx.child_at(index) else {
                continue;
            };
            let size = cx.measure_child(child, &spec.lane_constraint(row, lane));
            extent = extent.max(spec.axis.main(size));
            self.measured_cross = self.measured_cross.max(spec.axis.cross_of(size));
        }
        extent
    }

    fn apply_activity(&mut self, cx: &mut LayoutCx<'_>) {
        let rows = &self.rows[self.active_rows.clone()];
        let indices: Vec<usize> = rows.iter().flat_map(Clone::clone).collect();
        sync_active(cx, &mut self.range, &mut self.swept, indices);
    }

    /// Places the items of active rows. Sizes and positions come from the last measure.
    pub(crate) fn layout(&mut self, cx: &mut LayoutCx<'_>, axis: Axis) {
        for row in self.active_rows.clone() {
            let Some(position) = self.positions.position(row) else {
                continue;
            };
            let main = position.start + self.offset;
            let full = self.is_full_span(row);
            for (lane, index) in self.rows[row].clone().enumerate() {
                let Some(child) = cx.child_at(index) else {
                    continue;
                };
                let cross = if full {
                    0.0
                } else {
                    self.lane_offsets.get(lane).copied().unwrap_or(0.0)
                };
                cx.place_child(child, axis.point(main, cross));
            }
        }
    }
}
