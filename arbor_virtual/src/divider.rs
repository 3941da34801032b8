// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Divider placement between adjacent items.

use core::ops::Range;

use crate::{PositionMap, near_zero};

/// A divider drawn across the cross axis between two adjacent items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DividerLine {
    /// Index of the item before the divider. The divider separates `after` and `after + 1`.
    pub after: usize,
    /// Main-axis position of the divider's center line.
    pub main: f64,
}

/// Computes dividers between consecutive items of `range`.
///
/// Each divider sits at the midpoint of the gap between the end of one item and the start of
/// the next. Boundaries where `is_full_span(index)` is `true` for either neighbor (group
/// headers and footers) get no divider. A non-positive `stroke_width` yields no dividers.
pub fn divider_lines(
    positions: &mut PositionMap,
    range: Range<usize>,
    stroke_width: f64,
    is_full_span: impl Fn(usize) -> bool,
) -> Vec<DividerLine> {
    let mut out = Vec::new();
    if stroke_width.is_nan() || stroke_width <= 0.0 || near_zero(stroke_width) {
        return out;
    }
    let end = range.end.min(positions.len());
    for index in range.start..end.saturating_sub(1) {
        if is_full_span(index) || is_full_span(index + 1) {
            continue;
        }
        let (Some(before), Some(next)) = (positions.position(index), positions.position(index + 1))
        else {
            continue;
        };
        out.push(DividerLine {
            after: index,
            main: (before.end + next.start) / 2.0,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{DividerLine, divider_lines};
    use crate::PositionMap;

    fn map(extents: &[f64], spacing: f64) -> PositionMap {
        let mut map = PositionMap::new(spacing);
        for extent in extents {
            map.push(*extent);
        }
        map
    }

    #[test]
    fn dividers_sit_in_the_middle_of_gaps() {
        let mut positions = map(&[10.0, 10.0, 10.0], 4.0);
        let lines = divider_lines(&mut positions, 0..3, 1.0, |_| false);
        assert_eq!(
            lines,
            [
                DividerLine {
                    after: 0,
                    main: 12.0
                },
                DividerLine {
                    after: 1,
                    main: 26.0
                },
            ]
        );
    }

    #[test]
    fn full_span_neighbors_are_skipped() {
        let mut positions = map(&[5.0, 10.0, 10.0, 5.0], 0.0);
        // Row 0 is a header and row 3 a footer.
        let lines = divider_lines(&mut positions, 0..4, 1.0, |i| i == 0 || i == 3);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].after, 1);
    }

    #[test]
    fn zero_stroke_draws_nothing() {
        let mut positions = map(&[10.0, 10.0], 2.0);
        assert!(divider_lines(&mut positions, 0..2, 0.0, |_| false).is_empty());
        assert!(divider_lines(&mut positions, 0..2, f64::NAN, |_| false).is_empty());
    }
}
