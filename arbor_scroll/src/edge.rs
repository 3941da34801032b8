// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Boundary crossing detection.

/// Which boundaries an offset change reached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EdgeCrossing {
    /// The start boundary (offset 0) was reached.
    pub start: bool,
    /// The end boundary was reached.
    pub end: bool,
}

impl EdgeCrossing {
    /// Returns `true` if either boundary was reached.
    #[must_use]
    pub fn any(&self) -> bool {
        self.start || self.end
    }
}

/// Remembers the previous offset and reports boundary crossings.
///
/// A boundary is *reached* when the offset arrives at or passes it from either side. Resting
/// on a boundary for several frames reports it once. A tracker without history reports, on
/// its first update, every boundary that offset is already at or past.
///
/// ```
/// use arbor_scroll::EdgeTracker;
///
/// let mut edges = EdgeTracker::default();
/// let fired = [5.0, 0.0, -0.0, 0.0, 5.0]
///     .into_iter()
///     .filter(|offset| edges.update(*offset, -100.0).start)
///     .count();
/// assert_eq!(fired, 2);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EdgeTracker {
    last: Option<f64>,
}

impl EdgeTracker {
    /// A tracker whose previous offset is `offset`.
    #[must_use]
    pub fn new(offset: f64) -> Self {
        Self { last: Some(offset) }
    }

    /// The offset seen last, if any.
    #[must_use]
    pub fn last(&self) -> Option<f64> {
        self.last
    }

    /// Returns `true` once an offset has been seen.
    #[must_use]
    pub fn has_history(&self) -> bool {
        self.last.is_some()
    }

    /// Records `offset` and reports crossings of the start boundary (0) and of `end`.
    pub fn update(&mut self, offset: f64, end: f64) -> EdgeCrossing {
        match self.last.replace(offset) {
            Some(last) => EdgeCrossing {
                start: crossed(last, offset, 0.0),
                end: crossed(last, offset, end),
            },
            // At or on the far side of each boundary, seen from the other one.
            None => EdgeCrossing {
                start: offset * end <= 0.0,
                end: (offset - end) * end >= 0.0,
            },
        }
    }

    /// Replaces history, so that the next update compares against `offset`.
    pub fn reset(&mut self, offset: f64) {
        self.last = Some(offset);
    }
}

fn crossed(last: f64, current: f64, boundary: f64) -> bool {
    (last < boundary && current >= boundary) || (last > boundary && current <= boundary)
}
