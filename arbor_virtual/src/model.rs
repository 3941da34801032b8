// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Extent model trait and visible-window computation.

/// Indices of a strip that intersect a window, plus the extents around them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleStrip {
    /// First index in the window (inclusive).
    pub start: usize,
    /// One past the last index in the window (exclusive).
    pub end: usize,
    /// Extent of the strip before `start`.
    pub before_extent: f64,
    /// Extent of the strip after `end`.
    pub after_extent: f64,
    /// Extent of the whole strip.
    pub content_extent: f64,
}

impl VisibleStrip {
    /// An empty strip with no content.
    pub const EMPTY: Self = Self {
        start: 0,
        end: 0,
        before_extent: 0.0,
        after_extent: 0.0,
        content_extent: 0.0,
    };

    /// Returns `true` if no index intersects the window.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Number of indices in the window.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }
}

/// A dense strip of items indexed `0..len` along one axis.
///
/// Query methods take `&mut self` so implementations can keep lazily rebuilt caches.
pub trait ExtentModel {
    /// Number of items in the strip.
    fn len(&self) -> usize;

    /// Returns `true` if the strip holds no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Extent from the start of the first item to the end of the last.
    fn total_extent(&mut self) -> f64;

    /// Main-axis extent of one item. Never negative.
    fn extent_of(&mut self, index: usize) -> f64;

    /// Start position of one item.
    ///
    /// Implementations guarantee `offset_of(0) == 0` and
    /// `offset_of(i + 1) >= offset_of(i) + extent_of(i)`.
    fn offset_of(&mut self, index: usize) -> f64;

    /// Index of the last item whose start is at or before `offset`, clamped into `0..len`.
    fn index_at_offset(&mut self, offset: f64) -> usize;
}

/// Computes which items intersect the window `[position, position + viewport)`, widened by
/// `cache_before` and `cache_after`.
///
/// `position` may be negative while the content is pulled past its start edge; the window is
/// clipped to the content before searching.
pub fn compute_visible_strip<M>(
    model: &mut M,
    position: f64,
    viewport: f64,
    cache_before: f64,
    cache_after: f64,
) -> VisibleStrip
where
    M: ExtentModel + ?Sized,
{
    let len = model.len();
    if len == 0 {
        return VisibleStrip::EMPTY;
    }
    let content_extent = model.total_extent().max(0.0);
    if content_extent <= 0.0 {
        return VisibleStrip::EMPTY;
    }

    let viewport = viewport.max(0.0);
    let window_start = (position - cache_before.max(0.0)).max(0.0);
    let window_end = (position + viewport + cache_after.max(0.0)).min(content_extent);
    if window_end <= window_start {
        return VisibleStrip {
            start: 0,
            end: 0,
            before_extent: window_start.min(content_extent),
            after_extent: (content_extent - window_start).max(0.0),
            content_extent,
        };
    }

    let mut start = model.index_at_offset(window_start).min(len - 1);
    while start > 0 && model.offset_of(start) > window_start {
        start -= 1;
    }
    // Skip items that end before the window (gaps between items are not part of any item).
    while start + 1 < len && model.offset_of(start) + model.extent_of(start) <= window_start {
        start += 1;
    }

    let mut end = start;
    while end < len && model.offset_of(end) < window_end {
        end += 1;
    }

    let before_extent = model.offset_of(start);
    let after_start = if end < len {
        model.offset_of(end)
    } else {
        content_extent
    };

    VisibleStrip {
        start,
        end,
        before_extent,
        after_extent: (content_extent - after_start).max(0.0),
        content_extent,
    }
}

#[cfg(test)]
mod tests {
    use super::{ExtentModel, VisibleStrip, compute_visible_strip};

    /// Fixed-size items with no gaps, enough to exercise the window search.
    #[derive(Debug)]
    struct Strip {
        len: usize,
        extent: f64,
    }

    impl ExtentModel for Strip {
        fn len(&self) -> usize {
            self.len
        }

        fn total_extent(&mut self) -> f64 {
            self.extent * self.len as f64
        }

        fn extent_of(&mut self, _index: usize) -> f64 {
            self.extent
        }

        fn offset_of(&mut self, index: usize) -> f64 {
            self.extent * index as f64
        }

        fn index_at_offset(&mut self, offset: f64) -> usize {
            if self.len == 0 || self.extent <= 0.0 {
                return 0;
            }
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                reason = "offset is non-negative and the index is clamped"
            )]
            let index = (offset / self.extent) as usize;
            index.min(self.len - 1)
        }
    }

    #[test]
    fn empty_strip() {
        let mut model = Strip {
            len: 0,
            extent: 10.0,
        };
        assert_eq!(
            compute_visible_strip(&mut model, 0.0, 100.0, 5.0, 5.0),
            VisibleStrip::EMPTY
        );
    }

    #[test]
    fn window_covers_partial_items() {
        let mut model = Strip {
            len: 3,
            extent: 10.0,
        };
        let strip = compute_visible_strip(&mut model, 5.0, 10.0, 0.0, 0.0);
        assert_eq!((strip.start, strip.end), (0, 2));
        assert_eq!(strip.before_extent, 0.0);
        assert_eq!(strip.after_extent, 10.0);
        assert_eq!(strip.content_extent, 30.0);
    }

    #[test]
    fn cache_after_extends_only_the_end() {
        let mut model = Strip {
            len: 4,
            extent: 10.0,
        };
        let strip = compute_visible_strip(&mut model, 10.0, 20.0, 0.0, 10.0);
        assert_eq!((strip.start, strip.end), (1, 4));
    }

    #[test]
    fn negative_position_is_clipped_to_content_start() {
        let mut model = Strip {
            len: 10,
            extent: 10.0,
        };
        let strip = compute_visible_strip(&mut model, -15.0, 30.0, 0.0, 0.0);
        assert_eq!((strip.start, strip.end), (0, 2));
    }
}
