// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll positions that bring a specific item into view.

use crate::ItemPosition;

/// Alignment used when jumping to an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollAlign {
    /// The item's start is flush with the viewport start.
    #[default]
    Start,
    /// The item is centered in the viewport.
    Center,
    /// The item's end is flush with the viewport end.
    End,
    /// Move as little as possible:
    /// - start-flush if the item begins above the viewport,
    /// - end-flush if it extends below the viewport,
    /// - no movement if it is already fully visible.
    Auto,
}

impl ScrollAlign {
    /// Maps a binding-layer index to an alignment. Unknown indices fall back to [`ScrollAlign::Start`].
    #[must_use]
    pub fn from_index(index: i32) -> Self {
        match index {
            0 => Self::Start,
            1 => Self::Center,
            2 => Self::End,
            3 => Self::Auto,
            _ => {
                tracing::warn!(index, "unknown scroll align, using Start");
                Self::Start
            }
        }
    }
}

/// Returns the scroll position that shows `item` in a viewport of length `viewport`, given the
/// current scroll position `current`.
///
/// The result is not clamped to the scrollable range; the caller owns that policy.
#[must_use]
pub fn jump_position(item: ItemPosition, current: f64, viewport: f64, align: ScrollAlign) -> f64 {
    let viewport = viewport.max(0.0);
    match align {
        ScrollAlign::Start => item.start,
        ScrollAlign::End => item.end - viewport,
        ScrollAlign::Center => (item.start + item.end - viewport) / 2.0,
        ScrollAlign::Auto => {
            if item.start < current {
                item.start
            } else if item.end > current + viewport {
                item.end - viewport
            } else {
                current
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ScrollAlign, jump_position};
    use crate::ItemPosition;

    #[test]
    fn explicit_alignments() {
        let item = ItemPosition::new(30.0, 40.0);
        assert_eq!(jump_position(item, 0.0, 30.0, ScrollAlign::Start), 30.0);
        assert_eq!(jump_position(item, 0.0, 30.0, ScrollAlign::End), 10.0);
        assert_eq!(jump_position(item, 0.0, 30.0, ScrollAlign::Center), 20.0);
    }

    #[test]
    fn auto_uses_the_edge_the_item_crosses() {
        let item = ItemPosition::new(30.0, 40.0);
        // Above the viewport: top-flush.
        assert_eq!(jump_position(item, 35.0, 30.0, ScrollAlign::Auto), 30.0);
        // Below the viewport: bottom-flush.
        assert_eq!(jump_position(item, 0.0, 30.0, ScrollAlign::Auto), 10.0);
        // Fully visible: unchanged.
        assert_eq!(jump_position(item, 20.0, 30.0, ScrollAlign::Auto), 20.0);
    }

    #[test]
    fn auto_is_idempotent() {
        let item = ItemPosition::new(120.0, 150.0);
        let once = jump_position(item, 0.0, 50.0, ScrollAlign::Auto);
        let twice = jump_position(item, once, 50.0, ScrollAlign::Auto);
        assert_eq!(once, twice);
    }

    #[test]
    fn unknown_index_falls_back_to_start() {
        assert_eq!(ScrollAlign::from_index(2), ScrollAlign::End);
        assert_eq!(ScrollAlign::from_index(42), ScrollAlign::Start);
    }
}
