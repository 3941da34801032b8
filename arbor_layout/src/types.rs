// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the layout tree: node identifiers, flags, and per-node style.

use kurbo::Insets;

/// Identifier for a node in the tree (generational).
///
/// An id stays valid until its node is removed; after that every query with it is a no-op.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Work a node needs in the next frame.
    ///
    /// Content changes and measure requests are tracked separately: a content change that
    /// cannot affect size (a color, for example) only sets [`DirtyFlags::RENDER`] and never
    /// reaches measure or layout.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct DirtyFlags: u8 {
        /// The node's own content changed (intrinsic size, children, algorithm properties).
        const CONTENT    = 0b0000_0001;
        /// The node must be measured again.
        const MEASURE    = 0b0000_0010;
        /// The node's children must be positioned again.
        const LAYOUT     = 0b0000_0100;
        /// The node must be painted again.
        const RENDER     = 0b0000_1000;
        /// Some descendant has pending work.
        const DESCENDANT = 0b0001_0000;
    }
}

bitflags::bitflags! {
    /// Node flags controlling participation in layout and paint.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is part of the render tree. Lazy containers clear this on off-screen children.
        const ACTIVE  = 0b0000_0001;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::ACTIVE
    }
}

/// How one axis of a node's size is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum Dimension {
    /// Size to content.
    #[default]
    Auto,
    /// A fixed length.
    Fixed(f64),
    /// A fraction of the parent's percent reference (`1.0` is 100%).
    Percent(f64),
    /// Fill the parent's ideal size (or its maximum when the parent has no ideal size).
    MatchParent,
}

/// Role of a child inside a list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ItemRole {
    /// A regular item occupying one lane.
    #[default]
    Item,
    /// A group header spanning all lanes.
    Header,
    /// A group footer spanning all lanes.
    Footer,
}

impl ItemRole {
    /// Returns `true` for roles that span every lane.
    #[must_use]
    pub const fn is_full_span(self) -> bool {
        matches!(self, Self::Header | Self::Footer)
    }
}

/// Per-node properties shared by every layout algorithm.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeStyle {
    /// Width policy.
    pub width: Dimension,
    /// Height policy.
    pub height: Dimension,
    /// Space between the frame and the content box.
    pub padding: Insets,
    /// Space around the frame, part of the footprint a parent reserves.
    pub margin: Insets,
    /// Flex weight. Children with a positive weight share the remaining main-axis space.
    pub weight: f64,
    /// Role inside a list.
    pub role: ItemRole,
    /// Background fill as `0xAARRGGBB`. Changing it only repaints.
    pub background: Option<u32>,
    /// Corner radius of the background. Changing it only repaints.
    pub corner_radius: f64,
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self {
            width: Dimension::Auto,
            height: Dimension::Auto,
            padding: Insets::ZERO,
            margin: Insets::ZERO,
            weight: 0.0,
            role: ItemRole::Item,
            background: None,
            corner_radius: 0.0,
        }
    }
}

impl NodeStyle {
    /// A style with fixed width and height.
    #[must_use]
    pub fn fixed(width: f64, height: f64) -> Self {
        Self {
            width: Dimension::Fixed(width),
            height: Dimension::Fixed(height),
            ..Self::default()
        }
    }

    /// Returns `true` if switching from `self` to `other` can change a measured size.
    #[must_use]
    pub fn affects_size(&self, other: &Self) -> bool {
        self.width != other.width
            || self.height != other.height
            || self.padding != other.padding
            || self.margin != other.margin
            || self.weight != other.weight
            || self.role != other.role
    }
}
