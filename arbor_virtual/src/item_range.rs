// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Set of materialized indices and the difference between two frames.

use hashbrown::HashSet;

/// Indices whose activation state changed in [`ItemRange::update`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeDiff {
    /// Indices that became active, in ascending order.
    pub activated: Vec<usize>,
    /// Indices that are no longer active, in ascending order.
    pub deactivated: Vec<usize>,
}

impl RangeDiff {
    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.activated.is_empty() && self.deactivated.is_empty()
    }
}

/// The indices currently materialized by a lazy container.
///
/// Each frame the container computes the indices it needs and calls [`ItemRange::update`];
/// the returned [`RangeDiff`] lists which children to put back into the render tree and which
/// to take out of it.
#[derive(Debug, Clone, Default)]
pub struct ItemRange {
    active: HashSet<usize>,
}

impl ItemRange {
    /// Creates an empty range.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `index` is active.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.active.contains(&index)
    }

    /// Number of active indices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Returns `true` if nothing is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Active indices in ascending order.
    #[must_use]
    pub fn sorted(&self) -> Vec<usize> {
        let mut out: Vec<usize> = self.active.iter().copied().collect();
        out.sort_unstable();
        out
    }

    /// Replaces the active set and reports what changed.
    pub fn update<I>(&mut self, indices: I) -> RangeDiff
    where
        I: IntoIterator<Item = usize>,
    {
        let next: HashSet<usize> = indices.into_iter().collect();
        let mut activated: Vec<usize> = next.difference(&self.active).copied().collect();
        let mut deactivated: Vec<usize> = self.active.difference(&next).copied().collect();
        activated.sort_unstable();
        deactivated.sort_unstable();
        self.active = next;
        RangeDiff {
            activated,
            deactivated,
        }
    }

    /// Drops every index at or past `len`, for example after children were removed.
    pub fn retain_below(&mut self, len: usize) {
        self.active.retain(|index| *index < len);
    }

    /// Deactivates everything and returns the previously active indices in ascending order.
    pub fn clear(&mut self) -> Vec<usize> {
        let out = self.sorted();
        self.active.clear();
        out
    }
}
