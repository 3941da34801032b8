// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tuning constants and the rubber-band friction curve.

use arbor_virtual::near_zero;

/// Behavior at the scroll boundaries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EdgeEffect {
    /// The offset may pass a boundary under friction and springs back on release.
    #[default]
    Spring,
    /// The offset is clamped; the attempted overscroll is recorded for a fade indicator.
    Fade,
    /// The offset is clamped.
    None,
}

impl EdgeEffect {
    /// Maps a binding-layer index. Unknown indices fall back to [`EdgeEffect::None`].
    #[must_use]
    pub fn from_index(index: i32) -> Self {
        match index {
            0 => Self::Spring,
            1 => Self::Fade,
            2 => Self::None,
            _ => {
                tracing::warn!(index, "unknown edge effect, using None");
                Self::None
            }
        }
    }
}

/// Tuning constants of a scrollable. Velocities are in units per second.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollPhysics {
    /// Friction factor `k` in `k * (1 - x)^2`, in `[0, 1]`.
    pub friction_ratio: f64,
    /// Speed used to derive the duration of distance-based animations.
    pub animate_speed: f64,
    /// Exponential decay rate of a fling, per second.
    pub fling_decay: f64,
    /// Release velocity below which no fling starts.
    pub min_fling_velocity: f64,
    /// Velocity at which a running fling stops.
    pub fling_stop_velocity: f64,
    /// Duration of the spring-back animation after an overscroll.
    pub spring_back_ms: f64,
    /// Duration of the paging snap animation.
    pub snap_duration_ms: f64,
    /// Release velocity a paging scroll must exceed to turn a page.
    pub min_turn_velocity: f64,
    /// Drag distance a paging scroll must exceed to turn a page.
    pub min_drag_distance: f64,
}

impl Default for ScrollPhysics {
    fn default() -> Self {
        Self {
            friction_ratio: 0.72,
            animate_speed: 1500.0,
            fling_decay: 4.0,
            min_fling_velocity: 100.0,
            fling_stop_velocity: 10.0,
            spring_back_ms: 400.0,
            snap_duration_ms: 300.0,
            min_turn_velocity: 780.0,
            min_drag_distance: 25.0,
        }
    }
}

impl ScrollPhysics {
    /// Replaces out-of-range values with their defaults or nearest valid value.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        let positive = |v: f64, fallback: f64| if v.is_finite() && v > 0.0 { v } else { fallback };
        let non_negative = |v: f64, fallback: f64| if v.is_finite() { v.max(0.0) } else { fallback };
        Self {
            friction_ratio: if self.friction_ratio.is_nan() {
                d.friction_ratio
            } else {
                self.friction_ratio.clamp(0.0, 1.0)
            },
            animate_speed: positive(self.animate_speed, d.animate_speed),
            fling_decay: positive(self.fling_decay, d.fling_decay),
            min_fling_velocity: non_negative(self.min_fling_velocity, d.min_fling_velocity),
            fling_stop_velocity: positive(self.fling_stop_velocity, d.fling_stop_velocity),
            spring_back_ms: non_negative(self.spring_back_ms, d.spring_back_ms),
            snap_duration_ms: non_negative(self.snap_duration_ms, d.snap_duration_ms),
            min_turn_velocity: non_negative(self.min_turn_velocity, d.min_turn_velocity),
            min_drag_distance: non_negative(self.min_drag_distance, d.min_drag_distance),
        }
    }

    /// Duration in milliseconds of an animation covering `distance` at
    /// [`animate_speed`](Self::animate_speed).
    #[must_use]
    pub fn duration_for(&self, distance: f64) -> f64 {
        if !distance.is_finite() || near_zero(self.animate_speed) {
            return 0.0;
        }
        distance.abs() * 1000.0 / self.animate_speed
    }
}

/// Friction applied at an overscroll of `overscroll / viewport`.
///
/// Returns `ratio * (1 - x)^2` with `x` clamped to `[0, 1]`. A zero viewport counts as fully
/// overscrolled.
#[must_use]
pub fn friction(overscroll: f64, viewport: f64, ratio: f64) -> f64 {
    let x = if near_zero(viewport) || viewport < 0.0 {
        1.0
    } else {
        (overscroll.abs() / viewport).clamp(0.0, 1.0)
    };
    ratio * (1.0 - x) * (1.0 - x)
}

/// Resists a drag `delta` that pushes further past a boundary.
///
/// `overscroll` is signed like the offset: positive past the start boundary, negative past
/// the end. While `|delta|` stays below `overscroll / friction` it is scaled by the friction;
/// beyond that distance the remainder passes one to one. Deltas that reduce the overscroll,
/// and all deltas while not overscrolled, pass unchanged. When friction vanishes the delta is
/// dropped.
///
/// ```
/// use arbor_scroll::adjust_offset;
///
/// // Not overscrolled: passes through.
/// assert_eq!(adjust_offset(12.0, 0.0, 100.0, 0.72), 12.0);
/// // Pulling down while already 10 past the top is damped.
/// assert!(adjust_offset(5.0, 10.0, 100.0, 0.72) < 5.0);
/// // Pushing back toward the top is not.
/// assert_eq!(adjust_offset(-5.0, 10.0, 100.0, 0.72), -5.0);
/// ```
#[must_use]
pub fn adjust_offset(delta: f64, overscroll: f64, viewport: f64, ratio: f64) -> f64 {
    if !delta.is_finite() {
        return 0.0;
    }
    if near_zero(delta) || !overscroll.is_finite() || near_zero(overscroll) {
        return delta;
    }
    if delta.signum() != overscroll.signum() {
        return delta;
    }
    let friction = friction(overscroll, viewport, ratio);
    if near_zero(friction) {
        return 0.0;
    }
    let past = overscroll.abs();
    let limit = past / friction;
    if delta.abs() < limit {
        delta * friction
    } else {
        delta.signum() * (past + delta.abs() - limit)
    }
}

#[cfg(test)]
mod tests {
    use super::{EdgeEffect, ScrollPhysics, adjust_offset, friction};

    #[test]
    fn friction_is_monotonic_in_delta_and_damps_inside_the_zone() {
        for overscroll in [5.0, 20.0, 60.0] {
            let mut last = 0.0;
            let limit = overscroll / friction(overscroll, 200.0, 0.72);
            for step in 1..400 {
                let delta = f64::from(step) * 0.5;
                let out = adjust_offset(delta, overscroll, 200.0, 0.72);
                assert!(out >= last, "not monotonic at {delta} for {overscroll}");
                if delta < limit {
                    assert!(out < delta, "not damped at {delta} for {overscroll}");
                }
                last = out;
            }
        }
    }

    #[test]
    fn end_overscroll_is_mirrored() {
        let start = adjust_offset(4.0, 10.0, 100.0, 0.72);
        let end = adjust_offset(-4.0, -10.0, 100.0, 0.72);
        assert_eq!(start, -end);
        assert_eq!(adjust_offset(4.0, -10.0, 100.0, 0.72), 4.0);
    }

    #[test]
    fn large_deltas_continue_linearly_past_the_limit() {
        let f = friction(10.0, 100.0, 0.72);
        let limit = 10.0 / f;
        let at = adjust_offset(limit + 30.0, 10.0, 100.0, 0.72);
        assert!((at - 40.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_geometry_yields_neutral_results() {
        assert_eq!(adjust_offset(5.0, 10.0, 0.0, 0.72), 0.0);
        assert_eq!(adjust_offset(5.0, 150.0, 100.0, 0.72), 0.0);
        assert_eq!(adjust_offset(f64::NAN, 10.0, 100.0, 0.72), 0.0);
        assert_eq!(adjust_offset(5.0, 10.0, 100.0, 0.0), 0.0);
    }

    #[test]
    fn physics_are_sanitized_and_durations_scale_with_distance() {
        let physics = ScrollPhysics {
            friction_ratio: 3.0,
            animate_speed: -1.0,
            ..ScrollPhysics::default()
        }
        .sanitized();
        assert_eq!(physics.friction_ratio, 1.0);
        assert_eq!(physics.animate_speed, ScrollPhysics::default().animate_speed);

        let physics = ScrollPhysics {
            animate_speed: 2000.0,
            ..ScrollPhysics::default()
        };
        assert_eq!(physics.duration_for(-500.0), 250.0);
        assert_eq!(physics.duration_for(1000.0), 500.0);
    }

    #[test]
    fn unknown_edge_effect_falls_back_to_none() {
        assert_eq!(EdgeEffect::from_index(1), EdgeEffect::Fade);
        assert_eq!(EdgeEffect::from_index(9), EdgeEffect::None);
    }
}
