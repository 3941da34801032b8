// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Easing curves for scroll and paging animations.

/// Maps animation progress in `[0, 1]` to eased progress.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Curve {
    /// Identity.
    #[default]
    Linear,
    /// `cubic-bezier(0.25, 0.1, 0.25, 1)`.
    Ease,
    /// `cubic-bezier(0.42, 0, 1, 1)`.
    EaseIn,
    /// `cubic-bezier(0, 0, 0.58, 1)`.
    EaseOut,
    /// `cubic-bezier(0.42, 0, 0.58, 1)`.
    EaseInOut,
    /// `cubic-bezier(0.2, 0, 0.2, 1)`, a fast start with a long tail.
    Friction,
    /// A custom cubic Bézier through `(0, 0)`, `(x1, y1)`, `(x2, y2)`, `(1, 1)`.
    CubicBezier {
        /// First control point x, clamped to `[0, 1]`.
        x1: f64,
        /// First control point y.
        y1: f64,
        /// Second control point x, clamped to `[0, 1]`.
        x2: f64,
        /// Second control point y.
        y2: f64,
    },
}

impl Curve {
    /// Maps a binding-layer index. Unknown indices fall back to [`Curve::Linear`].
    #[must_use]
    pub fn from_index(index: i32) -> Self {
        match index {
            0 => Self::Linear,
            1 => Self::Ease,
            2 => Self::EaseIn,
            3 => Self::EaseOut,
            4 => Self::EaseInOut,
            5 => Self::Friction,
            _ => {
                tracing::warn!(index, "unknown curve, using Linear");
                Self::Linear
            }
        }
    }

    /// Eased progress at `t`. Input is clamped to `[0, 1]`; NaN maps to 0.
    #[must_use]
    pub fn transform(&self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let (x1, y1, x2, y2) = match *self {
            Self::Linear => return t,
            Self::Ease => (0.25, 0.1, 0.25, 1.0),
            Self::EaseIn => (0.42, 0.0, 1.0, 1.0),
            Self::EaseOut => (0.0, 0.0, 0.58, 1.0),
            Self::EaseInOut => (0.42, 0.0, 0.58, 1.0),
            Self::Friction => (0.2, 0.0, 0.2, 1.0),
            Self::CubicBezier { x1, y1, x2, y2 } => (x1, y1, x2, y2),
        };
        if t == 0.0 || t == 1.0 {
            return t;
        }
        let s = solve_bezier_x(t, x1.clamp(0.0, 1.0), x2.clamp(0.0, 1.0));
        bezier(s, y1, y2)
    }
}

/// The ease-out remap applied to paging progress before the configured curve.
#[must_use]
pub fn ease_out(t: f64) -> f64 {
    Curve::EaseOut.transform(t)
}

fn bezier(s: f64, p1: f64, p2: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
}

fn bezier_slope(s: f64, p1: f64, p2: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * p1 + 6.0 * inv * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}

/// Parameter `s` with `x(s) == x`. Newton steps, then bisection if they stall.
fn solve_bezier_x(x: f64, x1: f64, x2: f64) -> f64 {
    let mut s = x;
    for _ in 0..8 {
        let err = bezier(s, x1, x2) - x;
        if err.abs() < 1e-7 {
            return s;
        }
        let slope = bezier_slope(s, x1, x2);
        if slope.abs() < 1e-6 {
            break;
        }
        s -= err / slope;
    }
    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    s = x;
    for _ in 0..40 {
        let value = bezier(s, x1, x2);
        if (value - x).abs() < 1e-7 {
            break;
        }
        if value < x {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    s
}

#[cfg(test)]
mod tests {
    use super::{Curve, ease_out};

    #[test]
    fn curves_pin_their_endpoints() {
        for curve in [
            Curve::Linear,
            Curve::Ease,
            Curve::EaseIn,
            Curve::EaseOut,
            Curve::EaseInOut,
            Curve::Friction,
        ] {
            assert_eq!(curve.transform(0.0), 0.0);
            assert_eq!(curve.transform(1.0), 1.0);
            assert_eq!(curve.transform(-3.0), 0.0);
            assert_eq!(curve.transform(f64::NAN), 0.0);
        }
    }

    #[test]
    fn ease_out_leads_and_ease_in_lags() {
        assert!(ease_out(0.5) > 0.5);
        assert!(Curve::EaseIn.transform(0.5) < 0.5);
        let mid = Curve::EaseInOut.transform(0.5);
        assert!((mid - 0.5).abs() < 1e-4);
    }

    #[test]
    fn eased_progress_is_monotonic() {
        let mut last = 0.0;
        for step in 0..=100 {
            let value = Curve::Friction.transform(f64::from(step) / 100.0);
            assert!(value + 1e-9 >= last);
            last = value;
        }
    }

    #[test]
    fn unknown_curve_index_is_linear() {
        assert_eq!(Curve::from_index(42), Curve::Linear);
        assert_eq!(Curve::from_index(3), Curve::EaseOut);
    }
}
