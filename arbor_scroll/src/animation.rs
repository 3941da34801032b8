// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-driven animations. Nothing here sleeps: callers sample with frame timestamps.

use arbor_virtual::near_zero;

use crate::curve::{Curve, ease_out};

/// Result of sampling an animation at a frame timestamp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Sample {
    /// The animation continues; carries the current value.
    Running(f64),
    /// The animation reached its end; carries the final value.
    Finished(f64),
    /// The timestamp was not later than the previous one and was ignored.
    Stale,
}

/// Orders frame timestamps: the first sample starts the clock, and samples that are not
/// later than the previous one are dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct FrameClock {
    start: Option<f64>,
    last: Option<f64>,
}

impl FrameClock {
    /// Elapsed milliseconds at `timestamp`, or `None` for a stale frame.
    fn elapsed(&mut self, timestamp: f64) -> Option<f64> {
        if !timestamp.is_finite() || self.last.is_some_and(|last| timestamp <= last) {
            return None;
        }
        self.last = Some(timestamp);
        let start = *self.start.get_or_insert(timestamp);
        Some(timestamp - start)
    }
}

/// Interpolates from one value to another over a fixed duration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Tween {
    from: f64,
    to: f64,
    duration_ms: f64,
    curve: Curve,
    ease_out_first: bool,
    clock: FrameClock,
}

impl Tween {
    pub(crate) fn new(from: f64, to: f64, duration_ms: f64, curve: Curve) -> Self {
        Self {
            from,
            to,
            duration_ms: if duration_ms.is_finite() { duration_ms.max(0.0) } else { 0.0 },
            curve,
            ease_out_first: false,
            clock: FrameClock::default(),
        }
    }

    /// Remaps linear progress through an ease-out before applying the curve.
    pub(crate) fn with_ease_out_remap(mut self) -> Self {
        self.ease_out_first = true;
        self
    }

    pub(crate) fn to(&self) -> f64 {
        self.to
    }

    pub(crate) fn sample(&mut self, timestamp: f64) -> Sample {
        let Some(elapsed) = self.clock.elapsed(timestamp) else {
            return Sample::Stale;
        };
        if near_zero(self.duration_ms) || elapsed >= self.duration_ms {
            return Sample::Finished(self.to);
        }
        let mut t = elapsed / self.duration_ms;
        if self.ease_out_first {
            t = ease_out(t);
        }
        Sample::Running(self.from + (self.to - self.from) * self.curve.transform(t))
    }
}

/// An exponentially decaying fling. Samples carry the distance moved since the last sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Fling {
    velocity: f64,
    decay: f64,
    end_s: f64,
    travelled: f64,
    clock: FrameClock,
}

impl Fling {
    /// A fling at `velocity` units per second decaying at `decay` per second until its speed
    /// drops to `stop_velocity`.
    pub(crate) fn new(velocity: f64, decay: f64, stop_velocity: f64) -> Self {
        let speed = velocity.abs();
        let end_s = if speed > stop_velocity && decay > 0.0 && stop_velocity > 0.0 {
            (speed / stop_velocity).ln() / decay
        } else {
            0.0
        };
        Self {
            velocity,
            decay,
            end_s,
            travelled: 0.0,
            clock: FrameClock::default(),
        }
    }

    /// Total distance the fling covers if not interrupted.
    pub(crate) fn total_distance(&self) -> f64 {
        self.position(self.end_s)
    }

    fn position(&self, t_s: f64) -> f64 {
        if near_zero(self.decay) {
            return 0.0;
        }
        self.velocity / self.decay * (1.0 - (-self.decay * t_s).exp())
    }

    /// Velocity at the last sample.
    pub(crate) fn current_velocity(&self) -> f64 {
        let t = self.travelled_time();
        self.velocity * (-self.decay * t).exp()
    }

    fn travelled_time(&self) -> f64 {
        match (self.clock.start, self.clock.last) {
            (Some(start), Some(last)) => ((last - start) / 1000.0).min(self.end_s),
            _ => 0.0,
        }
    }

    pub(crate) fn sample(&mut self, timestamp: f64) -> Sample {
        let Some(elapsed) = self.clock.elapsed(timestamp) else {
            return Sample::Stale;
        };
        let t = (elapsed / 1000.0).min(self.end_s);
        let position = self.position(t);
        let delta = position - self.travelled;
        self.travelled = position;
        if t >= self.end_s {
            Sample::Finished(delta)
        } else {
            Sample::Running(delta)
        }
    }
}
