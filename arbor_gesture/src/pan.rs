// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pan recognition from raw pointer events.
//!
//! A pan starts once the first contact travels farther than the slop for its tool from where
//! it went down. From then on every move of that contact is reported as a delta, and lifting it
//! reports the release velocity, estimated over a short window of recent samples.
//!
//! Further contacts are tracked but do not drive the pan: the first contact down owns it until
//! it lifts or is cancelled.
//!
//! ```
//! use arbor_gesture::{PanEvent, PanRecognizer, PointerEvent, PointerId, PointerKind};
//! use kurbo::{Point, Vec2};
//!
//! let id = PointerId::new(1).unwrap();
//! let mut pan = PanRecognizer::default();
//! let event = |kind, y, t| PointerEvent::new(id, kind, Point::new(0.0, y), t);
//!
//! assert_eq!(pan.on_event(&event(PointerKind::Down, 100.0, 0)), None);
//! // Within the slop nothing happens yet.
//! assert_eq!(pan.on_event(&event(PointerKind::Move, 96.0, 8)), None);
//! assert!(matches!(pan.on_event(&event(PointerKind::Move, 80.0, 16)), Some(PanEvent::Start { .. })));
//! assert!(matches!(
//!     pan.on_event(&event(PointerKind::Move, 70.0, 24)),
//!     Some(PanEvent::Update { delta, .. }) if delta == Vec2::new(0.0, -10.0)
//! ));
//! assert!(matches!(pan.on_event(&event(PointerKind::Up, 60.0, 32)), Some(PanEvent::End { .. })));
//! ```

use std::collections::BTreeMap;

use kurbo::{Point, Vec2};
use smallvec::SmallVec;

use crate::pointer::{PointerEvent, PointerId, PointerKind, ToolType};

/// Thresholds of a [`PanRecognizer`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanConfig {
    /// Distance a finger or pen must travel before a pan starts.
    pub touch_slop: f64,
    /// Distance a mouse must travel before a pan starts.
    pub mouse_slop: f64,
    /// Age of the oldest sample used for the release velocity.
    pub velocity_window_ms: u64,
    /// Upper bound on the magnitude of the release velocity, in units per second.
    pub max_velocity: f64,
}

impl Default for PanConfig {
    fn default() -> Self {
        Self {
            touch_slop: 8.0,
            mouse_slop: 1.0,
            velocity_window_ms: 100,
            max_velocity: 8000.0,
        }
    }
}

impl PanConfig {
    /// Replaces out-of-range values with their defaults.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        let non_negative = |v: f64, fallback: f64| if v.is_finite() { v.max(0.0) } else { fallback };
        Self {
            touch_slop: non_negative(self.touch_slop, d.touch_slop),
            mouse_slop: non_negative(self.mouse_slop, d.mouse_slop),
            velocity_window_ms: if self.velocity_window_ms == 0 {
                d.velocity_window_ms
            } else {
                self.velocity_window_ms
            },
            max_velocity: if self.max_velocity.is_finite() && self.max_velocity > 0.0 {
                self.max_velocity
            } else {
                d.max_velocity
            },
        }
    }

    fn slop(&self, tool: ToolType) -> f64 {
        match tool {
            ToolType::Mouse => self.mouse_slop,
            _ => self.touch_slop,
        }
    }
}

/// What a pointer event meant for the pan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PanEvent {
    /// The driving contact left the slop.
    Start {
        /// Position where the pan started.
        position: Point,
        /// Tool of the driving contact.
        tool: ToolType,
    },
    /// The driving contact moved.
    Update {
        /// Movement since the previous start or update.
        delta: Vec2,
        /// Current position.
        position: Point,
        /// Current pressure.
        pressure: f64,
    },
    /// The driving contact lifted.
    End {
        /// Release velocity in units per second.
        velocity: Vec2,
    },
    /// The driving contact was cancelled.
    Cancel,
}

#[derive(Clone, Copy, Debug)]
struct Contact {
    down: Point,
    tool: ToolType,
}

/// Turns pointer events into pan start, update, and end events.
#[derive(Clone, Debug, Default)]
pub struct PanRecognizer {
    config: PanConfig,
    contacts: BTreeMap<PointerId, Contact>,
    driver: Option<PointerId>,
    panning: bool,
    last: Point,
    samples: SmallVec<[(u64, Point); 8]>,
}

impl PanRecognizer {
    /// A recognizer with `config`.
    #[must_use]
    pub fn new(config: PanConfig) -> Self {
        Self {
            config: config.sanitized(),
            ..Self::default()
        }
    }

    /// Current thresholds.
    #[must_use]
    pub fn config(&self) -> &PanConfig {
        &self.config
    }

    /// Replaces the thresholds. A pan in progress keeps going.
    pub fn set_config(&mut self, config: PanConfig) {
        self.config = config.sanitized();
    }

    /// Returns `true` between a pan start and its end or cancel.
    #[must_use]
    pub fn is_panning(&self) -> bool {
        self.panning
    }

    /// Number of contacts currently down.
    #[must_use]
    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    /// Processes one pointer event.
    pub fn on_event(&mut self, event: &PointerEvent) -> Option<PanEvent> {
        match event.kind {
            PointerKind::Down => {
                self.contacts.insert(
                    event.id,
                    Contact {
                        down: event.position,
                        tool: event.tool,
                    },
                );
                if self.driver.is_none() {
                    self.driver = Some(event.id);
                    self.panning = false;
                    self.last = event.position;
                    self.samples.clear();
                    self.record(event.timestamp_ms, event.position);
                }
                None
            }
            PointerKind::Move => {
                if self.driver != Some(event.id) {
                    return None;
                }
                let contact = *self.contacts.get(&event.id)?;
                self.record(event.timestamp_ms, event.position);
                if !self.panning {
                    if (event.position - contact.down).hypot() <= self.config.slop(contact.tool) {
                        return None;
                    }
                    self.panning = true;
                    self.last = event.position;
                    tracing::trace!(pointer = event.id.get(), "pan start");
                    return Some(PanEvent::Start {
                        position: event.position,
                        tool: contact.tool,
                    });
                }
                let delta = event.position - self.last;
                self.last = event.position;
                Some(PanEvent::Update {
                    delta,
                    position: event.position,
                    pressure: event.pressure,
                })
            }
            PointerKind::Up => {
                self.contacts.remove(&event.id);
                if self.driver != Some(event.id) {
                    return None;
                }
                self.record(event.timestamp_ms, event.position);
                self.driver = None;
                if !core::mem::take(&mut self.panning) {
                    return None;
                }
                let velocity = self.velocity();
                tracing::trace!(?velocity, "pan end");
                Some(PanEvent::End { velocity })
            }
            PointerKind::Cancel => {
                self.contacts.remove(&event.id);
                if self.driver != Some(event.id) {
                    return None;
                }
                self.driver = None;
                self.samples.clear();
                core::mem::take(&mut self.panning).then_some(PanEvent::Cancel)
            }
        }
    }

    fn record(&mut self, timestamp_ms: u64, position: Point) {
        if let Some((last, _)) = self.samples.last()
            && timestamp_ms < *last
        {
            return;
        }
        self.samples.push((timestamp_ms, position));
        let window = self.config.velocity_window_ms;
        self.samples
            .retain(|(t, _)| t.saturating_add(window) >= timestamp_ms);
    }

    /// Velocity over the sample window, in units per second.
    fn velocity(&self) -> Vec2 {
        let (Some((t0, p0)), Some((t1, p1))) = (self.samples.first(), self.samples.last()) else {
            return Vec2::ZERO;
        };
        if t1 <= t0 {
            return Vec2::ZERO;
        }
        #[allow(
            clippy::cast_precision_loss,
            reason = "Sample windows are a few hundred milliseconds."
        )]
        let millis = (t1 - t0) as f64;
        let velocity = (*p1 - *p0) * 1000.0 / millis;
        let speed = velocity.hypot();
        if speed > self.config.max_velocity {
            velocity * (self.config.max_velocity / speed)
        } else {
            velocity
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PanConfig, PanEvent, PanRecognizer};
    use crate::pointer::{PointerEvent, PointerId, PointerKind, ToolType};
    use kurbo::{Point, Vec2};

    fn id(n: u64) -> PointerId {
        PointerId::new(n).unwrap()
    }

    fn at(n: u64, kind: PointerKind, y: f64, t: u64) -> PointerEvent {
        PointerEvent::new(id(n), kind, Point::new(10.0, y), t)
    }

    #[test]
    fn release_velocity_covers_the_recent_window() {
        let mut pan = PanRecognizer::default();
        pan.on_event(&at(1, PointerKind::Down, 0.0, 0));
        for step in 1..5_u32 {
            pan.on_event(&at(1, PointerKind::Move, -10.0 * f64::from(step), u64::from(step) * 10));
        }
        let end = pan.on_event(&at(1, PointerKind::Up, -50.0, 50));
        assert_eq!(
            end,
            Some(PanEvent::End {
                velocity: Vec2::new(0.0, -1000.0)
            })
        );
        assert!(!pan.is_panning());
    }

    #[test]
    fn old_samples_fall_out_of_the_window() {
        let mut pan = PanRecognizer::default();
        pan.on_event(&at(1, PointerKind::Down, 0.0, 0));
        pan.on_event(&at(1, PointerKind::Move, -100.0, 10));
        // Held still for a long time before lifting.
        pan.on_event(&at(1, PointerKind::Move, -100.0, 1000));
        let end = pan.on_event(&at(1, PointerKind::Up, -100.0, 1050));
        assert_eq!(end, Some(PanEvent::End { velocity: Vec2::ZERO }));
    }

    #[test]
    fn only_the_first_contact_drives() {
        let mut pan = PanRecognizer::default();
        pan.on_event(&at(1, PointerKind::Down, 0.0, 0));
        pan.on_event(&at(2, PointerKind::Down, 0.0, 5));
        assert_eq!(pan.contact_count(), 2);
        assert_eq!(pan.on_event(&at(2, PointerKind::Move, 200.0, 10)), None);
        assert_eq!(pan.on_event(&at(2, PointerKind::Up, 200.0, 20)), None);
        assert!(matches!(
            pan.on_event(&at(1, PointerKind::Move, 20.0, 30)),
            Some(PanEvent::Start { .. })
        ));
        assert_eq!(pan.on_event(&at(1, PointerKind::Cancel, 20.0, 40)), Some(PanEvent::Cancel));
        assert_eq!(pan.contact_count(), 0);
    }

    #[test]
    fn taps_never_start_a_pan() {
        let mut pan = PanRecognizer::default();
        pan.on_event(&at(1, PointerKind::Down, 0.0, 0));
        assert_eq!(pan.on_event(&at(1, PointerKind::Move, 3.0, 10)), None);
        assert_eq!(pan.on_event(&at(1, PointerKind::Up, 3.0, 20)), None);
        assert_eq!(pan.on_event(&at(1, PointerKind::Cancel, 3.0, 30)), None);
    }

    #[test]
    fn mouse_slop_is_separate_and_velocity_is_capped() {
        let mut pan = PanRecognizer::new(PanConfig {
            max_velocity: 500.0,
            ..PanConfig::default()
        });
        let mouse = |kind, y, t| at(1, kind, y, t).with_tool(ToolType::Mouse);
        pan.on_event(&mouse(PointerKind::Down, 0.0, 0));
        assert!(matches!(
            pan.on_event(&mouse(PointerKind::Move, 3.0, 10)),
            Some(PanEvent::Start { tool: ToolType::Mouse, .. })
        ));
        let Some(PanEvent::End { velocity }) = pan.on_event(&mouse(PointerKind::Up, 300.0, 20)) else {
            panic!("pan did not end");
        };
        assert!((velocity.hypot() - 500.0).abs() < 1e-9);
    }
}
