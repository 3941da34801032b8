// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paging state machine for swiper nodes.

use core::fmt;

use arbor_layout::SwiperMetrics;
use arbor_virtual::near_zero;

use crate::animation::{Sample, Tween};
use crate::curve::Curve;

/// Tuning of a [`SwiperController`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwiperConfig {
    /// Release velocity, in units per second, a drag must exceed to turn a page.
    pub min_turn_velocity: f64,
    /// Drag distance a release must exceed to turn a page.
    pub min_drag_distance: f64,
    /// Duration of the settle animation.
    pub settle_duration_ms: f64,
    /// Curve of the settle animation, applied after an ease-out remap.
    pub curve: Curve,
    /// Whether pages advance on their own while idle.
    pub autoplay: bool,
    /// Idle time between autoplay page turns.
    pub interval_ms: f64,
}

impl Default for SwiperConfig {
    fn default() -> Self {
        Self {
            min_turn_velocity: 780.0,
            min_drag_distance: 25.0,
            settle_duration_ms: 400.0,
            curve: Curve::Linear,
            autoplay: false,
            interval_ms: 3000.0,
        }
    }
}

impl SwiperConfig {
    /// Replaces out-of-range values with their defaults.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        let non_negative = |v: f64, fallback: f64| if v.is_finite() { v.max(0.0) } else { fallback };
        Self {
            min_turn_velocity: non_negative(self.min_turn_velocity, d.min_turn_velocity),
            min_drag_distance: non_negative(self.min_drag_distance, d.min_drag_distance),
            settle_duration_ms: non_negative(self.settle_duration_ms, d.settle_duration_ms),
            curve: self.curve,
            autoplay: self.autoplay,
            interval_ms: if self.interval_ms.is_finite() && self.interval_ms > 0.0 {
                self.interval_ms
            } else {
                d.interval_ms
            },
        }
    }
}

/// Where a swiper is in its paging cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SwiperState {
    /// Resting on a page.
    #[default]
    Idle,
    /// Following a drag.
    Dragging,
    /// Animating to a page after a release or a programmatic change.
    Settling,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Settle {
    tween: Tween,
    target: usize,
}

#[derive(Default)]
struct Callbacks {
    change: Option<Box<dyn FnMut(usize)>>,
    animation_start: Option<Box<dyn FnMut(usize, usize)>>,
    animation_end: Option<Box<dyn FnMut(usize)>>,
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("change", &self.change.is_some())
            .field("animation_start", &self.animation_start.is_some())
            .field("animation_end", &self.animation_end.is_some())
            .finish()
    }
}

/// Drives the current page and drag offset of a swiper.
///
/// The controller owns paging: drags move the offset one to one, a release settles to a page,
/// and autoplay turns pages while idle. A release turns a page only when the velocity exceeds
/// `min_turn_velocity` *and* the offset exceeds `min_drag_distance`; a positive offset turns to
/// the previous page, a negative one to the next.
///
/// Feed it [`SwiperMetrics`] after each flush and push [`SwiperController::position`] back into
/// the layout after input or a tick.
///
/// ```
/// use arbor_layout::SwiperMetrics;
/// use arbor_scroll::SwiperController;
///
/// let mut swiper = SwiperController::default();
/// swiper.sync(SwiperMetrics { item_extent: 300.0, item_count: 4, display_count: 1, ..Default::default() });
/// swiper.on_drag_start();
/// swiper.on_drag_update(-120.0);
/// swiper.on_drag_end(-2000.0);
/// let mut frame = 0.0;
/// while swiper.is_settling() {
///     swiper.tick(frame);
///     frame += 16.0;
/// }
/// assert_eq!(swiper.position(), (1, 0.0));
/// ```
#[derive(Debug, Default)]
pub struct SwiperController {
    config: SwiperConfig,
    state: SwiperState,
    current_index: usize,
    current_offset: f64,
    item_count: usize,
    item_extent: f64,
    display_count: usize,
    loop_enabled: bool,
    settle: Option<Settle>,
    idle_ms: f64,
    last_frame: Option<f64>,
    callbacks: Callbacks,
}

impl SwiperController {
    /// A controller with `config`.
    #[must_use]
    pub fn new(config: SwiperConfig) -> Self {
        Self {
            config: config.sanitized(),
            ..Self::default()
        }
    }

    /// Replaces the configuration.
    pub fn set_config(&mut self, config: SwiperConfig) {
        self.config = config.sanitized();
        self.idle_ms = 0.0;
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &SwiperConfig {
        &self.config
    }

    /// Paging state.
    #[must_use]
    pub fn state(&self) -> SwiperState {
        self.state
    }

    /// Returns `true` while a settle animation runs.
    #[must_use]
    pub fn is_settling(&self) -> bool {
        self.settle.is_some()
    }

    /// Current page.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Current signed drag offset.
    #[must_use]
    pub fn current_offset(&self) -> f64 {
        self.current_offset
    }

    /// Page and offset to push into the layout.
    #[must_use]
    pub fn position(&self) -> (usize, f64) {
        (self.current_index, self.current_offset)
    }

    /// Sets the callback fired with the new index whenever the current page changes.
    pub fn set_on_change(&mut self, callback: impl FnMut(usize) + 'static) {
        self.callbacks.change = Some(Box::new(callback));
    }

    /// Sets the callback fired with the current and target index when a settle starts.
    pub fn set_on_animation_start(&mut self, callback: impl FnMut(usize, usize) + 'static) {
        self.callbacks.animation_start = Some(Box::new(callback));
    }

    /// Sets the callback fired with the resting index when a settle ends or is interrupted.
    pub fn set_on_animation_end(&mut self, callback: impl FnMut(usize) + 'static) {
        self.callbacks.animation_end = Some(Box::new(callback));
    }

    /// Adopts page count, extent, and loop mode from layout.
    pub fn sync(&mut self, metrics: SwiperMetrics) {
        self.item_count = metrics.item_count;
        self.item_extent = if metrics.item_extent.is_finite() {
            metrics.item_extent.max(0.0)
        } else {
            0.0
        };
        self.display_count = metrics.display_count.max(1);
        self.loop_enabled = metrics.loop_enabled;
        if self.state == SwiperState::Idle && metrics.current_index != self.current_index {
            self.current_index = metrics.current_index;
        }
        if self.current_index > self.max_index() {
            self.current_index = self.max_index();
        }
    }

    fn max_index(&self) -> usize {
        if self.loop_enabled {
            self.item_count.saturating_sub(1)
        } else {
            self.item_count.saturating_sub(self.display_count)
        }
    }

    /// The page `step` pages away from `index`, wrapping when looping.
    fn neighbor(&self, index: usize, step: isize) -> Option<usize> {
        if self.item_count == 0 {
            return None;
        }
        if self.loop_enabled {
            let count = self.item_count as isize;
            return usize::try_from((index as isize + step).rem_euclid(count)).ok();
        }
        index
            .checked_add_signed(step)
            .filter(|target| *target <= self.max_index())
    }

    fn set_index(&mut self, index: usize) {
        if index != self.current_index {
            self.current_index = index;
            if let Some(change) = self.callbacks.change.as_mut() {
                change(index);
            }
        }
    }

    fn interrupt_settle(&mut self) {
        if self.settle.take().is_some()
            && let Some(end) = self.callbacks.animation_end.as_mut()
        {
            end(self.current_index);
        }
    }

    /// Starts a drag. Interrupts a settle where it is and pauses autoplay.
    pub fn on_drag_start(&mut self) {
        self.interrupt_settle();
        self.idle_ms = 0.0;
        self.state = SwiperState::Dragging;
    }

    /// Moves the pages by `delta`. Returns `true` if the position changed.
    ///
    /// Dragging a whole page or more carries the current index along. Without looping the
    /// offset cannot pull past the first or last page.
    pub fn on_drag_update(&mut self, delta: f64) -> bool {
        if self.state != SwiperState::Dragging {
            self.on_drag_start();
        }
        if !delta.is_finite() || self.item_count == 0 || near_zero(self.item_extent) {
            return false;
        }
        let before = self.position();
        let mut offset = self.current_offset + delta;
        let mut index = self.current_index;
        while offset <= -self.item_extent {
            let Some(next) = self.neighbor(index, 1) else {
                break;
            };
            index = next;
            offset += self.item_extent;
        }
        while offset >= self.item_extent {
            let Some(previous) = self.neighbor(index, -1) else {
                break;
            };
            index = previous;
            offset -= self.item_extent;
        }
        if (offset > 0.0 && self.neighbor(index, -1).is_none())
            || (offset < 0.0 && self.neighbor(index, 1).is_none())
        {
            offset = 0.0;
        }
        self.current_offset = offset;
        self.set_index(index);
        self.position() != before
    }

    /// Ends a drag with a release `velocity` in offset units per second and settles.
    pub fn on_drag_end(&mut self, velocity: f64) {
        let velocity = if velocity.is_finite() { velocity } else { 0.0 };
        let offset = self.current_offset;
        let turns = velocity.abs() > self.config.min_turn_velocity
            && offset.abs() > self.config.min_drag_distance;
        let step = if offset > 0.0 { -1 } else { 1 };
        let target = turns
            .then(|| self.neighbor(self.current_index, step))
            .flatten();
        tracing::trace!(velocity, offset, ?target, "swiper release");
        match target {
            Some(target) => self.settle_to(target, -(step as f64) * self.item_extent),
            None => self.settle_to(self.current_index, 0.0),
        }
    }

    fn settle_to(&mut self, target: usize, to_offset: f64) {
        self.interrupt_settle();
        self.idle_ms = 0.0;
        if target == self.current_index && near_zero(self.current_offset - to_offset) {
            self.current_offset = 0.0;
            self.state = SwiperState::Idle;
            return;
        }
        if let Some(start) = self.callbacks.animation_start.as_mut() {
            start(self.current_index, target);
        }
        let tween = Tween::new(
            self.current_offset,
            to_offset,
            self.config.settle_duration_ms,
            self.config.curve,
        )
        .with_ease_out_remap();
        self.settle = Some(Settle { tween, target });
        self.state = SwiperState::Settling;
    }

    fn finish_settle(&mut self, target: usize) {
        self.settle = None;
        self.current_offset = 0.0;
        self.state = SwiperState::Idle;
        self.idle_ms = 0.0;
        self.set_index(target);
        if let Some(end) = self.callbacks.animation_end.as_mut() {
            end(target);
        }
    }

    /// Animates to the next page. Returns `false` at the last page without looping, or while
    /// a drag or settle is in progress.
    pub fn show_next(&mut self) -> bool {
        self.show_neighbor(1)
    }

    /// Animates to the previous page. Returns `false` at the first page without looping, or
    /// while a drag or settle is in progress.
    pub fn show_previous(&mut self) -> bool {
        self.show_neighbor(-1)
    }

    fn show_neighbor(&mut self, step: isize) -> bool {
        if self.state != SwiperState::Idle || near_zero(self.item_extent) {
            return false;
        }
        let Some(target) = self.neighbor(self.current_index, step) else {
            return false;
        };
        self.settle_to(target, -(step as f64) * self.item_extent);
        true
    }

    /// Moves to `index`, clamped to the valid pages. Animated moves cover every page between.
    pub fn change_index(&mut self, index: usize, animated: bool) {
        if self.item_count == 0 {
            return;
        }
        let index = index.min(self.max_index());
        if !animated || near_zero(self.item_extent) {
            self.interrupt_settle();
            self.current_offset = 0.0;
            self.state = SwiperState::Idle;
            self.set_index(index);
            return;
        }
        let pages = index as f64 - self.current_index as f64;
        self.settle_to(index, -pages * self.item_extent);
    }

    /// Advances the settle animation and autoplay to the frame at `timestamp_ms`.
    ///
    /// Returns `true` if the position changed. Frames not later than the previous one are
    /// ignored.
    pub fn tick(&mut self, timestamp_ms: f64) -> bool {
        if !timestamp_ms.is_finite() || self.last_frame.is_some_and(|last| timestamp_ms <= last) {
            return false;
        }
        let elapsed = self.last_frame.map_or(0.0, |last| timestamp_ms - last);
        self.last_frame = Some(timestamp_ms);

        if let Some(mut settle) = self.settle {
            return match settle.tween.sample(timestamp_ms) {
                Sample::Stale => false,
                Sample::Running(value) => {
                    self.settle = Some(settle);
                    let moved = value != self.current_offset;
                    self.current_offset = value;
                    moved
                }
                Sample::Finished(_) => {
                    let before = self.position();
                    self.finish_settle(settle.target);
                    self.position() != before
                }
            };
        }

        if !self.config.autoplay
            || self.state != SwiperState::Idle
            || self.item_count <= self.display_count
        {
            return false;
        }
        self.idle_ms += elapsed;
        if self.idle_ms < self.config.interval_ms {
            return false;
        }
        self.idle_ms = 0.0;
        if self.show_next() {
            tracing::trace!(from = self.current_index, "autoplay turn");
        }
        false
    }
}
