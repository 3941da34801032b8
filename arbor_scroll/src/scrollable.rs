// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scroll offset controller.

use core::fmt;

use arbor_layout::{Axis, ScrollMetrics};
use arbor_virtual::near_zero;

use crate::animation::{Fling, Sample, Tween};
use crate::curve::Curve;
use crate::edge::EdgeTracker;
use crate::physics::{EdgeEffect, ScrollPhysics, adjust_offset};

/// What caused an offset change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollSource {
    /// A finger or pointer drag.
    Drag,
    /// The decay after a drag was released with velocity.
    Fling,
    /// A programmatic animated scroll.
    Animation,
    /// The return from an overscroll, or a paging snap.
    SpringBack,
    /// A programmatic instant scroll.
    Jump,
    /// Dragging the scrollbar.
    ScrollBar,
    /// A rotary input such as a crown or wheel.
    Rotation,
    /// An accessibility action.
    Accessibility,
}

impl ScrollSource {
    /// Returns `true` if offsets from this source are always clamped into bounds.
    #[must_use]
    pub fn restricts_boundary(self) -> bool {
        matches!(
            self,
            Self::Animation | Self::Jump | Self::ScrollBar | Self::Rotation | Self::Accessibility
        )
    }
}

/// Coarse motion state, for scroll start and stop notifications.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScrollState {
    /// At rest.
    #[default]
    Idle,
    /// Following a drag.
    Dragging,
    /// Decelerating after a release.
    Flinging,
    /// Running a timed animation.
    Animating,
}

/// A scroll boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollEdge {
    /// Offset 0.
    Start,
    /// The end of the scrollable distance.
    End,
}

/// Accessibility actions a scrollable responds to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessibilityAction {
    /// Move one page toward the end.
    ScrollForward,
    /// Move one page toward the start.
    ScrollBackward,
}

type WillScroll = Box<dyn FnMut(f64, ScrollState, ScrollSource) -> f64>;
type DidScroll = Box<dyn FnMut(f64, f64)>;
type Notify = Box<dyn FnMut()>;

#[derive(Default)]
struct Callbacks {
    will_scroll: Option<WillScroll>,
    did_scroll: Option<DidScroll>,
    reach_start: Option<Notify>,
    reach_end: Option<Notify>,
    scroll_start: Option<Notify>,
    scroll_stop: Option<Notify>,
    animation_stop: Option<Notify>,
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("will_scroll", &self.will_scroll.is_some())
            .field("did_scroll", &self.did_scroll.is_some())
            .field("reach_start", &self.reach_start.is_some())
            .field("reach_end", &self.reach_end.is_some())
            .field("scroll_start", &self.scroll_start.is_some())
            .field("scroll_stop", &self.scroll_stop.is_some())
            .field("animation_stop", &self.animation_stop.is_some())
            .finish()
    }
}

fn notify(callback: &mut Option<Notify>) {
    if let Some(callback) = callback.as_mut() {
        callback();
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Motion {
    Tween(Tween, ScrollSource),
    Fling(Fling),
}

/// Scroll offset of one scrolling container, with its physics.
///
/// The offset is signed: 0 at the start and negative when scrolled toward the end, so the
/// valid range is `[-scrollable_distance, 0]`. With [`Scrollable::set_reversed`] the range is
/// mirrored to `[0, scrollable_distance]`. *Positions* used by the programmatic API are
/// distances from the start and are the same in both orientations.
///
/// All mutation goes through drag input, [`Scrollable::tick`], and the programmatic scroll
/// methods. Animations advance only when ticked with frame timestamps.
///
/// ```
/// use arbor_scroll::Scrollable;
/// use arbor_layout::Axis;
///
/// let mut scroll = Scrollable::new(Axis::Vertical);
/// scroll.set_metrics(1000.0, 200.0);
/// assert_eq!(scroll.scrollable_distance(), 800.0);
///
/// scroll.jump_to_position(300.0);
/// assert_eq!(scroll.current_offset(), -300.0);
///
/// // Programmatic jumps are clamped into range.
/// scroll.jump_to_position(5000.0);
/// assert_eq!(scroll.current_offset(), -800.0);
/// ```
#[derive(Debug)]
pub struct Scrollable {
    axis: Axis,
    physics: ScrollPhysics,
    edge_effect: EdgeEffect,
    reversed: bool,
    scroll_enabled: bool,
    paging: bool,
    current_offset: f64,
    last_offset: f64,
    scrollable_distance: f64,
    viewport_length: f64,
    content_extent: f64,
    out_of_boundary: f64,
    edges: EdgeTracker,
    state: ScrollState,
    motion: Option<Motion>,
    drag_start_offset: f64,
    callbacks: Callbacks,
}

impl Scrollable {
    /// An empty scrollable along `axis` with default physics and a spring edge.
    #[must_use]
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            physics: ScrollPhysics::default(),
            edge_effect: EdgeEffect::default(),
            reversed: false,
            scroll_enabled: true,
            paging: false,
            current_offset: 0.0,
            last_offset: 0.0,
            scrollable_distance: 0.0,
            viewport_length: 0.0,
            content_extent: 0.0,
            out_of_boundary: 0.0,
            edges: EdgeTracker::default(),
            state: ScrollState::Idle,
            motion: None,
            drag_start_offset: 0.0,
            callbacks: Callbacks::default(),
        }
    }

    /// Replaces the physics.
    #[must_use]
    pub fn with_physics(mut self, physics: ScrollPhysics) -> Self {
        self.set_physics(physics);
        self
    }

    /// Replaces the physics. Out-of-range values are sanitized.
    pub fn set_physics(&mut self, physics: ScrollPhysics) {
        self.physics = physics.sanitized();
    }

    /// Current physics.
    #[must_use]
    pub fn physics(&self) -> &ScrollPhysics {
        &self.physics
    }

    /// Sets the boundary behavior.
    pub fn set_edge_effect(&mut self, edge_effect: EdgeEffect) {
        self.edge_effect = edge_effect;
    }

    /// Current boundary behavior.
    #[must_use]
    pub fn edge_effect(&self) -> EdgeEffect {
        self.edge_effect
    }

    /// Mirrors the valid offset range to `[0, scrollable_distance]`.
    pub fn set_reversed(&mut self, reversed: bool) {
        if self.reversed != reversed {
            self.reversed = reversed;
            self.current_offset = -self.current_offset;
            self.last_offset = -self.last_offset;
            self.edges.reset(self.current_offset);
        }
    }

    /// Enables or disables gesture scrolling. Programmatic scrolling is unaffected.
    pub fn set_scroll_enabled(&mut self, enabled: bool) {
        self.scroll_enabled = enabled;
    }

    /// Enables snapping to whole viewport pages on release.
    pub fn set_enable_paging(&mut self, paging: bool) {
        self.paging = paging;
    }

    /// Scroll axis.
    #[must_use]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Current signed offset.
    #[must_use]
    pub fn current_offset(&self) -> f64 {
        self.current_offset
    }

    /// Offset before the last change.
    #[must_use]
    pub fn last_offset(&self) -> f64 {
        self.last_offset
    }

    /// Distance from the start, positive toward the end.
    #[must_use]
    pub fn current_position(&self) -> f64 {
        self.position_of(self.current_offset)
    }

    /// Offset in the layout convention (0 at the start, negative toward the end).
    #[must_use]
    pub fn layout_offset(&self) -> f64 {
        -self.current_position()
    }

    /// Content extent minus viewport length, never negative.
    #[must_use]
    pub fn scrollable_distance(&self) -> f64 {
        self.scrollable_distance
    }

    /// Viewport length along the axis.
    #[must_use]
    pub fn viewport_length(&self) -> f64 {
        self.viewport_length
    }

    /// Content extent along the axis.
    #[must_use]
    pub fn content_extent(&self) -> f64 {
        self.content_extent
    }

    /// Motion state.
    #[must_use]
    pub fn state(&self) -> ScrollState {
        self.state
    }

    /// Returns `true` while an animation or fling is running.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.motion.is_some()
    }

    /// Returns `true` if gesture scrolling is enabled.
    #[must_use]
    pub fn is_scroll_enabled(&self) -> bool {
        self.scroll_enabled
    }

    /// Returns `true` if gesture scrolling is enabled and there is somewhere to scroll.
    #[must_use]
    pub fn is_scrollable(&self) -> bool {
        self.scroll_enabled && self.scrollable_distance > 0.0
    }

    /// Overscroll recorded by the last validation, for a scrollbar or fade indicator.
    ///
    /// Signed like the offset: positive past the upper bound of the range, negative past
    /// the lower bound.
    #[must_use]
    pub fn out_of_boundary(&self) -> f64 {
        self.out_of_boundary
    }

    /// How far the current offset lies outside the valid range, signed like the offset.
    #[must_use]
    pub fn overscroll(&self) -> f64 {
        let (lo, hi) = self.bounds();
        self.current_offset - self.current_offset.clamp(lo, hi)
    }

    /// The part of `delta` that moves the offset without leaving the valid range.
    ///
    /// Zero when already at or past the boundary in the direction of `delta`.
    #[must_use]
    pub fn available_delta(&self, delta: f64) -> f64 {
        if !delta.is_finite() {
            return 0.0;
        }
        let (lo, hi) = self.bounds();
        let room = (self.current_offset + delta).clamp(lo, hi) - self.current_offset;
        if room.signum() == delta.signum() { room } else { 0.0 }
    }

    /// Returns `true` at or before the start boundary.
    #[must_use]
    pub fn is_at_start(&self) -> bool {
        self.current_position() <= 0.0
    }

    /// Returns `true` at or past the end boundary.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.current_position() >= self.scrollable_distance
    }

    /// Updates the content and viewport extents.
    ///
    /// When idle and the shrunk range no longer contains the offset, the offset is clamped.
    /// The first call reports the edges the offset already rests on, the way a freshly laid
    /// out list reports that it starts at the top.
    pub fn set_metrics(&mut self, content_extent: f64, viewport_length: f64) {
        let sane = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        self.content_extent = sane(content_extent);
        self.viewport_length = sane(viewport_length);
        self.scrollable_distance = (self.content_extent - self.viewport_length).max(0.0);
        if self.state == ScrollState::Idle && !near_zero(self.overscroll()) {
            let (lo, hi) = self.bounds();
            tracing::debug!(
                offset = self.current_offset,
                distance = self.scrollable_distance,
                "content shrank, clamping offset"
            );
            self.last_offset = self.current_offset;
            self.current_offset = self.current_offset.clamp(lo, hi);
            self.edges.reset(self.current_offset);
        }
        if !self.edges.has_history() {
            self.report_edges();
        }
    }

    /// Adopts the extents, and any offset the layout resolved itself, from layout metrics.
    pub fn sync_from_layout(&mut self, metrics: &ScrollMetrics) {
        self.set_metrics(metrics.content_extent, metrics.viewport_length);
        let offset = self.offset_of(-metrics.current_offset);
        if self.state == ScrollState::Idle
            && self.motion.is_none()
            && offset != self.current_offset
        {
            self.last_offset = self.current_offset;
            self.current_offset = offset;
            self.edges.reset(offset);
        }
    }

    /// Sets the will-scroll callback. It receives each delta and may return a different one.
    pub fn set_on_will_scroll(
        &mut self,
        callback: impl FnMut(f64, ScrollState, ScrollSource) -> f64 + 'static,
    ) {
        self.callbacks.will_scroll = Some(Box::new(callback));
    }

    /// Sets the did-scroll callback. It receives the applied delta and the new offset.
    pub fn set_on_did_scroll(&mut self, callback: impl FnMut(f64, f64) + 'static) {
        self.callbacks.did_scroll = Some(Box::new(callback));
    }

    /// Sets the callback fired once each time the start boundary is reached.
    pub fn set_on_reach_start(&mut self, callback: impl FnMut() + 'static) {
        self.callbacks.reach_start = Some(Box::new(callback));
    }

    /// Sets the callback fired once each time the end boundary is reached.
    pub fn set_on_reach_end(&mut self, callback: impl FnMut() + 'static) {
        self.callbacks.reach_end = Some(Box::new(callback));
    }

    /// Sets the callback fired when scrolling starts from rest.
    pub fn set_on_scroll_start(&mut self, callback: impl FnMut() + 'static) {
        self.callbacks.scroll_start = Some(Box::new(callback));
    }

    /// Sets the callback fired when scrolling comes to rest.
    pub fn set_on_scroll_stop(&mut self, callback: impl FnMut() + 'static) {
        self.callbacks.scroll_stop = Some(Box::new(callback));
    }

    /// Sets the listener fired once whenever an animation or fling ends or is stopped.
    pub fn set_on_animation_stop(&mut self, callback: impl FnMut() + 'static) {
        self.callbacks.animation_stop = Some(Box::new(callback));
    }

    fn bounds(&self) -> (f64, f64) {
        if self.reversed {
            (0.0, self.scrollable_distance)
        } else {
            (-self.scrollable_distance, 0.0)
        }
    }

    fn end_boundary(&self) -> f64 {
        if self.reversed {
            self.scrollable_distance
        } else {
            -self.scrollable_distance
        }
    }

    fn position_of(&self, offset: f64) -> f64 {
        if self.reversed { offset } else { -offset }
    }

    fn offset_of(&self, position: f64) -> f64 {
        if self.reversed { position } else { -position }
    }

    fn set_state(&mut self, state: ScrollState) {
        let previous = core::mem::replace(&mut self.state, state);
        if previous == ScrollState::Idle && state != ScrollState::Idle {
            notify(&mut self.callbacks.scroll_start);
        } else if previous != ScrollState::Idle && state == ScrollState::Idle {
            notify(&mut self.callbacks.scroll_stop);
        }
    }

    /// Applies `delta` to the offset.
    ///
    /// The will-scroll callback may rewrite the delta first. Drag and fling deltas that push
    /// further into an overscroll are resisted by friction under [`EdgeEffect::Spring`]. The
    /// result is validated, and did-scroll and edge callbacks fire if the offset changed.
    /// Returns `true` if it did.
    pub fn update_offset(&mut self, delta: f64, source: ScrollSource) -> bool {
        self.apply_delta(delta, None, source)
    }

    /// Moves toward `target`, landing on it exactly unless the delta was rewritten.
    fn move_to(&mut self, target: f64, source: ScrollSource) -> bool {
        self.apply_delta(target - self.current_offset, Some(target), source)
    }

    fn apply_delta(&mut self, requested: f64, target: Option<f64>, source: ScrollSource) -> bool {
        if matches!(source, ScrollSource::Drag | ScrollSource::Fling) && !self.scroll_enabled {
            return false;
        }
        if !requested.is_finite() || near_zero(requested) {
            return false;
        }
        let mut delta = requested;
        if let Some(will_scroll) = self.callbacks.will_scroll.as_mut() {
            delta = will_scroll(delta, self.state, source);
            if !delta.is_finite() || near_zero(delta) {
                return false;
            }
        }
        if matches!(source, ScrollSource::Drag | ScrollSource::Fling)
            && self.edge_effect == EdgeEffect::Spring
        {
            delta = adjust_offset(
                delta,
                self.overscroll(),
                self.viewport_length,
                self.physics.friction_ratio,
            );
        }

        let before = self.current_offset;
        self.current_offset = match target {
            Some(target) if delta == requested => target,
            _ => before + delta,
        };
        self.validate_offset(source);
        let applied = self.current_offset - before;
        if applied == 0.0 {
            return false;
        }
        self.last_offset = before;
        if let Some(did_scroll) = self.callbacks.did_scroll.as_mut() {
            did_scroll(applied, self.current_offset);
        }
        self.report_edges();
        true
    }

    fn report_edges(&mut self) {
        let crossing = self.edges.update(self.current_offset, self.end_boundary());
        if crossing.start {
            notify(&mut self.callbacks.reach_start);
        }
        if crossing.end {
            notify(&mut self.callbacks.reach_end);
        }
    }

    /// Clamps or records the current overscroll according to `source` and the edge effect.
    ///
    /// Restricting sources, and edge effects other than spring, clamp the offset into range.
    /// Otherwise the offset is left as is and the overscroll is recorded for indicators.
    pub fn validate_offset(&mut self, source: ScrollSource) {
        let (lo, hi) = self.bounds();
        let past = self.overscroll();
        if source.restricts_boundary() || self.edge_effect != EdgeEffect::Spring {
            self.current_offset = self.current_offset.clamp(lo, hi);
            self.out_of_boundary = if self.edge_effect == EdgeEffect::Fade
                && !source.restricts_boundary()
                && !near_zero(past)
            {
                self.out_of_boundary + past
            } else {
                0.0
            };
        } else {
            self.out_of_boundary = past;
        }
    }

    /// Moves to `position` at once, stopping any running animation first.
    pub fn jump_to_position(&mut self, position: f64) -> bool {
        self.stop_animate();
        let target = self.offset_of(position);
        self.move_to(target, ScrollSource::Jump)
    }

    /// Scrolls to `position`, animated by distance when `smooth`.
    pub fn scroll_to(&mut self, position: f64, smooth: bool) -> bool {
        if smooth {
            self.animate_to(position, None, Curve::EaseOut)
        } else {
            self.jump_to_position(position)
        }
    }

    /// Scrolls by `distance`, positive toward the end.
    pub fn scroll_by(&mut self, distance: f64, smooth: bool) -> bool {
        let target = self.current_position() + distance;
        self.scroll_to(target, smooth)
    }

    /// Scrolls one viewport toward the end (`next`) or the start.
    pub fn scroll_page(&mut self, next: bool, smooth: bool) -> bool {
        let page = if next {
            self.viewport_length
        } else {
            -self.viewport_length
        };
        self.scroll_by(page, smooth)
    }

    /// Scrolls to a boundary.
    pub fn scroll_to_edge(&mut self, edge: ScrollEdge, smooth: bool) -> bool {
        let position = match edge {
            ScrollEdge::Start => 0.0,
            ScrollEdge::End => self.scrollable_distance,
        };
        self.scroll_to(position, smooth)
    }

    /// Starts an animation to `position`, clamped into range.
    ///
    /// Without an explicit duration, the duration is proportional to the distance at the
    /// physics' animate speed. A running animation is stopped first and its stop listener
    /// fires. Returns `false` if already there.
    pub fn animate_to(&mut self, position: f64, duration_ms: Option<f64>, curve: Curve) -> bool {
        self.stop_animate();
        if !position.is_finite() {
            return false;
        }
        let target = self.offset_of(position.clamp(0.0, self.scrollable_distance));
        let distance = target - self.current_offset;
        if near_zero(distance) {
            return false;
        }
        let duration = duration_ms.unwrap_or_else(|| self.physics.duration_for(distance));
        tracing::trace!(from = self.current_offset, to = target, duration, "animate scroll");
        let tween = Tween::new(self.current_offset, target, duration, curve);
        self.motion = Some(Motion::Tween(tween, ScrollSource::Animation));
        self.set_state(ScrollState::Animating);
        true
    }

    /// Stops a running animation or fling, firing its stop listener. No-op when idle.
    pub fn stop_animate(&mut self) {
        if self.cancel_motion() && self.state != ScrollState::Dragging {
            self.set_state(ScrollState::Idle);
        }
    }

    fn cancel_motion(&mut self) -> bool {
        if self.motion.take().is_none() {
            return false;
        }
        notify(&mut self.callbacks.animation_stop);
        true
    }

    fn finish_motion(&mut self) {
        self.cancel_motion();
        self.set_state(ScrollState::Idle);
    }

    /// Advances a running animation to the frame at `timestamp_ms`.
    ///
    /// Frames must arrive in order; a frame not later than the previous one is ignored.
    /// Returns `true` if the offset changed.
    pub fn tick(&mut self, timestamp_ms: f64) -> bool {
        let Some(motion) = self.motion else {
            return false;
        };
        match motion {
            Motion::Tween(mut tween, source) => {
                let sample = tween.sample(timestamp_ms);
                self.motion = Some(Motion::Tween(tween, source));
                match sample {
                    Sample::Stale => false,
                    Sample::Running(value) => self.move_to(value, source),
                    Sample::Finished(value) => {
                        let moved = self.move_to(value, source);
                        self.finish_motion();
                        moved
                    }
                }
            }
            Motion::Fling(mut fling) => {
                let sample = fling.sample(timestamp_ms);
                self.motion = Some(Motion::Fling(fling));
                let (delta, finished) = match sample {
                    Sample::Stale => return false,
                    Sample::Running(delta) => (delta, false),
                    Sample::Finished(delta) => (delta, true),
                };
                let before = self.current_offset;
                let moved = self.update_offset(delta, ScrollSource::Fling);
                let blocked = !near_zero(delta) && near_zero(self.current_offset - before);
                if !near_zero(self.overscroll()) {
                    self.cancel_motion();
                    self.spring_back();
                } else if finished || blocked {
                    self.finish_motion();
                }
                moved
            }
        }
    }

    /// Marks the start of a drag. Cancels any animation before deltas apply.
    pub fn on_drag_start(&mut self) {
        self.cancel_motion();
        self.drag_start_offset = self.current_offset;
        self.set_state(ScrollState::Dragging);
    }

    /// Applies a drag delta in offset space. Returns `true` if the offset changed.
    pub fn on_drag_update(&mut self, delta: f64) -> bool {
        if self.state != ScrollState::Dragging {
            self.on_drag_start();
        }
        self.update_offset(delta, ScrollSource::Drag)
    }

    /// Ends a drag with a release `velocity` in offset units per second.
    ///
    /// Paging snaps to a page; an overscroll springs back; a fast release flings.
    pub fn on_drag_end(&mut self, velocity: f64) {
        if self.edge_effect == EdgeEffect::Fade {
            self.out_of_boundary = 0.0;
        }
        let velocity = if velocity.is_finite() { velocity } else { 0.0 };
        if self.paging && self.viewport_length > 0.0 {
            self.snap_to_page(velocity);
        } else if !near_zero(self.overscroll()) {
            self.spring_back();
        } else if self.scroll_enabled && velocity.abs() > self.physics.min_fling_velocity {
            self.motion = Some(Motion::Fling(Fling::new(
                velocity,
                self.physics.fling_decay,
                self.physics.fling_stop_velocity,
            )));
            self.set_state(ScrollState::Flinging);
        } else {
            self.set_state(ScrollState::Idle);
        }
    }

    /// Animates an overscrolled offset back to the nearest boundary.
    pub fn spring_back(&mut self) {
        let (lo, hi) = self.bounds();
        let target = self.current_offset.clamp(lo, hi);
        if near_zero(target - self.current_offset) {
            self.current_offset = target;
            self.set_state(ScrollState::Idle);
            return;
        }
        self.cancel_motion();
        let tween = Tween::new(
            self.current_offset,
            target,
            self.physics.spring_back_ms,
            Curve::Friction,
        );
        self.motion = Some(Motion::Tween(tween, ScrollSource::SpringBack));
        self.set_state(ScrollState::Animating);
    }

    /// Page index the release should settle on.
    ///
    /// A release that is both fast enough and far enough turns one page in the drag direction
    /// from the page the drag started on. Otherwise the nearest page wins.
    fn snap_target(&self, velocity: f64) -> f64 {
        let page = self.viewport_length;
        let start = self.position_of(self.drag_start_offset);
        let moved = self.current_position() - start;
        let start_page = (start / page).round();
        let position_velocity = self.position_of(velocity);
        let turns = position_velocity.abs() > self.physics.min_turn_velocity
            && moved.abs() > self.physics.min_drag_distance
            && moved.signum() == position_velocity.signum();
        let target_page = if turns {
            start_page + moved.signum()
        } else {
            (self.current_position() / page).round()
        };
        (target_page * page).clamp(0.0, self.scrollable_distance)
    }

    fn snap_to_page(&mut self, velocity: f64) {
        let target = self.offset_of(self.snap_target(velocity));
        if near_zero(target - self.current_offset) {
            self.set_state(ScrollState::Idle);
            return;
        }
        let tween = Tween::new(
            self.current_offset,
            target,
            self.physics.snap_duration_ms,
            Curve::Friction,
        );
        self.motion = Some(Motion::Tween(tween, ScrollSource::SpringBack));
        self.set_state(ScrollState::Animating);
    }

    /// Handles an accessibility scroll action. Only acts when [`Scrollable::is_scrollable`].
    pub fn perform_accessibility_action(&mut self, action: AccessibilityAction) -> bool {
        if !self.is_scrollable() {
            tracing::debug!(?action, "accessibility scroll ignored, nothing to scroll");
            return false;
        }
        self.stop_animate();
        let page = match action {
            AccessibilityAction::ScrollForward => self.viewport_length,
            AccessibilityAction::ScrollBackward => -self.viewport_length,
        };
        let target = self.offset_of(
            (self.current_position() + page).clamp(0.0, self.scrollable_distance),
        );
        self.move_to(target, ScrollSource::Accessibility)
    }

    /// Target of the running animation as a position, if one is running.
    #[must_use]
    pub fn animation_target(&self) -> Option<f64> {
        match self.motion {
            Some(Motion::Tween(tween, _)) => Some(self.position_of(tween.to())),
            Some(Motion::Fling(fling)) => {
                Some(self.current_position() + self.position_of(fling.total_distance()))
            }
            None => None,
        }
    }

    /// Current fling velocity in offset units per second, or zero.
    #[must_use]
    pub fn fling_velocity(&self) -> f64 {
        match self.motion {
            Some(Motion::Fling(fling)) => fling.current_velocity(),
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::{AccessibilityAction, ScrollEdge, ScrollSource, ScrollState, Scrollable};
    use crate::curve::Curve;
    use crate::physics::{EdgeEffect, ScrollPhysics};
    use arbor_layout::Axis;

    fn scrollable(content: f64, viewport: f64) -> Scrollable {
        let mut scroll = Scrollable::new(Axis::Vertical);
        scroll.set_metrics(content, viewport);
        scroll
    }

    fn counter() -> (Rc<Cell<u32>>, impl FnMut() + 'static) {
        let count = Rc::new(Cell::new(0));
        let inner = count.clone();
        (count, move || inner.set(inner.get() + 1))
    }

    fn run(scroll: &mut Scrollable, from: f64) -> f64 {
        let mut t = from;
        while scroll.is_animating() {
            t += 16.0;
            scroll.tick(t);
            assert!(t < from + 60_000.0, "animation never finished");
        }
        t
    }

    #[test]
    fn restricting_sources_clamp_for_any_distance() {
        for distance in [0.0, 1.0, 250.0] {
            let mut scroll = scrollable(100.0 + distance, 100.0);
            for delta in [-1e6, -3.0, 7.0, 1e6] {
                for source in [ScrollSource::Jump, ScrollSource::ScrollBar, ScrollSource::Rotation] {
                    scroll.update_offset(delta, source);
                    let offset = scroll.current_offset();
                    assert!((-distance..=0.0).contains(&offset), "{offset} outside {distance}");
                }
            }
        }
    }

    #[test]
    fn reversed_range_is_mirrored() {
        let mut scroll = scrollable(300.0, 100.0);
        scroll.set_reversed(true);
        scroll.update_offset(-50.0, ScrollSource::Jump);
        assert_eq!(scroll.current_offset(), 0.0);
        scroll.update_offset(500.0, ScrollSource::Jump);
        assert_eq!(scroll.current_offset(), 200.0);
        assert_eq!(scroll.current_position(), 200.0);
        assert_eq!(scroll.layout_offset(), -200.0);
    }

    #[test]
    fn drag_overscroll_is_resisted_and_recorded() {
        let mut scroll = scrollable(1000.0, 200.0);
        scroll.on_drag_start();
        assert!(scroll.on_drag_update(20.0));
        // Not overscrolled before the first delta, so it passes through.
        assert_eq!(scroll.current_offset(), 20.0);
        scroll.on_drag_update(20.0);
        assert!(scroll.current_offset() < 40.0);
        assert_eq!(scroll.out_of_boundary(), scroll.current_offset());

        scroll.on_drag_update(-5.0);
        let back = scroll.current_offset();
        scroll.on_drag_end(0.0);
        assert_eq!(scroll.state(), ScrollState::Animating);
        run(&mut scroll, 0.0);
        assert_eq!(scroll.current_offset(), 0.0);
        assert!(back > 0.0);
        assert_eq!(scroll.state(), ScrollState::Idle);
    }

    #[test]
    fn edge_effects_other_than_spring_clamp_drags() {
        let mut scroll = scrollable(1000.0, 200.0);
        scroll.set_edge_effect(EdgeEffect::Fade);
        scroll.on_drag_start();
        scroll.on_drag_update(15.0);
        scroll.on_drag_update(10.0);
        assert_eq!(scroll.current_offset(), 0.0);
        assert_eq!(scroll.out_of_boundary(), 25.0);
        scroll.on_drag_update(-30.0);
        scroll.on_drag_update(40.0);
        assert_eq!(scroll.current_offset(), 0.0);
        assert_eq!(scroll.out_of_boundary(), 10.0);
        scroll.on_drag_end(0.0);
        assert_eq!(scroll.out_of_boundary(), 0.0);

        scroll.set_edge_effect(EdgeEffect::None);
        scroll.on_drag_update(-5000.0);
        assert_eq!(scroll.current_offset(), -800.0);
        assert_eq!(scroll.out_of_boundary(), 0.0);
    }

    #[test]
    fn reaching_an_edge_fires_once_per_crossing() {
        let mut scroll = scrollable(300.0, 100.0);
        let (starts, on_start) = counter();
        let (ends, on_end) = counter();
        scroll.set_on_reach_start(on_start);
        scroll.set_on_reach_end(on_end);

        scroll.on_drag_start();
        for delta in [-50.0, -150.0, -10.0, -10.0] {
            scroll.on_drag_update(delta);
        }
        assert_eq!(ends.get(), 1);
        scroll.on_drag_end(0.0);
        run(&mut scroll, 0.0);
        assert_eq!(scroll.current_offset(), -200.0);
        assert_eq!(ends.get(), 2);

        scroll.scroll_to_edge(ScrollEdge::Start, false);
        scroll.scroll_to_edge(ScrollEdge::Start, false);
        assert_eq!(starts.get(), 1);
    }

    #[test]
    fn touching_the_start_and_pulling_away_fires_per_arrival() {
        let mut scroll = Scrollable::new(Axis::Vertical);
        let (starts, on_start) = counter();
        scroll.set_on_reach_start(on_start);
        // First layout: the list starts at the top.
        scroll.set_metrics(300.0, 100.0);
        assert_eq!(starts.get(), 1);
        scroll.set_metrics(300.0, 100.0);
        assert_eq!(starts.get(), 1);

        // Offsets 5, 0, -0, 0, 5.
        scroll.on_drag_start();
        scroll.on_drag_update(5.0);
        assert_eq!(scroll.current_offset(), 5.0);
        scroll.on_drag_update(-5.0);
        assert_eq!(scroll.current_offset(), 0.0);
        assert!(!scroll.on_drag_update(-0.0));
        assert!(!scroll.on_drag_update(0.0));
        scroll.on_drag_update(5.0);
        assert_eq!(starts.get(), 2);
    }

    #[test]
    fn will_scroll_can_rewrite_deltas() {
        let mut scroll = scrollable(1000.0, 100.0);
        scroll.set_on_will_scroll(|delta, _, _| delta / 2.0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        scroll.set_on_did_scroll(move |delta, offset| sink.borrow_mut().push((delta, offset)));
        scroll.update_offset(-40.0, ScrollSource::Drag);
        assert_eq!(scroll.current_offset(), -20.0);
        assert_eq!(*seen.borrow(), [(-20.0, -20.0)]);
    }

    #[test]
    fn animate_by_distance_takes_proportional_time() {
        let physics = ScrollPhysics {
            animate_speed: 1000.0,
            ..ScrollPhysics::default()
        };
        let mut scroll = scrollable(5000.0, 100.0).with_physics(physics);
        assert!(scroll.animate_to(500.0, None, Curve::Linear));
        scroll.tick(0.0);
        scroll.tick(250.0);
        assert_eq!(scroll.current_offset(), -250.0);
        scroll.tick(500.0);
        assert_eq!(scroll.current_offset(), -500.0);
        assert!(!scroll.is_animating());
    }

    #[test]
    fn new_animation_stops_the_old_one_first() {
        let mut scroll = scrollable(5000.0, 100.0);
        let (stops, on_stop) = counter();
        let (idle, on_idle) = counter();
        scroll.set_on_animation_stop(on_stop);
        scroll.set_on_scroll_stop(on_idle);

        scroll.animate_to(1000.0, Some(100.0), Curve::Linear);
        scroll.tick(0.0);
        scroll.tick(50.0);
        scroll.animate_to(200.0, Some(100.0), Curve::Linear);
        assert_eq!(stops.get(), 1);
        run(&mut scroll, 100.0);
        assert_eq!(stops.get(), 2);
        assert_eq!(scroll.current_position(), 200.0);

        // Stopping with nothing running is a no-op.
        scroll.stop_animate();
        assert_eq!(stops.get(), 2);
        assert_eq!(idle.get(), 2);
    }

    #[test]
    fn drag_start_cancels_animation_before_deltas() {
        let mut scroll = scrollable(5000.0, 100.0);
        let (stops, on_stop) = counter();
        scroll.set_on_animation_stop(on_stop);
        scroll.animate_to(1000.0, Some(100.0), Curve::Linear);
        scroll.tick(0.0);
        scroll.tick(50.0);
        let at = scroll.current_offset();
        scroll.on_drag_start();
        assert_eq!(stops.get(), 1);
        assert!(!scroll.tick(60.0));
        scroll.on_drag_update(-5.0);
        assert_eq!(scroll.current_offset(), at - 5.0);
        assert_eq!(scroll.state(), ScrollState::Dragging);
    }

    #[test]
    fn fast_release_flings_and_stops_inside_bounds() {
        let mut scroll = scrollable(100_000.0, 100.0);
        scroll.on_drag_start();
        scroll.on_drag_update(-10.0);
        scroll.on_drag_end(-2000.0);
        assert_eq!(scroll.state(), ScrollState::Flinging);
        let expected = scroll.animation_target().unwrap_or_default();
        run(&mut scroll, 0.0);
        assert!((scroll.current_position() - expected).abs() < 1e-6);
        assert!(scroll.current_position() > 400.0);
        assert_eq!(scroll.state(), ScrollState::Idle);
    }

    #[test]
    fn fling_into_the_end_springs_back() {
        let mut scroll = scrollable(400.0, 100.0);
        scroll.jump_to_position(290.0);
        scroll.on_drag_start();
        scroll.on_drag_end(-3000.0);
        run(&mut scroll, 0.0);
        assert_eq!(scroll.current_offset(), -300.0);
    }

    #[test]
    fn paging_needs_both_velocity_and_distance() {
        let physics = ScrollPhysics::default();
        let mut scroll = scrollable(1000.0, 100.0);
        scroll.set_enable_paging(true);

        scroll.on_drag_start();
        scroll.on_drag_update(-physics.min_drag_distance * 1.5);
        scroll.on_drag_end(-physics.min_turn_velocity * 0.99);
        run(&mut scroll, 0.0);
        assert_eq!(scroll.current_position(), 0.0);

        scroll.on_drag_start();
        scroll.on_drag_update(-physics.min_drag_distance * 1.5);
        scroll.on_drag_end(-physics.min_turn_velocity * 1.5);
        run(&mut scroll, 1000.0);
        assert_eq!(scroll.current_position(), 100.0);
    }

    #[test]
    fn accessibility_pages_only_when_scrollable() {
        let mut scroll = scrollable(250.0, 100.0);
        assert!(scroll.perform_accessibility_action(AccessibilityAction::ScrollForward));
        assert_eq!(scroll.current_position(), 100.0);
        assert!(scroll.perform_accessibility_action(AccessibilityAction::ScrollForward));
        assert_eq!(scroll.current_position(), 150.0);
        assert!(!scroll.perform_accessibility_action(AccessibilityAction::ScrollForward));

        let mut fits = scrollable(80.0, 100.0);
        assert!(!fits.perform_accessibility_action(AccessibilityAction::ScrollForward));
        let mut disabled = scrollable(1000.0, 100.0);
        disabled.set_scroll_enabled(false);
        assert!(!disabled.perform_accessibility_action(AccessibilityAction::ScrollBackward));
    }

    #[test]
    fn shrinking_content_clamps_an_idle_offset() {
        let mut scroll = scrollable(1000.0, 100.0);
        scroll.jump_to_position(900.0);
        scroll.set_metrics(500.0, 100.0);
        assert_eq!(scroll.current_offset(), -400.0);
    }

    #[test]
    fn available_delta_stops_at_the_boundary() {
        let mut scroll = scrollable(300.0, 100.0);
        assert_eq!(scroll.available_delta(50.0), 0.0);
        assert_eq!(scroll.available_delta(-50.0), -50.0);
        scroll.jump_to_position(180.0);
        assert_eq!(scroll.available_delta(-50.0), -20.0);
        assert_eq!(scroll.available_delta(30.0), 30.0);
    }

    #[test]
    fn scroll_by_and_page_are_relative() {
        let mut scroll = scrollable(1000.0, 100.0);
        scroll.scroll_by(30.0, false);
        scroll.scroll_page(true, false);
        assert_eq!(scroll.current_position(), 130.0);
        scroll.scroll_page(false, false);
        scroll.scroll_by(-500.0, false);
        assert_eq!(scroll.current_position(), 0.0);
    }
}
