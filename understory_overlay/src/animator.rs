// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Settle animations.
//!
//! ## Overview
//!
//! When a drag ends, or a programmatic move is requested, the controller builds a
//! [`TransitionContext`] and asks an [`AnimationController`] for an
//! [`InterruptibleAnimator`]. The animator owns the presented height; the host drives it
//! by calling [`OverlayContainer::advance`](crate::container::OverlayContainer::advance)
//! once per frame.
//!
//! Animators are interruptible: a new drag samples [`InterruptibleAnimator::value`] and
//! stops the animation, so the overlay continues from where it visibly is.
//!
//! Two controllers are provided:
//!
//! - [`SpringAnimationController`] (default): a damped spring parameterized by damping ratio
//!   and response, seeded with the release velocity.
//! - [`TimingAnimationController`]: a fixed-curve tween whose duration follows the release
//!   speed.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::f64::consts::PI;

use kurbo::Vec2;

use crate::types::ChildId;

/// Everything known about a transition when it starts.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionContext {
    /// The overlay being moved.
    pub overlay: ChildId,
    /// Translation height when the transition started.
    pub start_height: f64,
    /// Notch the transition settles at.
    pub target_index: usize,
    /// Height of the target notch.
    pub target_height: f64,
    /// Release velocity in points per second. Zero for non-animated moves.
    pub velocity: Vec2,
    /// Height of every notch, enabled or not.
    pub notch_heights: Vec<f64>,
    /// Enabled notch indices.
    pub reachable_indices: Vec<usize>,
    /// `false` when the height jumps straight to the target.
    pub is_animated: bool,
    /// `true` when the transition follows a user drag.
    pub is_dragging: bool,
}

impl TransitionContext {
    /// Height of notch `index`, or `0.0` if it does not exist.
    pub fn height_for_notch(&self, index: usize) -> f64 {
        self.notch_heights.get(index).copied().unwrap_or(0.0)
    }

    /// Distance left to travel.
    pub fn distance(&self) -> f64 {
        (self.target_height - self.start_height).abs()
    }
}

/// A running animation of the translation height.
pub trait InterruptibleAnimator {
    /// Begin animating from the context's start height.
    fn start_animation(&mut self);
    /// Step the animation forward by `dt` seconds.
    fn advance(&mut self, dt: f64);
    /// `true` until the animation reaches its target or is stopped.
    fn is_running(&self) -> bool;
    /// Progress in `0.0..=1.0`.
    fn fraction_complete(&self) -> f64;
    /// Currently presented height.
    fn value(&self) -> f64;
    /// Stop where it is. [`value`](Self::value) keeps the last presented height.
    fn stop_animation(&mut self);
}

/// Builds an animator for each transition.
pub trait AnimationController {
    /// A fresh animator for the transition described by `ctx`.
    fn interruptible_animator(&self, ctx: &TransitionContext) -> Box<dyn InterruptibleAnimator>;
}

/// Damped spring parameterized by damping ratio and response.
///
/// Stiffness is `(2π / response)²` and damping `4π · damping / response`, with unit mass.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpringAnimationController {
    /// Damping ratio. `1.0` is critically damped, lower values bounce.
    pub damping: f64,
    /// Approximate period of the undamped oscillation, in seconds.
    pub response: f64,
}

impl Default for SpringAnimationController {
    fn default() -> Self {
        Self {
            damping: 0.7,
            response: 0.3,
        }
    }
}

impl SpringAnimationController {
    /// Spring constant for a unit mass.
    pub fn stiffness(&self) -> f64 {
        let omega = 2.0 * PI / self.response;
        omega * omega
    }

    /// Viscous damping coefficient for a unit mass.
    pub fn damping_coefficient(&self) -> f64 {
        4.0 * PI * self.damping / self.response
    }
}

impl AnimationController for SpringAnimationController {
    fn interruptible_animator(&self, ctx: &TransitionContext) -> Box<dyn InterruptibleAnimator> {
        Box::new(SpringAnimator {
            start: ctx.start_height,
            target: ctx.target_height,
            position: ctx.start_height,
            // Finger up (negative y) grows the overlay.
            velocity: -ctx.velocity.y,
            stiffness: self.stiffness(),
            damping: self.damping_coefficient(),
            elapsed: 0.0,
            running: false,
        })
    }
}

/// Integration step, seconds.
const SPRING_STEP: f64 = 1.0 / 240.0;
/// Settled when closer than this, points.
const SPRING_POSITION_THRESHOLD: f64 = 0.25;
/// Settled when slower than this, points per second.
const SPRING_VELOCITY_THRESHOLD: f64 = 5.0;
/// Hard stop for pathological parameters, seconds.
const SPRING_MAX_DURATION: f64 = 4.0;

/// Animator produced by [`SpringAnimationController`].
#[derive(Clone, Debug)]
pub struct SpringAnimator {
    start: f64,
    target: f64,
    position: f64,
    velocity: f64,
    stiffness: f64,
    damping: f64,
    elapsed: f64,
    running: bool,
}

impl SpringAnimator {
    fn at_rest(&self) -> bool {
        (self.position - self.target).abs() < SPRING_POSITION_THRESHOLD
            && self.velocity.abs() < SPRING_VELOCITY_THRESHOLD
    }

    fn settle(&mut self) {
        self.position = self.target;
        self.velocity = 0.0;
        self.running = false;
    }
}

impl InterruptibleAnimator for SpringAnimator {
    fn start_animation(&mut self) {
        self.running = true;
        if self.at_rest() {
            self.settle();
        }
    }

    fn advance(&mut self, dt: f64) {
        if !self.running || dt <= 0.0 {
            return;
        }
        if !dt.is_finite() {
            self.settle();
            return;
        }
        // Nothing past the hard stop is ever simulated.
        let dt = dt.min(SPRING_MAX_DURATION - self.elapsed);
        // Semi-implicit Euler in fixed sub-steps.
        let mut remaining = dt;
        while remaining > 0.0 {
            let step = remaining.min(SPRING_STEP);
            let displacement = self.position - self.target;
            let force = -self.stiffness * displacement - self.damping * self.velocity;
            self.velocity += force * step;
            self.position += self.velocity * step;
            remaining -= step;
        }
        self.elapsed += dt;
        if self.at_rest() || self.elapsed >= SPRING_MAX_DURATION {
            self.settle();
        }
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn fraction_complete(&self) -> f64 {
        let span = self.target - self.start;
        if !self.running || span == 0.0 {
            return 1.0;
        }
        ((self.position - self.start) / span).clamp(0.0, 1.0)
    }

    fn value(&self) -> f64 {
        self.position
    }

    fn stop_animation(&mut self) {
        self.running = false;
        self.velocity = 0.0;
    }
}

/// Timing curve of a [`TimingAnimationController`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Easing {
    /// Constant speed.
    Linear,
    /// Slow start.
    EaseIn,
    /// Slow finish.
    #[default]
    EaseOut,
    /// Slow start and finish.
    EaseInOut,
}

impl Easing {
    /// Map linear progress in `0.0..=1.0` through the curve.
    pub fn transform(self, fraction: f64) -> f64 {
        match self {
            Self::Linear => fraction.clamp(0.0, 1.0),
            Self::EaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0, fraction),
            Self::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, fraction),
            Self::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, fraction),
        }
    }
}

/// CSS-style cubic Bézier timing function through `(0,0)`, `(x1,y1)`, `(x2,y2)`, `(1,1)`.
fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, fraction: f64) -> f64 {
    if fraction <= 0.0 {
        return 0.0;
    }
    if fraction >= 1.0 {
        return 1.0;
    }
    let cx = 3.0 * x1;
    let bx = 3.0 * (x2 - x1) - cx;
    let ax = 1.0 - cx - bx;
    let cy = 3.0 * y1;
    let by = 3.0 * (y2 - y1) - cy;
    let ay = 1.0 - cy - by;
    let sample = |a: f64, b: f64, c: f64, t: f64| ((a * t + b) * t + c) * t;
    let slope = |a: f64, b: f64, c: f64, t: f64| (3.0 * a * t + 2.0 * b) * t + c;

    // Newton-Raphson on x(t), then bisection if the slope flattens.
    let mut t = fraction;
    for _ in 0..8 {
        let x = sample(ax, bx, cx, t) - fraction;
        if x.abs() < 1e-7 {
            return sample(ay, by, cy, t);
        }
        let d = slope(ax, bx, cx, t);
        if d.abs() < 1e-6 {
            break;
        }
        t -= x / d;
    }
    let (mut lo, mut hi) = (0.0, 1.0);
    t = fraction;
    for _ in 0..32 {
        let x = sample(ax, bx, cx, t);
        if (x - fraction).abs() < 1e-7 {
            break;
        }
        if x < fraction {
            lo = t;
        } else {
            hi = t;
        }
        t = (lo + hi) * 0.5;
    }
    sample(ay, by, cy, t)
}

/// Tween along an [`Easing`] curve.
///
/// Without a fixed duration, the duration is `distance / |velocity.y|` clamped to
/// `minimum_duration..=maximum_duration`, so faster flicks settle faster.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TimingAnimationController {
    /// Curve applied to linear progress.
    pub easing: Easing,
    /// Fixed duration in seconds, if any.
    pub duration: Option<f64>,
    /// Shortest velocity-derived duration, seconds.
    pub minimum_duration: f64,
    /// Longest velocity-derived duration, seconds.
    pub maximum_duration: f64,
}

impl Default for TimingAnimationController {
    fn default() -> Self {
        Self {
            easing: Easing::EaseOut,
            duration: None,
            minimum_duration: 0.1,
            maximum_duration: 0.5,
        }
    }
}

impl TimingAnimationController {
    /// Duration used for a transition.
    pub fn duration_for(&self, ctx: &TransitionContext) -> f64 {
        if let Some(duration) = self.duration {
            return duration;
        }
        let speed = ctx.velocity.y.abs();
        let raw = if speed > 0.0 {
            ctx.distance() / speed
        } else {
            self.maximum_duration
        };
        raw.max(self.minimum_duration).min(self.maximum_duration)
    }
}

impl AnimationController for TimingAnimationController {
    fn interruptible_animator(&self, ctx: &TransitionContext) -> Box<dyn InterruptibleAnimator> {
        Box::new(TimingAnimator {
            start: ctx.start_height,
            target: ctx.target_height,
            duration: self.duration_for(ctx),
            easing: self.easing,
            elapsed: 0.0,
            value: ctx.start_height,
            running: false,
        })
    }
}

/// Animator produced by [`TimingAnimationController`].
#[derive(Clone, Debug)]
pub struct TimingAnimator {
    start: f64,
    target: f64,
    duration: f64,
    easing: Easing,
    elapsed: f64,
    value: f64,
    running: bool,
}

impl InterruptibleAnimator for TimingAnimator {
    fn start_animation(&mut self) {
        self.running = true;
        if self.duration <= 0.0 {
            self.value = self.target;
            self.elapsed = self.duration;
            self.running = false;
        }
    }

    fn advance(&mut self, dt: f64) {
        if !self.running || dt <= 0.0 {
            return;
        }
        self.elapsed = (self.elapsed + dt).min(self.duration);
        let progress = self.easing.transform(self.elapsed / self.duration);
        self.value = self.start + (self.target - self.start) * progress;
        if self.elapsed >= self.duration {
            self.value = self.target;
            self.running = false;
        }
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn fraction_complete(&self) -> f64 {
        if self.duration <= 0.0 {
            1.0
        } else {
            self.elapsed / self.duration
        }
    }

    fn value(&self) -> f64 {
        self.value
    }

    fn stop_animation(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn ctx(start: f64, target: f64, vy: f64) -> TransitionContext {
        TransitionContext {
            overlay: ChildId(1),
            start_height: start,
            target_index: 1,
            target_height: target,
            velocity: Vec2::new(0.0, vy),
            notch_heights: vec![100.0, 300.0],
            reachable_indices: vec![0, 1],
            is_animated: true,
            is_dragging: false,
        }
    }

    fn run(animator: &mut dyn InterruptibleAnimator) -> usize {
        let mut frames = 0;
        animator.start_animation();
        while animator.is_running() && frames < 10_000 {
            animator.advance(1.0 / 60.0);
            frames += 1;
        }
        frames
    }

    #[test]
    fn spring_constants() {
        let spring = SpringAnimationController::default();
        let omega = 2.0 * PI / 0.3;
        assert!((spring.stiffness() - omega * omega).abs() < 1e-9);
        assert!((spring.damping_coefficient() - 4.0 * PI * 0.7 / 0.3).abs() < 1e-9);
    }

    #[test]
    fn spring_settles_exactly_on_target() {
        let mut animator =
            SpringAnimationController::default().interruptible_animator(&ctx(100.0, 300.0, 0.0));
        let frames = run(animator.as_mut());
        assert!(frames > 5, "settled suspiciously fast: {frames}");
        assert!(frames < 120, "took {frames} frames");
        assert_eq!(animator.value(), 300.0);
        assert_eq!(animator.fraction_complete(), 1.0);
    }

    // An upward flick toward a taller notch gets there sooner than from rest.
    #[test]
    fn spring_uses_release_velocity() {
        let spring = SpringAnimationController::default();
        let mut still = spring.interruptible_animator(&ctx(100.0, 300.0, 0.0));
        let mut flung = spring.interruptible_animator(&ctx(100.0, 300.0, -2000.0));
        still.start_animation();
        flung.start_animation();
        still.advance(0.05);
        flung.advance(0.05);
        assert!(flung.value() > still.value());
    }

    #[test]
    fn stopping_keeps_presented_value() {
        let mut animator =
            SpringAnimationController::default().interruptible_animator(&ctx(100.0, 300.0, 0.0));
        animator.start_animation();
        animator.advance(0.05);
        let mid = animator.value();
        assert!(mid > 100.0 && mid < 300.0);
        animator.stop_animation();
        animator.advance(0.05);
        assert!(!animator.is_running());
        assert_eq!(animator.value(), mid);
    }

    #[test]
    fn spring_long_or_unbounded_frames_settle() {
        let spring = SpringAnimationController::default();
        let mut paused = spring.interruptible_animator(&ctx(100.0, 300.0, 0.0));
        paused.start_animation();
        paused.advance(100_000.0);
        assert!(!paused.is_running());
        assert_eq!(paused.value(), 300.0);

        let mut unbounded = spring.interruptible_animator(&ctx(100.0, 300.0, 0.0));
        unbounded.start_animation();
        unbounded.advance(0.05);
        unbounded.advance(f64::INFINITY);
        assert!(!unbounded.is_running());
        assert_eq!(unbounded.value(), 300.0);

        let mut nan = spring.interruptible_animator(&ctx(100.0, 300.0, 0.0));
        nan.start_animation();
        nan.advance(f64::NAN);
        assert!(!nan.is_running());
        assert_eq!(nan.value(), 300.0);
    }

    #[test]
    fn spring_already_at_target_finishes_on_start() {
        let mut animator =
            SpringAnimationController::default().interruptible_animator(&ctx(300.0, 300.0, 0.0));
        animator.start_animation();
        assert!(!animator.is_running());
        assert_eq!(animator.value(), 300.0);
    }

    #[test]
    fn timing_duration_follows_speed() {
        let timing = TimingAnimationController::default();
        assert_eq!(timing.duration_for(&ctx(100.0, 300.0, 0.0)), 0.5);
        assert_eq!(timing.duration_for(&ctx(100.0, 300.0, 1000.0)), 0.2);
        assert_eq!(timing.duration_for(&ctx(100.0, 300.0, 100_000.0)), 0.1);
        let fixed = TimingAnimationController {
            duration: Some(0.3),
            ..TimingAnimationController::default()
        };
        assert_eq!(fixed.duration_for(&ctx(100.0, 300.0, 1000.0)), 0.3);
    }

    #[test]
    fn timing_reaches_target() {
        let timing = TimingAnimationController {
            easing: Easing::Linear,
            duration: Some(0.5),
            ..TimingAnimationController::default()
        };
        let mut animator = timing.interruptible_animator(&ctx(100.0, 300.0, 0.0));
        animator.start_animation();
        animator.advance(0.25);
        assert!((animator.value() - 200.0).abs() < 1e-9);
        assert!((animator.fraction_complete() - 0.5).abs() < 1e-9);
        animator.advance(1.0);
        assert!(!animator.is_running());
        assert_eq!(animator.value(), 300.0);
    }

    #[test]
    fn easing_endpoints_and_shape() {
        for easing in [Easing::Linear, Easing::EaseIn, Easing::EaseOut, Easing::EaseInOut] {
            assert_eq!(easing.transform(0.0), 0.0);
            assert_eq!(easing.transform(1.0), 1.0);
        }
        assert!(Easing::EaseOut.transform(0.5) > 0.5);
        assert!(Easing::EaseIn.transform(0.5) < 0.5);
        assert!((Easing::EaseInOut.transform(0.5) - 0.5).abs() < 1e-3);
    }
}
