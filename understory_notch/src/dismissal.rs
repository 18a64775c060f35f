// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sheet dismissal policies.
//!
//! A sheet asks its dismissal policy first when the finger lifts. Only if the answer is
//! "keep" does the target-notch policy pick a resting notch.

use kurbo::Vec2;

use crate::notches::Notches;

/// Height below which a release dismisses.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum DismissalThreshold {
    /// Ignore the overlay height.
    #[default]
    None,
    /// Dismiss below the height of this notch.
    Notch(usize),
    /// Dismiss below this height in points.
    Height(f64),
}

/// Downward release speed above which a release dismisses.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum VelocityThreshold {
    /// Ignore the release velocity.
    #[default]
    None,
    /// Dismiss when `velocity.y` exceeds this value in points per second.
    Velocity(f64),
}

/// Inputs to a [`SheetDismissalPolicy`].
#[derive(Copy, Clone, Debug)]
pub struct DismissalContext<'a> {
    /// Overlay height at release.
    pub height: f64,
    /// Release velocity in points per second. Positive `y` shrinks the overlay.
    pub velocity: Vec2,
    /// All notch heights, enabled or not.
    pub notches: &'a Notches,
}

/// Decides whether a release dismisses the sheet.
pub trait SheetDismissalPolicy {
    /// `true` to dismiss instead of settling.
    fn should_dismiss(&self, ctx: &DismissalContext<'_>) -> bool;
}

/// Dismisses below a height threshold or above a downward velocity threshold.
///
/// With both thresholds set to `None` it never dismisses.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ThresholdDismissal {
    /// Position threshold.
    pub position: DismissalThreshold,
    /// Velocity threshold.
    pub velocity: VelocityThreshold,
}

impl Default for ThresholdDismissal {
    fn default() -> Self {
        Self {
            position: DismissalThreshold::Notch(0),
            velocity: VelocityThreshold::Velocity(2000.0),
        }
    }
}

impl SheetDismissalPolicy for ThresholdDismissal {
    fn should_dismiss(&self, ctx: &DismissalContext<'_>) -> bool {
        let floor = match self.position {
            DismissalThreshold::None => None,
            // An unknown notch never triggers.
            DismissalThreshold::Notch(index) => ctx.notches.height(index),
            DismissalThreshold::Height(height) => Some(height),
        };
        if floor.is_some_and(|floor| ctx.height < floor) {
            return true;
        }
        match self.velocity {
            VelocityThreshold::None => false,
            VelocityThreshold::Velocity(trigger) => ctx.velocity.y > trigger,
        }
    }
}

/// Never dismisses. Disables drag-to-dismiss.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NeverDismiss;

impl SheetDismissalPolicy for NeverDismiss {
    fn should_dismiss(&self, _ctx: &DismissalContext<'_>) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn notches() -> Notches {
        Notches::new(vec![0.0, 100.0, 200.0])
    }

    fn check(policy: ThresholdDismissal, height: f64, vy: f64) -> bool {
        let n = notches();
        policy.should_dismiss(&DismissalContext {
            height,
            velocity: Vec2::new(0.0, vy),
            notches: &n,
        })
    }

    fn position_only(position: DismissalThreshold) -> ThresholdDismissal {
        ThresholdDismissal {
            position,
            velocity: VelocityThreshold::None,
        }
    }

    #[test]
    fn height_threshold() {
        assert!(check(position_only(DismissalThreshold::Height(200.0)), 190.0, 0.0));
        assert!(!check(position_only(DismissalThreshold::Height(100.0)), 200.0, 0.0));
    }

    #[test]
    fn notch_threshold() {
        let p = position_only(DismissalThreshold::Notch(1));
        assert!(check(p, 99.0, 0.0));
        assert!(!check(p, 101.0, 0.0));
        assert!(!check(position_only(DismissalThreshold::Notch(9)), -10.0, 0.0));
    }

    // Notch 0 at height 0: strictly below dismisses, at or above never does.
    #[test]
    fn notch_zero_ignores_velocity_when_disabled() {
        let p = position_only(DismissalThreshold::Notch(0));
        assert!(check(p, -1.0, 0.0));
        assert!(!check(p, 0.0, 0.0));
        assert!(!check(p, 0.0, 10_000.0));
        assert!(!check(p, 50.0, 10_000.0));
    }

    #[test]
    fn velocity_threshold() {
        let p = ThresholdDismissal {
            position: DismissalThreshold::None,
            velocity: VelocityThreshold::Velocity(900.0),
        };
        assert!(check(p, 0.0, 1000.0));
        assert!(!check(p, 0.0, 800.0));
        // Upward flicks never dismiss.
        assert!(!check(p, 0.0, -5000.0));
    }

    #[test]
    fn none_never_dismisses() {
        assert!(!check(position_only(DismissalThreshold::None), -100.0, 0.0));
        let n = notches();
        let ctx = DismissalContext {
            height: -100.0,
            velocity: Vec2::new(0.0, 1e6),
            notches: &n,
        };
        assert!(!NeverDismiss.should_dismiss(&ctx));
    }

    #[test]
    fn defaults() {
        let p = ThresholdDismissal::default();
        assert!(check(p, 50.0, 2500.0));
        assert!(!check(p, 50.0, 1500.0));
        assert!(check(p, -0.5, 0.0));
    }
}
