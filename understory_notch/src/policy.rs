// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Target-notch policies: where a released overlay settles.
//!
//! A policy only sees the [`Reachable`] notches, so whatever it returns is an enabled
//! index. `None` means there was nothing to choose from.

use alloc::vec::Vec;
use kurbo::Vec2;

use crate::notches::{Notch, Reachable};

/// Inputs to a [`TargetNotchPolicy`].
#[derive(Copy, Clone, Debug)]
pub struct TargetNotchContext<'a> {
    /// Current overlay height.
    pub height: f64,
    /// Release velocity in points per second. Negative `y` grows the overlay.
    pub velocity: Vec2,
    /// Enabled notches.
    pub reachable: &'a Reachable,
}

/// Chooses the notch a released overlay settles at.
pub trait TargetNotchPolicy {
    /// Index of an enabled notch, or `None` if none is reachable.
    fn target_notch_index(&self, ctx: &TargetNotchContext<'_>) -> Option<usize>;
}

/// Picks the closest notch to a short look-ahead of the motion, and on fast flicks
/// skips to the next notch in the direction of travel.
///
/// Candidates are ranked by `(distance, height)` ascending, measured from
/// `height - velocity.y * look_ahead`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RushingForward {
    /// Seconds of motion projected before ranking.
    pub look_ahead: f64,
    /// Speed in points per second above which a flick rushes forward.
    pub minimum_velocity: f64,
}

impl Default for RushingForward {
    fn default() -> Self {
        Self {
            look_ahead: 0.1,
            minimum_velocity: 400.0,
        }
    }
}

impl TargetNotchPolicy for RushingForward {
    fn target_notch_index(&self, ctx: &TargetNotchContext<'_>) -> Option<usize> {
        let projected = ctx.height - ctx.velocity.y * self.look_ahead;
        let mut ranked: Vec<Notch> = ctx.reachable.iter().collect();
        ranked.sort_by(|a, b| {
            let da = (projected - a.height).abs();
            let db = (projected - b.height).abs();
            da.total_cmp(&db).then(a.height.total_cmp(&b.height))
        });
        match ranked.as_slice() {
            [] => None,
            [first, second, ..] if ctx.velocity.y.abs() > self.minimum_velocity => {
                if ctx.velocity.y < 0.0 {
                    Some(first.index.max(second.index))
                } else {
                    Some(first.index.min(second.index))
                }
            }
            [first, ..] => Some(first.index),
        }
    }
}

/// Always settles at the reachable notch closest to the current height.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Nearest;

impl TargetNotchPolicy for Nearest {
    fn target_notch_index(&self, ctx: &TargetNotchContext<'_>) -> Option<usize> {
        ctx.reachable.nearest(ctx.height).map(|n| n.index)
    }
}
