// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_notch --heading-base-level=0

//! Understory Notch: the pure decision layer of a draggable overlay.
//!
//! ## Overview
//!
//! A draggable overlay (a bottom sheet, a Maps-style pull-up panel) rests at one of a
//! few discrete heights called *notches*. While the user drags, a raw translation has to
//! be turned into a height; when the user lets go, something has to decide where the
//! overlay settles, or whether a sheet should be dismissed altogether.
//!
//! This crate holds those decisions and nothing else. It has no state, no clock and no
//! notion of views:
//!
//! - [`Notches`](crate::notches::Notches) is an ascending list of notch heights, and
//!   [`Reachable`](crate::notches::Reachable) is the subset currently enabled.
//! - [`TranslationFunction`](crate::translation::TranslationFunction) maps a raw drag
//!   translation into a height. [`RubberBand`](crate::translation::RubberBand) softens
//!   overshoot logarithmically, [`Clamp`](crate::translation::Clamp) stops hard.
//! - [`TargetNotchPolicy`](crate::policy::TargetNotchPolicy) picks the notch to settle at.
//!   [`RushingForward`](crate::policy::RushingForward) skips ahead on fast flicks.
//! - [`SheetDismissalPolicy`](crate::dismissal::SheetDismissalPolicy) decides whether a
//!   release should dismiss a sheet instead of settling.
//!
//! The stateful side (the translation controller, gesture drivers and animations) lives in
//! `understory_overlay`, which consumes these traits.
//!
//! ## Example
//!
//! ```rust
//! use kurbo::Vec2;
//! use understory_notch::notches::Notches;
//! use understory_notch::policy::{RushingForward, TargetNotchContext, TargetNotchPolicy};
//! use understory_notch::translation::{RubberBand, TranslationFunction, TranslationParameters};
//!
//! let notches = Notches::new(vec![100.0, 200.0, 300.0]);
//! let reachable = notches.reachable_with(|_| true);
//!
//! // Dragging past the top grows the overlay, but less and less.
//! let band = RubberBand::default();
//! let h = band.overlay_translation_height(&TranslationParameters {
//!     minimum_height: 100.0,
//!     maximum_height: 300.0,
//!     translation: 600.0,
//! });
//! assert!(h > 300.0 && h < 600.0);
//!
//! // A fast upward flick from 125 rushes past notch 0 to notch 1.
//! let policy = RushingForward::default();
//! let ctx = TargetNotchContext {
//!     height: 125.0,
//!     velocity: Vec2::new(0.0, -500.0),
//!     reachable: &reachable,
//! };
//! assert_eq!(policy.target_notch_index(&ctx), Some(1));
//! ```
//!
//! ## Conventions
//!
//! Heights are in points and grow upward. Velocities follow pointer coordinates:
//! `velocity.y < 0` is a finger moving up, i.e. an overlay growing.
//!
//! This crate is `no_std` and uses `alloc`. Enable either `std` (default) or `libm`.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("understory_notch requires either the `std` or the `libm` feature");

pub mod dismissal;
pub mod notches;
pub mod policy;
pub mod translation;

pub use notches::{Notch, Notches, Reachable};

#[cfg(feature = "std")]
pub(crate) fn log10(x: f64) -> f64 {
    x.log10()
}

#[cfg(all(not(feature = "std"), feature = "libm"))]
pub(crate) fn log10(x: f64) -> f64 {
    libm::log10(x)
}
