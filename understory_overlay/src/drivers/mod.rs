// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture drivers.
//!
//! Drivers turn input streams into [`OverlayTranslationController`] calls. They hold the
//! controller weakly and never touch the translation height themselves.
//!
//! - [`pan`]: a direct pan gesture on the overlay.
//! - [`scroll`]: the internal pan gesture of a scroll view inside the overlay, handing
//!   movement back and forth between the content and the overlay.
//!
//! [`OverlayTranslationController`]: crate::controller::OverlayTranslationController

pub mod pan;
pub mod scroll;

pub use pan::{PanGestureDriver, PanGestureEvent, PanPhase, PanResponse};
pub use scroll::{ScrollViewDriver, ScrollViewDriverOptions};
