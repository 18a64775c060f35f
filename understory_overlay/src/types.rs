// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Small shared types: child identifiers, positions, requests and styles.

/// Identifier of a child managed by an [`OverlayContainer`](crate::container::OverlayContainer).
///
/// The host owns the actual views; the container only tracks their order. The last child
/// is the overlay.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ChildId(pub u32);

/// Where the translation height sits relative to the reachable range.
///
/// Always derived from the current height, never stored.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TranslationPosition {
    /// At the highest reachable notch.
    Top,
    /// At the lowest reachable notch.
    Bottom,
    /// Strictly between the two, or overshooting.
    InFlight,
    /// The reachable range is a single height and the overlay is there.
    Stationary,
}

/// Coarse state of the translation controller.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TranslationState {
    /// No drag session and no settle animation.
    Idle,
    /// A drag session is open.
    Dragging,
    /// A settle animation is running.
    Animating,
}

/// A deferred move, resolved when the next layout pass flushes it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TranslationRequest {
    /// Move to this notch index.
    ToIndex(usize),
    /// Return to the notch most recently targeted.
    ToLastReachedIndex,
    /// Let the target-notch policy pick from the current height.
    BasedOnTargetPolicy,
}

/// How the overlay's own content height relates to the translation height.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum OverlayStyle {
    /// The content is exactly as tall as the translation height.
    #[default]
    FlexibleHeight,
    /// The content is always as tall as the highest notch and slides.
    Rigid,
    /// Like `Rigid`, but grows past the highest notch while overshooting.
    ExpandableHeight,
}

impl OverlayStyle {
    /// Height of the overlay content for a translation height and the highest notch.
    pub fn content_height(self, translation_height: f64, maximum_notch_height: f64) -> f64 {
        match self {
            Self::FlexibleHeight => translation_height,
            Self::Rigid => maximum_notch_height,
            Self::ExpandableHeight => maximum_notch_height.max(translation_height),
        }
    }
}
