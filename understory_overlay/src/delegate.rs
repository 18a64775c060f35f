// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The embedding application's side of the container.
//!
//! ## Overview
//!
//! [`ContainerDelegate`] is a single interface with every member required: queries the
//! container asks (how many notches, how tall, which are reachable, which policies to
//! use) and one-way notifications it emits.
//!
//! Most applications only care about a few members. [`DefaultContainerDelegate`]
//! implements all of them with the documented fallbacks, so an application delegate can
//! hold one and forward whatever it does not customize:
//!
//! ```rust
//! use kurbo::{Point, Vec2};
//! use std::rc::Rc;
//! use understory_notch::policy::TargetNotchPolicy;
//! use understory_notch::translation::TranslationFunction;
//! use understory_overlay::animator::AnimationController;
//! use understory_overlay::coordinator::TransitionCoordinator;
//! use understory_overlay::delegate::{ContainerDelegate, DefaultContainerDelegate, NotchHeight};
//! use understory_overlay::scroll_view::ScrollView;
//! use understory_overlay::types::ChildId;
//!
//! struct Maps {
//!     defaults: DefaultContainerDelegate,
//! }
//!
//! impl ContainerDelegate for Maps {
//!     fn number_of_notches(&self) -> usize { self.defaults.number_of_notches() }
//!     fn height_for_notch(&self, index: usize, space: f64) -> f64 {
//!         self.defaults.height_for_notch(index, space)
//!     }
//!     // The full-height notch is only reachable for the search overlay.
//!     fn can_reach_notch(&self, index: usize, overlay: ChildId) -> bool {
//!         index < 2 || overlay == ChildId(1)
//!     }
//!     fn scroll_view_driving_overlay(&self, overlay: ChildId) -> Option<ScrollView> {
//!         self.defaults.scroll_view_driving_overlay(overlay)
//!     }
//!     fn should_start_dragging(&self, overlay: ChildId, point: Point) -> bool {
//!         self.defaults.should_start_dragging(overlay, point)
//!     }
//!     fn translation_function(&self, overlay: ChildId) -> Option<Rc<dyn TranslationFunction>> {
//!         self.defaults.translation_function(overlay)
//!     }
//!     fn target_notch_policy(&self, overlay: ChildId) -> Option<Rc<dyn TargetNotchPolicy>> {
//!         self.defaults.target_notch_policy(overlay)
//!     }
//!     fn animation_controller(&self, overlay: ChildId) -> Option<Rc<dyn AnimationController>> {
//!         self.defaults.animation_controller(overlay)
//!     }
//!     fn will_start_dragging(&self, _: ChildId) {}
//!     fn did_drag(&self, _: ChildId, _: f64) {}
//!     fn will_end_dragging(&self, _: ChildId, _: Vec2) {}
//!     fn will_move_to_notch(&self, _: ChildId, _: usize) {}
//!     fn did_move_to_notch(&self, _: ChildId, _: usize) {}
//!     fn will_translate(&self, _: ChildId, _: &TransitionCoordinator) {}
//!     fn did_request_dismissal(&self, _: ChildId, _: Vec2) {}
//! }
//!
//! let maps = Maps {
//!     defaults: DefaultContainerDelegate::new(vec![
//!         NotchHeight::Points(120.0),
//!         NotchHeight::Fraction(0.5),
//!         NotchHeight::Fraction(1.0),
//!     ]),
//! };
//! assert_eq!(maps.height_for_notch(1, 800.0), 400.0);
//! assert!(!maps.can_reach_notch(2, ChildId(9)));
//! ```

use alloc::rc::Rc;
use alloc::vec::Vec;

use kurbo::{Point, Vec2};
use understory_notch::policy::TargetNotchPolicy;
use understory_notch::translation::TranslationFunction;

use crate::animator::AnimationController;
use crate::coordinator::TransitionCoordinator;
use crate::scroll_view::ScrollView;
use crate::types::ChildId;

/// Configuration queries and notifications of an overlay container.
///
/// Queries are answered lazily and cached by the container until invalidated.
/// Notifications are advisory: the container never reads anything back from them.
pub trait ContainerDelegate {
    /// Number of notches. Cached until the next invalidation.
    fn number_of_notches(&self) -> usize;

    /// Height of notch `index` given the container's available height.
    ///
    /// Heights must be ascending by index.
    fn height_for_notch(&self, index: usize, available_space: f64) -> f64;

    /// Whether `overlay` may rest at notch `index`.
    fn can_reach_notch(&self, index: usize, overlay: ChildId) -> bool;

    /// Scroll view whose scrolling should drive `overlay`, if any.
    fn scroll_view_driving_overlay(&self, overlay: ChildId) -> Option<ScrollView>;

    /// Whether a touch starting at `point` (container coordinates) may drag `overlay`.
    fn should_start_dragging(&self, overlay: ChildId, point: Point) -> bool;

    /// Override of the rubber-band translation function.
    fn translation_function(&self, overlay: ChildId) -> Option<Rc<dyn TranslationFunction>>;

    /// Override of the rushing-forward target notch policy.
    fn target_notch_policy(&self, overlay: ChildId) -> Option<Rc<dyn TargetNotchPolicy>>;

    /// Override of the spring animation controller.
    fn animation_controller(&self, overlay: ChildId) -> Option<Rc<dyn AnimationController>>;

    /// A drag session began.
    fn will_start_dragging(&self, overlay: ChildId);

    /// The translation height changed to `height` outside of a settle animation.
    fn did_drag(&self, overlay: ChildId, height: f64);

    /// The finger lifted with `velocity` (points per second).
    fn will_end_dragging(&self, overlay: ChildId, velocity: Vec2);

    /// The overlay is about to head for notch `index`.
    fn will_move_to_notch(&self, overlay: ChildId, index: usize);

    /// The overlay arrived at notch `index`.
    fn did_move_to_notch(&self, overlay: ChildId, index: usize);

    /// A transition is about to start. Register alongside work on `coordinator`.
    fn will_translate(&self, overlay: ChildId, coordinator: &TransitionCoordinator);

    /// The sheet dismissal policy accepted a release.
    fn did_request_dismissal(&self, overlay: ChildId, velocity: Vec2);
}

/// How a [`DefaultContainerDelegate`] sizes a notch.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum NotchHeight {
    /// Fixed height in points.
    Points(f64),
    /// Fraction of the available space.
    Fraction(f64),
}

impl NotchHeight {
    /// Resolve against the available space.
    pub fn resolve(self, available_space: f64) -> f64 {
        match self {
            Self::Points(points) => points,
            Self::Fraction(fraction) => available_space * fraction,
        }
    }
}

/// The documented fallbacks for every [`ContainerDelegate`] member.
///
/// - One notch at the full available height unless configured otherwise.
/// - Every notch reachable, every point draggable, no driving scroll view.
/// - No overrides: the container uses [`RubberBand`], [`RushingForward`] and a spring.
/// - Notifications are ignored.
///
/// [`RubberBand`]: understory_notch::translation::RubberBand
/// [`RushingForward`]: understory_notch::policy::RushingForward
#[derive(Clone, Debug, PartialEq)]
pub struct DefaultContainerDelegate {
    notches: Vec<NotchHeight>,
}

impl Default for DefaultContainerDelegate {
    fn default() -> Self {
        Self {
            notches: alloc::vec![NotchHeight::Fraction(1.0)],
        }
    }
}

impl DefaultContainerDelegate {
    /// A delegate with the given notch heights, ascending.
    pub fn new(notches: Vec<NotchHeight>) -> Self {
        Self { notches }
    }

    /// A delegate with fixed heights in points, ascending.
    pub fn with_heights(heights: &[f64]) -> Self {
        Self::new(heights.iter().copied().map(NotchHeight::Points).collect())
    }
}

impl ContainerDelegate for DefaultContainerDelegate {
    fn number_of_notches(&self) -> usize {
        self.notches.len()
    }

    fn height_for_notch(&self, index: usize, available_space: f64) -> f64 {
        self.notches
            .get(index)
            .map_or(0.0, |notch| notch.resolve(available_space))
    }

    fn can_reach_notch(&self, _index: usize, _overlay: ChildId) -> bool {
        true
    }

    fn scroll_view_driving_overlay(&self, _overlay: ChildId) -> Option<ScrollView> {
        None
    }

    fn should_start_dragging(&self, _overlay: ChildId, _point: Point) -> bool {
        true
    }

    fn translation_function(&self, _overlay: ChildId) -> Option<Rc<dyn TranslationFunction>> {
        None
    }

    fn target_notch_policy(&self, _overlay: ChildId) -> Option<Rc<dyn TargetNotchPolicy>> {
        None
    }

    fn animation_controller(&self, _overlay: ChildId) -> Option<Rc<dyn AnimationController>> {
        None
    }

    fn will_start_dragging(&self, _overlay: ChildId) {}

    fn did_drag(&self, _overlay: ChildId, _height: f64) {}

    fn will_end_dragging(&self, _overlay: ChildId, _velocity: Vec2) {}

    fn will_move_to_notch(&self, _overlay: ChildId, _index: usize) {}

    fn did_move_to_notch(&self, _overlay: ChildId, _index: usize) {}

    fn will_translate(&self, _overlay: ChildId, _coordinator: &TransitionCoordinator) {}

    fn did_request_dismissal(&self, _overlay: ChildId, _velocity: Vec2) {}
}
