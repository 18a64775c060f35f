// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Direct pan gestures on the overlay.

use alloc::rc::{Rc, Weak};
use core::cell::{Cell, RefCell};

use kurbo::{Point, Vec2};
use log::{debug, trace};

use crate::controller::OverlayTranslationController;
use crate::scroll_view::{ScrollView, WeakScrollView};

/// Phase of a pan gesture, as reported by the host's recognizer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PanPhase {
    /// The finger moved far enough to recognize a pan.
    Began,
    /// The finger moved.
    Changed,
    /// The finger lifted.
    Ended,
    /// The recognizer failed.
    Failed,
    /// The recognizer was cancelled.
    Cancelled,
}

/// One pan gesture update.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PanGestureEvent {
    /// Phase of the gesture.
    pub phase: PanPhase,
    /// Where the touch started, container coordinates.
    pub start_location: Point,
    /// Accumulated translation since the gesture began.
    pub translation: Vec2,
    /// Current velocity in points per second.
    pub velocity: Vec2,
}

impl PanGestureEvent {
    /// An event without movement.
    pub fn new(phase: PanPhase, start_location: Point) -> Self {
        Self {
            phase,
            start_location,
            translation: Vec2::ZERO,
            velocity: Vec2::ZERO,
        }
    }

    /// Same event with `translation`.
    #[must_use]
    pub fn with_translation(mut self, translation: Vec2) -> Self {
        self.translation = translation;
        self
    }

    /// Same event with `velocity`.
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }
}

/// What the host should do with its recognizer after an event.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PanResponse {
    /// The overlay follows the gesture.
    Tracking,
    /// Reset the recognizer so views underneath receive the touch.
    Cancelled,
    /// The event was not for this driver.
    Ignored,
}

/// Feeds a pan gesture into a translation controller.
pub struct PanGestureDriver {
    controller: Weak<dyn OverlayTranslationController>,
    scroll_view: RefCell<Option<WeakScrollView>>,
    tracking: Cell<bool>,
}

impl core::fmt::Debug for PanGestureDriver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PanGestureDriver")
            .field("tracking", &self.tracking.get())
            .finish_non_exhaustive()
    }
}

impl PanGestureDriver {
    /// A driver for `controller`.
    pub fn new(controller: Weak<dyn OverlayTranslationController>) -> Self {
        Self {
            controller,
            scroll_view: RefCell::new(None),
            tracking: Cell::new(false),
        }
    }

    /// Touches starting inside `scroll_view` belong to the scroll driver.
    pub fn set_scroll_view(&self, scroll_view: Option<&ScrollView>) {
        *self.scroll_view.borrow_mut() = scroll_view.map(ScrollView::downgrade);
    }

    /// `true` between an accepted `Began` and the terminal phase.
    pub fn is_tracking(&self) -> bool {
        self.tracking.get()
    }

    /// Handle one gesture update.
    pub fn handle(&self, event: &PanGestureEvent) -> PanResponse {
        let Some(controller) = self.controller.upgrade() else {
            return PanResponse::Ignored;
        };
        match event.phase {
            PanPhase::Began => {
                if self.starts_in_scroll_view(event.start_location)
                    || !controller.is_draggable(event.start_location)
                {
                    debug!("pan at {:?} cancelled", event.start_location);
                    return PanResponse::Cancelled;
                }
                self.tracking.set(true);
                controller.start_translation();
                controller.drag_overlay(event.translation.y, true);
                PanResponse::Tracking
            }
            PanPhase::Changed => {
                if !self.tracking.get() {
                    return PanResponse::Ignored;
                }
                trace!("pan translation {}", event.translation.y);
                controller.drag_overlay(event.translation.y, true);
                PanResponse::Tracking
            }
            PanPhase::Ended | PanPhase::Failed | PanPhase::Cancelled => {
                if !self.tracking.replace(false) {
                    return PanResponse::Ignored;
                }
                controller.end_translation(event.velocity, None);
                PanResponse::Ignored
            }
        }
    }

    fn starts_in_scroll_view(&self, point: Point) -> bool {
        self.scroll_view
            .borrow()
            .as_ref()
            .and_then(WeakScrollView::upgrade)
            .is_some_and(|scroll_view| scroll_view.frame().contains(point))
    }
}

/// Coerce a concrete controller for [`PanGestureDriver::new`].
pub(crate) fn weak_controller<C: OverlayTranslationController + 'static>(
    controller: &Rc<C>,
) -> Weak<dyn OverlayTranslationController> {
    let weak: Weak<C> = Rc::downgrade(controller);
    weak
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::fake::FakeController;
    use crate::types::TranslationPosition;
    use kurbo::Rect;

    fn driver() -> (Rc<FakeController>, PanGestureDriver) {
        let controller = Rc::new(FakeController::new(TranslationPosition::Bottom, 0.0));
        let driver = PanGestureDriver::new(weak_controller(&controller));
        (controller, driver)
    }

    #[test]
    fn drags_by_translation() {
        let (controller, driver) = driver();
        let start = Point::new(10.0, 10.0);
        assert_eq!(
            driver.handle(&PanGestureEvent::new(PanPhase::Began, start)),
            PanResponse::Tracking
        );
        assert!(controller.in_translation.get());
        let moved = PanGestureEvent::new(PanPhase::Changed, start);
        driver.handle(&moved.with_translation(Vec2::new(0.0, -100.0)));
        assert_eq!(controller.height.get(), 100.0);
        driver.handle(&moved.with_translation(Vec2::new(0.0, -90.0)));
        assert_eq!(controller.height.get(), 90.0);
        let end = PanGestureEvent::new(PanPhase::Ended, start).with_velocity(Vec2::new(0.0, 300.0));
        driver.handle(&end);
        assert!(!controller.in_translation.get());
        assert_eq!(*controller.ended.borrow(), Some((Vec2::new(0.0, 300.0), None)));
    }

    #[test]
    fn undraggable_point_cancels() {
        let (controller, driver) = driver();
        controller.draggable.set(false);
        let start = Point::new(10.0, 10.0);
        assert_eq!(
            driver.handle(&PanGestureEvent::new(PanPhase::Began, start)),
            PanResponse::Cancelled
        );
        assert!(!controller.in_translation.get());
        assert_eq!(
            driver.handle(&PanGestureEvent::new(PanPhase::Changed, start)),
            PanResponse::Ignored
        );
        driver.handle(&PanGestureEvent::new(PanPhase::Cancelled, start));
        assert!(controller.ended.borrow().is_none());
    }

    #[test]
    fn touches_in_scroll_view_are_left_alone() {
        let (controller, driver) = driver();
        let scroll_view = ScrollView::new(Rect::new(0.0, 50.0, 300.0, 400.0));
        driver.set_scroll_view(Some(&scroll_view));
        let inside = PanGestureEvent::new(PanPhase::Began, Point::new(20.0, 60.0));
        assert_eq!(driver.handle(&inside), PanResponse::Cancelled);
        let outside = PanGestureEvent::new(PanPhase::Began, Point::new(20.0, 20.0));
        assert_eq!(driver.handle(&outside), PanResponse::Tracking);
        assert!(controller.in_translation.get());
    }
}
