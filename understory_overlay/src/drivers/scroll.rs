// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll view hand-off.
//!
//! ## Overview
//!
//! A list inside the overlay and the overlay itself compete for the same finger. The
//! [`ScrollViewDriver`] makes them feel like one drag: depending on where the overlay is,
//! scroll movement either scrolls the content or moves the overlay while the content
//! offset stays pinned.
//!
//! | Position     | The overlay follows the scroll when                       |
//! |--------------|-----------------------------------------------------------|
//! | `Bottom`     | the content origin is out of bounds and the finger moves up |
//! | `Top`        | the content origin is in bounds and the finger moves down   |
//! | `InFlight`   | the content origin is in bounds, or the finger moves up     |
//! | `Stationary` | never                                                     |
//!
//! The driver keeps its own accumulated overlay translation, separate from the scroll
//! view's pan translation, since a single touch may alternate between scrolling the
//! content and moving the overlay. Both are reset when the finger lifts.

use alloc::rc::{Rc, Weak};
use core::cell::Cell;

use kurbo::{Point, Vec2};
use log::{debug, trace};

use crate::controller::OverlayTranslationController;
use crate::proxy::{OverlayScrollViewDelegate, ScrollDelegateProxy};
use crate::scroll_view::{ScrollView, WeakScrollView};
use crate::types::TranslationPosition;

/// Options of a [`ScrollViewDriver`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScrollViewDriverOptions {
    /// Settle at the nearest reachable notch on release instead of asking the policy.
    pub snaps_to_nearest_notch: bool,
}

/// Drives the overlay from a scroll view's gestures.
pub struct ScrollViewDriver {
    controller: Weak<dyn OverlayTranslationController>,
    scroll_view: WeakScrollView,
    proxy: Rc<ScrollDelegateProxy>,
    options: ScrollViewDriverOptions,
    overlay_translation: Cell<f64>,
    scroll_translation: Cell<f64>,
    last_offset: Cell<Point>,
    adjusting: Cell<bool>,
}

impl core::fmt::Debug for ScrollViewDriver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScrollViewDriver")
            .field("options", &self.options)
            .field("overlay_translation", &self.overlay_translation.get())
            .field("scroll_translation", &self.scroll_translation.get())
            .field("last_offset", &self.last_offset.get())
            .finish_non_exhaustive()
    }
}

impl ScrollViewDriver {
    /// Start following `scroll_view`. Its delegate slot is taken over until the driver is
    /// dropped or [`detach`](Self::detach) is called.
    pub fn new(
        controller: Weak<dyn OverlayTranslationController>,
        scroll_view: &ScrollView,
        options: ScrollViewDriverOptions,
    ) -> Rc<Self> {
        let driver = Rc::new(Self {
            controller,
            scroll_view: scroll_view.downgrade(),
            proxy: ScrollDelegateProxy::new(),
            options,
            overlay_translation: Cell::new(0.0),
            scroll_translation: Cell::new(0.0),
            last_offset: Cell::new(scroll_view.content_offset()),
            adjusting: Cell::new(false),
        });
        let delegate: Weak<dyn OverlayScrollViewDelegate> = Rc::downgrade(&driver) as Weak<Self>;
        driver.proxy.forward(delegate, scroll_view);
        debug!("scroll view driver attached");
        driver
    }

    /// The followed scroll view, if alive.
    pub fn scroll_view(&self) -> Option<ScrollView> {
        self.scroll_view.upgrade()
    }

    /// Options in use.
    pub fn options(&self) -> ScrollViewDriverOptions {
        self.options
    }

    /// Give the delegate slot back to its original owner.
    pub fn detach(&self) {
        self.proxy.cancel_forwarding();
    }

    fn should_drag_overlay(
        &self,
        controller: &dyn OverlayTranslationController,
        scroll_view: &ScrollView,
    ) -> bool {
        if !scroll_view.is_tracking() {
            return false;
        }
        let in_bounds = scroll_view.is_content_origin_in_bounds();
        let scrolls_up = scroll_view.scrolls_up();
        match controller.translation_position() {
            TranslationPosition::Bottom => !in_bounds && scrolls_up,
            TranslationPosition::Top => in_bounds && !scrolls_up,
            TranslationPosition::InFlight => in_bounds || scrolls_up,
            TranslationPosition::Stationary => false,
        }
    }

    /// Offset to pin the content at, and the part of the last movement the content used
    /// up to reach the top inset.
    fn adjusted_content_offset(
        &self,
        position: TranslationPosition,
        scroll_view: &ScrollView,
    ) -> (Point, f64) {
        let mut offset = self.last_offset.get();
        let top = -scroll_view.content_inset().y0;
        if matches!(
            position,
            TranslationPosition::InFlight | TranslationPosition::Top
        ) && offset.y < top
        {
            // Left over from a deceleration past the inset.
            offset.y = top;
        }
        let mut consumed = 0.0;
        if (offset.y - top) * (scroll_view.content_offset().y - top) < 0.0 {
            consumed = offset.y - top;
            offset.y = top;
        }
        (offset, consumed)
    }
}

impl OverlayScrollViewDelegate for ScrollViewDriver {
    fn overlay_scroll_view_will_begin_dragging(&self, scroll_view: &ScrollView) {
        self.last_offset.set(scroll_view.content_offset());
    }

    fn overlay_scroll_view_did_scroll(&self, scroll_view: &ScrollView) {
        if self.adjusting.get() {
            return;
        }
        let Some(controller) = self.controller.upgrade() else {
            return;
        };
        let previous = self.scroll_translation.get();
        let translation = scroll_view.pan_translation().y;
        self.scroll_translation.set(translation);
        if !self.should_drag_overlay(&*controller, scroll_view) {
            self.last_offset.set(scroll_view.content_offset());
            return;
        }
        let position = controller.translation_position();
        let (offset, consumed) = self.adjusted_content_offset(position, scroll_view);
        let overlay_translation =
            self.overlay_translation.get() + translation - previous - consumed;
        self.last_offset.set(offset);
        self.adjusting.set(true);
        scroll_view.set_content_offset(offset);
        self.adjusting.set(false);
        let applied = controller.drag_overlay(overlay_translation, false);
        trace!("scroll drives overlay: {overlay_translation} (applied {applied})");
        // A clamped write must not leave a dead zone when the finger reverses.
        self.overlay_translation.set(applied);
    }

    fn overlay_scroll_view_will_end_dragging(
        &self,
        scroll_view: &ScrollView,
        velocity: Vec2,
        target_content_offset: &mut Point,
    ) {
        let Some(controller) = self.controller.upgrade() else {
            return;
        };
        self.overlay_translation.set(0.0);
        self.scroll_translation.set(0.0);
        scroll_view.set_pan_translation(Vec2::ZERO);
        let top = -scroll_view.content_inset().y0;
        match controller.translation_position() {
            TranslationPosition::Bottom if target_content_offset.y > top => {
                target_content_offset.y = top;
            }
            TranslationPosition::InFlight if !controller.has_reached_a_notch() => {
                target_content_offset.y = self.last_offset.get().y;
            }
            _ => {}
        }
        let index = if self.options.snaps_to_nearest_notch {
            controller.nearest_reachable_index()
        } else {
            None
        };
        debug!("scroll released with {velocity:?}, target {target_content_offset:?}");
        controller.end_translation(velocity, index);
    }
}
