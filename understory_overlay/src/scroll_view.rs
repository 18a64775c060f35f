// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A headless scroll view.
//!
//! ## Overview
//!
//! The container never owns the scrollable content; it only needs the few things a
//! platform scroll view exposes: the content offset and inset, whether the user is
//! tracking, the internal pan gesture's translation and velocity, and a single
//! *delegate slot* that receives scroll callbacks.
//!
//! [`ScrollView`] models exactly that. It is a cheap, clonable handle; clones share state
//! and compare equal by identity. The host mirrors its platform scroll view into it and
//! calls the gesture helpers ([`begin_dragging`](ScrollView::begin_dragging),
//! [`pan_to`](ScrollView::pan_to), [`end_dragging`](ScrollView::end_dragging)) as events
//! arrive.
//!
//! The delegate slot holds a weak reference, like the platform's. Writes to the slot are
//! observable through [`ScrollView::observe_delegate`], which is how the forwarding proxy
//! notices when someone else takes the slot.
//!
//! Coordinates follow the platform: `content_offset.y` grows as content scrolls up, and
//! the content origin is in bounds while `content_offset.y <= -content_inset.y0`.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use kurbo::{Insets, Point, Rect, Vec2};

use crate::proxy::ScrollDelegateProxy;

/// Receives scroll callbacks through a [`ScrollView`]'s delegate slot.
///
/// Every method has an empty default, mirroring the platform's optional protocol.
pub trait ScrollViewDelegate {
    /// The user started dragging the content.
    fn will_begin_dragging(&self, _scroll_view: &ScrollView) {}

    /// The content offset changed.
    fn did_scroll(&self, _scroll_view: &ScrollView) {}

    /// The user lifted the finger.
    ///
    /// `velocity` is the content velocity in points per millisecond, positive `y` when the
    /// content moves up. `target_content_offset` is where deceleration will stop and may
    /// be changed.
    fn will_end_dragging(
        &self,
        _scroll_view: &ScrollView,
        _velocity: Vec2,
        _target_content_offset: &mut Point,
    ) {
    }

    /// Dragging ended. `will_decelerate` is `true` if the content keeps moving.
    fn did_end_dragging(&self, _scroll_view: &ScrollView, _will_decelerate: bool) {}

    /// Deceleration started.
    fn will_begin_decelerating(&self, _scroll_view: &ScrollView) {}

    /// Deceleration ended.
    fn did_end_decelerating(&self, _scroll_view: &ScrollView) {}

    /// A programmatic scroll animation ended.
    fn did_end_scrolling_animation(&self, _scroll_view: &ScrollView) {}

    /// Whether a scroll-to-top request should be honored.
    fn should_scroll_to_top(&self, _scroll_view: &ScrollView) -> bool {
        true
    }

    /// The content was scrolled to the top.
    fn did_scroll_to_top(&self, _scroll_view: &ScrollView) {}

    /// Downcast hook used to detect forwarding proxies in the slot.
    #[doc(hidden)]
    fn as_delegate_proxy(&self) -> Option<&ScrollDelegateProxy> {
        None
    }
}

type Observer = Rc<dyn Fn(&ScrollView)>;

struct ScrollViewState {
    frame: Cell<Rect>,
    content_offset: Cell<Point>,
    content_inset: Cell<Insets>,
    tracking: Cell<bool>,
    pan_translation: Cell<Vec2>,
    pan_velocity: Cell<Vec2>,
    delegate: RefCell<Option<Weak<dyn ScrollViewDelegate>>>,
    observers: RefCell<Vec<(u64, Observer)>>,
    next_observer: Cell<u64>,
}

/// Shared handle to a headless scroll view.
#[derive(Clone)]
pub struct ScrollView {
    state: Rc<ScrollViewState>,
}

impl core::fmt::Debug for ScrollView {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScrollView")
            .field("frame", &self.state.frame.get())
            .field("content_offset", &self.state.content_offset.get())
            .field("content_inset", &self.state.content_inset.get())
            .field("tracking", &self.state.tracking.get())
            .field("has_delegate", &self.delegate().is_some())
            .finish_non_exhaustive()
    }
}

impl PartialEq for ScrollView {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl Eq for ScrollView {}

impl Default for ScrollView {
    fn default() -> Self {
        Self::new(Rect::ZERO)
    }
}

impl ScrollView {
    /// A scroll view occupying `frame` in container coordinates.
    pub fn new(frame: Rect) -> Self {
        Self {
            state: Rc::new(ScrollViewState {
                frame: Cell::new(frame),
                content_offset: Cell::new(Point::ORIGIN),
                content_inset: Cell::new(Insets::ZERO),
                tracking: Cell::new(false),
                pan_translation: Cell::new(Vec2::ZERO),
                pan_velocity: Cell::new(Vec2::ZERO),
                delegate: RefCell::new(None),
                observers: RefCell::new(Vec::new()),
                next_observer: Cell::new(0),
            }),
        }
    }

    /// A non-owning handle.
    pub fn downgrade(&self) -> WeakScrollView {
        WeakScrollView(Rc::downgrade(&self.state))
    }

    /// Frame in container coordinates.
    pub fn frame(&self) -> Rect {
        self.state.frame.get()
    }

    /// Move or resize the scroll view.
    pub fn set_frame(&self, frame: Rect) {
        self.state.frame.set(frame);
    }

    /// Current content offset.
    pub fn content_offset(&self) -> Point {
        self.state.content_offset.get()
    }

    /// Set the content offset. Notifies the delegate's `did_scroll` if it changed.
    pub fn set_content_offset(&self, offset: Point) {
        if self.state.content_offset.get() == offset {
            return;
        }
        self.state.content_offset.set(offset);
        if let Some(delegate) = self.delegate() {
            delegate.did_scroll(self);
        }
    }

    /// Content inset. `y0` is the top inset.
    pub fn content_inset(&self) -> Insets {
        self.state.content_inset.get()
    }

    /// Set the content inset.
    pub fn set_content_inset(&self, inset: Insets) {
        self.state.content_inset.set(inset);
    }

    /// `true` while a finger is on the content.
    pub fn is_tracking(&self) -> bool {
        self.state.tracking.get()
    }

    /// Set the tracking flag without emitting callbacks.
    pub fn set_tracking(&self, tracking: bool) {
        self.state.tracking.set(tracking);
    }

    /// Translation of the internal pan gesture since it began.
    pub fn pan_translation(&self) -> Vec2 {
        self.state.pan_translation.get()
    }

    /// Reset or adjust the internal pan gesture's translation.
    pub fn set_pan_translation(&self, translation: Vec2) {
        self.state.pan_translation.set(translation);
    }

    /// Velocity of the internal pan gesture, points per second.
    pub fn pan_velocity(&self) -> Vec2 {
        self.state.pan_velocity.get()
    }

    /// Set the velocity of the internal pan gesture.
    pub fn set_pan_velocity(&self, velocity: Vec2) {
        self.state.pan_velocity.set(velocity);
    }

    /// `true` while the finger moves up.
    pub fn scrolls_up(&self) -> bool {
        self.pan_velocity().y < 0.0
    }

    /// `true` when the top of the content is at or below the top inset.
    pub fn is_content_origin_in_bounds(&self) -> bool {
        self.content_offset().y <= -self.content_inset().y0
    }

    /// Scroll so the top of the content sits at the top inset.
    pub fn scroll_to_top(&self) {
        let offset = self.content_offset();
        self.set_content_offset(Point::new(offset.x, -self.content_inset().y0));
    }

    /// Current delegate, if it is still alive.
    pub fn delegate(&self) -> Option<Rc<dyn ScrollViewDelegate>> {
        self.state.delegate.borrow().as_ref().and_then(Weak::upgrade)
    }

    /// The raw slot content, even if the delegate is gone.
    pub fn delegate_weak(&self) -> Option<Weak<dyn ScrollViewDelegate>> {
        self.state.delegate.borrow().clone()
    }

    /// `true` if `delegate` occupies the slot.
    pub fn is_delegate(&self, delegate: &Weak<dyn ScrollViewDelegate>) -> bool {
        self.state
            .delegate
            .borrow()
            .as_ref()
            .is_some_and(|current| Weak::ptr_eq(current, delegate))
    }

    /// Put `delegate` in the slot and notify delegate observers.
    pub fn set_delegate(&self, delegate: Option<Weak<dyn ScrollViewDelegate>>) {
        *self.state.delegate.borrow_mut() = delegate;
        let observers: Vec<Observer> = self
            .state
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();
        for observer in observers {
            observer(self);
        }
    }

    /// Call `observer` after every write to the delegate slot.
    ///
    /// Observation stops when the returned token is dropped.
    pub fn observe_delegate(&self, observer: impl Fn(&Self) + 'static) -> DelegateObservation {
        let id = self.state.next_observer.get();
        self.state.next_observer.set(id + 1);
        self.state
            .observers
            .borrow_mut()
            .push((id, Rc::new(observer)));
        DelegateObservation {
            state: Rc::downgrade(&self.state),
            id,
        }
    }

    /// A finger touched down and started moving the content.
    pub fn begin_dragging(&self) {
        self.state.tracking.set(true);
        self.state.pan_translation.set(Vec2::ZERO);
        self.state.pan_velocity.set(Vec2::ZERO);
        if let Some(delegate) = self.delegate() {
            delegate.will_begin_dragging(self);
        }
    }

    /// The finger moved: the pan gesture now reports `translation` and `velocity`.
    ///
    /// The content follows the finger, so the offset moves by the opposite of the change
    /// in translation.
    pub fn pan_to(&self, translation: Vec2, velocity: Vec2) {
        let delta = translation - self.pan_translation();
        self.state.pan_translation.set(translation);
        self.state.pan_velocity.set(velocity);
        let offset = self.content_offset();
        self.set_content_offset(offset - delta);
    }

    /// The finger lifted with `velocity` (points per millisecond, content direction).
    ///
    /// Returns the deceleration target after the delegate had a chance to change it.
    pub fn end_dragging(&self, velocity: Vec2, proposed_target: Point) -> Point {
        let mut target = proposed_target;
        if let Some(delegate) = self.delegate() {
            delegate.will_end_dragging(self, velocity, &mut target);
        }
        self.state.tracking.set(false);
        let will_decelerate = target != self.content_offset();
        if let Some(delegate) = self.delegate() {
            delegate.did_end_dragging(self, will_decelerate);
            if will_decelerate {
                delegate.will_begin_decelerating(self);
            }
        }
        target
    }

    /// Deceleration reached its target.
    pub fn end_decelerating(&self, offset: Point) {
        self.set_content_offset(offset);
        if let Some(delegate) = self.delegate() {
            delegate.did_end_decelerating(self);
        }
    }

    /// A scroll-to-top request, e.g. a status bar tap. Returns `true` if honored.
    pub fn request_scroll_to_top(&self) -> bool {
        let allowed = self
            .delegate()
            .is_none_or(|delegate| delegate.should_scroll_to_top(self));
        if !allowed {
            return false;
        }
        self.scroll_to_top();
        if let Some(delegate) = self.delegate() {
            delegate.did_scroll_to_top(self);
        }
        true
    }
}

/// Non-owning handle to a [`ScrollView`].
#[derive(Clone)]
pub struct WeakScrollView(Weak<ScrollViewState>);

impl core::fmt::Debug for WeakScrollView {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("WeakScrollView")
            .field(&(self.0.strong_count() > 0))
            .finish()
    }
}

impl WeakScrollView {
    /// The scroll view, if it is still alive.
    pub fn upgrade(&self) -> Option<ScrollView> {
        self.0.upgrade().map(|state| ScrollView { state })
    }
}

/// Token returned by [`ScrollView::observe_delegate`]. Dropping it stops observation.
pub struct DelegateObservation {
    state: Weak<ScrollViewState>,
    id: u64,
}

impl core::fmt::Debug for DelegateObservation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DelegateObservation")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl Drop for DelegateObservation {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            state.observers.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }
}
