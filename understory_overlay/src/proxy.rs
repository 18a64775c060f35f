// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Forwarding proxy for a scroll view's delegate slot.
//!
//! ## Overview
//!
//! The scroll driver needs three callbacks from the scroll view it follows, but the slot
//! usually already holds the application's delegate. [`ScrollDelegateProxy`] takes the
//! slot, remembers what it found there, and forwards every callback: the intercepted
//! ones go to the overlay first and then to the original delegate; everything else goes
//! to the original delegate only.
//!
//! The proxy observes the slot. When something else is written to it, the newcomer
//! becomes the new original and the proxy takes the slot back. A newcomer that is itself
//! a proxy already forwarding to this one is left alone, so two containers can share a
//! scroll view.
//!
//! [`ScrollDelegateProxy::cancel_forwarding`] restores the original delegate if the proxy
//! still holds the slot, or splices the proxy out of a chain of proxies otherwise. It is
//! also run on drop.

use alloc::rc::{Rc, Weak};
use core::cell::RefCell;

use kurbo::{Point, Vec2};
use log::debug;

use crate::scroll_view::{DelegateObservation, ScrollView, ScrollViewDelegate, WeakScrollView};

/// Longest proxy chain walked when looking for a proxy.
const MAX_CHAIN: usize = 16;

/// The callbacks a scroll driver intercepts.
pub trait OverlayScrollViewDelegate {
    /// The user started dragging the scroll view's content.
    fn overlay_scroll_view_will_begin_dragging(&self, scroll_view: &ScrollView);

    /// The content offset changed.
    fn overlay_scroll_view_did_scroll(&self, scroll_view: &ScrollView);

    /// The finger lifted.
    ///
    /// `velocity` is the finger velocity in points per second, negative `y` when moving
    /// up. `target_content_offset` may be adjusted.
    fn overlay_scroll_view_will_end_dragging(
        &self,
        scroll_view: &ScrollView,
        velocity: Vec2,
        target_content_offset: &mut Point,
    );
}

/// Occupies a scroll view's delegate slot on behalf of an overlay.
pub struct ScrollDelegateProxy {
    this: Weak<Self>,
    overlay: RefCell<Option<Weak<dyn OverlayScrollViewDelegate>>>,
    original: RefCell<Option<Weak<dyn ScrollViewDelegate>>>,
    scroll_view: RefCell<Option<WeakScrollView>>,
    observation: RefCell<Option<DelegateObservation>>,
}

impl core::fmt::Debug for ScrollDelegateProxy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScrollDelegateProxy")
            .field("is_forwarding", &self.is_forwarding())
            .field("has_original", &self.original.borrow().is_some())
            .finish_non_exhaustive()
    }
}

impl ScrollDelegateProxy {
    /// A proxy that is not forwarding anything yet.
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            overlay: RefCell::new(None),
            original: RefCell::new(None),
            scroll_view: RefCell::new(None),
            observation: RefCell::new(None),
        })
    }

    /// Take `scroll_view`'s delegate slot and forward its callbacks to `overlay`.
    ///
    /// Forwarding to a different scroll view is cancelled first.
    pub fn forward(&self, overlay: Weak<dyn OverlayScrollViewDelegate>, scroll_view: &ScrollView) {
        if self.forwarded_scroll_view().as_ref() == Some(scroll_view) {
            *self.overlay.borrow_mut() = Some(overlay);
            return;
        }
        self.cancel_forwarding();
        *self.overlay.borrow_mut() = Some(overlay);
        *self.original.borrow_mut() = scroll_view.delegate_weak();
        *self.scroll_view.borrow_mut() = Some(scroll_view.downgrade());
        scroll_view.set_delegate(Some(self.as_delegate()));
        let this = self.this.clone();
        let observation = scroll_view.observe_delegate(move |scroll_view| {
            if let Some(proxy) = this.upgrade() {
                proxy.delegate_did_change(scroll_view);
            }
        });
        *self.observation.borrow_mut() = Some(observation);
        debug!("scroll delegate proxy installed");
    }

    /// Give the slot back.
    ///
    /// Restores the original delegate if this proxy still holds the slot, otherwise
    /// removes this proxy from the chain of proxies in front of it.
    pub fn cancel_forwarding(&self) {
        self.observation.borrow_mut().take();
        self.overlay.borrow_mut().take();
        let scroll_view = self
            .scroll_view
            .borrow_mut()
            .take()
            .and_then(|weak| weak.upgrade());
        let original = self.original.borrow_mut().take();
        let Some(scroll_view) = scroll_view else {
            return;
        };
        if scroll_view.is_delegate(&self.as_delegate()) {
            scroll_view.set_delegate(original);
            debug!("scroll delegate restored");
            return;
        }
        // Someone chained in front of us: hand our original to whoever forwards to us.
        let mut current = scroll_view.delegate();
        for _ in 0..MAX_CHAIN {
            let Some(delegate) = current.take() else {
                break;
            };
            let Some(proxy) = delegate.as_delegate_proxy() else {
                break;
            };
            let forwards_to_us = proxy
                .original
                .borrow()
                .as_ref()
                .is_some_and(|weak| Weak::ptr_eq(weak, &self.as_delegate()));
            if forwards_to_us {
                *proxy.original.borrow_mut() = original;
                debug!("scroll delegate proxy spliced out of chain");
                return;
            }
            current = proxy.original_delegate();
        }
    }

    /// `true` while installed on a live scroll view.
    pub fn is_forwarding(&self) -> bool {
        self.forwarded_scroll_view().is_some()
    }

    /// The delegate that receives the callbacks the overlay does not intercept.
    pub fn original_delegate(&self) -> Option<Rc<dyn ScrollViewDelegate>> {
        self.original.borrow().as_ref().and_then(Weak::upgrade)
    }

    fn forwarded_scroll_view(&self) -> Option<ScrollView> {
        self.scroll_view
            .borrow()
            .as_ref()
            .and_then(WeakScrollView::upgrade)
    }

    fn overlay_delegate(&self) -> Option<Rc<dyn OverlayScrollViewDelegate>> {
        self.overlay.borrow().as_ref().and_then(Weak::upgrade)
    }

    fn as_delegate(&self) -> Weak<dyn ScrollViewDelegate> {
        self.this.clone()
    }

    fn delegate_did_change(&self, scroll_view: &ScrollView) {
        if let Some(current) = scroll_view.delegate()
            && self.is_reached_from(current)
        {
            return;
        }
        debug!("scroll delegate replaced, recapturing");
        *self.original.borrow_mut() = scroll_view.delegate_weak();
        scroll_view.set_delegate(Some(self.as_delegate()));
    }

    /// `true` if `start` is this proxy or a proxy chain leading to it.
    fn is_reached_from(&self, start: Rc<dyn ScrollViewDelegate>) -> bool {
        let mut current = Some(start);
        for _ in 0..MAX_CHAIN {
            let Some(delegate) = current.take() else {
                return false;
            };
            let Some(proxy) = delegate.as_delegate_proxy() else {
                return false;
            };
            if core::ptr::eq(proxy, self) {
                return true;
            }
            current = proxy.original_delegate();
        }
        false
    }
}

impl Drop for ScrollDelegateProxy {
    fn drop(&mut self) {
        self.cancel_forwarding();
    }
}

impl ScrollViewDelegate for ScrollDelegateProxy {
    fn will_begin_dragging(&self, scroll_view: &ScrollView) {
        if let Some(overlay) = self.overlay_delegate() {
            overlay.overlay_scroll_view_will_begin_dragging(scroll_view);
        }
        if let Some(original) = self.original_delegate() {
            original.will_begin_dragging(scroll_view);
        }
    }

    fn did_scroll(&self, scroll_view: &ScrollView) {
        if let Some(overlay) = self.overlay_delegate() {
            overlay.overlay_scroll_view_did_scroll(scroll_view);
        }
        if let Some(original) = self.original_delegate() {
            original.did_scroll(scroll_view);
        }
    }

    fn will_end_dragging(
        &self,
        scroll_view: &ScrollView,
        velocity: Vec2,
        target_content_offset: &mut Point,
    ) {
        if let Some(overlay) = self.overlay_delegate() {
            // Content points per millisecond to finger points per second.
            overlay.overlay_scroll_view_will_end_dragging(
                scroll_view,
                velocity * -1000.0,
                target_content_offset,
            );
        }
        if let Some(original) = self.original_delegate() {
            original.will_end_dragging(scroll_view, velocity, target_content_offset);
        }
    }

    fn did_end_dragging(&self, scroll_view: &ScrollView, will_decelerate: bool) {
        if let Some(original) = self.original_delegate() {
            original.did_end_dragging(scroll_view, will_decelerate);
        }
    }

    fn will_begin_decelerating(&self, scroll_view: &ScrollView) {
        if let Some(original) = self.original_delegate() {
            original.will_begin_decelerating(scroll_view);
        }
    }

    fn did_end_decelerating(&self, scroll_view: &ScrollView) {
        if let Some(original) = self.original_delegate() {
            original.did_end_decelerating(scroll_view);
        }
    }

    fn did_end_scrolling_animation(&self, scroll_view: &ScrollView) {
        if let Some(original) = self.original_delegate() {
            original.did_end_scrolling_animation(scroll_view);
        }
    }

    fn should_scroll_to_top(&self, scroll_view: &ScrollView) -> bool {
        self.original_delegate()
            .is_none_or(|original| original.should_scroll_to_top(scroll_view))
    }

    fn did_scroll_to_top(&self, scroll_view: &ScrollView) {
        if let Some(original) = self.original_delegate() {
            original.did_scroll_to_top(scroll_view);
        }
    }

    fn as_delegate_proxy(&self) -> Option<&ScrollDelegateProxy> {
        Some(self)
    }
}
