// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cached view of the container delegate.
//!
//! Notch heights are resolved once per layout pass and kept until
//! [`Configuration::invalidate_metrics`] is called. Nothing here polls the delegate on its
//! own; the container invalidates on resize and on explicit requests.

use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use kurbo::Point;
use log::debug;
use understory_notch::dismissal::SheetDismissalPolicy;
use understory_notch::notches::{Notches, Reachable};
use understory_notch::policy::{RushingForward, TargetNotchPolicy};
use understory_notch::translation::{RubberBand, TranslationFunction};

use crate::animator::{AnimationController, SpringAnimationController};
use crate::delegate::{ContainerDelegate, DefaultContainerDelegate};
use crate::scroll_view::ScrollView;
use crate::types::ChildId;

/// Delegate plus per-layout caches and the built-in defaults.
pub struct Configuration {
    delegate: RefCell<Rc<dyn ContainerDelegate>>,
    available_space: Cell<f64>,
    notches: RefCell<Option<Rc<Notches>>>,
    dismissal: RefCell<Option<Rc<dyn SheetDismissalPolicy>>>,
    default_function: Rc<dyn TranslationFunction>,
    default_policy: Rc<dyn TargetNotchPolicy>,
    default_animation: Rc<dyn AnimationController>,
}

impl core::fmt::Debug for Configuration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Configuration")
            .field("available_space", &self.available_space.get())
            .field("notches", &self.notches.borrow())
            .field("is_sheet", &self.dismissal.borrow().is_some())
            .finish_non_exhaustive()
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new(Rc::new(DefaultContainerDelegate::default()))
    }
}

impl Configuration {
    /// Configuration backed by `delegate`.
    pub fn new(delegate: Rc<dyn ContainerDelegate>) -> Self {
        Self {
            delegate: RefCell::new(delegate),
            available_space: Cell::new(0.0),
            notches: RefCell::new(None),
            dismissal: RefCell::new(None),
            default_function: Rc::new(RubberBand::default()),
            default_policy: Rc::new(RushingForward::default()),
            default_animation: Rc::new(SpringAnimationController::default()),
        }
    }

    /// Current delegate.
    pub fn delegate(&self) -> Rc<dyn ContainerDelegate> {
        self.delegate.borrow().clone()
    }

    /// Replace the delegate. Cached metrics are dropped.
    pub fn set_delegate(&self, delegate: Rc<dyn ContainerDelegate>) {
        *self.delegate.borrow_mut() = delegate;
        self.invalidate_metrics();
    }

    /// Height the notches are resolved against.
    pub fn available_space(&self) -> f64 {
        self.available_space.get()
    }

    /// Set the height the notches are resolved against. Does not invalidate.
    pub fn set_available_space(&self, space: f64) {
        self.available_space.set(space);
    }

    /// Drop cached notch heights. The next query asks the delegate again.
    pub fn invalidate_metrics(&self) {
        if self.notches.borrow_mut().take().is_some() {
            debug!("overlay metrics invalidated");
        }
    }

    /// Resolve notch heights if they are not cached.
    pub fn request_metrics_if_needed(&self) -> Rc<Notches> {
        if let Some(notches) = self.notches.borrow().as_ref() {
            return notches.clone();
        }
        let delegate = self.delegate();
        let space = self.available_space.get();
        let count = delegate.number_of_notches();
        let notches = Rc::new(Notches::from_fn(count, |i| delegate.height_for_notch(i, space)));
        debug!(
            "resolved {count} notches for {space}pt: {:?}",
            notches.heights()
        );
        *self.notches.borrow_mut() = Some(notches.clone());
        notches
    }

    /// Cached notch heights, resolving them first if needed.
    pub fn notches(&self) -> Rc<Notches> {
        self.request_metrics_if_needed()
    }

    /// Number of notches.
    pub fn number_of_notches(&self) -> usize {
        self.notches().len()
    }

    /// Height of notch `index`, or `0.0` if it does not exist.
    pub fn height_for_notch(&self, index: usize) -> f64 {
        self.notches().height(index).unwrap_or(0.0)
    }

    /// Height of the last notch, or `0.0` without notches.
    pub fn maximum_notch_height(&self) -> f64 {
        self.notches().max_height().unwrap_or(0.0)
    }

    /// Notches `overlay` may currently reach. Recomputed on every call.
    pub fn enabled_notches(&self, overlay: ChildId) -> Reachable {
        let delegate = self.delegate();
        self.notches()
            .reachable_with(|index| delegate.can_reach_notch(index, overlay))
    }

    /// Whether a touch at `point` may start a drag of `overlay`.
    pub fn should_start_dragging(&self, overlay: ChildId, point: Point) -> bool {
        self.delegate().should_start_dragging(overlay, point)
    }

    /// Scroll view the delegate wants to drive `overlay`.
    pub fn scroll_view_driving_overlay(&self, overlay: ChildId) -> Option<ScrollView> {
        self.delegate().scroll_view_driving_overlay(overlay)
    }

    /// Translation function for `overlay`, the rubber band by default.
    pub fn translation_function(&self, overlay: ChildId) -> Rc<dyn TranslationFunction> {
        self.delegate()
            .translation_function(overlay)
            .unwrap_or_else(|| self.default_function.clone())
    }

    /// Target notch policy for `overlay`, rushing forward by default.
    pub fn target_notch_policy(&self, overlay: ChildId) -> Rc<dyn TargetNotchPolicy> {
        self.delegate()
            .target_notch_policy(overlay)
            .unwrap_or_else(|| self.default_policy.clone())
    }

    /// Animation controller for `overlay`, a spring by default.
    pub fn animation_controller(&self, overlay: ChildId) -> Rc<dyn AnimationController> {
        self.delegate()
            .animation_controller(overlay)
            .unwrap_or_else(|| self.default_animation.clone())
    }

    /// Dismissal policy when the container is presented as a sheet.
    pub fn sheet_dismissal_policy(&self) -> Option<Rc<dyn SheetDismissalPolicy>> {
        self.dismissal.borrow().clone()
    }

    /// Turn sheet behavior on (`Some`) or off (`None`).
    pub fn set_sheet_dismissal_policy(&self, policy: Option<Rc<dyn SheetDismissalPolicy>>) {
        *self.dismissal.borrow_mut() = policy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delegate::NotchHeight;
    use alloc::vec;

    struct Counting {
        inner: DefaultContainerDelegate,
        queries: Cell<usize>,
    }

    impl ContainerDelegate for Counting {
        fn number_of_notches(&self) -> usize {
            self.queries.set(self.queries.get() + 1);
            self.inner.number_of_notches()
        }
        fn height_for_notch(&self, index: usize, space: f64) -> f64 {
            self.inner.height_for_notch(index, space)
        }
        fn can_reach_notch(&self, index: usize, _overlay: ChildId) -> bool {
            index != 1
        }
        fn scroll_view_driving_overlay(&self, overlay: ChildId) -> Option<ScrollView> {
            self.inner.scroll_view_driving_overlay(overlay)
        }
        fn should_start_dragging(&self, overlay: ChildId, point: Point) -> bool {
            self.inner.should_start_dragging(overlay, point)
        }
        fn translation_function(&self, overlay: ChildId) -> Option<Rc<dyn TranslationFunction>> {
            self.inner.translation_function(overlay)
        }
        fn target_notch_policy(&self, overlay: ChildId) -> Option<Rc<dyn TargetNotchPolicy>> {
            self.inner.target_notch_policy(overlay)
        }
        fn animation_controller(&self, overlay: ChildId) -> Option<Rc<dyn AnimationController>> {
            self.inner.animation_controller(overlay)
        }
        fn will_start_dragging(&self, _: ChildId) {}
        fn did_drag(&self, _: ChildId, _: f64) {}
        fn will_end_dragging(&self, _: ChildId, _: kurbo::Vec2) {}
        fn will_move_to_notch(&self, _: ChildId, _: usize) {}
        fn did_move_to_notch(&self, _: ChildId, _: usize) {}
        fn will_translate(&self, _: ChildId, _: &crate::coordinator::TransitionCoordinator) {}
        fn did_request_dismissal(&self, _: ChildId, _: kurbo::Vec2) {}
    }

    fn counting() -> Rc<Counting> {
        Rc::new(Counting {
            inner: DefaultContainerDelegate::new(vec![
                NotchHeight::Points(100.0),
                NotchHeight::Fraction(0.5),
                NotchHeight::Fraction(1.0),
            ]),
            queries: Cell::new(0),
        })
    }

    // Heights are cached until explicitly invalidated, even if the space changes.
    #[test]
    fn caches_until_invalidated() {
        let delegate = counting();
        let config = Configuration::new(delegate.clone());
        config.set_available_space(600.0);
        assert_eq!(config.notches().heights(), &[100.0, 300.0, 600.0]);
        assert_eq!(config.height_for_notch(2), 600.0);
        assert_eq!(delegate.queries.get(), 1);

        config.set_available_space(800.0);
        assert_eq!(config.height_for_notch(2), 600.0);
        assert_eq!(delegate.queries.get(), 1);

        config.invalidate_metrics();
        assert_eq!(config.height_for_notch(2), 800.0);
        assert_eq!(delegate.queries.get(), 2);
    }

    #[test]
    fn enabled_set_consults_delegate() {
        let config = Configuration::new(counting());
        config.set_available_space(600.0);
        assert_eq!(config.enabled_notches(ChildId(0)).indices(), vec![0, 2]);
        assert_eq!(config.maximum_notch_height(), 600.0);
        assert_eq!(config.height_for_notch(9), 0.0);
    }

    #[test]
    fn defaults_fill_in_overrides() {
        let config = Configuration::default();
        let function = config.translation_function(ChildId(0));
        let params = understory_notch::translation::TranslationParameters {
            minimum_height: 0.0,
            maximum_height: 100.0,
            translation: 50.0,
        };
        assert_eq!(function.overlay_translation_height(&params), 50.0);
        assert!(config.sheet_dismissal_policy().is_none());
        config.set_sheet_dismissal_policy(Some(Rc::new(
            understory_notch::dismissal::ThresholdDismissal::default(),
        )));
        assert!(config.sheet_dismissal_policy().is_some());
    }
}
