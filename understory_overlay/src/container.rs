// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The overlay container facade.
//!
//! ## Overview
//!
//! [`OverlayContainer`] ties the pieces together for a host:
//!
//! - it owns the [`Configuration`] and the [`TranslationController`];
//! - it keeps the ordered children, the last of which is the overlay;
//! - it installs the pan driver and, when a driving scroll view is set, the scroll driver;
//! - it flushes deferred moves from [`layout`](OverlayContainer::layout).
//!
//! A host calls [`layout`](OverlayContainer::layout) whenever its size changes or
//! [`needs_layout`](OverlayContainer::needs_layout) is set, feeds gestures through
//! [`handle_pan`](OverlayContainer::handle_pan) and the driving [`ScrollView`], and calls
//! [`advance`](OverlayContainer::advance) once per frame while it returns `true`. After
//! each of these, [`overlay_frame`](OverlayContainer::overlay_frame) tells it where to
//! draw the overlay.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use kurbo::{Rect, Size, Vec2};
use log::debug;
use understory_notch::dismissal::SheetDismissalPolicy;

use crate::configuration::Configuration;
use crate::controller::TranslationController;
use crate::delegate::{ContainerDelegate, DefaultContainerDelegate};
use crate::drivers::pan::weak_controller;
use crate::drivers::{
    PanGestureDriver, PanGestureEvent, PanResponse, ScrollViewDriver, ScrollViewDriverOptions,
};
use crate::scroll_view::ScrollView;
use crate::types::{
    ChildId, OverlayStyle, TranslationPosition, TranslationRequest, TranslationState,
};

/// A container presenting its last child as a draggable overlay.
pub struct OverlayContainer {
    style: OverlayStyle,
    configuration: Rc<Configuration>,
    controller: Rc<TranslationController>,
    view_controllers: RefCell<Vec<ChildId>>,
    driving_scroll_view: RefCell<Option<ScrollView>>,
    scroll_options: Cell<ScrollViewDriverOptions>,
    pan_driver: PanGestureDriver,
    scroll_driver: RefCell<Option<Rc<ScrollViewDriver>>>,
    size: Cell<Size>,
    needs_layout: Cell<bool>,
}

impl core::fmt::Debug for OverlayContainer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OverlayContainer")
            .field("style", &self.style)
            .field("view_controllers", &self.view_controllers.borrow())
            .field("size", &self.size.get())
            .field("controller", &self.controller)
            .finish_non_exhaustive()
    }
}

impl Default for OverlayContainer {
    fn default() -> Self {
        Self::new(Rc::new(DefaultContainerDelegate::default()))
    }
}

impl OverlayContainer {
    /// A flexible-height container configured by `delegate`.
    pub fn new(delegate: Rc<dyn ContainerDelegate>) -> Self {
        Self::with_style(OverlayStyle::default(), delegate)
    }

    /// A container with the given overlay style.
    ///
    /// The overlay starts at notch 0 on the first layout pass.
    pub fn with_style(style: OverlayStyle, delegate: Rc<dyn ContainerDelegate>) -> Self {
        let configuration = Rc::new(Configuration::new(delegate));
        let controller = Rc::new(TranslationController::new(configuration.clone()));
        let pan_driver = PanGestureDriver::new(weak_controller(&controller));
        controller.schedule_translation(TranslationRequest::ToIndex(0), Vec2::ZERO, false, None);
        Self {
            style,
            configuration,
            controller,
            view_controllers: RefCell::new(Vec::new()),
            driving_scroll_view: RefCell::new(None),
            scroll_options: Cell::new(ScrollViewDriverOptions::default()),
            pan_driver,
            scroll_driver: RefCell::new(None),
            size: Cell::new(Size::ZERO),
            needs_layout: Cell::new(true),
        }
    }

    /// Overlay style.
    pub fn style(&self) -> OverlayStyle {
        self.style
    }

    /// The container's configuration.
    pub fn configuration(&self) -> &Rc<Configuration> {
        &self.configuration
    }

    /// The translation controller.
    pub fn controller(&self) -> &Rc<TranslationController> {
        &self.controller
    }

    /// Replace the delegate. Notch heights are re-queried on the next layout.
    pub fn set_delegate(&self, delegate: Rc<dyn ContainerDelegate>) {
        self.configuration.set_delegate(delegate);
        self.needs_layout.set(true);
    }

    /// Children, bottom to top.
    pub fn view_controllers(&self) -> Vec<ChildId> {
        self.view_controllers.borrow().clone()
    }

    /// Replace the children. The last one becomes the overlay, and the delegate is asked
    /// for the scroll view driving it.
    pub fn set_view_controllers(&self, view_controllers: Vec<ChildId>) {
        let overlay = view_controllers.last().copied();
        *self.view_controllers.borrow_mut() = view_controllers;
        if overlay == self.controller.overlay() {
            return;
        }
        debug!("overlay changed to {overlay:?}");
        self.controller.set_overlay(overlay);
        let scroll_view =
            overlay.and_then(|overlay| self.configuration.scroll_view_driving_overlay(overlay));
        self.set_driving_scroll_view(scroll_view);
        if !self.controller.has_pending_translation() {
            self.controller.schedule_translation(
                TranslationRequest::ToLastReachedIndex,
                Vec2::ZERO,
                false,
                None,
            );
        }
        self.needs_layout.set(true);
    }

    /// The overlay, i.e. the last child.
    pub fn top_view_controller(&self) -> Option<ChildId> {
        self.view_controllers.borrow().last().copied()
    }

    /// Scroll view whose scrolling currently drives the overlay.
    pub fn driving_scroll_view(&self) -> Option<ScrollView> {
        self.driving_scroll_view.borrow().clone()
    }

    /// Follow `scroll_view`, or stop following any (`None`).
    ///
    /// Stopping gives the scroll view its original delegate back.
    pub fn set_driving_scroll_view(&self, scroll_view: Option<ScrollView>) {
        let previous = self.scroll_driver.borrow_mut().take();
        if let Some(previous) = previous {
            previous.detach();
        }
        self.pan_driver.set_scroll_view(scroll_view.as_ref());
        if let Some(scroll_view) = &scroll_view {
            let driver = ScrollViewDriver::new(
                weak_controller(&self.controller),
                scroll_view,
                self.scroll_options.get(),
            );
            *self.scroll_driver.borrow_mut() = Some(driver);
        }
        *self.driving_scroll_view.borrow_mut() = scroll_view;
    }

    /// Options of the scroll driver. Re-attaches the current driving scroll view.
    pub fn set_scroll_view_driver_options(&self, options: ScrollViewDriverOptions) {
        self.scroll_options.set(options);
        let scroll_view = self.driving_scroll_view();
        if scroll_view.is_some() {
            self.set_driving_scroll_view(scroll_view);
        }
    }

    /// Present as a sheet: releases accepted by `policy` request dismissal.
    pub fn set_sheet_dismissal_policy(&self, policy: Option<Rc<dyn SheetDismissalPolicy>>) {
        self.configuration.set_sheet_dismissal_policy(policy);
    }

    /// `true` if the host should call [`layout_if_needed`](Self::layout_if_needed).
    pub fn needs_layout(&self) -> bool {
        self.needs_layout.get()
    }

    /// Current size.
    pub fn size(&self) -> Size {
        self.size.get()
    }

    /// Lay out at `size` and run any deferred move.
    ///
    /// A height change invalidates the notch heights and, unless a move is already
    /// pending, returns the overlay to its last notch without animation. Nothing is
    /// flushed while the height is not positive.
    pub fn layout(&self, size: Size) {
        let previous = self.size.replace(size);
        self.needs_layout.set(false);
        if previous.height != size.height {
            debug!("container height {} -> {}", previous.height, size.height);
            self.configuration.set_available_space(size.height);
            self.configuration.invalidate_metrics();
            if !self.controller.has_pending_translation() {
                self.controller.schedule_translation(
                    TranslationRequest::ToLastReachedIndex,
                    Vec2::ZERO,
                    false,
                    None,
                );
            }
        }
        if size.height <= 0.0 {
            return;
        }
        self.configuration.request_metrics_if_needed();
        self.controller.perform_deferred_translations();
    }

    /// Lay out at the current size if something changed.
    pub fn layout_if_needed(&self) {
        if self.needs_layout.get() {
            self.layout(self.size.get());
        }
    }

    /// Move the overlay to notch `index` on the next layout pass.
    ///
    /// `completion` runs once the move finishes. Requests made before that pass merge:
    /// only the last one moves the overlay, all completions run in order.
    pub fn move_overlay(&self, index: usize, animated: bool, completion: impl FnOnce() + 'static) {
        self.controller.schedule_translation(
            TranslationRequest::ToIndex(index),
            Vec2::ZERO,
            animated,
            Some(Box::new(completion)),
        );
        self.needs_layout.set(true);
    }

    /// Re-query the notch heights and let the target policy re-settle the overlay.
    ///
    /// Does nothing before the first layout pass with a positive height.
    pub fn invalidate_notch_heights(&self) {
        if self.size.get().height <= 0.0 {
            return;
        }
        self.configuration.invalidate_metrics();
        self.controller.schedule_translation(
            TranslationRequest::BasedOnTargetPolicy,
            Vec2::ZERO,
            true,
            None,
        );
        self.needs_layout.set(true);
    }

    /// Step the settle animation. Returns `true` while another frame is needed.
    pub fn advance(&self, dt: f64) -> bool {
        self.controller.advance(dt)
    }

    /// Feed a pan gesture on the overlay.
    pub fn handle_pan(&self, event: &PanGestureEvent) -> PanResponse {
        self.pan_driver.handle(event)
    }

    /// Current translation height.
    pub fn translation_height(&self) -> f64 {
        self.controller.translation_height()
    }

    /// Position within the reachable range.
    pub fn translation_position(&self) -> TranslationPosition {
        self.controller.translation_position()
    }

    /// Coarse controller state.
    pub fn translation_state(&self) -> TranslationState {
        self.controller.state()
    }

    /// Notch the overlay is heading for, or rests at.
    pub fn target_notch_index(&self) -> usize {
        self.controller.target_notch_index()
    }

    /// Height of the overlay content for the current style.
    pub fn overlay_content_height(&self) -> f64 {
        self.style.content_height(
            self.controller.translation_height(),
            self.configuration.maximum_notch_height(),
        )
    }

    /// Overlay frame in container coordinates, anchored to the bottom edge.
    pub fn overlay_frame(&self) -> Rect {
        let size = self.size.get();
        let top = size.height - self.controller.translation_height();
        Rect::new(0.0, top, size.width, top + self.overlay_content_height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::AnimationController;
    use crate::coordinator::TransitionCoordinator;
    use crate::drivers::PanPhase;
    use crate::scroll_view::ScrollViewDelegate;
    use alloc::vec;
    use kurbo::Point;
    use understory_notch::policy::TargetNotchPolicy;
    use understory_notch::translation::TranslationFunction;

    const SIZE: Size = Size::new(320.0, 600.0);

    struct Maps {
        defaults: DefaultContainerDelegate,
        scroll_view: Option<ScrollView>,
        translations: Cell<usize>,
        drag_sessions: Cell<usize>,
        moves: RefCell<Vec<usize>>,
    }

    impl ContainerDelegate for Maps {
        fn number_of_notches(&self) -> usize {
            self.defaults.number_of_notches()
        }
        fn height_for_notch(&self, index: usize, space: f64) -> f64 {
            self.defaults.height_for_notch(index, space)
        }
        fn can_reach_notch(&self, index: usize, overlay: ChildId) -> bool {
            self.defaults.can_reach_notch(index, overlay)
        }
        fn scroll_view_driving_overlay(&self, _: ChildId) -> Option<ScrollView> {
            self.scroll_view.clone()
        }
        fn should_start_dragging(&self, overlay: ChildId, point: Point) -> bool {
            self.defaults.should_start_dragging(overlay, point)
        }
        fn translation_function(&self, o: ChildId) -> Option<Rc<dyn TranslationFunction>> {
            self.defaults.translation_function(o)
        }
        fn target_notch_policy(&self, o: ChildId) -> Option<Rc<dyn TargetNotchPolicy>> {
            self.defaults.target_notch_policy(o)
        }
        fn animation_controller(&self, o: ChildId) -> Option<Rc<dyn AnimationController>> {
            self.defaults.animation_controller(o)
        }
        fn will_start_dragging(&self, _: ChildId) {
            self.drag_sessions.set(self.drag_sessions.get() + 1);
        }
        fn did_drag(&self, _: ChildId, _: f64) {}
        fn will_end_dragging(&self, _: ChildId, _: Vec2) {}
        fn will_move_to_notch(&self, _: ChildId, _: usize) {}
        fn did_move_to_notch(&self, _: ChildId, index: usize) {
            self.moves.borrow_mut().push(index);
        }
        fn will_translate(&self, _: ChildId, _: &TransitionCoordinator) {
            self.translations.set(self.translations.get() + 1);
        }
        fn did_request_dismissal(&self, _: ChildId, _: Vec2) {}
    }

    fn maps(scroll_view: Option<ScrollView>) -> Rc<Maps> {
        Rc::new(Maps {
            defaults: DefaultContainerDelegate::with_heights(&[100.0, 300.0, 500.0]),
            scroll_view,
            translations: Cell::new(0),
            drag_sessions: Cell::new(0),
            moves: RefCell::new(Vec::new()),
        })
    }

    fn container(delegate: Rc<Maps>) -> OverlayContainer {
        let container = OverlayContainer::new(delegate);
        container.set_view_controllers(vec![ChildId(0), ChildId(1)]);
        container.layout(SIZE);
        container
    }

    fn settle(container: &OverlayContainer) {
        for _ in 0..1000 {
            if !container.advance(1.0 / 60.0) {
                return;
            }
        }
        panic!("container did not settle");
    }

    #[test]
    fn first_layout_rests_at_first_notch() {
        let delegate = maps(None);
        let c = container(delegate.clone());
        assert_eq!(c.translation_height(), 100.0);
        assert_eq!(c.translation_position(), TranslationPosition::Bottom);
        assert_eq!(c.top_view_controller(), Some(ChildId(1)));
        assert_eq!(c.overlay_frame(), Rect::new(0.0, 500.0, 320.0, 600.0));
        assert_eq!(*delegate.moves.borrow(), [0]);
        assert!(!c.needs_layout());
    }

    #[test]
    fn moves_wait_for_layout() {
        let c = container(maps(None));
        let done = Rc::new(Cell::new(false));
        let d = done.clone();
        c.move_overlay(2, true, move || d.set(true));
        assert!(c.needs_layout());
        assert_eq!(c.translation_state(), TranslationState::Idle);
        c.layout_if_needed();
        assert_eq!(c.translation_state(), TranslationState::Animating);
        assert_eq!(c.target_notch_index(), 2);
        assert!(!done.get());
        settle(&c);
        assert!(done.get());
        assert_eq!(c.translation_height(), 500.0);
        assert_eq!(c.translation_position(), TranslationPosition::Top);
    }

    // Only the last request moves the overlay; both completions run, in order.
    #[test]
    fn merged_requests_run_all_completions() {
        let delegate = maps(None);
        let c = OverlayContainer::new(delegate.clone());
        c.set_view_controllers(vec![ChildId(1)]);
        let order = Rc::new(RefCell::new(Vec::new()));
        let (a, b) = (order.clone(), order.clone());
        c.move_overlay(0, true, move || a.borrow_mut().push(0));
        c.move_overlay(1, true, move || b.borrow_mut().push(1));
        c.layout(SIZE);
        settle(&c);
        assert_eq!(*order.borrow(), [0, 1]);
        assert_eq!(*delegate.moves.borrow(), [1]);
    }

    #[test]
    fn release_at_rest_translates_nothing() {
        let delegate = maps(None);
        let c = container(delegate.clone());
        let before = delegate.translations.get();
        let start = Point::new(10.0, 550.0);
        c.handle_pan(&PanGestureEvent::new(PanPhase::Began, start));
        c.handle_pan(&PanGestureEvent::new(PanPhase::Ended, start));
        assert_eq!(delegate.translations.get(), before);
        assert!(!c.advance(1.0 / 60.0));
    }

    #[test]
    fn pan_drags_and_settles() {
        let c = container(maps(None));
        let start = Point::new(10.0, 550.0);
        let began = PanGestureEvent::new(PanPhase::Began, start);
        assert_eq!(c.handle_pan(&began), PanResponse::Tracking);
        let changed = PanGestureEvent::new(PanPhase::Changed, start);
        c.handle_pan(&changed.with_translation(Vec2::new(0.0, -150.0)));
        assert_eq!(c.translation_height(), 250.0);
        assert_eq!(c.translation_position(), TranslationPosition::InFlight);
        let ended =
            PanGestureEvent::new(PanPhase::Ended, start).with_velocity(Vec2::new(0.0, -100.0));
        c.handle_pan(&ended);
        settle(&c);
        assert_eq!(c.target_notch_index(), 1);
        assert_eq!(c.translation_height(), 300.0);
    }

    #[test]
    fn one_pan_gesture_is_one_drag_session() {
        let delegate = maps(None);
        let c = container(delegate.clone());
        let start = Point::new(10.0, 550.0);
        c.handle_pan(&PanGestureEvent::new(PanPhase::Began, start));
        let changed = PanGestureEvent::new(PanPhase::Changed, start);
        for dy in [-20.0, -60.0, -110.0, -90.0] {
            c.handle_pan(&changed.with_translation(Vec2::new(0.0, dy)));
        }
        assert_eq!(delegate.drag_sessions.get(), 1);
        c.handle_pan(&PanGestureEvent::new(PanPhase::Ended, start));
        c.handle_pan(&PanGestureEvent::new(PanPhase::Began, start));
        c.handle_pan(&changed.with_translation(Vec2::new(0.0, -30.0)));
        assert_eq!(delegate.drag_sessions.get(), 2);
    }

    #[test]
    fn invalidation_before_layout_keeps_first_presentation_still() {
        let delegate = maps(None);
        let c = OverlayContainer::new(delegate.clone());
        c.set_view_controllers(vec![ChildId(0), ChildId(1)]);
        c.invalidate_notch_heights();
        c.layout(SIZE);
        assert_eq!(c.translation_state(), TranslationState::Idle);
        assert_eq!(c.translation_height(), 100.0);
        assert_eq!(c.target_notch_index(), 0);
        assert_eq!(*delegate.moves.borrow(), [0]);
    }

    #[test]
    fn resize_resettles_without_animation() {
        let delegate = Rc::new(Maps {
            defaults: DefaultContainerDelegate::new(vec![
                crate::delegate::NotchHeight::Fraction(0.25),
                crate::delegate::NotchHeight::Fraction(0.75),
            ]),
            scroll_view: None,
            translations: Cell::new(0),
            drag_sessions: Cell::new(0),
            moves: RefCell::new(Vec::new()),
        });
        let c = container(delegate);
        c.move_overlay(1, false, || {});
        c.layout_if_needed();
        assert_eq!(c.translation_height(), 450.0);
        c.layout(Size::new(320.0, 800.0));
        assert_eq!(c.translation_height(), 600.0);
        assert_eq!(c.translation_state(), TranslationState::Idle);
    }

    #[test]
    fn invalidation_retargets_by_policy() {
        let c = container(maps(None));
        c.move_overlay(1, false, || {});
        c.layout_if_needed();
        c.set_delegate(Rc::new(DefaultContainerDelegate::with_heights(&[100.0, 320.0])));
        c.invalidate_notch_heights();
        c.layout_if_needed();
        settle(&c);
        assert_eq!(c.target_notch_index(), 1);
        assert_eq!(c.translation_height(), 320.0);
    }

    #[test]
    fn rigid_and_expandable_content_heights() {
        let c = OverlayContainer::with_style(OverlayStyle::Rigid, maps(None));
        c.set_view_controllers(vec![ChildId(1)]);
        c.layout(SIZE);
        assert_eq!(c.overlay_content_height(), 500.0);
        assert_eq!(c.overlay_frame(), Rect::new(0.0, 500.0, 320.0, 1000.0));

        let c = OverlayContainer::with_style(OverlayStyle::ExpandableHeight, maps(None));
        c.set_view_controllers(vec![ChildId(1)]);
        c.layout(SIZE);
        c.controller().drag_overlay(-600.0, true);
        assert!(c.translation_height() > 500.0);
        assert_eq!(c.overlay_content_height(), c.translation_height());
    }

    struct Original;

    impl ScrollViewDelegate for Original {}

    #[test]
    fn driving_scroll_view_restores_delegate() {
        let scroll_view = ScrollView::new(Rect::new(0.0, 300.0, 320.0, 600.0));
        let original: Rc<dyn ScrollViewDelegate> = Rc::new(Original);
        scroll_view.set_delegate(Some(Rc::downgrade(&original)));
        let c = container(maps(Some(scroll_view.clone())));
        assert_eq!(c.driving_scroll_view(), Some(scroll_view.clone()));
        assert!(!scroll_view.is_delegate(&Rc::downgrade(&original)));

        // Touches inside the scroll view belong to it.
        let inside = PanGestureEvent::new(PanPhase::Began, Point::new(10.0, 400.0));
        assert_eq!(c.handle_pan(&inside), PanResponse::Cancelled);

        c.set_driving_scroll_view(None);
        assert!(scroll_view.is_delegate(&Rc::downgrade(&original)));
    }

    #[test]
    fn scroll_gesture_moves_overlay_with_pinned_content() {
        let scroll_view = ScrollView::new(Rect::new(0.0, 300.0, 320.0, 600.0));
        let c = container(maps(Some(scroll_view.clone())));
        c.move_overlay(1, false, || {});
        c.layout_if_needed();
        assert_eq!(c.translation_position(), TranslationPosition::InFlight);

        scroll_view.begin_dragging();
        scroll_view.pan_to(Vec2::new(0.0, -10.0), Vec2::new(0.0, -10.0));
        scroll_view.pan_to(Vec2::new(0.0, 10.0), Vec2::new(0.0, 10.0));
        scroll_view.pan_to(Vec2::new(0.0, -10.0), Vec2::new(0.0, -10.0));
        assert_eq!(scroll_view.content_offset().y, 0.0);
        assert_eq!(c.translation_height(), 310.0);

        let target = scroll_view.end_dragging(Vec2::new(0.0, 0.01), Point::new(0.0, 30.0));
        assert_eq!(target.y, 0.0);
        settle(&c);
        assert_eq!(c.translation_height(), 300.0);
        assert_eq!(c.target_notch_index(), 1);
    }
}
