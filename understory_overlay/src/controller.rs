// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The translation state machine.
//!
//! ## Overview
//!
//! [`TranslationController`] owns the overlay's translation height and the index of the
//! notch it is heading for. It moves through three states:
//!
//! - `Idle`: nothing happens until a driver or the application asks for a move.
//! - `Dragging`: a drag session is open. Drivers report offsets from the height captured
//!   when the session started, and every accepted offset is written synchronously.
//! - `Animating`: a settle animation runs toward the target notch. Only
//!   [`TranslationController::advance`] changes the height in this state.
//!
//! Starting a drag while animating samples the animator's presented value and continues
//! from there, so the overlay never jumps.
//!
//! ## Deferred moves
//!
//! Programmatic moves go through [`TranslationController::schedule_translation`]. At most
//! one request is pending: a newer request replaces the target but its completion is
//! appended, and all accumulated completions run in order once the request executes.
//! The container flushes the queue from its layout pass.
//!
//! ## Reachable range
//!
//! Drags are bounded by the enabled notches, widened to include the target notch. An
//! overlay resting at a notch that was disabled afterwards is therefore not pulled away
//! by the next drag.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use kurbo::{Point, Vec2};
use log::{debug, trace, warn};
use understory_notch::dismissal::DismissalContext;
use understory_notch::policy::TargetNotchContext;
use understory_notch::translation::TranslationParameters;

use crate::animator::{InterruptibleAnimator, TransitionContext};
use crate::configuration::Configuration;
use crate::coordinator::TransitionCoordinator;
use crate::types::{ChildId, TranslationPosition, TranslationRequest, TranslationState};

/// Callback run when a requested move finishes or is interrupted.
pub type Completion = Box<dyn FnOnce()>;

/// What the gesture drivers need from a controller.
///
/// [`TranslationController`] is the implementation; drivers hold it through this trait.
pub trait OverlayTranslationController {
    /// Current translation height.
    fn translation_height(&self) -> f64;

    /// Position of the height within the reachable range.
    fn translation_position(&self) -> TranslationPosition;

    /// Whether a touch at `point` may start a drag.
    fn is_draggable(&self, point: Point) -> bool;

    /// `true` when the height equals an enabled notch's height.
    fn has_reached_a_notch(&self) -> bool;

    /// Open a drag session. Repeated calls within a session do nothing.
    fn start_translation(&self);

    /// Drag to `offset` from the session baseline.
    ///
    /// Returns the offset that was actually applied, which differs from `offset` when the
    /// height was clamped.
    fn drag_overlay(&self, offset: f64, uses_translation_function: bool) -> f64;

    /// Close the drag session and settle.
    fn end_translation(&self, velocity: Vec2, notch_index: Option<usize>);

    /// Enabled notch closest to the current height.
    fn nearest_reachable_index(&self) -> Option<usize>;
}

#[derive(Copy, Clone, Debug)]
struct DragSession {
    baseline: f64,
}

struct Transition {
    coordinator: Rc<TransitionCoordinator>,
    animator: Box<dyn InterruptibleAnimator>,
    completions: Vec<Completion>,
}

struct DeferredTranslation {
    request: TranslationRequest,
    velocity: Vec2,
    animated: bool,
    completions: Vec<Completion>,
}

/// Owns the translation height and drives it between notches.
///
/// All methods take `&self` so delegate callbacks may call back into the controller.
pub struct TranslationController {
    configuration: Rc<Configuration>,
    overlay: Cell<Option<ChildId>>,
    height: Cell<f64>,
    target_index: Cell<usize>,
    session: Cell<Option<DragSession>>,
    transition: RefCell<Option<Transition>>,
    deferred: RefCell<Option<DeferredTranslation>>,
}

impl core::fmt::Debug for TranslationController {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TranslationController")
            .field("overlay", &self.overlay.get())
            .field("height", &self.height.get())
            .field("target_index", &self.target_index.get())
            .field("state", &self.state())
            .field("has_pending_translation", &self.has_pending_translation())
            .finish_non_exhaustive()
    }
}

impl TranslationController {
    /// A controller at height `0.0` targeting notch 0, with no overlay.
    pub fn new(configuration: Rc<Configuration>) -> Self {
        Self {
            configuration,
            overlay: Cell::new(None),
            height: Cell::new(0.0),
            target_index: Cell::new(0),
            session: Cell::new(None),
            transition: RefCell::new(None),
            deferred: RefCell::new(None),
        }
    }

    /// The configuration this controller reads.
    pub fn configuration(&self) -> &Rc<Configuration> {
        &self.configuration
    }

    /// The overlay being translated.
    pub fn overlay(&self) -> Option<ChildId> {
        self.overlay.get()
    }

    /// Replace the overlay. A running transition or drag session is abandoned.
    pub fn set_overlay(&self, overlay: Option<ChildId>) {
        if self.overlay.get() == overlay {
            return;
        }
        self.interrupt_transition();
        self.session.set(None);
        self.overlay.set(overlay);
        debug!("overlay set to {overlay:?}");
    }

    /// Current translation height.
    pub fn translation_height(&self) -> f64 {
        self.height.get()
    }

    /// Position of the height within the reachable range.
    ///
    /// Derived on every call. Without an overlay or notches the position is `Stationary`.
    pub fn translation_position(&self) -> TranslationPosition {
        let Some((min, max)) = self.overlay.get().and_then(|o| self.reachable_bounds(o)) else {
            return TranslationPosition::Stationary;
        };
        let height = self.height.get();
        match (height == max, height == min) {
            (true, true) => TranslationPosition::Stationary,
            (true, false) => TranslationPosition::Top,
            (false, true) => TranslationPosition::Bottom,
            (false, false) => TranslationPosition::InFlight,
        }
    }

    /// Coarse state.
    pub fn state(&self) -> TranslationState {
        if self.session.get().is_some() {
            TranslationState::Dragging
        } else if self.transition.borrow().is_some() {
            TranslationState::Animating
        } else {
            TranslationState::Idle
        }
    }

    /// Notch the overlay is heading for, or rests at.
    pub fn target_notch_index(&self) -> usize {
        self.target_index.get()
    }

    /// Notch the last translation ended at.
    ///
    /// Same as [`target_notch_index`](Self::target_notch_index).
    pub fn last_translation_end_notch_index(&self) -> usize {
        self.target_index.get()
    }

    /// `true` if a deferred request waits for the next flush.
    pub fn has_pending_translation(&self) -> bool {
        self.deferred.borrow().is_some()
    }

    /// `true` while a settle animation runs.
    pub fn is_animating(&self) -> bool {
        self.transition.borrow().is_some()
    }

    /// Whether a touch at `point` may start a drag.
    pub fn is_draggable(&self, point: Point) -> bool {
        self.overlay
            .get()
            .is_some_and(|overlay| self.configuration.should_start_dragging(overlay, point))
    }

    /// `true` when the height equals an enabled notch's height.
    pub fn has_reached_a_notch(&self) -> bool {
        self.overlay.get().is_some_and(|overlay| {
            self.configuration
                .enabled_notches(overlay)
                .at_height(self.height.get())
                .is_some()
        })
    }

    /// Enabled notch closest to the current height.
    pub fn nearest_reachable_index(&self) -> Option<usize> {
        let overlay = self.overlay.get()?;
        self.configuration
            .enabled_notches(overlay)
            .nearest(self.height.get())
            .map(|notch| notch.index)
    }

    /// Open a drag session at the current height.
    ///
    /// A running settle animation is interrupted first and the session starts from its
    /// presented value.
    pub fn start_translation(&self) {
        if self.session.get().is_some() {
            return;
        }
        let Some(overlay) = self.overlay.get() else {
            return;
        };
        self.interrupt_transition();
        let baseline = self.height.get();
        self.session.set(Some(DragSession { baseline }));
        debug!("drag started at {baseline}");
        self.configuration.delegate().will_start_dragging(overlay);
    }

    /// Drag to `baseline - offset`.
    ///
    /// With `uses_translation_function` the raw height goes through the translation
    /// function, otherwise it is clamped to the reachable range. Opens a session if none
    /// is open. Returns the effective offset, `baseline - height`.
    pub fn drag_overlay(&self, offset: f64, uses_translation_function: bool) -> f64 {
        let Some(overlay) = self.overlay.get() else {
            return offset;
        };
        self.start_translation();
        let Some(session) = self.session.get() else {
            return offset;
        };
        let Some((minimum_height, maximum_height)) = self.reachable_bounds(overlay) else {
            return offset;
        };
        let parameters = TranslationParameters {
            minimum_height,
            maximum_height,
            translation: session.baseline - offset,
        };
        let height = if uses_translation_function {
            self.configuration
                .translation_function(overlay)
                .overlay_translation_height(&parameters)
        } else {
            parameters.clamped()
        }
        .max(0.0);
        self.write_dragged_height(overlay, height);
        session.baseline - self.height.get()
    }

    /// Drag toward notch `index`, `fraction_complete` of the way from the session baseline.
    ///
    /// The result is clamped to the reachable range.
    pub fn drag_overlay_to_notch(&self, index: usize, fraction_complete: f64) {
        let Some(overlay) = self.overlay.get() else {
            return;
        };
        self.start_translation();
        let Some(session) = self.session.get() else {
            return;
        };
        let Some(target) = self.configuration.notches().height(index) else {
            debug!("drag toward missing notch {index} ignored");
            return;
        };
        let fraction = fraction_complete.clamp(0.0, 1.0);
        let height = session.baseline + (target - session.baseline) * fraction;
        let Some((minimum_height, maximum_height)) = self.reachable_bounds(overlay) else {
            return;
        };
        let parameters = TranslationParameters {
            minimum_height,
            maximum_height,
            translation: height,
        };
        self.write_dragged_height(overlay, parameters.clamped().max(0.0));
    }

    /// Close the drag session and settle.
    ///
    /// `notch_index` forces the destination. Otherwise a release at rest on the target
    /// notch does nothing, a sheet may request dismissal, and the target-notch policy
    /// picks where to go.
    pub fn end_translation(&self, velocity: Vec2, notch_index: Option<usize>) {
        let Some(overlay) = self.overlay.get() else {
            return;
        };
        let delegate = self.configuration.delegate();
        if self.session.take().is_some() {
            debug!("drag ended at {} with {velocity:?}", self.height.get());
            delegate.will_end_dragging(overlay, velocity);
        }
        if let Some(index) = notch_index {
            self.translate(overlay, index, velocity, true, true, Vec::new());
            return;
        }
        let height = self.height.get();
        let reachable = self.configuration.enabled_notches(overlay);
        if reachable.height(self.target_index.get()) == Some(height) {
            trace!("released at rest on notch {}", self.target_index.get());
            return;
        }
        if let Some(policy) = self.configuration.sheet_dismissal_policy() {
            let notches = self.configuration.notches();
            let ctx = DismissalContext {
                height,
                velocity,
                notches: &notches,
            };
            if policy.should_dismiss(&ctx) {
                debug!("release at {height} requests dismissal");
                delegate.did_request_dismissal(overlay, velocity);
                return;
            }
        }
        if let Some(index) = self.policy_target(overlay, velocity) {
            self.translate(overlay, index, velocity, true, true, Vec::new());
        }
    }

    /// Queue a move for the next flush.
    ///
    /// A pending request is replaced, but its completions are kept and `completion` runs
    /// after them.
    pub fn schedule_translation(
        &self,
        request: TranslationRequest,
        velocity: Vec2,
        animated: bool,
        completion: Option<Completion>,
    ) {
        let mut deferred = self.deferred.borrow_mut();
        let pending = deferred.get_or_insert_with(|| DeferredTranslation {
            request,
            velocity,
            animated,
            completions: Vec::new(),
        });
        pending.request = request;
        pending.velocity = velocity;
        pending.animated = animated;
        pending.completions.extend(completion);
        trace!("scheduled {request:?} (animated: {animated})");
    }

    /// Execute the pending request, if any.
    ///
    /// Without an overlay the request stays queued. Without notches its completions run
    /// and nothing moves.
    pub fn perform_deferred_translations(&self) {
        let Some(overlay) = self.overlay.get() else {
            return;
        };
        let Some(pending) = self.deferred.borrow_mut().take() else {
            return;
        };
        debug!("performing deferred {:?}", pending.request);
        if self.configuration.number_of_notches() == 0 {
            run_all(pending.completions);
            return;
        }
        let index = match pending.request {
            TranslationRequest::ToIndex(index) => Some(index),
            TranslationRequest::ToLastReachedIndex => Some(self.target_index.get()),
            TranslationRequest::BasedOnTargetPolicy => {
                self.policy_target(overlay, pending.velocity)
            }
        };
        match index {
            Some(index) => self.translate(
                overlay,
                index,
                pending.velocity,
                pending.animated,
                false,
                pending.completions,
            ),
            None => run_all(pending.completions),
        }
    }

    /// Move to notch `index` right away.
    ///
    /// Animated moves complete from [`advance`](Self::advance). Non-animated moves write
    /// the height and run `completion` before returning.
    ///
    /// # Panics
    ///
    /// In debug builds, if `index` is not below the number of notches.
    pub fn move_overlay(
        &self,
        index: usize,
        velocity: Vec2,
        animated: bool,
        completion: Option<Completion>,
    ) {
        let completions: Vec<Completion> = completion.into_iter().collect();
        let Some(overlay) = self.overlay.get() else {
            run_all(completions);
            return;
        };
        self.translate(overlay, index, velocity, animated, false, completions);
    }

    /// Step the settle animation by `dt` seconds.
    ///
    /// Returns `true` while another frame is needed.
    pub fn advance(&self, dt: f64) -> bool {
        let (coordinator, height, fraction, running) = {
            let mut slot = self.transition.borrow_mut();
            let Some(transition) = slot.as_mut() else {
                return false;
            };
            transition.animator.advance(dt);
            (
                transition.coordinator.clone(),
                transition.animator.value(),
                transition.animator.fraction_complete(),
                transition.animator.is_running(),
            )
        };
        self.height.set(height);
        if running {
            trace!("frame at {height} ({fraction:.3})");
            coordinator.frame(height, fraction);
        } else {
            self.complete_transition(&coordinator);
        }
        self.is_animating()
    }

    fn translate(
        &self,
        overlay: ChildId,
        index: usize,
        velocity: Vec2,
        animated: bool,
        dragging: bool,
        completions: Vec<Completion>,
    ) {
        let count = self.configuration.number_of_notches();
        debug_assert!(
            index < count,
            "notch index {index} out of range for {count} notches"
        );
        if count == 0 {
            run_all(completions);
            return;
        }
        let index = index.min(count - 1);
        self.interrupt_transition();
        self.target_index.set(index);
        let delegate = self.configuration.delegate();
        delegate.will_move_to_notch(overlay, index);

        let start = self.height.get();
        let target = self.configuration.height_for_notch(index);
        if !animated {
            let coordinator = TransitionCoordinator::new(self.transition_context(
                overlay,
                start,
                index,
                Vec2::ZERO,
                false,
                dragging,
            ));
            // Nothing is registered yet; this only positions the coordinator.
            coordinator.frame(target, 1.0);
            if start != target {
                self.height.set(target);
                delegate.did_drag(overlay, target);
            }
            delegate.will_translate(overlay, &coordinator);
            coordinator.finish(target, false);
            debug!("moved to notch {index} at {target}");
            delegate.did_move_to_notch(overlay, index);
            run_all(completions);
            return;
        }

        let context = self.transition_context(overlay, start, index, velocity, true, dragging);
        let mut animator = self
            .configuration
            .animation_controller(overlay)
            .interruptible_animator(&context);
        let coordinator = Rc::new(TransitionCoordinator::new(context));
        delegate.will_translate(overlay, &coordinator);
        if self.transition.borrow().is_some() || self.target_index.get() != index {
            debug!("transition to notch {index} superseded before it started");
            coordinator.finish(self.height.get(), true);
            run_all(completions);
            return;
        }
        debug!("animating from {start} to notch {index} at {target}");
        animator.start_animation();
        let settled = !animator.is_running();
        *self.transition.borrow_mut() = Some(Transition {
            coordinator: coordinator.clone(),
            animator,
            completions,
        });
        if settled {
            self.complete_transition(&coordinator);
        }
    }

    fn complete_transition(&self, coordinator: &Rc<TransitionCoordinator>) {
        let transition = {
            let mut slot = self.transition.borrow_mut();
            match slot.as_ref() {
                Some(t) if Rc::ptr_eq(&t.coordinator, coordinator) => slot.take(),
                _ => None,
            }
        };
        let Some(transition) = transition else {
            return;
        };
        let target = coordinator.target_translation_height();
        self.height.set(target);
        coordinator.finish(target, false);
        debug!(
            "transition finished at notch {}",
            coordinator.target_notch_index()
        );
        self.configuration
            .delegate()
            .did_move_to_notch(coordinator.overlay(), coordinator.target_notch_index());
        run_all(transition.completions);
    }

    fn interrupt_transition(&self) {
        let Some(mut transition) = self.transition.borrow_mut().take() else {
            return;
        };
        transition.animator.stop_animation();
        let height = transition.animator.value();
        self.height.set(height);
        debug!(
            "transition to notch {} interrupted at {height}",
            transition.coordinator.target_notch_index()
        );
        transition.coordinator.finish(height, true);
        run_all(transition.completions);
    }

    fn write_dragged_height(&self, overlay: ChildId, height: f64) {
        let previous = self.height.get();
        if height == previous {
            return;
        }
        self.height.set(height);
        trace!("dragged to {height}");
        let delegate = self.configuration.delegate();
        delegate.did_drag(overlay, height);
        let coordinator = TransitionCoordinator::new(self.transition_context(
            overlay,
            previous,
            self.target_index.get(),
            Vec2::ZERO,
            false,
            true,
        ));
        delegate.will_translate(overlay, &coordinator);
        coordinator.finish(height, false);
    }

    fn policy_target(&self, overlay: ChildId, velocity: Vec2) -> Option<usize> {
        let reachable = self.configuration.enabled_notches(overlay);
        let height = self.height.get();
        let policy = self.configuration.target_notch_policy(overlay);
        let ctx = TargetNotchContext {
            height,
            velocity,
            reachable: &reachable,
        };
        match policy.target_notch_index(&ctx) {
            Some(index) if reachable.contains(index) => Some(index),
            Some(index) => {
                let fallback = reachable.nearest(height).map(|notch| notch.index);
                warn!("target policy chose unreachable notch {index}, using {fallback:?}");
                fallback
            }
            None => None,
        }
    }

    /// Enabled min and max, widened to include the target notch.
    fn reachable_bounds(&self, overlay: ChildId) -> Option<(f64, f64)> {
        let notches = self.configuration.notches();
        let reachable = self.configuration.enabled_notches(overlay);
        reachable
            .iter()
            .map(|notch| notch.height)
            .chain(notches.height(self.target_index.get()))
            .fold(None, |bounds, height| match bounds {
                None => Some((height, height)),
                Some((min, max)) => Some((f64::min(min, height), f64::max(max, height))),
            })
    }

    fn transition_context(
        &self,
        overlay: ChildId,
        start_height: f64,
        target_index: usize,
        velocity: Vec2,
        is_animated: bool,
        is_dragging: bool,
    ) -> TransitionContext {
        let notches = self.configuration.notches();
        TransitionContext {
            overlay,
            start_height,
            target_index,
            target_height: notches.height(target_index).unwrap_or(0.0),
            velocity,
            notch_heights: notches.heights().to_vec(),
            reachable_indices: self.configuration.enabled_notches(overlay).indices(),
            is_animated,
            is_dragging,
        }
    }
}

impl OverlayTranslationController for TranslationController {
    fn translation_height(&self) -> f64 {
        Self::translation_height(self)
    }

    fn translation_position(&self) -> TranslationPosition {
        Self::translation_position(self)
    }

    fn is_draggable(&self, point: Point) -> bool {
        Self::is_draggable(self, point)
    }

    fn has_reached_a_notch(&self) -> bool {
        Self::has_reached_a_notch(self)
    }

    fn start_translation(&self) {
        Self::start_translation(self);
    }

    fn drag_overlay(&self, offset: f64, uses_translation_function: bool) -> f64 {
        Self::drag_overlay(self, offset, uses_translation_function)
    }

    fn end_translation(&self, velocity: Vec2, notch_index: Option<usize>) {
        Self::end_translation(self, velocity, notch_index);
    }

    fn nearest_reachable_index(&self) -> Option<usize> {
        Self::nearest_reachable_index(self)
    }
}

fn run_all(completions: Vec<Completion>) {
    for completion in completions {
        completion();
    }
}
