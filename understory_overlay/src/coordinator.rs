// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transition coordinators.
//!
//! A [`TransitionCoordinator`] is handed to observers in
//! [`ContainerDelegate::will_translate`](crate::delegate::ContainerDelegate::will_translate)
//! before a transition starts. Observers read where the overlay is headed and register
//! closures to run in lockstep with it:
//!
//! ```rust
//! # use std::cell::Cell;
//! # use std::rc::Rc;
//! # use understory_overlay::coordinator::TransitionCoordinator;
//! fn fade_backdrop(coordinator: &TransitionCoordinator, alpha: Rc<Cell<f64>>) {
//!     coordinator.animate_alongside(move |c| {
//!         alpha.set(c.overall_translation_progress());
//!     });
//! }
//! ```
//!
//! Alongside closures run on every animation frame and once more when the transition
//! finishes. Completion closures run once, when it finishes or is interrupted.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use kurbo::Vec2;

use crate::animator::TransitionContext;
use crate::types::ChildId;

type Alongside = Box<dyn FnMut(&TransitionCoordinator)>;
type Completion = Box<dyn FnOnce(&TransitionCoordinator)>;

/// Progress and metadata of one transition.
pub struct TransitionCoordinator {
    context: TransitionContext,
    current_height: Cell<f64>,
    fraction_complete: Cell<f64>,
    cancelled: Cell<bool>,
    finished: Cell<bool>,
    alongside: RefCell<Vec<Alongside>>,
    completions: RefCell<Vec<Completion>>,
}

impl core::fmt::Debug for TransitionCoordinator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TransitionCoordinator")
            .field("context", &self.context)
            .field("current_height", &self.current_height.get())
            .field("cancelled", &self.cancelled.get())
            .field("finished", &self.finished.get())
            .finish_non_exhaustive()
    }
}

impl TransitionCoordinator {
    /// Coordinator for a transition starting at `context.start_height`.
    pub fn new(context: TransitionContext) -> Self {
        let start = context.start_height;
        Self {
            context,
            current_height: Cell::new(start),
            fraction_complete: Cell::new(0.0),
            cancelled: Cell::new(false),
            finished: Cell::new(false),
            alongside: RefCell::new(Vec::new()),
            completions: RefCell::new(Vec::new()),
        }
    }

    /// Run `animation` on every frame of the transition and once at its end.
    ///
    /// Registering after the transition finished runs nothing.
    pub fn animate_alongside(&self, animation: impl FnMut(&Self) + 'static) {
        if !self.finished.get() {
            self.alongside.borrow_mut().push(Box::new(animation));
        }
    }

    /// Run `completion` once when the transition finishes or is interrupted.
    ///
    /// Registering after the transition finished runs it immediately.
    pub fn on_completion(&self, completion: impl FnOnce(&Self) + 'static) {
        if self.finished.get() {
            completion(self);
        } else {
            self.completions.borrow_mut().push(Box::new(completion));
        }
    }

    /// The overlay being moved.
    pub fn overlay(&self) -> ChildId {
        self.context.overlay
    }

    /// Full context captured at the start.
    pub fn context(&self) -> &TransitionContext {
        &self.context
    }

    /// Notch the transition settles at.
    pub fn target_notch_index(&self) -> usize {
        self.context.target_index
    }

    /// Height of the target notch.
    pub fn target_translation_height(&self) -> f64 {
        self.context.target_height
    }

    /// Translation height before the transition.
    pub fn start_translation_height(&self) -> f64 {
        self.context.start_height
    }

    /// Presented height as of the last frame.
    pub fn current_translation_height(&self) -> f64 {
        self.current_height.get()
    }

    /// Release velocity, points per second.
    pub fn velocity(&self) -> Vec2 {
        self.context.velocity
    }

    /// Height of notch `index`.
    pub fn height_for_notch(&self, index: usize) -> f64 {
        self.context.height_for_notch(index)
    }

    /// Number of notches.
    pub fn number_of_notches(&self) -> usize {
        self.context.notch_heights.len()
    }

    /// Enabled notch indices.
    pub fn reachable_indices(&self) -> &[usize] {
        &self.context.reachable_indices
    }

    /// `false` when the height jumps straight to the target.
    pub fn is_animated(&self) -> bool {
        self.context.is_animated
    }

    /// `true` when the user is driving the height.
    pub fn is_dragging(&self) -> bool {
        self.context.is_dragging
    }

    /// `true` once the transition was interrupted before reaching its target.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    /// Animator progress in `0.0..=1.0`.
    pub fn fraction_complete(&self) -> f64 {
        self.fraction_complete.get()
    }

    /// Fraction of the way from the start height to the target height.
    ///
    /// `1.0` when start and target coincide.
    pub fn translation_progress(&self) -> f64 {
        let span = self.context.target_height - self.context.start_height;
        if span == 0.0 {
            return 1.0;
        }
        (self.current_height.get() - self.context.start_height) / span
    }

    /// Position of the current height between the lowest and highest notch.
    ///
    /// `0.0` at notch 0 and `1.0` at the last notch. Not clamped while overshooting.
    pub fn overall_translation_progress(&self) -> f64 {
        let (Some(min), Some(max)) = (
            self.context.notch_heights.first(),
            self.context.notch_heights.last(),
        ) else {
            return 0.0;
        };
        let span = max - min;
        if span == 0.0 {
            return 1.0;
        }
        (self.current_height.get() - min) / span
    }

    pub(crate) fn frame(&self, height: f64, fraction_complete: f64) {
        if self.finished.get() {
            return;
        }
        self.current_height.set(height);
        self.fraction_complete.set(fraction_complete);
        self.run_alongside();
    }

    /// Finish the transition, running alongside closures one last time, then completions.
    pub(crate) fn finish(&self, height: f64, cancelled: bool) {
        if self.finished.get() {
            return;
        }
        self.current_height.set(height);
        self.cancelled.set(cancelled);
        if !cancelled {
            self.fraction_complete.set(1.0);
        }
        self.run_alongside();
        self.finished.set(true);
        self.alongside.borrow_mut().clear();
        let completions = core::mem::take(&mut *self.completions.borrow_mut());
        for completion in completions {
            completion(self);
        }
    }

    fn run_alongside(&self) {
        // Closures may register more closures while running.
        let mut running = core::mem::take(&mut *self.alongside.borrow_mut());
        for animation in &mut running {
            animation(self);
        }
        let mut slot = self.alongside.borrow_mut();
        running.append(&mut slot);
        *slot = running;
    }
}
