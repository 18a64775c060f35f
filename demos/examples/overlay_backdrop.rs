// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backdrop dimming driven by a transition coordinator.
//!
//! The backdrop behind the overlay darkens as the overlay grows. Its alpha follows
//! [`TransitionCoordinator::overall_translation_progress`] on every drag update and every
//! animation frame, through `animate_alongside`. A second move interrupts the first one
//! halfway, so the completion of the first reports a cancelled transition.
//!
//! Run:
//! - `cargo run -p understory_overlay_demos --example overlay_backdrop`

use std::cell::Cell;
use std::rc::Rc;

use kurbo::{Point, Size, Vec2};
use understory_notch::policy::TargetNotchPolicy;
use understory_notch::translation::TranslationFunction;
use understory_overlay::animator::AnimationController;
use understory_overlay::container::OverlayContainer;
use understory_overlay::coordinator::TransitionCoordinator;
use understory_overlay::delegate::{ContainerDelegate, DefaultContainerDelegate};
use understory_overlay::scroll_view::ScrollView;
use understory_overlay::types::ChildId;

const MAX_ALPHA: f64 = 0.6;

struct Backdrop {
    defaults: DefaultContainerDelegate,
    alpha: Rc<Cell<f64>>,
}

impl ContainerDelegate for Backdrop {
    fn number_of_notches(&self) -> usize {
        self.defaults.number_of_notches()
    }
    fn height_for_notch(&self, index: usize, available_space: f64) -> f64 {
        self.defaults.height_for_notch(index, available_space)
    }
    fn can_reach_notch(&self, index: usize, overlay: ChildId) -> bool {
        self.defaults.can_reach_notch(index, overlay)
    }
    fn scroll_view_driving_overlay(&self, overlay: ChildId) -> Option<ScrollView> {
        self.defaults.scroll_view_driving_overlay(overlay)
    }
    fn should_start_dragging(&self, overlay: ChildId, point: Point) -> bool {
        self.defaults.should_start_dragging(overlay, point)
    }
    fn translation_function(&self, overlay: ChildId) -> Option<Rc<dyn TranslationFunction>> {
        self.defaults.translation_function(overlay)
    }
    fn target_notch_policy(&self, overlay: ChildId) -> Option<Rc<dyn TargetNotchPolicy>> {
        self.defaults.target_notch_policy(overlay)
    }
    fn animation_controller(&self, overlay: ChildId) -> Option<Rc<dyn AnimationController>> {
        self.defaults.animation_controller(overlay)
    }
    fn will_start_dragging(&self, _overlay: ChildId) {}
    fn did_drag(&self, _overlay: ChildId, _height: f64) {}
    fn will_end_dragging(&self, _overlay: ChildId, _velocity: Vec2) {}
    fn will_move_to_notch(&self, _overlay: ChildId, _index: usize) {}
    fn did_move_to_notch(&self, _overlay: ChildId, _index: usize) {}
    fn will_translate(&self, _overlay: ChildId, coordinator: &TransitionCoordinator) {
        let alpha = self.alpha.clone();
        coordinator.animate_alongside(move |c| {
            alpha.set(MAX_ALPHA * c.overall_translation_progress().clamp(0.0, 1.0));
        });
        if coordinator.is_animated() {
            let target = coordinator.target_notch_index();
            coordinator.on_completion(move |c| {
                let outcome = if c.is_cancelled() { "interrupted" } else { "finished" };
                println!("move to notch {target} {outcome}");
            });
        }
    }
    fn did_request_dismissal(&self, _overlay: ChildId, _velocity: Vec2) {}
}

fn main() {
    let alpha = Rc::new(Cell::new(0.0));
    let container = OverlayContainer::new(Rc::new(Backdrop {
        defaults: DefaultContainerDelegate::with_heights(&[100.0, 350.0, 700.0]),
        alpha: alpha.clone(),
    }));
    container.set_view_controllers(vec![ChildId(0), ChildId(1)]);
    container.layout(Size::new(390.0, 800.0));
    println!("at rest: height {:.0}, alpha {:.2}", container.translation_height(), alpha.get());

    container.move_overlay(2, true, || {});
    container.layout_if_needed();
    for _ in 0..12 {
        container.advance(1.0 / 60.0);
        println!("  height {:>5.1}  alpha {:.2}", container.translation_height(), alpha.get());
    }

    // Redirect mid-flight: the running transition is cancelled at its current height.
    container.move_overlay(1, true, || println!("back at the middle notch"));
    container.layout_if_needed();
    while container.advance(1.0 / 60.0) {}
    println!("settled: height {:.0}, alpha {:.2}", container.translation_height(), alpha.get());
}
