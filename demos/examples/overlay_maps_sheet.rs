// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Maps-like overlay.
//!
//! Three notches: a peek at 120 points, half the screen and the full screen. The full
//! screen notch is only reachable for the search overlay. The demo drags the overlay up,
//! releases it with a flick, prints the settle animation frame by frame, then moves it
//! back down programmatically.
//!
//! Run:
//! - `cargo run -p understory_overlay_demos --example overlay_maps_sheet`

use std::rc::Rc;

use kurbo::{Point, Size, Vec2};
use understory_notch::policy::TargetNotchPolicy;
use understory_notch::translation::TranslationFunction;
use understory_overlay::animator::AnimationController;
use understory_overlay::container::OverlayContainer;
use understory_overlay::coordinator::TransitionCoordinator;
use understory_overlay::delegate::{ContainerDelegate, DefaultContainerDelegate, NotchHeight};
use understory_overlay::drivers::{PanGestureEvent, PanPhase};
use understory_overlay::scroll_view::ScrollView;
use understory_overlay::types::ChildId;

const MAP: ChildId = ChildId(0);
const SEARCH: ChildId = ChildId(1);
const PLACE: ChildId = ChildId(2);

struct Maps {
    defaults: DefaultContainerDelegate,
}

impl ContainerDelegate for Maps {
    fn number_of_notches(&self) -> usize {
        self.defaults.number_of_notches()
    }
    fn height_for_notch(&self, index: usize, available_space: f64) -> f64 {
        self.defaults.height_for_notch(index, available_space)
    }
    fn can_reach_notch(&self, index: usize, overlay: ChildId) -> bool {
        index < 2 || overlay == SEARCH
    }
    fn scroll_view_driving_overlay(&self, _overlay: ChildId) -> Option<ScrollView> {
        None
    }
    fn should_start_dragging(&self, _overlay: ChildId, _point: Point) -> bool {
        true
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
    fn will_start_dragging(&self, overlay: ChildId) {
        println!("{overlay:?}: drag started");
    }
    fn did_drag(&self, _overlay: ChildId, _height: f64) {}
    fn will_end_dragging(&self, overlay: ChildId, velocity: Vec2) {
        println!("{overlay:?}: released at {:.0} pt/s", velocity.y);
    }
    fn will_move_to_notch(&self, overlay: ChildId, index: usize) {
        println!("{overlay:?}: heading to notch {index}");
    }
    fn did_move_to_notch(&self, overlay: ChildId, index: usize) {
        println!("{overlay:?}: resting at notch {index}");
    }
    fn will_translate(&self, _overlay: ChildId, coordinator: &TransitionCoordinator) {
        if coordinator.is_animated() {
            coordinator.on_completion(|c| {
                println!(
                    "  settle {} at {:.1}",
                    if c.is_cancelled() { "cancelled" } else { "done" },
                    c.current_translation_height()
                );
            });
        }
    }
    fn did_request_dismissal(&self, _overlay: ChildId, _velocity: Vec2) {}
}

fn main() {
    let container = OverlayContainer::new(Rc::new(Maps {
        defaults: DefaultContainerDelegate::new(vec![
            NotchHeight::Points(120.0),
            NotchHeight::Fraction(0.5),
            NotchHeight::Fraction(1.0),
        ]),
    }));
    container.set_view_controllers(vec![MAP, SEARCH]);
    container.layout(Size::new(390.0, 844.0));
    println!(
        "initial: height {:.0}, frame {:?}",
        container.translation_height(),
        container.overlay_frame()
    );

    // Drag up through half the screen and flick.
    let start = Point::new(195.0, 780.0);
    container.handle_pan(&PanGestureEvent::new(PanPhase::Began, start));
    for step in 1..=10 {
        let translation = Vec2::new(0.0, -35.0 * step as f64);
        let event = PanGestureEvent::new(PanPhase::Changed, start).with_translation(translation);
        container.handle_pan(&event);
    }
    println!(
        "dragged to {:.0} ({:?})",
        container.translation_height(),
        container.translation_position()
    );
    container.handle_pan(
        &PanGestureEvent::new(PanPhase::Ended, start).with_velocity(Vec2::new(0.0, -1500.0)),
    );

    let mut frame = 0;
    while container.advance(1.0 / 60.0) {
        frame += 1;
        if frame % 6 == 0 {
            println!("  frame {frame:>3}: {:.1}", container.translation_height());
        }
    }
    println!(
        "settled at notch {} ({:.0}), {:?}",
        container.target_notch_index(),
        container.translation_height(),
        container.translation_position()
    );

    // A place card only reaches the first two notches. The switch keeps the current
    // height; re-running the target policy settles it within the card's notches.
    container.set_view_controllers(vec![MAP, PLACE]);
    container.layout_if_needed();
    container.invalidate_notch_heights();
    container.layout_if_needed();
    while container.advance(1.0 / 60.0) {}
    println!(
        "place card at notch {} ({:.0})",
        container.target_notch_index(),
        container.translation_height()
    );

    container.move_overlay(0, false, || println!("collapsed"));
    container.layout_if_needed();
    println!("height {:.0}", container.translation_height());
}
