// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll view hand-off.
//!
//! The overlay hosts a list. Scrolling the list while the overlay is collapsed grows the
//! overlay instead; once the overlay reaches its top notch the remaining movement scrolls
//! the list. Scrolling back down first scrolls the list to its top, then shrinks the
//! overlay. The scroll driver shares the list's delegate slot with the list's own
//! delegate, which keeps receiving every callback.
//!
//! Run:
//! - `cargo run -p understory_overlay_demos --example overlay_scroll_hand_off`

use std::cell::Cell;
use std::rc::{Rc, Weak};

use kurbo::{Rect, Size, Vec2};
use understory_overlay::container::OverlayContainer;
use understory_overlay::delegate::DefaultContainerDelegate;
use understory_overlay::scroll_view::{ScrollView, ScrollViewDelegate};
use understory_overlay::types::ChildId;

/// The list's own delegate, e.g. for lazy loading.
#[derive(Default)]
struct List {
    scrolls: Cell<usize>,
}

impl ScrollViewDelegate for List {
    fn did_scroll(&self, _scroll_view: &ScrollView) {
        self.scrolls.set(self.scrolls.get() + 1);
    }
}

fn report(label: &str, container: &OverlayContainer, list: &ScrollView) {
    println!(
        "{label:<14} overlay {:>5.1} {:<10} list offset {:>6.1}",
        container.translation_height(),
        format!("{:?}", container.translation_position()),
        list.content_offset().y
    );
}

fn swipe(container: &OverlayContainer, list: &ScrollView, dy: f64, steps: usize, label: &str) {
    list.begin_dragging();
    for step in 1..=steps {
        let translation = Vec2::new(0.0, dy * step as f64 / steps as f64);
        list.pan_to(translation, Vec2::new(0.0, dy * 4.0));
    }
    report(label, container, list);
    let offset = list.content_offset();
    let target = list.end_dragging(Vec2::ZERO, offset);
    if target != offset {
        list.end_decelerating(target);
    }
    while container.advance(1.0 / 60.0) {}
    report("  released", container, list);
}

fn main() {
    let container =
        OverlayContainer::new(Rc::new(DefaultContainerDelegate::with_heights(&[150.0, 700.0])));
    container.set_view_controllers(vec![ChildId(0), ChildId(1)]);
    container.layout(Size::new(390.0, 800.0));

    let list_delegate = Rc::new(List::default());
    let list = ScrollView::new(Rect::new(0.0, 0.0, 390.0, 700.0));
    let weak: Weak<List> = Rc::downgrade(&list_delegate);
    let weak: Weak<dyn ScrollViewDelegate> = weak;
    list.set_delegate(Some(weak));
    container.set_driving_scroll_view(Some(list.clone()));
    report("start", &container, &list);

    // Finger up 800 points: 550 grow the overlay, the rest scrolls the list.
    swipe(&container, &list, -800.0, 20, "swipe up");
    // Finger down 400 points: the list returns to its top first.
    swipe(&container, &list, 400.0, 20, "swipe down");
    // Another 300 points down shrinks the overlay.
    swipe(&container, &list, 300.0, 15, "swipe down");

    container.set_driving_scroll_view(None);
    println!(
        "list delegate restored: {}, saw {} scroll events",
        list.delegate().is_some(),
        list_delegate.scrolls.get()
    );
}
