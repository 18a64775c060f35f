// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::rc::Rc;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Point, Rect, Size, Vec2};
use understory_overlay::container::OverlayContainer;
use understory_overlay::delegate::DefaultContainerDelegate;
use understory_overlay::drivers::{PanGestureEvent, PanPhase};
use understory_overlay::scroll_view::ScrollView;
use understory_overlay::types::ChildId;

const SIZE: Size = Size::new(390.0, 844.0);
const STEPS: usize = 240;

fn container(n: usize) -> OverlayContainer {
    let heights: Vec<f64> = (0..n).map(|i| 120.0 + i as f64 * (600.0 / n as f64)).collect();
    let container =
        OverlayContainer::new(Rc::new(DefaultContainerDelegate::with_heights(&heights)));
    container.set_view_controllers(vec![ChildId(0), ChildId(1)]);
    container.layout(SIZE);
    container
}

/// Up and down past both ends so the rubber band and the position changes are exercised.
fn drag_path(steps: usize) -> Vec<f64> {
    (0..steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            -900.0 * (t * core::f64::consts::TAU).sin()
        })
        .collect()
}

fn bench_pan_sessions(c: &mut Criterion) {
    let mut group = c.benchmark_group("pan_session");
    let path = drag_path(STEPS);
    group.throughput(Throughput::Elements(STEPS as u64));
    for &n in &[2usize, 5] {
        group.bench_function(format!("drag_n{}", n), |b| {
            b.iter_batched(
                || container(n),
                |container| {
                    let start = Point::new(100.0, 800.0);
                    container.handle_pan(&PanGestureEvent::new(PanPhase::Began, start));
                    for &y in &path {
                        let event = PanGestureEvent::new(PanPhase::Changed, start)
                            .with_translation(Vec2::new(0.0, y));
                        container.handle_pan(&event);
                    }
                    black_box(container.translation_height());
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("drag_release_settle_n{}", n), |b| {
            b.iter_batched(
                || container(n),
                |container| {
                    let start = Point::new(100.0, 800.0);
                    container.handle_pan(&PanGestureEvent::new(PanPhase::Began, start));
                    for &y in &path[..STEPS / 4] {
                        let event = PanGestureEvent::new(PanPhase::Changed, start)
                            .with_translation(Vec2::new(0.0, y));
                        container.handle_pan(&event);
                    }
                    let end = PanGestureEvent::new(PanPhase::Ended, start)
                        .with_velocity(Vec2::new(0.0, -1200.0));
                    container.handle_pan(&end);
                    let mut frames = 0usize;
                    while container.advance(1.0 / 120.0) {
                        frames += 1;
                    }
                    black_box((frames, container.target_notch_index()));
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_scroll_hand_off(c: &mut Criterion) {
    let mut group = c.benchmark_group("scroll_hand_off");
    let path = drag_path(STEPS);
    group.throughput(Throughput::Elements(STEPS as u64));
    group.bench_function("scroll_drag_release", |b| {
        b.iter_batched(
            || {
                let container = container(3);
                let scroll_view = ScrollView::new(Rect::new(0.0, 0.0, SIZE.width, SIZE.height));
                container.set_driving_scroll_view(Some(scroll_view.clone()));
                (container, scroll_view)
            },
            |(container, scroll_view)| {
                scroll_view.begin_dragging();
                for pair in path.windows(2) {
                    let velocity = Vec2::new(0.0, (pair[1] - pair[0]) * 120.0);
                    scroll_view.pan_to(Vec2::new(0.0, pair[1]), velocity);
                }
                let target = scroll_view.end_dragging(Vec2::ZERO, scroll_view.content_offset());
                while container.advance(1.0 / 120.0) {}
                black_box((target, container.translation_height()));
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_pan_sessions, bench_scroll_hand_off);
criterion_main!(benches);
