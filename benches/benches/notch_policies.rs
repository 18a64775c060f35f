// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::Vec2;
use understory_notch::notches::Notches;
use understory_notch::policy::{Nearest, RushingForward, TargetNotchContext, TargetNotchPolicy};
use understory_notch::translation::{Clamp, RubberBand, TranslationFunction, TranslationParameters};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

/// Release samples: `(height, velocity.y)` spread over `[0, max]` and `[-3000, 3000]`.
fn gen_releases(count: usize, max: f64) -> Vec<(f64, f64)> {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    (0..count)
        .map(|_| (rng.next_f64() * max, (rng.next_f64() - 0.5) * 6000.0))
        .collect()
}

fn bench_target_policies(c: &mut Criterion) {
    let mut group = c.benchmark_group("target_policy");
    let releases = gen_releases(1024, 1000.0);
    group.throughput(Throughput::Elements(releases.len() as u64));
    for &n in &[3usize, 8, 32] {
        let notches = Notches::from_fn(n, |i| 100.0 + i as f64 * (900.0 / n as f64));
        let reachable = notches.reachable_with(|i| i % 5 != 4);
        let rushing = RushingForward::default();
        group.bench_function(format!("rushing_forward_n{}", n), |b| {
            b.iter(|| {
                let mut sum = 0usize;
                for &(height, vy) in &releases {
                    let ctx = TargetNotchContext {
                        height,
                        velocity: Vec2::new(0.0, vy),
                        reachable: &reachable,
                    };
                    sum += rushing.target_notch_index(&ctx).unwrap_or(0);
                }
                black_box(sum);
            })
        });
        group.bench_function(format!("nearest_n{}", n), |b| {
            b.iter(|| {
                let mut sum = 0usize;
                for &(height, vy) in &releases {
                    let ctx = TargetNotchContext {
                        height,
                        velocity: Vec2::new(0.0, vy),
                        reachable: &reachable,
                    };
                    sum += Nearest.target_notch_index(&ctx).unwrap_or(0);
                }
                black_box(sum);
            })
        });
    }
    group.finish();
}

fn bench_translation_functions(c: &mut Criterion) {
    let mut group = c.benchmark_group("translation_function");
    // Mostly overshooting on either side, which is where the rubber band does work.
    let translations: Vec<f64> = gen_releases(4096, 1400.0)
        .into_iter()
        .map(|(h, _)| h - 200.0)
        .collect();
    group.throughput(Throughput::Elements(translations.len() as u64));
    let run = |f: &dyn TranslationFunction| {
        let mut acc = 0.0;
        for &translation in &translations {
            acc += f.overlay_translation_height(&TranslationParameters {
                minimum_height: 100.0,
                maximum_height: 900.0,
                translation,
            });
        }
        acc
    };
    group.bench_function("rubber_band", |b| {
        let band = RubberBand::default();
        b.iter(|| black_box(run(&band)))
    });
    group.bench_function("rubber_band_maximum_only", |b| {
        let band = RubberBand::maximum_only();
        b.iter(|| black_box(run(&band)))
    });
    group.bench_function("clamp", |b| b.iter(|| black_box(run(&Clamp))));
    group.finish();
}

criterion_group!(benches, bench_target_policies, bench_translation_functions);
criterion_main!(benches);
