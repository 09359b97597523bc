//! Benchmarks for scrolling a virtualized collection.
//!
//! Performance budgets:
//! - Small user scroll (recycling a few slots): < 5µs
//! - scroll_to_index on 5M items: < 50µs
//!
//! Run with: cargo bench -p winseq --bench scroll_bench

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;
use web_time::Instant;
use winseq::testing::SimHost;
use winseq::{Resize, Virtualizer, VirtualizerConfig, WheelEvent};

fn list(size: usize, viewport: f64) -> Virtualizer<SimHost> {
    let host = SimHost::new(32.0).without_update_log();
    let mut v = Virtualizer::with_defaults(host);
    v.on_resize(Resize::ScrollTarget {
        width: 800.0,
        height: viewport,
    });
    v.set_size(size);
    v.flush();
    v
}

// =============================================================================
// User scroll
// =============================================================================

fn bench_user_scroll(c: &mut Criterion) {
    let mut group = c.benchmark_group("scroll/user");

    for step in [8.0, 120.0, 2_000.0] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::new("step", format!("{step}px")),
            &step,
            |b, &step| {
                let mut v = list(5_000_000, 720.0);
                let t0 = Instant::now();
                let mut top = 0.0;
                let mut tick = 0u64;
                b.iter(|| {
                    top += step;
                    if top >= v.region().max_scroll_top() {
                        top = 0.0;
                    }
                    tick += 1;
                    v.on_scroll_at(top, t0 + Duration::from_millis(tick));
                    black_box(v.first_visible_index())
                })
            },
        );
    }

    group.finish();
}

// =============================================================================
// Sweep: every position of a huge collection
// =============================================================================

fn bench_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("scroll/sweep");
    group.sample_size(10);

    let positions = 1_000u64;
    group.throughput(Throughput::Elements(positions));
    group.bench_function("5M/1000_positions", |b| {
        let mut v = list(5_000_000, 720.0);
        let t0 = Instant::now();
        b.iter(|| {
            let max = v.region().max_scroll_top();
            for i in 0..positions {
                let top = max * i as f64 / positions as f64;
                v.on_scroll_at(top, t0 + Duration::from_millis(i));
                v.flush();
            }
            black_box(v.last_visible_index())
        })
    });

    group.finish();
}

// =============================================================================
// Programmatic scroll
// =============================================================================

fn bench_scroll_to_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("scroll/to_index");

    for size in [10_000usize, 5_000_000, 50_000_000] {
        group.bench_with_input(BenchmarkId::new("size", size), &size, |b, &size| {
            let mut v = list(size, 720.0);
            let mut index = 0usize;
            b.iter(|| {
                index = (index + 7_919) % size;
                v.scroll_to_index(index);
                black_box(v.first_visible_index())
            })
        });
    }

    group.finish();
}

// =============================================================================
// Wheel
// =============================================================================

fn bench_wheel(c: &mut Criterion) {
    let mut group = c.benchmark_group("scroll/wheel");

    group.bench_function("lines_with_frames", |b| {
        let mut v = list(1_000_000, 720.0);
        let t0 = Instant::now();
        let event = WheelEvent::lines(3.0);
        let mut tick = 0u64;
        b.iter(|| {
            tick += 1;
            let outcome = v.on_wheel_at(&event, t0 + Duration::from_millis(tick));
            v.on_animation_frame();
            if v.scroll_top() >= v.region().max_scroll_top() {
                v.scroll_to_index(0);
            }
            black_box(outcome)
        })
    });

    group.finish();
}

// =============================================================================
// Size changes
// =============================================================================

fn bench_set_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("size/set");
    let config = VirtualizerConfig::default();

    group.bench_function("toggle_1M", |b| {
        let host = SimHost::new(32.0).without_update_log();
        let mut v = Virtualizer::new(host, config.clone()).expect("valid config");
        v.on_resize(Resize::ScrollTarget {
            width: 800.0,
            height: 720.0,
        });
        v.set_size(1_000_000);
        v.flush();
        v.scroll_to_index(500_000);
        let mut grow = false;
        b.iter(|| {
            grow = !grow;
            v.set_size(if grow { 1_000_001 } else { 1_000_000 });
            black_box(v.first_visible_index())
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_user_scroll,
    bench_sweep,
    bench_scroll_to_index,
    bench_wheel,
    bench_set_size,
);
criterion_main!(benches);
