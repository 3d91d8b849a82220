//! Benchmark: histogram construction, auto-stretch, and input coalescing.
//!
//! Run with: `cargo bench -p rfits-core --bench stretch_bench`
//!
//! `from_samples` runs once per image load; `auto_stretch` runs on every
//! button press; the interaction path runs per pointer event, so its cost
//! bounds how many moves per frame the session can absorb.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rfits_core::event::Event;
use rfits_core::event_coalescer::EventCoalescer;
use rfits_core::histogram::{HISTOGRAM_BINS, HistogramModel};
use rfits_core::interaction::{InteractionConfig, InteractionMachine, Viewport};
use rfits_core::stretch::StretchEngine;
use rfits_core::view::ViewTransform;

/// Deterministic pseudo-image: a smooth gradient with a bright core.
fn synthetic_samples(width: usize, height: usize) -> Vec<f32> {
    let mut samples = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let dx = x as f32 - width as f32 / 2.0;
            let dy = y as f32 - height as f32 / 2.0;
            let core = 4000.0 / (1.0 + (dx * dx + dy * dy) / 64.0);
            samples.push(100.0 + (x + y) as f32 * 0.5 + core);
        }
    }
    samples
}

fn bench_from_samples(c: &mut Criterion) {
    let mut group = c.benchmark_group("histogram/from_samples");
    for side in [256usize, 1024] {
        let samples = synthetic_samples(side, side);
        group.bench_with_input(BenchmarkId::from_parameter(side), &samples, |b, s| {
            b.iter(|| HistogramModel::from_samples(black_box(s)));
        });
    }
    group.finish();
}

fn bench_auto_stretch(c: &mut Criterion) {
    let Some(histogram) = HistogramModel::from_samples(&synthetic_samples(512, 512)) else {
        return;
    };
    let engine = StretchEngine::default();
    c.bench_function("stretch/auto_stretch", |b| {
        b.iter(|| engine.auto_stretch(black_box(&histogram)));
    });

    let flat = vec![1u64; HISTOGRAM_BINS];
    c.bench_function("stretch/clip_indices_uniform", |b| {
        b.iter(|| rfits_core::stretch::clip_indices(black_box(&flat), engine.config()));
    });
}

fn drag_events(n: usize) -> Vec<Event> {
    let mut events = Vec::with_capacity(n + 2);
    events.push(Event::down(0.0, 0.0));
    for i in 0..n {
        events.push(Event::moved(i as f64 * 0.7, i as f64 * 0.3));
    }
    events.push(Event::up(n as f64, n as f64));
    events
}

fn bench_interaction(c: &mut Criterion) {
    let events = drag_events(1000);
    let mut group = c.benchmark_group("interaction/drag_1000");

    group.bench_function("direct", |b| {
        b.iter(|| {
            let mut machine =
                InteractionMachine::new(InteractionConfig::default(), Viewport::new(1920.0, 1080.0));
            let mut view = ViewTransform::default();
            for e in &events {
                if let Some(delta) = machine.process(black_box(e)) {
                    delta.apply(&mut view);
                }
            }
            view
        });
    });

    group.bench_function("coalesced", |b| {
        b.iter(|| {
            let mut coalescer = EventCoalescer::new();
            let mut out = Vec::new();
            for e in &events {
                coalescer.feed(*black_box(e), &mut out);
            }
            out.extend(coalescer.flush());
            out
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_from_samples,
    bench_auto_stretch,
    bench_interaction,
);
criterion_main!(benches);
