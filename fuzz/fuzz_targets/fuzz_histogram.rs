#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rfits_core::histogram::{HISTOGRAM_BINS, HistogramModel, ImageStats};
use rfits_core::stretch::{StretchEngine, StretchRange};
use rfits_widgets::{DrawOp, HistogramView};

#[derive(Debug, Arbitrary)]
struct Input {
    min: f64,
    span: f64,
    counts: Vec<u32>,
    width: f64,
    height: f64,
    manual: (f64, f64),
}

fuzz_target!(|input: Input| {
    let mut bins = vec![0u64; HISTOGRAM_BINS];
    for (bin, count) in bins.iter_mut().zip(&input.counts) {
        *bin = u64::from(*count);
    }
    let max = input.min + input.span.abs();
    let stats = ImageStats {
        min: input.min,
        max,
        mean: input.min,
        median: input.min,
        stddev: 0.0,
    };
    // Non-finite or inverted statistics are rejected, which is fine.
    let Ok(histogram) = HistogramModel::new(stats, bins) else {
        return;
    };

    let engine = StretchEngine::default();
    if let Some(range) = engine.auto_stretch(&histogram) {
        assert!(range.min >= histogram.min() && range.max <= histogram.max());
        assert!(range.min <= range.max);
        assert_eq!(engine.auto_stretch(&histogram), Some(range));
    }

    let manual = StretchRange::new(input.manual.0, input.manual.1);
    let drawing = HistogramView::new(&histogram)
        .stretch(manual)
        .render(input.width, input.height);
    for op in drawing.ops() {
        match op {
            DrawOp::Rect { height, .. } => assert!(height.is_finite() && height >= 0.0),
            DrawOp::Marker { x, .. } => assert!((0.0..=drawing.width).contains(&x)),
        }
    }
});
