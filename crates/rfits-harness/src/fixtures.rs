#![forbid(unsafe_code)]

//! Canned histograms for tests.

use rfits_core::histogram::{HISTOGRAM_BINS, HistogramError, HistogramModel, ImageStats, LAST_BIN};

/// Full range of 16-bit unsigned FITS data.
pub const U16_RANGE: (f64, f64) = (0.0, 65535.0);

/// Every bin holds `count` samples.
pub fn uniform(min: f64, max: f64, count: u64) -> Result<HistogramModel, HistogramError> {
    let mid = min + (max - min) / 2.0;
    let stats = ImageStats {
        min,
        max,
        mean: mid,
        median: mid,
        stddev: (max - min) / 12f64.sqrt(),
    };
    HistogramModel::new(stats, vec![count; HISTOGRAM_BINS])
}

/// All `count` samples fall in bin `bin` (clamped to the last bin).
pub fn spike(min: f64, max: f64, bin: usize, count: u64) -> Result<HistogramModel, HistogramError> {
    let bin = bin.min(LAST_BIN);
    let value = (min + bin as f64 / LAST_BIN as f64 * (max - min)).min(max);
    let mut bins = vec![0; HISTOGRAM_BINS];
    bins[bin] = count;
    let stats = ImageStats {
        min,
        max,
        mean: value,
        median: value,
        stddev: 0.0,
    };
    HistogramModel::new(stats, bins)
}

/// Every pixel equals `value`; min and max coincide.
pub fn flat(value: f64, count: u64) -> Result<HistogramModel, HistogramError> {
    let mut bins = vec![0; HISTOGRAM_BINS];
    bins[0] = count;
    let stats = ImageStats {
        min: value,
        max: value,
        mean: value,
        median: value,
        stddev: 0.0,
    };
    HistogramModel::new(stats, bins)
}
