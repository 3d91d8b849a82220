#![forbid(unsafe_code)]

//! Per-image statistics snapshot.
//!
//! A [`HistogramModel`] is produced once per loaded image (usually by the
//! decoder behind the backend) and never mutated afterwards. It carries the
//! summary statistics of the pixel data plus a fixed-size histogram of
//! [`HISTOGRAM_BINS`] bins spanning `[min, max]`.
//!
//! # Invariants
//!
//! 1. `bins.len() == HISTOGRAM_BINS`.
//! 2. Every statistic is finite and `stddev >= 0`.
//! 3. `min <= mean <= max` and `min <= median <= max`.
//!
//! Bin `i` represents the value `min + (i / 255) * (max - min)`, so bin 0 maps
//! to `min` and the last bin maps to `max`.

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of bins in every histogram snapshot.
pub const HISTOGRAM_BINS: usize = 256;

/// Index of the last histogram bin.
pub const LAST_BIN: usize = HISTOGRAM_BINS - 1;

/// Summary statistics of an image.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImageStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub stddev: f64,
}

/// Reasons a statistics snapshot is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HistogramError {
    #[error("expected {expected} histogram bins, got {actual}")]
    BinCount { expected: usize, actual: usize },

    #[error("statistic `{name}` is not finite: {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("minimum {min} exceeds maximum {max}")]
    InvertedRange { min: f64, max: f64 },

    #[error("statistic `{name}` = {value} lies outside [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("standard deviation is negative: {0}")]
    NegativeStdDev(f64),
}

/// Immutable statistics + histogram of the currently loaded image.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "RawHistogram", into = "RawHistogram")
)]
pub struct HistogramModel {
    stats: ImageStats,
    bins: Vec<u64>,
}

impl HistogramModel {
    /// Validate and build a snapshot.
    pub fn new(stats: ImageStats, bins: impl Into<Vec<u64>>) -> Result<Self, HistogramError> {
        let bins = bins.into();
        if bins.len() != HISTOGRAM_BINS {
            return Err(HistogramError::BinCount {
                expected: HISTOGRAM_BINS,
                actual: bins.len(),
            });
        }

        for (name, value) in [
            ("min", stats.min),
            ("max", stats.max),
            ("mean", stats.mean),
            ("median", stats.median),
            ("stddev", stats.stddev),
        ] {
            if !value.is_finite() {
                return Err(HistogramError::NonFinite { name, value });
            }
        }

        if stats.min > stats.max {
            return Err(HistogramError::InvertedRange {
                min: stats.min,
                max: stats.max,
            });
        }

        for (name, value) in [("mean", stats.mean), ("median", stats.median)] {
            if value < stats.min || value > stats.max {
                return Err(HistogramError::OutOfRange {
                    name,
                    value,
                    min: stats.min,
                    max: stats.max,
                });
            }
        }

        if stats.stddev < 0.0 {
            return Err(HistogramError::NegativeStdDev(stats.stddev));
        }

        Ok(Self { stats, bins })
    }

    /// Compute a snapshot from raw pixel samples.
    ///
    /// Non-finite samples (NaN blanks are common in FITS data) are skipped.
    /// Returns `None` when no finite sample remains.
    #[must_use]
    pub fn from_samples(samples: &[f32]) -> Option<Self> {
        let mut values: Vec<f64> = samples
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .map(f64::from)
            .collect();
        if values.is_empty() {
            return None;
        }

        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let range = max - min;
        let n = values.len() as f64;

        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        let mut bins = vec![0u64; HISTOGRAM_BINS];
        for &v in &values {
            let idx = if range > 0.0 {
                ((v - min) / range * LAST_BIN as f64).round() as usize
            } else {
                0
            };
            bins[idx.min(LAST_BIN)] += 1;
        }

        values.sort_unstable_by(f64::total_cmp);
        let mid = values.len() / 2;
        let median = if values.len() % 2 == 0 {
            (values[mid - 1] + values[mid]) / 2.0
        } else {
            values[mid]
        };

        let stats = ImageStats {
            min,
            max,
            // Summation rounding can push the mean a hair outside the range.
            mean: mean.clamp(min, max),
            median,
            stddev: variance.sqrt(),
        };
        Self::new(stats, bins).ok()
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> ImageStats {
        self.stats
    }

    #[inline]
    #[must_use]
    pub fn min(&self) -> f64 {
        self.stats.min
    }

    #[inline]
    #[must_use]
    pub fn max(&self) -> f64 {
        self.stats.max
    }

    #[inline]
    #[must_use]
    pub fn mean(&self) -> f64 {
        self.stats.mean
    }

    #[inline]
    #[must_use]
    pub fn median(&self) -> f64 {
        self.stats.median
    }

    #[inline]
    #[must_use]
    pub fn stddev(&self) -> f64 {
        self.stats.stddev
    }

    /// Bin counts, always [`HISTOGRAM_BINS`] long.
    #[inline]
    #[must_use]
    pub fn bins(&self) -> &[u64] {
        &self.bins
    }

    /// Width of the value domain (`max - min`).
    #[inline]
    #[must_use]
    pub fn range(&self) -> f64 {
        self.stats.max - self.stats.min
    }

    /// Whether every pixel has the same value.
    #[inline]
    #[must_use]
    pub fn is_flat(&self) -> bool {
        self.range() <= 0.0
    }

    /// Total number of counted samples.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.bins.iter().fold(0u64, |acc, &c| acc.saturating_add(c))
    }

    /// Largest single bin count.
    #[must_use]
    pub fn max_count(&self) -> u64 {
        self.bins.iter().copied().max().unwrap_or(0)
    }

    /// Map a bin index back into value space. Indices past the last bin clamp.
    ///
    /// The result never exceeds `max`, even where `min + (max - min)` rounds up.
    #[must_use]
    pub fn bin_value(&self, idx: usize) -> f64 {
        let idx = idx.min(LAST_BIN);
        let value = self.stats.min + (idx as f64 / LAST_BIN as f64) * self.range();
        value.min(self.stats.max)
    }
}

#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct RawHistogram {
    #[serde(flatten)]
    stats: ImageStats,
    bins: Vec<u64>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawHistogram> for HistogramModel {
    type Error = HistogramError;

    fn try_from(raw: RawHistogram) -> Result<Self, Self::Error> {
        Self::new(raw.stats, raw.bins)
    }
}

#[cfg(feature = "serde")]
impl From<HistogramModel> for RawHistogram {
    fn from(model: HistogramModel) -> Self {
        Self {
            stats: model.stats,
            bins: model.bins,
        }
    }
}
