#![forbid(unsafe_code)]

//! Intensity stretch bounds and percentile auto-stretch.
//!
//! The stretch range is the `[min, max]` interval of pixel values that the
//! renderer maps onto the full display brightness range. It starts out as the
//! full data range of the [`HistogramModel`] and is changed either by direct
//! edits (sliders) or by [`StretchEngine::auto_stretch`].
//!
//! # Auto-stretch
//!
//! Percentile clipping over the histogram:
//!
//! 1. `total = sum(bins)`, `low = total * low_percentile`,
//!    `high = total * high_percentile`.
//! 2. Walk the bins accumulating counts. The first bin where the running sum
//!    exceeds `low` is the lower bound (bin 0 if never exceeded); the first bin
//!    where it exceeds `high` is the upper bound (last bin if never reached).
//! 3. Both bin indices are mapped back to value space with
//!    [`HistogramModel::bin_value`].
//!
//! An empty histogram (`total == 0`) yields no result; the caller keeps its
//! current range.

use crate::histogram::{HistogramModel, LAST_BIN};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default lower clipping percentile (0.5%).
pub const DEFAULT_LOW_PERCENTILE: f64 = 0.005;

/// Default upper clipping percentile (99.5%).
pub const DEFAULT_HIGH_PERCENTILE: f64 = 0.995;

/// Step used instead of zero when the histogram range collapses.
pub const MIN_SLIDER_STEP: f64 = 1e-6;

/// Number of slider positions across the histogram range.
pub const DEFAULT_SLIDER_STEPS: u32 = 1000;

/// Intensity bounds sent to the renderer.
///
/// `min < max` is the normal case but not enforced: slider edits may cross the
/// bounds, and consumers must tolerate a degenerate or inverted pair.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StretchRange {
    pub min: f64,
    pub max: f64,
}

impl StretchRange {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// The full data range of a histogram.
    #[must_use]
    pub fn full(histogram: &HistogramModel) -> Self {
        Self::new(histogram.min(), histogram.max())
    }

    /// `true` when `min >= max`.
    #[inline]
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.min >= self.max
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

/// Transfer curve the renderer applies between the stretch bounds.
///
/// The mode travels with the bounds on the stretch channel and is kept across
/// image loads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StretchMode {
    #[default]
    Linear,
    Log,
    Sqrt,
    HistEq,
}

impl StretchMode {
    pub const ALL: [Self; 4] = [Self::Linear, Self::Log, Self::Sqrt, Self::HistEq];

    /// Button label in the color mapping panel.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::Log => "Logarithmic",
            Self::Sqrt => "Square Root",
            Self::HistEq => "Histogram Eq.",
        }
    }

    /// Stable lowercase name, as used in config files and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Log => "log",
            Self::Sqrt => "sqrt",
            Self::HistEq => "hist_eq",
        }
    }
}

/// Clipping percentiles for auto-stretch, as fractions in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AutoStretchConfig {
    pub low_percentile: f64,
    pub high_percentile: f64,
}

impl Default for AutoStretchConfig {
    fn default() -> Self {
        Self {
            low_percentile: DEFAULT_LOW_PERCENTILE,
            high_percentile: DEFAULT_HIGH_PERCENTILE,
        }
    }
}

impl AutoStretchConfig {
    /// Problems with this config, empty when usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !(0.0..=1.0).contains(&self.low_percentile) {
            errors.push(format!(
                "stretch.low_percentile must be in [0, 1], got {}",
                self.low_percentile
            ));
        }
        if !(0.0..=1.0).contains(&self.high_percentile) {
            errors.push(format!(
                "stretch.high_percentile must be in [0, 1], got {}",
                self.high_percentile
            ));
        }
        if self.low_percentile >= self.high_percentile {
            errors.push(format!(
                "stretch.low_percentile ({}) must be below high_percentile ({})",
                self.low_percentile, self.high_percentile
            ));
        }
        errors
    }
}

/// Bin indices chosen by percentile clipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipIndices {
    pub min_idx: usize,
    pub max_idx: usize,
}

/// Walk `bins` and find the percentile clip indices.
///
/// Returns `None` for an empty histogram.
#[must_use]
pub fn clip_indices(bins: &[u64], config: &AutoStretchConfig) -> Option<ClipIndices> {
    let total = bins.iter().fold(0u64, |acc, &c| acc.saturating_add(c));
    if total == 0 {
        return None;
    }

    let low = total as f64 * config.low_percentile;
    let high = total as f64 * config.high_percentile;

    let mut cumulative = 0u64;
    let mut min_idx = None;
    let mut max_idx = None;
    for (i, &count) in bins.iter().enumerate() {
        cumulative = cumulative.saturating_add(count);
        let running = cumulative as f64;
        if min_idx.is_none() && running > low {
            min_idx = Some(i);
        }
        if running > high {
            max_idx = Some(i);
            break;
        }
    }

    Some(ClipIndices {
        min_idx: min_idx.unwrap_or(0),
        max_idx: max_idx.unwrap_or(LAST_BIN),
    })
}

/// Derives and validates stretch bounds from a histogram.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StretchEngine {
    config: AutoStretchConfig,
}

impl StretchEngine {
    #[must_use]
    pub fn new(config: AutoStretchConfig) -> Self {
        Self { config }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &AutoStretchConfig {
        &self.config
    }

    /// Range to use right after an image loads.
    #[must_use]
    pub fn initial_range(&self, histogram: &HistogramModel) -> StretchRange {
        StretchRange::full(histogram)
    }

    /// Percentile-clipped range, or `None` if the histogram is empty.
    #[must_use]
    pub fn auto_stretch(&self, histogram: &HistogramModel) -> Option<StretchRange> {
        let _span = crate::trace_span!("stretch.auto").entered();
        let Some(clip) = clip_indices(histogram.bins(), &self.config) else {
            crate::debug!(
                target: "rfits.stretch",
                "auto-stretch skipped: histogram is empty"
            );
            return None;
        };

        let range = StretchRange::new(
            histogram.bin_value(clip.min_idx),
            histogram.bin_value(clip.max_idx),
        );
        crate::debug!(
            target: "rfits.stretch",
            min_idx = clip.min_idx,
            max_idx = clip.max_idx,
            stretch_min = range.min,
            stretch_max = range.max,
            "auto-stretch computed"
        );
        Some(range)
    }

    /// Clamp a user-entered bound into the histogram's value domain.
    ///
    /// Returns `None` for non-finite input.
    #[must_use]
    pub fn clamp_bound(&self, histogram: &HistogramModel, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        Some(value.clamp(histogram.min(), histogram.max()))
    }

    /// Slider increment spanning the histogram range in `steps` positions.
    ///
    /// Falls back to [`MIN_SLIDER_STEP`] when the range (or `steps`) is zero.
    #[must_use]
    pub fn slider_step(&self, histogram: &HistogramModel, steps: u32) -> f64 {
        if steps == 0 {
            return MIN_SLIDER_STEP;
        }
        let step = histogram.range() / f64::from(steps);
        if step > 0.0 { step } else { MIN_SLIDER_STEP }
    }
}
