#![forbid(unsafe_code)]

//! Image statistics readout.

use rfits_core::histogram::ImageStats;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Decimal places used when none are configured.
pub const DEFAULT_PRECISION: usize = 1;

/// One `label: value` row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct StatLine {
    pub label: &'static str,
    pub value: String,
}

/// Formats [`ImageStats`] as labeled rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsPanel {
    precision: usize,
}

impl Default for StatsPanel {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
        }
    }
}

impl StatsPanel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Rows in display order: min, max, mean, median, standard deviation.
    #[must_use]
    pub fn lines(&self, stats: &ImageStats) -> Vec<StatLine> {
        [
            ("Min", stats.min),
            ("Max", stats.max),
            ("Mean", stats.mean),
            ("Median", stats.median),
            ("Std Dev", stats.stddev),
        ]
        .into_iter()
        .map(|(label, v)| StatLine {
            label,
            value: format!("{v:.prec$}", prec = self.precision),
        })
        .collect()
    }

    /// Rows joined as `Label: value`, newline separated.
    #[must_use]
    pub fn to_text(&self, stats: &ImageStats) -> String {
        self.lines(stats)
            .iter()
            .map(|l| format!("{}: {}", l.label, l.value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> ImageStats {
        ImageStats {
            min: 0.0,
            max: 65535.0,
            mean: 1024.5,
            median: 980.3,
            stddev: 12.345,
        }
    }

    #[test]
    fn default_precision_is_one_decimal() {
        let lines = StatsPanel::new().lines(&stats());
        let values: Vec<&str> = lines.iter().map(|l| l.value.as_str()).collect();
        assert_eq!(values, ["0.0", "65535.0", "1024.5", "980.3", "12.3"]);
    }

    #[test]
    fn text_uses_labels_in_order() {
        let stats = ImageStats {
            mean: 1024.75,
            ..stats()
        };
        assert_eq!(
            StatsPanel::new().precision(0).to_text(&stats),
            "Min: 0\nMax: 65535\nMean: 1025\nMedian: 980\nStd Dev: 12"
        );
    }
}
