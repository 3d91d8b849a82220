#![forbid(unsafe_code)]

//! Histogram panel projection.
//!
//! [`HistogramView`] turns a [`HistogramModel`] and the current
//! [`StretchRange`] into a [`HistogramDrawing`]: one bar per bin plus a pair of
//! stretch markers, in canvas coordinates with the origin at the top-left.
//! The projection is pure and deterministic, so drawings can be snapshot
//! tested through their flat [`DrawOp`] list.
//!
//! # Geometry
//!
//! - Bar `i` spans `x = i * width / bins` with width `width / bins` and height
//!   `bins[i] / max_count * height` (all zero when `max_count == 0`).
//! - Marker `x = (value - hist.min) / (hist.max - hist.min) * width`, clamped
//!   into `[0, width]`. A flat histogram puts both markers at 0.
//! - A degenerate stretch (`min >= max`) still draws both markers and sets
//!   [`StretchMarkers::inverted`].
//!
//! ```
//! use rfits_core::histogram::{HistogramModel, ImageStats};
//! use rfits_core::stretch::StretchRange;
//! use rfits_widgets::histogram_view::HistogramView;
//!
//! let stats = ImageStats { min: 0.0, max: 100.0, mean: 50.0, median: 50.0, stddev: 1.0 };
//! let histogram = HistogramModel::new(stats, vec![1u64; 256]).unwrap();
//! let drawing = HistogramView::new(&histogram)
//!     .stretch(StretchRange::new(25.0, 75.0))
//!     .render(256.0, 64.0);
//! let markers = drawing.markers.unwrap();
//! assert_eq!((markers.min_x, markers.max_x), (64.0, 192.0));
//! ```

use rfits_core::histogram::HistogramModel;
use rfits_core::stretch::StretchRange;

#[cfg(feature = "serde")]
use serde::Serialize;

/// One histogram bin as a bar.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Bar {
    pub index: usize,
    pub x: f64,
    pub width: f64,
    pub height: f64,
}

/// Horizontal positions of the stretch bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct StretchMarkers {
    pub min_x: f64,
    pub max_x: f64,
    /// The stretch range was degenerate (`min >= max`).
    pub inverted: bool,
}

/// Which stretch bound a marker shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum MarkerEdge {
    Min,
    Max,
}

/// A primitive for whatever canvas ends up painting the panel.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum DrawOp {
    /// Filled rectangle, `y` measured from the top.
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    /// Full-height vertical line.
    Marker { edge: MarkerEdge, x: f64 },
}

/// Output of [`HistogramView::render`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct HistogramDrawing {
    pub width: f64,
    pub height: f64,
    pub bars: Vec<Bar>,
    pub markers: Option<StretchMarkers>,
}

impl HistogramDrawing {
    /// Flat paint list: non-empty bars left to right, then min and max
    /// markers.
    #[must_use]
    pub fn ops(&self) -> Vec<DrawOp> {
        let mut ops: Vec<DrawOp> = self
            .bars
            .iter()
            .filter(|bar| bar.height > 0.0)
            .map(|bar| DrawOp::Rect {
                x: bar.x,
                y: self.height - bar.height,
                width: bar.width,
                height: bar.height,
            })
            .collect();
        if let Some(m) = self.markers {
            ops.push(DrawOp::Marker {
                edge: MarkerEdge::Min,
                x: m.min_x,
            });
            ops.push(DrawOp::Marker {
                edge: MarkerEdge::Max,
                x: m.max_x,
            });
        }
        ops
    }

    /// Stable text form of [`ops`](Self::ops), one op per line.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = format!("histogram {:.3}x{:.3}\n", self.width, self.height);
        for op in self.ops() {
            match op {
                DrawOp::Rect {
                    x,
                    y,
                    width,
                    height,
                } => out.push_str(&format!(
                    "rect x={x:.3} y={y:.3} w={width:.3} h={height:.3}\n"
                )),
                DrawOp::Marker { edge, x } => {
                    let name = match edge {
                        MarkerEdge::Min => "min",
                        MarkerEdge::Max => "max",
                    };
                    out.push_str(&format!("marker {name} x={x:.3}\n"));
                }
            }
        }
        if let Some(m) = self.markers
            && m.inverted
        {
            out.push_str("inverted\n");
        }
        out
    }
}

/// Builder for the histogram panel.
#[derive(Debug, Clone, Copy)]
pub struct HistogramView<'a> {
    histogram: &'a HistogramModel,
    stretch: Option<StretchRange>,
}

impl<'a> HistogramView<'a> {
    /// A view without stretch markers.
    #[must_use]
    pub fn new(histogram: &'a HistogramModel) -> Self {
        Self {
            histogram,
            stretch: None,
        }
    }

    /// Draw markers for `range`.
    #[must_use]
    pub fn stretch(mut self, range: StretchRange) -> Self {
        self.stretch = Some(range);
        self
    }

    /// Project onto a `width` x `height` canvas. Non-finite or negative
    /// dimensions are treated as zero.
    #[must_use]
    pub fn render(&self, width: f64, height: f64) -> HistogramDrawing {
        let width = sanitize_extent(width);
        let height = sanitize_extent(height);

        let bins = self.histogram.bins();
        let max_count = self.histogram.max_count();
        let bar_width = if bins.is_empty() {
            0.0
        } else {
            width / bins.len() as f64
        };

        let bars = bins
            .iter()
            .enumerate()
            .map(|(index, &count)| {
                let bar_height = if max_count == 0 {
                    0.0
                } else {
                    count as f64 / max_count as f64 * height
                };
                Bar {
                    index,
                    x: index as f64 * bar_width,
                    width: bar_width,
                    height: bar_height,
                }
            })
            .collect();

        let markers = self.stretch.map(|range| StretchMarkers {
            min_x: self.marker_x(range.min, width),
            max_x: self.marker_x(range.max, width),
            inverted: range.is_degenerate(),
        });

        HistogramDrawing {
            width,
            height,
            bars,
            markers,
        }
    }

    fn marker_x(&self, value: f64, width: f64) -> f64 {
        let span = self.histogram.range();
        if span <= 0.0 || !value.is_finite() {
            return 0.0;
        }
        ((value - self.histogram.min()) / span * width).clamp(0.0, width)
    }
}

fn sanitize_extent(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rfits_core::histogram::{HISTOGRAM_BINS, ImageStats};

    fn histogram(min: f64, max: f64, bins: Vec<u64>) -> HistogramModel {
        HistogramModel::new(
            ImageStats {
                min,
                max,
                mean: min,
                median: min,
                stddev: 0.0,
            },
            bins,
        )
        .unwrap()
    }

    #[test]
    fn bars_scale_to_tallest_bin() {
        let mut bins = vec![0; HISTOGRAM_BINS];
        bins[0] = 50;
        bins[10] = 100;
        let h = histogram(0.0, 1.0, bins);
        let d = HistogramView::new(&h).render(512.0, 200.0);
        assert_eq!(d.bars.len(), HISTOGRAM_BINS);
        assert_eq!(d.bars[0].height, 100.0);
        assert_eq!(d.bars[10].height, 200.0);
        assert_eq!(d.bars[10].x, 20.0);
        assert_eq!(d.bars[10].width, 2.0);
        assert!(d.markers.is_none());
        assert_eq!(d.ops().len(), 2);
    }

    #[test]
    fn empty_histogram_has_flat_bars() {
        let h = histogram(0.0, 1.0, vec![0; HISTOGRAM_BINS]);
        let d = HistogramView::new(&h).render(256.0, 100.0);
        assert!(d.bars.iter().all(|b| b.height == 0.0));
        assert!(d.ops().is_empty());
    }

    #[test]
    fn flat_histogram_markers_at_zero() {
        let h = histogram(7.0, 7.0, vec![3; HISTOGRAM_BINS]);
        let view = HistogramView::new(&h).stretch(StretchRange::new(7.0, 7.0));
        let a = view.render(300.0, 80.0);
        let m = a.markers.unwrap();
        assert_eq!((m.min_x, m.max_x), (0.0, 0.0));
        assert!(m.inverted);
        assert_eq!(a, view.render(300.0, 80.0));
    }

    #[test]
    fn markers_clamped_to_canvas() {
        let h = histogram(0.0, 10.0, vec![1; HISTOGRAM_BINS]);
        let d = HistogramView::new(&h)
            .stretch(StretchRange::new(-5.0, 20.0))
            .render(100.0, 10.0);
        let m = d.markers.unwrap();
        assert_eq!((m.min_x, m.max_x), (0.0, 100.0));
        assert!(!m.inverted);
    }

    #[test]
    fn inverted_range_is_flagged() {
        let h = histogram(0.0, 10.0, vec![1; HISTOGRAM_BINS]);
        let d = HistogramView::new(&h)
            .stretch(StretchRange::new(8.0, 2.0))
            .render(100.0, 10.0);
        let m = d.markers.unwrap();
        assert_eq!((m.min_x, m.max_x), (80.0, 20.0));
        assert!(m.inverted);
        assert!(d.to_text().ends_with("inverted\n"));
    }

    #[test]
    fn bad_canvas_does_not_panic() {
        let h = histogram(0.0, 10.0, vec![1; HISTOGRAM_BINS]);
        let view = HistogramView::new(&h).stretch(StretchRange::new(2.0, 8.0));
        for (w, hgt) in [(f64::NAN, 10.0), (-1.0, 10.0), (100.0, f64::INFINITY), (0.0, 0.0)] {
            let d = view.render(w, hgt);
            assert!(d.ops().iter().all(|op| match op {
                DrawOp::Rect { x, y, width, height } =>
                    x.is_finite() && y.is_finite() && width.is_finite() && height.is_finite(),
                DrawOp::Marker { x, .. } => x.is_finite(),
            }));
        }
    }

    #[test]
    fn ops_put_bars_on_baseline() {
        let mut bins = vec![0; HISTOGRAM_BINS];
        bins[1] = 4;
        bins[2] = 2;
        let h = histogram(0.0, 1.0, bins);
        let d = HistogramView::new(&h).render(256.0, 40.0);
        assert_eq!(
            d.ops(),
            vec![
                DrawOp::Rect {
                    x: 1.0,
                    y: 0.0,
                    width: 1.0,
                    height: 40.0
                },
                DrawOp::Rect {
                    x: 2.0,
                    y: 20.0,
                    width: 1.0,
                    height: 20.0
                },
            ]
        );
        assert_eq!(
            d.to_text(),
            "histogram 256.000x40.000\n\
             rect x=1.000 y=0.000 w=1.000 h=40.000\n\
             rect x=2.000 y=20.000 w=1.000 h=20.000\n"
        );
    }
}
