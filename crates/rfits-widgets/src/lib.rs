#![forbid(unsafe_code)]

//! RapidFits Widgets
//!
//! Pure projections of viewer state into drawable form. Nothing here paints;
//! a host UI walks the returned primitives.
//!
//! - [`HistogramView`] - bars and stretch markers for the histogram panel
//! - [`StatsPanel`] - labeled min/max/mean/median/std-dev rows

pub mod histogram_view;
pub mod stats_panel;

pub use histogram_view::{
    Bar, DrawOp, HistogramDrawing, HistogramView, MarkerEdge, StretchMarkers,
};
pub use stats_panel::{StatLine, StatsPanel};
