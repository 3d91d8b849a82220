#![forbid(unsafe_code)]

//! Core: histogram model, stretch engine, view transform, and pointer input.
//!
//! # Role in RapidFits
//! `rfits-core` holds the pure state of the viewer. Nothing in this crate talks
//! to a renderer or spawns threads; every mutator is synchronous and reports
//! whether it changed anything, so the runtime decides what to dispatch.
//!
//! # Primary responsibilities
//! - **HistogramModel**: validated, immutable statistics + 256-bin histogram.
//! - **StretchEngine**: percentile auto-stretch and slider-domain clamping.
//! - **ViewTransform**: zoom (clamped) and pan (unbounded).
//! - **InteractionMachine**: drag-to-pan / wheel-to-zoom state machine.
//! - **EventCoalescer**: optional folding of pointer moves and wheel notches.
//!
//! # How it fits in the system
//! `rfits-runtime` owns one instance of each piece inside a viewer session and
//! pushes the resulting state through `rfits-backend`. `rfits-widgets` reads
//! the histogram and stretch range to draw the histogram panel.

pub mod event;
pub mod event_coalescer;
pub mod histogram;
pub mod interaction;
pub mod logging;
pub mod stretch;
pub mod view;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, trace, trace_span, warn};

pub use event::{Event, PointerButton, PointerEvent, PointerEventKind, WheelEvent};
pub use histogram::{HISTOGRAM_BINS, HistogramError, HistogramModel, ImageStats};
pub use interaction::{InteractionConfig, InteractionMachine, ViewDelta, Viewport};
pub use stretch::{AutoStretchConfig, StretchEngine, StretchMode, StretchRange};
pub use view::{ViewError, ViewTransform, ZoomRange};
