#![forbid(unsafe_code)]

//! RapidFits public facade crate.
//!
//! Re-exports the control core (view transform, interaction, stretch),
//! the renderer/loader boundary traits, the viewer session with its
//! dispatchers, and the histogram widgets, plus a small prelude.
//!
//! ```no_run
//! use rfits::prelude::*;
//! # fn run<S: ImageSource, K: RenderSink + Send + 'static>(source: S, sink: K) -> rfits::Result<()> {
//! let mut viewer = rfits::threaded_session(source, sink, ViewerConfig::default())?;
//! viewer.load_stats()?;
//! viewer.handle_event(&Event::wheel(-1.0));
//! viewer.auto_stretch()?;
//! # Ok(())
//! # }
//! ```

use std::io;

use thiserror::Error;

// --- Core re-exports -------------------------------------------------------

pub use rfits_core::event::{
    Event, PointerButton, PointerEvent, PointerEventKind, WheelDirection, WheelEvent,
};
pub use rfits_core::event_coalescer::EventCoalescer;
pub use rfits_core::histogram::{HISTOGRAM_BINS, HistogramError, HistogramModel, ImageStats};
pub use rfits_core::interaction::{
    InteractionConfig, InteractionMachine, InteractionState, ViewDelta, Viewport,
};
pub use rfits_core::stretch::{AutoStretchConfig, StretchEngine, StretchMode, StretchRange};
pub use rfits_core::view::{ViewTransform, ZoomRange};

// --- Boundary re-exports ---------------------------------------------------

pub use rfits_backend::{
    Channel, ImageSource, RenderCommand, RenderSink, StretchCommand, ViewCommand,
};

// --- Runtime re-exports ----------------------------------------------------

pub use rfits_runtime::{
    CommandDispatch, ConfigError, DispatchConfig, DispatchOutcome, DispatchStats, FileSelection,
    RenderDispatcher, ThreadedDispatcher, ViewerConfig, ViewerError, ViewerSession,
};

// --- Widget re-exports -----------------------------------------------------

#[cfg(feature = "widgets")]
pub use rfits_widgets::{DrawOp, HistogramDrawing, HistogramView, StatsPanel, StretchMarkers};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for RapidFits hosts.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Viewer(#[from] ViewerError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The render thread could not be spawned.
    #[error("failed to start render thread: {0}")]
    RenderThread(#[from] io::Error),
}

/// Standard result type for rfits APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// A session that renders on the caller's thread.
pub type SyncSession<S, K> = ViewerSession<S, RenderDispatcher<K>>;

/// A session whose renderer lives on a dedicated thread.
pub type ThreadedSession<S> = ViewerSession<S, ThreadedDispatcher>;

/// Build a session that calls `sink` directly, honoring `config.dispatch.dedupe`.
pub fn sync_session<S, K>(source: S, sink: K, config: ViewerConfig) -> Result<SyncSession<S, K>>
where
    S: ImageSource,
    K: RenderSink,
{
    let dispatcher = RenderDispatcher::with_dedupe(sink, config.dispatch.dedupe);
    Ok(ViewerSession::with_config(source, dispatcher, config)?)
}

/// Build a session that moves `sink` onto a render thread sized by
/// `config.dispatch.channel_capacity`.
pub fn threaded_session<S, K>(source: S, sink: K, config: ViewerConfig) -> Result<ThreadedSession<S>>
where
    S: ImageSource,
    K: RenderSink + Send + 'static,
{
    let config = config.validated()?;
    let dispatcher = ThreadedDispatcher::start(
        sink,
        config.dispatch.channel_capacity,
        config.dispatch.dedupe,
    )?;
    Ok(ViewerSession::with_config(source, dispatcher, config)?)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        CommandDispatch, Error, Event, FileSelection, HistogramModel, ImageSource, RenderSink,
        Result, StretchMode, StretchRange, ViewTransform, ViewerConfig, ViewerSession,
    };

    #[cfg(feature = "widgets")]
    pub use crate::{HistogramView, StatsPanel};

    pub use crate::{backend, core, runtime};

    #[cfg(feature = "widgets")]
    pub use crate::widgets;
}

pub use rfits_backend as backend;
pub use rfits_core as core;
pub use rfits_runtime as runtime;
#[cfg(feature = "widgets")]
pub use rfits_widgets as widgets;
