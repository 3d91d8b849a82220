#![forbid(unsafe_code)]

//! The viewer session: sole owner and mutator of view and stretch state.
//!
//! [`ViewerSession`] holds the current [`HistogramModel`], [`StretchRange`],
//! [`ViewTransform`] and [`InteractionMachine`]. Every change goes through
//! `&mut self`, and every change that alters what the renderer should show is
//! dispatched exactly once through the session's [`CommandDispatch`].
//!
//! # Image lifecycle
//!
//! ```text
//!   NoImage ──load_stats / open_file ok──▶ Loaded(histogram)
//!      ▲                                     │  open_file ok: replaced wholesale
//!      └── file opened, stats failed ────────┘
//! ```
//!
//! Loading resets the view and sets the stretch to the histogram's full range,
//! forgets the dispatcher's last-sent commands, and dispatches both channels.
//! The [`StretchMode`] is kept across loads.
//!
//! # Failure Modes
//!
//! - A failed open or a failed stats fetch for the current image keeps all
//!   local state, stores a short user-facing notice, and returns
//!   [`ViewerError::Backend`].
//! - A stats failure right after a successful open drops the previous image:
//!   the renderer already holds the new file, so the old histogram and
//!   stretch no longer describe it. The view is reset and dispatched.
//! - Stretch operations without an image return [`ViewerError::NoImage`].
//! - Out-of-domain and non-finite input is clamped or ignored.
//! - Renderer delivery failures are logged by the dispatcher only.

use std::path::PathBuf;
use std::sync::Arc;

use rfits_backend::ImageSource;
use rfits_core::event::Event;
use rfits_core::event_coalescer::EventCoalescer;
use rfits_core::histogram::HistogramModel;
use rfits_core::interaction::{InteractionMachine, InteractionState, Viewport};
use rfits_core::stretch::{StretchEngine, StretchMode, StretchRange};
use rfits_core::view::ViewTransform;

use crate::config::ViewerConfig;
use crate::dispatcher::{CommandDispatch, DispatchOutcome};
use crate::error::{ConfigError, ViewerError};

/// Result of the external file picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSelection {
    Path(PathBuf),
    Cancelled,
}

impl From<Option<PathBuf>> for FileSelection {
    fn from(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Cancelled, Self::Path)
    }
}

/// Histogram and stretch of the loaded image.
#[derive(Debug, Clone)]
struct LoadedImage {
    histogram: Arc<HistogramModel>,
    stretch: StretchRange,
}

/// Interactive viewer state bound to an image source and a renderer.
#[derive(Debug)]
pub struct ViewerSession<S, D> {
    source: S,
    dispatcher: D,
    config: ViewerConfig,
    engine: StretchEngine,
    view: ViewTransform,
    machine: InteractionMachine,
    coalescer: EventCoalescer,
    image: Option<LoadedImage>,
    mode: StretchMode,
    notice: Option<String>,
}

impl<S: ImageSource, D: CommandDispatch> ViewerSession<S, D> {
    /// Session with default configuration and no image.
    pub fn new(source: S, dispatcher: D) -> Self {
        Self::build(source, dispatcher, ViewerConfig::default())
    }

    /// Session with a validated configuration.
    pub fn with_config(source: S, dispatcher: D, config: ViewerConfig) -> Result<Self, ConfigError> {
        let config = config.validated()?;
        Ok(Self::build(source, dispatcher, config))
    }

    fn build(source: S, dispatcher: D, config: ViewerConfig) -> Self {
        Self {
            source,
            dispatcher,
            engine: StretchEngine::new(config.stretch),
            view: ViewTransform::new(config.zoom),
            machine: InteractionMachine::new(config.interaction, Viewport::default()),
            coalescer: EventCoalescer::new(),
            image: None,
            mode: StretchMode::default(),
            notice: None,
            config,
        }
    }

    // ------------------------------------------------------------------
    // Image lifecycle
    // ------------------------------------------------------------------

    /// Fetch statistics for the image the source currently holds.
    ///
    /// On success the session adopts the new histogram, resets view and
    /// stretch, and dispatches both. On failure nothing changes.
    pub fn load_stats(&mut self) -> Result<(), ViewerError> {
        let _span = tracing::info_span!("session.load").entered();
        let histogram = match self.source.get_image_stats() {
            Ok(h) => h,
            Err(err) => {
                tracing::warn!(target: "rfits.session", error = %err, "failed to fetch image stats");
                self.notice = Some(format!("Could not read image statistics: {err}"));
                return Err(ViewerError::backend("get_image_stats", err));
            }
        };
        self.adopt(histogram);
        Ok(())
    }

    /// Handle the file picker's result.
    ///
    /// Returns `Ok(false)` for a cancelled picker and `Ok(true)` once the new
    /// image is loaded and dispatched. If the file opens but its statistics
    /// cannot be read, the session is left without an image.
    pub fn open_file(&mut self, selection: FileSelection) -> Result<bool, ViewerError> {
        let FileSelection::Path(path) = selection else {
            tracing::debug!(target: "rfits.session", "file selection cancelled");
            return Ok(false);
        };
        let _span = tracing::info_span!("session.open_file", path = %path.display()).entered();

        if let Err(err) = self.source.open_single_fits_file(&path) {
            tracing::warn!(
                target: "rfits.session",
                path = %path.display(),
                error = %err,
                "failed to open FITS file"
            );
            self.notice = Some(format!("Could not open {}: {err}", path.display()));
            return Err(ViewerError::backend("open_single_fits_file", err));
        }
        if let Err(err) = self.load_stats() {
            self.drop_image();
            return Err(err);
        }
        Ok(true)
    }

    /// Forget the current image after the source replaced it.
    fn drop_image(&mut self) {
        if self.image.take().is_some() {
            tracing::info!(target: "rfits.session", "previous image dropped");
        }
        self.reset_interaction();
        self.dispatcher.invalidate();
        self.dispatcher.push_view(&self.view);
    }

    fn reset_interaction(&mut self) {
        self.view.reset();
        self.machine.reset();
        self.coalescer.clear();
    }

    fn adopt(&mut self, histogram: HistogramModel) {
        let stretch = self.engine.initial_range(&histogram);
        tracing::info!(
            target: "rfits.session",
            min = histogram.min(),
            max = histogram.max(),
            total = histogram.total(),
            "image loaded"
        );
        self.image = Some(LoadedImage {
            histogram: Arc::new(histogram),
            stretch,
        });
        self.reset_interaction();
        self.notice = None;
        self.dispatcher.invalidate();
        self.dispatcher.push_view(&self.view);
        self.dispatcher.push_stretch(stretch, self.mode);
    }

    /// Re-send current view and stretch unconditionally (e.g. after a
    /// renderer restart).
    pub fn resync(&mut self) {
        self.dispatcher.invalidate();
        self.dispatcher.push_view(&self.view);
        if let Some(image) = &self.image {
            self.dispatcher.push_stretch(image.stretch, self.mode);
        }
    }

    // ------------------------------------------------------------------
    // View
    // ------------------------------------------------------------------

    /// Feed one input event. Returns `true` if the view changed (and was
    /// dispatched).
    pub fn handle_event(&mut self, event: &Event) -> bool {
        let Some(delta) = self.machine.process(event) else {
            return false;
        };
        self.apply_view_change(|view| delta.apply(view))
    }

    /// Feed a burst of events, coalescing them first when
    /// `dispatch.coalesce_input` is on. Returns the number of view changes.
    pub fn handle_batch<I>(&mut self, events: I) -> usize
    where
        I: IntoIterator<Item = Event>,
    {
        if !self.config.dispatch.coalesce_input {
            return events
                .into_iter()
                .filter(|event| self.handle_event(event))
                .count();
        }

        let mut ready = Vec::new();
        for event in events {
            self.coalescer.feed(event, &mut ready);
        }
        ready.extend(self.coalescer.flush());
        ready.iter().filter(|event| self.handle_event(event)).count()
    }

    /// Zoom slider. Returns `true` if the zoom changed.
    pub fn set_zoom_percent(&mut self, percent: f64) -> bool {
        self.apply_view_change(|view| view.set_zoom_percent(percent))
    }

    /// Back to 100 % and no pan. Returns `true` if anything changed.
    pub fn reset_view(&mut self) -> bool {
        self.apply_view_change(ViewTransform::reset)
    }

    fn apply_view_change(&mut self, change: impl FnOnce(&mut ViewTransform) -> bool) -> bool {
        if !change(&mut self.view) {
            return false;
        }
        self.dispatcher.push_view(&self.view);
        true
    }

    // ------------------------------------------------------------------
    // Stretch
    // ------------------------------------------------------------------

    /// Percentile auto-stretch.
    ///
    /// `Ok(false)` when the histogram is empty or the range is already the
    /// auto-stretched one.
    pub fn auto_stretch(&mut self) -> Result<bool, ViewerError> {
        let image = self.image.as_ref().ok_or(ViewerError::NoImage)?;
        let Some(range) = self.engine.auto_stretch(&image.histogram) else {
            return Ok(false);
        };
        Ok(self.apply_stretch(range))
    }

    /// Lower stretch bound from the slider, clamped into the histogram range.
    pub fn set_stretch_min(&mut self, value: f64) -> Result<bool, ViewerError> {
        let image = self.image.as_ref().ok_or(ViewerError::NoImage)?;
        let Some(min) = self.engine.clamp_bound(&image.histogram, value) else {
            return Ok(false);
        };
        let range = StretchRange::new(min, image.stretch.max);
        Ok(self.apply_stretch(range))
    }

    /// Upper stretch bound from the slider, clamped into the histogram range.
    pub fn set_stretch_max(&mut self, value: f64) -> Result<bool, ViewerError> {
        let image = self.image.as_ref().ok_or(ViewerError::NoImage)?;
        let Some(max) = self.engine.clamp_bound(&image.histogram, value) else {
            return Ok(false);
        };
        let range = StretchRange::new(image.stretch.min, max);
        Ok(self.apply_stretch(range))
    }

    fn apply_stretch(&mut self, range: StretchRange) -> bool {
        let Some(image) = self.image.as_mut() else {
            return false;
        };
        if image.stretch == range {
            return false;
        }
        image.stretch = range;
        if self.dispatcher.push_stretch(range, self.mode) == DispatchOutcome::Failed {
            tracing::debug!(target: "rfits.session", "stretch kept locally after dispatch failure");
        }
        true
    }

    /// Transfer curve from the color mapping panel. Returns `Ok(false)` when
    /// `mode` is already active.
    pub fn set_stretch_mode(&mut self, mode: StretchMode) -> Result<bool, ViewerError> {
        let image = self.image.as_ref().ok_or(ViewerError::NoImage)?;
        if self.mode == mode {
            return Ok(false);
        }
        let range = image.stretch;
        tracing::debug!(target: "rfits.session", mode = mode.name(), "stretch mode changed");
        self.mode = mode;
        if self.dispatcher.push_stretch(range, mode) == DispatchOutcome::Failed {
            tracing::debug!(target: "rfits.session", "stretch mode kept locally after dispatch failure");
        }
        Ok(true)
    }

    /// Step for the stretch sliders, or `None` without an image.
    #[must_use]
    pub fn stretch_slider_step(&self) -> Option<f64> {
        let image = self.image.as_ref()?;
        Some(
            self.engine
                .slider_step(&image.histogram, self.config.dispatch.slider_steps),
        )
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Shared handle to the loaded histogram.
    #[must_use]
    pub fn histogram(&self) -> Option<&Arc<HistogramModel>> {
        self.image.as_ref().map(|image| &image.histogram)
    }

    #[must_use]
    pub fn stretch(&self) -> Option<StretchRange> {
        self.image.as_ref().map(|image| image.stretch)
    }

    #[inline]
    #[must_use]
    pub fn stretch_mode(&self) -> StretchMode {
        self.mode
    }

    #[inline]
    #[must_use]
    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    #[inline]
    #[must_use]
    pub fn interaction_state(&self) -> InteractionState {
        self.machine.state()
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Pending user-facing notice from the last backend failure.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Take (and clear) the pending notice.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut D {
        &mut self.dispatcher
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Split into source and dispatcher.
    pub fn into_parts(self) -> (S, D) {
        (self.source, self.dispatcher)
    }
}
