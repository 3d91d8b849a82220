#![forbid(unsafe_code)]
#![doc = "Renderer and image-source boundary traits for RapidFits."]
#![doc = ""]
#![doc = "This crate defines the boundary between the viewer runtime and the parts it"]
#![doc = "does not own: the GPU renderer that paints the image and the FITS loader that"]
#![doc = "decodes files and computes statistics. Both sit behind narrow synchronous"]
#![doc = "traits; asynchrony, if any, is the runtime's concern."]

use std::path::Path;

use rfits_core::histogram::HistogramModel;
use rfits_core::stretch::{StretchMode, StretchRange};
use rfits_core::view::ViewTransform;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// View parameters as the renderer consumes them.
///
/// `scale` is a multiplier (`zoom_percent / 100`); pan is normalized and
/// unbounded.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ViewCommand {
    pub scale: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl From<&ViewTransform> for ViewCommand {
    fn from(view: &ViewTransform) -> Self {
        let (pan_x, pan_y) = view.pan();
        Self {
            scale: view.scale(),
            pan_x,
            pan_y,
        }
    }
}

/// Intensity bounds and transfer curve as the renderer consumes them.
/// `min >= max` is possible and the renderer must cope.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StretchCommand {
    pub min: f64,
    pub max: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub mode: StretchMode,
}

impl StretchCommand {
    #[must_use]
    pub const fn new(range: StretchRange, mode: StretchMode) -> Self {
        Self {
            min: range.min,
            max: range.max,
            mode,
        }
    }

    /// Bounds with the linear curve.
    #[must_use]
    pub const fn linear(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            mode: StretchMode::Linear,
        }
    }
}

/// Independent update streams to the renderer.
///
/// Ordering is preserved within a channel; nothing is promised across them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    View,
    Stretch,
}

impl Channel {
    pub const ALL: [Self; 2] = [Self::View, Self::Stretch];

    /// Stable index for per-channel bookkeeping arrays.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::View => 0,
            Self::Stretch => 1,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Stretch => "stretch",
        }
    }
}

/// One message to the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum RenderCommand {
    View(ViewCommand),
    Stretch(StretchCommand),
}

impl RenderCommand {
    #[must_use]
    pub const fn channel(&self) -> Channel {
        match self {
            Self::View(_) => Channel::View,
            Self::Stretch(_) => Channel::Stretch,
        }
    }

    /// Deliver this command through the matching sink method.
    pub fn send_to<K: RenderSink + ?Sized>(&self, sink: &mut K) -> Result<(), K::Error> {
        match *self {
            Self::View(cmd) => sink.update_view(cmd),
            Self::Stretch(cmd) => sink.update_stretch(cmd),
        }
    }
}

impl From<ViewCommand> for RenderCommand {
    fn from(cmd: ViewCommand) -> Self {
        Self::View(cmd)
    }
}

impl From<StretchCommand> for RenderCommand {
    fn from(cmd: StretchCommand) -> Self {
        Self::Stretch(cmd)
    }
}

/// Renderer boundary: receives view and stretch parameters.
///
/// Implementations keep their last successfully applied parameters when a
/// call fails; callers treat every call as fire-and-forget.
pub trait RenderSink {
    /// Platform-specific error type.
    type Error: core::fmt::Debug + core::fmt::Display;

    /// Apply new zoom/pan.
    fn update_view(&mut self, cmd: ViewCommand) -> Result<(), Self::Error>;

    /// Apply new intensity bounds and transfer curve.
    fn update_stretch(&mut self, cmd: StretchCommand) -> Result<(), Self::Error>;
}

impl<K: RenderSink + ?Sized> RenderSink for Box<K> {
    type Error = K::Error;

    fn update_view(&mut self, cmd: ViewCommand) -> Result<(), Self::Error> {
        (**self).update_view(cmd)
    }

    fn update_stretch(&mut self, cmd: StretchCommand) -> Result<(), Self::Error> {
        (**self).update_stretch(cmd)
    }
}

/// Image loader boundary: opens FITS files and reports statistics of the
/// currently loaded image.
pub trait ImageSource {
    /// Platform-specific error type.
    type Error: core::fmt::Debug + core::fmt::Display;

    /// Statistics and histogram of the current image.
    ///
    /// Fails when no image is loaded or the loader cannot compute them.
    fn get_image_stats(&mut self) -> Result<HistogramModel, Self::Error>;

    /// Load a single FITS file, replacing the current image.
    fn open_single_fits_file(&mut self, path: &Path) -> Result<(), Self::Error>;
}
