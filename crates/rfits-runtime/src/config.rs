#![forbid(unsafe_code)]

//! Viewer configuration.
//!
//! Gathers every tunable of the control core into one [`ViewerConfig`] that
//! can be loaded from TOML or JSON at startup (feature `config`).
//!
//! # Loading
//!
//! ```toml
//! # rfits.toml
//! [zoom]
//! max_percent = 800.0
//!
//! [stretch]
//! low_percentile = 0.01
//! high_percentile = 0.99
//!
//! [dispatch]
//! coalesce_input = true
//! ```
//!
//! ```rust,ignore
//! let config = ViewerConfig::from_toml_file("rfits.toml")?;
//! let config = ViewerConfig::from_json_str(json)?;
//! ```
//!
//! Missing sections and fields fall back to defaults. Loaded configs are
//! validated; a config with problems is rejected with
//! [`ConfigError::Validation`].
//!
//! # Defaults
//!
//! `ViewerConfig::default()` reproduces the built-in constants: zoom
//! 10..=500 % (reset to 100 %), drag sensitivity 2.0, wheel factors 1.1/0.9,
//! 0.5 %/99.5 % stretch percentiles, redundancy suppression on, no input
//! coalescing.

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use rfits_core::interaction::InteractionConfig;
use rfits_core::stretch::{AutoStretchConfig, DEFAULT_SLIDER_STEPS};
use rfits_core::view::ZoomRange;

use crate::error::ConfigError;

/// Queue depth between the session and the render thread.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ViewerConfig {
    /// Zoom bounds and reset level.
    pub zoom: ZoomRange,

    /// Drag and wheel tunables.
    pub interaction: InteractionConfig,

    /// Auto-stretch clipping percentiles.
    pub stretch: AutoStretchConfig,

    /// Render command delivery.
    pub dispatch: DispatchConfig,
}

/// How render commands are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct DispatchConfig {
    /// Skip commands identical to the last one delivered on the same channel.
    pub dedupe: bool,
    /// Fold pointer moves and wheel notches in [`handle_batch`](crate::session::ViewerSession::handle_batch).
    pub coalesce_input: bool,
    /// Render thread queue depth.
    pub channel_capacity: usize,
    /// Stretch slider positions across the histogram range.
    pub slider_steps: u32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            dedupe: true,
            coalesce_input: false,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            slider_steps: DEFAULT_SLIDER_STEPS,
        }
    }
}

impl ViewerConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validated()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validated()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Serialize to pretty TOML.
    #[cfg(feature = "config")]
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Validate all parameters.
    ///
    /// Returns a list of problems; empty means the config is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.zoom.validate();
        errors.extend(self.interaction.validate());
        errors.extend(self.stretch.validate());

        if self.dispatch.channel_capacity == 0 {
            errors.push("dispatch.channel_capacity must be > 0".into());
        }
        if self.dispatch.slider_steps == 0 {
            errors.push("dispatch.slider_steps must be > 0".into());
        }
        errors
    }

    /// `self` if valid, otherwise every problem found.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}
