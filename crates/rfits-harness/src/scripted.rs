#![forbid(unsafe_code)]

//! An image-source double backed by a table of known files.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use rfits_backend::ImageSource;
use rfits_core::histogram::HistogramModel;

/// Failures a [`ScriptedSource`] can produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// `get_image_stats` before any image was opened.
    NoImage,
    /// The path is not in the script.
    NotFound(PathBuf),
    /// Failure injected with [`ScriptedSource::fail_next_stats`].
    Injected,
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoImage => f.write_str("no image loaded"),
            Self::NotFound(path) => write!(f, "cannot open {}", path.display()),
            Self::Injected => f.write_str("loader failure"),
        }
    }
}

impl std::error::Error for SourceError {}

/// Serves canned statistics for scripted file paths.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    files: HashMap<PathBuf, HistogramModel>,
    current: Option<HistogramModel>,
    opened: Vec<PathBuf>,
    stats_calls: usize,
    fail_stats: usize,
}

impl ScriptedSource {
    /// A source with nothing loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// A source that already has `histogram` loaded, as at startup.
    pub fn loaded(histogram: HistogramModel) -> Self {
        Self {
            current: Some(histogram),
            ..Self::default()
        }
    }

    /// Make `path` openable, yielding `histogram`.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, histogram: HistogramModel) -> Self {
        self.files.insert(path.into(), histogram);
        self
    }

    /// The next `n` calls to `get_image_stats` fail.
    pub fn fail_next_stats(&mut self, n: usize) {
        self.fail_stats = n;
    }

    /// Paths successfully opened, in order.
    pub fn opened(&self) -> &[PathBuf] {
        &self.opened
    }

    pub fn stats_calls(&self) -> usize {
        self.stats_calls
    }
}

impl ImageSource for ScriptedSource {
    type Error = SourceError;

    fn get_image_stats(&mut self) -> Result<HistogramModel, SourceError> {
        self.stats_calls += 1;
        if self.fail_stats > 0 {
            self.fail_stats -= 1;
            return Err(SourceError::Injected);
        }
        self.current.clone().ok_or(SourceError::NoImage)
    }

    fn open_single_fits_file(&mut self, path: &Path) -> Result<(), SourceError> {
        let histogram = self
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(path.to_path_buf()))?;
        self.current = Some(histogram);
        self.opened.push(path.to_path_buf());
        Ok(())
    }
}
