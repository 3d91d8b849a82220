#![forbid(unsafe_code)]

//! Golden snapshots of histogram drawings.
//!
//! A drawing is reduced to its stable text form
//! ([`HistogramDrawing::to_text`]) and a `blake3:` checksum of that text.
//! Golden files live at `<base>/tests/golden/<name>.snap` and hold the text
//! verbatim, so a diff shows exactly which bar or marker moved.
//!
//! Set `BLESS=1` to rewrite golden files from the current output. A missing
//! golden file is recorded on first run.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rfits_widgets::HistogramDrawing;

/// Prefix on every checksum string.
pub const CHECKSUM_PREFIX: &str = "blake3:";

/// `blake3:` + hex digest of `text`.
pub fn text_checksum(text: &str) -> String {
    format!("{CHECKSUM_PREFIX}{}", blake3::hash(text.as_bytes()).to_hex())
}

/// Text form plus checksum of one drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawingSnapshot {
    pub text: String,
    pub checksum: String,
}

impl DrawingSnapshot {
    pub fn capture(drawing: &HistogramDrawing) -> Self {
        let text = drawing.to_text();
        let checksum = text_checksum(&text);
        Self { text, checksum }
    }

    /// The full drawing as a JSON object, for tooling outside Rust.
    pub fn drawing_json(drawing: &HistogramDrawing) -> serde_json::Result<String> {
        serde_json::to_string(drawing)
    }
}

/// What [`check_golden`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoldenOutcome {
    /// Output equals the golden file.
    Match,
    /// No golden file existed, or bless mode was on; the file was written.
    Recorded(PathBuf),
    /// Output differs from the golden file.
    Mismatch(SnapshotMismatch),
}

/// Details of a failed comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotMismatch {
    pub path: PathBuf,
    pub expected_checksum: String,
    pub actual_checksum: String,
    /// 1-based line of the first difference.
    pub first_diff_line: usize,
}

impl fmt::Display for SnapshotMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "snapshot {} differs at line {} (expected {}, got {}); rerun with BLESS=1 to accept",
            self.path.display(),
            self.first_diff_line,
            self.expected_checksum,
            self.actual_checksum
        )
    }
}

/// Path to the golden file for `name`.
pub fn golden_path(base_dir: &Path, name: &str) -> PathBuf {
    base_dir.join("tests").join("golden").join(format!("{name}.snap"))
}

/// Whether golden files should be overwritten.
pub fn is_bless_mode() -> bool {
    std::env::var("BLESS").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Compare `snapshot` against the golden file `name` under `base_dir`.
pub fn check_golden(
    base_dir: &Path,
    name: &str,
    snapshot: &DrawingSnapshot,
) -> io::Result<GoldenOutcome> {
    check_golden_with(base_dir, name, snapshot, is_bless_mode())
}

/// [`check_golden`] with bless mode passed explicitly.
pub fn check_golden_with(
    base_dir: &Path,
    name: &str,
    snapshot: &DrawingSnapshot,
    bless: bool,
) -> io::Result<GoldenOutcome> {
    let path = golden_path(base_dir, name);
    let expected = match fs::read_to_string(&path) {
        Ok(text) if !bless => text,
        Ok(_) => return record(path, snapshot),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return record(path, snapshot),
        Err(e) => return Err(e),
    };

    if expected == snapshot.text {
        return Ok(GoldenOutcome::Match);
    }

    let first_diff_line = expected
        .lines()
        .zip(snapshot.text.lines())
        .position(|(a, b)| a != b)
        .unwrap_or_else(|| expected.lines().count().min(snapshot.text.lines().count()))
        + 1;
    let mismatch = SnapshotMismatch {
        path,
        expected_checksum: text_checksum(&expected),
        actual_checksum: snapshot.checksum.clone(),
        first_diff_line,
    };
    tracing::warn!(%mismatch, "golden snapshot mismatch");
    Ok(GoldenOutcome::Mismatch(mismatch))
}

fn record(path: PathBuf, snapshot: &DrawingSnapshot) -> io::Result<GoldenOutcome> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, &snapshot.text)?;
    tracing::debug!(path = %path.display(), checksum = %snapshot.checksum, "recorded golden snapshot");
    Ok(GoldenOutcome::Recorded(path))
}
