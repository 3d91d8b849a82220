#![forbid(unsafe_code)]

//! Test support for RapidFits.
//!
//! - [`RecordingSink`] - renderer double that logs every command it accepts
//! - [`ScriptedSource`] - image loader double serving canned histograms
//! - [`fixtures`] - uniform, spike and flat histograms
//! - [`snapshot`] - golden text snapshots of histogram drawings with
//!   `blake3` checksums

pub mod fixtures;
pub mod recording;
pub mod scripted;
pub mod snapshot;

pub use recording::{RecordingSink, SinkRejected};
pub use scripted::{ScriptedSource, SourceError};
pub use snapshot::{DrawingSnapshot, GoldenOutcome, SnapshotMismatch};
