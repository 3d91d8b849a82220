#![forbid(unsafe_code)]

//! A renderer double that records what it is sent.
//!
//! [`RecordingSink`] is cheap to clone; clones share one command log, so a
//! test can keep a handle while the sink itself moves into a dispatcher or
//! onto the render thread.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rfits_backend::{RenderCommand, RenderSink, StretchCommand, ViewCommand};

/// Error returned while the sink is set to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkRejected;

impl fmt::Display for SinkRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("renderer unavailable")
    }
}

impl std::error::Error for SinkRejected {}

#[derive(Debug, Default)]
struct Shared {
    log: Mutex<Vec<RenderCommand>>,
    failing: AtomicBool,
    rejected: Mutex<Vec<RenderCommand>>,
}

/// Records accepted commands in arrival order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    shared: Arc<Shared>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// While `true`, every update is rejected with [`SinkRejected`].
    pub fn set_failing(&self, failing: bool) {
        self.shared.failing.store(failing, Ordering::SeqCst);
    }

    pub fn is_failing(&self) -> bool {
        self.shared.failing.load(Ordering::SeqCst)
    }

    /// Accepted commands, oldest first.
    pub fn commands(&self) -> Vec<RenderCommand> {
        lock(&self.shared.log).clone()
    }

    /// Commands refused while failing.
    pub fn rejected(&self) -> Vec<RenderCommand> {
        lock(&self.shared.rejected).clone()
    }

    pub fn views(&self) -> Vec<ViewCommand> {
        lock(&self.shared.log)
            .iter()
            .filter_map(|c| match c {
                RenderCommand::View(v) => Some(*v),
                RenderCommand::Stretch(_) => None,
            })
            .collect()
    }

    pub fn stretches(&self) -> Vec<StretchCommand> {
        lock(&self.shared.log)
            .iter()
            .filter_map(|c| match c {
                RenderCommand::Stretch(s) => Some(*s),
                RenderCommand::View(_) => None,
            })
            .collect()
    }

    pub fn last_view(&self) -> Option<ViewCommand> {
        self.views().last().copied()
    }

    pub fn last_stretch(&self) -> Option<StretchCommand> {
        self.stretches().last().copied()
    }

    pub fn len(&self) -> usize {
        lock(&self.shared.log).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop everything recorded so far.
    pub fn clear(&self) {
        lock(&self.shared.log).clear();
        lock(&self.shared.rejected).clear();
    }

    /// Accepted commands as JSON lines, one per command.
    pub fn to_jsonl(&self) -> String {
        let mut out = String::new();
        for cmd in lock(&self.shared.log).iter() {
            match serde_json::to_string(cmd) {
                Ok(line) => {
                    out.push_str(&line);
                    out.push('\n');
                }
                Err(err) => tracing::warn!(error = %err, "unserializable render command"),
            }
        }
        out
    }

    fn accept(&self, cmd: RenderCommand) -> Result<(), SinkRejected> {
        if self.is_failing() {
            lock(&self.shared.rejected).push(cmd);
            return Err(SinkRejected);
        }
        lock(&self.shared.log).push(cmd);
        Ok(())
    }
}

impl RenderSink for RecordingSink {
    type Error = SinkRejected;

    fn update_view(&mut self, cmd: ViewCommand) -> Result<(), SinkRejected> {
        self.accept(cmd.into())
    }

    fn update_stretch(&mut self, cmd: StretchCommand) -> Result<(), SinkRejected> {
        self.accept(cmd.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rfits_core::stretch::StretchMode;

    #[test]
    fn clones_share_the_log() {
        let recorder = RecordingSink::new();
        let mut sink = recorder.clone();
        sink.update_stretch(StretchCommand::linear(1.0, 2.0)).unwrap();
        sink.update_view(ViewCommand {
            scale: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        })
        .unwrap();
        assert_eq!(recorder.len(), 2);
        assert_eq!(recorder.stretches(), vec![StretchCommand::linear(1.0, 2.0)]);
        assert_eq!(recorder.last_view().map(|v| v.scale), Some(1.0));
    }

    #[test]
    fn failing_sink_records_rejections() {
        let recorder = RecordingSink::new();
        let mut sink = recorder.clone();
        recorder.set_failing(true);
        assert_eq!(
            sink.update_stretch(StretchCommand::linear(0.0, 1.0)),
            Err(SinkRejected)
        );
        assert!(recorder.is_empty());
        assert_eq!(recorder.rejected().len(), 1);
        recorder.set_failing(false);
        assert!(sink.update_stretch(StretchCommand::linear(0.0, 1.0)).is_ok());
        assert_eq!(recorder.len(), 1);
    }

    #[test]
    fn jsonl_is_one_object_per_line() {
        let recorder = RecordingSink::new();
        let mut sink = recorder.clone();
        sink.update_stretch(StretchCommand {
            mode: StretchMode::Log,
            ..StretchCommand::linear(0.5, 9.0)
        })
        .unwrap();
        let text = recorder.to_jsonl();
        let value: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(value["type"], "stretch");
        assert_eq!(value["max"], 9.0);
        assert_eq!(value["mode"], "log");
    }
}
