#![forbid(unsafe_code)]

//! Dedicated render thread.
//!
//! [`RenderThread`] moves every [`RenderSink`] call onto one background thread
//! that owns the sink. The session thread never blocks on the renderer.
//!
//! # Coalescing Rules
//!
//! The thread blocks for one message, then drains whatever else is queued.
//! Within that batch only the latest command per [`Channel`] is delivered:
//! an older view is superseded by a newer one and cannot be observed after
//! it, so within-channel order holds.
//!
//! # Error Propagation
//!
//! Sink errors are logged on the render thread and reported back through a
//! bounded error channel; the thread keeps running. The caller polls
//! [`RenderThread::check_error`]. Errors that do not fit in the error
//! channel are dropped (they were already logged) and raise an overflow flag,
//! read with [`RenderThread::take_overflow`], so the caller knows its record
//! of what the renderer holds is stale.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::thread::{self, JoinHandle};

use rfits_backend::{Channel, RenderCommand, RenderSink};

use crate::config::DEFAULT_CHANNEL_CAPACITY;
use crate::dispatcher::{CommandDispatch, DispatchOutcome, DispatchStats, LastSent};

/// Capacity of the error back-channel.
const ERROR_CAPACITY: usize = 8;

/// Messages sent from the session thread to the render thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderMsg {
    Command(RenderCommand),
    Shutdown,
}

/// A sink failure observed on the render thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkFailure {
    pub channel: Channel,
    pub message: String,
}

pub struct RenderThread {
    sender: mpsc::SyncSender<RenderMsg>,
    handle: Option<JoinHandle<()>>,
    error_rx: mpsc::Receiver<SinkFailure>,
    overflowed: Arc<AtomicBool>,
}

impl std::fmt::Debug for RenderThread {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderThread")
            .field("running", &self.handle.is_some())
            .finish()
    }
}

impl RenderThread {
    /// Spawn with the default queue depth.
    pub fn start<K>(sink: K) -> io::Result<Self>
    where
        K: RenderSink + Send + 'static,
    {
        Self::with_capacity(sink, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Spawn with a queue of `capacity` messages (at least 1).
    pub fn with_capacity<K>(sink: K, capacity: usize) -> io::Result<Self>
    where
        K: RenderSink + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel::<RenderMsg>(capacity.max(1));
        let (err_tx, err_rx) = mpsc::sync_channel::<SinkFailure>(ERROR_CAPACITY);
        let overflowed = Arc::new(AtomicBool::new(false));
        let reporter = ErrorReporter {
            tx: err_tx,
            overflowed: Arc::clone(&overflowed),
        };

        let handle = thread::Builder::new()
            .name("rfits-render".into())
            .spawn(move || render_loop(sink, rx, reporter))?;

        Ok(Self {
            sender: tx,
            handle: Some(handle),
            error_rx: err_rx,
            overflowed,
        })
    }

    /// Queue a message, blocking while the queue is full.
    pub fn send(&self, msg: RenderMsg) -> Result<(), mpsc::SendError<RenderMsg>> {
        self.sender.send(msg)
    }

    /// Queue a message without blocking.
    pub fn try_send(&self, msg: RenderMsg) -> Result<(), mpsc::TrySendError<RenderMsg>> {
        self.sender.try_send(msg)
    }

    /// Oldest unreported sink failure, if any.
    pub fn check_error(&self) -> Option<SinkFailure> {
        self.error_rx.try_recv().ok()
    }

    /// Whether any failure was dropped because the error channel was full
    /// since the last call. Clears the flag.
    pub fn take_overflow(&self) -> bool {
        self.overflowed.swap(false, Ordering::AcqRel)
    }

    /// Deliver everything queued, then join the thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.sender.send(RenderMsg::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for RenderThread {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Latest pending command per channel.
#[derive(Default)]
struct Pending {
    slots: [Option<RenderCommand>; 2],
}

impl Pending {
    fn put(&mut self, cmd: RenderCommand) {
        self.slots[cmd.channel().index()] = Some(cmd);
    }

    fn take_all(&mut self) -> [Option<RenderCommand>; 2] {
        std::mem::take(&mut self.slots)
    }
}

/// Render-thread end of the error back-channel.
struct ErrorReporter {
    tx: mpsc::SyncSender<SinkFailure>,
    overflowed: Arc<AtomicBool>,
}

impl ErrorReporter {
    fn report(&self, failure: SinkFailure) {
        if let Err(mpsc::TrySendError::Full(_)) = self.tx.try_send(failure) {
            self.overflowed.store(true, Ordering::Release);
        }
    }
}

fn render_loop<K: RenderSink>(mut sink: K, rx: mpsc::Receiver<RenderMsg>, errors: ErrorReporter) {
    let mut pending = Pending::default();
    loop {
        let first = match rx.recv() {
            Ok(msg) => msg,
            Err(_) => return,
        };

        let mut shutdown = process_msg(first, &mut pending);
        while !shutdown {
            match rx.try_recv() {
                Ok(msg) => shutdown = process_msg(msg, &mut pending),
                Err(_) => break,
            }
        }

        for cmd in pending.take_all().into_iter().flatten() {
            if let Err(err) = cmd.send_to(&mut sink) {
                tracing::warn!(
                    target: "rfits.dispatch",
                    channel = cmd.channel().name(),
                    error = %err,
                    "render thread: renderer rejected command"
                );
                errors.report(SinkFailure {
                    channel: cmd.channel(),
                    message: err.to_string(),
                });
            }
        }

        if shutdown {
            return;
        }
    }
}

/// Fold one message into the batch. Returns `true` on shutdown.
fn process_msg(msg: RenderMsg, pending: &mut Pending) -> bool {
    match msg {
        RenderMsg::Command(cmd) => {
            pending.put(cmd);
            false
        }
        RenderMsg::Shutdown => true,
    }
}

/// [`CommandDispatch`] over a [`RenderThread`].
///
/// `Sent` means queued. A full queue drops the command and reports `Failed`.
/// Failures reported back by the thread forget that channel's last-sent
/// command before the next dispatch, so the renderer gets a fresh copy. If
/// failures were dropped on the way back, both channels are forgotten.
#[derive(Debug)]
pub struct ThreadedDispatcher {
    thread: RenderThread,
    last: LastSent,
    stats: DispatchStats,
    failures: Vec<SinkFailure>,
}

impl ThreadedDispatcher {
    /// Spawn a render thread owning `sink`.
    pub fn start<K>(sink: K, capacity: usize, dedupe: bool) -> io::Result<Self>
    where
        K: RenderSink + Send + 'static,
    {
        Ok(Self {
            thread: RenderThread::with_capacity(sink, capacity)?,
            last: LastSent::new(dedupe),
            stats: DispatchStats::default(),
            failures: Vec::new(),
        })
    }

    /// Sink failures reported by the render thread since the last call
    /// (the most recent few).
    pub fn take_failures(&mut self) -> Vec<SinkFailure> {
        self.poll_errors();
        std::mem::take(&mut self.failures)
    }

    /// Deliver everything queued and join the render thread.
    pub fn shutdown(self) {
        self.thread.shutdown();
    }

    fn poll_errors(&mut self) {
        if self.thread.take_overflow() {
            tracing::debug!(target: "rfits.dispatch", "sink failures dropped, forgetting last-sent commands");
            self.last.clear();
        }
        while let Some(failure) = self.thread.check_error() {
            self.last.forget(failure.channel);
            if self.failures.len() == ERROR_CAPACITY {
                self.failures.remove(0);
            }
            self.failures.push(failure);
        }
    }
}

impl CommandDispatch for ThreadedDispatcher {
    fn dispatch(&mut self, cmd: RenderCommand) -> DispatchOutcome {
        self.poll_errors();
        let outcome = if self.last.is_redundant(&cmd) {
            DispatchOutcome::Skipped
        } else {
            match self.thread.try_send(RenderMsg::Command(cmd)) {
                Ok(()) => {
                    self.last.sent(cmd);
                    DispatchOutcome::Sent
                }
                Err(err) => {
                    let reason = match err {
                        mpsc::TrySendError::Full(_) => "queue full",
                        mpsc::TrySendError::Disconnected(_) => "render thread gone",
                    };
                    self.last.forget(cmd.channel());
                    tracing::warn!(
                        target: "rfits.dispatch",
                        channel = cmd.channel().name(),
                        reason,
                        "dropped render command"
                    );
                    DispatchOutcome::Failed
                }
            }
        };
        self.stats.record(outcome);
        outcome
    }

    fn invalidate(&mut self) {
        self.last.clear();
    }

    fn stats(&self) -> DispatchStats {
        self.stats
    }
}
