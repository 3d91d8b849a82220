#![forbid(unsafe_code)]

//! Render command dispatch.
//!
//! A [`CommandDispatch`] pushes view and stretch state to the renderer. It is
//! fire-and-forget: a failed delivery is logged and reported as
//! [`DispatchOutcome::Failed`], never raised to the user. The renderer keeps
//! whatever it last accepted.
//!
//! # Redundancy suppression
//!
//! With dedupe enabled, a command equal to the last one *successfully* sent on
//! the same [`Channel`] is skipped. A failure forgets that channel's last
//! command, and [`CommandDispatch::invalidate`] forgets both, so the next
//! command after either is always sent.
//!
//! # Ordering
//!
//! Commands on one channel are delivered in emission order. Nothing is
//! promised between the view and stretch channels.

use rfits_backend::{Channel, RenderCommand, RenderSink, StretchCommand};
use rfits_core::stretch::{StretchMode, StretchRange};
use rfits_core::view::ViewTransform;

/// Result of one dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Handed to the renderer (or its queue).
    Sent,
    /// Identical to the last delivered command; not sent.
    Skipped,
    /// Delivery failed; logged, renderer keeps its previous state.
    Failed,
}

/// Running counters for a dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub sent: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl DispatchStats {
    pub(crate) fn record(&mut self, outcome: DispatchOutcome) {
        match outcome {
            DispatchOutcome::Sent => self.sent += 1,
            DispatchOutcome::Skipped => self.skipped += 1,
            DispatchOutcome::Failed => self.failed += 1,
        }
    }
}

/// Sends render commands somewhere.
pub trait CommandDispatch {
    /// Deliver one command, honoring redundancy suppression.
    fn dispatch(&mut self, cmd: RenderCommand) -> DispatchOutcome;

    /// Forget the last-sent commands so the next ones go out unconditionally.
    fn invalidate(&mut self);

    /// Counters since construction.
    fn stats(&self) -> DispatchStats;

    /// Send `{scale, pan_x, pan_y}` for the view.
    fn push_view(&mut self, view: &ViewTransform) -> DispatchOutcome {
        self.dispatch(RenderCommand::View(view.into()))
    }

    /// Send `{min, max, mode}` for the stretch range and transfer curve.
    fn push_stretch(&mut self, range: StretchRange, mode: StretchMode) -> DispatchOutcome {
        self.dispatch(RenderCommand::Stretch(StretchCommand::new(range, mode)))
    }
}

/// Last successfully sent command per channel.
#[derive(Debug, Clone, Default)]
pub(crate) struct LastSent {
    enabled: bool,
    slots: [Option<RenderCommand>; 2],
}

impl LastSent {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            slots: [None; 2],
        }
    }

    pub(crate) fn is_redundant(&self, cmd: &RenderCommand) -> bool {
        self.enabled && self.slots[cmd.channel().index()].as_ref() == Some(cmd)
    }

    pub(crate) fn sent(&mut self, cmd: RenderCommand) {
        self.slots[cmd.channel().index()] = Some(cmd);
    }

    pub(crate) fn forget(&mut self, channel: Channel) {
        self.slots[channel.index()] = None;
    }

    pub(crate) fn clear(&mut self) {
        self.slots = [None; 2];
    }
}

/// Synchronous dispatcher that calls the sink on the caller's thread.
#[derive(Debug)]
pub struct RenderDispatcher<K> {
    sink: K,
    last: LastSent,
    stats: DispatchStats,
}

impl<K: RenderSink> RenderDispatcher<K> {
    /// Dispatcher with redundancy suppression on.
    pub fn new(sink: K) -> Self {
        Self::with_dedupe(sink, true)
    }

    pub fn with_dedupe(sink: K, dedupe: bool) -> Self {
        Self {
            sink,
            last: LastSent::new(dedupe),
            stats: DispatchStats::default(),
        }
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    pub fn into_sink(self) -> K {
        self.sink
    }

    fn deliver(&mut self, cmd: RenderCommand) -> DispatchOutcome {
        if self.last.is_redundant(&cmd) {
            tracing::trace!(target: "rfits.dispatch", channel = cmd.channel().name(), "skipped redundant command");
            return DispatchOutcome::Skipped;
        }
        match cmd.send_to(&mut self.sink) {
            Ok(()) => {
                self.last.sent(cmd);
                DispatchOutcome::Sent
            }
            Err(err) => {
                self.last.forget(cmd.channel());
                tracing::warn!(
                    target: "rfits.dispatch",
                    channel = cmd.channel().name(),
                    error = %err,
                    "renderer rejected command"
                );
                DispatchOutcome::Failed
            }
        }
    }
}

impl<K: RenderSink> CommandDispatch for RenderDispatcher<K> {
    fn dispatch(&mut self, cmd: RenderCommand) -> DispatchOutcome {
        let span = match cmd.channel() {
            Channel::View => tracing::debug_span!("dispatch.view"),
            Channel::Stretch => tracing::debug_span!("dispatch.stretch"),
        };
        let _guard = span.enter();
        let outcome = self.deliver(cmd);
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

impl<D: CommandDispatch + ?Sized> CommandDispatch for Box<D> {
    fn dispatch(&mut self, cmd: RenderCommand) -> DispatchOutcome {
        (**self).dispatch(cmd)
    }

    fn invalidate(&mut self) {
        (**self).invalidate();
    }

    fn stats(&self) -> DispatchStats {
        (**self).stats()
    }
}
