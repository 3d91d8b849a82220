#![forbid(unsafe_code)]

//! Coalescing of high-frequency viewport input.
//!
//! A fast drag or a spinning wheel can emit far more events than the renderer
//! needs. [`EventCoalescer`] folds them before they reach the
//! [`InteractionMachine`](crate::interaction::InteractionMachine):
//!
//! - Pointer moves: only the latest position is kept. Drag deltas are
//!   differences of consecutive positions, so the summed pan telescopes to
//!   the same value.
//! - Wheel notches in the same direction: counted into one [`WheelEvent`]
//!   with `notches = n`. The machine turns that into `factor^n`. Every step
//!   moves in the same direction, so the clamped zoom matches `n` single steps
//!   up to floating-point rounding (`powi` and repeated multiplication can
//!   differ in the last bits).
//! - Everything else (pointer down/up/leave, resize, non-finite moves) is not
//!   coalescable.
//!
//! # Ordering
//!
//! [`push`](EventCoalescer::push) does not flush on its own, matching the
//! usual "caller drives the flush" contract. [`feed`](EventCoalescer::feed)
//! wraps it with the ordering rule that keeps the final view state identical
//! to uncoalesced processing: pending events are flushed before any
//! non-coalescable event is emitted.
//!
//! ```
//! use rfits_core::event::Event;
//! use rfits_core::event_coalescer::EventCoalescer;
//!
//! let mut coalescer = EventCoalescer::new();
//! let mut out = Vec::new();
//! coalescer.feed(Event::moved(10.0, 10.0), &mut out);
//! coalescer.feed(Event::moved(20.0, 20.0), &mut out);
//! assert!(out.is_empty());
//!
//! coalescer.feed(Event::up(20.0, 20.0), &mut out);
//! assert_eq!(out, vec![Event::moved(20.0, 20.0), Event::up(20.0, 20.0)]);
//! ```

use crate::event::{Event, PointerEvent, PointerEventKind, WheelDirection, WheelEvent};

/// Folds pointer moves and same-direction wheel notches.
///
/// Holds at most one pending move and one pending wheel run. Not thread-safe;
/// use it from the thread that owns the viewer session.
#[derive(Debug, Clone, Default)]
pub struct EventCoalescer {
    pending_move: Option<PointerEvent>,
    pending_wheel: Option<WheelRun>,
}

#[derive(Debug, Clone, Copy)]
struct WheelRun {
    direction: WheelDirection,
    /// Latest raw delta, kept for its sign.
    delta_y: f64,
    notches: u32,
}

enum Pushed {
    Absorbed,
    Passthrough(Event),
    /// An older wheel run pushed out by a direction change.
    Displaced(Event),
}

impl WheelRun {
    fn to_event(self) -> Event {
        Event::Wheel(WheelEvent::new(self.delta_y).with_notches(self.notches))
    }
}

impl EventCoalescer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push one event.
    ///
    /// Returns `Some(event)` when something must be processed now, `None`
    /// when the input was absorbed into a pending run.
    ///
    /// - Finite pointer move: replaces the pending move.
    /// - Wheel, same direction as the pending run: adds its notches.
    /// - Wheel, other direction: returns the old run, starts a new one.
    /// - Anything else: returned as is, pending state untouched.
    pub fn push(&mut self, event: Event) -> Option<Event> {
        match self.absorb(event) {
            Pushed::Absorbed => None,
            Pushed::Passthrough(e) | Pushed::Displaced(e) => Some(e),
        }
    }

    /// Push with flush-before-passthrough ordering, appending to `out`.
    pub fn feed(&mut self, event: Event, out: &mut Vec<Event>) {
        match self.absorb(event) {
            Pushed::Absorbed => {}
            // The displaced run is older than any pending move.
            Pushed::Displaced(run) => out.push(run),
            Pushed::Passthrough(e) => {
                self.flush_each(|pending| out.push(pending));
                out.push(e);
            }
        }
    }

    fn absorb(&mut self, event: Event) -> Pushed {
        match event {
            Event::Pointer(pointer)
                if pointer.kind == PointerEventKind::Move
                    && pointer.x.is_finite()
                    && pointer.y.is_finite() =>
            {
                self.pending_move = Some(pointer);
                Pushed::Absorbed
            }
            Event::Wheel(wheel) => self.absorb_wheel(wheel, event),
            _ => Pushed::Passthrough(event),
        }
    }

    fn absorb_wheel(&mut self, wheel: WheelEvent, event: Event) -> Pushed {
        let Some(direction) = wheel.direction() else {
            return Pushed::Passthrough(event);
        };
        if wheel.notches == 0 {
            return Pushed::Passthrough(event);
        }

        match self.pending_wheel {
            Some(run) if run.direction == direction => {
                self.pending_wheel = Some(WheelRun {
                    delta_y: wheel.delta_y,
                    notches: run.notches.saturating_add(wheel.notches),
                    ..run
                });
                Pushed::Absorbed
            }
            previous => {
                self.pending_wheel = Some(WheelRun {
                    direction,
                    delta_y: wheel.delta_y,
                    notches: wheel.notches,
                });
                match previous {
                    Some(run) => Pushed::Displaced(run.to_event()),
                    None => Pushed::Absorbed,
                }
            }
        }
    }

    /// Take all pending events: wheel run first, then the latest move.
    #[must_use]
    pub fn flush(&mut self) -> Vec<Event> {
        let mut events = Vec::with_capacity(2);
        self.flush_each(|e| events.push(e));
        events
    }

    /// Like [`flush`](Self::flush) without allocating.
    pub fn flush_each<F>(&mut self, mut f: F)
    where
        F: FnMut(Event),
    {
        if let Some(run) = self.pending_wheel.take() {
            f(run.to_event());
        }
        if let Some(pointer) = self.pending_move.take() {
            f(Event::Pointer(pointer));
        }
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending_move.is_some() || self.pending_wheel.is_some()
    }

    /// Notches in the pending wheel run, 0 if none.
    #[must_use]
    pub fn pending_notches(&self) -> u32 {
        self.pending_wheel.map_or(0, |run| run.notches)
    }

    /// Drop pending input without emitting it.
    pub fn clear(&mut self) {
        self.pending_move = None;
        self.pending_wheel = None;
    }
}
