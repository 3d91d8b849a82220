#![forbid(unsafe_code)]

//! Canonical input event types for the image viewport.
//!
//! Events arrive from whatever windowing layer hosts the viewer and are fed to
//! the [`InteractionMachine`](crate::interaction::InteractionMachine).
//!
//! # Design Notes
//!
//! - Pointer coordinates are in viewport pixels, origin at the top-left.
//! - Only the sign of [`WheelEvent::delta_y`] matters; magnitudes differ too
//!   much between devices to be useful.
//! - A wheel event carries a notch count so the coalescer can fold a burst of
//!   same-direction notches into one event.

/// Canonical viewport input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// A pointer (mouse, pen, touch) event.
    Pointer(PointerEvent),

    /// A wheel event.
    Wheel(WheelEvent),

    /// The viewport was resized.
    Resize {
        /// New viewport width in pixels.
        width: f64,
        /// New viewport height in pixels.
        height: f64,
    },
}

impl Event {
    /// Pointer-down at `(x, y)` with the primary button.
    #[must_use]
    pub const fn down(x: f64, y: f64) -> Self {
        Self::Pointer(PointerEvent::new(
            PointerEventKind::Down(PointerButton::Primary),
            x,
            y,
        ))
    }

    /// Pointer-move to `(x, y)`.
    #[must_use]
    pub const fn moved(x: f64, y: f64) -> Self {
        Self::Pointer(PointerEvent::new(PointerEventKind::Move, x, y))
    }

    /// Pointer-up at `(x, y)` with the primary button.
    #[must_use]
    pub const fn up(x: f64, y: f64) -> Self {
        Self::Pointer(PointerEvent::new(
            PointerEventKind::Up(PointerButton::Primary),
            x,
            y,
        ))
    }

    /// Pointer left the viewport at `(x, y)`.
    #[must_use]
    pub const fn leave(x: f64, y: f64) -> Self {
        Self::Pointer(PointerEvent::new(PointerEventKind::Leave, x, y))
    }

    /// A single wheel notch.
    #[must_use]
    pub const fn wheel(delta_y: f64) -> Self {
        Self::Wheel(WheelEvent::new(delta_y))
    }

    /// Viewport resize.
    #[must_use]
    pub const fn resize(width: f64, height: f64) -> Self {
        Self::Resize { width, height }
    }
}

/// A pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    /// X coordinate in viewport pixels.
    pub x: f64,
    /// Y coordinate in viewport pixels.
    pub y: f64,
}

impl PointerEvent {
    #[must_use]
    pub const fn new(kind: PointerEventKind, x: f64, y: f64) -> Self {
        Self { kind, x, y }
    }

    /// Position as a tuple.
    #[must_use]
    pub const fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

/// The type of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// Button pressed inside the viewport.
    Down(PointerButton),

    /// Pointer moved, with or without a button held.
    Move,

    /// Button released.
    Up(PointerButton),

    /// Pointer left the viewport.
    Leave,
}

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// A vertical wheel event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    /// Raw wheel delta. Positive scrolls down (zoom out).
    pub delta_y: f64,
    /// Number of same-direction notches folded into this event (at least 1).
    pub notches: u32,
}

impl WheelEvent {
    /// One notch with the given delta.
    #[must_use]
    pub const fn new(delta_y: f64) -> Self {
        Self {
            delta_y,
            notches: 1,
        }
    }

    /// Same direction, `notches` notches.
    #[must_use]
    pub const fn with_notches(mut self, notches: u32) -> Self {
        self.notches = notches;
        self
    }

    /// Scroll direction, or `None` for a zero or NaN delta.
    #[must_use]
    pub fn direction(&self) -> Option<WheelDirection> {
        if self.delta_y > 0.0 {
            Some(WheelDirection::Down)
        } else if self.delta_y < 0.0 {
            Some(WheelDirection::Up)
        } else {
            None
        }
    }
}

/// Wheel scroll direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WheelDirection {
    /// Towards the user (`delta_y < 0`), zooms in.
    Up,
    /// Away from the user (`delta_y > 0`), zooms out.
    Down,
}
