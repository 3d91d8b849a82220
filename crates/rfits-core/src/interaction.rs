#![forbid(unsafe_code)]

//! Pan/zoom interaction state machine.
//!
//! [`InteractionMachine`] turns raw viewport [`Event`]s into [`ViewDelta`]s.
//! It owns no view state itself; the caller applies each delta to its
//! [`ViewTransform`] and dispatches when the transform changed.
//!
//! # State Machine
//!
//! ```text
//!            pointer down
//!   Idle ─────────────────▶ Dragging(DragSession)
//!    ▲                          │  pointer move: Pan delta, session updated
//!    └──────────────────────────┘
//!        pointer up / leave
//! ```
//!
//! Wheel events produce a zoom delta in either state and never touch the drag
//! session.
//!
//! # Invariants
//!
//! 1. A [`DragSession`] exists only in the `Dragging` state.
//! 2. Pan deltas are normalized by the viewport size, so the same gesture pans
//!    the same fraction of the view at any window size.
//! 3. A zero or non-finite viewport dimension contributes no pan on that axis.
//! 4. A wheel event with `n` notches yields `factor^n`.
//!
//! # Failure Modes
//!
//! - Pointer-up without a prior pointer-down is ignored.
//! - A pointer-down while already dragging restarts the session at the new
//!   position (the previous up was lost).

use crate::event::{Event, PointerEvent, PointerEventKind, WheelDirection, WheelEvent};
use crate::view::ViewTransform;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pan multiplier applied to normalized drag distance.
pub const DEFAULT_DRAG_SENSITIVITY: f64 = 2.0;

/// Zoom factor per wheel notch towards the user.
pub const DEFAULT_WHEEL_ZOOM_IN: f64 = 1.1;

/// Zoom factor per wheel notch away from the user.
pub const DEFAULT_WHEEL_ZOOM_OUT: f64 = 0.9;

/// Tunables for drag and wheel handling.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InteractionConfig {
    /// Multiplier on the viewport-normalized drag distance (default: 2.0).
    pub drag_sensitivity: f64,
    /// Zoom factor for one notch with `delta_y < 0` (default: 1.1).
    pub wheel_zoom_in: f64,
    /// Zoom factor for one notch with `delta_y > 0` (default: 0.9).
    pub wheel_zoom_out: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_sensitivity: DEFAULT_DRAG_SENSITIVITY,
            wheel_zoom_in: DEFAULT_WHEEL_ZOOM_IN,
            wheel_zoom_out: DEFAULT_WHEEL_ZOOM_OUT,
        }
    }
}

impl InteractionConfig {
    /// Problems with this config, empty when usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !self.drag_sensitivity.is_finite() {
            errors.push(format!(
                "interaction.drag_sensitivity must be finite, got {}",
                self.drag_sensitivity
            ));
        }
        if !(self.wheel_zoom_in.is_finite() && self.wheel_zoom_in > 1.0) {
            errors.push(format!(
                "interaction.wheel_zoom_in must be > 1, got {}",
                self.wheel_zoom_in
            ));
        }
        if !(self.wheel_zoom_out > 0.0 && self.wheel_zoom_out < 1.0) {
            errors.push(format!(
                "interaction.wheel_zoom_out must be in (0, 1), got {}",
                self.wheel_zoom_out
            ));
        }
        errors
    }
}

/// Viewport size used to normalize drag distances.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Normalize a pixel distance along one axis; `0.0` if the axis is unusable.
    fn normalize(distance: f64, extent: f64) -> f64 {
        if extent.is_finite() && extent > 0.0 && distance.is_finite() {
            distance / extent
        } else {
            0.0
        }
    }
}

/// Last pointer position of an active drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub last_x: f64,
    pub last_y: f64,
}

/// Interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// A change to apply to the [`ViewTransform`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewDelta {
    /// Normalized pan offset.
    Pan { dx: f64, dy: f64 },
    /// Multiplicative zoom factor.
    Zoom { factor: f64 },
}

impl ViewDelta {
    /// Apply to `view`. Returns `true` if the view changed.
    pub fn apply(&self, view: &mut ViewTransform) -> bool {
        match *self {
            Self::Pan { dx, dy } => view.apply_pan_delta(dx, dy),
            Self::Zoom { factor } => view.apply_zoom_delta(factor),
        }
    }
}

/// Drag-to-pan and wheel-to-zoom state machine.
#[derive(Debug, Clone, Default)]
pub struct InteractionMachine {
    config: InteractionConfig,
    viewport: Viewport,
    state: InteractionState,
}

impl InteractionMachine {
    /// A machine in `Idle`. Pan stays suppressed until the viewport has a size.
    #[must_use]
    pub fn new(config: InteractionConfig, viewport: Viewport) -> Self {
        Self {
            config,
            viewport,
            state: InteractionState::Idle,
        }
    }

    /// Process one event, returning the view change it implies (if any).
    pub fn process(&mut self, event: &Event) -> Option<ViewDelta> {
        match event {
            Event::Pointer(pointer) => self.on_pointer(pointer),
            Event::Wheel(wheel) => self.on_wheel(wheel),
            Event::Resize { width, height } => {
                self.viewport = Viewport::new(*width, *height);
                crate::trace!(
                    target: "rfits.interaction",
                    width = *width,
                    height = *height,
                    "viewport resized"
                );
                None
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> InteractionState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, InteractionState::Dragging(_))
    }

    #[inline]
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: InteractionConfig) {
        self.config = config;
    }

    /// Drop any active drag.
    pub fn reset(&mut self) {
        self.state = InteractionState::Idle;
    }
}

impl InteractionMachine {
    fn on_pointer(&mut self, pointer: &PointerEvent) -> Option<ViewDelta> {
        match pointer.kind {
            PointerEventKind::Down(_) => {
                if !pointer.x.is_finite() || !pointer.y.is_finite() {
                    return None;
                }
                self.state = InteractionState::Dragging(DragSession {
                    last_x: pointer.x,
                    last_y: pointer.y,
                });
                crate::trace!(target: "rfits.interaction", x = pointer.x, y = pointer.y, "drag start");
                None
            }
            PointerEventKind::Move => self.on_move(pointer.x, pointer.y),
            PointerEventKind::Up(_) | PointerEventKind::Leave => {
                if self.is_dragging() {
                    crate::trace!(target: "rfits.interaction", "drag end");
                }
                self.state = InteractionState::Idle;
                None
            }
        }
    }

    fn on_move(&mut self, x: f64, y: f64) -> Option<ViewDelta> {
        let InteractionState::Dragging(session) = &mut self.state else {
            return None;
        };
        if !x.is_finite() || !y.is_finite() {
            return None;
        }

        let sensitivity = self.config.drag_sensitivity;
        let dx = Viewport::normalize(x - session.last_x, self.viewport.width) * sensitivity;
        let dy = Viewport::normalize(y - session.last_y, self.viewport.height) * sensitivity;
        session.last_x = x;
        session.last_y = y;

        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        Some(ViewDelta::Pan { dx, dy })
    }

    fn on_wheel(&mut self, wheel: &WheelEvent) -> Option<ViewDelta> {
        if wheel.notches == 0 {
            return None;
        }
        let base = match wheel.direction()? {
            WheelDirection::Up => self.config.wheel_zoom_in,
            WheelDirection::Down => self.config.wheel_zoom_out,
        };
        let notches = i32::try_from(wheel.notches).unwrap_or(i32::MAX);
        // Long runs overflow to inf or underflow to 0; saturate so the view
        // still clamps to its zoom bound.
        let factor = base.powi(notches).clamp(f64::MIN_POSITIVE, f64::MAX);
        Some(ViewDelta::Zoom { factor })
    }
}
