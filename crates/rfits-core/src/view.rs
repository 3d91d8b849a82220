#![forbid(unsafe_code)]

//! Pan/zoom state of the image viewport.
//!
//! [`ViewTransform`] is a plain value: mutators update the struct and report
//! whether anything changed, and never talk to the renderer. The caller
//! decides when to dispatch.
//!
//! # Invariants
//!
//! 1. `zoom_percent` lies inside the configured [`ZoomRange`] after every
//!    mutation.
//! 2. Pan is unbounded (the canvas is treated as infinite).
//! 3. Non-finite inputs leave the transform untouched.
//!
//! Deserialized transforms go through [`ViewTransform::from_parts`], so a
//! stored view cannot bypass the zoom clamp.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest allowed zoom, in percent.
pub const MIN_ZOOM_PERCENT: f64 = 10.0;

/// Highest allowed zoom, in percent.
pub const MAX_ZOOM_PERCENT: f64 = 500.0;

/// Zoom after a reset, in percent.
pub const DEFAULT_ZOOM_PERCENT: f64 = 100.0;

/// Bounds and reset value for the zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ZoomRange {
    pub min_percent: f64,
    pub max_percent: f64,
    pub default_percent: f64,
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self {
            min_percent: MIN_ZOOM_PERCENT,
            max_percent: MAX_ZOOM_PERCENT,
            default_percent: DEFAULT_ZOOM_PERCENT,
        }
    }
}

impl ZoomRange {
    /// Clamp a zoom value into the range. An unvalidated range with
    /// `min > max` yields `max`.
    #[inline]
    #[must_use]
    pub fn clamp(&self, percent: f64) -> f64 {
        percent.max(self.min_percent).min(self.max_percent)
    }

    /// Problems with this range, empty when usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !(self.min_percent.is_finite() && self.min_percent > 0.0) {
            errors.push(format!(
                "zoom.min_percent must be finite and > 0, got {}",
                self.min_percent
            ));
        }
        if !(self.max_percent.is_finite() && self.max_percent >= self.min_percent) {
            errors.push(format!(
                "zoom.max_percent must be finite and >= min_percent, got {}",
                self.max_percent
            ));
        }
        if !(self.default_percent >= self.min_percent && self.default_percent <= self.max_percent)
        {
            errors.push(format!(
                "zoom.default_percent must lie in [min_percent, max_percent], got {}",
                self.default_percent
            ));
        }
        errors
    }
}

/// Rejected input to [`ViewTransform::from_parts`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewError {
    #[error("invalid zoom range: {}", .0.join("; "))]
    InvalidRange(Vec<String>),

    #[error("view field `{field}` is not finite: {value}")]
    NonFinite { field: &'static str, value: f64 },
}

/// Current zoom and pan of the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "RawView", into = "RawView")
)]
pub struct ViewTransform {
    zoom_percent: f64,
    pan_x: f64,
    pan_y: f64,
    range: ZoomRange,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(ZoomRange::default())
    }
}

impl ViewTransform {
    /// A transform at the range's default zoom with no pan.
    #[must_use]
    pub fn new(range: ZoomRange) -> Self {
        Self {
            zoom_percent: range.clamp(range.default_percent),
            pan_x: 0.0,
            pan_y: 0.0,
            range,
        }
    }

    /// Rebuild a stored transform. The zoom is clamped into `range`; an
    /// invalid range or a non-finite value is an error.
    pub fn from_parts(
        range: ZoomRange,
        zoom_percent: f64,
        pan_x: f64,
        pan_y: f64,
    ) -> Result<Self, ViewError> {
        let problems = range.validate();
        if !problems.is_empty() {
            return Err(ViewError::InvalidRange(problems));
        }
        let fields = [("zoom_percent", zoom_percent), ("pan_x", pan_x), ("pan_y", pan_y)];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ViewError::NonFinite { field, value });
            }
        }
        Ok(Self {
            zoom_percent: range.clamp(zoom_percent),
            pan_x,
            pan_y,
            range,
        })
    }

    #[inline]
    #[must_use]
    pub fn zoom_percent(&self) -> f64 {
        self.zoom_percent
    }

    /// Zoom as a multiplier (`zoom_percent / 100`).
    #[inline]
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.zoom_percent / 100.0
    }

    #[inline]
    #[must_use]
    pub fn pan(&self) -> (f64, f64) {
        (self.pan_x, self.pan_y)
    }

    #[inline]
    #[must_use]
    pub fn zoom_range(&self) -> ZoomRange {
        self.range
    }

    /// Multiply the zoom by `factor`, then clamp. A product that overflows
    /// lands on the upper bound.
    ///
    /// Returns `true` if the zoom changed.
    pub fn apply_zoom_delta(&mut self, factor: f64) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        self.set_zoom_percent((self.zoom_percent * factor).min(f64::MAX))
    }

    /// Set the zoom directly (zoom slider), clamped into range.
    ///
    /// Returns `true` if the zoom changed.
    pub fn set_zoom_percent(&mut self, percent: f64) -> bool {
        if !percent.is_finite() {
            return false;
        }
        let next = self.range.clamp(percent);
        let changed = next != self.zoom_percent;
        self.zoom_percent = next;
        changed
    }

    /// Add to the pan accumulators. No clamping.
    ///
    /// Returns `true` if the pan changed. A delta lost to rounding, or one
    /// that would overflow, changes nothing.
    pub fn apply_pan_delta(&mut self, dx: f64, dy: f64) -> bool {
        if !dx.is_finite() || !dy.is_finite() {
            return false;
        }
        let (x, y) = (self.pan_x + dx, self.pan_y + dy);
        if !x.is_finite() || !y.is_finite() || (x == self.pan_x && y == self.pan_y) {
            return false;
        }
        self.pan_x = x;
        self.pan_y = y;
        true
    }

    /// Back to default zoom and zero pan.
    ///
    /// Returns `true` if anything changed.
    pub fn reset(&mut self) -> bool {
        let fresh = Self::new(self.range);
        let changed = *self != fresh;
        *self = fresh;
        changed
    }

    /// Whether the transform equals a fresh reset.
    #[must_use]
    pub fn is_reset(&self) -> bool {
        *self == Self::new(self.range)
    }
}

#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct RawView {
    zoom_percent: f64,
    pan_x: f64,
    pan_y: f64,
    #[serde(default)]
    range: ZoomRange,
}

#[cfg(feature = "serde")]
impl TryFrom<RawView> for ViewTransform {
    type Error = ViewError;

    fn try_from(raw: RawView) -> Result<Self, Self::Error> {
        Self::from_parts(raw.range, raw.zoom_percent, raw.pan_x, raw.pan_y)
    }
}

#[cfg(feature = "serde")]
impl From<ViewTransform> for RawView {
    fn from(view: ViewTransform) -> Self {
        Self {
            zoom_percent: view.zoom_percent,
            pan_x: view.pan_x,
            pan_y: view.pan_y,
            range: view.range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn default_is_one_hundred_percent() {
        let v = ViewTransform::default();
        assert_eq!(v.zoom_percent(), 100.0);
        assert_eq!(v.scale(), 1.0);
        assert_eq!(v.pan(), (0.0, 0.0));
        assert!(v.is_reset());
    }

    #[test]
    fn three_zoom_out_steps() {
        let mut v = ViewTransform::default();
        for _ in 0..3 {
            assert!(v.apply_zoom_delta(0.9));
        }
        assert_close(v.zoom_percent(), 72.9);
    }

    #[test]
    fn zoom_clamps_at_both_ends() {
        let mut v = ViewTransform::default();
        for _ in 0..100 {
            v.apply_zoom_delta(1.1);
        }
        assert_eq!(v.zoom_percent(), MAX_ZOOM_PERCENT);
        assert!(!v.apply_zoom_delta(1.1));

        for _ in 0..100 {
            v.apply_zoom_delta(0.9);
        }
        assert_eq!(v.zoom_percent(), MIN_ZOOM_PERCENT);
        assert!(!v.apply_zoom_delta(0.9));
    }

    #[test]
    fn invalid_zoom_factor_ignored() {
        let mut v = ViewTransform::default();
        assert!(!v.apply_zoom_delta(f64::NAN));
        assert!(!v.apply_zoom_delta(f64::INFINITY));
        assert!(!v.apply_zoom_delta(0.0));
        assert!(!v.apply_zoom_delta(-2.0));
        assert_eq!(v.zoom_percent(), 100.0);
    }

    #[test]
    fn extreme_factors_clamp_instead_of_vanishing() {
        let mut v = ViewTransform::default();
        assert!(v.apply_zoom_delta(f64::MAX));
        assert_eq!(v.zoom_percent(), MAX_ZOOM_PERCENT);
        assert!(v.apply_zoom_delta(f64::MIN_POSITIVE));
        assert_eq!(v.zoom_percent(), MIN_ZOOM_PERCENT);
    }

    #[test]
    fn slider_zoom_is_clamped() {
        let mut v = ViewTransform::default();
        assert!(v.set_zoom_percent(750.0));
        assert_eq!(v.zoom_percent(), 500.0);
        assert!(v.set_zoom_percent(1.0));
        assert_eq!(v.zoom_percent(), 10.0);
        assert!(!v.set_zoom_percent(f64::NAN));
    }

    #[test]
    fn pan_is_unbounded() {
        let mut v = ViewTransform::default();
        assert!(v.apply_pan_delta(1e6, -1e6));
        assert_eq!(v.pan(), (1e6, -1e6));
        assert!(!v.apply_pan_delta(0.0, 0.0));
        assert!(!v.apply_pan_delta(f64::NAN, 1.0));
        assert!(!v.apply_pan_delta(1e-12, 0.0));
        assert_eq!(v.pan(), (1e6, -1e6));

        let mut far = ViewTransform::default();
        assert!(far.apply_pan_delta(f64::MAX, 0.0));
        assert!(!far.apply_pan_delta(f64::MAX, 0.0));
        assert_eq!(far.pan(), (f64::MAX, 0.0));
    }

    #[test]
    fn reset_restores_defaults() {
        let mut v = ViewTransform::default();
        v.apply_zoom_delta(3.0);
        v.apply_pan_delta(0.5, -0.25);
        assert!(v.reset());
        assert_eq!(v.zoom_percent(), 100.0);
        assert_eq!(v.pan(), (0.0, 0.0));
        assert!(!v.reset());
    }

    #[test]
    fn custom_range_respected() {
        let range = ZoomRange {
            min_percent: 50.0,
            max_percent: 200.0,
            default_percent: 75.0,
        };
        let mut v = ViewTransform::new(range);
        assert_eq!(v.zoom_percent(), 75.0);
        v.apply_zoom_delta(10.0);
        assert_eq!(v.zoom_percent(), 200.0);
        v.reset();
        assert_eq!(v.zoom_percent(), 75.0);
    }

    #[test]
    fn from_parts_clamps_and_validates() {
        let v = ViewTransform::from_parts(ZoomRange::default(), 9000.0, 0.5, -0.5).unwrap();
        assert_eq!(v.zoom_percent(), MAX_ZOOM_PERCENT);
        assert_eq!(v.pan(), (0.5, -0.5));

        let bad_range = ZoomRange {
            min_percent: 200.0,
            max_percent: 100.0,
            default_percent: 150.0,
        };
        assert!(matches!(
            ViewTransform::from_parts(bad_range, 150.0, 0.0, 0.0),
            Err(ViewError::InvalidRange(_))
        ));
        let err = ViewTransform::from_parts(ZoomRange::default(), 100.0, f64::NAN, 0.0).unwrap_err();
        assert_eq!(err.to_string(), "view field `pan_x` is not finite: NaN");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialized_zoom_is_clamped() {
        let v: ViewTransform =
            serde_json::from_str(r#"{"zoom_percent": 1e6, "pan_x": 0.25, "pan_y": 0.0}"#).unwrap();
        assert_eq!(v.zoom_percent(), MAX_ZOOM_PERCENT);
        assert_eq!(v.zoom_range(), ZoomRange::default());

        let custom = ViewTransform::new(ZoomRange {
            min_percent: 50.0,
            max_percent: 200.0,
            default_percent: 75.0,
        });
        let json = serde_json::to_string(&custom).unwrap();
        let back: ViewTransform = serde_json::from_str(&json).unwrap();
        assert_eq!(back, custom);

        let inverted = r#"{"zoom_percent": 100.0, "pan_x": 0.0, "pan_y": 0.0,
            "range": {"min_percent": 300.0, "max_percent": 100.0}}"#;
        assert!(serde_json::from_str::<ViewTransform>(inverted).is_err());
    }

    #[test]
    fn zoom_range_validation() {
        assert!(ZoomRange::default().validate().is_empty());
        let bad = ZoomRange {
            min_percent: 0.0,
            max_percent: -1.0,
            default_percent: 100.0,
        };
        assert_eq!(bad.validate().len(), 3);
    }
}
