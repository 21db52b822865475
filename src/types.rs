//! Core data types for gaze mapping

use crate::error::GazeError;
use serde::{Deserialize, Serialize};

/// Which screen axis a raw coordinate belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Horizontal => f.write_str("horizontal"),
            Axis::Vertical => f.write_str("vertical"),
        }
    }
}

/// A screen edge used as a calibration extreme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Left,
    Right,
    Bottom,
}

impl Edge {
    /// Calibration order: every target on one edge before moving to the next.
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Left, Edge::Right, Edge::Bottom];

    /// The raw pupil axis sampled while looking at this edge
    pub fn axis(self) -> Axis {
        match self {
            Edge::Top | Edge::Bottom => Axis::Vertical,
            Edge::Left | Edge::Right => Axis::Horizontal,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Edge::Top => "top",
            Edge::Left => "left",
            Edge::Right => "right",
            Edge::Bottom => "bottom",
        }
    }
}

/// Raw pupil-coordinate extremes observed at the four screen edges.
///
/// Pupil coordinates follow the camera's view of the face, so looking left
/// *increases* the horizontal value: a calibrated store has `left > right`
/// and `bottom > top`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationData {
    pub top: f64,
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
}

impl CalibrationData {
    pub fn new(top: f64, left: f64, right: f64, bottom: f64) -> Self {
        Self { top, left, right, bottom }
    }

    pub fn field(&self, edge: Edge) -> f64 {
        match edge {
            Edge::Top => self.top,
            Edge::Left => self.left,
            Edge::Right => self.right,
            Edge::Bottom => self.bottom,
        }
    }

    fn field_mut(&mut self, edge: Edge) -> &mut f64 {
        match edge {
            Edge::Top => &mut self.top,
            Edge::Left => &mut self.left,
            Edge::Right => &mut self.right,
            Edge::Bottom => &mut self.bottom,
        }
    }

    /// Add `amount` to the field for `edge`, returning the new value
    pub fn accumulate(&mut self, edge: Edge, amount: f64) -> f64 {
        let field = self.field_mut(edge);
        *field += amount;
        *field
    }

    /// Calibration span of the horizontal axis (`left - right`)
    pub fn horizontal_span(&self) -> f64 {
        self.left - self.right
    }

    /// Calibration span of the vertical axis (`bottom - top`)
    pub fn vertical_span(&self) -> f64 {
        self.bottom - self.top
    }

    /// Check that both axes can be normalized.
    ///
    /// A span that is zero, negative or not finite would make the mapper
    /// divide by zero or fold the screen over itself.
    pub fn validate(&self) -> Result<(), GazeError> {
        for (axis, span) in [
            (Axis::Horizontal, self.horizontal_span()),
            (Axis::Vertical, self.vertical_span()),
        ] {
            if !span.is_finite() || span <= 0.0 {
                return Err(GazeError::DegenerateCalibration { axis, span });
            }
        }
        Ok(())
    }

    pub fn is_calibrated(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Pixel-space pupil position within the camera frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Both eyes' pupil positions averaged for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawGazeSample {
    pub horizontal: f64,
    pub vertical: f64,
}

impl RawGazeSample {
    pub fn new(horizontal: f64, vertical: f64) -> Self {
        Self { horizontal, vertical }
    }

    pub fn from_pupils(left: PixelPoint, right: PixelPoint) -> Self {
        Self {
            horizontal: (left.x + right.x) / 2.0,
            vertical: (left.y + right.y) / 2.0,
        }
    }

    pub fn component(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.horizontal,
            Axis::Vertical => self.vertical,
        }
    }
}

/// Display dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }
}

/// A point on the display, in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: ScreenPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Output of one mapping call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappedGaze {
    /// Smoothed screen point
    pub point: ScreenPoint,
    /// Unsmoothed (horizontal, vertical) position in [0, 1], for diagnostics
    pub normalized: (f64, f64),
}

/// RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_horizontal_axis_is_rejected() {
        let cal = CalibrationData::new(0.0, 10.0, 10.0, 100.0);
        match cal.validate() {
            Err(GazeError::DegenerateCalibration { axis, span }) => {
                assert_eq!(axis, Axis::Horizontal);
                assert_eq!(span, 0.0);
            }
            other => panic!("expected degenerate calibration, got {other:?}"),
        }
    }

    #[test]
    fn empty_store_is_not_calibrated() {
        assert!(!CalibrationData::default().is_calibrated());
        assert!(CalibrationData::new(0.0, 100.0, 0.0, 100.0).is_calibrated());
    }

    #[test]
    fn sample_averages_both_pupils() {
        let s = RawGazeSample::from_pupils(PixelPoint::new(300.0, 230.0), PixelPoint::new(310.0, 240.0));
        assert_eq!(s.horizontal, 305.0);
        assert_eq!(s.component(Axis::Vertical), 235.0);
    }
}
