//! Position mapper - raw pupil coordinates to a smoothed screen point

use crate::error::GazeError;
use crate::types::{CalibrationData, MappedGaze, RawGazeSample, ScreenPoint, ScreenSize};
use std::collections::VecDeque;

/// Trailing window of mapped screen points
#[derive(Debug, Clone)]
pub struct PositionHistory {
    points: VecDeque<ScreenPoint>,
    capacity: usize,
}

impl PositionHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn push(&mut self, point: ScreenPoint) {
        self.points.push_back(point);
        if self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn sum(&self) -> ScreenPoint {
        self.points.iter().fold(ScreenPoint::default(), |acc, p| {
            ScreenPoint::new(acc.x + p.x, acc.y + p.y)
        })
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

/// Maps raw samples through a calibration onto the screen
#[derive(Debug, Clone)]
pub struct PositionMapper {
    screen: ScreenSize,
    history: PositionHistory,
}

impl PositionMapper {
    pub fn new(screen: ScreenSize, max_positions: usize) -> Self {
        Self {
            screen,
            history: PositionHistory::new(max_positions),
        }
    }

    pub fn screen(&self) -> ScreenSize {
        self.screen
    }

    pub fn history(&self) -> &PositionHistory {
        &self.history
    }

    /// Map one sample.
    ///
    /// The returned point is the history sum divided by the configured
    /// window size, not by the number of points held, so the first frames
    /// after a reset are pulled toward the origin.
    pub fn map(&mut self, sample: RawGazeSample, calibration: &CalibrationData) -> Result<MappedGaze, GazeError> {
        calibration.validate()?;

        let horizontal = sample.horizontal.min(calibration.left).max(calibration.right);
        let vertical = sample.vertical.min(calibration.bottom).max(calibration.top);

        // Looking left raises the raw horizontal value, so invert it.
        let normalized_horizontal = 1.0 - (horizontal - calibration.right) / calibration.horizontal_span();
        let normalized_vertical = (vertical - calibration.top) / calibration.vertical_span();

        let raw_point = ScreenPoint::new(
            normalized_horizontal * self.screen.width as f64,
            normalized_vertical * self.screen.height as f64,
        );
        self.history.push(raw_point);

        let sum = self.history.sum();
        let k = self.history.capacity() as f64;
        let point = ScreenPoint::new(sum.x / k, sum.y / k);

        log::trace!(
            "Mapped ({:.2}, {:.2}) -> ({:.1}, {:.1}) smoothed ({:.1}, {:.1})",
            sample.horizontal,
            sample.vertical,
            raw_point.x,
            raw_point.y,
            point.x,
            point.y
        );

        Ok(MappedGaze {
            point,
            normalized: (normalized_horizontal, normalized_vertical),
        })
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Axis;

    fn calibration() -> CalibrationData {
        CalibrationData::new(0.0, 100.0, 0.0, 100.0)
    }

    fn mapper() -> PositionMapper {
        PositionMapper::new(ScreenSize::new(1920, 1080), 3)
    }

    #[test]
    fn center_sample_maps_to_screen_center() {
        let mut m = mapper();
        let mut out = None;
        for _ in 0..3 {
            out = Some(m.map(RawGazeSample::new(50.0, 50.0), &calibration()).expect("map"));
        }
        let out = out.expect("mapped");
        assert_eq!(out.normalized, (0.5, 0.5));
        assert!((out.point.x - 960.0).abs() < 1e-9);
        assert!((out.point.y - 540.0).abs() < 1e-9);
    }

    #[test]
    fn first_sample_is_divided_by_window_size() {
        let mut m = mapper();
        let out = m.map(RawGazeSample::new(50.0, 50.0), &calibration()).expect("map");
        assert!((out.point.x - 960.0 / 3.0).abs() < 1e-9);
        assert!((out.point.y - 540.0 / 3.0).abs() < 1e-9);
        assert_eq!(m.history().len(), 1);
    }

    #[test]
    fn looking_left_maps_to_left_edge() {
        let mut m = PositionMapper::new(ScreenSize::new(1000, 500), 1);
        let out = m.map(RawGazeSample::new(100.0, 0.0), &calibration()).expect("map");
        assert_eq!(out.normalized, (0.0, 0.0));
        assert_eq!(out.point, ScreenPoint::new(0.0, 0.0));

        let out = m.map(RawGazeSample::new(0.0, 100.0), &calibration()).expect("map");
        assert_eq!(out.normalized, (1.0, 1.0));
        assert_eq!(out.point, ScreenPoint::new(1000.0, 500.0));
    }

    #[test]
    fn out_of_range_samples_clamp_to_bounds() {
        let mut m = PositionMapper::new(ScreenSize::new(1000, 500), 1);
        for (h, v) in [(-50.0, -50.0), (250.0, 1e6), (f64::MAX, f64::MIN)] {
            let out = m.map(RawGazeSample::new(h, v), &calibration()).expect("map");
            let (nh, nv) = out.normalized;
            assert!((0.0..=1.0).contains(&nh), "nh={nh}");
            assert!((0.0..=1.0).contains(&nv), "nv={nv}");
        }
        let out = m.map(RawGazeSample::new(-50.0, 150.0), &calibration()).expect("map");
        assert_eq!(out.normalized, (1.0, 1.0));
    }

    #[test]
    fn in_range_samples_normalize_into_unit_interval() {
        let cal = CalibrationData::new(232.5, 319.2, 313.8, 240.0);
        let mut m = mapper();
        let mut h = cal.right;
        while h <= cal.left {
            let mut v = cal.top;
            while v <= cal.bottom {
                let out = m.map(RawGazeSample::new(h, v), &cal).expect("map");
                assert!((0.0..=1.0).contains(&out.normalized.0));
                assert!((0.0..=1.0).contains(&out.normalized.1));
                v += 0.75;
            }
            h += 0.6;
        }
    }

    #[test]
    fn history_evicts_oldest() {
        let mut m = PositionMapper::new(ScreenSize::new(300, 300), 2);
        m.map(RawGazeSample::new(100.0, 0.0), &calibration()).expect("map");
        m.map(RawGazeSample::new(0.0, 100.0), &calibration()).expect("map");
        let out = m.map(RawGazeSample::new(0.0, 100.0), &calibration()).expect("map");
        assert_eq!(m.history().len(), 2);
        assert_eq!(out.point, ScreenPoint::new(300.0, 300.0));
    }

    #[test]
    fn degenerate_calibration_is_an_error_and_leaves_history() {
        let mut m = mapper();
        let cal = CalibrationData::new(0.0, 50.0, 50.0, 100.0);
        let err = m.map(RawGazeSample::new(50.0, 50.0), &cal).unwrap_err();
        assert!(matches!(err, GazeError::DegenerateCalibration { axis: Axis::Horizontal, .. }));
        assert!(m.history().is_empty());

        let err = m.map(RawGazeSample::new(50.0, 50.0), &CalibrationData::default()).unwrap_err();
        assert!(matches!(err, GazeError::DegenerateCalibration { .. }));
    }

    #[test]
    fn reset_clears_history() {
        let mut m = mapper();
        m.map(RawGazeSample::new(50.0, 50.0), &calibration()).expect("map");
        m.reset();
        assert!(m.history().is_empty());
    }
}
