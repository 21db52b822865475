//! Calibration procedure and smoother
//!
//! The procedure walks the user through targets placed on the four screen
//! edges and averages the raw pupil coordinate observed at each edge into a
//! [`CalibrationData`]. The smoother then recenters the result around each
//! axis midpoint.

use crate::types::{CalibrationData, Edge, RawGazeSample, ScreenPoint, ScreenSize};

/// One on-screen point the user is asked to look at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationTarget {
    pub edge: Edge,
    pub position: ScreenPoint,
}

/// Targets grouped by edge (top, left, right, bottom), evenly spaced along
/// each edge and sitting on the edge itself.
pub fn calibration_targets(screen: ScreenSize, points_per_edge: usize) -> Vec<CalibrationTarget> {
    let w = screen.width as f64;
    let h = screen.height as f64;
    let step_x = (screen.width / (points_per_edge as u32 + 1)) as f64;
    let step_y = (screen.height / (points_per_edge as u32 + 1)) as f64;

    let mut targets = Vec::with_capacity(points_per_edge * Edge::ALL.len());
    for edge in Edge::ALL {
        for i in 1..=points_per_edge {
            let along_x = step_x * i as f64;
            let along_y = step_y * i as f64;
            let position = match edge {
                Edge::Top => ScreenPoint::new(along_x, 0.0),
                Edge::Left => ScreenPoint::new(0.0, along_y),
                Edge::Right => ScreenPoint::new(w, along_y),
                Edge::Bottom => ScreenPoint::new(along_x, h),
            };
            targets.push(CalibrationTarget { edge, position });
        }
    }
    targets
}

/// Result of confirming one target
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationStep {
    /// No pupil sample this frame; the same target stays current
    Retry,
    /// Sample accumulated; `value` is the edge's running total
    Recorded { edge: Edge, value: f64 },
    /// Every target has been sampled
    Complete,
}

/// Drives the target sequence and accumulates samples into the store
#[derive(Debug, Clone)]
pub struct CalibrationProcedure {
    targets: Vec<CalibrationTarget>,
    points_per_edge: usize,
    index: usize,
    data: CalibrationData,
}

impl CalibrationProcedure {
    pub fn new(screen: ScreenSize, points_per_edge: usize) -> Self {
        Self {
            targets: calibration_targets(screen, points_per_edge),
            points_per_edge,
            index: 0,
            data: CalibrationData::default(),
        }
    }

    pub fn current_target(&self) -> Option<&CalibrationTarget> {
        self.targets.get(self.index)
    }

    /// (targets done, total targets)
    pub fn progress(&self) -> (usize, usize) {
        (self.index, self.targets.len())
    }

    pub fn is_complete(&self) -> bool {
        self.index >= self.targets.len()
    }

    pub fn data(&self) -> &CalibrationData {
        &self.data
    }

    /// Handle a user confirmation for the current target.
    ///
    /// Without a sample the index does not advance. With one, the sample's
    /// component on the edge's axis is averaged into the edge field.
    pub fn submit(&mut self, sample: Option<RawGazeSample>) -> CalibrationStep {
        let Some(target) = self.current_target().copied() else {
            return CalibrationStep::Complete;
        };
        let Some(sample) = sample else {
            log::debug!("No pupils detected for {} target {}, retrying", target.edge.as_str(), self.index);
            return CalibrationStep::Retry;
        };

        let amount = sample.component(target.edge.axis()) / self.points_per_edge as f64;
        let value = self.data.accumulate(target.edge, amount);
        self.index += 1;
        log::info!("Calibrated {}: {}", target.edge.as_str(), value);

        if self.is_complete() {
            CalibrationStep::Complete
        } else {
            CalibrationStep::Recorded { edge: target.edge, value }
        }
    }

    pub fn into_data(self) -> CalibrationData {
        self.data
    }
}

/// Recenters a calibration around each axis midpoint.
///
/// Both deltas are taken from the *vertical* midpoint; the horizontal factor
/// is applied to it as well.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationSmoother {
    pub vertical_factor: f64,
    pub horizontal_factor: f64,
}

impl Default for CalibrationSmoother {
    fn default() -> Self {
        Self {
            vertical_factor: 0.020,
            horizontal_factor: 0.030,
        }
    }
}

impl CalibrationSmoother {
    pub fn new(vertical_factor: f64, horizontal_factor: f64) -> Self {
        Self { vertical_factor, horizontal_factor }
    }

    pub fn apply(&self, data: &mut CalibrationData) {
        let vertical_middle = (data.top + data.bottom) / 2.0;
        let vertical_delta = vertical_middle * self.vertical_factor;
        data.top = vertical_middle - vertical_delta;
        data.bottom = vertical_middle + vertical_delta;

        let horizontal_middle = (data.left + data.right) / 2.0;
        let horizontal_delta = vertical_middle * self.horizontal_factor;
        data.right = horizontal_middle - horizontal_delta;
        data.left = horizontal_middle + horizontal_delta;
    }
}
