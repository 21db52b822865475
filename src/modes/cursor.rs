use crate::display::Display;
use crate::error::GazeError;
use crate::mapper::PositionMapper;
use crate::types::{CalibrationData, Color, MappedGaze};
use crate::vision::DetectorReading;

/// Free-form cursor: a red marker follows the mapped gaze
#[derive(Debug, Clone)]
pub struct CursorMode {
    pub marker_radius: f64,
}

impl Default for CursorMode {
    fn default() -> Self {
        Self { marker_radius: 30.0 }
    }
}

impl CursorMode {
    /// Draw one frame. Frames without both pupils draw nothing and leave
    /// the mapper's history alone.
    pub fn render(
        &self,
        reading: &DetectorReading,
        mapper: &mut PositionMapper,
        calibration: &CalibrationData,
        display: &mut dyn Display,
    ) -> Result<Option<MappedGaze>, GazeError> {
        display.clear(Color::BLACK);

        let Some(sample) = reading.raw_sample() else {
            return Ok(None);
        };
        let mapped = mapper.map(sample, calibration)?;

        display.draw_circle(mapped.point, self.marker_radius, Color::RED);
        display.draw_text(&format!(
            "{:.2}, {:.2}, ({:.3}, {:.3})",
            sample.horizontal, sample.vertical, mapped.normalized.0, mapped.normalized.1
        ));
        Ok(Some(mapped))
    }
}
