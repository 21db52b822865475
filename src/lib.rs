//! # gaze-pop
//!
//! Calibrates a webcam pupil tracker against a display and uses the
//! calibrated mapping to drive a free-form gaze cursor and a
//! pop-the-bubble-by-gaze game.
//!
//! Data flow per frame: camera frame → [`vision::PupilDetector`] → raw pupil
//! sample → [`mapper::PositionMapper`] (using the session's
//! [`CalibrationData`]) → smoothed screen point → the active interaction mode.

pub mod calibration;
pub mod config;
pub mod display;
pub mod error;
pub mod input;
pub mod mapper;
pub mod modes;
pub mod types;
pub mod vision;

pub use calibration::{CalibrationProcedure, CalibrationSmoother};
pub use config::{GazeConfig, Mode};
pub use error::GazeError;
pub use mapper::PositionMapper;
pub use types::*;

use display::Display;
use input::{InputEvent, InputSource};
use modes::{BubbleGame, CursorMode, FrameStart};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};
use vision::{DetectorReading, FrameSource, PupilDetector};

/// How a session loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Completed,
    /// A quit signal arrived; the camera has been released
    Quit,
}

/// The external collaborators a session drives
pub struct SessionParts {
    pub camera: Box<dyn FrameSource>,
    pub detector: Box<dyn PupilDetector + Send>,
    pub display: Box<dyn Display + Send>,
    pub input: Box<dyn InputSource + Send>,
}

struct FrameInput {
    reading: DetectorReading,
    events: Vec<InputEvent>,
}

/// Sleeps out the remainder of each frame interval
struct FramePacer {
    interval: Option<Duration>,
    last: Instant,
}

impl FramePacer {
    fn new(fps: u32) -> Self {
        Self {
            interval: (fps > 0).then(|| Duration::from_secs_f64(1.0 / fps as f64)),
            last: Instant::now(),
        }
    }

    fn tick(&mut self) {
        if let Some(interval) = self.interval {
            let elapsed = self.last.elapsed();
            if elapsed < interval {
                std::thread::sleep(interval - elapsed);
            }
        }
        self.last = Instant::now();
    }
}

/// One user's gaze session: owns the devices, the calibration and the
/// mapper's history for its whole lifetime.
pub struct GazeSession {
    config: GazeConfig,
    camera: Box<dyn FrameSource>,
    detector: Box<dyn PupilDetector + Send>,
    display: Box<dyn Display + Send>,
    input: Box<dyn InputSource + Send>,
    calibration: CalibrationData,
    calibration_supplied: bool,
    mapper: PositionMapper,
    pacer: FramePacer,
    camera_released: bool,
}

impl GazeSession {
    pub fn new(config: GazeConfig, parts: SessionParts) -> Result<Self, GazeError> {
        config.validate()?;
        let screen = parts.display.size();
        log::info!("Initializing gaze session on a {}x{} display", screen.width, screen.height);

        let calibration_supplied = config.calibration.is_some();
        if calibration_supplied {
            log::info!("Using supplied calibration, skipping the procedure");
        }

        Ok(Self {
            calibration: config.calibration.unwrap_or_default(),
            calibration_supplied,
            mapper: PositionMapper::new(screen, config.max_positions),
            pacer: FramePacer::new(config.target_fps),
            camera: parts.camera,
            detector: parts.detector,
            display: parts.display,
            input: parts.input,
            camera_released: false,
            config,
        })
    }

    pub fn config(&self) -> &GazeConfig {
        &self.config
    }

    pub fn calibration(&self) -> &CalibrationData {
        &self.calibration
    }

    pub fn mapper(&self) -> &PositionMapper {
        &self.mapper
    }

    pub fn display(&self) -> &dyn Display {
        self.display.as_ref()
    }

    /// Acquire, detect and poll input for one frame. `None` means quit.
    fn next_frame(&mut self) -> Result<Option<FrameInput>, GazeError> {
        let frame = self.camera.read_frame()?;
        let reading = self.detector.analyze(&frame);
        if let Some(annotated) = self.detector.annotated_frame() {
            self.display.show_annotated(&annotated);
        }

        let events = self.input.poll();
        if events.contains(&InputEvent::Quit) {
            log::info!("Quit requested");
            self.release_camera();
            return Ok(None);
        }
        Ok(Some(FrameInput { reading, events }))
    }

    fn end_frame(&mut self) {
        self.display.present();
        self.pacer.tick();
    }

    fn release_camera(&mut self) {
        if !self.camera_released {
            self.camera.release();
            self.camera_released = true;
            log::info!("Camera released");
        }
    }

    /// Walk the user through the calibration targets. Skipped when a
    /// calibration was supplied in the configuration.
    pub fn run_calibration(&mut self) -> Result<SessionOutcome, GazeError> {
        if self.calibration_supplied {
            return Ok(SessionOutcome::Completed);
        }

        let screen = self.mapper.screen();
        let mut procedure = CalibrationProcedure::new(screen, self.config.points_per_edge);
        log::info!("Starting calibration with {} targets", procedure.progress().1);

        while let Some(target) = procedure.current_target().copied() {
            let Some(input) = self.next_frame()? else {
                return Ok(SessionOutcome::Quit);
            };

            self.display.clear(Color::BLACK);
            self.display.draw_circle(target.position, self.config.bubble_radius, Color::BLUE);
            self.display.draw_text("Focus on the bubble and press SPACE");

            for _ in input.events.iter().filter(|e| **e == InputEvent::Confirm) {
                if procedure.is_complete() {
                    break;
                }
                procedure.submit(input.reading.raw_sample());
            }

            self.end_frame();
        }

        self.calibration = procedure.into_data();
        self.mapper.reset();
        log::info!("Calibration complete: {:?}", self.calibration);
        Ok(SessionOutcome::Completed)
    }

    /// Widen the calibrated range with the configured smoothing factors
    pub fn smooth_calibration(&mut self) {
        let smoother = CalibrationSmoother::new(self.config.vertical_smoothing, self.config.horizontal_smoothing);
        smoother.apply(&mut self.calibration);
        self.mapper.reset();
        log::info!("Calibration after smoothing: {:?}", self.calibration);
    }

    /// Gaze cursor on a blank background until quit
    pub fn run_cursor_mode(&mut self) -> Result<SessionOutcome, GazeError> {
        log::info!("Starting cursor mode");
        let cursor = CursorMode::default();

        loop {
            let Some(input) = self.next_frame()? else {
                return Ok(SessionOutcome::Quit);
            };
            cursor.render(&input.reading, &mut self.mapper, &self.calibration, self.display.as_mut())?;
            self.end_frame();
        }
    }

    /// Bubble game with `total` bubbles and entropy-seeded placement
    pub fn run_bubble_mode(&mut self, total: u32) -> Result<SessionOutcome, GazeError> {
        self.run_bubble_mode_with_rng(total, StdRng::from_entropy())
    }

    pub fn run_bubble_mode_with_rng<R: Rng>(&mut self, total: u32, rng: R) -> Result<SessionOutcome, GazeError> {
        log::info!("Starting bubble mode with {} bubbles", total);
        let mut game = BubbleGame::new(
            rng,
            self.mapper.screen(),
            total,
            self.config.bubble_radius,
            self.config.spawn_margin,
        );

        while !game.is_finished() {
            let Some(input) = self.next_frame()? else {
                return Ok(SessionOutcome::Quit);
            };
            let sample = input.reading.raw_sample();

            self.display.clear(Color::BLACK);
            match game.begin_frame(input.reading.blinking, sample.is_some()) {
                FrameStart::Finished => break,
                FrameStart::Hit { number } => {
                    log::debug!("{} of {} bubbles popped", number, total);
                    self.end_frame();
                    continue;
                }
                FrameStart::Continue => {}
            }

            if let Some(center) = game.bubble() {
                self.display.draw_circle(center, game.radius(), Color::BLUE);
            }
            if let Some(sample) = sample {
                let mapped = self.mapper.map(sample, &self.calibration)?;
                self.display.draw_circle(mapped.point, 5.0, Color::RED);
                game.track(mapped.point);
                self.display.draw_text("Look at the bubble and blink!");
            }

            self.end_frame();
        }

        log::info!("All {} bubbles popped", total);
        Ok(SessionOutcome::Completed)
    }

    /// Release the camera and end the session
    pub fn shutdown(mut self) {
        log::info!("Shutting down gaze session...");
        self.release_camera();
    }
}
