//! Synthetic pupil detector for running without a real gaze tracker

use super::{DetectorReading, Frame, PupilDetector};
use crate::types::PixelPoint;
use image::Rgb;

/// Sweeps both pupils through a Lissajous path around a resting position,
/// closing the eyes for a few frames every `blink_period` frames. The path
/// is a function of the frame sequence number, so runs are reproducible.
pub struct SimulatedDetector {
    center: PixelPoint,
    amplitude: PixelPoint,
    eye_spacing: f64,
    blink_period: u64,
    blink_frames: u64,
    last_frame: Option<Frame>,
    last_reading: DetectorReading,
}

impl SimulatedDetector {
    pub fn new() -> Self {
        log::info!("Initializing simulated pupil detector");
        Self {
            center: PixelPoint::new(316.5, 236.5),
            amplitude: PixelPoint::new(4.0, 3.0),
            eye_spacing: 60.0,
            blink_period: 90,
            blink_frames: 3,
            last_frame: None,
            last_reading: DetectorReading::default(),
        }
    }

    /// Raw-coordinate box the simulated gaze covers: (min, max)
    pub fn range(&self) -> (PixelPoint, PixelPoint) {
        (
            PixelPoint::new(self.center.x - self.amplitude.x, self.center.y - self.amplitude.y),
            PixelPoint::new(self.center.x + self.amplitude.x, self.center.y + self.amplitude.y),
        )
    }

    fn reading_at(&self, sequence: u64) -> DetectorReading {
        if self.blink_period > 0 && sequence % self.blink_period < self.blink_frames {
            return DetectorReading {
                blinking: true,
                ..Default::default()
            };
        }

        let t = sequence as f64 / 30.0;
        let x = self.center.x + self.amplitude.x * (t * 0.5).sin();
        let y = self.center.y + self.amplitude.y * (t * 0.3).cos();
        let half = self.eye_spacing / 2.0;

        DetectorReading {
            left_pupil: Some(PixelPoint::new(x - half, y)),
            right_pupil: Some(PixelPoint::new(x + half, y)),
            horizontal_ratio: Some(0.5 - 0.5 * (t * 0.5).sin()),
            blinking: false,
        }
    }
}

impl Default for SimulatedDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl PupilDetector for SimulatedDetector {
    fn analyze(&mut self, frame: &Frame) -> DetectorReading {
        self.last_reading = self.reading_at(frame.sequence);
        self.last_frame = Some(frame.clone());
        self.last_reading
    }

    fn annotated_frame(&self) -> Option<Frame> {
        let mut frame = self.last_frame.clone()?;
        let (w, h) = frame.image.dimensions();
        for pupil in [self.last_reading.left_pupil, self.last_reading.right_pupil].into_iter().flatten() {
            let (cx, cy) = (pupil.x.round() as i64, pupil.y.round() as i64);
            for d in -3..=3i64 {
                for (px, py) in [(cx + d, cy), (cx, cy + d)] {
                    if (0..w as i64).contains(&px) && (0..h as i64).contains(&py) {
                        frame.image.put_pixel(px as u32, py as u32, Rgb([0, 255, 0]));
                    }
                }
            }
        }
        Some(frame)
    }
}
