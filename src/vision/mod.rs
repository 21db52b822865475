//! Vision pathway - camera frames in, pupil readings out
//!
//! The pupil detector and the camera are external collaborators. They sit
//! behind [`PupilDetector`] and [`FrameSource`] so the mapping loop never
//! depends on a particular device or detection algorithm.

use crate::error::GazeError;
use crate::types::{PixelPoint, RawGazeSample};
use image::RgbImage;

mod camera;
mod capture;
mod simulated;
mod udp_pupil;

#[cfg(feature = "vision")]
pub use camera::OpenCvCamera;
pub use camera::SyntheticCamera;
pub use capture::ThreadedCapture;
pub use simulated::SimulatedDetector;
pub use udp_pupil::{parse_pupil_message, UdpPupilDetector};

/// One captured camera frame
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: RgbImage,
    /// Strictly increasing per source
    pub sequence: u64,
    /// Capture time in milliseconds since the epoch
    pub timestamp: u64,
}

impl Frame {
    pub fn new(image: RgbImage, sequence: u64) -> Self {
        Self {
            image,
            sequence,
            timestamp: now_ms(),
        }
    }
}

/// A camera-like device producing frames on demand
pub trait FrameSource: Send {
    /// Blocks until the next frame is available
    fn read_frame(&mut self) -> Result<Frame, GazeError>;

    /// Release the underlying device; further reads fail
    fn release(&mut self);
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn read_frame(&mut self) -> Result<Frame, GazeError> {
        (**self).read_frame()
    }

    fn release(&mut self) {
        (**self).release()
    }
}

/// What the detector saw in one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DetectorReading {
    pub left_pupil: Option<PixelPoint>,
    pub right_pupil: Option<PixelPoint>,
    pub horizontal_ratio: Option<f64>,
    pub blinking: bool,
}

impl DetectorReading {
    /// Averaged sample, or `None` when either pupil was not found
    pub fn raw_sample(&self) -> Option<RawGazeSample> {
        match (self.left_pupil, self.right_pupil) {
            (Some(l), Some(r)) => Some(RawGazeSample::from_pupils(l, r)),
            _ => None,
        }
    }
}

/// External pupil detector, consumed as a black box
pub trait PupilDetector {
    fn analyze(&mut self, frame: &Frame) -> DetectorReading;

    /// Frame with detector overlays, for a diagnostic window
    fn annotated_frame(&self) -> Option<Frame> {
        None
    }
}

impl<T: PupilDetector + ?Sized> PupilDetector for Box<T> {
    fn analyze(&mut self, frame: &Frame) -> DetectorReading {
        (**self).analyze(frame)
    }

    fn annotated_frame(&self) -> Option<Frame> {
        (**self).annotated_frame()
    }
}

pub(crate) fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
