//! Camera frame sources

use super::{Frame, FrameSource};
use crate::error::GazeError;
use image::RgbImage;
use std::time::Duration;
#[cfg(feature = "vision")]
use opencv::{core, imgproc, prelude::*, videoio};

/// Produces blank frames; used when no camera is attached
pub struct SyntheticCamera {
    width: u32,
    height: u32,
    sequence: u64,
    released: bool,
    interval: Option<Duration>,
}

impl SyntheticCamera {
    pub fn new(width: u32, height: u32) -> Self {
        log::info!("Using synthetic camera ({}x{})", width, height);
        Self {
            width,
            height,
            sequence: 0,
            released: false,
            interval: None,
        }
    }

    /// Block for `1 / fps` on each read, like a real device
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.interval = (fps > 0).then(|| Duration::from_secs_f64(1.0 / fps as f64));
        self
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl FrameSource for SyntheticCamera {
    fn read_frame(&mut self) -> Result<Frame, GazeError> {
        if self.released {
            return Err(GazeError::DeviceUnavailable("synthetic camera released".into()));
        }
        if let Some(interval) = self.interval {
            std::thread::sleep(interval);
        }
        self.sequence += 1;
        Ok(Frame::new(RgbImage::new(self.width, self.height), self.sequence))
    }

    fn release(&mut self) {
        self.released = true;
    }
}

/// Webcam read through OpenCV
#[cfg(feature = "vision")]
pub struct OpenCvCamera {
    capture: videoio::VideoCapture,
    sequence: u64,
}

#[cfg(feature = "vision")]
impl OpenCvCamera {
    pub fn open(index: i32) -> Result<Self, GazeError> {
        log::info!("Opening camera {}...", index);
        let capture = videoio::VideoCapture::new(index, videoio::CAP_ANY)
            .map_err(|e| GazeError::DeviceUnavailable(format!("camera {index}: {e}")))?;
        let opened = capture
            .is_opened()
            .map_err(|e| GazeError::DeviceUnavailable(format!("camera {index}: {e}")))?;
        if !opened {
            return Err(GazeError::DeviceUnavailable(format!("camera {index} could not be opened")));
        }
        Ok(Self { capture, sequence: 0 })
    }
}

#[cfg(feature = "vision")]
impl FrameSource for OpenCvCamera {
    fn read_frame(&mut self) -> Result<Frame, GazeError> {
        let unavailable = |e: opencv::Error| GazeError::DeviceUnavailable(e.to_string());

        let mut bgr = core::Mat::default();
        let ok = self.capture.read(&mut bgr).map_err(unavailable)?;
        if !ok || bgr.empty() {
            return Err(GazeError::DeviceUnavailable("camera returned an empty frame".into()));
        }

        let mut rgb = core::Mat::default();
        imgproc::cvt_color(&bgr, &mut rgb, imgproc::COLOR_BGR2RGB, 0).map_err(unavailable)?;
        let bytes = rgb.data_bytes().map_err(unavailable)?.to_vec();
        let image = RgbImage::from_raw(rgb.cols() as u32, rgb.rows() as u32, bytes)
            .ok_or_else(|| GazeError::DeviceUnavailable("frame buffer size mismatch".into()))?;

        self.sequence += 1;
        Ok(Frame::new(image, self.sequence))
    }

    fn release(&mut self) {
        if let Err(e) = self.capture.release() {
            log::warn!("Failed to release camera: {e}");
        }
    }
}
