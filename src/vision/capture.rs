//! Background frame capture with a single-slot latest-frame channel
//!
//! The capture thread always replaces an unconsumed frame with the newest
//! one, so the mapping loop never falls behind the camera and never sees an
//! older frame after a newer one.

use super::{Frame, FrameSource};
use crate::error::GazeError;
use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

type Slot = Result<Frame, GazeError>;

pub struct ThreadedCapture {
    rx: Receiver<Slot>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    last_sequence: Option<u64>,
}

impl ThreadedCapture {
    /// Move `source` onto a capture thread
    pub fn spawn<S: FrameSource + 'static>(source: S) -> Result<Self, GazeError> {
        let (tx, rx) = crossbeam_channel::bounded::<Slot>(1);
        let stop = Arc::new(AtomicBool::new(false));

        let handle = std::thread::Builder::new()
            .name("gaze-capture".into())
            .spawn({
                let drain = rx.clone();
                let stop = Arc::clone(&stop);
                move || capture_loop(source, tx, drain, stop)
            })?;

        log::info!("Capture thread started");
        Ok(Self {
            rx,
            stop,
            handle: Some(handle),
            last_sequence: None,
        })
    }
}

fn capture_loop<S: FrameSource>(mut source: S, tx: Sender<Slot>, drain: Receiver<Slot>, stop: Arc<AtomicBool>) {
    while !stop.load(Ordering::Acquire) {
        let slot = source.read_frame();
        let failed = slot.is_err();

        // Only this thread fills the slot, so it is empty after the drain.
        if let Ok(stale) = drain.try_recv() {
            if let Ok(frame) = stale {
                log::trace!("Dropping stale frame {}", frame.sequence);
            }
        }
        if tx.send(slot).is_err() || failed {
            break;
        }
    }
    source.release();
    log::info!("Capture thread stopped, camera released");
}

impl FrameSource for ThreadedCapture {
    fn read_frame(&mut self) -> Result<Frame, GazeError> {
        loop {
            let slot = self
                .rx
                .recv()
                .map_err(|_| GazeError::DeviceUnavailable("capture thread stopped".into()))?;
            let frame = slot?;

            if self.last_sequence.is_some_and(|last| frame.sequence <= last) {
                log::warn!("Discarding out-of-order frame {}", frame.sequence);
                continue;
            }
            self.last_sequence = Some(frame.sequence);
            return Ok(frame);
        }
    }

    fn release(&mut self) {
        self.stop.store(true, Ordering::Release);
        // Unblock a producer that raced the stop flag.
        while self.rx.try_recv().is_ok() {}
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("Capture thread panicked");
            }
        }
    }
}

impl Drop for ThreadedCapture {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::SyntheticCamera;
    use image::RgbImage;
    use std::sync::atomic::AtomicUsize;

    struct FailingAfter {
        remaining: usize,
        sequence: u64,
        released: Arc<AtomicUsize>,
    }

    impl FrameSource for FailingAfter {
        fn read_frame(&mut self) -> Result<Frame, GazeError> {
            if self.remaining == 0 {
                return Err(GazeError::DeviceUnavailable("unplugged".into()));
            }
            self.remaining -= 1;
            self.sequence += 1;
            Ok(Frame::new(RgbImage::new(2, 2), self.sequence))
        }

        fn release(&mut self) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn frames_arrive_in_increasing_order() {
        let mut capture = ThreadedCapture::spawn(SyntheticCamera::new(8, 8)).expect("spawn");
        let mut last = 0;
        for _ in 0..50 {
            let frame = capture.read_frame().expect("frame");
            assert!(frame.sequence > last);
            last = frame.sequence;
        }
        capture.release();
    }

    #[test]
    fn device_failure_propagates_and_releases_source() {
        let released = Arc::new(AtomicUsize::new(0));
        let source = FailingAfter {
            remaining: 0,
            sequence: 0,
            released: Arc::clone(&released),
        };
        let mut capture = ThreadedCapture::spawn(source).expect("spawn");
        assert!(matches!(capture.read_frame(), Err(GazeError::DeviceUnavailable(_))));
        capture.release();
        assert_eq!(released.load(Ordering::SeqCst), 1);
        assert!(capture.read_frame().is_err());
    }
}
