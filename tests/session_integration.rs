//! End-to-end session runs against scripted devices

use gaze_pop::display::{Display, HeadlessDisplay};
use gaze_pop::input::{InputEvent, InputSource};
use gaze_pop::vision::{DetectorReading, Frame, FrameSource, PupilDetector, SyntheticCamera};
use gaze_pop::{
    CalibrationData, Color, GazeConfig, GazeError, GazeSession, PixelPoint, ScreenPoint, ScreenSize, SessionOutcome,
    SessionParts,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct CameraStats {
    reads: AtomicUsize,
    releases: AtomicUsize,
}

struct CountingCamera {
    inner: SyntheticCamera,
    stats: Arc<CameraStats>,
}

impl FrameSource for CountingCamera {
    fn read_frame(&mut self) -> Result<Frame, GazeError> {
        self.stats.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_frame()
    }

    fn release(&mut self) {
        self.stats.releases.fetch_add(1, Ordering::SeqCst);
        self.inner.release();
    }
}

/// Plays back readings in order, then reports no pupils
struct ScriptedDetector(VecDeque<DetectorReading>);

impl PupilDetector for ScriptedDetector {
    fn analyze(&mut self, _frame: &Frame) -> DetectorReading {
        self.0.pop_front().unwrap_or_default()
    }
}

/// Plays back per-frame event lists, then emits `fallback` forever
struct ScriptedInput {
    frames: VecDeque<Vec<InputEvent>>,
    fallback: Vec<InputEvent>,
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Vec<InputEvent> {
        self.frames.pop_front().unwrap_or_else(|| self.fallback.clone())
    }
}

#[derive(Clone)]
struct SharedDisplay(Arc<Mutex<HeadlessDisplay>>);

impl Display for SharedDisplay {
    fn size(&self) -> ScreenSize {
        self.0.lock().unwrap().size()
    }
    fn clear(&mut self, color: Color) {
        self.0.lock().unwrap().clear(color)
    }
    fn draw_circle(&mut self, center: ScreenPoint, radius: f64, color: Color) {
        self.0.lock().unwrap().draw_circle(center, radius, color)
    }
    fn draw_text(&mut self, text: &str) {
        self.0.lock().unwrap().draw_text(text)
    }
    fn present(&mut self) {
        self.0.lock().unwrap().present()
    }
}

fn pupils(h: f64, v: f64) -> DetectorReading {
    DetectorReading {
        left_pupil: Some(PixelPoint::new(h - 2.0, v)),
        right_pupil: Some(PixelPoint::new(h + 2.0, v)),
        horizontal_ratio: Some(0.5),
        blinking: false,
    }
}

fn blink() -> DetectorReading {
    DetectorReading {
        blinking: true,
        ..Default::default()
    }
}

struct Harness {
    session: GazeSession,
    stats: Arc<CameraStats>,
    display: SharedDisplay,
}

fn harness(config: GazeConfig, readings: Vec<DetectorReading>, events: Vec<Vec<InputEvent>>, fallback: Vec<InputEvent>) -> Harness {
    let stats = Arc::new(CameraStats::default());
    let display = SharedDisplay(Arc::new(Mutex::new(HeadlessDisplay::new(config.screen))));
    let parts = SessionParts {
        camera: Box::new(CountingCamera {
            inner: SyntheticCamera::new(4, 4),
            stats: Arc::clone(&stats),
        }),
        detector: Box::new(ScriptedDetector(readings.into())),
        display: Box::new(display.clone()),
        input: Box::new(ScriptedInput {
            frames: events.into(),
            fallback,
        }),
    };
    let session = GazeSession::new(config, parts).expect("session");
    Harness { session, stats, display }
}

fn base_config() -> GazeConfig {
    GazeConfig {
        screen: ScreenSize::new(800, 600),
        target_fps: 0,
        points_per_edge: 1,
        ..GazeConfig::default()
    }
}

#[test]
fn calibration_retries_missing_samples_and_fills_store() {
    let readings = vec![
        DetectorReading::default(),
        pupils(315.0, 230.0),
        pupils(320.0, 236.0),
        pupils(310.0, 236.0),
        pupils(315.0, 240.0),
    ];
    let mut h = harness(base_config(), readings, vec![], vec![InputEvent::Confirm]);

    assert_eq!(h.session.run_calibration().expect("calibrate"), SessionOutcome::Completed);
    assert_eq!(h.stats.reads.load(Ordering::SeqCst), 5);
    assert_eq!(h.session.calibration(), &CalibrationData::new(230.0, 320.0, 310.0, 240.0));

    let display = h.display.0.lock().unwrap();
    assert_eq!(display.frames_presented(), 5);
    let (center, _, color) = display.circles().next().expect("target");
    assert_eq!(center, ScreenPoint::new(800.0 / 2.0, 600.0));
    assert_eq!(color, Color::BLUE);
}

#[test]
fn unconfirmed_frames_do_not_sample() {
    let readings = vec![pupils(1.0, 1.0), pupils(315.0, 230.0)];
    let events = vec![vec![], vec![InputEvent::Confirm]];
    let mut h = harness(base_config(), readings, events, vec![InputEvent::Quit]);

    assert_eq!(h.session.run_calibration().expect("calibrate"), SessionOutcome::Quit);
    assert_eq!(h.session.calibration().top, 230.0);
    assert_eq!(h.stats.releases.load(Ordering::SeqCst), 1);
}

#[test]
fn supplied_calibration_skips_procedure() {
    let config = GazeConfig {
        calibration: Some(CalibrationData::new(0.0, 100.0, 0.0, 100.0)),
        ..base_config()
    };
    let mut h = harness(config, vec![], vec![], vec![InputEvent::Confirm]);
    assert_eq!(h.session.run_calibration().expect("calibrate"), SessionOutcome::Completed);
    assert_eq!(h.stats.reads.load(Ordering::SeqCst), 0);
    assert_eq!(h.session.calibration(), &CalibrationData::new(0.0, 100.0, 0.0, 100.0));
}

#[test]
fn quit_in_cursor_mode_releases_camera_on_same_frame() {
    let config = GazeConfig {
        calibration: Some(CalibrationData::new(0.0, 100.0, 0.0, 100.0)),
        ..base_config()
    };
    let readings = vec![pupils(50.0, 50.0), DetectorReading::default(), pupils(50.0, 50.0)];
    let events = vec![vec![], vec![], vec![InputEvent::Quit]];
    let mut h = harness(config, readings, events, vec![]);

    assert_eq!(h.session.run_cursor_mode().expect("cursor"), SessionOutcome::Quit);
    assert_eq!(h.stats.reads.load(Ordering::SeqCst), 3);
    assert_eq!(h.stats.releases.load(Ordering::SeqCst), 1);
    // Only the first frame produced a sample; the missing one left history alone.
    assert_eq!(h.session.mapper().history().len(), 1);
    assert_eq!(h.display.0.lock().unwrap().frames_presented(), 2);

    h.session.shutdown();
    assert_eq!(h.stats.releases.load(Ordering::SeqCst), 1);
}

#[test]
fn degenerate_calibration_fails_at_first_mapping() {
    // Four identical samples calibrate, the fifth is the first cursor frame.
    let readings = vec![pupils(310.0, 235.0); 5];
    let mut h = harness(base_config(), readings, vec![], vec![InputEvent::Confirm]);
    h.session.run_calibration().expect("calibrate");
    assert!(!h.session.calibration().is_calibrated());

    let err = h.session.run_cursor_mode().unwrap_err();
    assert!(matches!(err, GazeError::DegenerateCalibration { .. }));
}

#[test]
fn bubble_pops_after_fixation_then_blink() {
    let config = GazeConfig {
        max_positions: 1,
        calibration: Some(CalibrationData::new(0.0, 100.0, 0.0, 100.0)),
        ..base_config()
    };

    // Same seed and draw order as the game: x first, then y.
    let mut probe = StdRng::seed_from_u64(42);
    let cx = probe.gen_range(50u32..=750) as f64;
    let cy = probe.gen_range(50u32..=550) as f64;
    let raw_h = 100.0 * (1.0 - cx / 800.0);
    let raw_v = 100.0 * cy / 600.0;

    let readings = vec![
        blink(),               // blink before fixation: ignored
        pupils(raw_h, raw_v),  // on the bubble
        blink(),               // pop
    ];
    let mut h = harness(config, readings, vec![], vec![]);

    let outcome = h
        .session
        .run_bubble_mode_with_rng(1, StdRng::seed_from_u64(42))
        .expect("bubbles");
    assert_eq!(outcome, SessionOutcome::Completed);
    assert_eq!(h.stats.reads.load(Ordering::SeqCst), 3);
    assert_eq!(h.stats.releases.load(Ordering::SeqCst), 0);
}
