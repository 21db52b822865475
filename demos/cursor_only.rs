//! Demo: gaze cursor over simulated pupils with a fixed calibration

use anyhow::Result;
use gaze_pop::display::HeadlessDisplay;
use gaze_pop::input::{ChannelInput, InputEvent};
use gaze_pop::vision::{SimulatedDetector, SyntheticCamera};
use gaze_pop::{CalibrationData, GazeConfig, GazeSession, SessionParts};

fn main() -> Result<()> {
    env_logger::init();

    let detector = SimulatedDetector::new();
    let (lo, hi) = detector.range();
    let config = GazeConfig {
        // Pupil x grows when looking left, so the high end is `left`.
        calibration: Some(CalibrationData::new(lo.y, hi.x, lo.x, hi.y)),
        ..GazeConfig::default()
    };

    let input = ChannelInput::new();
    let quit = input.sender();
    ctrlc::set_handler(move || {
        let _ = quit.send(InputEvent::Quit);
    })?;

    let parts = SessionParts {
        camera: Box::new(SyntheticCamera::new(640, 480)),
        detector: Box::new(detector),
        display: Box::new(HeadlessDisplay::new(config.screen)),
        input: Box::new(input),
    };
    let mut session = GazeSession::new(config, parts)?;

    println!("Cursor running on simulated pupils, Ctrl+C to stop (RUST_LOG=trace shows every frame)");
    let outcome = session.run_cursor_mode()?;
    println!("Stopped: {:?}", outcome);
    Ok(())
}
