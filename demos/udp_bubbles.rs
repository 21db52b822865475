//! Demo: bubble game fed by an external detector over UDP
//!
//! Point a pupil detector at `127.0.0.1:7777`, one datagram per frame:
//! `lx=310 ly=235 rx=322 ry=236 blink=0`

use anyhow::{Context, Result};
use gaze_pop::display::HeadlessDisplay;
use gaze_pop::input::{AutoConfirm, ChannelInput, InputEvent};
use gaze_pop::vision::{SyntheticCamera, ThreadedCapture, UdpPupilDetector};
use gaze_pop::{GazeConfig, GazeSession, SessionOutcome, SessionParts};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = GazeConfig {
        bubble_count: 5,
        ..GazeConfig::default()
    };
    let detector = UdpPupilDetector::bind("127.0.0.1:7777".parse()?)
        .await
        .context("bind UDP listener")?;

    let input = ChannelInput::new();
    let quit = input.sender();
    ctrlc::set_handler(move || {
        let _ = quit.send(InputEvent::Quit);
    })?;

    let parts = SessionParts {
        camera: Box::new(ThreadedCapture::spawn(SyntheticCamera::new(640, 480).with_fps(30))?),
        detector: Box::new(detector),
        display: Box::new(HeadlessDisplay::new(config.screen)),
        // Confirm each calibration target as soon as a sample arrives.
        input: Box::new(AutoConfirm::new(input)),
    };
    let mut session = GazeSession::new(config, parts)?;

    let outcome = tokio::task::spawn_blocking(move || -> Result<SessionOutcome> {
        if session.run_calibration()? == SessionOutcome::Quit {
            return Ok(SessionOutcome::Quit);
        }
        session.smooth_calibration();
        let outcome = session.run_bubble_mode(5)?;
        session.shutdown();
        Ok(outcome)
    })
    .await??;

    println!("Game over: {:?}", outcome);
    Ok(())
}
