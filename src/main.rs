//! gaze-pop
//!
//! Main entry point. This application:
//! - Captures video from the camera (synthetic frames without the `vision` feature)
//! - Reads pupil positions from an external detector (UDP) or a simulated one
//! - Calibrates the pupil range against the screen edges
//! - Runs the gaze cursor or the bubble game

use anyhow::{Context, Result};
use gaze_pop::display::HeadlessDisplay;
use gaze_pop::input::{AutoConfirm, ChannelInput, InputEvent, InputSource};
use gaze_pop::vision::{FrameSource, PupilDetector, SimulatedDetector, ThreadedCapture, UdpPupilDetector};
use gaze_pop::{GazeConfig, GazeSession, Mode, SessionOutcome, SessionParts};
use log::LevelFilter;

#[cfg(feature = "vision")]
fn open_camera(config: &GazeConfig) -> Result<Box<dyn FrameSource>> {
    let camera = gaze_pop::vision::OpenCvCamera::open(config.camera_index).context("Failed to open camera")?;
    Ok(Box::new(camera))
}

#[cfg(not(feature = "vision"))]
fn open_camera(config: &GazeConfig) -> Result<Box<dyn FrameSource>> {
    log::warn!("Vision feature not enabled, using synthetic frames");
    Ok(Box::new(gaze_pop::vision::SyntheticCamera::new(640, 480).with_fps(config.target_fps)))
}

async fn open_detector(config: &GazeConfig) -> Result<Box<dyn PupilDetector + Send>> {
    match config.udp_addr {
        Some(addr) => {
            let detector = UdpPupilDetector::bind(addr)
                .await
                .with_context(|| format!("Failed to bind UDP pupil listener on {addr}"))?;
            Ok(Box::new(detector))
        }
        None => {
            log::warn!("No detector address configured, using simulated pupils");
            Ok(Box::new(SimulatedDetector::new()))
        }
    }
}

fn run_session(mut session: GazeSession) -> Result<()> {
    if session.run_calibration()? == SessionOutcome::Quit {
        return Ok(());
    }
    session.smooth_calibration();
    log::info!("Calibration complete. Data: {:?}", session.calibration());

    let outcome = match session.config().mode {
        Mode::Cursor => session.run_cursor_mode()?,
        Mode::Bubbles => {
            let total = session.config().bubble_count;
            session.run_bubble_mode(total)?
        }
    };
    log::info!("Session ended: {:?}", outcome);
    session.shutdown();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Info)
        .init();

    log::info!("═══════════════════════════════════════");
    log::info!("  gaze-pop");
    log::info!("═══════════════════════════════════════");

    let config = GazeConfig::from_env().context("Invalid configuration")?;

    let camera = match open_camera(&config) {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to initialize camera: {:#}", e);
            log::error!("Make sure you have:");
            log::error!("  - A working camera (webcam) at index {}", config.camera_index);
            log::error!("  - OpenCV installed");
            return Err(e);
        }
    };
    let camera = ThreadedCapture::spawn(camera).context("Failed to start capture thread")?;
    let detector = open_detector(&config).await?;

    let channel = ChannelInput::new();
    channel.spawn_stdin_reader().context("Failed to read stdin")?;
    let quit_tx = channel.sender();
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal...");
        let _ = quit_tx.send(InputEvent::Quit);
    })?;
    let input: Box<dyn InputSource + Send> = if config.auto_confirm {
        Box::new(AutoConfirm::new(channel))
    } else {
        log::info!("Press Enter to confirm each calibration target, q + Enter or Ctrl+C to quit");
        Box::new(channel)
    };

    let parts = SessionParts {
        camera: Box::new(camera),
        detector,
        display: Box::new(HeadlessDisplay::new(config.screen)),
        input,
    };
    let session = GazeSession::new(config, parts)?;

    // The frame loop blocks on the camera; keep it off the async workers.
    tokio::task::spawn_blocking(move || run_session(session)).await??;

    log::info!("Goodbye!");
    Ok(())
}
