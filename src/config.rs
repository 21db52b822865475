//! Session configuration
//!
//! Defaults are the demo's tuned constants. A TOML file named by
//! `GAZE_POP_CONFIG` can override any of them, and a handful of environment
//! variables override the file.

use crate::error::{GazeError, Result};
use crate::types::{CalibrationData, ScreenSize};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

pub const CONFIG_PATH_ENV: &str = "GAZE_POP_CONFIG";
pub const MODE_ENV: &str = "GAZE_POP_MODE";
pub const UDP_ADDR_ENV: &str = "GAZE_POP_UDP_ADDR";
pub const AUTO_CONFIRM_ENV: &str = "GAZE_POP_AUTO_CONFIRM";

/// Which interaction mode runs after calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Cursor,
    Bubbles,
}

impl Mode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cursor" => Some(Self::Cursor),
            "bubbles" | "bubble" => Some(Self::Bubbles),
            _ => None,
        }
    }
}

/// Configuration for a gaze session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeConfig {
    /// Camera device index
    pub camera_index: i32,
    /// Screen size used when the display cannot report one
    pub screen: ScreenSize,
    /// Frame pacing; 0 disables pacing
    pub target_fps: u32,
    /// Mapped points averaged by the position mapper
    pub max_positions: usize,
    /// Calibration targets on each screen edge
    pub points_per_edge: usize,
    /// Bubbles in one game of bubble mode
    pub bubble_count: u32,
    pub bubble_radius: f64,
    /// Minimum distance of a spawned bubble center from any edge
    pub spawn_margin: u32,
    pub vertical_smoothing: f64,
    pub horizontal_smoothing: f64,
    pub mode: Mode,
    /// Listen for detector readings on this UDP address instead of simulating
    pub udp_addr: Option<SocketAddr>,
    /// Confirm every calibration target automatically
    pub auto_confirm: bool,
    /// Pre-existing calibration; skips the procedure when present
    pub calibration: Option<CalibrationData>,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            screen: ScreenSize::new(1920, 1080),
            target_fps: 30,
            max_positions: 3,
            points_per_edge: 5,
            bubble_count: 20,
            bubble_radius: 50.0,
            spawn_margin: 50,
            vertical_smoothing: 0.020,
            horizontal_smoothing: 0.030,
            mode: Mode::Bubbles,
            udp_addr: None,
            auto_confirm: false,
            calibration: None,
        }
    }
}

impl GazeConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: GazeConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading configuration from {}", path.display());
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// File named by `GAZE_POP_CONFIG` (or defaults), then env overrides
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load(path)?,
            Err(_) => Self::default(),
        };

        if let Ok(raw) = std::env::var(MODE_ENV) {
            config.mode = Mode::from_str(&raw)
                .ok_or_else(|| GazeError::InvalidConfig(format!("{MODE_ENV}={raw} is not cursor|bubbles")))?;
        }
        if let Ok(raw) = std::env::var(UDP_ADDR_ENV) {
            let addr = raw
                .parse::<SocketAddr>()
                .map_err(|e| GazeError::InvalidConfig(format!("{UDP_ADDR_ENV}={raw}: {e}")))?;
            config.udp_addr = Some(addr);
        }
        if let Ok(raw) = std::env::var(AUTO_CONFIRM_ENV) {
            config.auto_confirm = matches!(raw.trim(), "1" | "true" | "yes");
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_positions == 0 {
            return Err(GazeError::InvalidConfig("max_positions must be at least 1".into()));
        }
        if self.points_per_edge == 0 {
            return Err(GazeError::InvalidConfig("points_per_edge must be at least 1".into()));
        }
        let margin = self.spawn_margin as u64 * 2;
        if margin > self.screen.width as u64 || margin > self.screen.height as u64 {
            return Err(GazeError::InvalidConfig(format!(
                "spawn_margin {} does not fit a {}x{} screen",
                self.spawn_margin, self.screen.width, self.screen.height
            )));
        }
        if !(self.bubble_radius > 0.0) {
            return Err(GazeError::InvalidConfig("bubble_radius must be positive".into()));
        }
        if let Some(cal) = &self.calibration {
            cal.validate()?;
        }
        Ok(())
    }
}
