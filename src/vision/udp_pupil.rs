use super::{DetectorReading, Frame, PupilDetector};
use crate::error::GazeError;
use crate::types::PixelPoint;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;

/// Readings older than this are treated as "no pupils found".
const MAX_READING_AGE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Deserialize)]
struct JsonPupilMsg {
    #[serde(default)]
    left: Option<[f64; 2]>,
    #[serde(default)]
    right: Option<[f64; 2]>,
    #[serde(default)]
    ratio: Option<f64>,
    #[serde(default)]
    blinking: bool,
}

/// Parse one detector datagram.
///
/// Accepts JSON (`{"left":[310,235],"right":[322,236],"ratio":0.48,"blinking":false}`)
/// or whitespace separated `k=v` tokens (`lx=310 ly=235 rx=322 ry=236 ratio=0.48 blink=0`).
/// A pupil with a missing or unparseable coordinate is reported as absent.
pub fn parse_pupil_message(msg: &str) -> Option<DetectorReading> {
    let msg = msg.trim();
    if msg.is_empty() {
        return None;
    }

    if msg.starts_with('{') {
        let j = serde_json::from_str::<JsonPupilMsg>(msg).ok()?;
        return Some(DetectorReading {
            left_pupil: j.left.map(|[x, y]| PixelPoint::new(x, y)),
            right_pupil: j.right.map(|[x, y]| PixelPoint::new(x, y)),
            horizontal_ratio: j.ratio,
            blinking: j.blinking,
        });
    }

    let mut lx: Option<f64> = None;
    let mut ly: Option<f64> = None;
    let mut rx: Option<f64> = None;
    let mut ry: Option<f64> = None;
    let mut ratio: Option<f64> = None;
    let mut blinking = false;

    for tok in msg.split_whitespace() {
        let (k, v) = tok.split_once('=')?;
        match k {
            "lx" => lx = v.parse().ok(),
            "ly" => ly = v.parse().ok(),
            "rx" => rx = v.parse().ok(),
            "ry" => ry = v.parse().ok(),
            "ratio" => ratio = v.parse().ok(),
            "blink" | "blinking" => blinking = matches!(v, "1" | "true"),
            _ => {}
        }
    }

    let pupil = |x: Option<f64>, y: Option<f64>| Some(PixelPoint::new(x?, y?));
    Some(DetectorReading {
        left_pupil: pupil(lx, ly),
        right_pupil: pupil(rx, ry),
        horizontal_ratio: ratio,
        blinking,
    })
}

type LatestReading = Arc<Mutex<Option<(DetectorReading, Instant)>>>;

/// Detector fed by an external process over UDP
pub struct UdpPupilDetector {
    latest: LatestReading,
    local_addr: SocketAddr,
}

impl UdpPupilDetector {
    /// Bind and start the listener task on the current tokio runtime
    pub async fn bind(bind_addr: SocketAddr) -> Result<Self, GazeError> {
        let sock = UdpSocket::bind(bind_addr).await?;
        let local_addr = sock.local_addr()?;
        log::info!("UDP pupil listener bound on {local_addr}");

        let latest: LatestReading = Arc::new(Mutex::new(None));
        let storage = Arc::clone(&latest);

        tokio::spawn(async move {
            let mut buf = [0u8; 2048];
            loop {
                let (len, _src) = match sock.recv_from(&mut buf).await {
                    Ok(v) => v,
                    Err(e) => {
                        log::warn!("UDP pupil recv error: {e}");
                        continue;
                    }
                };

                let Some(reading) = std::str::from_utf8(&buf[..len]).ok().and_then(parse_pupil_message) else {
                    log::debug!("Ignoring malformed pupil datagram ({len} bytes)");
                    continue;
                };
                if let Ok(mut slot) = storage.lock() {
                    *slot = Some((reading, Instant::now()));
                }
            }
        });

        Ok(Self { latest, local_addr })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Most recent reading, if it is fresh
    pub fn latest(&self) -> Option<DetectorReading> {
        let slot = self.latest.lock().ok()?;
        let (reading, at) = (*slot)?;
        (at.elapsed() <= MAX_READING_AGE).then_some(reading)
    }
}

impl PupilDetector for UdpPupilDetector {
    fn analyze(&mut self, _frame: &Frame) -> DetectorReading {
        self.latest().unwrap_or_default()
    }
}
