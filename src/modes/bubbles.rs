use crate::types::{ScreenPoint, ScreenSize};
use rand::Rng;

/// Game state between frames
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BubbleState {
    NoActiveBubble,
    Active { center: ScreenPoint },
}

/// Outcome of the hit check that opens every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStart {
    /// The bubble was popped; `number` counts from 1
    Hit { number: u32 },
    /// No hit; track gaze if a sample is available
    Continue,
    Finished,
}

/// What one full frame of the game produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BubbleEvent {
    Hit { number: u32 },
    Tracking { on_bubble: bool },
    /// No pupils this frame; the previous on-bubble flag is kept
    NoSample,
    Finished,
}

/// One frame's input to the game
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeObservation {
    /// Mapped gaze point, `None` when pupils were lost
    pub gaze: Option<ScreenPoint>,
    pub blinking: bool,
}

/// Pop-the-bubble by gaze.
///
/// A bubble pops when the gaze was on it during the previous tracked frame
/// and the current frame reports a blink or loses the pupils. Blinking
/// while not on the bubble does nothing.
#[derive(Debug)]
pub struct BubbleGame<R> {
    rng: R,
    screen: ScreenSize,
    total: u32,
    remaining: u32,
    radius: f64,
    margin: u32,
    state: BubbleState,
    gaze_on_bubble: bool,
}

impl<R: Rng> BubbleGame<R> {
    pub fn new(rng: R, screen: ScreenSize, total: u32, radius: f64, margin: u32) -> Self {
        Self {
            rng,
            screen,
            total,
            remaining: total,
            radius,
            margin,
            state: BubbleState::NoActiveBubble,
            gaze_on_bubble: false,
        }
    }

    pub fn state(&self) -> BubbleState {
        self.state
    }

    pub fn bubble(&self) -> Option<ScreenPoint> {
        match self.state {
            BubbleState::Active { center } => Some(center),
            BubbleState::NoActiveBubble => None,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn gaze_on_bubble(&self) -> bool {
        self.gaze_on_bubble
    }

    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }

    fn spawn(&mut self) -> ScreenPoint {
        let x = self.rng.gen_range(self.margin..=self.screen.width.saturating_sub(self.margin).max(self.margin));
        let y = self.rng.gen_range(self.margin..=self.screen.height.saturating_sub(self.margin).max(self.margin));
        let center = ScreenPoint::new(x as f64, y as f64);
        log::debug!("Spawned bubble at ({}, {})", x, y);
        center
    }

    /// Spawn a bubble if none is active, then run the hit check.
    pub fn begin_frame(&mut self, blinking: bool, pupils_found: bool) -> FrameStart {
        if self.is_finished() {
            return FrameStart::Finished;
        }
        if self.state == BubbleState::NoActiveBubble {
            let center = self.spawn();
            self.state = BubbleState::Active { center };
        }

        if self.gaze_on_bubble && (blinking || !pupils_found) {
            let number = self.total - self.remaining + 1;
            log::info!("Bubble {} hit!", number);
            self.remaining -= 1;
            self.state = BubbleState::NoActiveBubble;
            self.gaze_on_bubble = false;
            return FrameStart::Hit { number };
        }
        FrameStart::Continue
    }

    /// Record where the gaze landed this frame; returns whether it is on the bubble
    pub fn track(&mut self, gaze: ScreenPoint) -> bool {
        self.gaze_on_bubble = self
            .bubble()
            .is_some_and(|center| gaze.distance_to(center) <= self.radius);
        self.gaze_on_bubble
    }

    /// Run a whole frame from an already-mapped observation
    pub fn update(&mut self, obs: GazeObservation) -> BubbleEvent {
        match self.begin_frame(obs.blinking, obs.gaze.is_some()) {
            FrameStart::Finished => BubbleEvent::Finished,
            FrameStart::Hit { number } => BubbleEvent::Hit { number },
            FrameStart::Continue => match obs.gaze {
                Some(gaze) => BubbleEvent::Tracking { on_bubble: self.track(gaze) },
                None => BubbleEvent::NoSample,
            },
        }
    }
}
