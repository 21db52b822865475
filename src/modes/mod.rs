//! Interaction modes driven by the mapped gaze point

mod bubbles;
mod cursor;

pub use bubbles::{BubbleEvent, BubbleGame, BubbleState, FrameStart, GazeObservation};
pub use cursor::CursorMode;
