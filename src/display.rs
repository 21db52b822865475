//! Render seam
//!
//! Drawing circles and text is the caller's business; the session only emits
//! draw calls through [`Display`].

use crate::types::{Color, ScreenPoint, ScreenSize};
use crate::vision::Frame;

pub trait Display {
    fn size(&self) -> ScreenSize;
    fn clear(&mut self, color: Color);
    fn draw_circle(&mut self, center: ScreenPoint, radius: f64, color: Color);
    fn draw_text(&mut self, text: &str);
    /// Detector diagnostics, shown beside the main surface
    fn show_annotated(&mut self, _frame: &Frame) {}
    fn present(&mut self);
}

impl<T: Display + ?Sized> Display for Box<T> {
    fn size(&self) -> ScreenSize {
        (**self).size()
    }

    fn clear(&mut self, color: Color) {
        (**self).clear(color)
    }

    fn draw_circle(&mut self, center: ScreenPoint, radius: f64, color: Color) {
        (**self).draw_circle(center, radius, color)
    }

    fn draw_text(&mut self, text: &str) {
        (**self).draw_text(text)
    }

    fn show_annotated(&mut self, frame: &Frame) {
        (**self).show_annotated(frame)
    }

    fn present(&mut self) {
        (**self).present()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Circle { center: ScreenPoint, radius: f64, color: Color },
    Text(String),
}

/// Display without a window; keeps the last presented frame's commands
#[derive(Debug)]
pub struct HeadlessDisplay {
    size: ScreenSize,
    pending: Vec<DrawCommand>,
    presented: Vec<DrawCommand>,
    frames: u64,
    last_annotated: Option<u64>,
}

impl HeadlessDisplay {
    pub fn new(size: ScreenSize) -> Self {
        Self {
            size,
            pending: Vec::new(),
            presented: Vec::new(),
            frames: 0,
            last_annotated: None,
        }
    }

    /// Commands of the most recently presented frame
    pub fn presented(&self) -> &[DrawCommand] {
        &self.presented
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames
    }

    /// Sequence number of the last annotated camera frame shown
    pub fn last_annotated(&self) -> Option<u64> {
        self.last_annotated
    }

    pub fn circles(&self) -> impl Iterator<Item = (ScreenPoint, f64, Color)> + '_ {
        self.presented.iter().filter_map(|c| match c {
            DrawCommand::Circle { center, radius, color } => Some((*center, *radius, *color)),
            _ => None,
        })
    }
}

impl Display for HeadlessDisplay {
    fn size(&self) -> ScreenSize {
        self.size
    }

    fn clear(&mut self, color: Color) {
        self.pending.clear();
        self.pending.push(DrawCommand::Clear(color));
    }

    fn draw_circle(&mut self, center: ScreenPoint, radius: f64, color: Color) {
        self.pending.push(DrawCommand::Circle { center, radius, color });
    }

    fn draw_text(&mut self, text: &str) {
        self.pending.push(DrawCommand::Text(text.to_string()));
    }

    fn show_annotated(&mut self, frame: &Frame) {
        self.last_annotated = Some(frame.sequence);
    }

    fn present(&mut self) {
        self.frames += 1;
        self.presented = std::mem::take(&mut self.pending);
        log::trace!("frame {}: {:?}", self.frames, self.presented);
    }
}
