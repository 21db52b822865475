//! Input seam - confirmation and quit signals

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::io::BufRead;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// User is looking at the current calibration target
    Confirm,
    Quit,
}

/// Polled once per frame; must not block
pub trait InputSource {
    fn poll(&mut self) -> Vec<InputEvent>;
}

impl<T: InputSource + ?Sized> InputSource for Box<T> {
    fn poll(&mut self) -> Vec<InputEvent> {
        (**self).poll()
    }
}

/// Events delivered through a channel from other threads
pub struct ChannelInput {
    rx: Receiver<InputEvent>,
    tx: Sender<InputEvent>,
}

impl ChannelInput {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { rx, tx }
    }

    pub fn sender(&self) -> Sender<InputEvent> {
        self.tx.clone()
    }

    /// Send `Confirm` for every line read from stdin (press Enter)
    pub fn spawn_stdin_reader(&self) -> std::io::Result<()> {
        let tx = self.sender();
        std::thread::Builder::new().name("gaze-stdin".into()).spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let event = match line {
                    Ok(l) if l.trim().eq_ignore_ascii_case("q") => InputEvent::Quit,
                    Ok(_) => InputEvent::Confirm,
                    Err(_) => break,
                };
                if tx.send(event).is_err() {
                    break;
                }
            }
        })?;
        Ok(())
    }
}

impl Default for ChannelInput {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for ChannelInput {
    fn poll(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(e) => events.push(e),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }
}

/// Adds a `Confirm` to every poll of the wrapped source
pub struct AutoConfirm<I> {
    inner: I,
}

impl<I: InputSource> AutoConfirm<I> {
    pub fn new(inner: I) -> Self {
        Self { inner }
    }
}

impl<I: InputSource> InputSource for AutoConfirm<I> {
    fn poll(&mut self) -> Vec<InputEvent> {
        let mut events = self.inner.poll();
        events.push(InputEvent::Confirm);
        events
    }
}
