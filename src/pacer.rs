//! Frame transmission with inter-frame pacing.
//!
//! The radio gateway ingests slowly and has no flow control, so consecutive
//! frames of one readout are separated by a fixed blocking delay. There is no
//! retry: the first failed write aborts the send and the error propagates.

use std::io::Write;
use std::time::Duration;

use tracing::info;

use crate::clock::Sleeper;
use crate::error::{BridgeError, Result};

/// Terminator appended to every frame on the wire.
pub const LINE_TERMINATOR: &str = "\r\n";

/// Default gap between frames of the same readout.
pub const DEFAULT_FRAME_DELAY: Duration = Duration::from_secs(2);

pub struct FramePacer<W, S> {
    writer: W,
    sleeper: S,
    delay: Duration,
    frames_sent: u64,
}

impl<W: Write, S: Sleeper> FramePacer<W, S> {
    pub fn new(writer: W, sleeper: S, delay: Duration) -> Self {
        Self {
            writer,
            sleeper,
            delay,
            frames_sent: 0,
        }
    }

    /// Write each frame as one terminated line, sleeping between frames but
    /// not after the last one.
    pub fn send<F: AsRef<str>>(&mut self, frames: &[F]) -> Result<()> {
        for (idx, frame) in frames.iter().enumerate() {
            if idx > 0 {
                self.sleeper.sleep(self.delay);
            }
            self.write_frame(frame.as_ref())?;
        }
        Ok(())
    }

    /// Write a single line immediately, without pacing.
    pub fn send_line(&mut self, line: &str) -> Result<()> {
        self.write_frame(line)
    }

    fn write_frame(&mut self, frame: &str) -> Result<()> {
        let mut message = String::with_capacity(frame.len() + LINE_TERMINATOR.len());
        message.push_str(frame);
        message.push_str(LINE_TERMINATOR);
        self.writer
            .write_all(message.as_bytes())
            .and_then(|_| self.writer.flush())
            .map_err(BridgeError::Transport)?;
        self.frames_sent += 1;
        info!(frame = %frame, bytes = message.len(), "frame sent");
        Ok(())
    }

    /// Block on the pacer's clock, for callers polling between sends.
    pub fn pause(&mut self, duration: Duration) {
        self.sleeper.sleep(duration);
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    pub fn into_parts(self) -> (W, S) {
        (self.writer, self.sleeper)
    }
}
