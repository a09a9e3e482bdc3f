//! Card-reader collaborators.
//!
//! The hardware driver lives outside this crate. The relay only needs the
//! poll / read / acknowledge surface of [`CardReader`] for full readouts and
//! the push surface of [`PunchSource`] for autosend stations.
//!
//! [`JsonLinesReader`] implements both over any [`BufRead`]: a replay file or
//! a serial port fed by a station gateway that emits one JSON object per line.

use std::io::{self, BufRead};

use tracing::{debug, warn};

use crate::error::{BridgeError, Result};
use crate::record::{AutosendPunch, CardRecord};

pub trait CardReader {
    /// True while a card sits in the reader.
    fn poll(&mut self) -> Result<bool>;

    /// Read the card currently present.
    fn read(&mut self) -> Result<CardRecord>;

    /// Signal a completed read to the competitor (beep).
    fn acknowledge(&mut self) -> Result<()>;

    /// A finite source reports exhaustion so the loop can stop.
    fn is_exhausted(&self) -> bool {
        false
    }
}

pub trait PunchSource {
    /// Next punch, `Ok(None)` when the source has ended.
    fn next_punch(&mut self) -> Result<Option<AutosendPunch>>;
}

/// JSON-lines adapter: each non-empty line is one card insertion (for
/// [`CardReader`]) or one punch (for [`PunchSource`]).
pub struct JsonLinesReader<R> {
    input: R,
    line: Vec<u8>,
    pending: Option<String>,
    present: bool,
    exhausted: bool,
    acknowledged: u64,
}

impl<R: BufRead> JsonLinesReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            line: Vec::new(),
            pending: None,
            present: false,
            exhausted: false,
            acknowledged: 0,
        }
    }

    pub fn acknowledged(&self) -> u64 {
        self.acknowledged
    }

    /// Next complete non-empty line. Read timeouts yield `Ok(None)` and keep
    /// any partial line for the next call.
    fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            match self.input.read_until(b'\n', &mut self.line) {
                Ok(0) => {
                    self.exhausted = true;
                    if self.line.is_empty() {
                        return Ok(None);
                    }
                }
                Ok(_) if !self.line.ends_with(b"\n") && !self.exhausted => continue,
                Ok(_) => {}
                Err(err)
                    if matches!(
                        err.kind(),
                        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
                    ) =>
                {
                    return Ok(None);
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(BridgeError::Transport(err)),
            }

            let raw = std::mem::take(&mut self.line);
            let text = String::from_utf8_lossy(&raw);
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_string()));
            }
            if self.exhausted {
                return Ok(None);
            }
        }
    }
}

impl<R: BufRead> CardReader for JsonLinesReader<R> {
    fn poll(&mut self) -> Result<bool> {
        if self.present {
            // A card that has been read is taken out before the next one.
            if self.pending.is_none() {
                self.present = false;
                debug!("card removed");
            }
            return Ok(self.present);
        }
        if self.exhausted {
            return Ok(false);
        }
        match self.next_line()? {
            Some(line) => {
                self.pending = Some(line);
                self.present = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn read(&mut self) -> Result<CardRecord> {
        let line = self
            .pending
            .take()
            .ok_or_else(|| BridgeError::read("no card present"))?;
        CardRecord::from_json(&line)
    }

    fn acknowledge(&mut self) -> Result<()> {
        self.acknowledged += 1;
        Ok(())
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted && !self.present
    }
}

impl<R: BufRead> PunchSource for JsonLinesReader<R> {
    fn next_punch(&mut self) -> Result<Option<AutosendPunch>> {
        loop {
            let Some(line) = self.next_line()? else {
                if self.exhausted {
                    return Ok(None);
                }
                continue;
            };
            match AutosendPunch::from_json(&line) {
                Ok(punch) => return Ok(Some(punch)),
                Err(err) => warn!(error = %err, line = %line, "skipping autosend line"),
            }
        }
    }
}
