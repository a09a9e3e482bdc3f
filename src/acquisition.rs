//! Reader-driven acquisition loops.
//!
//! [`AcquisitionLoop`] walks the readout state machine one transition per
//! [`AcquisitionLoop::step`]:
//!
//! ```text
//! Idle --poll=true--> CardPresent --> Reading --read ok, beep--> Acknowledged
//!  ^                                     |                           |
//!  |                               read failed                  encode, chunk,
//!  |                                     v                       send frames
//!  +------------------------------------ Idle                        v
//!  +-------------------poll=false------------------------------ AwaitingRemoval
//! ```
//!
//! Everything is sequential: a readout's frames are fully written before the
//! reader is polled again, so records go out in read order and a slow radio
//! holds back acquisition instead of dropping cards.

use std::io::Write;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::chunking::{ChunkPolicy, FrameLimit, chunk};
use crate::clock::Sleeper;
use crate::encoding::{encode_autosend, encode_record};
use crate::error::Result;
use crate::pacer::FramePacer;
use crate::reader::{CardReader, PunchSource};
use crate::record::CardRecord;

/// Default interval between reader polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionState {
    Idle,
    CardPresent,
    Reading,
    Acknowledged(CardRecord),
    AwaitingRemoval,
}

/// Counters kept across the lifetime of a loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcquisitionStats {
    pub records_sent: u64,
    pub frames_sent: u64,
    pub read_failures: u64,
}

/// How readouts are framed and paced.
#[derive(Debug, Clone, Copy)]
pub struct FramingOptions {
    pub limit: FrameLimit,
    pub policy: ChunkPolicy,
    pub poll_interval: Duration,
}

impl Default for FramingOptions {
    fn default() -> Self {
        Self {
            limit: FrameLimit::default(),
            policy: ChunkPolicy::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Callback handed each encoded record once all of its frames are written.
pub type Echo = Box<dyn FnMut(&str)>;

pub struct AcquisitionLoop<R, W, S> {
    reader: R,
    pacer: FramePacer<W, S>,
    options: FramingOptions,
    state: AcquisitionState,
    stats: AcquisitionStats,
    echo: Option<Echo>,
}

impl<R, W, S> AcquisitionLoop<R, W, S>
where
    R: CardReader,
    W: Write,
    S: Sleeper,
{
    pub fn new(reader: R, pacer: FramePacer<W, S>, options: FramingOptions) -> Self {
        Self {
            reader,
            pacer,
            options,
            state: AcquisitionState::Idle,
            stats: AcquisitionStats::default(),
            echo: None,
        }
    }

    /// Report every sent record to `echo` (the operator console in the CLI).
    pub fn with_echo(mut self, echo: impl FnMut(&str) + 'static) -> Self {
        self.echo = Some(Box::new(echo));
        self
    }

    pub fn state(&self) -> &AcquisitionState {
        &self.state
    }

    pub fn stats(&self) -> AcquisitionStats {
        self.stats
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn pacer(&self) -> &FramePacer<W, S> {
        &self.pacer
    }

    /// Perform one transition. Read failures are absorbed here; transport
    /// and reader I/O errors are returned and end the loop.
    pub fn step(&mut self) -> Result<()> {
        let state = std::mem::replace(&mut self.state, AcquisitionState::Idle);
        self.state = match state {
            AcquisitionState::Idle => {
                if self.reader.poll()? {
                    debug!("card inserted");
                    AcquisitionState::CardPresent
                } else {
                    self.wait_poll_interval();
                    AcquisitionState::Idle
                }
            }
            AcquisitionState::CardPresent => AcquisitionState::Reading,
            AcquisitionState::Reading => match self.reader.read() {
                Ok(record) => {
                    self.reader.acknowledge()?;
                    debug!(card = record.card_id, "card read and acknowledged");
                    AcquisitionState::Acknowledged(record)
                }
                Err(err) if err.is_recoverable() => {
                    self.stats.read_failures += 1;
                    warn!(error = %err, "card read failed, waiting for next card");
                    AcquisitionState::Idle
                }
                Err(err) => return Err(err),
            },
            AcquisitionState::Acknowledged(record) => {
                self.transmit(&record)?;
                AcquisitionState::AwaitingRemoval
            }
            AcquisitionState::AwaitingRemoval => {
                if self.reader.poll()? {
                    self.wait_poll_interval();
                    AcquisitionState::AwaitingRemoval
                } else {
                    AcquisitionState::Idle
                }
            }
        };
        Ok(())
    }

    /// Step until the reader is exhausted. A hardware reader never is, so
    /// this only returns on error in production.
    pub fn run(&mut self) -> Result<AcquisitionStats> {
        loop {
            if self.state == AcquisitionState::Idle && self.reader.is_exhausted() {
                info!(
                    records = self.stats.records_sent,
                    frames = self.stats.frames_sent,
                    read_failures = self.stats.read_failures,
                    "card source exhausted"
                );
                return Ok(self.stats);
            }
            self.step()?;
        }
    }

    fn transmit(&mut self, record: &CardRecord) -> Result<()> {
        let encoded = encode_record(record);
        let frames = chunk(&encoded, self.options.limit, self.options.policy)?;
        self.pacer.send(&frames)?;
        self.stats.records_sent += 1;
        self.stats.frames_sent += frames.len() as u64;
        info!(card = record.card_id, frames = frames.len(), readout = %encoded, "readout sent");
        if let Some(echo) = self.echo.as_mut() {
            echo(&encoded);
        }
        Ok(())
    }

    fn wait_poll_interval(&mut self) {
        self.pacer.pause(self.options.poll_interval);
    }
}

/// Forward every autosend punch as one unpaced, unchunked line, handing
/// each written line to `echo`.
pub fn relay_autosend<P, W, S>(
    source: &mut P,
    pacer: &mut FramePacer<W, S>,
    mut echo: impl FnMut(&str),
) -> Result<u64>
where
    P: PunchSource,
    W: Write,
    S: Sleeper,
{
    let mut relayed = 0u64;
    while let Some(punch) = source.next_punch()? {
        let line = encode_autosend(&punch);
        pacer.send_line(&line)?;
        echo(&line);
        relayed += 1;
    }
    info!(punches = relayed, "punch source ended");
    Ok(relayed)
}
