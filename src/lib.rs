//! Core library for relaying timing-card readouts over a radio serial link.

mod acquisition;
mod chunking;
mod clock;
mod config;
mod encoding;
mod error;
mod pacer;
mod reader;
mod record;
mod transport;

pub use acquisition::{
    AcquisitionLoop, AcquisitionState, AcquisitionStats, DEFAULT_POLL_INTERVAL, Echo,
    FramingOptions, relay_autosend,
};
pub use chunking::{ChunkPolicy, DEFAULT_FRAME_LIMIT, FrameLimit, chunk};
pub use clock::{RecordingSleeper, Sleeper, ThreadSleeper};
pub use config::BridgeConfig;
pub use encoding::{CARD_MARKER, FIELD_SEPARATOR, encode_autosend, encode_record, format_time};
pub use error::{BridgeError, Result};
pub use pacer::{DEFAULT_FRAME_DELAY, FramePacer, LINE_TERMINATOR};
pub use reader::{CardReader, JsonLinesReader, PunchSource};
pub use record::{AutosendPunch, CardRecord, Punch, SpecialEvent, SpecialTimes};
pub use transport::{
    PortInfo, RADIO_BAUD_RATE, READER_BAUD_RATE, SerialSettings, SettingsFields, discover_reader_port,
    list_ports,
};

/// Encode a readout and split it into frames ready for the pacer.
pub fn frames_for_record(
    record: &CardRecord,
    limit: FrameLimit,
    policy: ChunkPolicy,
) -> Result<Vec<String>> {
    chunk(&encode_record(record), limit, policy)
}
