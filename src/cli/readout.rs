//! Full card readout relay (`punchrelay readout`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use punchrelay::{AcquisitionLoop, FramePacer, JsonLinesReader, ThreadSleeper};

use crate::cli::common::{LinkArgs, resolve_config};
use crate::cli::utils::{console_echo, open_output, open_reader_input};

/// Arguments for `punchrelay readout`.
#[derive(Args, Debug)]
pub struct ReadoutArgs {
    /// Serial port carrying the station gateway's JSON-lines readouts. When
    /// omitted, the first SPORTident USB port is used and must be fed by the gateway.
    pub port: Option<String>,
    /// Replay readouts from a JSON-lines file instead of a reader (`-` for stdin).
    #[arg(long, conflicts_with = "port")]
    pub replay: Option<PathBuf>,
    #[command(flatten)]
    pub link: LinkArgs,
}

/// Run the readout loop until the card source ends or a fatal error occurs.
pub fn handle(args: ReadoutArgs, config: Option<&Path>) -> Result<()> {
    let config = resolve_config(config, &args.link)?;
    let input = open_reader_input(args.port.as_deref(), args.replay.as_deref(), &config)?;
    let output = open_output(&config)?;

    let pacer = FramePacer::new(output, ThreadSleeper, config.frame_delay());
    let mut acquisition =
        AcquisitionLoop::new(JsonLinesReader::new(input), pacer, config.framing()?)
            .with_echo(console_echo(&config));
    let stats = acquisition.run().context("readout relay stopped")?;

    eprintln!(
        "Relayed {} readouts in {} frames ({} failed reads)",
        stats.records_sent, stats.frames_sent, stats.read_failures
    );
    Ok(())
}
