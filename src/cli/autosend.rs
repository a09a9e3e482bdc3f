//! Autosend punch relay (`punchrelay autosend`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use punchrelay::{FramePacer, JsonLinesReader, ThreadSleeper, relay_autosend};

use crate::cli::common::{LinkArgs, resolve_config};
use crate::cli::utils::{console_echo, open_output, open_reader_input};

/// Arguments for `punchrelay autosend`.
#[derive(Args, Debug)]
pub struct AutosendArgs {
    /// Serial port carrying the station gateway's JSON-lines punches. When
    /// omitted, the first SPORTident USB port is used and must be fed by the gateway.
    pub port: Option<String>,
    /// Replay punches from a JSON-lines file instead of a station (`-` for stdin).
    #[arg(long, conflicts_with = "port")]
    pub replay: Option<PathBuf>,
    #[command(flatten)]
    pub link: LinkArgs,
}

/// Forward punches one line at a time until the source ends.
pub fn handle(args: AutosendArgs, config: Option<&Path>) -> Result<()> {
    let config = resolve_config(config, &args.link)?;
    let mut source = JsonLinesReader::new(open_reader_input(
        args.port.as_deref(),
        args.replay.as_deref(),
        &config,
    )?);
    let mut pacer = FramePacer::new(open_output(&config)?, ThreadSleeper, config.frame_delay());

    let relayed = relay_autosend(&mut source, &mut pacer, console_echo(&config))
        .context("autosend relay stopped")?;
    eprintln!("Relayed {relayed} punches");
    Ok(())
}
