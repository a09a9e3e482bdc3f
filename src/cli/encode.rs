//! Dry-run encoding (`punchrelay encode ...`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use punchrelay::{AutosendPunch, CardRecord, encode_autosend, frames_for_record};

use crate::cli::common::{LinkArgs, resolve_config};
use crate::cli::utils::read_text_arg;

/// Encode subcommands.
#[derive(Subcommand, Debug)]
pub enum EncodeCommand {
    /// Encode JSON readouts (one per line) into radio frames.
    Readout(EncodeReadoutArgs),
    /// Encode JSON autosend punches (one per line) into wire lines.
    Punch(EncodePunchArgs),
}

/// Arguments for `punchrelay encode readout`.
#[derive(Args, Debug)]
pub struct EncodeReadoutArgs {
    /// Inline JSON input (falls back to stdin if omitted).
    #[arg(long)]
    pub text: Option<String>,
    /// Read input from file (`-` for stdin).
    #[arg(long = "from")]
    pub from: Option<PathBuf>,
    #[command(flatten)]
    pub link: LinkArgs,
}

/// Arguments for `punchrelay encode punch`.
#[derive(Args, Debug)]
pub struct EncodePunchArgs {
    /// Inline JSON input (falls back to stdin if omitted).
    #[arg(long)]
    pub text: Option<String>,
    /// Read input from file (`-` for stdin).
    #[arg(long = "from")]
    pub from: Option<PathBuf>,
}

/// Execute an encode command.
pub fn handle(command: EncodeCommand, config: Option<&Path>) -> Result<()> {
    match command {
        EncodeCommand::Readout(args) => readout(args, config),
        EncodeCommand::Punch(args) => punch(args),
    }
}

fn readout(args: EncodeReadoutArgs, config: Option<&Path>) -> Result<()> {
    let config = resolve_config(config, &args.link)?;
    let framing = config.framing()?;
    let input = read_text_arg(args.text, args.from)?;
    for (idx, line) in non_empty_lines(&input) {
        let record = CardRecord::from_json(line)
            .with_context(|| format!("failed to parse readout on line {}", idx + 1))?;
        let frames = frames_for_record(&record, framing.limit, framing.policy)?;
        println!("card {} -> {} frame(s)", record.card_id, frames.len());
        for (n, frame) in frames.iter().enumerate() {
            println!("  [{:>2}] {:>3} bytes |{}|", n + 1, frame.len(), frame);
        }
    }
    Ok(())
}

fn punch(args: EncodePunchArgs) -> Result<()> {
    let input = read_text_arg(args.text, args.from)?;
    for (idx, line) in non_empty_lines(&input) {
        let punch = AutosendPunch::from_json(line)
            .with_context(|| format!("failed to parse punch on line {}", idx + 1))?;
        println!("{}", encode_autosend(&punch));
    }
    Ok(())
}

fn non_empty_lines(input: &str) -> impl Iterator<Item = (usize, &str)> {
    input
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}
