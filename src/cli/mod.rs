//! Command-line interface wiring for the `punchrelay` binary.
//!
//! This module owns the clap definitions and delegates execution to
//! submodules, one per command family.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod autosend;
pub mod common;
pub mod encode;
pub mod ports;
pub mod readout;
pub mod utils;

/// Parsed CLI entrypoint for the `punchrelay` binary.
#[derive(Parser, Debug)]
#[command(
    name = "punchrelay",
    version,
    about = "Relay timing-card readouts to a radio mesh over a serial link"
)]
pub struct Cli {
    /// JSON configuration file; flags override its values.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read full cards from a reader and transmit them in frames.
    Readout(readout::ReadoutArgs),
    /// Forward punches from a station in autosend mode.
    Autosend(autosend::AutosendArgs),
    /// Print what would be transmitted, without touching a serial port.
    #[command(subcommand)]
    Encode(encode::EncodeCommand),
    /// List serial ports and flag card readers.
    Ports,
}

/// Execute the requested command.
pub fn run(cli: Cli) -> Result<()> {
    let config = cli.config.as_deref();
    match cli.command {
        Command::Readout(args) => readout::handle(args, config),
        Command::Autosend(args) => autosend::handle(args, config),
        Command::Encode(cmd) => encode::handle(cmd, config),
        Command::Ports => ports::handle(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn port_help_states_the_gateway_feed() {
        let mut cli = Cli::command();
        for name in ["readout", "autosend"] {
            let sub = cli.find_subcommand_mut(name).unwrap();
            let port = sub
                .get_arguments()
                .find(|arg| arg.get_id() == "port")
                .unwrap();
            let help = port.get_long_help().or(port.get_help()).unwrap().to_string();
            assert!(help.contains("JSON-lines"), "{name}: {help}");
            assert!(help.contains("gateway"), "{name}: {help}");
        }
    }

    #[test]
    fn replay_conflicts_with_port() {
        let parsed =
            Cli::try_parse_from(["punchrelay", "readout", "/dev/ttyUSB0", "--replay", "x.jsonl"]);
        assert!(parsed.is_err());
    }
}
