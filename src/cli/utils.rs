//! Convenience helpers shared across command handlers.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use punchrelay::{BridgeConfig, discover_reader_port};
use tracing::info;

/// Resolve plain-text input for commands that accept either inline strings or files.
pub fn read_text_arg(text: Option<String>, from: Option<PathBuf>) -> Result<String> {
    if let Some(t) = text {
        return Ok(t);
    }
    if let Some(path) = from {
        if path.as_os_str() == "-" {
            return read_stdin();
        }
        return std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()));
    }
    read_stdin()
}

/// Read the entire stdin stream into memory.
pub fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read from stdin")?;
    Ok(buffer)
}

/// Open the radio link, or stdout when the port is `-`.
pub fn open_output(config: &BridgeConfig) -> Result<Box<dyn Write>> {
    if config.output_port == "-" {
        return Ok(Box::new(io::stdout()));
    }
    let port = config
        .output_settings()?
        .open()
        .context("failed to open radio serial port")?;
    Ok(Box::new(port))
}

/// Open the reader input: a replay file (`-` for stdin), an explicit serial
/// port, or the first discovered reader.
pub fn open_reader_input(
    port: Option<&str>,
    replay: Option<&Path>,
    config: &BridgeConfig,
) -> Result<Box<dyn BufRead>> {
    if let Some(path) = replay {
        if path.as_os_str() == "-" {
            return Ok(Box::new(BufReader::new(io::stdin())));
        }
        let file = File::open(path)
            .with_context(|| format!("failed to open replay file {}", path.display()))?;
        info!(path = %path.display(), "replaying card source");
        return Ok(Box::new(BufReader::new(file)));
    }
    let port = match port {
        Some(port) => port.to_string(),
        None => discover_reader_port().context(
            "failed to connect to a card reader on any of the available serial ports",
        )?,
    };
    let serial = config
        .reader_settings(&port)?
        .open()
        .with_context(|| format!("failed to connect to card reader on {port}"))?;
    info!(port = %port, "connected to card reader");
    Ok(Box::new(BufReader::new(serial)))
}

/// Whether sent records may be echoed on stdout: not when stdout is the link.
pub fn echo_enabled(config: &BridgeConfig) -> bool {
    config.output_port != "-"
}

/// Operator echo of each sent line, or a no-op when stdout carries frames.
pub fn console_echo(config: &BridgeConfig) -> impl FnMut(&str) + 'static {
    let enabled = echo_enabled(config);
    move |line: &str| {
        if enabled {
            println!("{line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_is_off_when_frames_go_to_stdout() {
        let stdout_link = BridgeConfig {
            output_port: "-".to_string(),
            ..BridgeConfig::default()
        };
        assert!(!echo_enabled(&stdout_link));
        assert!(echo_enabled(&BridgeConfig::default()));
    }
}
