//! Shared clap helper types for CLI commands.

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use punchrelay::{BridgeConfig, ChunkPolicy};

/// Chunk policy flag values.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ChunkPolicyArg {
    Blind,
    #[value(name = "field-boundary")]
    FieldBoundary,
}

impl From<ChunkPolicyArg> for ChunkPolicy {
    fn from(value: ChunkPolicyArg) -> ChunkPolicy {
        match value {
            ChunkPolicyArg::Blind => ChunkPolicy::Blind,
            ChunkPolicyArg::FieldBoundary => ChunkPolicy::FieldBoundary,
        }
    }
}

/// Radio-link flags shared by commands that transmit.
#[derive(Args, Debug, Clone, Default)]
pub struct LinkArgs {
    /// Serial device of the radio module (`-` for stdout).
    #[arg(long, short = 'o')]
    pub output: Option<String>,
    /// Radio UART baud rate.
    #[arg(long)]
    pub baud: Option<u32>,
    /// Maximum frame payload in bytes.
    #[arg(long = "max-frame")]
    pub max_frame: Option<usize>,
    /// Delay between frames of one readout, in milliseconds.
    #[arg(long = "frame-delay-ms")]
    pub frame_delay_ms: Option<u64>,
    /// Reader poll interval, in milliseconds.
    #[arg(long = "poll-interval-ms")]
    pub poll_interval_ms: Option<u64>,
    /// Where frames may be cut.
    #[arg(long, value_enum)]
    pub policy: Option<ChunkPolicyArg>,
}

/// Load the config file (if any), apply flag overrides and validate once.
pub fn resolve_config(path: Option<&Path>, link: &LinkArgs) -> Result<BridgeConfig> {
    let mut config = match path {
        Some(path) => BridgeConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => BridgeConfig::default(),
    };
    if let Some(output) = &link.output {
        config.output_port = output.clone();
    }
    if let Some(baud) = link.baud {
        config.baud_rate = baud;
    }
    if let Some(max_frame) = link.max_frame {
        config.max_frame_len = max_frame;
    }
    if let Some(delay) = link.frame_delay_ms {
        config.frame_delay_ms = delay;
    }
    if let Some(interval) = link.poll_interval_ms {
        config.poll_interval_ms = interval;
    }
    if let Some(policy) = link.policy {
        config.chunk_policy = policy.into();
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}
