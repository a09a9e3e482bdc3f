//! Splitting encoded readouts into radio-sized frames.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::encoding::FIELD_SEPARATOR;
use crate::error::{BridgeError, Result};

/// Largest frame the downstream mesh accepts once the node name is added.
pub const DEFAULT_FRAME_LIMIT: usize = 230;

/// Maximum frame payload in bytes, excluding the line terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLimit(usize);

impl FrameLimit {
    pub fn new(bytes: usize) -> Result<Self> {
        if bytes == 0 {
            return Err(BridgeError::invalid_config(
                "max_frame_len",
                "frame limit must be at least one byte",
            ));
        }
        Ok(Self(bytes))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for FrameLimit {
    fn default() -> Self {
        Self(DEFAULT_FRAME_LIMIT)
    }
}

/// Where frames may be cut.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChunkPolicy {
    /// Cut at fixed byte offsets; a field may straddle two frames.
    #[default]
    Blind,
    /// Cut before the last field separator that fits. Fields longer than the
    /// limit are still cut blindly.
    FieldBoundary,
}

impl fmt::Display for ChunkPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkPolicy::Blind => write!(f, "blind"),
            ChunkPolicy::FieldBoundary => write!(f, "field-boundary"),
        }
    }
}

/// Split `text` into consecutive frames of at most `limit` bytes.
///
/// Concatenating the frames always yields `text`. Empty input produces one
/// empty frame so every record is transmitted as at least one line.
pub fn chunk(text: &str, limit: FrameLimit, policy: ChunkPolicy) -> Result<Vec<String>> {
    let limit = limit.get();
    let mut frames = Vec::with_capacity(text.len() / limit + 1);
    let mut rest = text;

    while !rest.is_empty() {
        if rest.len() <= limit {
            frames.push(rest.to_string());
            break;
        }
        let cut = match policy {
            ChunkPolicy::Blind => char_boundary_at_or_before(rest, limit),
            ChunkPolicy::FieldBoundary => last_separator_within(rest, limit)
                .unwrap_or_else(|| char_boundary_at_or_before(rest, limit)),
        };
        if cut == 0 {
            return Err(BridgeError::invalid_config(
                "max_frame_len",
                format!("{limit} bytes cannot hold a single character of the payload"),
            ));
        }
        let (head, tail) = rest.split_at(cut);
        frames.push(head.to_string());
        rest = tail;
    }

    if frames.is_empty() {
        frames.push(String::new());
    }
    Ok(frames)
}

fn char_boundary_at_or_before(text: &str, index: usize) -> usize {
    let mut idx = index.min(text.len());
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Offset of the last separator that leaves a non-empty frame of at most
/// `limit` bytes in front of it. Requires `text.len() > limit`.
fn last_separator_within(text: &str, limit: usize) -> Option<usize> {
    let sep = FIELD_SEPARATOR as u8;
    text.as_bytes()[1..=limit]
        .iter()
        .rposition(|&b| b == sep)
        .map(|pos| pos + 1)
}
