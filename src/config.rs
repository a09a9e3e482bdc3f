//! Runtime configuration.
//!
//! Values come from an optional JSON file, then CLI overrides, then a single
//! [`BridgeConfig::validate`] pass. Invalid values are rejected, never clamped.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::acquisition::FramingOptions;
use crate::chunking::{ChunkPolicy, DEFAULT_FRAME_LIMIT, FrameLimit};
use crate::error::{BridgeError, Result};
use crate::transport::{RADIO_BAUD_RATE, READER_BAUD_RATE, SerialSettings, SettingsFields};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Serial device wired to the radio module.
    pub output_port: String,
    pub baud_rate: u32,
    pub reader_baud_rate: u32,
    pub max_frame_len: usize,
    pub frame_delay_ms: u64,
    pub poll_interval_ms: u64,
    pub chunk_policy: ChunkPolicy,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            output_port: "/dev/ttyS1".to_string(),
            baud_rate: RADIO_BAUD_RATE,
            reader_baud_rate: READER_BAUD_RATE,
            max_frame_len: DEFAULT_FRAME_LIMIT,
            frame_delay_ms: 2_000,
            poll_interval_ms: 1_000,
            chunk_policy: ChunkPolicy::Blind,
        }
    }
}

impl BridgeConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|err| {
            BridgeError::invalid_config("config", format!("cannot read {}: {err}", path.display()))
        })?;
        let config: BridgeConfig = serde_json::from_str(&raw).map_err(|err| {
            BridgeError::invalid_config("config", format!("cannot parse {}: {err}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        FrameLimit::new(self.max_frame_len)?;
        self.output_settings()?;
        if self.reader_baud_rate == 0 {
            return Err(BridgeError::invalid_config(
                "reader_baud_rate",
                "baud rate must be positive",
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(BridgeError::invalid_config(
                "poll_interval_ms",
                "poll interval must be positive",
            ));
        }
        Ok(())
    }

    pub fn framing(&self) -> Result<FramingOptions> {
        Ok(FramingOptions {
            limit: FrameLimit::new(self.max_frame_len)?,
            policy: self.chunk_policy,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        })
    }

    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.frame_delay_ms)
    }

    pub fn output_settings(&self) -> Result<SerialSettings> {
        SerialSettings::validated(self.output_port.clone(), self.baud_rate, SettingsFields::OUTPUT)
    }

    pub fn reader_settings(&self, port: &str) -> Result<SerialSettings> {
        SerialSettings::validated(port, self.reader_baud_rate, SettingsFields::READER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_radio_link() {
        let config = BridgeConfig::default();
        config.validate().unwrap();
        assert_eq!(config.baud_rate, 57_600);
        assert_eq!(config.max_frame_len, 230);
        assert_eq!(config.frame_delay(), Duration::from_secs(2));
        assert_eq!(config.framing().unwrap().poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: BridgeConfig =
            serde_json::from_str(r#"{"output_port":"/dev/ttyAMA0","chunk_policy":"field_boundary"}"#)
                .unwrap();
        assert_eq!(
            config,
            BridgeConfig {
                output_port: "/dev/ttyAMA0".to_string(),
                chunk_policy: ChunkPolicy::FieldBoundary,
                ..BridgeConfig::default()
            }
        );
    }

    #[test]
    fn zero_frame_length_is_rejected() {
        let config = BridgeConfig {
            max_frame_len: 0,
            ..BridgeConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_frame_len"));
    }

    #[test]
    fn empty_port_is_rejected() {
        let config = BridgeConfig {
            output_port: String::new(),
            ..BridgeConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            BridgeError::InvalidConfig { field: "output_port", .. }
        ));
    }

    #[test]
    fn zero_baud_rate_names_its_key() {
        let config = BridgeConfig {
            baud_rate: 0,
            ..BridgeConfig::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("baud_rate"));
        let err = BridgeConfig::default().reader_settings("").unwrap_err();
        assert!(err.to_string().contains("reader_port"));
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let config = BridgeConfig {
            poll_interval_ms: 0,
            ..BridgeConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(serde_json::from_str::<BridgeConfig>(r#"{"max_frame":10}"#).is_err());
    }
}
