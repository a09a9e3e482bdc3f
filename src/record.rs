use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};

/// Named timing events stored on a card, in transmission order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SpecialEvent {
    Start,
    Finish,
    Check,
    Clear,
}

impl SpecialEvent {
    /// Fixed field order used by the encoder.
    pub const ALL: [SpecialEvent; 4] = [
        SpecialEvent::Start,
        SpecialEvent::Finish,
        SpecialEvent::Check,
        SpecialEvent::Clear,
    ];

    /// One-letter wire prefix (without the trailing `-`).
    pub fn prefix(self) -> char {
        match self {
            SpecialEvent::Start => 'S',
            SpecialEvent::Finish => 'F',
            SpecialEvent::Check => 'H',
            SpecialEvent::Clear => 'C',
        }
    }
}

/// Optional time-of-day for each [`SpecialEvent`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SpecialTimes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear: Option<NaiveTime>,
}

impl SpecialTimes {
    pub fn get(&self, event: SpecialEvent) -> Option<NaiveTime> {
        match event {
            SpecialEvent::Start => self.start,
            SpecialEvent::Finish => self.finish,
            SpecialEvent::Check => self.check,
            SpecialEvent::Clear => self.clear,
        }
    }

    pub fn set(&mut self, event: SpecialEvent, time: Option<NaiveTime>) {
        let slot = match event {
            SpecialEvent::Start => &mut self.start,
            SpecialEvent::Finish => &mut self.finish,
            SpecialEvent::Check => &mut self.check,
            SpecialEvent::Clear => &mut self.clear,
        };
        *slot = time;
    }

    /// Set events in [`SpecialEvent::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (SpecialEvent, NaiveTime)> + '_ {
        SpecialEvent::ALL
            .into_iter()
            .filter_map(|event| self.get(event).map(|time| (event, time)))
    }
}

/// A visit to a numbered control point. Punches without a time are kept
/// in the record but dropped by the encoder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Punch {
    pub code: u16,
    #[serde(default)]
    pub time: Option<NaiveTime>,
}

impl Punch {
    pub fn new(code: u16, time: Option<NaiveTime>) -> Self {
        Self { code, time }
    }
}

/// One full readout of a timing card.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardRecord {
    pub card_id: u32,
    #[serde(flatten)]
    pub special: SpecialTimes,
    #[serde(default)]
    pub punches: Vec<Punch>,
}

impl CardRecord {
    /// Empty readout for `card_id`; zero is not a valid card number.
    pub fn new(card_id: u32) -> Result<Self> {
        if card_id == 0 {
            return Err(BridgeError::InvalidRecord {
                reason: "card id must be positive".to_string(),
            });
        }
        Ok(Self {
            card_id,
            special: SpecialTimes::default(),
            punches: Vec::new(),
        })
    }

    pub fn with_event(mut self, event: SpecialEvent, time: NaiveTime) -> Self {
        self.special.set(event, Some(time));
        self
    }

    pub fn with_punch(mut self, code: u16, time: Option<NaiveTime>) -> Self {
        self.punches.push(Punch::new(code, time));
        self
    }

    /// Parse one JSON readout, as produced by the reader adapter.
    pub fn from_json(line: &str) -> Result<Self> {
        let record: CardRecord = serde_json::from_str(line)
            .map_err(|err| BridgeError::read(format!("malformed readout: {err}")))?;
        if record.card_id == 0 {
            return Err(BridgeError::read("readout carries card id 0"));
        }
        if let Some(index) = record.punches.iter().position(|punch| punch.code == 0) {
            return Err(BridgeError::read(format!(
                "readout punch #{index} carries control code 0"
            )));
        }
        Ok(record)
    }
}

/// Single punch pushed by a station in autosend mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutosendPunch {
    pub code: u16,
    pub card_id: u32,
    pub time: NaiveTime,
}

impl AutosendPunch {
    pub fn from_json(line: &str) -> Result<Self> {
        let punch: AutosendPunch = serde_json::from_str(line)
            .map_err(|err| BridgeError::read(format!("malformed autosend punch: {err}")))?;
        if punch.code == 0 {
            return Err(BridgeError::read("autosend punch carries control code 0"));
        }
        if punch.card_id == 0 {
            return Err(BridgeError::read("autosend punch carries card id 0"));
        }
        Ok(punch)
    }
}
