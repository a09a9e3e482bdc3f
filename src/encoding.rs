//! Text encoding of card readouts and autosend punches.
//!
//! Full readout:
//! `N-<card>[|S-hh:mm:ss][|F-hh:mm:ss][|H-hh:mm:ss][|C-hh:mm:ss][|<code>-hh:mm:ss]...`
//!
//! Autosend punch: `<code>|<card>|hh:mm:ss`.
//!
//! Times are rendered at second resolution; fractions are truncated, never rounded.

use chrono::NaiveTime;
use std::fmt::Write;

use crate::record::{AutosendPunch, CardRecord};

/// Field separator shared by both formats.
pub const FIELD_SEPARATOR: char = '|';

/// Prefix that opens every readout.
pub const CARD_MARKER: &str = "N-";

const TIME_FORMAT: &str = "%H:%M:%S";

/// Encode a full readout. Unset events and punches without a time are skipped.
pub fn encode_record(record: &CardRecord) -> String {
    let mut out = String::with_capacity(16 + record.punches.len() * 12);
    write!(&mut out, "{}{}", CARD_MARKER, record.card_id).ok();

    for (event, time) in record.special.iter() {
        write!(
            &mut out,
            "{}{}-{}",
            FIELD_SEPARATOR,
            event.prefix(),
            format_time(time)
        )
        .ok();
    }

    for punch in &record.punches {
        if let Some(time) = punch.time {
            write!(
                &mut out,
                "{}{}-{}",
                FIELD_SEPARATOR,
                punch.code,
                format_time(time)
            )
            .ok();
        }
    }

    out
}

/// Encode one autosend punch (without line terminator).
pub fn encode_autosend(punch: &AutosendPunch) -> String {
    format!(
        "{}{sep}{}{sep}{}",
        punch.code,
        punch.card_id,
        format_time(punch.time),
        sep = FIELD_SEPARATOR
    )
}

/// `HH:MM:SS`, 24-hour, zero padded.
pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SpecialEvent;
    use pretty_assertions::assert_eq;

    fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn empty_record_is_card_marker_only() {
        let record = CardRecord::new(42).unwrap();
        assert_eq!(encode_record(&record), "N-42");
    }

    #[test]
    fn encodes_sample_readout() {
        let record = CardRecord::new(7011111)
            .unwrap()
            .with_event(SpecialEvent::Finish, hms(12, 31, 16))
            .with_event(SpecialEvent::Check, hms(11, 41, 4))
            .with_punch(54, Some(hms(11, 43, 21)))
            .with_punch(39, Some(hms(11, 47, 35)));
        assert_eq!(
            encode_record(&record),
            "N-7011111|F-12:31:16|H-11:41:04|54-11:43:21|39-11:47:35"
        );
    }

    #[test]
    fn special_events_follow_fixed_order_regardless_of_insertion() {
        let record = CardRecord::new(5)
            .unwrap()
            .with_event(SpecialEvent::Clear, hms(8, 0, 0))
            .with_event(SpecialEvent::Finish, hms(11, 0, 0))
            .with_event(SpecialEvent::Check, hms(8, 30, 0))
            .with_event(SpecialEvent::Start, hms(9, 0, 0));
        assert_eq!(
            encode_record(&record),
            "N-5|S-09:00:00|F-11:00:00|H-08:30:00|C-08:00:00"
        );
    }

    #[test]
    fn untimed_punches_leave_no_empty_field() {
        let record = CardRecord::new(9)
            .unwrap()
            .with_punch(31, None)
            .with_punch(32, Some(hms(10, 1, 2)))
            .with_punch(33, None);
        let encoded = encode_record(&record);
        assert_eq!(encoded, "N-9|32-10:01:02");
        assert!(!encoded.contains("||"));
        assert!(!encoded.ends_with('|'));
    }

    #[test]
    fn repeated_controls_are_kept_in_order() {
        let record = CardRecord::new(9)
            .unwrap()
            .with_punch(40, Some(hms(10, 0, 0)))
            .with_punch(41, Some(hms(10, 5, 0)))
            .with_punch(40, Some(hms(10, 10, 0)));
        assert_eq!(
            encode_record(&record),
            "N-9|40-10:00:00|41-10:05:00|40-10:10:00"
        );
    }

    #[test]
    fn sub_second_precision_is_truncated() {
        let time = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap();
        assert_eq!(format_time(time), "23:59:59");
    }

    #[test]
    fn autosend_line_format() {
        let punch = AutosendPunch {
            code: 53,
            card_id: 233177,
            time: hms(12, 14, 9),
        };
        assert_eq!(encode_autosend(&punch), "53|233177|12:14:09");
    }

    #[test]
    fn encoding_is_deterministic() {
        let record = CardRecord::new(1)
            .unwrap()
            .with_event(SpecialEvent::Start, hms(0, 0, 1))
            .with_punch(100, Some(hms(0, 10, 0)));
        assert_eq!(encode_record(&record), encode_record(&record.clone()));
    }
}
