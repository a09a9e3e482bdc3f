use std::io::Cursor;
use std::time::Duration;

use chrono::NaiveTime;
use pretty_assertions::assert_eq;
use punchrelay::{
    AcquisitionLoop, AutosendPunch, CardRecord, ChunkPolicy, FrameLimit, FramePacer,
    FramingOptions, JsonLinesReader, RecordingSleeper, SpecialEvent, encode_record,
    frames_for_record, relay_autosend,
};

fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, s).unwrap()
}

fn lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8(bytes.to_vec())
        .unwrap()
        .split_terminator("\r\n")
        .map(str::to_string)
        .collect()
}

#[test]
fn sample_card_encodes_to_wire_format() {
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
fn frame_counts_at_the_230_byte_boundary() {
    // "N-1" plus 12-byte fields for two-digit controls.
    let mut record = CardRecord::new(1).unwrap();
    for _ in 0..38 {
        record = record.with_punch(31, Some(hms(10, 0, 0)));
    }
    // 3 + 38 * 12 = 459
    let frames = frames_for_record(&record, FrameLimit::default(), ChunkPolicy::Blind).unwrap();
    assert_eq!(frames.iter().map(String::len).collect::<Vec<_>>(), vec![230, 229]);

    let record = record.with_punch(5, Some(hms(10, 0, 0))); // 11 bytes -> 470
    let frames = frames_for_record(&record, FrameLimit::default(), ChunkPolicy::Blind).unwrap();
    assert_eq!(frames.iter().map(String::len).collect::<Vec<_>>(), vec![230, 230, 10]);
}

#[test]
fn replayed_cards_are_relayed_in_read_order() {
    let input = concat!(
        r#"{"card_id":7011111,"finish":"12:31:16","check":"11:41:04","punches":[{"code":54,"time":"11:43:21"},{"code":39,"time":"11:47:35"}]}"#,
        "\n",
        "this line is not a readout\n",
        r#"{"card_id":233177,"start":"10:00:00","punches":[{"code":31}]}"#,
        "\n",
    );
    let reader = JsonLinesReader::new(Cursor::new(input));
    let pacer = FramePacer::new(Vec::new(), RecordingSleeper::new(), Duration::from_secs(2));
    let mut acquisition = AcquisitionLoop::new(reader, pacer, FramingOptions::default());

    let stats = acquisition.run().unwrap();
    assert_eq!(stats.records_sent, 2);
    assert_eq!(stats.frames_sent, 2);
    assert_eq!(stats.read_failures, 1);
    assert_eq!(acquisition.reader().acknowledged(), 2);
    assert_eq!(
        lines(acquisition.pacer().writer()),
        vec![
            "N-7011111|F-12:31:16|H-11:41:04|54-11:43:21|39-11:47:35".to_string(),
            "N-233177|S-10:00:00".to_string(),
        ]
    );
}

#[test]
fn long_readout_uses_field_boundary_policy_when_configured() {
    let mut record = CardRecord::new(42).unwrap();
    for code in 100..130 {
        record = record.with_punch(code, Some(hms(9, 15, 30)));
    }
    let input = format!("{}\n", serde_json::to_string(&record).unwrap());
    let options = FramingOptions {
        limit: FrameLimit::new(100).unwrap(),
        policy: ChunkPolicy::FieldBoundary,
        ..FramingOptions::default()
    };
    let pacer = FramePacer::new(Vec::new(), RecordingSleeper::new(), Duration::from_secs(2));
    let mut acquisition =
        AcquisitionLoop::new(JsonLinesReader::new(Cursor::new(input)), pacer, options);
    acquisition.run().unwrap();

    let frames = lines(acquisition.pacer().writer());
    assert!(frames.len() > 1);
    assert!(frames.iter().all(|f| f.len() <= 100));
    assert!(frames[1..].iter().all(|f| f.starts_with('|')));
    assert_eq!(frames.concat(), encode_record(&record));

    let delays = &acquisition.pacer().sleeper().sleeps;
    let frame_delays = delays
        .iter()
        .filter(|d| **d == Duration::from_secs(2))
        .count();
    assert_eq!(frame_delays, frames.len() - 1);
}

#[test]
fn autosend_punch_is_one_line_one_write() {
    let input = concat!(r#"{"code":53,"card_id":233177,"time":"12:14:09"}"#, "\n");
    let mut source = JsonLinesReader::new(Cursor::new(input));
    let mut pacer = FramePacer::new(Vec::new(), RecordingSleeper::new(), Duration::from_secs(2));

    let mut echoed = Vec::new();
    let relayed =
        relay_autosend(&mut source, &mut pacer, |line| echoed.push(line.to_string())).unwrap();
    assert_eq!(relayed, 1);
    assert_eq!(echoed, vec!["53|233177|12:14:09".to_string()]);
    assert_eq!(pacer.frames_sent(), 1);
    assert_eq!(pacer.writer().as_slice(), b"53|233177|12:14:09\r\n");
    assert!(pacer.sleeper().sleeps.is_empty());
}

#[test]
fn autosend_json_round_trips_through_wire_format() {
    let punch = AutosendPunch {
        code: 100,
        card_id: 8_000_001,
        time: hms(23, 5, 0),
    };
    assert_eq!(punchrelay::encode_autosend(&punch), "100|8000001|23:05:00");
}
