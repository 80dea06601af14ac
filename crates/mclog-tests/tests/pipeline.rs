//! End-to-end decode of a realistic capture through every file sink.
//!
//! The fixture log carries 120 records at 8 kHz with a three-slot spot
//! channel. Each sweep of the spot channel spans 12 records, so the
//! demultiplexer completes its first row at record 12 and one more every
//! 12 records after that.

use std::fs;

use mclog_decoder::derived::dq_currents;
use mclog_decoder::{DecoderEvent, LogDecoder, decode_log};
use mclog_sinks::{ChannelSampleSink, LogSink, MotorCsvSink, SinkSet, SpotCsvSink};
use mclog_tests::{FREQUENCY_HZ, SPOT_VALUES, motor_log, motor_row};

#[test]
fn every_record_and_spot_row_is_decoded() {
    let decoded = decode_log(motor_log(120).as_slice()).unwrap();

    assert_eq!(decoded.records.len(), 120);
    assert_eq!(decoded.spot_rows.len(), 9);
    assert_eq!(decoded.summary.records, 120);
    assert_eq!(decoded.summary.spot_rows, 9);
    assert_eq!(decoded.summary.lost_sync_events, 0);
    assert_eq!(decoded.summary.bytes_skipped, 0);

    let header = &decoded.header;
    assert_eq!(header.parameters.frequency_hz, FREQUENCY_HZ);
    assert_eq!(header.spot_lookup.names().collect::<Vec<_>>(), ["vbus", "ibus", "temp"]);

    for (n, row) in decoded.spot_rows.iter().enumerate() {
        let expected_time = f64::from(12 * (n as u32 + 1)) / f64::from(FREQUENCY_HZ);
        assert!((row.time - expected_time).abs() < 1e-12, "row {n} at {}", row.time);
        let expected: Vec<f64> = SPOT_VALUES.iter().map(|(_, v)| *v).collect();
        assert_eq!(row.values, expected);
    }
}

#[test]
fn record_values_are_scaled_and_transformed() {
    let decoded = decode_log(motor_log(8).as_slice()).unwrap();
    let schema = &decoded.header.schema;
    let params = &decoded.header.parameters;

    for record in &decoded.records {
        let raw = motor_row(record.index as usize);

        let angle = record.get(schema, "angle").unwrap();
        assert!((angle - 360.0 * raw[0] as f64 / 65535.0).abs() < 1e-9);

        let i1 = record.get(schema, "i1").unwrap();
        let i2 = record.get(schema, "i2").unwrap();
        assert!((i1 - raw[1] as f64 * 0.01).abs() < 1e-9);
        assert!((i2 - raw[2] as f64 * 0.01).abs() < 1e-9);

        let uq = record.get(schema, "uq").unwrap();
        assert!((uq - 100.0 * raw[4] as f64 / params.modulation_max).abs() < 1e-9);

        let half = params.half_pwm();
        let pwm1 = record.get(schema, "pwm1").unwrap();
        assert!((pwm1 - 100.0 * (raw[5] as f64 - half) / half).abs() < 1e-9);

        assert_eq!(record.get(schema, "count"), Some(raw[8] as f64));
    }
}

#[test]
fn calculated_currents_follow_each_record() {
    let decoded = decode_log(motor_log(40).as_slice()).unwrap();
    let schema = &decoded.header.schema;

    for record in &decoded.records {
        let dq = dq_currents(
            record.get(schema, "angle").unwrap(),
            record.get(schema, "i1").unwrap(),
            record.get(schema, "i2").unwrap(),
        );
        assert_eq!(record.get(schema, "iq"), Some(dq.iq));
        assert_eq!(record.get(schema, "id"), Some(dq.id));
    }
}

#[test]
fn spot_row_event_precedes_the_record_that_completes_its_sweep() {
    let log = motor_log(30);
    let mut decoder = LogDecoder::open(log.as_slice()).unwrap();
    let mut order = Vec::new();
    while let Some(event) = decoder.next_event().unwrap() {
        order.push(match event {
            DecoderEvent::Record(record) => format!("r{}", record.index),
            DecoderEvent::SpotRow(_) => "spot".to_string(),
            DecoderEvent::SyncLost { .. } => "lost".to_string(),
        });
    }

    assert_eq!(order.iter().filter(|e| *e == "spot").count(), 2);
    assert_eq!(order[12..14], ["spot", "r12"]);
    assert_eq!(order[25..27], ["spot", "r24"]);
}

#[test]
fn sinks_write_csv_and_channel_files() {
    let out = tempfile::tempdir().unwrap();
    let motor_path = out.path().join("run_motor_data.csv");
    let spot_path = out.path().join("run_spot_values.csv");
    let session = out.path().join("session");
    fs::create_dir(&session).unwrap();

    let log = motor_log(120);
    let mut decoder = LogDecoder::open(log.as_slice()).unwrap();
    let header = decoder.header().clone();

    let mut sinks = SinkSet::new();
    assert!(sinks.open_or_skip("motor csv", || MotorCsvSink::create(&motor_path, &header.schema)));
    assert!(sinks.open_or_skip("spot csv", || SpotCsvSink::create(&spot_path, &header.spot_lookup)));
    assert!(sinks.open_or_skip("channels", || ChannelSampleSink::create(&session, &header)));
    assert_eq!(sinks.len(), 3);

    while let Some(event) = decoder.next_event().unwrap() {
        match event {
            DecoderEvent::Record(record) => sinks.record(&record).unwrap(),
            DecoderEvent::SpotRow(row) => sinks.spot_row(&row).unwrap(),
            DecoderEvent::SyncLost { .. } => {}
        }
    }
    sinks.finish().unwrap();

    let motor = fs::read_to_string(&motor_path).unwrap();
    let mut lines = motor.lines();
    insta::assert_snapshot!(
        lines.next().unwrap(),
        @"Time(s),angle,i1,i2,ud,uq,pwm1,pwm2,pwm3,count,iq,id"
    );
    assert_eq!(lines.count(), 120);

    let spot = fs::read_to_string(&spot_path).unwrap();
    insta::assert_snapshot!(spot.trim_end(), @r"
    Time(s),vbus,ibus,temp
    0.0015,48.5,-2.25,31
    0.003,48.5,-2.25,31
    0.0045,48.5,-2.25,31
    0.006,48.5,-2.25,31
    0.0075,48.5,-2.25,31
    0.009,48.5,-2.25,31
    0.0105,48.5,-2.25,31
    0.012,48.5,-2.25,31
    0.0135,48.5,-2.25,31
    ");

    // Eleven wire fields minus spot and csum, plus iq and id.
    for n in 1..=11 {
        let samples = fs::read(session.join(format!("analog-1-{n}-1"))).unwrap();
        assert_eq!(samples.len(), 120 * 4, "channel {n}");
    }
    let metadata = fs::read_to_string(session.join("metadata")).unwrap();
    assert!(metadata.contains("samplerate=8 KHz"));
    assert!(metadata.contains("total analog=11"));
}

#[test]
fn failing_sink_is_skipped_and_the_rest_still_run() {
    let out = tempfile::tempdir().unwrap();
    let missing_dir = out.path().join("does-not-exist").join("run_motor_data.csv");
    let spot_path = out.path().join("run_spot_values.csv");

    let decoded = decode_log(motor_log(24).as_slice()).unwrap();
    let header = &decoded.header;

    let mut sinks = SinkSet::new();
    assert!(!sinks.open_or_skip("motor csv", || MotorCsvSink::create(&missing_dir, &header.schema)));
    assert!(sinks.open_or_skip("spot csv", || SpotCsvSink::create(&spot_path, &header.spot_lookup)));
    assert_eq!(sinks.names().collect::<Vec<_>>(), ["spot csv"]);

    for record in &decoded.records {
        sinks.record(record).unwrap();
    }
    for row in &decoded.spot_rows {
        sinks.spot_row(row).unwrap();
    }
    sinks.finish().unwrap();

    let spot = fs::read_to_string(&spot_path).unwrap();
    assert_eq!(spot.lines().count(), 2);
}

#[test]
fn spot_sink_ignores_records() {
    let decoded = decode_log(motor_log(4).as_slice()).unwrap();
    let mut sink = SpotCsvSink::from_writer(Vec::new(), &decoded.header.spot_lookup).unwrap();
    sink.record(&decoded.records[0]).unwrap();
    let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();
    assert_eq!(text, "Time(s),vbus,ibus,temp\n");
}
