//! Fatal header problems versus recoverable stream problems.
//!
//! Anything wrong with the two JSON blocks stops the run before a single
//! record is read. Anything wrong after them only costs records.

use mclog_decoder::{DecodeError, HeaderBlock, decode_log};
use mclog_encoder::{LogEncoder, ParameterJson};
use mclog_tests::{motor_parameters, motor_row, motor_schema};

fn log_with(params: &ParameterJson) -> Vec<u8> {
    let mut encoder = LogEncoder::new(&params.to_json(), &motor_schema().to_json()).unwrap();
    for n in 0..3 {
        encoder.push_record(&motor_row(n)).unwrap();
    }
    encoder.finish()
}

#[test]
fn missing_frequency_is_fatal() {
    let params = ParameterJson::new().value("pwmmax", 4096);
    let err = decode_log(log_with(&params).as_slice()).unwrap_err();
    assert!(matches!(err, DecodeError::MissingRequiredParameter { name: "pwmirqfrq" }));
}

#[test]
fn zero_pwm_max_counts_as_missing() {
    let params = ParameterJson::new().value("pwmirqfrq", 8000).value("pwmmax", 0);
    let err = decode_log(log_with(&params).as_slice()).unwrap_err();
    assert!(matches!(err, DecodeError::MissingRequiredParameter { name: "pwmmax" }));
}

#[test]
fn legacy_pwm_setting_supplies_both_parameters() {
    let params = ParameterJson::new().value("pwmfrq", 1).spot("vbus", 0);
    let decoded = decode_log(log_with(&params).as_slice()).unwrap();

    assert_eq!(decoded.header.parameters.frequency_hz, 8789);
    assert_eq!(decoded.header.parameters.pwm_max, 8192);
    assert_eq!(decoded.records.len(), 3);
}

#[test]
fn empty_stream_is_an_incomplete_parameter_block() {
    let err = decode_log(&b""[..]).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::IncompleteHeader { block: HeaderBlock::Parameters, .. }
    ));
}

#[test]
fn stream_ending_inside_schema_is_invalid_schema() {
    let mut log = motor_parameters().to_json().into_bytes();
    let schema = motor_schema().to_json();
    log.extend_from_slice(&schema.as_bytes()[..schema.len() / 2]);

    let err = decode_log(log.as_slice()).unwrap_err();
    assert!(matches!(err, DecodeError::InvalidSchema { .. }));
}

#[test]
fn parameter_block_that_is_not_json_is_malformed() {
    let mut log = b"{pwmirqfrq: 8000}".to_vec();
    log.extend_from_slice(motor_schema().to_json().as_bytes());

    let err = decode_log(log.as_slice()).unwrap_err();
    assert!(matches!(err, DecodeError::MalformedHeader(_)));
}

// Brace counting ignores string literals, so a `}` inside a string value
// ends the parameter block one brace early and the truncated text is not
// valid JSON.
#[test]
fn closing_brace_in_string_value_breaks_the_header() {
    let params = motor_parameters().value("label", "a}b");
    let err = decode_log(log_with(&params).as_slice()).unwrap_err();
    assert!(matches!(err, DecodeError::MalformedHeader(_)));
}

#[test]
fn valid_header_without_records_is_not_an_error() {
    let log = LogEncoder::new(&motor_parameters().to_json(), &motor_schema().to_json())
        .unwrap()
        .finish();

    let decoded = decode_log(log.as_slice()).unwrap();
    assert!(decoded.records.is_empty());
    assert!(decoded.spot_rows.is_empty());
    assert_eq!(decoded.summary.bytes_skipped, 0);
}

#[test]
fn error_messages_name_the_problem() {
    let params = ParameterJson::new().value("pwmirqfrq", 8000);
    let err = decode_log(log_with(&params).as_slice()).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"required parameter pwmmax is missing");

    let err = decode_log(&b"junk only"[..]).unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"stream ended before the parameter block closed (9 bytes scanned)"
    );
}
