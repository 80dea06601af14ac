//! Shared fixtures for the integration tests and benches.
//!
//! [`motor_log`] builds a log shaped like real controller output: eleven
//! wire fields (17 bytes per record) including the current inputs that
//! enable `iq`/`id`, and a three-slot spot channel cycling continuously.

use mclog_encoder::{LogEncoder, ParameterJson, SchemaJson, spot_cycle};

pub const FREQUENCY_HZ: u32 = 8000;
pub const PWM_MAX: u32 = 4096;
pub const RECORD_BYTES: usize = 17;

/// Spot slots in transmit order, with the value each one carries.
pub const SPOT_VALUES: [(&str, f64); 3] = [("vbus", 48.5), ("ibus", -2.25), ("temp", 31.0)];

#[must_use]
pub fn motor_parameters() -> ParameterJson {
    let mut params = ParameterJson::new()
        .value("version", 3)
        .value("pwmirqfrq", FREQUENCY_HZ)
        .value("pwmmax", PWM_MAX);
    for (slot, (name, _)) in (0..).zip(SPOT_VALUES) {
        params = params.spot(name, slot);
    }
    params
}

#[must_use]
pub fn motor_schema() -> SchemaJson {
    SchemaJson::new()
        .field("angle", 1.0, false, 16)
        .field("i1", 0.01, true, 12)
        .field("i2", 0.01, true, 12)
        .field("ud", 1.0, true, 12)
        .field("uq", 1.0, true, 12)
        .field("pwm1", 1.0, false, 16)
        .field("pwm2", 1.0, false, 16)
        .field("pwm3", 1.0, false, 16)
        .field("count", 1.0, false, 8)
        .field("spot", 1.0, false, 8)
        .field("csum", 1.0, false, 8)
}

/// Raw wire values of record `n`, in schema order.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn motor_row(n: usize) -> [i64; 11] {
    let slot = (n / 4) % SPOT_VALUES.len();
    let (count, spot) = spot_cycle(slot as u32, SPOT_VALUES[slot].1)[n % 4];
    let n = n as i64;

    [
        (n * 1237) % 65536,
        (n * 37) % 4001 - 2000,
        (n * 53) % 3001 - 1500,
        (n * 11) % 2001 - 1000,
        1000 - (n * 7) % 2001,
        (n * 13) % 4097,
        (n * 17) % 4097,
        (n * 19) % 4097,
        count,
        spot,
        0,
    ]
}

/// Header text as written at the head of every fixture log.
#[must_use]
pub fn motor_header() -> Vec<u8> {
    let mut header = motor_parameters().to_json().into_bytes();
    header.extend_from_slice(motor_schema().to_json().as_bytes());
    header
}

#[must_use]
pub fn motor_encoder() -> LogEncoder {
    match LogEncoder::new(&motor_parameters().to_json(), &motor_schema().to_json()) {
        Ok(encoder) => encoder,
        Err(e) => panic!("fixture schema rejected: {e}"),
    }
}

/// A complete log of `records` valid records.
#[must_use]
pub fn motor_log(records: usize) -> Vec<u8> {
    let mut encoder = motor_encoder();
    for n in 0..records {
        if let Err(e) = encoder.push_record(&motor_row(n)) {
            panic!("fixture row {n} rejected: {e}");
        }
    }
    encoder.finish()
}
