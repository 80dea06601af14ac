#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use mclog_decoder::decode_log;
use mclog_encoder::{LogEncoder, ParameterJson, SchemaJson};

#[derive(Debug, Arbitrary)]
struct FuzzField {
    width: u8,
    signed: bool,
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    fields: Vec<FuzzField>,
    frequency: u16,
    seed: Vec<u8>,
}

// Fuzz target: encode random records under a random schema, then decode.
//
// Widths are taken mod 32 + 1 and the layout is padded to whole bytes
// before the trailing checksum, so every generated schema is encodable.
// Values within each field's range must come back exactly.
fuzz_target!(|input: FuzzInput| {
    let mut schema = SchemaJson::new();
    let mut fields = Vec::new();
    let mut bits = 0u32;
    for (i, field) in input.fields.iter().take(6).enumerate() {
        let width = u32::from(field.width % 32) + 1;
        schema = schema.field(&format!("f{i}"), 1.0, field.signed, width);
        fields.push((width, field.signed));
        bits += width;
    }
    if fields.is_empty() {
        return;
    }
    let pad = (8 - bits % 8) % 8;
    if pad > 0 {
        schema = schema.field("pad", 1.0, false, pad);
    }
    schema = schema.field("csum", 1.0, false, 8);
    if (bits + pad) / 8 + 1 > 25 {
        return;
    }

    let params = ParameterJson::new()
        .value("pwmirqfrq", u32::from(input.frequency).max(1))
        .value("pwmmax", 4096);
    let Ok(mut encoder) = LogEncoder::new(&params.to_json(), &schema.to_json()) else {
        return;
    };

    let mut u = Unstructured::new(&input.seed);
    let mut rows = Vec::new();
    for _ in 0..8 {
        let mut row = Vec::new();
        for &(width, signed) in &fields {
            let raw = u64::from(u.arbitrary::<u32>().unwrap_or(0)) & ((1u64 << width) - 1);
            let value = if signed && raw >> (width - 1) == 1 {
                raw as i64 - (1i64 << width)
            } else {
                raw as i64
            };
            row.push(value);
        }
        if pad > 0 {
            row.push(0);
        }
        row.push(0);
        encoder.push_record(&row).unwrap();
        rows.push(row);
    }

    let decoded = decode_log(encoder.finish().as_slice()).unwrap();
    assert_eq!(decoded.records.len(), rows.len());
    for (record, row) in decoded.records.iter().zip(&rows) {
        for (i, &value) in row.iter().take(fields.len()).enumerate() {
            assert_eq!(record.values[i], value as f64);
        }
    }
});
