use mclog_types::{FieldRole, MessageSchema};
use mclog_wire::bits::{BitWriter, MAX_FIELD_BITS};
use mclog_wire::checksum::additive_checksum;

use crate::error::EncodeError;

/// Builds a complete log byte stream: the parameter block, the schema
/// block, then bit-packed records.
///
/// ```text
/// ┌──────────────┬──────────────┬──────────┬──────────┬─────
/// │ {parameters} │ {schema}     │ record 0 │ record 1 │ ...
/// └──────────────┴──────────────┴──────────┴──────────┴─────
///                                 └─ fields LSB-first, last byte = Σ others
/// ```
///
/// Both JSON blocks are written exactly as given. The schema must end with
/// an 8-bit `csum` field on a byte boundary; whatever value the caller
/// supplies for it is replaced by the additive checksum of the preceding
/// record bytes.
///
/// # Usage
///
/// ```rust
/// use mclog_encoder::{LogEncoder, ParameterJson, SchemaJson};
///
/// let params = ParameterJson::new().value("pwmirqfrq", 1000).value("pwmmax", 4096);
/// let schema = SchemaJson::new()
///     .field("i1", 0.01, true, 12)
///     .field("i2", 0.01, true, 12)
///     .field("csum", 1.0, false, 8);
///
/// let mut encoder = LogEncoder::new(&params.to_json(), &schema.to_json())?;
/// encoder.push_record(&[-100, 250, 0])?;
/// let bytes = encoder.finish();
/// assert_eq!(bytes.len(), params.to_json().len() + schema.to_json().len() + 4);
/// # Ok::<(), mclog_encoder::EncodeError>(())
/// ```
#[derive(Debug)]
pub struct LogEncoder {
    schema: MessageSchema,
    buf: Vec<u8>,
}

impl LogEncoder {
    /// Start a log with the given header blocks.
    ///
    /// # Errors
    ///
    /// - [`EncodeError::Schema`] if `schema_json` is not a usable schema.
    /// - [`EncodeError::ChecksumNotTrailing`] if the last wire field is not
    ///   a byte-aligned 8-bit `csum`.
    pub fn new(parameters_json: &str, schema_json: &str) -> Result<Self, EncodeError> {
        let schema = MessageSchema::parse(schema_json.as_bytes())?;

        let last = schema.wire_fields().last().map(|(_, field)| field);
        let trailing_csum = last.is_some_and(|f| f.role == FieldRole::Checksum && f.bit_width() == 8);
        if !trailing_csum || schema.total_bits() % 8 != 0 {
            return Err(EncodeError::ChecksumNotTrailing);
        }

        let mut buf = Vec::with_capacity(parameters_json.len() + schema_json.len());
        buf.extend_from_slice(parameters_json.as_bytes());
        buf.extend_from_slice(schema_json.as_bytes());

        Ok(Self {
            schema,
            buf,
        })
    }

    /// Pack one record without appending it.
    ///
    /// `values` holds one raw integer per wire field in layout order. The
    /// value given for `csum` is ignored.
    ///
    /// # Errors
    ///
    /// - [`EncodeError::FieldCount`] if `values` has the wrong length.
    /// - [`EncodeError::ValueOutOfRange`] if a value does not fit its field.
    pub fn encode_record(&self, values: &[i64]) -> Result<Vec<u8>, EncodeError> {
        let expected = self.schema.wire_fields().count();
        if values.len() != expected {
            return Err(EncodeError::FieldCount {
                expected,
                got: values.len(),
            });
        }

        let mut writer = BitWriter::new();
        for ((_, field), &value) in self.schema.wire_fields().zip(values) {
            let bits = field.bit_width();
            let signed = field.sign_extend();
            let value = if field.role == FieldRole::Checksum { 0 } else { value };

            let (min, max) = field_range(bits, signed);
            if value < min || value > max {
                return Err(EncodeError::ValueOutOfRange {
                    field: field.name.clone(),
                    value,
                    bits,
                    signed,
                });
            }
            // Two's complement truncated to the field width.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            writer.write(value as u32, bits)?;
        }

        let mut record = writer.finish();
        if let Some((csum, body)) = record.split_last_mut() {
            *csum = additive_checksum(body);
        }
        Ok(record)
    }

    /// Pack one record and append it to the log.
    ///
    /// # Errors
    ///
    /// See [`encode_record`](Self::encode_record).
    pub fn push_record(&mut self, values: &[i64]) -> Result<(), EncodeError> {
        let record = self.encode_record(values)?;
        self.buf.extend_from_slice(&record);
        Ok(())
    }

    /// Append arbitrary bytes, such as line noise between records.
    pub fn push_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Inclusive range of integers representable in a field.
fn field_range(bits: u32, signed: bool) -> (i64, i64) {
    let bits = bits.min(MAX_FIELD_BITS);
    if signed {
        let half = 1i64 << (bits - 1);
        (-half, half - 1)
    } else {
        (0, (1i64 << bits) - 1)
    }
}

/// The four little-endian bytes carried for a spot value, the inverse of
/// the decoder's `(i32) / 32` reassembly. Rounds to the nearest 1/32.
#[must_use]
pub fn spot_value_bytes(value: f64) -> [u8; 4] {
    #[allow(clippy::cast_possible_truncation)]
    let fixed = (value * 32.0).round() as i32;
    fixed.to_le_bytes()
}

/// `(count, spot)` raw values for the four records that transmit `value`
/// in spot slot `slot`.
#[must_use]
pub fn spot_cycle(slot: u32, value: f64) -> [(i64, i64); 4] {
    let bytes = spot_value_bytes(value);
    let base = i64::from(slot) << 2;
    [
        (base, i64::from(bytes[0])),
        (base | 1, i64::from(bytes[1])),
        (base | 2, i64::from(bytes[2])),
        (base | 3, i64::from(bytes[3])),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParameterJson, SchemaJson};
    use mclog_decoder::decode_log;

    fn params() -> String {
        ParameterJson::new()
            .value("pwmirqfrq", 2000)
            .value("pwmmax", 4096)
            .to_json()
    }

    #[test]
    fn checksum_is_written_into_last_byte() {
        let schema = SchemaJson::new()
            .field("a", 1.0, false, 8)
            .field("b", 1.0, false, 8)
            .field("csum", 1.0, false, 8)
            .to_json();
        let enc = LogEncoder::new(&params(), &schema).unwrap();
        assert_eq!(enc.encode_record(&[0x80, 0x90, 0xFF]).unwrap(), [0x80, 0x90, 0x10]);
    }

    #[test]
    fn rejects_schema_without_trailing_checksum() {
        let missing = SchemaJson::new().field("a", 1.0, false, 8).to_json();
        let misplaced = SchemaJson::new()
            .field("csum", 1.0, false, 8)
            .field("a", 1.0, false, 8)
            .to_json();
        let unaligned = SchemaJson::new()
            .field("a", 1.0, false, 3)
            .field("csum", 1.0, false, 8)
            .to_json();
        for schema in [missing, misplaced, unaligned] {
            assert!(matches!(
                LogEncoder::new(&params(), &schema),
                Err(EncodeError::ChecksumNotTrailing)
            ));
        }
    }

    #[test]
    fn range_checks_follow_signedness() {
        let schema = SchemaJson::new()
            .field("s", 1.0, true, 4)
            .field("u", 1.0, false, 4)
            .field("csum", 1.0, false, 8)
            .to_json();
        let enc = LogEncoder::new(&params(), &schema).unwrap();
        assert!(enc.encode_record(&[-8, 15, 0]).is_ok());
        assert!(matches!(
            enc.encode_record(&[8, 0, 0]),
            Err(EncodeError::ValueOutOfRange { bits: 4, signed: true, .. })
        ));
        assert!(matches!(
            enc.encode_record(&[0, -1, 0]),
            Err(EncodeError::ValueOutOfRange { signed: false, .. })
        ));
        assert!(matches!(
            enc.encode_record(&[0, 0]),
            Err(EncodeError::FieldCount { expected: 3, got: 2 })
        ));
    }

    #[test]
    fn every_width_round_trips_through_decoder() {
        for bits in 1..=MAX_FIELD_BITS {
            for signed in [false, true] {
                let pad = (8 - bits % 8) % 8;
                let mut schema = SchemaJson::new().field("v", 2.0, signed, bits);
                if pad > 0 {
                    schema = schema.field("pad", 1.0, false, pad);
                }
                let schema = schema.field("csum", 1.0, false, 8).to_json();

                let (min, max) = field_range(bits, signed);
                let mut enc = LogEncoder::new(&params(), &schema).unwrap();
                for value in [min, max] {
                    let mut row = vec![value];
                    if pad > 0 {
                        row.push(0);
                    }
                    row.push(0);
                    enc.push_record(&row).unwrap();
                }

                let log = decode_log(enc.finish().as_slice()).unwrap();
                #[allow(clippy::cast_precision_loss)]
                let expected = [min as f64 * 2.0, max as f64 * 2.0];
                let got: Vec<f64> = log.records.iter().map(|r| r.values[0]).collect();
                assert_eq!(got, expected, "bits {bits} signed {signed}");
            }
        }
    }

    #[test]
    fn spot_cycle_counts_through_slot() {
        let cycle = spot_cycle(2, -1.5);
        let counters: Vec<i64> = cycle.iter().map(|&(c, _)| c).collect();
        assert_eq!(counters, [8, 9, 10, 11]);
        assert_eq!(spot_value_bytes(-1.5), (-48i32).to_le_bytes());
    }
}
