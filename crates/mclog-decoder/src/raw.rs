use mclog_types::{FieldKind, MessageSchema};
use mclog_wire::WireError;
use mclog_wire::bits::{BitReader, sign_extend};

/// Undecorated wire value of one field.
///
/// `bits` is the field masked to its width, exactly as it sat on the wire.
/// `value` is the integer the field represents: `bits` itself for unsigned
/// fields, the sign-extended value for signed ones. Calculated fields carry
/// the default (zero) value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawValue {
    pub bits: u32,
    pub value: i64,
}

impl RawValue {
    #[must_use]
    pub fn unsigned(bits: u32) -> Self {
        Self {
            bits,
            value: i64::from(bits),
        }
    }

    #[must_use]
    pub fn signed(bits: u32, width: u32) -> Self {
        Self {
            bits,
            value: i64::from(sign_extend(bits, width)),
        }
    }
}

/// First decode phase: unpack every wire field of a validated record.
///
/// `out` is cleared and refilled with one entry per schema field (calculated
/// fields included) so indices line up with [`MessageSchema::fields`].
///
/// # Errors
///
/// Returns [`WireError::UnexpectedEof`] if `record` is shorter than the
/// schema's bit layout.
pub fn read_raw(schema: &MessageSchema, record: &[u8], out: &mut Vec<RawValue>) -> Result<(), WireError> {
    out.clear();
    let mut reader = BitReader::new(record);

    for field in schema.fields() {
        let raw = match field.kind {
            FieldKind::Wire { bits: width, signed } => {
                let bits = reader.read(width)?;
                if signed {
                    RawValue::signed(bits, width)
                } else {
                    RawValue::unsigned(bits)
                }
            }
            FieldKind::Calculated(_) => RawValue::default(),
        };
        out.push(raw);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mclog_types::FieldDefinition;
    use mclog_wire::bits::BitWriter;

    #[test]
    fn unpacks_in_schema_order() {
        let schema = MessageSchema::from_wire_fields(vec![
            FieldDefinition::wire("a", 3, false, 1.0),
            FieldDefinition::wire("b", 12, true, 1.0),
            FieldDefinition::wire("c", 9, false, 1.0),
        ])
        .unwrap();

        let mut w = BitWriter::new();
        w.write(5, 3).unwrap();
        w.write(0xF00, 12).unwrap();
        w.write(300, 9).unwrap();
        let record = w.finish();

        let mut raw = Vec::new();
        read_raw(&schema, &record, &mut raw).unwrap();
        assert_eq!(raw[0], RawValue::unsigned(5));
        assert_eq!(raw[1].bits, 0xF00);
        assert_eq!(raw[1].value, -256);
        assert_eq!(raw[2].value, 300);
    }

    #[test]
    fn calculated_fields_get_placeholders() {
        let schema = MessageSchema::from_wire_fields(vec![
            FieldDefinition::wire("angle", 8, false, 1.0),
            FieldDefinition::wire("i1", 8, false, 1.0),
            FieldDefinition::wire("i2", 8, false, 1.0),
        ])
        .unwrap();
        let mut raw = Vec::new();
        read_raw(&schema, &[1, 2, 3], &mut raw).unwrap();
        assert_eq!(raw.len(), 5);
        assert_eq!(raw[3], RawValue::default());
    }
}
