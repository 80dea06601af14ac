use std::collections::HashSet;

use mclog_wire::bits::MAX_FIELD_BITS;
use serde_json::Value;

use crate::error::TypeError;

/// Field names the decoder attaches behaviour to.
pub mod names {
    pub const CHECKSUM: &str = "csum";
    pub const SPOT_CARRIER: &str = "spot";
    pub const SPOT_COUNTER: &str = "count";
    pub const ANGLE: &str = "angle";
    pub const I1: &str = "i1";
    pub const I2: &str = "i2";
    pub const UD: &str = "ud";
    pub const UQ: &str = "uq";
    pub const PWM: [&str; 3] = ["pwm1", "pwm2", "pwm3"];
    pub const IQ: &str = "iq";
    pub const ID: &str = "id";
}

/// Where a field's value comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Packed on the wire in `bits` bits, optionally two's complement.
    Wire { bits: u32, signed: bool },
    /// No wire representation; computed after the wire fields are decoded.
    Calculated(DerivedField),
}

/// Calculated fields, appended when `angle`, `i1` and `i2` are all present.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DerivedField {
    Iq,
    Id,
}

/// Post-scaling rule, resolved from the field name once at schema build.
///
/// ```text
/// ┌───────────────────┬──────────────────┬──────────────────────────────────┐
/// │ Transform         │ Field names      │ value after scaling              │
/// ├───────────────────┼──────────────────┼──────────────────────────────────┤
/// │ Linear            │ everything else  │ raw * scale                      │
/// │ AngleDegrees      │ angle            │ 360 * v / 65535                  │
/// │ ModulationPercent │ ud, uq           │ 100 * v / modulation_max         │
/// │ PwmDutyPercent    │ pwm1..pwm3       │ 100 * (v - pwm/2) / (pwm/2)      │
/// └───────────────────┴──────────────────┴──────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Transform {
    #[default]
    Linear,
    AngleDegrees,
    ModulationPercent,
    PwmDutyPercent,
}

impl Transform {
    #[must_use]
    pub fn for_name(name: &str) -> Self {
        match name {
            names::ANGLE => Self::AngleDegrees,
            names::UD | names::UQ => Self::ModulationPercent,
            n if names::PWM.contains(&n) => Self::PwmDutyPercent,
            _ => Self::Linear,
        }
    }
}

/// Bookkeeping role of a field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FieldRole {
    #[default]
    Data,
    /// Running checksum byte; internal only.
    Checksum,
    /// Carries one byte of a spot value per record; internal only.
    SpotCarrier,
    /// Spot cycle counter: slot in the high bits, byte position in the low two.
    SpotCounter,
}

impl FieldRole {
    #[must_use]
    pub fn for_name(name: &str) -> Self {
        match name {
            names::CHECKSUM => Self::Checksum,
            names::SPOT_CARRIER => Self::SpotCarrier,
            names::SPOT_COUNTER => Self::SpotCounter,
            _ => Self::Data,
        }
    }
}

/// One wire or calculated field, in schema order.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDefinition {
    pub name: String,
    pub scale: f64,
    pub kind: FieldKind,
    pub transform: Transform,
    pub role: FieldRole,
}

impl FieldDefinition {
    /// Build a wire field, resolving its transform and role from the name.
    #[must_use]
    pub fn wire(name: impl Into<String>, bits: u32, signed: bool, scale: f64) -> Self {
        let name = name.into();
        Self {
            transform: Transform::for_name(&name),
            role: FieldRole::for_name(&name),
            kind: FieldKind::Wire { bits, signed },
            scale,
            name,
        }
    }

    #[must_use]
    pub fn calculated(field: DerivedField) -> Self {
        let name = match field {
            DerivedField::Iq => names::IQ,
            DerivedField::Id => names::ID,
        };
        Self {
            name: name.to_string(),
            scale: 1.0,
            kind: FieldKind::Calculated(field),
            transform: Transform::Linear,
            role: FieldRole::Data,
        }
    }

    /// Bits occupied on the wire; 0 for calculated fields.
    #[must_use]
    pub fn bit_width(&self) -> u32 {
        match self.kind {
            FieldKind::Wire { bits, .. } => bits,
            FieldKind::Calculated(_) => 0,
        }
    }

    #[must_use]
    pub fn sign_extend(&self) -> bool {
        matches!(self.kind, FieldKind::Wire { signed: true, .. })
    }

    #[must_use]
    pub fn is_calculated(&self) -> bool {
        matches!(self.kind, FieldKind::Calculated(_))
    }

    /// Whether the field appears in tabular and per-channel output.
    #[must_use]
    pub fn is_output(&self) -> bool {
        !matches!(self.role, FieldRole::Checksum | FieldRole::SpotCarrier)
    }
}

/// Schema indices of the inputs to the current transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurrentInputs {
    pub angle: usize,
    pub i1: usize,
    pub i2: usize,
}

/// Schema indices of the spot counter and carrier fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpotFields {
    pub counter: usize,
    pub carrier: usize,
}

/// Ordered field schema for one record, with precomputed layout facts.
///
/// Wire fields appear in the exact order of the source object's keys: that
/// order is the physical bit layout, LSB-first from the start of the record.
/// Calculated fields (if any) follow all wire fields.
///
/// ```text
/// {"0":{"name":"angle","scale":1,"signed":0,"size":16},
///  "1":{"name":"i1","scale":0.01,"signed":1,"size":12}, ...}
///        │
///        ▼
/// [angle:16u][i1:12s][i2:12s]...[csum:8u] + [iq][id]
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct MessageSchema {
    fields: Vec<FieldDefinition>,
    total_bits: u32,
    current: Option<CurrentInputs>,
    spot: Option<SpotFields>,
}

impl MessageSchema {
    /// Parse the raw schema block text.
    ///
    /// # Errors
    ///
    /// - [`TypeError::MalformedJson`] if the text is not valid JSON.
    /// - [`TypeError::InvalidSchema`] if any entry is unusable.
    pub fn parse(text: &[u8]) -> Result<Self, TypeError> {
        let value: Value = serde_json::from_slice(text).map_err(|source| TypeError::MalformedJson {
            block: "schema",
            source,
        })?;
        Self::from_value(&value)
    }

    /// Interpret an already-parsed schema object.
    ///
    /// Each entry must be an object with a string `name` and an integer
    /// `size` in `1..=32`. `scale` defaults to 1.0 and `signed` (boolean or
    /// integer) defaults to unsigned.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::InvalidSchema`] if the root is not an object,
    /// an entry is malformed, a name repeats, or there are no wire fields.
    pub fn from_value(value: &Value) -> Result<Self, TypeError> {
        let entries = value
            .as_object()
            .ok_or_else(|| invalid("schema block is not an object"))?;

        let mut fields = Vec::with_capacity(entries.len() + 2);
        for (key, entry) in entries {
            fields.push(parse_entry(key, entry)?);
        }
        Self::from_wire_fields(fields)
    }

    /// Build a schema from wire fields in layout order, appending the
    /// calculated current fields when their inputs are present.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::InvalidSchema`] on duplicate names, a
    /// calculated field in the input, or an empty field list.
    pub fn from_wire_fields(mut fields: Vec<FieldDefinition>) -> Result<Self, TypeError> {
        if fields.is_empty() {
            return Err(invalid("schema defines no wire fields"));
        }

        let mut seen = HashSet::new();
        let mut total_bits = 0u32;
        for field in &fields {
            if field.is_calculated() {
                return Err(invalid(format!("field {:?} has no wire width", field.name)));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(invalid(format!("duplicate field name {:?}", field.name)));
            }
            total_bits += field.bit_width();
        }

        let position = |name: &str| fields.iter().position(|f| f.name == name);

        let current = match (position(names::ANGLE), position(names::I1), position(names::I2)) {
            (Some(angle), Some(i1), Some(i2)) => Some(CurrentInputs { angle, i1, i2 }),
            _ => None,
        };
        let spot = match (position(names::SPOT_COUNTER), position(names::SPOT_CARRIER)) {
            (Some(counter), Some(carrier)) => Some(SpotFields { counter, carrier }),
            _ => None,
        };

        if current.is_some() {
            for derived in [names::IQ, names::ID] {
                if seen.contains(derived) {
                    return Err(invalid(format!(
                        "wire field {derived:?} collides with the calculated current field"
                    )));
                }
            }
            fields.push(FieldDefinition::calculated(DerivedField::Iq));
            fields.push(FieldDefinition::calculated(DerivedField::Id));
        }

        Ok(Self {
            fields,
            total_bits,
            current,
            spot,
        })
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Sum of all wire field widths.
    #[must_use]
    pub fn total_bits(&self) -> u32 {
        self.total_bits
    }

    /// Record length on the wire, rounded up to whole bytes.
    #[must_use]
    pub fn record_bytes(&self) -> usize {
        self.total_bits.div_ceil(8) as usize
    }

    #[must_use]
    pub fn current_inputs(&self) -> Option<CurrentInputs> {
        self.current
    }

    #[must_use]
    pub fn spot_fields(&self) -> Option<SpotFields> {
        self.spot
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Wire fields with their schema index, in bit-layout order.
    pub fn wire_fields(&self) -> impl Iterator<Item = (usize, &FieldDefinition)> {
        self.fields.iter().enumerate().filter(|(_, f)| !f.is_calculated())
    }

    /// Output fields with their schema index, in column order.
    pub fn output_fields(&self) -> impl Iterator<Item = (usize, &FieldDefinition)> {
        self.fields.iter().enumerate().filter(|(_, f)| f.is_output())
    }
}

fn invalid(reason: impl Into<String>) -> TypeError {
    TypeError::InvalidSchema {
        reason: reason.into(),
    }
}

fn parse_entry(key: &str, entry: &Value) -> Result<FieldDefinition, TypeError> {
    let entry = entry
        .as_object()
        .ok_or_else(|| invalid(format!("entry {key:?} is not an object")))?;

    let name = entry
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(format!("entry {key:?} has no name")))?;

    let bits = entry
        .get("size")
        .and_then(Value::as_u64)
        .ok_or_else(|| invalid(format!("field {name:?} has no integer size")))?;
    let bits = u32::try_from(bits)
        .ok()
        .filter(|b| (1..=MAX_FIELD_BITS).contains(b))
        .ok_or_else(|| invalid(format!("field {name:?} size {bits} outside 1..=32")))?;

    let scale = entry.get("scale").and_then(Value::as_f64).unwrap_or(1.0);
    let signed = match entry.get("signed") {
        Some(Value::Bool(b)) => *b,
        Some(v) => v.as_i64().is_some_and(|n| n != 0),
        None => false,
    };

    Ok(FieldDefinition::wire(name, bits, signed, scale))
}
