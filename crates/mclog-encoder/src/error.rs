use mclog_types::TypeError;
use mclog_wire::WireError;

/// Errors that can occur while building a log.
///
/// ```text
///   EncodeError
///   ├── ChecksumNotTrailing ← schema does not end in a byte-aligned 8-bit csum
///   ├── FieldCount          ← wrong number of values for one record
///   ├── ValueOutOfRange     ← value does not fit its field width
///   ├── Schema(TypeError)   ← schema text rejected by the parser
///   └── Wire(WireError)     ← from the bit writer
/// ```
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("schema must end with a byte-aligned 8-bit csum field")]
    ChecksumNotTrailing,

    #[error("record needs {expected} wire values, got {got}")]
    FieldCount { expected: usize, got: usize },

    #[error("value {value} does not fit field {field:?} ({bits} bits, signed: {signed})")]
    ValueOutOfRange {
        field: String,
        value: i64,
        bits: u32,
        signed: bool,
    },

    #[error(transparent)]
    Schema(#[from] TypeError),

    #[error(transparent)]
    Wire(#[from] WireError),
}
