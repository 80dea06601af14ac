use std::fmt;

use mclog_types::TypeError;
use mclog_wire::WireError;

/// Which of the two embedded JSON blocks an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderBlock {
    Parameters,
    Schema,
}

impl fmt::Display for HeaderBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parameters => f.write_str("parameter"),
            Self::Schema => f.write_str("schema"),
        }
    }
}

/// Fatal decode failures. Any of these aborts the whole run.
///
/// Checksum mismatches are not errors: they trigger byte-wise
/// resynchronisation and surface as [`DecoderEvent::SyncLost`] events, not
/// errors. A log that is well formed but holds no valid records decodes
/// successfully with a record count of zero.
///
/// ```text
///   DecodeError
///   ├── IncompleteHeader          ← stream ended before a JSON block closed
///   ├── InvalidSchema             ← schema block unclosed or unusable
///   ├── MissingRequiredParameter  ← pwmirqfrq / pwmmax unresolved
///   ├── MalformedHeader(TypeError)← block text is not valid JSON
///   ├── RecordTooLarge            ← schema implies > MAX_RECORD_BYTES
///   └── Wire(WireError)           ← I/O and bit-level failures
/// ```
///
/// [`DecoderEvent::SyncLost`]: crate::DecoderEvent::SyncLost
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("stream ended before the {block} block closed ({scanned} bytes scanned)")]
    IncompleteHeader { block: HeaderBlock, scanned: usize },

    #[error("invalid schema: {reason}")]
    InvalidSchema { reason: String },

    #[error("required parameter {name} is missing")]
    MissingRequiredParameter { name: &'static str },

    #[error("malformed header: {0}")]
    MalformedHeader(#[source] TypeError),

    /// The schema describes a record longer than the decoder buffers.
    #[error("record length {bytes} bytes exceeds limit of {limit}")]
    RecordTooLarge { bytes: usize, limit: usize },

    #[error(transparent)]
    Wire(#[from] WireError),
}

impl From<TypeError> for DecodeError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::MissingRequiredParameter { name } => Self::MissingRequiredParameter { name },
            TypeError::InvalidSchema { reason } => Self::InvalidSchema { reason },
            other @ TypeError::MalformedJson { .. } => Self::MalformedHeader(other),
        }
    }
}

impl DecodeError {
    /// Map a header-extraction failure for `block` onto the decode taxonomy.
    ///
    /// A schema block that was opened but never closed is an invalid schema;
    /// a stream that ends before a block even starts is an incomplete header.
    pub(crate) fn from_extraction(block: HeaderBlock, err: WireError) -> Self {
        match err {
            WireError::IncompleteHeader { scanned, depth } => {
                if block == HeaderBlock::Schema && depth > 0 {
                    Self::InvalidSchema {
                        reason: format!("schema block never closed (depth {depth} after {scanned} bytes)"),
                    }
                } else {
                    Self::IncompleteHeader { block, scanned }
                }
            }
            other => Self::Wire(other),
        }
    }
}
