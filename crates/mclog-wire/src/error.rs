/// Byte-level errors raised while scanning the embedded JSON blocks or
/// walking the record stream.
///
/// Everything above this layer (parameter and schema interpretation) lives
/// in `mclog-types`; the wire crate only knows about bytes, braces and bits.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The stream ended before a brace-balanced JSON object was closed.
    ///
    /// `scanned` counts every byte consumed by the extractor, including the
    /// bytes skipped while looking for the opening brace. `depth` is the
    /// brace depth at end of input (0 means no `{` was ever seen).
    #[error("stream ended inside JSON header after {scanned} bytes (brace depth {depth})")]
    IncompleteHeader { scanned: usize, depth: usize },

    /// A bit field needed more bytes than the record holds.
    #[error("bit field of width {width} runs past end of record at byte {offset}")]
    UnexpectedEof { offset: usize, width: u32 },

    /// A bit field wider than the 32-bit accumulator contract.
    #[error("bit width {width} out of range 1..=32")]
    InvalidBitWidth { width: u32 },

    /// A record stream was configured with a zero-length record.
    #[error("record length must be at least one byte")]
    ZeroLengthRecord,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
