use std::io::Read;

use crate::error::WireError;

/// Opening delimiter of an embedded JSON object.
pub const OPEN_BRACE: u8 = b'{';

/// Closing delimiter of an embedded JSON object.
pub const CLOSE_BRACE: u8 = b'}';

/// One brace-balanced JSON object lifted out of the binary stream.
///
/// The log producer writes two of these back to back at the start of every
/// log, with no length prefix:
///
/// ```text
/// ┌──────────────┬──────────────────────┬──────────────┬─────────────────────┬──────────────┐
/// │ junk (0..n)  │ {parameter block}    │ junk (0..n)  │ {schema block}      │ records ...  │
/// └──────────────┴──────────────────────┴──────────────┴─────────────────────┴──────────────┘
/// ```
///
/// `text` holds the object exactly as it appeared on the wire, from the
/// opening `{` through the matching `}` inclusive. `skipped` is the number
/// of bytes discarded before the opening brace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JsonBlock {
    pub text: Vec<u8>,
    pub skipped: usize,
}

impl JsonBlock {
    /// Total bytes consumed from the reader to produce this block.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.skipped + self.text.len()
    }
}

/// Pull the next brace-balanced JSON object out of `reader`.
///
/// Bytes are skipped until the first `{`. From there every byte is kept and
/// the brace depth is tracked: `{` increments it, `}` decrements it, and the
/// object is complete the moment depth returns to zero. Not a single byte
/// past the closing brace is consumed, so the reader is left positioned on
/// whatever follows (the next header block, or the first record).
///
/// Braces are counted without regard to JSON string literals. A value such
/// as `"a}b"` therefore closes the object early; see the tests below for the
/// pinned behaviour.
///
/// Reads one byte at a time, so callers should hand in a buffered reader.
///
/// # Errors
///
/// - [`WireError::IncompleteHeader`] if the stream ends before depth
///   returns to zero (or before any `{` is found).
/// - [`WireError::Io`] on any other read failure.
pub fn extract_json_block<R: Read>(reader: &mut R) -> Result<JsonBlock, WireError> {
    let mut text = Vec::new();
    let mut skipped = 0usize;
    let mut depth = 0usize;

    for byte in reader.by_ref().bytes() {
        let byte = byte?;

        if depth == 0 {
            if byte != OPEN_BRACE {
                skipped += 1;
                continue;
            }
            text.push(byte);
            depth = 1;
            continue;
        }

        text.push(byte);
        match byte {
            OPEN_BRACE => depth += 1,
            CLOSE_BRACE => {
                depth -= 1;
                if depth == 0 {
                    return Ok(JsonBlock { text, skipped });
                }
            }
            _ => {}
        }
    }

    Err(WireError::IncompleteHeader {
        scanned: skipped + text.len(),
        depth,
    })
}
