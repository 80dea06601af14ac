use std::io::{ErrorKind, Read};

use crate::checksum::verify_record;
use crate::error::WireError;

/// Largest record the producer firmware can emit, in bytes.
pub const MAX_RECORD_BYTES: usize = 25;

/// Bytes requested from the underlying reader per refill.
const READ_CHUNK: usize = 8 * 1024;

/// One step of the record stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Frame<'a> {
    /// A checksum-valid record, already consumed from the stream.
    Record { offset: u64, bytes: &'a [u8] },

    /// The candidate at `offset` failed its checksum; exactly one byte was
    /// discarded and the next call retries one byte further on.
    Skipped { offset: u64, byte: u8 },
}

/// Fixed-length record framing with byte-wise resynchronisation.
///
/// Each call to [`next_frame`](Self::next_frame) peeks `record_len` bytes
/// without consuming them and checks the trailing additive checksum:
///
/// ```text
///            peek record_len bytes
///                    │
///          ┌─────────┴─────────┐
///      csum ok             csum bad
///          │                   │
///   consume record_len    consume 1 byte
///   → Frame::Record       → Frame::Skipped
/// ```
///
/// A bad checksum is never treated as "skip one record": the stream slides
/// forward a single byte at a time until alignment is found again. The
/// stream ends (`Ok(None)`) once fewer than `record_len` bytes remain.
#[derive(Debug)]
pub struct RecordStream<R> {
    reader: R,
    buf: Vec<u8>,
    start: usize,
    record_len: usize,
    offset: u64,
    eof: bool,
}

impl<R: Read> RecordStream<R> {
    /// Wrap `reader`, positioned on the first record byte. `offset` is the
    /// absolute stream position of that byte, used only for reporting.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::ZeroLengthRecord`] if `record_len` is zero.
    pub fn new(reader: R, record_len: usize, offset: u64) -> Result<Self, WireError> {
        if record_len == 0 {
            return Err(WireError::ZeroLengthRecord);
        }
        Ok(Self {
            reader,
            buf: Vec::with_capacity(READ_CHUNK),
            start: 0,
            record_len,
            offset,
            eof: false,
        })
    }

    /// Absolute offset of the next unconsumed byte.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Advance by one record or one byte.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::Io`] if the underlying reader fails.
    pub fn next_frame(&mut self) -> Result<Option<Frame<'_>>, WireError> {
        if !self.fill()? {
            return Ok(None);
        }

        let begin = self.start;
        let offset = self.offset;
        let candidate = &self.buf[begin..begin + self.record_len];

        if verify_record(candidate) {
            self.start += self.record_len;
            self.offset += self.record_len as u64;
            Ok(Some(Frame::Record {
                offset,
                bytes: &self.buf[begin..begin + self.record_len],
            }))
        } else {
            let byte = candidate[0];
            self.start += 1;
            self.offset += 1;
            Ok(Some(Frame::Skipped { offset, byte }))
        }
    }

    /// Make sure at least `record_len` unconsumed bytes are buffered.
    /// Returns `false` when the reader is exhausted first.
    fn fill(&mut self) -> Result<bool, WireError> {
        while self.buf.len() - self.start < self.record_len {
            if self.eof {
                return Ok(false);
            }

            if self.start > 0 {
                self.buf.drain(..self.start);
                self.start = 0;
            }

            let mut chunk = [0u8; READ_CHUNK];
            match self.reader.read(&mut chunk) {
                Ok(0) => self.eof = true,
                Ok(n) => self.buf.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(WireError::Io(e)),
            }
        }
        Ok(true)
    }
}
