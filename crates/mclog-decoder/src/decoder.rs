use std::collections::VecDeque;
use std::io::{BufReader, Read};

use mclog_types::{
    DecodedRecord, DerivedField, FieldKind, LogHeader, MessageSchema, ParameterBlock, SpotRow,
};
use mclog_wire::framing::{Frame, MAX_RECORD_BYTES, RecordStream};
use mclog_wire::header::extract_json_block;

use crate::derived::dq_currents;
use crate::error::{DecodeError, HeaderBlock};
use crate::raw::{RawValue, read_raw};
use crate::spot::SpotDemux;
use crate::transform::physical_value;

/// Seconds of data between progress log lines.
const PROGRESS_INTERVAL_SECS: u64 = 60;

/// Record alignment state.
///
/// ```text
///              csum ok
///   ┌─────────────┐ ──────────▶ ┌────────┐
///   │ SeekingSync │             │ Synced │
///   └─────────────┘ ◀────────── └────────┘
///        ▲   │       csum bad       │  ▲
///        └───┘ csum bad             └──┘ csum ok
/// ```
///
/// Only the `Synced → SeekingSync` edge is reported, as
/// [`DecoderEvent::SyncLost`]. Skips while hunting for the first valid
/// record are silent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncState {
    #[default]
    SeekingSync,
    Synced,
}

/// Events produced by [`LogDecoder`], in stream order.
///
/// When a record completes a spot sweep, its `SpotRow` is emitted before
/// the `Record` itself; both carry the same elapsed time.
#[derive(Clone, Debug, PartialEq)]
pub enum DecoderEvent {
    /// A checksum-valid record, fully transformed.
    Record(DecodedRecord),

    /// A complete sweep of the spot channel.
    SpotRow(SpotRow),

    /// A checksum mismatch after at least one valid record. `offset` is the
    /// absolute stream position of the first rejected candidate.
    SyncLost { offset: u64 },
}

/// Running totals for one decode run.
///
/// A run that reaches end of stream always produces a summary, even when
/// `records` is zero. Fatal conditions are reported as [`DecodeError`]
/// instead, so the two outcomes never overlap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeSummary {
    /// Valid records decoded.
    pub records: u64,
    /// Times alignment was lost after valid data had been seen.
    pub lost_sync_events: u64,
    /// Bytes discarded by resynchronisation, including any leading junk.
    pub bytes_skipped: u64,
    /// Spot rows emitted.
    pub spot_rows: u64,
}

/// Streaming decoder for one motor-controller log.
///
/// [`open`](Self::open) consumes both JSON header blocks and fails fast on
/// any fatal header problem. Records are then pulled one at a time via
/// [`next_event`](Self::next_event) or the `Iterator` impl; nothing past
/// the current record is buffered beyond the framing read-ahead.
///
/// # Example
///
/// ```rust,no_run
/// use std::fs::File;
/// use mclog_decoder::{DecoderEvent, LogDecoder};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let file = File::open("capture.bin")?;
/// let mut decoder = LogDecoder::open(file)?;
/// while let Some(event) = decoder.next_event()? {
///     if let DecoderEvent::Record(record) = event {
///         println!("{:.6} {:?}", record.time, record.values);
///     }
/// }
/// println!("{:?}", decoder.summary());
/// # Ok(())
/// # }
/// ```
pub struct LogDecoder<R> {
    header: LogHeader,
    stream: RecordStream<BufReader<R>>,
    demux: Option<SpotDemux>,
    raw: Vec<RawValue>,
    pending: VecDeque<DecoderEvent>,
    state: SyncState,
    summary: DecodeSummary,
    progress_every: u64,
    finished: bool,
}

/// Outcome of one framing step, detached from the stream's buffer borrow.
enum Step {
    Record,
    Skipped { offset: u64 },
    End,
}

impl<R: Read> LogDecoder<R> {
    /// Read both header blocks from `reader` and prepare to stream records.
    ///
    /// The parameter block is parsed and validated before the schema block
    /// is even located, so a missing required parameter is reported ahead
    /// of any schema problem.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::IncompleteHeader`] if the stream ends before a block
    ///   starts, or before the parameter block closes.
    /// - [`DecodeError::MissingRequiredParameter`] if frequency or pwm max
    ///   cannot be resolved.
    /// - [`DecodeError::InvalidSchema`] if the schema block never closes or
    ///   describes an unusable layout.
    /// - [`DecodeError::RecordTooLarge`] if the record length exceeds
    ///   [`MAX_RECORD_BYTES`].
    /// - [`DecodeError::MalformedHeader`] if either block is not JSON.
    pub fn open(reader: R) -> Result<Self, DecodeError> {
        let mut reader = BufReader::new(reader);

        let param_block = extract_json_block(&mut reader)
            .map_err(|e| DecodeError::from_extraction(HeaderBlock::Parameters, e))?;
        let ParameterBlock {
            parameters,
            spot_lookup,
        } = ParameterBlock::parse(&param_block.text)?;

        let schema_block = extract_json_block(&mut reader)
            .map_err(|e| DecodeError::from_extraction(HeaderBlock::Schema, e))?;
        let schema = MessageSchema::parse(&schema_block.text)?;

        let record_len = schema.record_bytes();
        if record_len > MAX_RECORD_BYTES {
            return Err(DecodeError::RecordTooLarge {
                bytes: record_len,
                limit: MAX_RECORD_BYTES,
            });
        }

        let offset = (param_block.consumed() + schema_block.consumed()) as u64;
        let stream = RecordStream::new(reader, record_len, offset)?;

        tracing::info!(
            frequency_hz = parameters.frequency_hz,
            pwm_max = parameters.pwm_max,
            modulation_max = parameters.modulation_max,
            fields = schema.len(),
            record_bytes = record_len,
            spot_slots = spot_lookup.len(),
            "log header parsed"
        );

        let demux = schema
            .spot_fields()
            .map(|_| SpotDemux::new(spot_lookup.clone()));

        let mut raw = param_block.text;
        raw.extend_from_slice(&schema_block.text);

        let progress_every = u64::from(parameters.frequency_hz) * PROGRESS_INTERVAL_SECS;
        let field_count = schema.len();

        tracing::info!(offset, "record decoding started");

        Ok(Self {
            header: LogHeader {
                parameters,
                spot_lookup,
                schema,
                raw,
            },
            stream,
            demux,
            raw: Vec::with_capacity(field_count),
            pending: VecDeque::with_capacity(2),
            state: SyncState::SeekingSync,
            summary: DecodeSummary::default(),
            progress_every,
            finished: false,
        })
    }

    #[must_use]
    pub fn header(&self) -> &LogHeader {
        &self.header
    }

    /// Verbatim bytes of the parameter block followed by the schema block.
    #[must_use]
    pub fn raw_header(&self) -> &[u8] {
        &self.header.raw
    }

    #[must_use]
    pub fn summary(&self) -> DecodeSummary {
        self.summary
    }

    #[must_use]
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Pull the next event, or `Ok(None)` at end of stream.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Wire`] if the underlying reader fails. After
    /// an error the decoder yields no further events.
    pub fn next_event(&mut self) -> Result<Option<DecoderEvent>, DecodeError> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(Some(event));
            }
            if self.finished {
                return Ok(None);
            }

            match self.step() {
                Ok(Step::Record) => self.emit_record(),
                Ok(Step::Skipped { offset }) => self.note_skip(offset),
                Ok(Step::End) => {
                    self.finished = true;
                    tracing::info!(
                        records = self.summary.records,
                        lost_sync_events = self.summary.lost_sync_events,
                        bytes_skipped = self.summary.bytes_skipped,
                        spot_rows = self.summary.spot_rows,
                        "record decoding complete"
                    );
                }
                Err(e) => {
                    self.finished = true;
                    return Err(e);
                }
            }
        }
    }

    /// Advance the framing by one record or one byte. A valid record's raw
    /// fields are left in `self.raw`.
    fn step(&mut self) -> Result<Step, DecodeError> {
        match self.stream.next_frame()? {
            Some(Frame::Record { bytes, .. }) => {
                read_raw(&self.header.schema, bytes, &mut self.raw)?;
                Ok(Step::Record)
            }
            Some(Frame::Skipped { offset, .. }) => Ok(Step::Skipped { offset }),
            None => Ok(Step::End),
        }
    }

    fn note_skip(&mut self, offset: u64) {
        self.summary.bytes_skipped += 1;
        tracing::debug!(offset, "checksum mismatch, skipping one byte");

        if self.state == SyncState::Synced {
            self.state = SyncState::SeekingSync;
            self.summary.lost_sync_events += 1;
            tracing::warn!(offset, "message lost");
            self.pending.push_back(DecoderEvent::SyncLost { offset });
        }
    }

    fn emit_record(&mut self) {
        self.state = SyncState::Synced;

        let index = self.summary.records;
        let params = &self.header.parameters;
        let schema = &self.header.schema;
        let time = params.time_of(index);

        let mut values: Vec<f64> = schema
            .fields()
            .iter()
            .zip(&self.raw)
            .map(|(field, &raw)| match field.kind {
                FieldKind::Wire { .. } => physical_value(field, raw, params),
                FieldKind::Calculated(_) => 0.0,
            })
            .collect();

        if let Some(inputs) = schema.current_inputs() {
            let dq = dq_currents(values[inputs.angle], values[inputs.i1], values[inputs.i2]);
            for (value, field) in values.iter_mut().zip(schema.fields()) {
                match field.kind {
                    FieldKind::Calculated(DerivedField::Iq) => *value = dq.iq,
                    FieldKind::Calculated(DerivedField::Id) => *value = dq.id,
                    FieldKind::Wire { .. } => {}
                }
            }
        }

        if let (Some(demux), Some(spot)) = (self.demux.as_mut(), schema.spot_fields()) {
            let counter = self.raw[spot.counter].bits;
            let carrier = self.raw[spot.carrier].bits;
            if let Some(row) = demux.feed(counter, carrier, time) {
                self.summary.spot_rows += 1;
                self.pending.push_back(DecoderEvent::SpotRow(row));
            }
        }

        self.pending
            .push_back(DecoderEvent::Record(DecodedRecord { index, time, values }));

        self.summary.records += 1;
        if self.progress_every > 0 && self.summary.records % self.progress_every == 0 {
            let minutes = self.summary.records / self.progress_every;
            tracing::info!(minutes, "decoded {minutes} minutes of data");
        }
    }
}

impl<R: Read> Iterator for LogDecoder<R> {
    type Item = Result<DecoderEvent, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}

/// Fully decoded log held in memory.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedLog {
    pub header: LogHeader,
    pub records: Vec<DecodedRecord>,
    pub spot_rows: Vec<SpotRow>,
    pub summary: DecodeSummary,
}

/// Decode an entire log into memory. Convenient for tests and small
/// captures; large files should stream through [`LogDecoder`].
///
/// # Errors
///
/// Any fatal [`DecodeError`] from [`LogDecoder::open`] or the reader.
pub fn decode_log<R: Read>(reader: R) -> Result<DecodedLog, DecodeError> {
    let mut decoder = LogDecoder::open(reader)?;
    let mut records = Vec::new();
    let mut spot_rows = Vec::new();

    while let Some(event) = decoder.next_event()? {
        match event {
            DecoderEvent::Record(record) => records.push(record),
            DecoderEvent::SpotRow(row) => spot_rows.push(row),
            DecoderEvent::SyncLost { .. } => {}
        }
    }

    Ok(DecodedLog {
        summary: decoder.summary(),
        header: decoder.header,
        records,
        spot_rows,
    })
}
