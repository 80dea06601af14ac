use std::fs::File;
use std::io::Write;
use std::path::Path;

use mclog_types::{DecodedRecord, MessageSchema};

use crate::error::SinkError;
use crate::sink::LogSink;

/// First column of every CSV output.
pub const TIME_COLUMN: &str = "Time(s)";

/// One CSV row per decoded record: elapsed time, then every output field
/// (calculated `iq`/`id` included) in schema order.
///
/// ```text
/// Time(s),angle,i1,i2,count,iq,id
/// 0,179.99,1.25,-0.5,0,...
/// ```
pub struct MotorCsvSink<W: Write = File> {
    writer: csv::Writer<W>,
    columns: Vec<usize>,
    row: Vec<String>,
}

impl MotorCsvSink<File> {
    /// Create `path` and write the header row.
    ///
    /// # Errors
    ///
    /// [`SinkError::Create`] if the file cannot be created.
    pub fn create(path: &Path, schema: &MessageSchema) -> Result<Self, SinkError> {
        let file = File::create(path).map_err(|e| SinkError::create(path, e))?;
        Self::from_writer(file, schema)
    }
}

impl<W: Write> MotorCsvSink<W> {
    /// # Errors
    ///
    /// [`SinkError::Csv`] if the header row cannot be written.
    pub fn from_writer(inner: W, schema: &MessageSchema) -> Result<Self, SinkError> {
        let mut writer = csv::Writer::from_writer(inner);

        let columns: Vec<usize> = schema.output_fields().map(|(i, _)| i).collect();
        let mut header = Vec::with_capacity(columns.len() + 1);
        header.push(TIME_COLUMN);
        header.extend(schema.output_fields().map(|(_, f)| f.name.as_str()));
        writer.write_record(&header)?;

        Ok(Self {
            writer,
            row: Vec::with_capacity(columns.len() + 1),
            columns,
        })
    }

    /// Flush and hand back the underlying writer.
    ///
    /// # Errors
    ///
    /// [`SinkError::Io`] if buffered rows cannot be flushed.
    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer
            .into_inner()
            .map_err(|e| SinkError::Io(e.into_error()))
    }
}

impl<W: Write> LogSink for MotorCsvSink<W> {
    fn name(&self) -> &'static str {
        "motor csv"
    }

    fn record(&mut self, record: &DecodedRecord) -> Result<(), SinkError> {
        self.row.clear();
        self.row.push(record.time.to_string());
        self.row
            .extend(self.columns.iter().map(|&i| record.values[i].to_string()));
        self.writer.write_record(&self.row)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}
