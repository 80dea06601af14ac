use std::fs::File;
use std::io::Write;
use std::path::Path;

use mclog_types::{SpotLookup, SpotRow};

use crate::error::SinkError;
use crate::motor_csv::TIME_COLUMN;
use crate::sink::LogSink;

/// One CSV row per completed spot sweep, columns in spot-lookup order.
pub struct SpotCsvSink<W: Write = File> {
    writer: csv::Writer<W>,
    row: Vec<String>,
}

impl SpotCsvSink<File> {
    /// Create `path` and write the header row.
    ///
    /// # Errors
    ///
    /// [`SinkError::Create`] if the file cannot be created.
    pub fn create(path: &Path, lookup: &SpotLookup) -> Result<Self, SinkError> {
        let file = File::create(path).map_err(|e| SinkError::create(path, e))?;
        Self::from_writer(file, lookup)
    }
}

impl<W: Write> SpotCsvSink<W> {
    /// # Errors
    ///
    /// [`SinkError::Csv`] if the header row cannot be written.
    pub fn from_writer(inner: W, lookup: &SpotLookup) -> Result<Self, SinkError> {
        let mut writer = csv::Writer::from_writer(inner);
        writer.write_record(std::iter::once(TIME_COLUMN).chain(lookup.names()))?;
        Ok(Self {
            writer,
            row: Vec::with_capacity(lookup.len() + 1),
        })
    }

    /// # Errors
    ///
    /// [`SinkError::Io`] if buffered rows cannot be flushed.
    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer
            .into_inner()
            .map_err(|e| SinkError::Io(e.into_error()))
    }
}

impl<W: Write> LogSink for SpotCsvSink<W> {
    fn name(&self) -> &'static str {
        "spot csv"
    }

    fn spot_row(&mut self, row: &SpotRow) -> Result<(), SinkError> {
        self.row.clear();
        self.row.push(row.time.to_string());
        self.row.extend(row.values.iter().map(f64::to_string));
        self.writer.write_record(&self.row)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}
