use mclog_types::{DecodedRecord, SpotRow};

use crate::error::SinkError;

/// Destination for decoded output.
///
/// A sink is fully set up (file created, header row written) by its own
/// constructor, so the trait only covers the per-record stream and the
/// final flush:
///
/// ```text
///   create ──▶ record / spot_row  (× N, stream order) ──▶ finish
/// ```
///
/// Both per-row hooks default to no-ops; each sink overrides the one it
/// cares about.
pub trait LogSink {
    /// Short label used in log messages.
    fn name(&self) -> &'static str;

    /// Called once per valid record.
    ///
    /// # Errors
    ///
    /// Any write failure.
    fn record(&mut self, _record: &DecodedRecord) -> Result<(), SinkError> {
        Ok(())
    }

    /// Called once per completed spot sweep.
    ///
    /// # Errors
    ///
    /// Any write failure.
    fn spot_row(&mut self, _row: &SpotRow) -> Result<(), SinkError> {
        Ok(())
    }

    /// Flush and close. Called exactly once, after the last row.
    ///
    /// # Errors
    ///
    /// Any write, flush or packaging failure.
    fn finish(&mut self) -> Result<(), SinkError>;
}

/// Fan-out over every sink that opened successfully.
///
/// Sinks that fail to open are reported and left out, so a run that can
/// only write some of its outputs still produces those.
#[derive(Default)]
pub struct SinkSet {
    sinks: Vec<Box<dyn LogSink>>,
}

impl SinkSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: Box<dyn LogSink>) {
        self.sinks.push(sink);
    }

    /// Add the sink built by `open`, or log the failure and skip it.
    /// Returns whether the sink was added.
    pub fn open_or_skip<S, F>(&mut self, label: &str, open: F) -> bool
    where
        S: LogSink + 'static,
        F: FnOnce() -> Result<S, SinkError>,
    {
        match open() {
            Ok(sink) => {
                tracing::debug!(sink = sink.name(), "sink opened");
                self.sinks.push(Box::new(sink));
                true
            }
            Err(e) => {
                tracing::warn!(sink = label, error = %e, "sink disabled");
                false
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.sinks.iter().map(|s| s.name())
    }

    /// # Errors
    ///
    /// The first sink write failure.
    pub fn record(&mut self, record: &DecodedRecord) -> Result<(), SinkError> {
        self.sinks.iter_mut().try_for_each(|s| s.record(record))
    }

    /// # Errors
    ///
    /// The first sink write failure.
    pub fn spot_row(&mut self, row: &SpotRow) -> Result<(), SinkError> {
        self.sinks.iter_mut().try_for_each(|s| s.spot_row(row))
    }

    /// Finish every sink, even after one fails. Returns the first error.
    ///
    /// # Errors
    ///
    /// The first failure from any sink's [`LogSink::finish`].
    pub fn finish(&mut self) -> Result<(), SinkError> {
        let mut first = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.finish() {
                tracing::warn!(sink = sink.name(), error = %e, "sink failed to finish");
                first.get_or_insert(e);
            }
        }
        first.map_or(Ok(()), Err)
    }
}
