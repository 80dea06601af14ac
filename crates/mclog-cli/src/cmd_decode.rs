/// Implementation of `mclog decode`.
///
/// Opens the log, parses both header blocks (any header problem is fatal),
/// then streams every record through the selected sinks. An output that
/// cannot be opened is logged and skipped; decoding carries on with the
/// rest.
///
/// # Output
///
/// ```text
/// decoded 52734 records (6.000 s), 411 spot rows
/// sync lost 2 times, 57 bytes skipped
/// ```
use std::fs::File;

use anyhow::{Context, Result};
use mclog_decoder::{DecoderEvent, LogDecoder};
use mclog_sinks::{
    ChannelSampleSink, MotorCsvSink, OutputPaths, OutputSelection, SinkSet, SpotCsvSink, ZipCommand,
    write_json_passthrough,
};

use crate::DecodeArgs;

/// Run the `mclog decode` command.
///
/// # Errors
///
/// Returns an error if the source cannot be opened, a header block is
/// unusable, or a sink fails while writing.
pub fn run(args: &DecodeArgs) -> Result<()> {
    let selection =
        OutputSelection::from_flags(args.pulseview, args.motor_csv, args.spot_csv, args.json, args.all);
    let base = args
        .dest
        .clone()
        .unwrap_or_else(|| OutputPaths::base_for_source(&args.source));
    let paths = OutputPaths::from_base(base);

    let file = File::open(&args.source)
        .with_context(|| format!("cannot open {}", args.source.display()))?;

    tracing::info!(source = %args.source.display(), "processing input file header");
    let mut decoder = LogDecoder::open(file)
        .with_context(|| format!("cannot decode header of {}", args.source.display()))?;

    if selection.json
        && let Err(e) = write_json_passthrough(&paths.json, decoder.raw_header())
    {
        tracing::warn!(error = %e, "json output disabled");
    }

    if !selection.needs_records() {
        return Ok(());
    }

    let header = decoder.header().clone();
    let mut sinks = SinkSet::new();
    if selection.motor_csv {
        sinks.open_or_skip("motor csv", || MotorCsvSink::create(&paths.motor_csv, &header.schema));
    }
    if selection.spot_csv {
        sinks.open_or_skip("spot csv", || SpotCsvSink::create(&paths.spot_csv, &header.spot_lookup));
    }
    if selection.pulseview {
        let packager = Box::new(ZipCommand::new(args.zip.as_str()));
        sinks.open_or_skip("pulseview", || {
            ChannelSampleSink::packaged(&paths.pulseview, &header, packager)
        });
    }

    while let Some(event) = decoder.next_event().context("record stream failed")? {
        match event {
            DecoderEvent::Record(record) => sinks.record(&record)?,
            DecoderEvent::SpotRow(row) => sinks.spot_row(&row)?,
            DecoderEvent::SyncLost { .. } => {}
        }
    }
    sinks.finish().context("failed to finish outputs")?;

    let summary = decoder.summary();
    #[allow(clippy::cast_precision_loss)]
    let seconds = summary.records as f64 / f64::from(header.parameters.frequency_hz);
    println!(
        "decoded {} records ({seconds:.3} s), {} spot rows",
        summary.records, summary.spot_rows
    );
    println!(
        "sync lost {} times, {} bytes skipped",
        summary.lost_sync_events, summary.bytes_skipped
    );

    Ok(())
}
