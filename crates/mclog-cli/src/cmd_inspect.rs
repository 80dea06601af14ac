/// Implementation of `mclog inspect`.
///
/// Parses the two header blocks and prints what the decoder will do with
/// them. With `--scan`, also runs the record stream to the end without
/// writing anything and reports the sync statistics.
///
/// # Output format
///
/// ```text
/// Parameters: 8789 Hz, pwmmax 8192, modmax 37636.04
/// Spot lookup: 2 slots
///   [0] vbus
///   [1] temp
/// Schema: 9 fields, 72 bits, 9 bytes per record
///   #  name     bits  signed  scale     transform          output
///   0  angle      16  no      1         AngleDegrees       yes
///   1  i1         12  yes     0.01      Linear             yes
///   ...
///   7  iq          -  -       -         Iq current         yes
/// ```
use std::fs::File;

use anyhow::{Context, Result};
use mclog_decoder::LogDecoder;
use mclog_types::{FieldKind, LogHeader};

use crate::InspectArgs;

/// Run the `mclog inspect` command.
///
/// # Errors
///
/// Returns an error if the source cannot be opened or its header is
/// unusable.
pub fn run(args: &InspectArgs) -> Result<()> {
    let file = File::open(&args.source)
        .with_context(|| format!("cannot open {}", args.source.display()))?;
    let mut decoder = LogDecoder::open(file)
        .with_context(|| format!("cannot decode header of {}", args.source.display()))?;

    print_header(decoder.header());

    if args.scan {
        for event in decoder.by_ref() {
            event.context("record stream failed")?;
        }
        let summary = decoder.summary();
        println!("---");
        println!("Records: {}", summary.records);
        println!("Spot rows: {}", summary.spot_rows);
        println!(
            "Sync lost: {} times, {} bytes skipped",
            summary.lost_sync_events, summary.bytes_skipped
        );
    }

    Ok(())
}

fn print_header(header: &LogHeader) {
    let params = &header.parameters;
    println!(
        "Parameters: {} Hz, pwmmax {}, modmax {:.2}",
        params.frequency_hz, params.pwm_max, params.modulation_max
    );

    let lookup = &header.spot_lookup;
    println!(
        "Spot lookup: {} slot{}",
        lookup.len(),
        if lookup.len() == 1 { "" } else { "s" }
    );
    for (slot, name) in lookup.iter() {
        println!("  [{slot}] {name}");
    }

    let schema = &header.schema;
    println!(
        "Schema: {} fields, {} bits, {} bytes per record",
        schema.len(),
        schema.total_bits(),
        schema.record_bytes()
    );
    println!(
        "  {:>2}  {:<8} {:>4}  {:<6}  {:<8}  {:<17}  output",
        "#", "name", "bits", "signed", "scale", "transform"
    );
    for (i, field) in schema.fields().iter().enumerate() {
        let output = if field.is_output() { "yes" } else { "no" };
        match field.kind {
            FieldKind::Wire { bits, signed } => println!(
                "  {i:>2}  {:<8} {bits:>4}  {:<6}  {:<8}  {:<17}  {output}",
                field.name,
                if signed { "yes" } else { "no" },
                field.scale,
                format!("{:?}", field.transform),
            ),
            FieldKind::Calculated(derived) => println!(
                "  {i:>2}  {:<8} {:>4}  {:<6}  {:<8}  {:<17}  {output}",
                field.name,
                "-",
                "-",
                "-",
                format!("{derived:?} current"),
            ),
        }
    }
}
