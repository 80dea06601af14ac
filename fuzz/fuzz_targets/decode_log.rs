#![no_main]

use libfuzzer_sys::fuzz_target;
use mclog_decoder::decode_log;

// Fuzz target: full header + record decode.
//
// Catches bugs in:
// - JSON header handling (malformed blocks, odd parameter types)
// - Schema validation (zero widths, oversized records)
// - Spot demultiplexing on arbitrary counter values
fuzz_target!(|data: &[u8]| {
    if let Ok(decoded) = decode_log(data) {
        assert_eq!(decoded.records.len() as u64, decoded.summary.records);
        assert_eq!(decoded.spot_rows.len() as u64, decoded.summary.spot_rows);
        assert!(decoded.summary.lost_sync_events <= decoded.summary.bytes_skipped);
    }
});
