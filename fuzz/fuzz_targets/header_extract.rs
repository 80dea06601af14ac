#![no_main]

use libfuzzer_sys::fuzz_target;
use mclog_wire::header::extract_json_block;

// Fuzz target: brace-balanced block extraction.
//
// Catches bugs in:
// - Depth tracking on unbalanced input
// - Reading past the closing brace
// - Byte accounting for leading junk
fuzz_target!(|data: &[u8]| {
    let mut reader = data;
    if let Ok(block) = extract_json_block(&mut reader) {
        assert_eq!(block.text.first(), Some(&b'{'));
        assert_eq!(block.text.last(), Some(&b'}'));
        assert_eq!(block.consumed() + reader.len(), data.len());
    }
});
