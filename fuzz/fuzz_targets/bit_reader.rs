#![no_main]

use libfuzzer_sys::fuzz_target;
use mclog_wire::bits::{sign_extend, BitReader};

// Fuzz target: LSB-first field extraction.
//
// Input format:
//   byte 0: number of widths n
//   bytes 1..=n: field widths (taken mod 33, so 0 and 1..=32 all occur)
//   rest: record bytes
fuzz_target!(|data: &[u8]| {
    let Some((&count, rest)) = data.split_first() else {
        return;
    };
    let count = usize::from(count).min(rest.len());
    let (widths, record) = rest.split_at(count);

    let mut reader = BitReader::new(record);
    for &width in widths {
        let width = u32::from(width % 33);
        match reader.read(width) {
            Ok(raw) => {
                if width < 32 {
                    assert!(u64::from(raw) < 1u64 << width);
                }
                let _ = sign_extend(raw, width);
            }
            Err(_) => break,
        }
        assert!(reader.bytes_consumed() <= record.len());
    }
});
