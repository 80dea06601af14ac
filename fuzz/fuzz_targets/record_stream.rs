#![no_main]

use libfuzzer_sys::fuzz_target;
use mclog_wire::checksum::verify_record;
use mclog_wire::framing::{Frame, RecordStream, MAX_RECORD_BYTES};

// Fuzz target: fixed-length framing with byte-wise resync.
//
// Input format:
//   byte 0: record length (1..=MAX_RECORD_BYTES)
//   rest: record bytes
//
// Every byte must be accounted for exactly once, either inside a record
// or as a skipped byte, up to the unframeable tail.
fuzz_target!(|data: &[u8]| {
    let Some((&len, body)) = data.split_first() else {
        return;
    };
    let record_len = usize::from(len) % MAX_RECORD_BYTES + 1;

    let mut stream = RecordStream::new(body, record_len, 0).unwrap();
    let mut expected_offset = 0u64;
    while let Some(frame) = stream.next_frame().unwrap() {
        match frame {
            Frame::Record { offset, bytes } => {
                assert_eq!(offset, expected_offset);
                assert_eq!(bytes.len(), record_len);
                assert!(verify_record(bytes));
                expected_offset += record_len as u64;
            }
            Frame::Skipped { offset, .. } => {
                assert_eq!(offset, expected_offset);
                expected_offset += 1;
            }
        }
    }
    assert!(body.len() as u64 - stream.offset() < record_len as u64);
});
