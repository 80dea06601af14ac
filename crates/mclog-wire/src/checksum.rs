/// Additive 8-bit checksum: the wrapping sum of every byte.
#[must_use]
pub fn additive_checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Check a candidate record: the last byte must equal the additive
/// checksum of all bytes before it.
///
/// ```text
/// ┌──────────────────────────────────┬──────┐
/// │ payload (record_len - 1 bytes)   │ csum │
/// └──────────────────────────────────┴──────┘
///   csum == payload.iter().sum() mod 256
/// ```
///
/// An empty slice never validates.
#[must_use]
pub fn verify_record(record: &[u8]) -> bool {
    match record.split_last() {
        Some((&csum, payload)) => additive_checksum(payload) == csum,
        None => false,
    }
}
