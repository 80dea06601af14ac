#![warn(clippy::pedantic)]

pub mod decoder;
pub mod derived;
pub mod error;
pub mod raw;
pub mod spot;
pub mod transform;

pub use decoder::{DecodeSummary, DecodedLog, DecoderEvent, LogDecoder, SyncState, decode_log};
pub use error::{DecodeError, HeaderBlock};
