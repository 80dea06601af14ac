#![warn(clippy::pedantic)]

pub mod bits;
pub mod checksum;
pub mod error;
pub mod framing;
pub mod header;

pub use error::WireError;
