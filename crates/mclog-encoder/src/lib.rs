#![warn(clippy::pedantic)]

pub mod encoder;
pub mod error;
pub mod json;

pub use encoder::{LogEncoder, spot_cycle, spot_value_bytes};
pub use error::EncodeError;
pub use json::{ParameterJson, SchemaJson};
