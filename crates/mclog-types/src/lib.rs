#![warn(clippy::pedantic)]

pub mod error;
pub mod header;
pub mod params;
pub mod record;
pub mod schema;

pub use error::TypeError;
pub use header::LogHeader;
pub use params::{DecodeParameters, ParameterBlock, SpotLookup};
pub use record::{DecodedRecord, SpotRow};
pub use schema::{DerivedField, FieldDefinition, FieldKind, FieldRole, MessageSchema, Transform};
