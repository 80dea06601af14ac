#![warn(clippy::pedantic)]

pub mod channels;
pub mod config;
pub mod error;
pub mod json;
pub mod motor_csv;
pub mod package;
pub mod sink;
pub mod spot_csv;

pub use channels::ChannelSampleSink;
pub use config::{OutputPaths, OutputSelection};
pub use error::SinkError;
pub use json::write_json_passthrough;
pub use motor_csv::MotorCsvSink;
pub use package::{Packager, ZipCommand, package_staged};
pub use sink::{LogSink, SinkSet};
pub use spot_csv::SpotCsvSink;
