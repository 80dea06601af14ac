use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use mclog_types::{DecodedRecord, LogHeader, MessageSchema};
use tempfile::TempDir;

use crate::error::SinkError;
use crate::package::{Packager, package_staged};
use crate::sink::LogSink;

pub const VERSION_FILE: &str = "version";
pub const METADATA_FILE: &str = "metadata";

const SESSION_VERSION: &str = "2";
const SIGROK_VERSION: &str = "0.5.2";

/// Per-channel raw sample writer in sigrok session layout.
///
/// Every output field gets its own file of little-endian `f32` samples,
/// one per decoded record. Two descriptor files accompany them:
///
/// ```text
/// <dir>/
/// ├── version          "2"
/// ├── metadata         [global] / [device 1] with samplerate and names
/// ├── analog-1-1-1     samples of output field 1
/// ├── analog-1-2-1     samples of output field 2
/// └── ...
/// ```
///
/// Built with [`packaged`](Self::packaged), the files are staged in a
/// temporary directory next to the archive and handed to a [`Packager`]
/// on [`finish`](LogSink::finish).
pub struct ChannelSampleSink {
    dir: PathBuf,
    channels: Vec<Channel>,
    files: Vec<String>,
    package: Option<PackagePlan>,
}

struct Channel {
    field: usize,
    out: BufWriter<File>,
}

struct PackagePlan {
    staging: TempDir,
    archive: PathBuf,
    packager: Box<dyn Packager>,
}

impl ChannelSampleSink {
    /// Write the descriptor files into `dir` and create one sample file per
    /// output field.
    ///
    /// # Errors
    ///
    /// [`SinkError::Create`] if any file cannot be created.
    pub fn create(dir: &Path, header: &LogHeader) -> Result<Self, SinkError> {
        let schema = &header.schema;
        let mut channels = Vec::new();
        let mut files = Vec::new();

        for (n, (field, _)) in (1..).zip(schema.output_fields()) {
            let name = channel_file_name(n);
            let path = dir.join(&name);
            let file = File::create(&path).map_err(|e| SinkError::create(&path, e))?;
            channels.push(Channel {
                field,
                out: BufWriter::new(file),
            });
            files.push(name);
        }

        write_file(dir, VERSION_FILE, SESSION_VERSION)?;
        write_file(dir, METADATA_FILE, &metadata(header.parameters.frequency_hz, schema))?;
        files.push(VERSION_FILE.to_string());
        files.push(METADATA_FILE.to_string());

        Ok(Self {
            dir: dir.to_path_buf(),
            channels,
            files,
            package: None,
        })
    }

    /// Stage the session in a fresh directory beside `archive` and package
    /// it there on finish.
    ///
    /// # Errors
    ///
    /// [`SinkError::Create`] if the staging directory or any file in it
    /// cannot be created.
    pub fn packaged(
        archive: &Path,
        header: &LogHeader,
        packager: Box<dyn Packager>,
    ) -> Result<Self, SinkError> {
        let parent = match archive.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let staging = tempfile::Builder::new()
            .prefix(".mclog-session-")
            .tempdir_in(parent)
            .map_err(|e| SinkError::create(parent, e))?;

        let mut sink = Self::create(staging.path(), header)?;
        sink.package = Some(PackagePlan {
            staging,
            archive: archive.to_path_buf(),
            packager,
        });
        Ok(sink)
    }

    /// Directory the session files are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Every file making up the session, channel files first.
    #[must_use]
    pub fn files(&self) -> &[String] {
        &self.files
    }
}

impl LogSink for ChannelSampleSink {
    fn name(&self) -> &'static str {
        "channel samples"
    }

    fn record(&mut self, record: &DecodedRecord) -> Result<(), SinkError> {
        for channel in &mut self.channels {
            #[allow(clippy::cast_possible_truncation)]
            let sample = record.values[channel.field] as f32;
            channel.out.write_all(&sample.to_le_bytes())?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        for mut channel in self.channels.drain(..) {
            channel.out.flush()?;
        }
        if let Some(plan) = self.package.take() {
            package_staged(plan.packager.as_ref(), plan.staging, &self.files, &plan.archive)?;
        }
        Ok(())
    }
}

/// Sample file for the `n`th output channel, counting from 1.
#[must_use]
pub fn channel_file_name(n: usize) -> String {
    format!("analog-1-{n}-1")
}

/// sigrok session metadata. The sample rate is whole kilohertz.
#[must_use]
pub fn metadata(frequency_hz: u32, schema: &MessageSchema) -> String {
    let names: Vec<&str> = schema.output_fields().map(|(_, f)| f.name.as_str()).collect();

    let mut text = format!(
        "[global]\nsigrok version={SIGROK_VERSION}\n\n[device 1]\nsamplerate={} KHz\ntotal analog={}\n",
        frequency_hz / 1000,
        names.len()
    );
    for (n, name) in (1..).zip(&names) {
        text.push_str(&format!("analog{n}={name}\n"));
    }
    text.push_str("unitsize=1");
    text
}

fn write_file(dir: &Path, name: &str, contents: &str) -> Result<(), SinkError> {
    let path = dir.join(name);
    fs::write(&path, contents).map_err(|e| SinkError::create(path, e))
}
