use std::path::PathBuf;

/// Errors raised by output sinks and the packaging step.
///
/// ```text
/// ┌──────────────────┬────────────────────────────────────────────────┐
/// │ Variant          │ Cause                                          │
/// ├──────────────────┼────────────────────────────────────────────────┤
/// │ Create           │ destination file or directory cannot be opened │
/// │ Csv              │ CSV row could not be written                   │
/// │ Io               │ any other write failure                        │
/// │ PackagerSpawn    │ archiver executable could not be started       │
/// │ PackagerFailed   │ archiver ran but exited unsuccessfully         │
/// └──────────────────┴────────────────────────────────────────────────┘
/// ```
///
/// A `Create` error while setting up is not fatal to a decode run: the
/// caller logs it and carries on without that sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("cannot create {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("cannot run {program}: {source}")]
    PackagerSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    PackagerFailed {
        program: String,
        status: std::process::ExitStatus,
    },
}

impl SinkError {
    pub(crate) fn create(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Create {
            path: path.into(),
            source,
        }
    }
}
