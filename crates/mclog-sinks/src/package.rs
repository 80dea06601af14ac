use std::path::Path;
use std::process::{Command, Stdio};

use tempfile::TempDir;

use crate::error::SinkError;

/// Collaborator that turns a set of staged files into one container
/// artifact.
///
/// `files` are names relative to `staging`. After a successful call the
/// archive at `archive` holds them; the caller owns the staging area and
/// removes it afterwards.
pub trait Packager {
    /// # Errors
    ///
    /// Any failure to produce the archive.
    fn package(&self, staging: &Path, files: &[String], archive: &Path) -> Result<(), SinkError>;
}

/// Packages with an external `zip`-compatible archiver, moving the files
/// into the archive (`zip -q -m <archive> <files...>`, run inside the
/// staging directory).
#[derive(Clone, Debug)]
pub struct ZipCommand {
    program: String,
}

impl ZipCommand {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for ZipCommand {
    fn default() -> Self {
        Self::new("zip")
    }
}

impl Packager for ZipCommand {
    fn package(&self, staging: &Path, files: &[String], archive: &Path) -> Result<(), SinkError> {
        // The archiver runs inside the staging dir, so the target must not
        // be relative to the caller's working directory.
        let archive = std::path::absolute(archive)?;

        let status = Command::new(&self.program)
            .arg("-q")
            .arg("-m")
            .arg(&archive)
            .args(files)
            .current_dir(staging)
            .stdin(Stdio::null())
            .status()
            .map_err(|source| SinkError::PackagerSpawn {
                program: self.program.clone(),
                source,
            })?;

        if status.success() {
            tracing::info!(archive = %archive.display(), files = files.len(), "archive created");
            Ok(())
        } else {
            Err(SinkError::PackagerFailed {
                program: self.program.clone(),
                status,
            })
        }
    }
}

/// Package the files in `staging` into `archive`, then remove the staging
/// area. The staging area is removed on failure too.
///
/// # Errors
///
/// The packager's error, or [`SinkError::Io`] if the staging area cannot be
/// removed.
pub fn package_staged(
    packager: &dyn Packager,
    staging: TempDir,
    files: &[String],
    archive: &Path,
) -> Result<(), SinkError> {
    packager.package(staging.path(), files, archive)?;
    staging.close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;

    /// Moves the staged files into a directory named after the archive.
    #[derive(Default)]
    struct MoveIntoDir {
        calls: RefCell<Vec<Vec<String>>>,
    }

    impl Packager for MoveIntoDir {
        fn package(&self, staging: &Path, files: &[String], archive: &Path) -> Result<(), SinkError> {
            fs::create_dir_all(archive)?;
            for name in files {
                fs::rename(staging.join(name), archive.join(name))?;
            }
            self.calls.borrow_mut().push(files.to_vec());
            Ok(())
        }
    }

    #[test]
    fn staging_is_removed_after_packaging() {
        let out = tempfile::tempdir().unwrap();
        let staging = tempfile::tempdir_in(out.path()).unwrap();
        let staging_path = staging.path().to_path_buf();
        fs::write(staging.path().join("version"), "2").unwrap();

        let packager = MoveIntoDir::default();
        let archive = out.path().join("capture.sr");
        package_staged(&packager, staging, &["version".to_string()], &archive).unwrap();

        assert!(!staging_path.exists());
        assert_eq!(fs::read_to_string(archive.join("version")).unwrap(), "2");
        assert_eq!(packager.calls.borrow().len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn missing_archiver_is_reported() {
        let staging = tempfile::tempdir().unwrap();
        let zip = ZipCommand::new("mclog-no-such-archiver");
        let err = zip
            .package(staging.path(), &[], Path::new("out.sr"))
            .unwrap_err();
        assert!(matches!(err, SinkError::PackagerSpawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn failing_archiver_is_reported() {
        let staging = tempfile::tempdir().unwrap();
        let zip = ZipCommand::new("false");
        let err = zip
            .package(staging.path(), &[], Path::new("out.sr"))
            .unwrap_err();
        assert!(matches!(err, SinkError::PackagerFailed { .. }));
    }
}
