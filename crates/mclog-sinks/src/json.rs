use std::fs;
use std::path::Path;

use crate::error::SinkError;

/// Write both header blocks, exactly as they appeared in the log, to
/// `path`. Nothing is reformatted or validated.
///
/// # Errors
///
/// [`SinkError::Create`] if the file cannot be written.
pub fn write_json_passthrough(path: &Path, raw: &[u8]) -> Result<(), SinkError> {
    fs::write(path, raw).map_err(|e| SinkError::create(path, e))?;
    tracing::info!(path = %path.display(), bytes = raw.len(), "header blocks written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_are_written_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        let raw = br#"{"pwmmax":{"value":4096}}{ "x" : {"size":8} }"#;
        write_json_passthrough(&path, raw).unwrap();
        assert_eq!(fs::read(&path).unwrap(), raw);
    }

    #[test]
    fn unwritable_path_is_a_create_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("run.json");
        assert!(matches!(
            write_json_passthrough(&path, b"{}"),
            Err(SinkError::Create { .. })
        ));
    }
}
