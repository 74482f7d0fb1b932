//! Writing export artifacts to disk.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure producing or writing an export artifact.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to flush CSV buffer: {0}")]
    Flush(String),
}

/// Write `bytes` to `path`, creating missing parent directories.
pub fn write_artifact(path: &Path, bytes: &[u8]) -> Result<PathBuf, ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    std::fs::write(path, bytes).map_err(io_err)?;

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/industry_leaders.csv");
        write_artifact(&path, b"Symbol\n").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"Symbol\n");
    }

    #[test]
    fn test_write_artifact_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be overwritten as a file.
        let err = write_artifact(dir.path(), b"x").unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
        assert!(err.to_string().contains(&dir.path().display().to_string()));
    }
}
