//! Output module for generated data modules
//!
//! This module handles:
//! - Serializing records into TypeScript literals
//! - Assembling importable modules with a header comment
//! - Periodic in-progress checkpoints

mod checkpoint;
pub mod literal;
mod module;

pub use checkpoint::{checkpoint_path, CheckpointWriter};
pub use literal::{quote_string, to_literal_string, Literal, RecordBuilder, SerializeError, ToLiteral};
pub use module::{render_final_module, render_module, write_final_module, GROUP_TYPE};

use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize records: {0}")]
    Serialize(#[from] SerializeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to move {path} into place: {source}")]
    Persist {
        path: String,
        source: std::io::Error,
    },
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Writes `contents` next to `path` and renames it over the target
///
/// Readers never observe a half-written file: either the previous version or
/// the complete new one is on disk.
pub fn write_atomically(path: &Path, contents: &str) -> OutputResult<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut temp_file = NamedTempFile::new_in(parent)?;
    temp_file.write_all(contents.as_bytes())?;
    temp_file.flush()?;

    temp_file.persist(path).map_err(|e| OutputError::Persist {
        path: path.display().to_string(),
        source: e.error,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomically_creates_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("abs.ts");

        write_atomically(&path, "first").unwrap();
        write_atomically(&path, "second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        let entries = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
