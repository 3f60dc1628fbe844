//! In-progress checkpoints
//!
//! A checkpoint is a complete, importable module holding the records
//! gathered so far. It lives next to the final module as `<stem>.temp.ts`
//! and is removed once the final module has been written, so a leftover
//! checkpoint marks an interrupted run.

use crate::model::ExerciseGroup;
use crate::output::module::render_module;
use crate::output::{write_atomically, OutputResult};
use std::path::{Path, PathBuf};

/// Derives the checkpoint location from a final module path
///
/// ```
/// use rep_harvest::output::checkpoint_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(checkpoint_path(Path::new("out/abs.ts")), PathBuf::from("out/abs.temp.ts"));
/// ```
pub fn checkpoint_path(final_path: &Path) -> PathBuf {
    let stem = final_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    final_path.with_file_name(format!("{}.temp.ts", stem))
}

/// Periodically overwrites the in-progress module for one category
#[derive(Debug, Clone)]
pub struct CheckpointWriter {
    path: PathBuf,
    type_import: String,
    variable_name: String,
    interval: usize,
}

impl CheckpointWriter {
    pub fn new(
        final_path: &Path,
        type_import: impl Into<String>,
        variable_name: impl Into<String>,
        interval: usize,
    ) -> Self {
        Self {
            path: checkpoint_path(final_path),
            type_import: type_import.into(),
            variable_name: variable_name.into(),
            interval: interval.max(1),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when a checkpoint is due after `succeeded` successful extractions
    pub fn is_due(&self, succeeded: usize) -> bool {
        succeeded > 0 && succeeded % self.interval == 0
    }

    /// True if a checkpoint from an earlier run is still on disk
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Replaces the checkpoint with the current partial group
    pub fn write(&self, group: &ExerciseGroup, succeeded: usize, total: usize) -> OutputResult<()> {
        let header = vec![format!(
            "TEMPORARY FILE - IN PROGRESS ({}/{} exercises)",
            succeeded, total
        )];
        let contents = render_module(&self.type_import, &self.variable_name, &header, group)?;
        write_atomically(&self.path, &contents)?;
        tracing::info!(
            "Saved progress to temporary file ({}/{} exercises)",
            succeeded,
            total
        );
        Ok(())
    }

    /// Deletes the checkpoint; a missing file is not an error
    pub fn clear(&self) -> OutputResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!("Removed checkpoint {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
