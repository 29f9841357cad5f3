// Staged output files
//
// Each artifact is rendered into a temp file in its destination directory.
// Nothing reaches its final path until every artifact of the batch has been
// written; dropping an uncommitted batch removes the temp files.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use devtrack_engine::Workbook;
use devtrack_recon::report::Report;
use devtrack_recon::StatisticsReport;

use crate::error::IoError;
use crate::{json, xlsx};

#[derive(Debug, Default)]
pub struct StagedOutputs {
    staged: Vec<(NamedTempFile, PathBuf)>,
}

impl StagedOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `bytes` to a temp file next to `path`.
    pub fn stage(&mut self, path: &Path, bytes: &[u8]) -> Result<(), IoError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = tempfile::Builder::new()
            .prefix(".devtrack-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| IoError::write(path, e))?;
        file.write_all(bytes).map_err(|e| IoError::write(path, e))?;
        file.as_file().sync_all().map_err(|e| IoError::write(path, e))?;

        // An overwritten file keeps its permissions
        if let Ok(meta) = std::fs::metadata(path) {
            std::fs::set_permissions(file.path(), meta.permissions())
                .map_err(|e| IoError::write(path, e))?;
        }

        debug!(path = %path.display(), bytes = bytes.len(), "staged output");
        self.staged.push((file, path.to_path_buf()));
        Ok(())
    }

    pub fn stage_workbook(&mut self, workbook: &Workbook, path: &Path) -> Result<(), IoError> {
        let bytes = xlsx::render_workbook(workbook, path)?;
        self.stage(path, &bytes)
    }

    pub fn stage_report(&mut self, report: &Report, path: &Path) -> Result<(), IoError> {
        let bytes = xlsx::render_report(report, path)?;
        self.stage(path, &bytes)
    }

    pub fn stage_statistics(&mut self, report: &StatisticsReport, path: &Path) -> Result<(), IoError> {
        let bytes = json::render_statistics(report, path)?;
        self.stage(path, &bytes)
    }

    /// Move every staged file onto its destination, in staging order.
    /// Returns the destinations.
    pub fn commit(self) -> Result<Vec<PathBuf>, IoError> {
        let mut written = Vec::with_capacity(self.staged.len());
        for (file, path) in self.staged {
            file.persist(&path).map_err(|e| IoError::write(&path, e.error))?;
            written.push(path);
        }
        Ok(written)
    }
}

/// Replace `path` with `bytes` in one step.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), IoError> {
    let mut staged = StagedOutputs::new();
    staged.stage(path, bytes)?;
    staged.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn leftovers(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(".devtrack-"))
            .collect()
    }

    #[test]
    fn nothing_lands_before_commit() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");

        let mut staged = StagedOutputs::new();
        staged.stage(&a, b"first").unwrap();
        staged.stage(&b, b"second").unwrap();
        assert!(!a.exists());
        assert!(!b.exists());

        let written = staged.commit().unwrap();
        assert_eq!(written, vec![a.clone(), b.clone()]);
        assert_eq!(fs::read_to_string(&a).unwrap(), "first");
        assert_eq!(fs::read_to_string(&b).unwrap(), "second");
        assert!(leftovers(dir.path()).is_empty());
    }

    #[test]
    fn failed_stage_leaves_earlier_outputs_unwritten() {
        let dir = tempdir().unwrap();
        let report = dir.path().join("report.xlsx");
        let unreachable = dir.path().join("no/such/dir/db.xlsx");

        let mut staged = StagedOutputs::new();
        staged.stage(&report, b"report").unwrap();
        let err = staged.stage(&unreachable, b"db").unwrap_err();
        assert!(matches!(err, IoError::Write { .. }), "got: {err}");

        drop(staged);
        assert!(!report.exists());
        assert!(leftovers(dir.path()).is_empty());
    }

    #[test]
    fn overwrite_replaces_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.xlsx");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, b"new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert!(leftovers(dir.path()).is_empty());
    }
}
