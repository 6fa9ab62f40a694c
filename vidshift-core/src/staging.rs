// ============================================================================
// vidshift-core/src/staging.rs
// ============================================================================
//
// STAGING: Relocation of Originals Before Conversion
//
// Before any job starts, every original is moved from `<root>/<rel>` to
// `<root>/old/<rel>`. Each job then encodes from the staged copy and writes
// its output where the original used to live. On failure the staged copy is
// moved back; on success it is kept (or deleted with `delete_originals`).
//
// KEY COMPONENTS:
// - StagingArea: owns the staging directory of one scan root
// - StagingRecord: one staged original, consumed by commit or restore
//
// The staging directory doubles as the recovery log: whatever is left in it
// after a run is exactly the set of originals whose conversion succeeded.

use crate::config::STAGING_DIR_NAME;
use crate::discovery::CandidateFile;
use crate::error::{CoreError, CoreResult};
use crate::utils::ensure_directory;

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// An original that has been moved into the staging area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingRecord {
    pub candidate: CandidateFile,
    /// Where the original lived before staging.
    pub original_path: PathBuf,
    /// Where the original lives now.
    pub staged_path: PathBuf,
}

/// Staging directory of one scan root.
#[derive(Debug)]
pub struct StagingArea {
    root: PathBuf,
    staging_dir: PathBuf,
    /// Staged paths of the records that have been committed.
    committed: Mutex<HashSet<PathBuf>>,
}

impl StagingArea {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            staging_dir: root.join(STAGING_DIR_NAME),
            committed: Mutex::new(HashSet::new()),
        }
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Moves every file into the staging area.
    ///
    /// All-or-nothing: if any move fails, the files already staged by this
    /// call are moved back before the error is returned. An empty list does
    /// nothing, not even create the staging directory.
    pub fn stage_all(&self, files: &[CandidateFile]) -> CoreResult<Vec<StagingRecord>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        self.create_staging_dir()?;

        let mut records = Vec::with_capacity(files.len());
        for file in files {
            match self.stage_one(file) {
                Ok(record) => records.push(record),
                Err(e) => {
                    log::error!("Staging failed, rolling back {} file(s): {e}", records.len());
                    self.rollback(&records);
                    return Err(e);
                }
            }
        }

        log::info!(
            "Staged {} original(s) in {}",
            records.len(),
            self.staging_dir.display()
        );
        Ok(records)
    }

    fn create_staging_dir(&self) -> CoreResult<()> {
        match fs::create_dir(&self.staging_dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && self.staging_dir.is_dir() => {
                Ok(())
            }
            Err(source) => Err(CoreError::StagingDirectory {
                path: self.staging_dir.clone(),
                source,
            }),
        }
    }

    fn stage_one(&self, file: &CandidateFile) -> CoreResult<StagingRecord> {
        let original_path = self.root.join(&file.relative_path);
        let staged_path = self.staging_dir.join(&file.relative_path);

        if staged_path.exists() {
            return Err(CoreError::StagingConflict(staged_path));
        }

        if let Some(parent) = staged_path.parent() {
            ensure_directory(parent).map_err(|source| CoreError::StagingDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::rename(&original_path, &staged_path).map_err(|source| CoreError::Relocation {
            from: original_path.clone(),
            to: staged_path.clone(),
            source,
        })?;
        log::debug!(
            "Staged {} -> {}",
            original_path.display(),
            staged_path.display()
        );

        Ok(StagingRecord {
            candidate: file.clone(),
            original_path,
            staged_path,
        })
    }

    fn rollback(&self, records: &[StagingRecord]) {
        for record in records.iter().rev() {
            if let Err(e) = self.restore(record) {
                log::error!("{e}");
            }
        }
    }

    /// Moves a staged original back to where it was discovered.
    ///
    /// Never replaces a file: if something already occupies the original
    /// path, the staged copy stays where it is and an error is returned.
    pub fn restore(&self, record: &StagingRecord) -> CoreResult<()> {
        let restore_error = |source| CoreError::Restore {
            from: record.staged_path.clone(),
            to: record.original_path.clone(),
            source,
        };

        if fs::symlink_metadata(&record.original_path).is_ok() {
            return Err(restore_error(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "destination already exists",
            )));
        }
        if let Some(parent) = record.original_path.parent() {
            ensure_directory(parent).map_err(restore_error)?;
        }
        fs::rename(&record.staged_path, &record.original_path).map_err(restore_error)?;

        log::info!("Restored original {}", record.original_path.display());
        Ok(())
    }

    /// Finalizes a successful conversion.
    ///
    /// The staged original is kept unless `delete_staged` is set.
    pub fn commit(&self, record: &StagingRecord, delete_staged: bool) -> CoreResult<()> {
        self.committed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(record.staged_path.clone());

        if delete_staged {
            fs::remove_file(&record.staged_path)?;
            log::debug!("Deleted staged original {}", record.staged_path.display());
        }
        Ok(())
    }

    /// Whether `record` has been committed by this staging area.
    pub fn is_committed(&self, record: &StagingRecord) -> bool {
        self.committed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&record.staged_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn candidate(root: &Path, rel: &str) -> CandidateFile {
        CandidateFile {
            source_path: root.join(rel),
            relative_path: PathBuf::from(rel),
        }
    }

    #[test]
    fn test_empty_list_creates_nothing() {
        let dir = tempdir().unwrap();
        let area = StagingArea::new(dir.path());
        assert!(area.stage_all(&[]).unwrap().is_empty());
        assert!(!area.staging_dir().exists());
    }

    #[test]
    fn test_stage_and_restore_nested() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("season1")).unwrap();
        fs::write(dir.path().join("season1/ep1.mp4"), b"original").unwrap();

        let area = StagingArea::new(dir.path());
        let records = area.stage_all(&[candidate(dir.path(), "season1/ep1.mp4")]).unwrap();
        assert_eq!(records.len(), 1);
        assert!(!dir.path().join("season1/ep1.mp4").exists());
        assert!(dir.path().join("old/season1/ep1.mp4").exists());

        area.restore(&records[0]).unwrap();
        assert_eq!(fs::read(dir.path().join("season1/ep1.mp4")).unwrap(), b"original");
        assert!(!dir.path().join("old/season1/ep1.mp4").exists());
    }

    #[test]
    fn test_conflict_rolls_back() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.mp4"), b"a").unwrap();
        fs::write(dir.path().join("b.mp4"), b"b").unwrap();
        fs::create_dir_all(dir.path().join("old")).unwrap();
        fs::write(dir.path().join("old/b.mp4"), b"earlier").unwrap();

        let area = StagingArea::new(dir.path());
        let files = [candidate(dir.path(), "a.mp4"), candidate(dir.path(), "b.mp4")];
        let err = area.stage_all(&files).unwrap_err();
        assert!(matches!(err, CoreError::StagingConflict(_)));

        assert!(dir.path().join("a.mp4").exists());
        assert!(!dir.path().join("old/a.mp4").exists());
        assert_eq!(fs::read(dir.path().join("old/b.mp4")).unwrap(), b"earlier");
    }

    #[test]
    fn test_commit_keeps_or_deletes() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.mp4"), b"a").unwrap();
        fs::write(dir.path().join("b.mp4"), b"b").unwrap();

        let area = StagingArea::new(dir.path());
        let records = area
            .stage_all(&[candidate(dir.path(), "a.mp4"), candidate(dir.path(), "b.mp4")])
            .unwrap();

        assert!(!area.is_committed(&records[0]));
        area.commit(&records[0], false).unwrap();
        assert!(records[0].staged_path.exists());
        assert!(area.is_committed(&records[0]));

        area.commit(&records[1], true).unwrap();
        assert!(!records[1].staged_path.exists());
        assert!(area.is_committed(&records[1]));
    }

    #[test]
    fn test_restore_never_replaces_a_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.mkv"), b"original").unwrap();

        let area = StagingArea::new(dir.path());
        let records = area.stage_all(&[candidate(dir.path(), "a.mkv")]).unwrap();
        fs::write(dir.path().join("a.mkv"), b"converted").unwrap();

        let err = area.restore(&records[0]).unwrap_err();
        assert!(matches!(err, CoreError::Restore { .. }));
        assert_eq!(fs::read(dir.path().join("a.mkv")).unwrap(), b"converted");
        assert_eq!(fs::read(dir.path().join("old/a.mkv")).unwrap(), b"original");
    }
}
