//! Removal of local files that are no longer listed in the manifest.
//!
//! Runs once, after orchestration has fully drained, against the frozen
//! touched set. Deletion failures are collected and reported together after
//! every obsolete entry has been attempted.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{ReconcileError, SyncError, SyncResult};

/// What a reconciliation pass saw and removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Direct entries found in the target directory.
    pub scanned: usize,
    pub deleted: Vec<PathBuf>,
}

/// Direct (non-recursive) entries of `dir`, as full paths.
pub fn list_entries(dir: &Path) -> SyncResult<Vec<PathBuf>> {
    let fs_err = |source| SyncError::Filesystem {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(fs_err)? {
        entries.push(entry.map_err(fs_err)?.path());
    }
    entries.sort();
    Ok(entries)
}

/// Entries of `entries` not present in `touched`.
pub fn obsolete_entries(entries: &[PathBuf], touched: &BTreeSet<PathBuf>) -> Vec<PathBuf> {
    entries
        .iter()
        .filter(|p| !touched.contains(*p))
        .cloned()
        .collect()
}

fn remove_entry(path: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    if meta.is_dir() {
        // Only empty directories; anything else is reported, never recursed into.
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    }
}

/// Delete every entry of `target_dir` that is not in `touched`.
pub fn reconcile(target_dir: &Path, touched: &BTreeSet<PathBuf>) -> SyncResult<ReconcileSummary> {
    tracing::info!(dir = %target_dir.display(), "cleaning local box directory");

    let entries = list_entries(target_dir)?;
    let mut summary = ReconcileSummary {
        scanned: entries.len(),
        deleted: Vec::new(),
    };
    if entries.is_empty() {
        tracing::debug!("no files in local directory, nothing to clean up");
        return Ok(summary);
    }
    tracing::debug!(count = entries.len(), dir = %target_dir.display(), "found existing files");

    let mut errors = ReconcileError::default();
    for path in obsolete_entries(&entries, touched) {
        tracing::warn!(path = %path.display(), "deleting local file");
        match remove_entry(&path) {
            Ok(()) => summary.deleted.push(path),
            // Already gone counts as deleted.
            Err(e) if e.kind() == io::ErrorKind::NotFound => summary.deleted.push(path),
            Err(e) => errors.push(path, e),
        }
    }

    if !errors.is_empty() {
        return Err(SyncError::Reconcile(errors));
    }
    tracing::info!(
        scanned = summary.scanned,
        deleted = summary.deleted.len(),
        "box directory reconciled"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touched(dir: &Path, ids: &[u64]) -> BTreeSet<PathBuf> {
        ids.iter().map(|id| dir.join(id.to_string())).collect()
    }

    #[test]
    fn empty_directory_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let summary = reconcile(dir.path(), &BTreeSet::new()).unwrap();
        assert_eq!(summary, ReconcileSummary::default());
    }

    #[test]
    fn deletes_untracked_and_keeps_touched() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["1", "2", "999", "notes.txt"] {
            fs::write(dir.path().join(name), name).unwrap();
        }
        let summary = reconcile(dir.path(), &touched(dir.path(), &[1, 2])).unwrap();

        assert_eq!(summary.scanned, 4);
        assert_eq!(
            summary.deleted,
            vec![dir.path().join("999"), dir.path().join("notes.txt")]
        );
        assert!(dir.path().join("1").exists());
        assert!(dir.path().join("2").exists());
        assert!(!dir.path().join("999").exists());
    }

    #[test]
    fn touched_but_absent_paths_are_fine() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("2"), "b").unwrap();
        let summary = reconcile(dir.path(), &touched(dir.path(), &[1, 2])).unwrap();
        assert!(summary.deleted.is_empty());
    }

    #[test]
    fn empty_subdirectory_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("stray")).unwrap();
        let summary = reconcile(dir.path(), &BTreeSet::new()).unwrap();
        assert_eq!(summary.deleted, vec![dir.path().join("stray")]);
    }

    #[test]
    fn failures_are_aggregated_after_all_attempts() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a-dir");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("inner"), "x").unwrap();
        fs::write(dir.path().join("b-file"), "x").unwrap();

        let err = reconcile(dir.path(), &BTreeSet::new()).unwrap_err();

        match err {
            SyncError::Reconcile(agg) => {
                assert_eq!(agg.failures.len(), 1);
                assert_eq!(agg.failures[0].0, nested);
            }
            other => panic!("expected Reconcile, got {:?}", other),
        }
        // The later entry was still attempted.
        assert!(!dir.path().join("b-file").exists());
        assert!(nested.join("inner").exists());
    }

    #[test]
    fn missing_directory_is_filesystem_error() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("gone");
        assert!(matches!(
            reconcile(&gone, &BTreeSet::new()),
            Err(SyncError::Filesystem { .. })
        ));
    }

    #[test]
    fn obsolete_is_set_difference() {
        let base = Path::new("/b");
        let entries = vec![base.join("1"), base.join("2"), base.join("3")];
        let obsolete = obsolete_entries(&entries, &touched(base, &[2, 7]));
        assert_eq!(obsolete, vec![base.join("1"), base.join("3")]);
    }
}
