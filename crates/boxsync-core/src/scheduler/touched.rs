//! Set of local paths considered during the current run.
//!
//! Every box is inserted before it is validated or downloaded, so a path
//! in this set is protected from reconciliation whatever its outcome.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

/// Append-only, shareable set of touched paths.
#[derive(Debug, Clone, Default)]
pub struct TouchedSet {
    inner: Arc<Mutex<BTreeSet<PathBuf>>>,
}

impl TouchedSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeSet<PathBuf>> {
        // Inserts cannot leave the set half-updated, so a poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record `path`. Returns false if it was already present.
    pub fn insert(&self, path: PathBuf) -> bool {
        self.lock().insert(path)
    }

    pub fn contains(&self, path: &std::path::Path) -> bool {
        self.lock().contains(path)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Consume the handle and return the final contents. If other handles
    /// are still alive the contents are cloned out instead.
    pub fn freeze(self) -> BTreeSet<PathBuf> {
        match Arc::try_unwrap(self.inner) {
            Ok(m) => m.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner()),
            Err(arc) => arc
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::thread;

    #[test]
    fn insert_is_idempotent() {
        let set = TouchedSet::new();
        assert!(set.insert(PathBuf::from("/b/1")));
        assert!(!set.insert(PathBuf::from("/b/1")));
        assert_eq!(set.len(), 1);
        assert!(set.contains(Path::new("/b/1")));
    }

    #[test]
    fn concurrent_inserts_are_all_kept() {
        let set = TouchedSet::new();
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let set = set.clone();
                thread::spawn(move || {
                    for i in 0..100 {
                        set.insert(PathBuf::from(format!("/b/{}", t * 100 + i)));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(set.freeze().len(), 800);
    }

    #[test]
    fn freeze_with_outstanding_clone() {
        let set = TouchedSet::new();
        let other = set.clone();
        other.insert(PathBuf::from("/b/2"));
        let frozen = set.freeze();
        assert!(frozen.contains(Path::new("/b/2")));
    }
}
