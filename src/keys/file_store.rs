use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{RotationError, RotationStore};

#[derive(Serialize, Deserialize)]
struct RotationState {
    index: usize,
}

/// [`RotationStore`] backed by a small JSON file (`{"index": N}`).
///
/// One state file per key pool. `advance` holds an exclusive advisory lock
/// on the file across the load-increment-save sequence so overlapping
/// scheduled invocations cannot both hand out the same key.
pub struct FileRotationStore {
    path: PathBuf,
}

impl FileRotationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_error(&self, source: std::io::Error) -> RotationError {
        RotationError::StateWrite {
            path: self.path.clone(),
            source,
        }
    }

    fn read_cursor(&self) -> usize {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "No readable rotation state, starting at 0");
                return 0;
            }
        };

        match serde_json::from_str::<RotationState>(&content) {
            Ok(state) => state.index,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Malformed rotation state, starting at 0");
                0
            }
        }
    }

    fn write_cursor(&self, cursor: usize) -> Result<(), RotationError> {
        let json = serde_json::to_string(&RotationState { index: cursor })
            .map_err(|e| self.write_error(e.into()))?;
        std::fs::write(&self.path, json).map_err(|e| self.write_error(e))
    }
}

impl RotationStore for FileRotationStore {
    fn load(&self) -> usize {
        self.read_cursor()
    }

    fn save(&self, cursor: usize) -> Result<(), RotationError> {
        self.write_cursor(cursor)
    }

    fn advance(&self, modulus: usize) -> Result<usize, RotationError> {
        // The lock handle doubles as the state file; create it up front so
        // first-run invocations contend on the same inode.
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| self.write_error(e))?;

        file.lock_exclusive().map_err(|e| self.write_error(e))?;

        let index = self.read_cursor() % modulus;
        let result = self.write_cursor((index + 1) % modulus);

        let _ = file.unlock();
        result?;

        debug!(index, next = (index + 1) % modulus, "Rotation cursor advanced");
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> FileRotationStore {
        FileRotationStore::new(dir.path().join(".api_state.json"))
    }

    #[test]
    fn test_load_missing_file_returns_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.load(), 0);
    }

    #[test]
    fn test_load_corrupt_file_returns_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "not json at all {{{").unwrap();
        assert_eq!(store.load(), 0);
    }

    #[test]
    fn test_load_is_idempotent_without_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(3).unwrap();
        assert_eq!(store.load(), 3);
        assert_eq!(store.load(), 3);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        for cursor in [0, 1, 2, 7] {
            store.save(cursor).unwrap();
            assert_eq!(store.load(), cursor);
        }
    }

    #[test]
    fn test_save_overwrites_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(12).unwrap();
        store.save(1).unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(content, r#"{"index":1}"#);
    }

    #[test]
    fn test_advance_returns_sequential_indices() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert_eq!(store.advance(3).unwrap(), 0);
        assert_eq!(store.advance(3).unwrap(), 1);
        assert_eq!(store.advance(3).unwrap(), 2);
        assert_eq!(store.advance(3).unwrap(), 0);
        assert_eq!(store.load(), 1);
    }

    #[test]
    fn test_advance_unwritable_path_fails() {
        let result = FileRotationStore::new("/nonexistent-dir/state.json").advance(2);
        assert!(matches!(result, Err(RotationError::StateWrite { .. })));
    }

    #[test]
    fn test_concurrent_advance_loses_no_updates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".api_state.json");

        let threads = 4;
        let per_thread = 25;
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let store = FileRotationStore::new(path);
                    let mut seen = vec![0usize; 4];
                    for _ in 0..per_thread {
                        seen[store.advance(4).unwrap()] += 1;
                    }
                    seen
                })
            })
            .collect();

        let mut totals = vec![0usize; 4];
        for h in handles {
            for (i, n) in h.join().unwrap().into_iter().enumerate() {
                totals[i] += n;
            }
        }

        // 100 locked advances over a pool of 4: every index handed out
        // exactly 25 times and the final cursor back at 0.
        assert_eq!(totals, vec![25, 25, 25, 25]);
        let store = FileRotationStore::new(path);
        assert_eq!(store.load(), 0);
    }
}
