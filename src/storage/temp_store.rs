use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Tracked registry of the temporary image files one session has written.
///
/// Every path the materializer persists is registered here, and `cleanup`
/// deletes exactly those paths, so the shutdown sweep can never touch
/// unrelated files that happen to share the `.png` suffix. Files accumulate
/// until the sweep runs; `Drop` runs it so teardown happens whether the
/// session ends normally or by unwind.
pub struct TempImageStore {
    paths: Mutex<Vec<PathBuf>>,
}

impl TempImageStore {
    pub fn new() -> Self {
        TempImageStore {
            paths: Mutex::new(Vec::new()),
        }
    }

    pub fn register(&self, path: PathBuf) {
        if let Ok(mut paths) = self.paths.lock() {
            paths.push(path);
        }
    }

    pub fn tracked(&self) -> Vec<PathBuf> {
        self.paths
            .lock()
            .map(|paths| paths.clone())
            .unwrap_or_default()
    }

    /// Best-effort sweep of every registered file. Deletion failures are
    /// logged and otherwise ignored. Returns the number of files removed.
    pub fn cleanup(&self) -> usize {
        let paths: Vec<PathBuf> = match self.paths.lock() {
            Ok(mut paths) => paths.drain(..).collect(),
            Err(_) => return 0,
        };

        let mut removed = 0;
        for path in paths {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => {
                    log::warn!(
                        "Error deleting temporary file {}: {}",
                        path.display(),
                        e
                    );
                }
            }
        }
        removed
    }
}

impl Default for TempImageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TempImageStore {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn persisted_temp_file() -> PathBuf {
        let mut file = tempfile::Builder::new()
            .prefix("fluxgen-test-")
            .suffix(".png")
            .tempfile()
            .unwrap();
        file.write_all(b"pixels").unwrap();
        let (_, path) = file.keep().unwrap();
        path
    }

    #[test]
    fn test_cleanup_deletes_registered_files() {
        let store = TempImageStore::new();
        let first = persisted_temp_file();
        let second = persisted_temp_file();
        store.register(first.clone());
        store.register(second.clone());

        assert_eq!(store.tracked().len(), 2);
        assert_eq!(store.cleanup(), 2);
        assert!(!first.exists());
        assert!(!second.exists());
        assert!(store.tracked().is_empty());
    }

    #[test]
    fn test_cleanup_ignores_missing_files() {
        let store = TempImageStore::new();
        store.register(PathBuf::from("/nonexistent/fluxgen-gone.png"));
        let kept = persisted_temp_file();
        store.register(kept.clone());

        assert_eq!(store.cleanup(), 1);
        assert!(!kept.exists());
    }

    #[test]
    fn test_drop_sweeps_files() {
        let path = persisted_temp_file();
        {
            let store = TempImageStore::new();
            store.register(path.clone());
            assert!(path.exists());
        }
        assert!(!path.exists());
    }
}
