//! FileRetryStore - JSON-lines retry cache on disk

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use contracts::{CachedEvent, RetryStore, TelemetryError};
use tracing::{debug, warn};

/// Retry cache persisted as one JSON object per line
///
/// The whole file is loaded at open; every mutation rewrites it under the
/// store lock, so readers of the file never observe a partial entry.
pub struct FileRetryStore {
    path: PathBuf,
    entries: Mutex<VecDeque<CachedEvent>>,
}

impl FileRetryStore {
    /// Open or create the cache file at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, TelemetryError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| TelemetryError::cache("open", e.to_string()))?;
            }
        }

        let entries = if path.exists() {
            Self::load(&path)?
        } else {
            VecDeque::new()
        };

        debug!(path = %path.display(), entries = entries.len(), "Retry cache opened");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Cache file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Result<VecDeque<CachedEvent>, TelemetryError> {
        let file = File::open(path).map_err(|e| TelemetryError::cache("load", e.to_string()))?;
        let reader = BufReader::new(file);

        let mut entries = VecDeque::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| TelemetryError::cache("load", e.to_string()))?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<CachedEvent>(&line) {
                Ok(event) => entries.push_back(event),
                Err(e) => {
                    // A corrupt line loses one entry, not the whole cache
                    warn!(path = %path.display(), line = lineno + 1, error = %e, "Skipping corrupt cache line");
                }
            }
        }
        Ok(entries)
    }

    fn persist(&self, entries: &VecDeque<CachedEvent>) -> Result<(), TelemetryError> {
        let tmp_path = self.path.with_extension("tmp");
        {
            let file = File::create(&tmp_path)
                .map_err(|e| TelemetryError::cache("persist", e.to_string()))?;
            let mut writer = BufWriter::new(file);
            for event in entries {
                let line = serde_json::to_string(event)
                    .map_err(|e| TelemetryError::cache("persist", e.to_string()))?;
                writeln!(writer, "{}", line)
                    .map_err(|e| TelemetryError::cache("persist", e.to_string()))?;
            }
            writer
                .flush()
                .map_err(|e| TelemetryError::cache("persist", e.to_string()))?;
        }
        fs::rename(&tmp_path, &self.path)
            .map_err(|e| TelemetryError::cache("persist", e.to_string()))
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, VecDeque<CachedEvent>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RetryStore for FileRetryStore {
    fn push(&self, event: CachedEvent) -> Result<(), TelemetryError> {
        let mut entries = self.entries();
        entries.push_back(event);
        self.persist(&entries)
    }

    fn pop(&self, max: usize) -> Result<Vec<CachedEvent>, TelemetryError> {
        let entries = self.entries();
        Ok(entries.iter().take(max).cloned().collect())
    }

    fn remove(&self, event: &CachedEvent) -> Result<(), TelemetryError> {
        let mut entries = self.entries();
        if let Some(pos) = entries.iter().position(|e| e == event) {
            entries.remove(pos);
            return self.persist(&entries);
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.entries().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn event(n: u32) -> CachedEvent {
        CachedEvent::new(format!("https://c/e{}", n), format!("{{\"n\":{}}}", n))
    }

    #[test]
    fn test_open_creates_missing_file_lazily() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.jsonl");

        let store = FileRetryStore::open(&path).unwrap();
        assert_eq!(store.len(), 0);

        store.push(event(0)).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_entries_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.jsonl");

        {
            let store = FileRetryStore::open(&path).unwrap();
            store.push(event(0)).unwrap();
            store.push(event(1)).unwrap();
        }

        let reopened = FileRetryStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.pop(2).unwrap(), vec![event(0), event(1)]);
    }

    #[test]
    fn test_remove_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.jsonl");

        let store = FileRetryStore::open(&path).unwrap();
        store.push(event(0)).unwrap();
        store.push(event(1)).unwrap();
        store.remove(&event(0)).unwrap();

        let reopened = FileRetryStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.pop(1).unwrap()[0], event(1));
    }

    #[test]
    fn test_corrupt_line_is_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.jsonl");

        let store = FileRetryStore::open(&path).unwrap();
        store.push(event(0)).unwrap();

        // Append garbage behind the store's back
        let mut raw = fs::read_to_string(&path).unwrap();
        raw.push_str("not json\n");
        fs::write(&path, raw).unwrap();

        let reopened = FileRetryStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 1);
    }
}
