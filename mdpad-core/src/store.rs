//! Key-value persistence and the debounced autosave worker

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Key the buffer is persisted under
pub const CONTENT_KEY: &str = "markdown-editor-content";

/// Quiet period before an autosave is written
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 1000;

/// Longest the worker sleeps between checks
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Shortest wait between checks, so a zero delay cannot spin
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// A string key-value store
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Read the persisted buffer, or fall back to `initial`
pub fn restore(store: &dyn Store, key: &str, initial: &str) -> String {
    match store.get(key) {
        Ok(Some(text)) => {
            log::debug!("Restored {} chars from {key}", text.len());
            text
        }
        Ok(None) => initial.to_string(),
        Err(e) => {
            log::warn!("Failed to restore {key}: {e:#}");
            initial.to_string()
        }
    }
}

/// One file per key under a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under the platform data directory
    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "mdpad")
            .context("Could not determine a data directory")?;
        Ok(Self::new(dirs.data_dir()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            anyhow::bail!("Invalid store key: {key:?}");
        }
        Ok(self.dir.join(key))
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let value = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(value))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        fs::write(&path, value).with_context(|| format!("Failed to write {}", path.display()))
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
        Ok(())
    }
}

/// In-process store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    map: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self.map.lock().unwrap_or_else(|e| e.into_inner());
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.map.lock().unwrap_or_else(|e| e.into_inner());
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut map = self.map.lock().unwrap_or_else(|e| e.into_inner());
        map.remove(key);
        Ok(())
    }
}

/// Request to persist a buffer revision
#[derive(Debug, Clone)]
struct SaveRequest {
    rev: u64,
    text: Arc<str>,
}

/// Outcome of a write performed by the worker
#[derive(Debug, Clone)]
pub struct SaveResult {
    pub rev: u64,
    /// Error message if the write failed
    pub error: Option<String>,
}

/// Debounced autosave running on its own thread.
///
/// Every [`Autosave::request`] resets the quiet period; only the newest
/// revision is written. Dropping the handle flushes anything pending.
pub struct Autosave {
    request_tx: Option<Sender<SaveRequest>>,
    result_rx: Receiver<SaveResult>,
    worker: Option<thread::JoinHandle<()>>,
}

impl Autosave {
    /// Spawn the worker writing to `store` under `key`
    pub fn spawn(store: Arc<dyn Store>, key: impl Into<String>, delay: Duration) -> Self {
        let (request_tx, request_rx) = crossbeam_channel::unbounded();
        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        let key = key.into();

        let worker = thread::spawn(move || {
            worker_loop(store.as_ref(), &key, delay, request_rx, result_tx);
        });

        Self {
            request_tx: Some(request_tx),
            result_rx,
            worker: Some(worker),
        }
    }

    /// Schedule a save of `text`, superseding any pending one
    pub fn request(&self, rev: u64, text: Arc<str>) {
        if let Some(tx) = &self.request_tx {
            let _ = tx.send(SaveRequest { rev, text });
        }
    }

    /// Try to receive a completed save (non-blocking)
    pub fn try_recv_result(&self) -> Option<SaveResult> {
        self.result_rx.try_recv().ok()
    }

    /// Flush pending work and stop the worker
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        // Closing the channel makes the worker flush and exit
        self.request_tx.take();
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                log::error!("Autosave worker panicked");
            }
        }
    }
}

impl Drop for Autosave {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop(
    store: &dyn Store,
    key: &str,
    delay: Duration,
    request_rx: Receiver<SaveRequest>,
    result_tx: Sender<SaveResult>,
) {
    let mut pending: Option<SaveRequest> = None;
    let mut last_request = Instant::now();
    let poll = delay.clamp(MIN_POLL_INTERVAL, POLL_INTERVAL);

    loop {
        // Nothing to write: sleep until the next request
        if pending.is_none() {
            match request_rx.recv() {
                Ok(req) => {
                    pending = Some(req);
                    last_request = Instant::now();
                }
                Err(_) => break,
            }
        }

        match request_rx.recv_timeout(poll) {
            Ok(req) => {
                pending = Some(req);
                last_request = Instant::now();
            }
            Err(RecvTimeoutError::Timeout) => {
                if last_request.elapsed() >= delay {
                    if let Some(req) = pending.take() {
                        let _ = result_tx.send(write(store, key, req));
                    }
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                if let Some(req) = pending.take() {
                    let _ = result_tx.send(write(store, key, req));
                }
                break;
            }
        }
    }
}

fn write(store: &dyn Store, key: &str, req: SaveRequest) -> SaveResult {
    match store.set(key, &req.text) {
        Ok(()) => {
            log::debug!("Autosaved revision {} under {key}", req.rev);
            SaveResult {
                rev: req.rev,
                error: None,
            }
        }
        Err(e) => {
            log::warn!("Autosave of revision {} failed: {e:#}", req.rev);
            SaveResult {
                rev: req.rev,
                error: Some(format!("{e:#}")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_round_trip() -> Result<()> {
        let dir = TempDir::new()?;
        let store = FileStore::new(dir.path().join("nested"));

        assert_eq!(store.get(CONTENT_KEY)?, None);
        store.set(CONTENT_KEY, "# Draft\n")?;
        assert_eq!(store.get(CONTENT_KEY)?.as_deref(), Some("# Draft\n"));

        store.remove(CONTENT_KEY)?;
        assert_eq!(store.get(CONTENT_KEY)?, None);
        Ok(())
    }

    #[test]
    fn test_file_store_rejects_path_keys() -> Result<()> {
        let dir = TempDir::new()?;
        let store = FileStore::new(dir.path());
        assert!(store.set("../escape", "x").is_err());
        assert!(store.get("").is_err());
        Ok(())
    }

    #[test]
    fn test_memory_store_clones_share_state() -> Result<()> {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set("theme", "dark")?;
        assert_eq!(other.get("theme")?.as_deref(), Some("dark"));
        Ok(())
    }

    #[test]
    fn test_restore_falls_back_to_initial() -> Result<()> {
        let store = MemoryStore::new();
        assert_eq!(restore(&store, CONTENT_KEY, "# Hello"), "# Hello");

        store.set(CONTENT_KEY, "saved")?;
        assert_eq!(restore(&store, CONTENT_KEY, "# Hello"), "saved");
        Ok(())
    }

    #[test]
    fn test_autosave_writes_latest_only() -> Result<()> {
        let store = MemoryStore::new();
        let autosave = Autosave::spawn(
            Arc::new(store.clone()),
            CONTENT_KEY,
            Duration::from_millis(100),
        );

        autosave.request(1, Arc::from("first"));
        autosave.request(2, Arc::from("second"));
        autosave.request(3, Arc::from("third"));

        // Nothing lands before the quiet period
        assert_eq!(store.get(CONTENT_KEY)?, None);

        let mut result = None;
        for _ in 0..40 {
            thread::sleep(Duration::from_millis(25));
            result = autosave.try_recv_result();
            if result.is_some() {
                break;
            }
        }

        let result = result.expect("autosave should complete");
        assert_eq!(result.rev, 3);
        assert!(result.error.is_none());
        assert_eq!(store.get(CONTENT_KEY)?.as_deref(), Some("third"));
        assert!(autosave.try_recv_result().is_none());
        Ok(())
    }

    #[test]
    fn test_autosave_with_zero_delay() -> Result<()> {
        let store = MemoryStore::new();
        let autosave = Autosave::spawn(Arc::new(store.clone()), CONTENT_KEY, Duration::ZERO);

        let mut result = None;
        autosave.request(1, Arc::from("now"));
        for _ in 0..40 {
            thread::sleep(Duration::from_millis(10));
            result = autosave.try_recv_result();
            if result.is_some() {
                break;
            }
        }
        assert_eq!(result.map(|r| r.rev), Some(1));
        assert_eq!(store.get(CONTENT_KEY)?.as_deref(), Some("now"));

        // Idle worker still picks up later requests and shuts down cleanly
        autosave.request(2, Arc::from("later"));
        autosave.shutdown();
        assert_eq!(store.get(CONTENT_KEY)?.as_deref(), Some("later"));
        Ok(())
    }

    #[test]
    fn test_autosave_flushes_on_shutdown() -> Result<()> {
        let store = MemoryStore::new();
        let autosave = Autosave::spawn(
            Arc::new(store.clone()),
            CONTENT_KEY,
            Duration::from_secs(60),
        );

        autosave.request(7, Arc::from("pending"));
        autosave.shutdown();

        assert_eq!(store.get(CONTENT_KEY)?.as_deref(), Some("pending"));
        Ok(())
    }
}
