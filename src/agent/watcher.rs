//! Path watchers
//!
//! A watcher observes one path and emits a `BreachEvent` for every modified
//! file whose extension is in the filter it was started with. Stopping a
//! watcher waits for its task to finish, so once `stop` returns no further
//! event from it can be delivered. A stop signal also interrupts a send
//! blocked on a full channel.
//!
//! Events carry the generation of the watcher set that produced them, so a
//! consumer can drop events still buffered from a torn-down set.
//!
//! The bundled backend polls modification times; anything producing
//! modification events for a path can stand in via `WatchBackend`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::extension_matches;
use crate::error::Result;

/// A modification of a watched canary that matched the extension filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreachEvent {
    pub path: PathBuf,
    /// Watcher-set generation the event was produced under
    pub generation: u64,
}

/// Source of modification events for a path
pub trait WatchBackend: Send + Sync {
    fn watch(
        &self,
        path: &Path,
        extensions: Vec<String>,
        generation: u64,
        events: mpsc::Sender<BreachEvent>,
    ) -> Result<WatcherHandle>;
}

/// Running watcher; dropping the handle also ends it, but without waiting
pub struct WatcherHandle {
    path: PathBuf,
    stop_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl WatcherHandle {
    pub fn new(path: PathBuf, stop_tx: oneshot::Sender<()>, task: JoinHandle<()>) -> Self {
        Self {
            path,
            stop_tx: Some(stop_tx),
            task,
        }
    }

    /// Signal the watcher and wait until its task has exited
    pub async fn stop(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = self.task.await {
            if !e.is_cancelled() {
                warn!(path = %self.path.display(), "Watcher task panicked: {}", e);
            }
        }
    }
}

/// Poll-based backend (non-recursive, like a single-directory observer)
#[derive(Debug, Clone)]
pub struct PollingBackend {
    interval: Duration,
}

impl PollingBackend {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for PollingBackend {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl WatchBackend for PollingBackend {
    fn watch(
        &self,
        path: &Path,
        extensions: Vec<String>,
        generation: u64,
        events: mpsc::Sender<BreachEvent>,
    ) -> Result<WatcherHandle> {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let root = path.to_path_buf();
        let interval = self.interval;

        // Baseline is taken before returning so edits right after install are seen.
        let mut baseline = scan(&root);

        let task_root = root.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        let scan_root = task_root.clone();
                        let scanned = tokio::task::spawn_blocking(move || scan(&scan_root)).await;
                        let current = match scanned {
                            Ok(current) => current,
                            Err(e) => {
                                warn!(path = %task_root.display(), "Watch scan failed: {}", e);
                                continue;
                            }
                        };

                        for changed in modified_since(&baseline, &current) {
                            if !extension_matches(&changed, &extensions) {
                                continue;
                            }
                            debug!(path = %changed.display(), "Canary modified");
                            let event = BreachEvent { path: changed, generation };
                            tokio::select! {
                                biased;
                                _ = &mut stop_rx => return,
                                sent = events.send(event) => {
                                    if sent.is_err() {
                                        return;
                                    }
                                }
                            }
                        }
                        baseline = current;
                    }
                }
            }
        });

        Ok(WatcherHandle::new(root, stop_tx, task))
    }
}

type Fingerprint = (Option<SystemTime>, u64);

/// Files directly under `root` (or `root` itself if it is a file)
fn scan(root: &Path) -> HashMap<PathBuf, Fingerprint> {
    let mut files = HashMap::new();
    let Ok(meta) = std::fs::metadata(root) else {
        return files;
    };

    if meta.is_file() {
        files.insert(root.to_path_buf(), (meta.modified().ok(), meta.len()));
        return files;
    }

    if let Ok(entries) = std::fs::read_dir(root) {
        for entry in entries.filter_map(|e| e.ok()) {
            if let Ok(meta) = entry.metadata() {
                if meta.is_file() {
                    files.insert(entry.path(), (meta.modified().ok(), meta.len()));
                }
            }
        }
    }
    files
}

/// Files present in both scans whose mtime or size changed
fn modified_since(
    before: &HashMap<PathBuf, Fingerprint>,
    after: &HashMap<PathBuf, Fingerprint>,
) -> Vec<PathBuf> {
    let mut changed: Vec<PathBuf> = after
        .iter()
        .filter(|(path, fp)| before.get(*path).is_some_and(|old| old != *fp))
        .map(|(path, _)| path.clone())
        .collect();
    changed.sort();
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::time::timeout;

    fn backend() -> PollingBackend {
        PollingBackend::new(Duration::from_millis(20))
    }

    #[tokio::test]
    async fn test_modification_with_matching_extension_is_reported() {
        let dir = tempdir().unwrap();
        let bait = dir.path().join("bait.txt");
        std::fs::write(&bait, "original").unwrap();

        let (tx, mut rx) = mpsc::channel(8);
        let handle = backend()
            .watch(dir.path(), vec![".TXT".to_string()], 0, tx)
            .unwrap();

        std::fs::write(&bait, "tampered with by someone").unwrap();
        let event = timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("no breach event")
            .unwrap();
        assert_eq!(event.path, bait);

        handle.stop().await;
    }

    #[tokio::test]
    async fn test_other_extensions_are_ignored() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("holiday.jpg");
        std::fs::write(&image, "jpg").unwrap();

        let (tx, mut rx) = mpsc::channel(8);
        let handle = backend().watch(dir.path(), vec![".txt".into()], 0, tx).unwrap();

        std::fs::write(&image, "a much longer jpg payload").unwrap();
        assert!(timeout(Duration::from_millis(200), rx.recv()).await.is_err());

        handle.stop().await;
    }

    #[tokio::test]
    async fn test_no_events_after_stop() {
        let dir = tempdir().unwrap();
        let bait = dir.path().join("bait.txt");
        std::fs::write(&bait, "original").unwrap();

        let (tx, mut rx) = mpsc::channel(8);
        let handle = backend().watch(dir.path(), vec![".txt".into()], 0, tx).unwrap();
        handle.stop().await;

        std::fs::write(&bait, "modified after teardown").unwrap();
        // The sender was owned by the stopped task, so the channel is closed.
        assert_eq!(timeout(Duration::from_millis(200), rx.recv()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_single_file_path_can_be_watched() {
        let dir = tempdir().unwrap();
        let bait = dir.path().join("keys.pdf");
        std::fs::write(&bait, "v1").unwrap();

        let (tx, mut rx) = mpsc::channel(8);
        let handle = backend().watch(&bait, vec![".pdf".into()], 0, tx).unwrap();

        std::fs::write(&bait, "v2 with more bytes").unwrap();
        let event = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
        assert_eq!(event.path, bait);

        handle.stop().await;
    }

    #[tokio::test]
    async fn test_stop_interrupts_send_on_full_channel() {
        let dir = tempdir().unwrap();
        for i in 0..5 {
            std::fs::write(dir.path().join(format!("bait{}.txt", i)), "v1").unwrap();
        }

        // Nobody reads this channel, so the second event blocks the watcher.
        let (tx, _rx) = mpsc::channel(1);
        let handle = backend().watch(dir.path(), vec![".txt".into()], 7, tx).unwrap();
        for i in 0..5 {
            std::fs::write(dir.path().join(format!("bait{}.txt", i)), "v2 longer").unwrap();
        }
        tokio::time::sleep(Duration::from_millis(200)).await;

        timeout(Duration::from_secs(2), handle.stop())
            .await
            .expect("stop blocked on a full channel");
    }

    #[tokio::test]
    async fn test_events_carry_generation() {
        let dir = tempdir().unwrap();
        let bait = dir.path().join("bait.txt");
        std::fs::write(&bait, "v1").unwrap();

        let (tx, mut rx) = mpsc::channel(8);
        let handle = backend().watch(dir.path(), vec![".txt".into()], 3, tx).unwrap();
        std::fs::write(&bait, "v2 with more bytes").unwrap();

        let event = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
        assert_eq!(event.generation, 3);
        handle.stop().await;
    }

    #[test]
    fn test_new_files_are_not_modifications() {
        let mut before = HashMap::new();
        before.insert(PathBuf::from("a.txt"), (None, 1));
        let mut after = before.clone();
        after.insert(PathBuf::from("b.txt"), (None, 1));
        assert!(modified_since(&before, &after).is_empty());

        after.insert(PathBuf::from("a.txt"), (None, 2));
        assert_eq!(modified_since(&before, &after), vec![PathBuf::from("a.txt")]);
    }
}
