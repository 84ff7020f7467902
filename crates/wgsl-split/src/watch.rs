use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use crossbeam_channel::{Receiver, Sender};
use notify_debouncer_mini::{DebouncedEventKind, Debouncer, new_debouncer};

/// Watches a set of WGSL files and reports which of them changed.
pub struct SourceWatcher {
    _debouncer: Debouncer<notify::RecommendedWatcher>,
    receiver: Receiver<PathBuf>,
}

impl SourceWatcher {
    pub fn new(files: &[PathBuf]) -> Result<Self> {
        let (tx, rx): (Sender<PathBuf>, Receiver<PathBuf>) = crossbeam_channel::unbounded();
        let watched: HashSet<PathBuf> = files.iter().map(|p| normalize(p)).collect();

        let filter = watched.clone();
        let mut debouncer = new_debouncer(
            Duration::from_millis(100),
            move |res: Result<Vec<notify_debouncer_mini::DebouncedEvent>, notify::Error>| {
                if let Ok(events) = res {
                    for event in events {
                        if event.kind == DebouncedEventKind::Any && is_watched(&filter, &event.path) {
                            let _ = tx.send(event.path.clone());
                        }
                    }
                }
            },
        )?;

        // Watch parent directories so atomic-rename saves are seen
        let dirs: HashSet<PathBuf> = watched
            .iter()
            .filter_map(|p| p.parent().map(Path::to_path_buf))
            .collect();
        for dir in &dirs {
            debouncer
                .watcher()
                .watch(dir, notify::RecursiveMode::NonRecursive)?;
            log::info!("Watching {} for shader changes", dir.display());
        }

        Ok(Self {
            _debouncer: debouncer,
            receiver: rx,
        })
    }

    /// Drain all pending change events and return the unique paths.
    pub fn drain_changes(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        while let Ok(path) = self.receiver.try_recv() {
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        paths
    }

    /// Block until a watched file changes or `timeout` elapses.
    pub fn wait_for_change(&self, timeout: Duration) -> Option<PathBuf> {
        self.receiver.recv_timeout(timeout).ok()
    }
}

fn normalize(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn is_watched(watched: &HashSet<PathBuf>, path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "wgsl") && watched.contains(&normalize(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_listed_wgsl_files_are_watched() {
        let dir = tempfile::tempdir().unwrap();
        let shader = dir.path().join("a.wgsl");
        let other = dir.path().join("b.wgsl");
        let notes = dir.path().join("a.txt");
        for p in [&shader, &other, &notes] {
            std::fs::write(p, "").unwrap();
        }

        let watched: HashSet<PathBuf> = [normalize(&shader)].into_iter().collect();
        assert!(is_watched(&watched, &shader));
        assert!(!is_watched(&watched, &other));
        assert!(!is_watched(&watched, &notes));
    }

    #[test]
    fn new_watcher_has_no_pending_changes() {
        let dir = tempfile::tempdir().unwrap();
        let shader = dir.path().join("a.wgsl");
        std::fs::write(&shader, "").unwrap();

        let watcher = SourceWatcher::new(&[shader]).unwrap();
        assert!(watcher.drain_changes().is_empty());
        assert!(watcher.wait_for_change(Duration::from_millis(10)).is_none());
    }
}
