//! Bridge from filesystem notifications to the session's event channel.
//!
//! The notify callback runs on the watcher's own thread; it only filters
//! and forwards. All state lives with the receiving session task.

use std::path::{Path, PathBuf};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::watch::events::{ManifestEvent, ManifestEventKind, is_manifest_path};

/// Errors that can occur in the watch layer.
#[derive(Debug, Error)]
pub enum WatchError {
  #[error("failed to create watcher: {0}")]
  Create(#[from] notify::Error),

  #[error("failed to watch {path}: {source}")]
  WatchPath {
    path: PathBuf,
    #[source]
    source: notify::Error,
  },
}

/// Watches workspace roots and forwards manifest events into a channel.
pub struct ManifestWatcher {
  watcher: RecommendedWatcher,
}

impl ManifestWatcher {
  /// Create a watcher sending into `tx`.
  ///
  /// Only create and modify events for files named `package.json` are
  /// forwarded; everything else is dropped at the callback.
  pub fn new(tx: mpsc::UnboundedSender<ManifestEvent>) -> Result<Self, WatchError> {
    let watcher = RecommendedWatcher::new(
      move |result: Result<Event, notify::Error>| {
        let event = match result {
          Ok(event) => event,
          Err(e) => {
            warn!(error = %e, "watch error");
            return;
          }
        };

        let kind = match event.kind {
          EventKind::Create(_) => ManifestEventKind::Created,
          EventKind::Modify(_) => ManifestEventKind::Modified,
          _ => return,
        };

        for path in event.paths {
          if is_manifest_path(&path) {
            let _ = tx.send(ManifestEvent { path, kind });
          }
        }
      },
      notify::Config::default(),
    )?;

    Ok(Self { watcher })
  }

  /// Start watching a root recursively.
  pub fn watch(&mut self, root: &Path) -> Result<(), WatchError> {
    debug!(root = %root.display(), "watching for manifest changes");
    self
      .watcher
      .watch(root, RecursiveMode::Recursive)
      .map_err(|e| WatchError::WatchPath {
        path: root.to_path_buf(),
        source: e,
      })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;
  use tokio::time::{Duration, timeout};

  #[tokio::test]
  async fn forwards_manifest_writes_only() {
    let temp = TempDir::new().unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut watcher = ManifestWatcher::new(tx).unwrap();
    watcher.watch(temp.path()).unwrap();

    std::fs::write(temp.path().join("README.md"), "ignored").unwrap();
    std::fs::write(temp.path().join("package.json"), "{}").unwrap();

    let event = timeout(Duration::from_secs(5), rx.recv())
      .await
      .expect("watcher should deliver an event")
      .expect("channel open");

    assert!(is_manifest_path(&event.path));
  }

  #[tokio::test]
  async fn watching_missing_root_fails() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("gone");
    let (tx, _rx) = mpsc::unbounded_channel();

    let mut watcher = ManifestWatcher::new(tx).unwrap();
    let result = watcher.watch(&missing);

    assert!(matches!(result, Err(WatchError::WatchPath { .. })));
  }
}
