//! Per-workspace watch session.
//!
//! A session owns everything as explicit fields: the baseline store handle,
//! the pending-changes set and the debounce state. All mutation happens on
//! the session's task. Continuations re-load the baseline after every await
//! instead of holding one across suspension points; a manual snapshot may
//! have replaced it in the meantime.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tracing::{debug, info};

use crate::config::Config;
use crate::snapshot::diff::{Change, diff_snapshots};
use crate::snapshot::engine::{discover_manifests, snapshot_one, snapshot_workspace};
use crate::snapshot::storage::{BaselineError, BaselineStore};
use crate::snapshot::types::{Baseline, Detection};
use crate::watch::debounce::Debouncer;
use crate::watch::events::{ManifestEvent, is_manifest_path};

/// Which manifests an install entry point targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallScope {
  /// Every discovered manifest in the workspace.
  All,
  /// Only manifests with detected-but-unacknowledged changes.
  Changed,
}

/// The per-workspace controller for change detection.
pub struct WatchSession {
  config: Config,
  roots: Vec<PathBuf>,
  store: BaselineStore,
  changed: BTreeSet<PathBuf>,
  debouncer: Debouncer,
}

impl WatchSession {
  pub fn new(config: Config, roots: Vec<PathBuf>, store: BaselineStore) -> Self {
    let debouncer = Debouncer::new(config.debounce_delay(), config.debounce);
    Self {
      config,
      roots,
      store,
      changed: BTreeSet::new(),
      debouncer,
    }
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn roots(&self) -> &[PathBuf] {
    &self.roots
  }

  /// The persisted baseline, freshly loaded.
  pub fn baseline(&self) -> Result<Baseline, BaselineError> {
    self.store.load()
  }

  /// The file the baseline is persisted in.
  pub fn baseline_path(&self) -> &Path {
    self.store.path()
  }

  /// Manifest paths with detected-but-unacknowledged changes.
  pub fn changed_paths(&self) -> Vec<PathBuf> {
    self.changed.iter().cloned().collect()
  }

  /// Take an initial full snapshot iff no baseline is persisted yet.
  ///
  /// Returns whether a snapshot was taken.
  pub async fn ensure_baseline(&mut self) -> Result<bool, BaselineError> {
    if !self.store.load()?.is_empty() {
      return Ok(false);
    }

    let baseline = snapshot_workspace(&self.roots, &self.config.fields).await;
    self.store.replace(&baseline)?;
    info!(manifests = baseline.len(), "captured initial baseline");
    Ok(true)
  }

  /// Full-workspace snapshot; replaces the whole baseline and clears the
  /// pending set.
  pub async fn take_snapshot(&mut self) -> Result<Baseline, BaselineError> {
    let baseline = snapshot_workspace(&self.roots, &self.config.fields).await;
    self.store.replace(&baseline)?;
    self.changed.clear();
    info!(manifests = baseline.len(), "baseline replaced");
    Ok(baseline)
  }

  /// Clear the baseline, then immediately retake a full snapshot.
  pub async fn reset(&mut self) -> Result<Baseline, BaselineError> {
    self.store.replace(&Baseline::new())?;
    self.take_snapshot().await
  }

  /// Read-only diff of one manifest's live state against its baseline
  /// entry. Mutates neither the baseline nor the pending set.
  pub async fn changes_for(&self, path: &Path) -> Result<Vec<Change>, BaselineError> {
    let next = snapshot_one(path, &self.config.fields).await;
    let baseline = self.store.load()?;
    Ok(diff_snapshots(baseline.get(path), next.as_ref()))
  }

  /// One detection cycle for one manifest.
  ///
  /// On a non-empty diff the path joins the pending set and its baseline
  /// entry is replaced with the fresh snapshot right away. The baseline
  /// advances at detection time, not at acknowledgment time; repeated
  /// unacknowledged edits therefore never re-report the same transition.
  pub async fn detect_one(&mut self, path: &Path) -> Result<Option<Detection>, BaselineError> {
    let Some(next) = snapshot_one(path, &self.config.fields).await else {
      debug!(path = %path.display(), "manifest unreadable, skipping detection");
      return Ok(None);
    };

    let mut baseline = self.store.load()?;
    let changes = diff_snapshots(baseline.get(path), Some(&next));
    if changes.is_empty() {
      return Ok(None);
    }

    self.changed.insert(path.to_path_buf());
    baseline.insert(path.to_path_buf(), next);
    self.store.replace(&baseline)?;

    info!(path = %path.display(), changes = changes.len(), "dependency changes detected");
    Ok(Some(Detection {
      path: path.to_path_buf(),
      changes,
    }))
  }

  /// Run the detection cycle over every discovered manifest.
  pub async fn detect_all(&mut self) -> Result<Vec<Detection>, BaselineError> {
    let mut detections = Vec::new();
    for path in discover_manifests(&self.roots).await {
      if let Some(detection) = self.detect_one(&path).await? {
        detections.push(detection);
      }
    }
    Ok(detections)
  }

  /// Manifest paths an install entry point should run in.
  ///
  /// Clears the pending set, mirroring the update-prompt semantics.
  pub async fn install_targets(&mut self, scope: InstallScope) -> Vec<PathBuf> {
    let targets = match scope {
      InstallScope::All => discover_manifests(&self.roots).await,
      InstallScope::Changed => self.changed.iter().cloned().collect(),
    };
    self.changed.clear();
    targets
  }

  /// Drop all pending changes without installing.
  pub fn dismiss(&mut self) {
    self.changed.clear();
  }

  /// Record a file-change event into the debouncer.
  pub fn handle_event(&mut self, event: ManifestEvent) {
    if !is_manifest_path(&event.path) {
      return;
    }
    debug!(path = %event.path.display(), kind = ?event.kind, "manifest event");
    self.debouncer.record(event.path, Instant::now());
  }

  /// Drive the debounced detection loop until the event channel closes.
  ///
  /// Detections are forwarded on `detections`; a send failure means the
  /// consumer went away and is ignored.
  pub async fn run(
    &mut self,
    mut events: mpsc::UnboundedReceiver<ManifestEvent>,
    detections: mpsc::UnboundedSender<Detection>,
  ) -> Result<(), BaselineError> {
    loop {
      let deadline = self.debouncer.next_deadline();
      let wake = deadline.unwrap_or_else(Instant::now);

      tokio::select! {
        event = events.recv() => {
          match event {
            Some(event) => self.handle_event(event),
            None => break,
          }
        }
        _ = time::sleep_until(wake), if deadline.is_some() => {
          for path in self.debouncer.take_due(Instant::now()) {
            if let Some(detection) = self.detect_one(&path).await? {
              let _ = detections.send(detection);
            }
          }
        }
      }
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::watch::events::ManifestEventKind;
  use std::fs;
  use tempfile::TempDir;

  fn workspace(deps: &str) -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("package.json");
    fs::write(&path, format!(r#"{{"dependencies": {deps}}}"#)).unwrap();
    (temp, path)
  }

  fn session_for(temp: &TempDir) -> WatchSession {
    let store = BaselineStore::new(temp.path().join(".depwatch").join("baseline.json"));
    WatchSession::new(Config::default(), vec![temp.path().to_path_buf()], store)
  }

  fn set_deps(path: &Path, deps: &str) {
    fs::write(path, format!(r#"{{"dependencies": {deps}}}"#)).unwrap();
  }

  #[tokio::test]
  async fn ensure_baseline_snapshots_once() {
    let (temp, _path) = workspace(r#"{"lodash": "^4.17.20"}"#);
    let mut session = session_for(&temp);

    assert!(session.ensure_baseline().await.unwrap());
    assert_eq!(session.baseline().unwrap().len(), 1);

    // Already populated; nothing to do.
    assert!(!session.ensure_baseline().await.unwrap());
  }

  #[tokio::test]
  async fn version_bump_is_detected_exactly_once() {
    let (temp, path) = workspace(r#"{"lodash": "^4.17.20"}"#);
    let mut session = session_for(&temp);
    session.take_snapshot().await.unwrap();

    set_deps(&path, r#"{"lodash": "^4.17.21"}"#);

    let detection = session.detect_one(&path).await.unwrap().unwrap();
    assert_eq!(
      detection.changes,
      vec![Change {
        field: "dependencies".to_string(),
        name: "lodash".to_string(),
        from: Some("^4.17.20".to_string()),
        to: Some("^4.17.21".to_string()),
      }]
    );
    assert_eq!(session.changed_paths(), vec![path.clone()]);

    // The baseline advanced at detection time: a second cycle and a
    // read-only diff both come up empty.
    assert!(session.detect_one(&path).await.unwrap().is_none());
    assert!(session.changes_for(&path).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn unreadable_manifest_is_not_a_detection() {
    let (temp, path) = workspace(r#"{"lodash": "^4.17.20"}"#);
    let mut session = session_for(&temp);
    session.take_snapshot().await.unwrap();

    fs::remove_file(&path).unwrap();

    assert!(session.detect_one(&path).await.unwrap().is_none());
    assert!(session.changed_paths().is_empty());
    // The baseline entry survives; the manifest may come back.
    assert_eq!(session.baseline().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn unchanged_manifest_is_not_a_detection() {
    let (temp, path) = workspace(r#"{"lodash": "^4.17.20"}"#);
    let mut session = session_for(&temp);
    session.take_snapshot().await.unwrap();

    set_deps(&path, r#"{"lodash": "^4.17.20"}"#);

    assert!(session.detect_one(&path).await.unwrap().is_none());
    assert!(session.changed_paths().is_empty());
  }

  #[tokio::test]
  async fn take_snapshot_clears_pending_set() {
    let (temp, path) = workspace(r#"{"lodash": "^4.17.20"}"#);
    let mut session = session_for(&temp);
    session.take_snapshot().await.unwrap();

    set_deps(&path, r#"{"lodash": "^4.17.21"}"#);
    session.detect_one(&path).await.unwrap().unwrap();
    assert!(!session.changed_paths().is_empty());

    session.take_snapshot().await.unwrap();
    assert!(session.changed_paths().is_empty());
  }

  #[tokio::test]
  async fn reset_rebuilds_the_baseline() {
    let (temp, path) = workspace(r#"{"lodash": "^4.17.20"}"#);
    let mut session = session_for(&temp);
    session.take_snapshot().await.unwrap();

    set_deps(&path, r#"{"lodash": "^5.0.0"}"#);
    let baseline = session.reset().await.unwrap();

    let entry = baseline.get(&path).unwrap();
    assert_eq!(
      entry
        .fields
        .get("dependencies")
        .and_then(|d| d.get("lodash"))
        .map(String::as_str),
      Some("^5.0.0")
    );
    assert!(session.changes_for(&path).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn changes_for_is_read_only() {
    let (temp, path) = workspace(r#"{"lodash": "^4.17.20"}"#);
    let mut session = session_for(&temp);
    session.take_snapshot().await.unwrap();

    set_deps(&path, r#"{"lodash": "^4.17.21"}"#);

    let first = session.changes_for(&path).await.unwrap();
    let second = session.changes_for(&path).await.unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(first, second);
    assert!(session.changed_paths().is_empty());
  }

  #[tokio::test]
  async fn detect_all_covers_every_discovered_manifest() {
    let temp_a = TempDir::new().unwrap();
    let temp_b = TempDir::new().unwrap();
    let path_a = temp_a.path().join("package.json");
    let path_b = temp_b.path().join("package.json");
    fs::write(&path_a, r#"{"dependencies": {"a": "1.0.0"}}"#).unwrap();
    fs::write(&path_b, r#"{"dependencies": {"b": "1.0.0"}}"#).unwrap();

    let store = BaselineStore::new(temp_a.path().join("baseline.json"));
    let roots = vec![temp_a.path().to_path_buf(), temp_b.path().to_path_buf()];
    let mut session = WatchSession::new(Config::default(), roots, store);
    session.take_snapshot().await.unwrap();

    fs::write(&path_a, r#"{"dependencies": {"a": "2.0.0"}}"#).unwrap();
    fs::write(&path_b, r#"{"dependencies": {"b": "3.0.0"}}"#).unwrap();

    let detections = session.detect_all().await.unwrap();

    assert_eq!(detections.len(), 2);
    assert_eq!(session.changed_paths().len(), 2);
  }

  #[tokio::test]
  async fn install_targets_changed_drains_the_pending_set() {
    let (temp, path) = workspace(r#"{"lodash": "^4.17.20"}"#);
    let mut session = session_for(&temp);
    session.take_snapshot().await.unwrap();

    set_deps(&path, r#"{"lodash": "^4.17.21"}"#);
    session.detect_one(&path).await.unwrap().unwrap();

    let targets = session.install_targets(InstallScope::Changed).await;
    assert_eq!(targets, vec![path]);
    assert!(session.changed_paths().is_empty());

    let empty = session.install_targets(InstallScope::Changed).await;
    assert!(empty.is_empty());
  }

  #[tokio::test]
  async fn install_targets_all_ignores_the_pending_set() {
    let (temp, path) = workspace(r#"{"lodash": "^4.17.20"}"#);
    let mut session = session_for(&temp);
    session.take_snapshot().await.unwrap();

    let targets = session.install_targets(InstallScope::All).await;
    assert_eq!(targets, vec![path]);
  }

  #[tokio::test]
  async fn dismiss_clears_without_touching_the_baseline() {
    let (temp, path) = workspace(r#"{"lodash": "^4.17.20"}"#);
    let mut session = session_for(&temp);
    session.take_snapshot().await.unwrap();

    set_deps(&path, r#"{"lodash": "^4.17.21"}"#);
    session.detect_one(&path).await.unwrap().unwrap();
    let before = session.baseline().unwrap();

    session.dismiss();

    assert!(session.changed_paths().is_empty());
    assert_eq!(session.baseline().unwrap(), before);
  }

  #[tokio::test(start_paused = true)]
  async fn rapid_edits_coalesce_into_one_detection() {
    let (temp, path) = workspace(r#"{"lodash": "^4.17.20"}"#);
    let mut session = session_for(&temp);
    session.take_snapshot().await.unwrap();

    // Two edits land before the debounce window elapses; only the final
    // state is ever diffed.
    set_deps(&path, r#"{"lodash": "^4.17.21"}"#);
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    event_tx
      .send(ManifestEvent {
        path: path.clone(),
        kind: ManifestEventKind::Modified,
      })
      .unwrap();
    set_deps(&path, r#"{"lodash": "^4.17.22"}"#);
    event_tx
      .send(ManifestEvent {
        path: path.clone(),
        kind: ManifestEventKind::Modified,
      })
      .unwrap();

    let (detection_tx, mut detection_rx) = mpsc::unbounded_channel();
    let runner = tokio::spawn(async move {
      session.run(event_rx, detection_tx).await.unwrap();
      session
    });

    let detection = detection_rx.recv().await.unwrap();
    assert_eq!(detection.changes.len(), 1);
    assert_eq!(detection.changes[0].from.as_deref(), Some("^4.17.20"));
    assert_eq!(detection.changes[0].to.as_deref(), Some("^4.17.22"));

    drop(event_tx);
    let session = runner.await.unwrap();
    assert_eq!(session.changed_paths(), vec![path]);

    // One cycle, not two.
    assert!(detection_rx.recv().await.is_none());
  }

  #[tokio::test(start_paused = true)]
  async fn non_manifest_events_are_ignored_by_the_loop() {
    let (temp, _path) = workspace(r#"{"lodash": "^4.17.20"}"#);
    let mut session = session_for(&temp);
    session.take_snapshot().await.unwrap();

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    event_tx
      .send(ManifestEvent {
        path: temp.path().join("README.md"),
        kind: ManifestEventKind::Modified,
      })
      .unwrap();
    drop(event_tx);

    let (detection_tx, mut detection_rx) = mpsc::unbounded_channel();
    session.run(event_rx, detection_tx).await.unwrap();

    assert!(detection_rx.recv().await.is_none());
    assert!(session.changed_paths().is_empty());
  }
}
