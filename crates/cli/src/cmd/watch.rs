//! Watch command implementation.
//!
//! Ensures an initial baseline, watches the workspace roots and runs the
//! debounced detection loop until interrupted.

use std::collections::BTreeSet;

use anyhow::Result;
use depwatch_lib::session::WatchSession;
use depwatch_lib::snapshot::Detection;
use depwatch_lib::watch::ManifestWatcher;
use tokio::sync::mpsc;

use crate::output::{print_change, print_info, print_warning};

pub async fn cmd_watch(mut session: WatchSession) -> Result<()> {
  if session.ensure_baseline().await? {
    print_info("Captured initial baseline");
  }

  let (event_tx, event_rx) = mpsc::unbounded_channel();
  let mut watcher = ManifestWatcher::new(event_tx)?;
  for root in session.roots().to_vec() {
    watcher.watch(&root)?;
  }

  print_info(&format!(
    "Watching {} root(s) for manifest changes (Ctrl-C to stop)",
    session.roots().len()
  ));

  let (detection_tx, mut detection_rx) = mpsc::unbounded_channel();
  let show_status = session.config().show_status;

  let printer = tokio::spawn(async move {
    let mut changed = BTreeSet::new();
    while let Some(detection) = detection_rx.recv().await {
      print_detection(&detection);
      changed.insert(detection.path.clone());
      if show_status {
        print_info(&format!("{} manifest(s) changed since baseline", changed.len()));
      }
    }
  });

  tokio::select! {
    result = session.run(event_rx, detection_tx) => result?,
    _ = tokio::signal::ctrl_c() => {
      print_info("Stopped");
    }
  }

  // The run future (and with it the detection sender) is gone; let the
  // printer drain.
  printer.await.ok();

  Ok(())
}

fn print_detection(detection: &Detection) {
  print_warning(&format!("Dependency changes in {}", detection.path.display()));
  for change in &detection.changes {
    print_change(change);
  }
}
