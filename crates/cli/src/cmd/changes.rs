//! Changes command implementation.
//!
//! Read-only diff of one manifest against its baseline entry. Neither the
//! baseline nor the pending set is touched.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use depwatch_lib::session::WatchSession;
use depwatch_lib::watch::is_manifest_path;

use crate::output::{OutputFormat, print_change, print_info, print_json};

pub async fn cmd_changes(session: WatchSession, file: &Path, output: OutputFormat) -> Result<()> {
  if !is_manifest_path(file) {
    bail!("not a manifest: {} (expected a package.json)", file.display());
  }

  let file = absolutize(file)?;
  let changes = session.changes_for(&file).await?;

  if output.is_json() {
    print_json(&serde_json::json!({
      "file": file,
      "changes": changes,
    }))?;
    return Ok(());
  }

  if changes.is_empty() {
    print_info("No version changes since baseline");
    return Ok(());
  }

  println!("Dependency changes since baseline for {}", file.display());
  for change in &changes {
    print_change(change);
  }

  Ok(())
}

/// Baseline entries are keyed by the discovered absolute path; resolve a
/// relative argument against the current directory so lookups match.
fn absolutize(path: &Path) -> Result<PathBuf> {
  if path.is_absolute() {
    Ok(path.to_path_buf())
  } else {
    Ok(std::env::current_dir()?.join(path))
  }
}
