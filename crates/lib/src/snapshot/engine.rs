//! Snapshot capture and workspace manifest discovery.

use std::path::{Path, PathBuf};

use tokio::task::JoinSet;
use tracing::debug;
use walkdir::WalkDir;

use crate::manifest::{MANIFEST_FILENAME, extract_fields, read_manifest};
use crate::snapshot::types::{Baseline, Snapshot};

/// Directories never descended into during the fallback scan.
const EXCLUDED_DIRS: [&str; 5] = ["node_modules", "dist", "out", ".next", ".turbo"];

/// Upper bound on manifests collected by the fallback scan.
const DISCOVERY_CAP: usize = 10;

/// Capture a snapshot of one manifest.
///
/// Returns `None` when the manifest cannot be read. The caller decides what
/// absence means; the diff engine treats it as "no changes".
pub async fn snapshot_one(path: &Path, fields: &[String]) -> Option<Snapshot> {
  let manifest = read_manifest(path).await?;
  Some(Snapshot::new(extract_fields(&manifest, fields)))
}

/// Discover the manifests of a workspace.
///
/// Tier one checks each root for a manifest directly at the root; any hits
/// are the complete result set. Only when no root carries a manifest does
/// tier two fall back to a recursive scan, skipping dependency and build
/// output directories and capped at [`DISCOVERY_CAP`] files.
pub async fn discover_manifests(roots: &[PathBuf]) -> Vec<PathBuf> {
  let mut found = Vec::new();

  for root in roots {
    let candidate = root.join(MANIFEST_FILENAME);
    let is_file = tokio::fs::metadata(&candidate)
      .await
      .map(|m| m.is_file())
      .unwrap_or(false);
    if is_file {
      found.push(candidate);
    }
  }

  if !found.is_empty() {
    return found;
  }

  for root in roots {
    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
      !(entry.file_type().is_dir()
        && entry
          .file_name()
          .to_str()
          .is_some_and(|name| EXCLUDED_DIRS.contains(&name)))
    });

    for entry in walker.flatten() {
      if found.len() >= DISCOVERY_CAP {
        debug!(cap = DISCOVERY_CAP, "manifest discovery cap reached");
        return found;
      }
      if entry.file_type().is_file() && entry.file_name() == MANIFEST_FILENAME {
        found.push(entry.into_path());
      }
    }
  }

  found
}

/// Snapshot every discovered manifest concurrently.
///
/// Paths that fail to snapshot are omitted from the result rather than
/// recorded as empty entries.
pub async fn snapshot_workspace(roots: &[PathBuf], fields: &[String]) -> Baseline {
  let paths = discover_manifests(roots).await;

  let mut tasks = JoinSet::new();
  for path in paths {
    let fields = fields.to_vec();
    tasks.spawn(async move {
      let snapshot = snapshot_one(&path, &fields).await;
      (path, snapshot)
    });
  }

  let mut baseline = Baseline::new();
  while let Some(joined) = tasks.join_next().await {
    if let Ok((path, Some(snapshot))) = joined {
      baseline.insert(path, snapshot);
    }
  }

  baseline
}
