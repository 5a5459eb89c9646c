//! Manifest change events.

use std::path::{Path, PathBuf};

use crate::manifest::MANIFEST_FILENAME;

/// A file-change notification for a manifest path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEvent {
  pub path: PathBuf,
  pub kind: ManifestEventKind,
}

/// Simplified event kinds. Creation and modification trigger the same
/// detection cycle; the distinction is kept for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestEventKind {
  Created,
  Modified,
}

/// Whether a path names a manifest this crate tracks.
pub fn is_manifest_path(path: &Path) -> bool {
  path.file_name().is_some_and(|name| name == MANIFEST_FILENAME)
}
