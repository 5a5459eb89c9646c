//! Baseline persistence.
//!
//! The baseline lives in a single versioned JSON file:
//!
//! ```json
//! {
//!   "version": 1,
//!   "entries": {
//!     "/work/app/package.json": {
//!       "fields": { "dependencies": { "lodash": "^4.17.20" } },
//!       "takenAt": 1733667300000
//!     }
//!   }
//! }
//! ```
//!
//! Writes go to a temporary sibling and are renamed over the target, so a
//! crash never leaves a torn file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::snapshot::types::Baseline;

/// Current baseline file format version.
pub const BASELINE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct BaselineFile {
  version: u32,
  entries: Baseline,
}

/// Errors that can occur when persisting or loading the baseline.
#[derive(Debug, Error)]
pub enum BaselineError {
  /// Failed to read the baseline file.
  #[error("failed to read baseline file: {0}")]
  Read(#[source] io::Error),

  /// Failed to write the baseline file.
  #[error("failed to write baseline file: {0}")]
  Write(#[source] io::Error),

  /// Failed to create the baseline directory.
  #[error("failed to create baseline directory: {0}")]
  CreateDir(#[source] io::Error),

  /// Failed to parse the baseline file JSON.
  #[error("failed to parse baseline file: {0}")]
  Parse(#[source] serde_json::Error),

  /// Failed to serialize the baseline.
  #[error("failed to serialize baseline: {0}")]
  Serialize(#[source] serde_json::Error),

  /// Baseline file version is not supported.
  #[error("unsupported baseline file version {0}, expected {BASELINE_VERSION}")]
  UnsupportedVersion(u32),
}

/// Persists the last-recorded snapshot per manifest path.
///
/// The store exposes read-and-full-replace only: callers load the mapping,
/// modify a copy and call [`replace`](Self::replace). The baseline is
/// bounded by the workspace manifest count and updates are infrequent, so
/// no partial-entry primitive is needed.
#[derive(Debug, Clone)]
pub struct BaselineStore {
  path: PathBuf,
}

impl BaselineStore {
  /// Create a store backed by the given file path.
  pub fn new(path: PathBuf) -> Self {
    Self { path }
  }

  /// The file this store reads and writes.
  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Load the persisted baseline.
  ///
  /// A missing file is an empty baseline, not an error.
  pub fn load(&self) -> Result<Baseline, BaselineError> {
    let content = match fs::read_to_string(&self.path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Baseline::new()),
      Err(e) => return Err(BaselineError::Read(e)),
    };

    let file: BaselineFile = serde_json::from_str(&content).map_err(BaselineError::Parse)?;

    if file.version != BASELINE_VERSION {
      return Err(BaselineError::UnsupportedVersion(file.version));
    }

    Ok(file.entries)
  }

  /// Atomically persist the full baseline, overwriting any prior value.
  pub fn replace(&self, baseline: &Baseline) -> Result<(), BaselineError> {
    if let Some(parent) = self.path.parent() {
      fs::create_dir_all(parent).map_err(BaselineError::CreateDir)?;
    }

    let file = BaselineFile {
      version: BASELINE_VERSION,
      entries: baseline.clone(),
    };
    let content = serde_json::to_string_pretty(&file).map_err(BaselineError::Serialize)?;

    let temp_path = self.path.with_extension("json.tmp");
    fs::write(&temp_path, &content).map_err(BaselineError::Write)?;
    fs::rename(&temp_path, &self.path).map_err(BaselineError::Write)?;

    Ok(())
  }
}
