//! Snapshot types.
//!
//! A [`Snapshot`] captures the dependency state of one manifest at one
//! instant; a [`Baseline`] maps every tracked manifest path to its
//! last-recorded snapshot and is the comparison point for change
//! detection.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::manifest::DepMap;
use crate::snapshot::diff::Change;

/// Captured dependency state of one manifest.
///
/// `fields` contains only tracked field names that were present on the
/// manifest at capture time; an absent field means the manifest had no
/// entry for it. The diff engine treats an absent field and an empty map
/// identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
  /// Tracked field name → dependency map.
  pub fields: BTreeMap<String, DepMap>,
  /// Capture timestamp in epoch milliseconds. Informational only; never
  /// used in comparisons.
  pub taken_at: u64,
}

impl Snapshot {
  /// Create a snapshot taken now.
  pub fn new(fields: BTreeMap<String, DepMap>) -> Self {
    Self {
      fields,
      taken_at: now_millis(),
    }
  }
}

/// Last-recorded snapshot per absolute manifest path.
pub type Baseline = BTreeMap<PathBuf, Snapshot>;

/// The non-empty result of one detection cycle for one manifest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
  /// The manifest that drifted.
  pub path: PathBuf,
  /// The transitions since the baseline entry, grouped by field.
  pub changes: Vec<Change>,
}

/// Current time in epoch milliseconds.
pub fn now_millis() -> u64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_millis() as u64)
    .unwrap_or(0)
}
