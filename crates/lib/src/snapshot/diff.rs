//! Diff computation between snapshots.
//!
//! Computes the field/name version transitions between a baseline snapshot
//! and a freshly captured one. Either side may be absent: an absent
//! previous snapshot means "first capture", an absent next snapshot means
//! the manifest is currently unreadable.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::manifest::DepMap;
use crate::snapshot::types::Snapshot;

/// One detected dependency transition.
///
/// Always an addition, removal or version modification, never a no-op:
/// `from` and `to` differ, and at most one of them is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
  /// The manifest field the dependency lives in.
  pub field: String,
  /// Dependency name.
  pub name: String,
  /// Version before the transition; absent for an added dependency.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub from: Option<String>,
  /// Version after the transition; absent for a removed dependency.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub to: Option<String>,
}

impl fmt::Display for Change {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}: {}  {} → {}",
      self.field,
      self.name,
      self.from.as_deref().unwrap_or("∅"),
      self.to.as_deref().unwrap_or("∅"),
    )
  }
}

/// Compute the changes between two snapshots.
///
/// - `prev` absent, `next` present: every entry of `next` is reported as an
///   addition (the first-ever snapshot is "everything added").
/// - `next` absent: no changes. A manifest that became unreadable is
///   treated as "currently no data" rather than "everything removed".
/// - Both present: the union of field names and of dependency names on both
///   sides is compared by string equality, defaulting a missing field to an
///   empty map; a [`Change`] is emitted only where the two sides differ.
///
/// The output is stably ordered and grouped by field via map iteration
/// order; no further ordering is promised.
pub fn diff_snapshots(prev: Option<&Snapshot>, next: Option<&Snapshot>) -> Vec<Change> {
  let mut changes = Vec::new();

  let Some(next) = next else {
    return changes;
  };

  let Some(prev) = prev else {
    for (field, deps) in &next.fields {
      for (name, to) in deps {
        changes.push(Change {
          field: field.clone(),
          name: name.clone(),
          from: None,
          to: Some(to.clone()),
        });
      }
    }
    return changes;
  };

  let empty = DepMap::new();
  let fields: BTreeSet<&String> = prev.fields.keys().chain(next.fields.keys()).collect();

  for field in fields {
    let a = prev.fields.get(field).unwrap_or(&empty);
    let b = next.fields.get(field).unwrap_or(&empty);
    let names: BTreeSet<&String> = a.keys().chain(b.keys()).collect();

    for name in names {
      let from = a.get(name);
      let to = b.get(name);
      if from != to {
        changes.push(Change {
          field: field.clone(),
          name: name.clone(),
          from: from.cloned(),
          to: to.cloned(),
        });
      }
    }
  }

  changes
}
