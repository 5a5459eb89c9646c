//! Manifest reading and dependency field extraction.
//!
//! A manifest is a `package.json` file. Reading is tolerant: any failure
//! (missing file, unreadable, malformed JSON, non-object root) collapses to
//! `None`, so callers above this layer only ever see "no data" rather than
//! an error.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

/// Dependency name → version specifier.
pub type DepMap = BTreeMap<String, String>;

/// Sentinel version for list-shaped fields that carry no explicit version.
pub const WILDCARD_VERSION: &str = "*";

/// Manifest file name this crate tracks.
pub const MANIFEST_FILENAME: &str = "package.json";

/// Dependency fields tracked when no whitelist is configured.
pub const DEFAULT_FIELDS: [&str; 5] = [
  "dependencies",
  "devDependencies",
  "peerDependencies",
  "optionalDependencies",
  "bundledDependencies",
];

/// Default tracked fields as owned strings.
pub fn default_fields() -> Vec<String> {
  DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect()
}

/// Read and parse a manifest file.
///
/// Returns `None` on any failure. The failure is logged at debug level and
/// never surfaced to the caller; the next triggering event retries
/// naturally.
pub async fn read_manifest(path: &Path) -> Option<Map<String, Value>> {
  let raw = match tokio::fs::read_to_string(path).await {
    Ok(raw) => raw,
    Err(e) => {
      debug!(path = %path.display(), error = %e, "manifest unreadable");
      return None;
    }
  };

  match serde_json::from_str::<Value>(&raw) {
    Ok(Value::Object(map)) => Some(map),
    Ok(_) => {
      debug!(path = %path.display(), "manifest root is not an object");
      None
    }
    Err(e) => {
      debug!(path = %path.display(), error = %e, "manifest is not valid JSON");
      None
    }
  }
}

/// Project a parsed manifest into per-field dependency maps.
///
/// Only fields present on the manifest and named in `fields` appear in the
/// output. An object-shaped field is copied entry by entry (string values
/// only); a list-shaped field (historically `bundledDependencies`) maps
/// every name to [`WILDCARD_VERSION`]. Any other shape is treated as
/// absent.
pub fn extract_fields(manifest: &Map<String, Value>, fields: &[String]) -> BTreeMap<String, DepMap> {
  let mut out = BTreeMap::new();

  for field in fields {
    let Some(value) = manifest.get(field) else {
      continue;
    };

    match value {
      Value::Object(map) => {
        let deps: DepMap = map
          .iter()
          .filter_map(|(name, version)| version.as_str().map(|v| (name.clone(), v.to_string())))
          .collect();
        out.insert(field.clone(), deps);
      }
      Value::Array(names) => {
        let deps: DepMap = names
          .iter()
          .filter_map(|name| name.as_str().map(|n| (n.to_string(), WILDCARD_VERSION.to_string())))
          .collect();
        out.insert(field.clone(), deps);
      }
      _ => {}
    }
  }

  out
}
