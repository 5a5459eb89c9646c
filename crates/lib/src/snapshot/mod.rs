//! Snapshot capture, diffing and baseline persistence.

pub mod diff;
pub mod engine;
pub mod storage;
pub mod types;

pub use diff::{Change, diff_snapshots};
pub use engine::{discover_manifests, snapshot_one, snapshot_workspace};
pub use storage::{BaselineError, BaselineStore};
pub use types::{Baseline, Detection, Snapshot};
