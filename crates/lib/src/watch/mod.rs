//! File-change event intake and debouncing.

pub mod debounce;
pub mod events;
pub mod fs;

pub use debounce::{DebouncePolicy, Debouncer};
pub use events::{ManifestEvent, ManifestEventKind, is_manifest_path};
pub use fs::{ManifestWatcher, WatchError};
