//! depwatch-lib: Core engine for depwatch
//!
//! This crate provides the machinery behind the `depwatch` binary:
//! - `manifest`: tolerant manifest reading and dependency field extraction
//! - `snapshot`: snapshot capture, workspace discovery, diffing and the
//!   persisted baseline store
//! - `watch`: filesystem event intake and the change debouncer
//! - `session`: the per-workspace controller tying the pieces together
//! - `pm`: package-manager detection and install command derivation
//! - `terminal`: fire-and-forget install execution
//! - `config`: session configuration

pub mod config;
pub mod manifest;
pub mod pm;
pub mod session;
pub mod snapshot;
pub mod terminal;
pub mod watch;
