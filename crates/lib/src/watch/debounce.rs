//! Delay-and-coalesce state machine for manifest change events.
//!
//! The session loop owns the clock: it records events as they arrive,
//! sleeps until [`next_deadline`](Debouncer::next_deadline) and collects
//! due paths with [`take_due`](Debouncer::take_due). Keeping the state
//! machine free of timers makes the coalescing rules directly testable.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tokio::time::Instant;

/// Debounce scheduling policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DebouncePolicy {
  /// One shared timer across all paths. A new event cancels whatever was
  /// pending, even for another path; that path's change stays undetected
  /// until its next edit.
  #[default]
  Global,
  /// Independent timer per path.
  PerPath,
}

/// Coalesces bursts of file-change events into single detection cycles.
#[derive(Debug)]
pub struct Debouncer {
  delay: Duration,
  policy: DebouncePolicy,
  pending: BTreeMap<PathBuf, Instant>,
}

impl Debouncer {
  pub fn new(delay: Duration, policy: DebouncePolicy) -> Self {
    Self {
      delay,
      policy,
      pending: BTreeMap::new(),
    }
  }

  /// Record an event for `path`, (re)starting its timer.
  ///
  /// Under the global policy any other pending path is dropped outright.
  pub fn record(&mut self, path: PathBuf, now: Instant) {
    if self.policy == DebouncePolicy::Global {
      self.pending.clear();
    }
    self.pending.insert(path, now + self.delay);
  }

  /// Earliest pending deadline, if any.
  pub fn next_deadline(&self) -> Option<Instant> {
    self.pending.values().min().copied()
  }

  /// Remove and return every path whose deadline has passed.
  pub fn take_due(&mut self, now: Instant) -> Vec<PathBuf> {
    let due: Vec<PathBuf> = self
      .pending
      .iter()
      .filter(|(_, deadline)| **deadline <= now)
      .map(|(path, _)| path.clone())
      .collect();
    for path in &due {
      self.pending.remove(path);
    }
    due
  }

  /// True when nothing is pending.
  pub fn is_idle(&self) -> bool {
    self.pending.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const DELAY: Duration = Duration::from_millis(250);

  fn path(name: &str) -> PathBuf {
    PathBuf::from(format!("/work/{name}/package.json"))
  }

  #[test]
  fn idle_debouncer_has_no_deadline() {
    let debouncer = Debouncer::new(DELAY, DebouncePolicy::Global);
    assert!(debouncer.is_idle());
    assert!(debouncer.next_deadline().is_none());
  }

  #[test]
  fn record_schedules_after_delay() {
    let mut debouncer = Debouncer::new(DELAY, DebouncePolicy::Global);
    let now = Instant::now();

    debouncer.record(path("a"), now);

    assert_eq!(debouncer.next_deadline(), Some(now + DELAY));
    assert!(debouncer.take_due(now).is_empty());
    assert_eq!(debouncer.take_due(now + DELAY), vec![path("a")]);
    assert!(debouncer.is_idle());
  }

  #[test]
  fn repeated_event_restarts_the_timer() {
    let mut debouncer = Debouncer::new(DELAY, DebouncePolicy::Global);
    let now = Instant::now();

    debouncer.record(path("a"), now);
    debouncer.record(path("a"), now + Duration::from_millis(100));

    // The original deadline has passed, the restarted one has not.
    assert!(debouncer.take_due(now + DELAY).is_empty());
    assert_eq!(
      debouncer.take_due(now + Duration::from_millis(100) + DELAY),
      vec![path("a")]
    );
  }

  #[test]
  fn global_policy_drops_other_pending_paths() {
    let mut debouncer = Debouncer::new(DELAY, DebouncePolicy::Global);
    let now = Instant::now();

    debouncer.record(path("a"), now);
    debouncer.record(path("b"), now + Duration::from_millis(50));

    // Path a's pending cycle is gone; only b fires.
    let due = debouncer.take_due(now + Duration::from_secs(10));
    assert_eq!(due, vec![path("b")]);
    assert!(debouncer.is_idle());
  }

  #[test]
  fn per_path_policy_keeps_independent_timers() {
    let mut debouncer = Debouncer::new(DELAY, DebouncePolicy::PerPath);
    let now = Instant::now();

    debouncer.record(path("a"), now);
    debouncer.record(path("b"), now + Duration::from_millis(50));

    let mut due = debouncer.take_due(now + Duration::from_secs(10));
    due.sort();
    assert_eq!(due, vec![path("a"), path("b")]);
  }

  #[test]
  fn take_due_leaves_future_deadlines_pending() {
    let mut debouncer = Debouncer::new(DELAY, DebouncePolicy::PerPath);
    let now = Instant::now();

    debouncer.record(path("a"), now);
    debouncer.record(path("b"), now + Duration::from_millis(200));

    assert_eq!(debouncer.take_due(now + DELAY), vec![path("a")]);
    assert!(!debouncer.is_idle());
  }

  #[test]
  fn zero_delay_fires_immediately() {
    let mut debouncer = Debouncer::new(Duration::ZERO, DebouncePolicy::Global);
    let now = Instant::now();

    debouncer.record(path("a"), now);

    assert_eq!(debouncer.take_due(now), vec![path("a")]);
  }
}
