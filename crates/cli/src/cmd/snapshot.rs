//! Snapshot command implementation.

use anyhow::Result;
use depwatch_lib::session::WatchSession;

use crate::output::print_success;

pub async fn cmd_snapshot(mut session: WatchSession) -> Result<()> {
  let baseline = session.take_snapshot().await?;
  print_success(&format!(
    "Baseline snapshot updated for {} manifest(s)",
    baseline.len()
  ));
  Ok(())
}
