//! Reset command implementation.

use anyhow::Result;
use depwatch_lib::session::WatchSession;

use crate::output::{print_info, print_success};
use crate::prompts::confirm;

pub async fn cmd_reset(mut session: WatchSession, force: bool) -> Result<()> {
  if !confirm("Clear the baseline and retake a full snapshot?", force)? {
    print_info("Cancelled");
    return Ok(());
  }

  let baseline = session.reset().await?;
  print_success(&format!(
    "Baseline reset and freshly snapshotted ({} manifest(s))",
    baseline.len()
  ));
  Ok(())
}
