//! Install command implementation.
//!
//! Direct entry points equivalent to the update prompt's All and Changed
//! choices. Installs are spawned fire-and-forget; their outcome is not
//! inspected.

use std::path::Path;

use anyhow::{Context, Result};
use depwatch_lib::pm::detect_package_manager;
use depwatch_lib::session::{InstallScope, WatchSession};
use depwatch_lib::terminal::spawn_install;
use tracing::debug;

use crate::output::{print_info, print_success};

pub async fn cmd_install(mut session: WatchSession, changed: bool) -> Result<()> {
  let scope = if changed {
    // "Changed" means drifted from the baseline as of this invocation.
    session.ensure_baseline().await?;
    session.detect_all().await?;
    InstallScope::Changed
  } else {
    InstallScope::All
  };

  let count = run_installs(&mut session, scope).await?;

  if count == 0 {
    print_info("No manifests to install");
  } else {
    print_success(&format!(
      "Started install in {} package director{}",
      count,
      if count == 1 { "y" } else { "ies" }
    ));
  }

  Ok(())
}

/// Spawn an install per target manifest directory. Shared with the update
/// prompt flow.
pub(crate) async fn run_installs(session: &mut WatchSession, scope: InstallScope) -> Result<usize> {
  let preference = session.config().package_manager;
  let targets = session.install_targets(scope).await;

  for file in &targets {
    let dir = file.parent().unwrap_or(Path::new("."));
    let pm = detect_package_manager(dir, preference);
    debug!(dir = %dir.display(), pm = %pm, "resolved install tool");
    let name = format!(
      "Install: {}",
      dir.file_name().and_then(|n| n.to_str()).unwrap_or("workspace")
    );
    spawn_install(&name, dir, pm.install_command())
      .with_context(|| format!("failed to start install in {}", dir.display()))?;
  }

  Ok(targets.len())
}
