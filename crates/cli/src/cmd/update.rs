//! Update command implementation.
//!
//! Runs the detection cycle over the workspace, then offers the aggregated
//! prompt: install everything, install only drifted manifests, show the
//! pending changes, or dismiss them.

use anyhow::Result;
use clap::ValueEnum;
use depwatch_lib::session::{InstallScope, WatchSession};

use crate::cmd::install::run_installs;
use crate::output::{print_change, print_info, print_success, print_warning};
use crate::prompts;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UpdateChoice {
  /// Install for all discovered manifests
  All,
  /// Install only for manifests with pending changes
  Changed,
  /// Show all pending changes
  Show,
  /// Clear the pending set without installing
  Dismiss,
}

pub async fn cmd_update(mut session: WatchSession, choice: Option<UpdateChoice>) -> Result<()> {
  session.ensure_baseline().await?;
  let detections = session.detect_all().await?;

  if detections.is_empty() {
    print_info("No version changes since baseline");
    return Ok(());
  }

  print_warning(&format!(
    "{} manifest(s) changed since baseline",
    detections.len()
  ));

  let choice = match choice {
    Some(choice) => choice,
    None => prompts::update_choice()?,
  };

  match choice {
    UpdateChoice::All => {
      let count = run_installs(&mut session, InstallScope::All).await?;
      print_success(&format!("Started install in {} package director{}", count, plural_y(count)));
    }
    UpdateChoice::Changed => {
      let count = run_installs(&mut session, InstallScope::Changed).await?;
      print_success(&format!(
        "Started install in {} changed package director{}",
        count,
        plural_y(count)
      ));
    }
    UpdateChoice::Show => {
      for detection in &detections {
        println!("{}", detection.path.display());
        for change in &detection.changes {
          print_change(change);
        }
      }
    }
    UpdateChoice::Dismiss => {
      session.dismiss();
      print_info("Dismissed pending changes");
    }
  }

  Ok(())
}

fn plural_y(count: usize) -> &'static str {
  if count == 1 { "y" } else { "ies" }
}
