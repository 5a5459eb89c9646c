//! Status command implementation.
//!
//! Displays the persisted baseline: which manifests are tracked, how many
//! fields and dependencies each snapshot carries, and how old it is.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use depwatch_lib::session::WatchSession;
use serde::Serialize;

use crate::output::{OutputFormat, print_info, print_json, print_stat, print_success, symbols};

pub fn cmd_status(session: &WatchSession, verbose: bool, output: OutputFormat) -> Result<()> {
  let baseline = session.baseline()?;

  if output.is_json() {
    #[derive(Serialize)]
    struct StatusEntry {
      path: String,
      fields: usize,
      dependencies: usize,
      taken_at: u64,
    }

    #[derive(Serialize)]
    struct StatusOutput {
      baseline_file: String,
      manifests: Vec<StatusEntry>,
    }

    let manifests: Vec<StatusEntry> = baseline
      .iter()
      .map(|(path, snapshot)| StatusEntry {
        path: path.display().to_string(),
        fields: snapshot.fields.len(),
        dependencies: snapshot.fields.values().map(|deps| deps.len()).sum(),
        taken_at: snapshot.taken_at,
      })
      .collect();

    print_json(&StatusOutput {
      baseline_file: session.baseline_path().display().to_string(),
      manifests,
    })?;
    return Ok(());
  }

  if baseline.is_empty() {
    print_info("No baseline captured yet. Run 'depwatch snapshot' first.");
    return Ok(());
  }

  print_success(&format!("{} manifest(s) tracked", baseline.len()));
  print_stat("Baseline", &session.baseline_path().display().to_string());
  println!();

  for (path, snapshot) in &baseline {
    let deps: usize = snapshot.fields.values().map(|deps| deps.len()).sum();
    println!(
      "  {} {} ({} field(s), {} dep(s), taken {})",
      symbols::INFO,
      path.display(),
      snapshot.fields.len(),
      deps,
      format_age(snapshot.taken_at)
    );

    if verbose {
      for (field, deps) in &snapshot.fields {
        println!("      {}: {} dep(s)", field, deps.len());
      }
    }
  }

  Ok(())
}

fn format_age(taken_at_millis: u64) -> String {
  let taken = UNIX_EPOCH + Duration::from_millis(taken_at_millis);
  if let Ok(elapsed) = SystemTime::now().duration_since(taken) {
    let secs = elapsed.as_secs();
    if secs < 60 {
      format!("{} seconds ago", secs)
    } else if secs < 3600 {
      format!("{} minutes ago", secs / 60)
    } else if secs < 86400 {
      format!("{} hours ago", secs / 3600)
    } else {
      format!("{} days ago", secs / 86400)
    }
  } else {
    format!("at {}", taken_at_millis)
  }
}
