use std::io::{self, IsTerminal, Write};

use anyhow::{Result, bail};

use crate::cmd::UpdateChoice;

pub fn confirm(message: &str, force: bool) -> Result<bool> {
  if force {
    return Ok(true);
  }

  if !io::stdin().is_terminal() || !io::stderr().is_terminal() {
    bail!("Cannot prompt for confirmation in non-interactive mode. Use --force to proceed.");
  }

  write!(io::stderr(), "{} [y/N] ", message)?;
  io::stderr().flush()?;

  let mut input = String::new();
  io::stdin().read_line(&mut input)?;

  Ok(matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// The aggregated update prompt: install everything, install only drifted
/// manifests, show the pending changes, or dismiss them.
pub fn update_choice() -> Result<UpdateChoice> {
  if !io::stdin().is_terminal() || !io::stderr().is_terminal() {
    bail!("Cannot prompt in non-interactive mode. Pass --choice to select an action.");
  }

  write!(io::stderr(), "Update packages? [a]ll / [c]hanged / [s]how / [d]ismiss: ")?;
  io::stderr().flush()?;

  let mut input = String::new();
  io::stdin().read_line(&mut input)?;

  Ok(match input.trim().to_ascii_lowercase().as_str() {
    "a" | "all" => UpdateChoice::All,
    "c" | "changed" => UpdateChoice::Changed,
    "s" | "show" => UpdateChoice::Show,
    _ => UpdateChoice::Dismiss,
  })
}
