//! Fire-and-forget install execution.
//!
//! The core never awaits or inspects an install's result; it only hands a
//! command string and working directory to the platform shell.

use std::io;
use std::path::Path;

use tokio::process::Command;
use tracing::info;

/// Spawn `command` through the platform shell in `cwd`.
///
/// The child is detached and left running; success or failure of the
/// install itself is not observed.
pub fn spawn_install(name: &str, cwd: &Path, command: &str) -> io::Result<()> {
  info!(session = %name, cwd = %cwd.display(), command = %command, "spawning install");

  let (shell, arg) = shell_command();
  Command::new(shell)
    .arg(arg)
    .arg(command)
    .current_dir(cwd)
    .spawn()?;

  Ok(())
}

/// The default system shell and its command flag.
#[cfg(unix)]
fn shell_command() -> (&'static str, &'static str) {
  ("/bin/sh", "-c")
}

#[cfg(windows)]
fn shell_command() -> (&'static str, &'static str) {
  ("powershell.exe", "-Command")
}
