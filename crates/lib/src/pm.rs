//! Package-manager detection and install command derivation.
//!
//! Detection is stateless: an explicit preference wins unconditionally,
//! otherwise lock files are probed in priority order and npm is the
//! fallback whether or not its own lock file is present.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

/// Supported install tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
  Npm,
  Pnpm,
  Yarn,
  Bun,
}

impl PackageManager {
  /// Get the tool name as a string.
  pub fn as_str(&self) -> &'static str {
    match self {
      PackageManager::Npm => "npm",
      PackageManager::Pnpm => "pnpm",
      PackageManager::Yarn => "yarn",
      PackageManager::Bun => "bun",
    }
  }

  /// The install command for this tool, by fixed lookup.
  pub fn install_command(&self) -> &'static str {
    match self {
      PackageManager::Pnpm => "pnpm install",
      PackageManager::Yarn => "yarn install",
      PackageManager::Bun => "bun install",
      PackageManager::Npm => "npm i",
    }
  }
}

impl fmt::Display for PackageManager {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Configured preference: an explicit tool, or lockfile-based detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PmPreference {
  #[default]
  Auto,
  Npm,
  Pnpm,
  Yarn,
  Bun,
}

impl FromStr for PmPreference {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "auto" => Ok(PmPreference::Auto),
      "npm" => Ok(PmPreference::Npm),
      "pnpm" => Ok(PmPreference::Pnpm),
      "yarn" => Ok(PmPreference::Yarn),
      "bun" => Ok(PmPreference::Bun),
      other => Err(format!(
        "unknown package manager '{other}', expected auto|npm|pnpm|yarn|bun"
      )),
    }
  }
}

/// Resolve the install tool for a package directory.
pub fn detect_package_manager(dir: &Path, preference: PmPreference) -> PackageManager {
  match preference {
    PmPreference::Npm => return PackageManager::Npm,
    PmPreference::Pnpm => return PackageManager::Pnpm,
    PmPreference::Yarn => return PackageManager::Yarn,
    PmPreference::Bun => return PackageManager::Bun,
    PmPreference::Auto => {}
  }

  let has = |file: &str| dir.join(file).exists();

  if has("pnpm-lock.yaml") {
    PackageManager::Pnpm
  } else if has("yarn.lock") {
    PackageManager::Yarn
  } else if has("bun.lockb") {
    PackageManager::Bun
  } else {
    PackageManager::Npm
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::TempDir;

  #[test]
  fn install_commands_are_fixed() {
    assert_eq!(PackageManager::Npm.install_command(), "npm i");
    assert_eq!(PackageManager::Pnpm.install_command(), "pnpm install");
    assert_eq!(PackageManager::Yarn.install_command(), "yarn install");
    assert_eq!(PackageManager::Bun.install_command(), "bun install");
  }

  #[test]
  fn yarn_lock_resolves_to_yarn() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("yarn.lock"), "").unwrap();

    let pm = detect_package_manager(temp.path(), PmPreference::Auto);

    assert_eq!(pm, PackageManager::Yarn);
    assert_eq!(pm.install_command(), "yarn install");
  }

  #[test]
  fn pnpm_lock_wins_over_yarn_lock() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("pnpm-lock.yaml"), "").unwrap();
    fs::write(temp.path().join("yarn.lock"), "").unwrap();

    assert_eq!(
      detect_package_manager(temp.path(), PmPreference::Auto),
      PackageManager::Pnpm
    );
  }

  #[test]
  fn bun_lock_resolves_to_bun() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("bun.lockb"), "").unwrap();

    assert_eq!(
      detect_package_manager(temp.path(), PmPreference::Auto),
      PackageManager::Bun
    );
  }

  #[test]
  fn npm_is_the_fallback_with_or_without_its_lock() {
    let bare = TempDir::new().unwrap();
    assert_eq!(
      detect_package_manager(bare.path(), PmPreference::Auto),
      PackageManager::Npm
    );

    let locked = TempDir::new().unwrap();
    fs::write(locked.path().join("package-lock.json"), "").unwrap();
    assert_eq!(
      detect_package_manager(locked.path(), PmPreference::Auto),
      PackageManager::Npm
    );
  }

  #[test]
  fn explicit_preference_wins_over_lock_files() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("pnpm-lock.yaml"), "").unwrap();

    assert_eq!(
      detect_package_manager(temp.path(), PmPreference::Yarn),
      PackageManager::Yarn
    );
  }

  #[test]
  fn preference_parses_from_str() {
    assert_eq!("auto".parse::<PmPreference>().unwrap(), PmPreference::Auto);
    assert_eq!("pnpm".parse::<PmPreference>().unwrap(), PmPreference::Pnpm);
    assert!("maven".parse::<PmPreference>().is_err());
  }
}
