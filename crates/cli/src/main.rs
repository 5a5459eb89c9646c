//! depwatch: dependency drift tracker for package.json workspaces.

mod cmd;
mod output;
mod prompts;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use depwatch_lib::config::{CONFIG_FILENAME, Config};
use depwatch_lib::pm::PmPreference;
use depwatch_lib::session::WatchSession;
use depwatch_lib::snapshot::BaselineStore;
use tracing_subscriber::EnvFilter;

use crate::cmd::UpdateChoice;
use crate::output::OutputFormat;

/// Track dependency version drift across workspace manifests
#[derive(Parser)]
#[command(name = "depwatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Workspace root (repeatable; defaults to the current directory)
  #[arg(short, long, global = true)]
  root: Vec<PathBuf>,

  /// Config file (default: depwatch.toml in the first root)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Baseline file (default: .depwatch/baseline.json in the first root)
  #[arg(long, global = true)]
  state: Option<PathBuf>,

  /// Debounce delay override (e.g. "250ms", "1s")
  #[arg(long, global = true, value_parser = humantime::parse_duration)]
  debounce: Option<Duration>,

  /// Package manager override
  #[arg(long, global = true)]
  pm: Option<PmPreference>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Watch the workspace and report dependency drift as it happens
  Watch,

  /// Take a full-workspace snapshot, replacing the baseline
  Snapshot,

  /// Clear the baseline, then retake a full snapshot
  Reset {
    /// Skip confirmation prompt
    #[arg(long)]
    force: bool,
  },

  /// Show changes for one manifest against its baseline entry
  Changes {
    /// Manifest to diff
    file: PathBuf,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Detect drift across the workspace and choose what to install
  Update {
    /// Answer the prompt non-interactively
    #[arg(long, value_enum)]
    choice: Option<UpdateChoice>,
  },

  /// Run installs across the workspace
  Install {
    /// Only manifests that drifted from the baseline
    #[arg(long)]
    changed: bool,
  },

  /// Show the persisted baseline
  Status {
    /// List per-field dependency counts
    #[arg(short, long)]
    verbose: bool,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .without_time()
    .init();

  let cli = Cli::parse();

  if let Err(e) = run(cli).await {
    output::print_error(&format!("{:#}", e));
    std::process::exit(1);
  }
}

async fn run(cli: Cli) -> Result<()> {
  let roots = if cli.root.is_empty() {
    vec![std::env::current_dir()?]
  } else {
    cli.root.clone()
  };

  let config = load_config(&cli, &roots)?;
  let store = BaselineStore::new(state_path(&cli, &roots));
  let session = WatchSession::new(config, roots, store);

  match cli.command {
    Commands::Watch => cmd::cmd_watch(session).await,
    Commands::Snapshot => cmd::cmd_snapshot(session).await,
    Commands::Reset { force } => cmd::cmd_reset(session, force).await,
    Commands::Changes { file, output } => cmd::cmd_changes(session, &file, output).await,
    Commands::Update { choice } => cmd::cmd_update(session, choice).await,
    Commands::Install { changed } => cmd::cmd_install(session, changed).await,
    Commands::Status { verbose, output } => cmd::cmd_status(&session, verbose, output),
  }
}

fn load_config(cli: &Cli, roots: &[PathBuf]) -> Result<Config> {
  let path = cli
    .config
    .clone()
    .unwrap_or_else(|| roots[0].join(CONFIG_FILENAME));

  let mut config = Config::load(&path)
    .with_context(|| format!("failed to load config from {}", path.display()))?
    .unwrap_or_default();

  if let Some(debounce) = cli.debounce {
    config.debounce_ms = debounce.as_millis() as u64;
  }
  if let Some(pm) = cli.pm {
    config.package_manager = pm;
  }

  Ok(config)
}

fn state_path(cli: &Cli, roots: &[PathBuf]) -> PathBuf {
  cli
    .state
    .clone()
    .unwrap_or_else(|| roots[0].join(".depwatch").join("baseline.json"))
}
