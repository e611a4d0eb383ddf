//! Muster CLI - project-based tmux session launcher.
//!
//! A project is a JSON file naming a root directory and the windows to
//! open, each with its panes and the commands typed into them. `muster
//! start <project>` rebuilds that layout in a tmux session, or switches to
//! the session if it is already running.
//!
//! # Architecture
//!
//! The CLI handles:
//! - **Project files**: create, edit, delete, list, print
//! - **Session commands**: start, debug (dry run), kill
//! - **Ambient state**: config directory, environment, and failure policy
//!   are resolved here once and passed down
//!
//! Project parsing and session construction live in `muster-core`.

mod cli;
mod commands;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use commands::Context;
use muster_core::{
    ProjectStore,
    tmux::{Environment, FailurePolicy},
};
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter
const LOG_ENV: &str = "MUSTER_LOG";

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "✘".red(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = Context {
        store: ProjectStore::new(resolve_config_dir(cli.config_dir.as_deref())?),
        overrides: cli.override_pairs(),
        env: Environment::from_process(),
        policy: if cli.abort_on_failure {
            FailurePolicy::Abort
        } else {
            FailurePolicy::Continue
        },
    };
    tracing::debug!(dir = %ctx.store.dir().display(), "project store");

    match cli.command {
        Commands::Start { project, group } => commands::session::start(&ctx, &project, group),
        Commands::Debug { project } => commands::session::debug(&ctx, &project),
        Commands::Kill { project } => commands::session::kill(&ctx, &project),
        Commands::Create { project } => commands::project::create(&ctx, &project),
        Commands::Edit { project } => commands::project::edit(&ctx, &project),
        Commands::Delete { project, yes } => commands::project::delete(&ctx, &project, yes),
        Commands::List => commands::project::list(&ctx),
        Commands::Config { project } => commands::project::print_config(&ctx, &project),
    }
}

/// Log to stderr so dry-run scripts on stdout stay clean.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

// =============================================================================
// Path Resolution
// =============================================================================

fn resolve_config_dir(cli_dir: Option<&Path>) -> Result<PathBuf> {
    match cli_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => ProjectStore::default_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find home directory; pass --config-dir")),
    }
}

/// Convert absolute path to display path (replace home with ~)
fn display_path(path: &Path) -> String {
    dirs::home_dir()
        .and_then(|home| {
            path.strip_prefix(&home)
                .ok()
                .map(|rel| Path::new("~").join(rel).display().to_string())
        })
        .unwrap_or_else(|| path.display().to_string())
}
