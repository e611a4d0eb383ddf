use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "muster")]
#[command(about = "Manage tmux sessions with ease!")]
#[command(version)]
pub struct Cli {
    /// Override a project config key; VALUE is read as JSON when it parses.
    /// Repeatable, and given before the subcommand.
    #[arg(
        short = 'c',
        long = "config",
        num_args = 2,
        value_names = ["KEY", "VALUE"],
        action = ArgAction::Append
    )]
    pub overrides: Vec<String>,

    /// Directory holding project files (default: ~/.muster)
    #[arg(
        long = "config-dir",
        value_name = "DIR",
        env = "MUSTER_CONFIG_DIR",
        global = true
    )]
    pub config_dir: Option<PathBuf>,

    /// Stop building a session at the first tmux command that fails
    #[arg(long = "abort-on-failure", global = true)]
    pub abort_on_failure: bool,

    /// Log tmux commands to stderr (-vv for more)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// `-c KEY VALUE` occurrences as pairs
    pub fn override_pairs(&self) -> Vec<(String, String)> {
        self.overrides
            .chunks_exact(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect()
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a project's tmux session or switch to it if it already exists
    Start {
        project: String,
        /// Start a new grouped session
        #[arg(short = 'g', long = "group")]
        group: bool,
    },

    /// Print out the commands that will be run on 'start'
    Debug { project: String },

    /// Kill a running session
    Kill { project: String },

    /// Create a new project and open its config file for editing
    Create { project: String },

    /// Open an existing project's config file for editing
    Edit { project: String },

    /// Delete a project
    Delete {
        project: String,
        /// Skip the confirmation prompt
        #[arg(short = 'y', long = "yes")]
        yes: bool,
    },

    /// List all existing projects
    #[command(visible_alias = "ls")]
    List,

    /// Print a project's config to stdout
    Config { project: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_pair_up() {
        let cli = Cli::parse_from([
            "muster",
            "-c",
            "root",
            "/srv/app",
            "--config",
            "tmuxCmd",
            "tmux-next",
            "start",
            "app",
        ]);

        assert_eq!(
            cli.override_pairs(),
            vec![
                ("root".to_string(), "/srv/app".to_string()),
                ("tmuxCmd".to_string(), "tmux-next".to_string()),
            ]
        );
        assert!(matches!(
            cli.command,
            Commands::Start { ref project, group: false } if project == "app"
        ));
    }

    #[test]
    fn test_overrides_after_subcommand_are_rejected() {
        let parsed = Cli::try_parse_from([
            "muster", "-c", "root", "/srv/app", "start", "app", "-c", "tmuxCmd", "tmux-next",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_group_flag() {
        let cli = Cli::parse_from(["muster", "start", "-g", "app"]);
        assert!(matches!(cli.command, Commands::Start { group: true, .. }));
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
