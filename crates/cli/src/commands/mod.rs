//! Subcommand handlers.

pub mod project;
pub mod session;

use anyhow::{Result, bail};
use colored::Colorize;
use muster_core::{
    Error, ProjectDescription, ProjectStore,
    tmux::{Environment, FailurePolicy, SessionOptions},
};

/// Everything a handler needs, resolved once in `main`
pub struct Context {
    pub store: ProjectStore,
    pub overrides: Vec<(String, String)>,
    pub env: Environment,
    pub policy: FailurePolicy,
}

impl Context {
    /// Load a project with the command-line overrides applied.
    pub fn load(&self, name: &str) -> Result<ProjectDescription> {
        match self.store.load(name, &self.overrides) {
            Ok(project) => Ok(project),
            Err(Error::ProjectNotFound(_)) => {
                bail!(
                    "{} does not exist. Create it with '{}'",
                    name,
                    format!("muster create {}", name).blue()
                )
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions::from_env(self.env.clone()).with_policy(self.policy)
    }
}
