//! Tmux session construction.
//!
//! [`SessionBuilder`] turns a [`ProjectDescription`] into the ordered tmux
//! commands that reproduce its windows and panes.
//!
//! # Build Order
//!
//! 1. `new-session -d` creates the session and, with it, window 1
//! 2. Window 1 is renamed and populated in place; issuing `new-window` for
//!    it would leave an extra empty window behind
//! 3. Windows 2..N are created with `new-window`, split, laid out, and
//!    given their pane commands
//! 4. Window 1 is selected so the session opens on it
//!
//! Every command goes through the injected [`Executor`], so the same build
//! either runs tmux or prints the script, and nothing here knows which.

use super::{
    commands::{self, FIRST_WINDOW, NewSession, TMUX_ENV, WindowTarget},
    executor::{CommandOutput, Environment, Executor},
    report::{BuildReport, FailurePolicy, Issuer},
    window::WindowBuilder,
};
use crate::{
    config::{ProjectDescription, WindowDescription, validate_session_name},
    error::{Error, Result},
};

/// Values a build needs from the caller's surroundings
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Environment for child processes
    pub env: Environment,
    /// Whether the caller is already a tmux client
    pub inside_tmux: bool,
    pub policy: FailurePolicy,
}

impl SessionOptions {
    /// Options for the given environment, detecting an enclosing client
    /// from it.
    pub fn from_env(env: Environment) -> Self {
        Self {
            inside_tmux: env.inside_tmux(),
            env,
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Builds, enters, and tears down one tmux session
pub struct SessionBuilder<'a> {
    name: String,
    root: String,
    windows: &'a [WindowDescription],
    executor: &'a dyn Executor,
    options: SessionOptions,
}

impl<'a> SessionBuilder<'a> {
    /// Session `name` laid out from `project`. The name differs from the
    /// project's own when a grouped session is started alongside it.
    pub fn new(
        name: impl Into<String>,
        project: &'a ProjectDescription,
        executor: &'a dyn Executor,
        options: SessionOptions,
    ) -> Self {
        Self {
            name: name.into(),
            root: project.expanded_root(),
            windows: &project.windows,
            executor,
            options,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ask tmux whether the session exists. Never cached.
    pub fn exists(&self) -> Result<bool> {
        let output = self
            .executor
            .execute(&commands::has_session(&self.name), &self.options.env)?;
        tracing::debug!(session = %self.name, status = output.status, "has-session");
        Ok(output.success())
    }

    /// Build the session and all its windows. The session must not exist.
    pub fn create(&self) -> Result<BuildReport> {
        validate_session_name(&self.name)?;
        let Some((first, rest)) = self.windows.split_first() else {
            return Err(Error::MalformedDescription(format!(
                "session '{}' has no windows to build",
                self.name
            )));
        };

        tracing::info!(session = %self.name, windows = self.windows.len(), "creating session");
        let mut issuer = Issuer::new(self.executor, &self.options.env, self.options.policy);

        let detached_env = self.options.env.without(TMUX_ENV);
        issuer.issue_with_env(
            NewSession::new()
                .name(&self.name)
                .detached()
                .start_directory(&self.root)
                .build(),
            &detached_env,
        )?;

        // tmux already made window 1 along with the session
        let window = WindowBuilder::new(&self.name, &self.root, FIRST_WINDOW, first);
        window.rename(&mut issuer)?;
        window.create_panes(&mut issuer)?;
        window.run_commands(&mut issuer)?;

        for (offset, description) in rest.iter().enumerate() {
            WindowBuilder::new(&self.name, &self.root, FIRST_WINDOW + 1 + offset, description)
                .create(&mut issuer)?;
        }

        issuer.issue(commands::select_window(WindowTarget::new(
            &self.name,
            FIRST_WINDOW,
        )))?;

        Ok(issuer.into_report())
    }

    /// Create this session as a member of `target`'s session group. The
    /// group already shares the target's windows, so none are built.
    pub fn create_grouped(&self, target: &str) -> Result<BuildReport> {
        validate_session_name(&self.name)?;
        validate_session_name(target)?;

        tracing::info!(session = %self.name, %target, "creating grouped session");
        let mut issuer = Issuer::new(self.executor, &self.options.env, self.options.policy);

        let detached_env = self.options.env.without(TMUX_ENV);
        issuer.issue_with_env(
            NewSession::new()
                .name(&self.name)
                .detached()
                .group_with(target)
                .build(),
            &detached_env,
        )?;

        Ok(issuer.into_report())
    }

    /// Attach the terminal to the session.
    pub fn attach(&self) -> Result<CommandOutput> {
        self.executor
            .execute_interactive(&commands::attach_session(&self.name), &self.options.env)
    }

    /// Move the current tmux client to the session.
    pub fn switch(&self) -> Result<CommandOutput> {
        self.executor
            .execute_interactive(&commands::switch_client(&self.name), &self.options.env)
    }

    /// Switch when already inside a client, attach otherwise.
    pub fn enter(&self) -> Result<CommandOutput> {
        if self.options.inside_tmux {
            self.switch()
        } else {
            self.attach()
        }
    }

    /// Kill the session, whether or not it exists.
    pub fn kill(&self) -> Result<CommandOutput> {
        tracing::info!(session = %self.name, "killing session");
        self.executor
            .execute(&commands::kill_session(&self.name), &self.options.env)
    }
}
