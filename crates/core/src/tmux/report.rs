//! Per-command results of a session build

use super::executor::{CommandOutput, Environment, Executor};
use crate::error::{Error, Result};

/// What to do when a tmux command exits non-zero during a build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Record the failure and keep building
    #[default]
    Continue,
    /// Stop at the first failure
    Abort,
}

/// One command issued during a build, with what it returned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCommand {
    pub command: String,
    pub output: CommandOutput,
}

/// Ordered record of every command a build issued
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    commands: Vec<IssuedCommand>,
}

impl BuildReport {
    pub fn commands(&self) -> &[IssuedCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Commands that exited non-zero
    pub fn failures(&self) -> impl Iterator<Item = &IssuedCommand> {
        self.commands.iter().filter(|c| !c.output.success())
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Sends build commands to an executor and collects the report.
pub struct Issuer<'a> {
    executor: &'a dyn Executor,
    env: &'a Environment,
    policy: FailurePolicy,
    report: BuildReport,
}

impl<'a> Issuer<'a> {
    pub fn new(executor: &'a dyn Executor, env: &'a Environment, policy: FailurePolicy) -> Self {
        Self {
            executor,
            env,
            policy,
            report: BuildReport::default(),
        }
    }

    /// Issue a command with the build's environment.
    pub fn issue(&mut self, command: String) -> Result<()> {
        let env = self.env;
        self.issue_with_env(command, env)
    }

    /// Issue a command with an explicit child environment.
    pub fn issue_with_env(&mut self, command: String, env: &Environment) -> Result<()> {
        let output = self.executor.execute(&command, env)?;

        if output.success() {
            tracing::debug!(%command, "tmux");
        } else {
            let stderr = output.stderr_lossy();
            tracing::warn!(%command, status = output.status, %stderr, "tmux command failed");

            if self.policy == FailurePolicy::Abort {
                return Err(Error::NonZeroExit {
                    command,
                    status: output.status,
                    stderr,
                });
            }
        }

        self.report.commands.push(IssuedCommand { command, output });
        Ok(())
    }

    pub fn into_report(self) -> BuildReport {
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorKind, tmux::executor::testing::ScriptedExecutor};

    #[test]
    fn test_continue_records_failures() {
        let executor = ScriptedExecutor::default().with_status("split-window", 1);
        let env = Environment::default();
        let mut issuer = Issuer::new(&executor, &env, FailurePolicy::Continue);

        issuer.issue("split-window -t demo:1".to_string()).unwrap();
        issuer
            .issue("select-layout -t demo:1 tiled".to_string())
            .unwrap();
        let report = issuer.into_report();

        assert_eq!(report.len(), 2);
        assert!(!report.is_success());
        let failed: Vec<&str> = report.failures().map(|c| c.command.as_str()).collect();
        assert_eq!(failed, vec!["split-window -t demo:1"]);
    }

    #[test]
    fn test_abort_stops_at_first_failure() {
        let executor = ScriptedExecutor::default().with_status("split-window", 1);
        let env = Environment::default();
        let mut issuer = Issuer::new(&executor, &env, FailurePolicy::Abort);

        let err = issuer
            .issue("split-window -t demo:1".to_string())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NonZeroExit);
        assert!(err.to_string().contains("scripted failure"));
    }
}
