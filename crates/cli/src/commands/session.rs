//! Session commands for muster.
//!
//! This module handles the tmux session lifecycle of a project:
//! - Starting (building if needed, then attaching or switching)
//! - Printing the start sequence as a shell script
//! - Killing a running session

use anyhow::{Result, bail};
use colored::Colorize;
use muster_core::{
    ProjectDescription,
    tmux::{BuildReport, RecordingExecutor, SessionBuilder, SessionOptions, SystemExecutor},
};

use super::Context;

/// Suffix appended to a project name for its grouped session
const GROUP_SUFFIX: &str = "1";

// =============================================================================
// Session Launching
// =============================================================================

/// Start a project's session.
///
/// With `group`, a second session `<project>1` joins the project session's
/// group instead, so two clients can look at different windows of the same
/// session.
pub fn start(ctx: &Context, name: &str, group: bool) -> Result<()> {
    let project = ctx.load(name)?;
    project.validate()?;

    let executor = SystemExecutor::from_command_line(&project.tmux_cmd)?;
    let options = ctx.session_options();

    let session_name = if group {
        format!("{}{}", project.name, GROUP_SUFFIX)
    } else {
        project.name.clone()
    };
    let session = SessionBuilder::new(&session_name, &project, &executor, options.clone());

    if !session.exists()? {
        let report = if group {
            let target = SessionBuilder::new(&project.name, &project, &executor, options);
            if !target.exists()? {
                bail!(
                    "Session '{}' is not running. Start it with '{}' first",
                    project.name,
                    format!("muster start {}", project.name).blue()
                );
            }
            session.create_grouped(&project.name)?
        } else {
            session.create()?
        };

        print_failures(&report);
        eprintln!(
            "{} {} {}",
            "✔".green(),
            "Created session".dimmed(),
            session.name()
        );
    }

    let output = session.enter()?;
    if !output.success() {
        bail!(
            "tmux could not open session '{}' (exit status {})",
            session.name(),
            output.status
        );
    }

    Ok(())
}

/// Print the commands `start` would run as a shell script.
pub fn debug(ctx: &Context, name: &str) -> Result<()> {
    let project = ctx.load(name)?;
    project.validate()?;

    let recorder = RecordingExecutor::stdout(&project.tmux_cmd);
    write_script(&project, ctx.session_options(), &recorder)
}

/// Record the probe, the guarded build, and the attach-or-switch block.
fn write_script(
    project: &ProjectDescription,
    options: SessionOptions,
    recorder: &RecordingExecutor,
) -> Result<()> {
    let options = SessionOptions {
        inside_tmux: false,
        ..options
    };
    let session = SessionBuilder::new(&project.name, project, recorder, options);

    session.exists()?;

    recorder.comment("\n# Create session if it doesn't exist.\nif [[ $? -ne 0 ]]; then")?;
    session.create()?;
    recorder.comment("fi")?;

    recorder.comment("\nif [[ -z $TMUX ]]; then\n\t# Attach to the session.")?;
    session.attach()?;
    recorder.comment("else\n\t# If already inside a tmux session, switch to it instead.")?;
    session.switch()?;
    recorder.comment("fi")?;

    Ok(())
}

// =============================================================================
// Session Killing
// =============================================================================

/// Kill a project's session if it is running.
pub fn kill(ctx: &Context, name: &str) -> Result<()> {
    let project = ctx.load(name)?;

    let executor = SystemExecutor::from_command_line(&project.tmux_cmd)?;
    let session = SessionBuilder::new(&project.name, &project, &executor, ctx.session_options());

    if !session.exists()? {
        eprintln!("{} Session '{}' is not running", "✘".red(), project.name);
        return Ok(());
    }

    let output = session.kill()?;
    if output.success() {
        println!("{} {} {}", "✔".green(), "Killed session".dimmed(), project.name);
    } else {
        eprintln!(
            "{} Failed to kill {}: {}",
            "✘".red(),
            project.name,
            output.stderr_lossy()
        );
    }

    Ok(())
}

/// Warn about each tmux command of a build that failed.
fn print_failures(report: &BuildReport) {
    for failed in report.failures() {
        let stderr = failed.output.stderr_lossy();
        eprintln!(
            "{} tmux {} {}",
            "!".yellow(),
            failed.command,
            if stderr.is_empty() {
                format!("(exit status {})", failed.output.status)
            } else {
                format!("({})", stderr)
            }
            .dimmed()
        );
    }
}
