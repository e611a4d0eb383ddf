//! Project file management: create, edit, delete, list, print.

use std::{path::Path, process::Command};

use anyhow::{Context as _, Result, bail};
use colored::Colorize;

use super::Context;
use crate::display_path;

const EDITOR_ENV: &str = "EDITOR";

/// Write a new project from the template and open it in `$EDITOR`.
pub fn create(ctx: &Context, name: &str) -> Result<()> {
    muster_core::config::validate_project_name(name)?;

    if ctx.store.exists(name) {
        bail!(
            "{} already exists. Edit it with '{}'",
            name,
            format!("muster edit {}", name).blue()
        );
    }

    let path = ctx.store.create(name, &ctx.overrides)?;
    println!("{} {} {}", "✔".green(), "Created".dimmed(), display_path(&path));

    open_editor(ctx, &path)
}

/// Rewrite a project's file in canonical form and open it in `$EDITOR`.
pub fn edit(ctx: &Context, name: &str) -> Result<()> {
    let project = ctx.load(name)?;
    ctx.store.save(&project)?;

    open_editor(ctx, &ctx.store.path(name)?)
}

/// Delete a project's file after confirmation.
pub fn delete(ctx: &Context, name: &str, skip_confirm: bool) -> Result<()> {
    if !ctx.store.exists(name) {
        bail!("{} does not exist", name);
    }

    if !skip_confirm {
        use dialoguer::{Confirm, theme::ColorfulTheme};
        let theme = ColorfulTheme::default();
        let confirmed = Confirm::with_theme(&theme)
            .with_prompt(format!("Are you sure you want to delete '{}'?", name))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".dimmed());
            return Ok(());
        }
    }

    ctx.store.delete(name)?;
    println!("{} {} {}", "✔".green(), "Deleted".dimmed(), name);

    Ok(())
}

/// List stored projects with their roots and window counts.
pub fn list(ctx: &Context) -> Result<()> {
    let names = ctx.store.list()?;

    if names.is_empty() {
        println!(
            "{} Create one with '{}'",
            "No projects yet.".dimmed(),
            "muster create <project>".blue()
        );
        return Ok(());
    }

    use comfy_table::{Table, presets::NOTHING};

    let mut table = Table::new();
    table.load_preset(NOTHING);

    for name in &names {
        let (root, windows) = match ctx.store.load(name, &[]) {
            Ok(project) => {
                let label = if project.windows.len() == 1 {
                    "window"
                } else {
                    "windows"
                };
                (
                    project.root.dimmed().to_string(),
                    format!("{} {}", project.windows.len(), label)
                        .dimmed()
                        .to_string(),
                )
            }
            Err(e) => ("-".dimmed().to_string(), format!("{}", e).red().to_string()),
        };

        table.add_row(vec![name.blue().to_string(), root, windows]);
    }

    println!("{}", "Available Projects:".bold());
    println!("{table}");

    Ok(())
}

/// Print a project's resolved config as JSON.
pub fn print_config(ctx: &Context, name: &str) -> Result<()> {
    let project = ctx.load(name)?;
    println!("{}", serde_json::to_string_pretty(&project)?);
    Ok(())
}

/// Open `path` in the user's editor and wait for it to exit.
fn open_editor(ctx: &Context, path: &Path) -> Result<()> {
    let Some(editor) = ctx.env.get(EDITOR_ENV).and_then(|e| e.to_str()) else {
        eprintln!(
            "{} ${} is not set; edit {} by hand",
            "!".yellow(),
            EDITOR_ENV,
            display_path(path)
        );
        return Ok(());
    };

    let mut words = shell_words::split(editor)
        .with_context(|| format!("Cannot parse ${}: {}", EDITOR_ENV, editor))?;
    if words.is_empty() {
        bail!("${} is empty", EDITOR_ENV);
    }
    let program = words.remove(0);

    tracing::debug!(%program, path = %path.display(), "opening editor");
    let status = Command::new(&program)
        .args(words)
        .arg(path)
        .env_clear()
        .envs(ctx.env.iter())
        .status()
        .with_context(|| format!("Failed to launch editor '{}'", program))?;

    if !status.success() {
        eprintln!("{} Editor exited with {}", "!".yellow(), status);
    }

    Ok(())
}
