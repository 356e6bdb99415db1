// src/cli/handlers/init.rs

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use dialoguer::{Input, theme::ColorfulTheme};
use std::path::Path;

use super::commons;
use crate::{cli::args::InitArgs, core::project::ProjectController};

/// The main handler for the `init` command.
/// Sets up the project's drivers, model and default session.
pub fn handle(home: &Path, args: Vec<String>) -> Result<()> {
    let init_args = InitArgs::try_parse_from(&args)?;
    let is_interactive = !init_args.autosolve && commons::is_interactive();

    let mut project = ProjectController::open(home)?;
    println!(
        "{}",
        format!(t!("init.info.initializing"), path = project.controller().home().display())
    );

    let existing = project.controller().model()?.cloned();
    let default_name = existing
        .as_ref()
        .map(|m| m.name.clone())
        .unwrap_or_else(|| directory_name(project.controller().home()));
    let default_description = existing.map(|m| m.description).unwrap_or_default();

    let name = resolve_value(
        init_args.name,
        t!("init.prompt.name"),
        default_name,
        is_interactive,
    )?;
    let description = resolve_value(
        init_args.description,
        t!("init.prompt.description"),
        default_description,
        is_interactive,
    )?;

    let model = project
        .init(&name, &description)
        .with_context(|| t!("init.error.failed"))?;

    println!("\n{}", t!("common.success").green().bold());
    println!(
        "  {}",
        format!(t!("init.success.model"), name = model.name.yellow(), id = model.id)
    );

    if let Some(session) = project.controller().current_session()? {
        println!(
            "  {}",
            format!(t!("init.success.session"), name = session.name, id = session.id)
        );
    }
    Ok(())
}

/// Takes a value from its flag, a prompt, or the default.
fn resolve_value(
    flag: Option<String>,
    prompt: &str,
    default: String,
    is_interactive: bool,
) -> Result<String> {
    if let Some(value) = flag {
        return Ok(value);
    }
    if !is_interactive {
        return Ok(default);
    }
    let value = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(default)
        .allow_empty(true)
        .interact_text()?;
    Ok(value)
}

fn directory_name(home: &Path) -> String {
    home.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "project".to_string())
}
