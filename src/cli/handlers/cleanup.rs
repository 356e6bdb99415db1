// src/cli/handlers/cleanup.rs

use anyhow::{Result, anyhow};
use clap::Parser;
use colored::*;
use dialoguer::{Confirm, theme::ColorfulTheme};
use std::path::Path;

use super::commons;
use crate::{cli::args::CleanupArgs, constants::DATMO_DIR, core::project::ProjectController};

/// The main handler for the `cleanup` command.
/// Removes the project's `.datmo` directory after confirmation.
pub fn handle(home: &Path, args: Vec<String>) -> Result<()> {
    let cleanup_args = CleanupArgs::try_parse_from(&args)?;
    let mut project = ProjectController::open(home)?;
    let target = project.controller().home().join(DATMO_DIR);

    println!(
        "\n{}",
        format!(t!("cleanup.warning.destructive"), path = target.display())
            .red()
            .bold()
    );

    if !cleanup_args.yes {
        if !commons::is_interactive() {
            return Err(anyhow!(t!("cleanup.error.confirmation_required")));
        }
        if !Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("cleanup.prompt.are_you_sure"))
            .default(false)
            .interact()?
        {
            println!("\n{}", t!("common.info.operation_cancelled"));
            return Ok(());
        }
    }

    log::info!("Cleaning up project at '{}'", home.display());
    if project.cleanup()? {
        println!("\n{} {}", t!("common.success").green().bold(), t!("cleanup.success.removed"));
    } else {
        println!("\n{}", t!("cleanup.info.nothing_to_remove"));
    }
    Ok(())
}
