// src/cli/handlers/status.rs

use anyhow::Result;
use clap::Parser;
use colored::*;
use std::path::Path;

use super::commons;
use crate::core::project::{ProjectController, ProjectStatus};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Shows the project's model, session, readiness and component configuration."
)]
struct StatusArgs {}

/// The main handler for the `status` command.
pub fn handle(home: &Path, args: Vec<String>) -> Result<()> {
    let _status_args = StatusArgs::try_parse_from(&args)?;
    let status = ProjectController::open(home)?.status()?;

    print_summary(&status);
    println!("\n{}", t!("status.label.config").yellow().bold());
    for resolved in &status.config {
        commons::print_descriptor(resolved);
    }
    Ok(())
}

fn print_summary(status: &ProjectStatus) {
    println!("\n--- {} ---", t!("status.header").yellow());
    println!(
        "  {:<15} {}",
        t!("status.label.home").blue(),
        status.home.display()
    );

    match &status.model {
        Some(model) => println!(
            "  {:<15} {} ({})",
            t!("status.label.model").blue(),
            model.name,
            model.id.dimmed()
        ),
        None => println!(
            "  {:<15} {}",
            t!("status.label.model").blue(),
            t!("status.value.none").dimmed()
        ),
    }

    if let Some(session) = &status.current_session {
        println!(
            "  {:<15} {} ({})",
            t!("status.label.session").blue(),
            session.name,
            session.id.dimmed()
        );
    }

    let readiness = if status.is_initialized {
        t!("status.value.initialized").green()
    } else {
        t!("status.value.not_initialized").red()
    };
    println!("  {:<15} {}", t!("status.label.initialized").blue(), readiness);
}
