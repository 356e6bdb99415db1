// src/bin/datmo.rs

use anyhow::{Result, anyhow};
use clap::Parser;
use colored::*;
use datmo::cli::{Cli, handlers};
use datmo::t;
use std::env;
use std::path::Path;

// --- Command Definition and Registry ---

/// A CLI command, its aliases and its handler.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(&Path, Vec<String>) -> Result<()>,
}

/// Every command the binary understands. To add one, add an entry here.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "cleanup",
        aliases: &["clean"],
        handler: handlers::cleanup::handle,
    },
    CommandDefinition {
        name: "config",
        aliases: &[],
        handler: handlers::config::handle,
    },
    CommandDefinition {
        name: "init",
        aliases: &[],
        handler: handlers::init::handle,
    },
    CommandDefinition {
        name: "status",
        aliases: &["st"],
        handler: handlers::status::handle,
    },
    CommandDefinition {
        name: "version",
        aliases: &[],
        handler: handlers::version::handle,
    },
];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

fn main() {
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse()) {
        // Usage errors from a command's own parser print their own help.
        if let Some(clap_err) = e.downcast_ref::<clap::Error>() {
            clap_err.exit();
        }
        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let Some(command_name) = cli.command else {
        println!("{}", t!("cli.info.no_command"));
        return Ok(());
    };

    let command = find_command(&command_name)
        .ok_or_else(|| anyhow!(format!(t!("cli.error.unknown_command"), name = command_name)))?;

    let home = match cli.home {
        Some(home) => home,
        None => env::current_dir()?,
    };
    (command.handler)(&home, cli.args)
}
