// src/cli/handlers/config.rs

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;

use super::commons;
use crate::{cli::args::ConfigArgs, core::controller::Controller};

/// The main handler for the `config` command.
/// Prints the effective descriptor of one key, storing its default if unset.
pub fn handle(home: &Path, args: Vec<String>) -> Result<()> {
    let config_args = ConfigArgs::try_parse_from(&args)?;
    let mut controller = Controller::open(home)?;

    let resolved = controller
        .config_loader(&config_args.key)
        .with_context(|| format!(t!("config.error.resolve"), key = config_args.key))?;

    commons::print_descriptor(&resolved);
    Ok(())
}
