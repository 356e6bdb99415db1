// src/cli/handlers/version.rs

use anyhow::Result;
use colored::*;
use std::path::Path;

/// Prints the version of the tool.
pub fn handle(_home: &Path, _args: Vec<String>) -> Result<()> {
    println!(
        "{} {}",
        env!("CARGO_PKG_NAME").bold(),
        format!(t!("version.info"), version = env!("CARGO_PKG_VERSION"))
    );
    Ok(())
}
