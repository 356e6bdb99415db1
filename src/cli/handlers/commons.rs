// src/cli/handlers/commons.rs

use crate::core::controller::ResolvedDescriptor;
use colored::*;
use std::io::IsTerminal;

/// Whether prompts can be shown to the user.
pub fn is_interactive() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

/// Prints a resolved descriptor as an indented block.
pub fn print_descriptor(resolved: &ResolvedDescriptor) {
    println!(
        "  {} {} ({})",
        resolved.key.cyan(),
        resolved.descriptor.identifier.bold(),
        resolved.kind.role().to_string().dimmed()
    );
    for (name, value) in &resolved.descriptor.options {
        println!("      {:<18} {}", name.blue(), value);
    }
}
