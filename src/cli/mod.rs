// src/cli/mod.rs

use clap::Parser;
use std::path::PathBuf;

/// Per-command argument parsers.
pub mod args;
/// One handler per CLI command.
pub mod handlers;

/// Builds the colour-aware help text from its tagged template.
fn build_help_string() -> &'static str {
    let use_colors = colored::control::SHOULD_COLORIZE.should_colorize();

    let template = t!("cli.help.template");

    let title = if use_colors { "\x1b[1;33m" } else { "" }; // Bold Yellow
    let cmd = if use_colors { "\x1b[36m" } else { "" }; // Cyan
    let group = if use_colors { "\x1b[1;32m" } else { "" }; // Bold Green
    let err = if use_colors { "\x1b[91m" } else { "" }; // Bright Red
    let dim = if use_colors { "\x1b[2m" } else { "" };
    let reset = if use_colors { "\x1b[0m" } else { "" };

    let formatted_string = template
        .replace("<title>", title)
        .replace("</title>", reset)
        .replace("<cmd>", cmd)
        .replace("</cmd>", reset)
        .replace("<group>", group)
        .replace("</group>", reset)
        .replace("<err>", err)
        .replace("</err>", reset)
        .replace("<dim>", dim)
        .replace("</dim>", reset);

    Box::leak(formatted_string.into_boxed_str())
}

/// datmo: lazily resolved code, file, environment and storage drivers for a project.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    help_template = { build_help_string() },
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// The project directory. Defaults to the current directory.
    #[arg(long, value_name = "PATH")]
    pub home: Option<PathBuf>,

    /// The command to run.
    #[arg()]
    pub command: Option<String>,

    /// Arguments for the command, parsed by its handler.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_arguments_are_passed_through() {
        let cli = Cli::try_parse_from([
            "datmo",
            "--home",
            "/srv/project",
            "init",
            "--name",
            "demo",
        ])
        .unwrap();
        assert_eq!(cli.home, Some(PathBuf::from("/srv/project")));
        assert_eq!(cli.command.as_deref(), Some("init"));
        assert_eq!(cli.args, vec!["--name", "demo"]);
    }

    #[test]
    fn test_no_command() {
        let cli = Cli::try_parse_from(["datmo"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.args.is_empty());
    }
}
