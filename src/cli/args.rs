// src/cli/args.rs
use clap::Parser;

/// Options of `datmo init`.
#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)] // The command name is consumed by the dispatcher.
pub struct InitArgs {
    /// The name of the project's model. Asked interactively when omitted.
    #[arg(long)]
    pub name: Option<String>,

    /// A short description of the project.
    #[arg(long)]
    pub description: Option<String>,

    /// Do not ask for user input, use defaults for unspecified values.
    #[arg(long)]
    pub autosolve: bool,
}

/// Options of `datmo cleanup`.
#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct CleanupArgs {
    /// Skip the confirmation prompt.
    #[arg(long, short)]
    pub yes: bool,
}

/// Options of `datmo config`.
#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct ConfigArgs {
    /// The configuration key to resolve (e.g. `controller.code.driver`).
    pub key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_args_parse_flags() {
        let args = InitArgs::try_parse_from(["--name", "demo", "--autosolve"]).unwrap();
        assert_eq!(args.name.as_deref(), Some("demo"));
        assert_eq!(args.description, None);
        assert!(args.autosolve);
    }

    #[test]
    fn test_config_args_require_key() {
        assert!(ConfigArgs::try_parse_from(Vec::<String>::new()).is_err());
        let args = ConfigArgs::try_parse_from(["storage.local"]).unwrap();
        assert_eq!(args.key, "storage.local");
    }
}
