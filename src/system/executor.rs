// src/system/executor.rs

use std::path::Path;
use std::process::{Command as StdCommand, Stdio};
use thiserror::Error;

/// Failures while running an external tool.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// The executable string could not be split into words.
    #[error("Executable could not be parsed: {0}")]
    CommandParse(String),
    /// The executable string was blank.
    #[error("No executable specified to run.")]
    EmptyCommand,
    /// The process could not be started.
    #[error("Command '{0}' could not be executed: {1}")]
    CommandFailed(String, std::io::Error),
    /// The process ran but reported failure.
    #[error("Command '{command}' exited with a non-zero status: {stderr}")]
    NonZeroExitStatus {
        /// The full command line.
        command: String,
        /// What the process wrote to stderr, trimmed.
        stderr: String,
    },
    /// The process wrote bytes that are not UTF-8 to stdout.
    #[error("Command '{command}' produced output that was not valid UTF-8")]
    InvalidUtf8Output {
        /// The full command line.
        command: String,
        /// The decoding error.
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// Runs a driver's external tool and captures its standard output.
///
/// `executable` comes from a driver's `execpath` option and may carry its own
/// arguments (e.g. `"git -c core.autocrlf=false"`); it is split with shell rules
/// and `args` are appended.
pub fn run_tool(executable: &str, args: &[&str], cwd: &Path) -> Result<String, ExecutionError> {
    let parts = shlex::split(executable.trim())
        .ok_or_else(|| ExecutionError::CommandParse(executable.to_string()))?;
    let Some((program, base_args)) = parts.split_first() else {
        return Err(ExecutionError::EmptyCommand);
    };

    let command_line = format!("{} {}", executable.trim(), args.join(" "));
    log::debug!("Running '{}' in '{}'", command_line, cwd.display());

    let output = StdCommand::new(program)
        .args(base_args)
        .args(args)
        .current_dir(dunce::simplified(cwd))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| ExecutionError::CommandFailed(command_line.clone(), e))?;

    if !output.status.success() {
        return Err(ExecutionError::NonZeroExitStatus {
            command: command_line,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    String::from_utf8(output.stdout).map_err(|source| ExecutionError::InvalidUtf8Output {
        command: command_line,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_executable_is_rejected() {
        let cwd = std::env::temp_dir();
        assert!(matches!(
            run_tool("   ", &["init"], &cwd),
            Err(ExecutionError::EmptyCommand)
        ));
    }

    #[test]
    fn test_unbalanced_quotes_are_rejected() {
        let cwd = std::env::temp_dir();
        assert!(matches!(
            run_tool("\"git", &["init"], &cwd),
            Err(ExecutionError::CommandParse(_))
        ));
    }

    #[test]
    fn test_missing_executable_reports_failure() {
        let cwd = std::env::temp_dir();
        assert!(matches!(
            run_tool("datmo-no-such-tool-xyz", &["--version"], &cwd),
            Err(ExecutionError::CommandFailed(_, _))
        ));
    }
}
