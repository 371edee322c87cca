//! External command execution.

use std::process::Command;

use thiserror::Error;
use tracing::debug;

/// Error type for running external commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The process could not be started at all (missing binary, permissions).
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    /// `None` when the process was terminated by a signal.
    pub status_code: Option<i32>,
    /// Trimmed stdout alone, for commands whose output is parsed.
    pub stdout: String,
    /// Trimmed stdout followed by trimmed stderr.
    pub combined_output: String,
}

impl CommandOutput {
    /// Convenience constructor for a successful run.
    pub fn ok(output: impl Into<String>) -> Self {
        let output = output.into();
        Self {
            success: true,
            status_code: Some(0),
            stdout: output.clone(),
            combined_output: output,
        }
    }

    /// Convenience constructor for a failed run.
    pub fn failed(code: i32, output: impl Into<String>) -> Self {
        Self {
            success: false,
            status_code: Some(code),
            stdout: String::new(),
            combined_output: output.into(),
        }
    }
}

/// Runs external programs.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    /// Runs `program` with `args` to completion.
    ///
    /// A non-zero exit status is reported through [`CommandOutput::success`],
    /// not as an error.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Spawn`] if the process cannot be started.
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, CommandError>;
}

/// Renders a command line for logs and error messages.
pub fn format_command(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

/// [`CommandRunner`] backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, CommandError> {
        let command = format_command(program, args);
        debug!("$ {command}");

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| CommandError::Spawn { command, source })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let combined_output = [stdout.trim(), stderr.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        Ok(CommandOutput {
            success: output.status.success(),
            status_code: output.status.code(),
            stdout: stdout.trim().to_string(),
            combined_output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_command_joins_program_and_args() {
        let args = vec!["simctl".to_string(), "shutdown".to_string(), "ABC".to_string()];
        assert_eq!(format_command("xcrun", &args), "xcrun simctl shutdown ABC");
        assert_eq!(format_command("true", &[]), "true");
    }

    #[test]
    fn test_system_runner_reports_spawn_failure() {
        let err = SystemCommandRunner
            .run("/nonexistent/definitely-not-a-binary", &[])
            .unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
        assert!(err.to_string().contains("definitely-not-a-binary"));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_captures_combined_output_and_status() {
        let args = vec!["-c".to_string(), "echo out; echo err >&2; exit 3".to_string()];
        let output = SystemCommandRunner.run("sh", &args).expect("sh must spawn");

        assert!(!output.success);
        assert_eq!(output.status_code, Some(3));
        assert_eq!(output.stdout, "out");
        assert_eq!(output.combined_output, "out\nerr");
    }
}
