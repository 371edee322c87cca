//! Exports values to later Bitrise steps through `envman`.

use tracing::debug;

use crate::application::backup::{EnvExporter, ExportError};
use crate::infrastructure::process::{format_command, CommandRunner};

/// [`EnvExporter`] that runs `envman add --key <key> --value <value>`.
#[derive(Debug, Default, Clone)]
pub struct EnvmanExporter<R> {
    runner: R,
}

impl<R: CommandRunner> EnvmanExporter<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> EnvExporter for EnvmanExporter<R> {
    fn export(&self, key: &str, value: &str) -> Result<(), ExportError> {
        let args = vec![
            "add".to_string(),
            "--key".to_string(),
            key.to_string(),
            "--value".to_string(),
            value.to_string(),
        ];

        let output = self
            .runner
            .run("envman", &args)
            .map_err(|e| ExportError::Unavailable {
                command: format_command("envman", &args),
                reason: e.to_string(),
            })?;

        if !output.success {
            return Err(ExportError::Failed {
                key: key.to_string(),
                output: output.combined_output,
            });
        }

        debug!("Exported {key}={value}");
        Ok(())
    }
}
