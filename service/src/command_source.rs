use std::process::Command;
use tracing::{debug, error, info};
use wifi_parser::{ScanCommand, ScanError, ScanSource};

/// Runs scan commands as child processes and captures their stdout
pub struct CommandSource;

impl ScanSource for CommandSource {
    fn capture(&self, command: &ScanCommand) -> Result<String, ScanError> {
        info!("Running: {}", command);

        let unavailable = |reason: String| {
            error!("`{}` failed: {}", command, reason);
            ScanError::SourceUnavailable {
                command: command.to_string(),
                reason,
            }
        };

        let output = Command::new(&command.program)
            .args(&command.args)
            .output()
            .map_err(|e| unavailable(format!("failed to start: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(unavailable(format!(
                "exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        debug!("Captured {} bytes from {}", output.stdout.len(), command.program);
        String::from_utf8(output.stdout)
            .map_err(|e| unavailable(format!("output is not UTF-8: {}", e)))
    }
}
