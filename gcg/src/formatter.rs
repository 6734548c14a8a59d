//! Post-processing of generated files by an external tool.

use log::debug;
use std::path::Path;
use std::process::Command;

use crate::errors::GenError;

/// Rewrites a generated file in place.
pub trait Formatter {
    fn format(&self, path: &Path) -> Result<(), GenError>;
}

/// Runs an external program with the file path as its last argument,
/// e.g. `goimports -w <file>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFormatter {
    program: String,
    args: Vec<String>,
}

impl CommandFormatter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a whitespace separated command line such as `"gofmt -w"`.
    pub fn from_command_line(line: &str) -> Result<Self, GenError> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or_else(|| GenError::Configuration {
            message: "formatter command is empty".to_string(),
        })?;
        Ok(Self::new(program, parts.collect()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl Formatter for CommandFormatter {
    fn format(&self, path: &Path) -> Result<(), GenError> {
        debug!("running {} {:?} on {}", self.program, self.args, path.display());

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .output()
            .map_err(|e| GenError::PostProcess {
                path: path.to_path_buf(),
                message: format!("cannot run {}: {e}", self.program),
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = match stderr.trim() {
            "" => format!("{} exited with {}", self.program, output.status),
            detail => format!("{} exited with {}: {detail}", self.program, output.status),
        };
        Err(GenError::PostProcess {
            path: path.to_path_buf(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_command_line() {
        let formatter = CommandFormatter::from_command_line("  goimports   -w ").unwrap();
        assert_eq!(formatter.program(), "goimports");
        assert_eq!(formatter.args(), ["-w".to_string()]);
    }

    #[test]
    fn test_empty_command_line_is_rejected() {
        let err = CommandFormatter::from_command_line("   ").unwrap_err();
        assert!(matches!(err, GenError::Configuration { .. }));
    }

    #[test]
    fn test_missing_program_is_post_process_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("gen_sms.go");
        std::fs::write(&file, "package dao\n").unwrap();

        let formatter = CommandFormatter::new("gcg-no-such-formatter-binary", vec![]);
        let err = formatter.format(&file).unwrap_err();
        assert!(matches!(err, GenError::PostProcess { ref path, .. } if path == &file));
        assert!(!err.is_recoverable());
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status_is_checked() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("gen_sms.go");
        std::fs::write(&file, "package dao\n").unwrap();

        assert!(CommandFormatter::new("true", vec![]).format(&file).is_ok());

        let err = CommandFormatter::new("false", vec![]).format(&file).unwrap_err();
        assert!(err.to_string().contains("false exited with"));
    }
}
