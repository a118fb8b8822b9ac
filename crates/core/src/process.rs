//! Process execution utilities
//!
//! Provides a unified interface for running external commands with:
//! - Output capture
//! - Directory context
//! - Environment variables

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// Result of a command execution
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Whether the command succeeded (exit code 0)
    pub success: bool,
    /// Exit code of the command
    pub exit_code: i32,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

impl CommandResult {
    /// Create from std::process::Output
    pub fn from_output(output: Output) -> Self {
        Self {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    /// Get combined output (stdout + stderr)
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

fn build_command(program: &str, args: &[&str], dir: Option<&Path>, env: &[(String, String)]) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }
    for (key, value) in env {
        cmd.env(key, value);
    }
    cmd
}

fn spawn_error(program: &str, err: std::io::Error) -> Error {
    if err.kind() == std::io::ErrorKind::NotFound {
        Error::command_not_found(program).with_source(err)
    } else {
        Error::process(format!("Failed to execute {}: {}", program, err)).with_source(err)
    }
}

/// Run a command with extra environment variables, optionally in a directory
///
/// Environment values are never logged; only their names are.
pub fn run_command_with_env(
    program: &str,
    args: &[&str],
    dir: Option<&Path>,
    env: &[(String, String)],
) -> Result<CommandResult> {
    tracing::debug!(
        program,
        ?args,
        env = ?env.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
        "Running command"
    );

    let output = build_command(program, args, dir, env)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| spawn_error(program, e))?;

    Ok(CommandResult::from_output(output))
}

/// Get the path to a command
pub fn which_command(program: &str) -> Option<PathBuf> {
    which::which(program).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[cfg(unix)]
    #[test]
    fn test_which_command_finds_sh() {
        assert!(which_command("sh").is_some());
    }

    #[test]
    fn test_which_command_nonexistent() {
        assert!(which_command("nonexistent_command_12345").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_command_captures_stdout() {
        let result = run_command_with_env("echo", &["hello"], None, &[]).unwrap();
        assert!(result.success);
        assert!(result.stdout.contains("hello"));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_command_with_env_passes_variables() {
        let env = vec![("LIPIKAR_TEST_VALUE".to_string(), "visible".to_string())];
        let result =
            run_command_with_env("sh", &["-c", "echo $LIPIKAR_TEST_VALUE"], None, &env).unwrap();
        assert_eq!(result.stdout.trim(), "visible");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_command_in_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "x").unwrap();
        let result = run_command_with_env("ls", &[], Some(dir.path()), &[]).unwrap();
        assert!(result.stdout.contains("marker.txt"));
    }

    #[test]
    fn test_missing_program_is_command_not_found() {
        let err = run_command_with_env("nonexistent_command_12345", &[], None, &[]).unwrap_err();
        assert_eq!(err.code, ErrorCode::CommandNotFound);
    }

    #[test]
    fn test_command_result_combined_output() {
        let result = CommandResult {
            success: true,
            exit_code: 0,
            stdout: "out".to_string(),
            stderr: "err".to_string(),
        };
        assert!(result.combined_output().contains("out"));
        assert!(result.combined_output().contains("err"));
    }
}
