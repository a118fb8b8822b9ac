//! Error handling with codes, context and recovery suggestions
//!
//! Every fallible operation in the workspace returns [`Error`], which carries:
//! - An [`ErrorCode`] for programmatic handling and exit-code mapping
//! - Optional context and a recovery suggestion
//! - The underlying source error, when there is one

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // General errors (1xxx)
    Internal = 1001,

    // IO errors (2xxx)
    IoError = 2000,
    FileNotFound = 2001,
    PermissionDenied = 2002,
    InvalidPath = 2003,

    // Configuration errors (3xxx)
    ConfigNotFound = 3001,
    ConfigParseError = 3002,
    ConfigValidationError = 3003,
    InvalidConfigValue = 3004,

    // Process errors (5xxx)
    ProcessError = 5000,
    CommandNotFound = 5001,

    // Validation errors (6xxx)
    ValidationError = 6000,
    InvalidInput = 6001,

    // Signing errors (7xxx)
    SigningUnavailable = 7001,
    SigningIncomplete = 7002,
    KeystoreNotFound = 7003,

    // Platform-specific errors (8xxx)
    GradleError = 8001,
}

impl ErrorCode {
    /// Get the numeric code
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a human-readable category
    pub fn category(&self) -> &'static str {
        match self.code() / 1000 {
            1 => "General",
            2 => "IO",
            3 => "Configuration",
            5 => "Process",
            6 => "Validation",
            7 => "Signing",
            8 => "Platform",
            _ => "Unknown",
        }
    }

    /// Process exit code a CLI should use for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorCode::CommandNotFound => exit_codes::COMMAND_NOT_FOUND,
            _ => match self.code() / 1000 {
                3 => exit_codes::CONFIG_ERROR,
                6 => exit_codes::VALIDATION_ERROR,
                7 => exit_codes::SIGNING_ERROR,
                _ => exit_codes::FAILURE,
            },
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Main error type with rich context
#[derive(Error, Debug)]
pub struct Error {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context
    pub context: Option<String>,
    /// Recovery suggestion
    pub suggestion: Option<String>,
    /// Source error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, "\n  Context: {}", ctx)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a recovery suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Exit code for CLI callers
    pub fn exit_code(&self) -> i32 {
        self.code.exit_code()
    }

    // Convenience constructors

    /// An explicitly requested config file does not exist
    pub fn config_not_found(path: impl AsRef<Path>) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Create a lipikar.toml file or use --config to specify a path")
    }

    /// Malformed input file
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigParseError, message)
    }

    /// A child process could not be started
    pub fn process(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProcessError, message)
    }

    /// A required executable is missing
    pub fn command_not_found(cmd: &str) -> Self {
        Self::new(
            ErrorCode::CommandNotFound,
            format!("Command not found: {}", cmd),
        )
        .with_suggestion(format!("Install {} and ensure it's in your PATH", cmd))
    }

    /// The keystore named by `storeFile` is not a file
    pub fn keystore_not_found(path: impl AsRef<Path>) -> Self {
        Self::new(
            ErrorCode::KeystoreNotFound,
            format!("Keystore not found: {}", path.as_ref().display()),
        )
        .with_suggestion("storeFile is resolved relative to the directory holding key.properties")
    }

    /// A Gradle run exited unsuccessfully
    ///
    /// The tail of the build output becomes the error context.
    pub fn gradle(message: impl Into<String>, output: &str) -> Self {
        let err = Self::new(ErrorCode::GradleError, message)
            .with_suggestion("Run the task with ./gradlew in the Android directory for the full log");
        match output_tail(output, GRADLE_CONTEXT_LINES) {
            Some(tail) => err.with_context(tail),
            None => err,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Lines of Gradle output kept in an error's context
const GRADLE_CONTEXT_LINES: usize = 20;

/// Last `max` non-empty lines of `output`, if any
fn output_tail(output: &str, max: usize) -> Option<String> {
    let lines: Vec<&str> = output.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return None;
    }
    Some(lines[lines.len().saturating_sub(max)..].join("\n"))
}

/// Exit codes for CLI commands
pub mod exit_codes {
    /// Command completed
    pub const SUCCESS: i32 = 0;
    /// Generic failure, including failed Gradle runs
    pub const FAILURE: i32 = 1;
    /// Invalid input
    pub const VALIDATION_ERROR: i32 = 2;
    /// Missing or invalid configuration
    pub const CONFIG_ERROR: i32 = 3;
    /// Release signing cannot proceed
    pub const SIGNING_ERROR: i32 = 5;
    /// Required executable missing
    pub const COMMAND_NOT_FOUND: i32 = 127;
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::IoError,
        };
        Error::new(code, err.to_string()).with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("JSON error: {}", err)).with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("TOML parse error: {}", err))
            .with_source(err)
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::new(ErrorCode::Internal, format!("TOML render error: {}", err)).with_source(err)
    }
}
