//! Core utilities for Lipikar release tooling
//!
//! This crate provides shared functionality used by the Android tools:
//!
//! - **Error handling**: Errors with codes, context, and recovery suggestions
//! - **Process execution**: Command execution with captured output and extra environment
//! - **Configuration**: TOML-based tool configuration with defaults
//! - **Validation**: Collect-all validation of configuration values
//!
//! # Example
//!
//! ```rust,no_run
//! use lipikar_core::config::Config;
//!
//! let config = Config::load(None)?;
//! println!("Android project at {}", config.android_dir()?.display());
//! # Ok::<(), lipikar_core::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod process;
pub mod validation;

pub use error::{Error, ErrorCode, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{exit_codes, Error, ErrorCode, Result};
    pub use crate::process::CommandResult;
    pub use crate::validation::{ValidationResult, Validator};
}
