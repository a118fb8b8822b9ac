//! CLI utilities for Lipikar release tooling
//!
//! Provides shared CLI functionality:
//! - Terminal output formatting
//! - Spinners for long-running Gradle builds

#![warn(missing_docs)]

pub mod output;
pub mod progress;
