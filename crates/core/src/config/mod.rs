//! Configuration loading and schema definitions
//!
//! Tool configuration lives in `lipikar.toml`. Every section is optional and
//! falls back to the values the Lipikar Android project ships with.

mod loader;
mod schema;

pub use loader::{Config, CONFIG_CANDIDATES};
pub use schema::*;
