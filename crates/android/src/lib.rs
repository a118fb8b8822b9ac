//! Android release tooling for Lipikar
//!
//! This crate provides the Android side of a release:
//! - Java `.properties` parsing
//! - Loading release signing credentials from `key.properties`
//! - The app module's build descriptor (identity, SDK levels, shrinking)
//! - Packaging plans that decide how each build type is signed
//! - Gradle wrapper integration
//!
//! # Example
//!
//! ```rust,no_run
//! use lipikar_android::build_config::{AndroidBuildConfig, BuildType};
//! use lipikar_android::packaging::PackagingPlan;
//! use lipikar_android::signing;
//! use std::path::Path;
//!
//! let credentials = signing::load(Path::new("android/key.properties"))?;
//! let plan = PackagingPlan::new(
//!     &AndroidBuildConfig::default(),
//!     BuildType::Release,
//!     credentials.as_ref(),
//! )?;
//! println!("Signing with key '{}'", plan.signing.key_alias());
//! # Ok::<(), lipikar_core::Error>(())
//! ```

#![warn(missing_docs)]

pub mod build_config;
pub mod gradle;
pub mod packaging;
pub mod properties;
pub mod signing;
