//! Android build descriptor model
//!
//! Mirrors the `android { ... }` block of the app module: identity, SDK
//! levels, Java compatibility and release build options. Values come from
//! `lipikar.toml`; the version name falls back to what the Flutter tool writes
//! into `local.properties`.

use crate::properties::Properties;
use lipikar_core::config::AndroidConfig;
use lipikar_core::error::{Error, ErrorCode, Result};
use lipikar_core::validation::{ValidationResult, Validator};
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Highest `versionCode` Google Play accepts
pub const MAX_VERSION_CODE: u32 = 2_100_000_000;

const DEFAULT_PREFIX: &str = "default:";

/// Build variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildType {
    /// Debuggable, signed with the SDK debug key
    Debug,
    /// Shrunk and signed with the upload key
    Release,
}

impl BuildType {
    /// Name as used in Gradle task and output paths
    pub fn name(&self) -> &'static str {
        match self {
            BuildType::Debug => "debug",
            BuildType::Release => "release",
        }
    }

    /// Gradle task producing an APK
    pub fn assemble_task(&self) -> &'static str {
        match self {
            BuildType::Debug => "assembleDebug",
            BuildType::Release => "assembleRelease",
        }
    }

    /// Gradle task producing an app bundle
    pub fn bundle_task(&self) -> &'static str {
        match self {
            BuildType::Debug => "bundleDebug",
            BuildType::Release => "bundleRelease",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BuildType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(BuildType::Debug),
            "release" => Ok(BuildType::Release),
            other => Err(Error::new(
                ErrorCode::InvalidInput,
                format!("Unknown build type: {}", other),
            )
            .with_suggestion("Use 'debug' or 'release'")),
        }
    }
}

/// A shrinker rule file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProguardFile {
    /// Rule file shipped with the Android Gradle Plugin
    Default(String),
    /// Rule file relative to the app module
    Project(String),
}

impl ProguardFile {
    /// File name without the `default:` marker
    pub fn file_name(&self) -> &str {
        match self {
            ProguardFile::Default(name) | ProguardFile::Project(name) => name,
        }
    }
}

impl FromStr for ProguardFile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (file, is_default) = match s.strip_prefix(DEFAULT_PREFIX) {
            Some(rest) => (rest.trim(), true),
            None => (s.trim(), false),
        };
        if file.is_empty() {
            return Err(Error::new(
                ErrorCode::InvalidConfigValue,
                format!("Empty proguard file entry: '{}'", s),
            ));
        }
        Ok(if is_default {
            ProguardFile::Default(file.to_string())
        } else {
            ProguardFile::Project(file.to_string())
        })
    }
}

impl fmt::Display for ProguardFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProguardFile::Default(name) => write!(f, "{}{}", DEFAULT_PREFIX, name),
            ProguardFile::Project(name) => f.write_str(name),
        }
    }
}

impl Serialize for ProguardFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Options applied to the release build type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseOptions {
    /// Code shrinking, obfuscation and optimization
    pub minify: bool,
    /// Rule files passed to the shrinker, in order
    pub proguard_files: Vec<ProguardFile>,
}

/// Version values Flutter writes into `local.properties`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlutterVersion {
    /// `flutter.versionName`
    pub name: Option<String>,
    /// `flutter.versionCode`, kept as written
    pub code: Option<String>,
}

impl FlutterVersion {
    /// Read `flutter.versionName` / `flutter.versionCode` from the Android
    /// project's `local.properties`. Returns `None` when the file is absent.
    pub fn read(android_dir: &Path) -> Result<Option<Self>> {
        let path = android_dir.join("local.properties");
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "No local.properties");
            return Ok(None);
        }

        let props = Properties::load(&path)?;
        Ok(Some(Self {
            name: props.get("flutter.versionName").map(String::from),
            code: props.get("flutter.versionCode").map(String::from),
        }))
    }
}

/// Effective Android build descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AndroidBuildConfig {
    /// Namespace for generated `R` and `BuildConfig` classes
    pub namespace: String,
    /// Package name on the device and the store
    pub application_id: String,
    /// SDK level compiled against
    pub compile_sdk: u32,
    /// Lowest supported SDK level
    pub min_sdk: u32,
    /// SDK level the app is tested against
    pub target_sdk: u32,
    /// Integer version, must increase with every upload
    pub version_code: u32,
    /// Display version; filled from `local.properties` when unset
    pub version_name: Option<String>,
    /// Pinned NDK, or the plugin's default
    pub ndk_version: Option<String>,
    /// Java source and target compatibility
    pub java_version: u32,
    /// Release-only shrinker settings
    pub release: ReleaseOptions,
}

impl AndroidBuildConfig {
    /// Build from configuration values, without touching the filesystem
    pub fn from_config(config: &AndroidConfig) -> Result<Self> {
        let proguard_files = config
            .release
            .proguard_files
            .iter()
            .map(|s| s.parse())
            .collect::<Result<Vec<ProguardFile>>>()?;

        Ok(Self {
            namespace: config.namespace.clone(),
            application_id: config.application_id.clone(),
            compile_sdk: config.compile_sdk,
            min_sdk: config.min_sdk,
            target_sdk: config.target_sdk,
            version_code: config.version_code,
            version_name: config.version_name.clone(),
            ndk_version: config.ndk_version.clone(),
            java_version: config.java_version,
            release: ReleaseOptions {
                minify: config.release.minify,
                proguard_files,
            },
        })
    }

    /// Build from configuration, fill the version name from Flutter's
    /// `local.properties`, and validate
    pub fn resolve(config: &AndroidConfig, android_dir: &Path) -> Result<Self> {
        let mut build = Self::from_config(config)?;

        if build.version_name.is_none() {
            if let Some(flutter) = FlutterVersion::read(android_dir)? {
                build.version_name = flutter.name;
            }
        }

        let report = build.validate();
        for warning in report.warnings() {
            tracing::warn!(field = %warning.field, "{}", warning.message);
        }
        report.to_result_with(ErrorCode::ConfigValidationError)?;

        Ok(build)
    }

    /// Check SDK ordering, identity and version values
    pub fn validate(&self) -> ValidationResult {
        let (min, target, compile) = (self.min_sdk, self.target_sdk, self.compile_sdk);

        Validator::new()
            .required("namespace", &self.namespace)
            .pattern(
                "application_id",
                &self.application_id,
                r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)+$",
                "a dotted package name with at least two segments",
            )
            .range("min_sdk", min, 1, compile.max(1))
            .custom("target_sdk", || {
                (target < min || target > compile).then(|| {
                    format!(
                        "Must be between min_sdk ({}) and compile_sdk ({}), got {}",
                        min, compile, target
                    )
                })
            })
            .range("version_code", self.version_code, 1, MAX_VERSION_CODE)
            .range("java_version", self.java_version, 8, 25)
            .warn_if(
                "release.minify",
                !self.release.minify,
                "Release builds are not shrunk or obfuscated",
            )
            .warn_if(
                "version_name",
                self.version_name.is_none(),
                "No version name configured and none found in local.properties",
            )
            .validate()
    }
}

impl Default for AndroidBuildConfig {
    fn default() -> Self {
        Self {
            namespace: "com.visionlab.lipikar".to_string(),
            application_id: "com.visionlab.lipikar".to_string(),
            compile_sdk: 36,
            min_sdk: 24,
            target_sdk: 36,
            version_code: 4,
            version_name: None,
            ndk_version: None,
            java_version: 11,
            release: ReleaseOptions {
                minify: true,
                proguard_files: vec![
                    ProguardFile::Default("proguard-android-optimize.txt".to_string()),
                    ProguardFile::Project("proguard-rules.pro".to_string()),
                ],
            },
        }
    }
}
