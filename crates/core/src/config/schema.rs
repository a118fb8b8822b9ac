//! Configuration schema definitions

use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConfigSchema {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub android: AndroidConfig,
}

/// Project layout configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectConfig {
    /// Android project directory (holds `gradlew`)
    #[serde(default = "default_android_dir")]
    pub android_dir: String,

    /// Keystore properties file, relative to `android_dir`
    #[serde(default = "default_key_properties")]
    pub key_properties: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            android_dir: default_android_dir(),
            key_properties: default_key_properties(),
        }
    }
}

fn default_android_dir() -> String {
    "android".to_string()
}

fn default_key_properties() -> String {
    "key.properties".to_string()
}

/// Android build descriptor values
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AndroidConfig {
    #[serde(default = "default_app_id")]
    pub namespace: String,

    #[serde(default = "default_app_id")]
    pub application_id: String,

    #[serde(default = "default_compile_sdk")]
    pub compile_sdk: u32,

    #[serde(default = "default_min_sdk")]
    pub min_sdk: u32,

    #[serde(default = "default_target_sdk")]
    pub target_sdk: u32,

    #[serde(default = "default_version_code")]
    pub version_code: u32,

    /// Falls back to `flutter.versionName` from `local.properties` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ndk_version: Option<String>,

    /// Java source/target compatibility and Kotlin JVM target
    #[serde(default = "default_java_version")]
    pub java_version: u32,

    #[serde(default)]
    pub release: ReleaseConfig,
}

impl Default for AndroidConfig {
    fn default() -> Self {
        Self {
            namespace: default_app_id(),
            application_id: default_app_id(),
            compile_sdk: default_compile_sdk(),
            min_sdk: default_min_sdk(),
            target_sdk: default_target_sdk(),
            version_code: default_version_code(),
            version_name: None,
            ndk_version: None,
            java_version: default_java_version(),
            release: ReleaseConfig::default(),
        }
    }
}

fn default_app_id() -> String {
    "com.visionlab.lipikar".to_string()
}

fn default_compile_sdk() -> u32 {
    36
}

fn default_min_sdk() -> u32 {
    24
}

fn default_target_sdk() -> u32 {
    36
}

fn default_version_code() -> u32 {
    4
}

fn default_java_version() -> u32 {
    11
}

/// Release build type options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReleaseConfig {
    /// Enable code shrinking and obfuscation
    #[serde(default = "default_true")]
    pub minify: bool,

    /// Shrinker rule files. A `default:` prefix names a file bundled with the
    /// Android Gradle Plugin; anything else is relative to the app module.
    #[serde(default = "default_proguard_files")]
    pub proguard_files: Vec<String>,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            minify: true,
            proguard_files: default_proguard_files(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_proguard_files() -> Vec<String> {
    vec![
        "default:proguard-android-optimize.txt".to_string(),
        "proguard-rules.pro".to_string(),
    ]
}
