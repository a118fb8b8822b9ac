//! Packaging plans: which signing config and shrinker options a build uses
//!
//! This is where signing credentials are consumed. Release builds need a
//! complete bundle and an existing keystore; debug builds always use the
//! built-in debug keystore and never look at `key.properties`.

use crate::build_config::{AndroidBuildConfig, BuildType, ProguardFile};
use crate::signing::{Secret, SigningCredentials};
use lipikar_core::error::{Error, ErrorCode, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Gradle property prefix understood by the Android Gradle Plugin
pub const INJECTED_SIGNING_PREFIX: &str = "android.injected.signing";

/// Gradle reads `ORG_GRADLE_PROJECT_<name>` environment variables as project properties
pub const GRADLE_PROJECT_ENV_PREFIX: &str = "ORG_GRADLE_PROJECT_";

const DEBUG_KEY_ALIAS: &str = "androiddebugkey";
const DEBUG_PASSWORD: &str = "android";

/// The Android SDK's built-in debug signing credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugSigning {
    /// `debug.keystore`, created by the SDK on first debug build
    pub store_file: PathBuf,
    /// Always `androiddebugkey`
    pub key_alias: String,
    /// Always `android`
    pub store_password: Secret,
    /// Always `android`
    pub key_password: Secret,
}

impl DebugSigning {
    /// Debug keystore under `$ANDROID_USER_HOME`, or `~/.android`
    pub fn builtin() -> Self {
        let android_home = std::env::var_os("ANDROID_USER_HOME")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".android")))
            .unwrap_or_else(|| PathBuf::from(".android"));

        Self {
            store_file: android_home.join("debug.keystore"),
            key_alias: DEBUG_KEY_ALIAS.to_string(),
            store_password: Secret::new(DEBUG_PASSWORD),
            key_password: Secret::new(DEBUG_PASSWORD),
        }
    }
}

/// Complete release signing values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSigning {
    /// Alias of the upload key inside the keystore
    pub key_alias: String,
    /// Password of the key entry
    pub key_password: Secret,
    /// Keystore file, known to exist when planned
    pub store_file: PathBuf,
    /// Password of the keystore
    pub store_password: Secret,
}

impl ReleaseSigning {
    /// Require a complete bundle with an existing keystore
    pub fn from_credentials(credentials: Option<&SigningCredentials>) -> Result<Self> {
        let Some(creds) = credentials else {
            return Err(Error::new(
                ErrorCode::SigningUnavailable,
                "No release signing credentials available",
            )
            .with_suggestion(
                "Create a keystore properties file with keyAlias, keyPassword, storeFile and storePassword",
            ));
        };

        let missing = creds.missing_keys();
        let (Some(key_alias), Some(key_password), Some(store_file), Some(store_password)) = (
            creds.key_alias.clone(),
            creds.key_password.clone(),
            creds.store_file.clone(),
            creds.store_password.clone(),
        ) else {
            return Err(Error::new(
                ErrorCode::SigningIncomplete,
                format!("Release signing is missing: {}", missing.join(", ")),
            )
            .with_context(format!("Loaded from {}", creds.properties_path().display()))
            .with_suggestion("Add the missing keys to the keystore properties file"));
        };

        if !store_file.is_file() {
            return Err(Error::keystore_not_found(&store_file)
                .with_context(format!("storeFile in {}", creds.properties_path().display())));
        }

        Ok(Self {
            key_alias,
            key_password,
            store_file,
            store_password,
        })
    }
}

/// Signing config selected for a build
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningConfig {
    /// SDK debug key
    Debug(DebugSigning),
    /// Upload key from the keystore properties file
    Release(ReleaseSigning),
}

impl SigningConfig {
    /// Keystore used for signing
    pub fn store_file(&self) -> &Path {
        match self {
            SigningConfig::Debug(d) => &d.store_file,
            SigningConfig::Release(r) => &r.store_file,
        }
    }

    /// Key alias used for signing
    pub fn key_alias(&self) -> &str {
        match self {
            SigningConfig::Debug(d) => &d.key_alias,
            SigningConfig::Release(r) => &r.key_alias,
        }
    }
}

/// Everything the external packaging step needs for one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagingPlan {
    /// Variant being built
    pub build_type: BuildType,
    /// Package name of the produced artifact
    pub application_id: String,
    /// Integer version
    pub version_code: u32,
    /// Display version, when known
    pub version_name: Option<String>,
    /// Code shrinking enabled; only ever true for release
    pub minify: bool,
    /// Shrinker rule files, empty unless minifying
    pub proguard_files: Vec<ProguardFile>,
    /// Signing config applied to the artifact
    pub signing: SigningConfig,
}

impl PackagingPlan {
    /// Plan a build, consuming release credentials when needed
    pub fn new(
        config: &AndroidBuildConfig,
        build_type: BuildType,
        credentials: Option<&SigningCredentials>,
    ) -> Result<Self> {
        let (signing, minify, proguard_files) = match build_type {
            BuildType::Debug => (SigningConfig::Debug(DebugSigning::builtin()), false, Vec::new()),
            BuildType::Release => (
                SigningConfig::Release(ReleaseSigning::from_credentials(credentials)?),
                config.release.minify,
                config.release.proguard_files.clone(),
            ),
        };

        tracing::debug!(
            build_type = %build_type,
            minify,
            key_alias = signing.key_alias(),
            store_file = %signing.store_file().display(),
            "Planned packaging"
        );

        Ok(Self {
            build_type,
            application_id: config.application_id.clone(),
            version_code: config.version_code,
            version_name: config.version_name.clone(),
            minify,
            proguard_files,
            signing,
        })
    }

    /// `android.injected.signing.*` properties for a release build
    ///
    /// Debug builds return nothing; Gradle signs them with its own debug key.
    pub fn gradle_properties(&self) -> Vec<(String, String)> {
        match &self.signing {
            SigningConfig::Debug(_) => Vec::new(),
            SigningConfig::Release(r) => vec![
                (
                    format!("{}.store.file", INJECTED_SIGNING_PREFIX),
                    r.store_file.display().to_string(),
                ),
                (
                    format!("{}.store.password", INJECTED_SIGNING_PREFIX),
                    r.store_password.expose().to_string(),
                ),
                (
                    format!("{}.key.alias", INJECTED_SIGNING_PREFIX),
                    r.key_alias.clone(),
                ),
                (
                    format!("{}.key.password", INJECTED_SIGNING_PREFIX),
                    r.key_password.expose().to_string(),
                ),
            ],
        }
    }

    /// Signing properties as environment variables, so secrets stay off the command line
    pub fn gradle_env(&self) -> Vec<(String, String)> {
        self.gradle_properties()
            .into_iter()
            .map(|(k, v)| (format!("{}{}", GRADLE_PROJECT_ENV_PREFIX, k), v))
            .collect()
    }

    /// Displayable view with secrets masked
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            build_type: self.build_type,
            application_id: self.application_id.clone(),
            version_code: self.version_code,
            version_name: self.version_name.clone(),
            minify: self.minify,
            proguard_files: self.proguard_files.iter().map(ToString::to_string).collect(),
            signing: match self.signing {
                SigningConfig::Debug(_) => "debug",
                SigningConfig::Release(_) => "release",
            },
            key_alias: self.signing.key_alias().to_string(),
            store_file: self.signing.store_file().to_path_buf(),
        }
    }
}

/// Serializable view of a [`PackagingPlan`]
#[derive(Debug, Clone, Serialize)]
pub struct PlanSummary {
    /// Variant being built
    pub build_type: BuildType,
    /// Package name
    pub application_id: String,
    /// Integer version
    pub version_code: u32,
    /// Display version
    pub version_name: Option<String>,
    /// Code shrinking enabled
    pub minify: bool,
    /// Shrinker rule files, `default:` prefixed for SDK-bundled ones
    pub proguard_files: Vec<String>,
    /// `"debug"` or `"release"`
    pub signing: &'static str,
    /// Signing key alias
    pub key_alias: String,
    /// Keystore path
    pub store_file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::Properties;

    fn credentials(dir: &Path, content: &str) -> SigningCredentials {
        SigningCredentials::from_properties(
            &Properties::parse(content).unwrap(),
            &dir.join("key.properties"),
        )
    }

    fn complete(dir: &Path) -> SigningCredentials {
        std::fs::write(dir.join("upload.jks"), b"keystore").unwrap();
        credentials(
            dir,
            "keyAlias=upload\nkeyPassword=kp\nstoreFile=upload.jks\nstorePassword=sp\n",
        )
    }

    #[test]
    fn test_debug_ignores_credentials() {
        let plan = PackagingPlan::new(&AndroidBuildConfig::default(), BuildType::Debug, None)
            .unwrap();
        assert!(matches!(plan.signing, SigningConfig::Debug(_)));
        assert_eq!(plan.signing.key_alias(), "androiddebugkey");
        assert!(!plan.minify);
        assert!(plan.gradle_properties().is_empty());
    }

    #[test]
    fn test_debug_with_partial_credentials_still_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let partial = credentials(dir.path(), "keyAlias=upload\n");
        let plan = PackagingPlan::new(
            &AndroidBuildConfig::default(),
            BuildType::Debug,
            Some(&partial),
        );
        assert!(plan.is_ok());
    }

    #[test]
    fn test_release_without_credentials() {
        let err = PackagingPlan::new(&AndroidBuildConfig::default(), BuildType::Release, None)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SigningUnavailable);
        assert!(!err.suggestion.unwrap().contains("android/"));
    }

    #[test]
    fn test_release_with_partial_credentials_names_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let partial = credentials(dir.path(), "keyAlias=upload\nstoreFile=upload.jks\n");

        let err = PackagingPlan::new(
            &AndroidBuildConfig::default(),
            BuildType::Release,
            Some(&partial),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::SigningIncomplete);
        assert!(err.message.ends_with("keyPassword, storePassword"));
    }

    #[test]
    fn test_release_with_missing_keystore() {
        let dir = tempfile::tempdir().unwrap();
        let creds = credentials(
            dir.path(),
            "keyAlias=upload\nkeyPassword=kp\nstoreFile=absent.jks\nstorePassword=sp\n",
        );

        let err = PackagingPlan::new(
            &AndroidBuildConfig::default(),
            BuildType::Release,
            Some(&creds),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::KeystoreNotFound);
    }

    #[test]
    fn test_release_plan_carries_shrinker_options_and_properties() {
        let dir = tempfile::tempdir().unwrap();
        let creds = complete(dir.path());

        let plan = PackagingPlan::new(
            &AndroidBuildConfig::default(),
            BuildType::Release,
            Some(&creds),
        )
        .unwrap();
        assert!(plan.minify);
        assert_eq!(plan.proguard_files.len(), 2);

        let props = plan.gradle_properties();
        assert_eq!(props.len(), 4);
        assert!(props.contains(&(
            "android.injected.signing.key.alias".to_string(),
            "upload".to_string()
        )));
        assert!(props.contains(&(
            "android.injected.signing.store.file".to_string(),
            dir.path().join("upload.jks").display().to_string()
        )));

        let env = plan.gradle_env();
        assert!(env
            .iter()
            .all(|(k, _)| k.starts_with("ORG_GRADLE_PROJECT_android.injected.signing.")));
    }

    #[test]
    fn test_summary_has_no_secrets() {
        let dir = tempfile::tempdir().unwrap();
        let creds = complete(dir.path());
        let plan = PackagingPlan::new(
            &AndroidBuildConfig::default(),
            BuildType::Release,
            Some(&creds),
        )
        .unwrap();

        let json = serde_json::to_string(&plan.summary()).unwrap();
        assert!(json.contains("\"signing\":\"release\""));
        assert!(!json.contains("\"kp\""));
        assert!(!json.contains("\"sp\""));
    }
}
