//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, ErrorCode, Result};
use std::path::{Path, PathBuf};

/// Locations searched, in order, when no config path is given
pub const CONFIG_CANDIDATES: &[&str] = &["lipikar.toml", ".lipikar.toml", ".config/lipikar.toml"];

/// Configuration wrapper
#[derive(Debug, Clone)]
pub struct Config {
    /// Parsed values, defaults filled in
    pub schema: ConfigSchema,
    /// File the values came from; `None` when running on defaults
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from an explicit path, or search the current directory
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::config_not_found(p));
                }
                Self::from_file(p)
            }
            None => Self::discover(Path::new(".")),
        }
    }

    /// Search `dir` for a config file, falling back to defaults
    pub fn discover(dir: &Path) -> Result<Self> {
        match find_config_file(dir) {
            Some(p) => Self::from_file(&p),
            None => {
                tracing::debug!(dir = %dir.display(), "No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load and parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::from(e).with_context(format!("Failed to read config file {}", path.display()))
        })?;

        let schema: ConfigSchema = toml::from_str(&content).map_err(|e| {
            Error::from(e).with_context(format!("Failed to parse config file {}", path.display()))
        })?;

        tracing::debug!(path = %path.display(), "Loaded configuration");

        Ok(Self {
            schema,
            path: Some(path.to_path_buf()),
        })
    }

    /// Directory that relative paths in the config are resolved against
    pub fn base_dir(&self) -> PathBuf {
        self.path
            .as_deref()
            .and_then(Path::parent)
            .map(|p| {
                let base = p.to_path_buf();
                // `.config/lipikar.toml` still describes the project root
                if base.file_name().is_some_and(|n| n == ".config") {
                    base.parent().map(Path::to_path_buf).unwrap_or(base)
                } else {
                    base
                }
            })
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Resolved Android project directory
    pub fn android_dir(&self) -> Result<PathBuf> {
        Ok(resolve(&self.base_dir(), &expand(&self.schema.project.android_dir)?))
    }

    /// Resolved keystore properties path, relative to the Android project
    pub fn key_properties_path(&self) -> Result<PathBuf> {
        self.key_properties_in(&self.android_dir()?)
    }

    /// Keystore properties path for an Android project at `android_dir`
    ///
    /// Used when the project directory is overridden on the command line.
    pub fn key_properties_in(&self, android_dir: &Path) -> Result<PathBuf> {
        Ok(resolve(
            android_dir,
            &expand(&self.schema.project.key_properties)?,
        ))
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(&self.schema)?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema: ConfigSchema::default(),
            path: None,
        }
    }
}

/// Find configuration file in standard locations under `dir`
fn find_config_file(dir: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(|candidate| dir.join(candidate))
        .find(|p| p.is_file())
}

/// Expand `~` and environment variables in a configured path
fn expand(value: &str) -> Result<PathBuf> {
    shellexpand::full(value)
        .map(|s| PathBuf::from(s.as_ref()))
        .map_err(|e| {
            Error::new(
                ErrorCode::InvalidConfigValue,
                format!("Cannot expand path '{}': {}", value, e),
            )
            .with_source(e)
        })
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.path.is_none());
        assert_eq!(config.schema.android.compile_sdk, 36);
        assert_eq!(config.schema.android.min_sdk, 24);
        assert_eq!(config.schema.android.version_code, 4);
        assert!(config.schema.android.release.minify);
    }

    #[test]
    fn test_discover_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::discover(dir.path()).unwrap();
        assert!(config.path.is_none());
        assert_eq!(config.schema, ConfigSchema::default());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("lipikar.toml"),
            "[android]\nversion_code = 9\n\n[project]\nandroid_dir = \"mobile/android\"\n",
        )
        .unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.schema.android.version_code, 9);
        assert_eq!(config.schema.android.target_sdk, 36);
        assert_eq!(config.schema.project.key_properties, "key.properties");
        assert_eq!(
            config.key_properties_path().unwrap(),
            dir.path().join("mobile/android").join("key.properties")
        );
    }

    #[test]
    fn test_dot_config_location_resolves_from_project_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".config")).unwrap();
        std::fs::write(dir.path().join(".config/lipikar.toml"), "").unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.android_dir().unwrap(), dir.path().join("android"));
    }

    #[test]
    fn test_key_properties_expands_environment_variables() {
        let dir = tempfile::tempdir().unwrap();
        let secrets = tempfile::tempdir().unwrap();
        // SAFETY: the variable name is unique to this test
        unsafe { std::env::set_var("LIPIKAR_LOADER_SECRETS", secrets.path()) };
        std::fs::write(
            dir.path().join("lipikar.toml"),
            "[project]\nkey_properties = \"$LIPIKAR_LOADER_SECRETS/key.properties\"\n",
        )
        .unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(
            config.key_properties_path().unwrap(),
            secrets.path().join("key.properties")
        );
    }

    #[test]
    fn test_key_properties_expands_home() {
        let Some(home) = dirs::home_dir() else { return };
        let mut config = Config::default();
        config.schema.project.key_properties = "~/keys/lipikar.properties".to_string();

        assert_eq!(
            config.key_properties_path().unwrap(),
            home.join("keys/lipikar.properties")
        );
    }

    #[test]
    fn test_undefined_variable_is_invalid_config_value() {
        let mut config = Config::default();
        config.schema.project.android_dir = "$LIPIKAR_LOADER_UNSET_VAR/android".to_string();

        let err = config.android_dir().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfigValue);
        assert!(err.message.contains("LIPIKAR_LOADER_UNSET_VAR"));
    }

    #[test]
    fn test_key_properties_in_overridden_project_dir() {
        let override_dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        assert_eq!(
            config.key_properties_in(override_dir.path()).unwrap(),
            override_dir.path().join("key.properties")
        );

        let mut absolute = Config::default();
        let elsewhere = tempfile::tempdir().unwrap();
        absolute.schema.project.key_properties =
            elsewhere.path().join("key.properties").to_string_lossy().into_owned();
        assert_eq!(
            absolute.key_properties_in(override_dir.path()).unwrap(),
            elsewhere.path().join("key.properties")
        );
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lipikar.toml");
        std::fs::write(&path, "[android\n").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
        assert!(err.context.is_some());
    }

    #[test]
    fn test_to_toml_round_trips_defaults() {
        let rendered = Config::default().to_toml().unwrap();
        assert!(rendered.contains("compile_sdk = 36"));
        let parsed: ConfigSchema = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, ConfigSchema::default());
    }
}
