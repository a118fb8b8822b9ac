//! Release signing credentials from `key.properties`
//!
//! The keystore properties file is kept out of version control and holds the
//! four values a release build needs to sign:
//!
//! ```text
//! keyAlias=upload
//! keyPassword=...
//! storeFile=../keys/upload-keystore.jks
//! storePassword=...
//! ```
//!
//! [`load`] never validates completeness. A missing file is a warning and
//! yields `None`; missing keys yield `None` fields. Completeness is enforced
//! where the credentials are consumed, by [`crate::packaging::PackagingPlan`].

use crate::properties::Properties;
use lipikar_core::error::{Error, ErrorCode, Result};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Property key for the key alias
pub const KEY_ALIAS: &str = "keyAlias";
/// Property key for the key password
pub const KEY_PASSWORD: &str = "keyPassword";
/// Property key for the keystore path
pub const STORE_FILE: &str = "storeFile";
/// Property key for the keystore password
pub const STORE_PASSWORD: &str = "storePassword";

/// Recognised keys, in the order they are reported
pub const SIGNING_KEYS: [&str; 4] = [KEY_ALIAS, KEY_PASSWORD, STORE_FILE, STORE_PASSWORD];

const MASK: &str = "********";

/// A secret string that never prints its value
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wrap a secret value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the raw value
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({})", MASK)
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

/// Signing credential bundle loaded from a keystore properties file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningCredentials {
    /// Alias of the key inside the keystore
    pub key_alias: Option<String>,
    /// Password of the key
    pub key_password: Option<Secret>,
    /// Keystore path, resolved against the properties file's directory
    pub store_file: Option<PathBuf>,
    /// Password of the keystore
    pub store_password: Option<Secret>,
    properties_path: PathBuf,
}

impl SigningCredentials {
    /// Build credentials from parsed properties
    ///
    /// `properties_path` must be the absolute path the properties came from;
    /// `storeFile` is resolved against its parent directory.
    pub fn from_properties(props: &Properties, properties_path: &Path) -> Self {
        let base = properties_path.parent().unwrap_or_else(|| Path::new(""));

        Self {
            key_alias: props.get(KEY_ALIAS).map(String::from),
            key_password: props.get(KEY_PASSWORD).map(Secret::new),
            store_file: props.get(STORE_FILE).map(|f| base.join(f)),
            store_password: props.get(STORE_PASSWORD).map(Secret::new),
            properties_path: properties_path.to_path_buf(),
        }
    }

    /// Absolute path of the properties file these credentials came from
    pub fn properties_path(&self) -> &Path {
        &self.properties_path
    }

    /// Property keys with no value, in [`SIGNING_KEYS`] order
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let present = [
            self.key_alias.is_some(),
            self.key_password.is_some(),
            self.store_file.is_some(),
            self.store_password.is_some(),
        ];
        SIGNING_KEYS
            .iter()
            .zip(present)
            .filter(|(_, present)| !present)
            .map(|(key, _)| *key)
            .collect()
    }

    /// Whether all four values are present
    pub fn is_complete(&self) -> bool {
        self.missing_keys().is_empty()
    }

    /// Displayable view, secrets masked unless `reveal` is set
    pub fn summary(&self, reveal: bool) -> SigningSummary {
        let show = |s: &Option<Secret>| {
            s.as_ref().map(|secret| {
                if reveal {
                    secret.expose().to_string()
                } else {
                    MASK.to_string()
                }
            })
        };

        SigningSummary {
            properties_path: self.properties_path.clone(),
            key_alias: self.key_alias.clone(),
            key_password: show(&self.key_password),
            store_file: self.store_file.clone(),
            store_file_exists: self.store_file.as_deref().map(Path::is_file),
            store_password: show(&self.store_password),
            missing_keys: self.missing_keys(),
        }
    }
}

/// Serializable view of [`SigningCredentials`]
#[derive(Debug, Clone, Serialize)]
pub struct SigningSummary {
    /// Absolute path the credentials were read from
    pub properties_path: PathBuf,
    /// `keyAlias`
    pub key_alias: Option<String>,
    /// `keyPassword`, masked unless revealed
    pub key_password: Option<String>,
    /// Resolved `storeFile`
    pub store_file: Option<PathBuf>,
    /// Whether the resolved keystore is a file; `None` without `storeFile`
    pub store_file_exists: Option<bool>,
    /// `storePassword`, masked unless revealed
    pub store_password: Option<String>,
    /// Signing keys absent from the file
    pub missing_keys: Vec<&'static str>,
}

/// Load signing credentials from a keystore properties file
///
/// Returns `Ok(None)` after logging a warning when nothing exists at `path`.
/// Errors are limited to reading an existing file and malformed escapes.
pub fn load(path: &Path) -> Result<Option<SigningCredentials>> {
    let absolute = std::path::absolute(path).map_err(|e| {
        Error::new(
            ErrorCode::InvalidPath,
            format!("Cannot resolve properties path '{}'", path.display()),
        )
        .with_source(e)
    })?;

    if !absolute.exists() {
        tracing::warn!(
            "Keystore properties file not found at {}",
            absolute.display()
        );
        return Ok(None);
    }

    let props = Properties::load(&absolute)?;
    let credentials = SigningCredentials::from_properties(&props, &absolute);

    tracing::debug!(
        path = %absolute.display(),
        entries = props.len(),
        missing = ?credentials.missing_keys(),
        "Loaded keystore properties"
    );

    Ok(Some(credentials))
}
