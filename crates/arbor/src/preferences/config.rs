//! Preference store configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PreferenceError, PreferenceResult};

/// File format for persisted preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferenceFormat {
    /// JSON, written pretty-printed.
    #[default]
    Json,
    /// TOML. Null values are not written.
    Toml,
}

impl PreferenceFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        if extension.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else if extension.eq_ignore_ascii_case("toml") {
            Some(Self::Toml)
        } else {
            None
        }
    }
}

/// Configuration for a [`SettingsPreferenceStore`](super::SettingsPreferenceStore).
///
/// Can be built in code or read from a TOML file:
///
/// ```
/// use arbor::preferences::{PreferenceFormat, PreferenceStoreConfig};
///
/// let config = PreferenceStoreConfig::from_toml_str(r#"
///     path = "prefs.toml"
///     format = "toml"
///     auto_save = true
/// "#).unwrap();
/// assert_eq!(config.format, PreferenceFormat::Toml);
/// assert!(config.auto_save);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceStoreConfig {
    /// Where preferences are persisted. `None` keeps them in memory only.
    pub path: Option<PathBuf>,
    /// The file format.
    pub format: PreferenceFormat,
    /// Write the file after every saved component.
    pub auto_save: bool,
}

impl PreferenceStoreConfig {
    /// Create an in-memory configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Persist to `path`, taking the format from its extension if known.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if let Some(format) = PreferenceFormat::from_path(&path) {
            self.format = format;
        }
        self.path = Some(path);
        self
    }

    /// Set the file format.
    pub fn format(mut self, format: PreferenceFormat) -> Self {
        self.format = format;
        self
    }

    /// Enable or disable writing after every save.
    pub fn auto_save(mut self, enabled: bool) -> Self {
        self.auto_save = enabled;
        self
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> PreferenceResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> PreferenceResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| PreferenceError::io(path, err))?;
        Self::from_toml_str(&text)
    }
}
