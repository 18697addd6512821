//! Launcher settings loaded from TOML.
//!
//! # Responsibility
//! - Provide typed settings with per-key defaults.
//! - Resolve default data, config and log locations.
//!
//! # Invariants
//! - Missing sections and keys fall back to defaults individually.
//! - A missing or unparsable file yields defaults; only semantic validation
//!   failures are returned as errors.
//! - The panel list is non-empty and duplicate-free after validation.

use crate::logging::default_log_level;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "ignomi";
const SETTINGS_FILE_NAME: &str = "settings.toml";
const USAGE_DB_FILE_NAME: &str = "app_usage.db";
const BOOKMARKS_FILE_NAME: &str = "bookmarks.json";
const LOG_DIR_NAME: &str = "logs";

/// Panels opened together by the launcher shortcut.
pub const DEFAULT_PANELS: &[&str] = &["ignomi-bookmarks", "ignomi-search", "ignomi-frequent"];

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: io::Error },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "cannot read settings `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "settings are not valid TOML: {err}"),
            Self::Invalid(message) => write!(f, "invalid settings: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherSettings {
    /// Delay between a launch and the global close.
    pub close_delay_ms: u64,
    /// Panel names, in the order they are created.
    pub panels: Vec<String>,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            close_delay_ms: 300,
            panels: DEFAULT_PANELS.iter().map(|name| name.to_string()).collect(),
        }
    }
}

impl LauncherSettings {
    pub fn close_delay(&self) -> Duration {
        Duration::from_millis(self.close_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrecencySettings {
    pub max_items: usize,
    pub min_launches: u64,
}

impl Default for FrecencySettings {
    fn default() -> Self {
        Self {
            max_items: 12,
            min_launches: 2,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Defaults to `$XDG_DATA_HOME/ignomi`.
    pub data_dir: Option<PathBuf>,
}

impl StorageSettings {
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    pub fn usage_db_path(&self) -> PathBuf {
        self.resolved_data_dir().join(USAGE_DB_FILE_NAME)
    }

    pub fn bookmarks_path(&self) -> PathBuf {
        self.resolved_data_dir().join(BOOKMARKS_FILE_NAME)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `trace|debug|info|warn|error`; build-mode default when unset.
    pub level: Option<String>,
    /// Defaults to `<data_dir>/logs`.
    pub dir: Option<PathBuf>,
}

/// Complete launcher settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub launcher: LauncherSettings,
    pub frecency: FrecencySettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Parses TOML text strictly, then validates.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks semantic constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.launcher.panels.is_empty() {
            return Err(ConfigError::Invalid(
                "launcher.panels must name at least one panel".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for name in &self.launcher.panels {
            let name = name.trim();
            if name.is_empty() {
                return Err(ConfigError::Invalid(
                    "launcher.panels contains a blank name".to_string(),
                ));
            }
            if !seen.insert(name) {
                return Err(ConfigError::Invalid(format!(
                    "launcher.panels lists `{name}` twice"
                )));
            }
        }
        Ok(())
    }

    pub fn log_level(&self) -> String {
        self.logging
            .level
            .clone()
            .unwrap_or_else(|| default_log_level().to_string())
    }

    pub fn log_dir(&self) -> PathBuf {
        self.logging
            .dir
            .clone()
            .unwrap_or_else(|| self.storage.resolved_data_dir().join(LOG_DIR_NAME))
    }
}

/// Reads and parses `path` strictly.
pub fn read_settings(path: &Path) -> Result<Settings, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Settings::from_toml_str(&content)
}

/// Loads `path`, falling back to defaults for missing or unparsable files.
///
/// # Errors
/// - `ConfigError::Invalid` when the file parses but violates constraints.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    match read_settings(path) {
        Ok(settings) => {
            info!(
                "event=settings_load module=config status=ok path={}",
                path.display()
            );
            Ok(settings)
        }
        Err(ConfigError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            info!(
                "event=settings_load module=config status=default reason=missing path={}",
                path.display()
            );
            Ok(Settings::default())
        }
        Err(err @ ConfigError::Invalid(_)) => Err(err),
        Err(err) => {
            warn!(
                "event=settings_load module=config status=default path={} error={}",
                path.display(),
                err
            );
            Ok(Settings::default())
        }
    }
}

/// `$XDG_CONFIG_HOME/ignomi/settings.toml`.
pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(SETTINGS_FILE_NAME)
}

/// `$XDG_DATA_HOME/ignomi`.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, Settings, DEFAULT_PANELS};
    use std::path::PathBuf;

    #[test]
    fn empty_document_yields_defaults() {
        let settings = Settings::from_toml_str("").expect("empty toml");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.launcher.close_delay_ms, 300);
        assert_eq!(settings.frecency.max_items, 12);
        assert_eq!(settings.frecency.min_launches, 2);
        assert_eq!(settings.launcher.panels, DEFAULT_PANELS);
    }

    #[test]
    fn partial_section_keeps_sibling_defaults() {
        let settings = Settings::from_toml_str(
            "[launcher]\nclose_delay_ms = 500\n\n[frecency]\nmin_launches = 1\n",
        )
        .expect("partial toml");

        assert_eq!(settings.launcher.close_delay_ms, 500);
        assert_eq!(settings.launcher.panels.len(), 3);
        assert_eq!(settings.frecency.max_items, 12);
        assert_eq!(settings.frecency.min_launches, 1);
    }

    #[test]
    fn unknown_sections_are_ignored() {
        let settings = Settings::from_toml_str(
            "[search]\nmax_results = 30\n\n[animation]\ntransition_duration = 200\n",
        )
        .expect("unknown sections");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn rejects_duplicate_and_empty_panel_lists() {
        let duplicate = Settings::from_toml_str("[launcher]\npanels = [\"a\", \"a\"]\n")
            .expect_err("duplicate panels");
        assert!(matches!(duplicate, ConfigError::Invalid(_)));

        let empty = Settings::from_toml_str("[launcher]\npanels = []\n").expect_err("no panels");
        assert!(matches!(empty, ConfigError::Invalid(_)));
    }

    #[test]
    fn storage_paths_derive_from_data_dir() {
        let settings = Settings::from_toml_str("[storage]\ndata_dir = \"/srv/ignomi\"\n")
            .expect("storage toml");
        assert_eq!(
            settings.storage.usage_db_path(),
            PathBuf::from("/srv/ignomi/app_usage.db")
        );
        assert_eq!(
            settings.storage.bookmarks_path(),
            PathBuf::from("/srv/ignomi/bookmarks.json")
        );
        assert_eq!(settings.log_dir(), PathBuf::from("/srv/ignomi/logs"));
    }
}
