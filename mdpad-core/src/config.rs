//! Configuration management for mdpad

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::store::{CONTENT_KEY, DEFAULT_AUTOSAVE_DELAY_MS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: ThemeVariant,
    pub history: HistoryConfig,
    pub autosave: AutosaveConfig,
    pub autoformat: AutoformatConfig,
    pub view: ViewOptions,
    pub goal: GoalConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeVariant {
    Light,
    Dark,
    System,
}

impl ThemeVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeVariant::Light => "light",
            ThemeVariant::Dark => "dark",
            ThemeVariant::System => "system",
        }
    }

    /// Parse the value persisted under the `theme` key
    pub fn from_stored(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(ThemeVariant::Light),
            "dark" => Some(ThemeVariant::Dark),
            "system" => Some(ThemeVariant::System),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    pub enabled: bool,
    pub delay_ms: u64,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoformatConfig {
    pub enabled: bool,
    pub delay_ms: u64,
}

/// Pure view state handed to renderers. None of it affects the buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOptions {
    pub fullscreen: bool,
    pub focus_mode: bool,
    pub typewriter: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalConfig {
    /// Word target, 0 means no goal
    pub words: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub tables: bool,
    pub strikethrough: bool,
    pub tasklists: bool,
    pub hard_breaks: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: ThemeVariant::System,
            history: HistoryConfig::default(),
            autosave: AutosaveConfig::default(),
            autoformat: AutoformatConfig::default(),
            view: ViewOptions::default(),
            goal: GoalConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ms: DEFAULT_AUTOSAVE_DELAY_MS,
            key: CONTENT_KEY.to_string(),
        }
    }
}

impl Default for AutoformatConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            delay_ms: 1000,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            tasklists: true,
            hard_breaks: true,
        }
    }
}

impl Config {
    /// Get the platform-specific config file path
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "mdpad")
            .map(|proj_dirs| proj_dirs.config_dir().join("mdpad.toml"))
    }

    /// Load configuration from the platform path, falling back to defaults if missing
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => {
                let config = Self::load_from(&path)?;
                log::info!("Loaded config from {}", path.display());
                Ok(config)
            }
            _ => {
                log::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        // Refuse world-writable config files (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = std::fs::metadata(path)
                .with_context(|| format!("Failed to stat config file: {}", path.display()))?;
            if metadata.permissions().mode() & 0o002 != 0 {
                anyhow::bail!(
                    "Config file {} is world-writable (insecure permissions)",
                    path.display()
                );
            }
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.theme, ThemeVariant::System);
        assert_eq!(config.history.limit, 100);
        assert!(config.autosave.enabled);
        assert_eq!(config.autosave.delay_ms, 1000);
        assert_eq!(config.autosave.key, "markdown-editor-content");
        assert!(!config.autoformat.enabled);
        assert_eq!(config.goal.words, 0);
        assert!(config.render.tables);
        assert_eq!(config.view, ViewOptions::default());
    }

    #[test]
    fn test_load_valid_toml() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(
            b"theme = \"Dark\"\n\
\n\
[history]\n\
limit = 25\n\
\n\
[autosave]\n\
enabled = false\n\
delay_ms = 250\n\
key = \"draft\"\n\
\n\
[view]\n\
typewriter = true\n\
\n\
[goal]\n\
words = 500\n",
        )?;

        let config = Config::load_from(file.path())?;
        assert_eq!(config.theme, ThemeVariant::Dark);
        assert_eq!(config.history.limit, 25);
        assert!(!config.autosave.enabled);
        assert_eq!(config.autosave.delay_ms, 250);
        assert_eq!(config.autosave.key, "draft");
        assert!(config.view.typewriter);
        assert!(!config.view.fullscreen);
        assert_eq!(config.goal.words, 500);

        Ok(())
    }

    #[test]
    fn test_load_partial_toml() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(b"[autoformat]\nenabled = true\n")?;

        let config = Config::load_from(file.path())?;
        assert!(config.autoformat.enabled);
        assert_eq!(config.autoformat.delay_ms, 1000);
        assert_eq!(config.theme, ThemeVariant::System);
        assert_eq!(config.history.limit, 100);

        Ok(())
    }

    #[test]
    fn test_load_invalid_toml_returns_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"invalid toml [[[syntax").unwrap();

        let result = Config::load_from(file.path());
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_world_writable_config_rejected() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let mut file = NamedTempFile::new()?;
        file.write_all(b"theme = \"Light\"\n")?;
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o666))?;

        let err = Config::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("world-writable"));
        Ok(())
    }

    #[test]
    fn test_config_path_returns_some() {
        let path = Config::config_path();
        assert!(path.is_some());
        if let Some(p) = path {
            assert!(p.to_string_lossy().contains("mdpad"));
            assert!(p.to_string_lossy().ends_with("mdpad.toml"));
        }
    }

    #[test]
    fn test_theme_variant_serialization() -> Result<()> {
        let config = Config {
            theme: ThemeVariant::Light,
            ..Default::default()
        };

        let toml_str = toml::to_string(&config)?;
        assert!(toml_str.contains("Light"));

        let parsed: Config = toml::from_str(&toml_str)?;
        assert_eq!(parsed, config);

        Ok(())
    }

    #[test]
    fn test_theme_stored_value() {
        assert_eq!(ThemeVariant::from_stored("dark"), Some(ThemeVariant::Dark));
        assert_eq!(
            ThemeVariant::from_stored(ThemeVariant::Light.as_str()),
            Some(ThemeVariant::Light)
        );
        assert_eq!(ThemeVariant::from_stored("sepia"), None);
    }
}
