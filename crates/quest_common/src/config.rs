//! Questlog Configuration
//!
//! User configuration for storage location, output and new characters.
//! Config file: ~/.config/questlog/config.toml

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{QuestError, Result};
use crate::progression::Character;
use crate::store::QuestStore;

/// Environment variable overriding the data file location
pub const DATA_ENV: &str = "QUESTLOG_DATA";

/// Color display mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Colors when stdout is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Always => "always",
            Self::Never => "never",
        }
    }
}

impl FromStr for ColorMode {
    type Err = QuestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" | "on" | "yes" => Ok(Self::Always),
            "never" | "off" | "no" | "none" => Ok(Self::Never),
            _ => Err(QuestError::Config(format!(
                "Invalid color mode: '{}'. Valid values: auto, always, never",
                s
            ))),
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the quest log lives
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub data_file: Option<PathBuf>,
}

/// Output preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub color: ColorMode,
}

/// Identity given to a brand new character
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterConfig {
    #[serde(default)]
    pub default_title: Option<String>,
    #[serde(default)]
    pub default_avatar: Option<String>,
}

/// Main questlog configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub character: CharacterConfig,
}

impl QuestConfig {
    /// Default user config path: ~/.config/questlog/config.toml
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("questlog").join("config.toml"))
    }

    /// Load the user config, or defaults when there is none
    pub fn load() -> Result<Self> {
        match Self::user_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Resolve the data file: flag, then environment, then config, then the platform default
    pub fn data_path(&self, flag: Option<&Path>) -> PathBuf {
        let env = std::env::var_os(DATA_ENV).map(PathBuf::from);
        self.resolve_data_path(flag, env)
    }

    fn resolve_data_path(&self, flag: Option<&Path>, env: Option<PathBuf>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or(env.filter(|p| !p.as_os_str().is_empty()))
            .or_else(|| self.storage.data_file.clone())
            .unwrap_or_else(QuestStore::default_path)
    }

    /// Character used when no quest log exists yet
    pub fn new_character(&self) -> Character {
        Character::with_identity(
            self.character.default_title.as_deref().unwrap_or_default(),
            self.character.default_avatar.as_deref().unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QuestConfig::default();
        assert_eq!(config.output.color, ColorMode::Auto);
        assert!(config.storage.data_file.is_none());
        assert_eq!(config.new_character(), Character::default());
    }

    #[test]
    fn test_parse_full_config() {
        let config = QuestConfig::parse(
            r#"
[storage]
data_file = "/tmp/quests.json"

[output]
color = "never"

[character]
default_title = "Squire"
default_avatar = "kirby"
"#,
        )
        .unwrap();
        assert_eq!(config.storage.data_file, Some(PathBuf::from("/tmp/quests.json")));
        assert_eq!(config.output.color, ColorMode::Never);

        let character = config.new_character();
        assert_eq!(character.title, "Squire");
        assert_eq!(character.avatar, "kirby");
        assert_eq!(character.level(), 1);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = QuestConfig::parse("[output]\ncolor = \"always\"\n").unwrap();
        assert_eq!(config.output.color, ColorMode::Always);
        assert_eq!(config.character, CharacterConfig::default());
    }

    #[test]
    fn test_bad_config_is_toml_error() {
        let err = QuestConfig::parse("[output\ncolor = 1").unwrap_err();
        assert!(matches!(err, QuestError::Toml(_)));
        assert_eq!(err.code(), 6);
    }

    #[test]
    fn test_color_mode_parsing() {
        assert_eq!("auto".parse::<ColorMode>().unwrap(), ColorMode::Auto);
        assert_eq!("ALWAYS".parse::<ColorMode>().unwrap(), ColorMode::Always);
        assert_eq!("off".parse::<ColorMode>().unwrap(), ColorMode::Never);
        assert!("sometimes".parse::<ColorMode>().is_err());
    }

    #[test]
    fn test_data_path_priority() {
        let mut config = QuestConfig::default();
        config.storage.data_file = Some(PathBuf::from("/cfg/data.json"));

        let flag = PathBuf::from("/flag/data.json");
        let env = Some(PathBuf::from("/env/data.json"));

        assert_eq!(config.resolve_data_path(Some(&flag), env.clone()), flag);
        assert_eq!(config.resolve_data_path(None, env.clone()), PathBuf::from("/env/data.json"));
        assert_eq!(config.resolve_data_path(None, None), PathBuf::from("/cfg/data.json"));

        config.storage.data_file = None;
        assert_eq!(config.resolve_data_path(None, None), QuestStore::default_path());
    }
}
