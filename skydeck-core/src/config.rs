use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

fn default_location() -> String {
    "New York,US".to_string()
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OpenWeather API key. The OPENWEATHER_API_KEY environment variable
    /// takes precedence when set.
    pub api_key: Option<String>,

    /// Location searched on startup when none is given.
    #[serde(default = "default_location")]
    pub default_location: String,
}

impl Default for Config {
    fn default() -> Self {
        Self { api_key: None, default_location: default_location() }
    }
}

impl Config {
    /// Effective API key: environment override first, stored key second.
    pub fn api_key(&self) -> Option<String> {
        resolve_api_key(std::env::var(API_KEY_ENV).ok(), self.api_key.as_deref())
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Default path for the persisted favorites list.
    pub fn favorites_file_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().join("favorites.json"))
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "skydeck", "skydeck")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }
}

/// Environment override wins; empty strings on either side count as absent.
fn resolve_api_key(env: Option<String>, stored: Option<&str>) -> Option<String> {
    env.filter(|key| !key.trim().is_empty())
        .or_else(|| stored.map(str::to_string).filter(|key| !key.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_no_key_and_a_default_location() {
        let cfg = Config::default();
        assert!(cfg.api_key.is_none());
        assert_eq!(cfg.default_location, "New York,US");
    }

    #[test]
    fn env_override_wins_over_stored_key() {
        let key = resolve_api_key(Some("ENV_KEY".into()), Some("STORED_KEY"));
        assert_eq!(key.as_deref(), Some("ENV_KEY"));
    }

    #[test]
    fn blank_env_falls_back_to_stored_key() {
        let key = resolve_api_key(Some("  ".into()), Some("STORED_KEY"));
        assert_eq!(key.as_deref(), Some("STORED_KEY"));
    }

    #[test]
    fn blank_everywhere_is_absent() {
        assert_eq!(resolve_api_key(None, Some("")), None);
        assert_eq!(resolve_api_key(None, None), None);
    }

    #[test]
    fn config_without_location_field_parses_with_default() {
        let cfg: Config = toml::from_str("api_key = \"KEY\"").expect("parse");
        assert_eq!(cfg.api_key.as_deref(), Some("KEY"));
        assert_eq!(cfg.default_location, "New York,US");
    }
}
