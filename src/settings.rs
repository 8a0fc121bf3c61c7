use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::{DEFAULT_PORT, MAPS_API_KEY_ENV};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bind_address: String,
    pub port: u16,
    /// Dataset file to use instead of the embedded one
    pub dataset: Option<PathBuf>,
    /// Width of the side panel in pixels
    pub panel_width: u16,
    pub maps: MapsSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapsSettings {
    pub api_key: Option<String>,
    pub libraries: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            dataset: None,
            panel_width: 320,
            maps: MapsSettings::default(),
        }
    }
}

impl Default for MapsSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            libraries: vec!["places".to_string()],
        }
    }
}

impl Settings {
    /// Reads the settings file, falling back to defaults when it does not
    /// exist, then applies the API key from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);
        let mut settings = Self::load_file(&config_path)?;
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    fn load_file(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            debug!(path = %config_path.display(), "no settings file, using defaults");
            return Ok(Settings::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
        info!(path = %config_path.display(), "settings loaded");
        Ok(settings)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(MAPS_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.maps.api_key = Some(key);
        }
    }

    pub fn config_path() -> PathBuf {
        let mut path = std::env::current_exe()
            .unwrap_or_default()
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        if path.ends_with("target/debug") || path.ends_with("target/release") {
            path.pop();
            path.pop();
        }
        path.push("sikkim.toml");
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.maps.libraries, vec!["places"]);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sikkim.toml");
        std::fs::write(&path, "port = 8080\n\n[maps]\napi_key = \"from-file\"\n").unwrap();

        let settings = Settings::load_file(&path).unwrap();
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.bind_address, "127.0.0.1");
        assert_eq!(settings.maps.api_key.as_deref(), Some("from-file"));
        assert_eq!(settings.maps.libraries, vec!["places"]);
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sikkim.toml");
        std::fs::write(&path, "port = \"not a number\"").unwrap();
        assert!(Settings::load_file(&path).is_err());
    }

    #[test]
    fn environment_key_overrides_file() {
        let mut settings = Settings::default();
        settings.maps.api_key = Some("from-file".to_string());

        settings.apply_env(|_| Some("   ".to_string()));
        assert_eq!(settings.maps.api_key.as_deref(), Some("from-file"));

        settings.apply_env(|key| (key == MAPS_API_KEY_ENV).then(|| "from-env".to_string()));
        assert_eq!(settings.maps.api_key.as_deref(), Some("from-env"));
    }
}
