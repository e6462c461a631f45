use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::{Platform, RuntimeMode};

const DEFAULT_URL_ROOT: &str = "http://localhost:3000/";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub url_root: String,
    #[serde(default)]
    pub runtime: RuntimeMode,
    #[serde(default)]
    pub platform: Platform,
    /// Web origin reported in client data; derived from `url_root` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_use_keyring")]
    pub use_keyring: bool,
}

fn default_timeout() -> u64 {
    30
}

fn default_use_keyring() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url_root: DEFAULT_URL_ROOT.to_string(),
            runtime: RuntimeMode::default(),
            platform: Platform::detect(),
            origin: None,
            request_timeout_secs: default_timeout(),
            use_keyring: default_use_keyring(),
        }
    }
}

impl Config {
    pub fn load(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join("config.toml");

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save(config_dir)?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&config_path).context("Failed to read config file")?;
        let mut config: Self = toml::from_str(&content).context("Failed to parse config file")?;
        config.url_root = normalize_url_root(&config.url_root)?;
        Ok(config)
    }

    pub fn save(&self, config_dir: &Path) -> Result<()> {
        let config_path = config_dir.join("config.toml");
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, content).context("Failed to write config file")?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Configured origin, or scheme://host[:port] of the server root.
    pub fn effective_origin(&self) -> Result<String> {
        if let Some(origin) = &self.origin {
            return Ok(origin.trim_end_matches('/').to_string());
        }
        let url = Url::parse(&self.url_root).context("Invalid url_root")?;
        Ok(url.origin().ascii_serialization())
    }
}

/// Validates the root and makes sure relative paths join under it.
pub fn normalize_url_root(url_root: &str) -> Result<String> {
    let mut url = Url::parse(url_root).with_context(|| format!("Invalid URL: {}", url_root))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url.to_string())
}

pub fn get_config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("TOUCHID_HOME") {
        let dir = PathBuf::from(dir);
        fs::create_dir_all(&dir).context("Failed to create config directory")?;
        return Ok(dir);
    }

    let home = dirs::home_dir().context("Failed to get home directory")?;
    let config_dir = home.join(".touchid");

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
    }

    Ok(config_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path()).unwrap();

        assert_eq!(config.url_root, DEFAULT_URL_ROOT);
        assert_eq!(config.runtime, RuntimeMode::Web);
        assert!(dir.path().join("config.toml").exists());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::load(dir.path()).unwrap();
        config.runtime = RuntimeMode::Hybrid;
        config.platform = Platform::Android;
        config.url_root = "https://wallet.example/api".to_string();
        config.save(dir.path()).unwrap();

        let reloaded = Config::load(dir.path()).unwrap();
        assert_eq!(reloaded.runtime, RuntimeMode::Hybrid);
        assert_eq!(reloaded.platform, Platform::Android);
        assert_eq!(reloaded.url_root, "https://wallet.example/api/");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.toml"),
            "url_root = \"https://wallet.example/\"\n",
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.use_keyring);
        assert_eq!(config.runtime, RuntimeMode::Web);
    }

    #[test]
    fn test_effective_origin() {
        let mut config = Config {
            url_root: "https://wallet.example:8443/api/".to_string(),
            ..Config::default()
        };
        assert_eq!(
            config.effective_origin().unwrap(),
            "https://wallet.example:8443"
        );

        config.origin = Some("https://app.wallet.example/".to_string());
        assert_eq!(
            config.effective_origin().unwrap(),
            "https://app.wallet.example"
        );
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(normalize_url_root("wallet").is_err());
    }
}
