use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            refresh_interval_ms: default_refresh_interval_ms(),
        }
    }
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_refresh_interval_ms() -> u64 {
    RefreshInterval::default().as_millis()
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path).context("read config")?;
        let config = serde_json::from_str(&data).context("parse config")?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("create config directory")?;
        }
        let data = serde_json::to_string_pretty(self).context("serialize config")?;
        fs::write(path, data).context("write config")?;
        Ok(())
    }

    /// The persisted interval, or the default when the stored value is not
    /// one of the offered choices.
    pub fn refresh_interval(&self) -> RefreshInterval {
        match RefreshInterval::from_millis(self.refresh_interval_ms) {
            Some(interval) => interval,
            None => {
                warn!(
                    interval_ms = self.refresh_interval_ms,
                    "Ignoring unsupported refresh interval"
                );
                RefreshInterval::default()
            }
        }
    }

    pub fn set_refresh_interval(&mut self, interval: RefreshInterval) {
        self.refresh_interval_ms = interval.as_millis();
    }
}

/// Poll cadence for the live task list, restricted to the offered choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshInterval(u64);

impl RefreshInterval {
    pub const CHOICES_MS: [u64; 5] = [1_000, 2_000, 5_000, 10_000, 30_000];

    pub fn from_millis(ms: u64) -> Option<Self> {
        Self::CHOICES_MS.contains(&ms).then_some(Self(ms))
    }

    pub fn as_millis(self) -> u64 {
        self.0
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_millis(self.0)
    }

    fn position(self) -> usize {
        Self::CHOICES_MS
            .iter()
            .position(|ms| *ms == self.0)
            .unwrap_or(Self::CHOICES_MS.len() - 1)
    }

    /// Next longer choice; stays on the longest.
    pub fn longer(self) -> Self {
        let idx = (self.position() + 1).min(Self::CHOICES_MS.len() - 1);
        Self(Self::CHOICES_MS[idx])
    }

    /// Next shorter choice; stays on the shortest.
    pub fn shorter(self) -> Self {
        Self(Self::CHOICES_MS[self.position().saturating_sub(1)])
    }
}

impl Default for RefreshInterval {
    fn default() -> Self {
        Self(30_000)
    }
}

impl fmt::Display for RefreshInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0 / 1_000)
    }
}

/// Trims whitespace and trailing slashes; only http and https are accepted.
pub fn normalize_server_url(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .with_context(|| format!("server url must start with http:// or https://: {raw}"))?;
    if host.is_empty() {
        anyhow::bail!("server url has no host: {raw}");
    }
    Ok(trimmed.to_string())
}

fn project_dirs() -> anyhow::Result<ProjectDirs> {
    ProjectDirs::from("com", "admin-console", "admin-console").context("resolve project dirs")
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.json"))
}

pub fn default_diagnostics_dir() -> anyhow::Result<PathBuf> {
    Ok(project_dirs()?.data_local_dir().join("diagnostics"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_missing_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = AppConfig::load(&tmp.path().join("config.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.refresh_interval().as_millis(), 30_000);
    }

    #[test]
    fn save_and_load_preserve_interval() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.json");
        let mut config = AppConfig::default();
        config.set_refresh_interval(RefreshInterval::from_millis(5_000).unwrap());
        config.save(&path).unwrap();
        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.refresh_interval().as_millis(), 5_000);
    }

    #[test]
    fn unsupported_interval_falls_back_to_default() {
        let config = AppConfig {
            server_url: DEFAULT_SERVER_URL.to_string(),
            refresh_interval_ms: 1_234,
        };
        assert_eq!(config.refresh_interval(), RefreshInterval::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{"server_url":"http://admin.local"}"#).unwrap();
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.server_url, "http://admin.local");
        assert_eq!(config.refresh_interval_ms, 30_000);
    }

    #[test]
    fn server_url_is_normalized() {
        assert_eq!(
            normalize_server_url(" https://admin.example.com/ ").unwrap(),
            "https://admin.example.com"
        );
        assert!(normalize_server_url("ftp://admin").is_err());
        assert!(normalize_server_url("http://").is_err());
    }

    #[test]
    fn interval_steps_are_clamped() {
        let shortest = RefreshInterval::from_millis(1_000).unwrap();
        assert_eq!(shortest.shorter(), shortest);
        assert_eq!(shortest.longer().as_millis(), 2_000);
        let longest = RefreshInterval::default();
        assert_eq!(longest.longer(), longest);
        assert_eq!(longest.shorter().as_millis(), 10_000);
        assert_eq!(longest.to_string(), "30s");
    }
}
