//! Configuration loading for neuralterm.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Error;
use crate::providers::http::DEFAULT_API_URL;
use crate::terminal::Timings;

pub type Result<T> = std::result::Result<T, Error>;

/// Environment variable overriding `api_url`.
pub const API_URL_ENV: &str = "NEURALTERM_API_URL";

/// Get the neuralterm home directory (~/.neuralterm).
pub fn get_home_dir() -> Result<PathBuf> {
    let home = directories::UserDirs::new()
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

    Ok(home.home_dir().join(".neuralterm"))
}

/// Get the settings file path.
pub fn get_settings_path() -> Result<PathBuf> {
    Ok(get_home_dir()?.join("settings.json"))
}

/// Load settings from ~/.neuralterm/settings.json. A missing file yields the
/// defaults.
pub fn load_settings() -> Result<Settings> {
    load_settings_from(&get_settings_path()?)
}

pub fn load_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        tracing::debug!("No settings at {}, using defaults", path.display());
        return Ok(Settings::default());
    }

    let content = std::fs::read_to_string(path)?;
    let mut settings: Settings = serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid settings file {}: {}", path.display(), e)))?;
    settings.normalize()?;

    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

fn normalize_url(field: &str, url: &str) -> Result<String> {
    let url = url.trim().trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(Error::Config(format!(
            "{} must start with http:// or https:// (got '{}')",
            field, url
        )));
    }
    Ok(url.to_string())
}

/// Terminal delays in milliseconds.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TimingSettings {
    #[serde(default = "default_boot_first_line_ms")]
    pub boot_first_line_ms: u64,
    #[serde(default = "default_boot_interval_ms")]
    pub boot_interval_ms: u64,
    #[serde(default = "default_navigation_marker_ms")]
    pub navigation_marker_ms: u64,
    #[serde(default = "default_denial_ms")]
    pub denial_ms: u64,
    #[serde(default = "default_navigate_ms")]
    pub navigate_ms: u64,
}

fn default_boot_first_line_ms() -> u64 {
    100
}

fn default_boot_interval_ms() -> u64 {
    500
}

fn default_navigation_marker_ms() -> u64 {
    400
}

fn default_denial_ms() -> u64 {
    200
}

fn default_navigate_ms() -> u64 {
    500
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            boot_first_line_ms: default_boot_first_line_ms(),
            boot_interval_ms: default_boot_interval_ms(),
            navigation_marker_ms: default_navigation_marker_ms(),
            denial_ms: default_denial_ms(),
            navigate_ms: default_navigate_ms(),
        }
    }
}

impl From<&TimingSettings> for Timings {
    fn from(t: &TimingSettings) -> Self {
        Self {
            boot_first_line: Duration::from_millis(t.boot_first_line_ms),
            boot_interval: Duration::from_millis(t.boot_interval_ms),
            navigation_marker: Duration::from_millis(t.navigation_marker_ms),
            denial: Duration::from_millis(t.denial_ms),
            navigate: Duration::from_millis(t.navigate_ms),
        }
    }
}

/// neuralterm settings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Base URL of the chat/audit backend.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Public site, used to show where `cd` lands.
    #[serde(default = "default_site_url")]
    pub site_url: String,

    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,

    #[serde(default)]
    pub timings: TimingSettings,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_site_url() -> String {
    "https://peterguan.dev".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            site_url: default_site_url(),
            connect_timeout_secs: None,
            timings: TimingSettings::default(),
        }
    }
}

impl Settings {
    /// Point the backend somewhere else (flag or environment override).
    pub fn with_api_url(mut self, api_url: &str) -> Result<Self> {
        self.api_url = normalize_url("api_url", api_url)?;
        Ok(self)
    }

    fn normalize(&mut self) -> Result<()> {
        self.api_url = normalize_url("api_url", &self.api_url)?;
        self.site_url = normalize_url("site_url", &self.site_url)?;
        Ok(())
    }

    pub fn terminal_timings(&self) -> Timings {
        Timings::from(&self.timings)
    }
}
