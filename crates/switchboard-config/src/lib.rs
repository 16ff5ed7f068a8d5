//! Shared configuration for switchboard tools.
//!
//! TOML profiles naming a device address, layered with environment
//! variables, and translation to `switchboard_core::DeviceConfig`. The CLI
//! applies its own flag overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use switchboard_core::model::endpoint::DEFAULT_PORT;
use switchboard_core::{DeviceConfig, DeviceEndpoint};

/// Environment variable prefix, e.g. `SWITCHBOARD_DEFAULTS__TIMEOUT=10`.
pub const ENV_PREFIX: &str = "SWITCHBOARD_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named device profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use: explicit choice, then `default_profile`,
    /// then `"default"`.
    pub fn active_profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }

    /// Create or update a profile's address. The host is validated first.
    pub fn set_host(&mut self, name: &str, host: &str, port: Option<u16>) -> Result<(), ConfigError> {
        let endpoint = parse_endpoint(host, port)?;
        let profile = self.profiles.entry(name.to_owned()).or_default();
        profile.host = endpoint.host().to_owned();
        profile.port = (endpoint.port() != DEFAULT_PORT).then_some(endpoint.port());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Status poll period in seconds while watching; `0` disables polling.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    /// Delay before the status pull that follows a successful probe.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    5
}
fn default_poll_interval() -> u64 {
    10
}
fn default_settle_delay_ms() -> u64 {
    500
}

/// A named device profile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Device host name or IP address (e.g., "192.168.4.1").
    pub host: String,

    /// HTTP port, 80 when omitted.
    pub port: Option<u16>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Override poll interval.
    pub poll_interval: Option<u64>,

    /// Override settle delay.
    pub settle_delay_ms: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "switchboard", "switchboard").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("switchboard");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is invalid.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

/// Serialize config to TOML and write it to `path`, creating parents.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation to core config ──────────────────────────────────────

/// Build a `DeviceConfig` from a profile and the global defaults.
///
/// Profile values override defaults; a zero poll interval or settle delay
/// disables that behaviour.
pub fn profile_to_device_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<DeviceConfig, ConfigError> {
    let endpoint = parse_endpoint(&profile.host, profile.port)?;

    let timeout = profile.timeout.unwrap_or(defaults.timeout);
    if timeout == 0 {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let poll_interval = profile.poll_interval.unwrap_or(defaults.poll_interval);
    let settle_delay_ms = profile.settle_delay_ms.unwrap_or(defaults.settle_delay_ms);

    Ok(DeviceConfig {
        endpoint,
        timeout: Duration::from_secs(timeout),
        poll_interval: (poll_interval > 0).then(|| Duration::from_secs(poll_interval)),
        settle_delay: (settle_delay_ms > 0).then(|| Duration::from_millis(settle_delay_ms)),
        ..DeviceConfig::default()
    })
}

fn parse_endpoint(host: &str, port: Option<u16>) -> Result<DeviceEndpoint, ConfigError> {
    DeviceEndpoint::with_port(host, port.unwrap_or(DEFAULT_PORT)).map_err(|e| {
        ConfigError::Validation {
            field: "host".into(),
            reason: e.to_string(),
        }
    })
}
