//! CLI configuration: thin wrapper around `switchboard_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides (--host,
//! --port, --timeout, --config).

use std::path::PathBuf;

use switchboard_core::DeviceConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use switchboard_config::{Config, Profile, save_config_to};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Config file in effect: `--config` / `SWITCHBOARD_CONFIG`, else the
/// platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(switchboard_config::config_path)
}

/// Load the config file in effect. A missing file yields the defaults.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(switchboard_config::load_config_from(&config_path(global))?)
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Build the `DeviceConfig` for this invocation.
///
/// Flag overrides take priority over profile values. Without a profile the
/// flags alone (or the board's access-point address) are used, unless the
/// profile was asked for by name.
pub fn resolve_device_config(global: &GlobalOpts, config: &Config) -> Result<DeviceConfig, CliError> {
    let profile_name = active_profile_name(global, config);

    let mut profile = match config.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(config),
            });
        }
        None => Profile {
            host: switchboard_core::DeviceEndpoint::default().host().to_owned(),
            ..Profile::default()
        },
    };

    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if let Some(port) = global.port {
        profile.port = Some(port);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    tracing::debug!(profile = %profile_name, host = %profile.host, "resolved device profile");
    Ok(switchboard_config::profile_to_device_config(
        &profile,
        &config.defaults,
    )?)
}

fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config
            .profiles
            .keys()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    }
}
