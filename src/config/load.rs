use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, then lets environment
/// variables (prefix `MINIDLNA_SCROBBLE__`) override it, falling back to
/// struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("MINIDLNA_SCROBBLE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Check the settings the daemon cannot run without.
    pub fn validate(&self) -> Result<(), String> {
        if !self.log_file.is_absolute() {
            return Err("log_file must be an absolute path".to_string());
        }
        if !self.db_file.is_absolute() {
            return Err("db_file must be an absolute path".to_string());
        }
        if self.credentials.api_key.trim().is_empty() {
            return Err("credentials.api_key must be set".to_string());
        }
        if self.credentials.shared_secret.trim().is_empty() {
            return Err("credentials.shared_secret must be set".to_string());
        }
        if self.remote.timeout_secs == 0 {
            return Err("remote.timeout_secs must be >= 1".to_string());
        }
        Ok(())
    }
}

/// Resolve the config path from `MINIDLNA_SCROBBLE_CONFIG_PATH` or the
/// XDG/system defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("MINIDLNA_SCROBBLE_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path.
///
/// Prefers `$XDG_CONFIG_HOME/minidlna-scrobble/config.toml`, then
/// `~/.config/minidlna-scrobble/config.toml`. When neither directory yields an
/// existing file the system-wide `/etc/minidlna-scrobble/config.toml` is used,
/// since the daemon usually runs as a service user without a home.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    let user_path = config_home.map(|d| d.join("minidlna-scrobble").join("config.toml"));
    match user_path {
        Some(p) if p.exists() => Some(p),
        _ => Some(system_config_path()),
    }
}

pub(super) fn system_config_path() -> PathBuf {
    PathBuf::from("/etc").join("minidlna-scrobble").join("config.toml")
}
