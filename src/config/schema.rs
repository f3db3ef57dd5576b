use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Top-level daemon settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/minidlna-scrobble/config.toml`,
/// `~/.config/minidlna-scrobble/config.toml` or `/etc/minidlna-scrobble/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `MINIDLNA_SCROBBLE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Absolute path of the minidlna log file to watch.
    pub log_file: PathBuf,
    /// Absolute path of minidlna's SQLite database (`files.db`).
    pub db_file: PathBuf,
    pub credentials: Credentials,
    pub watcher: WatcherSettings,
    pub remote: RemoteSettings,
    pub session: SessionSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from("/var/log/minidlna/minidlna.log"),
            db_file: PathBuf::from("/var/cache/minidlna/files.db"),
            credentials: Credentials::default(),
            watcher: WatcherSettings::default(),
            remote: RemoteSettings::default(),
            session: SessionSettings::default(),
        }
    }
}

/// last.fm API application credentials.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub api_key: String,
    pub shared_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("shared_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatcherSettings {
    /// Substring identifying the log line minidlna writes when it starts
    /// streaming a file.
    pub magic_marker: String,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            magic_marker: "upnphttp.c:1976".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// Root of the last.fm web service.
    pub api_url: String,
    /// Page the user visits to grant the application access.
    pub auth_url: String,
    /// Timeout applied to every outbound request (seconds).
    pub timeout_secs: u64,
}

impl RemoteSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            api_url: "https://ws.audioscrobbler.com/2.0/".to_string(),
            auth_url: "https://www.last.fm/api/auth/".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Overrides the directory holding `session.json`.
    pub cache_dir: Option<PathBuf>,
}
