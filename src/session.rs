//! Persisted last.fm session key.
//!
//! The `auth` command stores the session obtained from last.fm in
//! `session.json`; the daemon re-reads it on every request so a fresh
//! authentication takes effect without a restart.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const SESSION_FILE: &str = "session.json";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no stored session at {}, run `minidlna-scrobble auth` first", .0.display())]
    Missing(PathBuf),
    #[error("session cache I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("session cache is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Body of a successful `auth.getSession` call, stored as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session: Session,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub name: String,
    pub key: String,
    #[serde(default)]
    pub subscriber: u32,
}

#[derive(Debug, Clone)]
pub struct SessionCache {
    dir: PathBuf,
}

impl SessionCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache rooted at `override_dir`, else the default location.
    pub fn from_settings(override_dir: Option<&Path>) -> Self {
        match override_dir {
            Some(d) => Self::new(d),
            None => Self::new(default_cache_dir()),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    pub fn save(&self, data: &SessionResponse) -> Result<(), SessionError> {
        fs::create_dir_all(&self.dir)?;
        let buf = serde_json::to_vec(data)?;
        fs::write(self.path(), buf)?;
        Ok(())
    }

    pub fn read(&self) -> Result<SessionResponse, SessionError> {
        let path = self.path();
        let buf = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(SessionError::Missing(path)),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&buf)?)
    }
}

/// `$XDG_CACHE_HOME/minidlna-scrobble`, or `/var/cache/minidlna-scrobble`
/// when `XDG_CACHE_HOME` is unset or relative.
pub fn default_cache_dir() -> PathBuf {
    let base = env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .unwrap_or_else(|| PathBuf::from("/var/cache"));
    base.join("minidlna-scrobble")
}
