//! last.fm web service client.
//!
//! Only the handful of methods the daemon needs are implemented:
//! `track.updateNowPlaying`, `track.scrobble`, and the desktop
//! authentication pair `auth.getToken` / `auth.getSession`.

mod client;
mod signature;
mod types;

use async_trait::async_trait;

use crate::metadata::Track;
use crate::session::SessionError;

pub use client::LastFmClient;
pub use types::{NowPlayingAck, ScrobbleAck};

/// The session key was revoked or never valid; the user must re-authenticate.
pub const CODE_INVALID_SESSION_KEY: u32 = 9;
/// The service is offline.
pub const CODE_SERVICE_OFFLINE: u32 = 11;
/// The service is temporarily unavailable.
pub const CODE_TEMPORARILY_UNAVAILABLE: u32 = 16;

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The request never reached last.fm or its response never arrived.
    #[error("request to last.fm failed: {0}")]
    Transport(Box<dyn std::error::Error + Send + Sync>),
    /// last.fm answered with a structured error.
    #[error("last.fm returned error {code}: {message}")]
    Api { code: u32, message: String },
    #[error("unexpected response from last.fm: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        RemoteError::Transport(Box::new(err))
    }
}

/// Sends the lightweight "currently streaming" report.
#[async_trait]
pub trait NowPlayingNotifier: Send + Sync {
    async fn update_now_playing(&self, track: &Track) -> Result<NowPlayingAck, RemoteError>;
}

/// Submits a completed listen.
#[async_trait]
pub trait ScrobbleSubmitter: Send + Sync {
    async fn scrobble(&self, track: &Track) -> Result<ScrobbleAck, RemoteError>;
}
