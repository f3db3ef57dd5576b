//! Small types shared by the scheduler and its callers.

use std::fmt;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::metadata::Track;

/// Tracks this short or shorter are never scrobbled.
pub const MIN_SCROBBLE_DURATION: Duration = Duration::from_secs(30);
/// Upper bound on how long a scrobble waits before it is sent.
pub const MAX_SCROBBLE_DELAY: Duration = Duration::from_secs(4 * 60);

/// Whether `track` is long enough to be scrobbled at all.
pub fn qualifies(track: &Track) -> bool {
    track.duration > MIN_SCROBBLE_DURATION
}

/// Time a track must keep streaming before it counts as a listen.
pub fn scrobble_delay(duration: Duration) -> Duration {
    (duration / 2).min(MAX_SCROBBLE_DELAY)
}

/// Random identifier of a pending job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn random() -> Self {
        Self(hex::encode(rand::random::<[u8; 20]>()))
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A scrobble waiting for its timer.
#[derive(Debug, Clone)]
pub struct PendingJob {
    pub id: JobId,
    pub track: Track,
    /// Delay the timer was started with.
    pub delay: Duration,
    /// Number of retries that led to this job; 0 for a first submission.
    pub attempt: u32,
    pub(super) cancel: CancellationToken,
}

impl PendingJob {
    #[cfg(test)]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Process-level stop, requested when retrying can never succeed.
pub trait ShutdownSignal: Send + Sync {
    fn request_fatal_stop(&self);
}

impl ShutdownSignal for CancellationToken {
    fn request_fatal_stop(&self) {
        self.cancel();
    }
}
