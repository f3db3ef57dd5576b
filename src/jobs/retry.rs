use std::time::Duration;

use crate::lastfm::{
    RemoteError, CODE_INVALID_SESSION_KEY, CODE_SERVICE_OFFLINE, CODE_TEMPORARILY_UNAVAILABLE,
};

/// What to do with a job whose submission failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Submit the same track again.
    Retry,
    /// Stop the process; the user has to re-authenticate.
    Fatal,
    /// Log and forget the job.
    Drop,
}

pub fn classify(err: &RemoteError) -> RetryDecision {
    match err {
        RemoteError::Transport(_) => RetryDecision::Retry,
        RemoteError::Api { code, .. } => match *code {
            CODE_SERVICE_OFFLINE | CODE_TEMPORARILY_UNAVAILABLE => RetryDecision::Retry,
            CODE_INVALID_SESSION_KEY => RetryDecision::Fatal,
            _ => RetryDecision::Drop,
        },
        RemoteError::Decode(_) | RemoteError::Session(_) | RemoteError::Url(_) => {
            RetryDecision::Drop
        }
    }
}

/// Delay before retry number `attempt` (starting at 1).
pub trait BackoffStrategy: Send + Sync {
    fn delay(&self, attempt: u32) -> Duration;
}

/// Retry straight away, without limit.
#[derive(Debug, Default, Clone, Copy)]
pub struct Immediate;

impl BackoffStrategy for Immediate {
    fn delay(&self, _attempt: u32) -> Duration {
        Duration::ZERO
    }
}
