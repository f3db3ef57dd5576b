//! Delayed, cancellable scrobble submission.
//!
//! A scrobble is only sent once a track has been streaming for half its
//! length (at most four minutes). Until then the job sits in the
//! [`JobScheduler`]'s pending table, where the next qualifying log line can
//! cancel it.

mod retry;
mod scheduler;
mod types;

pub use scheduler::JobScheduler;
pub use types::{JobId, ShutdownSignal};
