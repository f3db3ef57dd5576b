use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::lastfm::{RemoteError, ScrobbleSubmitter};
use crate::metadata::Track;

use super::retry::{classify, BackoffStrategy, Immediate, RetryDecision};
use super::types::{qualifies, scrobble_delay, JobId, PendingJob, ShutdownSignal};

/// Owner of the pending-job table.
///
/// Cloning yields another handle to the same table. Each enqueued job runs
/// on its own task that races its timer against its cancellation token.
/// Cancelling only interrupts the wait: a submission already in flight runs
/// to completion and its outcome is still logged.
#[derive(Clone)]
pub struct JobScheduler {
    inner: Arc<Inner>,
}

struct Inner {
    jobs: Mutex<HashMap<JobId, PendingJob>>,
    submitter: Arc<dyn ScrobbleSubmitter>,
    shutdown: Arc<dyn ShutdownSignal>,
    backoff: Arc<dyn BackoffStrategy>,
    root: CancellationToken,
    tasks: TaskTracker,
}

impl JobScheduler {
    pub fn new(submitter: Arc<dyn ScrobbleSubmitter>, shutdown: Arc<dyn ShutdownSignal>) -> Self {
        Self::with_backoff(submitter, shutdown, Arc::new(Immediate))
    }

    pub fn with_backoff(
        submitter: Arc<dyn ScrobbleSubmitter>,
        shutdown: Arc<dyn ShutdownSignal>,
        backoff: Arc<dyn BackoffStrategy>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                jobs: Mutex::new(HashMap::new()),
                submitter,
                shutdown,
                backoff,
                root: CancellationToken::new(),
                tasks: TaskTracker::new(),
            }),
        }
    }

    /// Schedule the scrobble of a track that just started streaming, delayed
    /// by half its length (capped at four minutes).
    pub fn schedule(&self, track: Track) -> Option<JobId> {
        let delay = scrobble_delay(track.duration);
        self.enqueue(track, delay, self.inner.root.child_token())
    }

    /// Register a job and start its timer.
    ///
    /// A track of 30 seconds or less is never registered; its token is
    /// cancelled on the spot and `None` is returned. A token that is already
    /// cancelled also yields `None`.
    pub fn enqueue(&self, track: Track, delay: Duration, cancel: CancellationToken) -> Option<JobId> {
        self.enqueue_attempt(track, delay, cancel, 0)
    }

    fn enqueue_attempt(
        &self,
        track: Track,
        delay: Duration,
        cancel: CancellationToken,
        attempt: u32,
    ) -> Option<JobId> {
        if !qualifies(&track) {
            debug!(track = %track.display(), duration = ?track.duration, "too short to scrobble");
            cancel.cancel();
            return None;
        }
        if cancel.is_cancelled() {
            return None;
        }

        let id = JobId::random();
        self.jobs().insert(
            id.clone(),
            PendingJob {
                id: id.clone(),
                track: track.clone(),
                delay,
                attempt,
                cancel: cancel.clone(),
            },
        );
        debug!(job_id = %id, track = %track.display(), ?delay, attempt, "scrobble scheduled");

        let scheduler = self.clone();
        let job_id = id.clone();
        self.inner
            .tasks
            .spawn(async move { scheduler.run(job_id, track, delay, cancel, attempt).await });

        Some(id)
    }

    /// Cancel every pending job and empty the table. Returns how many jobs
    /// were cancelled.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<PendingJob> = self.jobs().drain().map(|(_, job)| job).collect();
        for job in &drained {
            job.cancel.cancel();
            debug!(
                job_id = %job.id,
                track = %job.track.display(),
                delay = ?job.delay,
                attempt = job.attempt,
                "pending scrobble superseded"
            );
        }
        drained.len()
    }

    /// Snapshot of the pending table.
    #[cfg(test)]
    pub fn pending(&self) -> Vec<PendingJob> {
        self.jobs().values().cloned().collect()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.jobs().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.jobs().is_empty()
    }

    /// Cancel all pending jobs and wait for submissions already in flight.
    /// Nothing is persisted; cancelled jobs are lost.
    pub async fn shutdown(&self) {
        self.inner.root.cancel();
        let dropped = self.cancel_all();
        if dropped > 0 {
            info!(count = dropped, "discarding pending scrobbles");
        }
        self.inner.tasks.close();
        self.inner.tasks.wait().await;
    }

    fn jobs(&self) -> MutexGuard<'_, HashMap<JobId, PendingJob>> {
        self.inner.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run(
        self,
        id: JobId,
        track: Track,
        delay: Duration,
        cancel: CancellationToken,
        attempt: u32,
    ) {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(job_id = %id, "scrobble cancelled");
                return;
            }
            _ = tokio::time::sleep(delay) => {}
        }

        let outcome = self.inner.submitter.scrobble(&track).await;
        self.jobs().remove(&id);

        match outcome {
            Ok(ack) => info!(
                job_id = %id,
                artist = %ack.artist,
                track = %ack.track,
                accepted = ack.accepted,
                ignored = ack.ignored,
                corrected_artist = ?ack.corrected_artist,
                corrected_track = ?ack.corrected_track,
                "successful scrobble"
            ),
            Err(err) => self.handle_failure(id, track, cancel, attempt, err),
        }
    }

    fn handle_failure(
        &self,
        id: JobId,
        track: Track,
        cancel: CancellationToken,
        attempt: u32,
        err: RemoteError,
    ) {
        match classify(&err) {
            RetryDecision::Retry => {
                let next = attempt.saturating_add(1);
                let delay = self.inner.backoff.delay(next);
                warn!(job_id = %id, error = %err, attempt = next, ?delay, "scrobble failed, retrying");
                if self.enqueue_attempt(track, delay, cancel, next).is_none() {
                    debug!(job_id = %id, "retry skipped, job was superseded");
                }
            }
            RetryDecision::Fatal => {
                error!(
                    job_id = %id,
                    error = %err,
                    "last.fm session invalid, re-authentication required, terminating"
                );
                self.inner.shutdown.request_fatal_stop();
            }
            RetryDecision::Drop => {
                error!(job_id = %id, error = %err, track = %track.display(), "scrobble failed, dropping");
            }
        }
    }
}
