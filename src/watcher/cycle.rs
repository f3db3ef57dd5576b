use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::jobs::{JobId, JobScheduler};
use crate::lastfm::NowPlayingNotifier;
use crate::logparser::parse_line;
use crate::metadata::MetadataResolver;
use crate::tail::last_line;

/// Why a cycle stopped before scheduling anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The log could not be read.
    ReadFailed,
    /// The line's message id is not a detail id.
    BadMessageId,
    /// The detail id did not resolve to a track.
    Unresolved,
    /// The now-playing report failed.
    NowPlayingFailed,
}

/// Result of handling one write to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The newest line is not a playback line; pending jobs are untouched.
    Ignored,
    Dropped(DropReason),
    /// last.fm ignored the now-playing report; nothing is scheduled.
    Rejected { code: String },
    /// The track is too short to ever count as a listen.
    TooShort,
    Scheduled(JobId),
}

/// One pass from "the log was written" to "a scrobble is scheduled".
pub struct Cycle {
    log_file: PathBuf,
    magic_marker: String,
    resolver: Arc<dyn MetadataResolver>,
    notifier: Arc<dyn NowPlayingNotifier>,
    jobs: JobScheduler,
}

impl Cycle {
    pub fn new(
        log_file: PathBuf,
        magic_marker: String,
        resolver: Arc<dyn MetadataResolver>,
        notifier: Arc<dyn NowPlayingNotifier>,
        jobs: JobScheduler,
    ) -> Self {
        Self {
            log_file,
            magic_marker,
            resolver,
            notifier,
            jobs,
        }
    }

    /// Handle a write to the log by looking at its newest line.
    pub async fn on_write(&self) -> CycleOutcome {
        match last_line(&self.log_file) {
            Ok(line) => self.on_line(&line).await,
            Err(err) => {
                error!(log_file = %self.log_file.display(), error = %err, "cannot read minidlna log");
                CycleOutcome::Dropped(DropReason::ReadFailed)
            }
        }
    }

    /// Handle one log line.
    ///
    /// Any playback line invalidates every pending scrobble before it is
    /// even parsed: whatever was streaming before has been replaced.
    pub async fn on_line(&self, line: &str) -> CycleOutcome {
        if !line.contains(&self.magic_marker) {
            return CycleOutcome::Ignored;
        }

        self.jobs.cancel_all();

        let record = parse_line(line);
        debug!(
            source = %record.source_file,
            line = %record.line_number,
            level = %record.log_level,
            message = %record.message,
            "playback line"
        );
        let id = match record.detail_id() {
            Ok(id) => id,
            Err(err) => {
                error!(message_id = %record.message_id, error = %err, "playback line has no usable id");
                return CycleOutcome::Dropped(DropReason::BadMessageId);
            }
        };

        let track = match self.resolver.resolve(id).await {
            Ok(t) => t,
            Err(err) => {
                error!(id, filepath = %record.filepath, error = %err, "cannot resolve track metadata");
                return CycleOutcome::Dropped(DropReason::Unresolved);
            }
        };

        let ack = match self.notifier.update_now_playing(&track).await {
            Ok(ack) => ack,
            Err(err) => {
                error!(track = %track.display(), error = %err, "now playing update failed");
                return CycleOutcome::Dropped(DropReason::NowPlayingFailed);
            }
        };

        if ack.is_ignored() {
            info!(
                track = %track.display(),
                code = %ack.ignored_code,
                reason = %ack.ignored_text,
                "last.fm ignored now playing, not scrobbling"
            );
            return CycleOutcome::Rejected {
                code: ack.ignored_code,
            };
        }

        info!(
            track = %track.display(),
            corrected_artist = ?ack.corrected_artist,
            corrected_track = ?ack.corrected_track,
            "now playing"
        );
        let label = track.display();
        match self.jobs.schedule(track) {
            Some(job_id) => CycleOutcome::Scheduled(job_id),
            None => {
                debug!(track = %label, "not scheduling scrobble");
                CycleOutcome::TooShort
            }
        }
    }
}
