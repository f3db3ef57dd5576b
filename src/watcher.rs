//! Directory watch on the minidlna log.
//!
//! The [`Watcher`] subscribes to change notifications for the log's parent
//! directory and handles one event at a time: every write to the log runs a
//! full [`Cycle`] before the next event is looked at. Scrobble jobs the
//! cycles schedule keep running on their own tasks.

mod cycle;
mod filter;

use std::path::PathBuf;
use std::sync::Arc;

use notify::{RecursiveMode, Watcher as _};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::jobs::JobScheduler;
use crate::lastfm::NowPlayingNotifier;
use crate::metadata::MetadataResolver;

use cycle::{Cycle, CycleOutcome};
use filter::is_log_write;

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("cannot watch {}: {source}", path.display())]
    Notify {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
    #[error("log file {} has no parent directory", .0.display())]
    NoParentDir(PathBuf),
}

pub struct Watcher {
    log_file: PathBuf,
    cycle: Cycle,
}

impl Watcher {
    pub fn new(
        log_file: PathBuf,
        magic_marker: String,
        resolver: Arc<dyn MetadataResolver>,
        notifier: Arc<dyn NowPlayingNotifier>,
        jobs: JobScheduler,
    ) -> Self {
        let cycle = Cycle::new(log_file.clone(), magic_marker, resolver, notifier, jobs);
        Self { log_file, cycle }
    }

    /// Watch until `shutdown` is cancelled.
    ///
    /// Failing to subscribe to the directory is the only error; everything
    /// that goes wrong inside a cycle is logged and the watch carries on.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), WatchError> {
        let dir = self
            .log_file
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .ok_or_else(|| WatchError::NoParentDir(self.log_file.clone()))?
            .to_path_buf();

        let (tx, mut rx) = mpsc::unbounded_channel::<notify::Result<notify::Event>>();
        let mut fs_watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let _ = tx.send(res);
        })
        .map_err(|source| WatchError::Notify {
            path: dir.clone(),
            source,
        })?;
        fs_watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::Notify {
                path: dir.clone(),
                source,
            })?;

        info!(log_file = %self.log_file.display(), "watching minidlna log");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                msg = rx.recv() => match msg {
                    Some(Ok(event)) => {
                        if is_log_write(&event, &self.log_file) {
                            match self.cycle.on_write().await {
                                CycleOutcome::Scheduled(job_id) => debug!(%job_id, "cycle scheduled a scrobble"),
                                CycleOutcome::Dropped(reason) => debug!(?reason, "cycle dropped"),
                                CycleOutcome::Rejected { code } => debug!(%code, "cycle rejected by last.fm"),
                                CycleOutcome::Ignored | CycleOutcome::TooShort => {}
                            }
                        }
                    }
                    Some(Err(err)) => warn!(error = %err, "filesystem watch error"),
                    None => break,
                },
            }
        }

        drop(fs_watcher);
        info!("stopped watching minidlna log");
        Ok(())
    }
}
