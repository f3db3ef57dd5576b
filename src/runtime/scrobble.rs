use std::error::Error;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::Settings;
use crate::jobs::{JobScheduler, ShutdownSignal};
use crate::lastfm::LastFmClient;
use crate::metadata::SqliteResolver;
use crate::session::SessionCache;
use crate::watcher::Watcher;

/// Run the daemon until a signal or a fatal remote error stops it.
pub async fn run(settings: Settings) -> Result<(), Box<dyn Error>> {
    let sessions = SessionCache::from_settings(settings.session.cache_dir.as_deref());
    if let Err(err) = sessions.read() {
        // Not fatal: a later `auth` run is picked up without a restart.
        error!(error = %err, "no usable last.fm session yet");
    }

    let resolver = Arc::new(
        SqliteResolver::open(&settings.db_file)
            .await
            .map_err(|e| format!("cannot open {}: {e}", settings.db_file.display()))?,
    );
    let client = Arc::new(LastFmClient::new(
        &settings.remote,
        settings.credentials.clone(),
        sessions,
    )?);

    let shutdown = CancellationToken::new();
    let fatal = Arc::new(FatalStop::new(shutdown.clone()));
    let jobs = JobScheduler::new(client.clone(), fatal.clone());
    let watcher = Watcher::new(
        settings.log_file.clone(),
        settings.watcher.magic_marker.clone(),
        resolver.clone(),
        client,
        jobs.clone(),
    );

    let signals = tokio::spawn(forward_signals(shutdown.clone()));
    let result = watcher.run(shutdown.clone()).await;
    signals.abort();

    // The watcher is stopped; nothing new can be scheduled past this point.
    jobs.shutdown().await;
    resolver.close().await;
    info!("shut down");

    result?;
    if fatal.requested() {
        return Err("last.fm rejected the session key, run `minidlna-scrobble auth`".into());
    }
    Ok(())
}

/// Stops the daemon like a signal does, but remembers that it happened so
/// the process exits with an error.
struct FatalStop {
    shutdown: CancellationToken,
    requested: AtomicBool,
}

impl FatalStop {
    fn new(shutdown: CancellationToken) -> Self {
        Self {
            shutdown,
            requested: AtomicBool::new(false),
        }
    }

    fn requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

impl ShutdownSignal for FatalStop {
    fn request_fatal_stop(&self) {
        self.requested.store(true, Ordering::SeqCst);
        self.shutdown.request_fatal_stop();
    }
}

async fn forward_signals(shutdown: CancellationToken) {
    tokio::select! {
        _ = shutdown.cancelled() => return,
        name = wait_for_signal() => info!(signal = name, "received signal, shutting down"),
    }
    shutdown.cancel();
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => tokio::select! {
            _ = ctrl_c() => "SIGINT",
            _ = term.recv() => "SIGTERM",
        },
        Err(err) => {
            error!(signal = "SIGTERM", error = %err, "cannot install signal handler");
            ctrl_c().await;
            "SIGINT"
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    ctrl_c().await;
    "ctrl-c"
}

async fn ctrl_c() {
    pending_on_error(tokio::signal::ctrl_c().await, "SIGINT").await;
}

/// A handler that could not be installed never fires.
async fn pending_on_error(installed: io::Result<()>, signal: &'static str) {
    if let Err(err) = installed {
        error!(signal, error = %err, "cannot install signal handler");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn failed_handler_install_never_signals() {
        let waited = tokio::time::timeout(
            Duration::from_secs(3600),
            pending_on_error(Err(io::Error::other("no signal support")), "SIGINT"),
        )
        .await;
        assert!(waited.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_handler_install_does_not_trigger_shutdown() {
        let shutdown = CancellationToken::new();
        let forward = tokio::spawn({
            let shutdown = shutdown.clone();
            async move {
                tokio::select! {
                    _ = shutdown.cancelled() => false,
                    _ = pending_on_error(Err(io::Error::other("no signal support")), "SIGINT") => true,
                }
            }
        });

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(!shutdown.is_cancelled());

        shutdown.cancel();
        assert!(!forward.await.unwrap());
    }

    #[tokio::test]
    async fn installed_handler_waits_for_the_signal_itself() {
        pending_on_error(Ok(()), "SIGINT").await;
    }
}
