use clap::{Parser, Subcommand};

/// Scrobble what minidlna streams to last.fm.
#[derive(Parser, Debug)]
#[command(name = "minidlna-scrobble", version)]
#[command(about = "Watch the minidlna log and scrobble streamed tracks to last.fm")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Tracing filter directive, overrides RUST_LOG (e.g. `debug` or
    /// `minidlna_scrobble=trace`).
    #[arg(long, global = true, env = "MINIDLNA_SCROBBLE_LOG")]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Watch the log and scrobble (default).
    Scrobble,
    /// Authorise this application with last.fm and store the session key.
    Auth,
}

impl Cli {
    pub fn subcommand(&self) -> Command {
        self.command.unwrap_or(Command::Scrobble)
    }
}
