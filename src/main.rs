mod cli;
mod config;
mod jobs;
mod lastfm;
mod logparser;
mod metadata;
mod runtime;
mod session;
mod tail;
mod watcher;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run().await
}
