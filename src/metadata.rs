//! Track metadata resolution.
//!
//! minidlna identifies the file it streams by its row id in the `DETAILS`
//! table of its own database. This module turns that id back into a
//! [`Track`] that can be reported to last.fm.

mod duration;
mod model;
mod sqlite;

use async_trait::async_trait;

pub use model::Track;
pub use sqlite::SqliteResolver;

/// Errors produced while resolving a play id into a [`Track`].
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("no track with id {0} in the minidlna database")]
    NotFound(i64),
    #[error("database query failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid duration format: {0:?}")]
    InvalidDuration(String),
    #[error("metadata lookup timed out")]
    Timeout,
}

/// Source of track metadata keyed by minidlna's detail id.
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    async fn resolve(&self, id: i64) -> Result<Track, ResolveError>;
}
