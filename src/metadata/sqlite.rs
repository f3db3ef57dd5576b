use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use super::duration::parse_db_duration;
use super::model::Track;
use super::{MetadataResolver, ResolveError};

const SELECT_DETAILS: &str = "SELECT ARTIST, ALBUM, TITLE, DURATION, TRACK FROM DETAILS WHERE ID = ?";

const QUERY_TIMEOUT: Duration = Duration::from_secs(10);

type DetailRow = (
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<i64>,
);

/// Resolves play ids against minidlna's own `files.db`.
///
/// The database belongs to minidlna, so it is only ever opened read-only.
#[derive(Debug, Clone)]
pub struct SqliteResolver {
    pool: SqlitePool,
}

impl SqliteResolver {
    pub async fn open(path: &Path) -> Result<Self, ResolveError> {
        let options = SqliteConnectOptions::new().filename(path).read_only(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(2)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    pub async fn close(&self) {
        tracing::info!("closing metadata database");
        self.pool.close().await;
    }
}

#[async_trait]
impl MetadataResolver for SqliteResolver {
    async fn resolve(&self, id: i64) -> Result<Track, ResolveError> {
        let query = sqlx::query_as::<_, DetailRow>(SELECT_DETAILS)
            .bind(id)
            .fetch_optional(&self.pool);

        let row = tokio::time::timeout(QUERY_TIMEOUT, query)
            .await
            .map_err(|_| ResolveError::Timeout)??;

        let Some((artist, album, title, duration, track)) = row else {
            return Err(ResolveError::NotFound(id));
        };

        let duration = parse_db_duration(duration.as_deref().unwrap_or_default())?;

        Ok(Track {
            artist: unescape(artist),
            title: unescape(title),
            album: unescape(album),
            album_artist: None,
            duration,
            track_number: track.and_then(|n| u32::try_from(n).ok()),
            timestamp: Utc::now(),
        })
    }
}

/// minidlna stores some tag values double-escaped.
fn unescape(value: Option<String>) -> String {
    value.unwrap_or_default().replace("&amp;amp;", "&")
}
