use std::time::Duration;

use chrono::{DateTime, Utc};

/// A playable track as reported to last.fm.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub artist: String,
    pub title: String,
    /// Empty when the file carries no album.
    pub album: String,
    pub album_artist: Option<String>,
    pub duration: Duration,
    pub track_number: Option<u32>,
    /// When playback was observed, not when the file was tagged.
    pub timestamp: DateTime<Utc>,
}

impl Track {
    /// `artist - title`, for log lines.
    pub fn display(&self) -> String {
        format!("{} - {}", self.artist, self.title)
    }

    /// Request fields describing this track for `track.updateNowPlaying`
    /// and `track.scrobble`.
    ///
    /// An album artist that differs from the track artist replaces it as
    /// `artist`.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut artist = self.artist.clone();
        let mut fields = Vec::with_capacity(7);

        if let Some(album_artist) = self.album_artist.as_deref().filter(|a| !a.is_empty()) {
            if album_artist != self.artist {
                artist = album_artist.to_string();
            }
            fields.push(("albumArtist", album_artist.to_string()));
        }

        fields.push(("artist", artist));
        fields.push(("track", self.title.clone()));
        fields.push(("timestamp", self.timestamp.timestamp().to_string()));

        if !self.album.is_empty() {
            fields.push(("album", self.album.clone()));
        }

        let seconds = (self.duration.as_millis() + 500) / 1000;
        if seconds > 0 {
            fields.push(("duration", seconds.to_string()));
        }

        if let Some(n) = self.track_number.filter(|n| *n > 0) {
            fields.push(("trackNumber", n.to_string()));
        }

        fields
    }
}
