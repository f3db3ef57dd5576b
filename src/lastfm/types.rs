//! Wire shapes of the last.fm JSON responses, and the summaries handed to
//! the rest of the daemon.
//!
//! last.fm's JSON is converted from XML and is loose about types: the same
//! field can arrive as `"0"` or `0`, and a list with one element arrives as a
//! bare object.

use serde::{Deserialize, Deserializer};

/// Outcome of a successful `track.updateNowPlaying` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NowPlayingAck {
    pub ignored_code: String,
    pub ignored_text: String,
    pub corrected_artist: Option<String>,
    pub corrected_track: Option<String>,
}

impl NowPlayingAck {
    /// last.fm accepted the call but filtered the track out.
    pub fn is_ignored(&self) -> bool {
        !self.ignored_code.is_empty() && self.ignored_code != "0"
    }
}

/// Outcome of a successful `track.scrobble` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrobbleAck {
    pub accepted: u32,
    pub ignored: u32,
    pub artist: String,
    pub track: String,
    pub corrected_artist: Option<String>,
    pub corrected_track: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiErrorBody {
    pub error: u32,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IgnoredMessage {
    #[serde(deserialize_with = "string_or_number")]
    code: String,
    #[serde(rename = "#text")]
    text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Corrected {
    #[serde(deserialize_with = "string_or_number")]
    corrected: String,
    #[serde(rename = "#text")]
    text: String,
}

impl Corrected {
    fn correction(&self) -> Option<String> {
        (self.corrected == "1").then(|| self.text.clone())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TrackEcho {
    ignored_message: IgnoredMessage,
    artist: Corrected,
    track: Corrected,
}

#[derive(Debug, Deserialize)]
pub(super) struct NowPlayingResponse {
    nowplaying: TrackEcho,
}

impl From<NowPlayingResponse> for NowPlayingAck {
    fn from(resp: NowPlayingResponse) -> Self {
        let np = resp.nowplaying;
        Self {
            corrected_artist: np.artist.correction(),
            corrected_track: np.track.correction(),
            ignored_code: np.ignored_message.code,
            ignored_text: np.ignored_message.text,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ScrobbleCounts {
    #[serde(deserialize_with = "count")]
    accepted: u32,
    #[serde(deserialize_with = "count")]
    ignored: u32,
}

#[derive(Debug, Deserialize)]
struct Scrobbles {
    scrobble: OneOrMany<TrackEcho>,
    #[serde(rename = "@attr", default)]
    attr: ScrobbleCounts,
}

#[derive(Debug, Deserialize)]
pub(super) struct ScrobbleResponse {
    scrobbles: Scrobbles,
}

impl From<ScrobbleResponse> for ScrobbleAck {
    fn from(resp: ScrobbleResponse) -> Self {
        let Scrobbles { scrobble, attr } = resp.scrobbles;
        let first = match scrobble {
            OneOrMany::One(t) => Some(t),
            OneOrMany::Many(v) => v.into_iter().next(),
        }
        .unwrap_or_default();

        Self {
            accepted: attr.accepted,
            ignored: attr.ignored,
            corrected_artist: first.artist.correction(),
            corrected_track: first.track.correction(),
            artist: first.artist.text,
            track: first.track.text,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    pub token: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Str(String),
    Num(u64),
}

fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Loose::deserialize(d)? {
        Loose::Str(s) => s,
        Loose::Num(n) => n.to_string(),
    })
}

fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    match Loose::deserialize(d)? {
        Loose::Num(n) => u32::try_from(n).map_err(serde::de::Error::custom),
        Loose::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
