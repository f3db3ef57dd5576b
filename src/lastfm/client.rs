use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::{Credentials, RemoteSettings};
use crate::metadata::Track;
use crate::session::{SessionCache, SessionResponse};

use super::signature::sign;
use super::types::{
    ApiErrorBody, NowPlayingAck, NowPlayingResponse, ScrobbleAck, ScrobbleResponse, TokenResponse,
};
use super::{NowPlayingNotifier, RemoteError, ScrobbleSubmitter};

/// Signed client for the last.fm web service.
#[derive(Debug, Clone)]
pub struct LastFmClient {
    http: reqwest::Client,
    api_url: Url,
    auth_url: Url,
    credentials: Credentials,
    sessions: SessionCache,
}

impl LastFmClient {
    pub fn new(
        remote: &RemoteSettings,
        credentials: Credentials,
        sessions: SessionCache,
    ) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .timeout(remote.timeout())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_url: Url::parse(&remote.api_url)?,
            auth_url: Url::parse(&remote.auth_url)?,
            credentials,
            sessions,
        })
    }

    /// Fetch an unauthorised request token (`auth.getToken`).
    pub async fn get_token(&self) -> Result<String, RemoteError> {
        let params = self.signed(BTreeMap::from([("method", "auth.gettoken".to_string())]));
        let resp: TokenResponse = self.get(&params).await?;
        Ok(resp.token)
    }

    /// Exchange an authorised token for a session (`auth.getSession`).
    pub async fn get_session(&self, token: &str) -> Result<SessionResponse, RemoteError> {
        let params = self.signed(BTreeMap::from([
            ("method", "auth.getsession".to_string()),
            ("token", token.to_string()),
        ]));
        self.get(&params).await
    }

    /// Page where the user grants this application access for `token`.
    pub fn authorize_url(&self, token: &str) -> Url {
        let mut url = self.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("api_key", &self.credentials.api_key)
            .append_pair("token", token);
        url
    }

    fn signed<'a>(&self, mut params: BTreeMap<&'a str, String>) -> BTreeMap<&'a str, String> {
        params.insert("format", "json".to_string());
        params.insert("api_key", self.credentials.api_key.clone());
        let sig = sign(&params, &self.credentials.shared_secret);
        params.insert("api_sig", sig);
        params
    }

    async fn get<T: DeserializeOwned>(&self, params: &BTreeMap<&str, String>) -> Result<T, RemoteError> {
        let response = self
            .http
            .get(self.api_url.clone())
            .query(params)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        decode(status, &body)
    }

    async fn post_track<T: DeserializeOwned>(
        &self,
        method: &'static str,
        track: &Track,
    ) -> Result<T, RemoteError> {
        let session = self.sessions.read()?;

        let mut params: BTreeMap<&str, String> = track.form_fields().into_iter().collect();
        params.insert("method", method.to_string());
        params.insert("sk", session.session.key);
        let params = self.signed(params);

        let response = self
            .http
            .post(self.api_url.clone())
            .form(&params)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        decode(status, &body)
    }
}

/// Turn a raw response into `T`, or into the structured error last.fm
/// reports alongside any 4xx/5xx status.
pub(super) fn decode<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T, RemoteError> {
    if status >= 400 {
        let err: ApiErrorBody = serde_json::from_slice(body)?;
        return Err(RemoteError::Api {
            code: err.error,
            message: err.message,
        });
    }
    Ok(serde_json::from_slice(body)?)
}

#[async_trait]
impl NowPlayingNotifier for LastFmClient {
    async fn update_now_playing(&self, track: &Track) -> Result<NowPlayingAck, RemoteError> {
        let resp: NowPlayingResponse = self.post_track("track.updateNowPlaying", track).await?;
        Ok(resp.into())
    }
}

#[async_trait]
impl ScrobbleSubmitter for LastFmClient {
    async fn scrobble(&self, track: &Track) -> Result<ScrobbleAck, RemoteError> {
        let resp: ScrobbleResponse = self.post_track("track.scrobble", track).await?;
        Ok(resp.into())
    }
}
