use std::error::Error;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::config::Settings;
use crate::lastfm::LastFmClient;
use crate::session::SessionCache;

/// Interactive authorisation: fetch a token, have the user grant access in a
/// browser, then trade the token for a session key and store it.
pub async fn run(settings: Settings) -> Result<(), Box<dyn Error>> {
    let sessions = SessionCache::from_settings(settings.session.cache_dir.as_deref());
    let client = LastFmClient::new(&settings.remote, settings.credentials.clone(), sessions.clone())?;

    let token = client.get_token().await?;
    println!(
        "Open the following URL in your browser and allow access:\n\n    {}\n\nThen press RETURN.",
        client.authorize_url(&token)
    );

    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;

    let session = client.get_session(&token).await?;
    sessions.save(&session)?;
    info!(
        user = %session.session.name,
        path = %sessions.path().display(),
        "stored last.fm session"
    );
    println!("Authorised as {}.", session.session.name);
    Ok(())
}
