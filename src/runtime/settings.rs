use crate::config;

/// Load and validate settings. Unlike a missing optional file, settings the
/// daemon cannot run with are a startup error.
pub fn load_settings() -> Result<config::Settings, Box<dyn std::error::Error>> {
    let settings =
        config::Settings::load().map_err(|e| format!("failed to load config: {e}"))?;
    settings
        .validate()
        .map_err(|msg| format!("invalid config: {msg}"))?;
    Ok(settings)
}
