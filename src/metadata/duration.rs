use std::time::Duration;

use super::ResolveError;

/// Parse minidlna's `DETAILS.DURATION` column, e.g. `0:03:20.000`.
pub fn parse_db_duration(raw: &str) -> Result<Duration, ResolveError> {
    let invalid = || ResolveError::InvalidDuration(raw.to_string());

    let mut parts = raw.split(':');
    let (Some(hours), Some(minutes), Some(seconds), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    let Some((secs, millis)) = seconds.split_once('.') else {
        return Err(invalid());
    };

    let number = |s: &str| s.parse::<u64>().map_err(|_| invalid());
    let scaled = |s: &str, factor: u64| -> Result<Duration, ResolveError> {
        number(s)?
            .checked_mul(factor)
            .map(Duration::from_secs)
            .ok_or_else(invalid)
    };

    [
        scaled(minutes, 60)?,
        scaled(secs, 1)?,
        Duration::from_millis(number(millis)?),
    ]
    .into_iter()
    .try_fold(scaled(hours, 3600)?, Duration::checked_add)
    .ok_or_else(invalid)
}
