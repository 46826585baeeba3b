use chrono::{DateTime, Local};

/// Convert the stored UNIX timestamp back to the local time.
pub fn from_secs(secs: i64) -> rusqlite::Result<DateTime<Local>> {
    DateTime::from_timestamp(secs, 0)
        .map(|timestamp| timestamp.with_timezone(&Local))
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(0, secs))
}
