pub type DbagDateTime = hifitime::Epoch;
use anyhow::{Context, Result};
use hifitime::{UNIX_REF_EPOCH, Unit};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub trait DbagDateTimeExt: Sized {
    fn from_unix_microseconds_i64(timestamp: i64) -> Self;
    fn to_unix_microseconds_i64(&self) -> i64;
    fn now_utc() -> Result<Self>;
}

impl DbagDateTimeExt for DbagDateTime {
    fn from_unix_microseconds_i64(timestamp: i64) -> Self {
        Self::from_utc_duration(UNIX_REF_EPOCH.to_utc_duration() + timestamp * Unit::Microsecond)
    }

    fn to_unix_microseconds_i64(&self) -> i64 {
        let since_unix = self.to_utc_duration() - UNIX_REF_EPOCH.to_utc_duration();
        (since_unix.total_nanoseconds() / 1_000) as i64
    }

    fn now_utc() -> Result<Self> {
        DbagDateTime::now().context("Failed to read the system clock")
    }
}

/// Formats a datetime as RFC 3339, with microsecond precision.
pub fn to_rfc3339(datetime: &DbagDateTime) -> Result<String> {
    let nanos = datetime.to_unix_microseconds_i64() as i128 * 1_000;
    let offset_datetime = OffsetDateTime::from_unix_timestamp_nanos(nanos)?;
    Ok(offset_datetime.format(&Rfc3339)?)
}
