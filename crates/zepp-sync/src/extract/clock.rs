//! Minute-of-day codec
//!
//! The band reports intra-day positions as minutes past midnight. These
//! helpers turn a minute counter into a wall-clock label and into an
//! absolute local timestamp for a given calendar day.

use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone};

use crate::error::{Result, ZeppError};

/// Convert a minute counter to a human readable "HH:MM" label.
/// Counters past 1440 wrap around the clock face.
pub fn minutes_as_clock(minutes: i64) -> String {
    let minutes = minutes.rem_euclid(24 * 60);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Turn a count of minutes into the day plus a "YYYY-MM-DD" date into a
/// local-time epoch timestamp in seconds.
pub fn minute_to_epoch(minute: i64, day: &str) -> Result<i64> {
    let date = parse_day(day)?;
    let wrapped = minute.rem_euclid(24 * 60);
    let naive = date
        .and_hms_opt((wrapped / 60) as u32, (wrapped % 60) as u32, 0)
        .ok_or_else(|| ZeppError::malformed_date(format!("{day} {}", minutes_as_clock(minute))))?;
    local_epoch(naive)
}

/// Parse a "YYYY-MM-DD" day string
pub fn parse_day(day: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| ZeppError::malformed_date(format!("{day}: {e}")))
}

/// Resolve a naive local datetime to epoch seconds. Ambiguous instants
/// (clocks rolling back) take the earlier interpretation; nonexistent
/// instants (clocks skipping forward) are an error.
pub(crate) fn local_epoch(naive: NaiveDateTime) -> Result<i64> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp())
        .ok_or_else(|| ZeppError::malformed_date(format!("{naive} does not exist locally")))
}
