//! Decoding and normalization pipeline
//!
//! Turns the raw band-data and events payloads into normalized records.
//! The day reconciler below owns the envelope dispatch and the
//! closed-day/open-day timestamp policy; the per-metric extractors live in
//! their own modules.

pub mod blood_oxygen;
pub mod clock;
pub mod heart_rate;
pub mod pai;
pub mod sleep;
pub mod steps;
pub mod stress;

use chrono::{DateTime, Local};
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::events::value_as_i64;
use crate::models::{BandDay, Record, SleepSummary, StepSummary};

/// Serial number used when no day in the window carried one
pub const DEFAULT_SERIAL: &str = "unknown";

/// Upper bound on per-minute tracker expansion for a single interval
const TRACKER_MINUTES_CAP: i64 = 24 * 60;

/// Epoch seconds for each minute of the closed interval [start, stop],
/// at 60-second spacing. An inverted interval yields no points; an
/// interval longer than a day is capped rather than expanded unbounded.
pub(crate) fn tracker_span(start: i64, stop: i64, day: &str) -> Result<Vec<i64>> {
    if stop < start {
        return Ok(Vec::new());
    }
    let start_epoch = clock::minute_to_epoch(start, day)?;
    let minutes = (stop - start).min(TRACKER_MINUTES_CAP);
    Ok((0..=minutes).map(|m| start_epoch + m * 60).collect())
}

/// Walk every day in the band-data response: decode the heart-rate blob
/// and the summary envelope, dispatch envelope keys to their extractors,
/// and resolve each day's anchor timestamp.
///
/// Days strictly before `now`'s calendar date anchor at 23:59:59 local
/// time so re-runs land on the same point; the in-progress day anchors at
/// `now` itself. `now` is injected rather than read here so the policy is
/// testable.
///
/// Returns the accumulated records plus the device serial number (last
/// non-empty `sn` value wins, `"unknown"` if absent everywhere).
pub fn reconcile_days(days: &[BandDay], now: DateTime<Local>) -> Result<(Vec<Record>, String)> {
    let today = now.date_naive();
    let mut records = Vec::new();
    let mut serial = DEFAULT_SERIAL.to_string();

    for day in days {
        let date = clock::parse_day(&day.date_time)?;
        let anchor_epoch = if date < today {
            // Closed day: a stable end-of-day anchor keeps re-runs idempotent
            let end_of_day = date
                .and_hms_opt(23, 59, 59)
                .expect("23:59:59 is a valid time of day");
            clock::local_epoch(end_of_day)?
        } else {
            now.timestamp()
        };

        if let Some(blob) = day.decode_heart_rate_blob()? {
            debug!(day = %day.date_time, bytes = blob.len(), "decoding heart rate blob");
            let midnight = clock::minute_to_epoch(0, &day.date_time)?;
            records.extend(heart_rate::decode(&blob, midnight));
        }

        for (key, value) in day.decode_summary()? {
            match key.as_str() {
                "stp" => {
                    let stp: StepSummary = serde_json::from_value(value)?;
                    records.extend(steps::extract(&stp, anchor_epoch, &day.date_time)?);
                }
                "slp" => {
                    let slp: SleepSummary = serde_json::from_value(value)?;
                    records.extend(sleep::extract(&slp, anchor_epoch, &day.date_time)?);
                }
                "goal" => match value_as_i64(&value) {
                    Some(goal) => {
                        records.push(Record::at_epoch(anchor_epoch).field("step_goal", goal));
                    }
                    None => warn!(day = %day.date_time, %value, "unusable step goal"),
                },
                "sync" => match value_as_i64(&value) {
                    Some(sync) => {
                        records.push(Record::at_epoch(anchor_epoch).field("last_sync", sync));
                    }
                    None => warn!(day = %day.date_time, %value, "unusable sync timestamp"),
                },
                "sn" => {
                    if let Some(sn) = value.as_str().filter(|s| !s.is_empty()) {
                        serial = sn.to_string();
                    }
                }
                other => debug!(day = %day.date_time, key = other, "skipping summary key"),
            }
        }
    }

    Ok((records, serial))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldValue;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use chrono::{Duration, TimeZone};

    fn band_day(date: &str, summary: serde_json::Value) -> BandDay {
        BandDay {
            date_time: date.to_string(),
            summary: STANDARD.encode(summary.to_string()),
            data_hr: None,
        }
    }

    fn local_now(date: &str, hour: u32) -> DateTime<Local> {
        let naive = clock::parse_day(date)
            .unwrap()
            .and_hms_opt(hour, 30, 0)
            .unwrap();
        Local.from_local_datetime(&naive).earliest().unwrap()
    }

    #[test]
    fn test_closed_day_anchors_at_end_of_day() {
        let day = band_day("2023-06-01", serde_json::json!({"goal": 8000}));
        let now = local_now("2023-06-03", 9);

        let (records, _) = reconcile_days(&[day.clone()], now).unwrap();
        let expected = clock::local_epoch(
            clock::parse_day("2023-06-01")
                .unwrap()
                .and_hms_opt(23, 59, 59)
                .unwrap(),
        )
        .unwrap();
        assert_eq!(records[0].timestamp_ns, expected * 1_000_000_000);

        // Idempotent under re-run at a later instant
        let later = local_now("2023-06-04", 22);
        let (rerun, _) = reconcile_days(&[day], later).unwrap();
        assert_eq!(rerun[0].timestamp_ns, records[0].timestamp_ns);
    }

    #[test]
    fn test_open_day_anchors_at_now() {
        let day = band_day("2023-06-03", serde_json::json!({"goal": 8000}));

        let morning = local_now("2023-06-03", 9);
        let (am_records, _) = reconcile_days(&[day.clone()], morning).unwrap();
        assert_eq!(
            am_records[0].timestamp_ns,
            morning.timestamp() * 1_000_000_000
        );

        let evening = morning + Duration::hours(8);
        let (pm_records, _) = reconcile_days(&[day], evening).unwrap();
        assert!(pm_records[0].timestamp_ns > am_records[0].timestamp_ns);
    }

    #[test]
    fn test_serial_last_non_empty_wins() {
        let days = vec![
            band_day("2023-06-01", serde_json::json!({"goal": 8000})),
            band_day("2023-06-02", serde_json::json!({"sn": "ABC123", "goal": 8000})),
            band_day("2023-06-03", serde_json::json!({"sn": "", "goal": 8000})),
        ];

        let (_, serial) = reconcile_days(&days, local_now("2023-06-03", 12)).unwrap();
        assert_eq!(serial, "ABC123");
    }

    #[test]
    fn test_serial_defaults_to_unknown() {
        let days = vec![band_day("2023-06-01", serde_json::json!({"goal": 8000}))];
        let (_, serial) = reconcile_days(&days, local_now("2023-06-02", 12)).unwrap();
        assert_eq!(serial, DEFAULT_SERIAL);
    }

    #[test]
    fn test_unknown_envelope_keys_skipped() {
        let day = band_day(
            "2023-06-01",
            serde_json::json!({"goal": 8000, "tz": "28800", "v": 6}),
        );
        let (records, _) = reconcile_days(&[day], local_now("2023-06-02", 12)).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fields["step_goal"], FieldValue::Int(8000));
    }

    #[test]
    fn test_goal_and_sync_accept_numeric_strings() {
        let day = band_day(
            "2023-06-01",
            serde_json::json!({"goal": "8000", "sync": "1685657400"}),
        );
        let (records, _) = reconcile_days(&[day], local_now("2023-06-02", 12)).unwrap();

        assert_eq!(records.len(), 2);
        let fields: Vec<_> = records.iter().flat_map(|r| r.fields.keys()).collect();
        assert!(fields.contains(&&"step_goal".to_string()));
        assert!(fields.contains(&&"last_sync".to_string()));
    }

    #[test]
    fn test_heart_rate_blob_flows_into_records() {
        let mut day = band_day("2023-06-01", serde_json::json!({}));
        day.data_hr = Some(STANDARD.encode([0u8, 72, 0, 210, 0, 68]));

        let (records, _) = reconcile_days(&[day], local_now("2023-06-02", 12)).unwrap();
        assert_eq!(records.len(), 2);

        let midnight = clock::minute_to_epoch(0, "2023-06-01").unwrap();
        assert_eq!(records[0].timestamp_ns, (midnight + 60) * 1_000_000_000);
        assert_eq!(records[0].fields["heart_rate"], FieldValue::Int(72));
        assert_eq!(records[1].timestamp_ns, (midnight + 180) * 1_000_000_000);
    }

    #[test]
    fn test_malformed_date_is_fatal_here() {
        let day = band_day("06/01/2023", serde_json::json!({"goal": 1}));
        let result = reconcile_days(&[day], local_now("2023-06-02", 12));
        assert!(matches!(
            result,
            Err(crate::error::ZeppError::MalformedDate(_))
        ));
    }

    #[test]
    fn test_tracker_span_bounds() {
        let day = "2023-06-01";
        assert_eq!(tracker_span(10, 9, day).unwrap().len(), 0);
        assert_eq!(tracker_span(10, 10, day).unwrap().len(), 1);
        assert_eq!(tracker_span(0, 10, day).unwrap().len(), 11);
        // Malformed giant interval is capped at one day of minutes
        assert_eq!(
            tracker_span(0, 1_000_000, day).unwrap().len() as i64,
            TRACKER_MINUTES_CAP + 1
        );
    }
}
