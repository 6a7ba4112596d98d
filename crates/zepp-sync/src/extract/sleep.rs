//! Sleep data extraction
//!
//! A day's `slp` envelope yields one nightly summary record, one record
//! per recorded sleep stage, per-minute tracker records across each stage,
//! and a trailing rollup with per-stage counters.

use std::collections::BTreeMap;

use chrono::{Local, TimeZone};

use crate::error::{Result, ZeppError};
use crate::extract::{clock, tracker_span};
use crate::models::{Record, SleepSummary};

/// Map a sleep stage mode code to its label, with a visible fallback for
/// codes we do not know about.
pub fn stage_label(mode: i64) -> String {
    match mode {
        4 => "light_sleep".to_string(),
        5 => "deep_sleep".to_string(),
        7 => "awake".to_string(),
        8 => "REM".to_string(),
        _ => format!("unknown_{mode}"),
    }
}

/// Render an epoch-second instant the way it should appear in the
/// `slept_from`/`slept_to` fields
fn format_instant(epoch: i64) -> Result<String> {
    Local
        .timestamp_opt(epoch, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .ok_or_else(|| ZeppError::malformed_date(format!("epoch {epoch} out of range")))
}

pub fn extract(slp: &SleepSummary, anchor_epoch: i64, day: &str) -> Result<Vec<Record>> {
    let mut records = vec![Record::at_epoch(anchor_epoch)
        .tag("activity_type", "sleep")
        .field("total_sleep_min", slp.lt + slp.dp)
        .field("deep_sleep_min", slp.dp)
        .field("rem_sleep_min", slp.lt)
        .field("slept_from", format_instant(slp.st)?)
        .field("slept_to", format_instant(slp.ed)?)];

    let mut counters: BTreeMap<String, i64> = BTreeMap::new();
    for stage in &slp.stage {
        let label = stage_label(stage.mode);
        let start_epoch = clock::minute_to_epoch(stage.start, day)?;

        records.push(
            Record::at_epoch(start_epoch)
                .tag("activity_type", "sleep_stage")
                .tag("sleep_type", label.clone())
                .field("total_sleep_min", (stage.stop - stage.start).max(0)),
        );

        *counters.entry(label.clone()).or_insert(0) += 1;

        for minute_epoch in tracker_span(stage.start, stage.stop, day)? {
            records.push(
                Record::at_epoch(minute_epoch)
                    .tag("activity_type", "sleep_stage_tracker")
                    .field("current_sleep_state", label.as_str())
                    .field("current_sleep_state_int", stage.mode),
            );
        }
    }

    let mut rollup = Record::at_epoch(anchor_epoch)
        .field("recorded_sleep_stages", slp.stage.len() as i64);
    for (label, count) in counters {
        rollup = rollup.field(format!("recorded_sleep_{label}_events"), count);
    }
    records.push(rollup);

    Ok(records)
}
