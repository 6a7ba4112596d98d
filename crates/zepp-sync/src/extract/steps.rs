//! Step data extraction
//!
//! A day's `stp` envelope yields one daily summary record, one record per
//! recorded activity interval, per-minute tracker records across each
//! interval, and a trailing rollup with per-activity counters.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::extract::{clock, tracker_span};
use crate::models::{Record, StepSummary};

/// Map an activity mode code to its label. Codes the band firmware adds
/// later surface as `unknown_<mode>` rather than failing the run.
pub fn activity_label(mode: i64) -> String {
    match mode {
        1 => "slow_walking".to_string(),
        3 => "fast_walking".to_string(),
        4 => "running".to_string(),
        7 => "light_activity".to_string(),
        _ => format!("unknown_{mode}"),
    }
}

pub fn extract(stp: &StepSummary, anchor_epoch: i64, day: &str) -> Result<Vec<Record>> {
    let mut records = vec![Record::at_epoch(anchor_epoch)
        .tag("activity_type", "steps")
        .field("total_steps", stp.ttl)
        .field("calories", stp.cal)
        .field("distance_m", stp.dis)];

    let mut counters: BTreeMap<String, i64> = BTreeMap::new();
    for activity in &stp.stage {
        let label = activity_label(activity.mode);
        let start_epoch = clock::minute_to_epoch(activity.start, day)?;

        records.push(
            Record::at_epoch(start_epoch)
                .tag("activity_type", label.clone())
                .field("total_steps", activity.step)
                .field("calories", activity.cal)
                // The band only reports distance per day, not per interval
                .field("distance_m", stp.dis)
                .field("activity_duration_m", (activity.stop - activity.start).max(0)),
        );

        *counters.entry(label.clone()).or_insert(0) += 1;

        // A continuous "what was happening right now" series, one point
        // per minute of the interval
        for minute_epoch in tracker_span(activity.start, activity.stop, day)? {
            records.push(
                Record::at_epoch(minute_epoch)
                    .tag("activity_type", "activity_type_tracker")
                    .field("current_activity_type", label.as_str())
                    .field("current_activity_type_int", activity.mode),
            );
        }
    }

    let mut rollup = Record::at_epoch(anchor_epoch)
        .field("recorded_activities", stp.stage.len() as i64);
    for (label, count) in counters {
        rollup = rollup.field(format!("recorded_{label}_events"), count);
    }
    records.push(rollup);

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldValue;

    fn summary(json: serde_json::Value) -> StepSummary {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_extract_with_one_interval() {
        let stp = summary(serde_json::json!({
            "ttl": 500, "cal": 20, "dis": 300,
            "stage": [{"mode": 1, "start": 0, "stop": 10, "step": 50, "cal": 2}]
        }));

        let records = extract(&stp, 1_685_663_999, "2023-06-01").unwrap();

        // summary + interval + 11 tracker minutes (0..=10) + rollup
        assert_eq!(records.len(), 1 + 1 + 11 + 1);

        let summary_record = &records[0];
        assert_eq!(summary_record.tags["activity_type"], "steps");
        assert_eq!(summary_record.fields["total_steps"], FieldValue::Int(500));
        assert_eq!(summary_record.fields["calories"], FieldValue::Int(20));
        assert_eq!(summary_record.fields["distance_m"], FieldValue::Int(300));

        let interval = &records[1];
        assert_eq!(interval.tags["activity_type"], "slow_walking");
        assert_eq!(interval.fields["activity_duration_m"], FieldValue::Int(10));
        assert_eq!(interval.fields["total_steps"], FieldValue::Int(50));
        assert_eq!(interval.fields["distance_m"], FieldValue::Int(300));

        let trackers: Vec<_> = records
            .iter()
            .filter(|r| r.tags.get("activity_type").map(String::as_str) == Some("activity_type_tracker"))
            .collect();
        assert_eq!(trackers.len(), 11);
        assert_eq!(
            trackers[0].fields["current_activity_type"],
            FieldValue::Text("slow_walking".to_string())
        );
        assert_eq!(
            trackers[0].fields["current_activity_type_int"],
            FieldValue::Int(1)
        );
        assert_eq!(
            trackers[1].timestamp_ns - trackers[0].timestamp_ns,
            60 * 1_000_000_000
        );

        let rollup = records.last().unwrap();
        assert_eq!(rollup.fields["recorded_activities"], FieldValue::Int(1));
        assert_eq!(
            rollup.fields["recorded_slow_walking_events"],
            FieldValue::Int(1)
        );
    }

    #[test]
    fn test_unknown_mode_gets_fallback_label() {
        let stp = summary(serde_json::json!({
            "ttl": 10, "cal": 1, "dis": 5,
            "stage": [{"mode": 99, "start": 5, "stop": 6, "step": 4, "cal": 0}]
        }));

        let records = extract(&stp, 0, "2023-06-01").unwrap();
        assert_eq!(records[1].tags["activity_type"], "unknown_99");
        assert_eq!(
            records.last().unwrap().fields["recorded_unknown_99_events"],
            FieldValue::Int(1)
        );
    }

    #[test]
    fn test_inverted_interval_yields_no_trackers() {
        let stp = summary(serde_json::json!({
            "ttl": 10, "cal": 1, "dis": 5,
            "stage": [{"mode": 1, "start": 100, "stop": 40, "step": 4, "cal": 0}]
        }));

        let records = extract(&stp, 0, "2023-06-01").unwrap();
        // summary + interval + rollup, zero tracker records
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].fields["activity_duration_m"], FieldValue::Int(0));
    }

    #[test]
    fn test_no_stages() {
        let stp = summary(serde_json::json!({"ttl": 12, "cal": 1, "dis": 9}));
        let records = extract(&stp, 0, "2023-06-01").unwrap();

        assert_eq!(records.len(), 2);
        let rollup = records.last().unwrap();
        assert_eq!(rollup.fields["recorded_activities"], FieldValue::Int(0));
        assert_eq!(rollup.fields.len(), 1);
    }

    #[test]
    fn test_counters_accumulate_per_label() {
        let stp = summary(serde_json::json!({
            "ttl": 10, "cal": 1, "dis": 5,
            "stage": [
                {"mode": 4, "start": 10, "stop": 11, "step": 100, "cal": 4},
                {"mode": 4, "start": 30, "stop": 31, "step": 110, "cal": 4},
                {"mode": 7, "start": 50, "stop": 51, "step": 12, "cal": 1}
            ]
        }));

        let records = extract(&stp, 0, "2023-06-01").unwrap();
        let rollup = records.last().unwrap();
        assert_eq!(rollup.fields["recorded_activities"], FieldValue::Int(3));
        assert_eq!(rollup.fields["recorded_running_events"], FieldValue::Int(2));
        assert_eq!(
            rollup.fields["recorded_light_activity_events"],
            FieldValue::Int(1)
        );
    }
}
