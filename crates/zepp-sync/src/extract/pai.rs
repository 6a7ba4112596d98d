//! PAI (Personal Activity Intelligence) extraction
//!
//! Each daily PAI event expands to six records: max and resting heart
//! rates, one record per effort zone, and the daily score rollup.

use crate::models::{PaiEvent, Record};

pub fn extract(events: &[PaiEvent]) -> Vec<Record> {
    let mut records = Vec::new();

    for item in events {
        records.push(
            Record::at_millis(item.timestamp)
                .tag("PAI_measure", "daily")
                .tag("hr_measure", "PAI")
                .tag("hr_state", "max")
                .field("heart_rate", item.max_hr),
        );

        records.push(
            Record::at_millis(item.timestamp)
                .tag("PAI_measure", "daily")
                .tag("hr_measure", "PAI")
                .tag("hr_state", "resting")
                .field("heart_rate", item.rest_hr),
        );

        let zones = [
            ("low", item.low_zone_minutes, item.low_zone_lower_limit, item.low_zone_pai),
            ("medium", item.medium_zone_minutes, item.medium_zone_lower_limit, item.medium_zone_pai),
            ("high", item.high_zone_minutes, item.high_zone_lower_limit, item.high_zone_pai),
        ];
        for (bound, minutes, lower_limit, pai) in zones {
            records.push(
                Record::at_millis(item.timestamp)
                    .tag("PAI_measure", "daily")
                    .tag("PAI_bound", bound)
                    .field("activity_duration_m", minutes)
                    .field("pai_score_bound", lower_limit)
                    .field("pai_score", pai),
            );
        }

        records.push(
            Record::at_millis(item.timestamp)
                .tag("PAI_measure", "daily")
                .tag("PAI_bound", "daily")
                .field("scorable_activities", item.activity_scores.len() as i64)
                .field("pai_score", item.daily_pai)
                .field("total_pai", item.total_pai),
        );
    }

    records
}
