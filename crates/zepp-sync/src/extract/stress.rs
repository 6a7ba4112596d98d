//! Stress data extraction
//!
//! Each stress event is a daily rollup; when the band took regular reads
//! through the day they arrive as a JSON-encoded point list in `data`.

use crate::error::Result;
use crate::models::{Record, StressEvent, StressPoint};

pub fn extract(events: &[StressEvent]) -> Result<Vec<Record>> {
    let mut records = Vec::new();

    for stress in events {
        records.push(
            Record::at_millis(stress.timestamp)
                .tag("stress", "daily")
                .field("minimum_stress_level", stress.min_stress)
                .field("max_stress_level", stress.max_stress)
                .field("mean_stress_level", stress.avg_stress)
                .field("relaxed_time_perc", stress.relax_proportion)
                .field("normal_stress_time_perc", stress.normal_proportion)
                .field("medium_stress_time_perc", stress.medium_proportion)
                .field("high_stress_time_perc", stress.high_proportion),
        );

        if let Some(data) = &stress.data {
            let points: Vec<StressPoint> = serde_json::from_str(data)?;
            for point in points {
                records.push(
                    Record::at_millis(point.time)
                        .tag("stress", "point_in_time")
                        .field("current_stress_level", point.value),
                );
            }
        }
    }

    Ok(records)
}
