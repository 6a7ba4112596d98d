//! Blood oxygen event extraction
//!
//! The events feed mixes three kinds of SpO2 readings, discriminated by
//! `subType`: nightly ODI scoring, possible obstructive-sleep-apnea events,
//! and manual reads triggered from the watch face.

use tracing::warn;

use crate::error::Result;
use crate::models::{BloodOxygenEvent, ClickExtra, OsaExtra, Record};

pub fn extract(events: &[BloodOxygenEvent]) -> Result<Vec<Record>> {
    let mut records = Vec::new();

    for event in events {
        match event.sub_type.as_str() {
            "odi" => records.push(
                Record::at_millis(event.timestamp)
                    .tag("blood_event", "odi")
                    .field("odi_read", event.odi.unwrap_or_default())
                    .field("score", event.score.unwrap_or_default()),
            ),
            "osa_event" => {
                let extra: OsaExtra = parse_extra(event)?;
                records.push(
                    Record::at_millis(event.timestamp)
                        .tag("blood_event", "osa")
                        .field("spo2_decrease", extra.spo2_decrease),
                );
            }
            "click" => {
                let extra: ClickExtra = parse_extra(event)?;
                records.push(
                    Record::at_millis(event.timestamp)
                        .tag("blood_event", "manual_read")
                        .field("spo2_level", extra.spo2),
                );
            }
            other => warn!(sub_type = other, "skipping unrecognized blood oxygen event"),
        }
    }

    Ok(records)
}

fn parse_extra<T: serde::de::DeserializeOwned>(event: &BloodOxygenEvent) -> Result<T> {
    let extra = event.extra.as_deref().unwrap_or("{}");
    Ok(serde_json::from_str(extra)?)
}
