//! Data models for the events API (stress, blood oxygen, PAI)
//!
//! The events endpoint is loose with scalar types: timestamps and readings
//! arrive as JSON numbers on some accounts and as numeric strings on others,
//! and the `extra`/`data` fields are JSON documents encoded as strings. The
//! deserializers here accept both forms so extraction code downstream only
//! ever sees proper numbers.

use serde::de::{Deserializer, Error as DeError};
use serde::Deserialize;

/// Generic events response; a body without `items` means "no data",
/// not an error.
#[derive(Debug, Deserialize)]
pub struct EventsResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// Accept a JSON number or a numeric string as i64
pub fn flexible_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    value_as_i64(&value).ok_or_else(|| DeError::custom(format!("expected an integer, got {value}")))
}

/// Accept a JSON number or a numeric string as f64
pub fn flexible_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    value_as_f64(&value).ok_or_else(|| DeError::custom(format!("expected a number, got {value}")))
}

pub(crate) fn value_as_i64(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_as_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Daily stress event
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StressEvent {
    /// Epoch milliseconds
    #[serde(deserialize_with = "flexible_i64")]
    pub timestamp: i64,

    #[serde(deserialize_with = "flexible_i64")]
    pub min_stress: i64,

    #[serde(deserialize_with = "flexible_i64")]
    pub max_stress: i64,

    #[serde(deserialize_with = "flexible_i64")]
    pub avg_stress: i64,

    #[serde(deserialize_with = "flexible_i64")]
    pub relax_proportion: i64,

    #[serde(deserialize_with = "flexible_i64")]
    pub normal_proportion: i64,

    #[serde(deserialize_with = "flexible_i64")]
    pub medium_proportion: i64,

    #[serde(deserialize_with = "flexible_i64")]
    pub high_proportion: i64,

    /// Point-in-time reads, JSON-encoded as a string
    #[serde(default)]
    pub data: Option<String>,
}

/// One point-in-time stress read inside `StressEvent::data`
#[derive(Debug, Clone, Deserialize)]
pub struct StressPoint {
    /// Epoch milliseconds
    #[serde(deserialize_with = "flexible_i64")]
    pub time: i64,

    #[serde(deserialize_with = "flexible_i64")]
    pub value: i64,
}

/// Blood oxygen event; the meaning of the payload depends on `sub_type`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodOxygenEvent {
    pub sub_type: String,

    /// Epoch milliseconds
    #[serde(deserialize_with = "flexible_i64")]
    pub timestamp: i64,

    /// Oxygen desaturation index, present on `odi` events
    #[serde(default)]
    pub odi: Option<f64>,

    #[serde(default)]
    pub score: Option<f64>,

    /// Nested JSON document, present on `osa_event` and `click` events
    #[serde(default)]
    pub extra: Option<String>,
}

/// `extra` payload of an `osa_event`
#[derive(Debug, Clone, Deserialize)]
pub struct OsaExtra {
    #[serde(deserialize_with = "flexible_f64")]
    pub spo2_decrease: f64,
}

/// `extra` payload of a `click` (manual read) event
#[derive(Debug, Clone, Deserialize)]
pub struct ClickExtra {
    #[serde(deserialize_with = "flexible_f64")]
    pub spo2: f64,
}

/// Daily PAI (Personal Activity Intelligence) scoring event
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaiEvent {
    /// Epoch milliseconds
    #[serde(deserialize_with = "flexible_i64")]
    pub timestamp: i64,

    #[serde(deserialize_with = "flexible_i64")]
    pub max_hr: i64,

    #[serde(deserialize_with = "flexible_i64")]
    pub rest_hr: i64,

    #[serde(deserialize_with = "flexible_i64")]
    pub low_zone_minutes: i64,

    #[serde(deserialize_with = "flexible_i64")]
    pub low_zone_lower_limit: i64,

    #[serde(deserialize_with = "flexible_f64")]
    pub low_zone_pai: f64,

    #[serde(deserialize_with = "flexible_i64")]
    pub medium_zone_minutes: i64,

    #[serde(deserialize_with = "flexible_i64")]
    pub medium_zone_lower_limit: i64,

    #[serde(deserialize_with = "flexible_f64")]
    pub medium_zone_pai: f64,

    #[serde(deserialize_with = "flexible_i64")]
    pub high_zone_minutes: i64,

    #[serde(deserialize_with = "flexible_i64")]
    pub high_zone_lower_limit: i64,

    #[serde(deserialize_with = "flexible_f64")]
    pub high_zone_pai: f64,

    #[serde(default)]
    pub activity_scores: Vec<serde_json::Value>,

    #[serde(deserialize_with = "flexible_f64")]
    pub daily_pai: f64,

    #[serde(deserialize_with = "flexible_f64")]
    pub total_pai: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stress_event_with_string_numbers() {
        let json = serde_json::json!({
            "timestamp": "1685658000000",
            "minStress": 12, "maxStress": "88", "avgStress": 34,
            "relaxProportion": 40, "normalProportion": 35,
            "mediumProportion": 20, "highProportion": 5,
            "data": "[{\"time\": 1685658000000, \"value\": 31}]"
        });
        let event: StressEvent = serde_json::from_value(json).unwrap();
        assert_eq!(event.timestamp, 1_685_658_000_000);
        assert_eq!(event.max_stress, 88);

        let points: Vec<StressPoint> = serde_json::from_str(event.data.as_deref().unwrap()).unwrap();
        assert_eq!(points[0].value, 31);
    }

    #[test]
    fn test_events_response_without_items() {
        let response: EventsResponse<StressEvent> = serde_json::from_str("{}").unwrap();
        assert!(response.items.is_empty());
    }

    #[test]
    fn test_blood_oxygen_event_shapes() {
        let odi: BloodOxygenEvent = serde_json::from_value(serde_json::json!({
            "subType": "odi", "timestamp": 1685658000000i64, "odi": 2.4, "score": 91.0
        }))
        .unwrap();
        assert_eq!(odi.sub_type, "odi");
        assert_eq!(odi.odi, Some(2.4));

        let click: BloodOxygenEvent = serde_json::from_value(serde_json::json!({
            "subType": "click", "timestamp": 1685658000000i64,
            "extra": "{\"spo2\": \"97\"}"
        }))
        .unwrap();
        let extra: ClickExtra = serde_json::from_str(click.extra.as_deref().unwrap()).unwrap();
        assert_eq!(extra.spo2, 97.0);
    }

    #[test]
    fn test_pai_event() {
        let json = serde_json::json!({
            "timestamp": 1685658000000i64,
            "maxHr": 152, "restHr": 58,
            "lowZoneMinutes": 30, "lowZoneLowerLimit": 97, "lowZonePai": 2.5,
            "mediumZoneMinutes": 12, "mediumZoneLowerLimit": 116, "mediumZonePai": 5.0,
            "highZoneMinutes": 3, "highZoneLowerLimit": 136, "highZonePai": 2.0,
            "activityScores": [{}, {}],
            "dailyPai": 9.5, "totalPai": "73.2"
        });
        let event: PaiEvent = serde_json::from_value(json).unwrap();
        assert_eq!(event.activity_scores.len(), 2);
        assert_eq!(event.total_pai, 73.2);
    }

    #[test]
    fn test_flexible_i64_rejects_non_numeric() {
        let json = serde_json::json!({"time": "noon", "value": 3});
        let result: Result<StressPoint, _> = serde_json::from_value(json);
        assert!(result.is_err());
    }
}
