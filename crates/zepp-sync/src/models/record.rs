//! Normalized output records
//!
//! Every decoder and extractor in the pipeline produces `Record` values:
//! a nanosecond timestamp, a set of tags, and at least one field. The sink
//! maps them onto InfluxDB points; the measurement name is applied there.

use std::collections::BTreeMap;

/// A single field value. InfluxDB distinguishes integer, float and string
/// fields, so the distinction is preserved all the way through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// A normalized, timestamped record ready for the sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Epoch nanoseconds
    pub timestamp_ns: i64,
    pub tags: BTreeMap<String, String>,
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Start a record at an epoch-second timestamp
    pub fn at_epoch(seconds: i64) -> Self {
        Self::at_nanos(seconds * 1_000_000_000)
    }

    /// Start a record at an epoch-millisecond timestamp (events API granularity)
    pub fn at_millis(millis: i64) -> Self {
        Self::at_nanos(millis * 1_000_000)
    }

    /// Start a record at an epoch-nanosecond timestamp
    pub fn at_nanos(nanos: i64) -> Self {
        Self {
            timestamp_ns: nanos,
            tags: BTreeMap::new(),
            fields: BTreeMap::new(),
        }
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_conversions() {
        assert_eq!(Record::at_epoch(5).timestamp_ns, 5_000_000_000);
        assert_eq!(Record::at_millis(1500).timestamp_ns, 1_500_000_000);
        assert_eq!(Record::at_nanos(42).timestamp_ns, 42);
    }

    #[test]
    fn test_builder() {
        let record = Record::at_epoch(60)
            .tag("activity_type", "steps")
            .field("total_steps", 500)
            .field("pai_score", 1.5)
            .field("slept_from", "2023-06-01 23:10:00");

        assert_eq!(
            record.tags.get("activity_type"),
            Some(&"steps".to_string())
        );
        assert_eq!(record.fields.get("total_steps"), Some(&FieldValue::Int(500)));
        assert_eq!(record.fields.get("pai_score"), Some(&FieldValue::Float(1.5)));
        assert_eq!(
            record.fields.get("slept_from"),
            Some(&FieldValue::Text("2023-06-01 23:10:00".to_string()))
        );
    }

    #[test]
    fn test_later_field_wins() {
        let record = Record::at_epoch(0)
            .field("heart_rate", 60)
            .field("heart_rate", 61);
        assert_eq!(record.fields.get("heart_rate"), Some(&FieldValue::Int(61)));
        assert_eq!(record.fields.len(), 1);
    }
}
