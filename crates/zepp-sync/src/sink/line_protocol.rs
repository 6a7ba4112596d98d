//! InfluxDB v2 Line Protocol encoding
//!
//! Produces one protocol line per record; the HTTP layer above batches
//! and ships them. Escaping follows the v2 reference: commas and spaces
//! in measurements; commas, equals and spaces in tag/field keys and tag
//! values; quotes and backslashes in string field values.

use crate::models::{FieldValue, Record};

/// Encode a record as a line-protocol line, or `None` for a record with
/// no fields (which the protocol cannot represent).
pub fn encode_line(measurement: &str, record: &Record) -> Option<String> {
    if record.fields.is_empty() {
        return None;
    }

    let mut line = escape_measurement(measurement);

    for (key, value) in &record.tags {
        line.push(',');
        line.push_str(&escape_key(key));
        line.push('=');
        line.push_str(&escape_key(value));
    }

    line.push(' ');
    let fields: Vec<String> = record
        .fields
        .iter()
        .map(|(key, value)| format!("{}={}", escape_key(key), render_field(value)))
        .collect();
    line.push_str(&fields.join(","));

    line.push(' ');
    line.push_str(&record.timestamp_ns.to_string());

    Some(line)
}

fn render_field(value: &FieldValue) -> String {
    match value {
        FieldValue::Int(v) => format!("{v}i"),
        FieldValue::Float(v) => format!("{v}"),
        FieldValue::Text(v) => format!("\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\"")),
    }
}

fn escape_measurement(name: &str) -> String {
    name.replace(',', "\\,").replace(' ', "\\ ")
}

fn escape_key(name: &str) -> String {
    name.replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}
