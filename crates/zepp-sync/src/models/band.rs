//! Data models for the band-data API
//!
//! One `BandDay` per calendar day in the queried window. The `summary`
//! field carries a base64-encoded JSON envelope whose keys (`stp`, `slp`,
//! `goal`, `sn`, `sync`, ...) are dispatched by the day reconciler; the
//! optional `data_hr` field carries the packed heart-rate blob.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;

use crate::error::Result;

/// Top-level band-data response
#[derive(Debug, Deserialize)]
pub struct BandDataResponse {
    #[serde(default)]
    pub data: Vec<BandDay>,
}

/// One day's worth of band data
#[derive(Debug, Clone, Deserialize)]
pub struct BandDay {
    /// Calendar day, "YYYY-MM-DD"
    pub date_time: String,

    /// Base64-encoded JSON envelope with per-metric summaries
    pub summary: String,

    /// Base64-encoded packed heart-rate samples, when the band recorded any
    #[serde(default)]
    pub data_hr: Option<String>,
}

impl BandDay {
    /// Decode the summary envelope into its JSON object form
    pub fn decode_summary(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        let raw = STANDARD.decode(&self.summary)?;
        let value: serde_json::Value = serde_json::from_slice(&raw)?;
        match value {
            serde_json::Value::Object(map) => Ok(map),
            other => Err(crate::error::ZeppError::invalid_response(format!(
                "summary envelope is not a JSON object: {}",
                other
            ))),
        }
    }

    /// Decode the heart-rate blob, if present
    pub fn decode_heart_rate_blob(&self) -> Result<Option<Vec<u8>>> {
        match &self.data_hr {
            Some(blob) => Ok(Some(STANDARD.decode(blob)?)),
            None => Ok(None),
        }
    }
}

/// Step summary (`stp` envelope key)
#[derive(Debug, Clone, Deserialize)]
pub struct StepSummary {
    /// Total steps for the day
    pub ttl: i64,

    /// Calories burned
    pub cal: i64,

    /// Distance covered in metres
    pub dis: i64,

    /// Recorded activity intervals, when any
    #[serde(default)]
    pub stage: Vec<ActivityStage>,
}

/// One activity interval within a day
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityStage {
    /// Activity mode code (1 slow walking, 3 fast walking, 4 running,
    /// 7 light activity)
    pub mode: i64,

    /// Start, minutes past midnight
    pub start: i64,

    /// Stop, minutes past midnight
    pub stop: i64,

    /// Steps taken during the interval
    #[serde(default)]
    pub step: i64,

    /// Calories burned during the interval
    #[serde(default)]
    pub cal: i64,
}

/// Sleep summary (`slp` envelope key)
#[derive(Debug, Clone, Deserialize)]
pub struct SleepSummary {
    /// Light sleep minutes
    pub lt: i64,

    /// Deep sleep minutes
    pub dp: i64,

    /// Fell asleep, epoch seconds
    pub st: i64,

    /// Woke up, epoch seconds
    pub ed: i64,

    /// Recorded sleep stages, when any
    #[serde(default)]
    pub stage: Vec<SleepStage>,
}

/// One sleep stage interval within a night
#[derive(Debug, Clone, Deserialize)]
pub struct SleepStage {
    /// Stage mode code (4 light, 5 deep, 7 awake, 8 REM)
    pub mode: i64,

    /// Start, minutes past midnight
    pub start: i64,

    /// Stop, minutes past midnight
    pub stop: i64,
}
