//! Environment configuration
//!
//! Everything is configured through environment variables so the binary
//! can run unattended from cron or a container scheduler. Credentials are
//! required up front; sink settings fall back to the defaults the
//! downstream dashboards expect.

use config::{Config as ConfigBuilder, Environment};
use serde::Deserialize;

use crate::error::{Result, ZeppError};

fn default_query_duration_days() -> u32 {
    2
}

fn default_sink_measurement() -> String {
    "zepp".to_string()
}

fn default_sink_bucket() -> String {
    "telegraf".to_string()
}

/// Run configuration, loaded from the environment
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Zepp account email (`API_EMAIL`)
    pub api_email: String,

    /// Zepp account password (`API_PASSWORD`)
    pub api_password: String,

    /// How many days of history to request (`QUERY_DURATION_DAYS`)
    #[serde(default = "default_query_duration_days")]
    pub query_duration_days: u32,

    /// InfluxDB base URL (`SINK_URL`); required only when actually writing
    #[serde(default)]
    pub sink_url: Option<String>,

    /// InfluxDB API token (`SINK_TOKEN`)
    #[serde(default)]
    pub sink_token: String,

    /// InfluxDB organization (`SINK_ORG`)
    #[serde(default)]
    pub sink_org: String,

    /// Measurement name for every written point (`SINK_MEASUREMENT`)
    #[serde(default = "default_sink_measurement")]
    pub sink_measurement: String,

    /// Destination bucket (`SINK_BUCKET`)
    #[serde(default = "default_sink_bucket")]
    pub sink_bucket: String,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        let config: Config = ConfigBuilder::builder()
            .add_source(Environment::default())
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ZeppError::config(e.to_string()))?;

        if config.api_email.is_empty() || config.api_password.is_empty() {
            return Err(ZeppError::config("credentials not provided"));
        }

        Ok(config)
    }
}
