//! InfluxDB v2 sink
//!
//! Maps the run's normalized records onto line protocol and ships them to
//! the `/api/v2/write` endpoint in batches. The device serial number is
//! stamped onto every point here, as a `serial_num` tag, so extractors
//! never need to know it.

pub mod line_protocol;

use reqwest::Client;
use tracing::info;

use crate::config::Config;
use crate::error::{Result, ZeppError};
use crate::models::Record;

/// Lines shipped per write request
const BATCH_SIZE: usize = 5000;

/// Writer for an InfluxDB v2 compatible endpoint
pub struct InfluxSink {
    client: Client,
    url: String,
    token: String,
    org: String,
    measurement: String,
    bucket: String,
}

impl InfluxSink {
    /// Build a sink from the run configuration; fails when `SINK_URL`
    /// is not set
    pub fn from_config(config: &Config) -> Result<Self> {
        let url = config
            .sink_url
            .as_deref()
            .ok_or_else(|| ZeppError::config("SINK_URL not set"))?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(ZeppError::Http)?;

        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_string(),
            token: config.sink_token.clone(),
            org: config.sink_org.clone(),
            measurement: config.sink_measurement.clone(),
            bucket: config.sink_bucket.clone(),
        })
    }

    /// Write the whole record set, tagging every point with the device
    /// serial number. Points already written stay written if a later
    /// batch fails.
    pub async fn write(&self, records: &[Record], serial: &str) -> Result<()> {
        let lines: Vec<String> = records
            .iter()
            .filter_map(|record| {
                let tagged = record.clone().tag("serial_num", serial);
                line_protocol::encode_line(&self.measurement, &tagged)
            })
            .collect();

        info!(points = lines.len(), bucket = %self.bucket, "writing to sink");

        for batch in lines.chunks(BATCH_SIZE) {
            self.write_batch(batch).await?;
        }

        Ok(())
    }

    async fn write_batch(&self, lines: &[String]) -> Result<()> {
        let url = format!("{}/api/v2/write", self.url);

        let response = self
            .client
            .post(&url)
            .query(&[
                ("org", self.org.as_str()),
                ("bucket", self.bucket.as_str()),
                ("precision", "ns"),
            ])
            .header("Authorization", format!("Token {}", self.token))
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(lines.join("\n"))
            .send()
            .await
            .map_err(|e| ZeppError::sink_write(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ZeppError::sink_write(format!(
                "write rejected with {status}: {body}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_url(url: Option<&str>) -> Config {
        Config {
            api_email: "user@example.com".to_string(),
            api_password: "hunter2".to_string(),
            query_duration_days: 2,
            sink_url: url.map(String::from),
            sink_token: "tok".to_string(),
            sink_org: "home".to_string(),
            sink_measurement: "zepp".to_string(),
            sink_bucket: "telegraf".to_string(),
        }
    }

    #[test]
    fn test_from_config_requires_url() {
        let result = InfluxSink::from_config(&config_with_url(None));
        assert!(matches!(result, Err(ZeppError::Config(_))));
    }

    #[test]
    fn test_from_config_trims_trailing_slash() {
        let sink = InfluxSink::from_config(&config_with_url(Some("http://influxdb:8086/"))).unwrap();
        assert_eq!(sink.url, "http://influxdb:8086");
        assert_eq!(sink.measurement, "zepp");
    }
}
