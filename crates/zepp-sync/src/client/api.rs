//! Zepp data API client for authenticated requests
//!
//! Covers the two data surfaces the band exposes: the per-day band-data
//! query (steps, sleep, heart-rate blob in one envelope per day) and the
//! events query (stress, blood oxygen, PAI). PAI history lives on a
//! separate host from the other event types.

use chrono::NaiveDate;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::client::auth::Session;
use crate::error::{Result, ZeppError};
use crate::models::{BandDataResponse, BandDay, BloodOxygenEvent, EventsResponse, PaiEvent, StressEvent};

/// Band-data API host
const DEFAULT_BAND_BASE: &str = "https://api-mifit.huami.com";

/// Events API host (stress, blood oxygen)
const DEFAULT_EVENTS_BASE: &str = "https://api-mifit.zepp.com";

/// Events API host for PAI history
const DEFAULT_PAI_BASE: &str = "https://api-mifit-de2.zepp.com";

/// Most events the API will return per query
const EVENT_LIMIT: u32 = 1000;

/// Time zone the events API expects on some queries
const EVENT_TIME_ZONE: &str = "Europe/London";

/// Epoch-millisecond window for an events query
#[derive(Debug, Clone, Copy)]
pub struct EventWindow {
    pub from_ms: i64,
    pub to_ms: i64,
}

/// Zepp data API client
pub struct ZeppClient {
    client: Client,
    band_base: String,
    events_base: String,
    pai_base: String,
}

impl ZeppClient {
    /// Create a new API client against the production hosts
    pub fn new() -> Result<Self> {
        Self::with_base_urls(DEFAULT_BAND_BASE, DEFAULT_EVENTS_BASE, DEFAULT_PAI_BASE)
    }

    /// Create a new API client with custom hosts (for testing)
    #[doc(hidden)]
    pub fn with_base_urls(band_base: &str, events_base: &str, pai_base: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(ZeppError::Http)?;

        Ok(Self {
            client,
            band_base: band_base.trim_end_matches('/').to_string(),
            events_base: events_base.trim_end_matches('/').to_string(),
            pai_base: pai_base.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch one `BandDay` per day in the inclusive date range
    pub async fn band_data(
        &self,
        session: &Session,
        from_date: NaiveDate,
        to_date: NaiveDate,
    ) -> Result<Vec<BandDay>> {
        let url = format!("{}/v1/data/band_data.json", self.band_base);
        let params = [
            ("query_type", "detail".to_string()),
            ("device_type", "android_phone".to_string()),
            ("userid", session.user_id.clone()),
            ("from_date", from_date.format("%Y-%m-%d").to_string()),
            ("to_date", to_date.format("%Y-%m-%d").to_string()),
        ];

        let response = self
            .client
            .get(&url)
            .query(&params)
            .header("apptoken", &session.app_token)
            .send()
            .await
            .map_err(ZeppError::Http)?;

        let body: BandDataResponse = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ZeppError::invalid_response(format!("failed to parse band data: {e}")))?;

        Ok(body.data)
    }

    /// Fetch daily stress events in the window
    pub async fn stress_events(
        &self,
        session: &Session,
        window: EventWindow,
    ) -> Result<Vec<StressEvent>> {
        self.events(&self.events_base, session, "all_day_stress", window, false)
            .await
    }

    /// Fetch blood oxygen events in the window
    pub async fn blood_oxygen_events(
        &self,
        session: &Session,
        window: EventWindow,
    ) -> Result<Vec<BloodOxygenEvent>> {
        self.events(&self.events_base, session, "blood_oxygen", window, true)
            .await
    }

    /// Fetch PAI scoring events in the window
    pub async fn pai_events(
        &self,
        session: &Session,
        window: EventWindow,
    ) -> Result<Vec<PaiEvent>> {
        self.events(&self.pai_base, session, "PaiHealthInfo", window, true)
            .await
    }

    async fn events<T: DeserializeOwned>(
        &self,
        base: &str,
        session: &Session,
        event_type: &str,
        window: EventWindow,
        with_time_zone: bool,
    ) -> Result<Vec<T>> {
        let url = format!("{}/users/{}/events", base, session.user_id);
        let mut params = vec![
            ("from", window.from_ms.to_string()),
            ("to", window.to_ms.to_string()),
            ("eventType", event_type.to_string()),
            ("limit", EVENT_LIMIT.to_string()),
        ];
        if with_time_zone {
            params.push(("timeZone", EVENT_TIME_ZONE.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .query(&params)
            .header("apptoken", &session.app_token)
            .send()
            .await
            .map_err(ZeppError::Http)?;

        let body: EventsResponse<T> = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| {
                ZeppError::invalid_response(format!("failed to parse {event_type} events: {e}"))
            })?;

        Ok(body.items)
    }

    /// Convert a non-success response into an error
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        match status {
            _ if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(ZeppError::auth_rejected(format!("app token rejected ({status})")))
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(ZeppError::invalid_response(format!(
                    "API error {status}: {body}"
                )))
            }
        }
    }
}
