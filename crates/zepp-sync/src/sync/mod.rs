//! Run orchestration
//!
//! One run is strictly linear: authenticate, fetch the band summary for
//! the queried window, fetch each optional event metric, then hand the
//! whole record set to the sink. Auth, the band summary and the sink
//! write are fatal on failure; each optional metric is isolated so a
//! broken event feed costs only its own records.

use chrono::{Duration, Local};
use tracing::{info, warn};

use crate::client::{AuthClient, EventWindow, Session, ZeppClient};
use crate::config::Config;
use crate::error::Result;
use crate::extract::{self, clock};
use crate::models::Record;
use crate::sink::InfluxSink;

/// Compute the epoch-millisecond window for events queries: local
/// midnight at the start of the queried range through 23:59:59 today.
/// The API misbehaves on mid-day `from` values.
pub fn event_window(today: chrono::NaiveDate, duration_days: u32) -> Result<EventWindow> {
    let start_day = today - Duration::days(i64::from(duration_days));
    let from = clock::local_epoch(start_day.and_hms_opt(0, 0, 0).expect("midnight is valid"))?;
    let to = clock::local_epoch(today.and_hms_opt(23, 59, 59).expect("23:59:59 is valid"))?;

    Ok(EventWindow {
        from_ms: from * 1000,
        to_ms: to * 1000,
    })
}

/// Fetch and normalize everything for one run. The band summary is
/// mandatory; stress, blood oxygen and PAI are each optional.
pub async fn collect_records(
    client: &ZeppClient,
    session: &Session,
    duration_days: u32,
    now: chrono::DateTime<Local>,
) -> Result<(Vec<Record>, String)> {
    let today = now.date_naive();
    let from_date = today - Duration::days(i64::from(duration_days));

    info!(from = %from_date, to = %today, "retrieving band data");
    let days = client.band_data(session, from_date, today).await?;
    let (mut records, serial) = extract::reconcile_days(&days, now)?;

    let window = event_window(today, duration_days)?;

    info!("retrieving stress data");
    let stress = match client.stress_events(session, window).await {
        Ok(events) => extract::stress::extract(&events),
        Err(e) => Err(e),
    };
    match stress {
        Ok(rows) => records.extend(rows),
        Err(e) => warn!(error = %e, "failed to collect stress data"),
    }

    info!("retrieving blood oxygen data");
    let blood_oxygen = match client.blood_oxygen_events(session, window).await {
        Ok(events) => extract::blood_oxygen::extract(&events),
        Err(e) => Err(e),
    };
    match blood_oxygen {
        Ok(rows) => records.extend(rows),
        Err(e) => warn!(error = %e, "failed to collect blood oxygen data"),
    }

    info!("retrieving PAI data");
    match client.pai_events(session, window).await {
        Ok(events) => records.extend(extract::pai::extract(&events)),
        Err(e) => warn!(error = %e, "failed to collect PAI data"),
    }

    Ok((records, serial))
}

/// Perform one complete run against the production hosts
pub async fn run(config: &Config, dry_run: bool) -> Result<()> {
    let auth = AuthClient::new()?;
    let session = auth.login(&config.api_email, &config.api_password).await?;

    let client = ZeppClient::new()?;
    let now = Local::now();
    let (records, serial) = collect_records(&client, &session, config.query_duration_days, now).await?;

    info!(records = records.len(), serial = %serial, "collection complete");

    if dry_run {
        info!("dry run, skipping sink write");
        return Ok(());
    }

    let sink = InfluxSink::from_config(config)?;
    sink.write(&records, &serial).await?;

    Ok(())
}
