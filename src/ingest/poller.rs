use crate::engine::events::{self, LocationEvent};
use crate::engine::EngineContext;
use crate::routes::loader;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const ROSTER_REFRESH_EVERY: u64 = 30;

/// Poll the live location endpoint and feed parsed events into the
/// processing channel. Every `ROSTER_REFRESH_EVERY` polls the fleet roster
/// is re-fetched so low-confidence fallback route assignments get
/// corrected.
///
/// Failures are per-iteration: a bad fetch or an unparseable body is
/// logged and the next cycle proceeds normally.
pub async fn run_poller(
    ctx: Arc<EngineContext>,
    client: reqwest::Client,
    locations_url: String,
    backend_url: String,
    poll_interval_ms: u64,
    tx: mpsc::Sender<LocationEvent>,
) {
    info!(url = %locations_url, interval_ms = poll_interval_ms, "starting location poller");

    let mut iteration: u64 = 0;

    loop {
        match fetch_events(&client, &locations_url).await {
            Ok(events) => {
                debug!(count = events.len(), "fetched location events");
                for event in events {
                    // Bounded channel: back-pressure the poller instead of
                    // piling up events faster than they can be applied.
                    if tx.send(event).await.is_err() {
                        warn!("event channel closed, stopping poller");
                        return;
                    }
                }
            }
            Err(e) => warn!(error = %e, "location fetch failed"),
        }

        iteration += 1;
        if iteration % ROSTER_REFRESH_EVERY == 0 {
            match loader::load_roster(&client, &backend_url).await {
                Ok(roster) => {
                    ctx.vehicles.write().await.apply_roster(&roster);
                    *ctx.roster.write().await = roster;
                    debug!("refreshed fleet roster");
                }
                Err(e) => warn!(error = %e, "roster refresh failed"),
            }
        }

        tokio::time::sleep(Duration::from_millis(poll_interval_ms)).await;
    }
}

async fn fetch_events(
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<LocationEvent>, crate::error::EngineError> {
    let body = client.get(url).send().await?.text().await?;
    let payload: serde_json::Value = serde_json::from_str(&body)?;
    Ok(events::parse_events(&payload))
}
