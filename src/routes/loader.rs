use crate::error::EngineError;
use crate::routes::{Point, Route, Stop};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct StopRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    lat: f64,
    #[serde(alias = "lon")]
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct RosterRecord {
    id: serde_json::Value,
    #[serde(alias = "assignedRouteId")]
    assigned_route_id: String,
}

/// Fetch the ordered stop list for one route from the metadata backend.
pub async fn load_route(
    client: &reqwest::Client,
    backend_url: &str,
    route_id: &str,
) -> Result<Route, EngineError> {
    let url = format!("{}/api/admin/route-stops/{}", backend_url, route_id);
    let records: Vec<StopRecord> = client.get(&url).send().await?.json().await?;

    let stops = records
        .into_iter()
        .enumerate()
        .map(|(i, r)| Stop {
            id: r.id.unwrap_or_else(|| format!("{}-S{:02}", route_id, i + 1)),
            name: r.name.unwrap_or_else(|| format!("Stop {}", i + 1)),
            point: Point::new(r.lat, r.lng),
            path_index: None,
        })
        .collect();

    Ok(Route::new(route_id.to_string(), stops))
}

/// Fetch the fleet roster: vehicle id -> assigned route id.
///
/// Fetched once at startup and refreshed periodically; fresh roster data
/// corrects any low-confidence fallback assignments made in the meantime.
pub async fn load_roster(
    client: &reqwest::Client,
    backend_url: &str,
) -> Result<HashMap<String, String>, EngineError> {
    let url = format!("{}/api/admin/vehicles", backend_url);
    let records: Vec<RosterRecord> = client.get(&url).send().await?.json().await?;

    let mut roster = HashMap::new();
    for r in records {
        // Vehicle ids show up both as strings and as bare numbers.
        let id = match &r.id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        roster.insert(id, r.assigned_route_id);
    }

    Ok(roster)
}
