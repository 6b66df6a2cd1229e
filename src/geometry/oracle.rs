use crate::error::EngineError;
use crate::routes::Point;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    /// GeoJSON order: [lon, lat].
    coordinates: Vec<[f64; 2]>,
}

/// Ask the routing oracle for a dense road-following geometry through the
/// given waypoints, in order. The caller is responsible for loop-closing
/// the waypoint list.
///
/// The oracle is trusted but not relied on: any failure, as well as an
/// empty geometry, surfaces as `GeometryUnavailable` so the route simply
/// operates without a path.
pub async fn fetch_path(
    client: &reqwest::Client,
    osrm_url: &str,
    route_id: &str,
    waypoints: &[Point],
) -> Result<Vec<Point>, EngineError> {
    let coords = waypoints
        .iter()
        .map(|p| format!("{},{}", p.lon, p.lat))
        .collect::<Vec<_>>()
        .join(";");

    let url = format!(
        "{}/route/v1/driving/{}?overview=full&geometries=geojson",
        osrm_url, coords
    );

    let response: OsrmResponse = client.get(&url).send().await?.json().await?;

    let points: Vec<Point> = response
        .routes
        .into_iter()
        .next()
        .map(|r| {
            r.geometry
                .coordinates
                .into_iter()
                .map(|[lon, lat]| Point::new(lat, lon))
                .collect()
        })
        .unwrap_or_default();

    if points.is_empty() {
        return Err(EngineError::GeometryUnavailable {
            route_id: route_id.to_string(),
        });
    }

    Ok(points)
}
