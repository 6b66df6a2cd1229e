use crate::error::EngineError;
use crate::geometry::distance::haversine_distance;
use crate::geometry::oracle;
use crate::routes::{Point, Route, RoutePath, Stop};

/// Build the dense path for one route and map its stops onto it.
///
/// The waypoint list sent to the oracle is the route's stops in service
/// order with the first stop appended again, so the returned geometry
/// closes the loop. On any oracle failure the route is left without a path
/// and the error is propagated for logging; nothing else about the route
/// is touched.
pub async fn build_route_path(
    client: &reqwest::Client,
    osrm_url: &str,
    route: &mut Route,
) -> Result<(), EngineError> {
    if route.stops.is_empty() {
        return Err(EngineError::GeometryUnavailable {
            route_id: route.id.clone(),
        });
    }

    let mut waypoints: Vec<Point> = route.stops.iter().map(|s| s.point).collect();
    waypoints.push(waypoints[0]);

    let points = oracle::fetch_path(client, osrm_url, &route.id, &waypoints).await?;
    let path = RoutePath::new(points);

    map_stops_onto_path(&path, &mut route.stops);
    route.path = Some(path);

    Ok(())
}

/// Sequential stop mapping: assign each stop the minimum-distance path
/// index at or after the previous stop's index.
///
/// An independent nearest-point search per stop breaks on loops that pass
/// near themselves twice — an early stop can land on a late index and the
/// service order inverts. Scanning from a monotonic cursor makes the
/// assigned indices non-decreasing by construction.
pub fn map_stops_onto_path(path: &RoutePath, stops: &mut [Stop]) {
    let mut cursor = 0;

    for stop in stops.iter_mut() {
        let mut best_idx = cursor;
        let mut min_dist = f64::INFINITY;

        for i in cursor..path.len() {
            let dist = haversine_distance(stop.point, path.point(i));
            if dist < min_dist {
                min_dist = dist;
                best_idx = i;
            }
        }

        stop.path_index = Some(best_idx);
        cursor = best_idx;
    }
}
