use crate::engine::events::LocationEvent;
use crate::engine::{unix_now, EngineContext};
use crate::geometry::directional_point_index;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

/// Single consumer of the location event channel.
///
/// Each event is applied to completion — state upsert, route resolution,
/// path index update — before the next one is taken, so this loop is the
/// only writer of vehicle records and no per-vehicle locking is needed
/// beyond the store lock itself.
pub async fn run_processor(ctx: Arc<EngineContext>, mut rx: mpsc::Receiver<LocationEvent>) {
    info!("starting location processor");

    while let Some(event) = rx.recv().await {
        apply_event(&ctx, &event).await;
    }

    info!("event channel closed, stopping processor");
}

async fn apply_event(ctx: &EngineContext, event: &LocationEvent) {
    let now = unix_now();
    let focused = ctx.focused_route.read().await.clone();
    let roster = ctx.roster.read().await;
    let routes = ctx.routes.read().await;
    let mut vehicles = ctx.vehicles.write().await;

    vehicles.assign_route(&event.vehicle_id, &roster, &focused);

    let state = vehicles.get_or_create(&event.vehicle_id);
    state.apply_report(event, now, &ctx.params);

    // Locate the vehicle along its route's path. Duplicate or out-of-order
    // fixes land in the locator's backward span and resolve to a sane index
    // instead of needing explicit sequencing.
    let path = state
        .route_id
        .as_ref()
        .and_then(|route_id| routes.get(route_id))
        .and_then(|route| route.path.as_ref());

    if let Some(path) = path {
        if !path.is_empty() {
            let idx = directional_point_index(path, event.point, state.path_index, &ctx.params);
            state.path_index = Some(idx);
            state.matched_point = Some(path.point(idx));
        }
    } else {
        // No geometry for this route (yet): the marker falls back to the
        // raw coordinate and ETAs stay unavailable.
        state.matched_point = Some(event.point);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineParams;
    use crate::routes::{Point, Route, RoutePath, Stop};

    async fn context_with_route() -> EngineContext {
        let ctx = EngineContext::new(EngineParams::default(), "R01".to_string());
        let points: Vec<Point> = (0..100).map(|i| Point::new(0.0005 * i as f64, 0.0)).collect();
        let path = RoutePath::new(points);
        let mut route = Route::new(
            "R01".to_string(),
            vec![Stop {
                id: "S1".to_string(),
                name: "Stop 1".to_string(),
                point: Point::new(0.01, 0.0),
                path_index: Some(20),
            }],
        );
        route.path = Some(path);
        ctx.routes.write().await.insert("R01".to_string(), route);
        ctx
    }

    fn event_at(id: &str, lat: f64) -> LocationEvent {
        LocationEvent {
            vehicle_id: id.to_string(),
            point: Point::new(lat, 0.0),
            speed_kmh: Some(15.0),
            recorded_at: None,
        }
    }

    #[tokio::test]
    async fn events_advance_the_path_index_monotonically() {
        let ctx = context_with_route().await;

        apply_event(&ctx, &event_at("SH-01", 0.0025)).await;
        assert_eq!(
            ctx.vehicles.read().await.get("SH-01").unwrap().path_index,
            Some(5)
        );

        // An out-of-order fix slightly behind is absorbed by the backward
        // span without dragging the index out of the window.
        apply_event(&ctx, &event_at("SH-01", 0.0020)).await;
        assert_eq!(
            ctx.vehicles.read().await.get("SH-01").unwrap().path_index,
            Some(4)
        );

        apply_event(&ctx, &event_at("SH-01", 0.0060)).await;
        let state = ctx.vehicles.read().await.get("SH-01").cloned().unwrap();
        assert_eq!(state.path_index, Some(12));
        let matched = state.matched_point.unwrap();
        assert_eq!(matched.lat, 0.0005 * 12.0);
    }

    #[tokio::test]
    async fn unknown_vehicle_defaults_to_focused_route() {
        let ctx = context_with_route().await;

        apply_event(&ctx, &event_at("GHOST", 0.001)).await;

        let vehicles = ctx.vehicles.read().await;
        let state = vehicles.get("GHOST").unwrap();
        assert_eq!(state.route_id.as_deref(), Some("R01"));
        assert!(!state.route_from_roster);
    }
}
