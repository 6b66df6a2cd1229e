use crate::engine::{eta, unix_now, EngineContext};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

pub async fn run_server(ctx: Arc<EngineContext>, port: u16) {
    let app = Router::new()
        .route("/api/routes/{route_id}/stops/{stop_id}/eta", get(get_stop_eta))
        .route("/api/routes/{route_id}/vehicles", get(get_route_vehicles))
        .route("/health", get(health_check))
        .with_state(ctx);

    let addr = format!("0.0.0.0:{}", port);
    info!(%addr, "starting HTTP server");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(%addr, error = %e, "failed to bind");
            return;
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server exited");
    }
}

#[derive(Serialize)]
struct EtaResponse {
    route_id: String,
    stop_id: String,
    /// Whole minutes, or null when no estimate is available.
    eta_minutes: Option<u64>,
}

async fn get_stop_eta(
    State(ctx): State<Arc<EngineContext>>,
    Path((route_id, stop_id)): Path<(String, String)>,
) -> impl IntoResponse {
    let routes = ctx.routes.read().await;
    let Some(route) = routes.get(&route_id) else {
        return (StatusCode::NOT_FOUND, format!("unknown route {}", route_id)).into_response();
    };
    if route.stop(&stop_id).is_none() {
        return (StatusCode::NOT_FOUND, format!("unknown stop {}", stop_id)).into_response();
    }

    let vehicles = ctx.vehicles.read().await;
    let eta_minutes = eta::eta_to_stop(route, &stop_id, &vehicles, unix_now(), &ctx.params);

    Json(EtaResponse {
        route_id,
        stop_id,
        eta_minutes,
    })
    .into_response()
}

#[derive(Serialize)]
struct VehicleMarker {
    id: String,
    lat: f64,
    lon: f64,
    path_index: Option<usize>,
}

#[derive(Serialize)]
struct RouteVehiclesResponse {
    route_id: String,
    count: usize,
    vehicles: Vec<VehicleMarker>,
}

/// Visible vehicles on a route, with their matched coordinates for marker
/// placement. Requesting a route also makes it the focused route, so
/// roster-less vehicles default onto what the consumer is looking at.
async fn get_route_vehicles(
    State(ctx): State<Arc<EngineContext>>,
    Path(route_id): Path<String>,
) -> impl IntoResponse {
    {
        let routes = ctx.routes.read().await;
        if !routes.contains_key(&route_id) {
            return (StatusCode::NOT_FOUND, format!("unknown route {}", route_id))
                .into_response();
        }
    }

    {
        let mut focused = ctx.focused_route.write().await;
        if *focused != route_id {
            *focused = route_id.clone();
        }
    }

    let now = unix_now();
    let vehicles = ctx.vehicles.read().await;

    let markers: Vec<VehicleMarker> = vehicles
        .on_route(&route_id)
        .filter(|v| v.is_visible(now, &ctx.params))
        .filter_map(|v| {
            let point = v.matched_point.or(v.raw_point)?;
            Some(VehicleMarker {
                id: v.vehicle_id.clone(),
                lat: point.lat,
                lon: point.lon,
                path_index: v.path_index,
            })
        })
        .collect();

    Json(RouteVehiclesResponse {
        count: markers.len(),
        route_id,
        vehicles: markers,
    })
    .into_response()
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
