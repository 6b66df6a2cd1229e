mod api;
mod config;
mod engine;
mod error;
mod geometry;
mod ingest;
mod routes;

use clap::Parser;
use config::EngineParams;
use engine::EngineContext;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "shuttle-eta")]
#[command(about = "Realtime arrival estimation service for a shuttle fleet")]
struct Args {
    /// Port to run the HTTP server on
    #[arg(short, long, env = "SERVER_PORT", default_value = "8080")]
    port: u16,

    /// Base URL of the fleet metadata backend
    #[arg(long, env = "BACKEND_URL", default_value = "http://localhost:3000")]
    backend_url: String,

    /// Base URL of the OSRM-compatible routing oracle
    #[arg(long, env = "OSRM_URL", default_value = "https://router.project-osrm.org")]
    osrm_url: String,

    /// Route ids to serve, comma separated
    #[arg(long, env = "ROUTE_IDS", value_delimiter = ',', default_value = "R01,R02")]
    route_ids: Vec<String>,

    /// Live location poll interval in milliseconds
    #[arg(long, env = "POLL_INTERVAL_MS", default_value = "1000")]
    poll_interval_ms: u64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    if args.route_ids.is_empty() {
        error!("no route ids configured");
        return;
    }

    let params = EngineParams::default();
    let client = reqwest::Client::new();
    let ctx = Arc::new(EngineContext::new(params, args.route_ids[0].clone()));

    // Static metadata first: stop lists per route, then the fleet roster.
    for route_id in &args.route_ids {
        match routes::loader::load_route(&client, &args.backend_url, route_id).await {
            Ok(route) => {
                info!(route_id, stops = route.stops.len(), "loaded route");
                ctx.routes.write().await.insert(route_id.clone(), route);
            }
            Err(e) => {
                error!(route_id, error = %e, "failed to load route stops");
            }
        }
    }

    match routes::loader::load_roster(&client, &args.backend_url).await {
        Ok(roster) => {
            info!(vehicles = roster.len(), "loaded fleet roster");
            *ctx.roster.write().await = roster;
        }
        Err(e) => warn!(error = %e, "failed to load roster, will rely on fallback assignment"),
    }

    // Geometry builds run concurrently per route; a failure on one route
    // leaves that route without a path and does not touch the others.
    for route_id in args.route_ids.clone() {
        let ctx = ctx.clone();
        let client = client.clone();
        let osrm_url = args.osrm_url.clone();
        tokio::spawn(async move {
            let Some(mut route) = ctx.routes.read().await.get(&route_id).cloned() else {
                return;
            };
            match geometry::build_route_path(&client, &osrm_url, &mut route).await {
                Ok(()) => {
                    let len = route.path.as_ref().map(|p| p.len()).unwrap_or(0);
                    info!(route_id, path_points = len, "built route path");
                    // Last write wins if a reload raced this build.
                    ctx.routes.write().await.insert(route_id, route);
                }
                Err(e) => warn!(route_id, error = %e, "path build failed, ETAs unavailable"),
            }
        });
    }

    let (tx, rx) = tokio::sync::mpsc::channel(ctx.params.event_queue_capacity);

    let locations_url = format!("{}/api/locations", args.backend_url);
    let poller_handle = tokio::spawn(ingest::poller::run_poller(
        ctx.clone(),
        client.clone(),
        locations_url,
        args.backend_url.clone(),
        args.poll_interval_ms,
        tx,
    ));

    let processor_handle = tokio::spawn(ingest::processor::run_processor(ctx.clone(), rx));

    let api_handle = tokio::spawn(api::server::run_server(ctx.clone(), args.port));

    tokio::select! {
        _ = poller_handle => error!("poller task exited"),
        _ = processor_handle => error!("processor task exited"),
        _ = api_handle => error!("API server exited"),
    }
}
