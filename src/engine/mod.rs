pub mod eta;
pub mod events;
pub mod speed;
pub mod state;

use crate::config::EngineParams;
use crate::routes::Route;
use state::VehicleStore;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

/// Shared state for the whole service, created at startup and passed into
/// every task. Routes and roster change rarely (reload, periodic refresh);
/// vehicle records are mutated only by the ingest processor.
pub struct EngineContext {
    pub params: EngineParams,
    pub routes: RwLock<HashMap<String, Route>>,
    pub vehicles: RwLock<VehicleStore>,
    pub roster: RwLock<HashMap<String, String>>,
    /// The route the consumer is currently viewing; vehicles absent from
    /// the roster default onto it.
    pub focused_route: RwLock<String>,
}

impl EngineContext {
    pub fn new(params: EngineParams, default_route: String) -> Self {
        Self {
            params,
            routes: RwLock::new(HashMap::new()),
            vehicles: RwLock::new(VehicleStore::new()),
            roster: RwLock::new(HashMap::new()),
            focused_route: RwLock::new(default_route),
        }
    }
}

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
