use crate::config::EngineParams;
use crate::engine::events::LocationEvent;
use crate::engine::speed::SpeedHistory;
use crate::routes::Point;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct VehicleState {
    pub vehicle_id: String,
    /// Assigned route. May come from the roster or from the focused-route
    /// fallback; `route_from_roster` records which.
    pub route_id: Option<String>,
    pub route_from_roster: bool,
    /// Last raw reported coordinate.
    pub raw_point: Option<Point>,
    /// Coordinate of the matched path point, for marker placement.
    pub matched_point: Option<Point>,
    /// Last known index into the route's path. None until first located.
    pub path_index: Option<usize>,
    pub speed: SpeedHistory,
    /// Unix seconds of the most recent report.
    pub last_seen: u64,
}

impl VehicleState {
    pub fn new(vehicle_id: String) -> Self {
        Self {
            vehicle_id,
            route_id: None,
            route_from_roster: false,
            raw_point: None,
            matched_point: None,
            path_index: None,
            speed: SpeedHistory::new(),
            last_seen: 0,
        }
    }

    /// Fold one position report into the record. A report without an
    /// instantaneous speed contributes the nominal default sample, matching
    /// what the buffer would assume anyway.
    pub fn apply_report(&mut self, event: &LocationEvent, now: u64, params: &EngineParams) {
        self.raw_point = Some(event.point);
        self.last_seen = event.recorded_at.unwrap_or(now);
        let sample = event.speed_kmh.unwrap_or(params.nominal_speed_kmh);
        self.speed.push(sample, params.speed_window);
    }

    pub fn is_visible(&self, now: u64, params: &EngineParams) -> bool {
        now.saturating_sub(self.last_seen) <= params.visibility_timeout_secs
    }
}

/// Owner of all per-vehicle mutable state.
///
/// Records are created on first report and never deleted; a vehicle that
/// goes dark just stops counting as visible. Eviction was deliberately
/// never implemented upstream and the behavior is kept.
#[derive(Debug, Default)]
pub struct VehicleStore {
    states: HashMap<String, VehicleState>,
}

impl VehicleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&mut self, vehicle_id: &str) -> &mut VehicleState {
        self.states
            .entry(vehicle_id.to_string())
            .or_insert_with(|| VehicleState::new(vehicle_id.to_string()))
    }

    pub fn get(&self, vehicle_id: &str) -> Option<&VehicleState> {
        self.states.get(vehicle_id)
    }

    pub fn all(&self) -> impl Iterator<Item = &VehicleState> {
        self.states.values()
    }

    pub fn on_route<'a>(&'a self, route_id: &'a str) -> impl Iterator<Item = &'a VehicleState> {
        self.states
            .values()
            .filter(move |s| s.route_id.as_deref() == Some(route_id))
    }

    /// Resolve a vehicle's route: roster assignment wins; otherwise fall
    /// back to the route the consumer is currently viewing, cached so the
    /// guess is only made once per vehicle.
    pub fn assign_route(
        &mut self,
        vehicle_id: &str,
        roster: &HashMap<String, String>,
        focused_route: &str,
    ) {
        let state = self.get_or_create(vehicle_id);

        if let Some(route_id) = roster.get(vehicle_id) {
            if state.route_id.as_deref() != Some(route_id) {
                // Assignment changed: the old path index is meaningless on
                // the new route's geometry.
                state.path_index = None;
            }
            state.route_id = Some(route_id.clone());
            state.route_from_roster = true;
        } else if state.route_id.is_none() {
            tracing::debug!(
                vehicle_id,
                focused_route,
                "vehicle missing from roster, defaulting to focused route"
            );
            state.route_id = Some(focused_route.to_string());
            state.route_from_roster = false;
        }
    }

    /// Reconcile all cached assignments against a fresh roster fetch.
    /// Low-confidence fallback guesses are corrected; roster-backed
    /// assignments are updated in place if the fleet was reshuffled.
    pub fn apply_roster(&mut self, roster: &HashMap<String, String>) {
        for state in self.states.values_mut() {
            if let Some(route_id) = roster.get(&state.vehicle_id) {
                if state.route_id.as_deref() != Some(route_id) {
                    state.path_index = None;
                    state.route_id = Some(route_id.clone());
                }
                state.route_from_roster = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str, speed: Option<f64>) -> LocationEvent {
        LocationEvent {
            vehicle_id: id.to_string(),
            point: Point::new(13.9, 100.5),
            speed_kmh: speed,
            recorded_at: None,
        }
    }

    #[test]
    fn upsert_creates_then_updates() {
        let params = EngineParams::default();
        let mut store = VehicleStore::new();

        store
            .get_or_create("SH-01")
            .apply_report(&event("SH-01", Some(12.0)), 1000, &params);
        store
            .get_or_create("SH-01")
            .apply_report(&event("SH-01", Some(18.0)), 1010, &params);

        let state = store.get("SH-01").unwrap();
        assert_eq!(state.last_seen, 1010);
        assert_eq!(state.speed.len(), 2);
        assert_eq!(store.all().count(), 1);
    }

    #[test]
    fn fallback_route_is_cached_and_low_confidence() {
        let mut store = VehicleStore::new();
        let roster = HashMap::new();

        store.assign_route("SH-01", &roster, "R01");
        let state = store.get("SH-01").unwrap();
        assert_eq!(state.route_id.as_deref(), Some("R01"));
        assert!(!state.route_from_roster);

        // A later call with a different focused route must not repeat the
        // guess.
        store.assign_route("SH-01", &roster, "R02");
        assert_eq!(store.get("SH-01").unwrap().route_id.as_deref(), Some("R01"));
    }

    #[test]
    fn roster_refresh_corrects_fallback_assignments() {
        let mut store = VehicleStore::new();
        store.assign_route("SH-01", &HashMap::new(), "R01");
        store.get_or_create("SH-01").path_index = Some(42);

        let roster = HashMap::from([("SH-01".to_string(), "R02".to_string())]);
        store.apply_roster(&roster);

        let state = store.get("SH-01").unwrap();
        assert_eq!(state.route_id.as_deref(), Some("R02"));
        assert!(state.route_from_roster);
        // Stale index from the old route's geometry was discarded.
        assert_eq!(state.path_index, None);
    }

    #[test]
    fn visibility_window() {
        let params = EngineParams::default();
        let mut store = VehicleStore::new();
        store
            .get_or_create("SH-01")
            .apply_report(&event("SH-01", None), 1000, &params);

        let state = store.get("SH-01").unwrap();
        assert!(state.is_visible(1000 + params.visibility_timeout_secs, &params));
        assert!(!state.is_visible(1001 + params.visibility_timeout_secs, &params));
    }
}
