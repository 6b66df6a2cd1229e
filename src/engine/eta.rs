use crate::config::EngineParams;
use crate::engine::state::VehicleStore;
use crate::geometry::path_distance;
use crate::routes::Route;

/// Minutes until the nearest qualifying vehicle on `route` reaches the stop
/// with the given id.
///
/// Pure over the current store contents and static route data; callers
/// re-evaluate it on every relevant event instead of keeping a state
/// machine. `None` means unavailable: no path geometry, an unmapped stop,
/// or no visible vehicle with a known position on the route.
pub fn eta_to_stop(
    route: &Route,
    stop_id: &str,
    vehicles: &VehicleStore,
    now: u64,
    params: &EngineParams,
) -> Option<u64> {
    let path = route.path.as_ref()?;
    let stop_index = route.stop(stop_id)?.path_index?;

    let mut best: Option<u64> = None;

    for vehicle in vehicles.on_route(&route.id) {
        if !vehicle.is_visible(now, params) {
            continue;
        }
        let Some(vehicle_index) = vehicle.path_index else {
            continue;
        };

        let distance_m = path_distance(path, vehicle_index, stop_index, params.overshoot_tolerance);
        let speed_m_per_min = vehicle.speed.smoothed_kmh(params) * 1000.0 / 60.0;
        let minutes = (distance_m / speed_m_per_min).floor() as u64;

        best = Some(match best {
            Some(current) => current.min(minutes),
            None => minutes,
        });
    }

    best
}

/// Number of vehicles currently visible on the route.
pub fn visible_count(route_id: &str, vehicles: &VehicleStore, now: u64, params: &EngineParams) -> usize {
    vehicles
        .on_route(route_id)
        .filter(|v| v.is_visible(now, params))
        .count()
}
