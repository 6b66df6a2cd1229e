use crate::config::EngineParams;
use crate::geometry::distance::haversine_distance;
use crate::routes::{Point, RoutePath};

/// Unconstrained nearest-point search over the whole path.
pub fn nearest_point_index(path: &RoutePath, pos: Point) -> usize {
    let mut min_dist = f64::INFINITY;
    let mut min_idx = 0;

    for (i, p) in path.points().iter().enumerate() {
        let dist = haversine_distance(pos, *p);
        if dist < min_dist {
            min_dist = dist;
            min_idx = i;
        }
    }

    min_idx
}

/// Map a raw coordinate to a path index, constrained by the vehicle's last
/// known index.
///
/// Without the constraint, a vehicle driving past a geometrically close but
/// sequentially distant part of the loop (opposing lane, loop
/// self-intersection) gets teleported backward and the displayed ETA
/// oscillates. Searching only a forward-biased window around the last index
/// pins the match to the direction of travel; a small backward span absorbs
/// GPS regressions.
///
/// If even the best windowed candidate is further than the deviation
/// threshold, the window is wrong — typically the vehicle crossed the loop
/// seam onto a new lap — and a global search takes over.
pub fn directional_point_index(
    path: &RoutePath,
    pos: Point,
    last_index: Option<usize>,
    params: &EngineParams,
) -> usize {
    let last = match last_index {
        Some(idx) => idx,
        None => return nearest_point_index(path, pos),
    };

    let len = path.len() as isize;
    let mut min_dist = f64::INFINITY;
    let mut best_idx = last;

    for offset in -(params.backward_span as isize)..=(params.forward_span as isize) {
        let idx = (last as isize + offset).rem_euclid(len) as usize;
        let dist = haversine_distance(pos, path.point(idx));
        if dist < min_dist {
            min_dist = dist;
            best_idx = idx;
        }
    }

    if min_dist > params.deviation_threshold_m {
        // Repeated hits here signal upstream data-quality problems, so the
        // fallback is worth a log line even though it is handled.
        tracing::debug!(
            last_index = last,
            deviation_m = min_dist,
            "windowed match beyond deviation threshold, falling back to global search"
        );
        return nearest_point_index(path, pos);
    }

    best_idx
}
