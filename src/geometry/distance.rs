use crate::routes::{Point, RoutePath};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

pub fn haversine_distance(a: Point, b: Point) -> f64 {
    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();

    EARTH_RADIUS_M * c
}

/// Riding distance in meters from path index `start` to path index `end`,
/// loop-aware.
///
/// A `start` slightly past `end` (within `overshoot_tolerance` indices)
/// counts as arrived: GPS sampling slack routinely places a vehicle a few
/// geometry points beyond the stop it is sitting at, and charging it a full
/// extra lap for that would make the estimate useless. A larger overshoot
/// means the vehicle really has passed the stop and must come around the
/// loop again.
pub fn path_distance(
    path: &RoutePath,
    start: usize,
    end: usize,
    overshoot_tolerance: usize,
) -> f64 {
    if path.len() < 2 {
        return 0.0;
    }

    let segment = |i: usize| haversine_distance(path.point(i), path.point(i + 1));

    if start <= end {
        (start..end).map(segment).sum()
    } else if start - end <= overshoot_tolerance {
        0.0
    } else {
        let tail: f64 = (start..path.len() - 1).map(segment).sum();
        let head: f64 = (0..end).map(segment).sum();
        tail + head
    }
}
