use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

#[derive(Debug, Clone)]
pub struct Stop {
    pub id: String,
    pub name: String,
    pub point: Point,
    /// Index into the route's path, assigned by sequential stop mapping.
    /// None until the geometry build for the route has succeeded.
    pub path_index: Option<usize>,
}

/// Dense ordered geometry for one route. The oracle request is loop-closed,
/// so the last point returns to the neighborhood of the first; wraparound
/// arithmetic treats the sequence as a ring.
#[derive(Debug, Clone)]
pub struct RoutePath {
    points: Vec<Point>,
}

impl RoutePath {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point(&self, idx: usize) -> Point {
        self.points[idx]
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

#[derive(Debug, Clone)]
pub struct Route {
    pub id: String,
    /// Stops in service order.
    pub stops: Vec<Stop>,
    pub path: Option<RoutePath>,
}

impl Route {
    pub fn new(id: String, stops: Vec<Stop>) -> Self {
        Self {
            id,
            stops,
            path: None,
        }
    }

    pub fn stop(&self, stop_id: &str) -> Option<&Stop> {
        self.stops.iter().find(|s| s.id == stop_id)
    }
}
