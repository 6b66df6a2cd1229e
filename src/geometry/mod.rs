pub mod builder;
pub mod distance;
pub mod locator;
pub mod oracle;

pub use builder::{build_route_path, map_stops_onto_path};
pub use distance::{haversine_distance, path_distance};
pub use locator::{directional_point_index, nearest_point_index};
