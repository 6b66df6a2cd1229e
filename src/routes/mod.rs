pub mod loader;
pub mod types;

pub use types::{Point, Route, RoutePath, Stop};
