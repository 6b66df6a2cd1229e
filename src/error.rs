#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The path oracle failed or returned no usable geometry. Distance and
    /// ETA for the route report unavailable; stops still render from raw
    /// coordinates.
    #[error("no usable path geometry for route {route_id}")]
    GeometryUnavailable { route_id: String },

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}
