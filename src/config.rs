/// Tuning constants for the matching and estimation pipeline.
///
/// All of these were chosen empirically against real fleet traces; none of
/// them has a derivation, so they stay adjustable instead of being buried
/// at their use sites.
#[derive(Debug, Clone)]
pub struct EngineParams {
    /// How many path indices behind the last known index the locator may
    /// search, to absorb small GPS regressions.
    pub backward_span: usize,
    /// How many path indices ahead of the last known index the locator
    /// searches.
    pub forward_span: usize,
    /// Windowed matches worse than this many meters are discarded in favor
    /// of a global search (loop-seam crossings, long signal gaps).
    pub deviation_threshold_m: f64,
    /// A vehicle this many indices past a stop still counts as arrived.
    pub overshoot_tolerance: usize,
    /// Capacity of the per-vehicle rolling speed buffer.
    pub speed_window: usize,
    /// Assumed speed (km/h) when no samples have been reported yet.
    pub nominal_speed_kmh: f64,
    /// Lower clamp (km/h) so a stationary vehicle does not inflate ETAs
    /// toward infinity.
    pub min_speed_kmh: f64,
    /// Vehicles silent for longer than this many seconds stop counting as
    /// visible for aggregation. Their state is kept.
    pub visibility_timeout_secs: u64,
    /// Capacity of the location event channel between poller and processor.
    pub event_queue_capacity: usize,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            backward_span: 10,
            forward_span: 50,
            deviation_threshold_m: 100.0,
            overshoot_tolerance: 15,
            speed_window: 5,
            nominal_speed_kmh: 15.0,
            min_speed_kmh: 5.0,
            visibility_timeout_secs: 60,
            event_queue_capacity: 256,
        }
    }
}
