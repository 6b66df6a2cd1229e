use crate::config::EngineParams;
use std::collections::VecDeque;

/// Rolling buffer of recent instantaneous speeds (km/h) for one vehicle.
#[derive(Debug, Clone, Default)]
pub struct SpeedHistory {
    samples: VecDeque<f64>,
}

impl SpeedHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, speed_kmh: f64, window: usize) {
        self.samples.push_back(speed_kmh);
        while self.samples.len() > window {
            self.samples.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Mean of the buffered samples, or the nominal default when nothing
    /// has been reported yet, clamped to the configured floor. The floor
    /// keeps a vehicle idling at a stop from projecting absurd ETAs.
    pub fn smoothed_kmh(&self, params: &EngineParams) -> f64 {
        let speed = if self.samples.is_empty() {
            params.nominal_speed_kmh
        } else {
            self.samples.iter().sum::<f64>() / self.samples.len() as f64
        };

        speed.max(params.min_speed_kmh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> EngineParams {
        EngineParams::default()
    }

    #[test]
    fn empty_buffer_reports_nominal_speed() {
        let history = SpeedHistory::new();
        assert_eq!(history.smoothed_kmh(&params()), 15.0);
    }

    #[test]
    fn averages_buffered_samples() {
        let mut history = SpeedHistory::new();
        for s in [10.0, 20.0, 30.0] {
            history.push(s, 5);
        }
        assert_eq!(history.smoothed_kmh(&params()), 20.0);
    }

    #[test]
    fn retains_only_the_most_recent_samples() {
        let mut history = SpeedHistory::new();
        for s in [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0] {
            history.push(s, 5);
        }
        assert_eq!(history.len(), 5);
        // Only [4, 5, 6, 7, 8] remain.
        assert_eq!(history.smoothed_kmh(&params()), 6.0);
    }

    #[test]
    fn clamps_to_the_minimum_floor() {
        let mut history = SpeedHistory::new();
        for s in [0.0, 1.0, 0.5] {
            history.push(s, 5);
        }
        assert_eq!(history.smoothed_kmh(&params()), 5.0);
    }
}
