/// The running efficiency of the completed trips: the mean ratio of expected
/// to actual trip time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TripStats {
    efficiency: f64,
    reached: usize,
}

impl Default for TripStats {
    fn default() -> Self {
        Self {
            efficiency: 1.0,
            reached: 0,
        }
    }
}

impl TripStats {
    /// Folds a completed trip into the running mean.
    /// A trip taking no time counts as perfectly efficient.
    pub fn record(&mut self, expected: f64, actual: f64) {
        let ratio = if actual > 0.0 { expected / actual } else { 1.0 };
        let reached = self.reached as f64;
        self.efficiency = (self.efficiency * reached + ratio) / (reached + 1.0);
        self.reached += 1;
    }

    /// The mean ratio of expected to actual trip time, 1 before any trip completes.
    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }

    /// The number of completed trips.
    pub fn reached(&self) -> usize {
        self.reached
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
