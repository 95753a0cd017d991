// per-run results and the score formulas every report depends on.
// all times are nanoseconds.

use crate::params::RunParams;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MultisampleResult {
    /// Sum of every pixel's own compute time, across all threads.
    pub sum_single_time: u64,
    /// Fastest single pixel.
    pub best_single_time: u64,
    /// Wall time from the start signal until the last pixel was written.
    pub total_time: u64,
}

impl MultisampleResult {
    /// `1e13 / total_time`, truncated. Lower time means a higher score.
    pub fn score(&self) -> u64 {
        (1e13 / self.total_time.max(1) as f64) as u64
    }

    pub fn avg_time_per_unit(&self, params: &RunParams) -> f64 {
        self.sum_single_time as f64 / params.pixel_count() as f64
    }

    /// What the run would take with perfect scaling over `params.threads`.
    pub fn est_mt_time(&self, params: &RunParams) -> f64 {
        self.sum_single_time as f64 / params.threads as f64
    }

    /// How far the measured wall time exceeds the perfect-scaling estimate, in percent.
    pub fn overhead_percent(&self, params: &RunParams) -> f64 {
        let est = self.est_mt_time(params);
        if est <= 0.0 {
            return 0.0;
        }
        (self.total_time as f64 - est) / est * 100.0
    }

    /// Shape evaluations per second.
    pub fn performance(&self, params: &RunParams) -> f64 {
        params.total_calculations() as f64 * 1e9 / self.total_time.max(1) as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FixedTimeResult {
    /// Pixels claimed before the stop flag was seen, including one in-flight claim per worker.
    pub count: u64,
    /// Wall time from the start signal until the stop flag was cleared.
    pub time: u64,
}

impl FixedTimeResult {
    /// `count * 1e10 / time`, truncated.
    pub fn score(&self) -> u64 {
        (self.count as f64 * 1e10 / self.time.max(1) as f64) as u64
    }
}
