// simulation/collision_counter.rs
// Counts particle-wall collisions over a chosen sample period

use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollisionCounter {
    number_of_collisions: usize,
    running: bool,
    /// Time the counter has been running, ps.
    time_running: f64,
    sample_periods: Vec<f64>,
    sample_period: f64,
}

impl CollisionCounter {
    pub fn new(sample_periods: &[f64]) -> Self {
        assert!(!sample_periods.is_empty(), "at least one sample period is required");
        Self {
            number_of_collisions: 0,
            running: false,
            time_running: 0.0,
            sample_periods: sample_periods.to_vec(),
            sample_period: sample_periods[0],
        }
    }

    pub fn reset(&mut self) {
        self.sample_period = self.sample_periods[0];
        self.stop_and_reset_count();
    }

    pub fn number_of_collisions(&self) -> usize {
        self.number_of_collisions
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn time_running(&self) -> f64 {
        self.time_running
    }

    pub fn sample_periods(&self) -> &[f64] {
        &self.sample_periods
    }

    pub fn sample_period(&self) -> f64 {
        self.sample_period
    }

    /// Changing the sample period stops the counter. Periods that are not in
    /// the list of valid periods are a caller bug.
    pub fn set_sample_period(&mut self, period: f64) {
        assert!(
            self.sample_periods.contains(&period),
            "invalid sample period {period}, valid: {:?}",
            self.sample_periods
        );
        self.sample_period = period;
        self.stop_and_reset_count();
    }

    /// Starting or stopping resets the count.
    pub fn set_running(&mut self, running: bool) {
        self.running = running;
        self.reset_count();
    }

    fn reset_count(&mut self) {
        self.number_of_collisions = 0;
        self.time_running = 0.0;
    }

    fn stop_and_reset_count(&mut self) {
        self.running = false;
        self.reset_count();
    }

    /// Add this step's wall collisions. Stops by itself at the end of the
    /// sample period and keeps the final count.
    pub fn step(&mut self, dt: f64, wall_collisions: usize) {
        if !self.running {
            return;
        }
        self.number_of_collisions += wall_collisions;
        self.time_running += dt;
        if self.time_running >= self.sample_period {
            debug!(
                "[collision-counter] sample period desired={} actual={:.3}",
                self.sample_period, self.time_running
            );
            self.running = false;
        }
    }
}
