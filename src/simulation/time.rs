// simulation/time.rs
// Real time to model time, and the stopwatch

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeSpeed {
    #[default]
    Normal,
    Slow,
}

/// Converts seconds of real time to picoseconds of model time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeTransform {
    pub speed: TimeSpeed,
    normal_scale: f64,
    slow_scale: f64,
}

impl TimeTransform {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            speed: TimeSpeed::Normal,
            normal_scale: config.normal_time_scale,
            slow_scale: config.slow_time_scale,
        }
    }

    /// ps of model time per second of real time.
    pub fn scale(&self) -> f64 {
        match self.speed {
            TimeSpeed::Normal => self.normal_scale,
            TimeSpeed::Slow => self.slow_scale,
        }
    }

    pub fn model_dt(&self, dt_seconds: f64) -> f64 {
        dt_seconds * self.scale()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stopwatch {
    pub running: bool,
    /// Accumulated model time, ps.
    time: f64,
}

impl Stopwatch {
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn step(&mut self, dt: f64) {
        if self.running {
            self.time += dt;
        }
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.time = 0.0;
    }
}
