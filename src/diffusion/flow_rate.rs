// diffusion/flow_rate.rs
// Rate at which one species crosses the divider line, averaged over a sliding window

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::config::FLOW_RATE_SAMPLE_PERIOD;
use crate::particle::Particle;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
struct FlowSample {
    dt: f64,
    to_left: usize,
    to_right: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleFlowRate {
    divider_x: f64,
    samples: VecDeque<FlowSample>,
    /// Particles/ps crossing right to left.
    left_flow_rate: f64,
    /// Particles/ps crossing left to right.
    right_flow_rate: f64,
}

impl ParticleFlowRate {
    pub fn new(divider_x: f64) -> Self {
        Self {
            divider_x,
            samples: VecDeque::new(),
            left_flow_rate: 0.0,
            right_flow_rate: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.left_flow_rate = 0.0;
        self.right_flow_rate = 0.0;
    }

    pub fn left_flow_rate(&self) -> f64 {
        self.left_flow_rate
    }

    pub fn right_flow_rate(&self) -> f64 {
        self.right_flow_rate
    }

    /// Count the crossings made during the last particle step.
    pub fn step(&mut self, dt: f64, particles: &[Particle]) {
        assert!(dt > 0.0, "dt must be > 0, got {dt}");
        let x = self.divider_x;
        let mut sample = FlowSample { dt, to_left: 0, to_right: 0 };
        for p in particles {
            if p.previous_position.x >= x && p.position.x < x {
                sample.to_left += 1;
            } else if p.previous_position.x <= x && p.position.x > x {
                sample.to_right += 1;
            }
        }
        self.samples.push_back(sample);

        let mut elapsed: f64 = self.samples.iter().map(|s| s.dt).sum();
        while elapsed > FLOW_RATE_SAMPLE_PERIOD && self.samples.len() > 1 {
            if let Some(oldest) = self.samples.pop_front() {
                elapsed -= oldest.dt;
            }
        }

        let to_left: usize = self.samples.iter().map(|s| s.to_left).sum();
        let to_right: usize = self.samples.iter().map(|s| s.to_right).sum();
        self.left_flow_rate = to_left as f64 / elapsed;
        self.right_flow_rate = to_right as f64 / elapsed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::Species;
    use ultraviolet::DVec2;

    fn crossing(from: f64, to: f64) -> Particle {
        let mut p = Particle::new_from_species(Species::DiffusionSpecies1);
        p.previous_position = DVec2::new(from, 0.0);
        p.position = DVec2::new(to, 0.0);
        p
    }

    #[test]
    fn counts_crossings_in_each_direction() {
        let mut rate = ParticleFlowRate::new(0.0);
        let particles = vec![crossing(-10.0, 10.0), crossing(-5.0, 3.0), crossing(8.0, -1.0), crossing(1.0, 2.0)];
        rate.step(0.5, &particles);
        assert_eq!(rate.right_flow_rate(), 4.0);
        assert_eq!(rate.left_flow_rate(), 2.0);
    }

    #[test]
    fn old_crossings_leave_the_window() {
        let mut rate = ParticleFlowRate::new(0.0);
        rate.step(1.0, &[crossing(-1.0, 1.0)]);
        for _ in 0..20 {
            rate.step(1.0, &[]);
        }
        assert_eq!(rate.right_flow_rate(), 0.0);
        rate.reset();
        assert_eq!(rate.left_flow_rate(), 0.0);
    }
}
