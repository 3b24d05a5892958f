// particle/types.rs
// The Particle struct and its kinematics

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use ultraviolet::DVec2;

use crate::species::Species;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub id: u64,
    pub species: Species,
    pub mass: f64,   // amu
    pub radius: f64, // pm
    pub position: DVec2,
    /// Position before the most recent step, used to detect divider crossings.
    pub previous_position: DVec2,
    pub velocity: DVec2, // pm/ps
}

impl Particle {
    pub fn new(species: Species, mass: f64, radius: f64) -> Self {
        assert!(mass > 0.0, "particle mass must be > 0, got {mass}");
        assert!(radius > 0.0, "particle radius must be > 0, got {radius}");
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            species,
            mass,
            radius,
            position: DVec2::zero(),
            previous_position: DVec2::zero(),
            velocity: DVec2::zero(),
        }
    }

    /// Create a particle with the default mass and radius of `species`.
    pub fn new_from_species(species: Species) -> Self {
        let props = species.props();
        Self::new(species, props.mass, props.radius)
    }

    /// Free flight: position += velocity * dt.
    #[inline]
    pub fn step(&mut self, dt: f64) {
        assert!(dt > 0.0, "dt must be > 0, got {dt}");
        self.previous_position = self.position;
        self.position += self.velocity * dt;
    }

    /// Place the particle without leaving a trail for crossing detection.
    pub fn set_position(&mut self, x: f64, y: f64) {
        self.position = DVec2::new(x, y);
        self.previous_position = self.position;
    }

    pub fn set_velocity_polar(&mut self, speed: f64, angle: f64) {
        assert!(speed >= 0.0, "speed must be >= 0, got {speed}");
        self.velocity = DVec2::new(angle.cos(), angle.sin()) * speed;
    }

    /// Rescale the velocity keeping its direction. A motionless particle is
    /// given a direction along +x.
    pub fn set_velocity_magnitude(&mut self, speed: f64) {
        assert!(speed >= 0.0, "speed must be >= 0, got {speed}");
        let current = self.velocity.mag();
        if current > 0.0 {
            self.velocity *= speed / current;
        } else {
            self.velocity = DVec2::new(speed, 0.0);
        }
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.velocity.mag()
    }

    /// ½mv², in amu·pm²/ps².
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.mag_sq()
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.position.x - self.radius
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.position.x + self.radius
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.position.y - self.radius
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.position.y + self.radius
    }

    pub fn set_left(&mut self, left: f64) {
        self.position.x = left + self.radius;
    }

    pub fn set_right(&mut self, right: f64) {
        self.position.x = right - self.radius;
    }

    pub fn set_bottom(&mut self, bottom: f64) {
        self.position.y = bottom + self.radius;
    }

    pub fn set_top(&mut self, top: f64) {
        self.position.y = top - self.radius;
    }

    /// Does this particle overlap `other`? Touching is not overlapping.
    #[inline]
    pub fn overlaps(&self, other: &Particle) -> bool {
        let r = self.radius + other.radius;
        (other.position - self.position).mag_sq() < r * r
    }
}
