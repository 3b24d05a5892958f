// diffusion/container.rs
// Fixed-width container split in two by a vertical divider

use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;
use crate::config::{self, SimConfig};
use crate::container::ParticleContainer;
use crate::particle::Particle;
use crate::species::Species;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiffusionContainer {
    /// Bottom-right corner, pm
    pub position: [f64; 2],
    pub width: f64,
    pub height: f64,
    pub wall_thickness: f64,
    pub divider_thickness: f64,
    has_divider: bool,
}

impl DiffusionContainer {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            position: config.container_position,
            width: config::DIFFUSION_CONTAINER_WIDTH,
            height: config.container_height,
            wall_thickness: config.wall_thickness,
            divider_thickness: config::DIFFUSION_DIVIDER_THICKNESS,
            has_divider: true,
        }
    }

    pub fn reset(&mut self) {
        self.has_divider = true;
    }

    pub fn has_divider(&self) -> bool {
        self.has_divider
    }

    pub(crate) fn set_has_divider(&mut self, has_divider: bool) {
        self.has_divider = has_divider;
    }

    pub fn left(&self) -> f64 {
        self.position[0] - self.width
    }

    pub fn right(&self) -> f64 {
        self.position[0]
    }

    pub fn bottom(&self) -> f64 {
        self.position[1]
    }

    pub fn top(&self) -> f64 {
        self.position[1] + self.height
    }

    /// x of the divider's centre line.
    pub fn divider_x(&self) -> f64 {
        self.left() + self.width / 2.0
    }

    /// The half left of the divider, excluding the divider itself.
    pub fn left_bounds(&self) -> Bounds {
        Bounds::new(
            self.left(),
            self.bottom(),
            self.divider_x() - self.divider_thickness / 2.0,
            self.top(),
        )
    }

    pub fn right_bounds(&self) -> Bounds {
        Bounds::new(
            self.divider_x() + self.divider_thickness / 2.0,
            self.bottom(),
            self.right(),
            self.top(),
        )
    }
}

impl ParticleContainer for DiffusionContainer {
    fn bounds(&self) -> Bounds {
        Bounds::new(self.left(), self.bottom(), self.right(), self.top())
    }

    fn max_bounds(&self) -> Bounds {
        self.bounds()
    }

    /// While the divider is in, each species is confined to the side it started on.
    fn wall_bounds_for(&self, particle: &Particle) -> Bounds {
        if !self.has_divider {
            return self.bounds();
        }
        match particle.species {
            Species::DiffusionSpecies2 => self.right_bounds(),
            _ => self.left_bounds(),
        }
    }
}
