// species.rs
// Per-species particle properties

use serde::{Deserialize, Serialize};

use crate::config;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Species {
    Heavy,
    Light,
    DiffusionSpecies1,
    DiffusionSpecies2,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeciesProps {
    pub mass: f64,
    pub radius: f64,
}

impl Species {
    /// Species pumped into the ideal-gas container.
    pub const GAS: [Species; 2] = [Species::Heavy, Species::Light];
    pub const DIFFUSION: [Species; 2] = [Species::DiffusionSpecies1, Species::DiffusionSpecies2];

    /// Default properties. Diffusion species are adjustable per experiment, so
    /// these are only their starting values.
    pub fn props(self) -> SpeciesProps {
        match self {
            Species::Heavy => SpeciesProps {
                mass: config::HEAVY_PARTICLE_MASS,
                radius: config::HEAVY_PARTICLE_RADIUS,
            },
            Species::Light => SpeciesProps {
                mass: config::LIGHT_PARTICLE_MASS,
                radius: config::LIGHT_PARTICLE_RADIUS,
            },
            Species::DiffusionSpecies1 | Species::DiffusionSpecies2 => SpeciesProps {
                mass: config::DIFFUSION_MASS_DEFAULT,
                radius: config::DIFFUSION_RADIUS_DEFAULT,
            },
        }
    }

    pub fn mass(self) -> f64 {
        self.props().mass
    }

    pub fn radius(self) -> f64 {
        self.props().radius
    }

    /// Index of this species inside a pair of per-species collections.
    pub fn slot(self) -> usize {
        match self {
            Species::Heavy | Species::DiffusionSpecies1 => 0,
            Species::Light | Species::DiffusionSpecies2 => 1,
        }
    }
}

/// Largest default radius of any species, used to size collision regions.
pub fn max_radius() -> f64 {
    use Species::*;
    [Heavy, Light, DiffusionSpecies1, DiffusionSpecies2]
        .iter()
        .map(|s| s.radius())
        .fold(config::DIFFUSION_RADIUS_RANGE.1, f64::max)
}
