// diffusion/settings.rs
// Per-side experiment settings, fixed while the divider is in

use serde::{Deserialize, Serialize};

use crate::config::{
    DIFFUSION_MASS_DEFAULT, DIFFUSION_MASS_RANGE, DIFFUSION_PARTICLES_RANGE,
    DIFFUSION_RADIUS_DEFAULT, DIFFUSION_RADIUS_RANGE, DIFFUSION_TEMPERATURE_DEFAULT,
    DIFFUSION_TEMPERATURE_RANGE,
};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffusionSettings {
    pub number_of_particles: usize,
    /// amu
    pub mass: f64,
    /// pm
    pub radius: f64,
    /// K
    pub initial_temperature: f64,
}

impl Default for DiffusionSettings {
    fn default() -> Self {
        Self {
            number_of_particles: DIFFUSION_PARTICLES_RANGE.0,
            mass: DIFFUSION_MASS_DEFAULT,
            radius: DIFFUSION_RADIUS_DEFAULT,
            initial_temperature: DIFFUSION_TEMPERATURE_DEFAULT,
        }
    }
}

impl DiffusionSettings {
    pub fn assert_number_of_particles(n: usize) {
        let (min, max) = DIFFUSION_PARTICLES_RANGE;
        assert!((min..=max).contains(&n), "number of particles {n} outside {min}..={max}");
    }

    pub fn assert_mass(mass: f64) {
        let (min, max) = DIFFUSION_MASS_RANGE;
        assert!((min..=max).contains(&mass), "mass {mass} outside {min}..={max}");
    }

    pub fn assert_radius(radius: f64) {
        let (min, max) = DIFFUSION_RADIUS_RANGE;
        assert!((min..=max).contains(&radius), "radius {radius} outside {min}..={max}");
    }

    pub fn assert_initial_temperature(temperature: f64) {
        let (min, max) = DIFFUSION_TEMPERATURE_RANGE;
        assert!(
            (min..=max).contains(&temperature),
            "initial temperature {temperature} outside {min}..={max}"
        );
    }
}
