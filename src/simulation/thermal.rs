// simulation/thermal.rs
// Temperature derived from the kinetic energy of the particles

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::units::BOLTZMANN;

use super::particle_system::ParticleSystem;

/// T = (2/3)·KE_avg / k, `None` for an empty container.
pub fn compute_temperature(average_kinetic_energy: Option<f64>) -> Option<f64> {
    average_kinetic_energy.map(|ke| (2.0 / 3.0) * ke / BOLTZMANN)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemperatureModel {
    temperature: Option<f64>,
    /// When enabled, pumped particles use `initial_temperature` instead of the
    /// temperature of the container.
    pub control_temperature_enabled: bool,
    pub initial_temperature: f64,
    default_initial_temperature: f64,
}

impl TemperatureModel {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            temperature: None,
            control_temperature_enabled: false,
            initial_temperature: config.initial_temperature,
            default_initial_temperature: config.initial_temperature,
        }
    }

    pub fn reset(&mut self) {
        self.temperature = None;
        self.control_temperature_enabled = false;
        self.initial_temperature = self.default_initial_temperature;
    }

    /// Last computed temperature, K.
    pub fn temperature(&self) -> Option<f64> {
        self.temperature
    }

    pub fn update(&mut self, particle_system: &ParticleSystem) {
        self.temperature = compute_temperature(particle_system.average_kinetic_energy());
    }

    pub(crate) fn set_temperature(&mut self, temperature: Option<f64>) {
        self.temperature = temperature;
    }

    /// Temperature given to particles entering the container.
    pub fn initial_temperature(&self) -> f64 {
        if self.control_temperature_enabled {
            self.initial_temperature
        } else {
            self.temperature.unwrap_or(self.default_initial_temperature)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::IdealGasContainer;
    use crate::species::Species;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn empty_container_has_no_temperature() {
        let config = SimConfig::default();
        let ps = ParticleSystem::new(&config, StdRng::seed_from_u64(3));
        let mut model = TemperatureModel::new(&config);
        model.update(&ps);
        assert_eq!(model.temperature(), None);
        assert_eq!(model.initial_temperature(), config.initial_temperature);
    }

    #[test]
    fn pumped_particles_report_their_temperature() {
        let config = SimConfig::default();
        let container = IdealGasContainer::new(&config);
        let mut ps = ParticleSystem::new(&config, StdRng::seed_from_u64(3));
        ps.add_particles(Species::Heavy, 10, &container, 275.0);
        ps.add_particles(Species::Light, 10, &container, 275.0);
        let mut model = TemperatureModel::new(&config);
        model.update(&ps);
        let t = model.temperature().unwrap();
        assert!((t - 275.0).abs() < 1e-9, "T = {t}");
        assert_eq!(model.initial_temperature(), t);
    }

    #[test]
    fn controlled_initial_temperature_wins() {
        let config = SimConfig::default();
        let mut model = TemperatureModel::new(&config);
        model.set_temperature(Some(800.0));
        assert_eq!(model.initial_temperature(), 800.0);
        model.control_temperature_enabled = true;
        model.initial_temperature = 120.0;
        assert_eq!(model.initial_temperature(), 120.0);
        model.reset();
        assert_eq!(model.temperature(), None);
        assert!(!model.control_temperature_enabled);
    }
}
