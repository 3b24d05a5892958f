// diffusion/data.rs
// Particle counts and average temperature on one side of the divider

use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;
use crate::particle::Particle;
use crate::simulation::thermal::compute_temperature;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffusionData {
    pub number_of_particles1: usize,
    pub number_of_particles2: usize,
    /// K, `None` when this side is empty.
    pub average_temperature: Option<f64>,
}

impl DiffusionData {
    /// Recount the particles whose centre lies inside `bounds`.
    pub fn update(&mut self, bounds: &Bounds, particles1: &[Particle], particles2: &[Particle]) {
        let mut total_kinetic_energy = 0.0;
        let mut count = |particles: &[Particle]| {
            let mut n = 0usize;
            for p in particles.iter().filter(|p| bounds.contains_point(p.position)) {
                total_kinetic_energy += p.kinetic_energy();
                n += 1;
            }
            n
        };
        self.number_of_particles1 = count(particles1);
        self.number_of_particles2 = count(particles2);

        let n = self.number_of_particles1 + self.number_of_particles2;
        self.average_temperature = if n == 0 {
            None
        } else {
            compute_temperature(Some(total_kinetic_energy / n as f64))
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::Species;
    use crate::units::thermal_speed;

    fn particle_at(species: Species, x: f64, temperature: f64) -> Particle {
        let mut p = Particle::new_from_species(species);
        p.set_position(x, 100.0);
        p.set_velocity_polar(thermal_speed(temperature, p.mass), 0.3);
        p
    }

    #[test]
    fn counts_only_particles_inside() {
        let bounds = Bounds::new(-1000.0, 0.0, 0.0, 1000.0);
        let p1 = vec![particle_at(Species::DiffusionSpecies1, -500.0, 400.0)];
        let p2 = vec![
            particle_at(Species::DiffusionSpecies2, -200.0, 200.0),
            particle_at(Species::DiffusionSpecies2, 500.0, 900.0),
        ];
        let mut data = DiffusionData::default();
        data.update(&bounds, &p1, &p2);
        assert_eq!(data.number_of_particles1, 1);
        assert_eq!(data.number_of_particles2, 1);
        let t = data.average_temperature.unwrap();
        assert!((t - 300.0).abs() < 1e-9, "T = {t}");
    }

    #[test]
    fn empty_side_has_no_temperature() {
        let mut data = DiffusionData::default();
        data.update(&Bounds::new(0.0, 0.0, 1.0, 1.0), &[], &[]);
        assert_eq!(data.average_temperature, None);
    }
}
