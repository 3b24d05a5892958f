// simulation/particle_system.rs
// Owns the particle collections: pump, heat/cool, escape and temperature control

use log::debug;
use rand::rngs::StdRng;
use rand::Rng;

use crate::bounds::Bounds;
use crate::config::{self, SimConfig};
use crate::container::IdealGasContainer;
use crate::particle::Particle;
use crate::profile_scope;
use crate::species::Species;
use crate::units::{thermal_speed, BOLTZMANN};

pub struct ParticleSystem {
    /// Particles in the container, indexed by [`Species::slot`].
    pub inside: [Vec<Particle>; 2],
    /// Particles that escaped through the opening.
    pub outside: [Vec<Particle>; 2],
    /// x of the fixed right wall. Redistribution scales distances from it.
    right: f64,
    heat_cool_divisor: f64,
    cold_start_speed: f64,
    pump_dispersion_angle: f64,
    entry_height_fraction: f64,
    rng: StdRng,
}

impl ParticleSystem {
    pub fn new(config: &SimConfig, rng: StdRng) -> Self {
        Self {
            inside: [Vec::new(), Vec::new()],
            outside: [Vec::new(), Vec::new()],
            right: config.container_position[0],
            heat_cool_divisor: config.heat_cool_divisor,
            cold_start_speed: config.cold_start_speed,
            pump_dispersion_angle: config.pump_dispersion_angle,
            entry_height_fraction: config.particle_entry_height_fraction,
            rng,
        }
    }

    pub fn reset(&mut self) {
        self.remove_all_particles();
    }

    /// Particles inside the container.
    pub fn number_of_particles(&self) -> usize {
        self.inside.iter().map(Vec::len).sum()
    }

    pub fn number_of_species(&self, species: Species) -> usize {
        self.inside[species.slot()].len()
    }

    pub fn number_outside(&self) -> usize {
        self.outside.iter().map(Vec::len).sum()
    }

    /// Inside collections as one slice, the shape the collision detector works on.
    pub fn inside_mut(&mut self) -> &mut [Vec<Particle>] {
        &mut self.inside[..]
    }

    pub fn inside_particles(&self) -> impl Iterator<Item = &Particle> {
        self.inside.iter().flatten()
    }

    pub fn outside_particles(&self) -> impl Iterator<Item = &Particle> {
        self.outside.iter().flatten()
    }

    /// Pump `count` particles of a gas species into the container. They enter
    /// at the right wall with speed sqrt(3kT/m) inside a cone around -x.
    pub fn add_particles(
        &mut self,
        species: Species,
        count: usize,
        container: &IdealGasContainer,
        temperature: f64,
    ) {
        assert!(
            Species::GAS.contains(&species),
            "{species:?} cannot be pumped into the container"
        );
        assert!(temperature > 0.0, "temperature must be > 0, got {temperature}");
        let available = config::MAX_PARTICLES_PER_SPECIES.saturating_sub(self.number_of_species(species));
        let count = count.min(available);
        if count == 0 {
            return;
        }

        let x = container.right();
        let y = container.bottom() + container.height * self.entry_height_fraction;
        let particles = &mut self.inside[species.slot()];
        for _ in 0..count {
            let mut p = Particle::new_from_species(species);
            p.set_position(x - p.radius, y);
            let angle = std::f64::consts::PI - self.pump_dispersion_angle / 2.0
                + self.rng.random::<f64>() * self.pump_dispersion_angle;
            p.set_velocity_polar(thermal_speed(temperature, p.mass), angle);
            particles.push(p);
        }
        debug!("[particles] pumped {count} {species:?} at {temperature:.1} K");
    }

    /// Remove the `count` most recently added particles of `species`.
    pub fn remove_particles(&mut self, species: Species, count: usize) {
        let particles = &mut self.inside[species.slot()];
        let keep = particles.len().saturating_sub(count);
        particles.truncate(keep);
    }

    pub fn remove_all_particles(&mut self) {
        for particles in self.inside.iter_mut().chain(self.outside.iter_mut()) {
            particles.clear();
        }
    }

    /// Scale speeds by 1 + factor/divisor. A motionless particle under heat is
    /// kicked along +x at the cold-start speed.
    pub fn heat_cool(&mut self, factor: f64) {
        assert!(
            (-1.0..=1.0).contains(&factor),
            "heat/cool factor must be in [-1, 1], got {factor}"
        );
        if factor == 0.0 {
            return;
        }
        let scale = 1.0 + factor / self.heat_cool_divisor;
        for p in self.inside.iter_mut().flatten() {
            if factor > 0.0 && p.speed() == 0.0 {
                p.set_velocity_magnitude(self.cold_start_speed);
            } else {
                p.velocity *= scale;
            }
        }
    }

    pub fn step(&mut self, dt: f64) {
        profile_scope!("particle_step");
        assert!(dt > 0.0, "dt must be > 0, got {dt}");
        for p in self.inside.iter_mut().chain(self.outside.iter_mut()).flatten() {
            p.step(dt);
        }
    }

    /// Move particles that left through the opening to the outside
    /// collections. Returns how many escaped.
    pub fn escape_particles(&mut self, container: &IdealGasContainer) -> usize {
        if !container.is_open() {
            return 0;
        }
        let (opening_left, opening_right) = (container.opening_left(), container.opening_right());
        let top = container.top();
        let mut escaped = 0;
        for (inside, outside) in self.inside.iter_mut().zip(self.outside.iter_mut()) {
            let mut i = 0;
            while i < inside.len() {
                let p = &inside[i];
                if p.velocity.y > 0.0
                    && p.top() > top
                    && p.left() > opening_left
                    && p.right() < opening_right
                {
                    outside.push(inside.swap_remove(i));
                    escaped += 1;
                } else {
                    i += 1;
                }
            }
        }
        if escaped > 0 {
            debug!("[particles] {escaped} escaped through the opening");
        }
        escaped
    }

    /// Remap x positions after the width changed by `scale`, keeping each
    /// particle's relative distance from the right wall.
    pub fn redistribute_particles(&mut self, scale: f64) {
        assert!(scale > 0.0, "scale must be > 0, got {scale}");
        let right = self.right;
        for p in self.inside.iter_mut().flatten() {
            p.position.x = right - (right - p.position.x) * scale;
            p.previous_position = p.position;
        }
    }

    /// Set the speeds of all inside particles so that the average kinetic
    /// energy is (3/2)kT. Panics when there are no particles.
    pub fn set_temperature(&mut self, temperature: f64) {
        assert!(temperature >= 0.0, "temperature must be >= 0, got {temperature}");
        let Some(average) = self.average_kinetic_energy() else {
            panic!("set_temperature requires particles in the container");
        };
        let desired = 1.5 * BOLTZMANN * temperature;
        if average > 0.0 {
            let scale = (desired / average).sqrt();
            for p in self.inside.iter_mut().flatten() {
                p.velocity *= scale;
            }
        } else {
            for p in self.inside.iter_mut().flatten() {
                p.set_velocity_magnitude(thermal_speed(temperature, p.mass));
            }
        }
    }

    /// Mean ½mv² of the inside particles; `None` when there are none.
    pub fn average_kinetic_energy(&self) -> Option<f64> {
        let n = self.number_of_particles();
        if n == 0 {
            return None;
        }
        let total: f64 = self.inside_particles().map(Particle::kinetic_energy).sum();
        Some(total / n as f64)
    }

    /// Drop particles that are entirely outside `bounds`.
    pub fn remove_particles_out_of_bounds(&mut self, bounds: &Bounds) -> usize {
        let mut removed = 0;
        for particles in self.inside.iter_mut().chain(self.outside.iter_mut()) {
            let before = particles.len();
            particles.retain(|p| {
                p.right() >= bounds.min_x
                    && p.left() <= bounds.max_x
                    && p.top() >= bounds.min_y
                    && p.bottom() <= bounds.max_y
            });
            removed += before - particles.len();
        }
        if removed > 0 {
            debug!("[particles] removed {removed} out of bounds");
        }
        removed
    }
}
