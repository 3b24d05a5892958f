// diffusion/model.rs
// The DiffusionModel struct: two species released into each other when the divider is lifted

use log::{debug, info};
use rand::rngs::StdRng;
use rand::Rng;

use crate::bounds::Bounds;
use crate::config::SimConfig;
use crate::error::Result;
use crate::particle::Particle;
use crate::profile_scope;
use crate::simulation::collision::CollisionDetector;
use crate::simulation::master_rng;
use crate::simulation::time::{Stopwatch, TimeTransform};
use crate::species::Species;
use crate::units::thermal_speed;

use super::container::DiffusionContainer;
use super::data::DiffusionData;
use super::flow_rate::ParticleFlowRate;
use super::settings::DiffusionSettings;

/// A side of the divider. Species 1 starts on the left, species 2 on the right.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn species(self) -> Species {
        match self {
            Side::Left => Species::DiffusionSpecies1,
            Side::Right => Species::DiffusionSpecies2,
        }
    }

    fn slot(self) -> usize {
        self.species().slot()
    }
}

pub struct DiffusionModel {
    pub container: DiffusionContainer,
    pub collision_detector: CollisionDetector,
    pub stopwatch: Stopwatch,
    pub time_transform: TimeTransform,
    settings: [DiffusionSettings; 2],
    /// Species 1, then species 2.
    particles: [Vec<Particle>; 2],
    data: [DiffusionData; 2],
    /// x of the centre of mass per species, pm.
    center_of_mass: [Option<f64>; 2],
    flow_rates: [ParticleFlowRate; 2],
    is_playing: bool,
    time: f64,
    rng: StdRng,
}

impl DiffusionModel {
    pub fn new(config: &SimConfig) -> Result<Self> {
        config.validate()?;
        let container = DiffusionContainer::new(config);
        let collision_detector = CollisionDetector::new(&container, config.region_length);
        let divider_x = container.divider_x();
        info!(
            "[diffusion] width {:.0} pm, divider at {:.0} pm",
            container.width, divider_x
        );
        Ok(Self {
            container,
            collision_detector,
            stopwatch: Stopwatch::default(),
            time_transform: TimeTransform::new(config),
            settings: [DiffusionSettings::default(); 2],
            particles: [Vec::new(), Vec::new()],
            data: [DiffusionData::default(); 2],
            center_of_mass: [None; 2],
            flow_rates: [ParticleFlowRate::new(divider_x), ParticleFlowRate::new(divider_x)],
            is_playing: true,
            time: 0.0,
            rng: master_rng(config.random_seed),
        })
    }

    pub fn reset(&mut self) {
        self.container.reset();
        self.collision_detector.reset();
        self.stopwatch.reset();
        self.time_transform.speed = Default::default();
        self.settings = [DiffusionSettings::default(); 2];
        for particles in self.particles.iter_mut() {
            particles.clear();
        }
        self.data = [DiffusionData::default(); 2];
        self.center_of_mass = [None; 2];
        for rate in self.flow_rates.iter_mut() {
            rate.reset();
        }
        self.is_playing = true;
        self.time = 0.0;
    }

    // --- read side ---

    pub fn settings(&self, side: Side) -> &DiffusionSettings {
        &self.settings[side.slot()]
    }

    /// Particles of the species that started on `side`.
    pub fn particles(&self, side: Side) -> &[Particle] {
        &self.particles[side.slot()]
    }

    pub fn number_of_particles(&self) -> usize {
        self.particles.iter().map(Vec::len).sum()
    }

    /// Counts and temperature of what is currently on `side`.
    pub fn data(&self, side: Side) -> &DiffusionData {
        &self.data[side.slot()]
    }

    pub fn center_of_mass(&self, side: Side) -> Option<f64> {
        self.center_of_mass[side.slot()]
    }

    pub fn flow_rate(&self, side: Side) -> &ParticleFlowRate {
        &self.flow_rates[side.slot()]
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    fn side_bounds(&self, side: Side) -> Bounds {
        match side {
            Side::Left => self.container.left_bounds(),
            Side::Right => self.container.right_bounds(),
        }
    }

    // --- commands ---

    pub fn set_playing(&mut self, playing: bool) {
        self.is_playing = playing;
    }

    pub fn set_number_of_particles(&mut self, side: Side, number_of_particles: usize) {
        DiffusionSettings::assert_number_of_particles(number_of_particles);
        self.settings[side.slot()].number_of_particles = number_of_particles;
        let current = self.particles[side.slot()].len();
        if number_of_particles > current {
            self.add_particles(side, number_of_particles - current);
        } else if number_of_particles < current {
            self.particles[side.slot()].truncate(number_of_particles);
        } else {
            return;
        }
        if !self.is_playing {
            self.update_center_of_mass();
            self.update_data();
        }
    }

    /// Changing mass keeps the side at its initial temperature, so speeds change.
    pub fn set_mass(&mut self, side: Side, mass: f64) {
        DiffusionSettings::assert_mass(mass);
        self.settings[side.slot()].mass = mass;
        self.update_mass_and_temperature(side);
    }

    pub fn set_initial_temperature(&mut self, side: Side, temperature: f64) {
        DiffusionSettings::assert_initial_temperature(temperature);
        self.settings[side.slot()].initial_temperature = temperature;
        self.update_mass_and_temperature(side);
        if !self.is_playing {
            self.update_data();
        }
    }

    /// While playing, collision detection pushes grown particles back inside.
    /// While paused they are moved inside their side immediately.
    pub fn set_radius(&mut self, side: Side, radius: f64) {
        DiffusionSettings::assert_radius(radius);
        self.settings[side.slot()].radius = radius;
        let bounds = self.side_bounds(side);
        let constrain = !self.is_playing;
        for p in self.particles[side.slot()].iter_mut() {
            p.radius = radius;
            if constrain {
                if p.left() < bounds.min_x {
                    p.set_left(bounds.min_x);
                } else if p.right() > bounds.max_x {
                    p.set_right(bounds.max_x);
                }
                if p.bottom() < bounds.min_y {
                    p.set_bottom(bounds.min_y);
                } else if p.top() > bounds.max_y {
                    p.set_top(bounds.max_y);
                }
            }
        }
    }

    /// Lifting the divider starts mixing. Putting it back restarts the
    /// experiment from fresh particles with the same settings.
    pub fn set_has_divider(&mut self, has_divider: bool) {
        if has_divider == self.container.has_divider() {
            return;
        }
        self.container.set_has_divider(has_divider);
        if has_divider {
            debug!("[diffusion] divider restored, restarting");
            self.restart();
        } else {
            debug!("[diffusion] divider removed");
        }
    }

    fn restart(&mut self) {
        for side in [Side::Left, Side::Right] {
            self.particles[side.slot()].clear();
            let n = self.settings[side.slot()].number_of_particles;
            self.add_particles(side, n);
        }
        for rate in self.flow_rates.iter_mut() {
            rate.reset();
        }
        self.update_center_of_mass();
        self.update_data();
    }

    /// Uniform positions inside the side, random directions, speed sqrt(3kT/m).
    fn add_particles(&mut self, side: Side, count: usize) {
        let settings = self.settings[side.slot()];
        let bounds = self.side_bounds(side);
        let r = settings.radius;
        let particles = &mut self.particles[side.slot()];
        for _ in 0..count {
            let mut p = Particle::new(side.species(), settings.mass, r);
            let x = self.rng.random_range(bounds.min_x + r..bounds.max_x - r);
            let y = self.rng.random_range(bounds.min_y + r..bounds.max_y - r);
            p.set_position(x, y);
            let angle = self.rng.random::<f64>() * std::f64::consts::TAU;
            p.set_velocity_polar(thermal_speed(settings.initial_temperature, p.mass), angle);
            particles.push(p);
        }
    }

    fn update_mass_and_temperature(&mut self, side: Side) {
        let settings = self.settings[side.slot()];
        let speed = thermal_speed(settings.initial_temperature, settings.mass);
        for p in self.particles[side.slot()].iter_mut() {
            p.mass = settings.mass;
            p.set_velocity_magnitude(speed);
        }
    }

    // --- stepping ---

    /// Advance by `dt` seconds of real time, if playing.
    pub fn step(&mut self, dt: f64) {
        assert!(dt > 0.0, "dt must be > 0, got {dt}");
        if self.is_playing {
            self.step_model_time(self.time_transform.model_dt(dt));
        }
    }

    /// Advance by `dt` ps of model time.
    pub fn step_model_time(&mut self, dt: f64) {
        profile_scope!("diffusion_step");
        assert!(dt > 0.0, "dt must be > 0, got {dt}");
        self.time += dt;
        self.stopwatch.step(dt);

        for particles in self.particles.iter_mut() {
            for p in particles.iter_mut() {
                p.step(dt);
            }
        }
        if !self.container.has_divider() {
            for (rate, particles) in self.flow_rates.iter_mut().zip(&self.particles) {
                rate.step(dt, particles);
            }
        }
        self.collision_detector
            .update(&self.container, &mut self.particles, dt);
        self.update_center_of_mass();
        self.update_data();
    }

    fn update_center_of_mass(&mut self) {
        for (com, particles) in self.center_of_mass.iter_mut().zip(&self.particles) {
            *com = center_x_of_mass(particles);
        }
    }

    fn update_data(&mut self) {
        let [particles1, particles2] = &self.particles;
        let left = self.container.left_bounds();
        let right = self.container.right_bounds();
        self.data[0].update(&left, particles1, particles2);
        self.data[1].update(&right, particles1, particles2);
    }
}

/// Mass-weighted mean x, `None` for no particles.
pub fn center_x_of_mass(particles: &[Particle]) -> Option<f64> {
    if particles.is_empty() {
        return None;
    }
    let (moment, total_mass) = particles
        .iter()
        .fold((0.0, 0.0), |(m, t), p| (m + p.mass * p.position.x, t + p.mass));
    Some(moment / total_mass)
}
