// simulation/simulation.rs
// The IdealGasLawModel struct: per-step pipeline and the Hold Constant state machine

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::mpsc::Sender;

use crate::bounds::Bounds;
use crate::config::SimConfig;
use crate::container::{IdealGasContainer, ParticleContainer};
use crate::error::Result;
use crate::profile_scope;
use crate::species::Species;
use crate::units::from_kilopascals;

use super::collision::CollisionDetector;
use super::collision_counter::CollisionCounter;
use super::hold_constant::{self, Fault, GuardInput, HoldConstant};
use super::particle_system::ParticleSystem;
use super::pressure::PressureModel;
use super::thermal::{compute_temperature, TemperatureModel};
use super::time::{Stopwatch, TimeTransform};

/// Master RNG for a run: seeded from the config, or from the OS.
pub fn master_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => SeedableRng::seed_from_u64(s),
        None => SeedableRng::seed_from_u64(rand::rng().random()),
    }
}

/// Ideal gas in a container, kept consistent with PV = NkT.
pub struct IdealGasLawModel {
    pub config: SimConfig,
    pub container: IdealGasContainer,
    pub particle_system: ParticleSystem,
    pub collision_detector: CollisionDetector,
    pub temperature_model: TemperatureModel,
    pub pressure_model: PressureModel,
    pub collision_counter: CollisionCounter,
    pub stopwatch: Stopwatch,
    pub time_transform: TimeTransform,
    pub(crate) hold_constant: HoldConstant,
    pub(crate) heat_cool_factor: f64,
    pub(crate) is_playing: bool,
    /// Total model time, ps.
    pub(crate) time: f64,
    /// Particles beyond these bounds are deleted.
    model_bounds: Bounds,
    /// Temperature latched when Temperature is held.
    pub(crate) held_temperature: Option<f64>,
    pub(crate) previous_number_of_particles: usize,
    fault_tx: Option<Sender<Fault>>,
}

impl IdealGasLawModel {
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = master_rng(config.random_seed);
        let container = IdealGasContainer::new(&config);
        let model_bounds = container.max_bounds().padded(config.model_bounds_padding);
        let particle_system =
            ParticleSystem::new(&config, StdRng::seed_from_u64(rng.random()));
        let pressure_model = PressureModel::new(&config, StdRng::seed_from_u64(rng.random()));
        let collision_detector = CollisionDetector::new(&container, config.region_length);
        info!(
            "[model] width {:.0} pm in [{:.0}, {:.0}], seed {:?}",
            container.width(),
            config.width_min,
            config.width_max,
            config.random_seed
        );
        Ok(Self {
            container,
            particle_system,
            collision_detector,
            temperature_model: TemperatureModel::new(&config),
            pressure_model,
            collision_counter: CollisionCounter::new(&config.collision_counter_sample_periods),
            stopwatch: Stopwatch::default(),
            time_transform: TimeTransform::new(&config),
            hold_constant: HoldConstant::Nothing,
            heat_cool_factor: 0.0,
            is_playing: true,
            time: 0.0,
            model_bounds,
            held_temperature: None,
            previous_number_of_particles: 0,
            fault_tx: None,
            config,
        })
    }

    /// Faults are sent here as well as logged.
    pub fn set_fault_sender(&mut self, tx: Sender<Fault>) {
        self.fault_tx = Some(tx);
    }

    pub fn reset(&mut self) {
        self.hold_constant = HoldConstant::Nothing;
        self.heat_cool_factor = 0.0;
        self.is_playing = true;
        self.time = 0.0;
        self.held_temperature = None;
        self.previous_number_of_particles = 0;
        self.container.reset();
        self.particle_system.reset();
        self.collision_detector.reset();
        self.temperature_model.reset();
        self.pressure_model.reset();
        self.collision_counter.reset();
        self.stopwatch.reset();
        self.time_transform.speed = Default::default();
    }

    // --- read side ---

    pub fn hold_constant(&self) -> HoldConstant {
        self.hold_constant
    }

    pub fn heat_cool_factor(&self) -> f64 {
        self.heat_cool_factor
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn model_bounds(&self) -> Bounds {
        self.model_bounds
    }

    pub fn number_of_particles(&self) -> usize {
        self.particle_system.number_of_particles()
    }

    /// K
    pub fn temperature(&self) -> Option<f64> {
        self.temperature_model.temperature()
    }

    /// kPa
    pub fn pressure(&self) -> Option<f64> {
        self.pressure_model.pressure()
    }

    /// pm³
    pub fn volume(&self) -> f64 {
        self.container.volume()
    }

    pub fn particle_particle_collisions_enabled(&self) -> bool {
        self.collision_detector.particle_particle_collisions_enabled
    }

    // --- commands ---

    pub fn set_playing(&mut self, playing: bool) {
        self.is_playing = playing;
    }

    pub fn set_heat_cool_factor(&mut self, factor: f64) {
        assert!(
            (-1.0..=1.0).contains(&factor),
            "heat/cool factor must be in [-1, 1], got {factor}"
        );
        self.heat_cool_factor = factor;
    }

    pub fn set_particle_collisions_enabled(&mut self, enabled: bool) {
        self.collision_detector.particle_particle_collisions_enabled = enabled;
    }

    /// Switch Hold Constant mode. The guards run immediately, so a mode that
    /// cannot be satisfied falls straight back to Nothing with a fault.
    pub fn set_hold_constant(&mut self, mode: HoldConstant) {
        if mode == self.hold_constant {
            return;
        }
        debug!("[hold-constant] {:?} -> {:?}", self.hold_constant, mode);
        self.hold_constant = mode;
        self.held_temperature = match mode {
            HoldConstant::Temperature => {
                compute_temperature(self.particle_system.average_kinetic_energy())
            }
            _ => None,
        };
        self.check_guards();
    }

    /// User drag of the left wall. Ignored while the model owns the width.
    pub fn request_container_resize(&mut self, width: f64) {
        if self.hold_constant.fixes_width() {
            debug!("[container] resize ignored while holding {:?}", self.hold_constant);
            return;
        }
        if self.container.left_wall_does_work {
            self.container.request_resize(width);
        } else {
            // a passive wall jumps, and the gas is spread into the new width
            let previous_width = self.container.width();
            self.container.resize_immediately(width);
            self.particle_system
                .redistribute_particles(self.container.width() / previous_width);
            self.collision_counter.set_running(false);
            self.update_when_paused();
        }
    }

    pub fn set_lid_width(&mut self, lid_width: f64) {
        self.container.set_lid_width(lid_width);
        self.check_guards();
    }

    pub fn blow_lid_off(&mut self) {
        self.container.blow_lid_off();
        self.check_guards();
    }

    pub fn request_lid_return(&mut self) {
        self.container.return_lid();
    }

    /// Pump particles in at the initial temperature.
    pub fn add_particles(&mut self, species: Species, count: usize) {
        let temperature = self.temperature_model.initial_temperature();
        self.particle_system
            .add_particles(species, count, &self.container, temperature);
        self.number_of_particles_changed();
    }

    pub fn remove_particles(&mut self, species: Species, count: usize) {
        self.particle_system.remove_particles(species, count);
        self.number_of_particles_changed();
    }

    pub fn remove_all_particles(&mut self) {
        self.particle_system.remove_all_particles();
        self.number_of_particles_changed();
    }

    fn number_of_particles_changed(&mut self) {
        self.check_guards();
        self.restore_held_temperature();
        if !self.is_playing {
            self.update_when_paused();
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

    /// Advance by `dt` seconds of real time, playing or not.
    pub fn step_manual(&mut self, dt: f64) {
        assert!(dt > 0.0, "dt must be > 0, got {dt}");
        self.step_model_time(self.time_transform.model_dt(dt));
    }

    /// Advance by `dt` ps of model time. Order matters.
    pub fn step_model_time(&mut self, dt: f64) {
        profile_scope!("model_step");
        assert!(dt > 0.0, "dt must be > 0, got {dt}");
        self.time += dt;
        self.stopwatch.step(dt);
        self.step_system(dt);
        let wall_impulse = self.collision_detector.wall_impulse();
        self.update_model(dt, wall_impulse);
    }

    fn step_system(&mut self, dt: f64) {
        // heating is disabled while temperature is held
        if self.hold_constant != HoldConstant::Temperature {
            self.particle_system.heat_cool(self.heat_cool_factor);
        }
        self.particle_system.step(dt);
        self.particle_system.escape_particles(&self.container);
        self.container.step(dt);
        self.collision_detector
            .update(&self.container, self.particle_system.inside_mut(), dt);
        self.particle_system
            .remove_particles_out_of_bounds(&self.model_bounds);
        self.collision_counter.step(
            dt,
            self.collision_detector.number_of_particle_container_collisions(),
        );
    }

    fn update_model(&mut self, dt: f64, wall_impulse: f64) {
        // escapes and cleanup may have changed N or opened the container
        self.check_guards();
        self.compensate_for_hold_constant();
        self.temperature_model.update(&self.particle_system);
        self.pressure_model.update(
            dt,
            wall_impulse,
            self.particle_system.number_of_particles(),
            &self.container,
            self.hold_constant.holds_pressure(),
        );
        if let Some(pressure) = self.pressure_model.pressure() {
            if pressure > self.config.max_pressure && self.container.is_lid_on() {
                warn!("[pressure] {pressure:.0} kPa exceeds {:.0} kPa", self.config.max_pressure);
                self.container.blow_lid_off();
            }
        }
        self.verify_model();
        self.previous_number_of_particles = self.particle_system.number_of_particles();
    }

    /// Bring derived quantities up to date without advancing time.
    pub fn update_when_paused(&mut self) {
        if self.is_playing {
            return;
        }
        self.check_guards();
        self.compensate_for_hold_constant();
        self.temperature_model.update(&self.particle_system);
        self.pressure_model
            .refresh(self.particle_system.number_of_particles(), &self.container);
        self.verify_model();
        self.previous_number_of_particles = self.particle_system.number_of_particles();
    }

    fn guard_input(&self) -> GuardInput {
        GuardInput {
            hold_constant: self.hold_constant,
            number_of_particles: self.particle_system.number_of_particles(),
            pressure: self.pressure_model.settled_pressure(),
            container_open: self.container.is_open(),
        }
    }

    /// Drop to Nothing when the held quantity cannot be satisfied.
    fn check_guards(&mut self) {
        if let Some(fault) = hold_constant::check_guards(&self.guard_input()) {
            self.hold_constant = HoldConstant::Nothing;
            self.held_temperature = None;
            self.emit(fault);
        }
    }

    fn restore_held_temperature(&mut self) {
        let n = self.particle_system.number_of_particles();
        if self.hold_constant == HoldConstant::Temperature
            && n > 0
            && n < self.previous_number_of_particles
        {
            if let Some(held) = self.held_temperature {
                self.particle_system.set_temperature(held);
            }
        }
        self.previous_number_of_particles = n;
    }

    fn compensate_for_hold_constant(&mut self) {
        match self.hold_constant {
            HoldConstant::Nothing | HoldConstant::Volume => {}
            HoldConstant::Temperature => self.restore_held_temperature(),
            HoldConstant::PressureV => self.hold_pressure_by_volume(),
            HoldConstant::PressureT => self.hold_pressure_by_temperature(),
        }
    }

    /// V = NkT/P with the previous pressure reading.
    fn hold_pressure_by_volume(&mut self) {
        let n = self.particle_system.number_of_particles();
        let (Some(pressure), Some(temperature)) = (
            self.pressure_model.settled_pressure(),
            compute_temperature(self.particle_system.average_kinetic_energy()),
        ) else {
            return;
        };
        let volume = hold_constant::ideal_volume(n, temperature, from_kilopascals(pressure));
        let width = volume / (self.container.height * self.container.depth);
        let (width, fault) = hold_constant::constrain_ideal_width(width, &self.container.width_range);
        if let Some(fault) = fault {
            self.hold_constant = HoldConstant::Nothing;
            self.emit(fault);
        }
        let previous_width = self.container.width();
        self.container.resize_immediately(width);
        self.particle_system
            .redistribute_particles(self.container.width() / previous_width);
    }

    /// T = PV/(Nk), forced onto the particles.
    fn hold_pressure_by_temperature(&mut self) {
        let n = self.particle_system.number_of_particles();
        let Some(pressure) = self.pressure_model.settled_pressure() else {
            return;
        };
        let temperature =
            hold_constant::ideal_temperature(from_kilopascals(pressure), self.container.volume(), n);
        self.particle_system.set_temperature(temperature);
    }

    /// Hard reset of the container once the maximum temperature is reached.
    fn verify_model(&mut self) {
        self.check_guards();
        if hold_constant::maximum_temperature_exceeded(
            self.temperature_model.temperature(),
            self.config.max_temperature,
        ) {
            warn!(
                "[hold-constant] maximum temperature reached: {:?} K",
                self.temperature_model.temperature()
            );
            // leave pressure and temperature modes first so that emptying the
            // container raises no other fault
            if !matches!(self.hold_constant, HoldConstant::Nothing | HoldConstant::Volume) {
                self.hold_constant = HoldConstant::Nothing;
                self.held_temperature = None;
            }
            self.particle_system.remove_all_particles();
            self.container.return_lid();
            self.temperature_model.update(&self.particle_system);
            self.pressure_model
                .refresh(self.particle_system.number_of_particles(), &self.container);
            self.emit(Fault::MaximumTemperature);
        }
    }

    fn emit(&mut self, fault: Fault) {
        warn!("[hold-constant] oops: {fault}, holding {:?}", self.hold_constant);
        if let Some(tx) = &self.fault_tx {
            let _ = tx.send(fault);
        }
    }
}
