// commands.rs
// SimCommand messages and their dispatch onto the models

use log::{info, warn};
use std::path::PathBuf;

use crate::diffusion::{DiffusionModel, Side};
use crate::io::{load_state, save_state};
use crate::simulation::time::TimeSpeed;
use crate::simulation::{HoldConstant, IdealGasLawModel};
use crate::species::Species;

#[cfg(feature = "profiling")]
use crate::PROFILER;

/// Real time advanced by a single-step command, s.
pub const STEP_ONCE_SECONDS: f64 = 1.0 / 60.0;

/// Write operations on an [`IdealGasLawModel`].
#[derive(Clone, Debug, PartialEq)]
pub enum SimCommand {
    SetPlaying(bool),
    StepOnce,
    Reset,
    AddParticles { species: Species, count: usize },
    RemoveParticles { species: Species, count: usize },
    RemoveAllParticles,
    SetHoldConstant(HoldConstant),
    SetHeatCoolFactor(f64),
    SetParticleCollisions(bool),
    ResizeContainer { width: f64 },
    SetLidWidth(f64),
    BlowLidOff,
    ReturnLid,
    SetTimeSpeed(TimeSpeed),
    /// `Some(T)` pumps new particles at T, `None` at the container temperature.
    SetInitialTemperature(Option<f64>),
    SetCollisionCounterRunning(bool),
    SetCollisionCounterPeriod(f64),
    SetStopwatchRunning(bool),
    SaveState { path: PathBuf },
    LoadState { path: PathBuf },
}

/// Write operations on a [`DiffusionModel`].
#[derive(Clone, Debug, PartialEq)]
pub enum DiffusionCommand {
    SetPlaying(bool),
    StepOnce,
    Reset,
    SetNumberOfParticles { side: Side, count: usize },
    SetMass { side: Side, mass: f64 },
    SetRadius { side: Side, radius: f64 },
    SetInitialTemperature { side: Side, temperature: f64 },
    SetDivider(bool),
    SetTimeSpeed(TimeSpeed),
}

/// Process a single SimCommand
pub fn process_command(cmd: SimCommand, model: &mut IdealGasLawModel) {
    match cmd {
        SimCommand::SetPlaying(playing) => model.set_playing(playing),
        SimCommand::StepOnce => handle_step_once(model),
        SimCommand::Reset => {
            info!("[command] reset");
            model.reset();
        }
        SimCommand::AddParticles { species, count } => model.add_particles(species, count),
        SimCommand::RemoveParticles { species, count } => model.remove_particles(species, count),
        SimCommand::RemoveAllParticles => model.remove_all_particles(),
        SimCommand::SetHoldConstant(mode) => model.set_hold_constant(mode),
        SimCommand::SetHeatCoolFactor(factor) => model.set_heat_cool_factor(factor),
        SimCommand::SetParticleCollisions(enabled) => model.set_particle_collisions_enabled(enabled),
        SimCommand::ResizeContainer { width } => model.request_container_resize(width),
        SimCommand::SetLidWidth(lid_width) => model.set_lid_width(lid_width),
        SimCommand::BlowLidOff => model.blow_lid_off(),
        SimCommand::ReturnLid => model.request_lid_return(),
        SimCommand::SetTimeSpeed(speed) => model.time_transform.speed = speed,
        SimCommand::SetInitialTemperature(temperature) => {
            handle_set_initial_temperature(model, temperature)
        }
        SimCommand::SetCollisionCounterRunning(running) => {
            model.collision_counter.set_running(running)
        }
        SimCommand::SetCollisionCounterPeriod(period) => {
            model.collision_counter.set_sample_period(period)
        }
        SimCommand::SetStopwatchRunning(running) => model.stopwatch.running = running,
        SimCommand::SaveState { path } => handle_save_state(model, path),
        SimCommand::LoadState { path } => handle_load_state(model, path),
    }
}

pub fn process_diffusion_command(cmd: DiffusionCommand, model: &mut DiffusionModel) {
    match cmd {
        DiffusionCommand::SetPlaying(playing) => model.set_playing(playing),
        DiffusionCommand::StepOnce => {
            let dt = model.time_transform.model_dt(STEP_ONCE_SECONDS);
            model.step_model_time(dt);
        }
        DiffusionCommand::Reset => model.reset(),
        DiffusionCommand::SetNumberOfParticles { side, count } => {
            model.set_number_of_particles(side, count)
        }
        DiffusionCommand::SetMass { side, mass } => model.set_mass(side, mass),
        DiffusionCommand::SetRadius { side, radius } => model.set_radius(side, radius),
        DiffusionCommand::SetInitialTemperature { side, temperature } => {
            model.set_initial_temperature(side, temperature)
        }
        DiffusionCommand::SetDivider(has_divider) => model.set_has_divider(has_divider),
        DiffusionCommand::SetTimeSpeed(speed) => model.time_transform.speed = speed,
    }
}

fn handle_step_once(model: &mut IdealGasLawModel) {
    model.step_manual(STEP_ONCE_SECONDS);
    #[cfg(feature = "profiling")]
    {
        PROFILER.lock().log_and_clear();
    }
}

fn handle_set_initial_temperature(model: &mut IdealGasLawModel, temperature: Option<f64>) {
    match temperature {
        Some(t) => {
            assert!(t > 0.0, "initial temperature must be > 0, got {t}");
            model.temperature_model.control_temperature_enabled = true;
            model.temperature_model.initial_temperature = t;
        }
        None => model.temperature_model.control_temperature_enabled = false,
    }
}

fn handle_save_state(model: &IdealGasLawModel, path: PathBuf) {
    if let Err(e) = save_state(&path, model) {
        warn!("[command] failed to save {}: {e}", path.display());
    }
}

fn handle_load_state(model: &mut IdealGasLawModel, path: PathBuf) {
    match load_state(&path) {
        Ok(state) => {
            state.apply_to(model);
            info!(
                "[command] loaded {} particles from {}",
                model.number_of_particles(),
                path.display()
            );
        }
        Err(e) => warn!("[command] failed to load {}: {e}", path.display()),
    }
}
