// init_config.rs
// Handles loading the initial model setup from a TOML file

use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::{
    SimConfig, DIFFUSION_MASS_RANGE, DIFFUSION_PARTICLES_RANGE, DIFFUSION_RADIUS_RANGE,
    DIFFUSION_TEMPERATURE_RANGE, MAX_PARTICLES_PER_SPECIES,
};
use crate::diffusion::{DiffusionModel, DiffusionSettings, Side};
use crate::error::{ConfigError, Result};
use crate::simulation::{HoldConstant, IdealGasLawModel};
use crate::species::Species;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct InitConfig {
    /// Overrides of the compiled-in defaults. Omitted fields keep their default.
    pub simulation: Option<SimConfig>,
    #[serde(default)]
    pub particles: ParticlesConfig,
    pub diffusion: Option<DiffusionConfig>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ParticlesConfig {
    pub heavy: usize,
    pub light: usize,
    /// Temperature of pumped particles, K. The container temperature when omitted.
    pub initial_temperature: Option<f64>,
    pub hold_constant: HoldConstant,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DiffusionConfig {
    pub left: DiffusionSettings,
    pub right: DiffusionSettings,
}

impl InitConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn load_default() -> Result<Self> {
        Self::load_from_file("init_config.toml")
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: InitConfig = toml::from_str(content)?;
        Ok(config)
    }

    pub fn sim_config(&self) -> SimConfig {
        self.simulation.clone().unwrap_or_default()
    }

    /// Ideal-gas model with the configured particles pumped in and the
    /// configured mode selected. An unsatisfiable mode is rejected here
    /// instead of being raised as a fault.
    pub fn build_model(&self) -> Result<IdealGasLawModel> {
        let p = &self.particles;
        for (name, n) in [("heavy", p.heavy), ("light", p.light)] {
            if n > MAX_PARTICLES_PER_SPECIES {
                return Err(ConfigError::InvalidParam(format!(
                    "particles.{name} = {n} exceeds {MAX_PARTICLES_PER_SPECIES}"
                )));
            }
        }
        if let Some(t) = p.initial_temperature {
            if t.is_nan() || t <= 0.0 {
                return Err(ConfigError::InvalidParam(format!(
                    "particles.initial_temperature must be > 0, got {t}"
                )));
            }
        }
        if p.hold_constant.requires_particles() && p.heavy + p.light == 0 {
            return Err(ConfigError::InvalidParam(format!(
                "particles.hold_constant = {:?} needs particles",
                p.hold_constant
            )));
        }

        let mut model = IdealGasLawModel::new(self.sim_config())?;
        if let Some(t) = p.initial_temperature {
            model.temperature_model.control_temperature_enabled = true;
            model.temperature_model.initial_temperature = t;
        }
        model.add_particles(Species::Heavy, p.heavy);
        model.add_particles(Species::Light, p.light);
        model.set_hold_constant(p.hold_constant);
        info!(
            "[init] {} heavy, {} light, holding {:?}",
            p.heavy,
            p.light,
            model.hold_constant()
        );
        Ok(model)
    }

    pub fn build_diffusion_model(&self) -> Result<DiffusionModel> {
        let mut model = DiffusionModel::new(&self.sim_config())?;
        let Some(diffusion) = &self.diffusion else {
            return Ok(model);
        };
        for (side, settings) in [(Side::Left, &diffusion.left), (Side::Right, &diffusion.right)] {
            check_settings(side, settings)?;
            model.set_mass(side, settings.mass);
            model.set_radius(side, settings.radius);
            model.set_initial_temperature(side, settings.initial_temperature);
            model.set_number_of_particles(side, settings.number_of_particles);
        }
        Ok(model)
    }
}

fn check_settings(side: Side, s: &DiffusionSettings) -> Result<()> {
    let side = match side {
        Side::Left => "left",
        Side::Right => "right",
    };
    let in_range = |v: f64, (min, max): (f64, f64)| (min..=max).contains(&v);
    let (n_min, n_max) = DIFFUSION_PARTICLES_RANGE;
    if !(n_min..=n_max).contains(&s.number_of_particles) {
        return Err(ConfigError::InvalidParam(format!(
            "diffusion.{side}.number_of_particles must be in {n_min}..={n_max}"
        )));
    }
    for (name, value, range) in [
        ("mass", s.mass, DIFFUSION_MASS_RANGE),
        ("radius", s.radius, DIFFUSION_RADIUS_RANGE),
        ("initial_temperature", s.initial_temperature, DIFFUSION_TEMPERATURE_RANGE),
    ] {
        if !in_range(value, range) {
            return Err(ConfigError::InvalidParam(format!(
                "diffusion.{side}.{name} = {value} outside {}..={}",
                range.0, range.1
            )));
        }
    }
    Ok(())
}
