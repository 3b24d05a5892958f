// Centralized configuration for simulation parameters

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::species;

// ====================
// Container Parameters
// ====================
/// Position of the container's bottom-right corner (pm). Width grows to the left.
pub const CONTAINER_POSITION: [f64; 2] = [0.0, 0.0];
pub const CONTAINER_WIDTH_MIN: f64 = 5000.0; // pm
pub const CONTAINER_WIDTH_MAX: f64 = 15000.0; // pm
pub const CONTAINER_WIDTH_DEFAULT: f64 = 10000.0; // pm
pub const CONTAINER_HEIGHT: f64 = 8750.0; // pm
pub const CONTAINER_DEPTH: f64 = 4000.0; // pm
pub const WALL_THICKNESS: f64 = 75.0; // pm
/// Distance between the left wall and the leftmost point the opening can reach
pub const OPENING_LEFT_INSET: f64 = 100.0;
/// Distance between the right wall and the right edge of the opening
pub const OPENING_RIGHT_INSET: f64 = 300.0;
/// Does the movable left wall do work on particles?
pub const LEFT_WALL_DOES_WORK: bool = false;
/// Speed limit of the left wall while it compresses the gas and does work (pm/ps)
pub const MAX_WALL_SPEED: f64 = 400.0;

// ====================
// Particle Parameters
// ====================
pub const HEAVY_PARTICLE_MASS: f64 = 28.0; // amu, equivalent to N2
pub const HEAVY_PARTICLE_RADIUS: f64 = 125.0; // pm
pub const LIGHT_PARTICLE_MASS: f64 = 4.0; // amu, equivalent to He
pub const LIGHT_PARTICLE_RADIUS: f64 = 62.5; // pm
/// Maximum number of particles of one species in the container
pub const MAX_PARTICLES_PER_SPECIES: usize = 1000;
/// Particles leave the pump inside a cone of this angle around -x (radians)
pub const PUMP_DISPERSION_ANGLE: f64 = std::f64::consts::FRAC_PI_2;
/// Height of the pump outlet as a fraction of the container height
pub const PARTICLE_ENTRY_HEIGHT_FRACTION: f64 = 0.25;

// ====================
// Broad Phase
// ====================
/// Side length of a collision region (pm). Must be >= the largest particle diameter.
pub const REGION_LENGTH: f64 = 2000.0;

// ====================
// Heat / Cool
// ====================
/// Speed scale per step is 1 + factor / HEAT_COOL_DIVISOR
pub const HEAT_COOL_DIVISOR: f64 = 300.0;
/// Speed given to a motionless particle when heat is applied (pm/ps)
pub const COLD_START_SPEED: f64 = 1.0;

// ====================
// Temperature
// ====================
pub const INITIAL_TEMPERATURE: f64 = 300.0; // K
/// Exceeding this resets the container (all particles removed, lid on)
pub const MAX_TEMPERATURE: f64 = 100_000.0; // K

// ====================
// Pressure
// ====================
/// The lid blows off above this pressure
pub const MAX_PRESSURE: f64 = 20_000.0; // kPa
/// Width of the sliding window over which wall impulses are averaged (ps)
pub const PRESSURE_SAMPLE_WINDOW: f64 = 20.0;
/// The pressure gauge refreshes its reading at this period (ps)
pub const GAUGE_REFRESH_PERIOD: f64 = 0.75;
pub const PRESSURE_NOISE_ENABLED: bool = true;
/// Noise amplitude at zero pressure (kPa)
pub const PRESSURE_NOISE_MAX: f64 = 50.0;
/// Noise amplitude at and above PRESSURE_NOISE_PRESSURE_LIMIT (kPa)
pub const PRESSURE_NOISE_MIN: f64 = 5.0;
pub const PRESSURE_NOISE_PRESSURE_LIMIT: f64 = 1000.0; // kPa
/// Exponential smoothing of the gauge reading [0..1): higher = smoother
pub const GAUGE_DAMPING: f64 = 0.5;

// ====================
// Collision Counter
// ====================
pub const COLLISION_COUNTER_SAMPLE_PERIODS: [f64; 4] = [10.0, 25.0, 50.0, 100.0]; // ps

// ====================
// Time
// ====================
/// Model time per second of real time in normal speed (ps/s)
pub const NORMAL_TIME_SCALE: f64 = 2.5;
/// Model time per second of real time in slow motion (ps/s)
pub const SLOW_TIME_SCALE: f64 = 0.625;

// ====================
// Model Bounds
// ====================
/// Outside particles are removed once they travel this far from the container
pub const MODEL_BOUNDS_PADDING: f64 = 20_000.0; // pm

// ====================
// Diffusion
// ====================
pub const DIFFUSION_CONTAINER_WIDTH: f64 = 16000.0; // pm
pub const DIFFUSION_DIVIDER_THICKNESS: f64 = 100.0; // pm
pub const DIFFUSION_PARTICLES_RANGE: (usize, usize) = (0, 200);
pub const DIFFUSION_MASS_RANGE: (f64, f64) = (4.0, 32.0); // amu
pub const DIFFUSION_MASS_DEFAULT: f64 = 28.0;
pub const DIFFUSION_RADIUS_RANGE: (f64, f64) = (50.0, 250.0); // pm
pub const DIFFUSION_RADIUS_DEFAULT: f64 = 125.0;
pub const DIFFUSION_TEMPERATURE_RANGE: (f64, f64) = (50.0, 1000.0); // K
pub const DIFFUSION_TEMPERATURE_DEFAULT: f64 = 300.0;
/// Flow rate is averaged over this many ps
pub const FLOW_RATE_SAMPLE_PERIOD: f64 = 10.0;

/// Runtime configuration of an ideal-gas model. Every field falls back to the
/// constant above when omitted from a TOML file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Bottom-right corner of the container (pm)
    pub container_position: [f64; 2],
    pub width_min: f64,
    pub width_max: f64,
    pub width_default: f64,
    pub container_height: f64,
    pub container_depth: f64,
    pub wall_thickness: f64,
    pub opening_left_inset: f64,
    pub opening_right_inset: f64,
    pub left_wall_does_work: bool,
    pub max_wall_speed: f64,
    pub region_length: f64,
    pub heat_cool_divisor: f64,
    pub cold_start_speed: f64,
    pub pump_dispersion_angle: f64,
    pub particle_entry_height_fraction: f64,
    pub initial_temperature: f64,
    pub max_temperature: f64,
    /// kPa
    pub max_pressure: f64,
    pub pressure_sample_window: f64,
    pub gauge_refresh_period: f64,
    pub pressure_noise_enabled: bool,
    pub pressure_noise_max: f64,
    pub pressure_noise_min: f64,
    pub pressure_noise_pressure_limit: f64,
    pub gauge_damping: f64,
    pub collision_counter_sample_periods: Vec<f64>,
    pub normal_time_scale: f64,
    pub slow_time_scale: f64,
    pub model_bounds_padding: f64,
    /// RNG seed; `None` draws one from the OS
    pub random_seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            container_position: CONTAINER_POSITION,
            width_min: CONTAINER_WIDTH_MIN,
            width_max: CONTAINER_WIDTH_MAX,
            width_default: CONTAINER_WIDTH_DEFAULT,
            container_height: CONTAINER_HEIGHT,
            container_depth: CONTAINER_DEPTH,
            wall_thickness: WALL_THICKNESS,
            opening_left_inset: OPENING_LEFT_INSET,
            opening_right_inset: OPENING_RIGHT_INSET,
            left_wall_does_work: LEFT_WALL_DOES_WORK,
            max_wall_speed: MAX_WALL_SPEED,
            region_length: REGION_LENGTH,
            heat_cool_divisor: HEAT_COOL_DIVISOR,
            cold_start_speed: COLD_START_SPEED,
            pump_dispersion_angle: PUMP_DISPERSION_ANGLE,
            particle_entry_height_fraction: PARTICLE_ENTRY_HEIGHT_FRACTION,
            initial_temperature: INITIAL_TEMPERATURE,
            max_temperature: MAX_TEMPERATURE,
            max_pressure: MAX_PRESSURE,
            pressure_sample_window: PRESSURE_SAMPLE_WINDOW,
            gauge_refresh_period: GAUGE_REFRESH_PERIOD,
            pressure_noise_enabled: PRESSURE_NOISE_ENABLED,
            pressure_noise_max: PRESSURE_NOISE_MAX,
            pressure_noise_min: PRESSURE_NOISE_MIN,
            pressure_noise_pressure_limit: PRESSURE_NOISE_PRESSURE_LIMIT,
            gauge_damping: GAUGE_DAMPING,
            collision_counter_sample_periods: COLLISION_COUNTER_SAMPLE_PERIODS.to_vec(),
            normal_time_scale: NORMAL_TIME_SCALE,
            slow_time_scale: SLOW_TIME_SCALE,
            model_bounds_padding: MODEL_BOUNDS_PADDING,
            random_seed: None,
        }
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::InvalidParam(format!(
            "{name} must be finite and > 0, got {value}"
        )));
    }
    Ok(())
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidParam(format!(
            "{name} must be finite and >= 0, got {value}"
        )));
    }
    Ok(())
}

impl SimConfig {
    /// Config with a fixed RNG seed, for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            random_seed: Some(seed),
            ..Self::default()
        }
    }

    /// Check that the configuration describes a usable model.
    pub fn validate(&self) -> Result<()> {
        if !self.container_position.iter().all(|c| c.is_finite()) {
            return Err(ConfigError::InvalidParam(
                "container_position must be finite".into(),
            ));
        }
        positive("width_min", self.width_min)?;
        positive("container_height", self.container_height)?;
        positive("container_depth", self.container_depth)?;
        positive("region_length", self.region_length)?;
        positive("heat_cool_divisor", self.heat_cool_divisor)?;
        positive("cold_start_speed", self.cold_start_speed)?;
        positive("initial_temperature", self.initial_temperature)?;
        positive("max_temperature", self.max_temperature)?;
        positive("max_pressure", self.max_pressure)?;
        positive("pressure_sample_window", self.pressure_sample_window)?;
        positive("gauge_refresh_period", self.gauge_refresh_period)?;
        positive("normal_time_scale", self.normal_time_scale)?;
        positive("slow_time_scale", self.slow_time_scale)?;
        positive("max_wall_speed", self.max_wall_speed)?;
        non_negative("wall_thickness", self.wall_thickness)?;
        non_negative("opening_left_inset", self.opening_left_inset)?;
        non_negative("opening_right_inset", self.opening_right_inset)?;
        non_negative("pressure_noise_max", self.pressure_noise_max)?;
        non_negative("pressure_noise_min", self.pressure_noise_min)?;
        positive("pressure_noise_pressure_limit", self.pressure_noise_pressure_limit)?;
        non_negative("model_bounds_padding", self.model_bounds_padding)?;

        if !(self.width_min <= self.width_default && self.width_default <= self.width_max) {
            return Err(ConfigError::InvalidParam(format!(
                "width range must satisfy min <= default <= max, got {} / {} / {}",
                self.width_min, self.width_default, self.width_max
            )));
        }
        // the opening must fit even in the narrowest container
        let min_lid_width = self.wall_thickness + self.opening_left_inset;
        if min_lid_width + self.opening_right_inset > self.width_min + self.wall_thickness {
            return Err(ConfigError::InvalidParam(
                "opening insets do not fit inside the minimum container width".into(),
            ));
        }
        // covers every radius a diffusion setting can reach
        let diameter = 2.0 * species::max_radius();
        if self.region_length < diameter {
            return Err(ConfigError::InvalidParam(format!(
                "region_length must be >= the largest particle diameter ({diameter} pm), got {}",
                self.region_length
            )));
        }
        if !(0.0..1.0).contains(&self.gauge_damping) {
            return Err(ConfigError::InvalidParam(format!(
                "gauge_damping must be in [0, 1), got {}",
                self.gauge_damping
            )));
        }
        if !(0.0..=std::f64::consts::TAU).contains(&self.pump_dispersion_angle) {
            return Err(ConfigError::InvalidParam(
                "pump_dispersion_angle must be in [0, 2π]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.particle_entry_height_fraction) {
            return Err(ConfigError::InvalidParam(
                "particle_entry_height_fraction must be in [0, 1]".into(),
            ));
        }
        if self.collision_counter_sample_periods.is_empty() {
            return Err(ConfigError::InvalidParam(
                "collision_counter_sample_periods must not be empty".into(),
            ));
        }
        for &period in &self.collision_counter_sample_periods {
            positive("collision counter sample period", period)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        SimConfig::default().validate().unwrap();
    }

    #[test]
    fn inverted_width_range_rejected() {
        let config = SimConfig {
            width_min: 12000.0,
            ..SimConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("width range"));
    }

    #[test]
    fn tiny_regions_rejected() {
        let config = SimConfig {
            region_length: 100.0,
            ..SimConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("region_length"));
    }

    #[test]
    fn regions_must_fit_the_largest_diffusion_particle() {
        let config = SimConfig {
            region_length: 2.0 * DIFFUSION_RADIUS_RANGE.1 - 1.0,
            ..SimConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("region_length"));

        let config = SimConfig {
            region_length: 2.0 * DIFFUSION_RADIUS_RANGE.1,
            ..SimConfig::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: SimConfig = toml::from_str("width_default = 12000.0\nrandom_seed = 7").unwrap();
        assert_eq!(config.width_default, 12000.0);
        assert_eq!(config.random_seed, Some(7));
        assert_eq!(config.container_height, CONTAINER_HEIGHT);
        config.validate().unwrap();
    }
}
