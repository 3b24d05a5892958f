// io.rs
// Snapshots of an IdealGasLawModel: by value, as JSON, and on disk

use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use log::info;
use serde::{Deserialize, Serialize};
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use ultraviolet::DVec2;

use crate::bounds::Bounds;
use crate::config::SimConfig;
use crate::container::{IdealGasContainer, ParticleContainer};
use crate::error::Result;
use crate::particle::Particle;
use crate::profile_scope;
use crate::simulation::collision_counter::CollisionCounter;
use crate::simulation::thermal::TemperatureModel;
use crate::simulation::time::{Stopwatch, TimeTransform};
use crate::simulation::{HoldConstant, IdealGasLawModel};
use crate::species::Species;

/// Everything needed to resume a model. The pressure window and the RNG
/// streams are not captured, so a restored run diverges from the saved one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelState {
    pub config: SimConfig,
    pub container: IdealGasContainer,
    pub inside: [Vec<Particle>; 2],
    #[serde(default)]
    pub outside: [Vec<Particle>; 2],
    pub hold_constant: HoldConstant,
    pub heat_cool_factor: f64,
    pub is_playing: bool,
    pub time: f64,
    pub held_temperature: Option<f64>,
    pub temperature_model: TemperatureModel,
    /// kPa
    pub pressure: Option<f64>,
    pub particle_particle_collisions_enabled: bool,
    pub collision_counter: CollisionCounter,
    pub stopwatch: Stopwatch,
    pub time_transform: TimeTransform,
}

impl ModelState {
    pub fn from_model(model: &IdealGasLawModel) -> Self {
        Self {
            config: model.config.clone(),
            container: model.container.clone(),
            inside: model.particle_system.inside.clone(),
            outside: model.particle_system.outside.clone(),
            hold_constant: model.hold_constant,
            heat_cool_factor: model.heat_cool_factor,
            is_playing: model.is_playing,
            time: model.time,
            held_temperature: model.held_temperature,
            temperature_model: model.temperature_model.clone(),
            pressure: model.pressure(),
            particle_particle_collisions_enabled: model.particle_particle_collisions_enabled(),
            collision_counter: model.collision_counter.clone(),
            stopwatch: model.stopwatch.clone(),
            time_transform: model.time_transform.clone(),
        }
    }

    /// Overwrite `model` with this state. The model keeps its own config.
    pub fn apply_to(self, model: &mut IdealGasLawModel) {
        model.container = self.container;
        model.particle_system.inside = self.inside;
        model.particle_system.outside = self.outside;
        model.hold_constant = self.hold_constant;
        model.heat_cool_factor = self.heat_cool_factor;
        model.is_playing = self.is_playing;
        model.time = self.time;
        model.held_temperature = self.held_temperature;
        model.previous_number_of_particles = model.particle_system.number_of_particles();
        model.temperature_model = self.temperature_model;
        model.pressure_model.clear_samples();
        model.pressure_model.set_pressure(self.pressure);
        model.collision_detector.particle_particle_collisions_enabled =
            self.particle_particle_collisions_enabled;
        model.collision_counter = self.collision_counter;
        model.stopwatch = self.stopwatch;
        model.time_transform = self.time_transform;
    }

    /// Build a fresh model from the captured config and apply the state to it.
    pub fn into_model(self) -> Result<IdealGasLawModel> {
        let mut model = IdealGasLawModel::new(self.config.clone())?;
        self.apply_to(&mut model);
        Ok(model)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// What a renderer reads each frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleView {
    pub species: Species,
    pub position: DVec2,
    pub radius: f64,
}

/// Read-only picture of the model after a step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelView {
    pub particles: Vec<ParticleView>,
    /// Particles that escaped through the opening.
    pub escaped: Vec<ParticleView>,
    pub container: Bounds,
    pub lid_on: bool,
    pub lid_width: f64,
    /// Horizontal extent of the gap in the top wall.
    pub opening: Option<(f64, f64)>,
    /// kPa, as shown on the gauge
    pub pressure_reading: Option<f64>,
    /// pm³
    pub volume: f64,
    pub number_of_particles: usize,
    /// K
    pub temperature: Option<f64>,
    pub hold_constant: HoldConstant,
    pub wall_collisions: usize,
}

impl ModelView {
    pub fn capture(model: &IdealGasLawModel) -> Self {
        let view = |p: &Particle| ParticleView {
            species: p.species,
            position: p.position,
            radius: p.radius,
        };
        Self {
            particles: model.particle_system.inside_particles().map(view).collect(),
            escaped: model.particle_system.outside_particles().map(view).collect(),
            container: model.container.bounds(),
            lid_on: model.container.is_lid_on(),
            lid_width: model.container.lid_width(),
            opening: model.container.opening(),
            pressure_reading: model.pressure_model.gauge.reading(),
            volume: model.volume(),
            number_of_particles: model.number_of_particles(),
            temperature: model.temperature(),
            hold_constant: model.hold_constant(),
            wall_collisions: model.collision_counter.number_of_collisions(),
        }
    }
}

/// Write a snapshot of `model` to `path`, gzipped when the extension is `gz`.
/// The file is written beside the target and renamed into place.
pub fn save_state<P: AsRef<Path>>(path: P, model: &IdealGasLawModel) -> Result<()> {
    profile_scope!("save_state");
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let state = ModelState::from_model(model);
    let gzip = path.extension().is_some_and(|e| e == "gz");
    let tmp_path = path.with_extension({
        let mut os = path.extension().map(|e| e.to_os_string()).unwrap_or_default();
        os.push(".tmp");
        os
    });
    {
        let writer = BufWriter::new(std::fs::File::create(&tmp_path)?);
        if gzip {
            let mut encoder = GzEncoder::new(writer, Compression::fast());
            serde_json::to_writer(&mut encoder, &state)?;
            encoder.finish()?.flush()?;
        } else {
            let mut writer = writer;
            serde_json::to_writer(&mut writer, &state)?;
            writer.flush()?;
        }
    }
    std::fs::rename(&tmp_path, path)?;
    info!("[io] saved {} particles to {}", model.number_of_particles(), path.display());
    Ok(())
}

/// Read a snapshot written by [`save_state`]. Gzip is detected from the content.
pub fn load_state<P: AsRef<Path>>(path: P) -> Result<ModelState> {
    profile_scope!("load_state");
    let data = std::fs::read(path.as_ref())?;
    let state = if data.starts_with(&[0x1f, 0x8b]) {
        let mut decoded = Vec::new();
        GzDecoder::new(data.as_slice()).read_to_end(&mut decoded)?;
        serde_json::from_slice(&decoded)?
    } else {
        serde_json::from_slice(&data)?
    };
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_model() -> IdealGasLawModel {
        let mut model = IdealGasLawModel::new(SimConfig::seeded(21)).unwrap();
        model.add_particles(Species::Heavy, 30);
        model.add_particles(Species::Light, 10);
        for _ in 0..50 {
            model.step_model_time(0.1);
        }
        model.set_hold_constant(HoldConstant::Volume);
        model.set_heat_cool_factor(0.25);
        model
    }

    #[test]
    fn json_snapshot_restores_the_model() {
        let model = running_model();
        let json = ModelState::from_model(&model).to_json().unwrap();
        let restored = ModelState::from_json(&json).unwrap().into_model().unwrap();

        assert_eq!(restored.number_of_particles(), 40);
        assert_eq!(restored.hold_constant(), HoldConstant::Volume);
        assert_eq!(restored.heat_cool_factor(), 0.25);
        assert_eq!(restored.time(), model.time());
        assert_eq!(restored.temperature(), model.temperature());
        assert_eq!(restored.pressure(), model.pressure());
        assert_eq!(restored.container.width(), model.container.width());
        let a: Vec<_> = model.particle_system.inside_particles().map(|p| p.position).collect();
        let b: Vec<_> = restored.particle_system.inside_particles().map(|p| p.position).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn restored_model_keeps_stepping() {
        let state = ModelState::from_model(&running_model());
        let mut model = IdealGasLawModel::new(SimConfig::seeded(3)).unwrap();
        state.apply_to(&mut model);
        for _ in 0..20 {
            model.step_model_time(0.1);
        }
        assert_eq!(model.number_of_particles(), 40);
        assert!(model.temperature().unwrap() > 0.0);
    }

    #[test]
    fn view_matches_the_model() {
        let mut model = running_model();
        model.set_lid_width(0.0);
        let view = ModelView::capture(&model);
        assert_eq!(view.particles.len(), 40);
        assert_eq!(view.number_of_particles, 40);
        assert!(view.lid_on);
        let (left, right) = view.opening.unwrap();
        assert!(left < right);
        assert_eq!(view.container.width(), model.container.width());
        assert_eq!(view.temperature, model.temperature());
    }

    #[test]
    fn garbage_is_a_snapshot_error() {
        let err = ModelState::from_json("{ not json").unwrap_err();
        assert!(matches!(err, crate::error::ConfigError::Snapshot(_)));
    }

    #[test]
    fn save_and_load_through_files() {
        let model = running_model();
        let dir = std::env::temp_dir().join(format!("gas_sim_io_{}", std::process::id()));
        for name in ["state.json", "state.json.gz"] {
            let path = dir.join(name);
            save_state(&path, &model).unwrap();
            let state = load_state(&path).unwrap();
            assert_eq!(state, ModelState::from_model(&model));
        }
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
