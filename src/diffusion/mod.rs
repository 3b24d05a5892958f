// diffusion/mod.rs
// Two gases separated by a removable divider, mixing once it is lifted

pub mod container;
pub mod data;
pub mod flow_rate;
pub mod model;
pub mod settings;

pub use container::DiffusionContainer;
pub use data::DiffusionData;
pub use flow_rate::ParticleFlowRate;
pub use model::{DiffusionModel, Side};
pub use settings::DiffusionSettings;
