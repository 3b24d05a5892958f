// simulation/mod.rs
// Re-exports and module declarations for simulation submodules

pub mod collision;
pub mod collision_counter;
pub mod hold_constant;
pub mod particle_system;
pub mod pressure;
pub mod simulation;
pub mod thermal;
pub mod time;

pub use hold_constant::{Fault, HoldConstant};
pub use simulation::*;

#[cfg(test)]
mod tests;
