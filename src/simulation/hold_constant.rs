// simulation/hold_constant.rs
// Hold Constant modes, the faults they can raise, and the guard predicates

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::container::WidthRange;
use crate::units::BOLTZMANN;

/// Which Ideal Gas Law quantity the model keeps fixed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HoldConstant {
    #[default]
    Nothing,
    Volume,
    Temperature,
    /// Pressure held by changing the volume.
    PressureV,
    /// Pressure held by changing the temperature.
    PressureT,
}

impl HoldConstant {
    pub fn holds_pressure(self) -> bool {
        matches!(self, HoldConstant::PressureV | HoldConstant::PressureT)
    }

    /// The model, not the user, owns the container width.
    pub fn fixes_width(self) -> bool {
        matches!(self, HoldConstant::Volume | HoldConstant::PressureV)
    }

    /// Modes that are meaningless for an empty container.
    pub fn requires_particles(self) -> bool {
        matches!(
            self,
            HoldConstant::Temperature | HoldConstant::PressureV | HoldConstant::PressureT
        )
    }
}

/// A Hold Constant mode became impossible to satisfy and was dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fault {
    /// Temperature cannot be held with an empty container.
    TemperatureEmpty,
    /// Temperature cannot be held while the container is open.
    TemperatureOpen,
    /// Pressure cannot be held with an empty container, at zero pressure,
    /// or before a pressure has been measured.
    PressureEmpty,
    /// Holding pressure needs a volume above the width range.
    PressureLarge,
    /// Holding pressure needs a volume below the width range.
    PressureSmall,
    /// The container was reset after exceeding the maximum temperature.
    MaximumTemperature,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Fault::TemperatureEmpty => "temperatureEmpty",
            Fault::TemperatureOpen => "temperatureOpen",
            Fault::PressureEmpty => "pressureEmpty",
            Fault::PressureLarge => "pressureLarge",
            Fault::PressureSmall => "pressureSmall",
            Fault::MaximumTemperature => "maximumTemperature",
        };
        f.write_str(name)
    }
}

/// Everything the guards look at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GuardInput {
    pub hold_constant: HoldConstant,
    pub number_of_particles: usize,
    /// kPa, measured over a full window.
    pub pressure: Option<f64>,
    pub container_open: bool,
}

/// The fault raised by the current state, if any. A fault always means the
/// mode must fall back to [`HoldConstant::Nothing`].
pub fn check_guards(input: &GuardInput) -> Option<Fault> {
    use HoldConstant::*;
    match input.hold_constant {
        Nothing | Volume => None,
        Temperature => {
            if input.number_of_particles == 0 {
                Some(Fault::TemperatureEmpty)
            } else if input.container_open {
                Some(Fault::TemperatureOpen)
            } else {
                None
            }
        }
        PressureV | PressureT => {
            if input.number_of_particles == 0 || matches!(input.pressure, None | Some(0.0)) {
                Some(Fault::PressureEmpty)
            } else {
                None
            }
        }
    }
}

pub fn maximum_temperature_exceeded(temperature: Option<f64>, maximum: f64) -> bool {
    temperature.is_some_and(|t| t >= maximum)
}

/// V = NkT/P, in pm³. `pressure` is in amu/(pm·ps²).
pub fn ideal_volume(number_of_particles: usize, temperature: f64, pressure: f64) -> f64 {
    assert!(pressure > 0.0, "zero pressure not supported");
    number_of_particles as f64 * BOLTZMANN * temperature / pressure
}

/// T = PV/(Nk), in K. `pressure` is in amu/(pm·ps²).
pub fn ideal_temperature(pressure: f64, volume: f64, number_of_particles: usize) -> f64 {
    assert!(number_of_particles > 0, "empty container not supported");
    pressure * volume / (number_of_particles as f64 * BOLTZMANN)
}

/// Width that holds pressure by changing volume. Out of range widths are
/// clamped and reported with the matching fault.
pub fn constrain_ideal_width(width: f64, range: &WidthRange) -> (f64, Option<Fault>) {
    if width > range.max {
        (range.max, Some(Fault::PressureLarge))
    } else if width < range.min {
        (range.min, Some(Fault::PressureSmall))
    } else {
        (width, None)
    }
}
