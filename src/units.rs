//! Physical unit definitions and conversions.
//!
//! Base units:
//! - Length: picometer (pm)
//! - Time: picosecond (ps)
//! - Mass: atomic mass unit (amu)
//! - Temperature: kelvin (K)

/// Picometer in meters.
pub const PICOMETER: f64 = 1.0e-12;
/// Picosecond in seconds.
pub const PICOSECOND: f64 = 1.0e-12;
/// Atomic mass unit in kilograms.
pub const AMU: f64 = 1.660_539_066_60e-27;

/// Boltzmann constant in joules per kelvin.
pub const BOLTZMANN_SI: f64 = 1.380_649e-23;

/// Energy of one simulation unit (amu·pm²/ps²) expressed in joules.
pub const ENERGY_JOULE: f64 = AMU * PICOMETER * PICOMETER / (PICOSECOND * PICOSECOND);

/// Boltzmann constant in simulation units, (pm²·amu)/(ps²·K).
pub const BOLTZMANN: f64 = BOLTZMANN_SI / ENERGY_JOULE;

/// Pressure of one simulation unit, amu/(pm·ps²), expressed in kilopascals.
pub const PRESSURE_KPA: f64 = AMU / (PICOMETER * PICOSECOND * PICOSECOND) / 1.0e3;

/// Convert a pressure in amu/(pm·ps²) to kPa.
#[inline]
pub fn to_kilopascals(pressure: f64) -> f64 {
    pressure * PRESSURE_KPA
}

/// Convert a pressure in kPa to amu/(pm·ps²).
#[inline]
pub fn from_kilopascals(kpa: f64) -> f64 {
    kpa / PRESSURE_KPA
}

/// Speed (pm/ps) at which a particle of `mass` carries the mean kinetic energy
/// of an ideal gas at `temperature`: |v| = sqrt(3kT/m).
#[inline]
pub fn thermal_speed(temperature: f64, mass: f64) -> f64 {
    (3.0 * BOLTZMANN * temperature / mass).sqrt()
}
