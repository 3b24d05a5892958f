// simulation/pressure.rs
// Pressure from wall impulses over a sliding window, and the noisy gauge that displays it

use rand::rngs::StdRng;
use rand::Rng;
use std::collections::VecDeque;

use crate::config::SimConfig;
use crate::container::IdealGasContainer;
use crate::units::to_kilopascals;

#[derive(Clone, Copy, Debug)]
struct ImpulseSample {
    dt: f64,
    impulse: f64,
}

/// P = (2/3)·F/(perimeter·depth), with F the average wall force over the
/// window. The factor 2/3 matches the 3D kinetic energy carried by the
/// 2D particles, so that PV = NkT.
pub fn pressure_from_impulse(impulse: f64, elapsed: f64, container: &IdealGasContainer) -> f64 {
    if elapsed <= 0.0 {
        return 0.0;
    }
    let perimeter = 2.0 * (container.width() + container.height);
    to_kilopascals((2.0 / 3.0) * (impulse / elapsed) / (perimeter * container.depth))
}

pub struct PressureModel {
    /// kPa, `None` for an empty container.
    pressure: Option<f64>,
    samples: VecDeque<ImpulseSample>,
    window: f64,
    sampled_time: f64,
    sampled_impulse: f64,
    /// The value comes from a full window, or was restored.
    settled: bool,
    pub gauge: PressureGauge,
}

impl PressureModel {
    pub fn new(config: &SimConfig, rng: StdRng) -> Self {
        Self {
            pressure: None,
            samples: VecDeque::new(),
            window: config.pressure_sample_window,
            sampled_time: 0.0,
            sampled_impulse: 0.0,
            settled: false,
            gauge: PressureGauge::new(config, rng),
        }
    }

    pub fn reset(&mut self) {
        self.pressure = None;
        self.clear_samples();
        self.gauge.reset();
    }

    pub fn pressure(&self) -> Option<f64> {
        self.pressure
    }

    /// Pressure measured over a full window. `None` while the window fills.
    pub fn settled_pressure(&self) -> Option<f64> {
        self.pressure.filter(|_| self.settled)
    }

    pub fn clear_samples(&mut self) {
        self.samples.clear();
        self.sampled_time = 0.0;
        self.sampled_impulse = 0.0;
        self.settled = false;
    }

    fn record(&mut self, dt: f64, impulse: f64) {
        self.samples.push_back(ImpulseSample { dt, impulse });
        self.sampled_time += dt;
        self.sampled_impulse += impulse;
        while self.sampled_time > self.window {
            let Some(front) = self.samples.front().copied() else {
                break;
            };
            // keep at least one full window
            if self.sampled_time - front.dt < self.window {
                break;
            }
            self.samples.pop_front();
            self.sampled_time -= front.dt;
            self.sampled_impulse -= front.impulse;
        }
    }

    /// Pressure of the current window, kPa.
    pub fn compute_pressure(&self, container: &IdealGasContainer) -> f64 {
        pressure_from_impulse(self.sampled_impulse.max(0.0), self.sampled_time, container)
    }

    /// Record this step's wall impulse and recompute. With `hold` set a
    /// settled value stays where it is.
    pub fn update(
        &mut self,
        dt: f64,
        wall_impulse: f64,
        number_of_particles: usize,
        container: &IdealGasContainer,
        hold: bool,
    ) {
        assert!(dt > 0.0, "dt must be > 0, got {dt}");
        if number_of_particles == 0 {
            self.pressure = None;
            self.clear_samples();
        } else {
            self.record(dt, wall_impulse);
            if !(hold && self.settled) {
                self.pressure = Some(self.compute_pressure(container));
                self.settled = self.sampled_time >= self.window;
            }
        }
        let noise = !hold;
        self.gauge.update(dt, self.pressure, container.width(), noise);
    }

    /// Bring the value in line with N without advancing time.
    pub fn refresh(&mut self, number_of_particles: usize, container: &IdealGasContainer) {
        if number_of_particles == 0 {
            self.pressure = None;
            self.clear_samples();
            self.gauge.reset();
        } else if self.pressure.is_none() {
            self.pressure = Some(self.compute_pressure(container));
        }
    }

    pub(crate) fn set_pressure(&mut self, pressure: Option<f64>) {
        self.pressure = pressure;
        self.settled = pressure.is_some();
    }
}

/// The displayed pressure: refreshed periodically, with optional noise and damping.
pub struct PressureGauge {
    reading: Option<f64>,
    dt_accumulator: f64,
    refresh_period: f64,
    pub noise_enabled: bool,
    noise_max: f64,
    noise_min: f64,
    noise_pressure_limit: f64,
    damping: f64,
    default_width: f64,
    rng: StdRng,
}

impl PressureGauge {
    pub fn new(config: &SimConfig, rng: StdRng) -> Self {
        Self {
            reading: None,
            dt_accumulator: 0.0,
            refresh_period: config.gauge_refresh_period,
            noise_enabled: config.pressure_noise_enabled,
            noise_max: config.pressure_noise_max,
            noise_min: config.pressure_noise_min,
            noise_pressure_limit: config.pressure_noise_pressure_limit,
            damping: config.gauge_damping,
            default_width: config.width_default,
            rng,
        }
    }

    pub fn reset(&mut self) {
        self.reading = None;
        self.dt_accumulator = 0.0;
    }

    pub fn reading(&self) -> Option<f64> {
        self.reading
    }

    /// Noise amplitude falls linearly from `noise_max` at 0 kPa to `noise_min`
    /// at the pressure limit, and grows with the container width.
    pub fn noise_amplitude(&self, pressure: f64, width: f64) -> f64 {
        let fraction = (pressure / self.noise_pressure_limit).clamp(0.0, 1.0);
        let amplitude = self.noise_max - (self.noise_max - self.noise_min) * fraction;
        amplitude * width / self.default_width
    }

    pub fn update(&mut self, dt: f64, pressure: Option<f64>, width: f64, allow_noise: bool) {
        let Some(pressure) = pressure else {
            self.reset();
            return;
        };
        self.dt_accumulator += dt;
        if self.reading.is_some() && self.dt_accumulator < self.refresh_period {
            return;
        }
        self.dt_accumulator = 0.0;

        let mut target = pressure;
        if self.noise_enabled && allow_noise {
            let amplitude = self.noise_amplitude(pressure, width);
            let sign = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
            target += sign * amplitude * self.rng.random::<f64>();
        }
        let target = target.max(0.0);
        self.reading = Some(match self.reading {
            Some(previous) => previous + (target - previous) * (1.0 - self.damping),
            None => target,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn model() -> (PressureModel, IdealGasContainer) {
        let config = SimConfig::default();
        (
            PressureModel::new(&config, StdRng::seed_from_u64(11)),
            IdealGasContainer::new(&config),
        )
    }

    #[test]
    fn empty_container_has_no_pressure() {
        let (mut pm, container) = model();
        pm.update(0.1, 0.0, 0, &container, false);
        assert_eq!(pm.pressure(), None);
        assert_eq!(pm.gauge.reading(), None);
    }

    #[test]
    fn no_wall_hits_reads_zero() {
        let (mut pm, container) = model();
        pm.update(0.1, 0.0, 5, &container, false);
        assert_eq!(pm.pressure(), Some(0.0));
    }

    #[test]
    fn pressure_averages_over_the_window() {
        let (mut pm, container) = model();
        for _ in 0..400 {
            pm.update(0.1, 1000.0, 10, &container, false);
        }
        // a steady impulse rate of 1e4 amu·pm/ps² regardless of window length
        let expected = pressure_from_impulse(1000.0, 0.1, &container);
        let p = pm.pressure().unwrap();
        assert!((p - expected).abs() < 1e-9 * expected, "{p} vs {expected}");
        assert!(pm.sampled_time <= SimConfig::default().pressure_sample_window + 0.1 + 1e-9);
    }

    #[test]
    fn held_pressure_does_not_move() {
        let (mut pm, container) = model();
        for _ in 0..250 {
            pm.update(0.1, 1000.0, 10, &container, false);
        }
        let held = pm.settled_pressure();
        assert!(held.is_some());
        pm.update(0.1, 5000.0, 10, &container, true);
        assert_eq!(pm.pressure(), held);
    }

    #[test]
    fn partial_window_is_not_settled() {
        let (mut pm, container) = model();
        // freshly pumped particles have not reached a wall yet
        pm.update(0.1, 0.0, 100, &container, true);
        assert_eq!(pm.pressure(), Some(0.0));
        assert_eq!(pm.settled_pressure(), None);
        // a held value keeps following the window until it is full
        pm.update(0.1, 1000.0, 100, &container, true);
        assert!(pm.pressure().is_some_and(|p| p > 0.0));
        for _ in 0..250 {
            pm.update(0.1, 1000.0, 100, &container, true);
        }
        let settled = pm.settled_pressure();
        assert!(settled.is_some_and(|p| p > 0.0));
        pm.update(0.1, 0.0, 100, &container, true);
        assert_eq!(pm.pressure(), settled);
    }

    #[test]
    fn emptying_unsettles() {
        let (mut pm, container) = model();
        for _ in 0..250 {
            pm.update(0.1, 1000.0, 10, &container, false);
        }
        pm.refresh(0, &container);
        assert_eq!(pm.settled_pressure(), None);
        pm.update(0.1, 1000.0, 10, &container, false);
        assert_eq!(pm.settled_pressure(), None);
    }

    #[test]
    fn gauge_noise_is_bounded_and_non_negative() {
        let config = SimConfig::default();
        let mut gauge = PressureGauge::new(&config, StdRng::seed_from_u64(5));
        let bound = gauge.noise_amplitude(0.0, config.width_default);
        assert_eq!(bound, config.pressure_noise_max);
        for _ in 0..250 {
            gauge.update(config.gauge_refresh_period, Some(1.0), config.width_default, true);
            let r = gauge.reading().unwrap();
            assert!(r >= 0.0 && r <= 1.0 + bound);
        }
    }

    #[test]
    fn gauge_without_noise_converges() {
        let config = SimConfig::default();
        let mut gauge = PressureGauge::new(&config, StdRng::seed_from_u64(5));
        gauge.update(1.0, Some(100.0), config.width_default, false);
        assert_eq!(gauge.reading(), Some(100.0));
        for _ in 0..60 {
            gauge.update(1.0, Some(200.0), config.width_default, false);
        }
        assert!((gauge.reading().unwrap() - 200.0).abs() < 1e-6);
    }

    #[test]
    fn gauge_holds_between_refreshes() {
        let config = SimConfig::default();
        let mut gauge = PressureGauge::new(&config, StdRng::seed_from_u64(5));
        gauge.update(0.1, Some(100.0), config.width_default, false);
        gauge.update(0.1, Some(300.0), config.width_default, false);
        assert_eq!(gauge.reading(), Some(100.0));
    }

    #[test]
    fn same_seed_same_noise() {
        let config = SimConfig::default();
        let mut a = PressureGauge::new(&config, StdRng::seed_from_u64(9));
        let mut b = PressureGauge::new(&config, StdRng::seed_from_u64(9));
        for _ in 0..20 {
            a.update(1.0, Some(50.0), 12000.0, true);
            b.update(1.0, Some(50.0), 12000.0, true);
            assert_eq!(a.reading(), b.reading());
        }
    }
}
