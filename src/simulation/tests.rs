// Scenario tests for the IdealGasLawModel pipeline and Hold Constant state machine

use super::simulation::IdealGasLawModel;
use super::{Fault, HoldConstant};
use crate::config::SimConfig;
use crate::species::Species;
use std::sync::mpsc::{self, Receiver};

fn model_with(config: SimConfig) -> (IdealGasLawModel, Receiver<Fault>) {
    let mut model = IdealGasLawModel::new(config).unwrap();
    let (tx, rx) = mpsc::channel();
    model.set_fault_sender(tx);
    (model, rx)
}

fn model() -> (IdealGasLawModel, Receiver<Fault>) {
    model_with(SimConfig::seeded(42))
}

fn run(model: &mut IdealGasLawModel, steps: usize, dt: f64) {
    for _ in 0..steps {
        model.step_model_time(dt);
    }
}

/// Step until a full pressure window reads nonzero.
fn run_until_pressure(model: &mut IdealGasLawModel) {
    for _ in 0..2000 {
        model.step_model_time(0.1);
        if model.pressure_model.settled_pressure().is_some_and(|p| p > 0.0) {
            return;
        }
    }
    panic!("pressure never became positive");
}

#[cfg(test)]
mod scenarios {
    use super::*;

    #[test]
    fn fifty_heavy_particles_at_room_temperature() {
        let (mut model, rx) = model();
        assert_eq!(model.container.width(), 10000.0);
        assert_eq!(model.number_of_particles(), 0);
        assert_eq!(model.temperature(), None);
        assert_eq!(model.pressure(), None);

        model.add_particles(Species::Heavy, 50);
        assert_eq!(model.number_of_particles(), 50);
        run(&mut model, 5, 0.1);
        let t = model.temperature().unwrap();
        assert!((t - 300.0).abs() < 1e-6, "T = {t}");

        run(&mut model, 400, 0.1);
        let t = model.temperature().unwrap();
        assert!((t - 300.0).abs() < 1e-6, "T drifted to {t}");
        assert!(model.pressure().unwrap() > 0.0);
        assert_eq!(model.number_of_particles(), 50);
        assert!(rx.try_iter().next().is_none());
    }

    #[test]
    fn particles_stay_inside_the_closed_container() {
        let (mut model, _rx) = model();
        model.add_particles(Species::Heavy, 100);
        model.add_particles(Species::Light, 100);
        run(&mut model, 300, 0.1);
        let bounds = crate::container::ParticleContainer::bounds(&model.container);
        for p in model.particle_system.inside_particles() {
            assert!(p.left() >= bounds.min_x - 1e-6 && p.right() <= bounds.max_x + 1e-6);
            assert!(p.bottom() >= bounds.min_y - 1e-6 && p.top() <= bounds.max_y + 1e-6);
        }
        assert_eq!(model.particle_system.number_outside(), 0);
    }

    #[test]
    fn heating_raises_temperature() {
        let (mut model, _rx) = model();
        model.add_particles(Species::Light, 40);
        model.set_heat_cool_factor(1.0);
        run(&mut model, 50, 0.1);
        assert!(model.temperature().unwrap() > 300.0);
        model.set_heat_cool_factor(-1.0);
        run(&mut model, 200, 0.1);
        assert!(model.temperature().unwrap() < 300.0);
    }

    #[test]
    fn open_lid_lets_particles_escape() {
        let (mut model, _rx) = model();
        model.add_particles(Species::Light, 200);
        model.blow_lid_off();
        run(&mut model, 600, 0.1);
        assert!(model.particle_system.number_outside() > 0 || model.number_of_particles() < 200);
        model.request_lid_return();
        assert!(!model.container.is_open());
    }

    #[test]
    fn excess_pressure_blows_the_lid_off() {
        let config = SimConfig {
            max_pressure: 1.0,
            ..SimConfig::seeded(1)
        };
        let (mut model, _rx) = model_with(config);
        model.add_particles(Species::Heavy, 200);
        run_until_pressure(&mut model);
        run(&mut model, 100, 0.1);
        assert!(!model.container.is_lid_on());
    }

    #[test]
    fn remove_all_twice_is_harmless() {
        let (mut model, rx) = model();
        model.add_particles(Species::Heavy, 10);
        model.remove_all_particles();
        assert_eq!(model.number_of_particles(), 0);
        model.remove_all_particles();
        assert_eq!(model.number_of_particles(), 0);
        run(&mut model, 2, 0.1);
        assert_eq!(model.temperature(), None);
        assert_eq!(model.pressure(), None);
        assert!(rx.try_iter().next().is_none());
    }

    #[test]
    fn paused_model_does_not_advance() {
        let (mut model, _rx) = model();
        model.add_particles(Species::Heavy, 5);
        model.set_playing(false);
        let before: Vec<_> = model.particle_system.inside_particles().map(|p| p.position).collect();
        model.step(1.0 / 60.0);
        let after: Vec<_> = model.particle_system.inside_particles().map(|p| p.position).collect();
        assert_eq!(before, after);
        assert_eq!(model.time(), 0.0);

        model.step_manual(1.0 / 60.0);
        assert!((model.time() - 2.5 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn adding_particles_while_paused_updates_immediately() {
        let (mut model, _rx) = model();
        model.set_playing(false);
        model.add_particles(Species::Light, 10);
        let t = model.temperature().unwrap();
        assert!((t - 300.0).abs() < 1e-6);
        assert_eq!(model.pressure(), Some(0.0));
    }

    #[test]
    fn passive_resize_redistributes_particles() {
        let (mut model, _rx) = model();
        model.add_particles(Species::Heavy, 20);
        run(&mut model, 100, 0.1);
        model.request_container_resize(5000.0);
        assert_eq!(model.container.width(), 5000.0);
        for p in model.particle_system.inside_particles() {
            assert!(p.position.x >= -5000.0 - 1e-6);
        }
    }

    #[test]
    fn passive_resize_stops_the_collision_counter() {
        let (mut model, _rx) = model();
        model.add_particles(Species::Heavy, 20);
        model.collision_counter.set_running(true);
        run(&mut model, 10, 0.1);
        assert!(model.collision_counter.is_running());
        model.request_container_resize(8000.0);
        assert!(!model.collision_counter.is_running());
    }

    #[test]
    fn working_wall_heats_the_gas_when_compressing() {
        let config = SimConfig {
            left_wall_does_work: true,
            ..SimConfig::seeded(21)
        };
        let (mut model, rx) = model_with(config);
        model.add_particles(Species::Heavy, 100);
        run(&mut model, 50, 0.1);
        let before = model.temperature().unwrap();

        model.request_container_resize(model.config.width_min);
        assert_eq!(model.container.width(), 10000.0);
        run(&mut model, 300, 0.1);
        assert!((model.container.width() - model.config.width_min).abs() < 1e-6);
        let after = model.temperature().unwrap();
        assert!(after > 1.2 * before, "T {before} -> {after}");
        assert_eq!(model.number_of_particles(), 100);
        assert!(rx.try_iter().next().is_none());
    }

    #[test]
    fn passive_wall_leaves_the_temperature_alone() {
        let (mut model, _rx) = model();
        model.add_particles(Species::Heavy, 100);
        run(&mut model, 50, 0.1);
        let before = model.temperature().unwrap();
        model.request_container_resize(model.config.width_min);
        run(&mut model, 300, 0.1);
        let after = model.temperature().unwrap();
        assert!((after - before).abs() < 1e-6 * before, "T {before} -> {after}");
    }

    #[test]
    fn same_seed_same_run() {
        let (mut a, _) = model();
        let (mut b, _) = model();
        for m in [&mut a, &mut b] {
            m.add_particles(Species::Heavy, 30);
            m.add_particles(Species::Light, 30);
            run(m, 200, 0.1);
        }
        let pa: Vec<_> = a.particle_system.inside_particles().map(|p| p.position).collect();
        let pb: Vec<_> = b.particle_system.inside_particles().map(|p| p.position).collect();
        assert_eq!(pa, pb);
        assert_eq!(a.pressure(), b.pressure());
        assert_eq!(a.pressure_model.gauge.reading(), b.pressure_model.gauge.reading());
    }

    #[test]
    fn reset_restores_defaults() {
        let (mut model, _rx) = model();
        model.add_particles(Species::Heavy, 10);
        model.set_heat_cool_factor(0.5);
        model.request_container_resize(7000.0);
        model.blow_lid_off();
        run(&mut model, 10, 0.1);
        model.reset();
        assert_eq!(model.number_of_particles(), 0);
        assert_eq!(model.container.width(), 10000.0);
        assert!(model.container.is_lid_on());
        assert_eq!(model.heat_cool_factor(), 0.0);
        assert_eq!(model.hold_constant(), HoldConstant::Nothing);
        assert_eq!(model.temperature(), None);
        assert!(model.particle_particle_collisions_enabled());
    }
}

#[cfg(test)]
mod hold_constant_guards {
    use super::*;

    #[test]
    fn emptying_while_holding_temperature_faults_once() {
        let (mut model, rx) = model();
        model.add_particles(Species::Heavy, 20);
        run(&mut model, 3, 0.1);
        model.set_hold_constant(HoldConstant::Temperature);
        assert_eq!(model.hold_constant(), HoldConstant::Temperature);

        model.remove_all_particles();
        assert_eq!(model.hold_constant(), HoldConstant::Nothing);
        run(&mut model, 5, 0.1);
        let faults: Vec<Fault> = rx.try_iter().collect();
        assert_eq!(faults, vec![Fault::TemperatureEmpty]);
    }

    #[test]
    fn holding_temperature_in_an_empty_container_is_refused() {
        let (mut model, rx) = model();
        model.set_hold_constant(HoldConstant::Temperature);
        assert_eq!(model.hold_constant(), HoldConstant::Nothing);
        assert_eq!(rx.try_recv().ok(), Some(Fault::TemperatureEmpty));
    }

    #[test]
    fn opening_the_lid_while_holding_temperature_faults() {
        let (mut model, rx) = model();
        model.add_particles(Species::Heavy, 20);
        run(&mut model, 3, 0.1);
        model.set_hold_constant(HoldConstant::Temperature);
        model.set_lid_width(0.0);
        assert_eq!(model.hold_constant(), HoldConstant::Nothing);
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![Fault::TemperatureOpen]);
    }

    #[test]
    fn held_temperature_survives_particle_removal() {
        let (mut model, _rx) = model();
        model.add_particles(Species::Heavy, 20);
        model.add_particles(Species::Light, 20);
        run(&mut model, 50, 0.1);
        model.set_hold_constant(HoldConstant::Temperature);
        let held = model.temperature().unwrap();
        model.remove_particles(Species::Light, 15);
        run(&mut model, 1, 0.1);
        let t = model.temperature().unwrap();
        assert!((t - held).abs() < 1e-6 * held, "held {held}, got {t}");
    }

    #[test]
    fn emptying_while_holding_pressure_keeps_width() {
        let (mut model, rx) = model();
        model.add_particles(Species::Heavy, 100);
        run_until_pressure(&mut model);
        // let the pressure window fill before holding it
        run(&mut model, 500, 0.1);
        model.set_hold_constant(HoldConstant::PressureV);
        assert_eq!(model.hold_constant(), HoldConstant::PressureV);
        run(&mut model, 3, 0.1);
        assert_eq!(model.hold_constant(), HoldConstant::PressureV);
        let width = model.container.width();

        model.remove_all_particles();
        assert_eq!(model.hold_constant(), HoldConstant::Nothing);
        assert_eq!(model.container.width(), width);
        run(&mut model, 3, 0.1);
        assert_eq!(model.container.width(), width);
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![Fault::PressureEmpty]);
    }

    #[test]
    fn pressure_modes_wait_for_a_measured_pressure() {
        let (mut model, rx) = model();
        model.add_particles(Species::Heavy, 100);
        assert_eq!(model.pressure(), None);
        // nothing has reached a wall yet, so there is no pressure to hold
        model.set_hold_constant(HoldConstant::PressureV);
        assert_eq!(model.hold_constant(), HoldConstant::Nothing);
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![Fault::PressureEmpty]);

        run_until_pressure(&mut model);
        run(&mut model, 300, 0.1);
        let measured = model.pressure();
        model.set_hold_constant(HoldConstant::PressureV);
        assert_eq!(model.hold_constant(), HoldConstant::PressureV);
        run(&mut model, 3, 0.1);
        assert_eq!(model.hold_constant(), HoldConstant::PressureV);
        assert_eq!(model.pressure(), measured);
        assert!(measured.is_some_and(|p| p > 0.0));
        assert!(rx.try_iter().next().is_none());
    }

    #[test]
    fn zero_pressure_refuses_pressure_modes() {
        let (mut model, rx) = model();
        model.set_playing(false);
        model.add_particles(Species::Heavy, 10);
        assert_eq!(model.pressure(), Some(0.0));
        model.set_hold_constant(HoldConstant::PressureT);
        assert_eq!(model.hold_constant(), HoldConstant::Nothing);
        assert_eq!(rx.try_recv().ok(), Some(Fault::PressureEmpty));
    }

    #[test]
    fn pressure_by_volume_out_of_range_faults_and_clamps() {
        let (mut model, rx) = model();
        model.add_particles(Species::Heavy, 100);
        run_until_pressure(&mut model);
        model.set_hold_constant(HoldConstant::PressureV);
        // heating at constant pressure pushes the ideal width past the maximum
        model.set_heat_cool_factor(1.0);
        for _ in 0..5000 {
            model.step_model_time(0.1);
            if model.hold_constant() == HoldConstant::Nothing {
                break;
            }
        }
        assert_eq!(model.hold_constant(), HoldConstant::Nothing);
        let faults: Vec<Fault> = rx.try_iter().collect();
        assert_eq!(faults.len(), 1);
        assert!(matches!(faults[0], Fault::PressureLarge | Fault::PressureSmall));
        let range = model.container.width_range;
        assert!(range.contains(model.container.width()));
    }

    #[test]
    fn pressure_by_temperature_matches_ideal_gas_law() {
        let (mut model, _rx) = model();
        model.add_particles(Species::Heavy, 100);
        run_until_pressure(&mut model);
        model.set_hold_constant(HoldConstant::PressureT);
        let pressure = model.pressure().unwrap();
        model.request_container_resize(12000.0);
        run(&mut model, 1, 0.1);
        let n = model.number_of_particles() as f64;
        let t = model.temperature().unwrap();
        let expected = crate::units::from_kilopascals(pressure) * model.volume()
            / (n * crate::units::BOLTZMANN);
        assert_eq!(model.pressure(), Some(pressure));
        assert!((t - expected).abs() < 1e-6 * expected, "T {t} vs {expected}");
    }

    #[test]
    fn volume_modes_ignore_resize_requests() {
        let (mut model, _rx) = model();
        model.set_hold_constant(HoldConstant::Volume);
        model.request_container_resize(6000.0);
        assert_eq!(model.container.width(), 10000.0);
    }

    #[test]
    fn maximum_temperature_resets_once_per_crossing() {
        let config = SimConfig {
            max_temperature: 1000.0,
            ..SimConfig::seeded(3)
        };
        let (mut model, rx) = model_with(config);
        model.add_particles(Species::Heavy, 30);
        run(&mut model, 3, 0.1);
        model.blow_lid_off();
        model.particle_system.set_temperature(5000.0);
        run(&mut model, 10, 0.1);

        assert_eq!(model.number_of_particles(), 0);
        assert!(model.container.is_lid_on());
        assert_eq!(model.hold_constant(), HoldConstant::Nothing);
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![Fault::MaximumTemperature]);

        // a second crossing raises a second fault
        model.add_particles(Species::Light, 10);
        model.particle_system.set_temperature(5000.0);
        run(&mut model, 1, 0.1);
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![Fault::MaximumTemperature]);
    }

    #[test]
    fn maximum_temperature_keeps_volume_mode() {
        let config = SimConfig {
            max_temperature: 2000.0,
            ..SimConfig::seeded(5)
        };
        let (mut model, rx) = model_with(config);
        model.add_particles(Species::Heavy, 100);
        run(&mut model, 3, 0.1);
        model.set_hold_constant(HoldConstant::Volume);
        model.particle_system.set_temperature(10_000.0);
        run(&mut model, 1, 0.1);
        assert_eq!(model.hold_constant(), HoldConstant::Volume);
        assert_eq!(model.number_of_particles(), 0);
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![Fault::MaximumTemperature]);
    }
}
