// particle/tests.rs
// Kinematics tests for Particle

use super::Particle;
use crate::species::Species;
use ultraviolet::DVec2;

#[test]
fn step_integrates_free_flight() {
    let mut p = Particle::new_from_species(Species::Heavy);
    p.set_position(100.0, 200.0);
    p.velocity = DVec2::new(10.0, -5.0);
    p.step(0.5);
    assert_eq!(p.position, DVec2::new(105.0, 197.5));
    assert_eq!(p.previous_position, DVec2::new(100.0, 200.0));
}

#[test]
#[should_panic(expected = "dt must be > 0")]
fn zero_dt_is_a_contract_violation() {
    let mut p = Particle::new_from_species(Species::Light);
    p.step(0.0);
}

#[test]
fn edges_follow_radius() {
    let mut p = Particle::new(Species::Heavy, 28.0, 125.0);
    p.set_position(0.0, 0.0);
    assert_eq!((p.left(), p.right(), p.bottom(), p.top()), (-125.0, 125.0, -125.0, 125.0));
    p.set_right(-75.0);
    assert_eq!(p.position.x, -200.0);
    p.set_top(8750.0);
    assert_eq!(p.top(), 8750.0);
}

#[test]
fn velocity_magnitude_keeps_direction() {
    let mut p = Particle::new_from_species(Species::Heavy);
    p.velocity = DVec2::new(3.0, 4.0);
    p.set_velocity_magnitude(10.0);
    assert!((p.velocity - DVec2::new(6.0, 8.0)).mag() < 1e-12);
}

#[test]
fn motionless_particle_gets_x_direction() {
    let mut p = Particle::new_from_species(Species::Light);
    p.set_velocity_magnitude(2.0);
    assert_eq!(p.velocity, DVec2::new(2.0, 0.0));
}

#[test]
fn polar_velocity() {
    let mut p = Particle::new_from_species(Species::Heavy);
    p.set_velocity_polar(2.0, std::f64::consts::FRAC_PI_2);
    assert!(p.velocity.x.abs() < 1e-12);
    assert!((p.velocity.y - 2.0).abs() < 1e-12);
    assert!((p.kinetic_energy() - 0.5 * 28.0 * 4.0).abs() < 1e-9);
}

#[test]
fn touching_is_not_overlapping() {
    let mut a = Particle::new(Species::Heavy, 1.0, 1.0);
    let mut b = Particle::new(Species::Heavy, 1.0, 1.0);
    a.set_position(0.0, 0.0);
    b.set_position(2.0, 0.0);
    assert!(!a.overlaps(&b));
    b.set_position(1.999, 0.0);
    assert!(a.overlaps(&b));
}

#[test]
#[should_panic(expected = "radius must be > 0")]
fn zero_radius_panics() {
    Particle::new(Species::Light, 4.0, 0.0);
}
