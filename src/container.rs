// container.rs
// Rectangular particle container with a movable left wall and a lid

use log::{debug, info};
use serde::{Deserialize, Serialize};
use ultraviolet::DVec2;

use crate::bounds::Bounds;
use crate::config::SimConfig;
use crate::particle::Particle;

/// What the collision detector needs to know about the walls around a set of particles.
pub trait ParticleContainer {
    /// Inside bounds, in pm.
    fn bounds(&self) -> Bounds;

    /// Inside bounds at maximum width. Sizes the region grid.
    fn max_bounds(&self) -> Bounds;

    /// Walls that confine `particle`. Containers split by a divider override this.
    fn wall_bounds_for(&self, _particle: &Particle) -> Bounds {
        self.bounds()
    }

    /// Instantaneous velocity of the left wall, pm/ps.
    fn left_wall_velocity(&self) -> DVec2 {
        DVec2::zero()
    }

    fn left_wall_does_work(&self) -> bool {
        false
    }

    /// Horizontal extent of the gap in the top wall, if there is one.
    fn opening(&self) -> Option<(f64, f64)> {
        None
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LidState {
    On,
    Off,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeState {
    Idle,
    /// The width is following a user drag.
    UserDriven,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WidthRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl WidthRange {
    pub fn contains(&self, width: f64) -> bool {
        width >= self.min && width <= self.max
    }

    pub fn constrain(&self, width: f64) -> f64 {
        width.clamp(self.min, self.max)
    }
}

/// Container of the ideal-gas screens. The origin is the bottom-right corner
/// and the width grows to the left.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IdealGasContainer {
    pub position: DVec2,
    pub width_range: WidthRange,
    width: f64,
    desired_width: f64,
    pub height: f64,
    pub depth: f64,
    pub wall_thickness: f64,
    pub left_wall_does_work: bool,
    max_wall_speed: f64,
    left_wall_velocity: DVec2,
    lid: LidState,
    lid_width: f64,
    opening_left_inset: f64,
    opening_right_inset: f64,
    resize_state: ResizeState,
}

impl IdealGasContainer {
    pub fn new(config: &SimConfig) -> Self {
        let width_range = WidthRange {
            min: config.width_min,
            max: config.width_max,
            default: config.width_default,
        };
        assert!(
            width_range.min > 0.0 && width_range.contains(width_range.default),
            "invalid width range {width_range:?}"
        );
        let mut container = Self {
            position: DVec2::new(config.container_position[0], config.container_position[1]),
            width_range,
            width: width_range.default,
            desired_width: width_range.default,
            height: config.container_height,
            depth: config.container_depth,
            wall_thickness: config.wall_thickness,
            left_wall_does_work: config.left_wall_does_work,
            max_wall_speed: config.max_wall_speed,
            left_wall_velocity: DVec2::zero(),
            lid: LidState::On,
            lid_width: 0.0,
            opening_left_inset: config.opening_left_inset,
            opening_right_inset: config.opening_right_inset,
            resize_state: ResizeState::Idle,
        };
        container.lid_width = container.max_lid_width();
        container
    }

    pub fn reset(&mut self) {
        self.width = self.width_range.default;
        self.desired_width = self.width;
        self.left_wall_velocity = DVec2::zero();
        self.resize_state = ResizeState::Idle;
        self.lid = LidState::On;
        self.lid_width = self.max_lid_width();
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn desired_width(&self) -> f64 {
        self.desired_width
    }

    pub fn resize_state(&self) -> ResizeState {
        self.resize_state
    }

    /// V, in pm³.
    pub fn volume(&self) -> f64 {
        self.width * self.height * self.depth
    }

    pub fn left(&self) -> f64 {
        self.position.x - self.width
    }

    pub fn right(&self) -> f64 {
        self.position.x
    }

    pub fn bottom(&self) -> f64 {
        self.position.y
    }

    pub fn top(&self) -> f64 {
        self.position.y + self.height
    }

    /// Fully inside the walls?
    pub fn contains_particle(&self, particle: &Particle) -> bool {
        particle.left() >= self.left()
            && particle.right() <= self.right()
            && particle.bottom() >= self.bottom()
            && particle.top() <= self.top()
    }

    /// Change the width over `dt` ps. The left wall moves at -Δwidth/dt.
    pub fn resize(&mut self, width: f64, dt: f64) {
        assert!(dt > 0.0, "dt must be > 0, got {dt}");
        let width = self.width_range.constrain(width);
        let delta = width - self.width;
        self.left_wall_velocity = DVec2::new(-delta / dt, 0.0);
        self.set_width(width);
    }

    /// Jump to `width` with a motionless wall.
    pub fn resize_immediately(&mut self, width: f64) {
        let width = self.width_range.constrain(width);
        self.left_wall_velocity = DVec2::zero();
        self.set_width(width);
        self.desired_width = width;
        self.resize_state = ResizeState::Idle;
    }

    /// The user dragged the left wall to `width`.
    pub fn request_resize(&mut self, width: f64) {
        self.desired_width = self.width_range.constrain(width);
        self.resize_state = ResizeState::UserDriven;
    }

    /// The opening keeps its size while the left wall moves.
    fn set_width(&mut self, width: f64) {
        let opening = self.max_lid_width() - self.lid_width;
        self.width = width;
        self.lid_width = (self.max_lid_width() - opening).clamp(self.min_lid_width(), self.max_lid_width());
    }

    /// Move the left wall toward the desired width.
    pub fn step(&mut self, dt: f64) {
        assert!(dt > 0.0, "dt must be > 0, got {dt}");
        let mut delta = self.desired_width - self.width;
        if delta == 0.0 {
            self.left_wall_velocity = DVec2::zero();
            self.resize_state = ResizeState::Idle;
            return;
        }
        // a wall that does work pushes at a bounded speed while compressing
        if self.left_wall_does_work && delta < 0.0 {
            delta = delta.max(-self.max_wall_speed * dt);
        }
        self.resize(self.width + delta, dt);
        if self.width == self.desired_width {
            debug!("[container] resize to {:.1} pm complete", self.width);
        }
    }

    pub fn lid(&self) -> LidState {
        self.lid
    }

    pub fn is_lid_on(&self) -> bool {
        self.lid == LidState::On
    }

    pub fn lid_width(&self) -> f64 {
        self.lid_width
    }

    /// The lid always covers the left wall plus the left inset.
    pub fn min_lid_width(&self) -> f64 {
        self.wall_thickness + self.opening_left_inset
    }

    /// Lid width that closes the opening completely.
    pub fn max_lid_width(&self) -> f64 {
        self.width + self.wall_thickness - self.opening_right_inset
    }

    pub fn set_lid_width(&mut self, lid_width: f64) {
        self.lid_width = lid_width.clamp(self.min_lid_width(), self.max_lid_width());
    }

    pub fn opening_left(&self) -> f64 {
        match self.lid {
            LidState::On => self.left() - self.wall_thickness + self.lid_width,
            LidState::Off => self.left(),
        }
    }

    pub fn opening_right(&self) -> f64 {
        self.right() - self.opening_right_inset
    }

    pub fn opening_width(&self) -> f64 {
        (self.opening_right() - self.opening_left()).max(0.0)
    }

    pub fn is_open(&self) -> bool {
        !self.is_lid_on() || self.opening_width() > 0.0
    }

    pub fn blow_lid_off(&mut self) {
        if self.lid == LidState::On {
            info!("[container] lid blown off");
            self.lid = LidState::Off;
        }
    }

    /// Put the lid back on, fully closed.
    pub fn return_lid(&mut self) {
        self.lid = LidState::On;
        self.lid_width = self.max_lid_width();
    }
}

impl ParticleContainer for IdealGasContainer {
    fn bounds(&self) -> Bounds {
        Bounds::new(self.left(), self.bottom(), self.right(), self.top())
    }

    fn max_bounds(&self) -> Bounds {
        Bounds::new(
            self.position.x - self.width_range.max,
            self.bottom(),
            self.right(),
            self.top(),
        )
    }

    fn left_wall_velocity(&self) -> DVec2 {
        self.left_wall_velocity
    }

    fn left_wall_does_work(&self) -> bool {
        self.left_wall_does_work
    }

    fn opening(&self) -> Option<(f64, f64)> {
        if self.is_open() {
            Some((self.opening_left(), self.opening_right()))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OPENING_RIGHT_INSET;

    fn container() -> IdealGasContainer {
        IdealGasContainer::new(&SimConfig::default())
    }

    #[test]
    fn default_geometry() {
        let c = container();
        assert_eq!(c.width(), 10000.0);
        assert_eq!(c.bounds(), Bounds::new(-10000.0, 0.0, 0.0, 8750.0));
        assert_eq!(c.volume(), 10000.0 * 8750.0 * 4000.0);
        assert!(c.is_lid_on());
        assert!(!c.is_open());
        assert_eq!(c.opening(), None);
    }

    #[test]
    fn resize_clamps_and_sets_wall_velocity() {
        let mut c = container();
        c.resize(20000.0, 2.0);
        assert_eq!(c.width(), 15000.0);
        // wall moved 5000 pm to the left in 2 ps
        assert_eq!(c.left_wall_velocity(), DVec2::new(-2500.0, 0.0));
        c.resize_immediately(1.0);
        assert_eq!(c.width(), 5000.0);
        assert_eq!(c.left_wall_velocity(), DVec2::zero());
    }

    #[test]
    fn lid_width_stays_in_range_when_width_changes() {
        let mut c = container();
        assert_eq!(c.lid_width(), c.max_lid_width());
        c.resize_immediately(6000.0);
        assert!(c.lid_width() <= c.max_lid_width());
        assert!(!c.is_open());
        c.set_lid_width(0.0);
        assert_eq!(c.lid_width(), c.min_lid_width());
        assert!(c.opening_width() > 0.0);
        assert!(c.opening_right() <= c.right());
        assert!(c.opening_left() >= c.left());
    }

    #[test]
    fn closed_lid_stays_closed_when_widening() {
        let mut c = container();
        c.resize_immediately(14000.0);
        assert!(!c.is_open());
        c.set_lid_width(c.max_lid_width() - 1000.0);
        c.resize_immediately(8000.0);
        assert!((c.opening_width() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn lid_transitions() {
        let mut c = container();
        c.blow_lid_off();
        assert_eq!(c.lid(), LidState::Off);
        assert!(c.is_open());
        assert_eq!(c.opening(), Some((c.left(), c.right() - OPENING_RIGHT_INSET)));
        c.return_lid();
        assert!(c.is_lid_on());
        assert!(!c.is_open());
    }

    #[test]
    fn working_wall_is_speed_limited_while_compressing() {
        let config = SimConfig {
            left_wall_does_work: true,
            ..SimConfig::default()
        };
        let mut c = IdealGasContainer::new(&config);
        c.request_resize(5000.0);
        assert_eq!(c.resize_state(), ResizeState::UserDriven);
        c.step(1.0);
        assert_eq!(c.width(), 10000.0 - config.max_wall_speed);
        assert_eq!(c.left_wall_velocity(), DVec2::new(config.max_wall_speed, 0.0));
        for _ in 0..100 {
            c.step(1.0);
        }
        assert_eq!(c.width(), 5000.0);
        assert_eq!(c.left_wall_velocity(), DVec2::zero());
        assert_eq!(c.resize_state(), ResizeState::Idle);
    }

    #[test]
    fn passive_wall_jumps_to_desired_width() {
        let mut c = container();
        c.request_resize(12000.0);
        c.step(0.5);
        assert_eq!(c.width(), 12000.0);
    }
}
