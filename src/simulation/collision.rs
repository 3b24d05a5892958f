// simulation/collision.rs
// Particle-particle and particle-wall collision detection and response

use ultraviolet::DVec2;

use crate::bounds::Bounds;
use crate::container::ParticleContainer;
use crate::particle::Particle;
use crate::profile_scope;
use crate::region_grid::{ParticleRef, RegionGrid};

pub struct CollisionDetector {
    grid: RegionGrid,
    pub particle_particle_collisions_enabled: bool,
    number_of_particle_container_collisions: usize,
    number_of_particle_particle_collisions: usize,
    /// Σ m|Δv| over the wall collisions of the last update, amu·pm/ps.
    wall_impulse: f64,
}

impl CollisionDetector {
    pub fn new(container: &dyn ParticleContainer, region_length: f64) -> Self {
        Self {
            grid: RegionGrid::new(container.max_bounds(), region_length),
            particle_particle_collisions_enabled: true,
            number_of_particle_container_collisions: 0,
            number_of_particle_particle_collisions: 0,
            wall_impulse: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.particle_particle_collisions_enabled = true;
        self.number_of_particle_container_collisions = 0;
        self.number_of_particle_particle_collisions = 0;
        self.wall_impulse = 0.0;
    }

    /// Wall collisions found by the last update.
    pub fn number_of_particle_container_collisions(&self) -> usize {
        self.number_of_particle_container_collisions
    }

    pub fn number_of_particle_particle_collisions(&self) -> usize {
        self.number_of_particle_particle_collisions
    }

    pub fn wall_impulse(&self) -> f64 {
        self.wall_impulse
    }

    pub fn grid(&self) -> &RegionGrid {
        &self.grid
    }

    /// Resolve all collisions of the particles in `collections` for one step.
    pub fn update(
        &mut self,
        container: &dyn ParticleContainer,
        collections: &mut [Vec<Particle>],
        dt: f64,
    ) {
        profile_scope!("collision");
        assert!(dt > 0.0, "dt must be > 0, got {dt}");

        self.number_of_particle_particle_collisions = 0;
        if self.particle_particle_collisions_enabled {
            self.grid.rebuild(collections);
            let mut count = 0;
            for region in self.grid.occupied_regions() {
                for (n, &a) in region.iter().enumerate() {
                    for &b in &region[n + 1..] {
                        let (p1, p2) = pair_mut(collections, a, b);
                        if resolve_particle_particle(p1, p2) {
                            count += 1;
                        }
                    }
                }
            }
            self.number_of_particle_particle_collisions = count;
        }

        self.number_of_particle_container_collisions = 0;
        self.wall_impulse = 0.0;
        let wall_velocity = if container.left_wall_does_work() {
            Some(container.left_wall_velocity())
        } else {
            None
        };
        let opening = container.opening();
        for particles in collections.iter_mut() {
            for p in particles.iter_mut() {
                let bounds = container.wall_bounds_for(p);
                let velocity_before = p.velocity;
                if collide_with_walls(p, &bounds, wall_velocity, opening) {
                    self.number_of_particle_container_collisions += 1;
                    self.wall_impulse += p.mass * (p.velocity - velocity_before).mag();
                }
            }
        }
    }
}

/// Mutable access to two distinct particles of `collections`.
fn pair_mut(
    collections: &mut [Vec<Particle>],
    a: ParticleRef,
    b: ParticleRef,
) -> (&mut Particle, &mut Particle) {
    assert_ne!(a, b, "a particle cannot collide with itself");
    if a.0 == b.0 {
        let particles = &mut collections[a.0];
        if a.1 < b.1 {
            let (lo, hi) = particles.split_at_mut(b.1);
            (&mut lo[a.1], &mut hi[0])
        } else {
            let (lo, hi) = particles.split_at_mut(a.1);
            (&mut hi[0], &mut lo[b.1])
        }
    } else if a.0 < b.0 {
        let (lo, hi) = collections.split_at_mut(b.0);
        (&mut lo[a.0][a.1], &mut hi[0][b.1])
    } else {
        let (lo, hi) = collections.split_at_mut(a.0);
        (&mut hi[0][a.1], &mut lo[b.0][b.1])
    }
}

/// Elastic collision along the line of centres. Only overlapping pairs that
/// are approaching each other respond; returns whether a collision happened.
pub fn resolve_particle_particle(p1: &mut Particle, p2: &mut Particle) -> bool {
    if !p1.overlaps(p2) {
        return false;
    }
    let d = p2.position - p1.position;
    let r = p1.radius + p2.radius;
    let d_sq = d.mag_sq();
    let r_sq = r * r;
    let v1_initial = p1.velocity;
    let v2_initial = p2.velocity;
    let v = v2_initial - v1_initial;
    let d_dot_v = d.dot(v);
    // separating, tangential or at rest relative to each other
    if d_dot_v >= 0.0 {
        return false;
    }

    // rewind both particles to the moment of contact
    let v_sq = v.mag_sq();
    let t = (d_dot_v + (d_dot_v * d_dot_v - v_sq * (d_sq - r_sq)).max(0.0).sqrt()) / v_sq;
    p1.position -= v1_initial * t;
    p2.position -= v2_initial * t;

    let m1 = p1.mass;
    let m2 = p2.mass;
    let weight1 = 2.0 * m2 / (m1 + m2);
    let weight2 = 2.0 * m1 / (m1 + m2);
    let d = p2.position - p1.position;
    let normal = d * (d.dot(v) / d.mag_sq());
    p1.velocity = v1_initial + normal * weight1;
    p2.velocity = v2_initial - normal * weight2;

    // and replay the rewound time with the new velocities
    p1.position += p1.velocity * t;
    p2.position += p2.velocity * t;
    true
}

/// Reflect `p` off the walls of `bounds`. The top wall has a gap over
/// `opening`. With `wall_velocity` the left wall exchanges momentum like a
/// piston. Returns whether the velocity was reflected.
pub fn collide_with_walls(
    p: &mut Particle,
    bounds: &Bounds,
    wall_velocity: Option<DVec2>,
    opening: Option<(f64, f64)>,
) -> bool {
    let mut collided = false;

    if p.left() <= bounds.min_x {
        p.set_left(bounds.min_x);
        match wall_velocity {
            Some(w) => {
                // reflect in the wall's frame
                if p.velocity.x < w.x {
                    p.velocity.x = 2.0 * w.x - p.velocity.x;
                    collided = true;
                }
            }
            None => {
                if p.velocity.x < 0.0 {
                    p.velocity.x = -p.velocity.x;
                    collided = true;
                }
            }
        }
    } else if p.right() >= bounds.max_x {
        p.set_right(bounds.max_x);
        if p.velocity.x > 0.0 {
            p.velocity.x = -p.velocity.x;
            collided = true;
        }
    }

    let in_opening = opening
        .map(|(left, right)| p.left() > left && p.right() < right)
        .unwrap_or(false);
    if p.top() >= bounds.max_y && !in_opening {
        p.set_top(bounds.max_y);
        if p.velocity.y > 0.0 {
            p.velocity.y = -p.velocity.y;
            collided = true;
        }
    } else if p.bottom() <= bounds.min_y {
        p.set_bottom(bounds.min_y);
        if p.velocity.y < 0.0 {
            p.velocity.y = -p.velocity.y;
            collided = true;
        }
    }
    collided
}
