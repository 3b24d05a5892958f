// region_grid.rs
// Uniform grid of square regions used as the collision broad phase

use smallvec::SmallVec;

use crate::bounds::Bounds;
use crate::particle::Particle;

/// (collection index, particle index) of a particle owned by the particle system.
pub type ParticleRef = (usize, usize);

/// Regions hold back-references only and are repopulated from scratch every
/// step. A particle belongs to every region its bounding box touches, so pairs
/// straddling a region border are still found.
pub struct RegionGrid {
    bounds: Bounds,
    region_length: f64,
    columns: usize,
    rows: usize,
    regions: Vec<SmallVec<[ParticleRef; 16]>>,
}

impl RegionGrid {
    pub fn new(bounds: Bounds, region_length: f64) -> Self {
        assert!(region_length > 0.0, "region_length must be > 0, got {region_length}");
        let columns = ((bounds.width() / region_length).ceil() as usize).max(1);
        let rows = ((bounds.height() / region_length).ceil() as usize).max(1);
        Self {
            bounds,
            region_length,
            columns,
            rows,
            regions: vec![SmallVec::new(); columns * rows],
        }
    }

    pub fn region_length(&self) -> f64 {
        self.region_length
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Bounds of the region at (`column`, `row`), clipped to the grid.
    pub fn region_bounds(&self, column: usize, row: usize) -> Bounds {
        let min_x = self.bounds.min_x + column as f64 * self.region_length;
        let min_y = self.bounds.min_y + row as f64 * self.region_length;
        Bounds::new(
            min_x,
            min_y,
            (min_x + self.region_length).min(self.bounds.max_x),
            (min_y + self.region_length).min(self.bounds.max_y),
        )
    }

    fn column(&self, x: f64) -> usize {
        let c = ((x - self.bounds.min_x) / self.region_length).floor() as isize;
        c.clamp(0, self.columns as isize - 1) as usize
    }

    fn row(&self, y: f64) -> usize {
        let r = ((y - self.bounds.min_y) / self.region_length).floor() as isize;
        r.clamp(0, self.rows as isize - 1) as usize
    }

    /// Clear all regions and re-assign every particle of `collections`.
    pub fn rebuild(&mut self, collections: &[Vec<Particle>]) {
        for region in &mut self.regions {
            region.clear();
        }
        for (c, particles) in collections.iter().enumerate() {
            for (i, p) in particles.iter().enumerate() {
                assert!(
                    2.0 * p.radius <= self.region_length,
                    "particle diameter {} exceeds region length {}",
                    2.0 * p.radius,
                    self.region_length
                );
                let (c0, c1) = (self.column(p.left()), self.column(p.right()));
                let (r0, r1) = (self.row(p.bottom()), self.row(p.top()));
                for row in r0..=r1 {
                    for column in c0..=c1 {
                        self.regions[column + row * self.columns].push((c, i));
                    }
                }
            }
        }
    }

    /// Members of every non-empty region.
    pub fn occupied_regions(&self) -> impl Iterator<Item = &[ParticleRef]> {
        self.regions
            .iter()
            .filter(|r| !r.is_empty())
            .map(|r| r.as_slice())
    }

    pub fn region(&self, column: usize, row: usize) -> &[ParticleRef] {
        &self.regions[column + row * self.columns]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::Species;

    fn particle_at(x: f64, y: f64) -> Particle {
        let mut p = Particle::new_from_species(Species::Heavy);
        p.set_position(x, y);
        p
    }

    #[test]
    fn grid_covers_bounds() {
        let grid = RegionGrid::new(Bounds::new(-15000.0, 0.0, 0.0, 8750.0), 2000.0);
        assert_eq!(grid.columns(), 8);
        assert_eq!(grid.rows(), 5);
        let last = grid.region_bounds(7, 4);
        assert_eq!(last.max_x, 0.0);
        assert_eq!(last.max_y, 8750.0);
    }

    #[test]
    fn particle_on_border_joins_both_regions() {
        let mut grid = RegionGrid::new(Bounds::new(0.0, 0.0, 4000.0, 2000.0), 2000.0);
        let collections = vec![vec![particle_at(1000.0, 1000.0), particle_at(2000.0, 1000.0)]];
        grid.rebuild(&collections);
        assert_eq!(grid.region(0, 0), &[(0, 0), (0, 1)]);
        assert_eq!(grid.region(1, 0), &[(0, 1)]);
    }

    #[test]
    fn rebuild_starts_from_scratch() {
        let mut grid = RegionGrid::new(Bounds::new(0.0, 0.0, 4000.0, 2000.0), 2000.0);
        grid.rebuild(&[vec![particle_at(1000.0, 1000.0)]]);
        grid.rebuild(&[vec![particle_at(3000.0, 1000.0)], vec![particle_at(3500.0, 500.0)]]);
        assert!(grid.region(0, 0).is_empty());
        assert_eq!(grid.region(1, 0), &[(0, 0), (1, 0)]);
        assert_eq!(grid.occupied_regions().count(), 1);
    }

    #[test]
    fn particles_outside_are_clamped_into_edge_regions() {
        let mut grid = RegionGrid::new(Bounds::new(0.0, 0.0, 4000.0, 2000.0), 2000.0);
        grid.rebuild(&[vec![particle_at(-500.0, 5000.0)]]);
        assert_eq!(grid.region(0, 0), &[(0, 0)]);
    }
}
