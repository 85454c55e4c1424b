//! Neighbour queries over particle positions.
//!
//! Both the nearest-neighbour attraction in [`ParticleField::step`] and the
//! pair scan in [`ConnectionGraph::recompute`] go through [`SpatialIndex`].
//! [`BruteForce`] checks every point. [`UniformGrid`] buckets points into
//! cubic cells keyed by a Morton code (Z-order curve), sorts them by key and
//! only visits the cells that overlap the query sphere.
//!
//! [`ParticleField::step`]: crate::field::ParticleField::step
//! [`ConnectionGraph::recompute`]: crate::connections::ConnectionGraph::recompute

use crate::Vec3;
use serde::{Deserialize, Serialize};

/// A rebuildable point index.
pub trait SpatialIndex: Send {
    /// Replace the indexed set with `positions[i]` for every `i` where `include(i)`.
    fn rebuild(&mut self, positions: &[Vec3], include: &dyn Fn(usize) -> bool);

    /// Push the index of every indexed point strictly closer than `radius`
    /// to `position` onto `out`. Order is unspecified.
    fn query_neighbors(&self, position: Vec3, radius: f32, out: &mut Vec<usize>);

    /// Number of indexed points.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Which index implementation a scene uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpatialStrategy {
    /// Check every pair. Fine for a few hundred particles.
    BruteForce,
    /// Uniform grid with Morton-coded cells.
    Grid(SpatialConfig),
}

impl Default for SpatialStrategy {
    fn default() -> Self {
        SpatialStrategy::BruteForce
    }
}

impl SpatialStrategy {
    pub fn build(&self) -> Box<dyn SpatialIndex> {
        match *self {
            SpatialStrategy::BruteForce => Box::new(BruteForce::default()),
            SpatialStrategy::Grid(config) => Box::new(UniformGrid::new(config)),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        match self {
            SpatialStrategy::BruteForce => Ok(()),
            SpatialStrategy::Grid(config) => config.validate(),
        }
    }
}

/// Configuration for the spatial hashing grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpatialConfig {
    /// Size of each cell in world units. Should be >= the largest query radius.
    pub cell_size: f32,
    /// Number of cells per dimension (grid is resolution^3), power of two <= 1024.
    pub grid_resolution: u32,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            grid_resolution: 32,
        }
    }
}

impl SpatialConfig {
    pub fn new(cell_size: f32, grid_resolution: u32) -> Self {
        Self {
            cell_size,
            grid_resolution,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if !(self.cell_size > 0.0) {
            return Err("grid cell_size must be positive".into());
        }
        if !self.grid_resolution.is_power_of_two() {
            return Err("grid resolution must be a power of 2".into());
        }
        if self.grid_resolution > 1024 {
            return Err("grid resolution must be <= 1024 for 30-bit Morton codes".into());
        }
        Ok(())
    }

    /// Cell coordinates of a world position. The grid is centered on the origin
    /// and positions outside it are clamped to the border cells.
    pub fn cell_of(&self, pos: Vec3) -> [u32; 3] {
        let half_grid = self.grid_resolution as f32 * self.cell_size * 0.5;
        let max = (self.grid_resolution - 1) as f32;
        let normalized = (pos + Vec3::splat(half_grid)) / self.cell_size;
        let clamped = normalized.floor().clamp(Vec3::ZERO, Vec3::splat(max));
        [clamped.x as u32, clamped.y as u32, clamped.z as u32]
    }
}

/// Expand a 10-bit integer to 30 bits by inserting 2 zeros between each bit.
#[inline]
fn expand_bits(v: u32) -> u32 {
    let mut x = v & 0x0000_03FF;
    x = (x | (x << 16)) & 0x0300_00FF;
    x = (x | (x << 8)) & 0x0300_F00F;
    x = (x | (x << 4)) & 0x030C_30C3;
    x = (x | (x << 2)) & 0x0924_9249;
    x
}

/// Compact 30 bits to 10 bits by extracting every third bit.
#[inline]
fn compact_bits(v: u32) -> u32 {
    let mut x = v & 0x0924_9249;
    x = (x | (x >> 2)) & 0x030C_30C3;
    x = (x | (x >> 4)) & 0x0300_F00F;
    x = (x | (x >> 8)) & 0x0300_00FF;
    x = (x | (x >> 16)) & 0x0000_03FF;
    x
}

/// 30-bit Morton code for a cell (each coord 0-1023).
#[inline]
pub fn morton_encode(x: u32, y: u32, z: u32) -> u32 {
    expand_bits(x) | (expand_bits(y) << 1) | (expand_bits(z) << 2)
}

/// Decode a Morton code back to cell coordinates.
#[inline]
pub fn morton_decode(code: u32) -> [u32; 3] {
    [compact_bits(code), compact_bits(code >> 1), compact_bits(code >> 2)]
}

/// Exhaustive scan over all indexed points.
#[derive(Debug, Default, Clone)]
pub struct BruteForce {
    points: Vec<(usize, Vec3)>,
}

impl SpatialIndex for BruteForce {
    fn rebuild(&mut self, positions: &[Vec3], include: &dyn Fn(usize) -> bool) {
        self.points.clear();
        self.points.extend(
            positions
                .iter()
                .enumerate()
                .filter(|(i, _)| include(*i))
                .map(|(i, p)| (i, *p)),
        );
    }

    fn query_neighbors(&self, position: Vec3, radius: f32, out: &mut Vec<usize>) {
        let r2 = radius * radius;
        out.extend(
            self.points
                .iter()
                .filter(|(_, p)| p.distance_squared(position) < r2)
                .map(|(i, _)| *i),
        );
    }

    fn len(&self) -> usize {
        self.points.len()
    }
}

/// Uniform grid: points sorted by the Morton code of their cell.
#[derive(Debug, Clone)]
pub struct UniformGrid {
    config: SpatialConfig,
    /// `(morton, particle index, position)` sorted by morton code.
    sorted: Vec<(u32, usize, Vec3)>,
}

impl UniformGrid {
    pub fn new(config: SpatialConfig) -> Self {
        Self {
            config,
            sorted: Vec::new(),
        }
    }

    pub fn config(&self) -> SpatialConfig {
        self.config
    }

    /// Entries whose cell has the given Morton code.
    fn cell(&self, code: u32) -> &[(u32, usize, Vec3)] {
        let start = self.sorted.partition_point(|(c, _, _)| *c < code);
        let end = start + self.sorted[start..].partition_point(|(c, _, _)| *c == code);
        &self.sorted[start..end]
    }
}

impl SpatialIndex for UniformGrid {
    fn rebuild(&mut self, positions: &[Vec3], include: &dyn Fn(usize) -> bool) {
        self.sorted.clear();
        for (i, p) in positions.iter().enumerate() {
            if include(i) {
                let [x, y, z] = self.config.cell_of(*p);
                self.sorted.push((morton_encode(x, y, z), i, *p));
            }
        }
        self.sorted.sort_unstable_by_key(|(code, i, _)| (*code, *i));
    }

    fn query_neighbors(&self, position: Vec3, radius: f32, out: &mut Vec<usize>) {
        if self.sorted.is_empty() || radius <= 0.0 {
            return;
        }
        let r2 = radius * radius;
        let reach = (radius / self.config.cell_size).ceil().max(1.0) as i64;
        let max = self.config.grid_resolution as i64 - 1;
        let [cx, cy, cz] = self.config.cell_of(position);
        let (cx, cy, cz) = (cx as i64, cy as i64, cz as i64);

        for z in (cz - reach).max(0)..=(cz + reach).min(max) {
            for y in (cy - reach).max(0)..=(cy + reach).min(max) {
                for x in (cx - reach).max(0)..=(cx + reach).min(max) {
                    let code = morton_encode(x as u32, y as u32, z as u32);
                    out.extend(
                        self.cell(code)
                            .iter()
                            .filter(|(_, _, p)| p.distance_squared(position) < r2)
                            .map(|(_, i, _)| *i),
                    );
                }
            }
        }
    }

    fn len(&self) -> usize {
        self.sorted.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spawn::SpawnContext;

    #[test]
    fn morton_roundtrip() {
        for &(x, y, z) in &[(0, 0, 0), (1, 2, 3), (1023, 512, 7), (31, 31, 31)] {
            assert_eq!(morton_decode(morton_encode(x, y, z)), [x, y, z]);
        }
    }

    #[test]
    fn morton_interleaves_bits() {
        assert_eq!(morton_encode(1, 0, 0), 0b001);
        assert_eq!(morton_encode(0, 1, 0), 0b010);
        assert_eq!(morton_encode(0, 0, 1), 0b100);
    }

    #[test]
    fn cell_of_clamps_outside_points() {
        let config = SpatialConfig::new(1.0, 8);
        assert_eq!(config.cell_of(Vec3::splat(100.0)), [7, 7, 7]);
        assert_eq!(config.cell_of(Vec3::splat(-100.0)), [0, 0, 0]);
        assert_eq!(config.cell_of(Vec3::ZERO), [4, 4, 4]);
    }

    #[test]
    fn config_validation() {
        assert!(SpatialConfig::new(1.0, 32).validate().is_ok());
        assert!(SpatialConfig::new(1.0, 30).validate().is_err());
        assert!(SpatialConfig::new(0.0, 32).validate().is_err());
        assert!(SpatialConfig::new(1.0, 2048).validate().is_err());
    }

    #[test]
    fn grid_matches_brute_force() {
        let mut ctx = SpawnContext::seeded(11);
        let positions: Vec<Vec3> = (0..400).map(|_| ctx.random_in_cube(6.0)).collect();
        let include = |i: usize| i % 3 != 0;

        let mut brute = BruteForce::default();
        brute.rebuild(&positions, &include);
        let mut grid = UniformGrid::new(SpatialConfig::new(0.75, 16));
        grid.rebuild(&positions, &include);
        assert_eq!(brute.len(), grid.len());

        for radius in [0.5, 1.2, 3.0] {
            for probe in positions.iter().take(50) {
                let mut a = Vec::new();
                let mut b = Vec::new();
                brute.query_neighbors(*probe, radius, &mut a);
                grid.query_neighbors(*probe, radius, &mut b);
                a.sort_unstable();
                b.sort_unstable();
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn query_is_strict() {
        let positions = [Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)];
        let mut brute = BruteForce::default();
        brute.rebuild(&positions, &|_| true);
        let mut out = Vec::new();
        brute.query_neighbors(Vec3::ZERO, 1.0, &mut out);
        assert_eq!(out, vec![0]);
    }
}
