//! Spatial distributions and the seeded random source used to place particles.
//!
//! Every scene owns one [`SpawnContext`]. It is used at mount to lay out the
//! initial field and again whenever a slot is recycled, so a scene built from
//! a fixed seed replays identically.
//!
//! ```
//! use coreflow_fx::spawn::{Distribution, SpawnContext};
//!
//! let mut ctx = SpawnContext::seeded(7);
//! let p = ctx.sample(&Distribution::SphereSurface { radius: 5.0 });
//! assert!((p.length() - 5.0).abs() < 1e-3);
//! ```

use crate::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

/// Where freshly spawned or recycled particles are placed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Distribution {
    /// Uniform on the surface of a sphere centered at the origin.
    SphereSurface { radius: f32 },
    /// Uniform throughout a sphere's volume.
    SphereVolume { radius: f32 },
    /// Uniform throughout an axis-aligned cube of the given half-size.
    CubeVolume { half_size: f32 },
    /// On a ring in the XZ plane, displaced radially and vertically by up to `jitter`.
    CircularOrbit { radius: f32, jitter: f32 },
    /// Uniform inside a disk in the XZ plane.
    Disk { radius: f32 },
}

impl Distribution {
    /// Largest distance from the origin a sample can land at.
    pub fn extent(&self) -> f32 {
        match *self {
            Distribution::SphereSurface { radius }
            | Distribution::SphereVolume { radius }
            | Distribution::Disk { radius } => radius,
            Distribution::CubeVolume { half_size } => half_size * 3f32.sqrt(),
            Distribution::CircularOrbit { radius, jitter } => {
                let r = radius + jitter;
                (r * r + jitter * jitter).sqrt()
            }
        }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        let ok = match *self {
            Distribution::SphereSurface { radius }
            | Distribution::SphereVolume { radius }
            | Distribution::Disk { radius } => radius > 0.0,
            Distribution::CubeVolume { half_size } => half_size > 0.0,
            Distribution::CircularOrbit { radius, jitter } => radius > 0.0 && jitter >= 0.0,
        };
        if ok {
            Ok(())
        } else {
            Err(format!("distribution {:?} needs positive dimensions", self))
        }
    }
}

impl Default for Distribution {
    fn default() -> Self {
        Distribution::SphereSurface { radius: 5.0 }
    }
}

/// Seeded random source with helpers for common spawn patterns.
#[derive(Debug, Clone)]
pub struct SpawnContext {
    rng: SmallRng,
    seed: u64,
}

impl SpawnContext {
    /// Deterministic context: the same seed always yields the same samples.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Context seeded from the system clock, different on every run.
    pub fn from_clock() -> Self {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42);
        Self::seeded(seed)
    }

    /// Seeded context when a seed is given, clock-seeded otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_clock(),
        }
    }

    /// The seed this context started from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    // ========== Random primitives ==========

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `min..max`. Returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    // ========== Position helpers ==========

    /// Sample a position from `distribution`.
    pub fn sample(&mut self, distribution: &Distribution) -> Vec3 {
        match *distribution {
            Distribution::SphereSurface { radius } => self.random_on_sphere(radius),
            Distribution::SphereVolume { radius } => self.random_in_sphere(radius),
            Distribution::CubeVolume { half_size } => self.random_in_cube(half_size),
            Distribution::CircularOrbit { radius, jitter } => {
                let theta = self.rng.gen_range(0.0..TAU);
                let r = radius + self.random_range(-jitter, jitter);
                let y = self.random_range(-jitter, jitter);
                Vec3::new(r * theta.cos(), y, r * theta.sin())
            }
            Distribution::Disk { radius } => {
                let theta = self.rng.gen_range(0.0..TAU);
                let r = radius * self.rng.gen::<f32>().sqrt();
                Vec3::new(r * theta.cos(), 0.0, r * theta.sin())
            }
        }
    }

    /// Random point on the surface of a sphere of given radius.
    ///
    /// Uses the cosine of the polar angle so points do not bunch at the poles.
    pub fn random_on_sphere(&mut self, radius: f32) -> Vec3 {
        let theta = self.rng.gen_range(0.0..TAU);
        let cos_phi: f32 = self.rng.gen_range(-1.0..1.0);
        let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();

        Vec3::new(
            radius * sin_phi * theta.cos(),
            radius * sin_phi * theta.sin(),
            radius * cos_phi,
        )
    }

    /// Random point inside a sphere of given radius.
    pub fn random_in_sphere(&mut self, radius: f32) -> Vec3 {
        // Cube root for uniform volume distribution
        let r = radius * self.rng.gen::<f32>().cbrt();
        self.random_on_sphere(1.0) * r
    }

    /// Random point inside a cube of given half-size, centered at origin.
    pub fn random_in_cube(&mut self, half_size: f32) -> Vec3 {
        Vec3::new(
            self.rng.gen_range(-half_size..half_size),
            self.rng.gen_range(-half_size..half_size),
            self.rng.gen_range(-half_size..half_size),
        )
    }

    /// Random phase angle in `0..TAU`, used to desynchronise oscillations.
    pub fn random_phase(&mut self) -> f32 {
        self.rng.gen_range(0.0..TAU)
    }
}

/// Position on a helix, `t` in `0..=1`.
pub fn helix_point(radius: f32, height: f32, turns: f32, t: f32) -> Vec3 {
    let angle = t * TAU * turns;
    Vec3::new(radius * angle.cos(), (t - 0.5) * height, radius * angle.sin())
}

/// Position on a circle in the XY plane, `t` in `0..=1`.
pub fn circle_point(radius: f32, t: f32) -> Vec3 {
    let angle = t * TAU;
    Vec3::new(radius * angle.cos(), radius * angle.sin(), 0.0)
}

/// Position on a torus around the Y axis. `u`, `v` in `0..=1`.
pub fn torus_point(major: f32, minor: f32, u: f32, v: f32) -> Vec3 {
    let a = u * TAU;
    let b = v * TAU;
    let ring = major + minor * b.cos();
    Vec3::new(ring * a.cos(), minor * b.sin(), ring * a.sin())
}

/// Position on a sphere's latitude line. `lat` in `0..=1` from pole to pole.
pub fn latitude_point(radius: f32, lat: f32, t: f32) -> Vec3 {
    let phi = lat * PI;
    let theta = t * TAU;
    Vec3::new(
        radius * phi.sin() * theta.cos(),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

/// Convert HSV to RGB. All components in `0..=1`.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec3 {
    let h = h.rem_euclid(1.0);
    let c = v * s;
    let x = c * (1.0 - ((h * 6.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match (h * 6.0) as u32 % 6 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Vec3::new(r + m, g + m, b + m)
}
