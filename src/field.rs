//! The particle field: a fixed-capacity set of particles advanced once per frame.
//!
//! # Frame update
//!
//! [`ParticleField::step`] applies, in order:
//!
//! 1. **Activation** - dormant particles within `activation_radius` of the
//!    pointer become [`ParticleState::Active`].
//! 2. **Attraction** - every active particle accelerates toward the nearest
//!    other engaged (active or connected) particle.
//! 3. **Integration** - velocities are damped, clamped and integrated with
//!    explicit Euler at a nominal 60 frames per second. Dormant particles bob
//!    on a sine wave when `drift` is set.
//! 4. **Aging** - with a `lifetime`, particles fade out and their slot is
//!    recycled once fully transparent.
//! 5. **Bounds** - particles that leave the bounding volume are recycled to a
//!    fresh position from the spawn distribution.
//!
//! Slots are never allocated or freed after [`ParticleField::initialize`].
//!
//! # Example
//!
//! ```
//! use coreflow_fx::field::{FieldConfig, ParticleField};
//! use coreflow_fx::particle::ParticleState;
//! use coreflow_fx::spawn::{Distribution, SpawnContext};
//!
//! let mut field = ParticleField::initialize(
//!     100,
//!     Distribution::SphereSurface { radius: 5.0 },
//!     FieldConfig::default(),
//!     SpawnContext::seeded(1),
//! );
//! let target = field.particles()[7].position;
//! field.step(0.0, Some(target));
//! assert_eq!(field.particles()[7].state(), ParticleState::Active);
//! ```

use crate::camera::Ray;
use crate::particle::{Attributes, Particle, ParticleState};
use crate::spatial::{SpatialIndex, SpatialStrategy};
use crate::spawn::{Distribution, SpawnContext};
use crate::Vec3;
use serde::{Deserialize, Serialize};

/// Largest supported particle count.
pub const MAX_CAPACITY: usize = 20_000;

/// Largest frame delta fed into the integrator, in seconds. Longer gaps
/// (a backgrounded tab, a debugger pause) are treated as one slow frame.
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// Nominal frame rate the per-frame constants (damping, attraction) are tuned for.
pub const NOMINAL_FPS: f32 = 60.0;

/// Relative slack on bounds checks, so samples placed exactly on the
/// boundary stay inside after rounding.
const BOUNDS_TOLERANCE: f32 = 1e-4;

/// Volume particles must stay inside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundingVolume {
    Sphere { radius: f32 },
    Cube { half_size: f32 },
}

impl BoundingVolume {
    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        match *self {
            BoundingVolume::Sphere { radius } => {
                let limit = radius + BOUNDS_TOLERANCE * radius.max(1.0);
                p.length_squared() <= limit * limit
            }
            BoundingVolume::Cube { half_size } => {
                p.abs().max_element() <= half_size + BOUNDS_TOLERANCE * half_size.max(1.0)
            }
        }
    }

    /// Whether every sample of `distribution` lands inside this volume.
    pub fn encloses(&self, distribution: &Distribution) -> bool {
        match *self {
            BoundingVolume::Sphere { radius } => distribution.extent() <= radius,
            BoundingVolume::Cube { half_size } => {
                let axis_extent = match *distribution {
                    Distribution::SphereSurface { radius }
                    | Distribution::SphereVolume { radius }
                    | Distribution::Disk { radius } => radius,
                    Distribution::CubeVolume { half_size } => half_size,
                    Distribution::CircularOrbit { radius, jitter } => radius + jitter,
                };
                axis_extent <= half_size
            }
        }
    }
}

impl Default for BoundingVolume {
    fn default() -> Self {
        BoundingVolume::Sphere { radius: 8.0 }
    }
}

/// What happens to a particle's state when its slot is recycled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecyclePolicy {
    /// Move the particle but keep its state.
    #[default]
    KeepState,
    /// Start the slot over as a dormant particle of the next generation.
    Reset,
}

/// Sinusoidal bobbing of dormant particles along Y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Drift {
    /// Peak displacement in world units.
    pub amplitude: f32,
    /// Angular frequency in radians per second.
    pub frequency: f32,
}

impl Default for Drift {
    fn default() -> Self {
        Self {
            amplitude: 0.0,
            frequency: 1.0,
        }
    }
}

/// Ranges the per-particle [`Attributes`] are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeRanges {
    pub value: (f32, f32),
    pub scale: (f32, f32),
    pub hue: (f32, f32),
}

impl Default for AttributeRanges {
    fn default() -> Self {
        Self {
            value: (0.0, 1.0),
            scale: (0.6, 1.4),
            hue: (0.0, 1.0),
        }
    }
}

impl AttributeRanges {
    fn sample(&self, ctx: &mut SpawnContext) -> Attributes {
        Attributes {
            value: ctx.random_range(self.value.0, self.value.1),
            scale: ctx.random_range(self.scale.0, self.scale.1),
            hue: ctx.random_range(self.hue.0, self.hue.1),
        }
    }
}

/// Tuning for [`ParticleField`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Pointer distance that wakes a dormant particle.
    pub activation_radius: f32,
    /// Fraction of the vector to the nearest engaged neighbour added to
    /// velocity each frame.
    pub attraction: f32,
    /// Search radius for the nearest neighbour. `None` searches the whole field.
    pub attraction_radius: Option<f32>,
    /// Per-frame velocity multiplier.
    pub damping: f32,
    /// Maximum distance travelled per frame.
    pub max_speed: f32,
    pub bounds: BoundingVolume,
    pub recycle: RecyclePolicy,
    /// Seconds until a particle fully fades and its slot is reused.
    pub lifetime: Option<f32>,
    pub drift: Drift,
    pub attributes: AttributeRanges,
    pub spatial: SpatialStrategy,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            activation_radius: 0.8,
            attraction: 0.002,
            attraction_radius: None,
            damping: 0.98,
            max_speed: 0.15,
            bounds: BoundingVolume::default(),
            recycle: RecyclePolicy::KeepState,
            lifetime: None,
            drift: Drift::default(),
            attributes: AttributeRanges::default(),
            spatial: SpatialStrategy::BruteForce,
        }
    }
}

impl FieldConfig {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if !(self.activation_radius >= 0.0) {
            return Err("activation_radius must be >= 0".into());
        }
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(format!("damping {} must be within 0..=1", self.damping));
        }
        if !(self.max_speed > 0.0) {
            return Err("max_speed must be positive".into());
        }
        if let Some(r) = self.attraction_radius {
            if !(r > 0.0) {
                return Err("attraction_radius must be positive".into());
            }
        }
        if let Some(t) = self.lifetime {
            if !(t > 0.0) {
                return Err("lifetime must be positive".into());
            }
        }
        self.spatial.validate()
    }
}

/// Counts from one [`ParticleField::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    pub activated: usize,
    pub recycled: usize,
}

/// Read-only copy of the field for rendering and connection scans.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub positions: Vec<Vec3>,
    pub velocities: Vec<Vec3>,
    pub states: Vec<ParticleState>,
    pub attributes: Vec<Attributes>,
    /// Visual opacity 0-1 after the age fade.
    pub opacity: Vec<f32>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Fixed-capacity particle collection.
pub struct ParticleField {
    particles: Vec<Particle>,
    distribution: Distribution,
    config: FieldConfig,
    spawn: SpawnContext,
    index: Box<dyn SpatialIndex>,
    /// Runtime multiplier on `config.attraction`, set per phase.
    attraction_scale: f32,
    last_elapsed: f32,
    /// Scratch reused across frames.
    positions: Vec<Vec3>,
    engaged: Vec<bool>,
    neighbors: Vec<usize>,
}

impl ParticleField {
    /// Populate `capacity` dormant particles sampled from `distribution`.
    ///
    /// `capacity` is clamped to `1..=MAX_CAPACITY`.
    pub fn initialize(
        capacity: usize,
        distribution: Distribution,
        config: FieldConfig,
        mut spawn: SpawnContext,
    ) -> Self {
        let capacity = capacity.clamp(1, MAX_CAPACITY);
        let particles = (0..capacity)
            .map(|_| {
                let position = spawn.sample(&distribution);
                let attributes = config.attributes.sample(&mut spawn);
                let mut p = Particle::new(position, attributes);
                p.phase_offset = spawn.random_phase();
                p
            })
            .collect();

        Self {
            particles,
            distribution,
            config,
            index: config.spatial.build(),
            spawn,
            attraction_scale: 1.0,
            last_elapsed: 0.0,
            positions: Vec::with_capacity(capacity),
            engaged: Vec::with_capacity(capacity),
            neighbors: Vec::new(),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn distribution(&self) -> Distribution {
        self.distribution
    }

    /// Number of particles currently in `state`.
    pub fn count(&self, state: ParticleState) -> usize {
        self.particles.iter().filter(|p| p.state() == state).count()
    }

    pub fn set_attraction_scale(&mut self, scale: f32) {
        self.attraction_scale = scale.max(0.0);
    }

    pub fn attraction_scale(&self) -> f32 {
        self.attraction_scale
    }

    /// Promote particle `index` to at least `state`.
    pub(crate) fn promote(&mut self, index: usize, state: ParticleState) -> bool {
        self.particles
            .get_mut(index)
            .map_or(false, |p| p.promote(state))
    }

    /// Where a pointer ray meets the field: the point on `ray` level with
    /// the nearest particle lying within `activation_radius` of it.
    ///
    /// Passing the result to [`step`](Self::step) activates the particle
    /// under the cursor instead of whatever sits at the camera target's depth.
    pub fn pick(&self, ray: &Ray) -> Option<Vec3> {
        let r2 = self.config.activation_radius * self.config.activation_radius;
        let mut best: Option<f32> = None;
        for p in &self.particles {
            let t = ray.closest_t(p.position);
            if t < 0.0 || best.map_or(false, |b| t >= b) {
                continue;
            }
            if ray.at(t).distance_squared(p.position) <= r2 {
                best = Some(t);
            }
        }
        best.map(|t| ray.at(t))
    }

    /// Opacity of a particle after the age fade.
    #[inline]
    fn opacity_of(&self, p: &Particle) -> f32 {
        match self.config.lifetime {
            Some(lifetime) => (1.0 - p.age / lifetime).clamp(0.0, 1.0),
            None => 1.0,
        }
    }

    /// Advance the field to scene time `elapsed` with the pointer at
    /// `pointer` (world space), or no pointer at all.
    pub fn step(&mut self, elapsed: f32, pointer: Option<Vec3>) -> StepStats {
        let dt = (elapsed - self.last_elapsed).clamp(0.0, MAX_FRAME_DELTA);
        self.last_elapsed = self.last_elapsed.max(elapsed);
        let frames = dt * NOMINAL_FPS;
        let mut stats = StepStats::default();

        if let Some(pointer) = pointer {
            let r2 = self.config.activation_radius * self.config.activation_radius;
            for p in &mut self.particles {
                if p.state() == ParticleState::Dormant
                    && p.position.distance_squared(pointer) <= r2
                    && p.promote(ParticleState::Active)
                {
                    stats.activated += 1;
                }
            }
        }

        self.apply_attraction(frames);
        self.integrate(elapsed, dt, frames);
        stats.recycled = self.recycle_escaped();

        if stats.recycled > 0 {
            tracing::trace!(recycled = stats.recycled, "recycled particle slots");
        }
        stats
    }

    /// Pull each active particle toward its nearest engaged neighbour.
    ///
    /// Neighbours are read from positions at the start of the pass, so the
    /// result does not depend on iteration order.
    fn apply_attraction(&mut self, frames: f32) {
        let strength = self.config.attraction * self.attraction_scale * frames;
        if strength <= 0.0 {
            return;
        }

        self.positions.clear();
        self.positions.extend(self.particles.iter().map(|p| p.position));
        self.engaged.clear();
        self.engaged
            .extend(self.particles.iter().map(|p| p.state().is_engaged()));
        if self.engaged.iter().filter(|e| **e).count() < 2 {
            return;
        }

        let engaged = &self.engaged;
        if self.config.attraction_radius.is_some() {
            self.index.rebuild(&self.positions, &|i| engaged[i]);
        }

        for i in 0..self.particles.len() {
            if self.particles[i].state() != ParticleState::Active {
                continue;
            }
            let here = self.positions[i];
            let nearest = match self.config.attraction_radius {
                Some(radius) => {
                    self.neighbors.clear();
                    self.index.query_neighbors(here, radius, &mut self.neighbors);
                    nearest_of(here, i, self.neighbors.iter().copied(), &self.positions)
                }
                None => nearest_of(
                    here,
                    i,
                    (0..self.positions.len()).filter(|j| engaged[*j]),
                    &self.positions,
                ),
            };
            if let Some(j) = nearest {
                self.particles[i].velocity += (self.positions[j] - here) * strength;
            }
        }
    }

    fn integrate(&mut self, elapsed: f32, dt: f32, frames: f32) {
        let damping = self.config.damping.powf(frames);
        let max_speed = self.config.max_speed;
        let drift = self.config.drift;

        for p in &mut self.particles {
            p.velocity = (p.velocity * damping).clamp_length_max(max_speed);
            p.position += p.velocity * frames;

            if drift.amplitude > 0.0 && p.state() == ParticleState::Dormant {
                // d/dt of amplitude * sin(w t + offset)
                let w = drift.frequency;
                p.position.y += drift.amplitude * w * (w * elapsed + p.phase_offset).cos() * dt;
            }

            p.age += dt;
        }
    }

    /// Recycle slots that faded out or left the bounds. Returns how many.
    fn recycle_escaped(&mut self) -> usize {
        let mut recycled = 0;
        for i in 0..self.particles.len() {
            let faded = self
                .config
                .lifetime
                .map_or(false, |lifetime| self.particles[i].age >= lifetime);
            let escaped = !self.config.bounds.contains(self.particles[i].position);
            if !(faded || escaped) {
                continue;
            }

            let position = self.spawn.sample(&self.distribution);
            match self.config.recycle {
                RecyclePolicy::KeepState => self.particles[i].relocate(position),
                RecyclePolicy::Reset => {
                    let attributes = self.config.attributes.sample(&mut self.spawn);
                    let p = &mut self.particles[i];
                    p.respawn(position);
                    p.attributes = attributes;
                }
            }
            recycled += 1;
        }
        recycled
    }

    /// Current positions, states, attributes and opacities.
    pub fn snapshot(&self) -> Snapshot {
        let n = self.particles.len();
        let mut snap = Snapshot {
            positions: Vec::with_capacity(n),
            velocities: Vec::with_capacity(n),
            states: Vec::with_capacity(n),
            attributes: Vec::with_capacity(n),
            opacity: Vec::with_capacity(n),
        };
        for p in &self.particles {
            snap.positions.push(p.position);
            snap.velocities.push(p.velocity);
            snap.states.push(p.state());
            snap.attributes.push(p.attributes);
            snap.opacity.push(self.opacity_of(p));
        }
        snap
    }
}

/// Closest candidate to `here`, skipping `skip`. Ties go to the lower index.
fn nearest_of(
    here: Vec3,
    skip: usize,
    candidates: impl Iterator<Item = usize>,
    positions: &[Vec3],
) -> Option<usize> {
    let mut best: Option<(f32, usize)> = None;
    for j in candidates {
        if j == skip {
            continue;
        }
        let d2 = positions[j].distance_squared(here);
        match best {
            Some((bd, bj)) if d2 > bd || (d2 == bd && j > bj) => {}
            _ => best = Some((d2, j)),
        }
    }
    best.map(|(_, j)| j)
}
