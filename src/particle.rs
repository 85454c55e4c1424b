//! Particle records.
//!
//! A particle slot lives for the whole scene. Its [`ParticleState`] only moves
//! forward (`Dormant → Active → Connected`). When a slot is recycled under
//! [`RecyclePolicy::Reset`](crate::field::RecyclePolicy), its `generation`
//! is bumped and it starts over as a new particle.

use crate::Vec3;
use serde::{Deserialize, Serialize};

/// Lifecycle stage of a particle. Ordered: `Dormant < Active < Connected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleState {
    /// Spawned, waiting for the pointer.
    #[default]
    Dormant,
    /// Woken by the pointer, drifting toward its neighbours.
    Active,
    /// Linked to at least one other particle. Terminal.
    Connected,
}

impl ParticleState {
    /// `Active` or `Connected`.
    #[inline]
    pub fn is_engaged(self) -> bool {
        self >= ParticleState::Active
    }

    /// Index into per-state tables such as palette stops.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Scene-specific scalars used only for color and size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    /// Normalized 0-1 magnitude ("intent", "value", "efficiency").
    pub value: f32,
    /// Size multiplier.
    pub scale: f32,
    /// Hue 0-1.
    pub hue: f32,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            value: 0.5,
            scale: 1.0,
            hue: 0.0,
        }
    }
}

/// One particle slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub(crate) state: ParticleState,
    pub attributes: Attributes,
    /// Seconds since spawn or last recycle.
    pub age: f32,
    /// Oscillation offset so dormant particles do not bob in lockstep.
    pub phase_offset: f32,
    /// Incremented each time the slot is recycled with a state reset.
    pub(crate) generation: u32,
}

impl Particle {
    pub fn new(position: Vec3, attributes: Attributes) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            state: ParticleState::Dormant,
            attributes,
            age: 0.0,
            phase_offset: 0.0,
            generation: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> ParticleState {
        self.state
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Move to `to` if it is ahead of the current state.
    ///
    /// Returns `true` when the state changed.
    #[inline]
    pub fn promote(&mut self, to: ParticleState) -> bool {
        if to > self.state {
            self.state = to;
            true
        } else {
            false
        }
    }

    /// Start the slot over as a new dormant particle.
    pub(crate) fn respawn(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = Vec3::ZERO;
        self.state = ParticleState::Dormant;
        self.age = 0.0;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Move the particle without touching its state or generation.
    pub(crate) fn relocate(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = Vec3::ZERO;
        self.age = 0.0;
    }
}
