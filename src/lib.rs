//! # coreflow-fx - animated particle scenes
//!
//! Frame-driven particle fields, proximity connection graphs and phase
//! sequencing for animated storytelling scenes.
//!
//! The core is renderer-agnostic: a [`Scene`] advances its simulation once
//! per frame and produces a [`RenderList`] plus an [`OverlayState`] that any
//! backend or UI layer can consume. The `viewer` feature adds a wgpu/winit
//! window that draws the render list.
//!
//! ## Quick Start
//!
//! ```
//! use coreflow_fx::prelude::*;
//!
//! let mut scene = Scene::preset("roi_singularity", Some(42)).unwrap();
//! let mut time = Time::new();
//! time.set_fixed_delta(Some(1.0 / 60.0));
//!
//! for _ in 0..30 {
//!     time.update();
//!     scene.frame(&time, None);
//! }
//! scene.set_metric(50_000.0);
//! assert!(scene.phase() > Phase(0));
//! ```
//!
//! ## Core Concepts
//!
//! ### Particle field
//!
//! [`ParticleField`] holds a fixed number of particles spawned from a
//! [`Distribution`]. Each particle moves through a one-way lifecycle
//! `Dormant -> Active -> Connected`; the pointer activates dormant particles
//! and active ones drift toward their nearest engaged neighbour.
//!
//! ### Connections
//!
//! [`ConnectionGraph`] links engaged particles that are closer than the
//! current phase's threshold. Neighbour search goes through a
//! [`SpatialStrategy`]: an exhaustive scan or a uniform grid.
//!
//! ### Phases
//!
//! [`PhaseController`] sequences a scene through its narrative stages, by
//! direct request, by timer or by a UI metric mapped through a
//! [`MetricCurve`](config::MetricCurve). Every phase has a
//! [`PhaseProfile`](config::PhaseProfile) that retunes attraction, the
//! connection threshold, bloom and camera controls.
//!
//! ## Feature Overview
//!
//! | Area | Types |
//! |------|-------|
//! | Simulation | [`ParticleField`], [`FieldConfig`], [`SpawnContext`] |
//! | Graph | [`ConnectionGraph`], [`ConnectionConfig`], [`SpatialStrategy`] |
//! | Sequencing | [`PhaseController`], [`Phase`], [`PhasePolicy`] |
//! | Composition | [`Scene`], [`SceneConfig`], [`presets`] |
//! | Visuals | [`Palette`], [`ColorMapping`], [`Decoration`], [`RenderList`] |
//! | Interaction | [`Pointer`], [`OrbitCamera`], [`Ray`], [`Time`] |

pub mod camera;
pub mod config;
pub mod connections;
pub mod error;
pub mod field;
pub mod input;
pub mod particle;
pub mod phase;
pub mod presets;
pub mod render;
pub mod scene;
pub mod shader;
pub mod spatial;
pub mod spawn;
pub mod time;
pub mod visuals;

#[cfg(feature = "viewer")]
pub mod gpu;
#[cfg(feature = "viewer")]
pub mod window;

pub use bytemuck;
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

pub use camera::{CameraConfig, CameraControls, OrbitCamera, Ray};
pub use config::SceneConfig;
pub use connections::{ConnectionConfig, ConnectionGraph, ConnectionStyle, Edge};
pub use error::ConfigError;
pub use field::{BoundingVolume, FieldConfig, ParticleField, Snapshot, StepStats};
pub use input::{MouseButton, Pointer};
pub use particle::{Attributes, Particle, ParticleState};
pub use phase::{Phase, PhaseChange, PhaseController, PhasePolicy};
pub use render::RenderList;
pub use scene::{FrameReport, OverlayState, Scene};
pub use spatial::SpatialStrategy;
pub use spawn::{Distribution, SpawnContext};
pub use time::Time;
pub use visuals::{BlendMode, ColorMapping, Decoration, DecorationLayer, Palette};

/// Convenient re-exports for common usage.
///
/// ```
/// use coreflow_fx::prelude::*;
/// ```
pub mod prelude {
    pub use crate::camera::OrbitCamera;
    pub use crate::config::{MetricCurve, PhaseProfile, SceneConfig};
    pub use crate::connections::{ConnectionConfig, ConnectionStyle};
    pub use crate::field::FieldConfig;
    pub use crate::input::{MouseButton, Pointer};
    pub use crate::particle::ParticleState;
    pub use crate::phase::{Phase, PhasePolicy};
    pub use crate::render::RenderList;
    pub use crate::scene::{OverlayState, Scene};
    pub use crate::spatial::SpatialStrategy;
    pub use crate::spawn::{Distribution, SpawnContext};
    pub use crate::time::Time;
    pub use crate::visuals::{BlendMode, ColorMapping, Decoration, Palette};
    pub use crate::{Vec2, Vec3, Vec4};
}
