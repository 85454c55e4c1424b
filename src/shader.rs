//! WGSL sources and uniform layout for drawing a [`RenderList`].
//!
//! Both shaders share one uniform block. The particle shader expands each
//! [`ParticleVertex`](crate::render::ParticleVertex) instance into a
//! camera-facing quad (6 vertices); the line shader draws
//! [`LineVertex`](crate::render::LineVertex) pairs as a line list.

use crate::render::RenderList;
use bytemuck::{Pod, Zeroable};

pub const PARTICLE_SHADER: &str = include_str!("shaders/particles.wgsl");
pub const LINE_SHADER: &str = include_str!("shaders/lines.wgsl");

/// Vertices per particle sprite.
pub const VERTICES_PER_SPRITE: u32 = 6;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub camera_right: [f32; 4],
    pub camera_up: [f32; 4],
    pub glow: f32,
    pub time: f32,
    pub _padding: [f32; 2],
}

impl Uniforms {
    pub fn new(render: &RenderList, time: f32) -> Self {
        Self {
            view_proj: render.view_proj.to_cols_array_2d(),
            model: render.model().to_cols_array_2d(),
            camera_right: render.camera_right.extend(0.0).to_array(),
            camera_up: render.camera_up.extend(0.0).to_array(),
            glow: render.bloom.strength(),
            time,
            _padding: [0.0; 2],
        }
    }
}
