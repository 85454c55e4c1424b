//! Renderer-agnostic draw description for one frame.
//!
//! [`RenderList`] is everything a backend needs to draw a scene: particle
//! sprites, line vertices for edges and decorations, lighting, bloom and the
//! camera. Vertex types are `#[repr(C)]` and [`bytemuck::Pod`] so they can be
//! uploaded to a GPU buffer with [`bytemuck::cast_slice`].

use crate::field::Snapshot;
use crate::particle::ParticleState;
use crate::visuals::{BlendMode, ColorMapping, DecorationLayer, Palette};
use crate::{Mat4, Vec3};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// One particle sprite.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ParticleVertex {
    pub position: [f32; 3],
    /// World-space sprite size.
    pub size: f32,
    /// Linear RGB plus alpha.
    pub color: [f32; 4],
}

/// One end of a line segment. Consecutive pairs form a line list.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub _pad: f32,
    pub color: [f32; 4],
}

impl LineVertex {
    fn new(position: Vec3, color: Vec3, alpha: f32) -> Self {
        Self {
            position: position.to_array(),
            _pad: 0.0,
            color: color.extend(alpha).to_array(),
        }
    }
}

/// Directional key light plus ambient fill.
///
/// Point sprites have no normals, so the direction from the origin stands in
/// for one: particles on the lit side of the cloud are brighter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lighting {
    pub ambient: Vec3,
    pub key_color: Vec3,
    /// Direction the key light travels.
    pub key_direction: Vec3,
    pub key_intensity: f32,
    pub background: Vec3,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: Vec3::splat(0.55),
            key_color: Vec3::ONE,
            key_direction: Vec3::new(-0.4, -1.0, -0.6),
            key_intensity: 0.6,
            background: Vec3::new(0.01, 0.01, 0.03),
        }
    }
}

impl Lighting {
    pub fn shade(&self, color: Vec3, position: Vec3) -> Vec3 {
        let normal = position.normalize_or_zero();
        let toward_light = -self.key_direction.normalize_or_zero();
        let diffuse = normal.dot(toward_light).max(0.0) * self.key_intensity;
        color * (self.ambient + self.key_color * diffuse)
    }
}

/// Glow post-process settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bloom {
    pub enabled: bool,
    pub intensity: f32,
    /// Brightness above which pixels glow.
    pub threshold: f32,
    pub radius: f32,
}

impl Default for Bloom {
    fn default() -> Self {
        Self {
            enabled: true,
            intensity: 1.0,
            threshold: 0.6,
            radius: 0.4,
        }
    }
}

impl Bloom {
    pub const OFF: Bloom = Bloom {
        enabled: false,
        intensity: 0.0,
        threshold: 1.0,
        radius: 0.0,
    };

    /// Glow strength a backend should apply; zero when disabled.
    pub fn strength(&self) -> f32 {
        if self.enabled {
            self.intensity.max(0.0)
        } else {
            0.0
        }
    }
}

/// How particles are coloured and sized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleStyle {
    pub palette: Palette,
    pub mapping: ColorMapping,
    pub blend: BlendMode,
    pub base_size: f32,
    /// Size multiplier for dormant, active and connected particles.
    pub state_scale: [f32; 3],
    /// Alpha multiplier for dormant, active and connected particles.
    pub state_alpha: [f32; 3],
}

impl Default for ParticleStyle {
    fn default() -> Self {
        Self {
            palette: Palette::Ocean,
            mapping: ColorMapping::State,
            blend: BlendMode::Additive,
            base_size: 0.08,
            state_scale: [1.0, 1.4, 1.8],
            state_alpha: [0.45, 0.85, 1.0],
        }
    }
}

impl ParticleStyle {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if !(self.base_size > 0.0) {
            return Err("particle base_size must be positive".into());
        }
        if self.state_scale.iter().any(|s| *s < 0.0) {
            return Err("particle state_scale entries must be non-negative".into());
        }
        Ok(())
    }
}

/// Placed decoration for the current frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DecorationInstance {
    /// Local-to-world transform including spin and pulse.
    pub transform: Mat4,
    pub color: Vec3,
    pub opacity: f32,
    /// Range of [`RenderList::lines`] holding this decoration's outline.
    pub lines: std::ops::Range<usize>,
}

/// Draw description for one frame.
#[derive(Debug, Clone)]
pub struct RenderList {
    pub particles: Vec<ParticleVertex>,
    /// Line list: edges first, then decoration outlines.
    pub lines: Vec<LineVertex>,
    /// Number of vertices in [`lines`](Self::lines) that belong to edges.
    pub edge_vertex_count: usize,
    pub decorations: Vec<DecorationInstance>,
    pub lighting: Lighting,
    pub bloom: Bloom,
    pub blend: BlendMode,
    /// Opacity multiplier from the running phase transition.
    pub fade: f32,
    /// Uniform scale from the running phase transition.
    pub scale: f32,
    pub view_proj: Mat4,
    pub camera_position: Vec3,
    /// Camera right vector in world space, for billboarding.
    pub camera_right: Vec3,
    pub camera_up: Vec3,
}

impl Default for RenderList {
    fn default() -> Self {
        Self {
            particles: Vec::new(),
            lines: Vec::new(),
            edge_vertex_count: 0,
            decorations: Vec::new(),
            lighting: Lighting::default(),
            bloom: Bloom::default(),
            blend: BlendMode::default(),
            fade: 1.0,
            scale: 1.0,
            view_proj: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
            camera_right: Vec3::X,
            camera_up: Vec3::Y,
        }
    }
}

impl RenderList {
    /// Drop all geometry but keep allocations for the next frame.
    pub fn clear(&mut self) {
        self.particles.clear();
        self.lines.clear();
        self.decorations.clear();
        self.edge_vertex_count = 0;
    }

    /// Model matrix for the transition scale.
    pub fn model(&self) -> Mat4 {
        Mat4::from_scale(Vec3::splat(self.scale))
    }

    /// Append one sprite per particle. Fully faded particles are skipped.
    pub fn push_particles(&mut self, snapshot: &Snapshot, style: &ParticleStyle) {
        self.blend = style.blend;
        self.particles.reserve(snapshot.len());
        for i in 0..snapshot.len() {
            let alpha = snapshot.opacity[i] * style.state_alpha[state_slot(snapshot.states[i])] * self.fade;
            if alpha <= 0.0 {
                continue;
            }
            let position = snapshot.positions[i];
            let base = style
                .mapping
                .color(style.palette, snapshot.states[i], &snapshot.attributes[i]);
            let color = self.lighting.shade(base, position);
            let size = style.base_size
                * snapshot.attributes[i].scale
                * style.state_scale[state_slot(snapshot.states[i])];
            self.particles.push(ParticleVertex {
                position: position.to_array(),
                size,
                color: color.extend(alpha).to_array(),
            });
        }
    }

    /// Append edge segments `(start, end, strength)`; strength drives alpha.
    pub fn push_edges(&mut self, segments: &[(Vec3, Vec3, f32)], color: Vec3) {
        self.lines.reserve(segments.len() * 2);
        for &(a, b, strength) in segments {
            let alpha = strength.clamp(0.0, 1.0) * self.fade;
            self.lines.push(LineVertex::new(a, color, alpha));
            self.lines.push(LineVertex::new(b, color, alpha));
        }
        self.edge_vertex_count = self.lines.len();
    }

    /// Append a decoration's outline, transformed for `elapsed` seconds.
    pub fn push_decoration(&mut self, layer: &DecorationLayer, elapsed: f32) {
        let transform = layer.transform(elapsed);
        let alpha = layer.opacity * self.fade;
        let start = self.lines.len();
        for (a, b) in layer.shape.outline(layer.segments) {
            self.lines
                .push(LineVertex::new(transform.transform_point3(a), layer.color, alpha));
            self.lines
                .push(LineVertex::new(transform.transform_point3(b), layer.color, alpha));
        }
        self.decorations.push(DecorationInstance {
            transform,
            color: layer.color,
            opacity: alpha,
            lines: start..self.lines.len(),
        });
    }
}

fn state_slot(state: ParticleState) -> usize {
    state.index().min(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Attributes;
    use crate::visuals::Decoration;

    fn snapshot() -> Snapshot {
        Snapshot {
            positions: vec![Vec3::X, Vec3::Y, Vec3::Z],
            velocities: vec![Vec3::ZERO; 3],
            states: vec![
                ParticleState::Dormant,
                ParticleState::Active,
                ParticleState::Connected,
            ],
            attributes: vec![Attributes::default(); 3],
            opacity: vec![1.0, 0.0, 1.0],
        }
    }

    #[test]
    fn test_vertex_layouts_are_gpu_friendly() {
        assert_eq!(std::mem::size_of::<ParticleVertex>(), 32);
        assert_eq!(std::mem::size_of::<LineVertex>(), 32);
        let verts = [ParticleVertex::zeroed(); 2];
        assert_eq!(bytemuck::cast_slice::<_, u8>(&verts).len(), 64);
    }

    #[test]
    fn test_faded_particles_are_skipped() {
        let mut list = RenderList::default();
        list.push_particles(&snapshot(), &ParticleStyle::default());
        assert_eq!(list.particles.len(), 2);
        // Connected particles are drawn larger than dormant ones.
        assert!(list.particles[1].size > list.particles[0].size);
    }

    #[test]
    fn test_transition_fade_scales_alpha() {
        let style = ParticleStyle::default();
        let mut full = RenderList::default();
        full.push_particles(&snapshot(), &style);
        let mut dim = RenderList {
            fade: 0.5,
            ..Default::default()
        };
        dim.push_particles(&snapshot(), &style);
        assert!((dim.particles[0].color[3] - full.particles[0].color[3] * 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_edges_then_decorations() {
        let mut list = RenderList::default();
        list.push_edges(&[(Vec3::ZERO, Vec3::X, 0.5)], Vec3::ONE);
        assert_eq!(list.edge_vertex_count, 2);
        assert_eq!(list.lines[0].color[3], 0.5);

        let layer = DecorationLayer {
            shape: Decoration::Ring { radius: 1.0 },
            segments: 8,
            ..Default::default()
        };
        list.push_decoration(&layer, 0.0);
        assert_eq!(list.decorations.len(), 1);
        assert_eq!(list.decorations[0].lines, 2..18);
        assert_eq!(list.edge_vertex_count, 2);

        list.clear();
        assert!(list.lines.is_empty() && list.decorations.is_empty());
    }

    #[test]
    fn test_lighting_brightens_lit_side() {
        let lighting = Lighting::default();
        let toward = -lighting.key_direction.normalize();
        let lit = lighting.shade(Vec3::ONE, toward);
        let dark = lighting.shade(Vec3::ONE, -toward);
        assert!(lit.x > dark.x);
        assert_eq!(dark, lighting.ambient);
    }

    #[test]
    fn test_bloom_strength() {
        assert_eq!(Bloom::OFF.strength(), 0.0);
        assert_eq!(Bloom::default().strength(), 1.0);
    }
}
