//! Colour and decorative geometry for particle scenes.
//!
//! This module decides how particles look, separate from the rules in
//! [`field`](crate::field) that decide how they move. A [`Palette`] is a
//! five-stop gradient and a [`ColorMapping`] picks where on it (or outside it)
//! each particle lands. [`Decoration`]s are the wireframe set pieces around
//! the particles: rings, spheres, helices and tori that spin and pulse.

use crate::particle::{Attributes, ParticleState};
use crate::spawn::{circle_point, helix_point, hsv_to_rgb, latitude_point, torus_point};
use crate::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Pre-defined color palettes for particle rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    /// Cool blues and teals.
    #[default]
    Ocean,

    /// Viridis - perceptually uniform, colorblind-friendly (purple to yellow).
    Viridis,

    /// Plasma - perceptually uniform (purple to yellow through pink).
    Plasma,

    /// Deep bronze to bright white gold.
    Gold,

    /// Vibrant cyberpunk colors (pink, cyan, purple).
    Neon,

    /// Dark teal through emerald to mint.
    Emerald,

    /// Warm oranges and pinks.
    Sunset,

    /// Black to white.
    Grayscale,
}

impl Palette {
    /// The five gradient stops, dark to bright.
    pub fn colors(&self) -> [Vec3; 5] {
        match self {
            Palette::Ocean => [
                Vec3::new(0.0, 0.05, 0.15),
                Vec3::new(0.0, 0.2, 0.4),
                Vec3::new(0.0, 0.4, 0.6),
                Vec3::new(0.2, 0.6, 0.8),
                Vec3::new(0.6, 0.9, 1.0),
            ],
            Palette::Viridis => [
                Vec3::new(0.267, 0.004, 0.329),
                Vec3::new(0.282, 0.140, 0.458),
                Vec3::new(0.127, 0.566, 0.551),
                Vec3::new(0.369, 0.789, 0.383),
                Vec3::new(0.993, 0.906, 0.144),
            ],
            Palette::Plasma => [
                Vec3::new(0.050, 0.030, 0.528),
                Vec3::new(0.494, 0.012, 0.658),
                Vec3::new(0.798, 0.280, 0.470),
                Vec3::new(0.973, 0.580, 0.254),
                Vec3::new(0.940, 0.975, 0.131),
            ],
            Palette::Gold => [
                Vec3::new(0.25, 0.12, 0.02),
                Vec3::new(0.55, 0.33, 0.05),
                Vec3::new(0.85, 0.60, 0.12),
                Vec3::new(1.0, 0.82, 0.35),
                Vec3::new(1.0, 0.96, 0.80),
            ],
            Palette::Neon => [
                Vec3::new(1.0, 0.0, 0.5),
                Vec3::new(0.5, 0.0, 1.0),
                Vec3::new(0.0, 0.5, 1.0),
                Vec3::new(0.0, 1.0, 1.0),
                Vec3::new(0.5, 1.0, 0.5),
            ],
            Palette::Emerald => [
                Vec3::new(0.0, 0.12, 0.12),
                Vec3::new(0.02, 0.35, 0.30),
                Vec3::new(0.06, 0.62, 0.45),
                Vec3::new(0.30, 0.85, 0.60),
                Vec3::new(0.75, 1.0, 0.85),
            ],
            Palette::Sunset => [
                Vec3::new(0.1, 0.0, 0.2),
                Vec3::new(0.5, 0.0, 0.5),
                Vec3::new(1.0, 0.2, 0.4),
                Vec3::new(1.0, 0.5, 0.2),
                Vec3::new(1.0, 0.9, 0.4),
            ],
            Palette::Grayscale => [
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.25, 0.25, 0.25),
                Vec3::new(0.5, 0.5, 0.5),
                Vec3::new(0.75, 0.75, 0.75),
                Vec3::new(1.0, 1.0, 1.0),
            ],
        }
    }

    /// Linear interpolation along the gradient. `t` is clamped to `0..=1`.
    pub fn sample(&self, t: f32) -> Vec3 {
        let stops = self.colors();
        let scaled = t.clamp(0.0, 1.0) * 4.0;
        let i = (scaled.floor() as usize).min(3);
        stops[i].lerp(stops[i + 1], scaled - i as f32)
    }
}

/// How particle properties pick a colour.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColorMapping {
    /// Dormant at the dark end of the palette, connected at the bright end.
    #[default]
    State,

    /// Map `attributes.value` across the palette.
    Value,

    /// Ignore the palette and use `attributes.hue` as an HSV hue.
    Hue { saturation: f32, brightness: f32 },
}

impl ColorMapping {
    pub fn color(&self, palette: Palette, state: ParticleState, attributes: &Attributes) -> Vec3 {
        match *self {
            ColorMapping::State => palette.sample(match state {
                ParticleState::Dormant => 0.25,
                ParticleState::Active => 0.65,
                ParticleState::Connected => 1.0,
            }),
            ColorMapping::Value => palette.sample(attributes.value),
            ColorMapping::Hue {
                saturation,
                brightness,
            } => hsv_to_rgb(attributes.hue, saturation, brightness),
        }
    }
}

/// Blend mode for particle rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Standard alpha blending.
    Alpha,

    /// Colors add up, so overlapping particles glow.
    #[default]
    Additive,
}

/// Parametric wireframe set piece, in local space around the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decoration {
    /// Circle in the XY plane.
    Ring { radius: f32 },
    /// Latitude rings plus meridians.
    Sphere { radius: f32, rings: u32 },
    /// Helix around the Y axis, centred vertically.
    Helix { radius: f32, height: f32, turns: f32 },
    /// Torus around the Y axis.
    Torus { major: f32, minor: f32 },
}

impl Decoration {
    /// Line segments tracing the shape. `segments` is the resolution of each curve.
    pub fn outline(&self, segments: u32) -> Vec<(Vec3, Vec3)> {
        let segments = segments.max(3);
        let mut lines = Vec::new();
        match *self {
            Decoration::Ring { radius } => {
                polyline(&mut lines, segments, |t| circle_point(radius, t));
            }
            Decoration::Sphere { radius, rings } => {
                let rings = rings.max(1);
                for r in 1..=rings {
                    let lat = r as f32 / (rings + 1) as f32;
                    polyline(&mut lines, segments, |t| latitude_point(radius, lat, t));
                }
                for m in 0..4 {
                    let t = m as f32 / 8.0;
                    // Half-turn meridians: lat 0..2 sweeps over both poles.
                    polyline(&mut lines, segments, |s| latitude_point(radius, s * 2.0, t));
                }
            }
            Decoration::Helix {
                radius,
                height,
                turns,
            } => {
                let steps = (segments as f32 * turns.abs().max(1.0)) as u32;
                polyline(&mut lines, steps, |t| helix_point(radius, height, turns, t));
            }
            Decoration::Torus { major, minor } => {
                for v in [0.0, 0.5] {
                    polyline(&mut lines, segments, |u| torus_point(major, minor, u, v));
                }
                for k in 0..8 {
                    let u = k as f32 / 8.0;
                    polyline(&mut lines, segments / 2, |v| torus_point(major, minor, u, v));
                }
            }
        }
        lines
    }

    /// Radius of the smallest origin-centred sphere containing the outline.
    pub fn extent(&self) -> f32 {
        match *self {
            Decoration::Ring { radius } | Decoration::Sphere { radius, .. } => radius,
            Decoration::Helix { radius, height, .. } => radius.hypot(height * 0.5),
            Decoration::Torus { major, minor } => major + minor,
        }
    }
}

fn polyline(out: &mut Vec<(Vec3, Vec3)>, steps: u32, point: impl Fn(f32) -> Vec3) {
    let steps = steps.max(1);
    let mut prev = point(0.0);
    for i in 1..=steps {
        let next = point(i as f32 / steps as f32);
        out.push((prev, next));
        prev = next;
    }
}

/// A [`Decoration`] placed in a scene, with its animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorationLayer {
    pub shape: Decoration,
    pub center: Vec3,
    /// Rotation about the X axis applied before spinning, radians.
    pub tilt: f32,
    /// Spin about the Y axis, radians per second.
    pub spin: f32,
    /// Relative scale oscillation, `0.1` = ±10%.
    pub pulse_amplitude: f32,
    /// Pulses per second.
    pub pulse_frequency: f32,
    pub color: Vec3,
    pub opacity: f32,
    pub segments: u32,
    /// First phase in which the layer is drawn.
    pub from_phase: u8,
}

impl Default for DecorationLayer {
    fn default() -> Self {
        Self {
            shape: Decoration::Ring { radius: 6.0 },
            center: Vec3::ZERO,
            tilt: 0.0,
            spin: 0.2,
            pulse_amplitude: 0.0,
            pulse_frequency: 0.5,
            color: Vec3::new(0.5, 0.8, 1.0),
            opacity: 0.5,
            segments: 64,
            from_phase: 0,
        }
    }
}

impl DecorationLayer {
    /// Scale factor at `elapsed` seconds.
    pub fn pulse(&self, elapsed: f32) -> f32 {
        1.0 + self.pulse_amplitude * (elapsed * self.pulse_frequency * TAU).sin()
    }

    /// Local-to-world transform at `elapsed` seconds.
    pub fn transform(&self, elapsed: f32) -> Mat4 {
        let rotation = Quat::from_rotation_y(self.spin * elapsed) * Quat::from_rotation_x(self.tilt);
        Mat4::from_scale_rotation_translation(Vec3::splat(self.pulse(elapsed)), rotation, self.center)
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        let ok = match self.shape {
            Decoration::Ring { radius } => radius > 0.0,
            Decoration::Sphere { radius, .. } => radius > 0.0,
            Decoration::Helix { radius, height, .. } => radius > 0.0 && height >= 0.0,
            Decoration::Torus { major, minor } => major > 0.0 && minor > 0.0,
        };
        if !ok {
            return Err(format!("decoration {:?} has a non-positive size", self.shape));
        }
        if !(0.0..1.0).contains(&self.pulse_amplitude) {
            return Err("decoration pulse_amplitude must be in [0, 1)".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_endpoints() {
        let p = Palette::Viridis;
        assert_eq!(p.sample(0.0), p.colors()[0]);
        assert!((p.sample(1.0) - p.colors()[4]).length() < 1e-6);
        assert!((p.sample(2.0) - p.colors()[4]).length() < 1e-6);
        assert!((p.sample(0.5) - p.colors()[2]).length() < 1e-6);
    }

    #[test]
    fn test_state_mapping_brightens_with_engagement() {
        let attrs = Attributes::default();
        let m = ColorMapping::State;
        let dormant = m.color(Palette::Grayscale, ParticleState::Dormant, &attrs);
        let connected = m.color(Palette::Grayscale, ParticleState::Connected, &attrs);
        assert!(connected.x > dormant.x);
    }

    #[test]
    fn test_hue_mapping_ignores_palette() {
        let attrs = Attributes {
            hue: 0.0,
            ..Default::default()
        };
        let m = ColorMapping::Hue {
            saturation: 1.0,
            brightness: 1.0,
        };
        let c = m.color(Palette::Grayscale, ParticleState::Active, &attrs);
        assert!((c - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_ring_outline_is_closed() {
        let lines = Decoration::Ring { radius: 2.0 }.outline(16);
        assert_eq!(lines.len(), 16);
        assert!((lines[0].0 - lines[15].1).length() < 1e-4);
        for (a, _) in &lines {
            assert!((a.length() - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_outlines_stay_within_extent() {
        let shapes = [
            Decoration::Ring { radius: 3.0 },
            Decoration::Sphere { radius: 2.0, rings: 3 },
            Decoration::Helix { radius: 1.0, height: 4.0, turns: 3.0 },
            Decoration::Torus { major: 3.0, minor: 0.5 },
        ];
        for shape in shapes {
            let lines = shape.outline(24);
            assert!(!lines.is_empty());
            for (a, b) in lines {
                assert!(a.length() <= shape.extent() + 1e-3, "{:?}", shape);
                assert!(b.length() <= shape.extent() + 1e-3, "{:?}", shape);
            }
        }
    }

    #[test]
    fn test_layer_transform_spins_and_pulses() {
        let layer = DecorationLayer {
            spin: 1.0,
            pulse_amplitude: 0.2,
            pulse_frequency: 1.0,
            ..Default::default()
        };
        assert_eq!(layer.pulse(0.0), 1.0);
        assert!((layer.pulse(0.25) - 1.2).abs() < 1e-5);

        let m = layer.transform(std::f32::consts::FRAC_PI_2);
        let x = m.transform_point3(Vec3::X);
        // Rotated a quarter turn about +Y: +X goes to -Z.
        assert!(x.z < -0.5, "{:?}", x);
    }

    #[test]
    fn test_layer_validation() {
        assert!(DecorationLayer::default().validate().is_ok());
        let bad = DecorationLayer {
            shape: Decoration::Torus { major: 1.0, minor: 0.0 },
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
