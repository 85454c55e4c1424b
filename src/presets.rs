//! Built-in scenes.
//!
//! Each preset is a complete [`SceneConfig`] with a four-phase narrative.
//!
//! | Preset | Story | Look |
//! |--------|-------|------|
//! | `roi_singularity` | traditional → exponential → breaking → singularity | gold cloud collapsing into a core |
//! | `neural_command_center` | offline → awakening → synchronizing → command | neon nodes wired by arcs |
//! | `multiplication_chamber` | single → compound → cascade → infinite | emerald ring of short-lived sparks |

use crate::camera::{CameraConfig, CameraControls};
use crate::config::{MetricCurve, PhaseProfile, SceneConfig};
use crate::connections::{ConnectionConfig, ConnectionStyle};
use crate::error::ConfigError;
use crate::field::{AttributeRanges, BoundingVolume, Drift, FieldConfig, RecyclePolicy};
use crate::phase::PhasePolicy;
use crate::render::{Bloom, Lighting, ParticleStyle};
use crate::spatial::{SpatialConfig, SpatialStrategy};
use crate::spawn::Distribution;
use crate::visuals::{BlendMode, ColorMapping, Decoration, DecorationLayer, Palette};
use crate::Vec3;

/// Names accepted by [`SceneConfig::preset`].
pub const PRESET_NAMES: &[&str] = &[
    "roi_singularity",
    "neural_command_center",
    "multiplication_chamber",
];

fn bloom(intensity: f32) -> Bloom {
    Bloom {
        intensity,
        ..Default::default()
    }
}

fn phase(name: &str, attraction: f32, threshold: f32, glow: f32, controls: CameraControls) -> PhaseProfile {
    PhaseProfile {
        name: name.into(),
        attraction,
        threshold,
        bloom: bloom(glow),
        controls,
        show_decorations: true,
    }
}

const ORBIT_ONLY: CameraControls = CameraControls {
    orbit: true,
    pan: false,
    zoom: false,
};

const FREE_CAMERA: CameraControls = CameraControls {
    orbit: true,
    pan: true,
    zoom: true,
};

impl SceneConfig {
    /// Look up a built-in scene by name.
    pub fn preset(name: &str) -> Result<SceneConfig, ConfigError> {
        match name {
            "roi_singularity" => Ok(Self::roi_singularity()),
            "neural_command_center" => Ok(Self::neural_command_center()),
            "multiplication_chamber" => Ok(Self::multiplication_chamber()),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }

    /// A loose gold cloud that the investment metric pulls into a bright core.
    ///
    /// The metric is an investment amount; the return multiplier grows
    /// exponentially and crosses 10x, 100x and 1000x at roughly 3.3k, 6.6k and
    /// 9.9k.
    pub fn roi_singularity() -> Self {
        SceneConfig {
            name: "roi_singularity".into(),
            capacity: 2000,
            distribution: Distribution::SphereVolume { radius: 6.0 },
            seed: None,
            field: FieldConfig {
                activation_radius: 1.2,
                attraction: 0.0015,
                attraction_radius: Some(2.5),
                damping: 0.98,
                max_speed: 0.12,
                bounds: BoundingVolume::Sphere { radius: 9.0 },
                recycle: RecyclePolicy::KeepState,
                lifetime: None,
                drift: Drift {
                    amplitude: 0.15,
                    frequency: 0.8,
                },
                attributes: AttributeRanges {
                    value: (0.0, 1.0),
                    scale: (0.5, 1.5),
                    hue: (0.08, 0.14),
                },
                spatial: SpatialStrategy::Grid(SpatialConfig::new(2.5, 8)),
            },
            connections: ConnectionConfig {
                threshold: 0.6,
                max_edges_per_particle: Some(3),
                style: ConnectionStyle::Straight,
                color: Vec3::new(1.0, 0.8, 0.35),
                spatial: SpatialStrategy::Grid(SpatialConfig::new(1.0, 32)),
            },
            phases: vec![
                phase("traditional", 0.5, 0.4, 0.4, ORBIT_ONLY),
                phase("exponential", 1.5, 0.6, 0.8, ORBIT_ONLY),
                phase("breaking", 3.0, 0.8, 1.3, CameraControls::default()),
                phase("singularity", 6.0, 1.0, 2.0, FREE_CAMERA),
            ],
            policy: PhasePolicy::Monotonic,
            transition_secs: 0.8,
            auto_advance: None,
            metric: MetricCurve::Exponential { rate: 0.0007 },
            metric_thresholds: vec![10.0, 100.0, 1000.0],
            particles: ParticleStyle {
                palette: Palette::Gold,
                mapping: ColorMapping::Value,
                blend: BlendMode::Additive,
                base_size: 0.07,
                ..Default::default()
            },
            decorations: vec![
                DecorationLayer {
                    shape: Decoration::Torus {
                        major: 7.0,
                        minor: 0.25,
                    },
                    tilt: 0.35,
                    spin: 0.15,
                    color: Vec3::new(1.0, 0.75, 0.3),
                    opacity: 0.35,
                    from_phase: 1,
                    ..Default::default()
                },
                DecorationLayer {
                    shape: Decoration::Sphere {
                        radius: 0.8,
                        rings: 5,
                    },
                    spin: 1.2,
                    pulse_amplitude: 0.25,
                    pulse_frequency: 1.5,
                    color: Vec3::new(1.0, 0.95, 0.7),
                    opacity: 0.9,
                    segments: 32,
                    from_phase: 3,
                    ..Default::default()
                },
            ],
            lighting: Lighting {
                ambient: Vec3::splat(0.6),
                key_color: Vec3::new(1.0, 0.85, 0.6),
                key_intensity: 0.7,
                background: Vec3::new(0.02, 0.01, 0.0),
                ..Default::default()
            },
            camera: CameraConfig {
                distance: 16.0,
                pitch: 0.25,
                ..Default::default()
            },
        }
    }

    /// A shell of nodes that wake under the cursor and wire themselves
    /// together with arcs. Advances on its own every six seconds.
    pub fn neural_command_center() -> Self {
        SceneConfig {
            name: "neural_command_center".into(),
            capacity: 300,
            distribution: Distribution::SphereSurface { radius: 5.0 },
            seed: None,
            field: FieldConfig {
                activation_radius: 1.5,
                attraction: 0.001,
                attraction_radius: None,
                damping: 0.95,
                max_speed: 0.05,
                bounds: BoundingVolume::Sphere { radius: 7.0 },
                recycle: RecyclePolicy::KeepState,
                lifetime: None,
                drift: Drift {
                    amplitude: 0.08,
                    frequency: 1.2,
                },
                attributes: AttributeRanges {
                    value: (0.2, 1.0),
                    scale: (0.8, 1.6),
                    hue: (0.5, 0.85),
                },
                spatial: SpatialStrategy::BruteForce,
            },
            connections: ConnectionConfig {
                threshold: 1.6,
                max_edges_per_particle: Some(4),
                style: ConnectionStyle::Arc {
                    segments: 6,
                    lift: 0.15,
                },
                color: Vec3::new(0.3, 0.9, 1.0),
                spatial: SpatialStrategy::BruteForce,
            },
            phases: vec![
                phase("offline", 0.0, 0.0, 0.3, CameraControls::LOCKED),
                phase("awakening", 0.5, 1.2, 0.7, ORBIT_ONLY),
                phase("synchronizing", 1.0, 1.6, 1.0, CameraControls::default()),
                phase("command", 1.5, 2.2, 1.6, FREE_CAMERA),
            ],
            policy: PhasePolicy::Monotonic,
            transition_secs: 0.5,
            auto_advance: Some(6.0),
            metric: MetricCurve::Linear { factor: 1.0 },
            metric_thresholds: vec![10.0, 100.0, 1000.0],
            particles: ParticleStyle {
                palette: Palette::Neon,
                mapping: ColorMapping::Hue {
                    saturation: 0.8,
                    brightness: 1.0,
                },
                blend: BlendMode::Additive,
                base_size: 0.14,
                ..Default::default()
            },
            decorations: vec![
                DecorationLayer {
                    shape: Decoration::Ring { radius: 6.2 },
                    tilt: std::f32::consts::FRAC_PI_2,
                    spin: 0.1,
                    color: Vec3::new(0.4, 0.6, 1.0),
                    opacity: 0.3,
                    segments: 96,
                    ..Default::default()
                },
                DecorationLayer {
                    shape: Decoration::Sphere {
                        radius: 1.2,
                        rings: 4,
                    },
                    spin: 0.6,
                    pulse_amplitude: 0.1,
                    pulse_frequency: 0.8,
                    color: Vec3::new(0.8, 0.4, 1.0),
                    opacity: 0.6,
                    segments: 32,
                    from_phase: 2,
                    ..Default::default()
                },
            ],
            lighting: Lighting {
                ambient: Vec3::splat(0.7),
                key_color: Vec3::new(0.6, 0.8, 1.0),
                key_intensity: 0.4,
                background: Vec3::new(0.0, 0.01, 0.04),
                ..Default::default()
            },
            camera: CameraConfig {
                distance: 14.0,
                pitch: 0.35,
                ..Default::default()
            },
        }
    }

    /// Sparks orbiting a chamber, fading out and respawning as fresh dormant
    /// particles. Phases may be revisited.
    pub fn multiplication_chamber() -> Self {
        SceneConfig {
            name: "multiplication_chamber".into(),
            capacity: 1200,
            distribution: Distribution::CircularOrbit {
                radius: 4.0,
                jitter: 0.6,
            },
            seed: None,
            field: FieldConfig {
                activation_radius: 1.0,
                attraction: 0.003,
                attraction_radius: Some(1.5),
                damping: 0.97,
                max_speed: 0.1,
                bounds: BoundingVolume::Cube { half_size: 7.0 },
                recycle: RecyclePolicy::Reset,
                lifetime: Some(6.0),
                drift: Drift {
                    amplitude: 0.3,
                    frequency: 2.0,
                },
                attributes: AttributeRanges::default(),
                spatial: SpatialStrategy::Grid(SpatialConfig::new(1.5, 16)),
            },
            connections: ConnectionConfig {
                threshold: 0.9,
                max_edges_per_particle: Some(2),
                style: ConnectionStyle::Straight,
                color: Vec3::new(0.4, 1.0, 0.7),
                spatial: SpatialStrategy::Grid(SpatialConfig::new(1.0, 16)),
            },
            phases: vec![
                phase("single", 0.5, 0.5, 0.5, CameraControls::default()),
                phase("compound", 1.0, 0.7, 0.9, CameraControls::default()),
                phase("cascade", 2.0, 0.9, 1.3, CameraControls::default()),
                phase("infinite", 3.0, 1.2, 1.8, FREE_CAMERA),
            ],
            policy: PhasePolicy::Free,
            transition_secs: 0.3,
            auto_advance: None,
            metric: MetricCurve::Power {
                scale: 1.0,
                exponent: 2.0,
            },
            metric_thresholds: vec![10.0, 100.0, 1000.0],
            particles: ParticleStyle {
                palette: Palette::Emerald,
                mapping: ColorMapping::Value,
                blend: BlendMode::Additive,
                base_size: 0.06,
                ..Default::default()
            },
            decorations: vec![
                DecorationLayer {
                    shape: Decoration::Helix {
                        radius: 2.0,
                        height: 6.0,
                        turns: 4.0,
                    },
                    spin: 0.5,
                    color: Vec3::new(0.3, 0.9, 0.6),
                    opacity: 0.4,
                    segments: 48,
                    ..Default::default()
                },
                DecorationLayer {
                    shape: Decoration::Ring { radius: 5.5 },
                    tilt: std::f32::consts::FRAC_PI_2,
                    spin: -0.3,
                    pulse_amplitude: 0.05,
                    pulse_frequency: 0.5,
                    color: Vec3::new(0.6, 1.0, 0.8),
                    opacity: 0.3,
                    from_phase: 2,
                    ..Default::default()
                },
            ],
            lighting: Lighting::default(),
            camera: CameraConfig {
                distance: 13.0,
                pitch: 0.6,
                ..Default::default()
            },
        }
    }
}
