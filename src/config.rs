//! Serializable scene configuration.
//!
//! A [`SceneConfig`] fully describes one scene: how many particles, where they
//! spawn, how they move and connect, the narrative phases and how each phase
//! looks. Configs round-trip through JSON, so scenes can be tuned without
//! recompiling.
//!
//! ```
//! use coreflow_fx::config::SceneConfig;
//!
//! let config = SceneConfig::preset("neural_command_center").unwrap();
//! let json = serde_json::to_string(&config).unwrap();
//! let back = SceneConfig::from_json(&json).unwrap();
//! assert_eq!(back.name, "neural_command_center");
//! ```

use crate::camera::{CameraConfig, CameraControls};
use crate::connections::ConnectionConfig;
use crate::error::ConfigError;
use crate::field::{FieldConfig, MAX_CAPACITY};
use crate::phase::{PhasePolicy, DEFAULT_METRIC_THRESHOLDS, MAX_TRANSITION_SECS, MIN_TRANSITION_SECS};
use crate::render::{Bloom, Lighting, ParticleStyle};
use crate::spawn::Distribution;
use crate::visuals::DecorationLayer;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How each phase looks and behaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseProfile {
    /// Name shown by the overlay.
    pub name: String,
    /// Multiplier on the field's base attraction.
    pub attraction: f32,
    /// Connection threshold distance in this phase.
    pub threshold: f32,
    pub bloom: Bloom,
    pub controls: CameraControls,
    pub show_decorations: bool,
}

impl Default for PhaseProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            attraction: 1.0,
            threshold: ConnectionConfig::default().threshold,
            bloom: Bloom::default(),
            controls: CameraControls::default(),
            show_decorations: true,
        }
    }
}

impl PhaseProfile {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

/// Maps the UI metric (for example an investment amount) to a multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricCurve {
    /// `factor * value`
    Linear { factor: f32 },
    /// `e^(rate * value)`
    Exponential { rate: f32 },
    /// `scale * value^exponent`
    Power { scale: f32, exponent: f32 },
}

impl Default for MetricCurve {
    fn default() -> Self {
        MetricCurve::Linear { factor: 1.0 }
    }
}

impl MetricCurve {
    /// Multiplier for `value`. Negative values count as zero.
    pub fn apply(&self, value: f32) -> f32 {
        let v = value.max(0.0);
        let out = match *self {
            MetricCurve::Linear { factor } => factor * v,
            MetricCurve::Exponential { rate } => (rate * v).exp(),
            MetricCurve::Power { scale, exponent } => scale * v.powf(exponent),
        };
        if out.is_finite() {
            out
        } else {
            f32::MAX
        }
    }
}

/// Everything needed to mount a [`Scene`](crate::scene::Scene).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub name: String,
    /// Number of particle slots, `1..=MAX_CAPACITY`.
    pub capacity: usize,
    pub distribution: Distribution,
    /// Seed for particle placement. `None` seeds from the clock.
    pub seed: Option<u64>,
    pub field: FieldConfig,
    pub connections: ConnectionConfig,
    /// One profile per phase, in narrative order.
    pub phases: Vec<PhaseProfile>,
    pub policy: PhasePolicy,
    /// Phase transition effect length, clamped to 0.3-0.8 s.
    pub transition_secs: f32,
    /// Seconds after which the scene advances on its own.
    pub auto_advance: Option<f32>,
    pub metric: MetricCurve,
    /// Multiplier values at which phases 1, 2, ... are reached.
    pub metric_thresholds: Vec<f32>,
    pub particles: ParticleStyle,
    pub decorations: Vec<DecorationLayer>,
    pub lighting: Lighting,
    pub camera: CameraConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            name: "untitled".into(),
            capacity: 500,
            distribution: Distribution::default(),
            seed: None,
            field: FieldConfig::default(),
            connections: ConnectionConfig::default(),
            phases: vec![PhaseProfile::named("start")],
            policy: PhasePolicy::Monotonic,
            transition_secs: 0.5,
            auto_advance: None,
            metric: MetricCurve::default(),
            metric_thresholds: DEFAULT_METRIC_THRESHOLDS.to_vec(),
            particles: ParticleStyle::default(),
            decorations: Vec::new(),
            lighting: Lighting::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Parse and validate a config from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Use a fixed seed so the scene is reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn phase_count(&self) -> u8 {
        self.phases.len().min(u8::MAX as usize) as u8
    }

    /// Check that the config describes a scene that can be mounted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.check().map_err(ConfigError::Invalid)
    }

    fn check(&self) -> Result<(), String> {
        if self.capacity == 0 || self.capacity > MAX_CAPACITY {
            return Err(format!(
                "capacity {} must be within 1..={}",
                self.capacity, MAX_CAPACITY
            ));
        }
        if self.phases.is_empty() {
            return Err("a scene needs at least one phase".into());
        }
        if self.phases.len() > u8::MAX as usize {
            return Err(format!("too many phases ({})", self.phases.len()));
        }
        if !self.transition_secs.is_finite() {
            return Err("transition_secs must be finite".into());
        }
        if !(MIN_TRANSITION_SECS..=MAX_TRANSITION_SECS).contains(&self.transition_secs) {
            tracing::warn!(
                secs = self.transition_secs,
                "transition length outside 0.3-0.8 s will be clamped"
            );
        }
        if let Some(after) = self.auto_advance {
            if !(after > 0.0) {
                return Err("auto_advance must be positive".into());
            }
        }
        if self.metric_thresholds.windows(2).any(|w| w[0] > w[1]) {
            return Err("metric_thresholds must be ascending".into());
        }
        self.distribution.validate()?;
        self.field.validate()?;
        if !self.field.bounds.encloses(&self.distribution) {
            return Err(format!(
                "bounds {:?} do not enclose spawn distribution {:?}",
                self.field.bounds, self.distribution
            ));
        }
        self.connections.validate()?;
        for phase in &self.phases {
            if !(phase.threshold >= 0.0) {
                return Err(format!("phase '{}' threshold must be >= 0", phase.name));
            }
            if !(phase.attraction >= 0.0) {
                return Err(format!("phase '{}' attraction must be >= 0", phase.name));
            }
        }
        self.particles.validate()?;
        for layer in &self.decorations {
            layer.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::BoundingVolume;

    #[test]
    fn test_default_is_valid() {
        SceneConfig::default().validate().unwrap();
    }

    #[test]
    fn test_capacity_bounds() {
        let mut config = SceneConfig::default();
        config.capacity = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        config.capacity = MAX_CAPACITY + 1;
        assert!(config.validate().is_err());
        config.capacity = MAX_CAPACITY;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bounds_must_enclose_distribution() {
        let mut config = SceneConfig::default();
        config.distribution = Distribution::SphereSurface { radius: 10.0 };
        config.field.bounds = BoundingVolume::Sphere { radius: 8.0 };
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("enclose"), "{}", err);
    }

    #[test]
    fn test_thresholds_must_ascend() {
        let mut config = SceneConfig::default();
        config.metric_thresholds = vec![100.0, 10.0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config = SceneConfig::from_json(r#"{ "name": "tiny", "capacity": 10 }"#).unwrap();
        assert_eq!(config.name, "tiny");
        assert_eq!(config.capacity, 10);
        assert_eq!(config.field.damping, 0.98);
        assert_eq!(config.phases.len(), 1);
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        assert!(matches!(
            SceneConfig::from_json("{ nope"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            SceneConfig::from_json(r#"{ "capacity": 0 }"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("coreflow-fx-{}.json", std::process::id()));
        let config = SceneConfig::default().with_seed(9);
        config.save(&path).unwrap();
        let loaded = SceneConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SceneConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_metric_curves() {
        assert_eq!(MetricCurve::Linear { factor: 2.0 }.apply(5.0), 10.0);
        assert_eq!(MetricCurve::Linear { factor: 2.0 }.apply(-5.0), 0.0);
        assert_eq!(MetricCurve::Exponential { rate: 1.0 }.apply(0.0), 1.0);
        let p = MetricCurve::Power { scale: 1.0, exponent: 2.0 }.apply(3.0);
        assert!((p - 9.0).abs() < 1e-4);
        assert_eq!(MetricCurve::Exponential { rate: 100.0 }.apply(100.0), f32::MAX);
    }
}
