//! The scene composer: one self-contained animated composition.
//!
//! A [`Scene`] owns everything one scene needs: the particle field,
//! connection graph, phase controller, camera, render list and the timers.
//! Nothing is global, so any number of scenes can run side by side.
//!
//! Each call to [`Scene::frame`] runs the same fixed pipeline:
//!
//! 1. fire due phase timers
//! 2. [`ParticleField::step`] with the pointer picked against the field
//! 3. [`ConnectionGraph::recompute`] at the current phase's threshold
//! 4. rebuild the [`RenderList`]
//! 5. refresh the [`OverlayState`] the UI polls
//!
//! ```
//! use coreflow_fx::prelude::*;
//!
//! let config = SceneConfig::neural_command_center().with_seed(3);
//! let mut scene = Scene::mount(config).unwrap();
//! let mut time = Time::new();
//!
//! for _ in 0..10 {
//!     time.advance(1.0 / 60.0);
//!     scene.frame(&time, Some(Vec2::ZERO));
//! }
//! assert_eq!(scene.overlay().phase_name, "offline");
//!
//! scene.set_phase(Phase(2));
//! assert_eq!(scene.overlay().phase, Phase(2));
//! let summary = scene.unmount();
//! assert_eq!(summary.frame, 10);
//! ```

use crate::camera::OrbitCamera;
use crate::config::{PhaseProfile, SceneConfig};
use crate::connections::{edge_segments, ConnectionGraph, Edge};
use crate::error::ConfigError;
use crate::field::{ParticleField, StepStats};
use crate::particle::ParticleState;
use crate::phase::{phase_for_metric, Phase, PhaseChange, PhaseController};
use crate::render::RenderList;
use crate::spawn::SpawnContext;
use crate::time::Time;
use crate::{Vec2, Vec3};
use serde::Serialize;

/// Read-only state for a UI layer, refreshed every frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverlayState {
    pub scene: String,
    pub phase: Phase,
    pub phase_name: String,
    pub phase_count: u8,
    /// Eased progress of the running phase transition; 1.0 when settled.
    pub transition_progress: f32,
    pub elapsed: f32,
    pub frame: u64,
    pub dormant: usize,
    pub active: usize,
    pub connected: usize,
    pub edges: usize,
    /// Last value passed to [`Scene::set_metric`].
    pub metric: f32,
    /// `metric` mapped through the scene's curve.
    pub multiplier: f32,
    pub auto_advance_armed: bool,
}

/// What happened during one [`Scene::frame`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    pub step: StepStats,
    pub edges: usize,
    /// Set when a timer advanced the phase this frame.
    pub phase_change: Option<PhaseChange>,
}

/// A mounted scene.
pub struct Scene {
    config: SceneConfig,
    seed: u64,
    field: ParticleField,
    graph: ConnectionGraph,
    phases: PhaseController,
    camera: OrbitCamera,
    aspect: f32,
    render: RenderList,
    overlay: OverlayState,
    now: f32,
}

impl Scene {
    /// Validate `config` and build the scene at phase 0.
    pub fn mount(config: SceneConfig) -> Result<Scene, ConfigError> {
        config.validate()?;

        let spawn = SpawnContext::new(config.seed);
        let seed = spawn.seed();
        let field = ParticleField::initialize(
            config.capacity,
            config.distribution,
            config.field,
            spawn,
        );
        let graph = ConnectionGraph::new(config.connections);
        let mut phases = PhaseController::new(
            config.phase_count(),
            config.policy,
            config.transition_secs,
        );
        phases.set_auto_advance(config.auto_advance, 0.0);

        let mut scene = Scene {
            camera: OrbitCamera::new(&config.camera),
            overlay: OverlayState {
                scene: config.name.clone(),
                phase_count: phases.count(),
                ..Default::default()
            },
            render: RenderList::default(),
            aspect: 16.0 / 9.0,
            now: 0.0,
            seed,
            field,
            graph,
            phases,
            config,
        };
        scene.apply_profile();
        scene.refresh_overlay();

        tracing::info!(
            scene = %scene.config.name,
            capacity = scene.field.capacity(),
            seed,
            phases = scene.phases.count(),
            "scene mounted"
        );
        Ok(scene)
    }

    /// Mount a built-in scene by name.
    pub fn preset(name: &str, seed: Option<u64>) -> Result<Scene, ConfigError> {
        let mut config = SceneConfig::preset(name)?;
        if seed.is_some() {
            config.seed = seed;
        }
        Self::mount(config)
    }

    /// Advance one frame. `pointer_ndc` is the cursor in normalized device
    /// coordinates, or `None` when there is no pointer over the scene.
    pub fn frame(&mut self, time: &Time, pointer_ndc: Option<Vec2>) -> FrameReport {
        self.now = self.now.max(time.elapsed());
        let now = self.now;

        let phase_change = self.phases.tick(now);
        if let Some(change) = phase_change {
            self.on_phase_change(change);
        }

        let pointer = pointer_ndc.and_then(|ndc| self.pointer_to_field(ndc));
        let step = self.field.step(now, pointer);

        let threshold = self.profile().threshold;
        let edges = self.graph.recompute(&mut self.field, threshold).len();

        self.build_render_list();
        self.overlay.frame = time.frame();
        self.refresh_overlay();

        FrameReport {
            step,
            edges,
            phase_change,
        }
    }

    /// Request phase `next`. Under a monotonic policy lower or equal phases
    /// are ignored.
    pub fn set_phase(&mut self, next: Phase) -> Option<PhaseChange> {
        let change = self.phases.set_phase(next, self.now);
        self.settle(change)
    }

    /// Move one phase forward.
    pub fn advance(&mut self) -> Option<PhaseChange> {
        let change = self.phases.advance(self.now);
        self.settle(change)
    }

    /// Back to phase 0. Clears the auto-advance timer.
    pub fn reset(&mut self) -> Option<PhaseChange> {
        let change = self.phases.reset(self.now);
        if let Some(change) = change {
            self.on_phase_change(change);
        }
        self.refresh_overlay();
        change
    }

    /// Feed the UI metric (for example an investment amount). The phase
    /// follows the multiplier across the configured thresholds.
    pub fn set_metric(&mut self, value: f32) -> Option<PhaseChange> {
        self.overlay.metric = value;
        self.overlay.multiplier = self.config.metric.apply(value);
        let target = phase_for_metric(self.overlay.multiplier, &self.config.metric_thresholds);
        self.set_phase(target)
    }

    /// Viewport width over height, used to unproject the pointer.
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn overlay(&self) -> &OverlayState {
        &self.overlay
    }

    pub fn render_list(&self) -> &RenderList {
        &self.render
    }

    pub fn phase(&self) -> Phase {
        self.phases.current()
    }

    pub fn phases(&self) -> &PhaseController {
        &self.phases
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn edges(&self) -> &[Edge] {
        self.graph.edges()
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    /// Camera for host input. Orbit, pan and zoom respect the current
    /// phase's enable flags.
    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Seed the scene was built from; reuse it to replay the scene.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Tear the scene down, releasing its timers and buffers. Returns the
    /// final overlay state.
    pub fn unmount(mut self) -> OverlayState {
        self.phases.clear_timers();
        self.graph.clear();
        self.render.clear();
        self.overlay.auto_advance_armed = false;
        self.overlay.edges = 0;

        tracing::info!(
            scene = %self.config.name,
            frames = self.overlay.frame,
            elapsed = self.now,
            phase = self.phases.current().0,
            connected = self.overlay.connected,
            "scene unmounted"
        );
        self.overlay
    }

    /// Field-space pointer: the depth of the front particle under the
    /// cursor, or the target plane when the ray misses the field.
    fn pointer_to_field(&self, ndc: Vec2) -> Option<Vec3> {
        let scale = self
            .phases
            .transition()
            .map_or(1.0, |t| t.scale(self.now));
        let ray = self.camera.pointer_ray(ndc, self.aspect)?.unscaled(scale)?;
        self.field.pick(&ray).or_else(|| {
            self.camera
                .pointer_to_world(ndc, self.aspect)
                .map(|p| p / scale)
        })
    }

    fn profile(&self) -> &PhaseProfile {
        let last = self.config.phases.len() - 1;
        &self.config.phases[self.phases.current().index().min(last)]
    }

    fn settle(&mut self, change: Option<PhaseChange>) -> Option<PhaseChange> {
        if let Some(change) = change {
            self.on_phase_change(change);
            self.refresh_overlay();
        }
        change
    }

    fn on_phase_change(&mut self, change: PhaseChange) {
        self.apply_profile();
        tracing::info!(
            scene = %self.config.name,
            from = change.from.0,
            to = change.to.0,
            name = %self.profile().name,
            "phase changed"
        );
    }

    /// Push the current phase's tuning into the field and camera.
    fn apply_profile(&mut self) {
        let profile = self.profile();
        let (attraction, controls) = (profile.attraction, profile.controls);
        self.field.set_attraction_scale(attraction);
        self.camera.controls = controls;
    }

    fn build_render_list(&mut self) {
        let now = self.now;
        let transition = self.phases.transition().copied();
        let profile = self.profile();
        let (bloom, show_decorations) = (profile.bloom, profile.show_decorations);

        let render = &mut self.render;
        render.clear();
        render.fade = transition.map_or(1.0, |t| t.fade(now));
        render.scale = transition.map_or(1.0, |t| t.scale(now));
        render.lighting = self.config.lighting;
        render.bloom = bloom;
        render.view_proj = self.camera.view_proj(self.aspect);
        render.camera_position = self.camera.position();
        (render.camera_right, render.camera_up) = self.camera.basis();

        let snapshot = self.field.snapshot();
        render.push_particles(&snapshot, &self.config.particles);

        let segments = edge_segments(
            self.graph.edges(),
            &snapshot.positions,
            self.config.connections.style,
        );
        render.push_edges(&segments, self.config.connections.color);

        if show_decorations {
            let current = self.phases.current().0;
            for layer in self.config.decorations.iter().filter(|l| l.from_phase <= current) {
                render.push_decoration(layer, now);
            }
        }
    }

    fn refresh_overlay(&mut self) {
        let phase = self.phases.current();
        let name = self.profile().name.clone();
        let overlay = &mut self.overlay;
        overlay.phase = phase;
        overlay.phase_name = name;
        overlay.transition_progress = self.phases.transition_progress(self.now);
        overlay.elapsed = self.now;
        overlay.dormant = self.field.count(ParticleState::Dormant);
        overlay.active = self.field.count(ParticleState::Active);
        overlay.connected = self.field.count(ParticleState::Connected);
        overlay.edges = self.graph.edges().len();
        overlay.auto_advance_armed = self.phases.auto_advance_armed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::PhasePolicy;

    fn run(scene: &mut Scene, time: &mut Time, frames: usize, pointer: Option<Vec2>) {
        for _ in 0..frames {
            time.advance(1.0 / 60.0);
            scene.frame(time, pointer);
        }
    }

    #[test]
    fn test_mount_rejects_invalid_config() {
        let mut config = SceneConfig::default();
        config.capacity = 0;
        assert!(Scene::mount(config).is_err());
    }

    #[test]
    fn test_frame_fills_render_list() {
        let mut scene = Scene::preset("roi_singularity", Some(1)).unwrap();
        let mut time = Time::new();
        run(&mut scene, &mut time, 3, None);

        let render = scene.render_list();
        assert_eq!(render.particles.len(), 2000);
        assert_eq!(render.edge_vertex_count, 0);
        // Phase 0 shows no decorations: both layers unlock later.
        assert!(render.decorations.is_empty());
        assert_eq!(scene.overlay().frame, 3);
        assert_eq!(scene.overlay().dormant, 2000);
    }

    #[test]
    fn test_monotonic_scene_ignores_backward_phase() {
        let mut scene = Scene::preset("roi_singularity", Some(1)).unwrap();
        assert!(scene.set_phase(Phase(2)).is_some());
        assert!(scene.set_phase(Phase(1)).is_none());
        assert_eq!(scene.phase(), Phase(2));
        assert_eq!(scene.overlay().phase_name, "breaking");
        assert!(scene.reset().is_some());
        assert_eq!(scene.phase(), Phase(0));
    }

    #[test]
    fn test_phase_profile_drives_field_and_camera() {
        let mut scene = Scene::preset("neural_command_center", Some(2)).unwrap();
        assert_eq!(scene.field().attraction_scale(), 0.0);
        assert!(!scene.camera().controls.orbit);

        scene.set_phase(Phase(3));
        assert_eq!(scene.field().attraction_scale(), 1.5);
        assert!(scene.camera().controls.pan);
    }

    #[test]
    fn test_metric_advances_phase() {
        let mut scene = Scene::preset("roi_singularity", Some(1)).unwrap();
        assert!(scene.set_metric(100.0).is_none());
        let change = scene.set_metric(7000.0).unwrap();
        assert_eq!(change.to, Phase(2));
        assert!(scene.overlay().multiplier >= 100.0);
        // Lower metric does not pull a monotonic scene back.
        assert!(scene.set_metric(0.0).is_none());
        assert_eq!(scene.phase(), Phase(2));
    }

    #[test]
    fn test_free_policy_follows_metric_down() {
        let mut scene = Scene::preset("multiplication_chamber", Some(1)).unwrap();
        assert_eq!(scene.phases().policy(), PhasePolicy::Free);
        scene.set_metric(20.0); // 400
        assert_eq!(scene.phase(), Phase(2));
        scene.set_metric(1.0);
        assert_eq!(scene.phase(), Phase(0));
    }

    #[test]
    fn test_auto_advance_fires_during_frames() {
        let mut scene = Scene::preset("neural_command_center", Some(5)).unwrap();
        let mut time = Time::new();
        let mut changes = 0;
        for _ in 0..(7 * 60) {
            time.advance(1.0 / 60.0);
            if scene.frame(&time, None).phase_change.is_some() {
                changes += 1;
            }
        }
        assert_eq!(changes, 1);
        assert_eq!(scene.phase(), Phase(1));
    }

    #[test]
    fn test_transition_fades_render_list() {
        let mut scene = Scene::preset("neural_command_center", Some(5)).unwrap();
        let mut time = Time::new();
        run(&mut scene, &mut time, 1, None);
        scene.set_phase(Phase(1));
        // Halfway through the 0.5 s transition.
        run(&mut scene, &mut time, 15, None);
        assert!(scene.render_list().fade < 0.5);
        run(&mut scene, &mut time, 30, None);
        assert_eq!(scene.render_list().fade, 1.0);
        assert_eq!(scene.overlay().transition_progress, 1.0);
    }

    #[test]
    fn test_pointer_activates_and_connects() {
        let mut config = SceneConfig::default().with_seed(4);
        config.capacity = 200;
        config.distribution = crate::spawn::Distribution::Disk { radius: 2.0 };
        config.field.activation_radius = 50.0;
        config.phases[0].threshold = 1.0;
        let mut scene = Scene::mount(config).unwrap();
        let mut time = Time::new();
        run(&mut scene, &mut time, 1, Some(Vec2::ZERO));

        let overlay = scene.overlay();
        assert_eq!(overlay.dormant, 0);
        assert!(overlay.edges > 0);
        assert!(overlay.connected >= 2);
        assert!(scene.render_list().edge_vertex_count > 0);
    }

    #[test]
    fn test_unmount_clears_timers() {
        let mut scene = Scene::preset("neural_command_center", Some(5)).unwrap();
        assert!(scene.overlay().auto_advance_armed);
        let summary = scene.unmount();
        assert!(!summary.auto_advance_armed);
        assert_eq!(summary.scene, "neural_command_center");
    }

    #[test]
    fn test_scenes_are_independent() {
        let mut a = Scene::preset("roi_singularity", Some(1)).unwrap();
        let b = Scene::preset("roi_singularity", Some(1)).unwrap();
        a.set_phase(Phase(3));
        assert_eq!(b.phase(), Phase(0));
        assert_eq!(a.seed(), b.seed());
    }
}
