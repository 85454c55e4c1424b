//! End-to-end scenarios for fields, graphs and mounted scenes.

use coreflow_fx::prelude::*;
use coreflow_fx::{ConnectionGraph, ParticleField};

// ============================================================================
// Field and graph
// ============================================================================

#[test]
fn test_pointer_on_particle_seven_activates_it() {
    let mut field = ParticleField::initialize(
        100,
        Distribution::SphereSurface { radius: 5.0 },
        FieldConfig::default(),
        SpawnContext::seeded(2024),
    );
    assert_eq!(field.count(ParticleState::Dormant), 100);
    for p in field.particles() {
        assert!((p.position.length() - 5.0).abs() < 1e-3);
    }

    let target = field.particles()[7].position;
    let stats = field.step(1.0 / 60.0, Some(target));

    assert!(stats.activated >= 1);
    assert_eq!(field.particles()[7].state(), ParticleState::Active);
    assert_eq!(field.capacity(), 100);
}

#[test]
fn test_nearby_active_particles_connect() {
    let mut field = ParticleField::initialize(
        100,
        Distribution::SphereSurface { radius: 5.0 },
        FieldConfig {
            activation_radius: 4.0,
            ..FieldConfig::default()
        },
        SpawnContext::seeded(7),
    );
    let target = field.particles()[7].position;
    field.step(1.0 / 60.0, Some(target));

    // Pick the threshold from the closest pair of active particles so the
    // scenario does not depend on the sample layout.
    let active: Vec<(usize, Vec3)> = field
        .particles()
        .iter()
        .enumerate()
        .filter(|(_, p)| p.state() == ParticleState::Active)
        .map(|(i, p)| (i, p.position))
        .collect();
    assert!(active.len() >= 2, "expected at least two active particles");

    let mut closest = (f32::MAX, 0, 0);
    for (a, (i, pi)) in active.iter().enumerate() {
        for (j, pj) in &active[a + 1..] {
            let d = pi.distance(*pj);
            if d < closest.0 {
                closest = (d, *i, *j);
            }
        }
    }
    let (distance, i, j) = closest;

    let mut graph = ConnectionGraph::new(ConnectionConfig::default());
    let edges = graph.recompute(&mut field, distance + 0.01).to_vec();

    assert!(!edges.is_empty());
    assert!(edges.iter().any(|e| e.from == i.min(j) && e.to == i.max(j)));
    assert_eq!(field.particles()[i].state(), ParticleState::Connected);
    assert_eq!(field.particles()[j].state(), ParticleState::Connected);
}

#[test]
fn test_dormant_particles_never_connect() {
    let mut field = ParticleField::initialize(
        50,
        Distribution::SphereVolume { radius: 1.0 },
        FieldConfig::default(),
        SpawnContext::seeded(3),
    );
    field.step(1.0 / 60.0, None);
    let mut graph = ConnectionGraph::new(ConnectionConfig::default());
    assert!(graph.recompute(&mut field, 10.0).is_empty());
    assert_eq!(field.count(ParticleState::Connected), 0);
}

// ============================================================================
// Scenes
// ============================================================================

fn run(scene: &mut Scene, time: &mut Time, frames: usize, pointer: Option<Vec2>) {
    for _ in 0..frames {
        time.advance(1.0 / 60.0);
        scene.frame(time, pointer);
    }
}

#[test]
fn test_every_preset_mounts_and_runs() {
    for name in coreflow_fx::presets::PRESET_NAMES {
        let mut scene = Scene::preset(name, Some(11)).unwrap();
        let mut time = Time::new();
        run(&mut scene, &mut time, 30, Some(Vec2::ZERO));

        let overlay = scene.overlay();
        assert_eq!(overlay.frame, 30);
        assert_eq!(
            overlay.dormant + overlay.active + overlay.connected,
            scene.field().capacity(),
            "{name}"
        );
        assert!(!scene.render_list().particles.is_empty(), "{name}");
    }
}

#[test]
fn test_pointer_over_front_particle_wakes_it() {
    let mut scene = Scene::preset("neural_command_center", Some(21)).unwrap();
    let aspect = 16.0 / 9.0;
    scene.set_aspect(aspect);

    let eye = scene.camera().position();
    let (front, position) = scene
        .field()
        .particles()
        .iter()
        .enumerate()
        .map(|(i, p)| (i, p.position))
        .min_by(|a, b| a.1.distance(eye).total_cmp(&b.1.distance(eye)))
        .unwrap();
    let ndc = scene.camera().view_proj(aspect).project_point3(position);
    assert!(ndc.x.abs() < 1.0 && ndc.y.abs() < 1.0);

    let mut time = Time::new();
    run(&mut scene, &mut time, 1, Some(Vec2::new(ndc.x, ndc.y)));

    assert_eq!(scene.field().particles()[front].state(), ParticleState::Active);
    // Only the hemisphere facing the camera is under the cursor.
    let facing = (eye - scene.camera().target).normalize();
    for p in scene.field().particles() {
        if p.state() != ParticleState::Dormant {
            assert!(p.position.dot(facing) > 0.0, "back particle woke at {:?}", p.position);
        }
    }
}

#[test]
fn test_same_seed_same_scene() {
    let mut a = Scene::preset("neural_command_center", Some(99)).unwrap();
    let mut b = Scene::preset("neural_command_center", Some(99)).unwrap();
    let (mut ta, mut tb) = (Time::new(), Time::new());
    a.advance();
    b.advance();
    run(&mut a, &mut ta, 40, Some(Vec2::new(0.1, -0.2)));
    run(&mut b, &mut tb, 40, Some(Vec2::new(0.1, -0.2)));

    assert_eq!(a.field().snapshot(), b.field().snapshot());
    assert_eq!(a.edges(), b.edges());
    assert_eq!(a.overlay(), b.overlay());
}

#[test]
fn test_auto_advance_walks_through_phases_until_reset() {
    let config = SceneConfig::neural_command_center().with_seed(5);
    let after = config.auto_advance.unwrap();
    let phase_count = config.phase_count();
    let mut scene = Scene::mount(config).unwrap();
    let mut time = Time::new();
    assert!(scene.overlay().auto_advance_armed);

    let frames = ((after * 60.0) as usize + 2) * phase_count as usize;
    run(&mut scene, &mut time, frames, None);
    assert_eq!(scene.phase(), Phase(phase_count - 1));

    scene.reset();
    assert_eq!(scene.phase(), Phase(0));
    assert!(!scene.overlay().auto_advance_armed);

    // With the timer cleared the scene stays put.
    run(&mut scene, &mut time, frames, None);
    assert_eq!(scene.phase(), Phase(0));
}

#[test]
fn test_reset_from_phase_zero_still_clears_the_timer() {
    let mut scene = Scene::mount(SceneConfig::neural_command_center().with_seed(6)).unwrap();
    assert!(scene.overlay().auto_advance_armed);
    assert!(scene.reset().is_none());
    assert!(!scene.overlay().auto_advance_armed);
}

#[test]
fn test_two_scenes_do_not_interfere() {
    let mut roi = Scene::preset("roi_singularity", Some(1)).unwrap();
    let mut chamber = Scene::preset("multiplication_chamber", Some(1)).unwrap();
    let mut time = Time::new();

    roi.set_metric(1.0e6);
    for _ in 0..20 {
        time.advance(1.0 / 60.0);
        roi.frame(&time, None);
        chamber.frame(&time, None);
    }
    assert_eq!(roi.phase(), Phase(3));
    assert_eq!(chamber.phase(), Phase(0));

    let summary = roi.unmount();
    assert_eq!(summary.edges, 0);
    assert!(!summary.auto_advance_armed);
    chamber.frame(&time, None);
}

#[test]
fn test_config_survives_a_json_round_trip_through_a_scene() {
    let config = SceneConfig::multiplication_chamber().with_seed(8);
    let parsed = SceneConfig::from_json(&config.to_json().unwrap()).unwrap();
    assert_eq!(parsed, config);

    let mut from_json = Scene::mount(parsed).unwrap();
    let mut direct = Scene::mount(config).unwrap();
    let mut time = Time::new();
    run(&mut from_json, &mut time, 5, None);
    let mut time = Time::new();
    run(&mut direct, &mut time, 5, None);
    assert_eq!(from_json.field().snapshot(), direct.field().snapshot());
}
