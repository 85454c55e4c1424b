//! Connection graph between nearby engaged particles.
//!
//! The edge set is rebuilt from scratch every frame: every unordered pair of
//! particles that are both [`Active`](ParticleState::Active) or higher and
//! strictly closer than the threshold becomes an [`Edge`], and both ends are
//! promoted to [`Connected`](ParticleState::Connected). No edge state is kept
//! between frames, so recomputing the same snapshot always gives the same set.

use crate::field::{ParticleField, Snapshot};
use crate::particle::ParticleState;
use crate::spatial::{SpatialIndex, SpatialStrategy};
use crate::Vec3;
use serde::{Deserialize, Serialize};

/// Link between particles `from < to`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    /// `1 - distance / threshold`, in `[0, 1]`. Drives line opacity.
    pub strength: f32,
}

/// How edges are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConnectionStyle {
    /// One straight segment per edge.
    Straight,
    /// Quadratic Bézier bowed away from the origin by `lift` times the edge length.
    Arc { segments: u32, lift: f32 },
}

impl Default for ConnectionStyle {
    fn default() -> Self {
        ConnectionStyle::Straight
    }
}

/// Tuning for [`ConnectionGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Distance below which two engaged particles connect.
    pub threshold: f32,
    /// Maximum edges touching one particle. Shorter edges win.
    pub max_edges_per_particle: Option<usize>,
    pub style: ConnectionStyle,
    pub color: Vec3,
    pub spatial: SpatialStrategy,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            threshold: 1.5,
            max_edges_per_particle: None,
            style: ConnectionStyle::Straight,
            color: Vec3::new(0.4, 0.7, 1.0),
            spatial: SpatialStrategy::BruteForce,
        }
    }
}

impl ConnectionConfig {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if !(self.threshold >= 0.0) {
            return Err("connection threshold must be >= 0".into());
        }
        if self.max_edges_per_particle == Some(0) {
            return Err("max_edges_per_particle must be at least 1".into());
        }
        if let ConnectionStyle::Arc { segments, .. } = self.style {
            if segments == 0 {
                return Err("arc connections need at least one segment".into());
            }
        }
        self.spatial.validate()
    }
}

/// Every qualifying pair in `snapshot`, sorted by `(from, to)`.
///
/// Pure: no particle is promoted. `index` is rebuilt over the engaged particles.
pub fn find_edges(
    snapshot: &Snapshot,
    threshold: f32,
    max_edges_per_particle: Option<usize>,
    index: &mut dyn SpatialIndex,
) -> Vec<Edge> {
    if !(threshold > 0.0) || snapshot.len() < 2 {
        return Vec::new();
    }

    let states = &snapshot.states;
    index.rebuild(&snapshot.positions, &|i| states[i].is_engaged());

    // (distance, from, to)
    let mut candidates: Vec<(f32, usize, usize)> = Vec::new();
    let mut neighbors = Vec::new();
    for (i, pos) in snapshot.positions.iter().enumerate() {
        if !states[i].is_engaged() {
            continue;
        }
        neighbors.clear();
        index.query_neighbors(*pos, threshold, &mut neighbors);
        for &j in &neighbors {
            if j > i {
                candidates.push((pos.distance(snapshot.positions[j]), i, j));
            }
        }
    }

    if let Some(cap) = max_edges_per_particle {
        candidates.sort_by(|a, b| {
            a.0.total_cmp(&b.0)
                .then(a.1.cmp(&b.1))
                .then(a.2.cmp(&b.2))
        });
        let mut degree = vec![0usize; snapshot.len()];
        candidates.retain(|&(_, a, b)| {
            if degree[a] < cap && degree[b] < cap {
                degree[a] += 1;
                degree[b] += 1;
                true
            } else {
                false
            }
        });
    }

    let mut edges: Vec<Edge> = candidates
        .into_iter()
        .map(|(d, from, to)| Edge {
            from,
            to,
            strength: (1.0 - d / threshold).clamp(0.0, 1.0),
        })
        .collect();
    edges.sort_by(|a, b| a.from.cmp(&b.from).then(a.to.cmp(&b.to)));
    edges.dedup_by(|a, b| a.from == b.from && a.to == b.to);
    edges
}

/// Per-scene edge set, rebuilt every frame.
pub struct ConnectionGraph {
    config: ConnectionConfig,
    index: Box<dyn SpatialIndex>,
    edges: Vec<Edge>,
}

impl ConnectionGraph {
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            index: config.spatial.build(),
            config,
            edges: Vec::new(),
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Rebuild edges from the field's current state and promote every
    /// connected particle.
    pub fn recompute(&mut self, field: &mut ParticleField, threshold: f32) -> &[Edge] {
        let snapshot = field.snapshot();
        self.recompute_snapshot(&snapshot, threshold);
        for edge in &self.edges {
            field.promote(edge.from, ParticleState::Connected);
            field.promote(edge.to, ParticleState::Connected);
        }
        &self.edges
    }

    /// Rebuild edges from an existing snapshot without promoting anything.
    pub fn recompute_snapshot(&mut self, snapshot: &Snapshot, threshold: f32) -> &[Edge] {
        self.edges = find_edges(
            snapshot,
            threshold,
            self.config.max_edges_per_particle,
            self.index.as_mut(),
        );
        &self.edges
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Drop all edges, as on scene teardown.
    pub fn clear(&mut self) {
        self.edges.clear();
    }
}

/// Line segments `(start, end, strength)` for drawing `edges` in `style`.
pub fn edge_segments(
    edges: &[Edge],
    positions: &[Vec3],
    style: ConnectionStyle,
) -> Vec<(Vec3, Vec3, f32)> {
    let mut out = Vec::new();
    for edge in edges {
        let (a, b) = (positions[edge.from], positions[edge.to]);
        match style {
            ConnectionStyle::Straight => out.push((a, b, edge.strength)),
            ConnectionStyle::Arc { segments, lift } => {
                let segments = segments.max(1);
                let mid = (a + b) * 0.5;
                let outward = mid.try_normalize().unwrap_or(Vec3::Y);
                let control = mid + outward * lift * a.distance(b);
                let mut prev = a;
                for s in 1..=segments {
                    let t = s as f32 / segments as f32;
                    let next = quadratic_bezier(a, control, b, t);
                    out.push((prev, next, edge.strength));
                    prev = next;
                }
            }
        }
    }
    out
}

#[inline]
fn quadratic_bezier(a: Vec3, control: Vec3, b: Vec3, t: f32) -> Vec3 {
    let u = 1.0 - t;
    a * (u * u) + control * (2.0 * u * t) + b * (t * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldConfig;
    use crate::spatial::{BruteForce, SpatialConfig, UniformGrid};
    use crate::spawn::{Distribution, SpawnContext};

    fn snapshot(points: &[(Vec3, ParticleState)]) -> Snapshot {
        Snapshot {
            positions: points.iter().map(|(p, _)| *p).collect(),
            velocities: vec![Vec3::ZERO; points.len()],
            states: points.iter().map(|(_, s)| *s).collect(),
            attributes: vec![Default::default(); points.len()],
            opacity: vec![1.0; points.len()],
        }
    }

    #[test]
    fn only_engaged_pairs_connect() {
        let snap = snapshot(&[
            (Vec3::ZERO, ParticleState::Active),
            (Vec3::new(0.5, 0.0, 0.0), ParticleState::Active),
            (Vec3::new(0.0, 0.5, 0.0), ParticleState::Dormant),
            (Vec3::new(0.0, 0.0, 0.5), ParticleState::Connected),
        ]);
        let edges = find_edges(&snap, 1.0, None, &mut BruteForce::default());
        let pairs: Vec<(usize, usize)> = edges.iter().map(|e| (e.from, e.to)).collect();
        assert_eq!(pairs, vec![(0, 1), (0, 3), (1, 3)]);
        for e in &edges {
            assert!(e.strength > 0.0 && e.strength <= 1.0);
        }
    }

    #[test]
    fn threshold_is_strict() {
        let snap = snapshot(&[
            (Vec3::ZERO, ParticleState::Active),
            (Vec3::new(1.0, 0.0, 0.0), ParticleState::Active),
        ]);
        assert!(find_edges(&snap, 1.0, None, &mut BruteForce::default()).is_empty());
        assert_eq!(find_edges(&snap, 1.01, None, &mut BruteForce::default()).len(), 1);
    }

    #[test]
    fn zero_threshold_yields_nothing() {
        let snap = snapshot(&[
            (Vec3::ZERO, ParticleState::Active),
            (Vec3::ZERO, ParticleState::Active),
        ]);
        assert!(find_edges(&snap, 0.0, None, &mut BruteForce::default()).is_empty());
    }

    #[test]
    fn cap_limits_fan_out() {
        let snap = snapshot(&[
            (Vec3::ZERO, ParticleState::Active),
            (Vec3::new(0.1, 0.0, 0.0), ParticleState::Active),
            (Vec3::new(0.2, 0.0, 0.0), ParticleState::Active),
            (Vec3::new(0.3, 0.0, 0.0), ParticleState::Active),
        ]);
        let edges = find_edges(&snap, 1.0, Some(1), &mut BruteForce::default());
        let mut degree = [0; 4];
        for e in &edges {
            degree[e.from] += 1;
            degree[e.to] += 1;
        }
        assert!(degree.iter().all(|d| *d <= 1));
        assert_eq!(edges.len(), 2);
    }

    #[test]
    fn grid_and_brute_force_agree() {
        let mut ctx = SpawnContext::seeded(5);
        let points: Vec<(Vec3, ParticleState)> = (0..300)
            .map(|i| {
                let state = if i % 4 == 0 {
                    ParticleState::Dormant
                } else {
                    ParticleState::Active
                };
                (ctx.random_in_cube(5.0), state)
            })
            .collect();
        let snap = snapshot(&points);
        let a = find_edges(&snap, 0.9, None, &mut BruteForce::default());
        let b = find_edges(&snap, 0.9, None, &mut UniformGrid::new(SpatialConfig::new(1.0, 16)));
        assert_eq!(a, b);
    }

    #[test]
    fn recompute_promotes_and_is_idempotent() {
        let config = FieldConfig {
            activation_radius: 100.0,
            ..FieldConfig::default()
        };
        let mut field = ParticleField::initialize(
            60,
            Distribution::SphereVolume { radius: 2.0 },
            config,
            SpawnContext::seeded(8),
        );
        field.step(0.0, Some(Vec3::ZERO));
        let mut graph = ConnectionGraph::new(ConnectionConfig::default());
        let first = graph.recompute(&mut field, 1.5).to_vec();
        assert!(!first.is_empty());
        for e in &first {
            assert_eq!(field.particles()[e.from].state(), ParticleState::Connected);
            assert_eq!(field.particles()[e.to].state(), ParticleState::Connected);
        }
        let second = graph.recompute(&mut field, 1.5).to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn arc_segments_join_endpoints() {
        let positions = [Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)];
        let edges = [Edge {
            from: 0,
            to: 1,
            strength: 0.5,
        }];
        let segs = edge_segments(&edges, &positions, ConnectionStyle::Arc { segments: 8, lift: 0.3 });
        assert_eq!(segs.len(), 8);
        assert!((segs[0].0 - positions[0]).length() < 1e-6);
        assert!((segs[7].1 - positions[1]).length() < 1e-5);
        // Bowed away from the origin.
        let mid = segs[3].1;
        assert!(mid.length() > ((positions[0] + positions[1]) * 0.5).length());
    }
}
