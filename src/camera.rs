//! Orbit camera and pointer unprojection.

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Which camera interactions are enabled. Scenes toggle these per phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraControls {
    pub orbit: bool,
    pub pan: bool,
    pub zoom: bool,
}

impl Default for CameraControls {
    fn default() -> Self {
        Self {
            orbit: true,
            pan: false,
            zoom: true,
        }
    }
}

impl CameraControls {
    pub const LOCKED: CameraControls = CameraControls {
        orbit: false,
        pan: false,
        zoom: false,
    };
}

/// Initial camera placement for a scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_deg: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.3,
            distance: 14.0,
            target: Vec3::ZERO,
            fov_deg: 45.0,
        }
    }
}

/// World-space ray from the eye through the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to the point closest to `p`. Negative when
    /// `p` is behind the origin.
    #[inline]
    pub fn closest_t(&self, p: Vec3) -> f32 {
        (p - self.origin).dot(self.direction)
    }

    /// The same ray with both ends scaled about the world origin by `1 / scale`.
    pub fn unscaled(&self, scale: f32) -> Option<Ray> {
        if !(scale > 0.0) {
            return None;
        }
        Some(Ray {
            origin: self.origin / scale,
            direction: self.direction,
        })
    }
}

/// Orbit camera for viewing particle scenes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    pub controls: CameraControls,
}

impl OrbitCamera {
    pub const PITCH_LIMIT: f32 = 1.5;
    pub const MIN_DISTANCE: f32 = 0.5;
    pub const MAX_DISTANCE: f32 = 60.0;

    pub fn new(config: &CameraConfig) -> Self {
        Self {
            yaw: config.yaw,
            pitch: config.pitch.clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT),
            distance: config.distance.clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE),
            target: config.target,
            fov_y: config.fov_deg.to_radians(),
            near: 0.1,
            far: 200.0,
            controls: CameraControls::default(),
        }
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Camera right and up vectors in world space.
    pub fn basis(&self) -> (Vec3, Vec3) {
        let forward = (self.target - self.position()).normalize_or_zero();
        let right = forward.cross(Vec3::Y).try_normalize().unwrap_or(Vec3::X);
        (right, right.cross(forward))
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect.max(1e-3), self.near, self.far)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// Rotate by a pointer drag in pixels. No-op when orbit is disabled.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        if !self.controls.orbit {
            return;
        }
        self.yaw -= dx * 0.005;
        self.pitch = (self.pitch + dy * 0.005).clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
    }

    /// Slide the target in the view plane by a pointer drag in pixels.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        if !self.controls.pan {
            return;
        }
        let (right, up) = self.basis();
        let scale = self.distance * 0.0015;
        self.target += (-right * dx + up * dy) * scale;
    }

    /// Dolly by scroll lines (positive = closer).
    pub fn zoom(&mut self, scroll: f32) {
        if !self.controls.zoom {
            return;
        }
        self.distance = (self.distance - scroll * 0.3 * self.distance.sqrt())
            .clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE);
    }

    /// Ray under a pointer at `ndc` (x right, y up, both in `[-1, 1]`),
    /// starting on the near plane.
    pub fn pointer_ray(&self, ndc: Vec2, aspect: f32) -> Option<Ray> {
        let inverse = self.view_proj(aspect).inverse();
        let near = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
        Some(Ray {
            origin: near,
            direction: (near - self.position()).try_normalize()?,
        })
    }

    /// World position under a pointer at `ndc`, on the plane through the
    /// target that faces the camera.
    ///
    /// Returns `None` if the ray is parallel to that plane.
    pub fn pointer_to_world(&self, ndc: Vec2, aspect: f32) -> Option<Vec3> {
        let ray = self.pointer_ray(ndc, aspect)?;
        let normal = (self.position() - self.target).try_normalize()?;
        let denom = ray.direction.dot(normal);
        if denom.abs() < 1e-6 {
            return None;
        }
        Some(ray.at((self.target - ray.origin).dot(normal) / denom))
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}
