//! Perspective camera for screen/world conversion and orbiting.

use crate::ray::Ray;
use glam::{Mat4, Vec2, Vec3};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Interaction mode of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ViewMode {
    /// Drawing happens on the fixed z = 0 plane.
    #[default]
    TwoD,
    /// Drawing happens on camera-facing planes, the camera can orbit.
    ThreeD,
}

impl ViewMode {
    /// Camera position preset for the mode. Both presets look at the origin.
    pub fn camera_position(self) -> Vec3 {
        match self {
            ViewMode::TwoD => Vec3::new(0.01, 0.01, 1.0),
            ViewMode::ThreeD => Vec3::new(0.0, 0.0, 1.0),
        }
    }

    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::TwoD => ViewMode::ThreeD,
            ViewMode::ThreeD => ViewMode::TwoD,
        }
    }
}

/// Keeps the orbit away from the poles where `look_at` degenerates.
const POLAR_MARGIN: f32 = 0.01;

/// Perspective camera looking at a target point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: ViewMode::TwoD.camera_position(),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 75.0,
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    /// Create a camera for a viewport.
    pub fn new(viewport: Size) -> Self {
        let mut camera = Self::default();
        camera.set_viewport(viewport);
        camera
    }

    /// Update the aspect ratio from the viewport size.
    pub fn set_viewport(&mut self, viewport: Size) {
        if viewport.height > 0.0 {
            self.aspect = (viewport.width / viewport.height) as f32;
        }
    }

    /// Move to the preset position of a view mode, looking at the origin.
    pub fn apply_preset(&mut self, mode: ViewMode) {
        self.position = mode.camera_position();
        self.target = Vec3::ZERO;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y.to_radians(), self.aspect, self.near, self.far)
    }

    /// Unit vector the camera looks along.
    pub fn world_direction(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// Convert a screen point to normalized device coordinates.
    pub fn screen_to_ndc(point: Point, viewport: Size) -> Vec2 {
        Vec2::new(
            ((point.x / viewport.width) * 2.0 - 1.0) as f32,
            (-(point.y / viewport.height) * 2.0 + 1.0) as f32,
        )
    }

    /// Pick ray through a point in normalized device coordinates.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = (self.projection_matrix() * self.view_matrix()).inverse();
        let on_frustum = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 0.5));
        Ray::new(self.position, on_frustum - self.position)
    }

    /// Pick ray through a screen point.
    pub fn ray_from_screen(&self, point: Point, viewport: Size) -> Ray {
        self.ray_from_ndc(Self::screen_to_ndc(point, viewport))
    }

    /// Project a world point to the screen. `None` when behind the camera.
    pub fn world_to_screen(&self, world: Vec3, viewport: Size) -> Option<Point> {
        let clip = self.projection_matrix() * self.view_matrix() * world.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Point::new(
            (f64::from(ndc.x) + 1.0) / 2.0 * viewport.width,
            (1.0 - f64::from(ndc.y)) / 2.0 * viewport.height,
        ))
    }

    /// Orbit around the target by a pointer delta in pixels.
    pub fn orbit(&mut self, delta: kurbo::Vec2, speed: f64) {
        let offset = self.position - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }
        let mut azimuth = offset.x.atan2(offset.z);
        let mut polar = (offset.y / radius).clamp(-1.0, 1.0).acos();

        azimuth -= (delta.x * speed) as f32;
        polar = (polar - (delta.y * speed) as f32)
            .clamp(POLAR_MARGIN, std::f32::consts::PI - POLAR_MARGIN);

        self.position = self.target
            + Vec3::new(
                radius * polar.sin() * azimuth.sin(),
                radius * polar.cos(),
                radius * polar.sin() * azimuth.cos(),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Size {
        Size::new(800.0, 600.0)
    }

    #[test]
    fn test_default_camera() {
        let camera = Camera::new(viewport());
        assert_eq!(camera.position, ViewMode::TwoD.camera_position());
        assert!((camera.aspect - 800.0 / 600.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let mut camera = Camera::new(viewport());
        camera.position = Vec3::new(0.0, 0.0, 10.0);
        let ray = camera.ray_from_screen(Point::new(400.0, 300.0), viewport());
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut camera = Camera::new(viewport());
        camera.position = Vec3::new(0.0, 0.0, 10.0);
        let world = Vec3::new(1.5, -0.75, 0.0);
        let screen = camera.world_to_screen(world, viewport()).unwrap();
        let ray = camera.ray_from_screen(screen, viewport());
        let (_, dist) = ray.closest_to_point(world);
        assert!(dist < 1e-3);
    }

    #[test]
    fn test_behind_camera_not_projected() {
        let mut camera = Camera::new(viewport());
        camera.position = Vec3::new(0.0, 0.0, 10.0);
        assert!(camera.world_to_screen(Vec3::new(0.0, 0.0, 20.0), viewport()).is_none());
    }

    #[test]
    fn test_orbit_keeps_distance() {
        let mut camera = Camera::new(viewport());
        camera.apply_preset(ViewMode::ThreeD);
        camera.orbit(kurbo::Vec2::new(120.0, -40.0), 0.005);
        assert!((camera.position.length() - 1.0).abs() < 1e-4);
        assert!(camera.position.x.abs() > 0.1);
    }

    #[test]
    fn test_mode_toggle() {
        assert_eq!(ViewMode::TwoD.toggled(), ViewMode::ThreeD);
        assert_eq!(ViewMode::ThreeD.toggled(), ViewMode::TwoD);
    }
}
