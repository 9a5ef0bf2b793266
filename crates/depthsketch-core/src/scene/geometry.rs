//! Geometry primitives and their local-space ray hit tests.

use crate::ray::Ray;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Number of samples used to approximate a torus centre line when picking.
const TORUS_PICK_SAMPLES: usize = 64;

/// Distances used to decide whether a ray touches thin geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickParams {
    /// Maximum ray distance to a polyline segment.
    pub line_threshold: f32,
    /// Maximum ray distance to a point of a point cloud.
    pub point_threshold: f32,
    /// Extra slack around gizmo arrows and rings.
    pub gizmo_tolerance: f32,
}

impl Default for PickParams {
    fn default() -> Self {
        Self {
            line_threshold: 0.05,
            point_threshold: 0.05,
            gizmo_tolerance: 0.1,
        }
    }
}

/// Shape data of a renderable node, in the node's local space.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Polyline { points: Vec<Vec3> },
    PointCloud { points: Vec<Vec3>, size: f32 },
    /// Flat disc in the XY plane, facing +Z.
    Disc { radius: f32, segments: u32 },
    /// Flat annulus in the XY plane.
    Ring { inner: f32, outer: f32 },
    /// Flat rectangle in the XY plane.
    Plane { width: f32, height: f32 },
    /// Flat closed polygon in the XY plane.
    Shape { outline: Vec<Vec2> },
    Sphere { radius: f32, segments: u32 },
    Cuboid { size: Vec3 },
    /// Cylinder along Y; a cone has a zero top radius.
    Cylinder { radius_top: f32, radius_bottom: f32, height: f32 },
    /// Torus around the Z axis.
    Torus { radius: f32, tube: f32 },
    /// Arrow from the origin along `direction`.
    Arrow { direction: Vec3, length: f32, head_length: f32, head_width: f32 },
}

impl Geometry {
    /// Local axis-aligned bounds `(min, max)`.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        match self {
            Geometry::Polyline { points } | Geometry::PointCloud { points, .. } => {
                points_bounds(points.iter().copied())
            }
            Geometry::Disc { radius, .. } => flat_bounds(*radius, *radius),
            Geometry::Ring { outer, .. } => flat_bounds(*outer, *outer),
            Geometry::Plane { width, height } => flat_bounds(width / 2.0, height / 2.0),
            Geometry::Shape { outline } => {
                points_bounds(outline.iter().map(|p| p.extend(0.0)))
            }
            Geometry::Sphere { radius, .. } => (Vec3::splat(-radius), Vec3::splat(*radius)),
            Geometry::Cuboid { size } => (-*size / 2.0, *size / 2.0),
            Geometry::Cylinder { radius_top, radius_bottom, height } => {
                let r = radius_top.max(*radius_bottom);
                (Vec3::new(-r, -height / 2.0, -r), Vec3::new(r, height / 2.0, r))
            }
            Geometry::Torus { radius, tube } => {
                let r = radius + tube;
                (Vec3::new(-r, -r, -tube), Vec3::new(r, r, *tube))
            }
            Geometry::Arrow { direction, length, head_width, .. } => {
                let tip = direction.normalize_or_zero() * *length;
                let (min, max) = points_bounds([Vec3::ZERO, tip].into_iter());
                (min - Vec3::splat(head_width / 2.0), max + Vec3::splat(head_width / 2.0))
            }
        }
    }

    /// Hit test in local space. Returns the ray parameter of the hit.
    pub fn hit(&self, ray: &Ray, pick: &PickParams) -> Option<f32> {
        match self {
            Geometry::Polyline { points } => points
                .windows(2)
                .filter_map(|seg| {
                    let (t, dist) = ray.closest_to_segment(seg[0], seg[1]);
                    (dist <= pick.line_threshold).then_some(t)
                })
                .min_by(f32::total_cmp),
            Geometry::PointCloud { points, .. } => points
                .iter()
                .filter_map(|&p| {
                    let (t, dist) = ray.closest_to_point(p);
                    (dist <= pick.point_threshold).then_some(t)
                })
                .min_by(f32::total_cmp),
            Geometry::Disc { radius, .. } => {
                flat_hit(ray).filter(|(_, p)| p.length() <= *radius).map(|(t, _)| t)
            }
            Geometry::Ring { inner, outer } => flat_hit(ray)
                .filter(|(_, p)| (*inner..=*outer).contains(&p.length()))
                .map(|(t, _)| t),
            Geometry::Plane { width, height } => flat_hit(ray)
                .filter(|(_, p)| p.x.abs() <= width / 2.0 && p.y.abs() <= height / 2.0)
                .map(|(t, _)| t),
            Geometry::Shape { outline } => flat_hit(ray)
                .filter(|(_, p)| point_in_polygon(*p, outline))
                .map(|(t, _)| t),
            Geometry::Sphere { radius, .. } => ray.intersect_sphere(Vec3::ZERO, *radius),
            Geometry::Cuboid { .. } | Geometry::Cylinder { .. } => {
                let (min, max) = self.bounds();
                ray.intersect_aabb(min, max)
            }
            Geometry::Torus { radius, tube } => (0..TORUS_PICK_SAMPLES)
                .filter_map(|i| {
                    let angle = i as f32 / TORUS_PICK_SAMPLES as f32 * TAU;
                    let center = Vec3::new(angle.cos(), angle.sin(), 0.0) * *radius;
                    let (t, dist) = ray.closest_to_point(center);
                    (dist <= tube + pick.gizmo_tolerance).then_some(t)
                })
                .min_by(f32::total_cmp),
            Geometry::Arrow { direction, length, head_width, .. } => {
                let tip = direction.normalize_or_zero() * *length;
                let (t, dist) = ray.closest_to_segment(Vec3::ZERO, tip);
                (dist <= head_width.max(pick.gizmo_tolerance)).then_some(t)
            }
        }
    }
}

fn points_bounds(points: impl Iterator<Item = Vec3>) -> (Vec3, Vec3) {
    let mut min = Vec3::splat(f32::INFINITY);
    let mut max = Vec3::splat(f32::NEG_INFINITY);
    for p in points {
        min = min.min(p);
        max = max.max(p);
    }
    if min.x > max.x {
        return (Vec3::ZERO, Vec3::ZERO);
    }
    (min, max)
}

fn flat_bounds(half_x: f32, half_y: f32) -> (Vec3, Vec3) {
    (Vec3::new(-half_x, -half_y, 0.0), Vec3::new(half_x, half_y, 0.0))
}

/// Intersection with the local z = 0 plane: `(t, point)`.
fn flat_hit(ray: &Ray) -> Option<(f32, Vec2)> {
    if ray.direction.z.abs() < 1e-9 {
        return None;
    }
    let t = -ray.origin.z / ray.direction.z;
    (t >= 0.0).then(|| (t, ray.at(t).truncate()))
}

/// Even-odd rule.
fn point_in_polygon(point: Vec2, outline: &[Vec2]) -> bool {
    let mut inside = false;
    let n = outline.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let a = outline[i];
        let b = outline[j];
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down_ray(x: f32, y: f32) -> Ray {
        Ray::new(Vec3::new(x, y, 5.0), Vec3::NEG_Z)
    }

    #[test]
    fn test_polyline_threshold() {
        let line = Geometry::Polyline { points: vec![Vec3::ZERO, Vec3::X] };
        let pick = PickParams::default();
        assert!(line.hit(&down_ray(0.5, 0.01), &pick).is_some());
        assert!(line.hit(&down_ray(0.5, 0.5), &pick).is_none());
    }

    #[test]
    fn test_disc_and_ring() {
        let pick = PickParams::default();
        let disc = Geometry::Disc { radius: 0.5, segments: 32 };
        assert!(disc.hit(&down_ray(0.3, 0.3), &pick).is_some());
        assert!(disc.hit(&down_ray(0.5, 0.5), &pick).is_none());

        let ring = Geometry::Ring { inner: 0.3, outer: 0.5 };
        assert!(ring.hit(&down_ray(0.0, 0.0), &pick).is_none());
        assert!(ring.hit(&down_ray(0.4, 0.0), &pick).is_some());
    }

    #[test]
    fn test_shape_polygon() {
        let triangle = Geometry::Shape {
            outline: vec![Vec2::new(0.0, 0.5), Vec2::new(-0.5, -0.5), Vec2::new(0.5, -0.5)],
        };
        let pick = PickParams::default();
        assert!(triangle.hit(&down_ray(0.0, 0.0), &pick).is_some());
        assert!(triangle.hit(&down_ray(0.45, 0.45), &pick).is_none());
    }

    #[test]
    fn test_torus_misses_center() {
        let torus = Geometry::Torus { radius: 2.0, tube: 0.02 };
        let pick = PickParams::default();
        assert!(torus.hit(&down_ray(0.0, 0.0), &pick).is_none());
        assert!(torus.hit(&down_ray(2.0, 0.0), &pick).is_some());
    }

    #[test]
    fn test_cuboid_bounds() {
        let cube = Geometry::Cuboid { size: Vec3::ONE };
        assert_eq!(cube.bounds(), (Vec3::splat(-0.5), Vec3::splat(0.5)));
        let t = cube.hit(&down_ray(0.0, 0.0), &PickParams::default()).unwrap();
        assert!((t - 4.5).abs() < 1e-5);
    }
}
