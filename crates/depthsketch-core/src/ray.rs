//! Rays and planes used for picking and drag interaction.

use glam::{Mat4, Vec3};

const EPSILON: f32 = 1e-6;

/// A half-line starting at `origin`.
///
/// The direction is normalized by [`Ray::new`]. Rays moved into an object's
/// local space keep a scaled direction so that ray parameters stay comparable
/// between spaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray with a normalized direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point at parameter `t`.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Transform the ray by an affine matrix without renormalizing.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        Self {
            origin: matrix.transform_point3(self.origin),
            direction: matrix.transform_vector3(self.direction),
        }
    }

    /// Intersection with a plane in front of the origin.
    pub fn intersect_plane(&self, plane: &Plane) -> Option<Vec3> {
        let denom = plane.normal.dot(self.direction);
        if denom.abs() < EPSILON {
            // Parallel: only hits when the origin already lies on the plane.
            return (plane.distance_to(self.origin).abs() < EPSILON).then_some(self.origin);
        }
        let t = -(self.origin.dot(plane.normal) + plane.constant) / denom;
        (t >= 0.0).then(|| self.at(t))
    }

    /// Closest approach to a point: `(t, distance)`.
    pub fn closest_to_point(&self, point: Vec3) -> (f32, f32) {
        let len_sq = self.direction.length_squared();
        if len_sq < EPSILON {
            return (0.0, self.origin.distance(point));
        }
        let t = ((point - self.origin).dot(self.direction) / len_sq).max(0.0);
        (t, self.at(t).distance(point))
    }

    /// Closest approach to the segment `a..b`: `(t, distance)`.
    pub fn closest_to_segment(&self, a: Vec3, b: Vec3) -> (f32, f32) {
        let d1 = self.direction;
        let d2 = b - a;
        let r = self.origin - a;
        let aa = d1.length_squared();
        let e = d2.length_squared();
        if aa < EPSILON {
            return (0.0, distance_to_segment(self.origin, a, b));
        }
        if e < EPSILON {
            return self.closest_to_point(a);
        }
        let f = d2.dot(r);
        let c = d1.dot(r);
        let bb = d1.dot(d2);
        let denom = aa * e - bb * bb;

        let mut s = if denom.abs() > EPSILON {
            ((bb * f - c * e) / denom).max(0.0)
        } else {
            0.0
        };
        let mut t = (bb * s + f) / e;
        if t < 0.0 {
            t = 0.0;
            s = (-c / aa).max(0.0);
        } else if t > 1.0 {
            t = 1.0;
            s = ((bb - c) / aa).max(0.0);
        }
        (s, self.at(s).distance(a + d2 * t))
    }

    /// Entry parameter into an axis-aligned box, or exit when starting inside.
    pub fn intersect_aabb(&self, min: Vec3, max: Vec3) -> Option<f32> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;
        for axis in 0..3 {
            let origin = self.origin[axis];
            let dir = self.direction[axis];
            if dir.abs() < EPSILON {
                if origin < min[axis] || origin > max[axis] {
                    return None;
                }
                continue;
            }
            let t1 = (min[axis] - origin) / dir;
            let t2 = (max[axis] - origin) / dir;
            t_min = t_min.max(t1.min(t2));
            t_max = t_max.min(t1.max(t2));
        }
        if t_max < t_min || t_max < 0.0 {
            return None;
        }
        Some(if t_min >= 0.0 { t_min } else { t_max })
    }

    /// Nearest intersection with a sphere.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let a = self.direction.length_squared();
        let b = 2.0 * oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 || a < EPSILON {
            return None;
        }
        let sqrt = disc.sqrt();
        let near = (-b - sqrt) / (2.0 * a);
        let far = (-b + sqrt) / (2.0 * a);
        if near >= 0.0 {
            Some(near)
        } else if far >= 0.0 {
            Some(far)
        } else {
            None
        }
    }
}

fn distance_to_segment(point: Vec3, a: Vec3, b: Vec3) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < EPSILON {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}

/// A plane `normal · p + constant = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub constant: f32,
}

impl Plane {
    /// Plane through `point` with the given normal.
    pub fn from_normal_and_point(normal: Vec3, point: Vec3) -> Self {
        let normal = normal.normalize_or_zero();
        Self {
            normal,
            constant: -normal.dot(point),
        }
    }

    /// Signed distance from the plane.
    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.constant
    }
}
