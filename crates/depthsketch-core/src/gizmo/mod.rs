//! Transform gizmos for visual manipulation.
//!
//! A gizmo is a transient top-level node with one named part per axis. The
//! part names (`x-axis`, `y-rotation`, `z-scale`, ...) identify the axis a
//! drag acts on.

mod rotate;
mod scale;
mod translate;

use crate::scene::{Color, NodeId, Scene};
use glam::Vec3;

/// Render order of gizmo parts, drawn above strokes.
pub const GIZMO_RENDER_ORDER: i32 = 2;

/// Gizmo axis colors.
pub mod colors {
    use crate::scene::Color;

    pub const X_AXIS: Color = Color::new(0xff, 0x00, 0x00);
    pub const Y_AXIS: Color = Color::new(0x00, 0xff, 0x00);
    pub const Z_AXIS: Color = Color::new(0x00, 0x00, 0xff);
    pub const SELECTION: Color = Color::new(0xff, 0xa5, 0x00);
}

/// A world axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Axis::X => colors::X_AXIS,
            Axis::Y => colors::Y_AXIS,
            Axis::Z => colors::Z_AXIS,
        }
    }

    pub fn component(self, v: Vec3) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }

    pub fn set_component(self, v: &mut Vec3, value: f32) {
        match self {
            Axis::X => v.x = value,
            Axis::Y => v.y = value,
            Axis::Z => v.z = value,
        }
    }

    /// Angle of a point around this axis, measured in the plane normal to it.
    pub fn plane_angle(self, relative: Vec3) -> f32 {
        match self {
            Axis::X => relative.z.atan2(relative.y),
            Axis::Y => relative.x.atan2(relative.z),
            Axis::Z => relative.y.atan2(relative.x),
        }
    }

    /// Axis encoded in a gizmo part name such as `y-rotation`.
    pub fn from_part_name(name: &str) -> Option<Axis> {
        match name.split('-').next()? {
            "x" => Some(Axis::X),
            "y" => Some(Axis::Y),
            "z" => Some(Axis::Z),
            _ => None,
        }
    }

    /// Normal of the plane a handle along this axis is dragged on: it
    /// contains the axis and faces the viewer as much as possible.
    pub fn drag_plane_normal(self, view_direction: Vec3) -> Vec3 {
        let axis = self.unit();
        let normal = axis.cross(view_direction).cross(axis);
        if normal.length_squared() < 1e-12 {
            // Looking straight down the axis.
            return axis.any_orthonormal_vector();
        }
        normal.normalize()
    }
}

/// The three gizmo variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GizmoKind {
    Translate,
    Rotate,
    Scale,
}

impl GizmoKind {
    /// Suffix of the part names of this gizmo.
    pub fn part_suffix(self) -> &'static str {
        match self {
            GizmoKind::Translate => "axis",
            GizmoKind::Rotate => "rotation",
            GizmoKind::Scale => "scale",
        }
    }

    /// Add the gizmo to the scene at `center`.
    pub fn build(self, scene: &mut Scene, center: Vec3) -> NodeId {
        match self {
            GizmoKind::Translate => translate::build(scene, center),
            GizmoKind::Rotate => rotate::build(scene, center),
            GizmoKind::Scale => scale::build(scene, center),
        }
    }
}

fn part_name(axis: Axis, kind: GizmoKind) -> String {
    format!("{}-{}", axis.name(), kind.part_suffix())
}

/// Axis of the gizmo part that contains `hit`.
pub fn part_axis(scene: &Scene, gizmo: NodeId, hit: NodeId) -> Option<Axis> {
    let mut current = scene.node(hit)?;
    while current.parent() != Some(gizmo) {
        current = scene.node(current.parent()?)?;
    }
    Axis::from_part_name(&current.name)
}
