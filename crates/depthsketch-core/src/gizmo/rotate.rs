//! Rotate gizmo: one ring per axis, lying in the plane normal to it.

use super::{Axis, GIZMO_RENDER_ORDER, GizmoKind, part_name};
use crate::scene::{Geometry, Material, Node, NodeId, NodeTag, Scene};
use glam::{Quat, Vec3};
use std::f32::consts::FRAC_PI_2;

const RING_RADIUS: f32 = 2.0;
const RING_TUBE: f32 = 0.02;
const RING_OPACITY: f32 = 0.8;

/// Rotation taking the default ring, which lies in the XY plane, into the
/// plane normal to `axis`.
fn ring_orientation(axis: Axis) -> Quat {
    match axis {
        Axis::X => Quat::from_rotation_y(FRAC_PI_2),
        Axis::Y => Quat::from_rotation_x(FRAC_PI_2),
        Axis::Z => Quat::IDENTITY,
    }
}

pub(super) fn build(scene: &mut Scene, center: Vec3) -> NodeId {
    let gizmo = scene.add(Node::group(NodeTag::Gizmo).named("rotate").at(center));
    for axis in Axis::ALL {
        let material = scene.create_material(Material::translucent(axis.color(), RING_OPACITY));
        let ring = Node::mesh(
            NodeTag::Part,
            Geometry::Torus {
                radius: RING_RADIUS,
                tube: RING_TUBE,
            },
            material,
        )
        .named(part_name(axis, GizmoKind::Rotate))
        .rotated(ring_orientation(axis))
        .with_render_order(GIZMO_RENDER_ORDER);
        scene.insert(ring, Some(gizmo));
    }
    gizmo
}
