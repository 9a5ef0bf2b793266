//! Scale gizmo: a line ending in a box handle per axis.

use super::{Axis, GIZMO_RENDER_ORDER, GizmoKind, part_name};
use crate::scene::{Geometry, Material, Node, NodeId, NodeTag, Scene};
use glam::Vec3;

const HANDLE_DISTANCE: f32 = 2.0;
const HANDLE_SIZE: f32 = 0.3;

pub(super) fn build(scene: &mut Scene, center: Vec3) -> NodeId {
    let gizmo = scene.add(Node::group(NodeTag::Gizmo).named("scale").at(center));
    for axis in Axis::ALL {
        let Some(handle) = scene.insert(
            Node::group(NodeTag::Part).named(part_name(axis, GizmoKind::Scale)),
            Some(gizmo),
        ) else {
            continue;
        };
        let tip = axis.unit() * HANDLE_DISTANCE;

        // Handles stay visible through other geometry.
        let line_material = scene.create_material(Material::basic(axis.color()).without_depth_test());
        scene.insert(
            Node::mesh(
                NodeTag::Part,
                Geometry::Polyline {
                    points: vec![Vec3::ZERO, tip],
                },
                line_material,
            )
            .with_render_order(GIZMO_RENDER_ORDER),
            Some(handle),
        );

        let box_material = scene.create_material(Material::basic(axis.color()).without_depth_test());
        scene.insert(
            Node::mesh(
                NodeTag::Part,
                Geometry::Cuboid {
                    size: Vec3::splat(HANDLE_SIZE),
                },
                box_material,
            )
            .at(tip)
            .with_render_order(GIZMO_RENDER_ORDER),
            Some(handle),
        );
    }
    gizmo
}
