//! Translate gizmo: one arrow per axis.

use super::{Axis, GIZMO_RENDER_ORDER, GizmoKind, part_name};
use crate::scene::{Geometry, Material, Node, NodeId, NodeTag, Scene};
use glam::Vec3;

const ARROW_LENGTH: f32 = 2.0;
const ARROW_HEAD_LENGTH: f32 = 0.4;
const ARROW_HEAD_WIDTH: f32 = 0.2;
const ARROW_OPACITY: f32 = 0.8;

pub(super) fn build(scene: &mut Scene, center: Vec3) -> NodeId {
    let gizmo = scene.add(Node::group(NodeTag::Gizmo).named("translate").at(center));
    for axis in Axis::ALL {
        let material = scene.create_material(Material::translucent(axis.color(), ARROW_OPACITY));
        let arrow = Node::mesh(
            NodeTag::Part,
            Geometry::Arrow {
                direction: axis.unit(),
                length: ARROW_LENGTH,
                head_length: ARROW_HEAD_LENGTH,
                head_width: ARROW_HEAD_WIDTH,
            },
            material,
        )
        .named(part_name(axis, GizmoKind::Translate))
        .with_render_order(GIZMO_RENDER_ORDER);
        scene.insert(arrow, Some(gizmo));
    }
    gizmo
}
