//! Selection and the gizmo-driven transform state machine.
//!
//! Three mutually exclusive modes share one selection set. A mode's gizmo
//! exists only while that mode is active and the selection is non-empty.
//! Dragging a gizmo part starts a [`DragSession`] that lives until the
//! pointer is released.

use crate::camera::{Camera, ViewMode};
use crate::config::CanvasConfig;
use crate::gizmo::{self, Axis, GizmoKind};
use crate::input::Modifiers;
use crate::ray::{Plane, Ray};
use crate::scene::{Geometry, Material, Node, NodeId, NodeTag, Scene, Transform};
use glam::{Quat, Vec3};
use kurbo::Point;
use std::collections::HashMap;

const SELECTION_OPACITY: f32 = 0.5;

/// Active transform mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransformMode {
    #[default]
    Idle,
    /// Select and move objects.
    Translate,
    Rotate,
    Scale,
}

impl TransformMode {
    pub fn gizmo_kind(self) -> Option<GizmoKind> {
        match self {
            TransformMode::Idle => None,
            TransformMode::Translate => Some(GizmoKind::Translate),
            TransformMode::Rotate => Some(GizmoKind::Rotate),
            TransformMode::Scale => Some(GizmoKind::Scale),
        }
    }
}

/// Scene access needed to handle a pointer event.
pub struct TransformContext<'a> {
    pub scene: &'a mut Scene,
    pub camera: &'a Camera,
    pub config: &'a CanvasConfig,
    pub view_mode: ViewMode,
}

/// State captured when a gizmo drag starts.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub axis: Axis,
    pub plane: Plane,
    pub kind: DragKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragKind {
    Translate {
        /// Grab point relative to the gizmo centre.
        offset: Vec3,
        start_center: Vec3,
        start_positions: Vec<(NodeId, Vec3)>,
    },
    Rotate {
        center: Vec3,
        last_angle: f32,
    },
    Scale {
        start_point: Vec3,
        start_scales: Vec<(NodeId, Vec3)>,
    },
}

/// Selection set, overlays and drag state.
#[derive(Debug, Clone, Default)]
pub struct TransformEngine {
    mode: TransformMode,
    /// Selected top-level nodes in selection order.
    selection: Vec<NodeId>,
    /// Selected node -> its selection box overlay.
    selection_boxes: HashMap<NodeId, NodeId>,
    gizmo: Option<NodeId>,
    drag: Option<DragSession>,
}

impl TransformEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> TransformMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.mode != TransformMode::Idle
    }

    pub fn selection(&self) -> &[NodeId] {
        &self.selection
    }

    pub fn gizmo(&self) -> Option<NodeId> {
        self.gizmo
    }

    pub fn selection_box(&self, node: NodeId) -> Option<NodeId> {
        self.selection_boxes.get(&node).copied()
    }

    pub fn drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Enter `mode`, or return to idle if it is already active.
    ///
    /// Switching between modes keeps the selection and swaps the gizmo.
    pub fn toggle_mode(&mut self, scene: &mut Scene, mode: TransformMode) {
        if mode == self.mode || mode == TransformMode::Idle {
            self.exit(scene);
            return;
        }
        self.drag = None;
        self.mode = mode;
        self.rebuild_gizmo(scene);
        log::info!("Entered {mode:?} mode");
    }

    /// Return to idle, clearing selection, boxes and gizmo.
    pub fn exit(&mut self, scene: &mut Scene) {
        self.clear_selection(scene);
        if self.mode != TransformMode::Idle {
            log::info!("Left {:?} mode", self.mode);
        }
        self.mode = TransformMode::Idle;
    }

    /// Handle a left press. Returns false when no mode is active.
    pub fn pointer_down(
        &mut self,
        ctx: &mut TransformContext<'_>,
        position: Point,
        modifiers: Modifiers,
    ) -> bool {
        if !self.is_active() {
            return false;
        }
        let ray = ctx.camera.ray_from_screen(position, ctx.config.viewport);

        if let Some(gizmo_id) = self.gizmo {
            let hit_axis = ctx
                .scene
                .raycast(&ray, &[gizmo_id], &ctx.config.pick)
                .first()
                .and_then(|hit| gizmo::part_axis(ctx.scene, gizmo_id, hit.node));
            if let Some(axis) = hit_axis {
                self.start_drag(ctx, &ray, gizmo_id, axis);
                return true;
            }
        }

        let candidates: Vec<NodeId> = ctx
            .scene
            .roots()
            .iter()
            .copied()
            .filter(|&id| ctx.scene.node(id).is_some_and(|node| node.tag.is_content()))
            .collect();
        let picked = ctx
            .scene
            .raycast(&ray, &candidates, &ctx.config.pick)
            .first()
            .map(|hit| hit.candidate);

        match picked {
            Some(target) => {
                self.select(ctx.scene, target, modifiers.ctrl);
            }
            None if !modifiers.ctrl => self.clear_selection(ctx.scene),
            None => {}
        }
        true
    }

    fn start_drag(
        &mut self,
        ctx: &TransformContext<'_>,
        ray: &Ray,
        gizmo_id: NodeId,
        axis: Axis,
    ) {
        let center = ctx
            .scene
            .node(gizmo_id)
            .map(|node| node.transform.position)
            .unwrap_or(Vec3::ZERO);
        let view = ctx.camera.world_direction();

        let session = match self.mode {
            TransformMode::Translate => {
                let plane = Plane::from_normal_and_point(axis.drag_plane_normal(view), center);
                let offset = ray.intersect_plane(&plane).map(|p| p - center).unwrap_or(Vec3::ZERO);
                DragSession {
                    axis,
                    plane,
                    kind: DragKind::Translate {
                        offset,
                        start_center: center,
                        start_positions: self.snapshot(ctx.scene, |t| t.position),
                    },
                }
            }
            TransformMode::Rotate => {
                let plane = Plane::from_normal_and_point(axis.unit(), center);
                let last_angle = ray
                    .intersect_plane(&plane)
                    .map(|p| axis.plane_angle(p - center))
                    .unwrap_or(0.0);
                DragSession {
                    axis,
                    plane,
                    kind: DragKind::Rotate { center, last_angle },
                }
            }
            TransformMode::Scale => {
                let plane = Plane::from_normal_and_point(axis.drag_plane_normal(view), center);
                DragSession {
                    axis,
                    plane,
                    kind: DragKind::Scale {
                        start_point: ray.intersect_plane(&plane).unwrap_or(center),
                        start_scales: self.snapshot(ctx.scene, |t| t.scale),
                    },
                }
            }
            TransformMode::Idle => return,
        };
        log::debug!("Started {:?} drag on {} axis", self.mode, axis.name());
        self.drag = Some(session);
    }

    fn snapshot(&self, scene: &Scene, field: impl Fn(&Transform) -> Vec3) -> Vec<(NodeId, Vec3)> {
        self.selection
            .iter()
            .filter_map(|&id| scene.node(id).map(|node| (id, field(&node.transform))))
            .collect()
    }

    /// Apply a pointer move to the active drag. Returns whether a drag is
    /// in progress.
    pub fn pointer_move(&mut self, ctx: &mut TransformContext<'_>, position: Point) -> bool {
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };
        let ray = ctx.camera.ray_from_screen(position, ctx.config.viewport);
        let Some(hit) = ray.intersect_plane(&drag.plane) else {
            return true;
        };
        let axis = drag.axis;

        match &mut drag.kind {
            DragKind::Translate {
                offset,
                start_center,
                start_positions,
            } => {
                let delta = (hit - *offset) - *start_center;
                for (id, start) in start_positions.iter() {
                    let mut position = *start + axis.unit() * axis.component(delta);
                    if ctx.view_mode == ViewMode::TwoD {
                        position.z = 0.0;
                    }
                    if let Some(node) = ctx.scene.node_mut(*id) {
                        node.transform.position = position;
                    }
                }
            }
            DragKind::Rotate { center, last_angle } => {
                let angle = axis.plane_angle(hit - *center);
                let delta = angle - *last_angle;
                *last_angle = angle;
                let turn = Quat::from_axis_angle(axis.unit(), delta);
                for id in &self.selection {
                    if let Some(node) = ctx.scene.node_mut(*id) {
                        node.transform.rotation = (turn * node.transform.rotation).normalize();
                    }
                }
            }
            DragKind::Scale {
                start_point,
                start_scales,
            } => {
                let delta = hit - *start_point;
                let factor = (1.0 + axis.component(delta) * ctx.config.scale_sensitivity)
                    .max(ctx.config.min_scale);
                for (id, start) in start_scales.iter() {
                    let mut scale = *start;
                    axis.set_component(&mut scale, axis.component(*start) * factor);
                    if let Some(node) = ctx.scene.node_mut(*id) {
                        node.transform.scale = scale;
                    }
                }
            }
        }

        self.sync_selection_boxes(ctx.scene);
        if matches!(self.mode, TransformMode::Translate | TransformMode::Scale) {
            self.recenter_gizmo(ctx.scene);
        }
        true
    }

    /// End the active drag. Returns whether one was in progress.
    pub fn pointer_up(&mut self) -> bool {
        self.drag.take().is_some()
    }

    /// Add, toggle or replace the selection with a top-level content node.
    ///
    /// A plain select of an already selected node keeps the selection.
    pub fn select(&mut self, scene: &mut Scene, target: NodeId, toggle: bool) -> bool {
        let is_content_root = scene
            .node(target)
            .is_some_and(|node| node.parent().is_none() && node.tag.is_content());
        if !is_content_root {
            return false;
        }
        let selected = self.selection.contains(&target);
        if toggle {
            if selected {
                self.selection.retain(|&id| id != target);
                self.remove_selection_box(scene, target);
            } else {
                self.selection.push(target);
                self.add_selection_box(scene, target);
            }
        } else if !selected {
            self.remove_all_selection_boxes(scene);
            self.selection = vec![target];
            self.add_selection_box(scene, target);
        }
        self.rebuild_gizmo(scene);
        true
    }

    /// Drop the selection, its boxes, the gizmo and any drag.
    pub fn clear_selection(&mut self, scene: &mut Scene) {
        self.remove_all_selection_boxes(scene);
        self.selection.clear();
        self.remove_gizmo(scene);
        self.drag = None;
    }

    /// Remove every selected node from the scene. Returns the removed ids.
    pub fn delete_selected(&mut self, scene: &mut Scene) -> Vec<NodeId> {
        let removed = std::mem::take(&mut self.selection);
        for &id in &removed {
            self.remove_selection_box(scene, id);
            scene.remove(id);
        }
        self.clear_selection(scene);
        if !removed.is_empty() {
            log::info!("Deleted {} selected objects", removed.len());
        }
        removed
    }

    /// Drop nodes that were removed from the scene by someone else.
    pub fn forget(&mut self, scene: &mut Scene, removed: &[NodeId]) {
        let before = self.selection.len();
        self.selection.retain(|id| !removed.contains(id));
        if self.selection.len() == before {
            return;
        }
        for id in removed {
            self.remove_selection_box(scene, *id);
        }
        self.drag = None;
        self.rebuild_gizmo(scene);
    }

    fn rebuild_gizmo(&mut self, scene: &mut Scene) {
        self.remove_gizmo(scene);
        let Some(kind) = self.mode.gizmo_kind() else {
            return;
        };
        if let Some(center) = self.centroid(scene) {
            self.gizmo = Some(kind.build(scene, center));
        }
    }

    fn remove_gizmo(&mut self, scene: &mut Scene) {
        if let Some(gizmo) = self.gizmo.take() {
            scene.remove(gizmo);
        }
    }

    fn recenter_gizmo(&mut self, scene: &mut Scene) {
        let Some(center) = self.centroid(scene) else {
            return;
        };
        if let Some(node) = self.gizmo.and_then(|gizmo| scene.node_mut(gizmo)) {
            node.transform.position = center;
        }
    }

    /// Mean position of the selected nodes.
    fn centroid(&self, scene: &Scene) -> Option<Vec3> {
        let positions: Vec<Vec3> = self
            .selection
            .iter()
            .filter_map(|&id| scene.node(id).map(|node| node.transform.position))
            .collect();
        if positions.is_empty() {
            return None;
        }
        Some(positions.iter().sum::<Vec3>() / positions.len() as f32)
    }

    fn add_selection_box(&mut self, scene: &mut Scene, target: NodeId) {
        if self.selection_boxes.contains_key(&target) {
            return;
        }
        let Some(transform) = scene.node(target).map(|node| node.transform) else {
            return;
        };
        let (min, max) = scene.local_bounds(target).unwrap_or((Vec3::ZERO, Vec3::ZERO));
        let mut root = Node::group(NodeTag::SelectionBox);
        root.transform = transform;
        let root = scene.add(root);

        let material = scene.create_material(
            Material::translucent(gizmo::colors::SELECTION, SELECTION_OPACITY)
                .double_sided()
                .wireframe(),
        );
        scene.insert(
            Node::mesh(NodeTag::Part, Geometry::Cuboid { size: max - min }, material)
                .at((min + max) / 2.0),
            Some(root),
        );
        self.selection_boxes.insert(target, root);
    }

    fn remove_selection_box(&mut self, scene: &mut Scene, target: NodeId) {
        if let Some(overlay) = self.selection_boxes.remove(&target) {
            scene.remove(overlay);
        }
    }

    fn remove_all_selection_boxes(&mut self, scene: &mut Scene) {
        for (_, overlay) in self.selection_boxes.drain() {
            scene.remove(overlay);
        }
    }

    fn sync_selection_boxes(&self, scene: &mut Scene) {
        for (&target, &overlay) in &self.selection_boxes {
            let Some(transform) = scene.node(target).map(|node| node.transform) else {
                continue;
            };
            if let Some(node) = scene.node_mut(overlay) {
                node.transform = transform;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Color;
    use kurbo::Size;

    struct Fixture {
        scene: Scene,
        camera: Camera,
        config: CanvasConfig,
        engine: TransformEngine,
    }

    impl Fixture {
        fn new() -> Self {
            let config = CanvasConfig {
                viewport: Size::new(800.0, 800.0),
                ..CanvasConfig::default()
            };
            let mut camera = Camera::new(config.viewport);
            camera.position = Vec3::new(0.0, 0.0, 10.0);
            Self {
                scene: Scene::new(),
                camera,
                config,
                engine: TransformEngine::new(),
            }
        }

        fn cube(&mut self, position: Vec3) -> NodeId {
            let material = self.scene.create_material(Material::basic(Color::black()));
            self.scene.add(
                Node::mesh(NodeTag::Primitive, Geometry::Cuboid { size: Vec3::ONE }, material)
                    .at(position),
            )
        }

        fn screen(&self, world: Vec3) -> Point {
            self.camera.world_to_screen(world, self.config.viewport).unwrap()
        }

        fn down(&mut self, world: Vec3, modifiers: Modifiers) -> bool {
            let position = self.screen(world);
            let mut ctx = TransformContext {
                scene: &mut self.scene,
                camera: &self.camera,
                config: &self.config,
                view_mode: ViewMode::ThreeD,
            };
            self.engine.pointer_down(&mut ctx, position, modifiers)
        }

        fn drag_to(&mut self, world: Vec3) -> bool {
            let position = self.screen(world);
            let mut ctx = TransformContext {
                scene: &mut self.scene,
                camera: &self.camera,
                config: &self.config,
                view_mode: ViewMode::ThreeD,
            };
            self.engine.pointer_move(&mut ctx, position)
        }
    }

    const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };

    #[test]
    fn test_idle_ignores_pointer() {
        let mut fx = Fixture::new();
        let cube = fx.cube(Vec3::ZERO);
        assert!(!fx.down(Vec3::ZERO, Modifiers::NONE));
        assert!(fx.engine.selection().is_empty());
        assert!(fx.scene.contains(cube));
    }

    #[test]
    fn test_click_selects_and_builds_gizmo() {
        let mut fx = Fixture::new();
        let cube = fx.cube(Vec3::new(-3.0, 0.0, 0.0));
        fx.engine.toggle_mode(&mut fx.scene, TransformMode::Translate);
        assert!(fx.engine.gizmo().is_none());

        fx.down(Vec3::new(-3.0, 0.0, 0.5), Modifiers::NONE);
        assert_eq!(fx.engine.selection(), &[cube]);
        assert!(fx.engine.selection_box(cube).is_some());
        let gizmo = fx.engine.gizmo().unwrap();
        let center = fx.scene.node(gizmo).unwrap().transform.position;
        assert!((center - Vec3::new(-3.0, 0.0, 0.0)).length() < 1e-6);

        // Empty space clears everything.
        fx.down(Vec3::new(3.0, 3.0, 0.0), Modifiers::NONE);
        assert!(fx.engine.selection().is_empty());
        assert!(fx.engine.gizmo().is_none());
        assert!(!fx.scene.contains(gizmo));
    }

    #[test]
    fn test_ctrl_click_toggles_membership() {
        let mut fx = Fixture::new();
        let a = fx.cube(Vec3::new(-3.0, 0.0, 0.0));
        let b = fx.cube(Vec3::new(3.0, 0.0, 0.0));
        fx.engine.toggle_mode(&mut fx.scene, TransformMode::Scale);

        fx.down(Vec3::new(-3.0, 0.0, 0.5), Modifiers::NONE);
        fx.down(Vec3::new(3.0, 0.0, 0.5), CTRL);
        assert_eq!(fx.engine.selection(), &[a, b]);
        let gizmo = fx.engine.gizmo().unwrap();
        assert!(fx.scene.node(gizmo).unwrap().transform.position.length() < 1e-6);

        fx.down(Vec3::new(-3.0, 0.0, 0.5), CTRL);
        assert_eq!(fx.engine.selection(), &[b]);
        assert!(fx.engine.selection_box(a).is_none());

        // Ctrl-click on empty space keeps the selection.
        fx.down(Vec3::new(0.0, 3.5, 0.0), CTRL);
        assert_eq!(fx.engine.selection(), &[b]);
    }

    #[test]
    fn test_switching_modes_keeps_selection() {
        let mut fx = Fixture::new();
        let cube = fx.cube(Vec3::new(-3.0, 0.0, 0.0));
        fx.engine.toggle_mode(&mut fx.scene, TransformMode::Translate);
        fx.down(Vec3::new(-3.0, 0.0, 0.5), Modifiers::NONE);
        let translate_gizmo = fx.engine.gizmo().unwrap();

        fx.engine.toggle_mode(&mut fx.scene, TransformMode::Rotate);
        assert_eq!(fx.engine.mode(), TransformMode::Rotate);
        assert_eq!(fx.engine.selection(), &[cube]);
        assert!(!fx.scene.contains(translate_gizmo));
        let rotate_gizmo = fx.engine.gizmo().unwrap();
        assert_eq!(fx.scene.node(rotate_gizmo).unwrap().name, "rotate");

        fx.engine.toggle_mode(&mut fx.scene, TransformMode::Rotate);
        assert_eq!(fx.engine.mode(), TransformMode::Idle);
        assert!(fx.engine.selection().is_empty());
        assert_eq!(fx.scene.len(), 1);
    }

    #[test]
    fn test_delete_selected_disposes() {
        let mut fx = Fixture::new();
        let cube = fx.cube(Vec3::new(-3.0, 0.0, 0.0));
        fx.engine.toggle_mode(&mut fx.scene, TransformMode::Translate);
        fx.down(Vec3::new(-3.0, 0.0, 0.5), Modifiers::NONE);

        assert_eq!(fx.engine.delete_selected(&mut fx.scene), vec![cube]);
        assert!(fx.scene.is_empty());
        assert_eq!(fx.scene.live_material_count(), 0);
        assert!(fx.engine.gizmo().is_none());
        assert!(fx.engine.delete_selected(&mut fx.scene).is_empty());
    }

    #[test]
    fn test_translate_drag_moves_along_axis_only() {
        let mut fx = Fixture::new();
        let cube = fx.cube(Vec3::new(-3.0, 0.0, 0.0));
        fx.engine.toggle_mode(&mut fx.scene, TransformMode::Translate);
        fx.down(Vec3::new(-3.0, 0.0, 0.5), Modifiers::NONE);

        // Grab the x arrow halfway along.
        assert!(fx.down(Vec3::new(-2.0, 0.0, 0.0), Modifiers::NONE));
        assert!(fx.engine.is_dragging());
        assert!(fx.drag_to(Vec3::new(-1.0, 0.7, 0.0)));

        let position = fx.scene.node(cube).unwrap().transform.position;
        assert!((position - Vec3::new(-2.0, 0.0, 0.0)).length() < 1e-3);
        let overlay = fx.engine.selection_box(cube).unwrap();
        assert_eq!(fx.scene.node(overlay).unwrap().transform.position, position);

        assert!(fx.engine.pointer_up());
        assert!(!fx.engine.pointer_up());
    }
}
