//! The canvas: application state and the operations the UI calls.

use crate::brush::{BrushType, Brushes};
use crate::camera::{Camera, ViewMode};
use crate::config::CanvasConfig;
use crate::drawing::{DrawContext, DrawingEngine};
use crate::error::ParseError;
use crate::history::StrokeHistory;
use crate::input::{Command, KeyEvent, MouseButton, PointerEvent};
use crate::layers::LayerRegistry;
use crate::primitives::PrimitiveKind;
use crate::scene::{Color, Geometry, Material, Node, NodeId, NodeTag, Scene};
use crate::transform::{TransformContext, TransformEngine, TransformMode};
use kurbo::Point;

/// Entry of the object panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectEntry {
    pub id: NodeId,
    pub tag: NodeTag,
    pub name: &'static str,
}

/// Objects of one layer, grouped for the object panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectList {
    pub primitives: Vec<ObjectEntry>,
    /// Stroke segments of every brush.
    pub lines: Vec<ObjectEntry>,
    pub other: Vec<ObjectEntry>,
}

impl ObjectList {
    pub fn len(&self) -> usize {
        self.primitives.len() + self.lines.len() + self.other.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The drawing canvas.
///
/// Owns the scene graph and every piece of interaction state. All
/// operations are silent no-ops when their preconditions do not hold.
#[derive(Debug, Clone)]
pub struct Canvas {
    config: CanvasConfig,
    scene: Scene,
    camera: Camera,
    view_mode: ViewMode,
    brushes: Brushes,
    primitive_color: Color,
    history: StrokeHistory,
    layers: LayerRegistry,
    drawing: DrawingEngine,
    transform: TransformEngine,
    /// Fixed plane 2D strokes are painted on.
    drawing_plane: NodeId,
    /// Last pointer position of an orbit drag.
    orbit: Option<Point>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl Canvas {
    /// Create an empty canvas in 2D mode without layers.
    pub fn new(config: CanvasConfig) -> Self {
        Self::with_drawing(config, DrawingEngine::new())
    }

    /// Canvas with reproducible spray scatter.
    pub fn with_seed(config: CanvasConfig, seed: u64) -> Self {
        Self::with_drawing(config, DrawingEngine::with_seed(seed))
    }

    fn with_drawing(config: CanvasConfig, drawing: DrawingEngine) -> Self {
        let mut scene = Scene::new();
        let (width, height) = config.drawing_plane_size();
        let material = scene.create_material(Material::basic(Color::white()).double_sided());
        let drawing_plane = scene.add(
            Node::mesh(NodeTag::Background, Geometry::Plane { width, height }, material)
                .named("drawing-plane"),
        );
        let mut camera = Camera::new(config.viewport);
        camera.apply_preset(ViewMode::TwoD);
        Self {
            primitive_color: config.primitive_color,
            config,
            scene,
            camera,
            view_mode: ViewMode::TwoD,
            brushes: Brushes::new(),
            history: StrokeHistory::new(),
            layers: LayerRegistry::new(),
            drawing,
            transform: TransformEngine::new(),
            drawing_plane,
            orbit: None,
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn brushes(&self) -> &Brushes {
        &self.brushes
    }

    pub fn primitive_color(&self) -> Color {
        self.primitive_color
    }

    pub fn history(&self) -> &StrokeHistory {
        &self.history
    }

    pub fn layers(&self) -> &LayerRegistry {
        &self.layers
    }

    pub fn transform(&self) -> &TransformEngine {
        &self.transform
    }

    pub fn mode(&self) -> TransformMode {
        self.transform.mode()
    }

    pub fn drawing_plane(&self) -> NodeId {
        self.drawing_plane
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing.is_drawing()
    }

    // --- Input ---

    /// Route a pointer event to orbiting, the transform engine or drawing.
    pub fn handle_pointer(&mut self, event: &PointerEvent) {
        match *event {
            PointerEvent::Down {
                position,
                button,
                modifiers,
                ..
            } => {
                if button == MouseButton::Right
                    && modifiers.shift
                    && self.view_mode == ViewMode::ThreeD
                {
                    self.drawing.end();
                    self.orbit = Some(position);
                    return;
                }
                if button != MouseButton::Left {
                    return;
                }
                if self.transform.is_active() {
                    let mut ctx = TransformContext {
                        scene: &mut self.scene,
                        camera: &self.camera,
                        config: &self.config,
                        view_mode: self.view_mode,
                    };
                    self.transform.pointer_down(&mut ctx, position, modifiers);
                } else {
                    let ctx = DrawContext {
                        scene: &mut self.scene,
                        layers: &mut self.layers,
                        history: &mut self.history,
                        camera: &self.camera,
                        brushes: &self.brushes,
                        config: &self.config,
                        view_mode: self.view_mode,
                        drawing_plane: self.drawing_plane,
                    };
                    self.drawing.start(&ctx, position, button);
                }
            }
            PointerEvent::Move { position, time_ms } => {
                if let Some(last) = self.orbit {
                    self.camera.orbit(position - last, self.config.orbit_speed);
                    self.orbit = Some(position);
                } else if self.transform.is_dragging() {
                    let mut ctx = TransformContext {
                        scene: &mut self.scene,
                        camera: &self.camera,
                        config: &self.config,
                        view_mode: self.view_mode,
                    };
                    self.transform.pointer_move(&mut ctx, position);
                } else if self.drawing.is_drawing() {
                    let mut ctx = DrawContext {
                        scene: &mut self.scene,
                        layers: &mut self.layers,
                        history: &mut self.history,
                        camera: &self.camera,
                        brushes: &self.brushes,
                        config: &self.config,
                        view_mode: self.view_mode,
                        drawing_plane: self.drawing_plane,
                    };
                    self.drawing.continue_stroke(&mut ctx, position, time_ms);
                }
            }
            PointerEvent::Up { button, .. } => match button {
                MouseButton::Right => self.orbit = None,
                MouseButton::Left => {
                    self.transform.pointer_up();
                    self.drawing.end();
                }
                MouseButton::Middle => {}
            },
            PointerEvent::Leave => {
                self.drawing.end();
                self.orbit = None;
            }
        }
    }

    /// Run the command bound to a key press, if any.
    pub fn handle_key(&mut self, event: &KeyEvent) -> Option<Command> {
        let command = Command::from_event(event)?;
        self.execute(command);
        Some(command)
    }

    pub fn execute(&mut self, command: Command) {
        match command {
            Command::ToggleTranslate => self.toggle_mode(TransformMode::Translate),
            Command::ToggleRotate => self.toggle_mode(TransformMode::Rotate),
            Command::ToggleScale => self.toggle_mode(TransformMode::Scale),
            Command::ExitModes => self.exit_modes(),
            Command::DeleteSelection => {
                self.delete_selected();
            }
            Command::Undo => {
                self.undo();
            }
            Command::Redo => {
                self.redo();
            }
        }
    }

    // --- History ---

    /// Undo the last stroke. Returns whether anything changed.
    pub fn undo(&mut self) -> bool {
        if self.history.undo() {
            self.redraw();
            true
        } else {
            log::debug!("Nothing to undo");
            false
        }
    }

    /// Redo the last undone stroke. Returns whether anything changed.
    pub fn redo(&mut self) -> bool {
        if self.history.redo() {
            self.redraw();
            true
        } else {
            log::debug!("Nothing to redo");
            false
        }
    }

    /// Rebuild all stroke content from history.
    ///
    /// Strokes on hidden layers are skipped and replayed once their layer
    /// becomes visible again. Primitives are kept. The selection is cleared.
    ///
    /// Insertion order within a layer is not kept: surviving objects come
    /// first, followed by the replayed strokes in history order.
    pub fn redraw(&mut self) {
        self.transform.clear_selection(&mut self.scene);

        let strokes: Vec<NodeId> = self
            .scene
            .roots()
            .iter()
            .copied()
            .filter(|&id| self.scene.node(id).is_some_and(|node| node.tag.is_stroke()))
            .collect();
        for id in strokes {
            self.scene.remove(id);
        }
        let scene = &self.scene;
        self.layers.retain_objects(|id| scene.contains(id));

        for index in 0..self.layers.len() {
            if self.layers.layer(index).is_some_and(|layer| layer.visible) {
                self.layers.take_pending_replay(index);
            }
        }

        let mut replayed = 0;
        for stroke in self.history.strokes() {
            let visible = self
                .layers
                .layer(stroke.layer_index)
                .is_some_and(|layer| layer.visible);
            if !visible {
                self.layers.mark_pending_replay(stroke.layer_index);
                continue;
            }
            let node = self.drawing.replay(&mut self.scene, stroke);
            self.layers.register(stroke.layer_index, node);
            replayed += 1;
        }
        log::debug!("Redraw replayed {replayed} strokes");
    }

    // --- Layers ---

    /// Append a layer and make it current. Returns its index.
    pub fn add_layer(&mut self) -> usize {
        self.layers.add_layer()
    }

    /// Delete a layer with its objects and strokes.
    pub fn delete_layer(&mut self, index: usize) -> bool {
        let was_current = self.layers.current() == Some(index);
        match self.layers.delete_layer(index) {
            Some(removed) => {
                self.dispose_layer(index, &removed, was_current);
                true
            }
            None => false,
        }
    }

    /// Delete the last layer, if any.
    pub fn remove_last_layer(&mut self) -> bool {
        let Some(last) = self.layers.len().checked_sub(1) else {
            return false;
        };
        let was_current = self.layers.current() == Some(last);
        match self.layers.remove_last_layer() {
            Some(removed) => {
                self.dispose_layer(last, &removed, was_current);
                true
            }
            None => false,
        }
    }

    /// Drop the nodes and strokes of a layer already removed from the registry.
    fn dispose_layer(&mut self, index: usize, removed: &[NodeId], was_current: bool) {
        self.transform.forget(&mut self.scene, removed);
        for id in removed {
            self.scene.remove(*id);
        }
        self.history.purge_layer(index);
        if was_current {
            self.drawing.end();
        }
    }

    /// Flip a layer's visibility and apply it to the layer's objects.
    /// Returns the new visibility.
    pub fn toggle_layer_visibility(&mut self, index: usize) -> Option<bool> {
        let visible = self.layers.toggle_visibility(index)?;
        for &id in self.layers.objects(index) {
            if let Some(node) = self.scene.node_mut(id) {
                node.visible = visible;
            }
        }
        if visible && self.layers.take_pending_replay(index) {
            self.redraw();
        }
        log::info!(
            "Layer {} is now {}",
            index + 1,
            if visible { "visible" } else { "hidden" }
        );
        Some(visible)
    }

    pub fn set_current_layer(&mut self, index: usize) -> bool {
        self.layers.set_current(index)
    }

    /// Objects of a layer grouped for the object panel.
    pub fn object_list(&self, index: usize) -> Option<ObjectList> {
        self.layers.layer(index)?;
        let mut list = ObjectList::default();
        for &id in self.layers.objects(index) {
            let Some(node) = self.scene.node(id) else {
                continue;
            };
            let entry = ObjectEntry {
                id,
                tag: node.tag,
                name: node.tag.display_name(),
            };
            match node.tag {
                NodeTag::Primitive => list.primitives.push(entry),
                tag if tag.is_stroke() => list.lines.push(entry),
                _ => list.other.push(entry),
            }
        }
        Some(list)
    }

    // --- Brushes and primitives ---

    pub fn set_brush_type(&mut self, brush: BrushType) {
        self.brushes.set_brush_type(brush);
    }

    /// Select a brush by its toolbar name.
    pub fn set_brush_type_named(&mut self, name: &str) -> Result<(), ParseError> {
        let brush = name.parse()?;
        self.set_brush_type(brush);
        Ok(())
    }

    pub fn set_brush_color(&mut self, color: Color) {
        self.brushes.set_color(color);
    }

    pub fn set_brush_thickness(&mut self, thickness: f32) {
        self.brushes.set_thickness(thickness);
    }

    pub fn set_brush_opacity_percent(&mut self, percent: f32) {
        self.brushes.set_opacity_percent(percent);
    }

    pub fn set_primitive_color(&mut self, color: Color) {
        self.primitive_color = color;
    }

    /// Place a primitive at the origin of the current layer.
    pub fn insert_primitive(&mut self, kind: PrimitiveKind) -> Option<NodeId> {
        let Some(layer) = self.layers.current() else {
            log::debug!("Ignoring {kind} insertion: no layers");
            return None;
        };
        let id = kind.spawn(&mut self.scene, self.primitive_color);
        self.layers.register(layer, id);
        let visible = self.layers.layer(layer).is_some_and(|l| l.visible);
        if let Some(node) = self.scene.node_mut(id) {
            node.visible = visible;
        }
        Some(id)
    }

    /// Place a primitive by its toolbar name. Unknown names are ignored.
    pub fn insert_primitive_named(&mut self, name: &str) -> Option<NodeId> {
        match name.parse::<PrimitiveKind>() {
            Ok(kind) => self.insert_primitive(kind),
            Err(err) => {
                log::warn!("{err}");
                None
            }
        }
    }

    // --- View ---

    /// Switch between 2D and 3D.
    pub fn toggle_view_mode(&mut self) {
        self.view_mode = self.view_mode.toggled();
        self.camera.apply_preset(self.view_mode);
        if let Some(plane) = self.scene.node_mut(self.drawing_plane) {
            plane.visible = self.view_mode == ViewMode::TwoD;
        }
        self.drawing.end();
        self.orbit = None;
        log::info!("Switched to {:?} view", self.view_mode);
    }

    // --- Selection and transform ---

    /// Enter a transform mode, or leave it when already active.
    pub fn toggle_mode(&mut self, mode: TransformMode) {
        self.drawing.end();
        self.transform.toggle_mode(&mut self.scene, mode);
    }

    pub fn exit_modes(&mut self) {
        self.transform.exit(&mut self.scene);
    }

    /// Select an object, entering translate mode when idle.
    pub fn select_object(&mut self, id: NodeId, additive: bool) -> bool {
        if !self.transform.is_active() {
            self.toggle_mode(TransformMode::Translate);
        }
        self.transform.select(&mut self.scene, id, additive)
    }

    /// Delete the selected objects. Returns how many were removed.
    pub fn delete_selected(&mut self) -> usize {
        let removed = self.transform.delete_selected(&mut self.scene);
        for &id in &removed {
            self.layers.unregister(id);
        }
        removed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use glam::{EulerRot, Vec3};
    use kurbo::Size;

    fn canvas() -> Canvas {
        let config = CanvasConfig {
            viewport: Size::new(800.0, 800.0),
            ..CanvasConfig::default()
        };
        Canvas::with_seed(config, 42)
    }

    /// Draw one segment between world points on the current layer.
    fn draw_segment(canvas: &mut Canvas, start: Vec3, end: Vec3) -> Option<NodeId> {
        canvas.drawing.begin_at(start);
        let mut ctx = DrawContext {
            scene: &mut canvas.scene,
            layers: &mut canvas.layers,
            history: &mut canvas.history,
            camera: &canvas.camera,
            brushes: &canvas.brushes,
            config: &canvas.config,
            view_mode: canvas.view_mode,
            drawing_plane: canvas.drawing_plane,
        };
        let node = canvas.drawing.extend_to(&mut ctx, end);
        canvas.drawing.end();
        node
    }

    fn counts(canvas: &Canvas) -> Vec<(usize, Vec<NodeTag>)> {
        (0..canvas.layers().len())
            .map(|i| {
                let tags = canvas
                    .layers()
                    .objects(i)
                    .iter()
                    .map(|&id| canvas.scene().node(id).unwrap().tag)
                    .collect();
                (i, tags)
            })
            .collect()
    }

    fn screen(canvas: &Canvas, world: Vec3) -> Point {
        canvas
            .camera()
            .world_to_screen(world, canvas.config().viewport)
            .unwrap()
    }

    fn down(canvas: &mut Canvas, world: Vec3, modifiers: Modifiers, time_ms: f64) {
        let position = screen(canvas, world);
        canvas.handle_pointer(&PointerEvent::Down {
            position,
            button: MouseButton::Left,
            modifiers,
            time_ms,
        });
    }

    fn move_to(canvas: &mut Canvas, world: Vec3, time_ms: f64) {
        let position = screen(canvas, world);
        canvas.handle_pointer(&PointerEvent::Move { position, time_ms });
    }

    fn up(canvas: &mut Canvas) {
        canvas.handle_pointer(&PointerEvent::Up {
            position: Point::ZERO,
            button: MouseButton::Left,
        });
    }

    /// A 3D canvas looking down -Z from (0, 0, 10) with one layer.
    fn overhead_canvas() -> Canvas {
        let mut canvas = canvas();
        canvas.add_layer();
        canvas.toggle_view_mode();
        canvas.camera_mut().position = Vec3::new(0.0, 0.0, 10.0);
        canvas
    }

    #[test]
    fn test_round_stroke_undo_redo() {
        let mut canvas = canvas();
        canvas.add_layer();
        let node = draw_segment(&mut canvas, Vec3::ZERO, Vec3::X).unwrap();
        assert_eq!(canvas.history().strokes().len(), 1);
        assert_eq!(canvas.layers().objects(0), &[node]);
        let original = canvas.history().strokes()[0].clone();
        let before = counts(&canvas);

        assert!(canvas.undo());
        assert!(canvas.history().strokes().is_empty());
        assert!(canvas.layers().objects(0).is_empty());
        assert!(!canvas.scene().contains(node));

        assert!(canvas.redo());
        assert_eq!(canvas.history().strokes(), &[original]);
        assert_eq!(counts(&canvas), before);
        let replayed = canvas.layers().objects(0)[0];
        let position = canvas.scene().node(replayed).unwrap().transform.position;
        assert!((position - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_new_stroke_clears_redo() {
        let mut canvas = canvas();
        canvas.add_layer();
        draw_segment(&mut canvas, Vec3::ZERO, Vec3::X);
        draw_segment(&mut canvas, Vec3::X, Vec3::Y);
        canvas.undo();
        canvas.undo();
        draw_segment(&mut canvas, Vec3::ZERO, Vec3::Y);
        assert!(!canvas.redo());
        assert_eq!(canvas.history().strokes().len(), 1);
    }

    #[test]
    fn test_redraw_is_idempotent_and_keeps_primitives() {
        let mut canvas = canvas();
        canvas.add_layer();
        draw_segment(&mut canvas, Vec3::ZERO, Vec3::X);
        canvas.set_brush_type(BrushType::Spray);
        draw_segment(&mut canvas, Vec3::X, Vec3::Y);
        let cube = canvas.insert_primitive(PrimitiveKind::Cube).unwrap();

        canvas.redraw();
        let once = counts(&canvas);
        let nodes = canvas.scene().len();
        canvas.redraw();
        assert_eq!(counts(&canvas), once);
        assert_eq!(canvas.scene().len(), nodes);
        assert!(canvas.layers().objects(0).contains(&cube));
        assert_eq!(
            once[0].1,
            vec![NodeTag::Primitive, NodeTag::Line, NodeTag::Spray]
        );
    }

    #[test]
    fn test_redraw_releases_resources() {
        let mut canvas = canvas();
        canvas.add_layer();
        canvas.set_brush_type(BrushType::Watercolor);
        draw_segment(&mut canvas, Vec3::ZERO, Vec3::X);
        canvas.set_brush_type(BrushType::Round);
        draw_segment(&mut canvas, Vec3::X, Vec3::Y);
        let geometries = canvas.scene().live_geometry_count();
        let materials = canvas.scene().live_material_count();

        for _ in 0..3 {
            canvas.redraw();
        }
        assert_eq!(canvas.scene().live_geometry_count(), geometries);
        assert_eq!(canvas.scene().live_material_count(), materials);

        canvas.undo();
        canvas.undo();
        // Only the drawing plane and the cached watercolor material remain.
        assert_eq!(canvas.scene().live_geometry_count(), 1);
        assert_eq!(canvas.scene().live_material_count(), 2);
    }

    #[test]
    fn test_toggle_visibility_without_duplicates() {
        let mut canvas = canvas();
        canvas.add_layer();
        let node = draw_segment(&mut canvas, Vec3::ZERO, Vec3::X).unwrap();

        assert_eq!(canvas.toggle_layer_visibility(0), Some(false));
        assert!(!canvas.scene().node(node).unwrap().visible);
        assert_eq!(canvas.toggle_layer_visibility(0), Some(true));
        assert!(canvas.scene().node(node).unwrap().visible);
        assert_eq!(canvas.layers().objects(0), &[node]);
    }

    #[test]
    fn test_redraw_follows_visibility() {
        let mut canvas = canvas();
        canvas.add_layer();
        draw_segment(&mut canvas, Vec3::ZERO, Vec3::X);
        canvas.add_layer();
        draw_segment(&mut canvas, Vec3::ZERO, Vec3::Y);

        canvas.toggle_layer_visibility(0);
        canvas.redraw();
        assert!(canvas.layers().objects(0).is_empty());
        assert_eq!(canvas.layers().objects(1).len(), 1);

        // Showing the layer again replays its skipped strokes once.
        canvas.toggle_layer_visibility(0);
        assert_eq!(canvas.layers().objects(0).len(), 1);
        assert_eq!(canvas.layers().objects(1).len(), 1);
        assert_eq!(canvas.history().strokes().len(), 2);
    }

    #[test]
    fn test_hidden_layer_blocks_drawing() {
        let mut canvas = canvas();
        canvas.add_layer();
        canvas.toggle_layer_visibility(0);
        down(&mut canvas, Vec3::ZERO, Modifiers::NONE, 0.0);
        move_to(&mut canvas, Vec3::new(0.2, 0.0, 0.0), 100.0);
        assert!(canvas.history().strokes().is_empty());
    }

    #[test]
    fn test_pointer_drawing_is_rate_limited() {
        let mut canvas = canvas();
        canvas.add_layer();
        down(&mut canvas, Vec3::ZERO, Modifiers::NONE, 0.0);
        assert!(canvas.is_drawing());
        move_to(&mut canvas, Vec3::new(0.2, 0.0, 0.0), 100.0);
        move_to(&mut canvas, Vec3::new(0.4, 0.0, 0.0), 105.0);
        assert_eq!(canvas.history().strokes().len(), 1);
        move_to(&mut canvas, Vec3::new(0.4, 0.0, 0.0), 130.0);
        move_to(&mut canvas, Vec3::new(0.401, 0.0, 0.0), 150.0);
        assert_eq!(canvas.history().strokes().len(), 2);
        up(&mut canvas);
        assert!(!canvas.is_drawing());

        let stroke = &canvas.history().strokes()[1];
        assert!((stroke.end - Vec3::new(0.4, 0.0, 0.0)).length() < 1e-3);
        assert_eq!(stroke.end.z, 0.0);
    }

    #[test]
    fn test_no_layers_no_drawing() {
        let mut canvas = canvas();
        down(&mut canvas, Vec3::ZERO, Modifiers::NONE, 0.0);
        assert!(!canvas.is_drawing());
        assert!(canvas.insert_primitive(PrimitiveKind::Cube).is_none());
    }

    #[test]
    fn test_delete_non_current_layer() {
        let mut canvas = canvas();
        canvas.add_layer();
        draw_segment(&mut canvas, Vec3::ZERO, Vec3::X);
        canvas.add_layer();
        canvas.add_layer();
        let node = draw_segment(&mut canvas, Vec3::ZERO, Vec3::Y).unwrap();
        let name = canvas.layers().layer(2).unwrap().name.clone();

        assert!(canvas.delete_layer(0));
        assert_eq!(canvas.layers().current(), Some(1));
        assert_eq!(canvas.layers().layer(1).unwrap().name, name);
        assert_eq!(canvas.layers().objects(1), &[node]);
        assert_eq!(canvas.history().strokes().len(), 1);
        assert_eq!(canvas.history().strokes()[0].layer_index, 1);

        canvas.redraw();
        assert_eq!(canvas.layers().objects(1).len(), 1);
        assert!(canvas.layers().objects(0).is_empty());
    }

    #[test]
    fn test_remove_last_layer_purges_strokes() {
        let mut canvas = canvas();
        canvas.add_layer();
        draw_segment(&mut canvas, Vec3::ZERO, Vec3::X);
        canvas.add_layer();
        let node = draw_segment(&mut canvas, Vec3::ZERO, Vec3::Y).unwrap();

        assert!(canvas.remove_last_layer());
        assert_eq!(canvas.layers().len(), 1);
        assert_eq!(canvas.layers().current(), Some(0));
        assert!(!canvas.scene().contains(node));
        assert_eq!(canvas.history().strokes().len(), 1);
        assert_eq!(canvas.history().strokes()[0].layer_index, 0);

        assert!(canvas.remove_last_layer());
        assert!(!canvas.remove_last_layer());
        assert_eq!(canvas.layers().current(), None);
        assert!(canvas.history().strokes().is_empty());
    }

    #[test]
    fn test_deleted_stroke_returns_on_redraw() {
        let mut canvas = canvas();
        canvas.add_layer();
        let node = draw_segment(&mut canvas, Vec3::ZERO, Vec3::X).unwrap();
        canvas.select_object(node, false);
        assert_eq!(canvas.delete_selected(), 1);
        assert!(canvas.layers().objects(0).is_empty());

        // Deleting objects does not touch history.
        canvas.redraw();
        assert_eq!(canvas.layers().objects(0).len(), 1);
        assert_eq!(canvas.history().strokes().len(), 1);
    }

    #[test]
    fn test_object_list_groups_by_tag() {
        let mut canvas = canvas();
        canvas.add_layer();
        draw_segment(&mut canvas, Vec3::ZERO, Vec3::X);
        canvas.set_brush_type(BrushType::Oil);
        draw_segment(&mut canvas, Vec3::X, Vec3::Y);
        canvas.insert_primitive_named("torus");
        assert!(canvas.insert_primitive_named("teapot").is_none());

        let list = canvas.object_list(0).unwrap();
        assert_eq!(list.primitives.len(), 1);
        let names: Vec<&str> = list.lines.iter().map(|entry| entry.name).collect();
        assert_eq!(names, vec!["Line Stroke", "Oil"]);
        assert!(list.other.is_empty());
        assert!(canvas.object_list(3).is_none());
    }

    #[test]
    fn test_translate_drag_isolates_axis() {
        let mut canvas = overhead_canvas();
        let a = canvas.insert_primitive(PrimitiveKind::Cube).unwrap();
        let b = canvas.insert_primitive(PrimitiveKind::Sphere).unwrap();
        canvas.scene.node_mut(b).unwrap().transform.position = Vec3::new(0.0, -3.0, 0.0);

        canvas.execute(Command::ToggleTranslate);
        down(&mut canvas, Vec3::new(0.0, 0.0, 0.5), Modifiers::NONE, 0.0);
        let ctrl = Modifiers { ctrl: true, ..Modifiers::NONE };
        down(&mut canvas, Vec3::new(0.0, -3.0, 0.5), ctrl, 0.0);
        assert_eq!(canvas.transform().selection(), &[a, b]);

        // Gizmo sits at (0, -1.5, 0); grab its x arrow.
        down(&mut canvas, Vec3::new(1.5, -1.5, 0.0), Modifiers::NONE, 0.0);
        move_to(&mut canvas, Vec3::new(2.5, -0.8, 0.0), 20.0);
        up(&mut canvas);

        let pa = canvas.scene().node(a).unwrap().transform.position;
        let pb = canvas.scene().node(b).unwrap().transform.position;
        assert!((pa - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-3);
        assert!((pb - Vec3::new(1.0, -3.0, 0.0)).length() < 1e-3);
        assert!(!canvas.transform().is_dragging());
    }

    #[test]
    fn test_translate_drag_along_y() {
        let mut canvas = overhead_canvas();
        let cube = canvas.insert_primitive(PrimitiveKind::Cube).unwrap();
        canvas.select_object(cube, false);

        down(&mut canvas, Vec3::new(0.0, 1.5, 0.0), Modifiers::NONE, 0.0);
        assert!(canvas.transform().is_dragging());
        move_to(&mut canvas, Vec3::new(0.7, 2.5, 0.0), 20.0);
        up(&mut canvas);

        let position = canvas.scene().node(cube).unwrap().transform.position;
        assert!((position - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn test_translate_drag_along_z() {
        let mut canvas = overhead_canvas();
        canvas.camera_mut().position = Vec3::new(10.0, 3.0, 0.0);
        let cube = canvas.insert_primitive(PrimitiveKind::Cube).unwrap();
        canvas.select_object(cube, false);

        down(&mut canvas, Vec3::new(0.0, 0.0, 1.5), Modifiers::NONE, 0.0);
        assert!(canvas.transform().is_dragging());
        // Stays on the drag plane through the gizmo, facing the camera.
        move_to(&mut canvas, Vec3::new(0.3, -1.0, 2.5), 20.0);
        up(&mut canvas);

        let position = canvas.scene().node(cube).unwrap().transform.position;
        assert!((position - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-3);
    }

    #[test]
    fn test_rotate_ring_adds_angle() {
        let mut canvas = overhead_canvas();
        let a = canvas.insert_primitive(PrimitiveKind::Cube).unwrap();
        let b = canvas.insert_primitive(PrimitiveKind::Cube).unwrap();
        canvas.scene.node_mut(a).unwrap().transform.position = Vec3::new(-0.5, 0.0, 0.0);
        canvas.scene.node_mut(b).unwrap().transform.position = Vec3::new(0.5, 0.0, 0.0);
        canvas.toggle_mode(TransformMode::Rotate);
        assert!(canvas.select_object(a, false));
        assert!(canvas.select_object(b, true));

        let at = |degrees: f32| {
            let radians = degrees.to_radians();
            Vec3::new(2.0 * radians.cos(), 2.0 * radians.sin(), 0.0)
        };
        down(&mut canvas, at(45.0), Modifiers::NONE, 0.0);
        assert!(canvas.transform().is_dragging());
        move_to(&mut canvas, at(60.0), 20.0);
        move_to(&mut canvas, at(75.0), 40.0);
        up(&mut canvas);

        for id in [a, b] {
            let rotation = canvas.scene().node(id).unwrap().transform.rotation;
            let (x, y, z) = rotation.to_euler(EulerRot::XYZ);
            assert!((z - 30f32.to_radians()).abs() < 1e-3);
            assert!(x.abs() < 1e-3);
            assert!(y.abs() < 1e-3);
        }
    }

    #[test]
    fn test_scale_factor_is_clamped() {
        let mut canvas = overhead_canvas();
        let cube = canvas.insert_primitive(PrimitiveKind::Cube).unwrap();
        canvas.execute(Command::ToggleScale);
        canvas.select_object(cube, false);

        down(&mut canvas, Vec3::new(2.0, 0.0, 0.0), Modifiers::NONE, 0.0);
        assert!(canvas.transform().is_dragging());
        move_to(&mut canvas, Vec3::new(-20.0, 0.0, 0.0), 20.0);
        let scale = canvas.scene().node(cube).unwrap().transform.scale;
        assert!((scale.x - 0.1).abs() < 1e-6);
        assert_eq!(scale.y, 1.0);
        assert_eq!(scale.z, 1.0);
    }

    #[test]
    fn test_delete_selection_updates_registry() {
        let mut canvas = overhead_canvas();
        let cube = canvas.insert_primitive(PrimitiveKind::Cube).unwrap();
        canvas.select_object(cube, false);
        assert_eq!(canvas.mode(), TransformMode::Translate);

        let delete = KeyEvent::Pressed {
            key: "Delete".to_string(),
            modifiers: Modifiers::NONE,
            repeat: false,
        };
        assert_eq!(canvas.handle_key(&delete), Some(Command::DeleteSelection));
        assert!(canvas.layers().objects(0).is_empty());
        assert!(!canvas.scene().contains(cube));
        assert!(canvas.transform().gizmo().is_none());
    }

    #[test]
    fn test_view_mode_toggle_and_orbit() {
        let mut canvas = canvas();
        let plane = canvas.drawing_plane();
        assert!(canvas.scene().node(plane).unwrap().visible);

        // Orbit is 3D only.
        let shift = Modifiers { shift: true, ..Modifiers::NONE };
        let press = PointerEvent::Down {
            position: Point::new(400.0, 400.0),
            button: MouseButton::Right,
            modifiers: shift,
            time_ms: 0.0,
        };
        let drag = PointerEvent::Move {
            position: Point::new(450.0, 400.0),
            time_ms: 20.0,
        };
        canvas.handle_pointer(&press);
        canvas.handle_pointer(&drag);
        assert_eq!(canvas.camera().position, ViewMode::TwoD.camera_position());

        canvas.toggle_view_mode();
        assert_eq!(canvas.view_mode(), ViewMode::ThreeD);
        assert!(!canvas.scene().node(plane).unwrap().visible);
        canvas.handle_pointer(&press);
        canvas.handle_pointer(&drag);
        let position = canvas.camera().position;
        assert_ne!(position, ViewMode::ThreeD.camera_position());
        assert!((position.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_3d_stroke_lies_in_front_of_camera() {
        let mut canvas = canvas();
        canvas.add_layer();
        canvas.toggle_view_mode();
        canvas.handle_pointer(&PointerEvent::Down {
            position: Point::new(400.0, 400.0),
            button: MouseButton::Left,
            modifiers: Modifiers::NONE,
            time_ms: 0.0,
        });
        canvas.handle_pointer(&PointerEvent::Move {
            position: Point::new(500.0, 400.0),
            time_ms: 20.0,
        });
        let stroke = &canvas.history().strokes()[0];
        assert!((stroke.start - Vec3::new(0.0, 0.0, -4.0)).length() < 1e-4);
        assert!((stroke.end.z + 4.0).abs() < 1e-4);
        assert!(stroke.end.x > 0.0);
    }

    #[test]
    fn test_undo_redo_keys() {
        let mut canvas = canvas();
        canvas.add_layer();
        draw_segment(&mut canvas, Vec3::ZERO, Vec3::X);
        let ctrl = Modifiers { ctrl: true, ..Modifiers::NONE };
        let key = |key: &str, modifiers| KeyEvent::Pressed {
            key: key.to_string(),
            modifiers,
            repeat: false,
        };
        canvas.handle_key(&key("z", ctrl));
        assert!(canvas.history().strokes().is_empty());
        canvas.handle_key(&key("y", ctrl));
        assert_eq!(canvas.history().strokes().len(), 1);
    }
}
