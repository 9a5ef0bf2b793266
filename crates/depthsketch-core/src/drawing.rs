//! Turning pointer gestures into stroke geometry.
//!
//! A gesture is a sequence of accepted samples. Every accepted sample closes
//! a segment from the previous sample, which becomes one [`Stroke`] in the
//! history and one group node in the scene. [`build_segment`] is the single
//! place geometry is generated, used both while drawing and on redraw.

use crate::brush::{BrushSettings, BrushType, Brushes};
use crate::camera::{Camera, ViewMode};
use crate::config::CanvasConfig;
use crate::history::{Stroke, StrokeHistory};
use crate::input::MouseButton;
use crate::layers::LayerRegistry;
use crate::ray::Plane;
use crate::scene::{BlendMode, Color, Geometry, Material, MaterialId, Node, NodeId, NodeTag, Scene};
use glam::{Quat, Vec3};
use kurbo::Point;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::collections::HashMap;

/// Linear samples between the segment ends.
const LINE_SAMPLES: usize = 10;
/// Divisions of the smoothed curve through the samples.
const CURVE_DIVISIONS: usize = 50;
/// Brushes thinner than this get no sphere stamps.
const STAMP_MIN_THICKNESS: f32 = 2.0;
const STAMP_SEGMENTS: u32 = 8;
const DISC_SEGMENTS: u32 = 32;
/// Render order of stroke geometry, drawn above the drawing plane.
pub const STROKE_RENDER_ORDER: i32 = 1;

/// Everything the drawing engine reads or mutates while handling an event.
pub struct DrawContext<'a> {
    pub scene: &'a mut Scene,
    pub layers: &'a mut LayerRegistry,
    pub history: &'a mut StrokeHistory,
    pub camera: &'a Camera,
    pub brushes: &'a Brushes,
    pub config: &'a CanvasConfig,
    pub view_mode: ViewMode,
    /// Fixed plane 2D strokes are painted on.
    pub drawing_plane: NodeId,
}

impl DrawContext<'_> {
    /// World point under the cursor, or `None` on a miss.
    ///
    /// In 2D the fixed drawing plane is picked. In 3D the point lies on a
    /// plane facing the camera, through `anchor` or a point in front of the
    /// camera.
    fn resolve(&self, position: Point, anchor: Option<Vec3>) -> Option<Vec3> {
        let ray = self.camera.ray_from_screen(position, self.config.viewport);
        match self.view_mode {
            ViewMode::TwoD => self
                .scene
                .raycast(&ray, &[self.drawing_plane], &self.config.pick)
                .first()
                .map(|hit| Vec3::new(hit.point.x, hit.point.y, 0.0)),
            ViewMode::ThreeD => {
                let normal = self.camera.world_direction();
                let anchor = anchor.unwrap_or_else(|| {
                    self.camera.position + normal * self.config.new_stroke_depth
                });
                ray.intersect_plane(&Plane::from_normal_and_point(normal, anchor))
            }
        }
    }
}

/// Materials shared by every watercolor and oil stamp with the same look.
#[derive(Debug, Clone, Default)]
pub struct MaterialCache {
    entries: HashMap<(BrushType, Color, u32, BlendMode, bool), MaterialId>,
}

impl MaterialCache {
    fn blob_material(
        &mut self,
        scene: &mut Scene,
        brush: BrushType,
        settings: &BrushSettings,
    ) -> MaterialId {
        let blend_mode = match brush {
            BrushType::Oil => settings.blend_mode,
            _ => BlendMode::Normal,
        };
        // Watercolor without blending occludes like an opaque wash.
        let blends = brush != BrushType::Watercolor || settings.blending;
        let key = (brush, settings.color, settings.opacity.to_bits(), blend_mode, blends);
        if let Some(id) = self.entries.get(&key) {
            if scene.material(*id).is_some() {
                return *id;
            }
        }
        let mut material = Material::translucent(settings.color, settings.opacity)
            .double_sided()
            .with_blend_mode(blend_mode);
        if blends {
            material = material.without_depth_write();
        }
        let id = scene.create_shared_material(material);
        self.entries.insert(key, id);
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Gesture state of the drawing tool.
#[derive(Debug, Clone)]
pub struct DrawingEngine {
    drawing: bool,
    /// End of the last accepted segment of the current gesture.
    last_point: Option<Vec3>,
    /// Timestamp of the last sample that passed the rate limit.
    last_sample_ms: Option<f64>,
    cache: MaterialCache,
    rng: StdRng,
}

impl Default for DrawingEngine {
    fn default() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl DrawingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with reproducible spray scatter.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            drawing: false,
            last_point: None,
            last_sample_ms: None,
            cache: MaterialCache::default(),
            rng,
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn last_point(&self) -> Option<Vec3> {
        self.last_point
    }

    /// Regenerate the scene content of a recorded stroke.
    pub fn replay(&mut self, scene: &mut Scene, stroke: &Stroke) -> NodeId {
        build_segment(scene, &mut self.cache, stroke)
    }

    /// Begin a gesture on a left press. Returns whether drawing started.
    pub fn start(&mut self, ctx: &DrawContext<'_>, position: Point, button: MouseButton) -> bool {
        if button != MouseButton::Left {
            return false;
        }
        if ctx.layers.is_empty() {
            log::debug!("Ignoring stroke start: no layers");
            return false;
        }
        match ctx.resolve(position, None) {
            Some(point) => {
                self.begin_at(point);
                true
            }
            None => {
                log::debug!("Ignoring stroke start: pointer missed the drawing surface");
                false
            }
        }
    }

    pub(crate) fn begin_at(&mut self, point: Vec3) {
        self.drawing = true;
        self.last_point = Some(point);
    }

    /// Sample a pointer move. Returns the segment node when one was added.
    pub fn continue_stroke(
        &mut self,
        ctx: &mut DrawContext<'_>,
        position: Point,
        time_ms: f64,
    ) -> Option<NodeId> {
        if !self.drawing {
            return None;
        }
        let current = ctx.layers.current()?;
        if !ctx.layers.layer(current).is_some_and(|layer| layer.visible) {
            return None;
        }
        if let Some(last) = self.last_sample_ms {
            if time_ms - last < ctx.config.sample_interval_ms {
                return None;
            }
        }
        self.last_sample_ms = Some(time_ms);

        let point = ctx.resolve(position, self.last_point)?;
        self.extend_to(ctx, point)
    }

    /// Close a segment at `point` unless it is too close to the previous one.
    pub(crate) fn extend_to(&mut self, ctx: &mut DrawContext<'_>, point: Vec3) -> Option<NodeId> {
        let start = self.last_point?;
        let layer_index = ctx.layers.current()?;
        let brush_type = ctx.brushes.active();
        if start.distance(point) < ctx.config.min_distance_for(brush_type) {
            return None;
        }

        let stroke = Stroke {
            start,
            end: point,
            brush_type,
            layer_index,
            settings: ctx.brushes.active_settings(),
            view_mode: ctx.view_mode,
            eye: ctx.camera.position,
            seed: self.rng.next_u64(),
        };
        let node = build_segment(ctx.scene, &mut self.cache, &stroke);
        ctx.layers.register(layer_index, node);
        ctx.history.push(stroke);
        self.last_point = Some(point);
        Some(node)
    }

    /// End the gesture.
    pub fn end(&mut self) {
        self.drawing = false;
        self.last_point = None;
    }
}

/// Generate the scene content of one stroke segment and add it to the scene.
///
/// The returned group sits at the segment's pivot with its geometry as
/// children, so that transforms act around the segment itself.
pub fn build_segment(scene: &mut Scene, cache: &mut MaterialCache, stroke: &Stroke) -> NodeId {
    let settings = &stroke.settings;
    let (tag, pivot) = match stroke.brush_type {
        BrushType::Round | BrushType::Square | BrushType::Eraser => {
            (NodeTag::Line, stroke.start.lerp(stroke.end, 0.5))
        }
        BrushType::Spray => (NodeTag::Spray, stroke.end),
        BrushType::Watercolor => (NodeTag::Watercolor, stroke.end),
        BrushType::Oil => (NodeTag::Oil, stroke.end),
    };
    let group = scene.add(
        Node::group(tag)
            .named(stroke.brush_type.name())
            .at(pivot)
            .with_render_order(STROKE_RENDER_ORDER),
    );

    let children: Vec<Node> = match stroke.brush_type {
        BrushType::Round | BrushType::Square | BrushType::Eraser => {
            line_children(scene, stroke, pivot)
        }
        BrushType::Spray => vec![spray_child(scene, stroke)],
        BrushType::Watercolor | BrushType::Oil => {
            let radius = match stroke.brush_type {
                BrushType::Watercolor => settings.spread / 30.0,
                _ => settings.thickness / 20.0,
            };
            let material = cache.blob_material(scene, stroke.brush_type, settings);
            let mut disc = Node::mesh(
                NodeTag::Part,
                Geometry::Disc { radius, segments: DISC_SEGMENTS },
                material,
            );
            if stroke.view_mode == ViewMode::ThreeD {
                disc = disc.rotated(facing(stroke.eye - stroke.end));
            }
            vec![disc]
        }
    };
    for child in children {
        scene.insert(child.with_render_order(STROKE_RENDER_ORDER), Some(group));
    }
    group
}

/// Polyline through the smoothed samples plus sphere stamps, relative to
/// `pivot`.
fn line_children(scene: &mut Scene, stroke: &Stroke, pivot: Vec3) -> Vec<Node> {
    let settings = &stroke.settings;
    let samples: Vec<Vec3> = (0..=LINE_SAMPLES)
        .map(|i| stroke.start.lerp(stroke.end, i as f32 / LINE_SAMPLES as f32) - pivot)
        .collect();

    let line_material = scene.create_material(Material::translucent(settings.color, settings.opacity));
    let mut children = vec![Node::mesh(
        NodeTag::Part,
        Geometry::Polyline {
            points: catmull_rom(&samples, CURVE_DIVISIONS),
        },
        line_material,
    )];

    if settings.thickness > STAMP_MIN_THICKNESS {
        for &sample in samples.iter().step_by(2) {
            let material = scene.create_material(Material::translucent(settings.color, settings.opacity));
            children.push(
                Node::mesh(
                    NodeTag::Part,
                    Geometry::Sphere {
                        radius: settings.thickness / 100.0,
                        segments: STAMP_SEGMENTS,
                    },
                    material,
                )
                .at(sample),
            );
        }
    }
    children
}

/// Points scattered in a cube around the segment end, relative to it.
fn spray_child(scene: &mut Scene, stroke: &Stroke) -> Node {
    let settings = &stroke.settings;
    let side = settings.spray_radius / 50.0;
    let mut rng = StdRng::seed_from_u64(stroke.seed);
    let points = (0..settings.spray_density)
        .map(|_| {
            let x = rng.gen_range(-0.5_f32..0.5) * side;
            let y = rng.gen_range(-0.5_f32..0.5) * side;
            let z = match stroke.view_mode {
                ViewMode::ThreeD => rng.gen_range(-0.5_f32..0.5) * side,
                ViewMode::TwoD => 0.0,
            };
            Vec3::new(x, y, z)
        })
        .collect();
    let material = scene.create_material(Material::translucent(settings.color, settings.opacity));
    Node::mesh(
        NodeTag::Part,
        Geometry::PointCloud {
            points,
            size: settings.thickness / 10.0,
        },
        material,
    )
}

/// Rotation turning a disc's +Z face towards `direction`.
fn facing(direction: Vec3) -> Quat {
    let direction = direction.normalize_or_zero();
    if direction == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    Quat::from_rotation_arc(Vec3::Z, direction)
}

/// Uniform Catmull-Rom curve through `points`, sampled at `divisions + 1`
/// evenly spaced parameters. End tangents use mirrored neighbours.
fn catmull_rom(points: &[Vec3], divisions: usize) -> Vec<Vec3> {
    match points.len() {
        0 => return Vec::new(),
        1 => return vec![points[0]; divisions + 1],
        _ => {}
    }
    let last = points.len() - 1;
    let point = |i: isize| -> Vec3 {
        if i < 0 {
            points[0] * 2.0 - points[1]
        } else if i as usize > last {
            points[last] * 2.0 - points[last - 1]
        } else {
            points[i as usize]
        }
    };

    (0..=divisions)
        .map(|d| {
            let u = d as f32 / divisions as f32 * last as f32;
            let segment = (u.floor() as usize).min(last - 1);
            let t = u - segment as f32;
            let i = segment as isize;
            let (p0, p1, p2, p3) = (point(i - 1), point(i), point(i + 1), point(i + 2));
            let t2 = t * t;
            let t3 = t2 * t;
            0.5 * (2.0 * p1
                + (p2 - p0) * t
                + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
                + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3)
        })
        .collect()
}
