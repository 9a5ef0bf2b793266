//! Headless scene graph with explicit resource ownership.
//!
//! Nodes form a forest: top-level nodes are the scene's direct children and
//! may own child nodes. Removing a node always disposes its whole subtree,
//! releasing geometry and any material the node owns, so every deletion path
//! goes through [`Scene::remove`].

mod geometry;
mod material;

pub use geometry::{Geometry, PickParams};
pub use material::{BlendMode, Color, Material, MaterialId};

use crate::ray::Ray;
use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for scene nodes.
pub type NodeId = Uuid;

/// Classification stored on every node when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeTag {
    /// Segment of a round, square or eraser stroke.
    Line,
    /// Placed primitive mesh.
    Primitive,
    Spray,
    Watercolor,
    Oil,
    /// Generic grouping of layer content.
    Group,
    /// Fixed scene furniture such as the drawing plane.
    Background,
    Gizmo,
    SelectionBox,
    /// Child of another node.
    Part,
}

impl NodeTag {
    /// Layer content that can be picked, listed and transformed.
    pub fn is_content(self) -> bool {
        matches!(
            self,
            NodeTag::Line
                | NodeTag::Primitive
                | NodeTag::Spray
                | NodeTag::Watercolor
                | NodeTag::Oil
                | NodeTag::Group
        )
    }

    /// Content regenerated from stroke history.
    pub fn is_stroke(self) -> bool {
        matches!(
            self,
            NodeTag::Line | NodeTag::Spray | NodeTag::Watercolor | NodeTag::Oil
        )
    }

    /// Name shown in the object panel.
    pub fn display_name(self) -> &'static str {
        match self {
            NodeTag::Line => "Line Stroke",
            NodeTag::Primitive => "Primitive",
            NodeTag::Spray => "Spray",
            NodeTag::Watercolor => "Watercolor",
            NodeTag::Oil => "Oil",
            NodeTag::Group => "Group",
            NodeTag::Background | NodeTag::Gizmo | NodeTag::SelectionBox | NodeTag::Part => {
                "Object"
            }
        }
    }
}

/// Position, rotation and scale of a node relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// A node of the scene graph.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    pub name: String,
    pub tag: NodeTag,
    pub transform: Transform,
    pub visible: bool,
    pub render_order: i32,
    geometry: Option<Geometry>,
    material: Option<MaterialId>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    /// Grouping node without geometry.
    pub fn group(tag: NodeTag) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            tag,
            transform: Transform::default(),
            visible: true,
            render_order: 0,
            geometry: None,
            material: None,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Renderable node.
    pub fn mesh(tag: NodeTag, geometry: Geometry, material: MaterialId) -> Self {
        Self {
            geometry: Some(geometry),
            material: Some(material),
            ..Self::group(tag)
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.transform.rotation = rotation;
        self
    }

    pub fn with_render_order(mut self, order: i32) -> Self {
        self.render_order = order;
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    pub fn material(&self) -> Option<MaterialId> {
        self.material
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Result of a ray pick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// The node whose geometry was hit.
    pub node: NodeId,
    /// The candidate the hit node belongs to.
    pub candidate: NodeId,
    /// World-space distance from the ray origin.
    pub distance: f32,
    pub point: Vec3,
}

#[derive(Debug, Clone)]
struct MaterialSlot {
    material: Material,
    /// Shared materials belong to a cache and outlive the nodes using them.
    shared: bool,
}

/// The scene graph.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: HashMap<NodeId, Node>,
    /// Top-level nodes in insertion order.
    roots: Vec<NodeId>,
    materials: HashMap<MaterialId, MaterialSlot>,
    next_material: u64,
    live_geometries: usize,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a material owned by the node it will be attached to.
    pub fn create_material(&mut self, material: Material) -> MaterialId {
        self.insert_material(material, false)
    }

    /// Store a material that survives disposal of the nodes using it.
    pub fn create_shared_material(&mut self, material: Material) -> MaterialId {
        self.insert_material(material, true)
    }

    fn insert_material(&mut self, material: Material, shared: bool) -> MaterialId {
        let id = MaterialId(self.next_material);
        self.next_material += 1;
        self.materials.insert(id, MaterialSlot { material, shared });
        id
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(&id).map(|slot| &slot.material)
    }

    /// Insert a node, at the top level or under `parent`.
    ///
    /// Returns `None` if the parent does not exist; the node is dropped and
    /// its owned material released.
    pub fn insert(&mut self, node: Node, parent: Option<NodeId>) -> Option<NodeId> {
        let id = node.id;
        match parent {
            Some(parent_id) => match self.nodes.get_mut(&parent_id) {
                Some(parent_node) => parent_node.children.push(id),
                None => {
                    self.release_material(node.material);
                    return None;
                }
            },
            None => self.roots.push(id),
        }
        self.store(node, parent);
        Some(id)
    }

    /// Insert a top-level node.
    pub fn add(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.roots.push(id);
        self.store(node, None);
        id
    }

    fn store(&mut self, mut node: Node, parent: Option<NodeId>) {
        node.parent = parent;
        node.children.clear();
        if node.geometry.is_some() {
            self.live_geometries += 1;
        }
        self.nodes.insert(node.id, node);
    }

    /// Detach a node and dispose its subtree. Returns false if unknown.
    pub fn remove(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.nodes.get(&id).map(|n| n.parent) else {
            return false;
        };
        match parent {
            Some(parent_id) => {
                if let Some(parent_node) = self.nodes.get_mut(&parent_id) {
                    parent_node.children.retain(|&child| child != id);
                }
            }
            None => self.roots.retain(|&root| root != id),
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                if node.geometry.is_some() {
                    self.live_geometries -= 1;
                }
                self.release_material(node.material);
                stack.extend(node.children);
            }
        }
        true
    }

    fn release_material(&mut self, material: Option<MaterialId>) {
        if let Some(id) = material {
            if self.materials.get(&id).is_some_and(|slot| !slot.shared) {
                self.materials.remove(&id);
            }
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Top-level nodes in insertion order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Total number of nodes, including children.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes currently holding geometry buffers.
    pub fn live_geometry_count(&self) -> usize {
        self.live_geometries
    }

    /// Number of materials currently allocated, shared ones included.
    pub fn live_material_count(&self) -> usize {
        self.materials.len()
    }

    /// Local-to-world matrix of a node.
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = self.nodes.get(&id);
        while let Some(node) = current {
            matrix = node.transform.matrix() * matrix;
            current = node.parent.and_then(|parent| self.nodes.get(&parent));
        }
        matrix
    }

    /// Bounds of a node's subtree in the node's own local space.
    pub fn local_bounds(&self, id: NodeId) -> Option<(Vec3, Vec3)> {
        let to_local = self.world_matrix(id).inverse();
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            if let Some(geometry) = &node.geometry {
                let matrix = to_local * self.world_matrix(current);
                let (lo, hi) = geometry.bounds();
                for corner in box_corners(lo, hi) {
                    let p = matrix.transform_point3(corner);
                    min = min.min(p);
                    max = max.max(p);
                }
            }
            stack.extend(node.children.iter().copied());
        }
        (min.x <= max.x).then_some((min, max))
    }

    /// Pick the visible geometry under a ray among `candidates` and their
    /// descendants, nearest first.
    pub fn raycast(&self, ray: &Ray, candidates: &[NodeId], pick: &PickParams) -> Vec<Hit> {
        let mut hits = Vec::new();
        for &candidate in candidates {
            let mut stack = vec![candidate];
            while let Some(current) = stack.pop() {
                let Some(node) = self.nodes.get(&current) else {
                    continue;
                };
                if !node.visible {
                    continue;
                }
                if let Some(geometry) = &node.geometry {
                    let world = self.world_matrix(current);
                    let local_ray = ray.transformed(&world.inverse());
                    if let Some(t) = geometry.hit(&local_ray, pick) {
                        let point = world.transform_point3(local_ray.at(t));
                        hits.push(Hit {
                            node: current,
                            candidate,
                            distance: point.distance(ray.origin),
                            point,
                        });
                    }
                }
                stack.extend(node.children.iter().copied());
            }
        }
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

fn box_corners(min: Vec3, max: Vec3) -> [Vec3; 8] {
    [
        Vec3::new(min.x, min.y, min.z),
        Vec3::new(max.x, min.y, min.z),
        Vec3::new(min.x, max.y, min.z),
        Vec3::new(max.x, max.y, min.z),
        Vec3::new(min.x, min.y, max.z),
        Vec3::new(max.x, min.y, max.z),
        Vec3::new(min.x, max.y, max.z),
        Vec3::new(max.x, max.y, max.z),
    ]
}
